// ── Drift detection ──
//
// Pure comparison of the server's view of a host against the desired
// state. Stricter than `missing_interfaces`: interfaces are compared on
// every field here, because the question is "did anything change", not
// "what must be created".

use std::collections::HashSet;

use serde::Serialize;
use tracing::{debug, warn};

use zabbly_api::models::InterfaceRecord;

use crate::model::{DesiredHost, HostState};

/// Difference between two name lists, ignoring order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ListDrift {
    pub differs: bool,
    /// Desired but not currently present.
    pub added: Vec<String>,
    /// Present but not desired.
    pub removed: Vec<String>,
}

impl ListDrift {
    fn between(current: &[String], desired: &[String]) -> Self {
        let mut sorted_current = current.to_vec();
        let mut sorted_desired = desired.to_vec();
        sorted_current.sort();
        sorted_desired.sort();

        if sorted_current == sorted_desired {
            return Self::default();
        }
        Self {
            differs: true,
            added: sorted_desired
                .iter()
                .filter(|name| !sorted_current.contains(name))
                .cloned()
                .collect(),
            removed: sorted_current
                .iter()
                .filter(|name| !sorted_desired.contains(name))
                .cloned()
                .collect(),
        }
    }
}

/// Everything that differs between a host's current and desired state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct HostDrift {
    pub templates: ListDrift,
    pub groups: ListDrift,
    /// Desired interfaces with no exact match on the server.
    pub new_interfaces: Vec<InterfaceRecord>,
    /// Server interfaces with no exact match in the desired set. Reported
    /// only; an update never removes them.
    pub stale_interfaces: Vec<InterfaceRecord>,
}

impl HostDrift {
    pub fn needs_update(&self) -> bool {
        self.templates.differs
            || self.groups.differs
            || !self.new_interfaces.is_empty()
            || !self.stale_interfaces.is_empty()
    }

    /// One human-readable line per reason, in a stable order.
    pub fn reasons(&self) -> Vec<String> {
        let mut reasons = Vec::new();
        describe_list(&mut reasons, "template", &self.templates);
        describe_list(&mut reasons, "group", &self.groups);
        for record in &self.new_interfaces {
            reasons.push(format!("new interface: {}", describe_record(record)));
        }
        for record in &self.stale_interfaces {
            reasons.push(format!("stale interface (kept): {}", describe_record(record)));
        }
        reasons
    }
}

fn describe_list(out: &mut Vec<String>, noun: &str, drift: &ListDrift) {
    if !drift.differs {
        return;
    }
    for name in &drift.added {
        out.push(format!("{noun} to link: {name}"));
    }
    for name in &drift.removed {
        out.push(format!("{noun} not desired: {name}"));
    }
    if drift.added.is_empty() && drift.removed.is_empty() {
        out.push(format!("{noun} lists differ"));
    }
}

fn describe_record(record: &InterfaceRecord) -> String {
    let address = if record.useip == "1" {
        &record.ip
    } else {
        &record.dns
    };
    format!(
        "type={} {}:{} main={}",
        record.interface_type, address, record.port, record.main
    )
}

/// Compare `current` against `desired` and log every reason found.
pub fn compare(current: &HostState, desired: &DesiredHost) -> HostDrift {
    let desired_records = desired.interface_records();

    let current_set: HashSet<&InterfaceRecord> = current.interfaces.iter().collect();
    let desired_set: HashSet<&InterfaceRecord> = desired_records.iter().collect();

    let drift = HostDrift {
        templates: ListDrift::between(&current.templates, desired.templates()),
        groups: ListDrift::between(&current.groups, desired.groups()),
        new_interfaces: desired_records
            .iter()
            .filter(|r| !current_set.contains(r))
            .cloned()
            .collect(),
        stale_interfaces: current
            .interfaces
            .iter()
            .filter(|r| !desired_set.contains(r))
            .cloned()
            .collect(),
    };

    if drift.templates.differs {
        debug!(
            host = desired.hostname(),
            current = ?current.templates,
            desired = ?desired.templates(),
            "templates differ"
        );
    }
    if drift.groups.differs {
        debug!(
            host = desired.hostname(),
            current = ?current.groups,
            desired = ?desired.groups(),
            "groups differ"
        );
    }
    for record in &drift.new_interfaces {
        debug!(host = desired.hostname(), interface = %describe_record(record), "new interface required");
    }
    for record in &drift.stale_interfaces {
        warn!(
            host = desired.hostname(),
            interface = %describe_record(record),
            "interface not in desired state; it will not be removed"
        );
    }

    drift
}

/// Whether any update is required at all.
pub fn needs_update(current: &HostState, desired: &DesiredHost) -> bool {
    compare(current, desired).needs_update()
}
