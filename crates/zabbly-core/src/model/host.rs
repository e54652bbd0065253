// ── Host domain types ──
//
// `DesiredHost` is built fresh from input configuration at the start of a
// run; `HostState` is what the server reports. Neither is ever persisted.

use std::collections::{HashMap, HashSet};

use indexmap::IndexMap;
use serde::Serialize;
use tracing::warn;

use zabbly_api::models::{ApiHost, InterfaceRecord};

use super::interface::{HostInterface, InterfaceType};
use super::object_id::ObjectId;
use crate::error::CoreError;

// ── Defaults ────────────────────────────────────────────────────────

/// Fallbacks applied when the desired state leaves a field empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HostDefaults {
    pub groups: Vec<String>,
    pub templates: Vec<String>,
    pub proxy: Option<String>,
    pub interfaces: Vec<HostInterface>,
}

// ── DesiredHost ─────────────────────────────────────────────────────

/// The complete desired configuration of one host.
///
/// Only obtainable through [`DesiredHostBuilder::build`], which applies
/// defaults and rejects inconsistent interface sets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DesiredHost {
    hostname: String,
    groups: Vec<String>,
    templates: Vec<String>,
    interfaces: Vec<HostInterface>,
    macros: IndexMap<String, String>,
    proxy: Option<String>,
    create_missing_groups: bool,
}

impl DesiredHost {
    pub fn builder(hostname: impl Into<String>) -> DesiredHostBuilder {
        DesiredHostBuilder {
            hostname: hostname.into(),
            ..DesiredHostBuilder::default()
        }
    }

    pub fn hostname(&self) -> &str {
        &self.hostname
    }

    /// Group names, deduplicated, in first-seen order.
    pub fn groups(&self) -> &[String] {
        &self.groups
    }

    pub fn templates(&self) -> &[String] {
        &self.templates
    }

    pub fn interfaces(&self) -> &[HostInterface] {
        &self.interfaces
    }

    pub fn macros(&self) -> &IndexMap<String, String> {
        &self.macros
    }

    pub fn proxy(&self) -> Option<&str> {
        self.proxy.as_deref()
    }

    pub fn create_missing_groups(&self) -> bool {
        self.create_missing_groups
    }

    /// Desired interfaces rendered to wire records.
    pub fn interface_records(&self) -> Vec<InterfaceRecord> {
        self.interfaces.iter().map(HostInterface::to_record).collect()
    }
}

#[derive(Debug, Default)]
pub struct DesiredHostBuilder {
    hostname: String,
    groups: Vec<String>,
    templates: Vec<String>,
    interfaces: Vec<HostInterface>,
    macros: IndexMap<String, String>,
    proxy: Option<String>,
    create_missing_groups: bool,
    defaults: HostDefaults,
}

impl DesiredHostBuilder {
    pub fn group(mut self, name: impl Into<String>) -> Self {
        self.groups.push(name.into());
        self
    }

    pub fn groups<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.groups.extend(names.into_iter().map(Into::into));
        self
    }

    pub fn template(mut self, name: impl Into<String>) -> Self {
        self.templates.push(name.into());
        self
    }

    pub fn templates<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.templates.extend(names.into_iter().map(Into::into));
        self
    }

    pub fn interface(mut self, interface: HostInterface) -> Self {
        self.interfaces.push(interface);
        self
    }

    pub fn interfaces(mut self, interfaces: impl IntoIterator<Item = HostInterface>) -> Self {
        self.interfaces.extend(interfaces);
        self
    }

    /// Add a user macro. A repeated key replaces the earlier value.
    pub fn macro_value(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.macros.insert(key.into(), value.into());
        self
    }

    pub fn macros(mut self, macros: impl IntoIterator<Item = (String, String)>) -> Self {
        self.macros.extend(macros);
        self
    }

    pub fn proxy(mut self, name: Option<String>) -> Self {
        self.proxy = name;
        self
    }

    pub fn create_missing_groups(mut self, enabled: bool) -> Self {
        self.create_missing_groups = enabled;
        self
    }

    pub fn defaults(mut self, defaults: HostDefaults) -> Self {
        self.defaults = defaults;
        self
    }

    pub fn build(self) -> Result<DesiredHost, CoreError> {
        let hostname = self.hostname.trim().to_owned();
        if hostname.is_empty() {
            return Err(CoreError::InvalidHost {
                message: "hostname must not be empty".into(),
            });
        }

        let groups = if self.groups.is_empty() {
            self.defaults.groups
        } else {
            self.groups
        };
        let templates = if self.templates.is_empty() {
            self.defaults.templates
        } else {
            self.templates
        };
        let proxy = self
            .proxy
            .or(self.defaults.proxy)
            .filter(|p| !p.trim().is_empty());

        let interfaces = if self.interfaces.is_empty() {
            self.defaults.interfaces
        } else {
            self.interfaces
        };
        validate_interfaces(&interfaces)?;

        Ok(DesiredHost {
            hostname,
            groups: dedup_names(groups),
            templates: dedup_names(templates),
            interfaces,
            macros: self.macros,
            proxy,
            create_missing_groups: self.create_missing_groups,
        })
    }
}

fn dedup_names(names: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    names
        .into_iter()
        .filter(|n| !n.trim().is_empty())
        .filter(|n| seen.insert(n.clone()))
        .collect()
}

/// `(type, port)` must be unique, and each type may have at most one main
/// interface. A type with interfaces but no main one is allowed but logged.
fn validate_interfaces(interfaces: &[HostInterface]) -> Result<(), CoreError> {
    let mut identities = HashSet::new();
    let mut mains: HashMap<InterfaceType, usize> = HashMap::new();

    for iface in interfaces {
        if !identities.insert(iface.identity()) {
            let (kind, port) = iface.identity();
            return Err(CoreError::InvalidInterface {
                message: format!("duplicate {kind} interface on port {port}"),
            });
        }
        let count = mains.entry(iface.interface_type()).or_default();
        if iface.is_main() {
            *count += 1;
        }
    }

    for (kind, count) in mains {
        match count {
            0 => warn!(%kind, "no {kind} interface is marked main"),
            1 => {}
            n => {
                return Err(CoreError::InvalidInterface {
                    message: format!("{n} {kind} interfaces are marked main; at most one allowed"),
                });
            }
        }
    }
    Ok(())
}

// ── HostState ───────────────────────────────────────────────────────

/// Current remote state of a host, as returned by `host.get`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HostState {
    pub hostid: ObjectId,
    pub hostname: String,
    /// Technical names of directly linked templates.
    pub templates: Vec<String>,
    pub groups: Vec<String>,
    pub interfaces: Vec<InterfaceRecord>,
}

impl From<ApiHost> for HostState {
    fn from(host: ApiHost) -> Self {
        Self {
            hostid: ObjectId::from(host.hostid),
            hostname: host.host,
            templates: host.parent_templates.into_iter().map(|t| t.host).collect(),
            groups: host.groups.into_iter().map(|g| g.name).collect(),
            interfaces: host.interfaces,
        }
    }
}
