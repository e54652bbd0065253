// ── Additive interface reconciliation ──

use std::collections::HashSet;

use crate::model::HostInterface;

/// Desired interfaces with no `(type, port)` counterpart in `existing`.
///
/// Only those two fields are compared, so an interface that changed its
/// address but kept its type and port is not recreated. Nothing is ever
/// reported for removal.
pub fn missing_interfaces(existing: &[HostInterface], desired: &[HostInterface]) -> Vec<HostInterface> {
    let present: HashSet<_> = existing.iter().map(HostInterface::identity).collect();
    desired
        .iter()
        .filter(|iface| !present.contains(&iface.identity()))
        .cloned()
        .collect()
}
