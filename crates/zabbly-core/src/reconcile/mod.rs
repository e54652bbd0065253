// ── Pure diff logic ──
//
// No I/O here: both halves take already-fetched state and return what
// differs. The orchestrator in `crate::reconciler` decides what to do.

pub mod compare;
pub mod interfaces;

pub use compare::{HostDrift, ListDrift, compare, needs_update};
pub use interfaces::missing_interfaces;
