// ── Domain model ──
//
// Desired-state input types, remote-state snapshots, and the identifiers
// that connect them.

pub mod host;
pub mod interface;
pub mod macros;
pub mod object_id;

pub use host::{DesiredHost, DesiredHostBuilder, HostDefaults, HostState};
pub use interface::{HostInterface, InterfaceSpec, InterfaceType};
pub use macros::{format_macros, normalize_macro_name};
pub use object_id::ObjectId;
