//! Host reconciliation engine on top of `zabbly-api`.
//!
//! Given the desired configuration of one monitored host, this crate makes
//! the Zabbix server agree with it, creating or updating the host as needed
//! and doing nothing when it already matches:
//!
//! - **[`HostReconciler`]** - The orchestrator. [`plan()`](HostReconciler::plan)
//!   looks the host up and decides between create, update and no-op without
//!   writing anything; [`ensure()`](HostReconciler::ensure) carries the plan
//!   out. Generic over [`zabbly_api::MonitoringApi`], so any request/response
//!   backend can drive it.
//!
//! - **Resolvers** ([`resolve`]) - Turn group, template and proxy names into
//!   server ids. Missing groups can be created on demand; unmatched
//!   templates are skipped with a warning.
//!
//! - **Diffing** ([`reconcile`]) - [`compare`] reports every field-level
//!   drift between server and desired state; [`missing_interfaces`] decides
//!   which interfaces must be created, keyed on `(type, port)`. Reconciliation
//!   is additive: nothing on the server is ever deleted.
//!
//! - **[`Session`]** - One authenticated connection per run, released on
//!   every exit path by [`ensure_host`] / [`plan_host`].
//!
//! - **Domain model** ([`model`]) - [`DesiredHost`] (validated at build time),
//!   [`HostInterface`], [`HostState`] and [`ObjectId`].

pub mod config;
pub mod error;
pub mod model;
pub mod reconcile;
pub mod reconciler;
pub mod resolve;
pub mod session;

#[cfg(test)]
mod testing;

// ── Primary re-exports ──────────────────────────────────────────────
pub use config::{AuthCredentials, ServerConfig, TlsVerification};
pub use error::CoreError;
pub use reconcile::{HostDrift, ListDrift, compare, missing_interfaces, needs_update};
pub use reconciler::{HostReconciler, Outcome, Plan};
pub use session::{Session, ensure_host, plan_host};

pub use model::{
    DesiredHost, DesiredHostBuilder, HostDefaults, HostInterface, HostState, InterfaceSpec,
    InterfaceType, ObjectId, format_macros, normalize_macro_name,
};
