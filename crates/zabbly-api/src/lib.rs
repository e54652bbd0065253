// zabbly-api: Async Rust client for the Zabbix JSON-RPC API

pub mod api;
pub mod auth;
pub mod client;
pub mod error;
pub mod models;
pub mod requests;
pub mod transport;

pub use api::MonitoringApi;
pub use client::ZabbixClient;
pub use error::Error;
pub use requests::ApiRequest;
pub use transport::{TlsMode, TransportConfig};
