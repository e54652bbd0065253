// ── Runtime connection configuration ──
//
// These types describe *how* to reach a Zabbix server. They carry
// credential data and connection tuning, but never touch disk.
// The CLI constructs a `ServerConfig` and hands it in.

use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;
use url::Url;

/// How to authenticate with the server.
#[derive(Debug, Clone)]
pub enum AuthCredentials {
    /// Pre-issued API token (no login/logout round trip).
    ApiToken(SecretString),
    /// `user.login` session, logged out when the run ends.
    Credentials {
        username: String,
        password: SecretString,
    },
}

/// TLS verification strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// System CA store (strict).
    #[default]
    SystemDefaults,
    /// Custom CA certificate file.
    CustomCa(PathBuf),
    /// Skip verification (self-signed frontends).
    DangerAcceptInvalid,
}

/// Configuration for connecting to a single Zabbix server.
///
/// Built by the CLI, passed to `Session::open` -- core never reads config files.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Frontend URL (e.g., `https://zabbix.example.com`).
    pub url: Url,
    /// Authentication method and credentials.
    pub auth: AuthCredentials,
    /// TLS verification strategy.
    pub tls: TlsVerification,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl ServerConfig {
    pub(crate) fn transport(&self) -> zabbly_api::TransportConfig {
        let tls = match &self.tls {
            TlsVerification::SystemDefaults => zabbly_api::TlsMode::System,
            TlsVerification::CustomCa(path) => zabbly_api::TlsMode::CustomCa(path.clone()),
            TlsVerification::DangerAcceptInvalid => zabbly_api::TlsMode::DangerAcceptInvalid,
        };
        zabbly_api::TransportConfig {
            tls,
            timeout: self.timeout,
        }
    }
}
