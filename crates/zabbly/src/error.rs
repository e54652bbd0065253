//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` into user-facing errors with
//! actionable help text and a stable exit code.

use miette::Diagnostic;
use thiserror::Error;

use zabbly_config::ConfigError;
use zabbly_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not connect to Zabbix server at {url}: {reason}")]
    #[diagnostic(
        code(zabbly::connection_failed),
        help(
            "Check that the frontend is reachable and serves api_jsonrpc.php.\n\
             Try: zabbly diff <host> --insecure"
        )
    )]
    ConnectionFailed { url: String, reason: String },

    #[error("TLS certificate verification failed for {url}")]
    #[diagnostic(
        code(zabbly::tls_error),
        help(
            "The frontend is using a certificate the system does not trust.\n\
             Use --insecure (-k) to accept it, or set ca_cert in your profile."
        )
    )]
    TlsError { url: String },

    // ── Authentication ───────────────────────────────────────────────
    #[error("Authentication failed: {message}")]
    #[diagnostic(
        code(zabbly::auth_failed),
        help(
            "Verify the username/password or API token.\n\
             Run: zabbly config set-password --profile {profile}"
        )
    )]
    AuthFailed { profile: String, message: String },

    #[error("No credentials configured for profile '{profile}'")]
    #[diagnostic(
        code(zabbly::no_credentials),
        help(
            "Store a secret with: zabbly config set-token --profile {profile}\n\
             Or set ZABBLY_API_TOKEN, or ZABBLY_USERNAME and ZABBLY_PASSWORD."
        )
    )]
    NoCredentials { profile: String },

    // ── Resources ────────────────────────────────────────────────────
    #[error("{resource_type} '{identifier}' not found")]
    #[diagnostic(code(zabbly::not_found), help("{hint}"))]
    NotFound {
        resource_type: String,
        identifier: String,
        hint: String,
    },

    // ── API ──────────────────────────────────────────────────────────
    #[error("API error{}: {message}", .code.map(|c| format!(" ({c})")).unwrap_or_default())]
    #[diagnostic(code(zabbly::api_error))]
    ApiError { code: Option<i64>, message: String },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(zabbly::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(zabbly::profile_not_found),
        help("Available profiles: {available}")
    )]
    ProfileNotFound { name: String, available: String },

    #[error("No Zabbix server configured")]
    #[diagnostic(
        code(zabbly::no_config),
        help(
            "Add a profile to {path}\n\
             or pass --server with --api-token (or --username and ZABBLY_PASSWORD)."
        )
    )]
    NoConfig { path: String },

    #[error("Configuration error: {message}")]
    #[diagnostic(code(zabbly::config))]
    Config { message: String },

    #[error("Keyring error: {message}")]
    #[diagnostic(
        code(zabbly::keyring),
        help("Fall back to ZABBLY_PASSWORD / ZABBLY_API_TOKEN if no keyring is available.")
    )]
    Keyring { message: String },

    // ── Timeout ──────────────────────────────────────────────────────
    #[error("Request timed out after {seconds}s")]
    #[diagnostic(
        code(zabbly::timeout),
        help("Increase the timeout with --timeout or check server responsiveness.")
    )]
    Timeout { seconds: u64 },

    // ── IO / Internal ────────────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    #[diagnostic(code(zabbly::internal))]
    Internal(String),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } | Self::TlsError { .. } => exit_code::CONNECTION,
            Self::AuthFailed { .. } | Self::NoCredentials { .. } => exit_code::AUTH,
            Self::NotFound { .. } | Self::ProfileNotFound { .. } => exit_code::NOT_FOUND,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::Validation { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }

    /// Attach the active profile name to errors that mention one.
    pub fn with_profile(self, name: &str) -> Self {
        match self {
            Self::AuthFailed { message, .. } => Self::AuthFailed {
                profile: name.into(),
                message,
            },
            other => other,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

fn not_found(resource_type: &str, identifier: String, hint: &str) -> CliError {
    CliError::NotFound {
        resource_type: resource_type.into(),
        identifier,
        hint: hint.into(),
    }
}

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ConnectionFailed { url, reason } if reason.starts_with("TLS error") => {
                CliError::TlsError { url }
            }
            CoreError::ConnectionFailed { url, reason } => CliError::ConnectionFailed { url, reason },

            CoreError::AuthenticationFailed { message } => CliError::AuthFailed {
                profile: "default".into(),
                message,
            },

            CoreError::Timeout { timeout_secs } => CliError::Timeout {
                seconds: timeout_secs,
            },

            CoreError::MissingGroup { name } => not_found(
                "host group",
                name,
                "Create it in the frontend, or pass --create-missing-groups.",
            ),
            CoreError::GroupCreationFailed { name } => not_found(
                "host group",
                name,
                "hostgroup.create returned but the group is still not visible; check permissions.",
            ),
            CoreError::MissingHost { hostname } => not_found(
                "host",
                hostname,
                "The host disappeared during the run; retry.",
            ),
            CoreError::ProxyNotFound { name } => not_found(
                "proxy",
                name,
                "Check the proxy name in Administration > Proxies.",
            ),

            CoreError::InvalidInterface { message } => CliError::Validation {
                field: "interface".into(),
                reason: message,
            },
            CoreError::InvalidHost { message } => CliError::Validation {
                field: "host".into(),
                reason: message,
            },
            CoreError::NoGroups { hostname } => CliError::Validation {
                field: "group".into(),
                reason: format!(
                    "host '{hostname}' needs at least one --group (or default_groups in the profile)"
                ),
            },
            CoreError::AmbiguousGroup { name, count } => CliError::Validation {
                field: "group".into(),
                reason: format!("'{name}' matches {count} host groups"),
            },

            CoreError::Api { message, code } => CliError::ApiError { code, message },
            CoreError::Config { message } => CliError::Config { message },
            CoreError::Internal(message) => CliError::Internal(message),
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            ConfigError::NoCredentials { profile } => CliError::NoCredentials { profile },
            ConfigError::UnknownProfile { name } => CliError::ProfileNotFound {
                name,
                available: String::new(),
            },
            ConfigError::Manifest { path, reason } => CliError::Validation {
                field: format!("manifest {}", path.display()),
                reason,
            },
            ConfigError::Keyring(e) => CliError::Keyring {
                message: e.to_string(),
            },
            ConfigError::Io(e) => CliError::Io(e),
            other @ (ConfigError::Serialization(_) | ConfigError::Figment(_)) => CliError::Config {
                message: other.to_string(),
            },
        }
    }
}
