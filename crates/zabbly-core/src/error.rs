// ── Core error types ──
//
// Errors surfaced by the reconciliation engine. Every variant terminates
// the run; nothing here is retried or rolled back. The
// `From<zabbly_api::Error>` impl translates transport-layer failures into
// domain-appropriate variants.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Input errors ─────────────────────────────────────────────────
    #[error("Invalid interface: {message}")]
    InvalidInterface { message: String },

    #[error("Invalid host definition: {message}")]
    InvalidHost { message: String },

    #[error("No host groups supplied for host '{hostname}' and no default groups configured")]
    NoGroups { hostname: String },

    // ── Lookup errors ────────────────────────────────────────────────
    #[error("Host group '{name}' not found")]
    MissingGroup { name: String },

    #[error("Host group '{name}' is ambiguous: {count} groups match")]
    AmbiguousGroup { name: String, count: usize },

    #[error("Host group '{name}' still missing after hostgroup.create")]
    GroupCreationFailed { name: String },

    #[error("Host '{hostname}' not found")]
    MissingHost { hostname: String },

    #[error("Proxy '{name}' not found")]
    ProxyNotFound { name: String },

    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot connect to Zabbix server at {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    #[error("Zabbix server request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    // ── API errors (wrapped, not exposed raw) ────────────────────────
    #[error("API error: {message}")]
    Api {
        message: String,
        /// JSON-RPC error code (or HTTP status), if the server supplied one.
        code: Option<i64>,
    },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<zabbly_api::Error> for CoreError {
    fn from(err: zabbly_api::Error) -> Self {
        match err {
            zabbly_api::Error::Authentication { message } => {
                CoreError::AuthenticationFailed { message }
            }
            zabbly_api::Error::NotLoggedIn => CoreError::AuthenticationFailed {
                message: "no session or API token".into(),
            },
            zabbly_api::Error::Transport(ref e) => {
                if e.is_timeout() {
                    CoreError::Timeout { timeout_secs: 0 }
                } else if e.is_connect() {
                    CoreError::ConnectionFailed {
                        url: e
                            .url()
                            .map(ToString::to_string)
                            .unwrap_or_else(|| "<unknown>".into()),
                        reason: e.to_string(),
                    }
                } else {
                    CoreError::Api {
                        message: e.to_string(),
                        code: e.status().map(|s| i64::from(s.as_u16())),
                    }
                }
            }
            zabbly_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            zabbly_api::Error::Timeout { timeout_secs } => CoreError::Timeout { timeout_secs },
            zabbly_api::Error::Tls(msg) => CoreError::ConnectionFailed {
                url: String::new(),
                reason: format!("TLS error: {msg}"),
            },
            err @ zabbly_api::Error::Rpc { .. } => {
                let code = err.rpc_code();
                CoreError::Api {
                    message: err.to_string(),
                    code,
                }
            }
            zabbly_api::Error::Encoding(e) => {
                CoreError::Internal(format!("request encoding failed: {e}"))
            }
            zabbly_api::Error::Deserialization { message, body: _ } => {
                CoreError::Internal(format!("Deserialization error: {message}"))
            }
        }
    }
}

impl CoreError {
    /// Whether the error names an entity that does not exist remotely.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::MissingGroup { .. }
                | Self::GroupCreationFailed { .. }
                | Self::MissingHost { .. }
                | Self::ProxyNotFound { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rpc_errors_keep_code_and_method() {
        let err = CoreError::from(zabbly_api::Error::Rpc {
            method: "host.update".into(),
            code: -32602,
            message: "Invalid params.".into(),
            data: Some("No permissions to referred object".into()),
        });
        match err {
            CoreError::Api { message, code } => {
                assert_eq!(code, Some(-32602));
                assert!(message.contains("host.update"));
                assert!(message.contains("No permissions"));
            }
            other => panic!("expected Api, got {other:?}"),
        }
    }

    #[test]
    fn not_found_classification() {
        assert!(
            CoreError::MissingHost {
                hostname: "web01".into()
            }
            .is_not_found()
        );
        assert!(
            !CoreError::NoGroups {
                hostname: "web01".into()
            }
            .is_not_found()
        );
    }
}
