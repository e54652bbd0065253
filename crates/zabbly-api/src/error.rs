use thiserror::Error;

/// Top-level error type for the `zabbly-api` crate.
///
/// Covers every failure mode of a JSON-RPC round trip: authentication,
/// transport, server-side RPC errors, and malformed responses.
/// `zabbly-core` maps these into reconciliation-level diagnostics.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// Login failed, or the session/API token was rejected.
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    /// An authenticated method was called before `login()` or a token was set.
    #[error("Not logged in -- call login() or configure an API token first")]
    NotLoggedIn,

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Request timed out.
    #[error("Request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    /// TLS handshake or certificate error.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── JSON-RPC ────────────────────────────────────────────────────
    /// Error object returned by the server (`{"error": {code, message, data}}`),
    /// or a non-success HTTP status on the RPC endpoint.
    #[error("{method} failed ({code}): {message}{}", detail_suffix(.data))]
    Rpc {
        method: String,
        code: i64,
        message: String,
        data: Option<String>,
    },

    // ── Data ────────────────────────────────────────────────────────
    /// A request params struct could not be encoded as JSON.
    #[error("Request encoding failed: {0}")]
    Encoding(#[from] serde_json::Error),

    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

#[allow(clippy::ref_option)]
fn detail_suffix(data: &Option<String>) -> String {
    data.as_deref()
        .filter(|d| !d.is_empty())
        .map(|d| format!(" -- {d}"))
        .unwrap_or_default()
}

impl Error {
    /// Returns `true` if this error indicates auth has expired
    /// and re-authentication might resolve it.
    pub fn is_auth_expired(&self) -> bool {
        matches!(self, Self::Authentication { .. } | Self::NotLoggedIn)
    }

    /// Returns `true` if this is a transient network-level failure.
    ///
    /// Nothing in the reconciliation path retries; this is informational.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            Self::Timeout { .. } => true,
            _ => false,
        }
    }

    /// The JSON-RPC error code, if this came from the server.
    pub fn rpc_code(&self) -> Option<i64> {
        match self {
            Self::Rpc { code, .. } => Some(*code),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rpc_error_includes_data_when_present() {
        let err = Error::Rpc {
            method: "host.create".into(),
            code: -32602,
            message: "Invalid params.".into(),
            data: Some("Host with the same name \"web01\" already exists.".into()),
        };
        let text = err.to_string();
        assert!(text.starts_with("host.create failed (-32602): Invalid params."));
        assert!(text.contains("already exists"));
    }

    #[test]
    fn rpc_error_without_data() {
        let err = Error::Rpc {
            method: "host.get".into(),
            code: -32500,
            message: "Application error.".into(),
            data: None,
        };
        assert_eq!(err.to_string(), "host.get failed (-32500): Application error.");
        assert_eq!(err.rpc_code(), Some(-32500));
        assert!(!err.is_transient());
    }
}
