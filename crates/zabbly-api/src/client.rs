// Zabbix JSON-RPC client
//
// Wraps `reqwest::Client` with endpoint construction, the JSON-RPC 2.0
// envelope, bearer-token injection, and error-object unwrapping.
// Authentication flows live in `auth.rs` as inherent methods.

use std::sync::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};

use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use tracing::{debug, trace};
use url::Url;

use crate::error::Error;
use crate::models::{RpcEnvelope, RpcReply};
use crate::transport::TransportConfig;

const RPC_PATH: &str = "api_jsonrpc.php";

/// Substrings of Zabbix error payloads that mean the token was rejected.
const AUTH_FAILURE_MARKERS: &[&str] = &[
    "Not authorized",
    "Not authorised",
    "Session terminated",
    "re-login",
    "Incorrect user name or password",
    "Login name or password is incorrect",
];

/// Raw HTTP client for the Zabbix JSON-RPC API.
///
/// Every call is a `POST` to `{server}/api_jsonrpc.php`. Methods return the
/// unwrapped `result` member -- the envelope is stripped before the caller
/// sees it, and an `error` member becomes [`Error::Rpc`].
pub struct ZabbixClient {
    http: reqwest::Client,
    endpoint: Url,
    timeout_secs: u64,
    /// Session token from `user.login`, or a pre-issued API token.
    token: RwLock<Option<SecretString>>,
    next_id: AtomicU64,
}

impl ZabbixClient {
    /// Create a new client from a `TransportConfig`.
    ///
    /// `server` is the frontend root (e.g. `https://zabbix.example.com` or
    /// `https://example.com/zabbix`); a URL that already ends in
    /// `api_jsonrpc.php` is used as-is.
    pub fn new(server: &Url, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        let mut client = Self::with_client(http, server)?;
        client.timeout_secs = transport.timeout_secs();
        Ok(client)
    }

    /// Create a client with a pre-built `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, server: &Url) -> Result<Self, Error> {
        Ok(Self {
            http,
            endpoint: rpc_endpoint(server)?,
            timeout_secs: 0,
            token: RwLock::new(None),
            next_id: AtomicU64::new(1),
        })
    }

    /// Use a pre-issued API token instead of a login session.
    pub fn with_api_token(self, token: SecretString) -> Self {
        self.set_token(token);
        self
    }

    /// The JSON-RPC endpoint every call is posted to.
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Whether a session or API token is currently held.
    pub fn is_authenticated(&self) -> bool {
        self.token.read().expect("token lock poisoned").is_some()
    }

    // ── Token management ─────────────────────────────────────────────

    pub(crate) fn set_token(&self, token: SecretString) {
        debug!("storing auth token");
        *self.token.write().expect("token lock poisoned") = Some(token);
    }

    pub(crate) fn clear_token(&self) {
        *self.token.write().expect("token lock poisoned") = None;
    }

    // ── Calls ────────────────────────────────────────────────────────

    /// Call an authenticated method and deserialize its `result`.
    pub async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        params: &serde_json::Value,
    ) -> Result<T, Error> {
        let result = self.send(method, params, true).await?;
        decode(method, result)
    }

    /// Call a method that must be sent without credentials
    /// (`user.login`, `apiinfo.version`).
    pub(crate) async fn call_anonymous<T: DeserializeOwned>(
        &self,
        method: &str,
        params: &serde_json::Value,
    ) -> Result<T, Error> {
        let result = self.send(method, params, false).await?;
        decode(method, result)
    }

    /// Post one JSON-RPC request and return the raw `result` member.
    ///
    /// A reply without `result` (or with `"result": null`) yields `Value::Null`.
    pub(crate) async fn send(
        &self,
        method: &str,
        params: &serde_json::Value,
        authenticated: bool,
    ) -> Result<serde_json::Value, Error> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let envelope = RpcEnvelope {
            jsonrpc: "2.0",
            method,
            params,
            id,
        };

        debug!(method, id, "POST {}", self.endpoint);
        trace!(%params, "request params");

        let mut builder = self
            .http
            .post(self.endpoint.clone())
            .header(reqwest::header::CONTENT_TYPE, "application/json-rpc")
            .json(&envelope);

        if authenticated {
            let guard = self.token.read().expect("token lock poisoned");
            let token = guard.as_ref().ok_or(Error::NotLoggedIn)?;
            builder = builder.bearer_auth(token.expose_secret());
        }

        let resp = builder.send().await.map_err(|e| self.map_send_error(e))?;
        self.parse_reply(method, resp).await
    }

    fn map_send_error(&self, err: reqwest::Error) -> Error {
        if err.is_timeout() {
            Error::Timeout {
                timeout_secs: self.timeout_secs,
            }
        } else {
            Error::Transport(err)
        }
    }

    /// Check the HTTP status, then unwrap `{result}` or map `{error}`.
    async fn parse_reply(
        &self,
        method: &str,
        resp: reqwest::Response,
    ) -> Result<serde_json::Value, Error> {
        let status = resp.status();

        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN
        {
            return Err(Error::Authentication {
                message: format!("{method} rejected (HTTP {status})"),
            });
        }

        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Rpc {
                method: method.to_owned(),
                code: i64::from(status.as_u16()),
                message: format!("HTTP {status}"),
                data: Some(preview(&body)),
            });
        }

        let body = resp.text().await.map_err(|e| self.map_send_error(e))?;

        let reply: RpcReply = serde_json::from_str(&body).map_err(|e| Error::Deserialization {
            message: format!("{e} (body preview: {:?})", preview(&body)),
            body: body.clone(),
        })?;

        if let Some(err) = reply.error {
            let detail = err.data.as_deref().unwrap_or_default();
            if is_auth_failure(&err.message) || is_auth_failure(detail) {
                return Err(Error::Authentication {
                    message: if detail.is_empty() {
                        err.message
                    } else {
                        detail.to_owned()
                    },
                });
            }
            return Err(Error::Rpc {
                method: method.to_owned(),
                code: err.code,
                message: err.message,
                data: err.data,
            });
        }

        Ok(reply.result.unwrap_or(serde_json::Value::Null))
    }
}

/// Resolve `{server}/api_jsonrpc.php`, keeping any sub-path the frontend lives under.
fn rpc_endpoint(server: &Url) -> Result<Url, Error> {
    if server.path().ends_with(RPC_PATH) {
        return Ok(server.clone());
    }
    let base = server.as_str().trim_end_matches('/');
    Ok(Url::parse(&format!("{base}/{RPC_PATH}"))?)
}

fn decode<T: DeserializeOwned>(method: &str, value: serde_json::Value) -> Result<T, Error> {
    serde_json::from_value(value.clone()).map_err(|e| Error::Deserialization {
        message: format!("unexpected {method} result: {e}"),
        body: value.to_string(),
    })
}

fn is_auth_failure(text: &str) -> bool {
    AUTH_FAILURE_MARKERS.iter().any(|m| text.contains(m))
}

fn preview(body: &str) -> String {
    body.chars().take(200).collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_appends_rpc_path() {
        let url = Url::parse("https://zabbix.example.com").unwrap();
        assert_eq!(
            rpc_endpoint(&url).unwrap().as_str(),
            "https://zabbix.example.com/api_jsonrpc.php"
        );
    }

    #[test]
    fn endpoint_keeps_subpath() {
        let url = Url::parse("https://example.com/zabbix/").unwrap();
        assert_eq!(
            rpc_endpoint(&url).unwrap().as_str(),
            "https://example.com/zabbix/api_jsonrpc.php"
        );
    }

    #[test]
    fn endpoint_already_complete() {
        let url = Url::parse("https://example.com/zabbix/api_jsonrpc.php").unwrap();
        assert_eq!(rpc_endpoint(&url).unwrap(), url);
    }

    #[test]
    fn auth_markers() {
        assert!(is_auth_failure("Session terminated, re-login, please."));
        assert!(is_auth_failure("Not authorized."));
        assert!(!is_auth_failure("Host with the same name already exists."));
    }
}
