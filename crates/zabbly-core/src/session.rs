// ── Scoped server connection ──
//
// One `Session` per run. Opening authenticates; `close()` ends the login
// session. `ensure_host` / `plan_host` wrap a run so `close()` is reached
// on every exit path, and a failed logout never replaces the run's result.

use tracing::{debug, info, warn};

use zabbly_api::ZabbixClient;

use crate::config::{AuthCredentials, ServerConfig};
use crate::error::CoreError;
use crate::model::DesiredHost;
use crate::reconciler::{HostReconciler, Outcome, Plan};

/// An authenticated connection to one server.
///
/// Logout is guaranteed only on the `Result` paths of [`ensure_host`] and
/// [`plan_host`]. A panic or a dropped future skips `user.logout`; `Drop`
/// then only logs a warning and the server session expires on its own.
pub struct Session {
    client: ZabbixClient,
    /// Set while a `user.login` session is held that we must log out of.
    logged_in: bool,
}

impl Session {
    /// Connect and authenticate.
    ///
    /// Username/password credentials log in; an API token is attached to the
    /// client without any round trip.
    pub async fn open(config: &ServerConfig) -> Result<Self, CoreError> {
        let client = ZabbixClient::new(&config.url, &config.transport())
            .map_err(|e| with_url(e.into(), config))?;

        match &config.auth {
            AuthCredentials::ApiToken(token) => {
                debug!(server = %config.url, "using API token");
                Ok(Self {
                    client: client.with_api_token(token.clone()),
                    logged_in: false,
                })
            }
            AuthCredentials::Credentials { username, password } => {
                client
                    .login(username, password)
                    .await
                    .map_err(|e| with_url(e.into(), config))?;
                info!(server = %config.url, username = username.as_str(), "logged in");
                Ok(Self {
                    client,
                    logged_in: true,
                })
            }
        }
    }

    pub fn api(&self) -> &ZabbixClient {
        &self.client
    }

    /// End the session. A logout failure is logged, never returned.
    pub async fn close(mut self) {
        if !self.logged_in {
            return;
        }
        self.logged_in = false;
        match self.client.logout().await {
            Ok(()) => debug!("logged out"),
            Err(e) => warn!(error = %e, "logout failed; the server session will expire on its own"),
        }
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        if self.logged_in {
            warn!("session dropped without logout");
        }
    }
}

/// Open a session, converge `desired`, close the session.
pub async fn ensure_host(config: &ServerConfig, desired: &DesiredHost) -> Result<Outcome, CoreError> {
    let session = Session::open(config).await?;
    let result = HostReconciler::new(session.api()).ensure(desired).await;
    session.close().await;
    result.map_err(|e| with_url(e, config))
}

/// Open a session, compute the plan for `desired`, close the session.
pub async fn plan_host(config: &ServerConfig, desired: &DesiredHost) -> Result<Plan, CoreError> {
    let session = Session::open(config).await?;
    let result = HostReconciler::new(session.api()).plan(desired).await;
    session.close().await;
    result.map_err(|e| with_url(e, config))
}

/// Fill in the server URL where the transport layer could not supply it.
fn with_url(err: CoreError, config: &ServerConfig) -> CoreError {
    match err {
        CoreError::ConnectionFailed { url, reason } if url.is_empty() || url == "<unknown>" => {
            CoreError::ConnectionFailed {
                url: config.url.to_string(),
                reason,
            }
        }
        other => other,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use secrecy::SecretString;
    use url::Url;

    use super::*;
    use crate::config::TlsVerification;

    fn config() -> ServerConfig {
        ServerConfig {
            url: Url::parse("https://zabbix.example.com").unwrap(),
            auth: AuthCredentials::ApiToken(SecretString::from("t".to_owned())),
            tls: TlsVerification::SystemDefaults,
            timeout: Duration::from_secs(5),
        }
    }

    #[test]
    fn connection_errors_gain_the_server_url() {
        let err = with_url(
            CoreError::ConnectionFailed {
                url: String::new(),
                reason: "TLS error: bad cert".into(),
            },
            &config(),
        );
        assert!(matches!(
            err,
            CoreError::ConnectionFailed { ref url, .. } if url == "https://zabbix.example.com/"
        ));
    }

    #[test]
    fn other_errors_pass_through() {
        let err = with_url(CoreError::MissingHost { hostname: "h".into() }, &config());
        assert!(matches!(err, CoreError::MissingHost { .. }));
    }
}
