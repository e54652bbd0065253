// Zabbix API authentication
//
// `user.login` exchanges a username/password for a session token that is
// then sent as a bearer token on every call; `user.logout` invalidates it.
// API tokens skip both steps (see `ZabbixClient::with_api_token`).

use secrecy::{ExposeSecret, SecretString};
use serde_json::json;
use tracing::debug;

use crate::client::ZabbixClient;
use crate::error::Error;

impl ZabbixClient {
    /// Authenticate with username/password.
    ///
    /// On success the session token is stored on the client and used for all
    /// subsequent calls. Any RPC-level failure here is reported as
    /// [`Error::Authentication`].
    pub async fn login(&self, username: &str, password: &SecretString) -> Result<(), Error> {
        debug!(username, "logging in");

        let params = json!({
            "username": username,
            "password": password.expose_secret(),
        });

        let token: String = self
            .call_anonymous("user.login", &params)
            .await
            .map_err(|e| match e {
                Error::Rpc { message, data, .. } => Error::Authentication {
                    message: data.unwrap_or(message),
                },
                other => other,
            })?;

        self.set_token(SecretString::from(token));
        debug!("login successful");
        Ok(())
    }

    /// End the current session. The stored token is dropped even if the
    /// server call fails.
    pub async fn logout(&self) -> Result<(), Error> {
        debug!("logging out");
        let result = self.send("user.logout", &json!([]), true).await;
        self.clear_token();
        result.map(|_| ())
    }

    /// Server API version (`apiinfo.version`), e.g. `"6.4.12"`.
    pub async fn api_version(&self) -> Result<String, Error> {
        self.call_anonymous("apiinfo.version", &json!([])).await
    }
}
