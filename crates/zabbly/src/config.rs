//! CLI configuration: thin layer over `zabbly_config`.
//!
//! Picks the active profile and applies `GlobalOpts` overrides (--server,
//! --api-token, --username, --insecure, --timeout) on top of it.

use std::time::Duration;

use secrecy::SecretString;

use zabbly_config::{Config, Profile};
use zabbly_core::{AuthCredentials, HostDefaults, ServerConfig, TlsVerification};

use crate::cli::GlobalOpts;
use crate::error::CliError;

pub use zabbly_config::{config_path, load_config};

/// Everything a host command needs from configuration.
#[derive(Debug)]
pub struct Resolved {
    pub profile_name: String,
    pub server: ServerConfig,
    pub defaults: HostDefaults,
}

/// Resolve the active profile and flag overrides into a [`Resolved`].
///
/// Works without any config file when `--server` is given together with an
/// API token, or a username plus `ZABBLY_PASSWORD`.
pub fn resolve(global: &GlobalOpts) -> Result<Resolved, CliError> {
    let cfg = load_config()?;
    resolve_with(&cfg, global)
}

pub(crate) fn resolve_with(cfg: &Config, global: &GlobalOpts) -> Result<Resolved, CliError> {
    let profile_name = cfg.profile_name(global.profile.as_deref());

    let mut profile = match cfg.profiles.get(&profile_name) {
        Some(profile) => profile.clone(),
        None if global.server.is_some() => Profile::default(),
        None if global.profile.is_some() => {
            let mut available: Vec<&str> = cfg.profiles.keys().map(String::as_str).collect();
            available.sort_unstable();
            return Err(CliError::ProfileNotFound {
                name: profile_name,
                available: if available.is_empty() {
                    "(none)".into()
                } else {
                    available.join(", ")
                },
            });
        }
        None => {
            return Err(CliError::NoConfig {
                path: config_path().display().to_string(),
            });
        }
    };

    // Flag > env > profile
    if let Some(ref server) = global.server {
        profile.server.clone_from(server);
    }
    if global.username.is_some() {
        profile.username.clone_from(&global.username);
    }

    let url = zabbly_config::parse_server_url(&profile.server)?;
    let auth = resolve_auth(&profile, &profile_name, global)?;

    let tls = if global.insecure || profile.insecure.unwrap_or(cfg.defaults.insecure) {
        TlsVerification::DangerAcceptInvalid
    } else if let Some(ref ca_path) = profile.ca_cert {
        TlsVerification::CustomCa(ca_path.clone())
    } else {
        TlsVerification::SystemDefaults
    };

    let timeout = global
        .timeout
        .or(profile.timeout)
        .unwrap_or(cfg.defaults.timeout);

    Ok(Resolved {
        defaults: profile.host_defaults()?,
        server: ServerConfig {
            url,
            auth,
            tls,
            timeout: Duration::from_secs(timeout),
        },
        profile_name,
    })
}

/// `--api-token` wins; an explicit `--username` forces a login; otherwise the
/// profile's credential chain decides.
fn resolve_auth(
    profile: &Profile,
    profile_name: &str,
    global: &GlobalOpts,
) -> Result<AuthCredentials, CliError> {
    if let Some(ref token) = global.api_token {
        return Ok(AuthCredentials::ApiToken(SecretString::from(token.clone())));
    }
    if global.username.is_some() {
        let (username, password) = zabbly_config::resolve_login_credentials(profile, profile_name)?;
        return Ok(AuthCredentials::Credentials { username, password });
    }
    Ok(zabbly_config::resolve_auth(profile, profile_name)?)
}
