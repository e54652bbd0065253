//! Configuration for the zabbly CLI.
//!
//! TOML profiles, credential resolution (env + keyring + plaintext), host
//! manifests, and translation to `zabbly_core::ServerConfig`. The CLI layers
//! its global flags on top of what is resolved here.

mod manifest;

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use zabbly_core::{
    AuthCredentials, CoreError, HostDefaults, HostInterface, InterfaceSpec, ServerConfig,
    TlsVerification,
};

pub use manifest::{HostManifest, load_manifest};

/// Service name under which secrets are stored in the system keyring.
pub const KEYRING_SERVICE: &str = "zabbly";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no credentials configured for profile '{profile}'")]
    NoCredentials { profile: String },

    #[error("profile '{name}' not found in config")]
    UnknownProfile { name: String },

    #[error("invalid host manifest {}: {reason}", path.display())]
    Manifest { path: PathBuf, reason: String },

    #[error("keyring error: {0}")]
    Keyring(#[from] keyring::Error),

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Config {
    /// Default profile name.
    pub default_profile: Option<String>,

    /// Global defaults.
    #[serde(default)]
    pub defaults: Defaults,

    /// Named server profiles.
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: HashMap::new(),
        }
    }
}

impl Config {
    /// Name of the profile to use: the explicit choice, else the configured
    /// default, else `"default"`.
    pub fn profile_name(&self, requested: Option<&str>) -> String {
        requested
            .map(str::to_owned)
            .or_else(|| self.default_profile.clone())
            .unwrap_or_else(|| "default".into())
    }

    pub fn profile(&self, name: &str) -> Result<&Profile, ConfigError> {
        self.profiles
            .get(name)
            .ok_or_else(|| ConfigError::UnknownProfile { name: name.into() })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default)]
    pub insecure: bool,

    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            insecure: false,
            timeout: default_timeout(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_timeout() -> u64 {
    30
}

/// A named Zabbix server profile.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Profile {
    /// Frontend base URL (e.g., "https://zabbix.example.com").
    pub server: String,

    /// Username for `user.login`.
    pub username: Option<String>,

    /// Password (plaintext; prefer keyring).
    pub password: Option<String>,

    /// API token (plaintext; prefer keyring or env var).
    pub api_token: Option<String>,

    /// Environment variable name containing the API token.
    pub api_token_env: Option<String>,

    /// Path to custom CA certificate.
    pub ca_cert: Option<PathBuf>,

    /// Override insecure TLS setting.
    pub insecure: Option<bool>,

    /// Override timeout (seconds).
    pub timeout: Option<u64>,

    /// Groups used when a host names none.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub default_groups: Vec<String>,

    /// Templates used when a host names none.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub default_templates: Vec<String>,

    /// Proxy used when a host names none.
    pub proxy: Option<String>,

    /// Interfaces used when a host names none.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub default_interfaces: Vec<InterfaceSpec>,
}

impl Profile {
    /// Fallbacks for hosts that leave groups, templates, proxy or
    /// interfaces empty. Fails if a default interface is malformed.
    pub fn host_defaults(&self) -> Result<HostDefaults, CoreError> {
        let interfaces = self
            .default_interfaces
            .iter()
            .cloned()
            .map(HostInterface::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(HostDefaults {
            groups: self.default_groups.clone(),
            templates: self.default_templates.clone(),
            proxy: self.proxy.clone(),
            interfaces,
        })
    }
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("com", "zabbly", "zabbly").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("zabbly");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load config from `path` (missing file = defaults), then `ZABBLY_*` env.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    debug!(path = %path.display(), "loading config");
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("ZABBLY_").split("_"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, returning a default if the file doesn't exist.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<(), ConfigError> {
    save_config_to(cfg, &config_path())
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Keyring ─────────────────────────────────────────────────────────

/// Which secret a keyring entry holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecretKind {
    Password,
    ApiToken,
}

impl SecretKind {
    fn suffix(self) -> &'static str {
        match self {
            Self::Password => "password",
            Self::ApiToken => "api-token",
        }
    }
}

fn keyring_entry(profile_name: &str, kind: SecretKind) -> Result<keyring::Entry, keyring::Error> {
    keyring::Entry::new(KEYRING_SERVICE, &format!("{profile_name}/{}", kind.suffix()))
}

/// Store a secret for `profile_name` in the system keyring.
pub fn store_secret(profile_name: &str, kind: SecretKind, secret: &str) -> Result<(), ConfigError> {
    keyring_entry(profile_name, kind)?.set_password(secret)?;
    Ok(())
}

fn keyring_secret(profile_name: &str, kind: SecretKind) -> Option<SecretString> {
    match keyring_entry(profile_name, kind).and_then(|entry| entry.get_password()) {
        Ok(secret) => Some(SecretString::from(secret)),
        Err(e) => {
            debug!(profile = profile_name, kind = kind.suffix(), error = %e, "no keyring secret");
            None
        }
    }
}

// ── Credential resolution (without CLI flags) ───────────────────────

/// Resolve an API token from the credential chain (no CLI flag step).
///
/// `None` means the profile has no token and should log in instead.
pub fn resolve_api_token(profile: &Profile, profile_name: &str) -> Option<SecretString> {
    // 1. Profile's api_token_env → env var lookup
    if let Some(ref env_name) = profile.api_token_env {
        if let Ok(val) = std::env::var(env_name) {
            return Some(SecretString::from(val));
        }
    }

    // 2. System keyring
    if let Some(secret) = keyring_secret(profile_name, SecretKind::ApiToken) {
        return Some(secret);
    }

    // 3. Plaintext in config
    profile
        .api_token
        .as_ref()
        .map(|token| SecretString::from(token.clone()))
}

/// Resolve username + password for `user.login` without CLI flags.
pub fn resolve_login_credentials(
    profile: &Profile,
    profile_name: &str,
) -> Result<(String, SecretString), ConfigError> {
    let username = profile
        .username
        .clone()
        .or_else(|| std::env::var("ZABBLY_USERNAME").ok())
        .ok_or_else(|| ConfigError::NoCredentials {
            profile: profile_name.into(),
        })?;

    // 1. Env var
    if let Ok(pw) = std::env::var("ZABBLY_PASSWORD") {
        return Ok((username, SecretString::from(pw)));
    }

    // 2. Keyring
    if let Some(pw) = keyring_secret(profile_name, SecretKind::Password) {
        return Ok((username, pw));
    }

    // 3. Plaintext in config
    if let Some(ref pw) = profile.password {
        return Ok((username, SecretString::from(pw.clone())));
    }

    Err(ConfigError::NoCredentials {
        profile: profile_name.into(),
    })
}

/// API token if one resolves, else username/password.
pub fn resolve_auth(profile: &Profile, profile_name: &str) -> Result<AuthCredentials, ConfigError> {
    if let Some(token) = resolve_api_token(profile, profile_name) {
        return Ok(AuthCredentials::ApiToken(token));
    }
    let (username, password) = resolve_login_credentials(profile, profile_name)?;
    Ok(AuthCredentials::Credentials { username, password })
}

/// Parse a profile's `server` field.
pub fn parse_server_url(server: &str) -> Result<url::Url, ConfigError> {
    server.parse().map_err(|_| ConfigError::Validation {
        field: "server".into(),
        reason: format!("invalid URL: {server}"),
    })
}

/// Build a `ServerConfig` from a profile, without CLI flag overrides.
pub fn profile_to_server_config(
    profile: &Profile,
    profile_name: &str,
    defaults: &Defaults,
) -> Result<ServerConfig, ConfigError> {
    let url = parse_server_url(&profile.server)?;
    let auth = resolve_auth(profile, profile_name)?;

    let tls = if profile.insecure.unwrap_or(defaults.insecure) {
        TlsVerification::DangerAcceptInvalid
    } else if let Some(ref ca_path) = profile.ca_cert {
        TlsVerification::CustomCa(ca_path.clone())
    } else {
        TlsVerification::SystemDefaults
    };

    let timeout = Duration::from_secs(profile.timeout.unwrap_or(defaults.timeout));

    Ok(ServerConfig {
        url,
        auth,
        tls,
        timeout,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;
    use secrecy::ExposeSecret;

    use super::*;

    const SAMPLE: &str = r#"
default_profile = "prod"

[defaults]
timeout = 45

[profiles.prod]
server = "https://zabbix.example.com"
api_token = "plain-token"
ca_cert = "/etc/ssl/zabbix.pem"
default_groups = ["Linux servers"]
default_templates = ["Linux by Zabbix agent"]
proxy = "proxy-eu-1"

[[profiles.prod.default_interfaces]]
type = "agent"
dns = "agent.example.com"

[profiles.lab]
server = "https://zabbix.lab"
username = "Admin"
password = "zabbix"
insecure = true
timeout = 5
"#;

    fn sample() -> Config {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, SAMPLE).unwrap();
        load_config_from(&path).unwrap()
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = load_config_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(cfg.default_profile.as_deref(), Some("default"));
        assert_eq!(cfg.defaults.timeout, 30);
        assert_eq!(cfg.defaults.output, "table");
        assert!(cfg.profiles.is_empty());
    }

    #[test]
    fn file_overrides_defaults() {
        let cfg = sample();
        assert_eq!(cfg.profile_name(None), "prod");
        assert_eq!(cfg.profile_name(Some("lab")), "lab");
        assert_eq!(cfg.defaults.timeout, 45);
        assert_eq!(cfg.defaults.output, "table");

        let prod = cfg.profile("prod").unwrap();
        assert_eq!(
            prod.host_defaults().unwrap(),
            HostDefaults {
                groups: vec!["Linux servers".into()],
                templates: vec!["Linux by Zabbix agent".into()],
                proxy: Some("proxy-eu-1".into()),
                interfaces: vec![
                    HostInterface::by_dns(
                        zabbly_core::InterfaceType::Agent,
                        "agent.example.com",
                        "10050"
                    )
                    .unwrap()
                ],
            }
        );
        assert!(matches!(
            cfg.profile("nope"),
            Err(ConfigError::UnknownProfile { .. })
        ));
    }

    #[test]
    fn server_config_from_token_profile() {
        let cfg = sample();
        let server = profile_to_server_config(cfg.profile("prod").unwrap(), "prod", &cfg.defaults)
            .unwrap();

        assert_eq!(server.url.as_str(), "https://zabbix.example.com/");
        assert_eq!(server.timeout, Duration::from_secs(45));
        assert_eq!(
            server.tls,
            TlsVerification::CustomCa(PathBuf::from("/etc/ssl/zabbix.pem"))
        );
        assert!(matches!(server.auth, AuthCredentials::ApiToken(_)));
    }

    #[test]
    fn server_config_from_login_profile() {
        let cfg = sample();
        let server =
            profile_to_server_config(cfg.profile("lab").unwrap(), "lab", &cfg.defaults).unwrap();

        assert_eq!(server.tls, TlsVerification::DangerAcceptInvalid);
        assert_eq!(server.timeout, Duration::from_secs(5));
        match server.auth {
            AuthCredentials::Credentials { username, .. } => assert_eq!(username, "Admin"),
            AuthCredentials::ApiToken(_) => panic!("expected login credentials"),
        }
    }

    #[test]
    fn plaintext_token_is_last_resort() {
        let profile = Profile {
            server: "https://z".into(),
            api_token: Some("plain".into()),
            ..Profile::default()
        };
        let token = resolve_api_token(&profile, "zabbly-test-no-keyring").unwrap();
        assert_eq!(token.expose_secret(), "plain");
    }

    #[test]
    fn profile_without_any_secret_fails() {
        let profile = Profile {
            server: "https://z".into(),
            ..Profile::default()
        };
        assert!(matches!(
            resolve_login_credentials(&profile, "zabbly-test-no-keyring"),
            Err(ConfigError::NoCredentials { .. })
        ));
    }

    #[test]
    fn malformed_default_interface_is_rejected() {
        let profile = Profile {
            server: "https://z".into(),
            default_interfaces: vec![InterfaceSpec {
                interface_type: "agent".into(),
                useip: Some(true),
                ..InterfaceSpec::default()
            }],
            ..Profile::default()
        };
        assert!(matches!(
            profile.host_defaults(),
            Err(CoreError::InvalidInterface { .. })
        ));
    }

    #[test]
    fn bad_server_url_is_a_validation_error() {
        assert!(matches!(
            parse_server_url("not a url"),
            Err(ConfigError::Validation { ref field, .. }) if field == "server"
        ));
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut cfg = Config::default();
        cfg.profiles.insert(
            "default".into(),
            Profile {
                server: "https://zabbix.example.com".into(),
                username: Some("Admin".into()),
                default_groups: vec!["web".into()],
                ..Profile::default()
            },
        );
        save_config_to(&cfg, &path).unwrap();

        assert_eq!(load_config_from(&path).unwrap(), cfg);
    }
}
