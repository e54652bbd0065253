//! Config subcommand handlers.

use std::fmt::Write as _;

use zabbly_config::{Config, SecretKind};

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config;
use crate::error::CliError;
use crate::output;

// ── Helpers ─────────────────────────────────────────────────────────

/// Render config as TOML-ish text with secrets masked.
fn format_config_redacted(cfg: &Config) -> String {
    let mut out = String::new();

    if let Some(ref default) = cfg.default_profile {
        let _ = writeln!(out, "default_profile = \"{default}\"");
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "[defaults]");
    let _ = writeln!(out, "output = \"{}\"", cfg.defaults.output);
    let _ = writeln!(out, "insecure = {}", cfg.defaults.insecure);
    let _ = writeln!(out, "timeout = {}", cfg.defaults.timeout);

    let mut names: Vec<_> = cfg.profiles.keys().collect();
    names.sort();
    for name in names {
        let p = &cfg.profiles[name];
        let _ = writeln!(out);
        let _ = writeln!(out, "[profiles.{name}]");
        let _ = writeln!(out, "server = \"{}\"", p.server);
        if let Some(ref u) = p.username {
            let _ = writeln!(out, "username = \"{u}\"");
        }
        if p.password.is_some() {
            let _ = writeln!(out, "password = \"****\"");
        }
        if p.api_token.is_some() {
            let _ = writeln!(out, "api_token = \"****\"");
        }
        if let Some(ref env) = p.api_token_env {
            let _ = writeln!(out, "api_token_env = \"{env}\"");
        }
        if let Some(ref ca) = p.ca_cert {
            let _ = writeln!(out, "ca_cert = \"{}\"", ca.display());
        }
        if let Some(insecure) = p.insecure {
            let _ = writeln!(out, "insecure = {insecure}");
        }
        if let Some(timeout) = p.timeout {
            let _ = writeln!(out, "timeout = {timeout}");
        }
        if !p.default_groups.is_empty() {
            let _ = writeln!(out, "default_groups = {:?}", p.default_groups);
        }
        if !p.default_templates.is_empty() {
            let _ = writeln!(out, "default_templates = {:?}", p.default_templates);
        }
        if let Some(ref proxy) = p.proxy {
            let _ = writeln!(out, "proxy = \"{proxy}\"");
        }
    }

    out
}

/// Read a secret from the terminal without echo and store it in the keyring.
fn store_prompted_secret(profile_name: &str, kind: SecretKind, label: &str) -> Result<(), CliError> {
    let secret = rpassword::prompt_password(format!("{label} for '{profile_name}': "))?;
    if secret.is_empty() {
        return Err(CliError::Validation {
            field: label.to_lowercase(),
            reason: "cannot be empty".into(),
        });
    }
    zabbly_config::store_secret(profile_name, kind, &secret)?;
    eprintln!("{label} stored in system keyring for profile '{profile_name}'");
    Ok(())
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Path => {
            output::print_output(&config::config_path().display().to_string(), global.quiet);
            Ok(())
        }

        ConfigCommand::Show => {
            let cfg = config::load_config()?;
            output::print_output(&format_config_redacted(&cfg), global.quiet);
            Ok(())
        }

        ConfigCommand::Use { name } => {
            let mut cfg = config::load_config()?;
            cfg.profile(&name)?;
            cfg.default_profile = Some(name.clone());
            zabbly_config::save_config(&cfg)?;
            eprintln!("Default profile set to '{name}'");
            Ok(())
        }

        ConfigCommand::SetPassword { profile } => {
            let cfg = config::load_config()?;
            let name = cfg.profile_name(profile.as_deref().or(global.profile.as_deref()));
            store_prompted_secret(&name, SecretKind::Password, "Password")
        }

        ConfigCommand::SetToken { profile } => {
            let cfg = config::load_config()?;
            let name = cfg.profile_name(profile.as_deref().or(global.profile.as_deref()));
            store_prompted_secret(&name, SecretKind::ApiToken, "API token")
        }
    }
}

#[cfg(test)]
mod tests {
    use zabbly_config::Profile;

    use super::*;

    #[test]
    fn secrets_are_masked() {
        let mut cfg = Config::default();
        cfg.profiles.insert(
            "prod".into(),
            Profile {
                server: "https://zabbix.example.com".into(),
                username: Some("Admin".into()),
                password: Some("hunter2".into()),
                api_token: Some("abc123".into()),
                default_groups: vec!["Linux servers".into()],
                ..Profile::default()
            },
        );

        let text = format_config_redacted(&cfg);
        assert!(text.contains("[profiles.prod]"));
        assert!(text.contains("username = \"Admin\""));
        assert!(text.contains("password = \"****\""));
        assert!(text.contains("default_groups = [\"Linux servers\"]"));
        assert!(!text.contains("hunter2"));
        assert!(!text.contains("abc123"));
    }
}
