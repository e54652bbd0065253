//! Clap derive structures for the `zabbly` CLI.
//!
//! Defines the command tree, global flags, and shared types. Also compiled
//! by `build.rs` for man pages, so only clap and the standard library may be
//! used here.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// zabbly -- idempotent host provisioning for Zabbix
#[derive(Debug, Parser)]
#[command(
    name = "zabbly",
    version,
    about = "Ensure hosts are configured in a Zabbix server",
    long_about = "Reconciles one monitored host against a Zabbix server.\n\n\
        Creates the host when it is missing, links groups and templates,\n\
        adds missing interfaces, and does nothing when the host already\n\
        matches. Nothing on the server is ever deleted.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Server profile to use
    #[arg(long, short = 'p', env = "ZABBLY_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Zabbix frontend URL (overrides profile)
    #[arg(long, short = 's', env = "ZABBLY_SERVER", global = true)]
    pub server: Option<String>,

    /// Username for user.login (overrides profile)
    #[arg(long, short = 'u', env = "ZABBLY_USERNAME", global = true)]
    pub username: Option<String>,

    /// API token (skips login/logout)
    #[arg(long, env = "ZABBLY_API_TOKEN", global = true, hide_env = true)]
    pub api_token: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "ZABBLY_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Accept self-signed TLS certificates
    #[arg(long, short = 'k', env = "ZABBLY_INSECURE", global = true)]
    pub insecure: bool,

    /// Request timeout in seconds (overrides profile)
    #[arg(long, env = "ZABBLY_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable summary (default)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Create or update a host so it matches the given configuration
    #[command(alias = "apply")]
    Ensure(HostArgs),

    /// Show what `ensure` would change, without writing anything
    #[command(alias = "plan")]
    Diff(HostArgs),

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Host description ─────────────────────────────────────────────────

/// Desired state of one host, from flags and/or a manifest file.
#[derive(Debug, Args)]
pub struct HostArgs {
    /// Technical host name (taken from --from-file when omitted)
    #[arg(required_unless_present = "from_file")]
    pub hostname: Option<String>,

    /// Host group (repeatable; falls back to the profile's default_groups)
    #[arg(long = "group", short = 'g', value_name = "GROUP")]
    pub groups: Vec<String>,

    /// Template to link (repeatable; falls back to default_templates)
    #[arg(long = "template", short = 't', value_name = "TEMPLATE")]
    pub templates: Vec<String>,

    /// Interface, e.g. `type=agent,ip=10.0.0.5,port=10050,main=true`
    ///
    /// Keys: type (agent|snmp|ipmi|jmx), ip, dns, port, main, useip.
    /// Repeatable.
    #[arg(long = "interface", short = 'i', value_name = "SPEC")]
    pub interfaces: Vec<String>,

    /// User macro as KEY=VALUE (repeatable); KEY becomes {$KEY}
    #[arg(long = "macro", short = 'm', value_name = "KEY=VALUE", value_parser = parse_key_value)]
    pub macros: Vec<(String, String)>,

    /// Monitor through this proxy (overrides the profile's proxy)
    #[arg(long)]
    pub proxy: Option<String>,

    /// Create host groups that do not exist yet
    #[arg(long)]
    pub create_missing_groups: bool,

    /// Read the host description from a TOML manifest
    #[arg(long, short = 'f', value_name = "FILE")]
    pub from_file: Option<PathBuf>,
}

fn parse_key_value(raw: &str) -> Result<(String, String), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{raw}'"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("empty macro name in '{raw}'"));
    }
    Ok((key.to_owned(), value.to_owned()))
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  CONFIG
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Print the config file path
    Path,

    /// Display current configuration (secrets redacted)
    Show,

    /// Make a profile the default
    Use {
        /// Profile name
        name: String,
    },

    /// Store a login password in the system keyring
    SetPassword {
        /// Profile name
        #[arg(long)]
        profile: Option<String>,
    },

    /// Store an API token in the system keyring
    SetToken {
        /// Profile name
        #[arg(long)]
        profile: Option<String>,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  COMPLETIONS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
