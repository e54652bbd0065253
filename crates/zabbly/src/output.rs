//! Output formatting: table, JSON, YAML, plain.
//!
//! Renders results in the format selected by `--output`. The table format is
//! a human summary (with `tabled` for interface listings), structured formats
//! use serde, plain emits one identifier per line.

use std::io::{self, IsTerminal, Write};

use owo_colors::OwoColorize;
use tabled::{Table, Tabled, settings::Style};

use zabbly_core::HostInterface;

use crate::cli::{ColorMode, OutputFormat};

// ── Color helpers ────────────────────────────────────────────────────

/// Determine whether color output should be enabled.
pub fn should_color(mode: &ColorMode) -> bool {
    match mode {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => io::stdout().is_terminal() && std::env::var("NO_COLOR").is_err(),
    }
}

/// Styles a short status marker; plain text when color is off.
#[derive(Debug, Clone, Copy)]
pub struct Painter {
    color: bool,
}

impl Painter {
    pub fn new(mode: &ColorMode) -> Self {
        Self {
            color: should_color(mode),
        }
    }

    pub fn added(self, text: &str) -> String {
        if self.color {
            text.green().bold().to_string()
        } else {
            text.to_owned()
        }
    }

    pub fn changed(self, text: &str) -> String {
        if self.color {
            text.yellow().bold().to_string()
        } else {
            text.to_owned()
        }
    }

    pub fn dim(self, text: &str) -> String {
        if self.color {
            text.dimmed().to_string()
        } else {
            text.to_owned()
        }
    }
}

// ── Render dispatcher ────────────────────────────────────────────────

/// Render a single serde-serializable item in the chosen format.
///
/// `detail_fn` produces the human summary for `table`; `id_fn` the one-line
/// value for `plain`.
pub fn render_single<T>(
    format: &OutputFormat,
    data: &T,
    detail_fn: impl Fn(&T) -> String,
    id_fn: impl Fn(&T) -> String,
) -> String
where
    T: serde::Serialize,
{
    match format {
        OutputFormat::Table => detail_fn(data),
        OutputFormat::Json => render_json(data, false),
        OutputFormat::JsonCompact => render_json(data, true),
        OutputFormat::Yaml => render_yaml(data),
        OutputFormat::Plain => id_fn(data),
    }
}

/// Print the rendered output to stdout, respecting quiet mode.
pub fn print_output(output: &str, quiet: bool) {
    if quiet || output.is_empty() {
        return;
    }
    let mut stdout = io::stdout().lock();
    let _ = writeln!(stdout, "{output}");
}

// ── Interface table ──────────────────────────────────────────────────

#[derive(Tabled)]
struct InterfaceRow {
    #[tabled(rename = "Type")]
    kind: String,
    #[tabled(rename = "Address")]
    address: String,
    #[tabled(rename = "Port")]
    port: String,
    #[tabled(rename = "Main")]
    main: &'static str,
}

impl From<&HostInterface> for InterfaceRow {
    fn from(iface: &HostInterface) -> Self {
        let address = if iface.use_ip() {
            iface.ip()
        } else {
            iface.dns()
        };
        Self {
            kind: iface.interface_type().to_string(),
            address: address.unwrap_or("-").to_owned(),
            port: iface.port().to_owned(),
            main: if iface.is_main() { "yes" } else { "no" },
        }
    }
}

pub fn interface_table(interfaces: &[HostInterface]) -> String {
    let rows: Vec<InterfaceRow> = interfaces.iter().map(InterfaceRow::from).collect();
    Table::new(rows).with(Style::rounded()).to_string()
}

// ── Format-specific renderers ────────────────────────────────────────

pub(crate) fn render_json<T: serde::Serialize + ?Sized>(data: &T, compact: bool) -> String {
    let rendered = if compact {
        serde_json::to_string(data)
    } else {
        serde_json::to_string_pretty(data)
    };
    rendered.expect("serialization should not fail")
}

pub(crate) fn render_yaml<T: serde::Serialize + ?Sized>(data: &T) -> String {
    serde_yaml::to_string(data).expect("serialization should not fail")
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use zabbly_core::InterfaceType;

    use super::*;

    #[test]
    fn plain_and_json_dispatch() {
        let data = json!({ "hostid": "10084" });
        let plain = render_single(
            &OutputFormat::Plain,
            &data,
            |_| "detail".into(),
            |d| d["hostid"].as_str().unwrap_or_default().to_owned(),
        );
        assert_eq!(plain, "10084");
        assert_eq!(
            render_single(&OutputFormat::JsonCompact, &data, |_| String::new(), |_| String::new()),
            r#"{"hostid":"10084"}"#
        );
        assert_eq!(
            render_single(&OutputFormat::Table, &data, |_| "detail".into(), |_| String::new()),
            "detail"
        );
    }

    #[test]
    fn interface_table_lists_every_row() {
        let ifaces = [
            HostInterface::by_ip(InterfaceType::Agent, "10.0.0.5", "10050")
                .expect("valid interface"),
            HostInterface::by_dns(InterfaceType::Snmp, "web01.lan", "161")
                .expect("valid interface")
                .with_main(false),
        ];
        let table = interface_table(&ifaces);
        assert!(table.contains("10.0.0.5"));
        assert!(table.contains("web01.lan"));
        assert!(table.contains("161"));
    }

    #[test]
    fn painter_without_color_is_identity() {
        let painter = Painter { color: false };
        assert_eq!(painter.added("+"), "+");
        assert_eq!(painter.changed("~"), "~");
    }
}
