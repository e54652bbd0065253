// ── Host manifests ──
//
// A manifest describes one host in TOML, as an alternative to spelling
// everything out with command-line flags:
//
//   hostname = "web01"
//   groups = ["Linux servers"]
//   templates = ["Linux by Zabbix agent"]
//   proxy = "proxy-eu-1"
//   create_missing_groups = true
//
//   [[interfaces]]
//   type = "agent"
//   ip = "10.0.0.5"
//   port = 10050
//
//   [macros]
//   SNMP_COMMUNITY = "public"

use std::path::Path;

use indexmap::IndexMap;
use serde::Deserialize;

use zabbly_core::{CoreError, DesiredHost, DesiredHostBuilder, HostInterface, InterfaceSpec};

use crate::ConfigError;

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HostManifest {
    pub hostname: String,
    #[serde(default)]
    pub groups: Vec<String>,
    #[serde(default)]
    pub templates: Vec<String>,
    #[serde(default)]
    pub interfaces: Vec<InterfaceSpec>,
    #[serde(default)]
    pub macros: IndexMap<String, String>,
    pub proxy: Option<String>,
    pub create_missing_groups: Option<bool>,
}

impl HostManifest {
    /// Start a [`DesiredHost`] from this manifest. Interfaces are validated
    /// here; callers may still add flags and profile defaults before
    /// `build()`.
    pub fn into_builder(self) -> Result<DesiredHostBuilder, CoreError> {
        let interfaces = self
            .interfaces
            .into_iter()
            .map(HostInterface::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(DesiredHost::builder(self.hostname)
            .groups(self.groups)
            .templates(self.templates)
            .interfaces(interfaces)
            .macros(self.macros)
            .proxy(self.proxy)
            .create_missing_groups(self.create_missing_groups.unwrap_or(false)))
    }
}

/// Read and parse a manifest file.
pub fn load_manifest(path: &Path) -> Result<HostManifest, ConfigError> {
    let text = std::fs::read_to_string(path)?;
    toml::from_str(&text).map_err(|e| ConfigError::Manifest {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use zabbly_core::InterfaceType;

    const WEB01: &str = r#"
hostname = "web01"
groups = ["Linux servers", "web"]
templates = ["Linux by Zabbix agent"]
create_missing_groups = true

[[interfaces]]
type = "agent"
ip = "10.0.0.5"
port = 10050

[[interfaces]]
type = "snmp"
dns = "web01.lan"
main = true

[macros]
SNMP_COMMUNITY = "public"
"{$CPU.UTIL.CRIT}" = "95"
"#;

    fn write(text: &str) -> (tempfile::TempDir, std::path::PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("host.toml");
        std::fs::write(&path, text).unwrap();
        (dir, path)
    }

    #[test]
    fn manifest_builds_desired_host() {
        let (_dir, path) = write(WEB01);
        let host = load_manifest(&path)
            .unwrap()
            .into_builder()
            .unwrap()
            .build()
            .unwrap();

        assert_eq!(host.hostname(), "web01");
        assert_eq!(host.groups(), ["Linux servers".to_owned(), "web".to_owned()]);
        assert!(host.create_missing_groups());
        assert_eq!(host.interfaces().len(), 2);
        assert_eq!(host.interfaces()[1].interface_type(), InterfaceType::Snmp);
        assert_eq!(host.interfaces()[1].port(), "161");
        assert!(!host.interfaces()[1].use_ip());

        let keys: Vec<&str> = host.macros().keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["SNMP_COMMUNITY", "{$CPU.UTIL.CRIT}"]);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let (_dir, path) = write("hostname = \"web01\"\ngroup = [\"typo\"]\n");
        assert!(matches!(
            load_manifest(&path),
            Err(ConfigError::Manifest { .. })
        ));
    }

    #[test]
    fn malformed_interface_is_fatal() {
        let (_dir, path) = write(
            "hostname = \"web01\"\n[[interfaces]]\ntype = \"agent\"\nuseip = true\ndns = \"web01.lan\"\n",
        );
        let err = load_manifest(&path).unwrap().into_builder().unwrap_err();
        assert!(matches!(err, CoreError::InvalidInterface { .. }));
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            load_manifest(&dir.path().join("nope.toml")),
            Err(ConfigError::Io(_))
        ));
    }
}
