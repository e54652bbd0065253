// ── Host interface domain types ──
//
// `HostInterface` can only be obtained through validation (`TryFrom<InterfaceSpec>`
// or the `by_ip` / `by_dns` constructors), so everything downstream can
// assume addressing is consistent with `useip`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};
use strum::Display;

use zabbly_api::models::InterfaceRecord;
use zabbly_api::requests::InterfaceParams;

use crate::error::CoreError;

// ── InterfaceType ───────────────────────────────────────────────────

/// Kind of endpoint the server uses to reach the host.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum InterfaceType {
    Agent,
    Snmp,
    Ipmi,
    Jmx,
}

impl InterfaceType {
    /// Numeric code used on the wire.
    pub fn code(self) -> u8 {
        match self {
            Self::Agent => 1,
            Self::Snmp => 2,
            Self::Ipmi => 3,
            Self::Jmx => 4,
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(Self::Agent),
            2 => Some(Self::Snmp),
            3 => Some(Self::Ipmi),
            4 => Some(Self::Jmx),
            _ => None,
        }
    }

    /// Conventional listening port for this interface kind.
    pub fn default_port(self) -> &'static str {
        match self {
            Self::Agent => "10050",
            Self::Snmp => "161",
            Self::Ipmi => "623",
            Self::Jmx => "12345",
        }
    }
}

impl FromStr for InterfaceType {
    type Err = CoreError;

    /// Accepts a name (`agent`, `SNMP`, ...) or a wire code (`1`..`4`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if let Ok(code) = trimmed.parse::<u8>() {
            return Self::from_code(code).ok_or_else(|| CoreError::InvalidInterface {
                message: format!("unknown interface type code {code}"),
            });
        }
        match trimmed.to_ascii_lowercase().as_str() {
            "agent" => Ok(Self::Agent),
            "snmp" => Ok(Self::Snmp),
            "ipmi" => Ok(Self::Ipmi),
            "jmx" => Ok(Self::Jmx),
            other => Err(CoreError::InvalidInterface {
                message: format!("unknown interface type '{other}' (expected agent, snmp, ipmi or jmx)"),
            }),
        }
    }
}

// ── InterfaceSpec ───────────────────────────────────────────────────

/// Unvalidated interface description as it arrives from a manifest or the
/// command line. Convert with `HostInterface::try_from`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InterfaceSpec {
    #[serde(rename = "type")]
    pub interface_type: String,
    #[serde(default)]
    pub main: Option<bool>,
    #[serde(default)]
    pub useip: Option<bool>,
    #[serde(default)]
    pub ip: Option<String>,
    #[serde(default)]
    pub dns: Option<String>,
    #[serde(default, deserialize_with = "optional_port")]
    pub port: Option<String>,
}

fn optional_port<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Port {
        Number(u64),
        Text(String),
    }

    Ok(Option::<Port>::deserialize(deserializer)?.map(|p| match p {
        Port::Number(n) => n.to_string(),
        Port::Text(s) => s,
    }))
}

impl FromStr for InterfaceSpec {
    type Err = CoreError;

    /// Parse `type=agent,ip=10.0.0.5,port=10050,main=true`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut spec = Self::default();
        let mut saw_type = false;

        for pair in s.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            let (key, value) = pair.split_once('=').ok_or_else(|| CoreError::InvalidInterface {
                message: format!("expected key=value, got '{pair}'"),
            })?;
            let value = value.trim().to_owned();
            match key.trim() {
                "type" => {
                    spec.interface_type = value;
                    saw_type = true;
                }
                "main" => spec.main = Some(parse_flag("main", &value)?),
                "useip" => spec.useip = Some(parse_flag("useip", &value)?),
                "ip" => spec.ip = Some(value),
                "dns" => spec.dns = Some(value),
                "port" => spec.port = Some(value),
                other => {
                    return Err(CoreError::InvalidInterface {
                        message: format!("unknown interface field '{other}'"),
                    });
                }
            }
        }

        if !saw_type {
            return Err(CoreError::InvalidInterface {
                message: format!("'{s}' has no type= field"),
            });
        }
        Ok(spec)
    }
}

fn parse_flag(field: &str, value: &str) -> Result<bool, CoreError> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(CoreError::InvalidInterface {
            message: format!("{field} must be a boolean, got '{other}'"),
        }),
    }
}

// ── HostInterface ───────────────────────────────────────────────────

/// A validated network endpoint of a host.
///
/// Identity for additive reconciliation is `(interface_type, port)`;
/// drift detection compares the full wire record instead.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct HostInterface {
    #[serde(rename = "type")]
    interface_type: InterfaceType,
    main: bool,
    useip: bool,
    ip: Option<String>,
    dns: Option<String>,
    port: String,
}

impl HostInterface {
    /// An interface dialed by IP address.
    pub fn by_ip(
        interface_type: InterfaceType,
        ip: impl Into<String>,
        port: impl Into<String>,
    ) -> Result<Self, CoreError> {
        Self::try_from(InterfaceSpec {
            interface_type: interface_type.to_string(),
            main: Some(true),
            useip: Some(true),
            ip: Some(ip.into()),
            dns: None,
            port: Some(port.into()),
        })
    }

    /// An interface dialed by DNS name.
    pub fn by_dns(
        interface_type: InterfaceType,
        dns: impl Into<String>,
        port: impl Into<String>,
    ) -> Result<Self, CoreError> {
        Self::try_from(InterfaceSpec {
            interface_type: interface_type.to_string(),
            main: Some(true),
            useip: Some(false),
            ip: None,
            dns: Some(dns.into()),
            port: Some(port.into()),
        })
    }

    /// Same interface with a different `main` flag.
    pub fn with_main(mut self, main: bool) -> Self {
        self.main = main;
        self
    }

    /// Rebuild from what the server reports for an existing interface.
    ///
    /// Remote state is taken as-is: only the type code must be recognizable.
    pub fn from_record(record: &InterfaceRecord) -> Result<Self, CoreError> {
        let interface_type = record
            .interface_type
            .parse::<u8>()
            .ok()
            .and_then(InterfaceType::from_code)
            .ok_or_else(|| CoreError::Internal(format!(
                "server reported unknown interface type '{}'",
                record.interface_type
            )))?;
        Ok(Self {
            interface_type,
            main: record.main == "1",
            useip: record.useip == "1",
            ip: non_empty(&record.ip),
            dns: non_empty(&record.dns),
            port: record.port.clone(),
        })
    }

    pub fn interface_type(&self) -> InterfaceType {
        self.interface_type
    }

    pub fn is_main(&self) -> bool {
        self.main
    }

    pub fn use_ip(&self) -> bool {
        self.useip
    }

    pub fn ip(&self) -> Option<&str> {
        self.ip.as_deref()
    }

    pub fn dns(&self) -> Option<&str> {
        self.dns.as_deref()
    }

    pub fn port(&self) -> &str {
        &self.port
    }

    /// `(type, port)` -- two interfaces with the same identity are the same
    /// interface for create decisions, whatever their addressing.
    pub fn identity(&self) -> (InterfaceType, &str) {
        (self.interface_type, &self.port)
    }

    /// Every field coerced to its wire string, for full-field comparison.
    pub fn to_record(&self) -> InterfaceRecord {
        InterfaceRecord {
            interface_type: self.interface_type.code().to_string(),
            main: flag(self.main).to_string(),
            useip: flag(self.useip).to_string(),
            ip: self.ip.clone().unwrap_or_default(),
            dns: self.dns.clone().unwrap_or_default(),
            port: self.port.clone(),
        }
    }

    /// Field-map for `host.create` / `hostinterface.create`.
    pub fn to_params(&self) -> InterfaceParams {
        InterfaceParams {
            interface_type: self.interface_type.code(),
            main: flag(self.main),
            useip: flag(self.useip),
            ip: self.ip.clone().unwrap_or_default(),
            dns: self.dns.clone().unwrap_or_default(),
            port: self.port.clone(),
        }
    }
}

impl TryFrom<InterfaceSpec> for HostInterface {
    type Error = CoreError;

    fn try_from(spec: InterfaceSpec) -> Result<Self, Self::Error> {
        let interface_type: InterfaceType = spec.interface_type.parse()?;
        let ip = spec.ip.as_deref().and_then(non_empty);
        let dns = spec.dns.as_deref().and_then(non_empty);

        let useip = match spec.useip {
            Some(flag) => flag,
            None if ip.is_some() => true,
            None if dns.is_some() => false,
            None => {
                return Err(CoreError::InvalidInterface {
                    message: format!("{interface_type} interface needs an ip or a dns name"),
                });
            }
        };
        if useip && ip.is_none() {
            return Err(CoreError::InvalidInterface {
                message: format!("{interface_type} interface has useip=true but no ip"),
            });
        }
        if !useip && dns.is_none() {
            return Err(CoreError::InvalidInterface {
                message: format!("{interface_type} interface has useip=false but no dns name"),
            });
        }

        let port = spec
            .port
            .map(|p| p.trim().to_owned())
            .filter(|p| !p.is_empty())
            .unwrap_or_else(|| interface_type.default_port().to_owned());
        validate_port(interface_type, &port)?;

        Ok(Self {
            interface_type,
            main: spec.main.unwrap_or(true),
            useip,
            ip,
            dns,
            port,
        })
    }
}

impl fmt::Display for HostInterface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let address = if self.useip {
            self.ip.as_deref()
        } else {
            self.dns.as_deref()
        };
        write!(
            f,
            "{} {}:{}{}",
            self.interface_type,
            address.unwrap_or("-"),
            self.port,
            if self.main { " (main)" } else { "" }
        )
    }
}

/// Ports are numeric, or a user macro such as `{$AGENT.PORT}`.
fn validate_port(interface_type: InterfaceType, port: &str) -> Result<(), CoreError> {
    if port.starts_with("{$") && port.ends_with('}') {
        return Ok(());
    }
    match port.parse::<u16>() {
        Ok(n) if n > 0 => Ok(()),
        _ => Err(CoreError::InvalidInterface {
            message: format!("{interface_type} interface has invalid port '{port}'"),
        }),
    }
}

fn flag(value: bool) -> u8 {
    u8::from(value)
}

fn non_empty(s: &str) -> Option<String> {
    let trimmed = s.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_owned())
}
