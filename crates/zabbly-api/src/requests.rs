// ── Typed request params for the consumed Zabbix methods ──
//
// One params struct per remote method. `ApiRequest` pairs each with its
// wire method name; the serialized shape is what goes into the JSON-RPC
// `params` member verbatim.

use serde::{Serialize, Serializer};

/// `inventory_mode` sent on every host create/update (automatic inventory).
pub const INVENTORY_MODE: u8 = 1;

// ── Shared pieces ──────────────────────────────────────────────────

/// Value of an `output` / `select*` option: either `"extend"` or an
/// explicit field list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Output {
    Extend,
    Fields(Vec<&'static str>),
}

impl Serialize for Output {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Extend => serializer.serialize_str("extend"),
            Self::Fields(fields) => fields.serialize(serializer),
        }
    }
}

/// `filter: { host: ... }` -- hosts, templates and proxies are keyed by `host`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HostFilter {
    pub host: String,
}

/// `filter: { name: ... }` -- host groups are keyed by `name`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NameFilter {
    pub name: String,
}

/// Reference to an existing host group in create/update payloads.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct GroupRef {
    pub groupid: String,
}

/// Reference to an existing template in create/update payloads.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct TemplateRef {
    pub templateid: String,
}

/// A user macro on `host.create`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MacroParam {
    #[serde(rename = "macro")]
    pub name: String,
    pub value: String,
}

/// Interface field-map as sent to `host.create` / `hostinterface.create`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InterfaceParams {
    #[serde(rename = "type")]
    pub interface_type: u8,
    pub main: u8,
    pub useip: u8,
    pub ip: String,
    pub dns: String,
    pub port: String,
}

// ── host.* ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HostGetParams {
    pub filter: HostFilter,
    #[serde(rename = "selectParentTemplates")]
    pub select_parent_templates: Output,
    #[serde(rename = "selectInterfaces")]
    pub select_interfaces: Output,
    #[serde(rename = "selectGroups")]
    pub select_groups: Output,
}

impl HostGetParams {
    /// Narrow selection used to decide whether anything drifted.
    pub fn for_comparison(hostname: &str) -> Self {
        Self {
            filter: HostFilter {
                host: hostname.to_owned(),
            },
            select_parent_templates: Output::Fields(vec!["host"]),
            select_interfaces: Output::Fields(vec!["main", "type", "useip", "ip", "dns", "port"]),
            select_groups: Output::Fields(vec!["name"]),
        }
    }

    /// Full selection used when building an update.
    pub fn extended(hostname: &str) -> Self {
        Self {
            filter: HostFilter {
                host: hostname.to_owned(),
            },
            select_parent_templates: Output::Extend,
            select_interfaces: Output::Extend,
            select_groups: Output::Extend,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HostCreateParams {
    pub host: String,
    pub groups: Vec<GroupRef>,
    pub templates: Vec<TemplateRef>,
    pub interfaces: Vec<InterfaceParams>,
    pub inventory_mode: u8,
    pub macros: Vec<MacroParam>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proxy_hostid: Option<String>,
}

/// `host.update` deliberately has no `interfaces` or `macros` member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HostUpdateParams {
    pub hostid: String,
    pub groups: Vec<GroupRef>,
    pub inventory_mode: u8,
    pub templates: Vec<TemplateRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proxy_hostid: Option<String>,
}

// ── hostgroup.* / template.* / proxy.* ─────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HostGroupGetParams {
    pub filter: NameFilter,
}

impl HostGroupGetParams {
    pub fn named(name: &str) -> Self {
        Self {
            filter: NameFilter {
                name: name.to_owned(),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HostGroupCreateParams {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TemplateGetParams {
    pub filter: HostFilter,
}

impl TemplateGetParams {
    pub fn named(name: &str) -> Self {
        Self {
            filter: HostFilter {
                host: name.to_owned(),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProxyGetParams {
    pub filter: HostFilter,
    pub output: Output,
    #[serde(rename = "selectInterfaces")]
    pub select_interfaces: Output,
}

impl ProxyGetParams {
    pub fn named(name: &str) -> Self {
        Self {
            filter: HostFilter {
                host: name.to_owned(),
            },
            output: Output::Extend,
            select_interfaces: Output::Extend,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HostInterfaceCreateParams {
    #[serde(flatten)]
    pub interface: InterfaceParams,
    pub hostid: String,
}

// ── Request envelope ───────────────────────────────────────────────

/// A typed call to one of the consumed remote methods.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiRequest {
    HostGet(HostGetParams),
    HostCreate(HostCreateParams),
    HostUpdate(HostUpdateParams),
    HostGroupGet(HostGroupGetParams),
    HostGroupCreate(HostGroupCreateParams),
    TemplateGet(TemplateGetParams),
    HostInterfaceCreate(HostInterfaceCreateParams),
    ProxyGet(ProxyGetParams),
}

impl ApiRequest {
    /// The JSON-RPC method name.
    pub fn method(&self) -> &'static str {
        match self {
            Self::HostGet(_) => "host.get",
            Self::HostCreate(_) => "host.create",
            Self::HostUpdate(_) => "host.update",
            Self::HostGroupGet(_) => "hostgroup.get",
            Self::HostGroupCreate(_) => "hostgroup.create",
            Self::TemplateGet(_) => "template.get",
            Self::HostInterfaceCreate(_) => "hostinterface.create",
            Self::ProxyGet(_) => "proxy.get",
        }
    }

    /// Serialize the params member.
    pub fn params(&self) -> Result<serde_json::Value, serde_json::Error> {
        match self {
            Self::HostGet(p) => serde_json::to_value(p),
            Self::HostCreate(p) => serde_json::to_value(p),
            Self::HostUpdate(p) => serde_json::to_value(p),
            Self::HostGroupGet(p) => serde_json::to_value(p),
            Self::HostGroupCreate(p) => serde_json::to_value(p),
            Self::TemplateGet(p) => serde_json::to_value(p),
            Self::HostInterfaceCreate(p) => serde_json::to_value(p),
            Self::ProxyGet(p) => serde_json::to_value(p),
        }
    }
}
