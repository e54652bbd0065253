// Zabbix API response types
//
// Models for the `result` payloads of the methods zabbly consumes.
// Zabbix returns almost every scalar as a JSON string, and the shape of an
// object depends on the `select*`/`output` options of the request, so
// fields use `#[serde(default)]` liberally and unknown fields are ignored.

use serde::{Deserialize, Deserializer, Serialize};

// ── JSON-RPC envelope ────────────────────────────────────────────────

/// Outgoing JSON-RPC 2.0 request body.
#[derive(Debug, Serialize)]
pub(crate) struct RpcEnvelope<'a> {
    pub jsonrpc: &'static str,
    pub method: &'a str,
    pub params: &'a serde_json::Value,
    pub id: u64,
}

/// Incoming JSON-RPC 2.0 response body. Exactly one of `result` / `error`
/// is present on a well-formed reply.
#[derive(Debug, Deserialize)]
pub(crate) struct RpcReply {
    #[serde(default)]
    pub result: Option<serde_json::Value>,
    #[serde(default)]
    pub error: Option<RpcErrorBody>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RpcErrorBody {
    pub code: i64,
    pub message: String,
    #[serde(default)]
    pub data: Option<String>,
}

// ── Host ─────────────────────────────────────────────────────────────

/// A host object from `host.get`.
///
/// `parent_templates`, `groups` and `interfaces` are only populated when
/// the request asked for them via `selectParentTemplates` etc.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApiHost {
    pub hostid: String,
    #[serde(default)]
    pub host: String,
    #[serde(default, rename = "parentTemplates")]
    pub parent_templates: Vec<ApiTemplate>,
    #[serde(default)]
    pub groups: Vec<ApiHostGroup>,
    #[serde(default)]
    pub interfaces: Vec<InterfaceRecord>,
    #[serde(default)]
    pub proxy_hostid: Option<String>,
}

/// A host group from `hostgroup.get` (or a host's `groups` selection).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiHostGroup {
    #[serde(default)]
    pub groupid: String,
    #[serde(default)]
    pub name: String,
}

/// A template from `template.get` (or a host's `parentTemplates` selection).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiTemplate {
    #[serde(default)]
    pub templateid: String,
    /// Technical name; the key templates are looked up by.
    #[serde(default)]
    pub host: String,
    #[serde(default)]
    pub name: Option<String>,
}

/// A proxy from `proxy.get`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApiProxy {
    #[serde(default)]
    pub proxyid: Option<String>,
    #[serde(default)]
    pub host: Option<String>,
}

/// Result of a `*.create` call: the ids of the created objects.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreatedIds {
    #[serde(default)]
    pub groupids: Vec<String>,
    #[serde(default)]
    pub hostids: Vec<String>,
    #[serde(default)]
    pub interfaceids: Vec<String>,
}

// ── Interface ────────────────────────────────────────────────────────

/// Wire form of a host interface, every field coerced to a string.
///
/// This is the shape `host.get` returns for
/// `selectInterfaces: [main, type, useip, ip, dns, port]`, and the shape
/// desired interfaces are rendered into for full-field drift comparison.
/// Numeric or null JSON values are accepted and normalized to strings so
/// that `1` and `"1"` compare equal.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InterfaceRecord {
    #[serde(rename = "type", default, deserialize_with = "lenient_string")]
    pub interface_type: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub main: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub useip: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub ip: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub dns: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub port: String,
}

fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::Null => String::new(),
        serde_json::Value::String(s) => s,
        serde_json::Value::Bool(b) => if b { "1" } else { "0" }.to_owned(),
        other => other.to_string(),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn interface_record_coerces_numbers_and_nulls() {
        let record: InterfaceRecord = serde_json::from_value(json!({
            "type": 1,
            "main": "1",
            "useip": true,
            "ip": "10.0.0.5",
            "dns": null,
            "port": 10050
        }))
        .unwrap();

        assert_eq!(
            record,
            InterfaceRecord {
                interface_type: "1".into(),
                main: "1".into(),
                useip: "1".into(),
                ip: "10.0.0.5".into(),
                dns: String::new(),
                port: "10050".into(),
            }
        );
    }

    #[test]
    fn extended_host_ignores_unknown_fields() {
        let host: ApiHost = serde_json::from_value(json!({
            "hostid": "10084",
            "host": "web01",
            "status": "0",
            "parentTemplates": [{ "templateid": "10001", "host": "Linux by Zabbix agent", "name": "Linux" }],
            "groups": [{ "groupid": "2", "name": "Linux servers", "flags": "0" }],
            "interfaces": [{
                "interfaceid": "1", "hostid": "10084", "main": "1", "type": "1",
                "useip": "1", "ip": "127.0.0.1", "dns": "", "port": "10050",
                "available": "1", "details": []
            }]
        }))
        .unwrap();

        assert_eq!(host.hostid, "10084");
        assert_eq!(host.parent_templates[0].host, "Linux by Zabbix agent");
        assert_eq!(host.groups[0].name, "Linux servers");
        assert_eq!(host.interfaces[0].port, "10050");
        assert_eq!(host.proxy_hostid, None);
    }
}
