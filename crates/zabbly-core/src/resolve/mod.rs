// ── Name → identifier resolution ──
//
// Groups, templates and proxies are addressed by name in the desired state
// and by server-assigned id in create/update payloads. Each resolver issues
// its lookups sequentially; nothing is cached across runs.

pub mod groups;
pub mod proxy;
pub mod templates;

use serde::Serialize;
use serde::de::DeserializeOwned;

use zabbly_api::requests::{GroupRef, TemplateRef};
use zabbly_api::{ApiRequest, MonitoringApi};

use crate::error::CoreError;
use crate::model::ObjectId;

pub use groups::GroupResolver;
pub use proxy::ProxyResolver;
pub use templates::TemplateResolver;

/// A host group known to exist on the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedGroup {
    pub id: ObjectId,
    pub name: String,
}

impl ResolvedGroup {
    pub fn to_ref(&self) -> GroupRef {
        GroupRef {
            groupid: self.id.to_string(),
        }
    }
}

/// A template matched by name on the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedTemplate {
    pub id: ObjectId,
    pub name: String,
}

impl ResolvedTemplate {
    pub fn to_ref(&self) -> TemplateRef {
        TemplateRef {
            templateid: self.id.to_string(),
        }
    }
}

/// Issue a `*.get` request and decode its result array.
///
/// A `null` result is treated as "no matches".
pub(crate) async fn fetch_list<A, T>(api: &A, request: &ApiRequest) -> Result<Vec<T>, CoreError>
where
    A: MonitoringApi + ?Sized,
    T: DeserializeOwned,
{
    let value = api.query(request).await?;
    if value.is_null() {
        return Ok(Vec::new());
    }
    serde_json::from_value(value).map_err(|e| {
        CoreError::Internal(format!("unexpected {} result: {e}", request.method()))
    })
}
