use tracing::{debug, warn};

use zabbly_api::models::ApiProxy;
use zabbly_api::requests::ProxyGetParams;
use zabbly_api::{ApiRequest, MonitoringApi};

use super::fetch_list;
use crate::error::CoreError;
use crate::model::ObjectId;

/// Resolves a proxy name to the id placed in `proxy_hostid`.
pub struct ProxyResolver<'a, A: ?Sized> {
    api: &'a A,
}

impl<'a, A: MonitoringApi + ?Sized> ProxyResolver<'a, A> {
    pub fn new(api: &'a A) -> Self {
        Self { api }
    }

    /// The first matching proxy's id.
    ///
    /// No match at all is fatal. Matches that carry no `proxyid` yield
    /// `None`: the host is then left without a proxy rather than failing.
    pub async fn resolve(&self, name: &str) -> Result<Option<ObjectId>, CoreError> {
        debug!(proxy = name, "looking up proxy");
        let request = ApiRequest::ProxyGet(ProxyGetParams::named(name));
        let proxies: Vec<ApiProxy> = fetch_list(self.api, &request).await?;

        if proxies.is_empty() {
            return Err(CoreError::ProxyNotFound {
                name: name.to_owned(),
            });
        }

        let id = proxies
            .into_iter()
            .find_map(|p| p.proxyid.filter(|id| !id.is_empty()))
            .map(ObjectId::from);
        if id.is_none() {
            warn!(proxy = name, "proxy lookup returned no proxyid; host will have no proxy");
        }
        Ok(id)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;
    use crate::testing::ScriptedApi;

    #[test]
    fn first_proxyid_wins() {
        let api = ScriptedApi::new().reply(
            "proxy.get",
            json!([
                { "proxyid": "10200", "host": "proxy-eu" },
                { "proxyid": "10201", "host": "proxy-eu" }
            ]),
        );

        let id = tokio_test::block_on(ProxyResolver::new(&api).resolve("proxy-eu")).unwrap();

        assert_eq!(id, Some(ObjectId::from("10200")));
    }

    #[test]
    fn no_match_is_fatal() {
        let api = ScriptedApi::new().reply("proxy.get", json!([]));

        let err = tokio_test::block_on(ProxyResolver::new(&api).resolve("ghost")).unwrap_err();

        assert!(matches!(err, CoreError::ProxyNotFound { ref name } if name == "ghost"));
    }

    #[test]
    fn match_without_id_means_no_proxy() {
        let api = ScriptedApi::new().reply("proxy.get", json!([{ "host": "proxy-eu" }]));

        let id = tokio_test::block_on(ProxyResolver::new(&api).resolve("proxy-eu")).unwrap();

        assert_eq!(id, None);
    }
}
