use tracing::{debug, warn};

use zabbly_api::models::ApiTemplate;
use zabbly_api::requests::TemplateGetParams;
use zabbly_api::{ApiRequest, MonitoringApi};

use super::{ResolvedTemplate, fetch_list};
use crate::error::CoreError;
use crate::model::ObjectId;

/// Looks templates up by technical name. Never creates anything.
pub struct TemplateResolver<'a, A: ?Sized> {
    api: &'a A,
}

impl<'a, A: MonitoringApi + ?Sized> TemplateResolver<'a, A> {
    pub fn new(api: &'a A) -> Self {
        Self { api }
    }

    /// All matches for all names, flattened in request order.
    ///
    /// A name with no match is logged and skipped; the host is then linked
    /// to fewer templates than asked for, which is not an error.
    pub async fn resolve(&self, names: &[String]) -> Result<Vec<ResolvedTemplate>, CoreError> {
        let mut resolved = Vec::new();
        for name in names {
            debug!(template = name.as_str(), "looking up template");
            let request = ApiRequest::TemplateGet(TemplateGetParams::named(name));
            let matches: Vec<ApiTemplate> = fetch_list(self.api, &request).await?;
            if matches.is_empty() {
                warn!(template = name.as_str(), "template not found; skipping");
                continue;
            }
            resolved.extend(matches.into_iter().map(|t| ResolvedTemplate {
                id: ObjectId::from(t.templateid),
                name: if t.host.is_empty() { name.clone() } else { t.host },
            }));
        }
        Ok(resolved)
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
    fn unmatched_names_are_skipped() {
        let api = ScriptedApi::new()
            .reply(
                "template.get",
                json!([{ "templateid": "10001", "host": "Linux by Zabbix agent" }]),
            )
            .reply("template.get", json!([]));

        let names = vec!["Linux by Zabbix agent".to_owned(), "Nope".to_owned()];
        let templates = tokio_test::block_on(TemplateResolver::new(&api).resolve(&names)).unwrap();

        assert_eq!(
            templates,
            vec![ResolvedTemplate {
                id: ObjectId::from("10001"),
                name: "Linux by Zabbix agent".into(),
            }]
        );
        api.assert_exhausted();
    }

    #[test]
    fn multiple_matches_are_flattened() {
        let api = ScriptedApi::new().reply(
            "template.get",
            json!([
                { "templateid": "1", "host": "T" },
                { "templateid": "2", "host": "T" }
            ]),
        );

        let templates =
            tokio_test::block_on(TemplateResolver::new(&api).resolve(&["T".to_owned()])).unwrap();

        let ids: Vec<&str> = templates.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "2"]);
    }

    #[test]
    fn no_names_no_requests() {
        let api = ScriptedApi::new();
        let templates = tokio_test::block_on(TemplateResolver::new(&api).resolve(&[])).unwrap();
        assert!(templates.is_empty());
        assert!(api.requests().is_empty());
    }

    #[test]
    fn server_error_propagates() {
        let api = ScriptedApi::new().fail("template.get", "boom");
        let err = tokio_test::block_on(TemplateResolver::new(&api).resolve(&["T".to_owned()]))
            .unwrap_err();
        assert!(matches!(err, CoreError::Api { .. }));
    }
}
