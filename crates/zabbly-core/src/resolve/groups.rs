// ── Host group resolution ──

use tracing::{debug, error, info};

use zabbly_api::models::ApiHostGroup;
use zabbly_api::requests::{HostGroupCreateParams, HostGroupGetParams};
use zabbly_api::{ApiRequest, MonitoringApi};

use super::{ResolvedGroup, fetch_list};
use crate::error::CoreError;
use crate::model::ObjectId;

/// Ensures each desired group exists and returns its identifier.
pub struct GroupResolver<'a, A: ?Sized> {
    api: &'a A,
}

impl<'a, A: MonitoringApi + ?Sized> GroupResolver<'a, A> {
    pub fn new(api: &'a A) -> Self {
        Self { api }
    }

    /// Resolve every name, in order.
    ///
    /// Missing groups are created when `create_missing` is set; otherwise the
    /// first missing group aborts with [`CoreError::MissingGroup`]. A name that
    /// matches more than one group is rejected as ambiguous.
    pub async fn resolve(
        &self,
        names: &[String],
        create_missing: bool,
    ) -> Result<Vec<ResolvedGroup>, CoreError> {
        let mut resolved = Vec::with_capacity(names.len());
        for name in names {
            resolved.push(self.resolve_one(name, create_missing).await?);
        }
        Ok(resolved)
    }

    async fn resolve_one(&self, name: &str, create_missing: bool) -> Result<ResolvedGroup, CoreError> {
        debug!(group = name, "checking for existence of group");
        let lookup = ApiRequest::HostGroupGet(HostGroupGetParams::named(name));

        let found: Vec<ApiHostGroup> = fetch_list(self.api, &lookup).await?;
        match found.len() {
            1 => {
                debug!(group = name, "group already exists");
                return Ok(into_resolved(name, found));
            }
            0 if !create_missing => {
                return Err(CoreError::MissingGroup {
                    name: name.to_owned(),
                });
            }
            0 => {}
            count => {
                return Err(CoreError::AmbiguousGroup {
                    name: name.to_owned(),
                    count,
                });
            }
        }

        info!(group = name, "creating group");
        let created = self
            .api
            .query(&ApiRequest::HostGroupCreate(HostGroupCreateParams {
                name: name.to_owned(),
            }))
            .await?;
        if created.is_null() {
            error!(group = name, "hostgroup.create returned no result");
        }

        // Re-fetch to confirm and pick up the assigned id.
        let confirmed: Vec<ApiHostGroup> = fetch_list(self.api, &lookup).await?;
        match confirmed.len() {
            0 => Err(CoreError::GroupCreationFailed {
                name: name.to_owned(),
            }),
            1 => Ok(into_resolved(name, confirmed)),
            count => Err(CoreError::AmbiguousGroup {
                name: name.to_owned(),
                count,
            }),
        }
    }
}

fn into_resolved(name: &str, groups: Vec<ApiHostGroup>) -> ResolvedGroup {
    let group = groups.into_iter().next().unwrap_or_default();
    ResolvedGroup {
        id: ObjectId::from(group.groupid),
        name: if group.name.is_empty() {
            name.to_owned()
        } else {
            group.name
        },
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;
    use crate::testing::ScriptedApi;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| (*s).to_owned()).collect()
    }

    #[test]
    fn existing_group_is_used_without_create() {
        let api = ScriptedApi::new().reply(
            "hostgroup.get",
            json!([{ "groupid": "7", "name": "web" }]),
        );

        let groups =
            tokio_test::block_on(GroupResolver::new(&api).resolve(&names(&["web"]), true)).unwrap();

        assert_eq!(
            groups,
            vec![ResolvedGroup {
                id: ObjectId::from("7"),
                name: "web".into(),
            }]
        );
        assert_eq!(api.methods(), vec!["hostgroup.get"]);
    }

    #[test]
    fn missing_group_is_created_then_confirmed() {
        let api = ScriptedApi::new()
            .reply("hostgroup.get", json!([]))
            .reply("hostgroup.create", json!({ "groupids": ["12"] }))
            .reply("hostgroup.get", json!([{ "groupid": "12", "name": "web" }]));

        let groups =
            tokio_test::block_on(GroupResolver::new(&api).resolve(&names(&["web"]), true)).unwrap();

        assert_eq!(groups[0].id.as_str(), "12");
        assert_eq!(
            api.methods(),
            vec!["hostgroup.get", "hostgroup.create", "hostgroup.get"]
        );
        assert_eq!(
            api.requests()[1],
            ApiRequest::HostGroupCreate(HostGroupCreateParams { name: "web".into() })
        );
        api.assert_exhausted();
    }

    #[test]
    fn null_create_result_is_not_fatal() {
        let api = ScriptedApi::new()
            .reply("hostgroup.get", json!([]))
            .reply("hostgroup.create", serde_json::Value::Null)
            .reply("hostgroup.get", json!([{ "groupid": "12", "name": "web" }]));

        let groups =
            tokio_test::block_on(GroupResolver::new(&api).resolve(&names(&["web"]), true)).unwrap();

        assert_eq!(groups.len(), 1);
    }

    #[test]
    fn still_missing_after_create() {
        let api = ScriptedApi::new()
            .reply("hostgroup.get", json!([]))
            .reply("hostgroup.create", json!({ "groupids": ["12"] }))
            .reply("hostgroup.get", json!([]));

        let err = tokio_test::block_on(GroupResolver::new(&api).resolve(&names(&["web"]), true))
            .unwrap_err();

        assert!(matches!(err, CoreError::GroupCreationFailed { ref name } if name == "web"));
    }

    #[test]
    fn missing_group_without_create_is_fatal() {
        let api = ScriptedApi::new()
            .reply("hostgroup.get", json!([{ "groupid": "1", "name": "db" }]))
            .reply("hostgroup.get", json!([]));

        let err =
            tokio_test::block_on(GroupResolver::new(&api).resolve(&names(&["db", "web"]), false))
                .unwrap_err();

        assert!(matches!(err, CoreError::MissingGroup { ref name } if name == "web"));
        assert_eq!(api.methods(), vec!["hostgroup.get", "hostgroup.get"]);
    }

    #[test]
    fn ambiguous_group() {
        let api = ScriptedApi::new().reply(
            "hostgroup.get",
            json!([{ "groupid": "1", "name": "web" }, { "groupid": "2", "name": "web" }]),
        );

        let err = tokio_test::block_on(GroupResolver::new(&api).resolve(&names(&["web"]), true))
            .unwrap_err();

        assert!(matches!(err, CoreError::AmbiguousGroup { count: 2, .. }));
    }

    #[test]
    fn all_groups_are_resolved_in_order() {
        let api = ScriptedApi::new()
            .reply("hostgroup.get", json!([{ "groupid": "1", "name": "a" }]))
            .reply("hostgroup.get", json!([{ "groupid": "2", "name": "b" }]));

        let groups =
            tokio_test::block_on(GroupResolver::new(&api).resolve(&names(&["a", "b"]), false))
                .unwrap();

        let ids: Vec<&str> = groups.iter().map(|g| g.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "2"]);
    }
}
