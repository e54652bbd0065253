// ── Host reconciliation ──
//
// Drives one create-or-update run for a single host:
//
//   lookup ─┬─ absent  ──► create
//           └─ present ──► compare ─┬─ no drift ──► no-op
//                                   └─ drift    ──► update
//
// Every remote call is awaited before the next is built, since later
// payloads carry ids returned by earlier calls.

use serde::Serialize;
use tracing::{debug, info, warn};

use zabbly_api::models::{ApiHost, CreatedIds};
use zabbly_api::requests::{
    HostCreateParams, HostGetParams, HostInterfaceCreateParams, HostUpdateParams, INVENTORY_MODE,
};
use zabbly_api::{ApiRequest, MonitoringApi};

use crate::error::CoreError;
use crate::model::{DesiredHost, HostInterface, HostState, ObjectId, format_macros};
use crate::reconcile::{HostDrift, compare, missing_interfaces};
use crate::resolve::{
    GroupResolver, ProxyResolver, ResolvedGroup, ResolvedTemplate, TemplateResolver, fetch_list,
};

// ── Plan / Outcome ──────────────────────────────────────────────────

/// What a run would do, decided from a read-only lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Plan {
    Create,
    Update { hostid: ObjectId, drift: HostDrift },
    NoOp { hostid: ObjectId },
}

/// What a run did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Outcome {
    Created {
        /// `None` if the server's reply carried no id.
        hostid: Option<ObjectId>,
    },
    Updated {
        hostid: ObjectId,
        interfaces_created: Vec<HostInterface>,
        drift: HostDrift,
    },
    Unchanged {
        hostid: ObjectId,
    },
}

// ── HostReconciler ──────────────────────────────────────────────────

/// Converges one host on the server towards a [`DesiredHost`].
///
/// Additive only: groups may be created, interfaces may be added, but
/// nothing is ever deleted.
pub struct HostReconciler<'a, A: ?Sized> {
    api: &'a A,
}

impl<'a, A: MonitoringApi + ?Sized> HostReconciler<'a, A> {
    pub fn new(api: &'a A) -> Self {
        Self { api }
    }

    /// Current state of `hostname`, or `None` if the server has no such host.
    pub async fn lookup(&self, hostname: &str) -> Result<Option<HostState>, CoreError> {
        debug!(host = hostname, "looking up host");
        let request = ApiRequest::HostGet(HostGetParams::for_comparison(hostname));
        let hosts: Vec<ApiHost> = fetch_list(self.api, &request).await?;
        if hosts.len() > 1 {
            warn!(
                host = hostname,
                count = hosts.len(),
                "several hosts match; using the first"
            );
        }
        Ok(hosts.into_iter().next().map(HostState::from))
    }

    /// Lookup + compare, without any writes.
    pub async fn plan(&self, desired: &DesiredHost) -> Result<Plan, CoreError> {
        let Some(current) = self.lookup(desired.hostname()).await? else {
            info!(host = desired.hostname(), "host does not exist");
            return Ok(Plan::Create);
        };

        let drift = compare(&current, desired);
        if drift.needs_update() {
            info!(host = desired.hostname(), hostid = %current.hostid, "host has drifted");
            Ok(Plan::Update {
                hostid: current.hostid,
                drift,
            })
        } else {
            info!(host = desired.hostname(), hostid = %current.hostid, "host is up to date");
            Ok(Plan::NoOp {
                hostid: current.hostid,
            })
        }
    }

    /// Bring the host to the desired state.
    pub async fn ensure(&self, desired: &DesiredHost) -> Result<Outcome, CoreError> {
        match self.plan(desired).await? {
            Plan::Create => self.create(desired).await,
            Plan::Update { drift, .. } => self.update(desired, drift).await,
            Plan::NoOp { hostid } => Ok(Outcome::Unchanged { hostid }),
        }
    }

    // ── Create ───────────────────────────────────────────────────────

    async fn create(&self, desired: &DesiredHost) -> Result<Outcome, CoreError> {
        let hostname = desired.hostname();
        let (groups, templates) = self.resolve_links(desired).await?;
        let proxy_hostid = self.resolve_proxy(desired).await?;

        info!(
            host = hostname,
            groups = groups.len(),
            templates = templates.len(),
            interfaces = desired.interfaces().len(),
            "creating host"
        );
        let params = HostCreateParams {
            host: hostname.to_owned(),
            groups: groups.iter().map(ResolvedGroup::to_ref).collect(),
            templates: templates.iter().map(ResolvedTemplate::to_ref).collect(),
            interfaces: desired.interfaces().iter().map(HostInterface::to_params).collect(),
            inventory_mode: INVENTORY_MODE,
            macros: format_macros(desired.macros()),
            proxy_hostid: proxy_hostid.map(String::from),
        };
        let reply = self.api.query(&ApiRequest::HostCreate(params)).await?;

        let hostid = created_id(reply).map(ObjectId::from);
        match &hostid {
            Some(id) => info!(host = hostname, hostid = %id, "host created"),
            None => warn!(host = hostname, "host.create returned no hostid"),
        }
        Ok(Outcome::Created { hostid })
    }

    // ── Update ───────────────────────────────────────────────────────

    async fn update(&self, desired: &DesiredHost, drift: HostDrift) -> Result<Outcome, CoreError> {
        let hostname = desired.hostname();

        let request = ApiRequest::HostGet(HostGetParams::extended(hostname));
        let current = fetch_list::<_, ApiHost>(self.api, &request)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| CoreError::MissingHost {
                hostname: hostname.to_owned(),
            })?;
        let hostid = ObjectId::from(current.hostid.clone());

        let (groups, templates) = self.resolve_links(desired).await?;

        let existing: Vec<HostInterface> = current
            .interfaces
            .iter()
            .filter_map(|record| match HostInterface::from_record(record) {
                Ok(iface) => Some(iface),
                Err(e) => {
                    warn!(host = hostname, error = %e, "ignoring unrecognized interface");
                    None
                }
            })
            .collect();
        let missing = missing_interfaces(&existing, desired.interfaces());

        for iface in &missing {
            info!(host = hostname, interface = %iface, "adding interface");
            let params = HostInterfaceCreateParams {
                interface: iface.to_params(),
                hostid: hostid.to_string(),
            };
            self.api
                .query(&ApiRequest::HostInterfaceCreate(params))
                .await?;
        }

        let proxy_hostid = self.resolve_proxy(desired).await?;

        info!(host = hostname, hostid = %hostid, "updating host");
        let params = HostUpdateParams {
            hostid: hostid.to_string(),
            groups: groups.iter().map(ResolvedGroup::to_ref).collect(),
            inventory_mode: INVENTORY_MODE,
            templates: templates.iter().map(ResolvedTemplate::to_ref).collect(),
            proxy_hostid: proxy_hostid.map(String::from),
        };
        self.api.query(&ApiRequest::HostUpdate(params)).await?;

        Ok(Outcome::Updated {
            hostid,
            interfaces_created: missing,
            drift,
        })
    }

    // ── Shared steps ─────────────────────────────────────────────────

    async fn resolve_links(
        &self,
        desired: &DesiredHost,
    ) -> Result<(Vec<ResolvedGroup>, Vec<ResolvedTemplate>), CoreError> {
        if desired.groups().is_empty() {
            return Err(CoreError::NoGroups {
                hostname: desired.hostname().to_owned(),
            });
        }
        let groups = GroupResolver::new(self.api)
            .resolve(desired.groups(), desired.create_missing_groups())
            .await?;
        let templates = TemplateResolver::new(self.api)
            .resolve(desired.templates())
            .await?;
        Ok((groups, templates))
    }

    async fn resolve_proxy(&self, desired: &DesiredHost) -> Result<Option<ObjectId>, CoreError> {
        match desired.proxy() {
            Some(name) => ProxyResolver::new(self.api).resolve(name).await,
            None => Ok(None),
        }
    }
}

/// First id in a `host.create` reply, tolerating a null or odd-shaped body.
fn created_id(reply: serde_json::Value) -> Option<String> {
    if reply.is_null() {
        return None;
    }
    serde_json::from_value::<CreatedIds>(reply)
        .ok()?
        .hostids
        .into_iter()
        .next()
}
