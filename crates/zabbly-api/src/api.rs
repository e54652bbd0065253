// The request/response seam consumed by reconciliation logic.

use async_trait::async_trait;
use tracing::debug;

use crate::client::ZabbixClient;
use crate::error::Error;
use crate::requests::ApiRequest;

/// A request/response monitoring API.
///
/// Takes a typed [`ApiRequest`] and returns the parsed `result` payload.
/// [`ZabbixClient`] is the production implementation; tests substitute a
/// scripted fake to observe the exact call sequence.
#[async_trait]
pub trait MonitoringApi: Send + Sync {
    async fn query(&self, request: &ApiRequest) -> Result<serde_json::Value, Error>;
}

#[async_trait]
impl MonitoringApi for ZabbixClient {
    async fn query(&self, request: &ApiRequest) -> Result<serde_json::Value, Error> {
        let method = request.method();
        let params = request.params()?;
        debug!(method, "issuing API request");
        self.send(method, &params, true).await
    }
}
