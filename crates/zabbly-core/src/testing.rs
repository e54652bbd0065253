// Scripted `MonitoringApi` fake for unit tests.
//
// Replies are consumed strictly in order; each one names the method it
// expects, so a test both scripts the server and asserts the call sequence.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;

use zabbly_api::{ApiRequest, Error, MonitoringApi};

enum Reply {
    Ok(Value),
    RpcError(String),
}

#[derive(Default)]
pub(crate) struct ScriptedApi {
    replies: Mutex<VecDeque<(&'static str, Reply)>>,
    log: Mutex<Vec<ApiRequest>>,
}

impl ScriptedApi {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Expect `method` next and answer with `result`.
    pub(crate) fn reply(self, method: &'static str, result: Value) -> Self {
        self.replies
            .lock()
            .expect("script lock")
            .push_back((method, Reply::Ok(result)));
        self
    }

    /// Expect `method` next and fail it with a server-side error.
    pub(crate) fn fail(self, method: &'static str, data: &str) -> Self {
        self.replies
            .lock()
            .expect("script lock")
            .push_back((method, Reply::RpcError(data.to_owned())));
        self
    }

    /// Every request issued so far, in order.
    pub(crate) fn requests(&self) -> Vec<ApiRequest> {
        self.log.lock().expect("log lock").clone()
    }

    pub(crate) fn methods(&self) -> Vec<&'static str> {
        self.requests().iter().map(ApiRequest::method).collect()
    }

    pub(crate) fn assert_exhausted(&self) {
        let left: Vec<_> = self
            .replies
            .lock()
            .expect("script lock")
            .iter()
            .map(|(m, _)| *m)
            .collect();
        assert!(left.is_empty(), "unconsumed scripted replies: {left:?}");
    }
}

#[async_trait]
impl MonitoringApi for ScriptedApi {
    async fn query(&self, request: &ApiRequest) -> Result<Value, Error> {
        self.log.lock().expect("log lock").push(request.clone());
        let (expected, reply) = self
            .replies
            .lock()
            .expect("script lock")
            .pop_front()
            .unwrap_or_else(|| panic!("unexpected request {}: nothing scripted", request.method()));
        assert_eq!(
            request.method(),
            expected,
            "request order differs from script"
        );
        match reply {
            Reply::Ok(value) => Ok(value),
            Reply::RpcError(data) => Err(Error::Rpc {
                method: expected.to_owned(),
                code: -32602,
                message: "Invalid params.".into(),
                data: Some(data),
            }),
        }
    }
}
