#![allow(clippy::unwrap_used)]
// Integration tests for `ZabbixClient` using wiremock.

use secrecy::SecretString;
use serde_json::json;
use url::Url;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use zabbly_api::requests::{HostGetParams, HostGroupCreateParams};
use zabbly_api::{ApiRequest, Error, MonitoringApi, ZabbixClient};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, ZabbixClient) {
    let server = MockServer::start().await;
    let base_url = Url::parse(&server.uri()).unwrap();
    let client = ZabbixClient::with_client(reqwest::Client::new(), &base_url).unwrap();
    (server, client)
}

fn rpc_result(result: serde_json::Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({ "jsonrpc": "2.0", "result": result, "id": 1 }))
}

// ── Authentication tests ────────────────────────────────────────────

#[tokio::test]
async fn test_login_stores_token() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api_jsonrpc.php"))
        .and(body_partial_json(json!({
            "jsonrpc": "2.0",
            "method": "user.login",
            "params": { "username": "Admin", "password": "zabbix" }
        })))
        .respond_with(rpc_result(json!("0424bd59b807674191e7d77572075f33")))
        .mount(&server)
        .await;

    assert!(!client.is_authenticated());
    let secret: SecretString = "zabbix".to_string().into();
    client.login("Admin", &secret).await.unwrap();
    assert!(client.is_authenticated());
}

#[tokio::test]
async fn test_login_failure() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api_jsonrpc.php"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "jsonrpc": "2.0",
            "error": {
                "code": -32602,
                "message": "Invalid params.",
                "data": "Incorrect user name or password or account is temporarily blocked."
            },
            "id": 1
        })))
        .mount(&server)
        .await;

    let secret: SecretString = "wrong".to_string().into();
    let result = client.login("Admin", &secret).await;

    assert!(
        matches!(result, Err(Error::Authentication { .. })),
        "expected Authentication error, got: {result:?}"
    );
    assert!(!client.is_authenticated());
}

#[tokio::test]
async fn test_query_requires_token() {
    let (_server, client) = setup().await;

    let result = client
        .query(&ApiRequest::HostGet(HostGetParams::for_comparison("web01")))
        .await;

    assert!(matches!(result, Err(Error::NotLoggedIn)));
}

#[tokio::test]
async fn test_logout_clears_token() {
    let (server, client) = setup().await;
    let client = client.with_api_token("tok".to_string().into());

    Mock::given(method("POST"))
        .and(body_partial_json(json!({ "method": "user.logout" })))
        .respond_with(rpc_result(json!(true)))
        .mount(&server)
        .await;

    client.logout().await.unwrap();
    assert!(!client.is_authenticated());
}

// ── Query tests ─────────────────────────────────────────────────────

#[tokio::test]
async fn test_query_sends_bearer_and_typed_params() {
    let (server, client) = setup().await;
    let client = client.with_api_token("secret-token".to_string().into());

    Mock::given(method("POST"))
        .and(path("/api_jsonrpc.php"))
        .and(header("authorization", "Bearer secret-token"))
        .and(body_partial_json(json!({
            "method": "host.get",
            "params": {
                "filter": { "host": "web01" },
                "selectGroups": ["name"]
            }
        })))
        .respond_with(rpc_result(json!([{ "hostid": "10084", "host": "web01" }])))
        .expect(1)
        .mount(&server)
        .await;

    let result = client
        .query(&ApiRequest::HostGet(HostGetParams::for_comparison("web01")))
        .await
        .unwrap();

    assert_eq!(result, json!([{ "hostid": "10084", "host": "web01" }]));
}

#[tokio::test]
async fn test_null_result_is_passed_through() {
    let (server, client) = setup().await;
    let client = client.with_api_token("tok".to_string().into());

    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "jsonrpc": "2.0", "id": 1 })),
        )
        .mount(&server)
        .await;

    let result = client
        .query(&ApiRequest::HostGroupCreate(HostGroupCreateParams {
            name: "web".into(),
        }))
        .await
        .unwrap();

    assert!(result.is_null());
}

#[tokio::test]
async fn test_api_version_is_anonymous() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(body_partial_json(json!({ "method": "apiinfo.version" })))
        .respond_with(rpc_result(json!("6.4.12")))
        .mount(&server)
        .await;

    assert_eq!(client.api_version().await.unwrap(), "6.4.12");
}

// ── Error tests ─────────────────────────────────────────────────────

#[tokio::test]
async fn test_rpc_error_object() {
    let (server, client) = setup().await;
    let client = client.with_api_token("tok".to_string().into());

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "jsonrpc": "2.0",
            "error": {
                "code": -32602,
                "message": "Invalid params.",
                "data": "Host group \"web\" already exists."
            },
            "id": 1
        })))
        .mount(&server)
        .await;

    let result = client
        .query(&ApiRequest::HostGroupCreate(HostGroupCreateParams {
            name: "web".into(),
        }))
        .await;

    match result {
        Err(Error::Rpc {
            ref method,
            code,
            ref data,
            ..
        }) => {
            assert_eq!(method, "hostgroup.create");
            assert_eq!(code, -32602);
            assert!(data.as_deref().unwrap_or_default().contains("already exists"));
        }
        other => panic!("expected Rpc error, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_expired_session_maps_to_authentication() {
    let (server, client) = setup().await;
    let client = client.with_api_token("stale".to_string().into());

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "jsonrpc": "2.0",
            "error": {
                "code": -32602,
                "message": "Invalid params.",
                "data": "Session terminated, re-login, please."
            },
            "id": 1
        })))
        .mount(&server)
        .await;

    let result = client
        .query(&ApiRequest::HostGet(HostGetParams::for_comparison("web01")))
        .await;

    assert!(
        matches!(result, Err(Error::Authentication { .. })),
        "expected Authentication error, got: {result:?}"
    );
}

#[tokio::test]
async fn test_http_error_status() {
    let (server, client) = setup().await;
    let client = client.with_api_token("tok".to_string().into());

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string("internal error"))
        .mount(&server)
        .await;

    let result = client
        .query(&ApiRequest::HostGet(HostGetParams::for_comparison("web01")))
        .await;

    assert!(
        matches!(result, Err(Error::Rpc { code: 500, .. })),
        "expected Rpc error with HTTP status, got: {result:?}"
    );
}

#[tokio::test]
async fn test_malformed_body() {
    let (server, client) = setup().await;
    let client = client.with_api_token("tok".to_string().into());

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>not json</html>"))
        .mount(&server)
        .await;

    let result = client
        .query(&ApiRequest::HostGet(HostGetParams::for_comparison("web01")))
        .await;

    match result {
        Err(Error::Deserialization { ref body, .. }) => assert!(body.contains("not json")),
        other => panic!("expected Deserialization error, got: {other:?}"),
    }
}
