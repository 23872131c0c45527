//! Admin API client against a mocked authorization server.

use login_consent_provider::error::UpstreamError;
use login_consent_provider::http::HttpClient;
use login_consent_provider::hydra::{
    AcceptLoginRequest, AdminApi, ClientDefinition, HydraAdminClient,
};
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> HydraAdminClient {
    HydraAdminClient::new(
        HttpClient::new(false).expect("http client"),
        &server.uri(),
        &server.uri(),
    )
}

#[tokio::test]
async fn test_get_login_request_decodes_context() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/oauth2/auth/requests/login"))
        .and(query_param("login_challenge", "a+b/c"))
        .and(header("accept", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "challenge": "a+b/c",
            "skip": true,
            "subject": "alice@example.com",
            "requested_scope": ["openid"],
            "requested_access_token_audience": null,
            "client": { "client_id": "myclient", "client_name": "" }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let context = client_for(&server)
        .get_login_request("a+b/c")
        .await
        .expect("login request");

    assert!(context.skip);
    assert_eq!(context.subject, "alice@example.com");
    assert_eq!(context.requested_scope, ["openid"]);
    assert!(context.requested_access_token_audience.is_empty());
    assert_eq!(context.client.display_name(), "myclient");
}

#[tokio::test]
async fn test_accept_login_sends_json_body() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/oauth2/auth/requests/login/accept"))
        .and(query_param("login_challenge", "l1"))
        .and(header("content-type", "application/json"))
        .and(body_json(json!({"subject": "alice", "remember": false})))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"redirect_to": "http://x/next"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let completed = client_for(&server)
        .accept_login_request(
            "l1",
            &AcceptLoginRequest {
                subject: "alice".into(),
                remember: false,
            },
        )
        .await
        .expect("accept");
    assert_eq!(completed.redirect_to, "http://x/next");
}

#[tokio::test]
async fn test_client_error_keeps_status_and_description() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/oauth2/auth/requests/consent"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "error": "Not Found",
            "error_description": "Unable to locate the resource"
        })))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .get_consent_request("missing")
        .await
        .unwrap_err();

    match &err {
        UpstreamError::Http { status, context } => {
            assert_eq!(status.as_u16(), 404);
            assert_eq!(context, "Unable to locate the resource");
        }
        other => panic!("unexpected error {other:?}"),
    }
    assert!(!err.is_unavailable());
}

#[tokio::test]
async fn test_malformed_body_is_json_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/oauth2/auth/requests/login"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>proxy error</html>"))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .get_login_request("l1")
        .await
        .unwrap_err();
    assert!(matches!(err, UpstreamError::Json(_)));
}

#[tokio::test]
async fn test_probe_ready_requires_success_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/health/ready"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/health/ready"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "ok"})))
        .mount(&server)
        .await;

    let client = client_for(&server);
    assert!(client.probe_ready().await.is_err());
    assert!(client.probe_ready().await.is_ok());
}

#[tokio::test]
async fn test_create_client_expects_created() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/clients"))
        .and(body_json(json!({"client_id": "new"})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"client_id": "new"})))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/clients"))
        .and(body_json(json!({"client_id": "existing"})))
        .respond_with(ResponseTemplate::new(409))
        .mount(&server)
        .await;

    let client = client_for(&server);
    assert!(
        client
            .create_client(&ClientDefinition(json!({"client_id": "new"})))
            .await
            .is_ok()
    );
    let err = client
        .create_client(&ClientDefinition(json!({"client_id": "existing"})))
        .await
        .unwrap_err();
    assert_eq!(err.status().map(|s| s.as_u16()), Some(409));
}

#[tokio::test]
async fn test_create_client_rejects_plain_ok() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/clients"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    assert!(
        client_for(&server)
            .create_client(&ClientDefinition(json!({"client_id": "c"})))
            .await
            .is_err()
    );
}

#[tokio::test]
async fn test_slow_server_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/health/ready"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
        .mount(&server)
        .await;

    let client = HydraAdminClient::new(
        HttpClient::new(false)
            .expect("http client")
            .with_timeout(Duration::from_millis(100)),
        &server.uri(),
        &server.uri(),
    );
    let err = client.probe_ready().await.unwrap_err();
    assert!(matches!(err, UpstreamError::Timeout(_)));
    assert!(err.is_unavailable());
}

#[tokio::test]
async fn test_unreachable_server_is_unavailable() {
    // Nothing listens on the discard port.
    let client = HydraAdminClient::new(
        HttpClient::new(false).expect("http client"),
        "http://127.0.0.1:9",
        "http://127.0.0.1:9",
    );
    let err = client.get_login_request("l1").await.unwrap_err();
    assert!(err.is_unavailable());
}
