#![allow(clippy::unwrap_used)]
// Integration tests for `RequestClient` using wiremock.

use std::sync::Arc;

use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use wiremock::matchers::{body_json, header, header_exists, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use consola_api::{
    ApiResponse, Envelope, Error, PaginatedRequest, PaginatedResult, RequestClient,
    RequestContext, Session,
};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, RequestClient) {
    let server = MockServer::start().await;
    let session = Arc::new(Session::new());
    session.set_token("token-123".to_string().into());
    let context =
        RequestContext::new("acme", "pt-PT").with_api_key("key-abc".to_string().into());
    let client =
        RequestClient::with_client(reqwest::Client::new(), &server.uri(), context, session)
            .unwrap();
    (server, client)
}

// ── Headers ─────────────────────────────────────────────────────────

#[tokio::test]
async fn test_get_sends_tenant_locale_and_bearer() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/areas/all"))
        .and(header("tenant", "acme"))
        .and(header("Accept-Language", "pt-PT"))
        .and(header("Authorization", "Bearer token-123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{ "id": 1 }],
            "messages": [],
            "succeeded": true
        })))
        .expect(1)
        .mount(&server)
        .await;

    let resp: ApiResponse<Envelope<Vec<Value>>> = client.get("api/areas/all").await.unwrap();
    assert_eq!(resp.status, 200);
    assert_eq!(resp.info.data.len(), 1);
    assert!(resp.info.succeeded);
}

#[tokio::test]
async fn test_authenticated_call_without_token_fails_fast() {
    let (server, client) = setup().await;
    client.session().clear_auth();

    let result: Result<ApiResponse<Envelope<Value>>, _> = client.get("api/areas/all").await;
    assert!(matches!(result, Err(Error::MissingToken)));
    assert!(server.received_requests().await.unwrap().is_empty());
}

// ── Envelope handling ───────────────────────────────────────────────

#[tokio::test]
async fn test_paginated_post_body_and_shape() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/areas/paginated"))
        .and(body_json(json!({
            "pageNumber": 1,
            "pageSize": 10,
            "filters": {},
            "sorting": []
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{ "id": "a" }],
            "currentPage": 1,
            "totalPages": 3,
            "totalCount": 23,
            "pageSize": 10,
            "hasPreviousPage": false,
            "hasNextPage": true
        })))
        .mount(&server)
        .await;

    let resp: ApiResponse<PaginatedResult<Value>> = client
        .post("api/areas/paginated", &PaginatedRequest::new(1, 10))
        .await
        .unwrap();
    assert_eq!(resp.info.total_pages, 3);
    assert_eq!(resp.info.total_count, 23);
    assert!(resp.info.has_next_page);
    assert!(!resp.info.has_previous_page);
}

#[tokio::test]
async fn test_missing_data_is_malformed_even_on_200() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/areas/7"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "messages": [], "succeeded": true })),
        )
        .mount(&server)
        .await;

    let result: Result<ApiResponse<Envelope<Value>>, _> = client.get("api/areas/7").await;
    assert!(
        matches!(result, Err(Error::MalformedResponse { .. })),
        "expected MalformedResponse, got: {result:?}"
    );
}

#[tokio::test]
async fn test_raw_get_returns_body_before_shape_check() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/areas/7"))
        .and(header("Authorization", "Bearer token-123"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "messages": [], "succeeded": true })),
        )
        .mount(&server)
        .await;

    let resp = client.get_raw("api/areas/7").await.unwrap();
    assert_eq!(resp.status, 200);
    assert_eq!(resp.info["succeeded"], json!(true));
    assert!(matches!(
        consola_api::validate_envelope(&resp.info),
        Err(Error::MalformedResponse { .. })
    ));
}

#[tokio::test]
async fn test_raw_post_sends_body() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/areas"))
        .and(body_json(json!({ "nome": "Norte" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": "a-1",
            "messages": [],
            "succeeded": true
        })))
        .expect(1)
        .mount(&server)
        .await;

    let resp = client
        .post_raw("api/areas", &json!({ "nome": "Norte" }))
        .await
        .unwrap();
    assert!(consola_api::validate_envelope(&resp.info).is_ok());
    assert_eq!(resp.info["data"], json!("a-1"));
}

#[tokio::test]
async fn test_error_body_is_propagated_unchanged() {
    let (server, client) = setup().await;
    let body = json!({ "data": null, "messages": ["Nome já existe"], "succeeded": false });

    Mock::given(method("POST"))
        .and(path("/api/areas"))
        .respond_with(ResponseTemplate::new(400).set_body_json(&body))
        .mount(&server)
        .await;

    let err = client
        .post::<Envelope<Value>, _>("api/areas", &json!({ "nome": "X" }))
        .await
        .unwrap_err();

    match &err {
        Error::Http {
            status,
            body: raw,
            envelope,
        } => {
            assert_eq!(*status, 400);
            assert_eq!(serde_json::from_str::<Value>(raw).unwrap(), body);
            assert_eq!(
                envelope.as_ref().unwrap().messages,
                vec!["Nome já existe".to_string()]
            );
        }
        other => panic!("expected Http error, got {other:?}"),
    }
    assert!(err.is_validation_feedback());
    assert_eq!(err.messages(), ["Nome já existe".to_string()]);
}

#[tokio::test]
async fn test_delete_with_body() {
    let (server, client) = setup().await;

    Mock::given(method("DELETE"))
        .and(path("/api/areas/multiple"))
        .and(body_json(json!(["a", "b"])))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": true,
            "messages": [],
            "succeeded": true
        })))
        .expect(1)
        .mount(&server)
        .await;

    let resp: ApiResponse<Envelope<bool>> = client
        .delete_with_body("api/areas/multiple", &["a", "b"])
        .await
        .unwrap();
    assert!(resp.info.data);
}

#[tokio::test]
async fn test_connection_refused_is_network_error() {
    let session = Arc::new(Session::new());
    session.set_token("t".to_string().into());
    let client = RequestClient::with_client(
        reqwest::Client::new(),
        "http://127.0.0.1:1",
        RequestContext::new("acme", "pt-PT"),
        session,
    )
    .unwrap();

    let result: Result<ApiResponse<Envelope<Value>>, _> = client.get("api/areas/all").await;
    assert!(matches!(result, Err(Error::Network(_))));
}

// ── Account ─────────────────────────────────────────────────────────

#[tokio::test]
async fn test_login_uses_api_key_and_stores_tokens() {
    let (server, client) = setup().await;
    client.session().clear_auth();

    Mock::given(method("POST"))
        .and(path("/api/account/login"))
        .and(header("X-API-Key", "key-abc"))
        .and(body_json(json!({ "email": "ana@acme.pt", "password": "s3cret" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "token": "jwt-1", "refreshToken": "refresh-1" },
            "messages": [],
            "succeeded": true
        })))
        .mount(&server)
        .await;

    client
        .login("ana@acme.pt", &"s3cret".to_string().into())
        .await
        .unwrap();
    assert!(client.session().is_authenticated());
    assert!(client.session().refresh_token().is_some());
}

#[tokio::test]
async fn test_login_does_not_send_bearer() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/account/login"))
        .and(header_exists("Authorization"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/account/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "token": "jwt-2" }
        })))
        .mount(&server)
        .await;

    client
        .login("ana@acme.pt", &"pw".to_string().into())
        .await
        .unwrap();
}

#[tokio::test]
async fn test_logout_clears_session_even_on_failure() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/account/logout"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    assert!(client.logout().await.is_err());
    assert!(!client.session().is_authenticated());
}
