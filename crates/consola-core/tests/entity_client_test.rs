#![allow(clippy::unwrap_used)]
// Integration tests for entity clients against a wiremock backend.

use std::sync::Arc;
use std::time::Duration;

use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use consola_api::{PaginatedRequest, RequestClient, RequestContext, Session};
use consola_core::{
    Aplicacao, Area, AreaInput, ClientRegistry, Cliente, DomainError, EntityClient, EntityId,
    Licenca,
    LicencaInput, QueryClient, RetryPolicy, Submission, TtlCache,
};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, ClientRegistry) {
    let server = MockServer::start().await;
    let session = Arc::new(Session::new());
    session.set_token("token-123".to_string().into());
    let http = RequestClient::with_client(
        reqwest::Client::new(),
        &server.uri(),
        RequestContext::new("acme", "pt-PT"),
        session,
    )
    .unwrap();
    let registry = ClientRegistry::from_parts(
        Arc::new(http),
        Arc::new(TtlCache::default()),
        Arc::new(QueryClient::default()),
        RetryPolicy::none(),
    );
    (server, registry)
}

fn area(i: usize) -> Value {
    json!({ "id": format!("area-{i}"), "nome": format!("Área {i}"), "ativo": true })
}

fn envelope(data: Value) -> Value {
    json!({ "data": data, "messages": [], "succeeded": true })
}

fn area_input(nome: &str) -> AreaInput {
    AreaInput {
        nome: nome.into(),
        descricao: None,
        cor: None,
        ativo: true,
    }
}

// ── Reads ───────────────────────────────────────────────────────────

#[tokio::test]
async fn test_paginated_areas_first_of_three_pages() {
    let (server, registry) = setup().await;
    let page: Vec<Value> = (1..=10).map(area).collect();

    Mock::given(method("POST"))
        .and(path("/api/areas/paginated"))
        .and(body_json(json!({
            "pageNumber": 1, "pageSize": 10, "filters": {}, "sorting": []
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": page,
            "currentPage": 1,
            "totalPages": 3,
            "totalCount": 23,
            "pageSize": 10,
            "hasPreviousPage": false,
            "hasNextPage": true
        })))
        .expect(1)
        .mount(&server)
        .await;

    let resp = registry
        .client::<Area>()
        .get_paginated(&PaginatedRequest::new(1, 10))
        .await
        .unwrap();

    assert_eq!(resp.info.total_pages, 3);
    assert_eq!(resp.info.total_count, 23);
    assert!(resp.info.has_next_page);
    assert!(!resp.info.has_previous_page);
    assert_eq!(resp.info.data.len(), 10);
    assert_eq!(resp.info.data[0].nome, "Área 1");
}

#[tokio::test]
async fn test_zero_page_is_rejected_without_request() {
    let (server, registry) = setup().await;
    let err = registry
        .client::<Area>()
        .get_paginated(&PaginatedRequest::new(0, 10))
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Validation { .. }));
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_reads_share_one_cache_across_clients() {
    let (server, registry) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/areas"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!([area(1)]))))
        .expect(1)
        .mount(&server)
        .await;

    let first = registry.client::<Area>().get_all().await.unwrap();
    let second = registry.clone().client::<Area>().get_all().await.unwrap();
    assert_eq!(first.info.data.len(), 1);
    assert_eq!(second.info.data[0].nome, "Área 1");
}

#[tokio::test]
async fn test_failed_read_is_not_cached() {
    let (server, registry) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/areas"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/areas"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!([]))))
        .mount(&server)
        .await;

    let client = registry.client::<Area>();
    assert!(client.get_all().await.is_err());
    assert!(client.get_all().await.unwrap().info.data.is_empty());
}

#[tokio::test]
async fn test_raw_payload_shape_check() {
    let (server, registry) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/areas/area-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(area(1))))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/areas/area-2"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "messages": [], "succeeded": true })),
        )
        .mount(&server)
        .await;

    let http = registry.client::<Area>().http().clone();
    let good = http.get_raw("api/areas/area-1").await.unwrap();
    let bad = http.get_raw("api/areas/area-2").await.unwrap();
    assert!(EntityClient::<Area>::validate_response(&good.info));
    assert!(!EntityClient::<Area>::validate_response(&bad.info));

    assert!(EntityClient::<Area>::validate_response(&envelope(json!([]))));
    assert!(!EntityClient::<Area>::validate_response(&json!({ "data": null })));
    assert!(!EntityClient::<Area>::validate_response(&json!("ok")));
}

#[tokio::test]
async fn test_missing_data_is_malformed() {
    let (server, registry) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/areas/area-1"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "messages": [], "succeeded": true })),
        )
        .mount(&server)
        .await;

    let err = registry
        .client::<Area>()
        .get_by_id(&EntityId::from("area-1"))
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::MalformedResponse { .. }));
}

#[tokio::test]
async fn test_read_retry_budget_is_honoured() {
    let (server, registry) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/areas"))
        .respond_with(ResponseTemplate::new(503))
        .expect(3)
        .mount(&server)
        .await;

    let client = registry
        .client::<Area>()
        .as_ref()
        .clone()
        .with_read_retry(RetryPolicy::retries(2).with_base_delay(Duration::from_millis(1)));
    let err = client.get_all().await.unwrap_err();
    assert_eq!(err.status_code(), Some(503));
}

#[tokio::test]
async fn test_relationship_read_uses_parent_path() {
    let (server, registry) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/aplicacoes/area/area-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!([
            { "id": "app-1", "nome": "Faturação", "areaId": "area-1", "ativo": true }
        ]))))
        .expect(1)
        .mount(&server)
        .await;

    let apps = registry
        .client::<Aplicacao>()
        .by_area(&EntityId::from("area-1"))
        .await
        .unwrap();
    assert_eq!(apps.info.data[0].nome, "Faturação");
}

// ── Writes ──────────────────────────────────────────────────────────

#[tokio::test]
async fn test_writes_do_not_retry_by_default() {
    let (server, registry) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/areas"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .expect(1)
        .mount(&server)
        .await;

    let client = registry
        .client::<Area>()
        .as_ref()
        .clone()
        .with_read_retry(RetryPolicy::retries(3));
    let err = client.create(&area_input("Nova")).await.unwrap_err();
    assert_eq!(err.status_code(), Some(500));
}

#[tokio::test]
async fn test_validation_feedback_is_inline_for_areas() {
    let (server, registry) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/areas"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "data": null,
            "messages": ["Nome já existe"],
            "succeeded": false
        })))
        .mount(&server)
        .await;

    let outcome = registry
        .client::<Area>()
        .create(&area_input("Finanças"))
        .await
        .unwrap();
    assert_eq!(
        outcome,
        Submission::Invalid {
            status: 400,
            messages: vec!["Nome já existe".into()]
        }
    );
}

#[tokio::test]
async fn test_validation_feedback_is_a_hard_error_for_licencas() {
    let (server, registry) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/licencas"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "data": null,
            "messages": ["Nome já existe"],
            "succeeded": false
        })))
        .mount(&server)
        .await;

    let dto = LicencaInput {
        codigo: "LIC-1".into(),
        cliente_id: EntityId::from("c-1"),
        aplicacao_id: EntityId::from("app-1"),
        data_inicio: None,
        data_fim: None,
        numero_maximo_utilizadores: 5,
        ativo: true,
    };
    let err = registry.client::<Licenca>().create(&dto).await.unwrap_err();
    assert!(matches!(err, DomainError::Rejected { .. }));
    assert_eq!(err.user_message(), "Nome já existe");
}

#[tokio::test]
async fn test_create_returns_new_id() {
    let (server, registry) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/areas"))
        .and(body_json(json!({ "nome": "Nova", "ativo": true })))
        .respond_with(ResponseTemplate::new(201).set_body_json(envelope(json!("area-9"))))
        .mount(&server)
        .await;

    let outcome = registry
        .client::<Area>()
        .create(&area_input("Nova"))
        .await
        .unwrap();
    let saved = outcome.saved().unwrap();
    assert_eq!(saved.status, 201);
    assert_eq!(saved.info.data, EntityId::from("area-9"));
}

#[tokio::test]
async fn test_delete_multiple_empty_sends_nothing() {
    let (server, registry) = setup().await;

    let ack = registry.client::<Area>().delete_multiple(&[]).await.unwrap();
    assert_eq!(ack.status, 200);
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_delete_multiple_sends_ids_in_body() {
    let (server, registry) = setup().await;

    Mock::given(method("DELETE"))
        .and(path("/api/areas/multiple"))
        .and(body_json(json!(["area-1", "area-2"])))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!(true))))
        .expect(1)
        .mount(&server)
        .await;

    let ids = [EntityId::from("area-1"), EntityId::from("area-2")];
    registry.client::<Area>().delete_multiple(&ids).await.unwrap();
}

// ── Resource-specific endpoints ─────────────────────────────────────

#[tokio::test]
async fn test_block_license_sends_reason() {
    let (server, registry) = setup().await;

    Mock::given(method("PUT"))
        .and(path("/api/licencas/lic-1/bloquear"))
        .and(body_json(json!({ "motivo": "Pagamento em atraso" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!(true))))
        .expect(1)
        .mount(&server)
        .await;

    registry
        .client::<Licenca>()
        .block(&EntityId::from("lic-1"), "Pagamento em atraso")
        .await
        .unwrap();
}

#[tokio::test]
async fn test_rotate_api_key_returns_new_key() {
    let (server, registry) = setup().await;

    Mock::given(method("PUT"))
        .and(path("/api/clientes/c-1/api-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!({
            "apiKey": "ck_live_new",
            "criadaEm": "2026-01-02T03:04:05Z"
        }))))
        .expect(1)
        .mount(&server)
        .await;

    let issued = registry
        .client::<Cliente>()
        .rotate_api_key(&EntityId::from("c-1"))
        .await
        .unwrap();
    assert_eq!(issued.info.data.api_key, "ck_live_new");
}
