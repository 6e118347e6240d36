//! Contract tests for the REST-gateway data stores.

use std::time::Duration;

use aerodesk_auth::{AuditAction, AuditRecord, PrincipalId, Role};
use aerodesk_infra::provider::RestStore;
use aerodesk_infra::{AccountDirectory, AuditLog, LoginMethod, ProviderConfig, RoleStore};
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const USER_ID: &str = "550e8400-e29b-41d4-a716-446655440000";

fn store(server: &MockServer) -> RestStore {
    RestStore::new(ProviderConfig::new(server.uri(), "anon-key", "service-key")).unwrap()
}

#[tokio::test]
async fn role_lookup_is_a_single_row_select_by_user_id() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/user_roles"))
        .and(query_param("user_id", format!("eq.{USER_ID}")))
        .and(query_param("limit", "1"))
        .and(header("apikey", "service-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            { "role": "admin" }
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let role = store(&server).role_of(USER_ID.parse().unwrap()).await.unwrap();
    assert_eq!(role, Some(Role::Admin));
}

#[tokio::test]
async fn missing_or_unknown_role_yields_none() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/user_roles"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            { "role": "owner" }
        ])))
        .mount(&server)
        .await;

    let role = store(&server).role_of(PrincipalId::new()).await.unwrap();
    assert_eq!(role, None);
}

#[tokio::test]
async fn role_lookup_surfaces_gateway_errors() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/user_roles"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    assert!(store(&server).role_of(PrincipalId::new()).await.is_err());
}

#[tokio::test]
async fn audit_append_posts_minimal_insert() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/rest/v1/audit_logs"))
        .and(header("prefer", "return=minimal"))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    let actor = PrincipalId::new();
    let target = PrincipalId::new();
    let record = AuditRecord::new(
        actor,
        target,
        AuditAction::PasswordReset,
        serde_json::json!({ "force_change": false }),
    );
    store(&server).append(&record).await.unwrap();

    let received = server.received_requests().await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&received[0].body).unwrap();
    assert_eq!(body["action"], "password_reset");
    assert_eq!(body["actor_id"], actor.to_string());
    assert_eq!(body["target_id"], target.to_string());
}

#[tokio::test]
async fn account_lookup_filters_by_email() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/profiles"))
        .and(query_param("email", "ilike.pilot@example.com"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            { "id": USER_ID, "email": "pilot@example.com", "login_method": "phone" }
        ])))
        .mount(&server)
        .await;

    let account = store(&server)
        .find_by_email("pilot@example.com")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(account.login_method, LoginMethod::Phone);
    assert!(!account.can_reset_by_email());
}

#[tokio::test]
async fn account_lookup_ignores_case() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/profiles"))
        .and(query_param("email", r"ilike.Crew\_Chief@Example.com"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            { "id": USER_ID, "email": "crew_chief@example.com", "login_method": "email" }
        ])))
        .mount(&server)
        .await;

    let account = store(&server)
        .find_by_email("Crew_Chief@Example.com")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(account.id.to_string(), USER_ID);
    assert!(account.can_reset_by_email());
}

#[tokio::test]
async fn account_lookup_ignores_wildcard_neighbours() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/profiles"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            { "id": USER_ID, "email": "ops-lead@example.com", "login_method": "email" }
        ])))
        .mount(&server)
        .await;

    let account = store(&server).find_by_email("ops*@example.com").await.unwrap();
    assert!(account.is_none());
}

#[tokio::test]
async fn lookup_timeout_does_not_leak_the_address() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/profiles"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(3)))
        .mount(&server)
        .await;

    let store = RestStore::new(
        ProviderConfig::new(server.uri(), "anon-key", "service-key").with_timeout_secs(1),
    )
    .unwrap();
    let err = store.find_by_email("secret.person@example.com").await.unwrap_err();

    assert_eq!(err.kind(), "http");
    let rendered = format!("{err} {err:?}");
    assert!(!rendered.contains("secret.person"), "{rendered}");
    assert!(!rendered.contains("example.com"), "{rendered}");
}

#[tokio::test]
async fn undecodable_lookup_does_not_leak_the_address() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/profiles"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let err = store(&server)
        .find_by_email("secret.person@example.com")
        .await
        .unwrap_err();

    assert_eq!(err.kind(), "decode");
    let rendered = format!("{err} {err:?}");
    assert!(!rendered.contains("secret.person"), "{rendered}");
}
