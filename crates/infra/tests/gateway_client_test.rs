//! Contract tests for the auth gateway clients.
//!
//! wiremock stands in for the provider's `/auth/v1` endpoints; every test
//! checks the path, the credential headers and the error mapping.

use aerodesk_auth::PrincipalId;
use aerodesk_infra::provider::{AdminGatewayClient, AuthGatewayClient};
use aerodesk_infra::{AdminProvider, IdentityProvider, ProviderConfig, ProviderError, UserUpdate};
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const USER_ID: &str = "550e8400-e29b-41d4-a716-446655440000";

fn config(server: &MockServer) -> ProviderConfig {
    ProviderConfig::new(server.uri(), "anon-key", "service-key").with_timeout_secs(5)
}

fn user_json() -> serde_json::Value {
    serde_json::json!({
        "id": USER_ID,
        "email": "ops@example.com",
        "phone": "",
        "role": "authenticated"
    })
}

fn session_json(access: &str, refresh: &str) -> serde_json::Value {
    serde_json::json!({
        "access_token": access,
        "refresh_token": refresh,
        "token_type": "bearer",
        "expires_in": 3600,
        "expires_at": 1_900_000_000,
        "user": user_json()
    })
}

// ── GET /auth/v1/user ─────────────────────────────────────────────────

#[tokio::test]
async fn get_user_sends_anon_key_and_bearer_token() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/auth/v1/user"))
        .and(header("apikey", "anon-key"))
        .and(header("authorization", "Bearer access-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(user_json()))
        .expect(1)
        .mount(&server)
        .await;

    let client = AuthGatewayClient::new(config(&server)).unwrap();
    let principal = client.get_user("access-1").await.unwrap();

    assert_eq!(principal.id, USER_ID.parse::<PrincipalId>().unwrap());
    assert_eq!(principal.email.as_deref(), Some("ops@example.com"));
    assert_eq!(principal.phone, None);
}

#[tokio::test]
async fn get_user_maps_401_to_token_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/auth/v1/user"))
        .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
            "msg": "invalid JWT"
        })))
        .mount(&server)
        .await;

    let client = AuthGatewayClient::new(config(&server)).unwrap();
    let err = client.get_user("stale").await.unwrap_err();
    assert!(matches!(err, ProviderError::TokenRejected));
}

#[tokio::test]
async fn get_user_maps_5xx_to_status_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/auth/v1/user"))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .mount(&server)
        .await;

    let client = AuthGatewayClient::new(config(&server)).unwrap();
    match client.get_user("t").await.unwrap_err() {
        ProviderError::Status { status, body, .. } => {
            assert_eq!(status, 503);
            assert_eq!(body, "maintenance");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

// ── POST /auth/v1/token ───────────────────────────────────────────────

#[tokio::test]
async fn refresh_session_posts_refresh_grant() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/v1/token"))
        .and(query_param("grant_type", "refresh_token"))
        .and(body_json(serde_json::json!({ "refresh_token": "refresh-1" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(session_json("access-2", "refresh-2")))
        .expect(1)
        .mount(&server)
        .await;

    let client = AuthGatewayClient::new(config(&server)).unwrap();
    let session = client.refresh_session("refresh-1").await.unwrap();

    assert_eq!(session.access_token, "access-2");
    assert_eq!(session.refresh_token, "refresh-2");
}

#[tokio::test]
async fn password_grant_maps_400_to_invalid_credentials() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/v1/token"))
        .and(query_param("grant_type", "password"))
        .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
            "error": "invalid_grant",
            "error_description": "Invalid login credentials"
        })))
        .mount(&server)
        .await;

    let client = AuthGatewayClient::new(config(&server)).unwrap();
    let err = client
        .sign_in_with_password("ops@example.com", "wrong")
        .await
        .unwrap_err();
    assert!(matches!(err, ProviderError::InvalidCredentials));
    assert!(err.is_auth_rejection());
}

// ── Admin endpoints ───────────────────────────────────────────────────

#[tokio::test]
async fn admin_get_user_uses_service_key_and_maps_404_to_none() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("/auth/v1/admin/users/{USER_ID}")))
        .and(header("apikey", "service-key"))
        .and(header("authorization", "Bearer service-key"))
        .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
            "msg": "User not found"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = AdminGatewayClient::new(config(&server)).unwrap();
    let found = client
        .get_user_by_id(USER_ID.parse().unwrap())
        .await
        .unwrap();
    assert!(found.is_none());
}

#[tokio::test]
async fn admin_update_user_puts_password_and_metadata() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path(format!("/auth/v1/admin/users/{USER_ID}")))
        .and(header("apikey", "service-key"))
        .and(body_json(serde_json::json!({
            "password": "Hangar#42b",
            "user_metadata": { "force_password_change": true }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(user_json()))
        .expect(1)
        .mount(&server)
        .await;

    let client = AdminGatewayClient::new(config(&server)).unwrap();
    client
        .update_user(
            USER_ID.parse().unwrap(),
            UserUpdate {
                password: Some("Hangar#42b".into()),
                user_metadata: Some(serde_json::json!({ "force_password_change": true })),
            },
        )
        .await
        .unwrap();
}
