//! Session and self-service credential routes.

use axum::{
    Json, Router,
    extract::{Request, State},
    http::HeaderMap,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde_json::json;
use tokio::time::{Instant, sleep_until};

use aerodesk_auth::{AuditAction, AuditRecord, Role, validate_password};
use aerodesk_core::Email;
use aerodesk_infra::UserUpdate;

use crate::app::audit;
use crate::app::dto::{
    ChangePasswordRequest, EligibilityRequest, LoginRequest, LoginResponse, MeResponse, MessageResponse,
    SuccessResponse, read_json,
};
use crate::app::errors::ApiError;
use crate::authz::with_auth;
use crate::context::{AuthContext, RequestMeta, RouteContext};
use crate::state::AppState;

/// The only body the eligibility endpoint ever returns for valid input.
pub const ELIGIBILITY_MESSAGE: &str =
    "If an account with that email exists and is eligible, you will receive password reset instructions.";

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/me", get(with_auth(me, Role::User)))
        .route("/change-password", post(with_auth(change_password, Role::User)))
        .route("/reset-eligibility", post(reset_eligibility))
}

/// POST /api/auth/login
pub async fn login(State(state): State<AppState>, req: Request) -> Result<Response, ApiError> {
    let body: LoginRequest = read_json(req).await?;
    let email = Email::parse(&body.email)?;
    if body.password.is_empty() {
        return Err(ApiError::validation("Password is required"));
    }

    let session = state
        .identity
        .sign_in_with_password(email.as_str(), &body.password)
        .await
        .map_err(|e| {
            if e.is_auth_rejection() {
                tracing::info!(email_domain = %email.domain(), "sign-in rejected");
                ApiError::InvalidCredentials
            } else {
                ApiError::upstream(e)
            }
        })?;

    tracing::info!(principal_id = %session.user.id, "signed in");
    let mut response = Json(LoginResponse::from(&session.user)).into_response();
    state
        .cookies
        .apply_to_response(&state.cookies.store_session(&session), response.headers_mut());
    Ok(response)
}

/// POST /api/auth/logout
///
/// Always clears the session cookies, even if the provider call fails.
pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let tokens = state.cookies.read_tokens(&headers);
    if let Some(access_token) = tokens.access_token.as_deref() {
        if let Err(e) = state.identity.sign_out(access_token).await {
            tracing::warn!(error = %e, "provider sign-out failed; clearing cookies anyway");
        }
    }

    let mut response = Json(SuccessResponse::ok()).into_response();
    state
        .cookies
        .apply_to_response(&state.cookies.clear_session(), response.headers_mut());
    response
}

/// GET /api/auth/me
pub async fn me(_req: Request, _ctx: RouteContext, auth: AuthContext) -> Json<MeResponse> {
    Json(MeResponse::new(&auth.principal, auth.role))
}

/// POST /api/auth/change-password
///
/// The current password is re-verified with a fresh sign-in; the update
/// itself goes through the admin client.
pub async fn change_password(
    req: Request,
    ctx: RouteContext,
    auth: AuthContext,
) -> Result<Json<SuccessResponse>, ApiError> {
    let body: ChangePasswordRequest = read_json(req).await?;
    if body.current_password.is_empty() {
        return Err(ApiError::validation("Current password is required"));
    }
    validate_password(&body.new_password)?;
    if body.new_password == body.current_password {
        return Err(ApiError::validation(
            "New password must be different from the current password",
        ));
    }

    let principal = &auth.principal;
    let email = principal
        .email()
        .ok_or_else(|| ApiError::validation("Password change requires an email sign-in"))?;

    let state = &ctx.state;
    if let Err(e) = state
        .identity
        .sign_in_with_password(email, &body.current_password)
        .await
    {
        if e.is_auth_rejection() {
            tracing::info!(principal_id = %principal.id, "password change rejected: wrong current password");
            return Err(ApiError::validation("Current password is incorrect"));
        }
        return Err(ApiError::upstream(e));
    }

    state
        .admin
        .update_user(
            principal.id,
            UserUpdate {
                password: Some(body.new_password),
                user_metadata: Some(json!({ "force_password_change": false })),
            },
        )
        .await?;

    audit::record(
        state,
        AuditRecord::new(principal.id, principal.id, AuditAction::PasswordChange, json!({}))
            .with_request_meta(ctx.meta.ip.clone(), ctx.meta.user_agent.clone()),
    )
    .await;

    Ok(Json(SuccessResponse::with_message("Password changed successfully")))
}

/// POST /api/auth/reset-eligibility
///
/// Response body and latency must not depend on whether the account exists.
pub async fn reset_eligibility(
    State(state): State<AppState>,
    req: Request,
) -> Result<Json<MessageResponse>, ApiError> {
    let started = Instant::now();
    let meta = RequestMeta::from_headers(req.headers());

    // Only a body that is not `{ "email": <string> }` is rejected; a malformed
    // address gets the same answer as an unknown one.
    let body: EligibilityRequest = read_json(req).await?;

    let eligible = match Email::parse(&body.email) {
        Ok(email) => {
            tracing::info!(email_domain = %email.domain(), ip = %meta.ip, "password reset eligibility check");
            match state
                .accounts
                .find_by_email(&email.as_str().to_ascii_lowercase())
                .await
            {
                Ok(Some(account)) => account.can_reset_by_email(),
                Ok(None) => false,
                Err(e) => {
                    tracing::warn!(error_kind = e.kind(), "account lookup failed during eligibility check");
                    false
                }
            }
        }
        Err(_) => {
            tracing::info!(ip = %meta.ip, "password reset eligibility check with malformed address");
            false
        }
    };
    tracing::debug!(eligible, "eligibility computed");

    sleep_until(started + state.config.eligibility_floor).await;

    Ok(Json(MessageResponse {
        message: ELIGIBILITY_MESSAGE,
    }))
}
