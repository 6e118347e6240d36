//! Privileged account administration.
//!
//! Every mutation here goes through the service-key admin client; the
//! requester's own session is only used to authorize.

use axum::{
    Json, Router,
    extract::{Request, State},
    http::StatusCode,
    routing::post,
};
use serde_json::json;
use subtle::ConstantTimeEq;

use aerodesk_auth::{AuditAction, AuditRecord, PrincipalId, Role, validate_password};
use aerodesk_core::Email;
use aerodesk_infra::{NewUser, ProviderError, UserUpdate};

use crate::app::audit;
use crate::app::dto::{ProvisionRequest, ProvisionResponse, ResetPasswordRequest, SuccessResponse, read_json};
use crate::app::errors::ApiError;
use crate::authz::with_auth;
use crate::context::{AuthContext, RequestMeta, RouteContext};
use crate::state::AppState;

pub const SETUP_SECRET_HEADER: &str = "x-admin-setup-secret";

// ─────────────────────────────────────────────────────────────────────────────
// Router
// ─────────────────────────────────────────────────────────────────────────────

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/users/:id/password",
            post(with_auth(reset_user_password, Role::SuperAdmin)),
        )
        .route("/provision", post(provision))
}

// ─────────────────────────────────────────────────────────────────────────────
// Handlers
// ─────────────────────────────────────────────────────────────────────────────

/// POST /api/admin/users/:id/password - Set another user's password
pub async fn reset_user_password(
    req: Request,
    ctx: RouteContext,
    auth: AuthContext,
) -> Result<Json<SuccessResponse>, ApiError> {
    let target_id: PrincipalId = ctx
        .param("id")
        .unwrap_or_default()
        .parse()
        .map_err(|_| ApiError::validation("Invalid user ID format"))?;

    let body: ResetPasswordRequest = read_json(req).await?;
    validate_password(&body.password)?;
    let force_change = body.force_change.unwrap_or(false);

    let state = &ctx.state;
    state
        .admin
        .get_user_by_id(target_id)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    state
        .admin
        .update_user(
            target_id,
            UserUpdate {
                password: Some(body.password),
                user_metadata: Some(json!({ "force_password_change": force_change })),
            },
        )
        .await?;

    audit::record(
        state,
        AuditRecord::new(
            auth.principal.id,
            target_id,
            AuditAction::PasswordReset,
            json!({ "force_change": force_change }),
        )
        .with_request_meta(ctx.meta.ip.clone(), ctx.meta.user_agent.clone()),
    )
    .await;

    Ok(Json(SuccessResponse::with_message("Password reset successfully")))
}

/// POST /api/admin/provision - Bootstrap the first super_admin
///
/// Gated by the setup secret rather than a session; closes itself once any
/// super_admin exists.
pub async fn provision(
    State(state): State<AppState>,
    req: Request,
) -> Result<(StatusCode, Json<ProvisionResponse>), ApiError> {
    let meta = RequestMeta::from_headers(req.headers());
    let presented = req
        .headers()
        .get(SETUP_SECRET_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    if !secret_matches(presented, &state.config.admin_setup_secret) {
        tracing::warn!(ip = %meta.ip, "provisioning attempt with bad setup secret");
        return Err(ApiError::Unauthorized);
    }

    let body: ProvisionRequest = read_json(req).await?;
    let email = Email::parse(&body.email)?;
    validate_password(&body.password)?;

    let _provisioning = state.provisioning.lock().await;
    if state.roles.any_with_role(Role::SuperAdmin).await? {
        return Err(ApiError::Conflict("A super admin already exists".into()));
    }

    let user_id = match state
        .admin
        .create_user(NewUser {
            email: email.as_str().to_string(),
            password: body.password.clone(),
            email_confirm: true,
        })
        .await
    {
        Ok(user) => user.id,
        Err(ProviderError::Status { status: 422, .. }) => {
            resume_existing_account(&state, &email, &body.password).await?
        }
        Err(e) => return Err(e.into()),
    };

    state.roles.assign(user_id, Role::SuperAdmin).await?;

    audit::record(
        &state,
        AuditRecord::new(
            user_id,
            user_id,
            AuditAction::AccountProvisioned,
            json!({ "role": Role::SuperAdmin.as_str() }),
        )
        .with_request_meta(meta.ip, meta.user_agent),
    )
    .await;

    Ok((
        StatusCode::CREATED,
        Json(ProvisionResponse {
            success: true,
            user_id: user_id.to_string(),
        }),
    ))
}

/// An earlier attempt may have created the account and then failed to
/// assign the role. The account is taken over only when the presented
/// password signs in to it.
async fn resume_existing_account(
    state: &AppState,
    email: &Email,
    password: &str,
) -> Result<PrincipalId, ApiError> {
    let session = state
        .identity
        .sign_in_with_password(email.as_str(), password)
        .await
        .map_err(|e| {
            if e.is_auth_rejection() {
                ApiError::Conflict("Account already exists".into())
            } else {
                ApiError::upstream(e)
            }
        })?;

    if let Err(e) = state.identity.sign_out(&session.access_token).await {
        tracing::warn!(error_kind = e.kind(), "could not end the verification session");
    }
    tracing::info!(principal_id = %session.user.id, "resuming provisioning of existing account");
    Ok(session.user.id)
}

fn secret_matches(presented: &str, expected: &str) -> bool {
    presented.as_bytes().ct_eq(expected.as_bytes()).into()
}
