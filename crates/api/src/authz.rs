//! Auth handler wrapper: the single authorization chokepoint for API routes.
//!
//! `with_auth(handler, minimum)` turns a `(Request, RouteContext, AuthContext)`
//! handler into a plain axum handler that only runs the inner one once the
//! caller is authenticated and holds at least `minimum`.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;

use axum::{
    extract::{FromRequestParts, Path, Request, State},
    response::{IntoResponse, Response},
};

use aerodesk_auth::{Principal, Role, require_role};

use crate::app::errors::ApiError;
use crate::context::{AuthContext, RequestMeta, RouteContext};
use crate::session::resolve_session;
use crate::state::AppState;

pub type HandlerFuture = Pin<Box<dyn Future<Output = Response> + Send>>;

/// A handler that runs behind [`with_auth`].
pub trait GuardedHandler: Clone + Send + Sync + 'static {
    fn call(&self, req: Request, ctx: RouteContext, auth: AuthContext) -> HandlerFuture;
}

impl<F, Fut, R> GuardedHandler for F
where
    F: Fn(Request, RouteContext, AuthContext) -> Fut + Clone + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + 'static,
{
    fn call(&self, req: Request, ctx: RouteContext, auth: AuthContext) -> HandlerFuture {
        let fut = (self)(req, ctx, auth);
        Box::pin(async move { fut.await.into_response() })
    }
}

pub fn with_auth<H>(
    handler: H,
    minimum: Role,
) -> impl Fn(State<AppState>, Request) -> HandlerFuture + Clone + Send + Sync + 'static
where
    H: GuardedHandler,
{
    move |State(state): State<AppState>, req: Request| {
        let handler = handler.clone();
        let fut: HandlerFuture = Box::pin(async move { guarded_call(state, req, handler, minimum).await });
        fut
    }
}

async fn guarded_call<H: GuardedHandler>(state: AppState, req: Request, handler: H, minimum: Role) -> Response {
    let (mut parts, body) = req.into_parts();
    let tokens = state.cookies.read_tokens(&parts.headers);
    let resolution = resolve_session(state.identity.as_ref(), &state.cookies, tokens).await;

    let mut response = match authorize(&state, resolution.principal, minimum).await {
        Err(err) => err.into_response(),
        Ok(auth) => {
            let params = Path::<HashMap<String, String>>::from_request_parts(&mut parts, &state)
                .await
                .map(|Path(params)| params)
                .unwrap_or_default();
            let ctx = RouteContext {
                state: state.clone(),
                params,
                meta: RequestMeta::from_headers(&parts.headers),
            };
            handler.call(Request::from_parts(parts, body), ctx, auth).await
        }
    };

    state
        .cookies
        .apply_to_response(&resolution.mutations, response.headers_mut());
    response
}

async fn authorize(state: &AppState, principal: Option<Principal>, minimum: Role) -> Result<AuthContext, ApiError> {
    let principal = principal.ok_or(ApiError::Unauthenticated)?;

    // A failed lookup is indistinguishable from "no role".
    let held = match state.roles.role_of(principal.id).await {
        Ok(role) => role,
        Err(e) => {
            tracing::warn!(principal_id = %principal.id, error = %e, "role lookup failed; denying");
            return Err(ApiError::Unauthorized);
        }
    };

    let role = require_role(held, minimum).map_err(|e| {
        tracing::info!(principal_id = %principal.id, reason = %e, "authorization denied");
        ApiError::from(e)
    })?;

    Ok(AuthContext { principal, role })
}
