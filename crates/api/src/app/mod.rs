//! HTTP API application wiring (Axum router + route guard).
//!
//! - `routes/`: HTTP routes + handlers (one file per area)
//! - `dto.rs`: request/response DTOs and JSON body parsing
//! - `errors.rs`: consistent error responses
//! - `audit.rs`: best-effort audit writes

use axum::Router;
use tower::ServiceBuilder;

use crate::middleware::route_guard;
use crate::state::AppState;

pub mod audit;
pub mod dto;
pub mod errors;
pub mod routes;

/// Build the full HTTP router (public entrypoint used by `main.rs`).
///
/// The route guard wraps every route, including the fallback.
pub fn build_app(state: AppState) -> Router {
    routes::router()
        .layer(ServiceBuilder::new().layer(axum::middleware::from_fn_with_state(
            state.clone(),
            route_guard,
        )))
        .with_state(state)
}
