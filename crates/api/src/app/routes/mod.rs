use axum::{Router, routing::get};

use crate::state::AppState;

pub mod admin;
pub mod auth;
pub mod pages;
pub mod system;

/// Every route the server exposes; the route guard wraps all of them.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/health", get(system::health))
        .route("/login", get(pages::login_page))
        .route("/portal/*section", get(pages::portal_page))
        .nest("/api/auth", auth::router())
        .nest("/api/admin", admin::router())
        .fallback(pages::not_found)
}
