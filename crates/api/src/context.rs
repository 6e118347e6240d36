use std::collections::HashMap;

use axum::http::HeaderMap;

use aerodesk_auth::{Principal, Role};

use crate::client_ip::{client_ip, user_agent};
use crate::state::AppState;

/// Caller metadata recorded alongside audited actions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestMeta {
    pub ip: String,
    pub user_agent: String,
}

impl RequestMeta {
    pub fn from_headers(headers: &HeaderMap) -> Self {
        Self {
            ip: client_ip(headers),
            user_agent: user_agent(headers),
        }
    }
}

/// Everything a wrapped handler gets besides the request itself.
#[derive(Clone)]
pub struct RouteContext {
    pub state: AppState,
    pub params: HashMap<String, String>,
    pub meta: RequestMeta,
}

impl RouteContext {
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }
}

/// Authenticated identity + role, present only when authorization passed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthContext {
    pub principal: Principal,
    pub role: Role,
}
