//! Client address extraction for audit records and security logs.

use axum::http::HeaderMap;

use aerodesk_auth::audit::UNKNOWN;

/// Headers consulted in priority order. Only the first hop of
/// `x-forwarded-for` is the client; later entries are proxies.
const IP_HEADERS: [&str; 4] = ["x-forwarded-for", "x-real-ip", "cf-connecting-ip", "x-client-ip"];

pub fn client_ip(headers: &HeaderMap) -> String {
    IP_HEADERS
        .iter()
        .find_map(|name| {
            let raw = headers.get(*name)?.to_str().ok()?;
            let first = raw.split(',').next()?.trim();
            (!first.is_empty()).then(|| first.to_string())
        })
        .unwrap_or_else(|| UNKNOWN.to_string())
}

pub fn user_agent(headers: &HeaderMap) -> String {
    headers
        .get(axum::http::header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| UNKNOWN.to_string())
}
