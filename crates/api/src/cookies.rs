//! Session cookie codec.
//!
//! Reading is done from request headers; writing is expressed as a list of
//! [`CookieMutation`] values that the caller applies to the outgoing response
//! (and, on pass-through, to the forwarded request) explicitly.

use axum::http::{HeaderMap, HeaderValue, header};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};

use aerodesk_auth::{Session, SessionTokens};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CookieMutation {
    Set { name: String, value: String },
    Remove { name: String },
}

/// Names and attributes of the session cookies.
#[derive(Debug, Clone)]
pub struct CookieSettings {
    access_name: String,
    refresh_name: String,
    secure: bool,
}

impl CookieSettings {
    pub fn new(prefix: &str, secure: bool) -> Self {
        Self {
            access_name: format!("{prefix}-access-token"),
            refresh_name: format!("{prefix}-refresh-token"),
            secure,
        }
    }

    /// Token pair carried by the request, ignoring empty values.
    pub fn read_tokens(&self, headers: &HeaderMap) -> SessionTokens {
        let jar = CookieJar::from_headers(headers);
        let value = |name: &str| {
            jar.get(name)
                .map(|c| c.value().to_string())
                .filter(|v| !v.is_empty())
        };
        SessionTokens {
            access_token: value(&self.access_name),
            refresh_token: value(&self.refresh_name),
        }
    }

    pub fn store_session(&self, session: &Session) -> Vec<CookieMutation> {
        vec![
            CookieMutation::Set {
                name: self.access_name.clone(),
                value: session.access_token.clone(),
            },
            CookieMutation::Set {
                name: self.refresh_name.clone(),
                value: session.refresh_token.clone(),
            },
        ]
    }

    pub fn clear_session(&self) -> Vec<CookieMutation> {
        vec![
            CookieMutation::Remove {
                name: self.access_name.clone(),
            },
            CookieMutation::Remove {
                name: self.refresh_name.clone(),
            },
        ]
    }

    fn to_cookie(&self, mutation: &CookieMutation) -> Cookie<'static> {
        let (name, value) = match mutation {
            CookieMutation::Set { name, value } => (name.clone(), value.clone()),
            CookieMutation::Remove { name } => (name.clone(), String::new()),
        };
        let mut cookie = Cookie::build((name, value))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .secure(self.secure)
            .build();
        if matches!(mutation, CookieMutation::Remove { .. }) {
            cookie.make_removal();
        }
        cookie
    }

    /// Append one `Set-Cookie` header per mutation.
    pub fn apply_to_response(&self, mutations: &[CookieMutation], headers: &mut HeaderMap) {
        for mutation in mutations {
            let rendered = self.to_cookie(mutation).to_string();
            match HeaderValue::from_str(&rendered) {
                Ok(value) => {
                    headers.append(header::SET_COOKIE, value);
                }
                Err(e) => tracing::warn!(error = %e, "dropping unencodable session cookie"),
            }
        }
    }

    /// Rewrite the request `Cookie` header so downstream handlers observe
    /// the same session the response will persist.
    pub fn apply_to_request(&self, mutations: &[CookieMutation], headers: &mut HeaderMap) {
        if mutations.is_empty() {
            return;
        }

        let jar = CookieJar::from_headers(headers);
        let mut pairs: Vec<(String, String)> = jar
            .iter()
            .map(|c| (c.name().to_string(), c.value().to_string()))
            .collect();

        for mutation in mutations {
            match mutation {
                CookieMutation::Set { name, value } => {
                    pairs.retain(|(n, _)| n != name);
                    pairs.push((name.clone(), value.clone()));
                }
                CookieMutation::Remove { name } => pairs.retain(|(n, _)| n != name),
            }
        }

        headers.remove(header::COOKIE);
        if pairs.is_empty() {
            return;
        }
        let rendered = pairs
            .iter()
            .map(|(n, v)| format!("{n}={v}"))
            .collect::<Vec<_>>()
            .join("; ");
        if let Ok(value) = HeaderValue::from_str(&rendered) {
            headers.insert(header::COOKIE, value);
        }
    }
}
