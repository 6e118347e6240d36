//! Session resolution: request cookies → (principal, cookie mutations).
//!
//! Pure with respect to the HTTP exchange: nothing here touches a response.
//! The route guard and the handler wrapper apply the returned mutations
//! themselves.

use aerodesk_auth::{Principal, SessionTokens};
use aerodesk_infra::IdentityProvider;

use crate::cookies::{CookieMutation, CookieSettings};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionResolution {
    pub principal: Option<Principal>,
    pub mutations: Vec<CookieMutation>,
}

impl SessionResolution {
    fn anonymous() -> Self {
        Self::default()
    }

    fn signed_out(cookies: &CookieSettings) -> Self {
        Self {
            principal: None,
            mutations: cookies.clear_session(),
        }
    }
}

/// Resolve the principal behind a token pair.
///
/// - A valid access token resolves directly.
/// - A rejected or missing access token falls back to the refresh token; a
///   successful refresh stages the rotated tokens.
/// - Tokens the provider rejects are cleared.
/// - Provider outages resolve to "no principal" and leave cookies alone, so a
///   transient failure neither admits the request nor logs the user out.
pub async fn resolve_session(
    provider: &dyn IdentityProvider,
    cookies: &CookieSettings,
    tokens: SessionTokens,
) -> SessionResolution {
    if tokens.is_empty() {
        return SessionResolution::anonymous();
    }

    if let Some(access_token) = tokens.access_token.as_deref() {
        match provider.get_user(access_token).await {
            Ok(principal) => {
                return SessionResolution {
                    principal: Some(principal),
                    mutations: Vec::new(),
                };
            }
            Err(e) if e.is_auth_rejection() => {
                tracing::debug!("access token rejected; attempting refresh");
            }
            Err(e) => {
                tracing::warn!(error = %e, "session lookup failed; treating request as anonymous");
                return SessionResolution::anonymous();
            }
        }
    }

    let Some(refresh_token) = tokens.refresh_token.as_deref() else {
        return SessionResolution::signed_out(cookies);
    };

    match provider.refresh_session(refresh_token).await {
        Ok(session) => {
            tracing::debug!(principal_id = %session.user.id, "session refreshed");
            SessionResolution {
                mutations: cookies.store_session(&session),
                principal: Some(session.user),
            }
        }
        Err(e) if e.is_auth_rejection() => SessionResolution::signed_out(cookies),
        Err(e) => {
            tracing::warn!(error = %e, "session refresh failed; treating request as anonymous");
            SessionResolution::anonymous()
        }
    }
}
