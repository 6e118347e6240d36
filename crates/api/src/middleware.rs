//! Route guard: runs once per request before routing.
//!
//! Resolves the session from cookies, decides whether the path may be served,
//! and applies any staged cookie mutations to whatever response goes out.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};

use crate::session::resolve_session;
use crate::state::AppState;

/// Which paths are protected and where the guard redirects to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutePolicy {
    pub protected_prefix: String,
    pub login_path: String,
    pub landing_path: String,
}

impl Default for RoutePolicy {
    fn default() -> Self {
        Self {
            protected_prefix: "/portal".into(),
            login_path: "/login".into(),
            landing_path: "/portal/dashboard".into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathClass {
    Protected { root: bool },
    Login,
    Unclassified,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    PassThrough,
    Redirect(String),
}

impl RoutePolicy {
    /// Prefix matching respects segment boundaries: `/portalx` is not protected.
    pub fn classify(&self, path: &str) -> PathClass {
        let prefix = self.protected_prefix.trim_end_matches('/');
        if path == prefix || path.strip_prefix(prefix) == Some("/") {
            return PathClass::Protected { root: true };
        }
        if path
            .strip_prefix(prefix)
            .is_some_and(|rest| rest.starts_with('/'))
        {
            return PathClass::Protected { root: false };
        }
        if path == self.login_path {
            return PathClass::Login;
        }
        PathClass::Unclassified
    }

    pub fn decide(&self, class: PathClass, authenticated: bool) -> GuardDecision {
        match (class, authenticated) {
            (PathClass::Protected { .. }, false) => GuardDecision::Redirect(self.login_path.clone()),
            (PathClass::Login, true) | (PathClass::Protected { root: true }, true) => {
                GuardDecision::Redirect(self.landing_path.clone())
            }
            _ => GuardDecision::PassThrough,
        }
    }
}

pub async fn route_guard(State(state): State<AppState>, mut req: Request, next: Next) -> Response {
    let tokens = state.cookies.read_tokens(req.headers());
    let resolution = resolve_session(state.identity.as_ref(), &state.cookies, tokens).await;

    let class = state.policy.classify(req.uri().path());
    let decision = state.policy.decide(class, resolution.principal.is_some());

    let mut response = match decision {
        GuardDecision::Redirect(location) => {
            tracing::debug!(path = %req.uri().path(), %location, "route guard redirect");
            Redirect::temporary(&location).into_response()
        }
        GuardDecision::PassThrough => {
            state
                .cookies
                .apply_to_request(&resolution.mutations, req.headers_mut());
            if let Some(principal) = resolution.principal {
                req.extensions_mut().insert(principal);
            }
            next.run(req).await
        }
    };

    state
        .cookies
        .apply_to_response(&resolution.mutations, response.headers_mut());
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn policy() -> RoutePolicy {
        RoutePolicy::default()
    }

    #[test]
    fn classification_table() {
        let p = policy();
        assert_eq!(p.classify("/portal"), PathClass::Protected { root: true });
        assert_eq!(p.classify("/portal/"), PathClass::Protected { root: true });
        assert_eq!(p.classify("/portal/users"), PathClass::Protected { root: false });
        assert_eq!(p.classify("/portalx"), PathClass::Unclassified);
        assert_eq!(p.classify("/login"), PathClass::Login);
        assert_eq!(p.classify("/login/help"), PathClass::Unclassified);
        assert_eq!(p.classify("/"), PathClass::Unclassified);
        assert_eq!(p.classify("/api/auth/me"), PathClass::Unclassified);
    }

    #[test]
    fn decision_table() {
        let p = policy();
        let login = GuardDecision::Redirect("/login".into());
        let landing = GuardDecision::Redirect("/portal/dashboard".into());

        assert_eq!(p.decide(PathClass::Protected { root: false }, false), login);
        assert_eq!(p.decide(PathClass::Protected { root: true }, false), login);
        assert_eq!(p.decide(PathClass::Protected { root: true }, true), landing);
        assert_eq!(p.decide(PathClass::Login, true), landing);
        assert_eq!(p.decide(PathClass::Protected { root: false }, true), GuardDecision::PassThrough);
        assert_eq!(p.decide(PathClass::Login, false), GuardDecision::PassThrough);
        assert_eq!(p.decide(PathClass::Unclassified, false), GuardDecision::PassThrough);
        assert_eq!(p.decide(PathClass::Unclassified, true), GuardDecision::PassThrough);
    }

    proptest! {
        #[test]
        fn nested_portal_paths_are_protected(segments in prop::collection::vec("[a-z0-9-]{1,12}", 1..5)) {
            let path = format!("/portal/{}", segments.join("/"));
            prop_assert_eq!(policy().classify(&path), PathClass::Protected { root: false });
        }

        #[test]
        fn anonymous_never_passes_into_portal(suffix in "(/[a-z]{0,8}){0,3}") {
            let p = policy();
            let class = p.classify(&format!("/portal{suffix}"));
            prop_assert_eq!(p.decide(class, false), GuardDecision::Redirect("/login".into()));
        }
    }
}
