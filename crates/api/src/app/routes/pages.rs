//! Server-rendered placeholder pages. Access control happens in the route
//! guard before any of these run.

use axum::{
    Extension,
    extract::Path,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};

use aerodesk_auth::Principal;

use crate::app::errors::json_error;

const LOGIN_PAGE: &str = r#"<!doctype html>
<html lang="en">
<head><meta charset="utf-8"><title>AeroDesk · Sign in</title></head>
<body>
<main>
  <h1>Sign in</h1>
  <form id="login" method="post" action="/api/auth/login">
    <label>Email <input type="email" name="email" autocomplete="username" required></label>
    <label>Password <input type="password" name="password" autocomplete="current-password" required></label>
    <button type="submit">Sign in</button>
  </form>
</main>
</body>
</html>
"#;

/// GET /login
pub async fn login_page() -> Html<&'static str> {
    Html(LOGIN_PAGE)
}

/// GET /portal/*section
pub async fn portal_page(
    Path(section): Path<String>,
    principal: Option<Extension<Principal>>,
) -> Html<String> {
    let who = principal
        .as_ref()
        .and_then(|Extension(p)| p.email().map(str::to_string))
        .unwrap_or_else(|| "signed in".to_string());
    Html(format!(
        "<!doctype html>\n<html lang=\"en\"><head><meta charset=\"utf-8\"><title>AeroDesk · {section}</title></head>\n\
         <body><header>{who}</header><main><h1>{section}</h1></main></body></html>\n",
        section = escape(&section),
        who = escape(&who),
    ))
}

pub async fn not_found() -> Response {
    json_error(StatusCode::NOT_FOUND, "Not found").into_response()
}

fn escape(raw: &str) -> String {
    raw.chars()
        .map(|c| match c {
            '<' => "&lt;".to_string(),
            '>' => "&gt;".to_string(),
            '&' => "&amp;".to_string(),
            '"' => "&quot;".to_string(),
            '\'' => "&#39;".to_string(),
            other => other.to_string(),
        })
        .collect()
}
