//! Refresh-cookie route guard
//!
//! Page requests without the refresh cookie are sent to `/auth`; requests
//! for `/auth` that already carry it are sent to `/survey-builder`. API,
//! static asset and favicon paths are never guarded.

use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};

use super::ProxyState;

/// Path prefixes the guard never applies to.
const UNGUARDED_PREFIXES: [&str; 4] = ["api", "_next/static", "_next/image", "favicon.ico"];

pub const AUTH_PATH: &str = "/auth";
pub const HOME_PATH: &str = "/survey-builder";

/// Outcome of the guard for one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteDecision {
    Continue,
    Redirect(&'static str),
}

/// Decides what to do with a request for `path`.
///
/// # Examples
///
/// ```
/// use surveyflow::proxy::guard::{decide, RouteDecision};
///
/// assert_eq!(decide("/dashboard", false), RouteDecision::Redirect("/auth"));
/// assert_eq!(decide("/auth", true), RouteDecision::Redirect("/survey-builder"));
/// assert_eq!(decide("/api/proxy/surveys", false), RouteDecision::Continue);
/// ```
pub fn decide(path: &str, has_refresh_cookie: bool) -> RouteDecision {
    let relative = path.trim_start_matches('/');
    if UNGUARDED_PREFIXES.iter().any(|p| relative.starts_with(p)) {
        return RouteDecision::Continue;
    }

    match (has_refresh_cookie, path == AUTH_PATH) {
        (false, false) => RouteDecision::Redirect(AUTH_PATH),
        (true, true) => RouteDecision::Redirect(HOME_PATH),
        _ => RouteDecision::Continue,
    }
}

/// Whether a `Cookie` header value carries a cookie named `name`.
pub fn has_cookie(cookie_header: &str, name: &str) -> bool {
    cookie_header
        .split(';')
        .filter_map(|pair| pair.split_once('='))
        .any(|(key, _)| key.trim() == name)
}

/// Axum middleware applying [`decide`].
pub async fn route_guard(State(state): State<ProxyState>, request: Request, next: Next) -> Response {
    let has_refresh = request
        .headers()
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .any(|v| has_cookie(v, &state.refresh_cookie));

    match decide(request.uri().path(), has_refresh) {
        RouteDecision::Continue => next.run(request).await,
        RouteDecision::Redirect(to) => {
            tracing::debug!(from = %request.uri().path(), to, "Route guard redirect");
            Redirect::temporary(to).into_response()
        }
    }
}
