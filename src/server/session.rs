//! Session cookie middleware
//!
//! Resolves the [`SessionId`] from the request cookie (minting one when it is
//! missing or unreadable), exposes it to handlers as a request extension, and
//! sets the cookie on the way out for new sessions.

use axum::extract::{Request, State};
use axum::http::header::{COOKIE, SET_COOKIE};
use axum::http::{HeaderMap, HeaderValue};
use axum::middleware::Next;
use axum::response::Response;

use super::state::AppState;
use crate::session::SessionId;

/// Find `name=<uuid>` in the `Cookie` headers
pub fn read_session_cookie(headers: &HeaderMap, name: &str) -> Option<SessionId> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .and_then(|(_, value)| value.trim().parse().ok())
}

pub fn session_cookie(name: &str, id: &SessionId) -> String {
    format!("{}={}; Path=/; HttpOnly; SameSite=Lax", name, id)
}

pub async fn session_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let cookie_name = state.config.session.cookie_name.as_str();
    let (id, minted) = match read_session_cookie(request.headers(), cookie_name) {
        Some(id) => (id, false),
        None => (SessionId::new(), true),
    };

    request.extensions_mut().insert(id);
    let mut response = next.run(request).await;

    if minted {
        tracing::debug!(session = %id, "started new session");
        match HeaderValue::from_str(&session_cookie(cookie_name, &id)) {
            Ok(value) => {
                response.headers_mut().append(SET_COOKIE, value);
            }
            Err(e) => tracing::warn!(error = %e, "could not encode session cookie"),
        }
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_cookie_among_others() {
        let id = SessionId::new();
        let mut headers = HeaderMap::new();
        headers.insert(
            COOKIE,
            HeaderValue::from_str(&format!("theme=dark; storefront_session={}; x=1", id)).unwrap(),
        );
        assert_eq!(read_session_cookie(&headers, "storefront_session"), Some(id));
    }

    #[test]
    fn test_invalid_cookie_ignored() {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_static("storefront_session=garbage"));
        assert_eq!(read_session_cookie(&headers, "storefront_session"), None);
        assert_eq!(read_session_cookie(&HeaderMap::new(), "storefront_session"), None);
    }

    #[test]
    fn test_cookie_format() {
        let id = SessionId::new();
        let cookie = session_cookie("sid", &id);
        assert!(cookie.starts_with(&format!("sid={}", id)));
        assert!(cookie.contains("HttpOnly"));
    }
}
