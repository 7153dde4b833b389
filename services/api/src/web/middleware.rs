//! services/api/src/web/middleware.rs
//!
//! Authentication middleware for protecting routes.

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};
use civic_connect_core::{domain::Requester, ports::PortError};
use std::sync::Arc;
use tracing::debug;

use crate::{error::ApiError, web::state::AppState};

pub const SESSION_COOKIE: &str = "session";

/// Parses the auth session id out of the `Cookie` header.
pub fn session_cookie(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::COOKIE)
        .and_then(|v| v.to_str().ok())?
        .split(';')
        .find_map(|c| c.trim().strip_prefix("session="))
        .filter(|id| !id.is_empty())
}

/// Resolves the signed-in user, if any. An invalid or expired cookie counts as
/// no user at all.
pub async fn resolve_requester(state: &AppState, headers: &HeaderMap) -> Option<Requester> {
    let session_id = session_cookie(headers)?;
    match state.identity.validate_auth_session(session_id).await {
        Ok(requester) => Some(requester),
        Err(e) => {
            debug!("Ignoring auth session cookie: {}", e);
            None
        }
    }
}

/// Middleware that validates the auth session cookie and extracts the requester.
///
/// If valid, inserts the `Requester` into request extensions for handlers to use.
/// If invalid or missing, returns 401 Unauthorized.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let requester = resolve_requester(&state, req.headers())
        .await
        .ok_or(PortError::Unauthenticated)?;

    req.extensions_mut().insert(requester);
    Ok(next.run(req).await)
}

/// Like `require_auth`, but additionally rejects non-admin users with 403.
pub async fn require_admin(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let requester = resolve_requester(&state, req.headers())
        .await
        .ok_or(PortError::Unauthenticated)?;
    if !requester.is_admin() {
        return Err(PortError::Forbidden.into());
    }

    req.extensions_mut().insert(requester);
    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_session_cookie_is_found_among_others() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("theme=dark; session=abc-123; lang=en"),
        );
        assert_eq!(session_cookie(&headers), Some("abc-123"));
    }

    #[test]
    fn test_missing_or_empty_session_cookie() {
        let mut headers = HeaderMap::new();
        assert_eq!(session_cookie(&headers), None);
        headers.insert(header::COOKIE, HeaderValue::from_static("session="));
        assert_eq!(session_cookie(&headers), None);
    }
}
