use axum::extract::FromRequestParts;
use axum::http::{HeaderMap, request::Parts};
use axum::response::{IntoResponse, Response};
use subtle::ConstantTimeEq;

use crate::error::BuddyError;
use crate::router::BuddyState;

fn key_matches(candidate: &str, expected: &str) -> bool {
    bool::from(candidate.as_bytes().ct_eq(expected.as_bytes()))
}

/// Ensure the inbound request carries the admin key.
/// Accepts either:
/// - Query string: `?key=...`
/// - Header: `x-admin-key: ...`
/// - Header: `Authorization: Bearer ...`
pub fn ensure_authorized(
    headers: &HeaderMap,
    query: Option<&str>,
    expected: &str,
) -> Result<(), BuddyError> {
    // 1) header: x-admin-key
    if let Some(hv) = headers.get("x-admin-key").and_then(|v| v.to_str().ok())
        && key_matches(hv, expected)
    {
        return Ok(());
    }

    // 2) header: Authorization: Bearer <key>
    if let Some(auth) = headers.get("authorization").and_then(|v| v.to_str().ok()) {
        let auth = auth.trim();
        if let Some(token) = auth
            .strip_prefix("Bearer ")
            .or_else(|| auth.strip_prefix("bearer "))
            && key_matches(token, expected)
        {
            return Ok(());
        }
    }

    // 3) query: key=...
    if let Some(qs) = query {
        for (k, v) in url::form_urlencoded::parse(qs.as_bytes()) {
            if k == "key" && key_matches(&v, expected) {
                return Ok(());
            }
        }
    }

    Err(BuddyError::Unauthorized)
}

/// Extractor guarding admin routes. With no admin key configured the routes
/// answer 404 as if they did not exist.
#[derive(Debug, Clone, Copy)]
pub struct RequireAdminKey;

impl FromRequestParts<BuddyState> for RequireAdminKey {
    type Rejection = Response;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &BuddyState,
    ) -> Result<Self, Self::Rejection> {
        let expected = state.admin_key.as_ref();
        if expected.is_empty() {
            return Err(BuddyError::RouteDisabled.into_response());
        }
        ensure_authorized(&parts.headers, parts.uri.query(), expected)
            .map_err(IntoResponse::into_response)?;
        Ok(Self)
    }
}
