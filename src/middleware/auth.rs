use std::sync::Arc;

use axum::extract::FromRequestParts;
use axum::http::{header, request::Parts, HeaderMap};

use crate::error::ApiError;
use crate::state::AppState;

/// Identity verified by the guard. Only the email is carried; role checks
/// happen in handlers against the stored user record.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub email: String,
}

impl FromRequestParts<Arc<AppState>> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_from_header(&parts.headers).ok_or(ApiError::Unauthorized)?;
        let claims = state.jwt.verify(&token).map_err(|_| ApiError::Unauthorized)?;
        Ok(AuthUser {
            email: claims.email,
        })
    }
}

fn bearer_from_header(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|s| s.strip_prefix("Bearer "))
        .map(|s| s.to_string())
}
