use axum::{
    extract::State,
    http::{header::AUTHORIZATION, Request},
    middleware::Next,
    response::Response,
};
use subtle::ConstantTimeEq;

use crate::error::AppError;
use crate::AppState;

/// Guards the admin routes with `ADMIN_API_KEY`, sent as a bearer token.
/// Without a configured key every call is refused.
pub async fn admin_auth<B>(
    State(state): State<AppState>,
    req: Request<B>,
    next: Next<B>,
) -> Result<Response, AppError> {
    let Some(admin_api_key) = state.admin_api_key.as_ref() else {
        tracing::warn!(uri = %req.uri().path(), "Admin call refused, ADMIN_API_KEY is not set");
        return Err(AppError::Unauthorized("admin API is disabled".to_string()));
    };

    let authorized = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .map(|auth| auth.strip_prefix("Bearer ").unwrap_or(auth))
        .map(|token| bool::from(token.as_bytes().ct_eq(admin_api_key.expose().as_bytes())))
        .unwrap_or(false);

    if authorized {
        Ok(next.run(req).await)
    } else {
        tracing::warn!(uri = %req.uri().path(), "Admin call with missing or wrong key");
        Err(AppError::Unauthorized("invalid admin API key".to_string()))
    }
}
