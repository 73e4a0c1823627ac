//! Authentication Middleware
//! Mission: Gate protected routes behind a valid bearer token

use crate::auth::{api::AuthState, error::AuthError};
use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};
use tracing::debug;

/// Auth middleware that resolves the bearer token to a user.
///
/// On success the `User` is inserted into the request extensions, where
/// handlers receive it as `Extension<User>`. On failure the wrapped handler
/// never runs.
pub async fn auth_middleware(
    State(auth): State<AuthState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let user = auth
        .authenticate(bearer_token(req.headers()))
        .map_err(|err| {
            debug!(path = %req.uri().path(), "Request rejected: {}", err);
            err
        })?;

    req.extensions_mut().insert(user);

    Ok(next.run(req).await)
}

/// Extract the token from an `Authorization: Bearer <token>` header
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|s| s.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}
