//! Bearer-token authentication for the task routes
//!
//! Every request under `/tasks` must carry `Authorization: Bearer <token>`.
//! The token is handed to the configured [`TokenVerifier`]; on success the
//! resolved [`Identity`] is stored in request extensions for handlers to pick
//! up with `Extension<Identity>`. The store is never consulted here.
//!
//! [`TokenVerifier`]: crate::identity::TokenVerifier

use axum::{
    body::Body,
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::Response,
};

use super::state::AppState;
use crate::error::{Result, TickError};
use crate::identity::Identity;

/// Pull the token out of an `Authorization` header.
///
/// The scheme is matched case-insensitively; anything other than a
/// non-empty `Bearer` credential is rejected.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str> {
    let value = headers
        .get(AUTHORIZATION)
        .ok_or_else(|| TickError::unauthorized("authorization token is missing"))?
        .to_str()
        .map_err(|_| TickError::unauthorized("authorization header is malformed"))?;

    let (scheme, token) = value
        .trim()
        .split_once(' ')
        .ok_or_else(|| TickError::unauthorized("authorization header is malformed"))?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return Err(TickError::unauthorized("expected a Bearer token"));
    }

    let token = token.trim();
    if token.is_empty() {
        return Err(TickError::unauthorized("authorization token is missing"));
    }
    Ok(token)
}

/// Axum middleware: verify the bearer, attach the identity, continue.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response> {
    // Owned: the request body is not Sync, so no borrow may cross the await.
    let token = bearer_token(request.headers())?.to_string();

    let identity: Identity = match state.verifier.verify(&token).await {
        Ok(identity) => identity,
        Err(e) => {
            tracing::info!(error = %e, path = %request.uri().path(), "rejected credential");
            return Err(e);
        }
    };

    tracing::debug!(uid = %identity.uid, "request authenticated");
    request.extensions_mut().insert(identity);
    Ok(next.run(request).await)
}
