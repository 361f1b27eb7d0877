// SPDX-FileCopyrightText: 2026 Wolfpack Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Bearer-token authentication middleware.
//!
//! The token is resolved through the pack's identity collaborator and the
//! resulting [`Identity`] is stored in the request extensions for handlers.

use axum::{
    extract::{Request, State},
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::Response,
};

use wolfpack_core::types::Identity;

use crate::server::GatewayState;

/// Extract the token from an `Authorization: Bearer <token>` header.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Resolve a raw token to an identity. Lookup failures count as unauthenticated.
pub async fn resolve(state: &GatewayState, token: &str) -> Option<Identity> {
    match state.pack.identities.authenticate(token).await {
        Ok(identity) => identity,
        Err(e) => {
            tracing::warn!(error = %e, "identity lookup failed");
            None
        }
    }
}

/// Middleware that rejects requests without a recognized bearer token.
pub async fn auth_middleware(
    State(state): State<GatewayState>,
    mut request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let Some(token) = bearer_token(request.headers()) else {
        return Err(StatusCode::UNAUTHORIZED);
    };
    let Some(identity) = resolve(&state, token).await else {
        tracing::debug!("bearer token rejected");
        return Err(StatusCode::UNAUTHORIZED);
    };
    request.extensions_mut().insert(identity);
    Ok(next.run(request).await)
}
