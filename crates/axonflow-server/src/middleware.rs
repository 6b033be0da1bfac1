//! Bearer-token auth middleware, grounded on the gate server's own
//! `auth_middleware` -- skip `/health`, require a non-empty `Bearer ` or
//! `ApiKey ` token otherwise. Actual license verification happens inside
//! `Gateway::authenticate`; this layer only rejects requests that never
//! carried a credential at all, the way the teacher's transport edge
//! does before the request reaches any business logic.
//!
//! The self-hosted dev shortcut (spec.md §9) bypasses this layer too --
//! requiring a header here would defeat its purpose of letting a local
//! install skip authentication entirely.

use crate::state::AppState;
use axum::extract::State;
use axum::http::StatusCode;
use std::sync::Arc;

pub async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    req: axum::extract::Request,
    next: axum::middleware::Next,
) -> Result<axum::response::Response, StatusCode> {
    if req.uri().path() == "/health" || state.deployment.self_hosted_shortcut_active() {
        return Ok(next.run(req).await);
    }

    let auth_header = req.headers().get("Authorization").and_then(|h| h.to_str().ok());

    match auth_header {
        Some(auth) if auth.starts_with("Bearer ") || auth.starts_with("ApiKey ") => {
            let token = &auth[auth.find(' ').map(|i| i + 1).unwrap_or(auth.len())..];
            if token.is_empty() {
                return Err(StatusCode::UNAUTHORIZED);
            }
            Ok(next.run(req).await)
        }
        _ => {
            tracing::warn!(path = %req.uri().path(), "unauthenticated request rejected at transport edge");
            Err(StatusCode::UNAUTHORIZED)
        }
    }
}
