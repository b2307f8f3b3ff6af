use std::sync::Arc;

use axum::body::Body;
use axum::extract::State;
use axum::http::{Request, header};
use axum::middleware::Next;
use axum::response::Response;
use tracing::Span;

use crate::error::ServerError;
use crate::identity::{CallerIdentity, bearer_token};
use crate::state::AppState;

/// Resolve the caller's bearer token and stash the [`CallerIdentity`] in the
/// request extensions. Rejects with `401` when absent or invalid.
pub async fn require_caller(
    State(state): State<Arc<AppState>>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, ServerError> {
    let caller = authenticate(&state, caller_token(&req)).await?;
    Span::current().record("user_id", caller.user_id.as_str());
    req.extensions_mut().insert(caller);
    Ok(next.run(req).await)
}

/// Same as [`require_caller`] but only enforced when
/// `RELAY_AUTH_ALL_ENDPOINTS` is on; otherwise the request passes through.
pub async fn require_caller_if_configured(
    State(state): State<Arc<AppState>>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, ServerError> {
    if state.config.auth_all_endpoints {
        let caller = authenticate(&state, caller_token(&req)).await?;
        Span::current().record("user_id", caller.user_id.as_str());
        req.extensions_mut().insert(caller);
    }
    Ok(next.run(req).await)
}

async fn authenticate(
    state: &AppState,
    token: Option<String>,
) -> Result<CallerIdentity, ServerError> {
    let token = token.ok_or(ServerError::Unauthorized)?;
    state
        .identity
        .resolve(&token)
        .await?
        .ok_or(ServerError::Unauthorized)
}

// Owned copy: the request body is not `Sync`, so the request must not be
// borrowed across the identity call.
fn caller_token(req: &Request<Body>) -> Option<String> {
    let header = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());
    bearer_token(header).map(str::to_owned)
}
