use std::sync::Arc;

use axum::body::Body;
use axum::extract::State;
use axum::http::Request;
use axum::middleware::Next;
use axum::response::Response;
use topview_client::TopViewError;

use crate::error::ServerError;
use crate::state::AppState;

/// Refuse relay calls outright when the vendor client has no credentials,
/// before caller authentication or any other network I/O happens.
pub async fn require_vendor_credentials(
    State(state): State<Arc<AppState>>,
    req: Request<Body>,
    next: Next,
) -> Result<Response, ServerError> {
    if !state.vendor.has_credentials() {
        return Err(TopViewError::MissingCredentials.into());
    }
    Ok(next.run(req).await)
}
