use std::sync::Arc;

use axum::body::Body;
use axum::http::{HeaderName, HeaderValue, Method, Request, StatusCode, header};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use tower_http::cors::{AllowOrigin, CorsLayer};

use crate::middleware::trace::X_TRACE_ID;
use crate::state::AppState;

const ALLOWED_METHODS: [Method; 5] = [
    Method::GET,
    Method::POST,
    Method::PUT,
    Method::DELETE,
    Method::OPTIONS,
];

fn allowed_headers() -> [HeaderName; 6] {
    [
        header::CONTENT_TYPE,
        header::AUTHORIZATION,
        HeaderName::from_static("x-client-info"),
        HeaderName::from_static("apikey"),
        HeaderName::from_static("idempotency-key"),
        HeaderName::from_static(X_TRACE_ID),
    ]
}

pub fn cors_layer(state: Arc<AppState>) -> CorsLayer {
    // Parse the comma-separated origin list; fall back to a wildcard when it
    // is unset or yields nothing usable.
    let origins: Vec<HeaderValue> = state
        .config
        .cors_allowed_origins
        .as_deref()
        .map(|list| {
            list.split(',')
                .filter_map(|s| s.trim().parse().ok())
                .collect()
        })
        .unwrap_or_default();

    let allow_origin = if origins.is_empty() {
        AllowOrigin::any()
    } else {
        AllowOrigin::list(origins)
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods(ALLOWED_METHODS)
        .allow_headers(allowed_headers())
        .expose_headers([HeaderName::from_static(X_TRACE_ID)])
}

/// Answer every `OPTIONS` probe with an empty `200`, including ones the CORS
/// layer does not treat as a preflight (no `Access-Control-Request-Method`).
pub async fn answer_options(req: Request<Body>, next: Next) -> Response {
    if req.method() == Method::OPTIONS {
        return StatusCode::OK.into_response();
    }
    next.run(req).await
}
