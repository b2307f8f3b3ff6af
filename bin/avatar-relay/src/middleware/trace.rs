use axum::{
    body::{Body, HttpBody},
    extract::Request,
    http::{HeaderValue, header},
    middleware::Next,
    response::Response,
};
use http_body_util::BodyExt;
use std::time::Instant;
use tracing::{Instrument, debug, field, info, info_span, warn};
use uuid::Uuid;

pub static X_TRACE_ID: &str = "x-trace-id";

/// Bodies at or above this size are summarised rather than logged.
const MAX_LOGGED_BODY: usize = 1024;

pub async fn trace_middleware(req: Request<Body>, next: Next) -> Response {
    let start_time = Instant::now();

    // Reuse the caller's trace id when it is a valid UUID.
    let trace_id = req
        .headers()
        .get(X_TRACE_ID)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| Uuid::parse_str(s).ok())
        .unwrap_or_else(Uuid::new_v4);

    let method = req.method().clone();
    let path = req.uri().path().to_owned();

    let span = info_span!(
        "http_request",
        trace_id = %trace_id,
        method = %method,
        path = %path,
        user_id = field::Empty,
    );

    async move {
        info!("→ request started");
        let trace_header = HeaderValue::from_str(&trace_id.to_string()).ok();

        let (parts, body) = req.into_parts();
        let body = log_body("request", &parts.headers, body).await;
        let mut req = Request::from_parts(parts, body);
        if let Some(v) = &trace_header {
            req.headers_mut().insert(X_TRACE_ID, v.clone());
        }

        let response = next.run(req).await;

        let (parts, body) = response.into_parts();
        let body = log_body("response", &parts.headers, body).await;
        let mut response = Response::from_parts(parts, body);
        if let Some(v) = trace_header {
            response.headers_mut().insert(X_TRACE_ID, v);
        }

        info!(
            status = response.status().as_u16(),
            latency_ms = start_time.elapsed().as_millis(),
            "← response finished"
        );

        response
    }
    .instrument(span)
    .await
}

/// Log a body when it is JSON of known size below [`MAX_LOGGED_BODY`].
///
/// Only such bodies are buffered; everything else (uploads, streams, bodies
/// without a length) passes through untouched so route body limits still
/// apply to it.
async fn log_body(direction: &str, headers: &header::HeaderMap, body: Body) -> Body {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");
    let is_json = content_type.contains("application/json");

    let size = body.size_hint().exact();
    match size {
        Some(len) if is_json && len < MAX_LOGGED_BODY as u64 => {}
        Some(0) => return body,
        Some(len) => {
            debug!("{direction} body: [skipped: type={content_type}, size={len}]");
            return body;
        }
        None => {
            debug!("{direction} body: [skipped: type={content_type}, streamed]");
            return body;
        }
    }

    let bytes = match body.collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(e) => {
            warn!(direction, error = %e, "failed to buffer body");
            return Body::empty();
        }
    };
    if let Ok(text) = std::str::from_utf8(&bytes) {
        debug!("{direction} body: {text}");
    }
    Body::from(bytes)
}
