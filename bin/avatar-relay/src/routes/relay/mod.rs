//! The five TopView relay endpoints.
//!
//! Submit and query act on behalf of a resolved caller and always sit behind
//! [`auth::require_caller`]. Upload and the catalog lookups only require a
//! caller when `RELAY_AUTH_ALL_ENDPOINTS` is on. Every relay route first
//! refuses to run without vendor credentials.

mod catalog;
mod query;
mod submit;
mod upload;

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Router, middleware};
use utoipa::OpenApi;

use crate::error::ServerError;
use crate::middleware::{auth, vendor};
use crate::state::AppState;

pub fn router(state: Arc<AppState>) -> Router<Arc<AppState>> {
    // `route_layer`s added later wrap the earlier ones, so the credential
    // check runs before caller resolution.
    let caller_scoped = Router::new()
        .route("/submit-avatar-task", post(submit::submit_avatar_task))
        .route("/query-task-status", get(query::query_task_status))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_caller,
        ))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            vendor::require_vendor_credentials,
        ));

    let upload_route = post(upload::upload_file)
        .layer(DefaultBodyLimit::max(state.config.max_upload_bytes));

    let open = Router::new()
        .route("/upload-file", upload_route)
        .route("/get-avatars", get(catalog::get_avatars))
        .route("/get-voices", get(catalog::get_voices))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_caller_if_configured,
        ))
        .route_layer(middleware::from_fn_with_state(
            state,
            vendor::require_vendor_credentials,
        ));

    caller_scoped.merge(open)
}

pub fn api_docs() -> utoipa::openapi::OpenApi {
    let mut api = upload::UploadApi::openapi();
    api.merge(submit::SubmitApi::openapi());
    api.merge(query::QueryApi::openapi());
    api.merge(catalog::CatalogApi::openapi());
    api
}

/// Body rejections surface as the relay's JSON envelope, not axum's
/// plain-text rejection. Oversized bodies keep their `413`.
fn bad_json(rejection: JsonRejection) -> ServerError {
    if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
        return ServerError::PayloadTooLarge(rejection.body_text());
    }
    ServerError::BadRequest(rejection.body_text())
}

fn bad_query(rejection: QueryRejection) -> ServerError {
    ServerError::BadRequest(rejection.body_text())
}
