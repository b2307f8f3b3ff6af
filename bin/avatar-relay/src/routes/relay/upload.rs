use std::sync::Arc;

use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::Json;
use serde_json::Value;
use tracing::info;
use topview_client::VendorEnvelope;
use utoipa::OpenApi;

use crate::error::ServerError;
use crate::routes::relay::bad_json;
use crate::schemas::relay::UploadFileRequest;
use crate::state::AppState;

#[derive(OpenApi)]
#[openapi(paths(upload_file), components(schemas(UploadFileRequest)))]
pub struct UploadApi;

/// Forward an encoded file to TopView and relay its reply verbatim.
#[utoipa::path(
    post,
    path = "/upload-file",
    tag = "relay",
    request_body = UploadFileRequest,
    responses(
        (status = 200, description = "TopView reply, relayed as-is", body = Value),
        (status = 400, description = "Missing file or format"),
        (status = 401, description = "Caller token required"),
        (status = 413, description = "Body exceeds RELAY_MAX_UPLOAD_BYTES"),
        (status = 500, description = "Vendor unreachable or not configured"),
    )
)]
pub async fn upload_file(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<UploadFileRequest>, JsonRejection>,
) -> Result<Json<Value>, ServerError> {
    let Json(req) = payload.map_err(bad_json)?;
    let (file, format) = req.validate()?;

    let body = state.vendor.upload_file(file, format).await?;
    let envelope = VendorEnvelope::new(&body);
    info!(
        format,
        code = envelope.code().as_deref().unwrap_or("-"),
        "file upload relayed"
    );
    Ok(Json(body))
}
