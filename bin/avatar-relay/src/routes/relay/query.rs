use std::sync::Arc;

use axum::extract::rejection::QueryRejection;
use axum::extract::{Extension, Query, State};
use axum::Json;
use serde_json::Value;
use tracing::{debug, error, info};
use topview_client::VendorEnvelope;
use utoipa::OpenApi;

use crate::entities::{TaskStatusUpdate, TaskStore};
use crate::error::ServerError;
use crate::identity::CallerIdentity;
use crate::routes::relay::bad_query;
use crate::schemas::relay::QueryTaskParams;
use crate::state::AppState;

#[derive(OpenApi)]
#[openapi(paths(query_task_status))]
pub struct QueryApi;

/// Poll TopView for a job's status and mirror it onto the caller's row.
///
/// Only the row owned by the caller with a matching vendor id is touched. The
/// vendor reply is returned unchanged whether or not the row was updated.
#[utoipa::path(
    get,
    path = "/query-task-status",
    tag = "relay",
    params(QueryTaskParams),
    responses(
        (status = 200, description = "TopView reply, relayed as-is", body = Value),
        (status = 400, description = "Missing taskId"),
        (status = 401, description = "Missing or invalid caller token"),
        (status = 500, description = "Vendor unreachable or not configured"),
    )
)]
pub async fn query_task_status(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<CallerIdentity>,
    query: Result<Query<QueryTaskParams>, QueryRejection>,
) -> Result<Json<Value>, ServerError> {
    let Query(params) = query.map_err(bad_query)?;
    let task_id = params.validate()?;

    let body = state.vendor.query_task(task_id).await?;

    let Some(result) = VendorEnvelope::new(&body).query_result() else {
        return Ok(Json(body));
    };
    let Some(update) = TaskStatusUpdate::from_vendor(&result) else {
        debug!(task_id, status = %result.status, "unrecognised vendor status; row left as is");
        return Ok(Json(body));
    };

    match state
        .store
        .apply_status_update(task_id, &caller.user_id, &update)
        .await
    {
        Ok(0) => debug!(task_id, status = %update.status, "no matching row for caller"),
        Ok(_) if update.status.is_terminal() => {
            info!(task_id, status = %update.status, "task finished")
        }
        Ok(_) => debug!(task_id, status = %update.status, "task status updated"),
        Err(e) => error!(
            target: "persistence",
            task_id,
            error = %e,
            "failed to record task status"
        ),
    }

    Ok(Json(body))
}
