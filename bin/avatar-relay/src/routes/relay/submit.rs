use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Extension, State};
use axum::http::HeaderMap;
use axum::Json;
use serde_json::Value;
use tracing::{error, info, warn};
use topview_client::VendorEnvelope;
use utoipa::OpenApi;
use uuid::Uuid;

use crate::entities::{ClaimOutcome, NewTask, TaskClaim, TaskStore};
use crate::error::ServerError;
use crate::identity::CallerIdentity;
use crate::routes::relay::bad_json;
use crate::schemas::relay::SubmitAvatarTaskRequest;
use crate::state::AppState;

pub const IDEMPOTENCY_KEY: &str = "idempotency-key";
const MAX_IDEMPOTENCY_KEY_LEN: usize = 255;

#[derive(OpenApi)]
#[openapi(paths(submit_avatar_task), components(schemas(SubmitAvatarTaskRequest)))]
pub struct SubmitApi;

/// Submit an avatar video job on behalf of the caller.
///
/// When TopView accepts the job a `processing` row is recorded for the caller.
/// A failure to record it is logged and does not change the reply.
///
/// With an `Idempotency-Key` the key is claimed first. A second request with
/// the same key replays the recorded task id, or gets 409 while the first is
/// still waiting on TopView.
#[utoipa::path(
    post,
    path = "/submit-avatar-task",
    tag = "relay",
    request_body = SubmitAvatarTaskRequest,
    params(
        ("Idempotency-Key" = Option<String>, Header, description = "Replays the earlier reply for the same caller and key"),
    ),
    responses(
        (status = 200, description = "TopView reply, relayed as-is", body = Value),
        (status = 400, description = "Invalid task parameters"),
        (status = 401, description = "Missing or invalid caller token"),
        (status = 409, description = "A submit with the same Idempotency-Key is in progress"),
        (status = 500, description = "Vendor unreachable or not configured"),
    ),
)]
pub async fn submit_avatar_task(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<CallerIdentity>,
    headers: HeaderMap,
    payload: Result<Json<SubmitAvatarTaskRequest>, JsonRejection>,
) -> Result<Json<Value>, ServerError> {
    let Json(req) = payload.map_err(bad_json)?;
    let params = req.into_params()?;
    let idempotency_key = idempotency_key(&headers)?;

    // Claim the key before calling TopView so concurrent retries cannot
    // both submit.
    let mut claim_id = None;
    if let Some(key) = idempotency_key.clone() {
        let claim = TaskClaim {
            user_id: caller.user_id.clone(),
            params: params.clone(),
            idempotency_key: key,
        };
        match state.store.claim_idempotency_key(claim).await {
            Ok(ClaimOutcome::Claimed(record)) => claim_id = Some(record.id),
            Ok(ClaimOutcome::Existing(existing)) => {
                return match existing.topview_task_id.as_deref() {
                    Some(task_id) => {
                        info!(task_id, "replaying idempotent submit");
                        Ok(Json(VendorEnvelope::submit_success(task_id)))
                    }
                    None => Err(ServerError::Conflict(
                        "a submit with this Idempotency-Key is still in progress".into(),
                    )),
                };
            }
            Err(e) => {
                error!(target: "persistence", error = %e, "idempotency claim failed");
            }
        }
    }

    let body = match state.vendor.submit_task(&params).await {
        Ok(body) => body,
        Err(e) => {
            release(&state, claim_id).await;
            return Err(ServerError::from(e));
        }
    };
    let envelope = VendorEnvelope::new(&body);

    let Some(accepted) = envelope.submit_result() else {
        warn!(
            code = envelope.code().as_deref().unwrap_or("-"),
            message = envelope.message().unwrap_or(""),
            "TopView did not accept task"
        );
        release(&state, claim_id).await;
        return Ok(Json(body));
    };

    if let Some(id) = claim_id {
        match state.store.attach_vendor_task(id, &accepted.task_id).await {
            Ok(1) => info!(%id, task_id = %accepted.task_id, mode = %params.mode, "task recorded"),
            Ok(_) => error!(
                target: "persistence",
                %id,
                task_id = %accepted.task_id,
                "claimed row vanished before TopView replied"
            ),
            Err(e) => error!(
                target: "persistence",
                %id,
                task_id = %accepted.task_id,
                error = %e,
                "failed to record submitted task"
            ),
        }
        return Ok(Json(body));
    }

    let task = NewTask {
        user_id: caller.user_id,
        topview_task_id: accepted.task_id.clone(),
        params,
        idempotency_key,
    };
    match state.store.insert_task(task).await {
        Ok(record) => info!(
            id = %record.id,
            task_id = %accepted.task_id,
            mode = %record.mode,
            "task recorded"
        ),
        Err(e) => error!(
            target: "persistence",
            task_id = %accepted.task_id,
            error = %e,
            "failed to record submitted task"
        ),
    }

    Ok(Json(body))
}

/// Free a claim whose submit never reached an accepted TopView task.
async fn release(state: &AppState, claim_id: Option<Uuid>) {
    let Some(id) = claim_id else {
        return;
    };
    if let Err(e) = state.store.release_claim(id).await {
        error!(target: "persistence", %id, error = %e, "failed to release idempotency claim");
    }
}

fn idempotency_key(headers: &HeaderMap) -> Result<Option<String>, ServerError> {
    let Some(raw) = headers.get(IDEMPOTENCY_KEY) else {
        return Ok(None);
    };
    let key = raw
        .to_str()
        .map(str::trim)
        .map_err(|_| ServerError::BadRequest("Idempotency-Key must be visible ASCII".into()))?;
    if key.is_empty() || key.len() > MAX_IDEMPOTENCY_KEY_LEN {
        return Err(ServerError::BadRequest(format!(
            "Idempotency-Key must be 1-{MAX_IDEMPOTENCY_KEY_LEN} characters"
        )));
    }
    Ok(Some(key.to_owned()))
}

#[cfg(test)]
mod test {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn idempotency_key_is_optional() {
        assert_eq!(idempotency_key(&HeaderMap::new()).unwrap(), None);
    }

    #[test]
    fn idempotency_key_is_trimmed() {
        let mut headers = HeaderMap::new();
        headers.insert(IDEMPOTENCY_KEY, HeaderValue::from_static(" k-1 "));
        assert_eq!(idempotency_key(&headers).unwrap().as_deref(), Some("k-1"));
    }

    #[test]
    fn idempotency_key_rejects_blank_and_oversized() {
        let mut headers = HeaderMap::new();
        headers.insert(IDEMPOTENCY_KEY, HeaderValue::from_static("  "));
        assert!(matches!(idempotency_key(&headers), Err(ServerError::BadRequest(_))));

        let long = "k".repeat(MAX_IDEMPOTENCY_KEY_LEN + 1);
        headers.insert(IDEMPOTENCY_KEY, HeaderValue::from_str(&long).unwrap());
        assert!(idempotency_key(&headers).is_err());
    }
}
