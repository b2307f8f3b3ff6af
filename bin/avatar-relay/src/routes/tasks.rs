//! Read-only task history for the authenticated caller.
//!
//! Rows belong to the caller that submitted them; another caller's id reads
//! as `404` rather than `403` so task ids cannot be probed.

use std::sync::Arc;

use axum::extract::rejection::QueryRejection;
use axum::extract::{Extension, Path, Query, State};
use axum::routing::get;
use axum::{Json, Router, middleware};
use utoipa::OpenApi;
use uuid::Uuid;

use crate::entities::TaskStore;
use crate::error::ServerError;
use crate::identity::CallerIdentity;
use crate::middleware::auth;
use crate::schemas::task::{TaskListQuery, TaskResponse};
use crate::state::AppState;

#[derive(OpenApi)]
#[openapi(paths(list_tasks, get_task), components(schemas(TaskResponse)))]
pub struct TasksApi;

pub fn router(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route("/tasks", get(list_tasks))
        .route("/tasks/{id}", get(get_task))
        .route_layer(middleware::from_fn_with_state(state, auth::require_caller))
}

#[utoipa::path(
    get,
    path = "/tasks",
    tag = "tasks",
    params(TaskListQuery),
    responses(
        (status = 200, description = "Caller's tasks, newest first", body = [TaskResponse]),
        (status = 400, description = "Malformed limit"),
        (status = 401, description = "Missing or invalid caller token"),
        (status = 500, description = "Database error"),
    )
)]
pub async fn list_tasks(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<CallerIdentity>,
    query: Result<Query<TaskListQuery>, QueryRejection>,
) -> Result<Json<Vec<TaskResponse>>, ServerError> {
    let Query(q) = query.map_err(|e| ServerError::BadRequest(e.body_text()))?;
    let records = state
        .store
        .list_tasks_for_user(&caller.user_id, q.effective_limit())
        .await?;
    Ok(Json(records.iter().map(|r| r.to_response()).collect()))
}

#[utoipa::path(
    get,
    path = "/tasks/{id}",
    tag = "tasks",
    params(
        ("id" = String, Path, description = "Local task id (UUID)")
    ),
    responses(
        (status = 200, description = "Task retrieved", body = TaskResponse),
        (status = 401, description = "Missing or invalid caller token"),
        (status = 404, description = "Task not found"),
        (status = 500, description = "Database error"),
    )
)]
pub async fn get_task(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<CallerIdentity>,
    Path(id): Path<String>,
) -> Result<Json<TaskResponse>, ServerError> {
    let not_found = || ServerError::NotFound(format!("task {id} not found"));
    let uuid = Uuid::parse_str(&id).map_err(|_| not_found())?;
    let record = state
        .store
        .get_task_for_user(uuid, &caller.user_id)
        .await?
        .ok_or_else(not_found)?;
    Ok(Json(record.to_response()))
}

#[cfg(test)]
mod test {
    use axum::http::StatusCode;
    use topview_client::{ScriptMode, SubmitTaskParams, TaskMode};

    use crate::entities::{NewTask, TaskStore};
    use crate::routes::testing::{TestApp, get};

    fn new_task(user_id: &str, topview_task_id: &str) -> NewTask {
        NewTask {
            user_id: user_id.into(),
            topview_task_id: topview_task_id.into(),
            params: SubmitTaskParams {
                mode: TaskMode::Avatar2,
                script_mode: ScriptMode::Audio,
                tts_text: None,
                voice_id: None,
                avatar_id: None,
                template_image_file_id: Some("img-1".into()),
                audio_file_id: Some("aud-1".into()),
                caption_id: None,
                custom_motion: None,
                save_custom_ai_avatar: None,
            },
            idempotency_key: None,
        }
    }

    #[tokio::test]
    async fn list_returns_only_callers_tasks_newest_first() {
        let t = TestApp::spawn().await;
        t.sign_in("tok-a", "user-a").await;
        t.state.store.insert_task(new_task("user-a", "t1")).await.unwrap();
        t.state.store.insert_task(new_task("user-b", "t2")).await.unwrap();
        t.state.store.insert_task(new_task("user-a", "t3")).await.unwrap();

        let (status, body) = t.send(get("/tasks", Some("tok-a"))).await;

        assert_eq!(status, StatusCode::OK);
        let ids: Vec<&str> = body
            .as_array()
            .unwrap()
            .iter()
            .map(|t| t["topview_task_id"].as_str().unwrap())
            .collect();
        assert_eq!(ids, ["t3", "t1"]);
        assert_eq!(body[0]["status"], "processing");
        assert_eq!(body[0]["script_mode"], "audio");

        let (_, body) = t.send(get("/tasks?limit=1", Some("tok-a"))).await;
        assert_eq!(body.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn get_hides_other_users_tasks() {
        let t = TestApp::spawn().await;
        t.sign_in("tok-a", "user-a").await;
        t.sign_in("tok-b", "user-b").await;
        let record = t.state.store.insert_task(new_task("user-a", "t1")).await.unwrap();
        let uri = format!("/tasks/{}", record.id);

        let (status, body) = t.send(get(&uri, Some("tok-a"))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["id"], record.id.to_string());
        assert_eq!(body["template_image_file_id"], "img-1");

        let (status, body) = t.send(get(&uri, Some("tok-b"))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], "404");
    }

    #[tokio::test]
    async fn get_with_malformed_id_is_404() {
        let t = TestApp::spawn().await;
        t.sign_in("tok-a", "user-a").await;
        let (status, _) = t.send(get("/tasks/not-a-uuid", Some("tok-a"))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn tasks_require_a_token() {
        let t = TestApp::spawn().await;
        let (status, body) = t.send(get("/tasks", None)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["code"], "401");
    }
}
