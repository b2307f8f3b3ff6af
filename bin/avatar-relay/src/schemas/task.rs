use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::entities::{TaskRecord, TaskStatus};

pub const DEFAULT_TASK_LIST_LIMIT: u32 = 20;
pub const MAX_TASK_LIST_LIMIT: u32 = 100;

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct TaskListQuery {
    /// Maximum rows to return (default 20, capped at 100).
    pub limit: Option<u32>,
}

impl TaskListQuery {
    pub fn effective_limit(&self) -> u32 {
        self.limit
            .unwrap_or(DEFAULT_TASK_LIST_LIMIT)
            .clamp(1, MAX_TASK_LIST_LIMIT)
    }
}

/// A task row as returned to its owner; column names match the table.
#[derive(Debug, Serialize, ToSchema)]
pub struct TaskResponse {
    pub id: String,
    pub user_id: String,
    pub topview_task_id: Option<String>,
    pub status: TaskStatus,
    pub mode: String,
    pub script_mode: String,
    pub tts_text: Option<String>,
    pub voice_id: Option<String>,
    pub avatar_id: Option<String>,
    pub template_image_file_id: Option<String>,
    pub audio_file_id: Option<String>,
    pub caption_id: Option<String>,
    pub custom_motion: Option<String>,
    pub finished_video_url: Option<String>,
    pub finished_video_cover_url: Option<String>,
    pub error_message: Option<String>,
    pub idempotency_key: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl TaskRecord {
    pub fn to_response(&self) -> TaskResponse {
        TaskResponse {
            id: self.id.to_string(),
            user_id: self.user_id.clone(),
            topview_task_id: self.topview_task_id.clone(),
            status: self.status,
            mode: self.mode.to_string(),
            script_mode: self.script_mode.to_string(),
            tts_text: self.tts_text.clone(),
            voice_id: self.voice_id.clone(),
            avatar_id: self.avatar_id.clone(),
            template_image_file_id: self.template_image_file_id.clone(),
            audio_file_id: self.audio_file_id.clone(),
            caption_id: self.caption_id.clone(),
            custom_motion: self.custom_motion.clone(),
            finished_video_url: self.finished_video_url.clone(),
            finished_video_cover_url: self.finished_video_cover_url.clone(),
            error_message: self.error_message.clone(),
            idempotency_key: self.idempotency_key.clone(),
            created_at: self.created_at.to_rfc3339(),
            updated_at: self.updated_at.to_rfc3339(),
        }
    }
}
