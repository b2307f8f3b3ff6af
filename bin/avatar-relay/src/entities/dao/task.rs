use chrono::{DateTime, Utc};
use topview_client::{ScriptMode, SubmitTaskParams, TaskMode};
use uuid::Uuid;

use crate::entities::TaskStatus;

/// A row in the `tasks` table.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskRecord {
    pub id: Uuid,
    pub user_id: String,
    /// Assigned by TopView; `None` while a keyed submit is still `pending`.
    pub topview_task_id: Option<String>,
    pub status: TaskStatus,
    pub mode: TaskMode,
    pub script_mode: ScriptMode,
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
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Values captured when TopView accepts a submit.
#[derive(Debug, Clone)]
pub struct NewTask {
    pub user_id: String,
    pub topview_task_id: String,
    pub params: SubmitTaskParams,
    pub idempotency_key: Option<String>,
}

/// A keyed submit, recorded as `pending` before TopView is called so that
/// concurrent requests carrying the same key cannot both reach the vendor.
#[derive(Debug, Clone)]
pub struct TaskClaim {
    pub user_id: String,
    pub params: SubmitTaskParams,
    pub idempotency_key: String,
}

/// Result of trying to claim an idempotency key.
#[derive(Debug, Clone, PartialEq)]
pub enum ClaimOutcome {
    /// This request owns the key; the new `pending` row is returned.
    Claimed(TaskRecord),
    /// Another request already holds the key.
    Existing(TaskRecord),
}

/// Raw column values as SQLite returns them.
#[derive(Debug, sqlx::FromRow)]
pub struct TaskRow {
    pub id: String,
    pub user_id: String,
    pub topview_task_id: Option<String>,
    pub status: String,
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

impl TryFrom<TaskRow> for TaskRecord {
    type Error = sqlx::Error;

    fn try_from(row: TaskRow) -> Result<Self, Self::Error> {
        let decode = |column: &str, e: String| sqlx::Error::ColumnDecode {
            index: column.to_owned(),
            source: e.into(),
        };
        Ok(Self {
            id: row.id.parse().map_err(|e: uuid::Error| decode("id", e.to_string()))?,
            status: row
                .status
                .parse()
                .map_err(|e: strum::ParseError| decode("status", e.to_string()))?,
            mode: row
                .mode
                .parse()
                .map_err(|e: strum::ParseError| decode("mode", e.to_string()))?,
            script_mode: row
                .script_mode
                .parse()
                .map_err(|e: strum::ParseError| decode("script_mode", e.to_string()))?,
            created_at: parse_timestamp("created_at", &row.created_at),
            updated_at: parse_timestamp("updated_at", &row.updated_at),
            user_id: row.user_id,
            topview_task_id: row.topview_task_id,
            tts_text: row.tts_text,
            voice_id: row.voice_id,
            avatar_id: row.avatar_id,
            template_image_file_id: row.template_image_file_id,
            audio_file_id: row.audio_file_id,
            caption_id: row.caption_id,
            custom_motion: row.custom_motion,
            finished_video_url: row.finished_video_url,
            finished_video_cover_url: row.finished_video_cover_url,
            error_message: row.error_message,
            idempotency_key: row.idempotency_key,
        })
    }
}

fn parse_timestamp(column: &str, raw: &str) -> DateTime<Utc> {
    raw.parse().unwrap_or_else(|e: chrono::ParseError| {
        tracing::warn!(column, raw = %raw, error = %e, "failed to parse task timestamp; using now");
        Utc::now()
    })
}
