use std::future::Future;

use chrono::{DateTime, SecondsFormat, Utc};
use uuid::Uuid;

use topview_client::SubmitTaskParams;

use crate::entities::dao::{ClaimOutcome, NewTask, TaskClaim, TaskRecord, TaskRow};
use crate::entities::{SqliteStore, TaskStatus, TaskStatusUpdate};

const TASK_COLUMNS: &str = "id, user_id, topview_task_id, status, mode, script_mode, tts_text, \
     voice_id, avatar_id, template_image_file_id, audio_file_id, caption_id, custom_motion, \
     finished_video_url, finished_video_cover_url, error_message, idempotency_key, \
     created_at, updated_at";

/// Every method is scoped to one owning user.
pub trait TaskStore: Send + Sync + 'static {
    /// Insert a freshly accepted task with status `processing`.
    fn insert_task(
        &self,
        task: NewTask,
    ) -> impl Future<Output = Result<TaskRecord, sqlx::Error>> + Send;

    /// Reserve `claim.idempotency_key` for its user by inserting a `pending`
    /// row with no vendor id. If the key is already taken, the row holding
    /// it is returned as [`ClaimOutcome::Existing`].
    fn claim_idempotency_key(
        &self,
        claim: TaskClaim,
    ) -> impl Future<Output = Result<ClaimOutcome, sqlx::Error>> + Send;

    /// Record the vendor id on a claimed row and move it to `processing`.
    fn attach_vendor_task(
        &self,
        id: Uuid,
        topview_task_id: &str,
    ) -> impl Future<Output = Result<u64, sqlx::Error>> + Send;

    /// Drop a claim that never reached TopView so the key can be retried.
    fn release_claim(&self, id: Uuid) -> impl Future<Output = Result<u64, sqlx::Error>> + Send;

    /// Apply a mapped vendor status to the row matching both ids.
    ///
    /// Rows already in a different terminal status are left alone. Returns
    /// the number of rows changed.
    fn apply_status_update(
        &self,
        topview_task_id: &str,
        user_id: &str,
        update: &TaskStatusUpdate,
    ) -> impl Future<Output = Result<u64, sqlx::Error>> + Send;

    fn find_by_idempotency_key(
        &self,
        user_id: &str,
        key: &str,
    ) -> impl Future<Output = Result<Option<TaskRecord>, sqlx::Error>> + Send;

    fn get_task_for_user(
        &self,
        id: Uuid,
        user_id: &str,
    ) -> impl Future<Output = Result<Option<TaskRecord>, sqlx::Error>> + Send;

    /// Newest first.
    fn list_tasks_for_user(
        &self,
        user_id: &str,
        limit: u32,
    ) -> impl Future<Output = Result<Vec<TaskRecord>, sqlx::Error>> + Send;
}

// Fixed-width so that `ORDER BY created_at` sorts chronologically.
fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn new_record(
    user_id: String,
    topview_task_id: Option<String>,
    status: TaskStatus,
    params: SubmitTaskParams,
    idempotency_key: Option<String>,
) -> TaskRecord {
    let now = Utc::now();
    TaskRecord {
        id: Uuid::new_v4(),
        user_id,
        topview_task_id,
        status,
        mode: params.mode,
        script_mode: params.script_mode,
        tts_text: params.tts_text,
        voice_id: params.voice_id,
        avatar_id: params.avatar_id,
        template_image_file_id: params.template_image_file_id,
        audio_file_id: params.audio_file_id,
        caption_id: params.caption_id,
        custom_motion: params.custom_motion,
        finished_video_url: None,
        finished_video_cover_url: None,
        error_message: None,
        idempotency_key,
        created_at: now,
        updated_at: now,
    }
}

impl SqliteStore {
    /// `verb` is `INSERT` or `INSERT OR IGNORE`. Returns rows affected.
    async fn write_record(&self, verb: &str, record: &TaskRecord) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(&format!(
            "{verb} INTO tasks ({TASK_COLUMNS}) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19)"
        ))
        .bind(record.id.to_string())
        .bind(&record.user_id)
        .bind(&record.topview_task_id)
        .bind(record.status.as_ref())
        .bind(record.mode.as_ref())
        .bind(record.script_mode.as_ref())
        .bind(&record.tts_text)
        .bind(&record.voice_id)
        .bind(&record.avatar_id)
        .bind(&record.template_image_file_id)
        .bind(&record.audio_file_id)
        .bind(&record.caption_id)
        .bind(&record.custom_motion)
        .bind(&record.finished_video_url)
        .bind(&record.finished_video_cover_url)
        .bind(&record.error_message)
        .bind(&record.idempotency_key)
        .bind(timestamp(record.created_at))
        .bind(timestamp(record.updated_at))
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }
}

impl TaskStore for SqliteStore {
    async fn insert_task(&self, task: NewTask) -> Result<TaskRecord, sqlx::Error> {
        let record = new_record(
            task.user_id,
            Some(task.topview_task_id),
            TaskStatus::Processing,
            task.params,
            task.idempotency_key,
        );
        self.write_record("INSERT", &record).await?;
        Ok(record)
    }

    async fn claim_idempotency_key(&self, claim: TaskClaim) -> Result<ClaimOutcome, sqlx::Error> {
        let record = new_record(
            claim.user_id,
            None,
            TaskStatus::Pending,
            claim.params,
            Some(claim.idempotency_key),
        );
        // The partial unique index on (user_id, idempotency_key) decides the winner.
        if self.write_record("INSERT OR IGNORE", &record).await? == 1 {
            return Ok(ClaimOutcome::Claimed(record));
        }

        let key = record.idempotency_key.as_deref().unwrap_or_default();
        match self.find_by_idempotency_key(&record.user_id, key).await? {
            Some(existing) => Ok(ClaimOutcome::Existing(existing)),
            // Released between our insert and the lookup.
            None => Err(sqlx::Error::RowNotFound),
        }
    }

    async fn attach_vendor_task(&self, id: Uuid, topview_task_id: &str) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE tasks SET topview_task_id = ?1, status = 'processing', updated_at = ?2 \
             WHERE id = ?3 AND status = 'pending' AND topview_task_id IS NULL",
        )
        .bind(topview_task_id)
        .bind(timestamp(Utc::now()))
        .bind(id.to_string())
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }

    async fn release_claim(&self, id: Uuid) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "DELETE FROM tasks WHERE id = ?1 AND status = 'pending' AND topview_task_id IS NULL",
        )
        .bind(id.to_string())
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }

    async fn apply_status_update(
        &self,
        topview_task_id: &str,
        user_id: &str,
        update: &TaskStatusUpdate,
    ) -> Result<u64, sqlx::Error> {
        let updated_at = timestamp(Utc::now());
        let result = sqlx::query(
            "UPDATE tasks \
             SET status = ?1, finished_video_url = ?2, finished_video_cover_url = ?3, \
                 error_message = ?4, updated_at = ?5 \
             WHERE topview_task_id = ?6 AND user_id = ?7 \
               AND (status NOT IN ('success', 'failed') OR status = ?1)",
        )
        .bind(update.status.as_ref())
        .bind(&update.finished_video_url)
        .bind(&update.finished_video_cover_url)
        .bind(&update.error_message)
        .bind(&updated_at)
        .bind(topview_task_id)
        .bind(user_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }

    async fn find_by_idempotency_key(
        &self,
        user_id: &str,
        key: &str,
    ) -> Result<Option<TaskRecord>, sqlx::Error> {
        let row: Option<TaskRow> = sqlx::query_as(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks WHERE user_id = ?1 AND idempotency_key = ?2"
        ))
        .bind(user_id)
        .bind(key)
        .fetch_optional(&self.pool)
        .await?;
        row.map(TaskRecord::try_from).transpose()
    }

    async fn get_task_for_user(
        &self,
        id: Uuid,
        user_id: &str,
    ) -> Result<Option<TaskRecord>, sqlx::Error> {
        let row: Option<TaskRow> = sqlx::query_as(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks WHERE id = ?1 AND user_id = ?2"
        ))
        .bind(id.to_string())
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        row.map(TaskRecord::try_from).transpose()
    }

    async fn list_tasks_for_user(
        &self,
        user_id: &str,
        limit: u32,
    ) -> Result<Vec<TaskRecord>, sqlx::Error> {
        let rows: Vec<TaskRow> = sqlx::query_as(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks WHERE user_id = ?1 \
             ORDER BY created_at DESC, rowid DESC LIMIT ?2"
        ))
        .bind(user_id)
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(TaskRecord::try_from).collect()
    }
}
