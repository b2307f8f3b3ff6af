//! Inbound request shapes for the relay endpoints.
//!
//! Field names follow the dashboard client (camelCase) so existing callers
//! keep working unchanged.

use serde::Deserialize;
use topview_client::{AvatarFilter, ScriptMode, SubmitTaskParams, TaskMode, VoiceFilter};
use utoipa::{IntoParams, ToSchema};

use crate::error::ServerError;

/// Body of `POST /upload-file`.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct UploadFileRequest {
    /// Data-URI or bare base64 payload.
    #[serde(default)]
    pub file: Option<String>,
    /// File extension, e.g. `"png"` or `"mp3"`.
    #[serde(default)]
    pub format: Option<String>,
}

impl UploadFileRequest {
    /// Both fields present and non-blank.
    pub fn validate(&self) -> Result<(&str, &str), ServerError> {
        match (non_blank(&self.file), non_blank(&self.format)) {
            (Some(file), Some(format)) => Ok((file, format)),
            _ => Err(ServerError::BadRequest(
                "Missing file or format parameter".into(),
            )),
        }
    }
}

/// Body of `POST /submit-avatar-task`.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubmitAvatarTaskRequest {
    #[schema(value_type = String, example = "avatar4")]
    pub mode: TaskMode,
    #[schema(value_type = String, example = "text")]
    pub script_mode: ScriptMode,
    #[serde(default)]
    pub tts_text: Option<String>,
    #[serde(default)]
    pub voice_id: Option<String>,
    #[serde(default)]
    pub avatar_id: Option<String>,
    #[serde(default)]
    pub template_image_file_id: Option<String>,
    #[serde(default)]
    pub audio_file_id: Option<String>,
    #[serde(default)]
    pub caption_id: Option<String>,
    #[serde(default)]
    pub custom_motion: Option<String>,
    #[serde(default)]
    pub save_custom_ai_avatar: Option<bool>,
}

impl SubmitAvatarTaskRequest {
    /// Check the script/avatar combination and convert into vendor params.
    ///
    /// Blank optional strings are dropped rather than forwarded.
    pub fn into_params(self) -> Result<SubmitTaskParams, ServerError> {
        let params = SubmitTaskParams {
            mode: self.mode,
            script_mode: self.script_mode,
            tts_text: blank_to_none(self.tts_text),
            voice_id: blank_to_none(self.voice_id),
            avatar_id: blank_to_none(self.avatar_id),
            template_image_file_id: blank_to_none(self.template_image_file_id),
            audio_file_id: blank_to_none(self.audio_file_id),
            caption_id: blank_to_none(self.caption_id),
            custom_motion: blank_to_none(self.custom_motion),
            save_custom_ai_avatar: self.save_custom_ai_avatar,
        };

        match params.script_mode {
            ScriptMode::Text if params.tts_text.is_none() => {
                return Err(ServerError::BadRequest(
                    "ttsText is required when scriptMode is \"text\"".into(),
                ));
            }
            ScriptMode::Audio if params.audio_file_id.is_none() => {
                return Err(ServerError::BadRequest(
                    "audioFileId is required when scriptMode is \"audio\"".into(),
                ));
            }
            _ => {}
        }
        if params.avatar_id.is_none() && params.template_image_file_id.is_none() {
            return Err(ServerError::BadRequest(
                "one of avatarId or templateImageFileId is required".into(),
            ));
        }
        Ok(params)
    }
}

/// Query string of `GET /query-task-status`.
#[derive(Debug, Clone, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct QueryTaskParams {
    /// Vendor task id returned by the submit call.
    #[serde(default)]
    pub task_id: Option<String>,
}

impl QueryTaskParams {
    pub fn validate(&self) -> Result<&str, ServerError> {
        non_blank(&self.task_id)
            .ok_or_else(|| ServerError::BadRequest("Missing taskId parameter".into()))
    }
}

/// Query string of `GET /get-avatars`.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct AvatarListQuery {
    pub categories: Option<String>,
    pub is_custom: Option<bool>,
    pub page_no: Option<u32>,
    pub page_size: Option<u32>,
}

impl From<AvatarListQuery> for AvatarFilter {
    fn from(q: AvatarListQuery) -> Self {
        Self {
            categories: blank_to_none(q.categories),
            is_custom: q.is_custom,
            page_no: q.page_no,
            page_size: q.page_size,
        }
    }
}

/// Query string of `GET /get-voices`.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct VoiceListQuery {
    pub language: Option<String>,
    pub gender: Option<String>,
    pub age: Option<String>,
    pub style: Option<String>,
    pub page_no: Option<u32>,
    pub page_size: Option<u32>,
}

impl From<VoiceListQuery> for VoiceFilter {
    fn from(q: VoiceListQuery) -> Self {
        Self {
            language: blank_to_none(q.language),
            gender: blank_to_none(q.gender),
            age: blank_to_none(q.age),
            style: blank_to_none(q.style),
            page_no: q.page_no,
            page_size: q.page_size,
        }
    }
}

fn non_blank(v: &Option<String>) -> Option<&str> {
    v.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

fn blank_to_none(v: Option<String>) -> Option<String> {
    v.filter(|s| !s.trim().is_empty())
}
