//! Request parameters and typed views over TopView response envelopes.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use strum::{AsRefStr, Display, EnumString};

/// The `code` TopView uses for a successful call.
pub const SUCCESS_CODE: &str = "200";

/// Avatar generation engine.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum TaskMode {
    Avatar2,
    Avatar4,
}

/// Whether the avatar speaks synthesized text or an uploaded audio track.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ScriptMode {
    Text,
    Audio,
}

/// Status vocabulary reported by `/v1/avatar/query`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum VendorTaskStatus {
    Processing,
    Success,
    Failed,
}

/// Body of `POST /v1/avatar/submit`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitTaskParams {
    pub mode: TaskMode,
    pub script_mode: ScriptMode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tts_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub voice_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template_image_file_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio_file_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caption_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_motion: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub save_custom_ai_avatar: Option<bool>,
}

/// Query filters for `GET /v1/avatar/list`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AvatarFilter {
    pub categories: Option<String>,
    pub is_custom: Option<bool>,
    pub page_no: Option<u32>,
    pub page_size: Option<u32>,
}

impl AvatarFilter {
    /// Only the filters that are set, in the vendor's parameter names.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        push_opt(&mut pairs, "categories", self.categories.as_ref());
        push_opt(&mut pairs, "isCustom", self.is_custom.as_ref());
        push_opt(&mut pairs, "pageNo", self.page_no.as_ref());
        push_opt(&mut pairs, "pageSize", self.page_size.as_ref());
        pairs
    }
}

/// Query filters for `GET /v1/voice/list`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VoiceFilter {
    pub language: Option<String>,
    pub gender: Option<String>,
    pub age: Option<String>,
    pub style: Option<String>,
    pub page_no: Option<u32>,
    pub page_size: Option<u32>,
}

impl VoiceFilter {
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        push_opt(&mut pairs, "pageNo", self.page_no.as_ref());
        push_opt(&mut pairs, "pageSize", self.page_size.as_ref());
        push_opt(&mut pairs, "language", self.language.as_ref());
        push_opt(&mut pairs, "gender", self.gender.as_ref());
        push_opt(&mut pairs, "age", self.age.as_ref());
        push_opt(&mut pairs, "style", self.style.as_ref());
        pairs
    }
}

fn push_opt<T: ToString>(pairs: &mut Vec<(&'static str, String)>, key: &'static str, v: Option<&T>) {
    if let Some(v) = v {
        let s = v.to_string();
        if !s.is_empty() {
            pairs.push((key, s));
        }
    }
}

/// `result` of a successful submit.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitResult {
    pub task_id: String,
}

/// `result` of a task status query.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryResult {
    pub status: String,
    #[serde(default)]
    pub video_url: Option<String>,
    #[serde(default)]
    pub video_cover_url: Option<String>,
    #[serde(default)]
    pub error_message: Option<String>,
}

impl QueryResult {
    /// `None` for any status outside the known vocabulary.
    pub fn vendor_status(&self) -> Option<VendorTaskStatus> {
        self.status.parse().ok()
    }
}

/// Borrowed view over a raw TopView response body.
///
/// TopView wraps every reply as `{code, message?, result?}`; the code is
/// normally a string but some endpoints emit it as a number.
#[derive(Debug, Clone, Copy)]
pub struct VendorEnvelope<'a> {
    body: &'a Value,
}

impl<'a> VendorEnvelope<'a> {
    pub fn new(body: &'a Value) -> Self {
        Self { body }
    }

    pub fn code(&self) -> Option<String> {
        match self.body.get("code")? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    pub fn message(&self) -> Option<&'a str> {
        self.body.get("message").and_then(Value::as_str)
    }

    pub fn is_success(&self) -> bool {
        self.code().as_deref() == Some(SUCCESS_CODE)
    }

    fn result<T: serde::de::DeserializeOwned>(&self) -> Option<T> {
        if !self.is_success() {
            return None;
        }
        let result = self.body.get("result")?;
        serde_json::from_value(result.clone()).ok()
    }

    /// The assigned vendor task id, when this is a successful submit reply.
    pub fn submit_result(&self) -> Option<SubmitResult> {
        self.result::<SubmitResult>()
            .filter(|r| !r.task_id.is_empty())
    }

    /// The status payload, when this is a successful query reply.
    pub fn query_result(&self) -> Option<QueryResult> {
        self.result()
    }

    /// Build the envelope TopView returns for an accepted submit.
    pub fn submit_success(task_id: &str) -> Value {
        json!({ "code": SUCCESS_CODE, "result": { "taskId": task_id } })
    }
}
