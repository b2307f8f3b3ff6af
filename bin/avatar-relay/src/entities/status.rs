//! Task status vocabulary and the vendor → local status mapping.

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};
use topview_client::{QueryResult, VendorTaskStatus};
use utoipa::ToSchema;

/// Fallback stored when the vendor reports a failure without a reason.
pub const DEFAULT_FAILURE_MESSAGE: &str = "Task failed";

/// Lifecycle of a locally tracked task.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
    ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum TaskStatus {
    Pending,
    Processing,
    Success,
    Failed,
}

impl TaskStatus {
    /// `success` and `failed` are final; the store never moves a row out of
    /// one into a different status.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Success | Self::Failed)
    }
}

/// Column values written by a status poll.
///
/// Output URLs are only ever set alongside `Success` and the error message
/// only alongside `Failed`; the other fields are written as `NULL`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskStatusUpdate {
    pub status: TaskStatus,
    pub finished_video_url: Option<String>,
    pub finished_video_cover_url: Option<String>,
    pub error_message: Option<String>,
}

impl TaskStatusUpdate {
    /// Map a vendor status report onto the local vocabulary.
    ///
    /// Returns `None` for statuses outside `processing | success | failed`,
    /// in which case the row is left untouched.
    pub fn from_vendor(result: &QueryResult) -> Option<Self> {
        let update = match result.vendor_status()? {
            VendorTaskStatus::Processing => Self {
                status: TaskStatus::Processing,
                finished_video_url: None,
                finished_video_cover_url: None,
                error_message: None,
            },
            VendorTaskStatus::Success => Self {
                status: TaskStatus::Success,
                finished_video_url: result.video_url.clone(),
                finished_video_cover_url: result.video_cover_url.clone(),
                error_message: None,
            },
            VendorTaskStatus::Failed => Self {
                status: TaskStatus::Failed,
                finished_video_url: None,
                finished_video_cover_url: None,
                error_message: Some(
                    result
                        .error_message
                        .clone()
                        .filter(|m| !m.is_empty())
                        .unwrap_or_else(|| DEFAULT_FAILURE_MESSAGE.to_owned()),
                ),
            },
        };
        Some(update)
    }
}
