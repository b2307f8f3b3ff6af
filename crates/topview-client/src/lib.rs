//! Thin async client for the TopView avatar video API.
//!
//! Every call returns the vendor's decoded JSON body untouched so callers can
//! relay it verbatim; [`VendorEnvelope`] offers typed views over the parts a
//! caller needs to inspect (`code`, `result.taskId`, `result.status`, …).
//!
//! ```rust,no_run
//! # async fn demo() -> Result<(), topview_client::TopViewError> {
//! use topview_client::{ClientConfig, Credentials, TopViewClient};
//!
//! let client = TopViewClient::new(
//!     ClientConfig::new("https://api.topview.ai")
//!         .with_credentials(Credentials::new("sk-...", "uid-...")),
//! )?;
//! let body = client.query_task("task-1").await?;
//! println!("{body}");
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod types;

pub use client::TopViewClient;
pub use config::{ClientConfig, Credentials};
pub use error::TopViewError;
pub use types::{
    AvatarFilter, QueryResult, ScriptMode, SubmitResult, SubmitTaskParams, TaskMode,
    VendorEnvelope, VendorTaskStatus, VoiceFilter,
};
