//! Shared application state injected into every Axum handler.

use std::sync::Arc;

use topview_client::TopViewClient;

use crate::config::Config;
use crate::entities::SqliteStore;
use crate::identity::IdentityClient;

/// State shared across all HTTP handlers. Immutable after startup.
#[derive(Clone, Debug)]
pub struct AppState {
    /// Server configuration (env-derived).
    pub config: Arc<Config>,
    /// Persistent task store.
    pub store: Arc<SqliteStore>,
    /// Vendor API client carrying the credential pair.
    pub vendor: TopViewClient,
    /// Caller token resolution.
    pub identity: IdentityClient,
}
