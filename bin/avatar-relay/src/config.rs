//! Server configuration, loaded from environment variables at startup.

use std::time::Duration;

use thiserror::Error;
use topview_client::config::DEFAULT_BASE_URL;
use topview_client::{ClientConfig, Credentials};

/// A required setting is missing or unparsable. Fatal at startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("TopView API credentials not configured: set TOPVIEW_API_KEY and TOPVIEW_UID")]
    MissingVendorCredentials,

    #[error("missing required environment variable {0}")]
    Missing(&'static str),

    #[error("{key}={value:?} is not a positive integer")]
    Invalid { key: &'static str, value: String },
}

/// Default cap on an `/upload-file` request body. Base64 inflates media by a
/// third, so this admits files of roughly 48 MiB.
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 64 * 1024 * 1024;

/// Vendor connection settings.
#[derive(Debug, Clone)]
pub struct VendorSettings {
    pub base_url: String,
    pub credentials: Credentials,
    pub timeout: Duration,
}

impl VendorSettings {
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig::new(&self.base_url)
            .with_credentials(self.credentials.clone())
            .with_timeout(self.timeout)
    }
}

/// Identity provider (Supabase auth) settings.
#[derive(Debug, Clone)]
pub struct IdentitySettings {
    /// Project URL, e.g. `https://xyz.supabase.co`.
    pub base_url: String,
    /// Public anon key sent as the `apikey` header.
    pub anon_key: String,
    pub timeout: Duration,
}

/// Runtime configuration for avatar-relay.
#[derive(Debug, Clone)]
pub struct Config {
    /// TCP address to bind (default: `"0.0.0.0:3000"`).
    pub bind_address: String,

    /// sqlx SQLite URL (default: `"sqlite://avatar-relay.db?mode=rwc"`).
    pub database_url: String,

    /// `tracing` filter string, e.g. `"info"` or `"debug,tower_http=warn"`.
    pub log_level: String,

    /// When `true`, emit log records as newline-delimited JSON.
    pub log_json: bool,

    /// Comma-separated CORS allow list; `None` means any origin.
    pub cors_allowed_origins: Option<String>,

    /// Serve Swagger UI at `/swagger-ui`.
    pub enable_swagger: bool,

    /// Require a caller token on upload and catalog endpoints too.
    pub auth_all_endpoints: bool,

    /// Largest accepted `/upload-file` body, in bytes.
    pub max_upload_bytes: usize,

    pub vendor: VendorSettings,

    pub identity: IdentitySettings,
}

impl Config {
    /// Build [`Config`] from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build [`Config`] from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let or = |key: &str, default: &str| get(key).unwrap_or_else(|| default.to_owned());

        let credentials = Credentials::from_parts(get("TOPVIEW_API_KEY"), get("TOPVIEW_UID"))
            .ok_or(ConfigError::MissingVendorCredentials)?;

        Ok(Self {
            bind_address: or("RELAY_BIND", "0.0.0.0:3000"),
            database_url: or("RELAY_DATABASE_URL", "sqlite://avatar-relay.db?mode=rwc"),
            log_level: or("RELAY_LOG", "info"),
            log_json: get("RELAY_LOG_JSON").is_some_and(|v| is_truthy(&v)),
            cors_allowed_origins: get("RELAY_CORS_ORIGINS"),
            enable_swagger: get("RELAY_ENABLE_SWAGGER").is_none_or(|v| is_truthy(&v)),
            auth_all_endpoints: get("RELAY_AUTH_ALL_ENDPOINTS").is_some_and(|v| is_truthy(&v)),
            max_upload_bytes: parse_positive(
                "RELAY_MAX_UPLOAD_BYTES",
                get("RELAY_MAX_UPLOAD_BYTES"),
                DEFAULT_MAX_UPLOAD_BYTES,
            )?,
            vendor: VendorSettings {
                base_url: or("TOPVIEW_API_URL", DEFAULT_BASE_URL),
                credentials,
                timeout: Duration::from_secs(parse_positive(
                    "TOPVIEW_TIMEOUT_SECS",
                    get("TOPVIEW_TIMEOUT_SECS"),
                    30,
                )?),
            },
            identity: IdentitySettings {
                base_url: get("SUPABASE_URL").ok_or(ConfigError::Missing("SUPABASE_URL"))?,
                anon_key: get("SUPABASE_ANON_KEY")
                    .ok_or(ConfigError::Missing("SUPABASE_ANON_KEY"))?,
                timeout: Duration::from_secs(parse_positive(
                    "IDENTITY_TIMEOUT_SECS",
                    get("IDENTITY_TIMEOUT_SECS"),
                    10,
                )?),
            },
        })
    }
}

// ── private helpers ──────────────────────────────────────────────────────────

fn is_truthy(v: &str) -> bool {
    v == "1" || v.eq_ignore_ascii_case("true")
}

/// Unset means `default`; anything else must parse as a non-zero integer.
fn parse_positive<T>(key: &'static str, value: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr + PartialEq + Default,
{
    let Some(raw) = value else {
        return Ok(default);
    };
    match raw.trim().parse::<T>() {
        Ok(n) if n != T::default() => Ok(n),
        _ => Err(ConfigError::Invalid { key, value: raw }),
    }
}
