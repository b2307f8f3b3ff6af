//! Client configuration and the vendor credential pair.

use std::fmt;
use std::time::Duration;

/// Default vendor endpoint.
pub const DEFAULT_BASE_URL: &str = "https://api.topview.ai";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// The API key / uid pair TopView expects on every request.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    api_key: String,
    uid: String,
}

impl Credentials {
    pub fn new(api_key: impl Into<String>, uid: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            uid: uid.into(),
        }
    }

    /// Returns `None` unless both halves are present and non-blank.
    pub fn from_parts(api_key: Option<String>, uid: Option<String>) -> Option<Self> {
        match (api_key, uid) {
            (Some(key), Some(uid)) if !key.trim().is_empty() && !uid.trim().is_empty() => {
                Some(Self::new(key, uid))
            }
            _ => None,
        }
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn uid(&self) -> &str {
        &self.uid
    }
}

// Keep the secret out of logs.
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &"***")
            .field("uid", &self.uid)
            .finish()
    }
}

/// Settings consumed by [`crate::TopViewClient::new`].
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub(crate) base_url: String,
    pub(crate) credentials: Option<Credentials>,
    pub(crate) timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

impl ClientConfig {
    /// Create a config pointing at `base_url`, with no credentials and the
    /// default 30 s request timeout.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            credentials: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    /// Override the per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn credentials(&self) -> Option<&Credentials> {
        self.credentials.as_ref()
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let cfg = ClientConfig::default();
        assert_eq!(cfg.base_url(), DEFAULT_BASE_URL);
        assert_eq!(cfg.timeout(), DEFAULT_TIMEOUT);
        assert!(cfg.credentials().is_none());
    }

    #[test]
    fn with_timeout() {
        let cfg = ClientConfig::default().with_timeout(Duration::from_secs(5));
        assert_eq!(cfg.timeout(), Duration::from_secs(5));
    }

    #[test]
    fn from_parts_requires_both_halves() {
        assert!(Credentials::from_parts(Some("k".into()), None).is_none());
        assert!(Credentials::from_parts(None, Some("u".into())).is_none());
        assert!(Credentials::from_parts(Some("  ".into()), Some("u".into())).is_none());
        let creds = Credentials::from_parts(Some("k".into()), Some("u".into())).unwrap();
        assert_eq!(creds.api_key(), "k");
        assert_eq!(creds.uid(), "u");
    }

    #[test]
    fn debug_redacts_api_key() {
        let rendered = format!("{:?}", Credentials::new("sk-secret", "uid-1"));
        assert!(!rendered.contains("sk-secret"));
        assert!(rendered.contains("uid-1"));
    }
}
