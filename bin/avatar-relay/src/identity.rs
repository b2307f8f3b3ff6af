//! Caller identity resolution against the Supabase auth API.

use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::debug;

use crate::config::IdentitySettings;
use crate::error::ServerError;

/// The authenticated end user a request acts on behalf of.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CallerIdentity {
    #[serde(rename = "id")]
    pub user_id: String,
}

/// Resolves bearer tokens via `GET {base}/auth/v1/user`.
#[derive(Debug, Clone)]
pub struct IdentityClient {
    user_url: String,
    anon_key: String,
    http: Client,
}

impl IdentityClient {
    pub fn new(settings: &IdentitySettings) -> Result<Self, reqwest::Error> {
        let http = Client::builder()
            .user_agent(concat!("avatar-relay/", env!("CARGO_PKG_VERSION")))
            .timeout(settings.timeout)
            .build()?;
        Ok(Self {
            user_url: format!("{}/auth/v1/user", settings.base_url.trim_end_matches('/')),
            anon_key: settings.anon_key.clone(),
            http,
        })
    }

    /// `Ok(None)` when the provider rejects the token.
    pub async fn resolve(&self, token: &str) -> Result<Option<CallerIdentity>, ServerError> {
        let resp = self
            .http
            .get(&self.user_url)
            .bearer_auth(token)
            .header("apikey", &self.anon_key)
            .send()
            .await
            .map_err(|e| ServerError::Identity(e.to_string()))?;

        let status = resp.status();
        // Timeouts and rate limiting say nothing about the token.
        let provider_trouble =
            status == StatusCode::REQUEST_TIMEOUT || status == StatusCode::TOO_MANY_REQUESTS;
        if status.is_client_error() && !provider_trouble {
            debug!(http_status = status.as_u16(), "identity provider rejected token");
            return Ok(None);
        }
        if !status.is_success() {
            return Err(ServerError::Identity(format!(
                "unexpected status {}",
                status.as_u16()
            )));
        }

        let caller: CallerIdentity = resp
            .json()
            .await
            .map_err(|e| ServerError::Identity(e.to_string()))?;
        if caller.user_id.is_empty() {
            return Ok(None);
        }
        Ok(Some(caller))
    }
}

/// Extract the token from an `Authorization: Bearer <token>` header value.
pub fn bearer_token(header: Option<&str>) -> Option<&str> {
    let value = header?.trim();
    let (scheme, token) = value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}
