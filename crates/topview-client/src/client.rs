use reqwest::{Client, Method, Url};
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::config::{ClientConfig, Credentials};
use crate::error::TopViewError;
use crate::types::{AvatarFilter, SubmitTaskParams, VendorEnvelope, VoiceFilter};

const UPLOAD_PATH: &str = "/v1/file/upload";
const SUBMIT_PATH: &str = "/v1/avatar/submit";
const QUERY_PATH: &str = "/v1/avatar/query";
const AVATAR_LIST_PATH: &str = "/v1/avatar/list";
const VOICE_LIST_PATH: &str = "/v1/voice/list";

const API_KEY_HEADER: &str = "X-API-KEY";
const UID_HEADER: &str = "UID";

/// Async TopView API client.
///
/// Cheap to clone; the underlying connection pool is shared. No call is ever
/// retried: a transport failure or a non-JSON body surfaces immediately.
#[derive(Debug, Clone)]
pub struct TopViewClient {
    base_url: String,
    credentials: Option<Credentials>,
    http: Client,
}

impl TopViewClient {
    pub fn new(config: ClientConfig) -> Result<Self, TopViewError> {
        let base_url = config.base_url.trim_end_matches('/').to_owned();
        Url::parse(&base_url).map_err(|e| TopViewError::InvalidBaseUrl {
            url: config.base_url.clone(),
            message: e.to_string(),
        })?;

        let http = Client::builder()
            .user_agent(concat!("topview-client/", env!("CARGO_PKG_VERSION")))
            .timeout(config.timeout)
            .build()?;

        Ok(Self {
            base_url,
            credentials: config.credentials,
            http,
        })
    }

    pub fn has_credentials(&self) -> bool {
        self.credentials.is_some()
    }

    /// Upload a base64 / data-URI encoded file (`POST /v1/file/upload`).
    pub async fn upload_file(&self, file: &str, format: &str) -> Result<Value, TopViewError> {
        let credentials = self.credentials()?;
        if file.trim().is_empty() {
            return Err(TopViewError::InvalidInput("file must not be empty".into()));
        }
        let format = format.trim().trim_start_matches('.');
        if format.is_empty() || !format.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(TopViewError::InvalidInput(
                "format must be a file extension such as \"png\"".into(),
            ));
        }

        #[derive(Serialize)]
        struct UploadBody<'a> {
            file: &'a str,
            format: &'a str,
        }

        let url = self.url(UPLOAD_PATH, &[])?;
        self.send(
            credentials,
            Method::POST,
            url,
            Some(&UploadBody { file, format }),
        )
        .await
    }

    /// Submit an avatar video job (`POST /v1/avatar/submit`).
    pub async fn submit_task(&self, params: &SubmitTaskParams) -> Result<Value, TopViewError> {
        let credentials = self.credentials()?;
        let url = self.url(SUBMIT_PATH, &[])?;
        let body = self.send(credentials, Method::POST, url, Some(params)).await?;
        if let Some(result) = VendorEnvelope::new(&body).submit_result() {
            debug!(task_id = %result.task_id, mode = %params.mode, "TopView accepted task");
        }
        Ok(body)
    }

    /// Fetch the current status of a submitted job (`GET /v1/avatar/query`).
    pub async fn query_task(&self, task_id: &str) -> Result<Value, TopViewError> {
        let credentials = self.credentials()?;
        if task_id.trim().is_empty() {
            return Err(TopViewError::InvalidInput("taskId must not be empty".into()));
        }
        let url = self.url(QUERY_PATH, &[("taskId", task_id.to_owned())])?;
        self.send::<()>(credentials, Method::GET, url, None).await
    }

    /// List the avatar catalog (`GET /v1/avatar/list`).
    pub async fn list_avatars(&self, filter: &AvatarFilter) -> Result<Value, TopViewError> {
        let credentials = self.credentials()?;
        let url = self.url(AVATAR_LIST_PATH, &filter.query_pairs())?;
        self.send::<()>(credentials, Method::GET, url, None).await
    }

    /// List the voice catalog (`GET /v1/voice/list`).
    pub async fn list_voices(&self, filter: &VoiceFilter) -> Result<Value, TopViewError> {
        let credentials = self.credentials()?;
        let url = self.url(VOICE_LIST_PATH, &filter.query_pairs())?;
        self.send::<()>(credentials, Method::GET, url, None).await
    }

    fn credentials(&self) -> Result<&Credentials, TopViewError> {
        self.credentials
            .as_ref()
            .ok_or(TopViewError::MissingCredentials)
    }

    fn url(&self, path: &str, query: &[(&str, String)]) -> Result<Url, TopViewError> {
        let raw = format!("{}{}", self.base_url, path);
        let mut url = Url::parse(&raw).map_err(|e| TopViewError::InvalidBaseUrl {
            url: raw.clone(),
            message: e.to_string(),
        })?;
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query.iter().map(|(k, v)| (*k, v.as_str())));
        }
        Ok(url)
    }

    async fn send<B: Serialize + ?Sized>(
        &self,
        credentials: &Credentials,
        method: Method,
        url: Url,
        body: Option<&B>,
    ) -> Result<Value, TopViewError> {
        let path = url.path().to_owned();
        let mut req = self
            .http
            .request(method.clone(), url)
            .header(API_KEY_HEADER, credentials.api_key())
            .header(UID_HEADER, credentials.uid());
        if let Some(body) = body {
            req = req.json(body);
        }

        let resp = req.send().await?;
        let status = resp.status();
        let bytes = resp.bytes().await?;

        let value: Value =
            serde_json::from_slice(&bytes).map_err(|e| TopViewError::InvalidResponse {
                status: status.as_u16(),
                message: e.to_string(),
            })?;

        let envelope = VendorEnvelope::new(&value);
        debug!(
            %method,
            %path,
            http_status = status.as_u16(),
            code = envelope.code().as_deref().unwrap_or("-"),
            "TopView response"
        );
        Ok(value)
    }
}
