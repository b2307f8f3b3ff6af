//! In-process harness: the full router over in-memory SQLite, with mock
//! servers standing in for TopView and the identity provider.

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use httpmock::prelude::*;
use httpmock::{Method, Mock};
use serde_json::{Value, json};
use topview_client::{ClientConfig, TopViewClient};
use tower::ServiceExt;

use crate::config::Config;
use crate::entities::SqliteStore;
use crate::identity::IdentityClient;
use crate::routes;
use crate::state::AppState;

pub(crate) struct TestApp {
    pub vendor: MockServer,
    pub identity: MockServer,
    pub state: Arc<AppState>,
    pub app: Router,
}

pub(crate) struct TestOptions {
    pub vendor_credentials: bool,
    pub auth_all_endpoints: bool,
    pub max_upload_bytes: Option<usize>,
    /// Sub-second timeouts, which the env vars cannot express.
    pub vendor_timeout: Option<Duration>,
    pub identity_timeout: Option<Duration>,
}

impl Default for TestOptions {
    fn default() -> Self {
        Self {
            vendor_credentials: true,
            auth_all_endpoints: false,
            max_upload_bytes: None,
            vendor_timeout: None,
            identity_timeout: None,
        }
    }
}

impl TestApp {
    pub async fn spawn() -> Self {
        Self::spawn_with(TestOptions::default()).await
    }

    pub async fn spawn_with(options: TestOptions) -> Self {
        let vendor = MockServer::start_async().await;
        let identity = MockServer::start_async().await;

        let mut config = Config::from_lookup(|key| match key {
            "TOPVIEW_API_URL" => Some(vendor.base_url()),
            "TOPVIEW_API_KEY" => Some("test-key".into()),
            "TOPVIEW_UID" => Some("test-uid".into()),
            "SUPABASE_URL" => Some(identity.base_url()),
            "SUPABASE_ANON_KEY" => Some("anon-key".into()),
            "RELAY_ENABLE_SWAGGER" => Some("false".into()),
            "RELAY_AUTH_ALL_ENDPOINTS" => Some(options.auth_all_endpoints.to_string()),
            "RELAY_MAX_UPLOAD_BYTES" => options.max_upload_bytes.map(|n| n.to_string()),
            _ => None,
        })
        .expect("test config");
        if let Some(timeout) = options.vendor_timeout {
            config.vendor.timeout = timeout;
        }
        if let Some(timeout) = options.identity_timeout {
            config.identity.timeout = timeout;
        }

        let client_config = if options.vendor_credentials {
            config.vendor.client_config()
        } else {
            ClientConfig::new(&config.vendor.base_url)
        };

        let state = Arc::new(AppState {
            vendor: TopViewClient::new(client_config).expect("vendor client"),
            identity: IdentityClient::new(&config.identity).expect("identity client"),
            store: Arc::new(SqliteStore::in_memory().await),
            config: Arc::new(config),
        });
        let app = routes::build(state.clone());

        Self {
            vendor,
            identity,
            state,
            app,
        }
    }

    /// Make `token` resolve to `user_id` at the identity provider.
    pub async fn sign_in(&self, token: &str, user_id: &str) -> Mock<'_> {
        let bearer = format!("Bearer {token}");
        let user_id = user_id.to_owned();
        self.identity
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/auth/v1/user")
                    .header("authorization", bearer)
                    .header("apikey", "anon-key");
                then.status(200)
                    .json_body(json!({ "id": user_id, "email": format!("{user_id}@example.com") }));
            })
            .await
    }

    /// Mock a TopView endpoint answering `body` to any request.
    pub async fn vendor_replies(&self, method: Method, path: &str, body: Value) -> Mock<'_> {
        let path = path.to_owned();
        self.vendor
            .mock_async(|when, then| {
                when.method(method).path(path);
                then.status(200).json_body(body);
            })
            .await
    }

    pub async fn send(&self, req: Request<Body>) -> (StatusCode, Value) {
        let resp = self.app.clone().oneshot(req).await.expect("router is infallible");
        let status = resp.status();
        let bytes = resp
            .into_body()
            .collect()
            .await
            .expect("response body")
            .to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).expect("JSON response body")
        };
        (status, body)
    }
}

pub(crate) fn get(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::get(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::empty()).expect("request")
}

pub(crate) fn post_json(uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::post(uri).header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::from(body.to_string())).expect("request")
}
