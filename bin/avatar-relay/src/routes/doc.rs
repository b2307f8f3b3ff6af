use crate::routes::{health, relay, tasks};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(info(
    title = "avatar-relay",
    description = "Authenticated relay for the TopView avatar video API",
    version = "0.1.0",
))]
pub struct ApiDoc;

pub fn get_docs() -> utoipa::openapi::OpenApi {
    let mut root = ApiDoc::openapi();
    root.merge(health::HealthApi::openapi());
    root.merge(relay::api_docs());
    root.merge(tasks::TasksApi::openapi());
    root
}
