//! Axum router construction.
//!
//! [`build`] assembles the complete application router, including:
//! - Middleware layers (OPTIONS short-circuit, CORS, per-request trace id)
//! - Optional Swagger UI / OpenAPI spec endpoint (disable with `RELAY_ENABLE_SWAGGER=false`)
//! - Health route
//! - The five TopView relay routes
//! - Per-user task history under `/tasks`

pub mod doc;
mod health;
mod relay;
mod tasks;

use std::sync::Arc;

use axum::{Router, middleware};
use utoipa_swagger_ui::SwaggerUi;

use crate::middleware::{cors, trace};
use crate::state::AppState;

/// Build the complete Axum [`Router`] for the application.
pub fn build(state: Arc<AppState>) -> Router {
    let api_router = Router::new()
        .merge(health::router())
        .merge(relay::router(state.clone()))
        .merge(tasks::router(state.clone()));

    let mut app = Router::new().merge(api_router);

    if state.config.enable_swagger {
        app = app.merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", doc::get_docs()));
    }

    app
        // Later layers wrap earlier ones: trace runs first, then CORS, then
        // the OPTIONS short-circuit.
        .layer(middleware::from_fn(cors::answer_options))
        .layer(cors::cors_layer(state.clone()))
        .layer(middleware::from_fn(trace::trace_middleware))
        .with_state(state)
}

#[cfg(test)]
pub(crate) mod testing;
