//! Avatar and voice catalog lookups. Pure pass-through, nothing is stored.

use std::sync::Arc;

use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::Json;
use serde_json::Value;
use utoipa::OpenApi;

use crate::error::ServerError;
use crate::routes::relay::bad_query;
use crate::schemas::relay::{AvatarListQuery, VoiceListQuery};
use crate::state::AppState;

#[derive(OpenApi)]
#[openapi(paths(get_avatars, get_voices))]
pub struct CatalogApi;

#[utoipa::path(
    get,
    path = "/get-avatars",
    tag = "catalog",
    params(AvatarListQuery),
    responses(
        (status = 200, description = "TopView avatar catalog, relayed as-is", body = Value),
        (status = 400, description = "Malformed filter"),
        (status = 500, description = "Vendor unreachable or not configured"),
    )
)]
pub async fn get_avatars(
    State(state): State<Arc<AppState>>,
    query: Result<Query<AvatarListQuery>, QueryRejection>,
) -> Result<Json<Value>, ServerError> {
    let Query(q) = query.map_err(bad_query)?;
    Ok(Json(state.vendor.list_avatars(&q.into()).await?))
}

#[utoipa::path(
    get,
    path = "/get-voices",
    tag = "catalog",
    params(VoiceListQuery),
    responses(
        (status = 200, description = "TopView voice catalog, relayed as-is", body = Value),
        (status = 400, description = "Malformed filter"),
        (status = 500, description = "Vendor unreachable or not configured"),
    )
)]
pub async fn get_voices(
    State(state): State<Arc<AppState>>,
    query: Result<Query<VoiceListQuery>, QueryRejection>,
) -> Result<Json<Value>, ServerError> {
    let Query(q) = query.map_err(bad_query)?;
    Ok(Json(state.vendor.list_voices(&q.into()).await?))
}
