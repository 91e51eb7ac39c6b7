//! Item endpoints

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use serde::Serialize;

use crate::db::ItemRepo;
use crate::http::error::ApiError;
use crate::http::extractors::ValidJson;
use crate::http::server::AppState;
use crate::models::{Item, ItemPatch, NewItem, UpdateItemRequest};

/// Delete acknowledgement
#[derive(Serialize)]
pub struct DeleteResponse {
    pub detail: &'static str,
}

/// POST /items - create an item
async fn create_item(
    State(state): State<Arc<AppState>>,
    ValidJson(req): ValidJson<NewItem>,
) -> Result<Json<Item>, ApiError> {
    let item = ItemRepo::new(&state.pool).insert(req).await?;
    Ok(Json(item))
}

/// GET /items - list all items
async fn list_items(State(state): State<Arc<AppState>>) -> Result<Json<Vec<Item>>, ApiError> {
    let items = ItemRepo::new(&state.pool).list().await?;
    Ok(Json(items))
}

/// GET /items/{id} - get a single item
async fn get_item(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Item>, ApiError> {
    let item = ItemRepo::new(&state.pool)
        .get(&id)
        .await?
        .ok_or_else(ApiError::item_not_found)?;

    Ok(Json(item))
}

/// PUT /items/{id} - overwrite the supplied fields
async fn update_item(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    ValidJson(req): ValidJson<UpdateItemRequest>,
) -> Result<Json<Item>, ApiError> {
    let patch = ItemPatch::try_from(req)?;
    let item = ItemRepo::new(&state.pool)
        .update(&id, patch)
        .await?
        .ok_or_else(ApiError::item_not_found)?;

    Ok(Json(item))
}

/// DELETE /items/{id} - delete an item
async fn delete_item(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<DeleteResponse>, ApiError> {
    if !ItemRepo::new(&state.pool).delete(&id).await? {
        return Err(ApiError::item_not_found());
    }

    Ok(Json(DeleteResponse {
        detail: "Item deleted",
    }))
}

/// Item routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/items", get(list_items).post(create_item))
        .route("/items/", get(list_items).post(create_item))
        .route(
            "/items/{id}",
            get(get_item).put(update_item).delete(delete_item),
        )
}
