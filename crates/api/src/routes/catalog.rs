//! Catalog item management endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use common::ItemId;
use order_store::{CatalogStore, Item, OrderStore};
use serde::Deserialize;

use crate::auth::require_admin;
use crate::error::ApiError;
use crate::routes::orders::AppState;

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub search: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ItemRequest {
    pub name: String,
}

#[derive(Deserialize)]
pub struct BulkItemRequest {
    pub names: Vec<String>,
}

fn parse_item_id(id: &str) -> Result<ItemId, ApiError> {
    let uuid = uuid::Uuid::parse_str(id)
        .map_err(|e| ApiError::BadRequest(format!("invalid item ID: {e}")))?;
    Ok(ItemId::from_uuid(uuid))
}

/// GET /items — full listing, or a case-insensitive search.
#[tracing::instrument(skip(state))]
pub async fn list<S, C>(
    State(state): State<Arc<AppState<S, C>>>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<Item>>, ApiError>
where
    S: OrderStore + 'static,
    C: CatalogStore + 'static,
{
    let items = match params.search.as_deref() {
        Some(query) if !query.trim().is_empty() => state.catalog.search(query).await?,
        _ => state.catalog.list().await?,
    };
    Ok(Json(items))
}

/// POST /items — admin adds one item.
#[tracing::instrument(skip(state, headers))]
pub async fn create<S, C>(
    State(state): State<Arc<AppState<S, C>>>,
    headers: HeaderMap,
    Json(req): Json<ItemRequest>,
) -> Result<(StatusCode, Json<Item>), ApiError>
where
    S: OrderStore + 'static,
    C: CatalogStore + 'static,
{
    require_admin(&headers, &state.config)?;
    let item = state.catalog.add(&req.name).await?;
    Ok((StatusCode::CREATED, Json(item)))
}

/// POST /items/bulk — admin adds many items, skipping duplicates and blanks.
#[tracing::instrument(skip(state, headers, req))]
pub async fn create_bulk<S, C>(
    State(state): State<Arc<AppState<S, C>>>,
    headers: HeaderMap,
    Json(req): Json<BulkItemRequest>,
) -> Result<(StatusCode, Json<Vec<Item>>), ApiError>
where
    S: OrderStore + 'static,
    C: CatalogStore + 'static,
{
    require_admin(&headers, &state.config)?;
    let created = state.catalog.add_bulk(&req.names).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// PUT /items/:id — admin renames an item.
#[tracing::instrument(skip(state, headers))]
pub async fn rename<S, C>(
    State(state): State<Arc<AppState<S, C>>>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(req): Json<ItemRequest>,
) -> Result<Json<Item>, ApiError>
where
    S: OrderStore + 'static,
    C: CatalogStore + 'static,
{
    require_admin(&headers, &state.config)?;
    let item_id = parse_item_id(&id)?;

    if !state.catalog.rename(item_id, &req.name).await? {
        return Err(ApiError::NotFound(format!("item {id} not found")));
    }
    let item = state
        .catalog
        .get(item_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("item {id} not found")))?;
    Ok(Json(item))
}

/// DELETE /items/:id — admin removes an item.
#[tracing::instrument(skip(state, headers))]
pub async fn remove<S, C>(
    State(state): State<Arc<AppState<S, C>>>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<StatusCode, ApiError>
where
    S: OrderStore + 'static,
    C: CatalogStore + 'static,
{
    require_admin(&headers, &state.config)?;
    let item_id = parse_item_id(&id)?;

    if state.catalog.remove(item_id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound(format!("item {id} not found")))
    }
}
