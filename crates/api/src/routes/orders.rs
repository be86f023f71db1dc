//! Guest submission, browsing, and admin review endpoints.

use std::sync::Arc;

use axum::Json;
use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use common::{OrderId, OrderStatus};
use domain::notify::LoggingGateway;
use domain::{LifecycleEngine, OrderSubmission, RequestedLine};
use order_store::{Order, OrderQuery, OrderStore};
use reporting::ReportEngine;
use serde::{Deserialize, Serialize};

use crate::auth::require_admin;
use crate::config::Config;
use crate::error::ApiError;

/// Shared application state accessible from all handlers.
pub struct AppState<S, C> {
    pub lifecycle: LifecycleEngine<S, LoggingGateway>,
    pub reports: ReportEngine<S>,
    pub catalog: C,
    pub config: Config,
}

// -- Request types --

#[derive(Deserialize)]
pub struct SubmitOrderRequest {
    pub customer_name: String,
    pub customer_phone: String,
    pub room_number: String,
    #[serde(default)]
    pub items: Vec<SubmittedLine>,
}

/// One requested line as it arrives off the order form. Quantities come in
/// as strings; anything that does not parse as an integer is dropped
/// without an error, matching the form's lenient handling.
#[derive(Deserialize)]
pub struct SubmittedLine {
    pub item_name: String,
    pub quantity: String,
}

#[derive(Deserialize)]
pub struct TransitionRequest {
    pub comment: Option<String>,
}

#[derive(Deserialize)]
pub struct ReplaceItemsRequest {
    pub items: Vec<SubmittedLine>,
}

#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub status: Option<String>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

// -- Response types --

#[derive(Serialize)]
pub struct OrderResponse {
    pub id: OrderId,
    pub created_at: String,
    pub customer_name: String,
    pub customer_phone: String,
    pub room_number: String,
    pub status: String,
    pub admin_comment: Option<String>,
    pub confirmed_at: Option<String>,
    pub deleted_at: Option<String>,
    pub items: Vec<LineResponse>,
    pub total_quantity: u64,
}

#[derive(Serialize)]
pub struct LineResponse {
    pub item_name: String,
    pub quantity: u32,
}

#[derive(Serialize)]
pub struct OrderCreatedResponse {
    pub order_id: OrderId,
    pub status: String,
}

#[derive(Serialize)]
pub struct PurgeResponse {
    pub removed: u64,
}

impl From<Order> for OrderResponse {
    fn from(order: Order) -> Self {
        Self {
            id: order.id,
            created_at: order.created_at.to_rfc3339(),
            customer_name: order.customer_name,
            customer_phone: order.customer_phone,
            room_number: order.room_number,
            status: order.status.to_string(),
            admin_comment: order.admin_comment,
            confirmed_at: order.confirmed_at.map(|t| t.to_rfc3339()),
            deleted_at: order.deleted_at.map(|t| t.to_rfc3339()),
            total_quantity: order.items.iter().map(|l| u64::from(l.quantity)).sum(),
            items: order
                .items
                .into_iter()
                .map(|l| LineResponse {
                    item_name: l.item_name,
                    quantity: l.quantity,
                })
                .collect(),
        }
    }
}

fn parse_lines(lines: &[SubmittedLine]) -> Vec<RequestedLine> {
    lines
        .iter()
        .filter_map(|l| {
            let quantity = l.quantity.trim().parse::<i64>().ok()?;
            Some(RequestedLine::new(l.item_name.clone(), quantity))
        })
        .collect()
}

fn parse_order_id(id: &str) -> Result<OrderId, ApiError> {
    let uuid = uuid::Uuid::parse_str(id)
        .map_err(|e| ApiError::BadRequest(format!("invalid order ID: {e}")))?;
    Ok(OrderId::from_uuid(uuid))
}

/// The comment body on confirm/reject is optional; an empty body means no
/// comment.
fn parse_comment(body: &[u8]) -> Result<Option<String>, ApiError> {
    if body.is_empty() {
        return Ok(None);
    }
    let req: TransitionRequest = serde_json::from_slice(body)
        .map_err(|e| ApiError::BadRequest(format!("invalid request body: {e}")))?;
    Ok(req.comment)
}

// -- Handlers --

/// POST /orders — guest submits a new order.
#[tracing::instrument(skip(state, req))]
pub async fn create<S, C>(
    State(state): State<Arc<AppState<S, C>>>,
    Json(req): Json<SubmitOrderRequest>,
) -> Result<(StatusCode, Json<OrderCreatedResponse>), ApiError>
where
    S: OrderStore + 'static,
    C: Send + Sync + 'static,
{
    let submission = OrderSubmission::new(
        req.customer_name,
        req.customer_phone,
        req.room_number,
        parse_lines(&req.items),
    );
    let order_id = state.lifecycle.submit(submission).await?;

    Ok((
        StatusCode::CREATED,
        Json(OrderCreatedResponse {
            order_id,
            status: OrderStatus::Pending.to_string(),
        }),
    ))
}

/// GET /orders — admin lists orders, optionally filtered by status.
///
/// The listing carries every guest's contact details, so it sits behind
/// the admin gate; guests look up their own order by its ID.
#[tracing::instrument(skip(state, headers))]
pub async fn list<S, C>(
    State(state): State<Arc<AppState<S, C>>>,
    Query(params): Query<ListParams>,
    headers: HeaderMap,
) -> Result<Json<Vec<OrderResponse>>, ApiError>
where
    S: OrderStore + 'static,
    C: Send + Sync + 'static,
{
    require_admin(&headers, &state.config)?;

    let mut query = OrderQuery::new();
    if let Some(ref raw) = params.status {
        let status: OrderStatus = raw
            .parse()
            .map_err(|_| ApiError::BadRequest(format!("unknown status: {raw}")))?;
        query = query.status(status);
    }
    if let Some(limit) = params.limit {
        query = query.limit(limit);
    }
    if let Some(offset) = params.offset {
        query = query.offset(offset);
    }

    let orders = state.lifecycle.store().list(query).await.map_err(ApiError::Store)?;
    Ok(Json(orders.into_iter().map(OrderResponse::from).collect()))
}

/// GET /orders/:id — load a single order with its lines.
#[tracing::instrument(skip(state))]
pub async fn get<S, C>(
    State(state): State<Arc<AppState<S, C>>>,
    Path(id): Path<String>,
) -> Result<Json<OrderResponse>, ApiError>
where
    S: OrderStore + 'static,
    C: Send + Sync + 'static,
{
    let order_id = parse_order_id(&id)?;
    let order = state
        .lifecycle
        .store()
        .get(order_id)
        .await
        .map_err(ApiError::Store)?
        .ok_or_else(|| ApiError::NotFound(format!("order {id} not found")))?;

    Ok(Json(order.into()))
}

/// POST /orders/:id/confirm — admin accepts a pending order.
#[tracing::instrument(skip(state, headers, body))]
pub async fn confirm<S, C>(
    State(state): State<Arc<AppState<S, C>>>,
    Path(id): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<OrderResponse>, ApiError>
where
    S: OrderStore + 'static,
    C: Send + Sync + 'static,
{
    require_admin(&headers, &state.config)?;
    let order_id = parse_order_id(&id)?;
    let comment = parse_comment(&body)?;

    state.lifecycle.confirm(order_id, comment).await?;
    reload(&state, order_id).await
}

/// POST /orders/:id/reject — admin rejects a pending order.
#[tracing::instrument(skip(state, headers, body))]
pub async fn reject<S, C>(
    State(state): State<Arc<AppState<S, C>>>,
    Path(id): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<OrderResponse>, ApiError>
where
    S: OrderStore + 'static,
    C: Send + Sync + 'static,
{
    require_admin(&headers, &state.config)?;
    let order_id = parse_order_id(&id)?;
    let comment = parse_comment(&body)?;

    state.lifecycle.reject(order_id, comment).await?;
    reload(&state, order_id).await
}

/// PUT /orders/:id/items — admin replaces the lines of a confirmed order.
#[tracing::instrument(skip(state, headers, req))]
pub async fn replace_items<S, C>(
    State(state): State<Arc<AppState<S, C>>>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(req): Json<ReplaceItemsRequest>,
) -> Result<Json<OrderResponse>, ApiError>
where
    S: OrderStore + 'static,
    C: Send + Sync + 'static,
{
    require_admin(&headers, &state.config)?;
    let order_id = parse_order_id(&id)?;

    state
        .lifecycle
        .edit_confirmed_items(order_id, parse_lines(&req.items))
        .await?;
    reload(&state, order_id).await
}

/// POST /orders/purge — admin permanently removes all rejected orders.
#[tracing::instrument(skip(state, headers))]
pub async fn purge<S, C>(
    State(state): State<Arc<AppState<S, C>>>,
    headers: HeaderMap,
) -> Result<Json<PurgeResponse>, ApiError>
where
    S: OrderStore + 'static,
    C: Send + Sync + 'static,
{
    require_admin(&headers, &state.config)?;
    let removed = state.lifecycle.purge_deleted().await?;
    Ok(Json(PurgeResponse { removed }))
}

async fn reload<S, C>(
    state: &AppState<S, C>,
    order_id: OrderId,
) -> Result<Json<OrderResponse>, ApiError>
where
    S: OrderStore + 'static,
{
    let order = state
        .lifecycle
        .store()
        .get(order_id)
        .await
        .map_err(ApiError::Store)?
        .ok_or_else(|| ApiError::NotFound(format!("order {order_id} not found")))?;
    Ok(Json(order.into()))
}
