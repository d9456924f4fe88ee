//! Ordem de Serviço API Handlers
//!
//! Thin adapter over [`OrderService`]: typed payloads in, full order (with
//! its audit trail) out. Field validation and lifecycle guards live in the
//! service layer.

use axum::{
    Json,
    extract::{Path, State},
};

use crate::core::ServerState;
use shared::models::{Annotation, AnnotationCreate, Order, OrderAssign, OrderCreate, OrderFinalize};

use crate::utils::{ok_with_message, AppResponse, AppResult};

/// GET /api/orders - list all orders with their audit trails
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<Vec<Order>>> {
    let orders = state.orders.list().await?;
    Ok(Json(orders))
}

/// POST /api/orders - register a new order (intake)
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<OrderCreate>,
) -> AppResult<Json<Order>> {
    let order = state.orders.create(payload).await?;
    Ok(Json(order))
}

/// GET /api/orders/:id - one order with its audit trail
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Order>> {
    let order = state.orders.get(id).await?;
    Ok(Json(order))
}

/// DELETE /api/orders/:id - remove an order and its annotations
pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<AppResponse<()>>> {
    state.orders.delete(id).await?;
    Ok(ok_with_message(
        (),
        format!("Ordem de Serviço #{id} excluída com sucesso."),
    ))
}

/// PUT /api/orders/:id/assign - technician claims the order
pub async fn assign(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<OrderAssign>,
) -> AppResult<Json<Order>> {
    let order = state.orders.assign(id, payload).await?;
    Ok(Json(order))
}

/// PUT /api/orders/:id/finalize - conclude the order with the outbound receipt
pub async fn finalize(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<OrderFinalize>,
) -> AppResult<Json<Order>> {
    let order = state.orders.finalize(id, payload).await?;
    Ok(Json(order))
}

/// POST /api/orders/:id/annotate - append a free-form note
pub async fn annotate(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<AnnotationCreate>,
) -> AppResult<Json<Order>> {
    let order = state.orders.annotate(id, payload).await?;
    Ok(Json(order))
}

/// GET /api/orders/:id/annotations - the audit trail in creation order
pub async fn annotations(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Vec<Annotation>>> {
    let annotations = state.orders.annotations(id).await?;
    Ok(Json(annotations))
}
