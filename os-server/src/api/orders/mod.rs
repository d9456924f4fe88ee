//! Ordem de Serviço API Module
//!
//! All mutations go through [`crate::orders::OrderService`]; handlers never
//! touch the repository directly.

mod handler;

use axum::{
    Router,
    routing::{get, post, put},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/orders", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list).post(handler::create))
        .route("/{id}", get(handler::get_by_id).delete(handler::delete))
        .route("/{id}/assign", put(handler::assign))
        .route("/{id}/finalize", put(handler::finalize))
        .route("/{id}/annotate", post(handler::annotate))
        .route("/{id}/annotations", get(handler::annotations))
}
