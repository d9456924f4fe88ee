//! Authentication API Module
//!
//! Identity is a thin collaborator of the order core: it only ever yields a
//! technician name. No sessions or tokens are kept server-side.

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/api/register", post(handler::register))
        .route("/api/login", post(handler::login))
        .route("/api/users", get(handler::list_users))
}
