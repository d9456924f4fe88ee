//! Repository Module
//!
//! CRUD operations over the SQLite pool. Repositories are free async
//! functions taking `&SqlitePool` (or a transaction executor); all
//! lifecycle mutations go through [`crate::orders::OrderService`].

pub mod order;
pub mod user;

use shared::models::OrderStatus;
use thiserror::Error;

/// Repository error types
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Duplicate: {0}")]
    Duplicate(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Validation error: {0}")]
    Validation(String),

    /// Lifecycle guard failed: the order exists but its current status
    /// does not admit the requested transition.
    #[error("Ordem de serviço {order_id} já está em {current}")]
    InvalidTransition {
        order_id: i64,
        current: OrderStatus,
    },
}

impl From<sqlx::Error> for RepoError {
    fn from(err: sqlx::Error) -> Self {
        RepoError::Database(err.to_string())
    }
}

/// Result type for repository operations
pub type RepoResult<T> = Result<T, RepoError>;
