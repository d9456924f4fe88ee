//! Data models
//!
//! Shared between os-server and frontend (via API).
//! DB row types use `#[cfg_attr(feature = "db", derive(sqlx::FromRow))]`.
//! All IDs are `i64` (SQLite INTEGER PRIMARY KEY).

pub mod order;
pub mod user;

// Re-exports
pub use order::*;
pub use user::*;
