//! Shared types for the OS tracking system
//!
//! "OS" is an Ordem de Serviço — a repair/service order moving through a
//! linear lifecycle (intake, maintenance, completion). This crate holds the
//! wire/domain models shared between `os-server` and its clients, plus small
//! utilities. DB row types derive `sqlx::FromRow` behind the `db` feature.

pub mod models;
pub mod util;

// Re-exports
pub use serde::{Deserialize, Serialize};
