//! API routing module
//!
//! # Structure
//!
//! - [`health`] - health check
//! - [`auth`] - registration, login and user listing
//! - [`orders`] - service order lifecycle and audit trail

pub mod auth;
pub mod health;
pub mod orders;

// Re-export common types for handlers
pub use crate::utils::{AppResponse, AppResult};
