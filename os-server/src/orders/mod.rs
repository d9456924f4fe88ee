//! Ordem de Serviço domain
//!
//! - [`lifecycle`] - the linear state machine and its annotation texts
//! - [`service`] - the transactional façade coordinating repository writes

pub mod lifecycle;
pub mod service;

pub use service::OrderService;
