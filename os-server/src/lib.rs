//! OS Tracking Server - Ordens de Serviço lifecycle and audit trail
//!
//! Tracks repair/service orders from intake to completion. Every state
//! change is recorded as an immutable annotation, and transitions are
//! applied transactionally so concurrent technicians cannot both claim the
//! same order.
//!
//! # Module structure
//!
//! ```text
//! os-server/src/
//! ├── core/          # configuration, state, HTTP server
//! ├── orders/        # lifecycle state machine + transactional façade
//! ├── api/           # HTTP routes and handlers
//! ├── db/            # SQLite pool, migrations, repositories
//! └── utils/         # errors, logging, validation
//! ```

pub mod api;
pub mod core;
pub mod db;
pub mod orders;
pub mod utils;

// Re-export public types
pub use core::{Config, Server, ServerState};
pub use orders::OrderService;
pub use utils::{AppError, AppResult};

// Re-export logger functions
pub use utils::logger::{init_logger, init_logger_with_file};
