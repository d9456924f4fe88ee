use std::path::Path;

use sqlx::SqlitePool;

use crate::core::Config;
use crate::db::DbService;
use crate::orders::OrderService;
use crate::utils::AppError;

/// Server state - shared handle to every service
///
/// Cloning is cheap: the pool is reference-counted and [`OrderService`] only
/// holds a pool clone.
///
/// | Field | Type | Description |
/// |-------|------|-------------|
/// | config | Config | immutable configuration |
/// | pool | SqlitePool | SQLite connection pool |
/// | orders | OrderService | lifecycle façade, the only order mutation path |
#[derive(Clone)]
pub struct ServerState {
    pub config: Config,
    pub pool: SqlitePool,
    pub orders: OrderService,
}

impl ServerState {
    /// Initialize the server state:
    /// 1. ensure the database directory exists
    /// 2. open the pool, run migrations, seed the bootstrap user
    /// 3. construct services
    pub async fn initialize(config: &Config) -> Result<Self, AppError> {
        if let Some(parent) = Path::new(&config.database_path).parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    AppError::internal(format!("Failed to create database directory: {e}"))
                })?;
            }
        }

        let db_service = DbService::new(&config.database_path).await?;
        let pool = db_service.pool;
        let orders = OrderService::new(pool.clone());

        Ok(Self {
            config: config.clone(),
            pool,
            orders,
        })
    }
}
