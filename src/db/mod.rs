//! Database layer
//!
//! Storage for accounts, sessions and the saved-product library.
//! Two backends are supported:
//! - SQLite (default, a single file under `data/`)
//! - MySQL (for shared deployments)
//!
//! The driver is picked from `database.driver` in the configuration.
//!
//! # Usage
//!
//! ```ignore
//! use productforge::config::DatabaseConfig;
//! use productforge::db::{create_pool, migrations};
//!
//! let pool = create_pool(&DatabaseConfig::default()).await?;
//! migrations::run_migrations(&pool).await?;
//! pool.ping().await?;
//! ```

pub mod migrations;
pub mod pool;
pub mod repositories;

pub use pool::{
    create_pool, create_test_pool, DatabasePool, DynDatabasePool, MysqlDatabase, SqliteDatabase,
};
