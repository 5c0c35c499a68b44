//! Database layer
//!
//! SQLite (default, single-file deployment) and MySQL behind one
//! [`DatabasePool`] trait. The driver is selected from configuration.
//!
//! ```ignore
//! use shortcode_locator::config::DatabaseConfig;
//! use shortcode_locator::db::{create_pool, migrations};
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
