//! Persistence for the ordering workflow.
//!
//! - [`repositories`]: zero-sized repo structs issuing runtime-checked SQL
//!   against `&PgPool`.
//! - [`PgRequestStore`]: the Postgres implementation of the core store
//!   contracts, built on the repositories.
//! - [`memory`]: in-memory implementations used by tests and local demos.

use sqlx::postgres::PgPoolOptions;

pub mod memory;
pub mod models;
pub mod repositories;
pub mod store;

pub use memory::{InMemoryRequestStore, InMemoryUserDirectory};
pub use store::PgRequestStore;

pub type DbPool = sqlx::PgPool;

/// Create a connection pool from a database URL.
pub async fn create_pool(database_url: &str) -> Result<DbPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(20)
        .connect(database_url)
        .await
}

/// Round-trip a trivial query to confirm the database is reachable.
pub async fn health_check(pool: &DbPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}

/// Apply pending migrations from `db/migrations`.
pub async fn run_migrations(pool: &DbPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("../../db/migrations").run(pool).await
}
