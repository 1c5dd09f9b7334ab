//! Database configuration and connection pool initialization.
//!
//! The PostgreSQL connection string is read from the `DATABASE_URL`
//! environment variable. The returned pool is cheaply cloneable and shared
//! through the application state.

use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use std::env;

/// Initializes a PostgreSQL connection pool.
///
/// # Panics
///
/// Panics if `DATABASE_URL` is not set or the pool cannot be created. Both
/// are startup-time misconfigurations with no sensible fallback.
pub async fn init_db_pool() -> PgPool {
    let database_url = env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    PgPoolOptions::new()
        .max_connections(
            env::var("DATABASE_MAX_CONNECTIONS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(10),
        )
        .connect(&database_url)
        .await
        .expect("Failed to connect to database")
}
