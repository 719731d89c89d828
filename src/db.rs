use deadpool_postgres::{Config, ManagerConfig, Pool, PoolConfig, RecyclingMethod, Runtime};
use tokio_postgres::NoTls;
use crate::error::{AppError, Result};
use std::time::Duration;

/// The `users` table, created on startup when missing.
const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    id UUID PRIMARY KEY,
    name TEXT NOT NULL,
    email TEXT NOT NULL UNIQUE,
    password TEXT NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);
"#;

/// Upper bound on pooled connections; each request holds at most one.
const MAX_CONNECTIONS: usize = 16;

/// Builds a lazily-connecting pool from a PostgreSQL URL.
///
/// Only the wait timeout is set, so a request fails instead of queueing forever
/// when every connection is busy.
pub fn create_pool(database_url: &str) -> Result<Pool> {
    let mut cfg = Config::new();
    cfg.url = Some(database_url.to_string());
    cfg.manager = Some(ManagerConfig {
        recycling_method: RecyclingMethod::Fast,
    });

    let mut pool = PoolConfig::new(MAX_CONNECTIONS);
    pool.timeouts.wait = Some(Duration::from_secs(5));
    cfg.pool = Some(pool);

    cfg.create_pool(Some(Runtime::Tokio1), NoTls)
        .map_err(AppError::from)
}

/// Creates the `users` table if it does not exist yet.
pub async fn ensure_schema(pool: &Pool) -> Result<()> {
    let client = pool.get().await?;
    client.batch_execute(SCHEMA).await?;
    tracing::info!("✅ Users table ready");
    Ok(())
}
