use redis::aio::ConnectionManager;
use std::sync::Arc;
use crate::config::Config;
use crate::error::Result;
use crate::repositories::{
    session::{RedisSessionStore, SessionStore},
    user::{PgUserStore, UserStore},
};

/// The application's state.
#[derive(Clone)]
pub struct AppState {
    /// Where user records live.
    pub users: Arc<dyn UserStore>,
    /// Where session records live.
    pub sessions: Arc<dyn SessionStore>,
    /// The application's configuration.
    pub config: Config,
    /// Kept so the pool can be closed on shutdown.
    db: Option<deadpool_postgres::Pool>,
}

impl AppState {
    /// Connects to PostgreSQL and Redis and builds the production `AppState`.
    ///
    /// # Arguments
    ///
    /// * `config` - The application's configuration.
    ///
    /// # Returns
    ///
    /// A `Result` containing the `AppState`.
    pub async fn connect(config: &Config) -> Result<Self> {
        let db = crate::db::create_pool(&config.database_url)?;
        crate::db::ensure_schema(&db).await?;
        tracing::info!("✅ PostgreSQL Pool initialized with deadpool-postgres");

        let redis_client = redis::Client::open(config.redis_url.as_str())?;
        let redis = ConnectionManager::new(redis_client).await?;
        tracing::info!("✅ Redis Connection Manager initialized");

        Ok(AppState {
            users: Arc::new(PgUserStore::new(db.clone())),
            sessions: Arc::new(RedisSessionStore::new(redis)),
            config: config.clone(),
            db: Some(db),
        })
    }

    /// Builds an `AppState` over caller-supplied stores.
    pub fn with_stores(
        config: Config,
        users: Arc<dyn UserStore>,
        sessions: Arc<dyn SessionStore>,
    ) -> Self {
        AppState {
            users,
            sessions,
            config,
            db: None,
        }
    }

    /// Releases the database pool. Redis connections close when dropped.
    pub fn shutdown(&self) {
        if let Some(db) = &self.db {
            db.close();
            tracing::info!("✅ PostgreSQL Pool closed");
        }
    }
}
