use async_trait::async_trait;
use redis::{aio::ConnectionManager, AsyncCommands};
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::{
    error::Result,
    models::session::{session_key, Session},
};

/// Ephemeral storage for session records.
///
/// Expiry is the store's job: a record past its TTL must read as absent.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Writes a session record together with its time-to-live.
    async fn create(&self, session_id: &Uuid, session: &Session, ttl: Duration) -> Result<()>;

    /// Loads a live session record, or `None` if it is missing or expired.
    async fn load(&self, session_id: &Uuid) -> Result<Option<Session>>;

    /// Deletes a session record. Deleting a missing record is not an error.
    async fn delete(&self, session_id: &Uuid) -> Result<()>;
}

/// A `SessionStore` keeping each session as a Redis hash.
#[derive(Clone)]
pub struct RedisSessionStore {
    redis: ConnectionManager,
}

impl RedisSessionStore {
    pub fn new(redis: ConnectionManager) -> Self {
        Self { redis }
    }
}

#[async_trait]
impl SessionStore for RedisSessionStore {
    async fn create(&self, session_id: &Uuid, session: &Session, ttl: Duration) -> Result<()> {
        let key = session_key(session_id);
        let fields = session.to_fields();
        let ttl_secs = i64::try_from(ttl.as_secs()).unwrap_or(i64::MAX);
        let mut conn = self.redis.clone();

        // HSET and EXPIRE go out as one MULTI/EXEC so no record lives without a TTL.
        let _: () = redis::pipe()
            .atomic()
            .hset_multiple(&key, fields.as_slice())
            .ignore()
            .expire(&key, ttl_secs)
            .ignore()
            .query_async(&mut conn)
            .await
            .map_err(|e| {
                tracing::error!("❌ Redis session write failed: {}", e);
                e
            })?;

        tracing::debug!("✅ Session saved to Redis: {}", key);
        Ok(())
    }

    async fn load(&self, session_id: &Uuid) -> Result<Option<Session>> {
        let key = session_key(session_id);
        let mut conn = self.redis.clone();

        let fields: HashMap<String, String> = conn.hgetall(&key).await?;
        if fields.is_empty() {
            return Ok(None);
        }

        let session = Session::from_fields(&fields);
        if session.is_none() {
            tracing::warn!("❌ Unreadable session record: {}", key);
        }
        Ok(session)
    }

    async fn delete(&self, session_id: &Uuid) -> Result<()> {
        let mut conn = self.redis.clone();
        let _: () = conn.del(session_key(session_id)).await?;
        Ok(())
    }
}

/// A `SessionStore` kept in process memory. Expiry is checked on read.
#[derive(Default)]
pub struct MemorySessionStore {
    records: Mutex<HashMap<Uuid, (Session, Instant)>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn create(&self, session_id: &Uuid, session: &Session, ttl: Duration) -> Result<()> {
        let deadline = Instant::now() + ttl;
        self.records
            .lock()
            .await
            .insert(*session_id, (session.clone(), deadline));
        Ok(())
    }

    async fn load(&self, session_id: &Uuid) -> Result<Option<Session>> {
        let mut records = self.records.lock().await;
        match records.get(session_id) {
            Some((_, deadline)) if Instant::now() >= *deadline => {
                records.remove(session_id);
                Ok(None)
            }
            Some((session, _)) => Ok(Some(session.clone())),
            None => Ok(None),
        }
    }

    async fn delete(&self, session_id: &Uuid) -> Result<()> {
        self.records.lock().await.remove(session_id);
        Ok(())
    }
}
