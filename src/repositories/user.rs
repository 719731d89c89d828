use async_trait::async_trait;
use chrono::Utc;
use deadpool_postgres::Pool;
use std::collections::HashMap;
use tokio::sync::Mutex;
use tokio_postgres::{error::SqlState, Row};
use uuid::Uuid;

use crate::{
    error::{AppError, Result},
    models::user::{NewUser, User},
};

/// Persistence for user records.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Inserts a user, returning the stored record.
    ///
    /// Fails with `AppError::Conflict` when the email is already taken.
    async fn create(&self, new_user: NewUser) -> Result<User>;

    /// Finds a user by their email address.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>>;
}

/// A helper function to map a `tokio_postgres::Row` to a `User`.
fn row_to_user(row: &Row) -> Result<User> {
    Ok(User {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        email: row.try_get("email")?,
        password: row.try_get("password")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

/// A `UserStore` backed by PostgreSQL.
#[derive(Clone)]
pub struct PgUserStore {
    pool: Pool,
}

impl PgUserStore {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn create(&self, new_user: NewUser) -> Result<User> {
        let client = self.pool.get().await?;
        let id = Uuid::new_v4();
        let row = client
            .query_one(
                r#"
                INSERT INTO users (id, name, email, password)
                VALUES ($1, $2, $3, $4)
                RETURNING id, name, email, password, created_at, updated_at
                "#,
                &[&id, &new_user.name, &new_user.email, &new_user.password_hash],
            )
            .await
            .map_err(|e| {
                if e.code() == Some(&SqlState::UNIQUE_VIOLATION) {
                    AppError::Conflict(new_user.email.clone())
                } else {
                    AppError::Database(e)
                }
            })?;

        let user = row_to_user(&row)?;
        tracing::info!("✅ User created with ID: {}", user.id);
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let client = self.pool.get().await?;
        let row = client
            .query_opt(
                r#"
                SELECT id, name, email, password, created_at, updated_at
                FROM users
                WHERE email = $1
                "#,
                &[&email],
            )
            .await?;
        row.map(|r| row_to_user(&r)).transpose()
    }
}

/// A `UserStore` kept in process memory, keyed by email.
#[derive(Default)]
pub struct MemoryUserStore {
    users: Mutex<HashMap<String, User>>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn create(&self, new_user: NewUser) -> Result<User> {
        let mut users = self.users.lock().await;
        if users.contains_key(&new_user.email) {
            return Err(AppError::Conflict(new_user.email));
        }

        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            name: new_user.name,
            email: new_user.email,
            password: new_user.password_hash,
            created_at: now,
            updated_at: now,
        };
        users.insert(user.email.clone(), user.clone());
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        Ok(self.users.lock().await.get(email).cloned())
    }
}
