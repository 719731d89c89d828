use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::models::session::Session;

/// Represents a user in the system.
#[derive(Clone, Debug)]
pub struct User {
    /// The unique identifier for the user.
    pub id: Uuid,
    /// The user's display name.
    pub name: String,
    /// The user's email address, unique across users.
    pub email: String,
    /// The user's hashed password.
    pub password: String,
    /// The timestamp when the user was created.
    pub created_at: DateTime<Utc>,
    /// The timestamp when the user was last updated.
    pub updated_at: DateTime<Utc>,
}

/// The fields needed to insert a user.
#[derive(Clone, Debug)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    /// Already hashed.
    pub password_hash: String,
}

impl User {
    /// Copies the fields that are safe to hand to clients.
    pub fn public_fields(&self) -> Session {
        Session {
            id: self.id,
            name: self.name.clone(),
            email: self.email.clone(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}
