use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The name of the cookie carrying the session identifier.
pub const SESSION_COOKIE: &str = "session-id";

/// Represents a signed-in user's session.
///
/// Holds a copy of the user's public fields taken when the session was
/// started; the password hash is never part of it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Builds the key-value store key for a session identifier.
pub fn session_key(session_id: &Uuid) -> String {
    format!("session:{}", session_id)
}

impl Session {
    /// Flattens the session into the string fields kept in the session store.
    pub fn to_fields(&self) -> Vec<(&'static str, String)> {
        vec![
            ("id", self.id.to_string()),
            ("name", self.name.clone()),
            ("email", self.email.clone()),
            ("createdAt", self.created_at.to_rfc3339()),
            ("updatedAt", self.updated_at.to_rfc3339()),
        ]
    }

    /// Rebuilds a session from stored fields, coercing timestamps back.
    ///
    /// Returns `None` if any field is missing or malformed.
    pub fn from_fields(fields: &HashMap<String, String>) -> Option<Self> {
        let timestamp = |name: &str| {
            fields
                .get(name)
                .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
                .map(|t| t.with_timezone(&Utc))
        };

        Some(Self {
            id: fields.get("id").and_then(|raw| Uuid::parse_str(raw).ok())?,
            name: fields.get("name")?.clone(),
            email: fields.get("email")?.clone(),
            created_at: timestamp("createdAt")?,
            updated_at: timestamp("updatedAt")?,
        })
    }
}
