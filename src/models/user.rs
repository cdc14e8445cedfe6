// src/models/user.rs

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::storage::{Collection, Record};

/// Represents a document in the 'users' collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,

    pub username: String,

    /// Unique email address, used for login.
    pub email: String,

    /// Argon2 password hash.
    /// Persisted as-is; never hand this struct to a client directly.
    pub password: String,

    /// User role: 'student', 'professor' or 'admin'.
    #[serde(default = "default_role")]
    pub role: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn default_role() -> String {
    "student".to_string()
}

impl Record for User {
    type Key = i64;

    const COLLECTION: Collection = Collection::Users;

    fn key(&self) -> i64 {
        self.id
    }
}
