// src/models/gamification.rs

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::storage::{Collection, Record, RecordKey, as_id};

/// Progress state of one user, stored under the user's id.
/// A user without a profile simply has not earned anything yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GamificationProfile {
    pub user_id: i64,
    #[serde(default)]
    pub points: i64,
    #[serde(default = "first_level")]
    pub level: i64,
    #[serde(default)]
    pub badges: Vec<String>,

    /// Consecutive days with at least one completed quiz.
    #[serde(default)]
    pub streak: i64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<chrono::DateTime<chrono::Utc>>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn first_level() -> i64 {
    1
}

/// Profiles are keyed by the owning user rather than by an id of their own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProfileKey(pub i64);

impl RecordKey for ProfileKey {
    fn storage_key(&self) -> String {
        self.0.to_string()
    }

    fn matches(&self, doc: &Value) -> bool {
        doc.get("userId").and_then(as_id) == Some(self.0)
    }
}

impl Record for GamificationProfile {
    type Key = ProfileKey;

    const COLLECTION: Collection = Collection::Gamification;
    const KEY_FIELDS: &'static [&'static str] = &["userId"];

    fn key(&self) -> ProfileKey {
        ProfileKey(self.user_id)
    }
}
