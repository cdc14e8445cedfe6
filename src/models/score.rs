// src/models/score.rs

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::storage::{Collection, Record};

/// Represents a document in the 'scores' collection.
/// Stores the result of one quiz attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Score {
    pub id: i64,
    pub user_id: i64,
    pub course_id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quiz_id: Option<i64>,

    /// Points obtained in the attempt.
    pub score: f64,

    /// Number of questions answered correctly and in total.
    #[serde(default)]
    pub correct: i64,
    #[serde(default)]
    pub total: i64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Record for Score {
    type Key = i64;

    const COLLECTION: Collection = Collection::Scores;

    fn key(&self) -> i64 {
        self.id
    }
}
