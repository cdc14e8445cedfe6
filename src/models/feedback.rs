// src/models/feedback.rs

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::storage::{Collection, Record};

/// Review state of a feedback entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedbackStatus {
    #[default]
    Pending,
    Reviewed,
    Resolved,
}

impl FeedbackStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            FeedbackStatus::Pending => "pending",
            FeedbackStatus::Reviewed => "reviewed",
            FeedbackStatus::Resolved => "resolved",
        }
    }
}

/// Represents a document in the 'feedbacks' collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Feedback {
    pub id: i64,
    #[serde(default)]
    pub status: FeedbackStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<i64>,

    /// Free-form text sent by the user.
    #[serde(default)]
    pub message: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Record for Feedback {
    type Key = i64;

    const COLLECTION: Collection = Collection::Feedbacks;

    fn key(&self) -> i64 {
        self.id
    }
}
