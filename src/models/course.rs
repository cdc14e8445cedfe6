// src/models/course.rs

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::storage::{Collection, Record};

/// Represents a document in the 'courses' collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,

    /// Display color used by the frontend (e.g. "#4f46e5").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,

    /// Id of the user who created the course.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Record for Course {
    type Key = i64;

    const COLLECTION: Collection = Collection::Courses;

    fn key(&self) -> i64 {
        self.id
    }
}
