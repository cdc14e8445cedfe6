use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::storage::{Collection, Record};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quiz {
    pub id: i64,
    pub course_id: i64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub question_ids: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Record for Quiz {
    type Key = i64;

    const COLLECTION: Collection = Collection::Quizzes;

    fn key(&self) -> i64 {
        self.id
    }
}
