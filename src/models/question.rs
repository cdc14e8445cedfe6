// src/models/question.rs

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::storage::{Collection, Record, RecordKey, as_id};

/// Represents a document in the 'questions' collection.
///
/// A question is identified by the pair (course_id, id): the same id may be
/// reused under different courses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    /// Identifier within the course, e.g. "Q1".
    /// Older documents store plain numbers; those are read as strings.
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,

    pub course_id: i64,

    /// Competence the question assesses.
    #[serde(default)]
    pub capacidade: String,

    /// Scenario text shown before the command.
    #[serde(default)]
    pub context: String,

    /// The actual question being asked.
    #[serde(default)]
    pub command: String,

    /// Answer alternatives, in display order.
    #[serde(default)]
    pub options: Vec<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Compound identity of a question.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QuestionKey {
    pub course_id: i64,
    pub id: String,
}

impl QuestionKey {
    pub fn new(course_id: i64, id: impl Into<String>) -> Self {
        Self {
            course_id,
            id: id.into(),
        }
    }
}

impl RecordKey for QuestionKey {
    /// Stored flat as `<courseId>_<id>`.
    fn storage_key(&self) -> String {
        format!("{}_{}", self.course_id, self.id)
    }

    fn matches(&self, doc: &Value) -> bool {
        let same_course = doc.get("courseId").and_then(as_id) == Some(self.course_id);
        let same_id = match doc.get("id") {
            Some(Value::String(id)) => *id == self.id,
            Some(Value::Number(id)) => id.to_string() == self.id,
            _ => false,
        };
        same_course && same_id
    }
}

impl Record for Question {
    type Key = QuestionKey;

    const COLLECTION: Collection = Collection::Questions;
    const KEY_FIELDS: &'static [&'static str] = &["id", "courseId"];

    fn key(&self) -> QuestionKey {
        QuestionKey::new(self.course_id, self.id.clone())
    }
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected question id as string or number, got {}",
            other
        ))),
    }
}
