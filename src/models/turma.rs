use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::storage::{Collection, Record};

/// A class (cohort) of students led by one professor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Turma {
    pub id: i64,
    pub professor_id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub student_ids: Vec<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Record for Turma {
    type Key = i64;

    const COLLECTION: Collection = Collection::Turmas;

    fn key(&self) -> i64 {
        self.id
    }
}
