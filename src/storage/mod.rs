//! Storage layer
//!
//! Two interchangeable backends behind the `Store` trait: the Firebase
//! Realtime Database (REST) and an in-process memory store used when no
//! credentials are configured.

pub mod firebase;
pub mod memory;
pub mod repository;

use std::fmt;

use async_trait::async_trait;
use serde::{Serialize, de::DeserializeOwned};
use serde_json::{Map, Value};
use thiserror::Error;

pub use firebase::FirebaseStore;
pub use memory::MemoryStore;
pub use repository::Repository;

/// Storage error type
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Remote database returned {status}: {body}")]
    Remote { status: u16, body: String },

    #[error("Remote database request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Failed to obtain access token: {0}")]
    Auth(String),

    #[error("Malformed record: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Invalid storage configuration: {0}")]
    Config(String),

    #[error("Invalid record key '{0}'")]
    InvalidKey(String),
}

pub type Result<T> = std::result::Result<T, StoreError>;

/// Which physical backend a store talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    Memory,
    Firebase,
}

impl BackendKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BackendKind::Memory => "memory",
            BackendKind::Firebase => "firebase",
        }
    }
}

/// Top-level collections of the database tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Users,
    Courses,
    Questions,
    Quizzes,
    Scores,
    Feedbacks,
    Turmas,
    Gamification,
}

impl Collection {
    pub const ALL: [Collection; 8] = [
        Collection::Users,
        Collection::Courses,
        Collection::Questions,
        Collection::Quizzes,
        Collection::Scores,
        Collection::Feedbacks,
        Collection::Turmas,
        Collection::Gamification,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Collection::Users => "users",
            Collection::Courses => "courses",
            Collection::Questions => "questions",
            Collection::Quizzes => "quizzes",
            Collection::Scores => "scores",
            Collection::Feedbacks => "feedbacks",
            Collection::Turmas => "turmas",
            Collection::Gamification => "gamification",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Identity of a stored document.
///
/// The remote backend addresses documents by `storage_key()` under their
/// collection; the memory backend scans with `matches()`.
pub trait RecordKey: Send + Sync + fmt::Debug {
    fn storage_key(&self) -> String;

    fn matches(&self, doc: &Value) -> bool;
}

/// Plain integer ids, stored under `collection/<id>` and matched on `id`.
impl RecordKey for i64 {
    fn storage_key(&self) -> String {
        self.to_string()
    }

    fn matches(&self, doc: &Value) -> bool {
        doc.get("id").and_then(as_id) == Some(*self)
    }
}

/// Characters the remote database refuses inside a key.
const FORBIDDEN_KEY_CHARS: [char; 6] = ['.', '$', '#', '[', ']', '/'];

/// Returns the key's storage form, or `InvalidKey` when the remote database
/// could not hold it as a single path segment. Both backends apply the same
/// rule so a record valid in memory is valid remotely.
pub fn checked_key(key: &dyn RecordKey) -> Result<String> {
    let raw = key.storage_key();
    let invalid = raw.is_empty()
        || raw
            .chars()
            .any(|c| FORBIDDEN_KEY_CHARS.contains(&c) || c.is_ascii_control());

    if invalid {
        return Err(StoreError::InvalidKey(raw));
    }
    Ok(raw)
}

/// An entity persisted in one collection.
pub trait Record: Serialize + DeserializeOwned + Send + Sync {
    type Key: RecordKey;

    const COLLECTION: Collection;

    /// Fields that make up the identity and are never rewritten by an update.
    const KEY_FIELDS: &'static [&'static str] = &["id"];

    fn key(&self) -> Self::Key;
}

/// Uniform document store implemented by every backend.
///
/// Documents are JSON objects. Missing documents are `None`/`false`, never
/// errors; only backend failures produce `Err`.
#[async_trait]
pub trait Store: Send + Sync {
    fn kind(&self) -> BackendKind;

    /// All documents of a collection; empty when the collection is absent.
    async fn list(&self, collection: Collection) -> Result<Vec<Value>>;

    async fn get(&self, collection: Collection, key: &dyn RecordKey) -> Result<Option<Value>>;

    /// Documents whose `field` equals `value`. Ordering is backend specific.
    async fn find_by(&self, collection: Collection, field: &str, value: &Value)
    -> Result<Vec<Value>>;

    /// Insert or overwrite the document at `key`.
    async fn put(&self, collection: Collection, key: &dyn RecordKey, doc: Value) -> Result<()>;

    /// Shallow-merge `fields` into an existing document and return the result.
    /// A `null` value removes the field. Returns `None` without writing when
    /// the document does not exist.
    async fn merge(
        &self,
        collection: Collection,
        key: &dyn RecordKey,
        fields: Map<String, Value>,
    ) -> Result<Option<Value>>;

    /// Returns whether a document existed and was removed.
    async fn remove(&self, collection: Collection, key: &dyn RecordKey) -> Result<bool>;

    /// Remove every document whose `field` equals `value` in one step.
    /// Returns how many documents were removed.
    async fn remove_where(&self, collection: Collection, field: &str, value: &Value)
    -> Result<usize>;

    async fn next_id(&self, collection: Collection) -> Result<i64>;

    /// Drop every collection.
    async fn clear(&self) -> Result<()>;
}

/// Reads an integer id out of a JSON value; numeric strings count.
pub fn as_id(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

/// Equality used by filtered reads and bulk deletes. An integer filter also
/// matches numeric strings, the same way key lookups do.
pub fn field_matches(doc: &Value, field: &str, wanted: &Value) -> bool {
    match doc.get(field) {
        Some(found) if found == wanted => true,
        Some(found) => wanted.is_i64() && as_id(found) == wanted.as_i64(),
        None => false,
    }
}

/// `max(id) + 1` over the given documents, or 1 when none carry an integer id.
pub fn next_id_after<'a>(docs: impl IntoIterator<Item = &'a Value>) -> i64 {
    docs.into_iter()
        .filter_map(|doc| doc.get("id").and_then(as_id))
        .max()
        .map_or(1, |max| max + 1)
}

/// Shallow merge following the remote database's PATCH rules.
pub(crate) fn merge_fields(doc: &mut Value, fields: Map<String, Value>) {
    if !doc.is_object() {
        *doc = Value::Object(Map::new());
    }
    if let Value::Object(target) = doc {
        for (name, value) in fields {
            if value.is_null() {
                target.remove(&name);
            } else {
                target.insert(name, value);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn next_id_skips_non_numeric_ids() {
        let docs = [json!({"id": 3}), json!({"id": "Q7"}), json!({"id": "11"}), json!({})];
        assert_eq!(next_id_after(docs.iter()), 12);
        assert_eq!(next_id_after(std::iter::empty()), 1);
    }

    #[test]
    fn merge_is_shallow_and_null_removes() {
        let mut doc = json!({"id": 1, "name": "Math", "meta": {"a": 1, "b": 2}});
        let fields = json!({"meta": {"a": 5}, "name": null, "color": "#fff"});
        merge_fields(&mut doc, fields.as_object().cloned().unwrap());

        assert_eq!(doc, json!({"id": 1, "meta": {"a": 5}, "color": "#fff"}));
    }

    #[test]
    fn integer_filters_accept_numeric_strings() {
        let doc = json!({"courseId": "4", "status": "pending"});
        assert!(field_matches(&doc, "courseId", &json!(4)));
        assert!(!field_matches(&doc, "courseId", &json!(5)));
        assert!(field_matches(&doc, "status", &json!("pending")));
        // String filters stay exact.
        assert!(!field_matches(&json!({"status": 4}), "status", &json!("4")));
        assert!(!field_matches(&doc, "userId", &json!(4)));
    }

    #[test]
    fn keys_the_remote_database_rejects() {
        assert_eq!(checked_key(&7_i64).unwrap(), "7");
        for bad in ["a.b", "a$b", "a#b", "a[b", "a]b", "a/b", "a\nb", ""] {
            assert!(
                matches!(checked_key(&Raw(bad.to_string())), Err(StoreError::InvalidKey(_))),
                "{:?} should be rejected",
                bad
            );
        }
        assert_eq!(checked_key(&Raw("1_Q?1 50%".to_string())).unwrap(), "1_Q?1 50%");
    }

    #[derive(Debug)]
    struct Raw(String);

    impl RecordKey for Raw {
        fn storage_key(&self) -> String {
            self.0.clone()
        }

        fn matches(&self, _doc: &Value) -> bool {
            false
        }
    }

    #[test]
    fn integer_key_matches_numeric_string_ids() {
        assert!(7_i64.matches(&json!({"id": "7"})));
        assert!(!7_i64.matches(&json!({"id": 8})));
        assert_eq!(7_i64.storage_key(), "7");
    }
}
