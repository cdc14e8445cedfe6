//! In-process document store used when Firebase is not configured.
//!
//! Data lives only as long as the process. Every operation takes the single
//! lock for its whole duration, so each call is atomic on its own.

use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::{Map, Value};
use tokio::sync::RwLock;

use super::{
    BackendKind, Collection, RecordKey, Result, Store, field_matches, merge_fields, next_id_after,
};

pub struct MemoryStore {
    collections: RwLock<HashMap<Collection, Vec<Value>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            collections: RwLock::new(empty_collections()),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

fn empty_collections() -> HashMap<Collection, Vec<Value>> {
    Collection::ALL
        .iter()
        .map(|collection| (*collection, Vec::new()))
        .collect()
}

#[async_trait]
impl Store for MemoryStore {
    fn kind(&self) -> BackendKind {
        BackendKind::Memory
    }

    async fn list(&self, collection: Collection) -> Result<Vec<Value>> {
        let collections = self.collections.read().await;
        Ok(collections.get(&collection).cloned().unwrap_or_default())
    }

    async fn get(&self, collection: Collection, key: &dyn RecordKey) -> Result<Option<Value>> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(&collection)
            .and_then(|docs| docs.iter().find(|doc| key.matches(doc)))
            .cloned())
    }

    async fn find_by(
        &self,
        collection: Collection,
        field: &str,
        value: &Value,
    ) -> Result<Vec<Value>> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(&collection)
            .map(|docs| {
                docs.iter()
                    .filter(|doc| field_matches(doc, field, value))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn put(&self, collection: Collection, key: &dyn RecordKey, doc: Value) -> Result<()> {
        let mut collections = self.collections.write().await;
        let docs = collections.entry(collection).or_default();

        // Overwrite in place so insertion order survives re-saves.
        match docs.iter_mut().find(|existing| key.matches(existing)) {
            Some(existing) => *existing = doc,
            None => docs.push(doc),
        }
        Ok(())
    }

    async fn merge(
        &self,
        collection: Collection,
        key: &dyn RecordKey,
        fields: Map<String, Value>,
    ) -> Result<Option<Value>> {
        let mut collections = self.collections.write().await;
        let Some(doc) = collections
            .get_mut(&collection)
            .and_then(|docs| docs.iter_mut().find(|doc| key.matches(doc)))
        else {
            return Ok(None);
        };

        merge_fields(doc, fields);
        Ok(Some(doc.clone()))
    }

    async fn remove(&self, collection: Collection, key: &dyn RecordKey) -> Result<bool> {
        let mut collections = self.collections.write().await;
        let Some(docs) = collections.get_mut(&collection) else {
            return Ok(false);
        };

        match docs.iter().position(|doc| key.matches(doc)) {
            Some(index) => {
                docs.remove(index);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn remove_where(
        &self,
        collection: Collection,
        field: &str,
        value: &Value,
    ) -> Result<usize> {
        let mut collections = self.collections.write().await;
        let Some(docs) = collections.get_mut(&collection) else {
            return Ok(0);
        };

        let before = docs.len();
        docs.retain(|doc| !field_matches(doc, field, value));
        Ok(before - docs.len())
    }

    async fn next_id(&self, collection: Collection) -> Result<i64> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(&collection)
            .map_or(1, |docs| next_id_after(docs.iter())))
    }

    async fn clear(&self) -> Result<()> {
        let mut collections = self.collections.write().await;
        *collections = empty_collections();
        Ok(())
    }
}
