//! Typed access to one collection on top of any `Store`.

use std::marker::PhantomData;

use serde_json::{Map, Value};

use super::{Record, Result, Store, checked_key};

pub struct Repository<'a, T> {
    store: &'a dyn Store,
    _record: PhantomData<T>,
}

impl<'a, T: Record> Repository<'a, T> {
    pub fn new(store: &'a dyn Store) -> Self {
        Self {
            store,
            _record: PhantomData,
        }
    }

    pub async fn all(&self) -> Result<Vec<T>> {
        let docs = self.store.list(T::COLLECTION).await?;
        Ok(decode_all(docs))
    }

    pub async fn get(&self, key: &T::Key) -> Result<Option<T>> {
        checked_key(key)?;
        match self.store.get(T::COLLECTION, key).await? {
            Some(doc) => Ok(Some(serde_json::from_value(doc)?)),
            None => Ok(None),
        }
    }

    pub async fn find_by(&self, field: &str, value: impl Into<Value>) -> Result<Vec<T>> {
        let docs = self
            .store
            .find_by(T::COLLECTION, field, &value.into())
            .await?;
        Ok(decode_all(docs))
    }

    /// Writes the record at its key, replacing whatever was stored there.
    /// Keys the remote database cannot address are rejected on every backend.
    pub async fn save(&self, record: T) -> Result<T> {
        let key = record.key();
        checked_key(&key)?;

        let doc = serde_json::to_value(&record)?;
        self.store.put(T::COLLECTION, &key, doc).await?;
        Ok(record)
    }

    /// Shallow-merges `fields` into the stored record. Identity fields are
    /// dropped from the patch so a record never moves to another key.
    pub async fn update(&self, key: &T::Key, mut fields: Map<String, Value>) -> Result<Option<T>> {
        checked_key(key)?;
        for name in T::KEY_FIELDS {
            fields.remove(*name);
        }

        match self.store.merge(T::COLLECTION, key, fields).await? {
            Some(doc) => Ok(Some(serde_json::from_value(doc)?)),
            None => Ok(None),
        }
    }

    pub async fn delete(&self, key: &T::Key) -> Result<bool> {
        checked_key(key)?;
        self.store.remove(T::COLLECTION, key).await
    }

    pub async fn delete_by(&self, field: &str, value: impl Into<Value>) -> Result<usize> {
        self.store
            .remove_where(T::COLLECTION, field, &value.into())
            .await
    }
}

/// Decodes every document, logging and skipping the ones that do not fit.
fn decode_all<T: Record>(docs: Vec<Value>) -> Vec<T> {
    docs.into_iter()
        .filter_map(|doc| match serde_json::from_value(doc) {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::warn!("Skipping malformed {} record: {}", T::COLLECTION, e);
                None
            }
        })
        .collect()
}
