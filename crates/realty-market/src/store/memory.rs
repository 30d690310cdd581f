use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use serde_json::{Map, Value};

use super::{Collection, DocumentStore, FieldFilter, StoreError, StoredDocument};

/// Process-local document store keeping each collection in insertion order.
///
/// Used by the demo server and by tests; `set_available(false)` makes every call fail
/// with `StoreError::Unavailable` so degraded paths can be exercised.
#[derive(Debug, Clone)]
pub struct InMemoryDocumentStore {
    collections: Arc<Mutex<HashMap<Collection, Vec<StoredDocument>>>>,
    sequence: Arc<AtomicU64>,
    available: Arc<AtomicBool>,
}

impl Default for InMemoryDocumentStore {
    fn default() -> Self {
        Self {
            collections: Arc::default(),
            sequence: Arc::new(AtomicU64::new(1)),
            available: Arc::new(AtomicBool::new(true)),
        }
    }
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::Release);
    }

    pub fn len(&self, collection: Collection) -> usize {
        self.collections
            .lock()
            .map(|guard| guard.get(&collection).map_or(0, Vec::len))
            .unwrap_or(0)
    }

    pub fn is_empty(&self, collection: Collection) -> bool {
        self.len(collection) == 0
    }

    fn next_id(&self, collection: Collection) -> String {
        let id = self.sequence.fetch_add(1, Ordering::Relaxed);
        let prefix = match collection {
            Collection::Properties => "prop",
            Collection::Users => "user",
            Collection::Admins => "admin",
            Collection::Settings => "setting",
        };
        format!("{prefix}-{id:06}")
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<Collection, Vec<StoredDocument>>>, StoreError> {
        if !self.available.load(Ordering::Acquire) {
            return Err(StoreError::Unavailable("store offline".to_string()));
        }
        self.collections
            .lock()
            .map_err(|_| StoreError::Unavailable("store mutex poisoned".to_string()))
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn create(&self, collection: Collection, document: Value) -> Result<String, StoreError> {
        let mut guard = self.lock()?;
        let id = self.next_id(collection);
        guard.entry(collection).or_default().push(StoredDocument {
            id: id.clone(),
            data: document,
        });
        Ok(id)
    }

    async fn put(
        &self,
        collection: Collection,
        id: &str,
        document: Value,
    ) -> Result<(), StoreError> {
        let mut guard = self.lock()?;
        let documents = guard.entry(collection).or_default();
        match documents.iter_mut().find(|stored| stored.id == id) {
            Some(existing) => existing.data = document,
            None => documents.push(StoredDocument {
                id: id.to_string(),
                data: document,
            }),
        }
        Ok(())
    }

    async fn get(&self, collection: Collection, id: &str) -> Result<Option<Value>, StoreError> {
        let guard = self.lock()?;
        Ok(guard
            .get(&collection)
            .and_then(|documents| documents.iter().find(|stored| stored.id == id))
            .map(|stored| stored.data.clone()))
    }

    async fn list(
        &self,
        collection: Collection,
        filters: &[FieldFilter],
    ) -> Result<Vec<StoredDocument>, StoreError> {
        let guard = self.lock()?;
        Ok(guard
            .get(&collection)
            .map(|documents| {
                documents
                    .iter()
                    .filter(|stored| filters.iter().all(|filter| filter.matches(&stored.data)))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn update(
        &self,
        collection: Collection,
        id: &str,
        fields: Map<String, Value>,
    ) -> Result<(), StoreError> {
        let mut guard = self.lock()?;
        let stored = guard
            .get_mut(&collection)
            .and_then(|documents| documents.iter_mut().find(|stored| stored.id == id))
            .ok_or(StoreError::NotFound)?;

        match stored.data.as_object_mut() {
            Some(object) => object.extend(fields),
            None => stored.data = Value::Object(fields),
        }
        Ok(())
    }

    async fn delete(&self, collection: Collection, id: &str) -> Result<(), StoreError> {
        let mut guard = self.lock()?;
        let documents = guard.get_mut(&collection).ok_or(StoreError::NotFound)?;
        let position = documents
            .iter()
            .position(|stored| stored.id == id)
            .ok_or(StoreError::NotFound)?;
        documents.remove(position);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn create_assigns_sequential_keys_and_preserves_order() {
        let store = InMemoryDocumentStore::new();
        let first = store
            .create(Collection::Properties, json!({ "title": "A" }))
            .await
            .expect("create first");
        let second = store
            .create(Collection::Properties, json!({ "title": "B" }))
            .await
            .expect("create second");

        assert_eq!(first, "prop-000001");
        assert_eq!(second, "prop-000002");

        let listed = store
            .list(Collection::Properties, &[])
            .await
            .expect("list succeeds");
        let ids: Vec<_> = listed.iter().map(|doc| doc.id.as_str()).collect();
        assert_eq!(ids, vec!["prop-000001", "prop-000002"]);
    }

    #[tokio::test]
    async fn update_merges_fields_and_rejects_missing_documents() {
        let store = InMemoryDocumentStore::new();
        let id = store
            .create(Collection::Properties, json!({ "title": "A", "price": 10 }))
            .await
            .expect("create");

        let mut fields = Map::new();
        fields.insert("price".to_string(), json!(20));
        store
            .update(Collection::Properties, &id, fields.clone())
            .await
            .expect("update existing");

        let stored = store
            .get(Collection::Properties, &id)
            .await
            .expect("get")
            .expect("present");
        assert_eq!(stored, json!({ "title": "A", "price": 20 }));

        assert!(matches!(
            store.update(Collection::Properties, "missing", fields).await,
            Err(StoreError::NotFound)
        ));
    }

    #[tokio::test]
    async fn put_upserts_under_caller_key() {
        let store = InMemoryDocumentStore::new();
        store
            .put(Collection::Admins, "uid-1", json!({ "role": "admin" }))
            .await
            .expect("first put");
        store
            .put(Collection::Admins, "uid-1", json!({ "role": "admin", "email": "a@b.c" }))
            .await
            .expect("second put");

        assert_eq!(store.len(Collection::Admins), 1);
        let stored = store
            .get(Collection::Admins, "uid-1")
            .await
            .expect("get")
            .expect("present");
        assert_eq!(stored["email"], "a@b.c");
    }

    #[tokio::test]
    async fn offline_store_fails_every_call() {
        let store = InMemoryDocumentStore::new();
        store.set_available(false);

        assert!(matches!(
            store.list(Collection::Properties, &[]).await,
            Err(StoreError::Unavailable(_))
        ));
        assert!(matches!(
            store.delete(Collection::Properties, "prop-000001").await,
            Err(StoreError::Unavailable(_))
        ));
    }
}
