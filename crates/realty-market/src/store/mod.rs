//! Minimal seam over the hosted document database.
//!
//! Only the operations the marketplace core needs are modelled: keyed reads and writes,
//! merges, deletes, and listing with equality filters. Documents are schema-less JSON
//! objects; typed records are (de)serialised at the call sites.

mod memory;

pub use memory::InMemoryDocumentStore;

use async_trait::async_trait;
use serde_json::{Map, Value};

/// Collections the marketplace reads and writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Properties,
    Users,
    Admins,
    Settings,
}

impl Collection {
    pub const fn name(self) -> &'static str {
        match self {
            Self::Properties => "properties",
            Self::Users => "users",
            Self::Admins => "admins",
            Self::Settings => "settings",
        }
    }
}

/// Document payload paired with the key the store holds it under.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredDocument {
    pub id: String,
    pub data: Value,
}

/// Equality predicate applied server-side when listing a collection.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldFilter {
    Equals { field: String, value: Value },
}

impl FieldFilter {
    pub fn equals(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::Equals {
            field: field.into(),
            value: value.into(),
        }
    }

    pub fn matches(&self, document: &Value) -> bool {
        match self {
            FieldFilter::Equals { field, value } => document.get(field) == Some(value),
        }
    }
}

/// Storage abstraction so the repository and gate can be exercised in isolation.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Persist a new document under a store-assigned key.
    async fn create(&self, collection: Collection, document: Value) -> Result<String, StoreError>;

    /// Write a document under a caller-chosen key, replacing any previous content.
    async fn put(&self, collection: Collection, id: &str, document: Value)
        -> Result<(), StoreError>;

    async fn get(&self, collection: Collection, id: &str) -> Result<Option<Value>, StoreError>;

    async fn list(
        &self,
        collection: Collection,
        filters: &[FieldFilter],
    ) -> Result<Vec<StoredDocument>, StoreError>;

    /// Merge `fields` into an existing document.
    async fn update(
        &self,
        collection: Collection,
        id: &str,
        fields: Map<String, Value>,
    ) -> Result<(), StoreError>;

    async fn delete(&self, collection: Collection, id: &str) -> Result<(), StoreError>;
}

/// Error enumeration for document store failures.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("document not found")]
    NotFound,
    #[error("document store unavailable: {0}")]
    Unavailable(String),
    #[error("malformed document: {0}")]
    Serialization(#[from] serde_json::Error),
}
