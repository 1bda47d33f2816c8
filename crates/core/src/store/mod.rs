//! Document store client.
//!
//! The site keeps every page as a small tree of JSON documents. Backends
//! implement [`DocumentStore`]; the rest of the crate never talks to a
//! database directly.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;

use crate::document::{CollectionPath, DocPath, Document, DocumentData, PathError};

pub use memory::{MemoryStore, StoreCall};
pub use postgres::PgStore;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("invalid path: {0}")]
    InvalidPath(#[from] PathError),

    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("store rejected the operation on {path}: {reason}")]
    Rejected { path: String, reason: String },

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("document body could not be decoded: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Key-path document database.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Read one document; `None` when it does not exist.
    async fn get(&self, path: &DocPath) -> Result<Option<Document>, StoreError>;

    /// Create or replace the document at an explicit path.
    async fn set(&self, path: &DocPath, data: DocumentData) -> Result<(), StoreError>;

    /// Insert a document with a store-assigned id and return the id.
    async fn add(&self, collection: &CollectionPath, data: DocumentData)
        -> Result<String, StoreError>;

    /// Delete one document. Deleting a missing document succeeds.
    async fn delete(&self, path: &DocPath) -> Result<(), StoreError>;

    /// Every document directly inside a collection, in arrival order.
    async fn list(&self, collection: &CollectionPath) -> Result<Vec<Document>, StoreError>;

    /// Cheap connectivity check.
    async fn ping(&self) -> Result<(), StoreError>;
}

/// Fresh id for documents created through [`DocumentStore::add`].
pub(crate) fn new_document_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}
