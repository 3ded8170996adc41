//! Document store abstraction.
//!
//! The service talks to persistence only through [`DocumentStore`], shaped
//! after a partitioned document database: field-equality queries, create,
//! full replace and delete by internal id + partition key.

pub mod query;
pub mod json_map_store;
pub mod memory;
pub mod file;

use async_trait::async_trait;
use models::Document;
use thiserror::Error;

pub use file::FileDocumentStore;
pub use memory::MemoryDocumentStore;
pub use query::DocumentQuery;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("document '{0}' not found")]
    NotFound(String),
    #[error("document '{0}' already exists")]
    Conflict(String),
    #[error("query does not target partition key '{0}' and cross-partition queries are disabled")]
    CrossPartition(String),
    #[error("invalid document: {0}")]
    InvalidDocument(String),
    #[error("io error: {0}")]
    Io(String),
    #[error("serialization error: {0}")]
    Serialization(String),
}

#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Run `query`. Queries that do not filter on the partition key require
    /// `cross_partition`.
    async fn query_items(&self, query: &DocumentQuery, cross_partition: bool) -> Result<Vec<Document>, StoreError>;
    /// Insert a new document; its string `id` must not exist yet.
    async fn create_item(&self, doc: Document) -> Result<Document, StoreError>;
    /// Replace the document stored under internal id `id`.
    async fn replace_item(&self, id: &str, doc: Document) -> Result<Document, StoreError>;
    /// Remove the document `id` living in partition `partition_key`.
    async fn delete_item(&self, id: &str, partition_key: &str) -> Result<(), StoreError>;
}

/// Internal id of a document, required to be a non-empty string.
pub(crate) fn document_id(doc: &Document) -> Result<String, StoreError> {
    match doc.get("id").and_then(|v| v.as_str()) {
        Some(id) if !id.is_empty() => Ok(id.to_string()),
        _ => Err(StoreError::InvalidDocument("missing string 'id'".into())),
    }
}

/// Reject single-partition queries that would need a fan-out.
pub(crate) fn check_partition_scope(
    query: &DocumentQuery,
    cross_partition: bool,
    partition_key: &str,
) -> Result<(), StoreError> {
    if cross_partition || query.targets(partition_key) {
        Ok(())
    } else {
        Err(StoreError::CrossPartition(partition_key.to_string()))
    }
}

/// Whether `doc` lives in partition `partition_key` under field `field`.
pub(crate) fn in_partition(doc: &Document, field: &str, partition_key: &str) -> bool {
    doc.get(field).and_then(|v| v.as_str()) == Some(partition_key)
}
