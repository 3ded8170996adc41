use std::{path::PathBuf, sync::Arc};

use async_trait::async_trait;
use models::Document;
use tracing::info;

use super::json_map_store::JsonMapStore;
use super::{check_partition_scope, document_id, in_partition, DocumentQuery, DocumentStore, StoreError};

/// Durable store: one JSON file holding every document keyed by internal id.
#[derive(Clone)]
pub struct FileDocumentStore {
    store: Arc<JsonMapStore<String, Document>>,
    partition_key: String,
}

impl FileDocumentStore {
    /// Open (or create) the file at `path`.
    pub async fn open<P: Into<PathBuf>>(path: P, partition_key: impl Into<String>) -> Result<Arc<Self>, StoreError> {
        let path = path.into();
        let store = JsonMapStore::<String, Document>::new(path.clone()).await?;
        info!(path = %path.display(), documents = store.values().await.len(), "file document store opened");
        Ok(Arc::new(Self { store, partition_key: partition_key.into() }))
    }
}

#[async_trait]
impl DocumentStore for FileDocumentStore {
    async fn query_items(&self, query: &DocumentQuery, cross_partition: bool) -> Result<Vec<Document>, StoreError> {
        check_partition_scope(query, cross_partition, &self.partition_key)?;
        Ok(self
            .store
            .values()
            .await
            .into_iter()
            .filter(|d| query.matches(d))
            .collect())
    }

    async fn create_item(&self, doc: Document) -> Result<Document, StoreError> {
        let id = document_id(&doc)?;
        self.store
            .update_map(|map| {
                if map.contains_key(&id) {
                    return Err(StoreError::Conflict(id));
                }
                map.insert(id, doc.clone());
                Ok(())
            })
            .await?;
        Ok(doc)
    }

    async fn replace_item(&self, id: &str, mut doc: Document) -> Result<Document, StoreError> {
        doc.insert("id".into(), id.into());
        self.store
            .update_map(|map| {
                let slot = map.get_mut(id).ok_or_else(|| StoreError::NotFound(id.to_string()))?;
                *slot = doc.clone();
                Ok(())
            })
            .await?;
        Ok(doc)
    }

    async fn delete_item(&self, id: &str, partition_key: &str) -> Result<(), StoreError> {
        let field = self.partition_key.as_str();
        self.store
            .update_map(|map| {
                let owned = map.get(id).is_some_and(|doc| in_partition(doc, field, partition_key));
                if !owned {
                    return Err(StoreError::NotFound(id.to_string()));
                }
                map.remove(id);
                Ok(())
            })
            .await
    }
}
