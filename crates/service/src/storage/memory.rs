use async_trait::async_trait;
use dashmap::{mapref::entry::Entry, DashMap};
use models::Document;

use super::{check_partition_scope, document_id, in_partition, DocumentQuery, DocumentStore, StoreError};

/// In-process store keyed by internal id. Used by tests and by the
/// `memory` backend; contents are lost on restart.
pub struct MemoryDocumentStore {
    docs: DashMap<String, Document>,
    partition_key: String,
}

impl MemoryDocumentStore {
    pub fn new(partition_key: impl Into<String>) -> Self {
        Self { docs: DashMap::new(), partition_key: partition_key.into() }
    }

    pub fn len(&self) -> usize {
        self.docs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }
}

impl Default for MemoryDocumentStore {
    fn default() -> Self {
        Self::new(models::location::PARTITION_KEY)
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn query_items(&self, query: &DocumentQuery, cross_partition: bool) -> Result<Vec<Document>, StoreError> {
        check_partition_scope(query, cross_partition, &self.partition_key)?;
        Ok(self
            .docs
            .iter()
            .filter(|e| query.matches(e.value()))
            .map(|e| e.value().clone())
            .collect())
    }

    async fn create_item(&self, doc: Document) -> Result<Document, StoreError> {
        let id = document_id(&doc)?;
        match self.docs.entry(id) {
            Entry::Occupied(e) => Err(StoreError::Conflict(e.key().clone())),
            Entry::Vacant(e) => {
                e.insert(doc.clone());
                Ok(doc)
            }
        }
    }

    async fn replace_item(&self, id: &str, mut doc: Document) -> Result<Document, StoreError> {
        doc.insert("id".into(), id.into());
        let mut slot = self.docs.get_mut(id).ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        *slot = doc.clone();
        Ok(doc)
    }

    async fn delete_item(&self, id: &str, partition_key: &str) -> Result<(), StoreError> {
        let field = &self.partition_key;
        self.docs
            .remove_if(id, |_, doc| in_partition(doc, field, partition_key))
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(id: &str, location_id: &str, name: &str) -> Document {
        json!({"id": id, "location_id": location_id, "location_name": name})
            .as_object()
            .cloned()
            .unwrap()
    }

    #[tokio::test]
    async fn crud_round() -> Result<(), anyhow::Error> {
        let store = MemoryDocumentStore::default();
        store.create_item(doc("1", "L1", "Hall A")).await?;
        store.create_item(doc("2", "L2", "Hall B")).await?;
        assert_eq!(store.len(), 2);

        let hits = store
            .query_items(&DocumentQuery::field_equals("location_name", "Hall B"), true)
            .await?;
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0]["id"], "2");

        store.replace_item("2", doc("ignored", "L2", "Hall C")).await?;
        let all = store.query_items(&DocumentQuery::all(), true).await?;
        assert!(all.iter().any(|d| d["id"] == "2" && d["location_name"] == "Hall C"));

        store.delete_item("2", "L2").await?;
        assert_eq!(store.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn rejects_duplicates_missing_ids_and_wrong_partitions() {
        let store = MemoryDocumentStore::default();
        store.create_item(doc("1", "L1", "A")).await.unwrap();

        assert!(matches!(store.create_item(doc("1", "L9", "B")).await, Err(StoreError::Conflict(_))));
        let no_id = json!({"location_id": "x"}).as_object().cloned().unwrap();
        assert!(matches!(store.create_item(no_id).await, Err(StoreError::InvalidDocument(_))));
        assert!(matches!(store.replace_item("404", doc("404", "L", "A")).await, Err(StoreError::NotFound(_))));
        assert!(matches!(store.delete_item("1", "other-partition").await, Err(StoreError::NotFound(_))));
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn cross_partition_queries_need_opt_in() {
        let store = MemoryDocumentStore::default();
        store.create_item(doc("1", "L1", "A")).await.unwrap();

        let by_name = DocumentQuery::field_equals("location_name", "A");
        assert!(matches!(store.query_items(&by_name, false).await, Err(StoreError::CrossPartition(_))));
        assert!(store.query_items(&DocumentQuery::all(), false).await.is_err());

        let by_pk = DocumentQuery::field_equals("location_id", "L1");
        assert_eq!(store.query_items(&by_pk, false).await.unwrap().len(), 1);
    }
}
