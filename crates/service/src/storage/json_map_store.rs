use std::{collections::HashMap, hash::Hash, path::PathBuf, sync::Arc};
use tokio::{fs, sync::RwLock};

use super::StoreError;

/// Generic JSON file-backed key-value map store.
///
/// Persists a `HashMap<K, V>` to a JSON file. Every mutation rewrites the
/// whole file while holding the write lock, so writers are serialized.
#[derive(Clone)]
pub struct JsonMapStore<K, V> {
    inner: Arc<RwLock<HashMap<K, V>>>,
    file_path: PathBuf,
}

impl<K, V> JsonMapStore<K, V>
where
    K: Eq + Hash + serde::Serialize + serde::de::DeserializeOwned + Clone,
    V: serde::Serialize + serde::de::DeserializeOwned + Clone,
{
    /// Initialize the store from a path. Creates the file with an empty map if
    /// missing; a file that exists but does not parse is an error.
    pub async fn new<P: Into<PathBuf>>(path: P) -> Result<Arc<Self>, StoreError> {
        let file_path = path.into();
        if let Some(parent) = file_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await.map_err(|e| StoreError::Io(e.to_string()))?;
        }

        let map: HashMap<K, V> = match fs::read(&file_path).await {
            Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => HashMap::new(),
            Ok(bytes) => serde_json::from_slice(&bytes).map_err(|e| {
                StoreError::Serialization(format!("{}: {e}", file_path.display()))
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let empty: HashMap<K, V> = HashMap::new();
                let data = serde_json::to_vec(&empty).map_err(|e| StoreError::Serialization(e.to_string()))?;
                fs::write(&file_path, data).await.map_err(|e| StoreError::Io(e.to_string()))?;
                empty
            }
            Err(e) => return Err(StoreError::Io(e.to_string())),
        };

        Ok(Arc::new(Self { inner: Arc::new(RwLock::new(map)), file_path }))
    }

    async fn save(&self, map: &HashMap<K, V>) -> Result<(), StoreError> {
        let data = serde_json::to_vec_pretty(map).map_err(|e| StoreError::Serialization(e.to_string()))?;
        fs::write(&self.file_path, data).await.map_err(|e| StoreError::Io(e.to_string()))?;
        Ok(())
    }

    /// List all values.
    pub async fn values(&self) -> Vec<V> {
        let map = self.inner.read().await;
        map.values().cloned().collect()
    }

    /// Get value by key.
    pub async fn get(&self, key: &K) -> Option<V> {
        let map = self.inner.read().await;
        map.get(key).cloned()
    }

    /// Apply a mutation to a copy of the map, persist the copy, then swap it
    /// in. The live map only changes once the file write has succeeded.
    pub async fn update_map<F, R>(&self, f: F) -> Result<R, StoreError>
    where
        F: FnOnce(&mut HashMap<K, V>) -> Result<R, StoreError>,
    {
        let mut map = self.inner.write().await;
        let mut next = map.clone();
        let out = f(&mut next)?;
        self.save(&next).await?;
        *map = next;
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn json_map_store_persists_updates() -> Result<(), anyhow::Error> {
        let tmp = std::env::temp_dir().join(format!("json_map_store_{}.json", uuid::Uuid::new_v4()));
        let store = JsonMapStore::<String, String>::new(&tmp).await?;

        assert_eq!(store.values().await.len(), 0);

        store
            .update_map(|m| {
                m.insert("a".into(), "1".into());
                m.insert("b".into(), "2".into());
                Ok(())
            })
            .await?;
        assert_eq!(store.get(&"a".into()).await.as_deref(), Some("1"));

        let removed = store.update_map(|m| Ok(m.remove("b").is_some())).await?;
        assert!(removed);

        // failed mutations are not persisted
        let res = store
            .update_map(|_| -> Result<(), StoreError> { Err(StoreError::Conflict("a".into())) })
            .await;
        assert!(matches!(res, Err(StoreError::Conflict(_))));

        let reloaded = JsonMapStore::<String, String>::new(&tmp).await?;
        assert_eq!(reloaded.values().await, vec!["1".to_string()]);

        let _ = tokio::fs::remove_file(&tmp).await;
        Ok(())
    }

    #[tokio::test]
    async fn failed_save_leaves_map_unchanged() -> Result<(), anyhow::Error> {
        let tmp = std::env::temp_dir().join(format!("json_map_store_{}.json", uuid::Uuid::new_v4()));
        let store = JsonMapStore::<String, String>::new(&tmp).await?;
        store.update_map(|m| Ok(m.insert("a".into(), "1".into()))).await?;

        // a directory in place of the file makes every write fail
        tokio::fs::remove_file(&tmp).await?;
        tokio::fs::create_dir(&tmp).await?;

        let res = store.update_map(|m| Ok(m.insert("b".into(), "2".into()))).await;
        assert!(matches!(res, Err(StoreError::Io(_))));
        let res = store.update_map(|m| Ok(m.remove("a"))).await;
        assert!(matches!(res, Err(StoreError::Io(_))));

        assert_eq!(store.values().await, vec!["1".to_string()]);
        assert_eq!(store.get(&"b".into()).await, None);

        let _ = tokio::fs::remove_dir(&tmp).await;
        Ok(())
    }

    #[tokio::test]
    async fn corrupt_file_is_an_error() -> Result<(), anyhow::Error> {
        let tmp = std::env::temp_dir().join(format!("json_map_store_{}.json", uuid::Uuid::new_v4()));
        tokio::fs::write(&tmp, b"{not json").await?;
        let res = JsonMapStore::<String, String>::new(&tmp).await;
        assert!(matches!(res, Err(StoreError::Serialization(_))));
        let _ = tokio::fs::remove_file(&tmp).await;
        Ok(())
    }
}
