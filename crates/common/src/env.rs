//! Environment/runtime helpers
//!
//! Sanity checks to ensure the store directory exists at startup.

use std::path::Path;

use tracing::{info, warn};

/// Make sure the parent directory of a file-backed store exists.
pub async fn ensure_data_dir(store_path: &str) -> anyhow::Result<()> {
    let Some(parent) = Path::new(store_path).parent() else {
        return Ok(());
    };
    if parent.as_os_str().is_empty() {
        return Ok(());
    }
    if tokio::fs::metadata(parent).await.is_err() {
        warn!(dir = %parent.display(), "data directory missing; creating it");
    }
    tokio::fs::create_dir_all(parent)
        .await
        .map_err(|e| anyhow::anyhow!("cannot create {}: {e}", parent.display()))?;
    info!(dir = %parent.display(), "data directory ready");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn creates_missing_parent_dir() -> anyhow::Result<()> {
        let dir = std::env::temp_dir().join(format!("locations_env_{}", uuid::Uuid::new_v4()));
        let file = dir.join("nested").join("locations.json");
        ensure_data_dir(file.to_str().unwrap()).await?;
        assert!(tokio::fs::metadata(dir.join("nested")).await?.is_dir());
        let _ = tokio::fs::remove_dir_all(&dir).await;
        Ok(())
    }

    #[tokio::test]
    async fn bare_file_name_is_fine() -> anyhow::Result<()> {
        ensure_data_dir("locations.json").await
    }
}
