use thiserror::Error;

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("location schema: {0}")]
    Schema(#[from] models::errors::ModelError),
    #[error("document store: {0}")]
    Store(#[from] service::storage::StoreError),
    #[error(transparent)]
    Any(#[from] anyhow::Error),
}
