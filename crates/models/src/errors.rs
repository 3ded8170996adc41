use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("JSON schema validation error: {0}")]
    Schema(String),
    #[error("invalid schema: {0}")]
    InvalidSchema(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}
