use thiserror::Error;

use crate::storage::StoreError;

/// Outcome kinds of a location operation.
///
/// `Input` maps to 400, `NotFound` to 404, everything else to 500 with a
/// generic body.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{0}")]
    Input(String),
    #[error("{0}")]
    NotFound(String),
    #[error("store error: {0}")]
    Store(#[from] StoreError),
    #[error("internal error: {0}")]
    Internal(String),
}

impl ServiceError {
    pub fn input(msg: impl Into<String>) -> Self { Self::Input(msg.into()) }

    pub fn location_not_found(location_id: &str, suffix: &str) -> Self {
        Self::NotFound(format!("Location '{location_id}' not found{suffix}"))
    }
}

impl From<models::errors::ModelError> for ServiceError {
    fn from(e: models::errors::ModelError) -> Self {
        use models::errors::ModelError;
        match e {
            ModelError::Schema(_) => Self::Input(e.to_string()),
            ModelError::InvalidSchema(_) | ModelError::Io(_) | ModelError::Json(_) => Self::Internal(e.to_string()),
        }
    }
}
