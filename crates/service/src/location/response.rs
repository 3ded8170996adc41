use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use tracing::error;

use crate::errors::ServiceError;

pub const INTERNAL_ERROR_MESSAGE: &str = "Internal Server Error";

/// Uniform result of a location operation: a status and a JSON body.
#[derive(Debug, Clone, PartialEq)]
pub struct LocationResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl LocationResponse {
    pub fn ok(body: Value) -> Self {
        Self { status: StatusCode::OK, body }
    }

    pub fn accepted(body: Value) -> Self {
        Self { status: StatusCode::ACCEPTED, body }
    }

    pub fn error(status: StatusCode, message: &str) -> Self {
        Self { status, body: json!({ "error": message }) }
    }

    /// Map an operation failure. Internal failures are logged with their
    /// detail and answered with a generic message.
    pub fn from_error(err: &ServiceError, operation: &'static str) -> Self {
        match err {
            ServiceError::Input(msg) => Self::error(StatusCode::BAD_REQUEST, msg),
            ServiceError::NotFound(msg) => Self::error(StatusCode::NOT_FOUND, msg),
            ServiceError::Store(_) | ServiceError::Internal(_) => {
                error!(operation, error = %err, detail = ?err, "location operation failed");
                Self::error(StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR_MESSAGE)
            }
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        self.body.get("error").and_then(Value::as_str)
    }
}

impl IntoResponse for LocationResponse {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}
