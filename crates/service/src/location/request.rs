use std::collections::HashMap;

use axum::http::Method;
use models::{location::PARTITION_KEY, Document};
use serde_json::Value;

use crate::errors::ServiceError;

pub const NOT_AN_OBJECT: &str = "Request body must be a valid JSON object.";

/// Request body as received: nothing, parsed JSON, or bytes that failed to parse.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    Empty,
    Json(Value),
    Malformed(String),
}

impl RequestBody {
    pub fn from_bytes(bytes: &[u8]) -> Self {
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Self::Empty;
        }
        match serde_json::from_slice(bytes) {
            Ok(v) => Self::Json(v),
            Err(e) => Self::Malformed(e.to_string()),
        }
    }

    /// The body as a JSON object; anything else is an input error.
    pub fn object(&self) -> Result<&Document, ServiceError> {
        match self {
            Self::Json(Value::Object(doc)) => Ok(doc),
            _ => Err(ServiceError::input(NOT_AN_OBJECT)),
        }
    }
}

/// Where an operation reads `location_id` from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdSource {
    Query,
    Body,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LocationRequest {
    pub method: Method,
    pub params: HashMap<String, String>,
    pub body: RequestBody,
}

impl LocationRequest {
    pub fn new(method: Method) -> Self {
        Self { method, params: HashMap::new(), body: RequestBody::Empty }
    }

    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    pub fn with_json(mut self, body: Value) -> Self {
        self.body = RequestBody::Json(body);
        self
    }

    /// Non-empty `location_id` from `source`. An empty body holds no id; a
    /// body that is not a JSON object is rejected.
    pub fn location_id(&self, source: IdSource) -> Result<Option<String>, ServiceError> {
        match source {
            IdSource::Query => Ok(self.params.get(PARTITION_KEY).filter(|s| !s.is_empty()).cloned()),
            IdSource::Body => match &self.body {
                RequestBody::Empty => Ok(None),
                body => location_id_field(body.object()?),
            },
        }
    }
}

pub(crate) fn location_id_field(doc: &Document) -> Result<Option<String>, ServiceError> {
    match doc.get(PARTITION_KEY) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) if s.is_empty() => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(_) => Err(ServiceError::input("'location_id' must be a string.")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn classifies_raw_bodies() {
        assert_eq!(RequestBody::from_bytes(b""), RequestBody::Empty);
        assert_eq!(RequestBody::from_bytes(b" \n"), RequestBody::Empty);
        assert_eq!(RequestBody::from_bytes(br#"{"a":1}"#), RequestBody::Json(json!({"a": 1})));
        assert!(matches!(RequestBody::from_bytes(b"{oops"), RequestBody::Malformed(_)));
    }

    #[test]
    fn only_objects_are_objects() {
        assert!(RequestBody::Json(json!([1])).object().is_err());
        assert!(RequestBody::Empty.object().is_err());
        assert!(RequestBody::Malformed("x".into()).object().is_err());
        assert!(RequestBody::Json(json!({})).object().is_ok());
    }

    #[test]
    fn reads_location_id_from_either_source() {
        let req = LocationRequest::new(Method::GET)
            .with_param("location_id", "from-query")
            .with_json(json!({"location_id": "from-body"}));
        assert_eq!(req.location_id(IdSource::Query).unwrap().as_deref(), Some("from-query"));
        assert_eq!(req.location_id(IdSource::Body).unwrap().as_deref(), Some("from-body"));

        let empty = LocationRequest::new(Method::POST).with_param("location_id", "");
        assert_eq!(empty.location_id(IdSource::Query).unwrap(), None);
        assert_eq!(empty.location_id(IdSource::Body).unwrap(), None);
    }

    #[test]
    fn rejects_bad_body_ids() {
        let numeric = LocationRequest::new(Method::POST).with_json(json!({"location_id": 7}));
        assert!(matches!(numeric.location_id(IdSource::Body), Err(ServiceError::Input(_))));

        let malformed = LocationRequest {
            body: RequestBody::from_bytes(b"nope"),
            ..LocationRequest::new(Method::POST)
        };
        assert!(matches!(malformed.location_id(IdSource::Body), Err(ServiceError::Input(_))));
    }
}
