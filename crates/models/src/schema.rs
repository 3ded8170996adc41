//! Location JSON Schema.
//!
//! Compiled once at startup and shared read-only with the service. The
//! `properties` set also decides which extra body keys a create may persist.

use std::collections::BTreeSet;
use std::fmt;
use std::path::Path;

use jsonschema::Validator;
use serde_json::Value;
use tracing::info;

use crate::errors::ModelError;
use crate::location::Document;

const EMBEDDED_SCHEMA: &str = include_str!("../schemas/location.json");

pub struct LocationSchema {
    validator: Validator,
    properties: BTreeSet<String>,
}

impl fmt::Debug for LocationSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocationSchema")
            .field("properties", &self.properties)
            .finish_non_exhaustive()
    }
}

impl LocationSchema {
    pub fn from_value(raw: &Value) -> Result<Self, ModelError> {
        let validator = jsonschema::validator_for(raw)
            .map_err(|e| ModelError::InvalidSchema(e.to_string()))?;
        let properties = raw
            .get("properties")
            .and_then(Value::as_object)
            .map(|props| props.keys().cloned().collect())
            .unwrap_or_default();
        Ok(Self { validator, properties })
    }

    /// The schema shipped with this crate.
    pub fn embedded() -> Result<Self, ModelError> {
        let raw: Value = serde_json::from_str(EMBEDDED_SCHEMA)?;
        Self::from_value(&raw)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ModelError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let raw: Value = serde_json::from_str(&content)?;
        let schema = Self::from_value(&raw)?;
        info!(path = %path.display(), properties = schema.properties.len(), "location schema loaded");
        Ok(schema)
    }

    /// Load from `path` when given, otherwise use the embedded schema.
    pub fn load_or_embedded(path: Option<&str>) -> Result<Self, ModelError> {
        match path {
            Some(p) => Self::load(p),
            None => Self::embedded(),
        }
    }

    /// Whether `property` is listed under the schema's top-level `properties`.
    pub fn declares(&self, property: &str) -> bool {
        self.properties.contains(property)
    }

    pub fn validate(&self, instance: &Value) -> Result<(), ModelError> {
        let errors: Vec<String> = self
            .validator
            .iter_errors(instance)
            .map(|e| e.to_string())
            .collect();
        if errors.is_empty() {
            Ok(())
        } else {
            Err(ModelError::Schema(errors.join("; ")))
        }
    }

    pub fn validate_document(&self, doc: &Document) -> Result<(), ModelError> {
        self.validate(&Value::Object(doc.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn embedded_schema_compiles_and_lists_properties() {
        let schema = LocationSchema::embedded().unwrap();
        for p in ["id", "location_id", "location_name", "events_ids", "rooms", "address"] {
            assert!(schema.declares(p), "{p} should be declared");
        }
        assert!(!schema.declares("nickname"));
    }

    #[test]
    fn accepts_a_create_body_without_generated_ids() {
        let schema = LocationSchema::embedded().unwrap();
        let body = json!({
            "location_name": "Hall A",
            "events_ids": [],
            "rooms": [{"room_name": "R1", "capacity": 50}]
        });
        assert!(schema.validate(&body).is_ok());
    }

    #[test]
    fn reports_structural_errors() {
        let schema = LocationSchema::embedded().unwrap();
        let bad = json!({
            "location_name": "Hall A",
            "events_ids": "e1",
            "rooms": [{"room_name": "R1", "capacity": -1}]
        });
        match schema.validate(&bad) {
            Err(ModelError::Schema(msg)) => assert!(!msg.is_empty()),
            other => panic!("expected schema error, got {other:?}"),
        }
        assert!(schema.validate(&json!({"location_name": "x", "rooms": []})).is_err());
    }

    #[test]
    fn custom_schema_from_file() {
        let path = std::env::temp_dir().join(format!("location_schema_{}.json", uuid::Uuid::new_v4()));
        std::fs::write(
            &path,
            r#"{"type": "object", "required": ["location_name"], "properties": {"location_name": {"type": "string"}, "floorplan": {}}}"#,
        )
        .unwrap();
        let schema = LocationSchema::load_or_embedded(path.to_str()).unwrap();
        assert!(schema.declares("floorplan"));
        assert!(!schema.declares("address"));
        assert!(schema.validate(&json!({"location_name": "x"})).is_ok());
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn invalid_schema_is_rejected() {
        let err = LocationSchema::from_value(&json!({"type": 12})).unwrap_err();
        assert!(matches!(err, ModelError::InvalidSchema(_)));
    }
}
