use serde_json::Value;

use models::Document;

/// A document query: every document, or those whose top-level `field`
/// equals a value. These are the only two shapes the service needs.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentQuery {
    filter: Option<(String, Value)>,
}

impl DocumentQuery {
    pub fn all() -> Self {
        Self { filter: None }
    }

    pub fn field_equals(field: &str, value: impl Into<Value>) -> Self {
        Self { filter: Some((field.to_string(), value.into())) }
    }

    /// Whether the query filters on `field`.
    pub fn targets(&self, field: &str) -> bool {
        self.filter.as_ref().is_some_and(|(f, _)| f == field)
    }

    pub fn matches(&self, doc: &Document) -> bool {
        match &self.filter {
            Some((field, value)) => doc.get(field) == Some(value),
            None => true,
        }
    }
}
