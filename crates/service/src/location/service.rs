use std::sync::Arc;

use axum::http::Method;
use models::{
    location::{
        assign_missing_room_ids, duplicate_room_id, missing_fields, new_id, new_location_document,
        room_count, PARTITION_KEY, REQUIRED_LOCATION_FIELDS, REQUIRED_ROOM_FIELDS, UPDATABLE_FIELDS,
    },
    Document, LocationSchema,
};
use serde_json::{json, Value};
use tokio::sync::Mutex;
use tracing::{debug, info, instrument};

use super::request::{location_id_field, IdSource, LocationRequest};
use super::response::LocationResponse;
use crate::errors::ServiceError;
use crate::storage::{document_id, DocumentQuery, DocumentStore};

/// Create, get, edit and delete location documents.
///
/// Writes go through `write_gate`, so inside one process the
/// uniqueness/existence check and the following write cannot interleave
/// with another write. Processes sharing a store are not coordinated.
pub struct LocationService<S: DocumentStore + ?Sized> {
    store: Arc<S>,
    schema: Arc<LocationSchema>,
    write_gate: Mutex<()>,
}

impl<S: DocumentStore + ?Sized> LocationService<S> {
    pub fn new(store: Arc<S>, schema: Arc<LocationSchema>) -> Self {
        Self { store, schema, write_gate: Mutex::new(()) }
    }

    #[instrument(skip_all, fields(operation = "create"))]
    pub async fn create(&self, req: &LocationRequest) -> LocationResponse {
        let _gate = self.write_gate.lock().await;
        self.try_create(req)
            .await
            .unwrap_or_else(|e| LocationResponse::from_error(&e, "create"))
    }

    #[instrument(skip_all, fields(operation = "delete", method = %req.method))]
    pub async fn delete(&self, req: &LocationRequest) -> LocationResponse {
        let _gate = self.write_gate.lock().await;
        self.try_delete(req)
            .await
            .unwrap_or_else(|e| LocationResponse::from_error(&e, "delete"))
    }

    #[instrument(skip_all, fields(operation = "get", method = %req.method))]
    pub async fn get(&self, req: &LocationRequest) -> LocationResponse {
        self.try_get(req)
            .await
            .unwrap_or_else(|e| LocationResponse::from_error(&e, "get"))
    }

    #[instrument(skip_all, fields(operation = "edit"))]
    pub async fn edit(&self, req: &LocationRequest) -> LocationResponse {
        let _gate = self.write_gate.lock().await;
        self.try_edit(req)
            .await
            .unwrap_or_else(|e| LocationResponse::from_error(&e, "edit"))
    }

    async fn try_create(&self, req: &LocationRequest) -> Result<LocationResponse, ServiceError> {
        let body = req.body.object()?;

        let missing = missing_fields(body, &REQUIRED_LOCATION_FIELDS);
        if !missing.is_empty() {
            return Err(ServiceError::input(format!("Missing mandatory field(s): {missing:?}")));
        }
        let rooms = body
            .get("rooms")
            .and_then(Value::as_array)
            .ok_or_else(|| ServiceError::input("'rooms' must be an array of room objects."))?;
        for (i, room) in rooms.iter().enumerate() {
            let room = room
                .as_object()
                .ok_or_else(|| ServiceError::input(format!("rooms[{i}] must be an object.")))?;
            let missing = missing_fields(room, &REQUIRED_ROOM_FIELDS);
            if !missing.is_empty() {
                return Err(ServiceError::input(format!(
                    "Missing mandatory field(s) in rooms[{i}]: {missing:?}"
                )));
            }
        }

        let name = body.get("location_name").cloned().unwrap_or(Value::Null);
        if self.name_taken(&name, None).await? {
            return Err(name_exists(&name));
        }

        self.schema.validate_document(body)?;

        let location_id = new_id();
        let doc = new_location_document(body, &location_id, |k| self.schema.declares(k));
        self.schema.validate_document(&doc)?;
        let rooms = room_count(&doc);
        self.store.create_item(doc).await?;

        info!(%location_id, rooms, "location created");
        Ok(LocationResponse::accepted(json!({
            "message": "Location created successfully.",
            "location_id": location_id,
        })))
    }

    async fn try_delete(&self, req: &LocationRequest) -> Result<LocationResponse, ServiceError> {
        let source = if req.method == Method::POST { IdSource::Body } else { IdSource::Query };
        let location_id = req
            .location_id(source)?
            .ok_or_else(|| ServiceError::input("Missing 'location_id' parameter"))?;

        let doc = self
            .find(&location_id)
            .await?
            .ok_or_else(|| ServiceError::location_not_found(&location_id, ""))?;
        let id = document_id(&doc)?;
        self.store.delete_item(&id, &location_id).await?;

        info!(%location_id, "location deleted");
        Ok(LocationResponse::ok(json!({
            "message": format!("Location '{location_id}' deleted successfully."),
        })))
    }

    async fn try_get(&self, req: &LocationRequest) -> Result<LocationResponse, ServiceError> {
        let source = if req.method == Method::GET { IdSource::Query } else { IdSource::Body };
        match req.location_id(source)? {
            Some(location_id) => {
                let doc = self
                    .find(&location_id)
                    .await?
                    .ok_or_else(|| ServiceError::location_not_found(&location_id, "."))?;
                Ok(LocationResponse::ok(json!({ "location": doc })))
            }
            None => {
                let docs = self.store.query_items(&DocumentQuery::all(), true).await?;
                debug!(count = docs.len(), "listed locations");
                Ok(LocationResponse::ok(json!({ "locations": docs })))
            }
        }
    }

    async fn try_edit(&self, req: &LocationRequest) -> Result<LocationResponse, ServiceError> {
        let body = req.body.object()?;
        let location_id = location_id_field(body)?.ok_or_else(|| {
            ServiceError::input("Missing 'location_id' field to identify the document to edit.")
        })?;

        let mut doc = self
            .find(&location_id)
            .await?
            .ok_or_else(|| ServiceError::location_not_found(&location_id, ", cannot edit."))?;
        let previous_name = doc.get("location_name").cloned();

        let mut updated_any = false;
        for key in UPDATABLE_FIELDS {
            if let Some(value) = body.get(key) {
                doc.insert(key.to_string(), value.clone());
                updated_any = true;
            }
        }
        if !updated_any {
            return Err(ServiceError::input("No updatable fields specified in request body."));
        }

        let generated = assign_missing_room_ids(&mut doc);
        self.schema.validate_document(&doc)?;

        if let Some(dup) = duplicate_room_id(&doc) {
            return Err(ServiceError::input(format!("Duplicate room_id '{dup}' in rooms.")));
        }

        let name = doc.get("location_name").cloned().unwrap_or(Value::Null);
        if previous_name.as_ref() != Some(&name) && self.name_taken(&name, Some(&location_id)).await? {
            return Err(name_exists(&name));
        }

        let id = document_id(&doc)?;
        let stored = self.store.replace_item(&id, doc).await?;
        info!(%location_id, generated_room_ids = generated, "location updated");
        Ok(LocationResponse::ok(json!({
            "message": format!("Location '{location_id}' updated successfully."),
            "location": stored,
        })))
    }

    async fn find(&self, location_id: &str) -> Result<Option<Document>, ServiceError> {
        let query = DocumentQuery::field_equals(PARTITION_KEY, location_id);
        let docs = self.store.query_items(&query, true).await?;
        Ok(docs.into_iter().next())
    }

    /// Whether a location other than `except` already uses `name`.
    async fn name_taken(&self, name: &Value, except: Option<&str>) -> Result<bool, ServiceError> {
        let query = DocumentQuery::field_equals("location_name", name.clone());
        let docs = self.store.query_items(&query, true).await?;
        Ok(docs
            .iter()
            .any(|d| except.is_none() || d.get(PARTITION_KEY).and_then(Value::as_str) != except))
    }
}

fn name_exists(name: &Value) -> ServiceError {
    let shown = name.as_str().map(str::to_owned).unwrap_or_else(|| name.to_string());
    ServiceError::input(format!("Location with name '{shown}' already exists."))
}
