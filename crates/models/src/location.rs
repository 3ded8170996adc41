use serde_json::{Map, Value};
use uuid::Uuid;

/// A raw store document. Locations keep schema-permitted extra fields and
/// leave every value check to the schema, so they are handled untyped.
pub type Document = Map<String, Value>;

/// Top-level fields a create request must carry.
pub const REQUIRED_LOCATION_FIELDS: [&str; 2] = ["location_name", "rooms"];
/// Fields every room in a create request must carry.
pub const REQUIRED_ROOM_FIELDS: [&str; 2] = ["room_name", "capacity"];
/// The only fields an edit copies onto the stored document.
pub const UPDATABLE_FIELDS: [&str; 4] = ["location_id", "location_name", "events_ids", "rooms"];
/// Field the store partitions location documents by.
pub const PARTITION_KEY: &str = "location_id";
/// Generated by the server, never taken from a request body.
pub const RESERVED_FIELDS: [&str; 2] = ["id", "location_id"];
/// Always copied from a create request, declared in the schema or not.
const CORE_FIELDS: [&str; 3] = ["location_name", "events_ids", "rooms"];

pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// Names from `required` that `doc` lacks, in order.
pub fn missing_fields<'a>(doc: &Document, required: &[&'a str]) -> Vec<&'a str> {
    required.iter().copied().filter(|f| !doc.contains_key(*f)).collect()
}

/// Stored form of a create request.
///
/// `id`, `location_id` and every `room_id` are generated; `events_ids`
/// defaults to `[]`. Other body keys survive only when `declared` accepts
/// them, and reserved keys never do. Values are copied as sent.
pub fn new_location_document(body: &Document, location_id: &str, declared: impl Fn(&str) -> bool) -> Document {
    let mut doc: Document = body
        .iter()
        .filter(|(k, _)| {
            let k = k.as_str();
            !RESERVED_FIELDS.contains(&k) && (CORE_FIELDS.contains(&k) || declared(k))
        })
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();
    doc.entry("events_ids").or_insert_with(|| Value::Array(Vec::new()));
    if let Some(Value::Array(rooms)) = doc.get_mut("rooms") {
        for room in rooms.iter_mut().filter_map(Value::as_object_mut) {
            room.insert("room_id".into(), Value::String(new_id()));
        }
    }
    doc.insert("id".into(), Value::String(new_id()));
    doc.insert(PARTITION_KEY.into(), Value::String(location_id.to_string()));
    doc
}

/// Give every room object without a `room_id` key a fresh one. Values that
/// are present stay untouched, whatever their type. Returns how many ids
/// were generated.
pub fn assign_missing_room_ids(doc: &mut Document) -> usize {
    let Some(Value::Array(rooms)) = doc.get_mut("rooms") else {
        return 0;
    };
    let mut assigned = 0;
    for room in rooms.iter_mut().filter_map(Value::as_object_mut) {
        if !room.contains_key("room_id") {
            room.insert("room_id".into(), Value::String(new_id()));
            assigned += 1;
        }
    }
    assigned
}

/// First `room_id` that appears more than once in `doc`'s rooms, if any.
pub fn duplicate_room_id(doc: &Document) -> Option<String> {
    let rooms = doc.get("rooms").and_then(Value::as_array)?;
    let mut seen: Vec<&Value> = Vec::with_capacity(rooms.len());
    for id in rooms.iter().filter_map(|r| r.get("room_id")) {
        if seen.contains(&id) {
            return Some(id.as_str().map(str::to_owned).unwrap_or_else(|| id.to_string()));
        }
        seen.push(id);
    }
    None
}

/// Number of entries in `doc`'s `rooms` array.
pub fn room_count(doc: &Document) -> usize {
    doc.get("rooms").and_then(Value::as_array).map_or(0, Vec::len)
}
