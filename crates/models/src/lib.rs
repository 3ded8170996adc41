//! Location document models and the schema they are validated against.

pub mod errors;
pub mod location;
pub mod schema;

pub use location::Document;
pub use schema::LocationSchema;
