//! Service layer for location records.
//! - `storage`: the document store seam and its backends.
//! - `location`: request/response values and the four CRUD operations.
//! - `errors`: the error kinds operations map onto status codes.

pub mod errors;
pub mod storage;
pub mod location;
