//! Location CRUD: request/response values and the operations themselves.

pub mod request;
pub mod response;
pub mod service;

pub use request::{IdSource, LocationRequest, RequestBody};
pub use response::LocationResponse;
pub use service::LocationService;
