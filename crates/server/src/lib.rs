pub mod routes;
pub mod startup;
pub mod errors;
pub mod observability;

pub use startup::{build_app, build_state, run, run_with_config, AppState};
