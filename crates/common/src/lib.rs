//! Shared building blocks for the locations workspace: logging setup,
//! runtime directory checks and small wire types used by more than one crate.

pub mod types;
pub mod utils;
pub mod env;
