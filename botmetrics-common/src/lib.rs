// File: botmetrics-common/src/lib.rs
//
// Shared types for the metrics engine: the stored entities, the
// repository/collaborator traits, the error type and validation tables.

pub mod error;
pub mod models;
pub mod traits;
pub mod validation;

pub use error::{Error, ErrorKind};
