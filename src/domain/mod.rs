//! Domain layer: Core clinical types and the column schema.
//!
//! This module contains plain Rust types with no I/O.
//! All types are serializable and implement strict validation.

mod error;
mod patient;
mod prediction;
pub mod schema;

pub use error::PipelineError;
pub use patient::{FeatureRow, FeatureValue, PatientFeatures};
pub use prediction::Prediction;
pub use schema::FeatureSchema;
