//! Application layer: Use cases and services.
//!
//! This module orchestrates the pipeline with ports to implement the two
//! use cases of the crate: training the model and predicting with it.

pub mod artifacts;
mod inference;
mod training;

pub use artifacts::{ArtifactManifest, ModelBundle};
pub use inference::InferenceContext;
pub use training::{TrainingOptions, TrainingReport, TrainingService};
