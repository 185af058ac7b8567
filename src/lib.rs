//! # Thyrocast
//!
//! Thyroid cancer recurrence prediction from tabular clinical records.
//!
//! This crate provides:
//! - A training pipeline: one-hot encoding, robust scaling and a Gaussian
//!   Naive Bayes classifier fitted on a seeded 70/30 split
//! - An inference context that replays the fitted transforms in fit-time order
//! - A terminal form UI for single-patient predictions
//!
//! ## Architecture
//!
//! The crate follows Hexagonal Architecture:
//! - `domain`: Core types (Feature rows, column schema, predictions)
//! - `pipeline`: Fitted transforms (encoder, scaler, classifier, split)
//! - `ports`: Trait definitions for artifact storage and dataset sources
//! - `adapters`: Concrete implementations (filesystem, in-memory, CSV)
//! - `application`: Training and inference use cases
//! - `tui`: Terminal user interface

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod pipeline;
pub mod ports;
pub mod tui;

#[cfg(test)]
pub(crate) mod testing;

pub use application::{InferenceContext, TrainingReport, TrainingService};
pub use domain::{FeatureRow, FeatureSchema, FeatureValue, PatientFeatures, Prediction};

/// Result type for Thyrocast operations
pub type Result<T> = std::result::Result<T, ThyrocastError>;

/// Main error type for Thyrocast
#[derive(Debug, thiserror::Error)]
pub enum ThyrocastError {
    #[error("Pipeline error: {0}")]
    Pipeline(#[from] domain::PipelineError),

    #[error("Storage operation failed: {0}")]
    Storage(#[from] adapters::StoreError),

    #[error("Dataset error: {0}")]
    Dataset(#[from] ports::DatasetError),

    #[error("Artifact '{0}' not found")]
    ArtifactMissing(String),

    #[error("Artifact integrity check failed for '{name}': {reason}")]
    ArtifactIntegrity { name: String, reason: String },

    #[error("Held-out accuracy {actual:.3} is below the required {required:.3}")]
    AccuracyBelowThreshold { actual: f64, required: f64 },

    #[error("Invalid patient data: {0}")]
    Validation(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
