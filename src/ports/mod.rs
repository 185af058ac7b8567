//! Ports layer: Trait definitions for external operations.
//!
//! Following Hexagonal Architecture, these traits define the boundaries
//! between the application and external systems (artifact storage, datasets).

mod artifact_store;
mod dataset;

pub use artifact_store::ArtifactStore;
pub use dataset::{DatasetError, DatasetSource, LabeledDataset};
