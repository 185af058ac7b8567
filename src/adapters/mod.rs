//! Adapters layer: Concrete implementations of ports.
//!
//! - `fs_store`: artifact files in a local directory
//! - `memory_store`: in-process artifact map, used by tests and dry runs
//! - `csv_dataset`: the thyroid CSV dataset

mod csv_dataset;
mod fs_store;
mod memory_store;

pub use csv_dataset::CsvDataset;
pub use fs_store::FsArtifactStore;
pub use memory_store::MemoryArtifactStore;

/// Errors raised by artifact store adapters.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("IO error on '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid artifact name '{0}'")]
    InvalidName(String),

    #[error("Artifact store lock poisoned")]
    Poisoned,
}

/// Reject names that would escape the store or address nested paths.
pub(crate) fn validate_artifact_name(name: &str) -> Result<(), StoreError> {
    let valid = !name.is_empty()
        && name != "."
        && name != ".."
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'));
    if valid {
        Ok(())
    } else {
        Err(StoreError::InvalidName(name.to_string()))
    }
}
