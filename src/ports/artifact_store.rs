//! Artifact store port: named byte blobs for fitted pipeline stages.
//!
//! The application serializes each stage itself; a store only has to keep
//! bytes under a name and hand them back unchanged.

/// Trait for persisting pipeline artifacts.
pub trait ArtifactStore: Send + Sync {
    /// Error type for store operations.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Write an artifact, replacing any previous one with the same name.
    ///
    /// # Errors
    /// Returns error if the write fails.
    fn put(&self, name: &str, bytes: &[u8]) -> Result<(), Self::Error>;

    /// Read an artifact.
    ///
    /// # Returns
    /// `None` if no artifact with that name exists.
    ///
    /// # Errors
    /// Returns error if the read fails.
    fn get(&self, name: &str) -> Result<Option<Vec<u8>>, Self::Error>;

    /// Check whether an artifact exists.
    ///
    /// # Errors
    /// Returns error if the check fails.
    fn contains(&self, name: &str) -> Result<bool, Self::Error> {
        Ok(self.get(name)?.is_some())
    }

    /// Human-readable location of the store, for logs.
    fn location(&self) -> String;
}
