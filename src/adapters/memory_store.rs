//! In-memory artifact store.

use std::collections::HashMap;
use std::sync::Mutex;

use super::{validate_artifact_name, StoreError};
use crate::ports::ArtifactStore;

/// Artifact store that keeps everything in a map; nothing touches disk.
#[derive(Debug, Default)]
pub struct MemoryArtifactStore {
    entries: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryArtifactStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Names of stored artifacts, sorted.
    ///
    /// # Errors
    /// Returns error if the lock is poisoned.
    pub fn names(&self) -> Result<Vec<String>, StoreError> {
        let entries = self.entries.lock().map_err(|_| StoreError::Poisoned)?;
        let mut names: Vec<String> = entries.keys().cloned().collect();
        names.sort();
        Ok(names)
    }
}

impl ArtifactStore for MemoryArtifactStore {
    type Error = StoreError;

    fn put(&self, name: &str, bytes: &[u8]) -> Result<(), Self::Error> {
        validate_artifact_name(name)?;
        self.entries
            .lock()
            .map_err(|_| StoreError::Poisoned)?
            .insert(name.to_string(), bytes.to_vec());
        Ok(())
    }

    fn get(&self, name: &str) -> Result<Option<Vec<u8>>, Self::Error> {
        validate_artifact_name(name)?;
        Ok(self
            .entries
            .lock()
            .map_err(|_| StoreError::Poisoned)?
            .get(name)
            .cloned())
    }

    fn location(&self) -> String {
        "memory".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_put_get() {
        let store = MemoryArtifactStore::new();
        assert!(!store.contains("a.json").expect("check"));
        store.put("b.json", b"2").expect("put");
        store.put("a.json", b"1").expect("put");
        assert_eq!(store.get("a.json").expect("get"), Some(b"1".to_vec()));
        assert_eq!(store.names().expect("names"), vec!["a.json", "b.json"]);
        assert!(store.put("../x", b"").is_err());
    }
}
