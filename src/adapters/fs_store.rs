//! Filesystem artifact store.
//!
//! Each artifact is one file in the store directory. Writes go to a
//! temporary sibling file first and are renamed into place, so a crash
//! mid-write never leaves a truncated artifact behind.

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use super::{validate_artifact_name, StoreError};
use crate::ports::ArtifactStore;

/// Artifact store backed by a local directory.
#[derive(Debug, Clone)]
pub struct FsArtifactStore {
    root: PathBuf,
}

impl FsArtifactStore {
    /// Open a store rooted at `root`, creating the directory if needed.
    ///
    /// # Errors
    /// Returns error if the directory cannot be created.
    pub fn new<P: AsRef<Path>>(root: P) -> Result<Self, StoreError> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root).map_err(|e| io_error(&root, e))?;
        tracing::debug!("Artifact store opened at {}", root.display());
        Ok(Self { root })
    }

    /// Open an existing store without creating anything.
    #[must_use]
    pub fn open<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, name: &str) -> Result<PathBuf, StoreError> {
        validate_artifact_name(name)?;
        Ok(self.root.join(name))
    }
}

impl ArtifactStore for FsArtifactStore {
    type Error = StoreError;

    fn put(&self, name: &str, bytes: &[u8]) -> Result<(), Self::Error> {
        let path = self.path_for(name)?;
        let tmp = self.root.join(format!(".{name}.tmp"));

        let mut file = fs::File::create(&tmp).map_err(|e| io_error(&tmp, e))?;
        file.write_all(bytes).map_err(|e| io_error(&tmp, e))?;
        file.sync_all().map_err(|e| io_error(&tmp, e))?;
        drop(file);

        fs::rename(&tmp, &path).map_err(|e| io_error(&path, e))?;
        tracing::debug!("Wrote artifact {} ({} bytes)", path.display(), bytes.len());
        Ok(())
    }

    fn get(&self, name: &str) -> Result<Option<Vec<u8>>, Self::Error> {
        let path = self.path_for(name)?;
        match fs::read(&path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(io_error(&path, e)),
        }
    }

    fn contains(&self, name: &str) -> Result<bool, Self::Error> {
        Ok(self.path_for(name)?.is_file())
    }

    fn location(&self) -> String {
        self.root.display().to_string()
    }
}

fn io_error(path: &Path, source: std::io::Error) -> StoreError {
    StoreError::Io {
        path: path.display().to_string(),
        source,
    }
}
