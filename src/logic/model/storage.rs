//! Model Storage
//!
//! Where artifacts live. Writes are atomic (temp file + rename) so a crash
//! mid-save never leaves a half-written model behind.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use super::error::ModelError;

pub trait ModelStore: Send + Sync {
    /// `Ok(None)` when no artifact has been saved yet
    fn read(&self) -> Result<Option<Vec<u8>>, ModelError>;
    fn write(&self, bytes: &[u8]) -> Result<(), ModelError>;
    /// Human-readable location for status reports
    fn location(&self) -> String;
}

pub struct FileModelStore {
    path: PathBuf,
}

impl FileModelStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl ModelStore for FileModelStore {
    fn read(&self) -> Result<Option<Vec<u8>>, ModelError> {
        match fs::read(&self.path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write(&self, bytes: &[u8]) -> Result<(), ModelError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let tmp = self.temp_path();
        {
            let mut file = fs::File::create(&tmp)?;
            file.write_all(bytes)?;
            file.sync_all()?;
        }
        fs::rename(&tmp, &self.path)?;

        log::debug!("Model artifact written: {} ({} bytes)", self.path.display(), bytes.len());
        Ok(())
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}

/// In-memory store, for tests and embedding
#[derive(Default)]
pub struct MemoryModelStore {
    bytes: parking_lot::RwLock<Option<Vec<u8>>>,
}

impl MemoryModelStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ModelStore for MemoryModelStore {
    fn read(&self) -> Result<Option<Vec<u8>>, ModelError> {
        Ok(self.bytes.read().clone())
    }

    fn write(&self, bytes: &[u8]) -> Result<(), ModelError> {
        *self.bytes.write() = Some(bytes.to_vec());
        Ok(())
    }

    fn location(&self) -> String {
        "memory".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_missing_file_reads_none() {
        let dir = tempdir().unwrap();
        let store = FileModelStore::new(dir.path().join("model.json"));
        assert!(store.read().unwrap().is_none());
    }

    #[test]
    fn test_write_creates_parent_and_leaves_no_temp() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("model.json");
        let store = FileModelStore::new(&path);

        store.write(b"{}").unwrap();
        assert_eq!(store.read().unwrap().unwrap(), b"{}");
        assert!(!dir.path().join("nested").join("model.json.tmp").exists());
    }
}
