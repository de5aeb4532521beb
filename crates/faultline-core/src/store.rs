//! Artifact persistence behind the blob-storage collaborator boundary.
//!
//! The core only ever sees [`ArtifactStore`]; [`FsStore`] is the filesystem
//! implementation rooted at `<root>/.faultline/`. Keys are forward-slash
//! paths (`scenarios/<slug>.json`, `generated/cdk/<slug>.ts`, ...), so a
//! bucket-backed implementation can reuse them unchanged.

use crate::error::{FaultlineError, Result};
use crate::io;
use crate::paths;
use std::path::{Path, PathBuf};

pub trait ArtifactStore {
    fn put(&self, key: &str, data: &[u8]) -> Result<()>;
    fn get(&self, key: &str) -> Result<Vec<u8>>;
    fn exists(&self, key: &str) -> bool;
    /// List keys under a prefix, sorted ascending.
    fn list(&self, prefix: &str) -> Result<Vec<String>>;
}

// ---------------------------------------------------------------------------
// FsStore
// ---------------------------------------------------------------------------

pub struct FsStore {
    dir: PathBuf,
}

impl FsStore {
    /// Open the store under an existing project root.
    pub fn open(root: &Path) -> Result<Self> {
        let dir = paths::store_dir(root);
        if !dir.is_dir() {
            return Err(FaultlineError::NotInitialized);
        }
        Ok(Self { dir })
    }

    /// Create the store skeleton, idempotent.
    pub fn init(root: &Path) -> Result<Self> {
        let dir = paths::store_dir(root);
        io::ensure_dir(&dir)?;
        io::ensure_dir(&dir.join("scenarios"))?;
        io::ensure_dir(&dir.join("generated/cdk"))?;
        io::ensure_dir(&dir.join("generated/fis"))?;
        io::ensure_dir(&dir.join("executions"))?;
        io::ensure_dir(&dir.join("templates"))?;
        Ok(Self { dir })
    }

    fn resolve(&self, key: &str) -> Result<PathBuf> {
        if key.is_empty() || key.starts_with('/') || key.split('/').any(|seg| seg == "..") {
            return Err(FaultlineError::InvalidKey(key.to_string()));
        }
        Ok(self.dir.join(key))
    }
}

impl ArtifactStore for FsStore {
    fn put(&self, key: &str, data: &[u8]) -> Result<()> {
        io::atomic_write(&self.resolve(key)?, data)
    }

    fn get(&self, key: &str) -> Result<Vec<u8>> {
        let path = self.resolve(key)?;
        match std::fs::read(&path) {
            Ok(data) => Ok(data),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(FaultlineError::ArtifactNotFound(key.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    fn exists(&self, key: &str) -> bool {
        self.resolve(key).map(|p| p.is_file()).unwrap_or(false)
    }

    fn list(&self, prefix: &str) -> Result<Vec<String>> {
        let dir = self.resolve(prefix.trim_end_matches('/'))?;
        if !dir.is_dir() {
            return Ok(Vec::new());
        }
        let mut keys = Vec::new();
        for entry in std::fs::read_dir(&dir)? {
            let entry = entry?;
            if entry.file_type()?.is_file() {
                let name = entry.file_name().to_string_lossy().into_owned();
                keys.push(format!("{}/{}", prefix.trim_end_matches('/'), name));
            }
        }
        keys.sort();
        Ok(keys)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn open_requires_init() {
        let dir = TempDir::new().unwrap();
        assert!(matches!(
            FsStore::open(dir.path()),
            Err(FaultlineError::NotInitialized)
        ));
        FsStore::init(dir.path()).unwrap();
        assert!(FsStore::open(dir.path()).is_ok());
    }

    #[test]
    fn put_get_roundtrip() {
        let dir = TempDir::new().unwrap();
        let store = FsStore::init(dir.path()).unwrap();
        store.put("scenarios/test.json", b"{\"a\":1}").unwrap();
        assert_eq!(store.get("scenarios/test.json").unwrap(), b"{\"a\":1}");
        assert!(store.exists("scenarios/test.json"));
    }

    #[test]
    fn get_missing_is_not_found() {
        let dir = TempDir::new().unwrap();
        let store = FsStore::init(dir.path()).unwrap();
        let err = store.get("scenarios/nope.json").unwrap_err();
        assert!(matches!(err, FaultlineError::ArtifactNotFound(_)));
    }

    #[test]
    fn list_is_sorted_and_prefixed() {
        let dir = TempDir::new().unwrap();
        let store = FsStore::init(dir.path()).unwrap();
        store.put("scenarios/b.json", b"{}").unwrap();
        store.put("scenarios/a.json", b"{}").unwrap();
        let keys = store.list("scenarios/").unwrap();
        assert_eq!(keys, vec!["scenarios/a.json", "scenarios/b.json"]);
    }

    #[test]
    fn list_empty_prefix_dir_is_empty() {
        let dir = TempDir::new().unwrap();
        let store = FsStore::init(dir.path()).unwrap();
        assert!(store.list("generated/cdk/").unwrap().is_empty());
    }

    #[test]
    fn rejects_traversal_keys() {
        let dir = TempDir::new().unwrap();
        let store = FsStore::init(dir.path()).unwrap();
        assert!(store.put("../escape.json", b"{}").is_err());
        assert!(store.get("/absolute").is_err());
    }
}
