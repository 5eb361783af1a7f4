use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use super::core::{KeyValueStore, PersistenceError, PersistenceResult};

/// One file per key under a root directory.
///
/// Keys become file names, so they are limited to ASCII letters, digits,
/// `_`, `-` and `.`, and may not start with a dot.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    /// Use `root` as the store directory, creating it if needed.
    pub fn open(root: impl AsRef<Path>) -> PersistenceResult<Self> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path_for(&self, key: &str) -> PersistenceResult<PathBuf> {
        validate_key(key)?;
        Ok(self.root.join(key))
    }
}

impl KeyValueStore for FileStore {
    async fn put(&self, key: &str, bytes: &[u8]) -> PersistenceResult<()> {
        let path = self.path_for(key)?;
        let staging = self.root.join(format!(".{key}.tmp"));
        let written = write_staged(&staging, bytes).and_then(|()| fs::rename(&staging, &path));
        if let Err(err) = written {
            let _ = fs::remove_file(&staging);
            return Err(err.into());
        }
        Ok(())
    }

    async fn get(&self, key: &str) -> PersistenceResult<Vec<u8>> {
        let path = self.path_for(key)?;
        fs::read(&path).map_err(|err| match err.kind() {
            ErrorKind::NotFound => PersistenceError::NotFound(key.to_string()),
            _ => PersistenceError::Io(err),
        })
    }
}

fn write_staged(staging: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut file = fs::File::create(staging)?;
    file.write_all(bytes)?;
    file.sync_all()
}

fn validate_key(key: &str) -> PersistenceResult<()> {
    let allowed = |c: char| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.');
    if key.is_empty() || key.starts_with('.') || !key.chars().all(allowed) {
        return Err(PersistenceError::InvalidKey(key.to_string()));
    }
    Ok(())
}
