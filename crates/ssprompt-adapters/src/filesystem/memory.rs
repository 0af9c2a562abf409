//! In-memory filesystem adapter for testing.

use std::{
    collections::{HashMap, HashSet},
    path::{Path, PathBuf},
    sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard},
};

use ssprompt_core::{
    application::{ApplicationError, ports::Filesystem},
    error::SspromptResult,
};

/// In-memory filesystem for testing.
///
/// Clones share state, so a test can hand one clone to a service and
/// inspect another.
#[derive(Debug, Clone, Default)]
pub struct MemoryFilesystem {
    inner: Arc<RwLock<MemoryFilesystemInner>>,
}

#[derive(Debug, Default)]
struct MemoryFilesystemInner {
    files: HashMap<PathBuf, Vec<u8>>,
    directories: HashSet<PathBuf>,
    writes: usize,
}

impl MemoryFilesystem {
    /// Create a new empty memory filesystem.
    pub fn new() -> Self {
        Self::default()
    }

    /// List all files.
    pub fn list_files(&self) -> Vec<PathBuf> {
        self.read()
            .map(|inner| inner.files.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// Number of `write_file` calls so far.
    pub fn write_count(&self) -> usize {
        self.read().map(|inner| inner.writes).unwrap_or_default()
    }

    /// Overwrite a file without counting it as a write (testing helper).
    pub fn tamper(&self, path: &Path, content: &[u8]) {
        if let Ok(mut inner) = self.inner.write() {
            inner.files.insert(path.to_path_buf(), content.to_vec());
        }
    }

    /// Clear all contents.
    pub fn clear(&self) {
        if let Ok(mut inner) = self.inner.write() {
            inner.files.clear();
            inner.directories.clear();
            inner.writes = 0;
        }
    }

    fn read(&self) -> SspromptResult<RwLockReadGuard<'_, MemoryFilesystemInner>> {
        self.inner
            .read()
            .map_err(|_| ApplicationError::StoreLockError.into())
    }

    fn write(&self) -> SspromptResult<RwLockWriteGuard<'_, MemoryFilesystemInner>> {
        self.inner
            .write()
            .map_err(|_| ApplicationError::StoreLockError.into())
    }
}

fn check_parent(inner: &MemoryFilesystemInner, path: &Path) -> SspromptResult<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !inner.directories.contains(parent) {
            return Err(ApplicationError::FilesystemError {
                path: path.to_path_buf(),
                reason: "Parent directory does not exist".into(),
            }
            .into());
        }
    }
    Ok(())
}

impl Filesystem for MemoryFilesystem {
    fn create_dir_all(&self, path: &Path) -> SspromptResult<()> {
        let mut inner = self.write()?;

        let mut current = PathBuf::new();
        for component in path.components() {
            current.push(component);
            inner.directories.insert(current.clone());
        }

        Ok(())
    }

    fn read_file(&self, path: &Path) -> SspromptResult<Vec<u8>> {
        let inner = self.read()?;
        inner.files.get(path).cloned().ok_or_else(|| {
            ApplicationError::FilesystemError {
                path: path.to_path_buf(),
                reason: "No such file".into(),
            }
            .into()
        })
    }

    fn write_file(&self, path: &Path, content: &[u8]) -> SspromptResult<()> {
        let mut inner = self.write()?;
        check_parent(&inner, path)?;
        inner.files.insert(path.to_path_buf(), content.to_vec());
        inner.writes += 1;
        Ok(())
    }

    fn remove_file(&self, path: &Path) -> SspromptResult<()> {
        let mut inner = self.write()?;
        match inner.files.remove(path) {
            Some(_) => Ok(()),
            None => Err(ApplicationError::FilesystemError {
                path: path.to_path_buf(),
                reason: "No such file".into(),
            }
            .into()),
        }
    }

    fn create_new(&self, path: &Path, content: &[u8]) -> SspromptResult<bool> {
        let mut inner = self.write()?;
        if inner.files.contains_key(path) || inner.directories.contains(path) {
            return Ok(false);
        }
        check_parent(&inner, path)?;
        inner.files.insert(path.to_path_buf(), content.to_vec());
        Ok(true)
    }

    fn exists(&self, path: &Path) -> bool {
        self.read()
            .map(|inner| inner.files.contains_key(path) || inner.directories.contains(path))
            .unwrap_or(false)
    }

    fn is_file(&self, path: &Path) -> bool {
        self.read()
            .map(|inner| inner.files.contains_key(path))
            .unwrap_or(false)
    }
}
