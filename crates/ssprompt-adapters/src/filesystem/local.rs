//! Local filesystem adapter using std::fs.

use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::Path;

use tracing::warn;

use ssprompt_core::{
    application::{ApplicationError, ports::Filesystem},
    error::{SspromptError, SspromptResult},
};

/// Production filesystem implementation using `std::fs`.
#[derive(Debug, Clone, Copy)]
pub struct LocalFilesystem;

impl LocalFilesystem {
    /// Create a new local filesystem adapter.
    pub fn new() -> Self {
        Self
    }
}

impl Default for LocalFilesystem {
    fn default() -> Self {
        Self::new()
    }
}

impl Filesystem for LocalFilesystem {
    fn create_dir_all(&self, path: &Path) -> SspromptResult<()> {
        std::fs::create_dir_all(path).map_err(|e| map_io_error(path, e, "create directory"))
    }

    fn read_file(&self, path: &Path) -> SspromptResult<Vec<u8>> {
        std::fs::read(path).map_err(|e| map_io_error(path, e, "read file"))
    }

    fn write_file(&self, path: &Path, content: &[u8]) -> SspromptResult<()> {
        std::fs::write(path, content).map_err(|e| map_io_error(path, e, "write file"))
    }

    fn remove_file(&self, path: &Path) -> SspromptResult<()> {
        std::fs::remove_file(path).map_err(|e| map_io_error(path, e, "remove file"))
    }

    fn create_new(&self, path: &Path, content: &[u8]) -> SspromptResult<bool> {
        match OpenOptions::new().write(true).create_new(true).open(path) {
            Ok(file) => {
                write_or_discard(path, file, content)?;
                Ok(true)
            }
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => Ok(false),
            Err(e) => Err(map_io_error(path, e, "create file")),
        }
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn is_file(&self, path: &Path) -> bool {
        path.is_file()
    }
}

/// A half-written marker would block every later `create_new`, so a failed
/// write removes the file it was writing.
fn write_or_discard(path: &Path, mut file: impl Write, content: &[u8]) -> SspromptResult<()> {
    if let Err(e) = file.write_all(content) {
        drop(file);
        if let Err(cleanup) = std::fs::remove_file(path) {
            warn!(path = %path.display(), error = %cleanup, "could not remove partial file");
        }
        return Err(map_io_error(path, e, "write file"));
    }
    Ok(())
}

fn map_io_error(path: &Path, e: io::Error, operation: &str) -> SspromptError {
    ApplicationError::FilesystemError {
        path: path.to_path_buf(),
        reason: format!("Failed to {}: {}", operation, e),
    }
    .into()
}
