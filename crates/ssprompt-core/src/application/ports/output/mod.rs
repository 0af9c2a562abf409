//! Driven (output) ports - implemented by infrastructure.
//!
//! These traits define what the application needs from external systems.
//! The `ssprompt-adapters` crate provides implementations.

use std::path::Path;

use crate::domain::{HubProject, Platform, ProjectDescriptor, RemoteTreeEntry};
use crate::error::SspromptResult;

/// Port for filesystem operations.
///
/// Implemented by:
/// - `ssprompt_adapters::filesystem::LocalFilesystem` (production)
/// - `ssprompt_adapters::filesystem::MemoryFilesystem` (testing)
///
/// Contents are raw bytes: prompt files are digested exactly as stored.
#[cfg_attr(test, mockall::automock)]
pub trait Filesystem: Send + Sync {
    /// Create a directory and all parent directories.
    fn create_dir_all(&self, path: &Path) -> SspromptResult<()>;

    /// Read a whole file.
    fn read_file(&self, path: &Path) -> SspromptResult<Vec<u8>>;

    /// Write content to a file, replacing it if present.
    fn write_file(&self, path: &Path, content: &[u8]) -> SspromptResult<()>;

    /// Remove a file.
    fn remove_file(&self, path: &Path) -> SspromptResult<()>;

    /// Create a file only if nothing exists at `path`.
    ///
    /// Returns `false` when the path is already taken.
    fn create_new(&self, path: &Path, content: &[u8]) -> SspromptResult<bool>;

    /// Check if path exists.
    fn exists(&self, path: &Path) -> bool;

    /// Check if path is a regular file.
    fn is_file(&self, path: &Path) -> bool;
}

/// Port for a prompt hub hosted on a git platform.
///
/// Every non-success response is reported as
/// `ApplicationError::Transport`, which the services retry.
#[cfg_attr(test, mockall::automock)]
pub trait HubBackend: Send + Sync {
    /// Platform this backend talks to.
    fn platform(&self) -> Platform;

    /// Whether the repository exists. `Ok(false)` means the platform
    /// answered "not found".
    fn check_project_exists(&self, project: &HubProject) -> SspromptResult<bool>;

    /// List the entries at `path` inside the project's repository.
    ///
    /// A path naming a single file yields a one-element listing.
    fn list_directory(&self, project: &HubProject, path: &str)
    -> SspromptResult<Vec<RemoteTreeEntry>>;

    /// Download the raw bytes behind an entry's download reference.
    fn fetch_blob(&self, download_ref: &str) -> SspromptResult<Vec<u8>>;
}

/// Port for the descriptor text format.
#[cfg_attr(test, mockall::automock)]
pub trait DescriptorCodec: Send + Sync {
    /// Parse descriptor text. Does not run domain validation.
    fn parse(&self, text: &str) -> SspromptResult<ProjectDescriptor>;

    /// Render a descriptor to text.
    fn render(&self, descriptor: &ProjectDescriptor) -> SspromptResult<String>;
}

/// Versions published for a package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageVersions {
    pub latest: String,
    /// Ascending.
    pub all: Vec<String>,
}

/// Port for a package index.
#[cfg_attr(test, mockall::automock)]
pub trait PackageIndex: Send + Sync {
    /// `Ok(false)` only when the index definitively reports "not found".
    fn package_exists<'a>(&self, name: &str, version: Option<&'a str>) -> SspromptResult<bool>;

    /// Latest version plus every published version.
    fn available_versions(&self, name: &str) -> SspromptResult<PackageVersions>;
}

/// Port for the local package installer.
#[cfg_attr(test, mockall::automock)]
pub trait PackageInstaller: Send + Sync {
    /// Installed version, or `None` if the package is not installed.
    fn installed_version(&self, name: &str) -> SspromptResult<Option<String>>;

    /// Install `name`, pinned to `version` when given.
    fn install<'a>(&self, name: &str, version: Option<&'a str>) -> SspromptResult<()>;
}
