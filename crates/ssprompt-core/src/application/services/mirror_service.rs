//! Remote tree mirroring.
//!
//! Walks a hub directory depth-first and reproduces it under a local
//! directory:
//! 1. List the remote directory (retried)
//! 2. Recurse into subdirectories
//! 3. Skip files whose local digest already matches
//! 4. Download the rest (retried) and verify them after writing
//!
//! Failures are recorded per node; siblings keep going.

use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, instrument, warn};

use crate::{
    application::{
        ApplicationError,
        ports::{Filesystem, HubBackend},
        services::{integrity::IntegrityVerifier, retry::with_retries},
    },
    domain::{Digest, EntryKind, HubProject, RemoteTreeEntry, RetryPolicy, join_remote},
    error::{SspromptError, SspromptResult},
};

/// Marker file guarding a destination directory during a pull.
pub const LOCK_FILE_NAME: &str = ".ssprompt.lock";

/// Why a node could not be mirrored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureReason {
    /// Listing or download kept failing until retries ran out.
    Transport(String),
    /// Downloaded bytes did not hash to the advertised digest.
    Integrity { expected: Digest, actual: Digest },
    /// Local write, read, or removal failed.
    Filesystem(String),
    /// The hub returned an entry that cannot be mirrored.
    InvalidEntry(String),
}

impl FailureReason {
    fn from_error(e: &SspromptError) -> Self {
        match e {
            SspromptError::Application(ApplicationError::Transport { .. }) => {
                Self::Transport(e.to_string())
            }
            SspromptError::Application(ApplicationError::FilesystemError { .. }) => {
                Self::Filesystem(e.to_string())
            }
            other => Self::InvalidEntry(other.to_string()),
        }
    }
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transport(reason) | Self::Filesystem(reason) | Self::InvalidEntry(reason) => {
                f.write_str(reason)
            }
            Self::Integrity { expected, actual } => write!(
                f,
                "integrity mismatch: expected {}, got {}",
                expected.short(),
                actual.short()
            ),
        }
    }
}

/// A node that could not be mirrored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeFailure {
    pub remote_path: String,
    pub local_path: PathBuf,
    pub kind: EntryKind,
    pub reason: FailureReason,
}

/// Outcome of one mirror run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct MirrorReport {
    /// Files written during this run.
    pub downloaded: Vec<PathBuf>,
    /// Files whose local copy already matched.
    pub skipped: Vec<PathBuf>,
    /// Directories visited below the root.
    pub directories: usize,
    pub failures: Vec<NodeFailure>,
}

impl MirrorReport {
    /// Files seen in successfully listed directories.
    pub fn files_total(&self) -> usize {
        self.downloaded.len() + self.skipped.len() + self.failed_files()
    }

    pub fn failed_files(&self) -> usize {
        self.failures
            .iter()
            .filter(|f| f.kind == EntryKind::File)
            .count()
    }

    pub fn failed_directories(&self) -> usize {
        self.failures
            .iter()
            .filter(|f| f.kind == EntryKind::Directory)
            .count()
    }

    /// Failures caused by digest mismatches.
    pub fn integrity_failures(&self) -> impl Iterator<Item = &NodeFailure> {
        self.failures
            .iter()
            .filter(|f| matches!(f.reason, FailureReason::Integrity { .. }))
    }

    /// True when every node was mirrored.
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    /// One-line human summary.
    pub fn summary(&self) -> String {
        if self.is_complete() {
            return format!(
                "{} files up to date ({} downloaded, {} unchanged)",
                self.files_total(),
                self.downloaded.len(),
                self.skipped.len()
            );
        }
        let mut out = format!(
            "{} of {} files failed after retries",
            self.failed_files(),
            self.files_total()
        );
        let dirs = self.failed_directories();
        if dirs > 0 {
            out.push_str(&format!(", {} directories could not be listed", dirs));
        }
        out
    }

    fn fail(
        &mut self,
        remote_path: &str,
        local_path: &Path,
        kind: EntryKind,
        reason: FailureReason,
    ) {
        self.failures.push(NodeFailure {
            remote_path: remote_path.to_string(),
            local_path: local_path.to_path_buf(),
            kind,
            reason,
        });
    }
}

/// Exclusive hold on a destination directory, released on drop.
struct MirrorLock<'a> {
    filesystem: &'a dyn Filesystem,
    path: PathBuf,
}

impl<'a> MirrorLock<'a> {
    fn acquire(filesystem: &'a dyn Filesystem, dir: &Path) -> SspromptResult<Self> {
        let path = dir.join(LOCK_FILE_NAME);
        let owner = format!("{}\n", std::process::id());
        if !filesystem.create_new(&path, owner.as_bytes())? {
            return Err(ApplicationError::MirrorLocked { path }.into());
        }
        debug!(lock = %path.display(), "acquired mirror lock");
        Ok(Self { filesystem, path })
    }
}

impl Drop for MirrorLock<'_> {
    fn drop(&mut self) {
        if let Err(e) = self.filesystem.remove_file(&self.path) {
            warn!(lock = %self.path.display(), error = %e, "failed to release mirror lock");
        }
    }
}

/// Mirrors a remote hub tree into a local directory.
pub struct TreeFetcher<'a> {
    backend: &'a dyn HubBackend,
    filesystem: &'a dyn Filesystem,
    policy: RetryPolicy,
}

impl<'a> TreeFetcher<'a> {
    pub fn new(
        backend: &'a dyn HubBackend,
        filesystem: &'a dyn Filesystem,
        policy: RetryPolicy,
    ) -> Self {
        Self {
            backend,
            filesystem,
            policy,
        }
    }

    /// Mirror `remote_path` of `project` into `local_dir`.
    ///
    /// Errors only when the destination cannot be prepared or is locked;
    /// per-node failures land in the report.
    #[instrument(
        skip_all,
        fields(
            project = %project,
            remote = remote_path,
            local = %local_dir.display()
        )
    )]
    pub fn mirror(
        &self,
        project: &HubProject,
        remote_path: &str,
        local_dir: &Path,
    ) -> SspromptResult<MirrorReport> {
        self.filesystem.create_dir_all(local_dir)?;
        let _lock = MirrorLock::acquire(self.filesystem, local_dir)?;

        let mut report = MirrorReport::default();
        self.mirror_dir(project, remote_path, local_dir, &mut report);

        if report.is_complete() {
            info!(
                downloaded = report.downloaded.len(),
                skipped = report.skipped.len(),
                "Mirror completed"
            );
        } else {
            warn!(summary = %report.summary(), "Mirror incomplete");
        }
        Ok(report)
    }

    fn mirror_dir(
        &self,
        project: &HubProject,
        remote_path: &str,
        local_dir: &Path,
        report: &mut MirrorReport,
    ) {
        let entries = match with_retries(&self.policy, "list directory", || {
            self.backend.list_directory(project, remote_path)
        }) {
            Ok(entries) => entries,
            Err(e) => {
                error!(path = remote_path, error = %e, "giving up on directory");
                report.fail(
                    remote_path,
                    local_dir,
                    EntryKind::Directory,
                    FailureReason::from_error(&e),
                );
                return;
            }
        };

        for entry in entries {
            if entry.name() == LOCK_FILE_NAME {
                warn!(path = remote_path, "remote entry collides with lock file, skipping");
                continue;
            }
            let child_remote = join_remote(remote_path, entry.name());
            let child_local = local_dir.join(entry.name());
            match entry.kind() {
                EntryKind::Directory => {
                    if let Err(e) = self.filesystem.create_dir_all(&child_local) {
                        report.fail(
                            &child_remote,
                            &child_local,
                            EntryKind::Directory,
                            FailureReason::Filesystem(e.to_string()),
                        );
                        continue;
                    }
                    report.directories += 1;
                    self.mirror_dir(project, &child_remote, &child_local, report);
                }
                EntryKind::File => self.mirror_file(&entry, &child_remote, &child_local, report),
            }
        }
    }

    fn mirror_file(
        &self,
        entry: &RemoteTreeEntry,
        remote_path: &str,
        local_path: &Path,
        report: &mut MirrorReport,
    ) {
        let (Some(expected), Some(download_ref)) = (entry.digest(), entry.download_ref()) else {
            report.fail(
                remote_path,
                local_path,
                EntryKind::File,
                FailureReason::InvalidEntry("file entry without digest or download link".into()),
            );
            return;
        };

        let verifier = IntegrityVerifier::new(self.filesystem);
        if self.filesystem.exists(local_path) {
            if verifier.matches(local_path, expected) {
                debug!(path = remote_path, "unchanged, skipping");
                report.skipped.push(local_path.to_path_buf());
                return;
            }
            info!(path = remote_path, "local copy is stale, replacing");
            if let Err(e) = self.filesystem.remove_file(local_path) {
                report.fail(
                    remote_path,
                    local_path,
                    EntryKind::File,
                    FailureReason::Filesystem(e.to_string()),
                );
                return;
            }
        }

        let bytes = match with_retries(&self.policy, "download", || {
            self.backend.fetch_blob(download_ref)
        }) {
            Ok(bytes) => bytes,
            Err(e) => {
                error!(path = remote_path, error = %e, "giving up on file");
                report.fail(
                    remote_path,
                    local_path,
                    EntryKind::File,
                    FailureReason::from_error(&e),
                );
                return;
            }
        };

        if let Err(e) = self.filesystem.write_file(local_path, &bytes) {
            report.fail(
                remote_path,
                local_path,
                EntryKind::File,
                FailureReason::Filesystem(e.to_string()),
            );
            return;
        }

        match verifier.digest_file(local_path) {
            Ok(actual) if actual == *expected => {
                info!(path = remote_path, bytes = bytes.len(), "downloaded");
                report.downloaded.push(local_path.to_path_buf());
            }
            Ok(actual) => {
                error!(
                    path = remote_path,
                    expected = %expected,
                    actual = %actual,
                    "integrity mismatch, discarding download"
                );
                if let Err(e) = self.filesystem.remove_file(local_path) {
                    warn!(path = %local_path.display(), error = %e, "could not remove corrupt file");
                }
                report.fail(
                    remote_path,
                    local_path,
                    EntryKind::File,
                    FailureReason::Integrity {
                        expected: expected.clone(),
                        actual,
                    },
                );
            }
            Err(e) => report.fail(
                remote_path,
                local_path,
                EntryKind::File,
                FailureReason::Filesystem(e.to_string()),
            ),
        }
    }
}
