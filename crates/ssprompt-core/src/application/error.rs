//! Application layer errors.
//!
//! These errors represent failures in orchestration and I/O, not business
//! rules. Business rule violations are `DomainError` from `crate::domain`.

use std::path::PathBuf;
use thiserror::Error;

use crate::error::ErrorCategory;

/// Errors that occur while talking to the hub, the index, or the disk.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ApplicationError {
    /// Non-success response, connection failure, or timeout.
    #[error("request to {target} failed: {reason}")]
    Transport {
        target: String,
        status: Option<u16>,
        reason: String,
    },

    /// A downloaded blob does not hash to the digest the hub advertised.
    #[error("integrity check failed for {path}: expected {expected}, got {actual}")]
    IntegrityMismatch {
        path: PathBuf,
        expected: String,
        actual: String,
    },

    /// Filesystem operation failed.
    #[error("Filesystem error at {path}: {reason}")]
    FilesystemError { path: PathBuf, reason: String },

    /// In-memory adapter lock poisoned.
    #[error("adapter state lock poisoned")]
    StoreLockError,

    /// Another pull holds the destination directory.
    #[error("destination is locked by another pull: {path}")]
    MirrorLocked { path: PathBuf },

    /// The hub answered, and the project is not there.
    #[error("project '{project}' was not found on the hub")]
    ProjectNotFound { project: String },

    /// The hub could not be reached within the retry budget.
    #[error("hub unreachable or project absent: {project}")]
    HubUnreachable { project: String },

    /// No descriptor file at the expected location.
    #[error("project descriptor not found at {path}")]
    DescriptorNotFound { path: PathBuf },

    /// Descriptor text could not be parsed or rendered.
    #[error("descriptor codec error: {reason}")]
    Codec { reason: String },

    /// The package installer reported a failure.
    #[error("failed to install {package}: {reason}")]
    InstallFailed { package: String, reason: String },

    /// Validation failed (application-level, not domain).
    #[error("Validation failed: {0}")]
    ValidationFailed(String),
}

impl ApplicationError {
    /// Convenience constructor for transport failures.
    pub fn transport(target: impl Into<String>, status: Option<u16>, reason: impl Into<String>) -> Self {
        Self::Transport {
            target: target.into(),
            status,
            reason: reason.into(),
        }
    }

    /// Whether another attempt might succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Transport { .. })
    }

    /// Get user-actionable suggestions.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::Transport { status, .. } => {
                let mut out = vec!["Check your network connection".into()];
                if matches!(status, Some(403) | Some(429)) {
                    out.push("The hub may be rate limiting you; set GITHUB_ACCESS_KEY".into());
                }
                out.push("Increase --retries or --retry-delay for flaky links".into());
                out
            }
            Self::IntegrityMismatch { path, .. } => vec![
                format!("The copy at {} was discarded", path.display()),
                "Run the pull again; if it persists the source may be tampered with".into(),
            ],
            Self::FilesystemError { path, .. } => vec![
                format!("Failed to access: {}", path.display()),
                "Check that you have write permissions".into(),
                "Ensure the parent directory exists".into(),
            ],
            Self::StoreLockError => vec!["Try again in a moment".into()],
            Self::MirrorLocked { path } => vec![
                "Another pull is writing to the same directory".into(),
                format!("If no pull is running, delete {}", path.display()),
            ],
            Self::ProjectNotFound { project } | Self::HubUnreachable { project } => vec![
                format!("Project: {}", project),
                "Check the owner/repository name and the --platform flag".into(),
            ],
            Self::DescriptorNotFound { path } => vec![
                format!("Expected a descriptor at {}", path.display()),
                "Run the command from the project directory, or pass its path".into(),
            ],
            Self::Codec { .. } => vec!["The descriptor must be valid YAML".into()],
            Self::InstallFailed { package, .. } => vec![
                format!("Try installing manually: pip install {}", package),
            ],
            Self::ValidationFailed(_) => vec!["Check the error details above".into()],
        }
    }

    /// Get error category.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Transport { .. } | Self::IntegrityMismatch { .. } => ErrorCategory::Network,
            Self::FilesystemError { .. } | Self::StoreLockError | Self::InstallFailed { .. } => {
                ErrorCategory::Internal
            }
            Self::MirrorLocked { .. } | Self::ValidationFailed(_) => ErrorCategory::Validation,
            Self::ProjectNotFound { .. }
            | Self::HubUnreachable { .. }
            | Self::DescriptorNotFound { .. } => ErrorCategory::NotFound,
            Self::Codec { .. } => ErrorCategory::Configuration,
        }
    }
}
