// ============================================================================
// domain/error.rs - DOMAIN ERRORS
// ============================================================================

use thiserror::Error;

/// Root domain error type.
///
/// All errors are:
/// - Cloneable (for retry logic)
/// - Categorizable (for CLI display)
/// - Actionable (provides suggestions)
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DomainError {
    // ========================================================================
    // Configuration Errors (never retried)
    // ========================================================================
    #[error("invalid version constraint '{constraint}': {reason}")]
    InvalidConstraint { constraint: String, reason: String },

    #[error("invalid dependency '{input}': {reason}")]
    InvalidDependency { input: String, reason: String },

    #[error("invalid project descriptor: {0}")]
    InvalidDescriptor(String),

    #[error("Required field missing: {field}")]
    MissingRequiredField { field: String },

    #[error("unknown hub platform '{0}'")]
    UnknownPlatform(String),

    #[error("unknown prompt section '{0}'")]
    UnknownSection(String),

    // ========================================================================
    // Validation Errors (400-level equivalent)
    // ========================================================================
    #[error("invalid hub project '{name}': {reason}")]
    InvalidProjectName { name: String, reason: String },

    #[error("unsafe remote entry name '{name}'")]
    UnsafeEntryName { name: String },

    #[error("invalid digest '{0}'")]
    InvalidDigest(String),
}

impl DomainError {
    /// Get user-actionable suggestions for fixing this error.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::InvalidConstraint { constraint, .. } => vec![
                format!("Constraint: {}", constraint),
                "Supported forms: ^1.2.0, ~1.2.0, 1.*.*, latest".into(),
            ],
            Self::InvalidDependency { .. } => vec![
                "Dependencies are written as name@constraint".into(),
                "Example: -d langchain@^0.0.266".into(),
            ],
            Self::InvalidDescriptor(msg) | Self::MissingRequiredField { field: msg } => vec![
                format!("Details: {}", msg),
                "Check the project's <name>.yaml descriptor".into(),
            ],
            Self::UnknownPlatform(_) => vec![
                "Supported platforms: github, gitee".into(),
                "Example: ssprompt pull ptonlix/PromptHub --platform github".into(),
            ],
            Self::UnknownSection(_) => {
                vec!["Supported sections: text, json, yaml, python, all".into()]
            }
            Self::InvalidProjectName { .. } => vec![
                "Hub projects are written as owner/repository".into(),
                "Example: ptonlix/PromptHub".into(),
            ],
            Self::UnsafeEntryName { .. } | Self::InvalidDigest(_) => vec![
                "The hub returned an unexpected listing".into(),
                "Verify the hub platform and project name".into(),
            ],
        }
    }

    /// Error category for CLI display styling.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidConstraint { .. }
            | Self::InvalidDescriptor(_)
            | Self::MissingRequiredField { .. }
            | Self::UnknownPlatform(_) => ErrorCategory::Configuration,
            Self::InvalidDependency { .. }
            | Self::UnknownSection(_)
            | Self::InvalidProjectName { .. } => ErrorCategory::Validation,
            Self::UnsafeEntryName { .. } | Self::InvalidDigest(_) => ErrorCategory::Internal,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    Configuration,
    NotFound,
    Internal,
}
