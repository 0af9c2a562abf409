//! Application layer for ssprompt.
//!
//! This layer contains:
//! - **Services**: Use case orchestration (ProjectService, DependencyService)
//! - **Ports**: Interface definitions (traits) for external dependencies
//! - **Errors**: Application-specific error types
//!
//! The application layer coordinates the domain layer but contains no
//! business logic itself. All business rules live in `crate::domain`.

pub mod error;
pub mod ports;
pub mod services;

// Re-export main services
pub use services::{
    DependencyOutcome, DependencyReport, DependencyService, DependencyStatus, FailureReason,
    IntegrityVerifier, MirrorReport, NodeFailure, ProjectService, TreeFetcher,
};

// Re-export port traits (for adapter implementation)
pub use ports::{
    DescriptorCodec, Filesystem, HubBackend, PackageIndex, PackageInstaller, PackageVersions,
};

pub use error::ApplicationError;
