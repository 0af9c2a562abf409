//! Application services - orchestrate use cases.
//!
//! Services coordinate the domain layer and ports to accomplish
//! high-level use cases like "pull a project" or "install dependencies".

pub mod dependency_service;
pub mod integrity;
pub mod mirror_service;
pub mod project_service;
mod retry;

pub use dependency_service::{
    DependencyOutcome, DependencyReport, DependencyService, DependencyStatus,
};
pub use integrity::IntegrityVerifier;
pub use mirror_service::{FailureReason, LOCK_FILE_NAME, MirrorReport, NodeFailure, TreeFetcher};
pub use project_service::ProjectService;
