// ============================================================================
//  CLEAN MODULE BOUNDARIES
// ============================================================================

//! Core domain layer for ssprompt.
//!
//! This module contains pure logic with no I/O. Network, disk, and
//! subprocess concerns are reached through ports (traits) defined in the
//! application layer.
//!
//! ## Hexagonal Architecture Compliance
//!
//! - **No async**: Domain logic is synchronous
//! - **No I/O**: No filesystem, network, or external calls
//! - **Few crates**: std + thiserror, plus regex and sha1 for the two
//!   algorithms that need them (wildcard constraints, blob digests)
//! - **Immutable values**: All domain objects are Clone + PartialEq
//!
// Public API - what the world sees
pub mod constraint;
pub mod entities;
pub mod error;
pub mod value_objects;

// Private implementation details - not visible outside domain
mod validation;

// Re-exports for convenience
pub use constraint::{VersionConstraint, compare_versions, matches, select_compatible};
pub use entities::{
    DependencyMap, DependencySpec, EntryKind, HubProject, MetaConfig, ProjectDescriptor,
    PromptItem, PromptSection, RemoteTreeEntry, join_remote,
};
pub use error::{DomainError, ErrorCategory};
pub use value_objects::{Digest, Platform, RetryPolicy, SectionKind};

pub use validation::DomainValidator;

/// Digest of a blob's bytes, comparable with the hub's listing digests.
pub fn digest(bytes: &[u8]) -> Digest {
    Digest::of_blob(bytes)
}
