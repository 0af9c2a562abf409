//! ssprompt core - hexagonal architecture implementation
//!
//! This crate provides the domain and application layers for ssprompt,
//! a tool that pulls prompt projects from a git-hosted hub and keeps
//! their Python dependencies installed.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │          ssprompt-cli (CLI)             │
//! │     (Implements Driving Ports)          │
//! └──────────────────┬──────────────────────┘
//!                    │ calls
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │         Application Services            │
//! │  (ProjectService, DependencyService)    │
//! │         Orchestrates Use Cases          │
//! └──────────────────┬──────────────────────┘
//!                    │ uses
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │      Application Ports (Traits)         │
//! │  (Hub, Filesystem, Codec, Index, pip)   │
//! └──────────────────┬──────────────────────┘
//!                    │ implemented by
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │     ssprompt-adapters (Infrastructure)  │
//! │  (ContentsApiHub, PypiIndex, etc)       │
//! └─────────────────────────────────────────┘
//!                    │
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │         Domain Layer (Pure Logic)       │
//! │ (VersionConstraint, ProjectDescriptor)  │
//! │         No I/O                          │
//! └─────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,no_run
//! use ssprompt_core::prelude::*;
//!
//! # fn run(backend: Box<dyn HubBackend>, fs: Box<dyn Filesystem>, codec: Box<dyn DescriptorCodec>) -> SspromptResult<()> {
//! let project = HubProject::new("ptonlix/PromptHub", Some("demo"))?;
//! let service = ProjectService::new(backend, fs, codec, project, std::path::Path::new("."), true);
//! let report = service.pull(&RetryPolicy::default())?;
//! println!("{}", report.summary());
//! # Ok(())
//! # }
//! ```

pub mod domain;

pub mod application;

pub mod error;

// Public API - what external crates should use
pub mod prelude {
    pub use crate::application::{
        DependencyService, MirrorReport, ProjectService,
        ports::{DescriptorCodec, Filesystem, HubBackend, PackageIndex, PackageInstaller},
    };
    pub use crate::domain::{
        DependencySpec, Digest, HubProject, Platform, ProjectDescriptor, RetryPolicy,
        SectionKind, VersionConstraint,
    };
    pub use crate::error::{SspromptError, SspromptResult};
}

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
