//! Application ports (traits) for external dependencies.
//!
//! In hexagonal architecture, ports define interfaces that the application
//! needs from the outside world. Adapters in `ssprompt-adapters` implement these.
//!
//! ## Port Types
//!
//! - **Driven (Output) Ports**: Called by application, implemented by infrastructure
//!   - `Filesystem`: byte-level file operations
//!   - `HubBackend`: directory listing and blob download on a hosting platform
//!   - `DescriptorCodec`: descriptor text format
//!   - `PackageIndex`: package existence and version queries
//!   - `PackageInstaller`: installed-version lookup and installation
//!
//! - **Driving (Input) Ports**: Called by external world, implemented by application
//!   - (Defined in CLI layer, implemented by services)

pub mod output;

pub use output::{
    DescriptorCodec, Filesystem, HubBackend, PackageIndex, PackageInstaller, PackageVersions,
};

#[cfg(test)]
pub use output::{
    MockDescriptorCodec, MockFilesystem, MockHubBackend, MockPackageIndex, MockPackageInstaller,
};
