//! Infrastructure adapters for ssprompt.
//!
//! This crate implements the ports defined in `ssprompt-core::application::ports`.
//! It contains all external dependencies and I/O operations.

pub mod descriptor;
pub mod filesystem;
pub mod hub;
pub mod index;
pub mod installer;

// Re-export commonly used adapters
pub use descriptor::YamlDescriptorCodec;
pub use filesystem::{LocalFilesystem, MemoryFilesystem};
pub use hub::{ContentsApiHub, MemoryHub, backend_for};
pub use index::PypiIndex;
pub use installer::PipInstaller;
