pub mod descriptor;
pub mod hub_project;
pub mod tree;

pub use descriptor::{
    DependencyMap, DependencySpec, MetaConfig, ProjectDescriptor, PromptItem, PromptSection,
};
pub use hub_project::HubProject;
pub use tree::{EntryKind, RemoteTreeEntry, join_remote};
