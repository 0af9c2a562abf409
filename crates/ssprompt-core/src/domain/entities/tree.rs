use std::fmt;

use crate::domain::{Digest, DomainError};

/// Whether a remote node is a blob or a directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryKind {
    File,
    Directory,
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File => f.write_str("file"),
            Self::Directory => f.write_str("dir"),
        }
    }
}

/// One entry of a remote directory listing.
///
/// Invariant: `name` is a single, non-traversing path component. Files built
/// with [`RemoteTreeEntry::file`] carry a digest and a download locator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteTreeEntry {
    name: String,
    kind: EntryKind,
    download_ref: Option<String>,
    digest: Option<Digest>,
}

impl RemoteTreeEntry {
    pub fn file(
        name: impl Into<String>,
        download_ref: impl Into<String>,
        digest: Digest,
    ) -> Result<Self, DomainError> {
        Ok(Self {
            name: checked_name(name.into())?,
            kind: EntryKind::File,
            download_ref: Some(download_ref.into()),
            digest: Some(digest),
        })
    }

    /// A listed file the hub gave no usable digest or download link for.
    ///
    /// Mirroring records it as a failed node instead of fetching it.
    pub fn unresolved_file(name: impl Into<String>) -> Result<Self, DomainError> {
        Ok(Self {
            name: checked_name(name.into())?,
            kind: EntryKind::File,
            download_ref: None,
            digest: None,
        })
    }

    pub fn directory(name: impl Into<String>) -> Result<Self, DomainError> {
        Ok(Self {
            name: checked_name(name.into())?,
            kind: EntryKind::Directory,
            download_ref: None,
            digest: None,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> EntryKind {
        self.kind
    }

    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Directory
    }

    pub fn download_ref(&self) -> Option<&str> {
        self.download_ref.as_deref()
    }

    pub fn digest(&self) -> Option<&Digest> {
        self.digest.as_ref()
    }
}

/// Join a remote directory path and a child name (`""` is the root).
pub fn join_remote(parent: &str, name: &str) -> String {
    let parent = parent.trim_end_matches('/');
    if parent.is_empty() {
        name.to_string()
    } else {
        format!("{parent}/{name}")
    }
}

// Entry names come from the network and end up as local path components.
fn checked_name(name: String) -> Result<String, DomainError> {
    let unsafe_name = name.is_empty()
        || name == "."
        || name == ".."
        || name.contains(['/', '\\', '\0'])
        || name.contains(':');
    if unsafe_name {
        return Err(DomainError::UnsafeEntryName { name });
    }
    Ok(name)
}
