//! Project Service - descriptor management and pulls.
//!
//! Resolves where a hub project lives locally, reads and writes its
//! descriptor, fetches the remote descriptor, and drives the tree mirror.

use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument, warn};

use crate::{
    application::{
        ApplicationError,
        ports::{DescriptorCodec, Filesystem, HubBackend},
        services::{
            mirror_service::{MirrorReport, TreeFetcher},
            retry::with_retries,
        },
    },
    domain::{
        DependencySpec, DomainValidator as validator, HubProject, ProjectDescriptor, RetryPolicy,
        digest,
    },
    error::SspromptResult,
};

/// Service bound to one hub project and its local directory.
pub struct ProjectService {
    backend: Box<dyn HubBackend>,
    filesystem: Box<dyn Filesystem>,
    codec: Box<dyn DescriptorCodec>,
    project: HubProject,
    save_dir: PathBuf,
}

impl ProjectService {
    /// Create a service for `project`, saving under `base`.
    ///
    /// With `dir_flag` the project gets its own directory named after it.
    pub fn new(
        backend: Box<dyn HubBackend>,
        filesystem: Box<dyn Filesystem>,
        codec: Box<dyn DescriptorCodec>,
        project: HubProject,
        base: &Path,
        dir_flag: bool,
    ) -> Self {
        let save_dir = project.save_dir(base, dir_flag);
        Self {
            backend,
            filesystem,
            codec,
            project,
            save_dir,
        }
    }

    pub fn project(&self) -> &HubProject {
        &self.project
    }

    pub fn save_dir(&self) -> &Path {
        &self.save_dir
    }

    /// Local path of the project descriptor.
    pub fn descriptor_path(&self) -> PathBuf {
        self.save_dir.join(self.project.descriptor_file_name())
    }

    /// Whether the project's repository exists on the hub.
    pub fn check_project_exists(&self, policy: &RetryPolicy) -> SspromptResult<bool> {
        with_retries(policy, "check project", || {
            self.backend.check_project_exists(&self.project)
        })
    }

    /// Read and validate the local descriptor.
    pub fn local_descriptor(&self) -> SspromptResult<ProjectDescriptor> {
        let path = self.descriptor_path();
        if !self.filesystem.is_file(&path) {
            return Err(ApplicationError::DescriptorNotFound { path }.into());
        }
        let bytes = self.filesystem.read_file(&path)?;
        self.decode(&bytes)
    }

    /// Fetch and validate the descriptor from the hub.
    ///
    /// `Ok(None)` means the hub stayed unreachable, or the descriptor
    /// absent, for the whole retry budget.
    #[instrument(skip_all, fields(project = %self.project))]
    pub fn remote_descriptor(
        &self,
        policy: &RetryPolicy,
    ) -> SspromptResult<Option<ProjectDescriptor>> {
        let remote_path = self.project.remote_descriptor_path();
        let file_name = self.project.descriptor_file_name();

        let fetched = with_retries(policy, "fetch remote descriptor", || {
            let entries = self.backend.list_directory(&self.project, &remote_path)?;
            let entry = entries
                .into_iter()
                .find(|e| !e.is_dir() && e.name() == file_name)
                .ok_or_else(|| {
                    ApplicationError::transport(&remote_path, Some(404), "descriptor not listed")
                })?;
            let download_ref = entry.download_ref().unwrap_or_default();
            let bytes = self.backend.fetch_blob(download_ref)?;
            Ok((entry, bytes))
        });

        let (entry, bytes) = match fetched {
            Ok(found) => found,
            Err(e) if e.is_retryable() => {
                warn!(error = %e, "hub unreachable or project absent");
                return Ok(None);
            }
            Err(e) => return Err(e),
        };

        if let Some(expected) = entry.digest() {
            let actual = digest(&bytes);
            if actual != *expected {
                return Err(ApplicationError::IntegrityMismatch {
                    path: PathBuf::from(remote_path),
                    expected: expected.to_string(),
                    actual: actual.to_string(),
                }
                .into());
            }
        }

        debug!(bytes = bytes.len(), "remote descriptor fetched");
        self.decode(&bytes).map(Some)
    }

    /// Unique dependency specs of a descriptor, first occurrence first.
    pub fn extract_dependencies(descriptor: &ProjectDescriptor) -> Vec<DependencySpec> {
        descriptor.dependencies()
    }

    /// Write `descriptor` to the local descriptor path, replacing any
    /// existing file.
    #[instrument(skip_all, fields(path = %self.descriptor_path().display()))]
    pub fn save_descriptor(&self, descriptor: &ProjectDescriptor) -> SspromptResult<()> {
        validator::validate_descriptor(descriptor)?;
        let text = self.codec.render(descriptor)?;
        let path = self.descriptor_path();

        self.filesystem.create_dir_all(&self.save_dir)?;
        if self.filesystem.exists(&path) {
            self.filesystem.remove_file(&path)?;
        }
        self.filesystem.write_file(&path, text.as_bytes())?;
        info!("Descriptor saved");
        Ok(())
    }

    /// Mirror the project's remote tree into the save directory.
    #[instrument(skip_all, fields(project = %self.project, dest = %self.save_dir.display()))]
    pub fn pull(&self, policy: &RetryPolicy) -> SspromptResult<MirrorReport> {
        info!("Pulling {}", self.project);
        TreeFetcher::new(self.backend.as_ref(), self.filesystem.as_ref(), *policy).mirror(
            &self.project,
            self.project.remote_root(),
            &self.save_dir,
        )
    }

    fn decode(&self, bytes: &[u8]) -> SspromptResult<ProjectDescriptor> {
        let text = std::str::from_utf8(bytes).map_err(|e| ApplicationError::Codec {
            reason: format!("descriptor is not UTF-8: {e}"),
        })?;
        let descriptor = self.codec.parse(text)?;
        validator::validate_descriptor(&descriptor)?;
        Ok(descriptor)
    }
}
