//! In-memory hub for testing.

use std::{
    collections::{BTreeMap, HashMap, HashSet},
    sync::{Arc, RwLock, RwLockWriteGuard},
};

use ssprompt_core::{
    application::{ApplicationError, ports::HubBackend},
    domain::{Digest, HubProject, Platform, RemoteTreeEntry, digest},
    error::SspromptResult,
};

const REF_PREFIX: &str = "mem://";

/// Hub whose repository lives in memory, with failure injection.
///
/// Files are keyed by repository path (`demo/prompt/a.txt`);
/// directories are implied by the paths.
#[derive(Debug, Clone, Default)]
pub struct MemoryHub {
    inner: Arc<RwLock<MemoryHubInner>>,
}

#[derive(Debug, Default)]
struct MemoryHubInner {
    projects: HashSet<String>,
    files: BTreeMap<String, Vec<u8>>,
    advertised: HashMap<String, Digest>,
    list_failures: HashMap<String, u32>,
    fetch_failures: HashMap<String, u32>,
    fetches: usize,
}

impl MemoryHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a repository (`owner/repo`).
    pub fn with_project(self, main_project: &str) -> Self {
        if let Ok(mut inner) = self.inner.write() {
            inner.projects.insert(main_project.to_string());
        }
        self
    }

    /// Add or replace a file.
    pub fn with_file(self, path: &str, content: impl AsRef<[u8]>) -> Self {
        if let Ok(mut inner) = self.inner.write() {
            let path = path.trim_matches('/').to_string();
            inner.advertised.remove(&path);
            inner.files.insert(path, content.as_ref().to_vec());
        }
        self
    }

    /// Serve `content` for `path` while advertising the original digest.
    pub fn corrupt(&self, path: &str, content: impl AsRef<[u8]>) {
        if let Ok(mut inner) = self.inner.write() {
            let path = path.trim_matches('/').to_string();
            if let Some(original) = inner.files.get(&path) {
                let advertised = digest(original);
                inner.advertised.insert(path.clone(), advertised);
                inner.files.insert(path, content.as_ref().to_vec());
            }
        }
    }

    /// Fail the next `times` listings of directory `path`.
    pub fn fail_listing(&self, path: &str, times: u32) {
        if let Ok(mut inner) = self.inner.write() {
            inner
                .list_failures
                .insert(path.trim_matches('/').to_string(), times);
        }
    }

    /// Fail the next `times` downloads of file `path`.
    pub fn fail_download(&self, path: &str, times: u32) {
        if let Ok(mut inner) = self.inner.write() {
            inner
                .fetch_failures
                .insert(path.trim_matches('/').to_string(), times);
        }
    }

    /// Number of download attempts so far, failed ones included.
    pub fn fetch_count(&self) -> usize {
        self.inner.read().map(|inner| inner.fetches).unwrap_or_default()
    }

    fn lock(&self) -> SspromptResult<RwLockWriteGuard<'_, MemoryHubInner>> {
        self.inner
            .write()
            .map_err(|_| ApplicationError::StoreLockError.into())
    }
}

/// Decrement an injected failure counter; true if this call should fail.
fn take_failure(counters: &mut HashMap<String, u32>, key: &str) -> bool {
    match counters.get_mut(key) {
        Some(n) if *n > 0 => {
            *n -= 1;
            true
        }
        _ => false,
    }
}

fn not_found(target: &str) -> ApplicationError {
    ApplicationError::transport(target, Some(404), "Not Found")
}

impl HubBackend for MemoryHub {
    fn platform(&self) -> Platform {
        Platform::Github
    }

    fn check_project_exists(&self, project: &HubProject) -> SspromptResult<bool> {
        Ok(self.lock()?.projects.contains(project.main_project()))
    }

    fn list_directory(
        &self,
        project: &HubProject,
        path: &str,
    ) -> SspromptResult<Vec<RemoteTreeEntry>> {
        let mut guard = self.lock()?;
        let path = path.trim_matches('/');
        if !guard.projects.contains(project.main_project()) {
            return Err(not_found(project.main_project()).into());
        }
        if take_failure(&mut guard.list_failures, path) {
            return Err(ApplicationError::transport(path, Some(503), "injected failure").into());
        }
        let inner: &MemoryHubInner = &guard;

        let entry_for = |inner: &MemoryHubInner, file_path: &str, name: &str| {
            let advertised = inner
                .advertised
                .get(file_path)
                .cloned()
                .unwrap_or_else(|| digest(&inner.files[file_path]));
            RemoteTreeEntry::file(name, format!("{REF_PREFIX}{file_path}"), advertised)
        };

        if inner.files.contains_key(path) {
            let name = path.rsplit('/').next().unwrap_or(path);
            return Ok(vec![entry_for(inner, path, name)?]);
        }

        let prefix = if path.is_empty() {
            String::new()
        } else {
            format!("{path}/")
        };
        let mut children: BTreeMap<String, RemoteTreeEntry> = BTreeMap::new();
        for file_path in inner.files.keys() {
            let Some(rest) = file_path.strip_prefix(&prefix) else {
                continue;
            };
            match rest.split_once('/') {
                Some((dir, _)) => {
                    if !children.contains_key(dir) {
                        children.insert(dir.to_string(), RemoteTreeEntry::directory(dir)?);
                    }
                }
                None => {
                    children.insert(rest.to_string(), entry_for(inner, file_path, rest)?);
                }
            }
        }

        if children.is_empty() && !path.is_empty() {
            return Err(not_found(path).into());
        }
        Ok(children.into_values().collect())
    }

    fn fetch_blob(&self, download_ref: &str) -> SspromptResult<Vec<u8>> {
        let mut inner = self.lock()?;
        inner.fetches += 1;
        let path = download_ref
            .strip_prefix(REF_PREFIX)
            .ok_or_else(|| not_found(download_ref))?;
        if take_failure(&mut inner.fetch_failures, path) {
            return Err(ApplicationError::transport(path, Some(502), "injected failure").into());
        }
        inner
            .files
            .get(path)
            .cloned()
            .ok_or_else(|| not_found(download_ref).into())
    }
}
