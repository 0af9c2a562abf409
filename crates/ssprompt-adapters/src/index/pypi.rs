//! PyPI JSON API client.

use std::collections::BTreeMap;
use std::time::Duration;

use reqwest::StatusCode;
use reqwest::blocking::Client;
use serde::Deserialize;
use tracing::{debug, instrument};

use ssprompt_core::{
    application::{
        ApplicationError,
        ports::{PackageIndex, PackageVersions},
    },
    domain::compare_versions,
    error::{SspromptError, SspromptResult},
};

pub const DEFAULT_INDEX_URL: &str = "https://pypi.org/pypi/";

#[derive(Debug, Deserialize)]
struct ProjectInfo {
    version: String,
}

#[derive(Debug, Deserialize)]
struct ProjectDocument {
    info: ProjectInfo,
    #[serde(default)]
    releases: BTreeMap<String, serde_json::Value>,
}

/// Package index backed by PyPI's JSON API.
#[derive(Debug, Clone)]
pub struct PypiIndex {
    client: Client,
    base_url: String,
}

impl PypiIndex {
    pub fn new(base_url: &str, timeout: Duration) -> SspromptResult<Self> {
        let client = Client::builder()
            .user_agent(concat!("ssprompt/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .map_err(|e| SspromptError::Configuration {
                message: format!("cannot build HTTP client: {e}"),
            })?;
        let mut base_url = base_url.trim().to_string();
        if !base_url.ends_with('/') {
            base_url.push('/');
        }
        Ok(Self { client, base_url })
    }

    fn document_url(&self, name: &str, version: Option<&str>) -> String {
        match version {
            Some(v) => format!("{}{}/{}/json", self.base_url, name, v),
            None => format!("{}{}/json", self.base_url, name),
        }
    }
}

impl PackageIndex for PypiIndex {
    #[instrument(skip(self))]
    fn package_exists<'a>(&self, name: &str, version: Option<&'a str>) -> SspromptResult<bool> {
        let url = self.document_url(name, version);
        let response = self
            .client
            .get(&url)
            .send()
            .map_err(|e| ApplicationError::transport(&url, None, e.to_string()))?;
        let status = response.status();
        debug!(%status, "index answered");
        // Only a definitive 404 means absent.
        Ok(status != StatusCode::NOT_FOUND)
    }

    #[instrument(skip(self))]
    fn available_versions(&self, name: &str) -> SspromptResult<PackageVersions> {
        let url = self.document_url(name, None);
        let response = self
            .client
            .get(&url)
            .send()
            .map_err(|e| ApplicationError::transport(&url, None, e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(ApplicationError::transport(&url, Some(status.as_u16()), status.to_string()).into());
        }
        let document: ProjectDocument = response
            .json()
            .map_err(|e| ApplicationError::transport(&url, None, format!("malformed index document: {e}")))?;
        Ok(versions_of(document))
    }
}

fn versions_of(document: ProjectDocument) -> PackageVersions {
    let mut all: Vec<String> = document.releases.into_keys().collect();
    all.sort_by(|a, b| compare_versions(a, b));
    PackageVersions {
        latest: document.info.version,
        all,
    }
}
