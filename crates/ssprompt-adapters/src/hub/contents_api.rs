//! Repository contents API client (GitHub, Gitee).

use std::time::Duration;

use reqwest::StatusCode;
use reqwest::blocking::{Client, RequestBuilder, Response};
use serde::Deserialize;
use tracing::{debug, trace, warn};

use ssprompt_core::{
    application::{ApplicationError, ports::HubBackend},
    domain::{Digest, HubProject, Platform, RemoteTreeEntry},
    error::{SspromptError, SspromptResult},
};

/// How the access token travels with each request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenPlacement {
    /// `Authorization: token <t>`
    Header,
    /// `?access_token=<t>`
    Query,
}

struct Endpoint {
    api_base: &'static str,
    token: TokenPlacement,
}

const fn endpoint(platform: Platform) -> Endpoint {
    match platform {
        Platform::Github => Endpoint {
            api_base: "https://api.github.com",
            token: TokenPlacement::Header,
        },
        Platform::Gitee => Endpoint {
            api_base: "https://gitee.com/api/v5",
            token: TokenPlacement::Query,
        },
    }
}

/// One element of a contents listing.
#[derive(Debug, Deserialize)]
struct ContentEntry {
    name: String,
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    sha: Option<String>,
    #[serde(default)]
    download_url: Option<String>,
}

/// Directories come back as arrays, single files as one object.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Listing {
    Many(Vec<ContentEntry>),
    One(ContentEntry),
}

impl Listing {
    fn into_vec(self) -> Vec<ContentEntry> {
        match self {
            Self::Many(entries) => entries,
            Self::One(entry) => vec![entry],
        }
    }
}

/// Hub backend speaking the repository contents API.
#[derive(Debug, Clone)]
pub struct ContentsApiHub {
    platform: Platform,
    client: Client,
    api_base: String,
    token: Option<String>,
    placement: TokenPlacement,
}

impl ContentsApiHub {
    pub fn new(platform: Platform, token: Option<String>, timeout: Duration) -> SspromptResult<Self> {
        let client = Client::builder()
            .user_agent(concat!("ssprompt/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .map_err(|e| SspromptError::Configuration {
                message: format!("cannot build HTTP client: {e}"),
            })?;
        let endpoint = endpoint(platform);
        Ok(Self {
            platform,
            client,
            api_base: endpoint.api_base.to_string(),
            token: token.filter(|t| !t.trim().is_empty()),
            placement: endpoint.token,
        })
    }

    /// Point the client at a different API root (enterprise installs, test servers).
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    fn repo_url(&self, project: &HubProject) -> String {
        format!("{}/repos/{}", self.api_base, project.main_project())
    }

    fn contents_url(&self, project: &HubProject, path: &str) -> String {
        format!("{}/contents/{}", self.repo_url(project), path.trim_matches('/'))
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match (&self.token, self.placement) {
            (Some(token), TokenPlacement::Header) => {
                request.header("Authorization", format!("token {token}"))
            }
            (Some(token), TokenPlacement::Query) => request.query(&[("access_token", token)]),
            (None, _) => request,
        }
    }

    fn send(&self, url: &str) -> SspromptResult<Response> {
        trace!(url, "GET");
        self.authorize(self.client.get(url))
            .send()
            .map_err(|e| transport_error(url, e))
    }

    fn get_ok(&self, url: &str) -> SspromptResult<Response> {
        let response = self.send(url)?;
        let status = response.status();
        if !status.is_success() {
            return Err(status_error(url, status));
        }
        Ok(response)
    }
}

impl HubBackend for ContentsApiHub {
    fn platform(&self) -> Platform {
        self.platform
    }

    fn check_project_exists(&self, project: &HubProject) -> SspromptResult<bool> {
        let url = self.repo_url(project);
        let response = self.send(&url)?;
        match response.status() {
            s if s.is_success() => Ok(true),
            StatusCode::NOT_FOUND => Ok(false),
            s => Err(status_error(&url, s)),
        }
    }

    fn list_directory(
        &self,
        project: &HubProject,
        path: &str,
    ) -> SspromptResult<Vec<RemoteTreeEntry>> {
        let url = self.contents_url(project, path);
        let listing: Listing = self
            .get_ok(&url)?
            .json()
            .map_err(|e| transport_error(&url, e))?;

        let entries: Vec<_> = listing.into_vec().into_iter().filter_map(to_entry).collect();
        debug!(url, count = entries.len(), "listed");
        Ok(entries)
    }

    fn fetch_blob(&self, download_ref: &str) -> SspromptResult<Vec<u8>> {
        let bytes = self
            .get_ok(download_ref)?
            .bytes()
            .map_err(|e| transport_error(download_ref, e))?;
        Ok(bytes.to_vec())
    }
}

/// Convert one listing element. A malformed element never fails the
/// listing: files missing a digest or link are passed on unresolved so the
/// mirror records them, and unsafe names or unsupported kinds are dropped.
fn to_entry(raw: ContentEntry) -> Option<RemoteTreeEntry> {
    let entry = match raw.kind.as_str() {
        "dir" => RemoteTreeEntry::directory(&raw.name),
        "file" => {
            let digest = raw.sha.as_deref().map(Digest::parse).and_then(Result::ok);
            match (digest, raw.download_url) {
                (Some(digest), Some(url)) => RemoteTreeEntry::file(&raw.name, url, digest),
                _ => {
                    warn!(name = %raw.name, "file entry lacks a valid sha or download_url");
                    RemoteTreeEntry::unresolved_file(&raw.name)
                }
            }
        }
        other => {
            debug!(name = %raw.name, kind = other, "skipping unsupported entry");
            return None;
        }
    };
    entry
        .inspect_err(|e| warn!(error = %e, "skipping listing entry"))
        .ok()
}

fn transport_error(url: &str, e: reqwest::Error) -> SspromptError {
    let reason = if e.is_timeout() {
        "request timed out".to_string()
    } else {
        e.to_string()
    };
    ApplicationError::transport(url, e.status().map(|s| s.as_u16()), reason).into()
}

fn status_error(url: &str, status: StatusCode) -> SspromptError {
    ApplicationError::transport(url, Some(status.as_u16()), status.to_string()).into()
}
