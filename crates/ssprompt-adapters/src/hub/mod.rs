//! Hub backends.
//!
//! GitHub and Gitee expose the same "repository contents" API shape; they
//! differ in base URL and in how the access token is attached.

mod contents_api;
mod memory;

use std::time::Duration;

use ssprompt_core::{application::ports::HubBackend, domain::Platform, error::SspromptResult};

pub use contents_api::{ContentsApiHub, TokenPlacement};
pub use memory::MemoryHub;

/// Build the backend for `platform`.
pub fn backend_for(
    platform: Platform,
    token: Option<String>,
    timeout: Duration,
) -> SspromptResult<Box<dyn HubBackend>> {
    Ok(Box::new(ContentsApiHub::new(platform, token, timeout)?))
}
