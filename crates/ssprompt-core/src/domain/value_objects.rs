//! Domain value objects: Platform, SectionKind, Digest, RetryPolicy.
//!
//! # Design
//!
//! These are pure value types: equality-by-value, no identity, no I/O.
//! Each one defines its string representation and a `FromStr` parser
//! that reports a [`DomainError`] on bad input.

use crate::domain::error::DomainError;
use serde::{Deserialize, Serialize};
use sha1::{Digest as _, Sha1};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

// ── Platform ─────────────────────────────────────────────────────────────────

/// A hosted hub platform.
///
/// Each platform maps to one backend in the adapters crate's lookup table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Github,
    Gitee,
}

impl Platform {
    pub const ALL: [Platform; 2] = [Platform::Github, Platform::Gitee];

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Github => "github",
            Self::Gitee => "gitee",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Platform {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "github" | "gh" => Ok(Self::Github),
            "gitee" => Ok(Self::Gitee),
            other => Err(DomainError::UnknownPlatform(other.to_string())),
        }
    }
}

// ── SectionKind ───────────────────────────────────────────────────────────────

/// A typed prompt section of a project descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SectionKind {
    Text,
    Json,
    Yaml,
    Python,
}

impl SectionKind {
    /// Every section, in descriptor order.
    pub const ALL: [SectionKind; 4] = [Self::Text, Self::Json, Self::Yaml, Self::Python];

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Json => "json",
            Self::Yaml => "yaml",
            Self::Python => "python",
        }
    }

    /// Key used for this section in the descriptor file.
    pub const fn field_name(&self) -> &'static str {
        match self {
            Self::Text => "text_prompt",
            Self::Json => "json_prompt",
            Self::Yaml => "yaml_prompt",
            Self::Python => "python_prompt",
        }
    }

    /// Whether the section carries a list of named items with dependencies.
    ///
    /// Text prompts are plain files and never declare dependencies.
    pub const fn has_items(&self) -> bool {
        !matches!(self, Self::Text)
    }

    /// Parse a comma-free selector where `all` expands to every section.
    pub fn parse_selector(s: &str) -> Result<Vec<Self>, DomainError> {
        if s.trim().eq_ignore_ascii_case("all") {
            return Ok(Self::ALL.to_vec());
        }
        Ok(vec![s.parse()?])
    }
}

impl fmt::Display for SectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SectionKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" | "text_prompt" | "txt" => Ok(Self::Text),
            "json" | "json_prompt" => Ok(Self::Json),
            "yaml" | "yaml_prompt" | "yml" => Ok(Self::Yaml),
            "python" | "python_prompt" | "py" => Ok(Self::Python),
            other => Err(DomainError::UnknownSection(other.to_string())),
        }
    }
}

// ── Digest ────────────────────────────────────────────────────────────────────

/// Content-addressable blob identifier.
///
/// Computed exactly the way the hub identifies blobs: SHA-1 over a
/// `"blob {len}\0"` header followed by the raw bytes, rendered as 40
/// lowercase hex characters. A local digest can therefore be compared
/// directly with the `sha` the listing API returns.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Digest(String);

impl Digest {
    /// Hex length of a 160-bit digest.
    pub const HEX_LEN: usize = 40;

    /// Digest of a blob's raw bytes.
    pub fn of_blob(bytes: &[u8]) -> Self {
        let mut hasher = Sha1::new();
        hasher.update(format!("blob {}\0", bytes.len()).as_bytes());
        hasher.update(bytes);
        Self(hex::encode(hasher.finalize()))
    }

    /// Parse a hex digest as returned by the hub.
    pub fn parse(s: &str) -> Result<Self, DomainError> {
        let s = s.trim();
        if s.len() != Self::HEX_LEN || !s.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(DomainError::InvalidDigest(s.to_string()));
        }
        Ok(Self(s.to_ascii_lowercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First seven characters, for log lines.
    pub fn short(&self) -> &str {
        &self.0[..7]
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Digest {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Digest {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Digest> for String {
    fn from(value: Digest) -> Self {
        value.0
    }
}

// ── RetryPolicy ───────────────────────────────────────────────────────────────

/// How often and how patiently a network operation is retried.
///
/// A plain value handed to each network-capable operation; there is no
/// process-wide retry state. `max_retries = 3` means up to four attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub delay_ms: u64,
}

impl RetryPolicy {
    pub const DEFAULT_MAX_RETRIES: u32 = 3;
    pub const DEFAULT_DELAY_MS: u64 = 200;

    pub const fn new(max_retries: u32, delay_ms: u64) -> Self {
        Self {
            max_retries,
            delay_ms,
        }
    }

    /// A single attempt, no waiting.
    pub const fn no_retry() -> Self {
        Self::new(0, 0)
    }

    /// Total attempts including the first one.
    pub const fn total_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    pub const fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(Self::DEFAULT_MAX_RETRIES, Self::DEFAULT_DELAY_MS)
    }
}
