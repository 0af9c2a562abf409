//! Application configuration.
//!
//! [`AppConfig`] is loaded once at startup and passed down by value.  The
//! CLI layer owns config; the core crate never sees it.
//!
//! # Resolution order (highest priority first)
//!
//! 1. CLI flags (handled at the call-site, not here)
//! 2. `GITHUB_ACCESS_KEY` for the hub token
//! 3. Environment variables `SSPROMPT__<SECTION>__<KEY>`
//! 4. Config file (`--config`, or the platform config dir)
//! 5. Built-in defaults (always present)

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context as _;
use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};

use ssprompt_core::domain::{Platform, RetryPolicy};

/// Environment variable holding the hub access token.
pub const TOKEN_ENV: &str = "GITHUB_ACCESS_KEY";

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub hub: HubConfig,
    pub network: NetworkConfig,
    pub index: IndexConfig,
    pub installer: InstallerConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HubConfig {
    /// `github` or `gitee`.
    pub platform: String,
    /// Hub repository, `owner/repo`.
    pub main_project: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    pub max_retries: u32,
    pub retry_delay_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexConfig {
    /// PyPI JSON API root.
    pub url: String,
    /// Index handed to the installer.
    pub mirror: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InstallerConfig {
    pub program: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub no_color: bool,
    /// `auto`, `human`, `plain` or `json`; `--output-format` overrides.
    pub format: String,
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            platform: "github".into(),
            main_project: "ptonlix/PromptHub".into(),
            access_token: None,
            timeout_secs: 30,
        }
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            max_retries: RetryPolicy::DEFAULT_MAX_RETRIES,
            retry_delay_ms: RetryPolicy::DEFAULT_DELAY_MS,
        }
    }
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            url: "https://pypi.org/pypi/".into(),
            mirror: "https://pypi.tuna.tsinghua.edu.cn/simple".into(),
        }
    }
}

impl Default for InstallerConfig {
    fn default() -> Self {
        Self {
            program: "pip".into(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            no_color: false,
            format: "auto".into(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            hub: HubConfig::default(),
            network: NetworkConfig::default(),
            index: IndexConfig::default(),
            installer: InstallerConfig::default(),
            output: OutputConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration, starting from defaults.
    ///
    /// An explicit `config_file` must exist; the default location is
    /// optional.
    pub fn load(config_file: Option<&PathBuf>) -> anyhow::Result<Self> {
        let file = match config_file {
            Some(path) => File::from(path.as_path()).format(FileFormat::Toml).required(true),
            None => File::from(Self::config_path().as_path())
                .format(FileFormat::Toml)
                .required(false),
        };

        let mut cfg: Self = Config::builder()
            .add_source(Config::try_from(&Self::default())?)
            .add_source(file)
            .add_source(
                Environment::with_prefix("SSPROMPT")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .context("reading configuration sources")?
            .try_deserialize()
            .context("invalid configuration")?;

        if let Ok(token) = std::env::var(TOKEN_ENV) {
            if !token.trim().is_empty() {
                cfg.hub.access_token = Some(token);
            }
        }

        cfg.platform().context("hub.platform")?;
        Ok(cfg)
    }

    /// Path to the default configuration file.
    ///
    /// Uses `directories::ProjectDirs` for cross-platform correctness,
    /// falling back to `.ssprompt.toml` in the current directory.
    pub fn config_path() -> PathBuf {
        directories::ProjectDirs::from("com", "ssprompt", "ssprompt")
            .map(|d| d.config_dir().join("config.toml"))
            .unwrap_or_else(|| PathBuf::from(".ssprompt.toml"))
    }

    /// Write this configuration as TOML, without the access token.
    pub fn write_to(&self, path: &Path) -> anyhow::Result<()> {
        let mut sanitized = self.clone();
        sanitized.hub.access_token = None;
        let text = toml::to_string_pretty(&sanitized).context("serialising configuration")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
        std::fs::write(path, text).with_context(|| format!("writing {}", path.display()))
    }

    pub fn platform(&self) -> Result<Platform, ssprompt_core::domain::DomainError> {
        self.hub.platform.parse()
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.network.max_retries, self.network.retry_delay_ms)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.hub.timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_point_at_public_hub() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.hub.main_project, "ptonlix/PromptHub");
        assert_eq!(cfg.platform().unwrap(), Platform::Github);
        assert_eq!(cfg.retry_policy(), RetryPolicy::default());
    }

    #[test]
    fn default_no_color_is_false() {
        assert!(!AppConfig::default().output.no_color);
    }

    #[test]
    fn file_values_override_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[hub]\nplatform = \"gitee\"\n\n[network]\nmax_retries = 5\n",
        )
        .unwrap();

        let cfg = AppConfig::load(Some(&path)).unwrap();
        assert_eq!(cfg.platform().unwrap(), Platform::Gitee);
        assert_eq!(cfg.network.max_retries, 5);
        assert_eq!(cfg.network.retry_delay_ms, RetryPolicy::DEFAULT_DELAY_MS);
        assert_eq!(cfg.installer.program, "pip");
    }

    #[test]
    fn unknown_platform_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[hub]\nplatform = \"sourceforge\"\n").unwrap();
        assert!(AppConfig::load(Some(&path)).is_err());
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let path = PathBuf::from("/definitely/not/here/ssprompt.toml");
        assert!(AppConfig::load(Some(&path)).is_err());
    }

    #[test]
    fn written_config_omits_token() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let mut cfg = AppConfig::default();
        cfg.hub.access_token = Some("secret".into());

        cfg.write_to(&path).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("main_project"));
        assert!(!text.contains("secret"));
    }

    #[test]
    fn config_path_is_not_empty() {
        assert!(!AppConfig::config_path().as_os_str().is_empty());
    }
}
