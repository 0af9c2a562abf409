//! `ssprompt config`: inspect and initialise configuration.

use crate::{
    cli::ConfigCommands,
    config::AppConfig,
    error::{CliError, CliResult, IntoCli},
    output::OutputManager,
};

/// Dispatch to the correct config subcommand.
pub fn execute(cmd: ConfigCommands, config: AppConfig, output: OutputManager) -> CliResult<()> {
    match cmd {
        ConfigCommands::Get { key } => {
            let value = get_config_value(&config, &key)?;
            output.print(&value)?;
        }

        ConfigCommands::List => {
            if output.is_json() {
                output.json(&redacted(&config))?;
                return Ok(());
            }
            output.header("Current Configuration:")?;
            let serialised =
                toml::to_string_pretty(&redacted(&config)).map_err(|e| CliError::ConfigError {
                    message: format!("Failed to serialise config: {e}"),
                    source: Some(Box::new(e)),
                })?;
            output.print(&serialised)?;
        }

        ConfigCommands::Path => {
            output.print(&AppConfig::config_path().display().to_string())?;
        }

        ConfigCommands::Init { force } => {
            let path = AppConfig::config_path();
            if path.exists() && !force {
                return Err(CliError::ConfigExists { path });
            }
            config
                .write_to(&path)
                .with_cli_context(|| "writing configuration")?;
            output.success(&format!("Wrote {}", path.display()))?;
        }
    }

    Ok(())
}

// ── helpers ───────────────────────────────────────────────────────────────────

/// Copy of `config` safe to print.
fn redacted(config: &AppConfig) -> AppConfig {
    let mut copy = config.clone();
    if copy.hub.access_token.is_some() {
        copy.hub.access_token = Some("********".into());
    }
    copy
}

fn get_config_value(config: &AppConfig, key: &str) -> CliResult<String> {
    let value = match key {
        "hub.platform" => config.hub.platform.clone(),
        "hub.main_project" => config.hub.main_project.clone(),
        "hub.access_token" => redacted(config).hub.access_token.unwrap_or_default(),
        "hub.timeout_secs" => config.hub.timeout_secs.to_string(),
        "network.max_retries" => config.network.max_retries.to_string(),
        "network.retry_delay_ms" => config.network.retry_delay_ms.to_string(),
        "index.url" => config.index.url.clone(),
        "index.mirror" => config.index.mirror.clone(),
        "installer.program" => config.installer.program.clone(),
        "output.no_color" => config.output.no_color.to_string(),
        "output.format" => config.output.format.clone(),
        _ => return Err(CliError::UnknownConfigKey { key: key.into() }),
    };
    Ok(value)
}

// ── tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;

    #[test]
    fn get_known_key() {
        let cfg = AppConfig::default();
        assert_eq!(get_config_value(&cfg, "hub.platform").unwrap(), "github");
        assert_eq!(get_config_value(&cfg, "network.max_retries").unwrap(), "3");
    }

    #[test]
    fn get_unknown_key_is_error() {
        let cfg = AppConfig::default();
        assert!(matches!(
            get_config_value(&cfg, "does.not.exist"),
            Err(CliError::UnknownConfigKey { .. })
        ));
    }

    #[test]
    fn token_is_never_printed() {
        let mut cfg = AppConfig::default();
        cfg.hub.access_token = Some("ghp_secret".into());
        assert_eq!(get_config_value(&cfg, "hub.access_token").unwrap(), "********");
        assert!(!toml::to_string(&redacted(&cfg)).unwrap().contains("ghp_secret"));
    }
}
