//! pip-driven installer.

use std::process::{Command, Output};

use tracing::{debug, instrument};

use ssprompt_core::{
    application::{ApplicationError, ports::PackageInstaller},
    error::SspromptResult,
};

/// Installs packages by running pip as a subprocess.
#[derive(Debug, Clone)]
pub struct PipInstaller {
    program: String,
    index_url: Option<String>,
}

impl PipInstaller {
    /// `program` is the pip executable; `index_url` is passed as `-i` when set.
    pub fn new(program: impl Into<String>, index_url: Option<String>) -> Self {
        Self {
            program: program.into(),
            index_url: index_url.filter(|u| !u.trim().is_empty()),
        }
    }

    /// Spawn the installer; `package` names the failure if it cannot start.
    fn run(&self, package: &str, args: &[&str]) -> SspromptResult<Output> {
        debug!(program = %self.program, ?args, "spawning");
        Command::new(&self.program)
            .args(args)
            .output()
            .map_err(|e| {
                ApplicationError::InstallFailed {
                    package: package.to_string(),
                    reason: format!("cannot run {}: {}", self.program, e),
                }
                .into()
            })
    }

    fn install_args(&self, name: &str, version: Option<&str>) -> Vec<String> {
        let requirement = match version {
            Some(v) => format!("{name}=={v}"),
            None => name.to_string(),
        };
        let mut args = vec!["install".to_string(), requirement];
        if let Some(index) = &self.index_url {
            args.push("-i".to_string());
            args.push(index.clone());
        }
        args
    }
}

impl Default for PipInstaller {
    fn default() -> Self {
        Self::new("pip", None)
    }
}

/// Pull the `Version:` field out of `pip show` output.
fn parse_show_version(stdout: &str) -> Option<String> {
    stdout
        .lines()
        .find_map(|line| line.strip_prefix("Version:"))
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl PackageInstaller for PipInstaller {
    fn installed_version(&self, name: &str) -> SspromptResult<Option<String>> {
        let output = self.run(name, &["show", name])?;
        if !output.status.success() {
            // pip show exits non-zero for packages that are not installed.
            return Ok(None);
        }
        Ok(parse_show_version(&String::from_utf8_lossy(&output.stdout)))
    }

    #[instrument(skip(self))]
    fn install<'a>(&self, name: &str, version: Option<&'a str>) -> SspromptResult<()> {
        let args = self.install_args(name, version);
        let arg_refs: Vec<&str> = args.iter().map(String::as_str).collect();
        let output = self.run(name, &arg_refs)?;
        if output.status.success() {
            return Ok(());
        }
        let stderr = String::from_utf8_lossy(&output.stderr);
        debug!(%stderr, "pip failed");
        Err(ApplicationError::InstallFailed {
            package: name.to_string(),
            reason: format!(
                "{} exited with {}: {}",
                self.program,
                output.status,
                stderr.lines().last().unwrap_or_default()
            ),
        }
        .into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn install_pins_version_and_mirror() {
        let pip = PipInstaller::new("pip", Some("https://mirror/simple".into()));
        assert_eq!(
            pip.install_args("langchain", Some("0.0.266")),
            ["install", "langchain==0.0.266", "-i", "https://mirror/simple"]
        );
        assert_eq!(PipInstaller::default().install_args("openai", None), ["install", "openai"]);
    }

    #[test]
    fn show_output_yields_version() {
        let out = "Name: langchain\nVersion: 0.0.266\nSummary: Building applications\n";
        assert_eq!(parse_show_version(out), Some("0.0.266".into()));
        assert_eq!(parse_show_version("WARNING: Package(s) not found: x\n"), None);
    }

    #[test]
    fn missing_program_is_an_install_error() {
        let pip = PipInstaller::new("ssprompt-no-such-pip-binary", None);
        assert!(pip.installed_version("langchain").is_err());
        assert!(pip.install("langchain", None).is_err());
    }

    #[test]
    fn spawn_failure_names_the_package_not_the_mirror() {
        let pip = PipInstaller::new("ssprompt-no-such-pip-binary", Some("https://mirror/simple".into()));
        let err = pip.install("langchain", Some("0.1.0")).unwrap_err();
        assert!(matches!(
            err,
            ssprompt_core::error::SspromptError::Application(ApplicationError::InstallFailed {
                ref package, ..
            }) if package == "langchain"
        ));
    }
}
