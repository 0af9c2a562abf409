//! Command handlers.
//!
//! Each handler translates parsed arguments into core service calls and
//! renders the result. Adapter wiring shared between handlers lives here.

pub mod add;
pub mod completions;
pub mod config;
pub mod deps;
pub mod pull;
pub mod show;

use std::path::{Path, PathBuf};

use ssprompt_adapters::{LocalFilesystem, PipInstaller, PypiIndex, YamlDescriptorCodec, backend_for};
use ssprompt_core::{
    application::{DependencyReport, DependencyService, ProjectService},
    domain::{DependencySpec, HubProject, Platform},
};

use crate::{
    config::AppConfig,
    error::{CliError, CliResult, IntoCli},
    output::OutputManager,
};

/// Wire a [`ProjectService`] against the real hub and disk.
pub(crate) fn project_service(
    config: &AppConfig,
    platform: Platform,
    project: HubProject,
    base: &Path,
    dir_flag: bool,
) -> CliResult<ProjectService> {
    let backend = backend_for(platform, config.hub.access_token.clone(), config.timeout())?;
    Ok(ProjectService::new(
        backend,
        Box::new(LocalFilesystem::new()),
        Box::new(YamlDescriptorCodec::new()),
        project,
        base,
        dir_flag,
    ))
}

/// Service for an existing local project directory.
///
/// The directory name doubles as the sub-project name, so the descriptor is
/// `<dir>/<dir>.yaml`.
pub(crate) fn local_project_service(
    config: &AppConfig,
    platform: Platform,
    main_project: &str,
    sub_project: Option<&str>,
    path: &Path,
) -> CliResult<ProjectService> {
    let dir = resolve_dir(path)?;
    let sub = match sub_project {
        Some(sub) => sub.to_string(),
        None => dir_name(&dir)?,
    };
    let project = HubProject::new(main_project, Some(&sub))?;
    project_service(config, platform, project, &dir, false)
}

/// Wire a [`DependencyService`] against PyPI and pip.
pub(crate) fn dependency_service(config: &AppConfig) -> CliResult<DependencyService> {
    let index = PypiIndex::new(&config.index.url, config.timeout())?;
    let installer = PipInstaller::new(
        config.installer.program.clone(),
        Some(config.index.mirror.clone()),
    );
    Ok(DependencyService::new(Box::new(index), Box::new(installer)))
}

/// Absolute form of `path`, with `.` and `..` resolved.
fn resolve_dir(path: &Path) -> CliResult<PathBuf> {
    std::fs::canonicalize(path).with_cli_context(|| format!("resolving {}", path.display()))
}

fn dir_name(dir: &Path) -> CliResult<String> {
    dir.file_name()
        .and_then(|n| n.to_str())
        .map(str::to_owned)
        .ok_or_else(|| CliError::InvalidInput {
            message: format!("{} has no usable directory name", dir.display()),
            source: None,
        })
}

/// Resolve and install `specs`, printing one outcome line per spec.
///
/// Installer failures are part of the returned report, never an `Err`.
pub(crate) fn run_dependencies(
    service: &DependencyService,
    specs: &[DependencySpec],
    output: &OutputManager,
) -> CliResult<DependencyReport> {
    if specs.is_empty() && !output.is_json() {
        output.info("No dependencies declared")?;
        return Ok(DependencyReport::default());
    }

    let spinner = output.spinner(&format!("Resolving {} dependencies", specs.len()));
    let report = service.ensure(specs);
    spinner.finish_and_clear();

    if output.is_json() {
        let entries: Vec<_> = report
            .entries
            .iter()
            .map(|(spec, outcome)| {
                serde_json::json!({
                    "package": spec.package(),
                    "constraint": spec.constraint(),
                    "ok": outcome.is_ok(),
                    "outcome": outcome.to_string(),
                })
            })
            .collect();
        output.json(&entries)?;
    } else {
        for (spec, outcome) in &report.entries {
            let line = format!("{spec}: {outcome}");
            if outcome.is_ok() {
                output.success(&line)?;
            } else {
                output.error(&line)?;
            }
        }
    }
    Ok(report)
}

/// [`run_dependencies`], failing when any spec was left unsatisfied.
pub(crate) fn install_dependencies(
    service: &DependencyService,
    specs: &[DependencySpec],
    output: &OutputManager,
) -> CliResult<()> {
    let report = run_dependencies(service, specs, output)?;
    let failed = report.failures().count();
    if failed > 0 {
        return Err(CliError::DependenciesUnsatisfied {
            failed,
            total: report.entries.len(),
        });
    }
    Ok(())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use ssprompt_core::{
        application::{ApplicationError, PackageIndex, PackageInstaller, PackageVersions},
        error::SspromptResult,
    };

    use crate::cli::global::{GlobalArgs, OutputFormat};

    /// Index that publishes every package at `1.0.0`.
    struct OneVersionIndex;

    impl PackageIndex for OneVersionIndex {
        fn package_exists<'a>(&self, _: &str, _: Option<&'a str>) -> SspromptResult<bool> {
            Ok(true)
        }

        fn available_versions(&self, _: &str) -> SspromptResult<PackageVersions> {
            Ok(PackageVersions {
                latest: "1.0.0".into(),
                all: vec!["1.0.0".into()],
            })
        }
    }

    /// Installer with nothing installed that fails every install.
    struct BrokenInstaller;

    impl PackageInstaller for BrokenInstaller {
        fn installed_version(&self, _: &str) -> SspromptResult<Option<String>> {
            Ok(None)
        }

        fn install<'a>(&self, name: &str, _: Option<&'a str>) -> SspromptResult<()> {
            Err(ApplicationError::InstallFailed {
                package: name.into(),
                reason: "exit status 1".into(),
            }
            .into())
        }
    }

    pub(crate) fn failing_dependency_service() -> DependencyService {
        DependencyService::new(Box::new(OneVersionIndex), Box::new(BrokenInstaller))
    }

    pub(crate) fn quiet_output() -> OutputManager {
        let args = GlobalArgs {
            verbose: 0,
            quiet: true,
            no_color: true,
            config: None,
            output_format: OutputFormat::Plain,
        };
        OutputManager::new(&args, &AppConfig::default())
    }

    #[test]
    fn failed_install_is_reported_not_raised() {
        let specs = [DependencySpec::new("langchain", "^1.0")];
        let report = run_dependencies(&failing_dependency_service(), &specs, &quiet_output())
            .unwrap();
        assert_eq!(report.failures().count(), 1);
    }

    #[test]
    fn strict_install_fails_on_unsatisfied_spec() {
        let specs = [DependencySpec::new("langchain", "^1.0")];
        let err = install_dependencies(&failing_dependency_service(), &specs, &quiet_output())
            .unwrap_err();
        assert!(matches!(
            err,
            CliError::DependenciesUnsatisfied { failed: 1, total: 1 }
        ));
    }

    #[test]
    fn dir_name_of_resolved_tempdir() {
        let tmp = tempfile::tempdir().unwrap();
        let project = tmp.path().join("chatbot");
        std::fs::create_dir(&project).unwrap();

        let dir = resolve_dir(&project.join(".")).unwrap();
        assert_eq!(dir_name(&dir).unwrap(), "chatbot");
    }

    #[test]
    fn missing_dir_is_io_error() {
        let err = resolve_dir(Path::new("/definitely/not/here")).unwrap_err();
        assert!(matches!(err, CliError::IoError { .. }));
    }

    #[test]
    fn local_service_uses_dir_name_descriptor() {
        let tmp = tempfile::tempdir().unwrap();
        let project = tmp.path().join("chatbot");
        std::fs::create_dir(&project).unwrap();

        let service = local_project_service(
            &AppConfig::default(),
            Platform::Github,
            "ptonlix/PromptHub",
            None,
            &project,
        )
        .unwrap();
        assert!(service.descriptor_path().ends_with("chatbot/chatbot.yaml"));
    }
}
