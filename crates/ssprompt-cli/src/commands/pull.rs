//! Implementation of the `ssprompt pull` command.
//!
//! Responsibility: resolve the hub project from arguments and config, drive
//! the core mirror, and report the outcome. No business logic lives here.

use tracing::{info, instrument, warn};

use ssprompt_core::{
    application::{ApplicationError, DependencyService, MirrorReport, ProjectService},
    domain::{DependencySpec, HubProject, Platform, RetryPolicy},
};

use crate::{
    cli::PullArgs,
    commands::{dependency_service, project_service, run_dependencies, show},
    config::AppConfig,
    error::{CliError, CliResult},
    output::OutputManager,
};

/// Execute the `ssprompt pull` command.
///
/// 1. Check that the repository exists on the hub
/// 2. Show the remote descriptor's meta, when reachable
/// 3. Mirror the project tree
/// 4. Install dependencies unless `--no-install`, best effort
///
/// The exit status reflects the mirror alone.
#[instrument(skip_all, fields(project = %args.project))]
pub fn execute(args: PullArgs, config: AppConfig, output: OutputManager) -> CliResult<()> {
    let platform = match args.platform {
        Some(p) => Platform::from(p),
        None => config.platform()?,
    };
    let policy = retry_policy(&args, &config);
    let project = HubProject::new(&args.project, args.sub_project.as_deref())?;
    let service = project_service(&config, platform, project, &args.path, !args.no_dir)?;

    if !service.check_project_exists(&policy)? {
        return Err(ApplicationError::ProjectNotFound {
            project: service.project().main_project().to_string(),
        }
        .into());
    }

    match service.remote_descriptor(&policy)? {
        Some(descriptor) if !output.is_json() => {
            output.header(&format!("{} on {}", service.project(), platform))?;
            show::print_meta(&descriptor.meta, &output)?;
        }
        Some(_) => {}
        None => warn!("remote descriptor unavailable, pulling without metadata"),
    }

    let spinner = output.spinner(&format!("Pulling {}", service.project()));
    let report = service.pull(&policy);
    spinner.finish_and_clear();
    let report = report?;

    print_report(&service, &report, &output)?;

    // Installer trouble is reported but never changes the pull's outcome.
    if !args.no_install {
        if let Err(e) = install_local_dependencies(&service, &config, &output) {
            warn!(error = %e, "dependency installation failed");
            output.warning(&format!("Dependencies not installed: {e}"))?;
        }
    }

    if !report.is_complete() {
        return Err(CliError::IncompletePull {
            summary: report.summary(),
        });
    }

    info!("pull complete");
    Ok(())
}

/// Flags override config; config overrides built-in defaults.
fn retry_policy(args: &PullArgs, config: &AppConfig) -> RetryPolicy {
    let base = config.retry_policy();
    RetryPolicy::new(
        args.retries.unwrap_or(base.max_retries),
        args.retry_delay.unwrap_or(base.delay_ms),
    )
}

fn print_report(
    service: &ProjectService,
    report: &MirrorReport,
    output: &OutputManager,
) -> CliResult<()> {
    if output.is_json() {
        let failures: Vec<_> = report
            .failures
            .iter()
            .map(|f| {
                serde_json::json!({
                    "remote_path": f.remote_path,
                    "local_path": f.local_path,
                    "kind": f.kind.to_string(),
                    "reason": f.reason.to_string(),
                })
            })
            .collect();
        output.json(&serde_json::json!({
            "project": service.project().to_string(),
            "destination": service.save_dir(),
            "downloaded": report.downloaded.len(),
            "skipped": report.skipped.len(),
            "directories": report.directories,
            "complete": report.is_complete(),
            "summary": report.summary(),
            "failures": failures,
        }))?;
        return Ok(());
    }

    for failure in &report.failures {
        output.error(&format!("{}: {}", failure.remote_path, failure.reason))?;
    }
    let line = format!("{} -> {}", report.summary(), service.save_dir().display());
    if report.is_complete() {
        output.success(&line)?;
    } else {
        output.warning(&line)?;
    }
    Ok(())
}

/// Install what the freshly mirrored descriptor declares.
///
/// A project without a descriptor has nothing to install.
fn install_local_dependencies(
    service: &ProjectService,
    config: &AppConfig,
    output: &OutputManager,
) -> CliResult<()> {
    let descriptor = match service.local_descriptor() {
        Ok(d) => d,
        Err(e) if matches!(e.category(), ssprompt_core::error::ErrorCategory::NotFound) => {
            warn!(error = %e, "no descriptor, skipping dependency installation");
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };
    let specs = ProjectService::extract_dependencies(&descriptor);
    install_best_effort(&dependency_service(config)?, &specs, output)
}

fn install_best_effort(
    deps: &DependencyService,
    specs: &[DependencySpec],
    output: &OutputManager,
) -> CliResult<()> {
    let report = run_dependencies(deps, specs, output)?;
    for (spec, outcome) in report.failures() {
        warn!(dependency = %spec, %outcome, "dependency left unsatisfied");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    use crate::cli::{Cli, Commands};

    fn pull_args(argv: &[&str]) -> PullArgs {
        let mut full = vec!["ssprompt", "pull"];
        full.extend_from_slice(argv);
        match Cli::parse_from(full).command {
            Commands::Pull(args) => args,
            other => panic!("expected pull, got {other:?}"),
        }
    }

    #[test]
    fn retry_flags_override_config() {
        let mut config = AppConfig::default();
        config.network.max_retries = 7;
        config.network.retry_delay_ms = 50;

        let policy = retry_policy(&pull_args(&["a/b", "--retries", "1"]), &config);
        assert_eq!(policy, RetryPolicy::new(1, 50));

        let policy = retry_policy(&pull_args(&["a/b"]), &config);
        assert_eq!(policy, RetryPolicy::new(7, 50));
    }

    #[test]
    fn unsatisfied_dependencies_do_not_fail_the_pull() {
        use crate::commands::tests::{failing_dependency_service, quiet_output};

        let specs = [
            DependencySpec::new("langchain", "^1.0"),
            DependencySpec::new("openai", "^1.0"),
        ];
        install_best_effort(&failing_dependency_service(), &specs, &quiet_output()).unwrap();
    }
}
