//! Implementation of the `ssprompt deps` command.

use tracing::{debug, instrument};

use ssprompt_core::application::{DependencyStatus, ProjectService};

use crate::{
    cli::DepsArgs,
    commands::{dependency_service, install_dependencies, local_project_service},
    config::AppConfig,
    error::CliResult,
    output::OutputManager,
};

/// List the local project's dependencies, installing them with `--install`.
#[instrument(skip_all, fields(path = %args.path.display(), install = args.install))]
pub fn execute(args: DepsArgs, config: AppConfig, output: OutputManager) -> CliResult<()> {
    let service = local_project_service(
        &config,
        config.platform()?,
        &config.hub.main_project,
        None,
        &args.path,
    )?;
    let descriptor = service.local_descriptor()?;
    let specs = ProjectService::extract_dependencies(&descriptor);
    debug!(count = specs.len(), "dependencies extracted");

    let deps = dependency_service(&config)?;
    if args.install {
        return install_dependencies(&deps, &specs, &output);
    }

    let statuses = deps.status(&specs)?;
    if output.is_json() {
        let rows: Vec<_> = statuses
            .iter()
            .map(|s| {
                serde_json::json!({
                    "package": s.spec.package(),
                    "constraint": s.spec.constraint(),
                    "installed": s.installed,
                    "satisfied": s.satisfied,
                })
            })
            .collect();
        output.json(&rows)?;
        return Ok(());
    }

    if statuses.is_empty() {
        output.info("No dependencies declared")?;
    }
    for status in &statuses {
        let line = status_line(status);
        if status.satisfied {
            output.success(&line)?;
        } else {
            output.warning(&line)?;
        }
    }
    Ok(())
}

fn status_line(status: &DependencyStatus) -> String {
    match (&status.installed, status.satisfied) {
        (Some(v), true) => format!("{} (installed {v})", status.spec),
        (Some(v), false) => format!("{} (installed {v}, incompatible)", status.spec),
        (None, _) => format!("{} (not installed)", status.spec),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ssprompt_core::domain::DependencySpec;

    fn status(installed: Option<&str>, satisfied: bool) -> DependencyStatus {
        DependencyStatus {
            spec: DependencySpec::new("langchain", "^0.0.266"),
            installed: installed.map(str::to_owned),
            satisfied,
        }
    }

    #[test]
    fn status_lines_describe_state() {
        assert_eq!(
            status_line(&status(Some("0.0.270"), true)),
            "langchain@^0.0.266 (installed 0.0.270)"
        );
        assert!(status_line(&status(Some("0.1.0"), false)).contains("incompatible"));
        assert!(status_line(&status(None, false)).ends_with("(not installed)"));
    }
}
