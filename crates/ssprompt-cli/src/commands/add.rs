//! Implementation of the `ssprompt add` command.

use tracing::{info, instrument};

use ssprompt_core::{
    application::ApplicationError,
    domain::{DependencySpec, MetaConfig, ProjectDescriptor, SectionKind},
    error::SspromptError,
};

use crate::{
    cli::AddArgs,
    commands::local_project_service,
    config::AppConfig,
    error::CliResult,
    output::OutputManager,
};

/// Version given to a descriptor created by `add`.
const INITIAL_VERSION: &str = "0.0.1";

/// Add dependencies to the local descriptor, creating it when absent.
#[instrument(skip_all, fields(path = %args.path.display()))]
pub fn execute(args: AddArgs, config: AppConfig, output: OutputManager) -> CliResult<()> {
    let kinds = parse_kinds(&args.types)?;
    let specs = args
        .dependencies
        .iter()
        .map(|d| DependencySpec::parse(d))
        .collect::<Result<Vec<_>, _>>()?;

    let service = local_project_service(
        &config,
        config.platform()?,
        &config.hub.main_project,
        None,
        &args.path,
    )?;

    let mut descriptor = match service.local_descriptor() {
        Ok(d) => d,
        Err(SspromptError::Application(ApplicationError::DescriptorNotFound { .. })) => {
            info!("no descriptor yet, creating one");
            ProjectDescriptor::new(MetaConfig::new(
                service.project().project_name(),
                INITIAL_VERSION,
            ))
        }
        Err(e) => return Err(e.into()),
    };

    let added = descriptor.add_dependencies(&kinds, &specs);
    service.save_descriptor(&descriptor)?;

    output.success(&format!(
        "Added {added} dependency entries to {}",
        service.descriptor_path().display()
    ))?;
    Ok(())
}

/// Expand `-t` values; `all` anywhere selects every section.
fn parse_kinds(types: &[String]) -> CliResult<Vec<SectionKind>> {
    let mut kinds = Vec::new();
    for t in types {
        for kind in SectionKind::parse_selector(t)? {
            if !kinds.contains(&kind) {
                kinds.push(kind);
            }
        }
    }
    Ok(kinds)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_expands_and_duplicates_collapse() {
        let kinds = parse_kinds(&["yaml".into(), "all".into()]).unwrap();
        assert_eq!(kinds.len(), SectionKind::ALL.len());
        assert_eq!(kinds[0], SectionKind::Yaml);
    }

    #[test]
    fn unknown_type_is_rejected() {
        assert!(parse_kinds(&["markdown".into()]).is_err());
    }
}
