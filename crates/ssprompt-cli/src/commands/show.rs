//! Implementation of the `ssprompt show` command.

use tracing::instrument;

use ssprompt_core::{
    application::{ApplicationError, ProjectService},
    domain::{MetaConfig, Platform, ProjectDescriptor},
};

use crate::{
    cli::ShowArgs,
    commands::local_project_service,
    config::AppConfig,
    error::CliResult,
    output::OutputManager,
};

/// Print the local descriptor, or with `--remote` the hub's copy.
#[instrument(skip_all, fields(path = %args.path.display(), remote = args.remote))]
pub fn execute(args: ShowArgs, config: AppConfig, output: OutputManager) -> CliResult<()> {
    let platform = match args.platform {
        Some(p) => Platform::from(p),
        None => config.platform()?,
    };
    let main_project = args
        .main_project
        .as_deref()
        .unwrap_or(&config.hub.main_project);
    let service = local_project_service(
        &config,
        platform,
        main_project,
        args.sub_project.as_deref(),
        &args.path,
    )?;

    let descriptor = if args.remote {
        service
            .remote_descriptor(&config.retry_policy())?
            .ok_or_else(|| ApplicationError::HubUnreachable {
                project: service.project().to_string(),
            })?
    } else {
        service.local_descriptor()?
    };

    if output.is_json() {
        output.json(&descriptor)?;
        return Ok(());
    }

    output.header(&service.project().to_string())?;
    print_descriptor(&descriptor, &output)
}

/// Meta block as aligned `key value` lines.
pub(crate) fn print_meta(meta: &MetaConfig, output: &OutputManager) -> CliResult<()> {
    output.field("name", &meta.name)?;
    output.field("version", &meta.version)?;
    if !meta.description.is_empty() {
        output.field("description", &meta.description)?;
    }
    if !meta.author.is_empty() {
        output.field("author", &meta.author.join(", "))?;
    }
    if !meta.tag.is_empty() {
        output.field("tags", &meta.tag.join(", "))?;
    }
    if !meta.llm.is_empty() {
        output.field("llm", &meta.llm.join(", "))?;
    }
    if let Some(license) = &meta.license {
        output.field("license", license)?;
    }
    Ok(())
}

fn print_descriptor(descriptor: &ProjectDescriptor, output: &OutputManager) -> CliResult<()> {
    print_meta(&descriptor.meta, output)?;

    let mut sections = descriptor.sections().peekable();
    if sections.peek().is_some() {
        output.print("")?;
        output.print("Sections:")?;
        for (kind, section) in sections {
            output.field(
                kind.as_str(),
                &format!("{}/ ({} items)", section.dirname, section.list.len()),
            )?;
        }
    }

    let deps = ProjectService::extract_dependencies(descriptor);
    output.print("")?;
    if deps.is_empty() {
        output.print("Dependencies: none")?;
    } else {
        output.print("Dependencies:")?;
        for spec in deps {
            output.field(spec.package(), spec.constraint())?;
        }
    }
    Ok(())
}
