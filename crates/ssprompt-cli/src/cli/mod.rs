//! CLI argument definitions using the clap derive API.
//!
//! This module is the *only* place that knows about argument names, aliases,
//! help text, and value enums.  No business logic lives here.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use ssprompt_core::domain::Platform;

pub mod global;
pub use global::{GlobalArgs, OutputFormat};

/// Dependency added by `ssprompt add` when none is given.
pub const DEFAULT_DEPENDENCY: &str = "langchain@^0.0.266";

// ── Top-level CLI ─────────────────────────────────────────────────────────────

/// Main CLI entry-point.
#[derive(Debug, Parser)]
#[command(
    name    = "ssprompt",
    bin_name = "ssprompt",
    version  = env!("CARGO_PKG_VERSION"),
    author   = env!("CARGO_PKG_AUTHORS"),
    about    = "Pull prompt projects from a shared hub",
    long_about = "ssprompt mirrors prompt projects from a git-hosted hub \
                  and keeps their Python dependencies installed.",
    after_help = "EXAMPLES:\n\
        \x20 ssprompt pull ptonlix/PromptHub -s chatbot\n\
        \x20 ssprompt show --remote -s chatbot\n\
        \x20 ssprompt deps --install\n\
        \x20 ssprompt add -t yaml -d openai@latest\n\
        \x20 ssprompt completions bash > /usr/share/bash-completion/completions/ssprompt",
    arg_required_else_help = true,
    subcommand_required    = true,
)]
pub struct Cli {
    /// Flags available on every subcommand.
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

// ── Subcommands ───────────────────────────────────────────────────────────────

/// All available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Mirror a hub project and install its dependencies.
    #[command(
        about = "Pull a project from the hub",
        after_help = "EXAMPLES:\n\
            \x20 ssprompt pull ptonlix/PromptHub -s chatbot\n\
            \x20 ssprompt pull ptonlix/PromptHub ./prompts -s chatbot --no-install\n\
            \x20 ssprompt pull owner/repo -p gitee --retries 5"
    )]
    Pull(PullArgs),

    /// Print a project's descriptor summary.
    #[command(
        about = "Show project metadata and dependencies",
        after_help = "EXAMPLES:\n\
            \x20 ssprompt show\n\
            \x20 ssprompt show ./chatbot\n\
            \x20 ssprompt show --remote -s chatbot"
    )]
    Show(ShowArgs),

    /// Report, and optionally install, the local project's dependencies.
    #[command(
        visible_alias = "install",
        about = "Check or install dependencies",
        after_help = "EXAMPLES:\n\
            \x20 ssprompt deps\n\
            \x20 ssprompt deps ./chatbot --install"
    )]
    Deps(DepsArgs),

    /// Add dependencies to the local descriptor.
    #[command(
        about = "Add dependencies to the project descriptor",
        after_help = "EXAMPLES:\n\
            \x20 ssprompt add -d openai@latest\n\
            \x20 ssprompt add -t yaml -t python -d langchain@^0.0.266 -d tiktoken@~0.4.0"
    )]
    Add(AddArgs),

    /// Generate shell completion scripts.
    #[command(
        about = "Generate shell completions",
        after_help = "EXAMPLES:\n\
            \x20 ssprompt completions bash > ~/.local/share/bash-completion/completions/ssprompt\n\
            \x20 ssprompt completions zsh  > ~/.zfunc/_ssprompt\n\
            \x20 ssprompt completions fish > ~/.config/fish/completions/ssprompt.fish"
    )]
    Completions(CompletionsArgs),

    /// Manage the ssprompt configuration.
    #[command(
        about = "Configuration management",
        subcommand,
        after_help = "EXAMPLES:\n\
            \x20 ssprompt config get hub.platform\n\
            \x20 ssprompt config list\n\
            \x20 ssprompt config init"
    )]
    Config(ConfigCommands),
}

// ── pull ──────────────────────────────────────────────────────────────────────

/// Arguments for `ssprompt pull`.
#[derive(Debug, Args)]
pub struct PullArgs {
    /// Hub repository, `owner/repo`.
    #[arg(value_name = "PROJECT", help = "Hub repository (owner/repo)")]
    pub project: String,

    /// Where to save the project.
    #[arg(value_name = "PATH", default_value = ".", help = "Destination directory")]
    pub path: PathBuf,

    /// Sub-project directory inside the repository.
    #[arg(
        short = 's',
        long = "sub",
        value_name = "SUB",
        help = "Sub-project directory inside the repository"
    )]
    pub sub_project: Option<String>,

    /// Hub platform; defaults to `hub.platform` from config.
    #[arg(short = 'p', long = "platform", value_enum, help = "Hub platform")]
    pub platform: Option<PlatformArg>,

    /// Save directly into PATH instead of PATH/<project>.
    #[arg(long = "no-dir", help = "Save into PATH instead of PATH/<project>")]
    pub no_dir: bool,

    /// Skip dependency installation.
    #[arg(long = "no-install", help = "Do not install dependencies")]
    pub no_install: bool,

    /// Retries per network request; defaults to `network.max_retries`.
    #[arg(long = "retries", value_name = "N", help = "Retries per request")]
    pub retries: Option<u32>,

    /// Delay between retries in milliseconds.
    #[arg(long = "retry-delay", value_name = "MS", help = "Delay between retries (ms)")]
    pub retry_delay: Option<u64>,
}

// ── show ──────────────────────────────────────────────────────────────────────

/// Arguments for `ssprompt show`.
#[derive(Debug, Args)]
pub struct ShowArgs {
    /// Project directory.
    #[arg(value_name = "PATH", default_value = ".", help = "Project directory")]
    pub path: PathBuf,

    /// Read the descriptor from the hub instead of disk.
    #[arg(short = 'r', long = "remote", help = "Fetch the descriptor from the hub")]
    pub remote: bool,

    /// Hub repository; defaults to `hub.main_project`.
    #[arg(
        short = 'm',
        long = "main",
        value_name = "PROJECT",
        help = "Hub repository (owner/repo)"
    )]
    pub main_project: Option<String>,

    /// Sub-project; defaults to the directory name of PATH.
    #[arg(short = 's', long = "sub", value_name = "SUB", help = "Sub-project name")]
    pub sub_project: Option<String>,

    /// Hub platform; defaults to `hub.platform` from config.
    #[arg(short = 'p', long = "platform", value_enum, help = "Hub platform")]
    pub platform: Option<PlatformArg>,
}

// ── deps ──────────────────────────────────────────────────────────────────────

/// Arguments for `ssprompt deps`.
#[derive(Debug, Args)]
pub struct DepsArgs {
    /// Project directory.
    #[arg(value_name = "PATH", default_value = ".", help = "Project directory")]
    pub path: PathBuf,

    /// Install anything missing or incompatible.
    #[arg(short = 'i', long = "install", help = "Install missing dependencies")]
    pub install: bool,
}

// ── add ───────────────────────────────────────────────────────────────────────

/// Arguments for `ssprompt add`.
#[derive(Debug, Args)]
pub struct AddArgs {
    /// Project directory.
    #[arg(value_name = "PATH", default_value = ".", help = "Project directory")]
    pub path: PathBuf,

    /// Sections to add to; `all` selects every list-bearing section.
    #[arg(
        short = 't',
        long = "type",
        value_name = "TYPE",
        default_value = "all",
        help = "Section: text, json, yaml, python or all (repeatable)"
    )]
    pub types: Vec<String>,

    /// Dependencies in `name@constraint` form.
    #[arg(
        short = 'd',
        long = "dependency",
        value_name = "NAME@CONSTRAINT",
        default_value = DEFAULT_DEPENDENCY,
        help = "Dependency as name@constraint (repeatable)"
    )]
    pub dependencies: Vec<String>,
}

// ── completions ───────────────────────────────────────────────────────────────

/// Arguments for `ssprompt completions`.
#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Target shell.
    #[arg(value_enum, help = "Shell to generate completions for")]
    pub shell: Shell,
}

/// Supported shells for completion generation.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}

// ── config subcommands ────────────────────────────────────────────────────────

/// Subcommands for `ssprompt config`.
#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Print the value of a configuration key.
    Get {
        /// Dotted key path, e.g. `hub.platform`.
        key: String,
    },
    /// Print all configuration values.
    List,
    /// Print the path to the default configuration file.
    Path,
    /// Write the current configuration to the default location.
    Init {
        /// Overwrite an existing file.
        #[arg(short = 'f', long = "force", help = "Overwrite existing configuration")]
        force: bool,
    },
}

// ── value enums ───────────────────────────────────────────────────────────────

/// Hub platforms selectable on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
#[value(rename_all = "lowercase")]
pub enum PlatformArg {
    Github,
    Gitee,
}

impl From<PlatformArg> for Platform {
    fn from(arg: PlatformArg) -> Self {
        match arg {
            PlatformArg::Github => Platform::Github,
            PlatformArg::Gitee => Platform::Gitee,
        }
    }
}

// ── tests ─────────────────────────────────────────────────────────────────────
