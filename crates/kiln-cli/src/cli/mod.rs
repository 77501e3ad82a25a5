//! CLI argument definitions using the clap derive API.
//!
//! This module is the *only* place that knows about argument names, aliases,
//! help text, and value enums.  No business logic lives here.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

pub mod global;
pub use global::{GlobalArgs, OutputFormat};

// ── Top-level CLI ─────────────────────────────────────────────────────────────

/// Main CLI entry-point.
#[derive(Debug, Parser)]
#[command(
    name    = "kiln",
    bin_name = "kiln",
    version  = env!("CARGO_PKG_VERSION"),
    author   = env!("CARGO_PKG_AUTHORS"),
    about    = "Module scaffolding for Zend-style PHP projects",
    long_about = "Kiln generates entities, repositories, services and REST \
                  controllers for a module, registers them in the module \
                  configuration, and adds actions to existing controllers \
                  without disturbing hand-written code.",
    after_help = "EXAMPLES:\n\
        \x20 kiln create project blog\n\
        \x20 kiln create module  Blog\n\
        \x20 kiln create full    post --module Blog\n\
        \x20 kiln create action  archive --controller post --module Blog",
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
    /// Generate a project, module or module artifact.
    #[command(
        subcommand,
        visible_alias = "c",
        about = "Generate code",
        after_help = "EXAMPLES:\n\
            \x20 kiln create entity     user --module Blog --no-repo\n\
            \x20 kiln create controller post --module Blog --path ./app"
    )]
    Create(CreateCommands),

    /// Initialise a Kiln configuration file.
    #[command(
        about = "Initialise configuration",
        after_help = "EXAMPLES:\n\
            \x20 kiln init           # default location\n\
            \x20 kiln init --force   # overwrite an existing file\n\
            \x20 kiln -c kiln.toml init"
    )]
    Init(InitArgs),

    /// Generate shell completion scripts.
    #[command(
        about = "Generate shell completions",
        after_help = "EXAMPLES:\n\
            \x20 kiln completions bash > ~/.local/share/bash-completion/completions/kiln\n\
            \x20 kiln completions zsh  > ~/.zfunc/_kiln\n\
            \x20 kiln completions fish > ~/.config/fish/completions/kiln.fish"
    )]
    Completions(CompletionsArgs),

    /// Inspect the Kiln configuration.
    #[command(
        about = "Configuration management",
        subcommand,
        after_help = "EXAMPLES:\n\
            \x20 kiln config get defaults.module\n\
            \x20 kiln config list"
    )]
    Config(ConfigCommands),
}

// ── create ────────────────────────────────────────────────────────────────────

/// Subcommands for `kiln create`.
#[derive(Debug, Subcommand)]
pub enum CreateCommands {
    /// Create a new project from the application skeleton.
    Project(ProjectArgs),

    /// Create a module and register it in the application config.
    Module(ModuleArgs),

    /// Create an entity and, unless `--no-repo`, its repository.
    Entity(EntityArgs),

    /// Create a REST controller and register it in the module config.
    Controller(ControllerArgs),

    /// Add an action to an existing controller.
    Action(ActionArgs),

    /// Entity, repository, service and controller in one go.
    Full(FullArgs),
}

/// Where to generate: the module and the project root.
#[derive(Debug, Args)]
pub struct TargetArgs {
    /// Module receiving the artifact; falls back to `defaults.module`.
    #[arg(short = 'm', long = "module", value_name = "MODULE")]
    pub module: Option<String>,

    /// Project root (the directory holding `module/` and `config/`).
    #[arg(short = 'p', long = "path", value_name = "DIR")]
    pub path: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct ProjectArgs {
    /// Directory to create.
    #[arg(value_name = "PATH")]
    pub path: PathBuf,

    /// Skeleton directory to use instead of the configured one.
    #[arg(long = "skeleton", value_name = "DIR")]
    pub skeleton: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct ModuleArgs {
    /// Module name.
    #[arg(value_name = "NAME")]
    pub name: String,

    /// Project root.
    #[arg(short = 'p', long = "path", value_name = "DIR")]
    pub path: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct EntityArgs {
    /// Entity name.
    #[arg(value_name = "NAME")]
    pub name: String,

    #[command(flatten)]
    pub target: TargetArgs,

    /// Do not generate a repository.
    #[arg(long = "no-repo")]
    pub no_repo: bool,
}

#[derive(Debug, Args)]
pub struct ControllerArgs {
    /// Controller name, without the `Controller` suffix.
    #[arg(value_name = "NAME")]
    pub name: String,

    #[command(flatten)]
    pub target: TargetArgs,
}

#[derive(Debug, Args)]
pub struct ActionArgs {
    /// Action name, without the `Action` suffix.
    #[arg(value_name = "NAME")]
    pub name: String,

    /// Controller receiving the action.
    #[arg(long = "controller", value_name = "CONTROLLER")]
    pub controller: String,

    #[command(flatten)]
    pub target: TargetArgs,
}

#[derive(Debug, Args)]
pub struct FullArgs {
    /// Entity name.
    #[arg(value_name = "NAME")]
    pub name: String,

    #[command(flatten)]
    pub target: TargetArgs,

    /// Do not generate a repository.
    #[arg(long = "no-repo")]
    pub no_repo: bool,

    /// Do not generate a service.
    #[arg(long = "no-service")]
    pub no_service: bool,

    /// Do not generate a controller (nor register one).
    #[arg(long = "no-controller")]
    pub no_controller: bool,
}

// ── init ──────────────────────────────────────────────────────────────────────

/// Arguments for `kiln init`.
#[derive(Debug, Args)]
pub struct InitArgs {
    /// Overwrite an existing config file.
    #[arg(short = 'f', long = "force", help = "Overwrite existing configuration")]
    pub force: bool,
}

// ── completions ───────────────────────────────────────────────────────────────

/// Arguments for `kiln completions`.
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

/// Subcommands for `kiln config`.
#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Print the value of a configuration key.
    Get {
        /// Dotted key path, e.g. `defaults.module`.
        key: String,
    },
    /// Print all configuration values.
    List,
    /// Print the path to the active configuration file.
    Path,
}

// ── tests ─────────────────────────────────────────────────────────────────────
