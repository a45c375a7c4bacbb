//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;

/// Keel - build orchestration for C programs with generated protocol code
#[derive(Parser)]
#[command(name = "keel")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Path to Keel.toml (defaults to searching upward from the current directory)
    #[arg(long, global = true, env = "KEEL_MANIFEST_PATH")]
    pub manifest_path: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write a starter Keel.toml
    Init(InitArgs),

    /// Generate protocol code and build the current project
    Build(BuildArgs),

    /// Run the protocol generator for a single schema
    Generate(GenerateArgs),

    /// Show compile/link flags for system libraries
    Flags(FlagsArgs),

    /// Remove build output
    Clean(CleanArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Args)]
pub struct InitArgs {
    /// Project name (defaults to the directory name)
    #[arg(long)]
    pub name: Option<String>,

    /// Directory to initialize (defaults to current directory)
    pub path: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum MessageFormat {
    #[default]
    Human,
    Json,
}

#[derive(Args)]
pub struct BuildArgs {
    /// Build in release mode
    #[arg(short, long)]
    pub release: bool,

    /// Write compile_commands.json to build/<mode>/ (point clangd's
    /// --compile-commands-dir there)
    #[arg(long)]
    pub emit_compile_commands: bool,

    /// Print the compiler invocation as JSON without building
    #[arg(long)]
    pub plan: bool,

    /// Output format for build messages
    #[arg(long, value_enum, default_value_t = MessageFormat::Human)]
    pub message_format: MessageFormat,
}

#[derive(Args)]
pub struct GenerateArgs {
    /// Schema path, relative to the protocol package's data directory
    pub schema: String,

    /// Output directory (defaults to the current directory)
    #[arg(long)]
    pub out_dir: Option<PathBuf>,
}

#[derive(Args)]
pub struct FlagsArgs {
    /// Library names, as known to pkg-config
    #[arg(required = true)]
    pub libraries: Vec<String>,
}

#[derive(Args)]
pub struct CleanArgs {
    /// Only remove release output
    #[arg(long, conflicts_with = "debug")]
    pub release: bool,

    /// Only remove debug output
    #[arg(long)]
    pub debug: bool,
}

#[derive(Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}
