//! Keel CLI - build orchestration for C programs

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;

use cli::{Cli, Commands};

fn main() {
    if let Err(e) = run() {
        eprintln!("error: {:#}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("keel=debug")
    } else {
        EnvFilter::new("keel=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();

    let global = commands::GlobalArgs {
        verbose: cli.verbose,
        color: !cli.no_color,
        manifest_path: cli.manifest_path,
    };

    match cli.command {
        Commands::Init(args) => commands::init::execute(args),
        Commands::Build(args) => commands::build::execute(args, &global),
        Commands::Generate(args) => commands::generate::execute(args, &global),
        Commands::Flags(args) => commands::flags::execute(args, &global),
        Commands::Clean(args) => commands::clean::execute(args, &global),
        Commands::Completions(args) => commands::completions::execute(args),
    }
}
