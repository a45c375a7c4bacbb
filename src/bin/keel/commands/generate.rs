//! `keel generate` command

use anyhow::{bail, Result};

use crate::cli::GenerateArgs;
use crate::commands::{config_for, GlobalArgs};
use keel::builder::BuildError;
use keel::ops::{generate, Toolset};
use keel::util::diagnostic::emit;

pub fn execute(args: GenerateArgs, global: &GlobalArgs) -> Result<()> {
    let manifest = global.try_manifest()?;
    let config = config_for(manifest.as_ref().map(|m| m.manifest_dir.as_path()));
    let tools = Toolset::from_config(&config)?;

    let out_dir = match args.out_dir {
        Some(dir) => dir,
        None => std::env::current_dir()?,
    };

    eprintln!("  Generating {}", args.schema);
    let pair = match generate(manifest.as_ref(), &config, &tools, &args.schema, &out_dir) {
        Ok(pair) => pair,
        Err(e) => match e.downcast_ref::<BuildError>() {
            Some(build_err) => {
                emit(&build_err.to_diagnostic(), global.color);
                bail!("could not generate `{}`", args.schema);
            }
            None => return Err(e),
        },
    };

    println!("{}", pair.header.display());
    println!("{}", pair.source.display());

    Ok(())
}
