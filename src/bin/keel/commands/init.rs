//! `keel init` command

use anyhow::Result;

use crate::cli::InitArgs;
use keel::ops::init_project;

pub fn execute(args: InitArgs) -> Result<()> {
    let path = match args.path {
        Some(path) => path,
        None => std::env::current_dir()?,
    };

    let manifest_path = init_project(&path, args.name.as_deref())?;
    eprintln!("     Created {}", manifest_path.display());

    Ok(())
}
