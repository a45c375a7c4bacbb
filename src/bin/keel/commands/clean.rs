//! `keel clean` command

use anyhow::Result;

use crate::cli::CleanArgs;
use crate::commands::GlobalArgs;
use keel::core::{BuildMode, Manifest};
use keel::ops::clean;

pub fn execute(args: CleanArgs, global: &GlobalArgs) -> Result<()> {
    let manifest = Manifest::load(&global.manifest_path()?)?;

    let mode = if args.release {
        Some(BuildMode::Release)
    } else if args.debug {
        Some(BuildMode::Debug)
    } else {
        None
    };

    let dir = clean(&manifest.manifest_dir, mode)?;
    eprintln!("     Removed {}", dir.display());

    Ok(())
}
