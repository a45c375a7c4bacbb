//! `keel flags` command

use anyhow::Result;

use crate::cli::FlagsArgs;
use crate::commands::{config_for, GlobalArgs};
use keel::ops::{flags, Toolset};

pub fn execute(args: FlagsArgs, global: &GlobalArgs) -> Result<()> {
    let manifest = global.try_manifest()?;
    let config = config_for(manifest.as_ref().map(|m| m.manifest_dir.as_path()));
    let tools = Toolset::from_config(&config)?;

    for dep in flags(&tools, &args.libraries)? {
        if global.verbose {
            eprintln!("{}:", dep.name);
        }
        println!("{}", dep.flags.join(" "));
    }

    Ok(())
}
