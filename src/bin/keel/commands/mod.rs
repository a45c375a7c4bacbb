//! Command implementations

use std::path::{Path, PathBuf};

use anyhow::{anyhow, Result};

use keel::core::{find_manifest, Manifest};
use keel::util::diagnostic::suggestions;
use keel::util::config::{global_config_path, load_config, project_config_path, Config};

pub mod build;
pub mod clean;
pub mod completions;
pub mod flags;
pub mod generate;
pub mod init;

/// Options shared by every subcommand.
pub struct GlobalArgs {
    pub verbose: bool,
    pub color: bool,
    pub manifest_path: Option<PathBuf>,
}

impl GlobalArgs {
    /// The explicit manifest path, or the nearest Keel.toml above the
    /// current directory.
    pub fn manifest_path(&self) -> Result<PathBuf> {
        match self.manifest_path {
            Some(ref path) => Ok(path.clone()),
            None => find_manifest(&std::env::current_dir()?)
                .map_err(|e| anyhow!("{}\nhelp: {}", e, suggestions::NO_MANIFEST)),
        }
    }

    /// Like [`manifest_path`](Self::manifest_path), but a missing manifest is
    /// not an error.
    pub fn try_manifest(&self) -> Result<Option<Manifest>> {
        match self.manifest_path() {
            Ok(path) => Ok(Some(Manifest::load(&path)?)),
            Err(_) if self.manifest_path.is_none() => Ok(None),
            Err(e) => Err(e),
        }
    }
}

/// Configuration for a project rooted at `root`, or global only.
pub fn config_for(root: Option<&Path>) -> Config {
    let global = global_config_path();
    match root {
        Some(root) => load_config(global.as_deref(), &project_config_path(root)),
        None => {
            let mut config = Config::default();
            if let Some(global) = global {
                config.merge(Config::load_or_default(&global));
            }
            config
        }
    }
}
