//! Implementation of `keel clean`.

use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::builder::context::BUILD_DIR_NAME;
use crate::core::mode::BuildMode;
use crate::util::fs::remove_dir_all_if_exists;

/// Remove build output under `root`: one mode's directory, or all of them.
///
/// Returns the directory that was targeted.
pub fn clean(root: &Path, mode: Option<BuildMode>) -> Result<PathBuf> {
    let mut dir = root.join(BUILD_DIR_NAME);
    if let Some(mode) = mode {
        dir.push(mode.as_str());
    }

    tracing::debug!("removing {}", dir.display());
    remove_dir_all_if_exists(&dir)?;
    Ok(dir)
}
