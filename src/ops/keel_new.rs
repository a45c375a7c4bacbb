//! Implementation of `keel init`.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};

use crate::core::manifest::{generate_default_manifest, MANIFEST_NAME};

const MAIN_C: &str = r#"#include <stdio.h>

int main(void) {
    printf("Hello, world!\n");
    return 0;
}
"#;

/// Write a starter Keel.toml into `path`, plus `src/main.c` when the
/// directory has no `src/` yet. Returns the manifest path.
pub fn init_project(path: &Path, name: Option<&str>) -> Result<PathBuf> {
    if !path.exists() {
        fs::create_dir_all(path)
            .with_context(|| format!("failed to create directory: {}", path.display()))?;
    }

    let manifest_path = path.join(MANIFEST_NAME);
    if manifest_path.exists() {
        bail!("`{}` already exists in `{}`", MANIFEST_NAME, path.display());
    }

    let name = match name {
        Some(name) => name.to_string(),
        None => default_name(path)?,
    };

    fs::write(&manifest_path, generate_default_manifest(&name))
        .with_context(|| format!("failed to write {}", MANIFEST_NAME))?;

    let src_dir = path.join("src");
    if !src_dir.exists() {
        fs::create_dir_all(&src_dir)?;
        fs::write(src_dir.join("main.c"), MAIN_C)?;
    }

    let gitignore = path.join(".gitignore");
    if !gitignore.exists() {
        fs::write(&gitignore, "/build/\n")?;
    }

    Ok(manifest_path)
}

fn default_name(path: &Path) -> Result<String> {
    let path = path
        .canonicalize()
        .with_context(|| format!("failed to resolve {}", path.display()))?;
    match path.file_name().and_then(|n| n.to_str()) {
        Some(name) => Ok(name.to_string()),
        None => bail!(
            "cannot infer a project name from `{}`\n\
             Pass one with --name.",
            path.display()
        ),
    }
}
