//! Keel.toml parsing.
//!
//! A manifest declares everything a build needs: the artifact name, sources,
//! include directories, system libraries, raw flags, and the protocol schemas
//! to run through the code generator before compiling.
//!
//! ```toml
//! [package]
//! name = "main"
//!
//! [build]
//! sources = ["src/*.c"]
//! include = ["include", "util"]
//! dependencies = ["wayland-client"]
//! requires = ["wayland-protocols"]
//! flags = ["-lw"]
//!
//! [codegen]
//! protocols = ["stable/xdg-shell/xdg-shell.xml"]
//! ```

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::builder::codegen::GeneratorSpec;

/// Manifest file name.
pub const MANIFEST_NAME: &str = "Keel.toml";

/// Errors locating a manifest.
#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("could not find `Keel.toml` in `{}` or any parent directory", dir.display())]
    NotFound { dir: PathBuf },
}

/// The parsed Keel.toml manifest.
#[derive(Debug, Clone)]
pub struct Manifest {
    pub package: PackageMetadata,
    pub build: BuildSection,
    pub codegen: Option<CodegenSection>,
    /// The directory containing this manifest
    pub manifest_dir: PathBuf,
}

/// Package metadata from the [package] section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackageMetadata {
    /// Artifact name, written to `<build dir>/<name>`
    pub name: String,

    #[serde(default)]
    pub description: Option<String>,
}

/// The [build] section. Every list keeps its declared order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BuildSection {
    /// Source glob patterns, relative to the manifest directory
    pub sources: Vec<String>,

    /// Include directories in search order
    pub include: Vec<String>,

    /// System libraries resolved through pkg-config
    pub dependencies: Vec<String>,

    /// Packages that must be installed, though none of their flags are used
    pub requires: Vec<String>,

    /// Raw compiler/linker flags
    pub flags: Vec<String>,
}

/// The [codegen] section.
///
/// Unset fields fall back to the wayland-scanner defaults of
/// [`GeneratorSpec::default`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct CodegenSection {
    pub package: Option<String>,
    pub variable: Option<String>,
    pub tool: Option<String>,
    pub header_mode: Option<String>,
    pub source_mode: Option<String>,
    pub header_suffix: Option<String>,
    pub source_suffix: Option<String>,
    pub parallel: Option<bool>,

    /// Schema paths relative to the package's data directory
    pub protocols: Vec<String>,
}

impl CodegenSection {
    /// Build the generator description, filling in defaults.
    pub fn generator_spec(&self) -> GeneratorSpec {
        let defaults = GeneratorSpec::default();
        GeneratorSpec {
            package: self.package.clone().unwrap_or(defaults.package),
            variable: self.variable.clone().unwrap_or(defaults.variable),
            tool: self.tool.clone().map(PathBuf::from).unwrap_or(defaults.tool),
            header_mode: self.header_mode.clone().unwrap_or(defaults.header_mode),
            source_mode: self.source_mode.clone().unwrap_or(defaults.source_mode),
            header_suffix: self.header_suffix.clone().unwrap_or(defaults.header_suffix),
            source_suffix: self.source_suffix.clone().unwrap_or(defaults.source_suffix),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawManifest {
    package: Option<PackageMetadata>,

    #[serde(default)]
    build: BuildSection,

    #[serde(default)]
    codegen: Option<CodegenSection>,
}

impl Manifest {
    /// Load a manifest from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read manifest: {}", path.display()))?;

        // Sources, includes and the build dir are rooted at the manifest
        // directory, which must stay valid once the compiler runs inside it.
        let path = std::path::absolute(path)
            .with_context(|| format!("failed to resolve manifest path: {}", path.display()))?;

        Self::parse(&content, &path)
    }

    /// Parse manifest content.
    pub fn parse(content: &str, path: &Path) -> Result<Self> {
        let raw: RawManifest = toml::from_str(content)
            .with_context(|| format!("failed to parse {}", path.display()))?;

        let manifest_dir = path
            .parent()
            .filter(|dir| !dir.as_os_str().is_empty())
            .unwrap_or(Path::new("."))
            .to_path_buf();

        let Some(package) = raw.package else {
            bail!("manifest at {} has no [package] section", path.display());
        };

        validate_name(&package.name)
            .with_context(|| format!("invalid package name in {}", path.display()))?;

        Ok(Manifest {
            package,
            build: raw.build,
            codegen: raw.codegen,
            manifest_dir,
        })
    }

    pub fn name(&self) -> &str {
        &self.package.name
    }

    /// Protocols to generate, in declared order.
    pub fn protocols(&self) -> &[String] {
        self.codegen
            .as_ref()
            .map(|c| c.protocols.as_slice())
            .unwrap_or(&[])
    }
}

fn validate_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        bail!("package name must not be empty");
    }
    if name.contains(['/', '\\']) || name == "." || name == ".." {
        bail!("package name `{}` must be a plain file name", name);
    }
    Ok(())
}

/// Find Keel.toml in `start` or the nearest parent directory.
pub fn find_manifest(start: &Path) -> Result<PathBuf, ManifestError> {
    let mut current = start.to_path_buf();
    loop {
        let candidate = current.join(MANIFEST_NAME);
        if candidate.is_file() {
            return Ok(candidate);
        }
        if !current.pop() {
            return Err(ManifestError::NotFound {
                dir: start.to_path_buf(),
            });
        }
    }
}

/// Generate a starter Keel.toml.
pub fn generate_default_manifest(name: &str) -> String {
    format!(
        r#"[package]
name = "{name}"

[build]
sources = ["src/*.c"]
include = ["include"]
dependencies = []
flags = []

# [codegen]
# protocols = ["stable/xdg-shell/xdg-shell.xml"]
"#
    )
}
