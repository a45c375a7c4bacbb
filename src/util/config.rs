//! Tool configuration for keel.
//!
//! Two locations are consulted:
//! - Global: `~/.keel/config.toml` - user-wide defaults
//! - Project: `.keel/config.toml` - project-specific overrides
//!
//! Project config takes precedence over global config, field by field.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::util::process::find_c_compiler;

/// Keel configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub toolchain: ToolchainSettings,
    pub build: BuildSettings,
}

/// External tool locations and extra flags.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ToolchainSettings {
    /// Path to the C compiler (e.g., /usr/bin/clang)
    pub cc: Option<PathBuf>,

    /// Path to pkg-config (or a compatible tool such as pkgconf)
    pub pkg_config: Option<PathBuf>,

    /// Flags placed ahead of the project's own raw flags
    pub cflags: Vec<String>,
}

/// Build behaviour toggles.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct BuildSettings {
    /// Write compile_commands.json into the build directory
    pub emit_compile_commands: Option<bool>,

    /// Run the header and source generator invocations concurrently
    pub parallel_codegen: Option<bool>,
}

impl Config {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("failed to parse config: {}", path.display()))
    }

    /// Load configuration, falling back to defaults if the file is absent or broken.
    pub fn load_or_default(path: &Path) -> Self {
        if path.exists() {
            Self::load(path).unwrap_or_else(|e| {
                tracing::warn!("Failed to load config from {}: {:#}", path.display(), e);
                Self::default()
            })
        } else {
            Self::default()
        }
    }

    /// Merge another config into this one (other takes precedence).
    pub fn merge(&mut self, other: Config) {
        if other.toolchain.cc.is_some() {
            self.toolchain.cc = other.toolchain.cc;
        }
        if other.toolchain.pkg_config.is_some() {
            self.toolchain.pkg_config = other.toolchain.pkg_config;
        }
        if !other.toolchain.cflags.is_empty() {
            self.toolchain.cflags = other.toolchain.cflags;
        }
        if other.build.emit_compile_commands.is_some() {
            self.build.emit_compile_commands = other.build.emit_compile_commands;
        }
        if other.build.parallel_codegen.is_some() {
            self.build.parallel_codegen = other.build.parallel_codegen;
        }
    }

    /// Locate the C compiler: config, then `CC`, then PATH.
    pub fn compiler(&self) -> Result<PathBuf> {
        if let Some(ref cc) = self.toolchain.cc {
            return Ok(cc.clone());
        }

        if let Ok(cc) = std::env::var("CC") {
            if !cc.trim().is_empty() {
                return Ok(PathBuf::from(cc));
            }
        }

        match find_c_compiler() {
            Some(path) => Ok(path),
            None => bail!(
                "no C compiler found\n\
                 Set the CC environment variable, set `toolchain.cc` in .keel/config.toml,\n\
                 or install cc, gcc or clang."
            ),
        }
    }

    /// Locate pkg-config: config, then `PKG_CONFIG`, then `pkg-config` on PATH.
    pub fn pkg_config(&self) -> PathBuf {
        if let Some(ref pc) = self.toolchain.pkg_config {
            return pc.clone();
        }

        match std::env::var("PKG_CONFIG") {
            Ok(pc) if !pc.trim().is_empty() => PathBuf::from(pc),
            _ => PathBuf::from("pkg-config"),
        }
    }

    pub fn emit_compile_commands(&self) -> bool {
        self.build.emit_compile_commands.unwrap_or(false)
    }

    pub fn parallel_codegen(&self) -> Option<bool> {
        self.build.parallel_codegen
    }
}

/// Load merged configuration from global and project locations.
///
/// Order of precedence (highest to lowest):
/// 1. Project config (.keel/config.toml)
/// 2. Global config (~/.keel/config.toml)
/// 3. Defaults
pub fn load_config(global_path: Option<&Path>, project_path: &Path) -> Config {
    let mut config = Config::default();

    if let Some(global) = global_path {
        config.merge(Config::load_or_default(global));
    }

    config.merge(Config::load_or_default(project_path));

    config
}

/// Get the global keel config directory (~/.keel).
pub fn global_config_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|b| b.home_dir().join(".keel"))
}

/// Get the global config path (~/.keel/config.toml).
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("config.toml"))
}

/// Get the project config path (.keel/config.toml).
pub fn project_config_path(project_root: &Path) -> PathBuf {
    project_root.join(".keel").join("config.toml")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_config() {
        let config: Config = toml::from_str(
            r#"
            [toolchain]
            cc = "/usr/bin/clang"
            pkg-config = "pkgconf"
            cflags = ["-fcolor-diagnostics"]

            [build]
            emit-compile-commands = true
            parallel-codegen = false
            "#,
        )
        .unwrap();

        assert_eq!(config.toolchain.cc, Some(PathBuf::from("/usr/bin/clang")));
        assert_eq!(config.pkg_config(), PathBuf::from("pkgconf"));
        assert_eq!(config.toolchain.cflags, vec!["-fcolor-diagnostics"]);
        assert!(config.emit_compile_commands());
        assert_eq!(config.parallel_codegen(), Some(false));
    }

    #[test]
    fn test_project_overrides_global() {
        let tmp = TempDir::new().unwrap();
        let global = tmp.path().join("global.toml");
        let project = tmp.path().join("project.toml");

        std::fs::write(
            &global,
            "[toolchain]\ncc = \"gcc\"\npkg-config = \"pkgconf\"\n",
        )
        .unwrap();
        std::fs::write(&project, "[toolchain]\ncc = \"clang\"\n").unwrap();

        let config = load_config(Some(&global), &project);
        assert_eq!(config.compiler().unwrap(), PathBuf::from("clang"));
        assert_eq!(config.pkg_config(), PathBuf::from("pkgconf"));
    }

    #[test]
    fn test_broken_config_falls_back_to_default() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        std::fs::write(&path, "[toolchain\ncc = ").unwrap();

        assert_eq!(Config::load_or_default(&path), Config::default());
        assert!(Config::load(&path).is_err());
    }

    #[test]
    fn test_missing_files_give_defaults() {
        let tmp = TempDir::new().unwrap();
        let config = load_config(None, &tmp.path().join("absent.toml"));
        assert_eq!(config, Config::default());
        assert!(!config.emit_compile_commands());
    }
}
