//! pkg-config backed package queries.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::builder::error::BuildError;
use crate::resolver::query::PackageQuery;
use crate::util::process::{ProcessBuilder, ToolOutput, ToolRunner};

/// Queries packages by running `pkg-config` (or a compatible tool).
#[derive(Clone)]
pub struct PkgConfig {
    program: PathBuf,
    runner: Arc<dyn ToolRunner>,
}

impl PkgConfig {
    pub fn new(program: impl Into<PathBuf>, runner: Arc<dyn ToolRunner>) -> Self {
        PkgConfig {
            program: program.into(),
            runner,
        }
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    fn query<I, S>(&self, args: I) -> Result<ToolOutput, BuildError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<std::ffi::OsStr>,
    {
        let cmd = ProcessBuilder::new(&self.program).args(args);
        self.runner
            .run(&cmd)
            .map_err(|e| BuildError::launch(self.program.display(), &e))
    }
}

impl PackageQuery for PkgConfig {
    fn exists(&self, package: &str) -> Result<bool, BuildError> {
        Ok(self.query(["--exists", package])?.success())
    }

    fn flags(&self, package: &str) -> Result<Option<Vec<String>>, BuildError> {
        let output = self.query(["--cflags", "--libs", package])?;
        if !output.success() {
            tracing::debug!("pkg-config has no `{}`: {}", package, output.diagnostic());
            return Ok(None);
        }
        Ok(Some(split_flags(&output.stdout)))
    }

    fn variable(&self, package: &str, variable: &str) -> Result<Option<String>, BuildError> {
        let output = self.query([format!("--variable={}", variable), package.to_string()])?;
        if !output.success() {
            return Ok(None);
        }

        // pkg-config prints an empty line for variables the package does not define.
        let value = output.stdout.trim();
        if value.is_empty() {
            Ok(None)
        } else {
            Ok(Some(value.to_string()))
        }
    }
}

/// Split pkg-config output into individual flags.
fn split_flags(output: &str) -> Vec<String> {
    output.split_whitespace().map(str::to_string).collect()
}
