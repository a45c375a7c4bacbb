//! Terminal outcome of a build.

use std::fmt;
use std::path::PathBuf;

use serde::Serialize;

use crate::builder::error::BuildError;
use crate::util::diagnostic::Diagnostic;

/// Pipeline stage a result is attributed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildStage {
    Configuration,
    Generation,
    Resolution,
    Compilation,
}

impl fmt::Display for BuildStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            BuildStage::Configuration => "configuration",
            BuildStage::Generation => "generation",
            BuildStage::Resolution => "resolution",
            BuildStage::Compilation => "compilation",
        })
    }
}

/// What a build produced, or why it did not.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildResult {
    pub succeeded: bool,
    /// Exit code of the compiler, or of the failing tool. `None` when the
    /// build stopped before any tool ran to completion.
    pub exit_code: Option<i32>,
    /// Stage reached: `Compilation` on success, the failing stage otherwise
    pub stage: BuildStage,
    /// Human-readable explanation, prefixed with the stage
    pub diagnostic: String,
    /// Expected artifact location on success
    pub artifact: Option<PathBuf>,
    pub error: Option<BuildError>,
}

impl BuildResult {
    pub fn success(artifact: PathBuf, exit_code: Option<i32>) -> Self {
        BuildResult {
            succeeded: true,
            exit_code,
            stage: BuildStage::Compilation,
            diagnostic: format!("built {}", artifact.display()),
            artifact: Some(artifact),
            error: None,
        }
    }

    pub fn failed(stage: BuildStage, error: BuildError) -> Self {
        let mut diagnostic = format!("{} failed: {}", stage, error);
        if let BuildError::ProtocolGeneration { diagnostic: text, .. }
        | BuildError::Compilation { diagnostic: text, .. } = &error
        {
            if !text.is_empty() {
                diagnostic.push('\n');
                diagnostic.push_str(text);
            }
        }

        BuildResult {
            succeeded: false,
            exit_code: error.exit_code(),
            stage,
            diagnostic,
            artifact: None,
            error: Some(error),
        }
    }

    /// The artifact path, or the error that stopped the build.
    pub fn into_result(self) -> Result<PathBuf, BuildError> {
        match (self.error, self.artifact) {
            (Some(err), _) => Err(err),
            (None, Some(artifact)) => Ok(artifact),
            (None, None) => Err(BuildError::Compilation {
                exit_code: self.exit_code,
                diagnostic: self.diagnostic,
            }),
        }
    }

    pub fn to_diagnostic(&self) -> Diagnostic {
        match self.error {
            Some(ref err) => err
                .to_diagnostic()
                .with_context(format!("while running the {} stage", self.stage)),
            None => Diagnostic::error(self.diagnostic.clone()),
        }
    }
}
