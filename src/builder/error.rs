//! Build pipeline errors.
//!
//! None of these are transient: a missing package or a compiler error does
//! not fix itself, so nothing in keel retries on them.

use std::fmt;
use std::path::PathBuf;

use miette::Diagnostic as MietteDiagnostic;
use serde::Serialize;
use thiserror::Error;

use crate::util::diagnostic::{suggestions, Diagnostic};

/// Which of the two generator invocations failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GenerationStage {
    Header,
    Source,
}

impl fmt::Display for GenerationStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GenerationStage::Header => write!(f, "header"),
            GenerationStage::Source => write!(f, "source"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error, MietteDiagnostic)]
pub enum BuildError {
    /// Misuse of a build context, such as mutating it after `build()`.
    #[error("{message}")]
    #[diagnostic(
        code(keel::build::sealed),
        help("A context builds once. Create a new context for another build.")
    )]
    Configuration { message: String },

    #[error("required package `{name}` is not installed")]
    #[diagnostic(code(keel::resolve::missing_dependency))]
    MissingDependency { name: String },

    #[error("protocol generation failed for `{schema}` ({stage}){}", exit_suffix(*exit_code))]
    #[diagnostic(code(keel::codegen::failed))]
    ProtocolGeneration {
        schema: String,
        stage: GenerationStage,
        exit_code: Option<i32>,
        diagnostic: String,
    },

    #[error("compilation failed{}", exit_suffix(*exit_code))]
    #[diagnostic(code(keel::compile::failed))]
    Compilation {
        exit_code: Option<i32>,
        diagnostic: String,
    },

    /// An external tool could not be started at all.
    #[error("could not run `{program}`: {reason}")]
    #[diagnostic(code(keel::tool::launch))]
    ToolLaunch { program: String, reason: String },

    #[error("filesystem error at `{}`: {reason}", path.display())]
    #[diagnostic(code(keel::io))]
    Io { path: PathBuf, reason: String },
}

fn exit_suffix(code: Option<i32>) -> String {
    match code {
        Some(code) => format!(" (exit code {})", code),
        None => String::new(),
    }
}

impl BuildError {
    pub fn sealed(operation: impl fmt::Display) -> Self {
        BuildError::Configuration {
            message: format!("build context is sealed; cannot {}", operation),
        }
    }

    pub fn unsealed() -> Self {
        BuildError::Configuration {
            message: "build context must be sealed before it is executed".to_string(),
        }
    }

    pub fn missing(name: impl Into<String>) -> Self {
        BuildError::MissingDependency { name: name.into() }
    }

    pub fn io(path: impl Into<PathBuf>, err: &std::io::Error) -> Self {
        BuildError::Io {
            path: path.into(),
            reason: err.to_string(),
        }
    }

    pub fn launch(program: impl fmt::Display, err: &anyhow::Error) -> Self {
        BuildError::ToolLaunch {
            program: program.to_string(),
            reason: format!("{:#}", err),
        }
    }

    /// Exit code of the failing tool, if one ran to completion.
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            BuildError::ProtocolGeneration { exit_code, .. }
            | BuildError::Compilation { exit_code, .. } => *exit_code,
            _ => None,
        }
    }

    /// Render as a user-facing diagnostic, including captured tool output.
    pub fn to_diagnostic(&self) -> Diagnostic {
        let diag = Diagnostic::error(self.to_string());
        match self {
            BuildError::MissingDependency { .. } => {
                diag.with_suggestion(suggestions::MISSING_DEPENDENCY)
            }
            BuildError::ProtocolGeneration { diagnostic, .. } => {
                let diag = if diagnostic.is_empty() {
                    diag
                } else {
                    diag.with_context(diagnostic.clone())
                };
                diag.with_suggestion(suggestions::PROTOCOL_NOT_FOUND)
            }
            BuildError::Compilation { diagnostic, .. } => {
                let diag = if diagnostic.is_empty() {
                    diag
                } else {
                    diag.with_context(diagnostic.clone())
                };
                diag.with_suggestion(suggestions::BUILD_FAILED)
            }
            BuildError::Configuration { .. }
            | BuildError::ToolLaunch { .. }
            | BuildError::Io { .. } => diag,
        }
    }
}
