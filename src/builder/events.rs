//! Build event types for JSON output.
//!
//! These events are emitted one object per line on stdout when using
//! `--message-format=json`.
//!
//! # Event Types
//!
//! - `build-started`: A build began for an artifact in a given mode
//! - `protocol-generated`: A header/source pair was produced from a schema
//! - `compiler-artifact`: The compiler produced the artifact
//! - `build-finished`: Build completed (success or failure)
//! - `diagnostic`: An error or warning, attributed to a pipeline stage
//!
//! New fields may be added, but existing fields should not be removed or renamed.

use std::path::PathBuf;

use serde::Serialize;

use crate::builder::codegen::GeneratedPair;
use crate::builder::result::{BuildResult, BuildStage};

/// A build event emitted during the build process.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "reason")]
pub enum BuildEvent {
    #[serde(rename = "build-started")]
    BuildStarted {
        /// Artifact name
        name: String,
        /// "debug" or "release"
        mode: String,
        /// Number of protocols to generate before compiling
        protocols: usize,
    },

    #[serde(rename = "protocol-generated")]
    ProtocolGenerated {
        /// Schema specifier, relative to the protocol data directory
        schema: String,
        header: PathBuf,
        source: PathBuf,
    },

    #[serde(rename = "compiler-artifact")]
    CompilerArtifact {
        name: String,
        filenames: Vec<PathBuf>,
    },

    #[serde(rename = "build-finished")]
    BuildFinished {
        success: bool,
        /// Exit code of the compiler or of the failing tool
        #[serde(skip_serializing_if = "Option::is_none")]
        exit_code: Option<i32>,
        /// Total build duration in milliseconds
        duration_ms: u64,
    },

    #[serde(rename = "diagnostic")]
    Diagnostic {
        /// Severity level ("error", "warning")
        level: String,
        stage: BuildStage,
        message: String,
    },
}

impl BuildEvent {
    pub fn started(name: impl Into<String>, mode: impl Into<String>, protocols: usize) -> Self {
        BuildEvent::BuildStarted {
            name: name.into(),
            mode: mode.into(),
            protocols,
        }
    }

    pub fn generated(schema: impl Into<String>, pair: &GeneratedPair) -> Self {
        BuildEvent::ProtocolGenerated {
            schema: schema.into(),
            header: pair.header.clone(),
            source: pair.source.clone(),
        }
    }

    pub fn artifact(name: impl Into<String>, path: PathBuf) -> Self {
        BuildEvent::CompilerArtifact {
            name: name.into(),
            filenames: vec![path],
        }
    }

    pub fn finished(result: &BuildResult, duration_ms: u64) -> Self {
        BuildEvent::BuildFinished {
            success: result.succeeded,
            exit_code: result.exit_code,
            duration_ms,
        }
    }

    /// An error event for a failed result.
    pub fn error(result: &BuildResult) -> Self {
        BuildEvent::Diagnostic {
            level: "error".to_string(),
            stage: result.stage,
            message: result.diagnostic.clone(),
        }
    }

    /// Serialize this event to a JSON string.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }

    /// Print this event as one line on stdout.
    pub fn emit(&self) {
        println!("{}", self.to_json());
    }
}
