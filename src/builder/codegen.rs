//! Protocol code generation.
//!
//! Schema files shipped by a system package (wayland-protocols by default)
//! are run through an external generator twice: once for the client header
//! and once for the private implementation source. The generated header is a
//! textual prerequisite of the sources that include it, so generation always
//! finishes before compilation starts.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::builder::error::{BuildError, GenerationStage};
use crate::resolver::DependencyResolver;
use crate::util::fs::ensure_dir;
use crate::util::hash::sha256_file;
use crate::util::process::{ProcessBuilder, ToolRunner};

/// How to find schemas and drive the generator tool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratorSpec {
    /// Package that ships the schema files
    pub package: String,
    /// Package variable naming the schema directory
    pub variable: String,
    /// Generator executable
    pub tool: PathBuf,
    /// Mode argument producing the interface header
    pub header_mode: String,
    /// Mode argument producing the implementation source
    pub source_mode: String,
    /// Replaces the schema extension for the header
    pub header_suffix: String,
    /// Replaces the schema extension for the source
    pub source_suffix: String,
}

impl Default for GeneratorSpec {
    fn default() -> Self {
        GeneratorSpec {
            package: "wayland-protocols".to_string(),
            variable: "pkgdatadir".to_string(),
            tool: PathBuf::from("wayland-scanner"),
            header_mode: "client-header".to_string(),
            source_mode: "private-code".to_string(),
            header_suffix: "-protocol.h".to_string(),
            source_suffix: "-protocol.c".to_string(),
        }
    }
}

/// One generation request with all of its paths worked out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProtocolSpec {
    /// The relative specifier as given
    pub schema: String,
    /// Absolute schema location inside the package data directory
    pub source_path: PathBuf,
    pub generated_header_path: PathBuf,
    pub generated_source_path: PathBuf,
}

/// The two files produced for one schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedPair {
    pub header: PathBuf,
    pub source: PathBuf,
}

/// Runs the protocol generator.
///
/// Construction checks that the schema package is registered; generation
/// never touches a [`BuildContext`](crate::builder::BuildContext), the caller
/// decides what to do with the generated paths.
pub struct CodeGenerator {
    spec: GeneratorSpec,
    data_dir: PathBuf,
    runner: Arc<dyn ToolRunner>,
    parallel: bool,
}

impl CodeGenerator {
    /// Create a generator, resolving the schema directory up front.
    ///
    /// Fails with [`BuildError::MissingDependency`] if the schema package is
    /// not registered, before any generation is attempted.
    pub fn new(
        spec: GeneratorSpec,
        resolver: &DependencyResolver,
        runner: Arc<dyn ToolRunner>,
    ) -> Result<Self, BuildError> {
        let data_dir = resolver.package_dir(&spec.package, &spec.variable)?;
        tracing::debug!(
            "schemas for `{}` found in {}",
            spec.package,
            data_dir.display()
        );

        Ok(CodeGenerator {
            spec,
            data_dir,
            runner,
            parallel: true,
        })
    }

    /// Run the header and source invocations concurrently (the default), or
    /// one after the other with the source skipped if the header fails.
    pub fn parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Work out the schema and output paths for `schema` without running anything.
    pub fn protocol(&self, schema: &str, out_dir: &Path) -> Result<ProtocolSpec, BuildError> {
        let relative = Path::new(schema);
        let stem = relative
            .file_stem()
            .and_then(|s| s.to_str())
            .filter(|s| !s.is_empty())
            .ok_or_else(|| BuildError::ProtocolGeneration {
                schema: schema.to_string(),
                stage: GenerationStage::Header,
                exit_code: None,
                diagnostic: "schema path has no file name".to_string(),
            })?;

        Ok(ProtocolSpec {
            schema: schema.to_string(),
            source_path: self.data_dir.join(relative),
            generated_header_path: out_dir.join(format!("{}{}", stem, self.spec.header_suffix)),
            generated_source_path: out_dir.join(format!("{}{}", stem, self.spec.source_suffix)),
        })
    }

    /// Generate the header and source for `schema` into `out_dir`.
    ///
    /// Both invocations must succeed. If either fails the error names that
    /// half, and both output files are removed again, including a partial
    /// file the failing invocation may have written.
    pub fn generate(&self, schema: &str, out_dir: &Path) -> Result<GeneratedPair, BuildError> {
        let protocol = self.protocol(schema, out_dir)?;
        ensure_dir(out_dir).map_err(|e| BuildError::io(out_dir, &e))?;

        let outcome = if self.parallel {
            let (header, source) = rayon::join(
                || self.invoke(&protocol, GenerationStage::Header),
                || self.invoke(&protocol, GenerationStage::Source),
            );
            header.and(source)
        } else {
            self.invoke(&protocol, GenerationStage::Header)
                .and_then(|()| self.invoke(&protocol, GenerationStage::Source))
        };

        // A failing invocation may still have written a partial file.
        if let Err(e) = outcome {
            discard(&protocol.generated_header_path);
            discard(&protocol.generated_source_path);
            return Err(e);
        }

        if tracing::enabled!(tracing::Level::DEBUG) {
            for path in [&protocol.generated_header_path, &protocol.generated_source_path] {
                if let Ok(hash) = sha256_file(path) {
                    tracing::debug!("generated {} (sha256 {})", path.display(), &hash[..16]);
                }
            }
        }

        Ok(GeneratedPair {
            header: protocol.generated_header_path,
            source: protocol.generated_source_path,
        })
    }

    fn invoke(&self, protocol: &ProtocolSpec, stage: GenerationStage) -> Result<(), BuildError> {
        let (mode, output) = match stage {
            GenerationStage::Header => (&self.spec.header_mode, &protocol.generated_header_path),
            GenerationStage::Source => (&self.spec.source_mode, &protocol.generated_source_path),
        };

        let cmd = ProcessBuilder::new(&self.spec.tool)
            .arg(mode)
            .arg(&protocol.source_path)
            .arg(output);

        let result = self
            .runner
            .run(&cmd)
            .map_err(|e| BuildError::launch(self.spec.tool.display(), &e))?;

        if !result.success() {
            return Err(BuildError::ProtocolGeneration {
                schema: protocol.schema.clone(),
                stage,
                exit_code: result.status,
                diagnostic: result.diagnostic(),
            });
        }

        Ok(())
    }
}

/// Remove a generated file left behind by a failed generation.
fn discard(path: &Path) {
    if let Err(e) = std::fs::remove_file(path) {
        if e.kind() != std::io::ErrorKind::NotFound {
            tracing::warn!("could not remove {}: {}", path.display(), e);
        }
    }
}
