//! Implementation of `keel generate` and `keel flags`.

use std::path::Path;

use anyhow::Result;

use crate::builder::codegen::{CodeGenerator, GeneratedPair, GeneratorSpec};
use crate::core::manifest::Manifest;
use crate::ops::keel_build::Toolset;
use crate::resolver::{Dependency, DependencyResolver};
use crate::util::config::Config;

/// Run the code generator for a single schema into `out_dir`.
///
/// The generator is described by the manifest's `[codegen]` section when a
/// manifest is given, and by the wayland-scanner defaults otherwise.
pub fn generate(
    manifest: Option<&Manifest>,
    config: &Config,
    tools: &Toolset,
    schema: &str,
    out_dir: &Path,
) -> Result<GeneratedPair> {
    let codegen = manifest.and_then(|m| m.codegen.as_ref());
    let spec = codegen
        .map(|c| c.generator_spec())
        .unwrap_or_else(GeneratorSpec::default);
    let parallel = config
        .parallel_codegen()
        .or_else(|| codegen.and_then(|c| c.parallel))
        .unwrap_or(true);

    let resolver = DependencyResolver::new(tools.query.clone());
    let generator = CodeGenerator::new(spec, &resolver, tools.runner.clone())?.parallel(parallel);
    Ok(generator.generate(schema, out_dir)?)
}

/// Resolve compiler/linker flags for each library, in order.
pub fn flags(tools: &Toolset, libraries: &[String]) -> Result<Vec<Dependency>> {
    let resolver = DependencyResolver::new(tools.query.clone());
    Ok(resolver.resolve_all(libraries)?)
}
