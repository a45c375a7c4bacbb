//! Implementation of `keel build`.
//!
//! The pipeline for one manifest:
//!
//! 1. check every `[build] requires` package and the generator's schema package
//! 2. generate each `[codegen]` protocol into the build directory
//! 3. fill a [`BuildContext`] from the manifest and the generated sources
//! 4. seal it, resolve dependencies and run the compiler once
//!
//! A failure in any stage stops the pipeline and is reported as an
//! unsuccessful [`BuildResult`] naming that stage.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};

use crate::builder::codegen::{CodeGenerator, GeneratedPair};
use crate::builder::context::BuildContext;
use crate::builder::error::BuildError;
use crate::builder::executor::BuildExecutor;
use crate::builder::plan::{write_compile_commands, BuildInvocation};
use crate::builder::result::{BuildResult, BuildStage};
use crate::core::manifest::Manifest;
use crate::core::mode::BuildMode;
use crate::resolver::{DependencyResolver, PackageQuery, PkgConfig};
use crate::util::config::{global_config_path, load_config, project_config_path, Config};
use crate::util::fs::glob_files;
use crate::util::process::{SystemRunner, ToolRunner};

/// Options for the build command.
#[derive(Debug, Clone, Default)]
pub struct BuildOptions {
    /// Build in release mode
    pub release: bool,

    /// Stop after assembling the compiler invocation
    pub emit_plan: bool,

    /// Emit compile_commands.json
    pub emit_compile_commands: bool,

    /// Show a spinner while compiling
    pub progress: bool,
}

impl BuildOptions {
    pub fn mode(&self) -> BuildMode {
        BuildMode::from_release(self.release)
    }
}

/// External collaborators of a build.
#[derive(Clone)]
pub struct Toolset {
    pub compiler: PathBuf,
    pub runner: Arc<dyn ToolRunner>,
    pub query: Arc<dyn PackageQuery>,
}

impl Toolset {
    /// Tools located from configuration and the environment.
    pub fn from_config(config: &Config) -> Result<Self> {
        let runner: Arc<dyn ToolRunner> = Arc::new(SystemRunner);
        let pkg_config = config.pkg_config();
        tracing::debug!("using {} for package queries", pkg_config.display());

        Ok(Toolset {
            compiler: config.compiler()?,
            query: Arc::new(PkgConfig::new(pkg_config, runner.clone())),
            runner,
        })
    }
}

/// Everything a finished (or failed) build produced.
#[derive(Debug, Clone)]
pub struct BuildReport {
    pub name: String,
    pub mode: BuildMode,
    /// Schema specifier and generated pair, in manifest order
    pub generated: Vec<(String, GeneratedPair)>,
    pub result: BuildResult,
    pub compile_commands: Option<PathBuf>,
    pub duration: Duration,
}

#[derive(Debug, Clone)]
pub enum BuildOutcome {
    /// `--plan`: the invocation that would have run
    Planned(BuildInvocation),
    Built(BuildReport),
}

/// Load the manifest and configuration at `manifest_path` and build it.
pub fn build(manifest_path: &Path, opts: &BuildOptions) -> Result<BuildOutcome> {
    let manifest = Manifest::load(manifest_path)?;
    let global = global_config_path();
    let config = load_config(global.as_deref(), &project_config_path(&manifest.manifest_dir));
    let tools = Toolset::from_config(&config)?;

    build_with(&manifest, &config, &tools, opts)
}

/// Build `manifest` with explicit tools.
pub fn build_with(
    manifest: &Manifest,
    config: &Config,
    tools: &Toolset,
    opts: &BuildOptions,
) -> Result<BuildOutcome> {
    let start = Instant::now();
    let mode = opts.mode();
    let root = &manifest.manifest_dir;
    let resolver = DependencyResolver::new(tools.query.clone());
    let executor = BuildExecutor::new(&tools.compiler, tools.runner.clone())
        .cwd(root)
        .progress(opts.progress);

    let mut ctx = if opts.emit_plan {
        BuildContext::detached(root, manifest.name(), mode)
    } else {
        BuildContext::with_root(root, manifest.name(), mode)?
    };
    tracing::debug!("building `{}` in {} mode", manifest.name(), mode);

    let report = |generated: Vec<(String, GeneratedPair)>,
                  result: BuildResult,
                  compile_commands: Option<PathBuf>|
     -> Result<BuildOutcome> {
        Ok(BuildOutcome::Built(BuildReport {
            name: manifest.name().to_string(),
            mode,
            generated,
            result,
            compile_commands,
            duration: start.elapsed(),
        }))
    };

    let generator = match prepare_generator(manifest, config, tools, &resolver) {
        Ok(generator) => generator,
        Err(err) if opts.emit_plan => return Err(err.into()),
        Err(err) => {
            return report(Vec::new(), BuildResult::failed(BuildStage::Resolution, err), None)
        }
    };

    let mut generated = Vec::new();
    if let Some(ref generator) = generator {
        for schema in manifest.protocols() {
            if opts.emit_plan {
                let protocol = generator.protocol(schema, ctx.build_dir())?;
                ctx.add_source(protocol.generated_source_path)?;
                continue;
            }

            tracing::info!("generating {}", schema);
            match generator.generate(schema, ctx.build_dir()) {
                Ok(pair) => {
                    ctx.add_source(&pair.source)?;
                    generated.push((schema.clone(), pair));
                }
                Err(err) => {
                    return report(generated, BuildResult::failed(BuildStage::Generation, err), None)
                }
            }
        }
    }

    configure(&mut ctx, manifest, config, !manifest.protocols().is_empty())?;

    if opts.emit_plan {
        let deps = resolver.resolve_all(ctx.dependencies())?;
        return Ok(BuildOutcome::Planned(executor.plan(&ctx, &deps)));
    }

    let compile_commands = if opts.emit_compile_commands || config.emit_compile_commands() {
        match resolver.resolve_all(ctx.dependencies()) {
            Ok(deps) => {
                let commands = executor.plan(&ctx, &deps).compile_commands(root);
                Some(write_compile_commands(ctx.build_dir(), &commands)?)
            }
            // Reported by the build below.
            Err(_) => None,
        }
    } else {
        None
    };

    tracing::info!("compiling `{}` ({})", manifest.name(), mode);
    let result = ctx.build(&resolver, &executor)?;
    report(generated, result, compile_commands)
}

/// Check required packages and construct the generator, if the manifest
/// declares protocols.
fn prepare_generator(
    manifest: &Manifest,
    config: &Config,
    tools: &Toolset,
    resolver: &DependencyResolver,
) -> Result<Option<CodeGenerator>, BuildError> {
    for package in &manifest.build.requires {
        resolver.assert_installed(package)?;
    }

    let codegen = match manifest.codegen {
        Some(ref codegen) if !codegen.protocols.is_empty() => codegen,
        _ => return Ok(None),
    };

    let parallel = config
        .parallel_codegen()
        .or(codegen.parallel)
        .unwrap_or(true);
    let generator = CodeGenerator::new(codegen.generator_spec(), resolver, tools.runner.clone())?
        .parallel(parallel);
    Ok(Some(generator))
}

/// Fold the manifest's includes, dependencies, sources and flags into `ctx`.
fn configure(
    ctx: &mut BuildContext,
    manifest: &Manifest,
    config: &Config,
    include_build_dir: bool,
) -> Result<()> {
    let root = &manifest.manifest_dir;

    ctx.add_includes(manifest.build.include.iter().map(|dir| root.join(dir)))?;
    if include_build_dir {
        let build_dir = ctx.build_dir().to_path_buf();
        ctx.add_include(build_dir)?;
    }

    for name in &manifest.build.dependencies {
        ctx.add_dependency(name.as_str())?;
    }

    let sources = glob_files(root, &manifest.build.sources)
        .with_context(|| format!("failed to expand sources of `{}`", manifest.name()))?;
    ctx.add_sources(sources)?;

    ctx.add_flags(config.toolchain.cflags.iter().cloned())?;
    ctx.add_flags(manifest.build.flags.iter().cloned())?;

    Ok(())
}
