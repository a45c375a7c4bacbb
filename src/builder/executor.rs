//! Build executor with progress reporting.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use indicatif::{ProgressBar, ProgressStyle};

use crate::builder::context::BuildContext;
use crate::builder::error::BuildError;
use crate::builder::plan::BuildInvocation;
use crate::builder::result::{BuildResult, BuildStage};
use crate::resolver::Dependency;
use crate::util::fs::ensure_dir;
use crate::util::process::ToolRunner;

/// Runs the compiler for a sealed context.
pub struct BuildExecutor {
    compiler: PathBuf,
    runner: Arc<dyn ToolRunner>,
    cwd: Option<PathBuf>,
    progress: bool,
}

impl BuildExecutor {
    pub fn new(compiler: impl Into<PathBuf>, runner: Arc<dyn ToolRunner>) -> Self {
        BuildExecutor {
            compiler: compiler.into(),
            runner,
            cwd: None,
            progress: false,
        }
    }

    /// Run the compiler from `dir`, so relative sources resolve against it.
    pub fn cwd(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cwd = Some(dir.into());
        self
    }

    /// Show a spinner while the compiler runs.
    pub fn progress(mut self, progress: bool) -> Self {
        self.progress = progress;
        self
    }

    pub fn compiler(&self) -> &Path {
        &self.compiler
    }

    /// The invocation [`execute`](Self::execute) would run, without running it.
    pub fn plan(&self, ctx: &BuildContext, deps: &[Dependency]) -> BuildInvocation {
        BuildInvocation::assemble(&self.compiler, ctx, deps)
    }

    /// Invoke the compiler exactly once for `ctx`.
    pub fn execute(&self, ctx: &BuildContext, deps: &[Dependency]) -> BuildResult {
        if !ctx.is_sealed() {
            return BuildResult::failed(BuildStage::Configuration, BuildError::unsealed());
        }

        if let Err(e) = ensure_dir(ctx.build_dir()) {
            return BuildResult::failed(BuildStage::Compilation, BuildError::io(ctx.build_dir(), &e));
        }

        let invocation = self.plan(ctx, deps);
        let mut cmd = invocation.to_process();
        if let Some(ref cwd) = self.cwd {
            cmd = cmd.cwd(cwd);
        }
        tracing::debug!("compiler invocation {}: {}", invocation.fingerprint, cmd.display_command());

        let start = Instant::now();
        let pb = self.progress.then(|| spinner(ctx.name()));

        let output = self.runner.run(&cmd);

        if let Some(pb) = pb {
            pb.finish_and_clear();
        }

        let output = match output {
            Ok(output) => output,
            Err(err) => {
                return BuildResult::failed(
                    BuildStage::Compilation,
                    BuildError::launch(self.compiler.display(), &err),
                )
            }
        };

        if !output.success() {
            tracing::debug!("compiler exited with {:?}", output.status);
            return BuildResult::failed(
                BuildStage::Compilation,
                BuildError::Compilation {
                    exit_code: output.status,
                    diagnostic: output.diagnostic(),
                },
            );
        }

        let warnings = output.diagnostic();
        if !warnings.is_empty() {
            tracing::warn!("{}", warnings);
        }

        tracing::info!(
            "finished `{}` in {:.2}s",
            ctx.name(),
            start.elapsed().as_secs_f64()
        );
        BuildResult::success(invocation.output, output.status)
    }
}

fn spinner(name: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
        pb.set_style(style);
    }
    pb.set_message(format!("Compiling {}", name));
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}
