//! Build context - the accumulated description of one build.
//!
//! A context collects sources, include directories, library dependencies and
//! raw flags in the order they are added. Calling [`BuildContext::build`]
//! seals it for good: every later mutation, and any second build, fails with
//! [`BuildError::Configuration`]. A failed build is not retried on the same
//! context; construct a new one.

use std::path::{Path, PathBuf};

use crate::builder::error::BuildError;
use crate::builder::executor::BuildExecutor;
use crate::builder::result::{BuildResult, BuildStage};
use crate::core::mode::BuildMode;
use crate::resolver::DependencyResolver;
use crate::util::fs::ensure_dir;

/// Name of the directory under the project root holding per-mode build dirs.
pub const BUILD_DIR_NAME: &str = "build";

#[derive(Debug, Clone)]
pub struct BuildContext {
    name: String,
    mode: BuildMode,
    build_dir: PathBuf,
    sources: Vec<PathBuf>,
    include_dirs: Vec<PathBuf>,
    dependencies: Vec<String>,
    flags: Vec<String>,
    sealed: bool,
}

impl BuildContext {
    /// Create a context rooted at the current directory.
    pub fn new(name: impl Into<String>, mode: BuildMode) -> Result<Self, BuildError> {
        let root = std::env::current_dir().map_err(|e| BuildError::io(".", &e))?;
        Self::with_root(&root, name, mode)
    }

    /// Create a context whose build directory is `<root>/build/<mode>`.
    pub fn with_root(
        root: &Path,
        name: impl Into<String>,
        mode: BuildMode,
    ) -> Result<Self, BuildError> {
        Self::with_build_dir(name, mode, root.join(BUILD_DIR_NAME).join(mode.as_str()))
    }

    /// Create a context with an explicit build directory.
    ///
    /// The directory is created if it does not exist yet.
    pub fn with_build_dir(
        name: impl Into<String>,
        mode: BuildMode,
        build_dir: impl Into<PathBuf>,
    ) -> Result<Self, BuildError> {
        let build_dir = build_dir.into();
        ensure_dir(&build_dir).map_err(|e| BuildError::io(&build_dir, &e))?;
        Ok(Self::unchecked(name.into(), mode, build_dir))
    }

    /// Like [`with_root`](Self::with_root), but leaves the filesystem alone.
    ///
    /// For assembling an invocation that is never executed; the executor
    /// creates the directory if such a context is built after all.
    pub fn detached(root: &Path, name: impl Into<String>, mode: BuildMode) -> Self {
        let build_dir = root.join(BUILD_DIR_NAME).join(mode.as_str());
        Self::unchecked(name.into(), mode, build_dir)
    }

    fn unchecked(name: String, mode: BuildMode, build_dir: PathBuf) -> Self {
        BuildContext {
            name,
            mode,
            build_dir,
            sources: Vec::new(),
            include_dirs: Vec::new(),
            dependencies: Vec::new(),
            flags: Vec::new(),
            sealed: false,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn mode(&self) -> BuildMode {
        self.mode
    }

    pub fn build_dir(&self) -> &Path {
        &self.build_dir
    }

    pub fn sources(&self) -> &[PathBuf] {
        &self.sources
    }

    pub fn include_dirs(&self) -> &[PathBuf] {
        &self.include_dirs
    }

    pub fn dependencies(&self) -> &[String] {
        &self.dependencies
    }

    pub fn flags(&self) -> &[String] {
        &self.flags
    }

    pub fn is_sealed(&self) -> bool {
        self.sealed
    }

    /// Where the compiled artifact is written.
    pub fn artifact_path(&self) -> PathBuf {
        self.build_dir.join(&self.name)
    }

    fn check_unsealed(&self, operation: impl FnOnce() -> String) -> Result<(), BuildError> {
        if self.sealed {
            Err(BuildError::sealed(operation()))
        } else {
            Ok(())
        }
    }

    /// Append a source file. Duplicates are kept.
    pub fn add_source(&mut self, path: impl Into<PathBuf>) -> Result<&mut Self, BuildError> {
        let path = path.into();
        self.check_unsealed(|| format!("add source `{}`", path.display()))?;
        self.sources.push(path);
        Ok(self)
    }

    /// Append several source files, in iteration order.
    pub fn add_sources<I, P>(&mut self, paths: I) -> Result<&mut Self, BuildError>
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.check_unsealed(|| "add sources".to_string())?;
        self.sources.extend(paths.into_iter().map(Into::into));
        Ok(self)
    }

    /// Append an include directory. Earlier directories are searched first.
    pub fn add_include(&mut self, dir: impl Into<PathBuf>) -> Result<&mut Self, BuildError> {
        let dir = dir.into();
        self.check_unsealed(|| format!("add include directory `{}`", dir.display()))?;
        self.include_dirs.push(dir);
        Ok(self)
    }

    /// Append several include directories, in iteration order.
    pub fn add_includes<I, P>(&mut self, dirs: I) -> Result<&mut Self, BuildError>
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.check_unsealed(|| "add include directories".to_string())?;
        self.include_dirs.extend(dirs.into_iter().map(Into::into));
        Ok(self)
    }

    /// Register a system library. Resolution happens at build time.
    ///
    /// Registering the same name twice keeps the first position.
    pub fn add_dependency(&mut self, name: impl Into<String>) -> Result<&mut Self, BuildError> {
        let name = name.into();
        self.check_unsealed(|| format!("add dependency `{}`", name))?;
        if self.dependencies.contains(&name) {
            tracing::debug!("dependency `{}` already registered", name);
        } else {
            self.dependencies.push(name);
        }
        Ok(self)
    }

    /// Append a raw compiler/linker flag.
    pub fn add_flag(&mut self, flag: impl Into<String>) -> Result<&mut Self, BuildError> {
        let flag = flag.into();
        self.check_unsealed(|| format!("add flag `{}`", flag))?;
        self.flags.push(flag);
        Ok(self)
    }

    /// Append several raw flags, in iteration order.
    pub fn add_flags<I, S>(&mut self, flags: I) -> Result<&mut Self, BuildError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.check_unsealed(|| "add flags".to_string())?;
        self.flags.extend(flags.into_iter().map(Into::into));
        Ok(self)
    }

    /// Seal the context, resolve its dependencies and run the compiler.
    ///
    /// Returns `Err` only when the context was already sealed; that call
    /// leaves the context untouched. Every other failure is reported as an
    /// unsuccessful [`BuildResult`] naming the stage it happened in.
    pub fn build(
        &mut self,
        resolver: &DependencyResolver,
        executor: &BuildExecutor,
    ) -> Result<BuildResult, BuildError> {
        self.check_unsealed(|| "build again".to_string())?;
        self.sealed = true;

        tracing::info!(
            "building `{}` ({}) with {} source(s)",
            self.name,
            self.mode,
            self.sources.len()
        );

        let deps = match resolver.resolve_all(&self.dependencies) {
            Ok(deps) => deps,
            Err(err) => return Ok(BuildResult::failed(BuildStage::Resolution, err)),
        };

        Ok(executor.execute(self, &deps))
    }
}
