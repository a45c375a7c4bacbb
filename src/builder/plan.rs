//! Compiler invocation assembly.
//!
//! A [`BuildInvocation`] is the single compile-and-link command for a sealed
//! context. Its argument order is fixed:
//!
//! 1. sources, in registration order
//! 2. `-I<dir>` for each include directory, in registration order
//! 3. the build mode's default flags
//! 4. dependency flags, dependency by dependency in registration order
//! 5. raw flags, in registration order
//! 6. `-o <build dir>/<name>`
//!
//! Flags later on the line win over earlier ones on toolchains that honour
//! the last occurrence, so raw flags can override the defaults.

use std::path::{Path, PathBuf};

use anyhow::Result;
use serde::Serialize;

use crate::builder::context::BuildContext;
use crate::core::mode::default_flags;
use crate::resolver::Dependency;
use crate::util::fs::write_string;
use crate::util::hash::Fingerprint;
use crate::util::process::ProcessBuilder;

/// The fully assembled compiler command for one build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildInvocation {
    pub name: String,
    pub mode: String,
    pub program: PathBuf,
    pub sources: Vec<PathBuf>,
    pub include_flags: Vec<String>,
    pub default_flags: Vec<String>,
    pub dependency_flags: Vec<String>,
    pub raw_flags: Vec<String>,
    pub output: PathBuf,
    /// Complete argument list, in the order passed to the compiler
    pub args: Vec<String>,
    /// Short hash of program and arguments
    pub fingerprint: String,
}

impl BuildInvocation {
    /// Assemble the invocation for `ctx` with already-resolved dependencies.
    pub fn assemble(program: &Path, ctx: &BuildContext, deps: &[Dependency]) -> Self {
        let sources = ctx.sources().to_vec();
        let include_flags: Vec<String> = ctx
            .include_dirs()
            .iter()
            .map(|dir| format!("-I{}", dir.display()))
            .collect();
        let default_flags = default_flags(ctx.mode());
        let dependency_flags: Vec<String> =
            deps.iter().flat_map(|d| d.flags.iter().cloned()).collect();
        let raw_flags = ctx.flags().to_vec();
        let output = ctx.artifact_path();

        let mut args: Vec<String> = sources.iter().map(|s| s.display().to_string()).collect();
        args.extend(include_flags.iter().cloned());
        args.extend(default_flags.iter().cloned());
        args.extend(dependency_flags.iter().cloned());
        args.extend(raw_flags.iter().cloned());
        args.push("-o".to_string());
        args.push(output.display().to_string());

        let fingerprint = {
            let program = program.display().to_string();
            let mut fp = Fingerprint::new();
            fp.update_str(&program).update_strs(args.iter().map(String::as_str));
            fp.finish_short()
        };

        BuildInvocation {
            name: ctx.name().to_string(),
            mode: ctx.mode().to_string(),
            program: program.to_path_buf(),
            sources,
            include_flags,
            default_flags,
            dependency_flags,
            raw_flags,
            output,
            args,
            fingerprint,
        }
    }

    pub fn to_process(&self) -> ProcessBuilder {
        ProcessBuilder::new(&self.program).args(&self.args)
    }

    /// One compile database entry per source.
    ///
    /// Entries describe `-c` compiles, so link-only flags are left out.
    pub fn compile_commands(&self, directory: &Path) -> Vec<CompileCommand> {
        self.sources
            .iter()
            .map(|source| {
                let mut arguments = vec![self.program.display().to_string(), "-c".to_string()];
                arguments.extend(self.include_flags.iter().cloned());
                arguments.extend(self.default_flags.iter().cloned());
                arguments.extend(
                    self.dependency_flags
                        .iter()
                        .chain(&self.raw_flags)
                        .filter(|flag| !is_link_only(flag))
                        .cloned(),
                );
                arguments.push(source.display().to_string());

                CompileCommand {
                    directory: directory.to_path_buf(),
                    file: source.clone(),
                    arguments,
                }
            })
            .collect()
    }
}

/// Flags that only mean something to the linker.
fn is_link_only(flag: &str) -> bool {
    flag.starts_with("-l") || flag.starts_with("-L") || flag.starts_with("-Wl,")
}

/// An entry of compile_commands.json.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompileCommand {
    pub directory: PathBuf,
    pub file: PathBuf,
    pub arguments: Vec<String>,
}

/// Write `compile_commands.json` into `dir`, returning its path.
pub fn write_compile_commands(dir: &Path, commands: &[CompileCommand]) -> Result<PathBuf> {
    let path = dir.join("compile_commands.json");
    let json = serde_json::to_string_pretty(commands)?;
    write_string(&path, &json)?;
    Ok(path)
}
