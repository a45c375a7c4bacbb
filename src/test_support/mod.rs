//! Test utilities and mocks for keel unit tests.
//!
//! [`MockToolRunner`] stands in for every external process (compiler,
//! generator, pkg-config) and [`MockPackageQuery`] for the system package
//! registry.
//!
//! # Example
//!
//! ```rust,ignore
//! let mut runner = MockToolRunner::new();
//! runner.expect_prefix("cc ", MockProcessOutput::success(""));
//! let runner = Arc::new(runner);
//! // hand `runner.clone()` to the code under test, then inspect runner.calls()
//! ```

pub mod fixtures;

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use anyhow::{bail, Result};

use crate::builder::error::BuildError;
use crate::resolver::query::PackageQuery;
use crate::util::process::{ProcessBuilder, ToolOutput, ToolRunner};

pub use fixtures::*;

/// Canned output for a mocked process.
#[derive(Debug, Clone)]
pub struct MockProcessOutput {
    pub status: i32,
    pub stdout: String,
    pub stderr: String,
}

impl MockProcessOutput {
    pub fn success(stdout: impl Into<String>) -> Self {
        MockProcessOutput {
            status: 0,
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    pub fn failure(status: i32, stderr: impl Into<String>) -> Self {
        MockProcessOutput {
            status,
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }

    fn to_tool_output(&self) -> ToolOutput {
        ToolOutput {
            status: Some(self.status),
            stdout: self.stdout.clone(),
            stderr: self.stderr.clone(),
        }
    }
}

/// Pattern for matching commands in MockToolRunner.
#[derive(Debug, Clone)]
pub enum CommandPattern {
    Exact(String),
    StartsWith(String),
}

impl CommandPattern {
    pub fn matches(&self, cmd: &str) -> bool {
        match self {
            CommandPattern::Exact(s) => cmd == s,
            CommandPattern::StartsWith(s) => cmd.starts_with(s),
        }
    }
}

#[derive(Debug, Clone)]
struct CommandExpectation {
    pattern: CommandPattern,
    output: MockProcessOutput,
    /// Written to the path in the command's last argument
    writes: Option<String>,
}

/// Mock process runner.
///
/// Expectations are checked in registration order; the first match wins.
/// Every run is recorded as `program arg1 arg2 ...`.
#[derive(Debug, Default)]
pub struct MockToolRunner {
    expectations: Vec<CommandExpectation>,
    unspawnable: Vec<String>,
    default_output: Option<MockProcessOutput>,
    calls: Mutex<Vec<String>>,
}

impl MockToolRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an expectation for an exact command match.
    pub fn expect(&mut self, cmd: &str, output: MockProcessOutput) -> &mut Self {
        self.push(CommandPattern::Exact(cmd.to_string()), output, None)
    }

    /// Add an expectation for a command starting with a prefix.
    pub fn expect_prefix(&mut self, prefix: &str, output: MockProcessOutput) -> &mut Self {
        self.push(CommandPattern::StartsWith(prefix.to_string()), output, None)
    }

    /// Like [`expect_prefix`](Self::expect_prefix), and also write `contents`
    /// to the file named by the last argument, the way a code generator
    /// would. The file is written even when `output` is a failure, as a
    /// generator that dies halfway leaves a partial file behind.
    pub fn expect_generates(
        &mut self,
        prefix: &str,
        output: MockProcessOutput,
        contents: &str,
    ) -> &mut Self {
        self.push(
            CommandPattern::StartsWith(prefix.to_string()),
            output,
            Some(contents.to_string()),
        )
    }

    /// Make runs of `program` fail as if it were not installed.
    pub fn fail_to_spawn(&mut self, program: &str) -> &mut Self {
        self.unspawnable.push(program.to_string());
        self
    }

    /// Output for commands that don't match any expectation.
    pub fn set_default(&mut self, output: MockProcessOutput) -> &mut Self {
        self.default_output = Some(output);
        self
    }

    fn push(
        &mut self,
        pattern: CommandPattern,
        output: MockProcessOutput,
        writes: Option<String>,
    ) -> &mut Self {
        self.expectations.push(CommandExpectation {
            pattern,
            output,
            writes,
        });
        self
    }

    /// All commands run so far, in order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    /// Number of recorded commands starting with `prefix`.
    pub fn count_prefix(&self, prefix: &str) -> usize {
        self.calls().iter().filter(|c| c.starts_with(prefix)).count()
    }
}

impl ToolRunner for MockToolRunner {
    fn run(&self, cmd: &ProcessBuilder) -> Result<ToolOutput> {
        let program = cmd.get_program().display().to_string();
        if self.unspawnable.contains(&program) {
            bail!("failed to spawn `{}`: No such file or directory", program);
        }

        let full_cmd = cmd.display_command();
        self.calls.lock().unwrap().push(full_cmd.clone());

        for exp in &self.expectations {
            if exp.pattern.matches(&full_cmd) {
                if let Some(ref contents) = exp.writes {
                    if let Some(target) = cmd.get_args().last() {
                        std::fs::write(target, contents)?;
                    }
                }
                return Ok(exp.output.to_tool_output());
            }
        }

        if let Some(ref default) = self.default_output {
            return Ok(default.to_tool_output());
        }

        bail!("unexpected command: {}", full_cmd)
    }
}

#[derive(Debug, Clone, Default)]
struct MockPackage {
    flags: Vec<String>,
    variables: HashMap<String, String>,
}

/// In-memory package registry.
#[derive(Debug, Default)]
pub struct MockPackageQuery {
    packages: HashMap<String, MockPackage>,
    flag_queries: AtomicUsize,
}

impl MockPackageQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a package with the given flags.
    pub fn with_package(mut self, name: &str, flags: &[&str]) -> Self {
        self.packages.entry(name.to_string()).or_default().flags =
            flags.iter().map(|f| f.to_string()).collect();
        self
    }

    /// Register a package variable; registers the package too.
    pub fn with_variable(mut self, name: &str, variable: &str, value: impl Into<PathBuf>) -> Self {
        self.packages
            .entry(name.to_string())
            .or_default()
            .variables
            .insert(
                variable.to_string(),
                value.into().display().to_string(),
            );
        self
    }

    /// How many times flags were requested from the registry.
    pub fn flag_queries(&self) -> usize {
        self.flag_queries.load(Ordering::SeqCst)
    }
}

impl PackageQuery for MockPackageQuery {
    fn exists(&self, package: &str) -> Result<bool, BuildError> {
        Ok(self.packages.contains_key(package))
    }

    fn flags(&self, package: &str) -> Result<Option<Vec<String>>, BuildError> {
        self.flag_queries.fetch_add(1, Ordering::SeqCst);
        Ok(self.packages.get(package).map(|p| p.flags.clone()))
    }

    fn variable(&self, package: &str, variable: &str) -> Result<Option<String>, BuildError> {
        Ok(self
            .packages
            .get(package)
            .and_then(|p| p.variables.get(variable).cloned()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_matching_expectation_wins() {
        let mut runner = MockToolRunner::new();
        runner
            .expect("cc --version", MockProcessOutput::success("cc 13"))
            .expect_prefix("cc", MockProcessOutput::failure(1, "nope"));

        let out = runner.run(&ProcessBuilder::new("cc").arg("--version")).unwrap();
        assert_eq!(out.stdout, "cc 13");

        let out = runner.run(&ProcessBuilder::new("cc").arg("a.c")).unwrap();
        assert_eq!(out.status, Some(1));
        assert_eq!(runner.calls(), vec!["cc --version", "cc a.c"]);
    }

    #[test]
    fn test_unexpected_command_errors() {
        let runner = MockToolRunner::new();
        assert!(runner.run(&ProcessBuilder::new("ld")).is_err());
    }
}
