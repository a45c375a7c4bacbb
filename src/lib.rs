//! Keel - build orchestration for small C programs
//!
//! This crate provides the core library functionality for keel: protocol
//! code generation, system library resolution through pkg-config, and a
//! sealed build context that drives a single compiler invocation.

pub mod builder;
pub mod core;
pub mod ops;
pub mod resolver;
pub mod util;

/// Test utilities and mocks for keel unit tests.
///
/// This module is only available when compiling with `--cfg test` or
/// running tests. It provides mock implementations for process execution
/// and package queries.
#[cfg(test)]
pub mod test_support;

pub use builder::{BuildContext, BuildError, BuildExecutor, BuildResult, CodeGenerator};
pub use core::{BuildMode, Manifest};
pub use resolver::{Dependency, DependencyResolver};
pub use util::config::Config;
