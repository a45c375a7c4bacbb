//! High-level operations.
//!
//! This module contains the implementation of keel commands.

pub mod keel_build;
pub mod keel_clean;
pub mod keel_generate;
pub mod keel_new;

pub use keel_build::{build, build_with, BuildOptions, BuildOutcome, BuildReport, Toolset};
pub use keel_clean::clean;
pub use keel_generate::{flags, generate};
pub use keel_new::init_project;
