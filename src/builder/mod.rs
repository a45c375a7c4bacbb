//! C build orchestration.
//!
//! This module implements protocol code generation, the build context, and the
//! single-invocation compiler driver.

pub mod codegen;
pub mod context;
pub mod error;
pub mod events;
pub mod executor;
pub mod plan;
pub mod result;

pub use codegen::{CodeGenerator, GeneratedPair, GeneratorSpec, ProtocolSpec};
pub use context::BuildContext;
pub use error::{BuildError, GenerationStage};
pub use events::BuildEvent;
pub use executor::BuildExecutor;
pub use plan::{BuildInvocation, CompileCommand};
pub use result::{BuildResult, BuildStage};
