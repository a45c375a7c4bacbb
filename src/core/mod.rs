//! Core project model: build modes and the Keel.toml manifest.

pub mod manifest;
pub mod mode;

pub use manifest::{find_manifest, Manifest, MANIFEST_NAME};
pub use mode::{default_flags, BuildMode};
