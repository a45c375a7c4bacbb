//! Build mode and its default compiler flags.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Debug or release.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildMode {
    #[default]
    Debug,
    Release,
}

impl BuildMode {
    /// Pick the mode from a `--release` switch.
    pub fn from_release(release: bool) -> Self {
        if release {
            BuildMode::Release
        } else {
            BuildMode::Debug
        }
    }

    /// Name used for the build subdirectory and in messages.
    pub fn as_str(&self) -> &'static str {
        match self {
            BuildMode::Debug => "debug",
            BuildMode::Release => "release",
        }
    }
}

impl fmt::Display for BuildMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BuildMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "debug" => Ok(BuildMode::Debug),
            "release" => Ok(BuildMode::Release),
            _ => Err(format!(
                "invalid build mode '{}'; expected 'debug' or 'release'",
                s
            )),
        }
    }
}

/// Default compiler flags for a build mode.
///
/// These come first in the flag section of the compiler invocation, so
/// dependency and user flags placed after them win on toolchains where the
/// last occurrence of a flag takes effect.
pub fn default_flags(mode: BuildMode) -> Vec<String> {
    let flags: &[&str] = match mode {
        BuildMode::Debug => &["-Wall", "-Wextra", "-O0", "-g"],
        BuildMode::Release => &["-Wall", "-Wextra", "-O2", "-DNDEBUG"],
    };
    flags.iter().map(|f| f.to_string()).collect()
}
