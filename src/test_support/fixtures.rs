//! Test fixtures for common test scenarios.

use std::path::{Path, PathBuf};

/// A project laid out on disk: Keel.toml plus source files.
#[derive(Debug, Clone)]
pub struct ProjectFixture {
    pub name: String,
    pub manifest: String,
    /// (path relative to project root, content)
    pub files: Vec<(PathBuf, String)>,
}

impl ProjectFixture {
    /// An executable with one source file and a header directory.
    pub fn executable(name: impl Into<String>) -> Self {
        let name = name.into();
        let manifest = format!(
            r#"[package]
name = "{name}"

[build]
sources = ["src/*.c"]
include = ["include"]
"#
        );

        ProjectFixture {
            name,
            manifest,
            files: vec![
                (
                    PathBuf::from("src/main.c"),
                    "#include \"app.h\"\nint main(void) { return APP_OK; }\n".to_string(),
                ),
                (
                    PathBuf::from("include/app.h"),
                    "#define APP_OK 0\n".to_string(),
                ),
            ],
        }
    }

    /// Replace the manifest.
    pub fn with_manifest(mut self, manifest: impl Into<String>) -> Self {
        self.manifest = manifest.into();
        self
    }

    /// Add a file.
    pub fn with_file(mut self, path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        self.files.push((path.into(), content.into()));
        self
    }

    /// Write the project into `root`. Returns the manifest path.
    pub fn write_to(&self, root: &Path) -> PathBuf {
        for (path, content) in &self.files {
            let full = root.join(path);
            if let Some(parent) = full.parent() {
                std::fs::create_dir_all(parent).unwrap();
            }
            std::fs::write(full, content).unwrap();
        }

        let manifest_path = root.join(crate::core::MANIFEST_NAME);
        std::fs::write(&manifest_path, &self.manifest).unwrap();
        manifest_path
    }
}

/// Create a fake protocol data directory holding `stable/xdg-shell/xdg-shell.xml`.
pub fn protocol_data_dir(root: &Path) -> PathBuf {
    let dir = root.join("share/wayland-protocols");
    let schema = dir.join("stable/xdg-shell/xdg-shell.xml");
    std::fs::create_dir_all(schema.parent().unwrap()).unwrap();
    std::fs::write(&schema, "<protocol name=\"xdg_shell\"/>\n").unwrap();
    dir
}
