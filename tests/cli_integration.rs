//! CLI integration tests for keel.
//!
//! These tests drive the binary from project creation through building, with
//! `true`, `false` and small shell scripts standing in for the C compiler,
//! pkg-config and the protocol generator.

use std::fs;
use std::path::Path;
use std::process::Command;

use assert_cmd::prelude::*;
use predicates::prelude::*;
use tempfile::TempDir;

/// Get the keel binary command, isolated from the user's global config.
fn keel(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("keel").unwrap();
    cmd.env("HOME", home)
        .env_remove("CC")
        .env_remove("PKG_CONFIG")
        .env_remove("KEEL_MANIFEST_PATH");
    cmd
}

/// Create a temporary directory for test projects.
fn temp_dir() -> TempDir {
    TempDir::new().unwrap()
}

/// Initialize a project named `app` in `dir`.
fn init_app(dir: &Path) {
    keel(dir)
        .args(["init", "--name", "app"])
        .current_dir(dir)
        .assert()
        .success();
}

/// Write an executable shell script.
#[cfg(unix)]
fn write_script(path: &Path, body: &str) {
    use std::os::unix::fs::PermissionsExt;

    fs::write(path, format!("#!/bin/sh\n{}", body)).unwrap();
    fs::set_permissions(path, fs::Permissions::from_mode(0o755)).unwrap();
}

fn write_manifest(dir: &Path, build_section: &str) {
    fs::write(
        dir.join("Keel.toml"),
        format!("[package]\nname = \"app\"\n\n[build]\n{}", build_section),
    )
    .unwrap();
}

// ============================================================================
// keel init
// ============================================================================

#[test]
fn test_init_creates_manifest() {
    let tmp = temp_dir();

    init_app(tmp.path());

    let manifest = fs::read_to_string(tmp.path().join("Keel.toml")).unwrap();
    assert!(manifest.contains("name = \"app\""));
    assert!(tmp.path().join("src/main.c").exists());
}

#[test]
fn test_init_uses_directory_name() {
    let tmp = temp_dir();
    let project = tmp.path().join("client");

    keel(tmp.path())
        .args(["init"])
        .arg(&project)
        .assert()
        .success();

    let manifest = fs::read_to_string(project.join("Keel.toml")).unwrap();
    assert!(manifest.contains("name = \"client\""));
}

#[test]
fn test_init_fails_if_manifest_exists() {
    let tmp = temp_dir();
    init_app(tmp.path());

    keel(tmp.path())
        .args(["init", "--name", "app"])
        .current_dir(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

// ============================================================================
// keel build
// ============================================================================

#[test]
fn test_build_without_manifest_fails() {
    let tmp = temp_dir();

    keel(tmp.path())
        .args(["build"])
        .current_dir(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("Keel.toml"));
}

#[test]
fn test_build_plan_prints_invocation() {
    let tmp = temp_dir();
    init_app(tmp.path());

    keel(tmp.path())
        .args(["build", "--plan", "--release"])
        .current_dir(tmp.path())
        .env("CC", "cc")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"mode\": \"release\""))
        .stdout(predicate::str::contains("-DNDEBUG"))
        .stdout(predicate::str::contains("main.c"));

    assert!(!tmp.path().join("build/release/app").exists());
}

#[cfg(unix)]
#[test]
fn test_build_succeeds_with_passing_compiler() {
    let tmp = temp_dir();
    init_app(tmp.path());

    keel(tmp.path())
        .args(["build"])
        .current_dir(tmp.path())
        .env("CC", "true")
        .assert()
        .success()
        .stderr(predicate::str::contains("Finished `app`"));

    assert!(tmp.path().join("build/debug").is_dir());
}

#[cfg(unix)]
#[test]
fn test_build_reports_compiler_failure() {
    let tmp = temp_dir();
    init_app(tmp.path());

    keel(tmp.path())
        .args(["build"])
        .current_dir(tmp.path())
        .env("CC", "false")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("compilation failed"));
}

#[cfg(unix)]
#[test]
fn test_build_missing_dependency_names_it() {
    let tmp = temp_dir();
    fs::create_dir(tmp.path().join("src")).unwrap();
    fs::write(tmp.path().join("src/main.c"), "int main(void) { return 0; }\n").unwrap();
    write_manifest(
        tmp.path(),
        "sources = [\"src/*.c\"]\ndependencies = [\"nope\"]\n",
    );

    keel(tmp.path())
        .args(["build"])
        .current_dir(tmp.path())
        .env("CC", "true")
        .env("PKG_CONFIG", "false")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("`nope`"));
}

#[cfg(unix)]
#[test]
fn test_build_json_events() {
    let tmp = temp_dir();
    init_app(tmp.path());

    keel(tmp.path())
        .args(["build", "--message-format", "json"])
        .current_dir(tmp.path())
        .env("CC", "false")
        .assert()
        .failure()
        .stdout(predicate::str::contains("\"reason\":\"build-started\""))
        .stdout(predicate::str::contains("\"stage\":\"compilation\""))
        .stdout(predicate::str::contains("\"success\":false"));
}

#[cfg(unix)]
#[test]
fn test_build_emits_compile_commands() {
    let tmp = temp_dir();
    init_app(tmp.path());

    keel(tmp.path())
        .args(["build", "--emit-compile-commands"])
        .current_dir(tmp.path())
        .env("CC", "true")
        .assert()
        .success();

    let db = fs::read_to_string(tmp.path().join("build/debug/compile_commands.json")).unwrap();
    assert!(db.contains("main.c"));
}

#[cfg(unix)]
#[test]
fn test_manifest_path_from_another_directory() {
    let tmp = temp_dir();
    let project = tmp.path().join("project");
    fs::create_dir(&project).unwrap();
    init_app(&project);

    keel(tmp.path())
        .args(["build", "--manifest-path"])
        .arg(project.join("Keel.toml"))
        .current_dir(tmp.path())
        .env("CC", "true")
        .assert()
        .success();

    assert!(project.join("build/debug").is_dir());
}

#[test]
fn test_relative_manifest_path_plans_absolute_paths() {
    let tmp = temp_dir();
    let project = tmp.path().join("sub");
    fs::create_dir(&project).unwrap();
    init_app(&project);

    let output = keel(tmp.path())
        .args(["build", "--plan", "--manifest-path", "sub/Keel.toml"])
        .current_dir(tmp.path())
        .env("CC", "cc")
        .output()
        .unwrap();
    assert!(output.status.success());

    let plan: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let source = Path::new(plan["sources"][0].as_str().unwrap());
    assert!(source.is_absolute());
    assert!(source.ends_with("sub/src/main.c"));
    assert!(Path::new(plan["output"].as_str().unwrap()).is_absolute());
}

#[cfg(unix)]
#[test]
fn test_relative_manifest_path_compiles_existing_sources() {
    let tmp = temp_dir();
    let project = tmp.path().join("sub");
    fs::create_dir(&project).unwrap();
    init_app(&project);

    // Fails unless every source argument names a file reachable from its cwd.
    let compiler = tmp.path().join("checking-cc");
    write_script(
        &compiler,
        r#"for arg in "$@"; do
  case "$arg" in
    *.c) [ -f "$arg" ] || { echo "no such file: $arg" >&2; exit 1; } ;;
  esac
done
"#,
    );

    keel(tmp.path())
        .args(["build", "--manifest-path", "sub/Keel.toml"])
        .current_dir(tmp.path())
        .env("CC", &compiler)
        .assert()
        .success();

    assert!(project.join("build/debug").is_dir());
    assert!(!tmp.path().join("sub/sub").exists());
}

// ============================================================================
// keel generate
// ============================================================================

#[cfg(unix)]
#[test]
fn test_generate_failure_shows_generator_output() {
    let tmp = temp_dir();
    let data = tmp.path().join("data");
    fs::create_dir(&data).unwrap();

    let pkg_config = tmp.path().join("fake-pkg-config");
    write_script(&pkg_config, &format!("echo {}\n", data.display()));
    let scanner = tmp.path().join("fake-scanner");
    write_script(
        &scanner,
        "echo partial > \"$3\"\necho \"x.xml:12: parse error\" >&2\nexit 1\n",
    );

    fs::write(
        tmp.path().join("Keel.toml"),
        format!(
            "[package]\nname = \"app\"\n\n[codegen]\ntool = \"{}\"\nparallel = false\n",
            scanner.display()
        ),
    )
    .unwrap();

    keel(tmp.path())
        .args(["generate", "stable/x.xml", "--out-dir", "out"])
        .current_dir(tmp.path())
        .env("CC", "true")
        .env("PKG_CONFIG", &pkg_config)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("x.xml:12: parse error"))
        .stderr(predicate::str::contains("could not generate `stable/x.xml`"));

    assert!(!tmp.path().join("out/x-protocol.h").exists());
    assert!(!tmp.path().join("out/x-protocol.c").exists());
}

// ============================================================================
// keel flags / clean / completions
// ============================================================================

#[cfg(unix)]
#[test]
fn test_flags_unknown_library_fails() {
    let tmp = temp_dir();

    keel(tmp.path())
        .args(["flags", "nope"])
        .current_dir(tmp.path())
        .env("CC", "true")
        .env("PKG_CONFIG", "false")
        .assert()
        .failure()
        .stderr(predicate::str::contains("`nope` is not installed"));
}

#[test]
fn test_clean_removes_build_dir() {
    let tmp = temp_dir();
    init_app(tmp.path());
    fs::create_dir_all(tmp.path().join("build/debug")).unwrap();
    fs::create_dir_all(tmp.path().join("build/release")).unwrap();

    keel(tmp.path())
        .args(["clean", "--release"])
        .current_dir(tmp.path())
        .assert()
        .success();
    assert!(tmp.path().join("build/debug").exists());
    assert!(!tmp.path().join("build/release").exists());

    keel(tmp.path())
        .args(["clean"])
        .current_dir(tmp.path())
        .assert()
        .success();
    assert!(!tmp.path().join("build").exists());
}

#[test]
fn test_completions() {
    let tmp = temp_dir();

    keel(tmp.path())
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("keel"));
}
