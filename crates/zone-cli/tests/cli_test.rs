//! End-to-end tests running the `zone` binary against manifests on disk.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::path::Path;
use std::process::{Command, Output};

const MANIFEST: &str = r#"
namespaces:
  - path: shared
    values:
      greeting: hello
  - path: app
    imports: [shared]
    aliases:
      message: greeting
"#;

fn zone(manifest: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_zone"))
        .arg("--manifest")
        .arg(manifest)
        .arg("--no-host")
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("run zone")
}

fn write(dir: &Path, name: &str, text: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, text).expect("write manifest");
    path
}

#[test]
fn get_prints_resolved_alias() {
    let dir = tempfile::tempdir().expect("tempdir");
    let output = zone(&write(dir.path(), "zone.yaml", MANIFEST), &["get", "app.message"]);
    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout), "hello\n");
}

#[test]
fn names_as_json() {
    let dir = tempfile::tempdir().expect("tempdir");
    let output = zone(
        &write(dir.path(), "zone.yaml", MANIFEST),
        &["--output", "json", "names"],
    );
    assert!(output.status.success());
    let names: Vec<String> = serde_json::from_slice(&output.stdout).expect("json");
    assert_eq!(names, vec!["app.message", "shared.greeting"]);
}

#[test]
fn check_fails_on_dangling_import() {
    let dir = tempfile::tempdir().expect("tempdir");
    let manifest = write(
        dir.path(),
        "zone.json",
        r#"{ "namespaces": [ { "path": "app", "imports": ["missing"] } ] }"#,
    );
    let output = zone(&manifest, &["check"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("missing"));
}

#[test]
fn missing_binding_exits_with_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    let output = zone(&write(dir.path(), "zone.yaml", MANIFEST), &["get", "app.nothing"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("not found"));
}
