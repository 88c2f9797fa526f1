//! Integration tests for the `kiln` binary.

use std::fs;
use std::path::Path;

use assert_cmd::{Command, cargo::cargo_bin_cmd};
use predicates::prelude::*;
use tempfile::TempDir;

const DESCRIPTION: &str = r#"
output_path = "public/build"
public_path = "/build"
single_runtime_chunk = true
integrity = true

[entries]
app = "./assets/app.js"

[style_entries]
print = "./assets/print.css"
"#;

fn kiln_cmd(dir: &Path) -> Command {
    let mut cmd = cargo_bin_cmd!("kiln");
    cmd.current_dir(dir)
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG")
        .env_remove("KILN_ENVIRONMENT");
    cmd
}

fn project(description: &str) -> TempDir {
    let dir = TempDir::new().expect("temp dir");
    fs::write(dir.path().join("kiln.toml"), description).expect("write kiln.toml");
    dir
}

#[test]
fn test_help() {
    let dir = TempDir::new().expect("temp dir");
    kiln_cmd(dir.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("config"))
        .stdout(predicate::str::contains("entrypoints"));
}

#[test]
fn test_invalid_command() {
    let dir = TempDir::new().expect("temp dir");
    kiln_cmd(dir.path()).arg("invalid").assert().failure();
}

#[test]
fn test_config_prints_assembled_json() {
    let dir = project(DESCRIPTION);
    let output = kiln_cmd(dir.path())
        .args(["config", "--env", "production"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let config: serde_json::Value = serde_json::from_slice(&output).expect("stdout is JSON");
    assert_eq!(config["mode"], "production");
    assert_eq!(config["output"]["publicPath"], "/build/");
    assert_eq!(config["entry"]["app"], "./assets/app.js");
    assert_eq!(config["optimization"]["runtimeChunk"], "single");
}

#[test]
fn test_config_to_file() {
    let dir = project(DESCRIPTION);
    kiln_cmd(dir.path())
        .args(["config", "--output", "out/webpack.json"])
        .assert()
        .success();

    let json = fs::read_to_string(dir.path().join("out/webpack.json")).expect("read output");
    let config: serde_json::Value = serde_json::from_str(&json).expect("parse output");
    assert_eq!(config["mode"], "development");
}

#[test]
fn test_runtime_table_sets_environment() {
    let dir = project(&format!("{DESCRIPTION}\n[runtime]\nenvironment = \"production\"\n"));
    kiln_cmd(dir.path())
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"mode\": \"production\""));
}

#[test]
fn test_unknown_key_suggests_the_closest() {
    let dir = project("output_path = \"public/build\"\npublik_path = \"/build\"\n");
    kiln_cmd(dir.path())
        .arg("config")
        .assert()
        .failure()
        .stderr(predicate::str::contains("publik_path"))
        .stderr(predicate::str::contains("public_path"));
}

#[test]
fn test_unknown_option_suggests_the_closest() {
    let dir = project(&format!("{DESCRIPTION}\n[images]\nmax_size = 1024\n"));
    kiln_cmd(dir.path())
        .arg("config")
        .assert()
        .failure()
        .stderr(predicate::str::contains("configure_image_rule"))
        .stderr(predicate::str::contains("maxSize"));
}

#[test]
fn test_missing_output_path() {
    let dir = project("public_path = \"/build\"\n[entries]\napp = \"./app.js\"\n");
    kiln_cmd(dir.path())
        .arg("config")
        .assert()
        .failure()
        .stderr(predicate::str::contains("KILN_MISSING_OUTPUT_PATH"));
}

#[test]
fn test_missing_description() {
    let dir = TempDir::new().expect("temp dir");
    kiln_cmd(dir.path())
        .arg("config")
        .assert()
        .failure()
        .stderr(predicate::str::contains("kiln.toml"));
}

#[test]
fn test_entrypoints_writes_manifest() {
    let dir = project(DESCRIPTION);
    let build = dir.path().join("public/build");
    fs::create_dir_all(&build).expect("create build dir");
    fs::write(build.join("app.js"), "console.log('app');").expect("write app.js");
    fs::write(build.join("runtime.js"), "/* runtime */").expect("write runtime.js");
    fs::write(
        dir.path().join("stats.json"),
        r#"{
            "entrypoints": {
                "app": { "assets": ["runtime.js", "app.js"] },
                "print": { "assets": ["runtime.js", "print.css"] }
            }
        }"#,
    )
    .expect("write stats");

    kiln_cmd(dir.path())
        .args(["entrypoints", "--report", "stats.json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("entrypoints.json"));

    let manifest: serde_json::Value = serde_json::from_str(
        &fs::read_to_string(build.join("entrypoints.json")).expect("read manifest"),
    )
    .expect("parse manifest");
    assert_eq!(
        manifest["entrypoints"]["app"]["js"],
        serde_json::json!(["/build/runtime.js", "/build/app.js"])
    );
    assert!(
        manifest["integrity"]["/build/app.js"]
            .as_str()
            .is_some_and(|digest| digest.starts_with("sha384-"))
    );
    // print.css was never written, so it has no digest.
    assert!(manifest["integrity"].get("/build/print.css").is_none());
}
