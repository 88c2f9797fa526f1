//! The entry points manifest written after a build.

use std::fs;
use std::path::Path;

use kiln_bundler::entrypoints::IntegrityHasher;
use kiln_bundler::{
    AssetReport, BuildStateExt, ENTRYPOINTS_FILENAME, EntryManifest, EntryPointsOptions,
    EntryPointsPlugin,
};
use kiln_config::{BuildState, HashAlgorithm, RuntimeContext};
use tempfile::TempDir;

fn write_asset(dir: &Path, name: &str, contents: &str) {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create asset dir");
    }
    fs::write(path, contents).expect("write asset");
}

fn read_manifest(dir: &Path) -> EntryManifest {
    let json = fs::read_to_string(dir.join(ENTRYPOINTS_FILENAME)).expect("read manifest");
    serde_json::from_str(&json).expect("parse manifest")
}

#[test]
fn manifest_is_written_from_assembled_config() {
    let out = TempDir::new().expect("temp dir");
    let mut state = BuildState::new(RuntimeContext::default());
    state
        .set_output_path(out.path())
        .set_public_path("/build")
        .add_entry("app", "./assets/app.js")
        .expect("add entry")
        .add_style_entry("print", "./assets/print.css")
        .expect("add style entry")
        .enable_single_runtime_chunk();

    let config = state.get_config().expect("config");
    let report = AssetReport::from_json_str(
        r#"{
            "entrypoints": {
                "app": { "assets": [{ "name": "runtime.js" }, { "name": "app.js" }, { "name": "app.css" }] },
                "print": { "assets": ["runtime.js", "print.css"] },
                "_tmp_copy": { "assets": ["_tmp_copy.js"] }
            }
        }"#,
    )
    .expect("report");

    let manifest = config
        .entry_points_plugin()
        .after_emit(&report)
        .expect("after emit");
    assert_eq!(read_manifest(out.path()), manifest);

    let json: serde_json::Value = serde_json::from_str(
        &fs::read_to_string(out.path().join(ENTRYPOINTS_FILENAME)).expect("read"),
    )
    .expect("parse");
    assert_eq!(
        json,
        serde_json::json!({
            "entrypoints": {
                "app": { "js": ["/build/runtime.js", "/build/app.js"], "css": ["/build/app.css"] },
                "print": { "js": ["/build/runtime.js"], "css": ["/build/print.css"] }
            }
        })
    );
}

#[test]
fn shared_asset_is_hashed_once() {
    let out = TempDir::new().expect("temp dir");
    write_asset(out.path(), "shared.abc123.js", "console.log('shared');");
    write_asset(out.path(), "app.css", "body { color: red }");

    let plugin = EntryPointsPlugin::new(EntryPointsOptions {
        output_path: out.path().to_path_buf(),
        public_path: "/build/".to_string(),
        integrity_algorithms: vec![HashAlgorithm::Sha384, HashAlgorithm::Sha512],
    });
    // The same file listed by two entries, once with a cache-busting query.
    let report = AssetReport::new()
        .with_entry("app", ["shared.abc123.js", "app.css"])
        .with_entry("admin", ["shared.abc123.js?v=2"]);

    let manifest = plugin.after_emit(&report).expect("after emit");
    let integrity = manifest.integrity.expect("integrity map");
    assert_eq!(integrity.len(), 3);
    assert_eq!(
        integrity["/build/shared.abc123.js"],
        integrity["/build/shared.abc123.js?v=2"]
    );
    assert!(integrity["/build/app.css"].starts_with("sha384-"));
    assert!(integrity["/build/app.css"].contains(" sha512-"));

    let algorithms = [HashAlgorithm::Sha384];
    let mut hasher = IntegrityHasher::new(out.path(), "/build/", &algorithms);
    for url in [
        "/build/shared.abc123.js",
        "/build/shared.abc123.js?v=2",
        "/build/shared.abc123.js",
    ] {
        assert!(hasher.digest(url).is_some());
    }
    assert_eq!(hasher.files_hashed(), 1);
}

#[test]
fn one_file_under_two_extension_groups_is_read_once() {
    let out = TempDir::new().expect("temp dir");
    write_asset(out.path(), "LICENSE", "MIT");

    let plugin = EntryPointsPlugin::new(EntryPointsOptions {
        output_path: out.path().to_path_buf(),
        public_path: "/build/".to_string(),
        integrity_algorithms: vec![HashAlgorithm::Sha384],
    });
    // No extension: the group is the text after the last dot, so `./LICENSE`
    // lands in "/LICENSE" while the plain name lands in "LICENSE".
    let report = AssetReport::new()
        .with_entry("app", ["LICENSE"])
        .with_entry("admin", ["./LICENSE"]);

    let manifest = plugin.build_manifest(&report);
    assert_eq!(manifest.entrypoints["app"]["LICENSE"], ["/build/LICENSE"]);
    assert_eq!(manifest.entrypoints["admin"]["/LICENSE"], ["/build/./LICENSE"]);

    let integrity = manifest.integrity.expect("integrity map");
    assert_eq!(integrity.len(), 2);
    assert_eq!(integrity["/build/LICENSE"], integrity["/build/./LICENSE"]);

    let algorithms = [HashAlgorithm::Sha384];
    let mut hasher = IntegrityHasher::new(out.path(), "/build/", &algorithms);
    for group in manifest.entrypoints.values() {
        for url in group.values().flatten() {
            assert!(hasher.digest(url).is_some());
        }
    }
    assert_eq!(hasher.files_hashed(), 1);
}

#[test]
fn missing_files_and_directory_are_not_errors() {
    let root = TempDir::new().expect("temp dir");
    let out = root.path().join("not").join("yet").join("built");

    let plugin = EntryPointsPlugin::new(EntryPointsOptions {
        output_path: out.clone(),
        public_path: "/build/".to_string(),
        integrity_algorithms: vec![HashAlgorithm::Sha384],
    });
    let report = AssetReport::new().with_entry("app", ["app.js"]);

    let manifest = plugin.after_emit(&report).expect("after emit");
    assert_eq!(manifest.entrypoints["app"]["js"], ["/build/app.js"]);
    assert_eq!(manifest.integrity.map(|map| map.len()), Some(0));
    assert!(out.join(ENTRYPOINTS_FILENAME).is_file());
}

#[test]
fn manifest_is_overwritten_not_merged() {
    let out = TempDir::new().expect("temp dir");
    let plugin = EntryPointsPlugin::new(EntryPointsOptions {
        output_path: out.path().to_path_buf(),
        public_path: "/build/".to_string(),
        integrity_algorithms: Vec::new(),
    });

    plugin
        .after_emit(&AssetReport::new().with_entry("old", ["old.js"]))
        .expect("first build");
    plugin
        .after_emit(&AssetReport::new().with_entry("new", ["new.js"]))
        .expect("second build");

    let manifest = read_manifest(out.path());
    assert!(!manifest.entrypoints.contains_key("old"));
    assert!(manifest.entrypoints.contains_key("new"));
    assert!(!out.path().join("entrypoints.json.tmp").exists());
}

#[test]
fn integrity_from_build_state() {
    let out = TempDir::new().expect("temp dir");
    write_asset(out.path(), "app.js", "export {}");

    let mut state = BuildState::new(RuntimeContext::default());
    state
        .set_output_path(out.path())
        .set_public_path("/build")
        .add_entry("app", "./app.js")
        .expect("add entry")
        .enable_single_runtime_chunk()
        .enable_integrity_hashes(true, Vec::<String>::new())
        .expect("enable integrity");

    let config = state.get_config().expect("config");
    let manifest = config
        .entry_points_plugin()
        .after_emit(&AssetReport::new().with_entry("app", ["app.js"]))
        .expect("after emit");
    let integrity = manifest.integrity.expect("integrity");
    assert!(integrity["/build/app.js"].starts_with("sha384-"));
}
