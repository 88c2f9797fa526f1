//! Options of the build-outputs manifest plugin.

use kiln_config::paths::derive_manifest_key_prefix;
use kiln_config::{BuildState, COPY_FILES_ENTRY};
use serde::Serialize;

/// One file the manifest plugin is about to record.
#[derive(Debug, Clone, Copy)]
pub struct ManifestFile<'a> {
    pub name: &'a str,
    /// Name of the chunk the file belongs to; `None` for plain assets.
    pub chunk_name: Option<&'a str>,
}

/// Which emitted files make it into the manifest.
///
/// Dropped: everything from the synthetic copy-files entry, and the script
/// (and script source map) generated for style-only entries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestFilter {
    pub excluded_entries: Vec<String>,
    pub style_entries: Vec<String>,
}

impl ManifestFilter {
    pub fn from_state(state: &BuildState) -> Self {
        Self {
            excluded_entries: vec![COPY_FILES_ENTRY.to_string()],
            style_entries: state.style_entries().keys().cloned().collect(),
        }
    }

    pub fn accepts(&self, file: &ManifestFile<'_>) -> bool {
        let Some(chunk) = file.chunk_name else {
            return true;
        };
        if self.excluded_entries.iter().any(|name| name == chunk) {
            return false;
        }
        let is_style_entry = self.style_entries.iter().any(|name| name == chunk);
        !(is_style_entry && is_script_or_script_map(file.name))
    }
}

fn is_script_or_script_map(name: &str) -> bool {
    name.ends_with(".js") || name.ends_with(".js.map")
}

/// Prefix of the manifest keys: the explicit one, or the public path without
/// its leading slash.
pub fn manifest_base_path(state: &BuildState) -> String {
    match state.manifest_key_prefix() {
        Some(prefix) => prefix.to_string(),
        None => derive_manifest_key_prefix(state.public_path().unwrap_or_default()),
    }
}
