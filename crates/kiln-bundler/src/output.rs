//! Output block and filename templates.
//!
//! Content-hash templates are used with versioning, name-only templates
//! without it. A `configure_filenames()` override always wins.

use std::path::PathBuf;

use kiln_config::BuildState;
use serde::Serialize;

use crate::public_path::resolve_public_path;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputConfig {
    pub path: PathBuf,
    pub filename: String,
    pub chunk_filename: String,
    pub asset_module_filename: String,
    /// Real public path, after dev-server resolution.
    pub public_path: String,
    pub pathinfo: bool,
}

pub fn js_filename(state: &BuildState) -> String {
    match &state.filenames().js {
        Some(js) => js.clone(),
        None if state.use_versioning() => "[name].[contenthash:8].js".to_string(),
        None => "[name].js".to_string(),
    }
}

pub fn css_filename(state: &BuildState) -> String {
    match &state.filenames().css {
        Some(css) => css.clone(),
        None if state.use_versioning() => "[name].[contenthash:8].css".to_string(),
        None => "[name].css".to_string(),
    }
}

pub fn asset_module_filename(state: &BuildState) -> String {
    match &state.filenames().assets {
        Some(assets) => assets.clone(),
        None if state.use_versioning() => "assets/[name].[hash:8][ext]".to_string(),
        None => "assets/[name][ext]".to_string(),
    }
}

/// Default template for image or font files, e.g. `images/[name].[hash:8][ext]`.
pub fn asset_rule_filename(state: &BuildState, directory: &str) -> String {
    if state.use_versioning() {
        format!("{directory}/[name].[hash:8][ext]")
    } else {
        format!("{directory}/[name][ext]")
    }
}

pub fn build_output(state: &BuildState) -> OutputConfig {
    let filename = js_filename(state);
    OutputConfig {
        path: state.output_path().map(PathBuf::from).unwrap_or_default(),
        chunk_filename: filename.clone(),
        filename,
        asset_module_filename: asset_module_filename(state),
        public_path: resolve_public_path(state),
        pathinfo: !state.is_production(),
    }
}
