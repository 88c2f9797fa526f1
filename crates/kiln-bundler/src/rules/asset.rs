//! Image, font and copy-files rules.

use kiln_config::{AssetRule, BuildState};
use path_clean::PathClean;
use serde_json::{Value, json};

use crate::output::asset_rule_filename;

pub const IMAGE_TEST: &str = "\\.(png|jpg|jpeg|gif|ico|svg|webp|avif)$";
pub const FONT_TEST: &str = "\\.(woff|woff2|ttf|eot|otf)$";

/// Module request the synthetic copy-files entry points at.
pub const COPY_FILES_MODULE: &str = "kiln-copy-files-entry";
pub const COPY_FILES_LOADER: &str = "kiln-copy-files-loader";

fn asset_rule(state: &BuildState, rule: &AssetRule, test: &str, directory: &str) -> Option<Value> {
    let options = &rule.options;
    if !options.enabled {
        return None;
    }

    let mut emit = json!({ "type": options.kind.as_str() });
    if options.kind.emits_file() {
        let filename = options
            .filename
            .clone()
            .unwrap_or_else(|| asset_rule_filename(state, directory));
        emit["generator"] = json!({ "filename": filename });
    }
    if options.kind.supports_size_threshold() {
        if let Some(max_size) = options.max_size {
            emit["parser"] = json!({ "dataUrlCondition": { "maxSize": max_size } });
        }
    }

    let built = json!({
        "test": test,
        "oneOf": [
            // Files pulled in by copy_files() pass through untouched.
            { "resourceQuery": "copy-files", "type": "javascript/auto" },
            emit,
        ],
    });
    Some(rule.callback.apply(built))
}

pub(super) fn image_rule(state: &BuildState) -> Option<Value> {
    asset_rule(state, state.image_rule(), IMAGE_TEST, "images")
}

pub(super) fn font_rule(state: &BuildState) -> Option<Value> {
    asset_rule(state, state.font_rule(), FONT_TEST, "fonts")
}

/// Rule handling the synthetic copy-files entry, when `copy_files()` was used.
pub(super) fn copy_files_rule(state: &BuildState) -> Option<Value> {
    if state.copy_configs().is_empty() {
        return None;
    }

    let context = &state.runtime().context;
    let copies: Vec<Value> = state
        .copy_configs()
        .iter()
        .map(|config| {
            let from = context.join(&config.from).clean();
            let base = context.join(config.resolved_context()).clean();
            json!({
                "from": from.to_string_lossy(),
                "pattern": config.pattern,
                "to": config.resolved_to(state.use_versioning()),
                "includeSubdirectories": config.include_subdirectories,
                "context": base.to_string_lossy(),
            })
        })
        .collect();

    Some(json!({
        "test": format!("{COPY_FILES_MODULE}$"),
        "loader": COPY_FILES_LOADER,
        "options": { "copies": copies },
    }))
}
