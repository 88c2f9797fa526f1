//! Shared steps of the commands: runtime resolution and assembly.

use std::path::Path;

use kiln_bundler::{AssembledConfig, BuildStateExt};
use kiln_config::{BuildState, RuntimeContext};

use crate::cli::BuildArgs;
use crate::description::BuildDescription;
use crate::error::Result;

/// File names that hold an external babel configuration.
pub(crate) const BABEL_CONFIG_FILES: &[&str] = &[
    ".babelrc",
    ".babelrc.json",
    ".babelrc.js",
    "babel.config.js",
    "babel.config.json",
    "babel.config.cjs",
    "babel.config.mjs",
];

pub(crate) fn has_babel_config(context: &Path) -> bool {
    BABEL_CONFIG_FILES
        .iter()
        .any(|name| context.join(name).is_file())
}

/// Loads the description and runtime context and replays one onto the other.
pub(crate) fn load_state(args: &BuildArgs) -> Result<BuildState> {
    let description = BuildDescription::from_path(&args.config)?;

    let mut runtime = RuntimeContext::load(Some(&args.config), args.runtime_overrides())?;
    if !runtime.babel_config_file_exists && has_babel_config(&runtime.context) {
        tracing::debug!(context = %runtime.context.display(), "found an external babel configuration");
        runtime.babel_config_file_exists = true;
    }

    let mut state = BuildState::new(runtime);
    description.apply_to(&mut state)?;
    Ok(state)
}

pub(crate) fn assemble(args: &BuildArgs) -> Result<AssembledConfig> {
    let state = load_state(args)?;
    tracing::info!(
        environment = %state.runtime().environment,
        config = %args.config.display(),
        "assembling bundler configuration"
    );
    Ok(state.get_config()?)
}
