//! Pre-flight checks run by `get_config()` before anything is assembled.
//!
//! Hard failures return an [`Error`]; suspicious but legal combinations are
//! logged as warnings and assembly continues.

use kiln_config::BuildState;
use kiln_config::paths::is_absolute_url;

use crate::{Error, Result};

/// Split-chunk groups the bundler defines itself.
pub const RESERVED_CACHE_GROUPS: &[&str] = &["defaultVendors", "default"];

pub fn validate(state: &BuildState) -> Result<()> {
    validate_basic(state)?;
    validate_public_path_and_manifest_key_prefix(state)?;
    validate_dev_server(state);
    validate_cache_group_names(state);
    Ok(())
}

fn validate_basic(state: &BuildState) -> Result<()> {
    if state.output_path().is_none() {
        return Err(Error::MissingOutputPath);
    }
    if state.public_path().is_none() {
        return Err(Error::MissingPublicPath);
    }
    if !state.has_build_input() {
        return Err(Error::NoEntries);
    }
    if state.single_runtime_chunk().is_none() {
        return Err(Error::RuntimeChunkUnset);
    }
    Ok(())
}

fn validate_public_path_and_manifest_key_prefix(state: &BuildState) -> Result<()> {
    let Some(public_path) = state.public_path() else {
        return Ok(());
    };

    if is_absolute_url(public_path)
        && state.manifest_key_prefix().is_none()
        && !state.is_dev_server()
    {
        return Err(Error::ManifestKeyPrefixRequired {
            public_path: public_path.to_string(),
        });
    }
    Ok(())
}

fn validate_dev_server(state: &BuildState) {
    if !state.is_dev_server() {
        return;
    }

    if state.use_versioning() {
        tracing::warn!(
            "versioning is enabled while using the dev server; \
             enable_versioning(is_production) is usually what you want"
        );
    }

    if let Some(public_path) = state.public_path() {
        if is_absolute_url(public_path) {
            tracing::warn!(
                public_path,
                "an absolute public path together with the dev server: assets load from the \
                 public path instead of from the dev server URL"
            );
        }
    }
}

fn validate_cache_group_names(state: &BuildState) {
    for name in state.cache_groups().keys() {
        if RESERVED_CACHE_GROUPS.contains(&name.as_str()) {
            tracing::warn!(
                cache_group = %name,
                "add_cache_group(): this name overrides the bundler's built-in cache group"
            );
        }
    }
}
