//! The `devServer` block, present only when the dev server is in use.

use std::path::PathBuf;

use kiln_config::BuildState;
use serde_json::{Value, json};

use crate::public_path::dev_server_uses_https;
use crate::{Error, Result};

/// Directory the dev server serves static files from.
///
/// The public path (or the manifest key prefix when one is set) has to be the
/// tail of the output path: `/srv/app/public/build` with `/build/` gives
/// `/srv/app/public`.
pub fn content_base(state: &BuildState) -> Result<PathBuf> {
    let output_path = state
        .output_path()
        .ok_or(Error::MissingOutputPath)?
        .to_string_lossy()
        .into_owned();
    let output_path = output_path.trim_end_matches(['/', '\\']);

    // A blank manifest key prefix means "no prefix".
    let (setting, public_path) = match state
        .manifest_key_prefix()
        .filter(|prefix| !prefix.trim().is_empty())
    {
        Some(prefix) => ("manifest key prefix", prefix),
        None => ("public path", state.public_path().unwrap_or_default()),
    };
    let suffix = public_path.trim_end_matches('/');
    let suffix = if suffix.starts_with('/') || suffix.is_empty() {
        suffix.to_string()
    } else {
        format!("/{suffix}")
    };

    match output_path.strip_suffix(suffix.as_str()) {
        Some(base) if !suffix.is_empty() || public_path == "/" => Ok(PathBuf::from(base)),
        _ => Err(Error::DevServerContentBase {
            setting,
            value: public_path.to_string(),
            output_path: output_path.to_string(),
        }),
    }
}

pub fn build_dev_server(state: &BuildState) -> Result<Value> {
    let runtime = state.runtime();
    let hot = runtime.use_hot_module_replacement;

    let directory = content_base(state)?;
    let mut dev_server = json!({
        "static": { "directory": directory.to_string_lossy() },
        "headers": { "Access-Control-Allow-Origin": "*" },
        "compress": true,
        "historyApiFallback": true,
        "hot": hot,
        "liveReload": !hot,
        "host": runtime.dev_server_host,
        "port": runtime.dev_server_port,
    });
    if dev_server_uses_https(state) {
        dev_server["server"] = json!("https");
    }

    Ok(state.callbacks().dev_server.apply(dev_server))
}

#[cfg(test)]
mod tests {
    use super::*;
    use kiln_config::RuntimeContext;

    fn dev_server_state(output: &str, public: &str) -> BuildState {
        let mut state = BuildState::new(RuntimeContext {
            use_dev_server: true,
            ..RuntimeContext::default()
        });
        state.set_output_path(output).set_public_path(public);
        state
    }

    #[test]
    fn content_base_strips_public_path() {
        let state = dev_server_state("/srv/app/public/build", "/build");
        assert_eq!(content_base(&state).unwrap(), PathBuf::from("/srv/app/public"));
    }

    #[test]
    fn manifest_prefix_takes_precedence() {
        let mut state = dev_server_state("/srv/app/public/assets/build", "/elsewhere");
        state.set_manifest_key_prefix("assets/build");
        assert_eq!(content_base(&state).unwrap(), PathBuf::from("/srv/app/public"));
    }

    #[test]
    fn blank_manifest_prefix_falls_back_to_public_path() {
        let mut state = dev_server_state("/srv/app/public/build", "/build");
        state.set_manifest_key_prefix("");
        assert_eq!(content_base(&state).unwrap(), PathBuf::from("/srv/app/public"));
    }

    #[test]
    fn public_path_must_be_output_suffix() {
        let state = dev_server_state("/srv/app/public/build", "/assets");
        let err = content_base(&state).unwrap_err();
        assert!(matches!(
            err,
            Error::DevServerContentBase { setting: "public path", .. }
        ));
        assert!(err.to_string().contains("public path \"/assets/\""));
    }

    #[test]
    fn mismatched_manifest_prefix_is_named_in_the_error() {
        let mut state = dev_server_state("/srv/app/public/build", "/build");
        state.set_manifest_key_prefix("assets/");
        let err = content_base(&state).unwrap_err();
        assert!(matches!(
            err,
            Error::DevServerContentBase { setting: "manifest key prefix", .. }
        ));
        assert!(err.to_string().contains("manifest key prefix \"assets/\""));
    }

    #[test]
    fn block_defaults_and_tls() {
        let mut state = dev_server_state("/srv/app/public/build", "/build");
        let block = build_dev_server(&state).unwrap();
        assert_eq!(block["static"]["directory"], "/srv/app/public");
        assert_eq!(block["headers"]["Access-Control-Allow-Origin"], "*");
        assert_eq!(block["port"], 8080);
        assert_eq!(block["liveReload"], true);
        assert!(block.get("server").is_none());

        state.configure_dev_server_options(|mut options| {
            options["server"] = json!({ "type": "https" });
            options
        });
        let block = build_dev_server(&state).unwrap();
        assert_eq!(block["server"]["type"], "https");
    }

    #[test]
    fn runtime_tls_flag() {
        let mut state = BuildState::new(RuntimeContext {
            use_dev_server: true,
            dev_server_https: Some(true),
            use_hot_module_replacement: true,
            ..RuntimeContext::default()
        });
        state
            .set_output_path("/srv/app/public/build")
            .set_public_path("/build");
        let block = build_dev_server(&state).unwrap();
        assert_eq!(block["server"], "https");
        assert_eq!(block["hot"], true);
        assert_eq!(block["liveReload"], false);
    }
}
