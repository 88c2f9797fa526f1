//! The public path the generated code actually uses.
//!
//! With the dev server the stored public path is usually rewritten to point at
//! the dev server itself. The order of the checks below matters: an absolute
//! URL is never prefixed, even when the keep flag is unset.

use kiln_config::BuildState;
use kiln_config::paths::is_absolute_url;
use serde_json::{Value, json};

/// Public path after dev-server resolution.
///
/// Returns an empty string when no public path is set; the validator rejects
/// that state before assembly.
pub fn resolve_public_path(state: &BuildState) -> String {
    let public_path = state.public_path().unwrap_or_default();

    if !state.is_dev_server() {
        return public_path.to_string();
    }
    if state.runtime().dev_server_keep_public_path {
        return public_path.to_string();
    }
    if is_absolute_url(public_path) {
        return public_path.to_string();
    }

    format!(
        "{}/{}",
        dev_server_base_url(state).trim_end_matches('/'),
        public_path.trim_start_matches('/')
    )
}

/// `scheme://host:port` of the dev server.
pub fn dev_server_base_url(state: &BuildState) -> String {
    let runtime = state.runtime();
    let scheme = if dev_server_uses_https(state) {
        "https"
    } else {
        "http"
    };
    format!(
        "{scheme}://{}:{}",
        runtime.dev_server_host, runtime.dev_server_port
    )
}

/// Whether the dev server serves over TLS.
///
/// The explicit runtime flag wins. Otherwise the options produced by the
/// dev-server callback decide: `server: "https"`, `server.type: "https"`,
/// then a truthy `https` key.
pub fn dev_server_uses_https(state: &BuildState) -> bool {
    if let Some(https) = state.runtime().dev_server_https {
        return https;
    }

    let options = state.callbacks().dev_server.apply(json!({}));
    match options.get("server") {
        Some(Value::String(server)) if server == "https" => return true,
        Some(Value::Object(server)) => {
            if server.get("type").and_then(Value::as_str) == Some("https") {
                return true;
            }
        }
        _ => {}
    }

    options.get("https").is_some_and(is_truthy)
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kiln_config::RuntimeContext;

    fn dev_server_state(runtime: RuntimeContext, public_path: &str) -> BuildState {
        let mut state = BuildState::new(RuntimeContext {
            use_dev_server: true,
            ..runtime
        });
        state.set_public_path(public_path);
        state
    }

    #[test]
    fn unchanged_without_dev_server() {
        let mut state = BuildState::new(RuntimeContext::default());
        state.set_public_path("/build");
        assert_eq!(resolve_public_path(&state), "/build/");
    }

    #[test]
    fn prefixed_with_dev_server_url() {
        let state = dev_server_state(RuntimeContext::default(), "/build");
        assert_eq!(resolve_public_path(&state), "http://localhost:8080/build/");

        let state = dev_server_state(
            RuntimeContext {
                dev_server_host: "0.0.0.0".to_string(),
                dev_server_port: 9000,
                dev_server_https: Some(true),
                ..RuntimeContext::default()
            },
            "build",
        );
        assert_eq!(resolve_public_path(&state), "https://0.0.0.0:9000/build/");
    }

    #[test]
    fn keep_flag_and_absolute_urls_are_not_prefixed() {
        let state = dev_server_state(
            RuntimeContext {
                dev_server_keep_public_path: true,
                ..RuntimeContext::default()
            },
            "/build",
        );
        assert_eq!(resolve_public_path(&state), "/build/");

        let state = dev_server_state(RuntimeContext::default(), "https://cdn.example.com/build");
        assert_eq!(resolve_public_path(&state), "https://cdn.example.com/build/");
    }

    #[test]
    fn https_detection_precedence() {
        let mut state = dev_server_state(RuntimeContext::default(), "/build");
        assert!(!dev_server_uses_https(&state));

        state.configure_dev_server_options(|_| json!({ "server": "https" }));
        assert!(dev_server_uses_https(&state));

        state.configure_dev_server_options(|_| json!({ "server": { "type": "https" } }));
        assert!(dev_server_uses_https(&state));

        state.configure_dev_server_options(|_| json!({ "https": { "cert": "x" } }));
        assert!(dev_server_uses_https(&state));

        state.configure_dev_server_options(|_| json!({ "https": false }));
        assert!(!dev_server_uses_https(&state));

        let mut state = dev_server_state(
            RuntimeContext {
                dev_server_https: Some(false),
                ..RuntimeContext::default()
            },
            "/build",
        );
        state.configure_dev_server_options(|_| json!({ "server": "https" }));
        assert!(!dev_server_uses_https(&state));
    }
}
