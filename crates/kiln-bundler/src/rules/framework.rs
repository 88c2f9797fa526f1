//! Component-file rules.

use kiln_config::BuildState;
use serde_json::{Value, json};

pub(super) fn svelte_rule(state: &BuildState) -> Option<Value> {
    state.pipelines().svelte.then(|| {
        json!({
            "test": "\\.svelte$",
            "loader": "svelte-loader",
        })
    })
}

pub(super) fn vue_rule(state: &BuildState) -> Option<Value> {
    let vue = state.pipelines().vue.as_ref()?;
    Some(json!({
        "test": "\\.vue$",
        "loader": "vue-loader",
        "options": vue.callback.apply(json!({})),
    }))
}

pub(super) fn handlebars_rule(state: &BuildState) -> Option<Value> {
    let callback = state.pipelines().handlebars.as_ref()?;
    Some(json!({
        "test": "\\.(handlebars|hbs)$",
        "loader": "handlebars-loader",
        "options": callback.apply(json!({})),
    }))
}
