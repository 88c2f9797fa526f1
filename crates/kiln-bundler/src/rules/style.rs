//! Stylesheet rules.
//!
//! Every stylesheet rule is split in two variants sharing one loader chain:
//! files requested with a `module` resource query get CSS modules with a
//! generated local identifier, everything else is plain CSS.

use kiln_config::BuildState;
use serde_json::{Value, json};

const LOCAL_IDENT_NAME: &str = "[local]_[hash:base64:5]";

fn extract_loader(state: &BuildState) -> Value {
    let callbacks = state.callbacks();
    if state.css_extraction_enabled() {
        json!({
            "loader": "mini-css-extract-plugin/loader",
            "options": callbacks.mini_css_extract_loader.apply(json!({})),
        })
    } else {
        json!({
            "loader": "style-loader",
            "options": callbacks.style_loader.apply(json!({})),
        })
    }
}

fn loader_chain(state: &BuildState, preprocessors: &[Value], use_modules: bool) -> Vec<Value> {
    let mut after_css: Vec<Value> = Vec::new();
    if let Some(postcss) = &state.pipelines().postcss {
        after_css.push(json!({
            "loader": "postcss-loader",
            "options": postcss.apply(json!({ "sourceMap": state.use_source_maps() })),
        }));
    }
    after_css.extend(preprocessors.iter().cloned());

    let modules = if use_modules {
        json!({ "localIdentName": LOCAL_IDENT_NAME })
    } else {
        json!(false)
    };
    let css_options = state.callbacks().css_loader.apply(json!({
        "sourceMap": state.use_source_maps(),
        "importLoaders": after_css.len(),
        "modules": modules,
    }));

    let mut chain = vec![
        extract_loader(state),
        json!({ "loader": "css-loader", "options": css_options }),
    ];
    chain.extend(after_css);
    chain
}

fn style_rule(state: &BuildState, test: &str, preprocessors: &[Value]) -> Value {
    json!({
        "test": test,
        "oneOf": [
            {
                "resourceQuery": "module",
                "use": loader_chain(state, preprocessors, true),
            },
            {
                "use": loader_chain(state, preprocessors, false),
            },
        ],
    })
}

pub(super) fn css_rule(state: &BuildState) -> Value {
    style_rule(state, "\\.(css)$", &[])
}

pub(super) fn sass_rule(state: &BuildState) -> Option<Value> {
    let sass = state.pipelines().sass.as_ref()?;
    let mut preprocessors = Vec::new();

    if sass.options.resolve_url_loader {
        let mut options = json!({ "sourceMap": state.use_source_maps() });
        for (key, value) in &sass.options.resolve_url_loader_options {
            options[key.as_str()] = value.clone();
        }
        preprocessors.push(json!({ "loader": "resolve-url-loader", "options": options }));
    }

    // resolve-url-loader needs source maps from the preprocessor to rewrite urls.
    let source_map = sass.options.resolve_url_loader || state.use_source_maps();
    preprocessors.push(json!({
        "loader": "sass-loader",
        "options": sass.callback.apply(json!({
            "sourceMap": source_map,
            "sassOptions": { "outputStyle": "expanded" },
        })),
    }));

    Some(style_rule(state, "\\.s[ac]ss$", &preprocessors))
}

pub(super) fn less_rule(state: &BuildState) -> Option<Value> {
    let callback = state.pipelines().less.as_ref()?;
    let loader = json!({
        "loader": "less-loader",
        "options": callback.apply(json!({ "sourceMap": state.use_source_maps() })),
    });
    Some(style_rule(state, "\\.less$", &[loader]))
}

pub(super) fn stylus_rule(state: &BuildState) -> Option<Value> {
    let callback = state.pipelines().stylus.as_ref()?;
    let loader = json!({
        "loader": "stylus-loader",
        "options": callback.apply(json!({ "sourceMap": state.use_source_maps() })),
    });
    Some(style_rule(state, "\\.styl$", &[loader]))
}
