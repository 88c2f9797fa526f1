//! Module rules.
//!
//! Built-in rules always come out in the same order so that "first matching
//! rule wins" resolves the same way on every build:
//! javascript, css, images, fonts, then the optional pipelines in
//! registration order (sass, less, stylus, svelte, vue, handlebars,
//! typescript), the copy-files rule, and finally caller rules verbatim.

mod asset;
mod framework;
mod script;
mod style;

use kiln_config::{BuildState, RuleName};
use serde_json::Value;

pub use asset::{COPY_FILES_LOADER, COPY_FILES_MODULE, FONT_TEST, IMAGE_TEST};
pub use script::babel_loader_options;

pub fn build_rules(state: &BuildState) -> Vec<Value> {
    let mut rules = Vec::new();
    let mut push = |name: RuleName, rule: Option<Value>| {
        if let Some(rule) = rule {
            rules.push(apply_rule_callback(state, name, rule));
        }
    };

    push(RuleName::Javascript, Some(script::javascript_rule(state)));
    push(RuleName::Css, Some(style::css_rule(state)));
    push(RuleName::Images, asset::image_rule(state));
    push(RuleName::Fonts, asset::font_rule(state));
    push(RuleName::Sass, style::sass_rule(state));
    push(RuleName::Less, style::less_rule(state));
    push(RuleName::Stylus, style::stylus_rule(state));
    push(RuleName::Svelte, framework::svelte_rule(state));
    push(RuleName::Vue, framework::vue_rule(state));
    push(RuleName::Handlebars, framework::handlebars_rule(state));
    push(RuleName::Typescript, script::typescript_rule(state));

    if let Some(rule) = asset::copy_files_rule(state) {
        rules.push(rule);
    }
    rules.extend(state.loaders().iter().cloned());

    tracing::debug!(count = rules.len(), "built module rules");
    rules
}

fn apply_rule_callback(state: &BuildState, name: RuleName, rule: Value) -> Value {
    match state.rule_callback(name) {
        Some(callback) => callback.apply(rule),
        None => rule,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kiln_config::{RuntimeContext, keep};
    use serde_json::json;

    fn tests_of(rules: &[Value]) -> Vec<String> {
        rules
            .iter()
            .map(|rule| rule["test"].as_str().unwrap_or("<none>").to_string())
            .collect()
    }

    #[test]
    fn default_rules() {
        let state = BuildState::new(RuntimeContext::default());
        let rules = build_rules(&state);
        assert_eq!(
            tests_of(&rules),
            ["\\.(m?jsx?)$", "\\.(css)$", IMAGE_TEST, FONT_TEST]
        );
    }

    #[test]
    fn pipelines_follow_registration_order_not_call_order() {
        let mut state = BuildState::new(RuntimeContext::default());
        state
            .enable_typescript_loader(keep)
            .unwrap()
            .enable_handlebars_loader(keep)
            .enable_vue_loader(keep, Value::Null)
            .unwrap()
            .enable_svelte()
            .enable_stylus_loader(keep)
            .enable_less_loader(keep)
            .enable_sass_loader(keep, Value::Null)
            .unwrap()
            .add_loader(json!({ "test": "\\.txt$", "type": "asset/source" }))
            .copy_files(json!({ "from": "./static" }))
            .unwrap();

        let rules = build_rules(&state);
        assert_eq!(
            tests_of(&rules),
            [
                "\\.(m?jsx?)$",
                "\\.(css)$",
                IMAGE_TEST,
                FONT_TEST,
                "\\.s[ac]ss$",
                "\\.less$",
                "\\.styl$",
                "\\.svelte$",
                "\\.vue$",
                "\\.(handlebars|hbs)$",
                "\\.tsx?$",
                "kiln-copy-files-entry$",
                "\\.txt$",
            ]
        );
    }

    #[test]
    fn disabled_asset_rules_are_omitted() {
        let mut state = BuildState::new(RuntimeContext::default());
        state
            .configure_image_rule(json!({ "enabled": false }), keep)
            .unwrap();
        let rules = build_rules(&state);
        assert_eq!(tests_of(&rules), ["\\.(m?jsx?)$", "\\.(css)$", FONT_TEST]);
    }

    #[test]
    fn loader_rule_callback_replaces_rule() {
        let mut state = BuildState::new(RuntimeContext::default());
        state
            .configure_loader_rule("javascript", |mut rule| {
                rule["exclude"] = json!("vendor");
                rule
            })
            .unwrap();
        let rules = build_rules(&state);
        assert_eq!(rules[0]["exclude"], "vendor");
    }
}
