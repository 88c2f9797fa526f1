use kiln_config::BuildState;
use serde_json::{Value, json};

const DEFAULT_EXCLUDE: &str = "(node_modules|bower_components)";

/// Options of the script transpiler loader.
///
/// With an external babel configuration file only the loader-level options
/// are set; presets and plugins come from that file.
pub fn babel_loader_options(state: &BuildState) -> Value {
    let mut options = json!({
        "cacheDirectory": true,
        "sourceType": "unambiguous",
    });
    if state.runtime().babel_config_file_exists {
        return options;
    }

    let babel = state.babel();
    let pipelines = state.pipelines();

    let preset_env = babel.preset_env_callback.apply(json!({
        "modules": false,
        "targets": {},
        "useBuiltIns": babel.options.use_built_ins.to_value(),
        "corejs": babel.options.corejs.clone().unwrap_or(Value::Null),
    }));

    let mut presets = vec![json!(["@babel/preset-env", preset_env])];
    let mut plugins: Vec<Value> = Vec::new();

    if let Some(react) = &pipelines.react {
        presets.push(json!(["@babel/preset-react", react]));
    }

    if let Some(preact) = &pipelines.preact {
        if preact.preact_compat {
            plugins.push(json!(["@babel/plugin-transform-react-jsx"]));
        } else {
            plugins.push(json!([
                "@babel/plugin-transform-react-jsx",
                { "pragma": "h", "pragmaFrag": "Fragment" }
            ]));
        }
    }

    if let Some(vue) = &pipelines.vue {
        if vue.options.use_jsx {
            if vue.options.version == Some(2) {
                presets.push(json!("@vue/babel-preset-jsx"));
            } else {
                plugins.push(json!("@vue/babel-plugin-jsx"));
            }
        }
    }

    if let Some(typescript) = &pipelines.babel_typescript {
        presets.push(json!(["@babel/preset-typescript", typescript]));
    }

    options["presets"] = Value::Array(presets);
    options["plugins"] = Value::Array(plugins);
    babel.callback.apply(options)
}

fn script_exclude(state: &BuildState) -> String {
    let options = &state.babel().options;
    if let Some(exclude) = &options.exclude {
        return exclude.clone();
    }
    if options.include_node_modules.is_empty() {
        return DEFAULT_EXCLUDE.to_string();
    }

    let packages: Vec<String> = options
        .include_node_modules
        .iter()
        .map(|name| regex::escape(name))
        .collect();
    format!(
        r"[\\/](node_modules|bower_components)[\\/](?!({})[\\/])",
        packages.join("|")
    )
}

pub(super) fn javascript_rule(state: &BuildState) -> Value {
    let test = if state.pipelines().babel_typescript.is_some() {
        "\\.(m?jsx?|tsx?)$"
    } else {
        "\\.(m?jsx?)$"
    };

    json!({
        "test": test,
        "exclude": script_exclude(state),
        "use": [{ "loader": "babel-loader", "options": babel_loader_options(state) }],
    })
}

/// Type-checking TypeScript rule: the transpiler loader runs after `ts-loader`.
pub(super) fn typescript_rule(state: &BuildState) -> Option<Value> {
    let pipelines = state.pipelines();
    let callback = pipelines.typescript.as_ref()?;

    let mut ts_options = json!({ "silent": true });
    if pipelines.forked_type_check.is_some() {
        ts_options["transpileOnly"] = json!(true);
    }
    if pipelines.vue.is_some() {
        ts_options["appendTsSuffixTo"] = json!(["\\.vue$"]);
    }

    Some(json!({
        "test": "\\.tsx?$",
        "exclude": "node_modules",
        "use": [
            { "loader": "babel-loader", "options": babel_loader_options(state) },
            { "loader": "ts-loader", "options": callback.apply(ts_options) },
        ],
    }))
}
