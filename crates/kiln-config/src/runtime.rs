//! Runtime context: facts resolved once at process start.
//!
//! Values are layered with figment, lowest priority first:
//! defaults, the `[runtime]` table of a build description file, `KILN_*`
//! environment variables, then explicit overrides (usually CLI flags).

use std::path::{Path, PathBuf};

use figment::Figment;
use figment::providers::{Env, Format as _, Serialized, Toml};
use serde::{Deserialize, Serialize};

use crate::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    #[serde(alias = "development")]
    Dev,
    #[serde(alias = "prod")]
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Dev => write!(f, "dev"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeContext {
    /// Directory relative paths are resolved against.
    pub context: PathBuf,

    pub environment: Environment,

    pub use_dev_server: bool,

    pub dev_server_host: String,

    pub dev_server_port: u16,

    /// Explicit TLS choice for the dev server; `None` defers to the dev server options.
    pub dev_server_https: Option<bool>,

    /// Keep the configured public path even when the dev server is in use.
    pub dev_server_keep_public_path: bool,

    pub use_hot_module_replacement: bool,

    /// An external babel configuration file exists and takes precedence over
    /// `configure_babel()` and preset options.
    pub babel_config_file_exists: bool,

    /// Machine-readable output requested: no console-formatting plugins, raw stats.
    pub output_json: bool,

    pub profile: bool,
}

impl Default for RuntimeContext {
    fn default() -> Self {
        Self {
            context: std::env::current_dir().unwrap_or_default(),
            environment: Environment::Dev,
            use_dev_server: false,
            dev_server_host: "localhost".to_string(),
            dev_server_port: 8080,
            dev_server_https: None,
            dev_server_keep_public_path: false,
            use_hot_module_replacement: false,
            babel_config_file_exists: false,
            output_json: false,
            profile: false,
        }
    }
}

impl RuntimeContext {
    /// Layered load: defaults, optional file `[runtime]` table, `KILN_*` env, overrides.
    ///
    /// `overrides` should skip unset fields when serialized so they don't mask
    /// lower layers.
    pub fn load<T: Serialize>(config_file: Option<&Path>, overrides: T) -> Result<Self> {
        let mut figment = Figment::new().merge(Serialized::defaults(Self::default()));

        if let Some(path) = config_file {
            figment = figment.merge(Figment::from(Toml::file(path)).focus("runtime"));
        }

        figment = figment
            .merge(Env::prefixed("KILN_"))
            .merge(Serialized::defaults(overrides));

        let mut runtime: Self = figment.extract()?;
        if runtime.context.is_relative() {
            runtime.context = std::env::current_dir()?.join(&runtime.context);
        }

        tracing::debug!(
            environment = %runtime.environment,
            dev_server = runtime.use_dev_server,
            "resolved runtime context"
        );
        Ok(runtime)
    }

    pub fn production() -> Self {
        Self {
            environment: Environment::Production,
            ..Self::default()
        }
    }

    pub fn is_production(&self) -> bool {
        self.environment == Environment::Production
    }

    pub fn is_dev(&self) -> bool {
        self.environment == Environment::Dev
    }

    pub fn is_dev_server(&self) -> bool {
        self.use_dev_server
    }
}
