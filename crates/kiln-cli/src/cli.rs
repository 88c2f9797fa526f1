//! Command-line interface definition.
//!
//! - `kiln config` - print the assembled bundler configuration
//! - `kiln entrypoints` - write `entrypoints.json` from a bundler stats file

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use kiln_config::Environment;
use serde::Serialize;

/// kiln - front-end build configuration assembler
#[derive(Parser, Debug)]
#[command(
    name = "kiln",
    version,
    about = "Assemble a bundler configuration from a kiln build description",
    long_about = "kiln reads a declarative build description (kiln.toml), validates it and\n\
                  assembles the configuration object a module bundler consumes. After a build,\n\
                  it turns the bundler's stats into an entry points manifest with optional\n\
                  subresource integrity hashes."
)]
pub struct Cli {
    /// Enable verbose logging (debug level)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the assembled bundler configuration as JSON
    Config(ConfigArgs),

    /// Write entrypoints.json from the bundler's stats JSON
    ///
    /// Run after the bundler has emitted its files; integrity hashes are
    /// computed from the files in the output directory.
    Entrypoints(EntrypointsArgs),
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvArg {
    Dev,
    Production,
}

impl From<EnvArg> for Environment {
    fn from(env: EnvArg) -> Self {
        match env {
            EnvArg::Dev => Environment::Dev,
            EnvArg::Production => Environment::Production,
        }
    }
}

/// Options shared by every command that assembles a build.
#[derive(Args, Debug, Clone)]
pub struct BuildArgs {
    /// Build description file
    #[arg(short, long, default_value = "kiln.toml", value_name = "FILE")]
    pub config: PathBuf,

    /// Directory relative paths are resolved against (defaults to the current directory)
    #[arg(long, value_name = "DIR")]
    pub context: Option<PathBuf>,

    /// Build environment
    #[arg(short, long, value_enum)]
    pub env: Option<EnvArg>,

    /// Assemble for the dev server
    #[arg(long)]
    pub dev_server: bool,

    /// Enable hot module replacement on the dev server
    #[arg(long, requires = "dev_server")]
    pub hot: bool,

    /// Serve over HTTPS from the dev server
    #[arg(long, requires = "dev_server")]
    pub https: bool,

    /// Dev server host
    #[arg(long, value_name = "HOST", requires = "dev_server")]
    pub host: Option<String>,

    /// Dev server port
    #[arg(long, value_name = "PORT", requires = "dev_server")]
    pub port: Option<u16>,

    /// Keep the configured public path instead of pointing it at the dev server
    #[arg(long, requires = "dev_server")]
    pub keep_public_path: bool,

    /// Machine-readable output: raw stats, no console formatting plugins
    #[arg(long)]
    pub json: bool,
}

impl BuildArgs {
    /// Runtime settings given on the command line. Unset flags are left out
    /// so they don't mask the file or environment layers.
    pub fn runtime_overrides(&self) -> RuntimeOverrides {
        RuntimeOverrides {
            context: self.context.clone(),
            environment: self.env.map(Environment::from),
            use_dev_server: self.dev_server.then_some(true),
            use_hot_module_replacement: self.hot.then_some(true),
            dev_server_https: self.https.then_some(true),
            dev_server_host: self.host.clone(),
            dev_server_port: self.port,
            dev_server_keep_public_path: self.keep_public_path.then_some(true),
            output_json: self.json.then_some(true),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RuntimeOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub environment: Option<Environment>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub use_dev_server: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub use_hot_module_replacement: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dev_server_https: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dev_server_host: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dev_server_port: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dev_server_keep_public_path: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_json: Option<bool>,
}

#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(flatten)]
    pub build: BuildArgs,

    /// Write the configuration to a file instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct EntrypointsArgs {
    #[command(flatten)]
    pub build: BuildArgs,

    /// Bundler stats JSON containing the `entrypoints` section
    #[arg(short, long, value_name = "FILE")]
    pub report: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn unset_flags_are_not_overrides() {
        let cli = Cli::parse_from(["kiln", "config"]);
        let Command::Config(args) = cli.command else {
            panic!("expected config command");
        };
        let overrides = serde_json::to_value(args.build.runtime_overrides()).unwrap();
        assert_eq!(overrides, serde_json::json!({}));
    }

    #[test]
    fn dev_server_flags() {
        let cli = Cli::parse_from([
            "kiln",
            "config",
            "--env",
            "production",
            "--dev-server",
            "--https",
            "--port",
            "9000",
        ]);
        let Command::Config(args) = cli.command else {
            panic!("expected config command");
        };
        let overrides = args.build.runtime_overrides();
        assert_eq!(overrides.environment, Some(Environment::Production));
        assert_eq!(overrides.use_dev_server, Some(true));
        assert_eq!(overrides.dev_server_https, Some(true));
        assert_eq!(overrides.dev_server_port, Some(9000));
        assert_eq!(overrides.output_json, None);
    }

    #[test]
    fn https_requires_dev_server() {
        assert!(Cli::try_parse_from(["kiln", "config", "--https"]).is_err());
    }
}
