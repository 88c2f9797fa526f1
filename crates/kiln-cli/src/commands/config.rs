//! `kiln config`: print the assembled bundler configuration.

use crate::cli::ConfigArgs;
use crate::commands::utils;
use crate::error::Result;

/// Execute the config command.
///
/// The JSON goes to stdout, or to `--output` when given; logs go to stderr.
pub fn execute(args: ConfigArgs) -> Result<()> {
    let config = utils::assemble(&args.build)?;
    let json = config.to_json_pretty()?;

    match &args.output {
        Some(path) => {
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent)?;
                }
            }
            std::fs::write(path, format!("{json}\n"))?;
            tracing::info!(path = %path.display(), "wrote bundler configuration");
        }
        None => println!("{json}"),
    }
    Ok(())
}
