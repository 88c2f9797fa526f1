//! `kiln entrypoints`: write `entrypoints.json` from the bundler's stats.

use kiln_bundler::AssetReport;

use crate::cli::EntrypointsArgs;
use crate::commands::utils;
use crate::error::Result;

/// Execute the entrypoints command.
///
/// Assembles the configuration from the same description the build used, so
/// the manifest sees the same output path, public path and integrity settings.
pub fn execute(args: EntrypointsArgs) -> Result<()> {
    let config = utils::assemble(&args.build)?;
    let report = AssetReport::from_path(&args.report)?;

    let plugin = config.entry_points_plugin();
    let manifest = plugin.after_emit(&report)?;

    let hashed = manifest.integrity.as_ref().map_or(0, |integrity| integrity.len());
    println!(
        "Wrote {} ({} entries, {} integrity digests)",
        plugin.manifest_path().display(),
        manifest.entrypoints.len(),
        hashed
    );
    Ok(())
}
