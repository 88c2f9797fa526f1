//! `kiln` binary entry point: parse arguments, set up logging, dispatch.

use clap::Parser;
use kiln_cli::{cli, commands, error, logger};
use miette::Result;

fn main() -> Result<()> {
    let args = cli::Cli::parse();

    logger::init_logger(args.verbose, args.quiet, args.no_color);

    let result = match args.command {
        cli::Command::Config(config_args) => commands::config_execute(config_args),
        cli::Command::Entrypoints(entrypoints_args) => {
            commands::entrypoints_execute(entrypoints_args)
        }
    };

    result.map_err(error::cli_error_to_miette)
}
