//! Rendering CLI errors as miette reports.

use kiln_config::ConfigError;
use miette::{MietteDiagnostic, Report, Severity};

use super::CliError;

/// Largest edit distance still offered as a "did you mean" suggestion.
const MAX_SUGGESTION_DISTANCE: usize = 3;

/// Closest valid name to `input`, compared case-insensitively.
pub fn suggest(input: &str, valid: &[&'static str]) -> Option<&'static str> {
    let input = input.to_lowercase();
    valid
        .iter()
        .map(|candidate| {
            let distance = strsim::damerau_levenshtein(&input, &candidate.to_lowercase());
            (distance, *candidate)
        })
        .filter(|(distance, _)| *distance <= MAX_SUGGESTION_DISTANCE)
        .min_by_key(|(distance, _)| *distance)
        .map(|(_, candidate)| candidate)
}

fn unknown_name_help(input: &str, valid: &[&'static str]) -> String {
    match suggest(input, valid) {
        Some(candidate) => format!("Did you mean \"{candidate}\"?"),
        None => format!("Valid names are: {}", valid.join(", ")),
    }
}

/// Convert CliError to miette Report
pub fn cli_error_to_miette(err: CliError) -> Report {
    match err {
        CliError::UnknownKey { ref key, valid, .. } => {
            let help = unknown_name_help(key, valid);
            Report::new(
                MietteDiagnostic::new(err.to_string())
                    .with_code("KILN_UNKNOWN_KEY")
                    .with_severity(Severity::Error)
                    .with_help(help),
            )
        }
        CliError::DescriptionNotFound(_) => Report::new(
            MietteDiagnostic::new(err.to_string())
                .with_code("KILN_DESCRIPTION_NOT_FOUND")
                .with_help("Create a kiln.toml file or pass --config <FILE>"),
        ),
        CliError::InvalidDescription { .. } => Report::new(
            MietteDiagnostic::new(err.to_string()).with_code("KILN_INVALID_DESCRIPTION"),
        ),
        CliError::Config(err) => config_error_to_miette(err),
        CliError::Bundler(kiln_bundler::Error::Config(err)) => config_error_to_miette(err),
        CliError::Bundler(err) => Report::new(err),
        CliError::Io(_) | CliError::Json(_) => miette::miette!("{}", err),
    }
}

fn config_error_to_miette(err: ConfigError) -> Report {
    let help = match &err {
        ConfigError::UnknownOption { key, valid, .. } => Some(unknown_name_help(key, valid)),
        ConfigError::UnknownRule { name, valid } => Some(unknown_name_help(name, valid)),
        ConfigError::UnsupportedHashAlgorithm {
            algorithm,
            supported,
        } => Some(unknown_name_help(algorithm, supported)),
        other => other
            .method()
            .map(|method| format!("Check the arguments passed to {method}()")),
    };

    let diagnostic = MietteDiagnostic::new(err.to_string())
        .with_code("KILN_CONFIG")
        .with_severity(Severity::Error);
    match help {
        Some(help) => Report::new(diagnostic.with_help(help)),
        None => Report::new(diagnostic),
    }
}
