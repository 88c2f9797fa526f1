use serde::{Deserialize, Serialize};

/// Entry name reserved for the synthetic entry that carries `copy_files()` requests.
///
/// Callers cannot register it; it is stripped again before the entry points
/// manifest is written.
pub const COPY_FILES_ENTRY: &str = "_tmp_copy";

/// Source file(s) for one entry point.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EntrySource {
    Single(String),
    Multiple(Vec<String>),
}

impl EntrySource {
    pub fn paths(&self) -> Vec<&str> {
        match self {
            EntrySource::Single(path) => vec![path.as_str()],
            EntrySource::Multiple(paths) => paths.iter().map(String::as_str).collect(),
        }
    }

    pub(crate) fn is_empty(&self) -> bool {
        match self {
            EntrySource::Single(path) => path.trim().is_empty(),
            EntrySource::Multiple(paths) => {
                paths.is_empty() || paths.iter().any(|p| p.trim().is_empty())
            }
        }
    }
}

impl From<&str> for EntrySource {
    fn from(path: &str) -> Self {
        EntrySource::Single(path.to_string())
    }
}

impl From<String> for EntrySource {
    fn from(path: String) -> Self {
        EntrySource::Single(path)
    }
}

impl From<Vec<String>> for EntrySource {
    fn from(paths: Vec<String>) -> Self {
        EntrySource::Multiple(paths)
    }
}

impl From<Vec<&str>> for EntrySource {
    fn from(paths: Vec<&str>) -> Self {
        EntrySource::Multiple(paths.into_iter().map(str::to_string).collect())
    }
}

impl<const N: usize> From<[&str; N]> for EntrySource {
    fn from(paths: [&str; N]) -> Self {
        EntrySource::Multiple(paths.iter().map(|p| p.to_string()).collect())
    }
}

/// Which entry map a name was registered in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Script,
    Style,
}

impl std::fmt::Display for EntryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntryKind::Script => write!(f, "add_entry()"),
            EntryKind::Style => write!(f, "add_style_entry()"),
        }
    }
}
