use serde::{Deserialize, Serialize};

/// One `copy_files()` request: files under `from` matching `pattern` are
/// emitted verbatim under the output directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CopyFilesConfig {
    pub from: String,
    /// Regex source matched against file names.
    #[serde(default = "default_pattern")]
    pub pattern: String,
    /// Output filename template; defaults depend on versioning.
    #[serde(default)]
    pub to: Option<String>,
    #[serde(default = "default_true")]
    pub include_subdirectories: bool,
    /// Directory the `[path]` placeholder is relative to; defaults to `from`.
    #[serde(default)]
    pub context: Option<String>,
}

impl CopyFilesConfig {
    pub(crate) const KEYS: &'static [&'static str] =
        &["from", "pattern", "to", "includeSubdirectories", "context"];

    pub fn new(from: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            pattern: default_pattern(),
            to: None,
            include_subdirectories: true,
            context: None,
        }
    }

    /// Filename template to emit under, given the versioning policy.
    pub fn resolved_to(&self, versioning: bool) -> String {
        match &self.to {
            Some(to) => to.clone(),
            None if versioning => "[path][name].[hash:8].[ext]".to_string(),
            None => "[path][name].[ext]".to_string(),
        }
    }

    pub fn resolved_context(&self) -> &str {
        self.context.as_deref().unwrap_or(&self.from)
    }
}

fn default_pattern() -> String {
    ".*".to_string()
}

fn default_true() -> bool {
    true
}
