//! Named split-chunk cache groups.

use regex::Regex;
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

use crate::error::{ConfigError, Result};

/// Module-path predicate of a cache group.
#[derive(Debug, Clone)]
pub struct CacheGroupTest(Regex);

impl CacheGroupTest {
    /// Predicate matching any dependency path containing `/<name>/` under `node_modules`.
    pub fn node_modules<S: AsRef<str>>(packages: &[S]) -> Result<Self> {
        let names: Vec<String> = packages
            .iter()
            .map(|name| regex::escape(name.as_ref()))
            .collect();
        let pattern = format!(r"[\\/]node_modules[\\/]({})[\\/]", names.join("|"));
        Regex::new(&pattern)
            .map(Self)
            .map_err(|err| ConfigError::InvalidArgument {
                method: "add_cache_group",
                message: err.to_string(),
            })
    }

    pub fn pattern(&self) -> &str {
        self.0.as_str()
    }

    pub fn matches(&self, module_path: &str) -> bool {
        self.0.is_match(module_path)
    }
}

impl Serialize for CacheGroupTest {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.pattern())
    }
}

/// A cache group registered through `add_cache_group()`.
///
/// `options` holds the free-form split-chunk keys (`priority`, `minSize`, ...)
/// minus `test` and `node_modules`, which are folded into [`CacheGroupTest`].
#[derive(Debug, Clone)]
pub struct CacheGroup {
    pub test: CacheGroupTest,
    pub options: Map<String, Value>,
}

impl CacheGroup {
    pub(crate) fn from_options(name: &str, options: Value) -> Result<Self> {
        let invalid = |message: &str| ConfigError::InvalidCacheGroup {
            name: name.to_string(),
            message: message.to_string(),
        };

        let mut options = match options {
            Value::Object(map) => map,
            _ => return Err(invalid("options must be an object")),
        };

        let test = options.remove("test");
        let node_modules = options.remove("node_modules");

        let test = match (test, node_modules) {
            (Some(_), Some(_)) => {
                return Err(invalid(
                    "pass either \"test\" or \"node_modules\", not both",
                ));
            }
            (None, None) => {
                return Err(invalid(
                    "a \"test\" pattern or a \"node_modules\" package list is required",
                ));
            }
            (Some(Value::String(pattern)), None) => Regex::new(&pattern)
                .map(CacheGroupTest)
                .map_err(|err| invalid(&format!("invalid \"test\" pattern: {err}")))?,
            (Some(_), None) => return Err(invalid("\"test\" must be a regular expression string")),
            (None, Some(Value::Array(packages))) => {
                let names = packages
                    .iter()
                    .map(|pkg| pkg.as_str().filter(|s| !s.trim().is_empty()))
                    .collect::<Option<Vec<_>>>()
                    .ok_or_else(|| invalid("\"node_modules\" must be a list of package names"))?;
                if names.is_empty() {
                    return Err(invalid("\"node_modules\" cannot be empty"));
                }
                CacheGroupTest::node_modules(&names)?
            }
            (None, Some(_)) => {
                return Err(invalid("\"node_modules\" must be a list of package names"));
            }
        };

        Ok(Self { test, options })
    }
}
