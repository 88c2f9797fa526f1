//! # kiln-config
//!
//! The configuration model behind kiln. A [`BuildState`] accumulates everything a
//! build script asks for (entries, paths, optional transform pipelines, plugins,
//! cache groups) and validates each request at the call site. Turning that state
//! into a bundler configuration is the job of `kiln-bundler`.
//!
//! ```
//! use kiln_config::{BuildState, RuntimeContext};
//!
//! let mut state = BuildState::new(RuntimeContext::default());
//! state
//!     .set_output_path("/srv/app/public/build")
//!     .set_public_path("/build")
//!     .add_entry("app", "./assets/app.js")
//!     .unwrap()
//!     .enable_single_runtime_chunk();
//!
//! assert_eq!(state.public_path(), Some("/build/"));
//! ```

pub mod cache_group;
pub mod callback;
pub mod copy;
pub mod entry;
pub mod error;
pub mod integrity;
pub mod options;
pub mod paths;
pub mod plugin;
pub mod runtime;
pub mod state;

pub use cache_group::{CacheGroup, CacheGroupTest};
pub use callback::{OptionsCallback, keep};
pub use copy::CopyFilesConfig;
pub use entry::{COPY_FILES_ENTRY, EntryKind, EntrySource};
pub use error::{ConfigError, Result};
pub use integrity::HashAlgorithm;
pub use options::{
    AssetRuleOptions, AssetType, BabelOptions, FilenameOptions, PreactOptions, SassOptions,
    UseBuiltIns, VueOptions,
};
pub use plugin::{PluginDescriptor, RegisteredPlugin};
pub use runtime::{Environment, RuntimeContext};
pub use state::{
    AssetRule, BabelConfig, BuildCache, BuildState, Callbacks, Pipelines, RuleName, SassPipeline,
    VuePipeline,
};
