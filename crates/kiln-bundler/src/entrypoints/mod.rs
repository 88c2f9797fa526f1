//! The entry points manifest (`entrypoints.json`).
//!
//! Once the bundler has emitted its files it reports which assets each entry
//! produced. [`EntryPointsPlugin::after_emit`] groups those assets by file
//! extension, turns them into public URLs, optionally adds integrity digests
//! and writes the result to the output directory, replacing any previous file.

mod integrity;

use std::fs;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use kiln_config::{BuildState, COPY_FILES_ENTRY, HashAlgorithm};
use serde::{Deserialize, Serialize};

pub use integrity::IntegrityHasher;

use crate::Result;
use crate::public_path::resolve_public_path;

pub const ENTRYPOINTS_FILENAME: &str = "entrypoints.json";

/// Assets of the bundler's dev-server hot reload, never listed.
const HOT_UPDATE_MARKER: &str = ".hot-update.";

/// Files of one entry, grouped by extension (`js`, `css`, ...).
pub type EntryFiles = IndexMap<String, Vec<String>>;

/// One asset as the bundler reports it: a bare file name or an object with a `name`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum ReportedAsset {
    Name(String),
    Detailed { name: String },
}

impl ReportedAsset {
    pub fn name(&self) -> &str {
        match self {
            ReportedAsset::Name(name) | ReportedAsset::Detailed { name } => name,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ReportedEntry {
    #[serde(default)]
    pub assets: Vec<ReportedAsset>,
}

/// Entry to asset associations of one finished build.
///
/// Deserializes from the bundler's stats JSON; unrelated stats keys are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct AssetReport {
    #[serde(default)]
    pub entrypoints: IndexMap<String, ReportedEntry>,
}

impl AssetReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let json = fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Adds an entry with its emitted asset names.
    pub fn with_entry<I, S>(mut self, name: &str, assets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let assets = assets
            .into_iter()
            .map(|asset| ReportedAsset::Name(asset.into()))
            .collect();
        self.entrypoints
            .insert(name.to_string(), ReportedEntry { assets });
        self
    }
}

/// Contents of `entrypoints.json`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryManifest {
    pub entrypoints: IndexMap<String, EntryFiles>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub integrity: Option<IndexMap<String, String>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryPointsOptions {
    pub output_path: PathBuf,
    /// Real public path, after dev-server resolution.
    pub public_path: String,
    /// Empty when integrity hashes are disabled.
    pub integrity_algorithms: Vec<HashAlgorithm>,
}

impl EntryPointsOptions {
    pub fn from_state(state: &BuildState) -> Self {
        Self {
            output_path: state.output_path().map(PathBuf::from).unwrap_or_default(),
            public_path: resolve_public_path(state),
            integrity_algorithms: state.integrity_algorithms().to_vec(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct EntryPointsPlugin {
    options: EntryPointsOptions,
}

impl EntryPointsPlugin {
    pub fn new(options: EntryPointsOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &EntryPointsOptions {
        &self.options
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.options.output_path.join(ENTRYPOINTS_FILENAME)
    }

    /// Builds the manifest for `report` and writes it to the output directory.
    pub fn after_emit(&self, report: &AssetReport) -> Result<EntryManifest> {
        let manifest = self.build_manifest(report);
        self.write(&manifest)?;
        Ok(manifest)
    }

    /// The manifest for `report`, without touching the output file.
    pub fn build_manifest(&self, report: &AssetReport) -> EntryManifest {
        let mut entrypoints = IndexMap::new();
        for (name, entry) in &report.entrypoints {
            if name == COPY_FILES_ENTRY {
                continue;
            }

            let mut files = EntryFiles::new();
            for asset in &entry.assets {
                let asset = asset.name();
                if asset.contains(HOT_UPDATE_MARKER) {
                    continue;
                }
                files
                    .entry(file_extension(asset).to_string())
                    .or_default()
                    .push(self.public_url(asset));
            }
            entrypoints.insert(name.clone(), files);
        }

        let integrity = (!self.options.integrity_algorithms.is_empty())
            .then(|| self.integrity(&entrypoints));

        EntryManifest {
            entrypoints,
            integrity,
        }
    }

    fn public_url(&self, asset: &str) -> String {
        let public_path = &self.options.public_path;
        if public_path.ends_with('/') {
            format!("{public_path}{asset}")
        } else {
            format!("{public_path}/{asset}")
        }
    }

    fn integrity(&self, entrypoints: &IndexMap<String, EntryFiles>) -> IndexMap<String, String> {
        let mut hasher = IntegrityHasher::new(
            &self.options.output_path,
            &self.options.public_path,
            &self.options.integrity_algorithms,
        );

        let mut integrity = IndexMap::new();
        let urls = entrypoints.values().flat_map(|files| files.values().flatten());
        for url in urls {
            if integrity.contains_key(url) {
                continue;
            }
            if let Some(digest) = hasher.digest(url) {
                integrity.insert(url.clone(), digest);
            }
        }

        tracing::debug!(
            urls = integrity.len(),
            files = hasher.files_hashed(),
            "computed integrity hashes"
        );
        integrity
    }

    /// Writes through a temporary file and a rename, so readers never see a
    /// half-written manifest.
    fn write(&self, manifest: &EntryManifest) -> Result<()> {
        fs::create_dir_all(&self.options.output_path)?;

        let path = self.manifest_path();
        let temp_path = path.with_extension("json.tmp");
        let json = serde_json::to_string_pretty(manifest)?;
        fs::write(&temp_path, json)?;
        if let Err(err) = fs::rename(&temp_path, &path) {
            let _ = fs::remove_file(&temp_path);
            return Err(err.into());
        }

        tracing::info!(
            path = %path.display(),
            entries = manifest.entrypoints.len(),
            "wrote entry points manifest"
        );
        Ok(())
    }
}

/// Text after the last dot, once any query string is removed.
fn file_extension(asset: &str) -> &str {
    let path = integrity::strip_query(asset);
    path.rsplit_once('.').map_or(path, |(_, extension)| extension)
}
