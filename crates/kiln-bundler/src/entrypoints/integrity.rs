//! Subresource integrity digests for emitted assets.

use std::fs;
use std::path::{Path, PathBuf};

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use kiln_config::HashAlgorithm;
use path_clean::PathClean;
use rustc_hash::FxHashMap;
use sha2::{Digest, Sha256, Sha384, Sha512};

/// Computes integrity strings for asset URLs, reading each file at most once.
///
/// Digests are cached per resolved file, so URLs that differ only by their
/// query string or by `.`/`..` segments share one read.
#[derive(Debug)]
pub struct IntegrityHasher<'a> {
    output_path: &'a Path,
    public_path: &'a str,
    algorithms: &'a [HashAlgorithm],
    digests: FxHashMap<PathBuf, Option<String>>,
    files_hashed: usize,
}

impl<'a> IntegrityHasher<'a> {
    pub fn new(output_path: &'a Path, public_path: &'a str, algorithms: &'a [HashAlgorithm]) -> Self {
        Self {
            output_path,
            public_path,
            algorithms,
            digests: FxHashMap::default(),
            files_hashed: 0,
        }
    }

    /// Integrity string for `url`, e.g. `sha384-... sha512-...`.
    ///
    /// `None` when the file is not on disk or resolves outside the output
    /// directory; neither is an error.
    pub fn digest(&mut self, url: &str) -> Option<String> {
        let path = self.resolve(strip_query(url))?;
        if let Some(cached) = self.digests.get(&path) {
            return cached.clone();
        }

        let digest = self.compute(&path);
        self.digests.insert(path, digest.clone());
        digest
    }

    /// Number of files actually read and hashed so far.
    pub fn files_hashed(&self) -> usize {
        self.files_hashed
    }

    fn compute(&mut self, path: &Path) -> Option<String> {
        let bytes = match fs::read(path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "asset not on disk, no integrity hash");
                return None;
            }
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "unable to read asset, no integrity hash");
                return None;
            }
        };

        self.files_hashed += 1;
        let digest = self
            .algorithms
            .iter()
            .map(|algorithm| format!("{algorithm}-{}", encode_digest(*algorithm, &bytes)))
            .collect::<Vec<_>>()
            .join(" ");
        Some(digest)
    }

    /// On-disk location of a public URL, contained in the output directory.
    fn resolve(&self, normalized: &str) -> Option<PathBuf> {
        let relative = normalized
            .strip_prefix(self.public_path)
            .unwrap_or(normalized)
            .trim_start_matches('/');
        let path = self.output_path.join(relative).clean();
        if !path.starts_with(self.output_path) {
            tracing::warn!(url = normalized, "asset resolves outside the output path, skipped");
            return None;
        }
        Some(path)
    }
}

fn encode_digest(algorithm: HashAlgorithm, bytes: &[u8]) -> String {
    match algorithm {
        HashAlgorithm::Sha256 => STANDARD.encode(Sha256::digest(bytes)),
        HashAlgorithm::Sha384 => STANDARD.encode(Sha384::digest(bytes)),
        HashAlgorithm::Sha512 => STANDARD.encode(Sha512::digest(bytes)),
    }
}

/// Drops a `?query` suffix.
pub(crate) fn strip_query(url: &str) -> &str {
    url.split_once('?').map_or(url, |(path, _)| path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn known_sha384_digest() {
        let dir = TempDir::new().expect("temp dir");
        fs::write(dir.path().join("app.js"), b"alert('hi');").expect("write asset");

        let algorithms = [HashAlgorithm::Sha384];
        let mut hasher = IntegrityHasher::new(dir.path(), "/build/", &algorithms);
        let digest = hasher.digest("/build/app.js").expect("digest");

        let expected = STANDARD.encode(Sha384::digest(b"alert('hi');"));
        assert_eq!(digest, format!("sha384-{expected}"));
    }

    #[test]
    fn several_algorithms_are_space_separated() {
        let dir = TempDir::new().expect("temp dir");
        fs::write(dir.path().join("app.css"), b"body{}").expect("write asset");

        let algorithms = [HashAlgorithm::Sha256, HashAlgorithm::Sha512];
        let mut hasher = IntegrityHasher::new(dir.path(), "/build/", &algorithms);
        let digest = hasher.digest("/build/app.css").expect("digest");
        let parts: Vec<&str> = digest.split(' ').collect();
        assert_eq!(parts.len(), 2);
        assert!(parts[0].starts_with("sha256-"));
        assert!(parts[1].starts_with("sha512-"));
    }

    #[test]
    fn query_variants_share_one_read() {
        let dir = TempDir::new().expect("temp dir");
        fs::write(dir.path().join("app.js"), b"1").expect("write asset");

        let algorithms = [HashAlgorithm::Sha384];
        let mut hasher = IntegrityHasher::new(dir.path(), "/build/", &algorithms);
        let plain = hasher.digest("/build/app.js");
        let versioned = hasher.digest("/build/app.js?v=42");
        assert!(plain.is_some());
        assert_eq!(plain, versioned);
        assert_eq!(hasher.files_hashed(), 1);
    }

    #[test]
    fn dot_segments_resolve_to_the_cached_file() {
        let dir = TempDir::new().expect("temp dir");
        fs::write(dir.path().join("app.js"), b"1").expect("write asset");

        let algorithms = [HashAlgorithm::Sha384];
        let mut hasher = IntegrityHasher::new(dir.path(), "/build/", &algorithms);
        let plain = hasher.digest("/build/app.js");
        let dotted = hasher.digest("/build/chunks/../app.js");
        assert!(plain.is_some());
        assert_eq!(plain, dotted);
        assert_eq!(hasher.files_hashed(), 1);
    }

    #[test]
    fn missing_and_escaping_files_are_skipped() {
        let dir = TempDir::new().expect("temp dir");
        let algorithms = [HashAlgorithm::Sha384];
        let mut hasher = IntegrityHasher::new(dir.path(), "/build/", &algorithms);
        assert_eq!(hasher.digest("/build/missing.js"), None);
        assert_eq!(hasher.digest("/build/../../etc/passwd"), None);
        assert_eq!(hasher.files_hashed(), 0);
    }

    #[test]
    fn strip_query_keeps_plain_urls() {
        assert_eq!(strip_query("/a.js?v=1"), "/a.js");
        assert_eq!(strip_query("/a.js"), "/a.js");
    }
}
