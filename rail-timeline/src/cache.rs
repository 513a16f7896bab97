//! Disk cache for computed artifacts.
//!
//! Artifacts are stored as JSON files named after a fingerprint of everything
//! that went into computing them. The same inputs and configuration always
//! produce the same fingerprint, so a stored artifact can be reused safely;
//! any change to the inputs produces a new file instead of a stale hit.

use std::path::{Path, PathBuf};
use std::time::SystemTime;
use std::fmt;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use xxhash_rust::xxh3::xxh3_64;

/// Errors writing to the artifact cache.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// Value could not be serialized for fingerprinting or storage
    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Cache directory or file could not be written
    #[error("cache I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Content hash of the inputs to a computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Fingerprint(u64);

impl Fingerprint {
    /// Fingerprint a serializable value.
    ///
    /// Only deterministic serializations (ordered maps, no floats that vary
    /// run to run) give stable fingerprints.
    pub fn of<T: Serialize + ?Sized>(value: &T) -> Result<Self, CacheError> {
        let bytes = serde_json::to_vec(value)?;
        Ok(Fingerprint(xxh3_64(&bytes)))
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

/// Whether a stored artifact may be used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CacheMode {
    /// Use a stored artifact when one exists for the fingerprint
    #[default]
    Reuse,
    /// Always recompute, overwriting any stored artifact
    Recompute,
}

/// Stored artifact with metadata.
#[derive(Debug, Serialize, Deserialize)]
struct CachedArtifact<T> {
    /// Unix timestamp when the artifact was written.
    cached_at_secs: u64,
    fingerprint: String,
    artifact: T,
}

/// A directory of fingerprinted JSON artifacts.
#[derive(Debug, Clone)]
pub struct ArtifactCache {
    dir: PathBuf,
}

impl ArtifactCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File that holds the `kind` artifact for `fingerprint`.
    pub fn path_for(&self, kind: &str, fingerprint: Fingerprint) -> PathBuf {
        self.dir.join(format!("{kind}-{fingerprint}.json"))
    }

    /// Load a stored artifact.
    ///
    /// Returns `None` if nothing is stored or the file cannot be decoded.
    pub fn load<T: DeserializeOwned>(&self, kind: &str, fingerprint: Fingerprint) -> Option<T> {
        let path = self.path_for(kind, fingerprint);
        let contents = std::fs::read_to_string(&path).ok()?;
        match serde_json::from_str::<CachedArtifact<T>>(&contents) {
            Ok(cached) if cached.fingerprint == fingerprint.to_string() => Some(cached.artifact),
            Ok(_) => {
                warn!(path = %path.display(), "cached artifact fingerprint mismatch");
                None
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "ignoring unreadable cached artifact");
                None
            }
        }
    }

    /// Store an artifact, creating the cache directory if needed.
    pub fn store<T: Serialize>(
        &self,
        kind: &str,
        fingerprint: Fingerprint,
        artifact: &T,
    ) -> Result<(), CacheError> {
        if !self.dir.as_os_str().is_empty() && !self.dir.exists() {
            std::fs::create_dir_all(&self.dir).map_err(|source| CacheError::Io {
                path: self.dir.clone(),
                source,
            })?;
        }

        let cached_at_secs = SystemTime::now()
            .duration_since(SystemTime::UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        let cached = CachedArtifact {
            cached_at_secs,
            fingerprint: fingerprint.to_string(),
            artifact,
        };

        let path = self.path_for(kind, fingerprint);
        let json = serde_json::to_string(&cached)?;
        std::fs::write(&path, json).map_err(|source| CacheError::Io { path, source })?;
        Ok(())
    }

    /// Return the stored artifact when allowed, otherwise compute and store it.
    pub fn get_or_compute<T, F>(
        &self,
        kind: &str,
        fingerprint: Fingerprint,
        mode: CacheMode,
        compute: F,
    ) -> Result<T, CacheError>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> T,
    {
        if mode == CacheMode::Reuse
            && let Some(artifact) = self.load(kind, fingerprint)
        {
            info!(kind, %fingerprint, "reusing cached artifact");
            return Ok(artifact);
        }

        debug!(kind, %fingerprint, ?mode, "computing artifact");
        let artifact = compute();
        self.store(kind, fingerprint, &artifact)?;
        Ok(artifact)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::collections::BTreeMap;
    use tempfile::tempdir;

    fn inputs(speed: f64) -> (BTreeMap<&'static str, Vec<&'static str>>, f64) {
        let mut schedule = BTreeMap::new();
        schedule.insert("47154", vec!["FM", "HYB", "SC"]);
        schedule.insert("12760", vec!["SC", "KZJ"]);
        (schedule, speed)
    }

    #[test]
    fn fingerprint_is_stable_and_content_sensitive() {
        let a = Fingerprint::of(&inputs(60.0)).unwrap();
        let b = Fingerprint::of(&inputs(60.0)).unwrap();
        let c = Fingerprint::of(&inputs(61.0)).unwrap();

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.to_string().len(), 16);
    }

    #[test]
    fn store_and_load() {
        let dir = tempdir().unwrap();
        let cache = ArtifactCache::new(dir.path().join("nested").join("cache"));
        let fp = Fingerprint::of(&inputs(60.0)).unwrap();

        cache.store("timeline", fp, &vec![1, 2, 3]).unwrap();

        assert_eq!(cache.load::<Vec<i32>>("timeline", fp), Some(vec![1, 2, 3]));
        // Different kind, different fingerprint: nothing stored
        assert_eq!(cache.load::<Vec<i32>>("pairs", fp), None);
        let other = Fingerprint::of(&inputs(61.0)).unwrap();
        assert_eq!(cache.load::<Vec<i32>>("timeline", other), None);
    }

    #[test]
    fn corrupt_file_is_a_miss() {
        let dir = tempdir().unwrap();
        let cache = ArtifactCache::new(dir.path());
        let fp = Fingerprint::of("x").unwrap();

        std::fs::write(cache.path_for("timeline", fp), "{not json").unwrap();
        assert_eq!(cache.load::<Vec<i32>>("timeline", fp), None);
    }

    #[test]
    fn reuse_skips_computation() {
        let dir = tempdir().unwrap();
        let cache = ArtifactCache::new(dir.path());
        let fp = Fingerprint::of(&inputs(60.0)).unwrap();
        let calls = Cell::new(0);
        let compute = || {
            calls.set(calls.get() + 1);
            vec!["row".to_string()]
        };

        let first: Vec<String> = cache.get_or_compute("timeline", fp, CacheMode::Reuse, compute).unwrap();
        let second: Vec<String> = cache.get_or_compute("timeline", fp, CacheMode::Reuse, compute).unwrap();

        assert_eq!(first, second);
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn recompute_ignores_stored_artifact() {
        let dir = tempdir().unwrap();
        let cache = ArtifactCache::new(dir.path());
        let fp = Fingerprint::of(&inputs(60.0)).unwrap();

        cache.store("timeline", fp, &vec![1]).unwrap();
        let fresh: Vec<i32> = cache
            .get_or_compute("timeline", fp, CacheMode::Recompute, || vec![2])
            .unwrap();

        assert_eq!(fresh, vec![2]);
        assert_eq!(cache.load::<Vec<i32>>("timeline", fp), Some(vec![2]));
    }
}
