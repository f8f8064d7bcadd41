//! Artifact copy-cache.
//!
//! When `artifactSources.cache.mode: copy` is set, resolved artifact
//! JSONs are copied into a local directory with a manifest
//! (`.artifact-cache.json`) so SDK builds keep working after the
//! compiler `out/` directory is cleaned.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::cache::hash_directory;
use crate::config::ContractsConfig;

use super::{ArtifactError, ArtifactLoader};

const MANIFEST_FILE: &str = ".artifact-cache.json";
const DEFAULT_CACHE_DIR: &str = "artifacts";

/// Persisted copy-cache manifest.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ArtifactCacheData {
    pub artifacts_hash: Option<String>,
    pub last_cache_time: Option<chrono::DateTime<chrono::Utc>>,
    /// contract name -> cached file path
    pub cached_artifacts: BTreeMap<String, PathBuf>,
}

/// Summary returned by [`ArtifactCacheManager::stats`].
#[derive(Debug, Clone)]
pub struct ArtifactCacheStats {
    pub cache_dir: PathBuf,
    pub cached_count: usize,
    pub last_cache_time: Option<chrono::DateTime<chrono::Utc>>,
}

/// Copies resolved artifacts into a local cache directory.
pub struct ArtifactCacheManager {
    cache_dir: PathBuf,
    manifest_file: PathBuf,
    cache: ArtifactCacheData,
}

impl ArtifactCacheManager {
    /// Build from config, resolving the cache dir relative to `base_dir`.
    pub fn from_config(config: &ContractsConfig, base_dir: &Path) -> Self {
        let dir = config
            .artifact_sources
            .as_ref()
            .and_then(|s| s.cache.dir.clone())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CACHE_DIR));
        let cache_dir = if dir.is_absolute() {
            dir
        } else {
            base_dir.join(dir)
        };
        Self::new(cache_dir)
    }

    pub fn new(cache_dir: PathBuf) -> Self {
        let manifest_file = cache_dir.join(MANIFEST_FILE);
        let cache = load_manifest(&manifest_file);
        Self {
            cache_dir,
            manifest_file,
            cache,
        }
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Copy artifacts for the named contracts into the cache dir.
    /// Skipped entirely when the source content hash is unchanged,
    /// unless `force` is set.
    pub fn copy_artifacts(
        &mut self,
        loader: &ArtifactLoader,
        contract_names: &[String],
        source_dir: &Path,
        force: bool,
    ) -> Result<usize, ArtifactError> {
        let source_hash = hash_directory(source_dir);
        if !force
            && source_hash.is_some()
            && source_hash == self.cache.artifacts_hash
            && !self.cache.cached_artifacts.is_empty()
        {
            info!("artifact cache up to date, skipping copy");
            return Ok(0);
        }

        fs::create_dir_all(&self.cache_dir).map_err(|source| ArtifactError::Io {
            path: self.cache_dir.clone(),
            source,
        })?;

        let mut copied = 0;
        for name in contract_names {
            let Some(source_path) = loader.resolve_artifact_path(name) else {
                warn!(contract = %name, "no artifact to cache");
                continue;
            };
            let dest = self.cache_dir.join(format!("{name}.json"));
            match fs::copy(&source_path, &dest) {
                Ok(_) => {
                    self.cache.cached_artifacts.insert(name.clone(), dest);
                    copied += 1;
                }
                Err(err) => warn!(contract = %name, %err, "failed to copy artifact"),
            }
        }

        self.cache.artifacts_hash = source_hash;
        self.cache.last_cache_time = Some(chrono::Utc::now());
        self.save();

        Ok(copied)
    }

    /// Cached path for a contract, when present on disk.
    pub fn cached_artifact_path(&self, contract_name: &str) -> Option<PathBuf> {
        let path = self.cache.cached_artifacts.get(contract_name)?;
        path.exists().then(|| path.clone())
    }

    /// Remove all cached artifacts, keeping the manifest file itself.
    pub fn clear(&mut self) -> Result<(), ArtifactError> {
        if self.cache_dir.exists() {
            let entries = fs::read_dir(&self.cache_dir).map_err(|source| ArtifactError::Io {
                path: self.cache_dir.clone(),
                source,
            })?;
            for entry in entries.flatten() {
                if entry.file_name() == MANIFEST_FILE {
                    continue;
                }
                if let Err(err) = fs::remove_file(entry.path()) {
                    warn!(path = %entry.path().display(), %err, "failed to remove cached artifact");
                }
            }
        }
        self.cache = ArtifactCacheData::default();
        self.save();
        Ok(())
    }

    pub fn stats(&self) -> ArtifactCacheStats {
        ArtifactCacheStats {
            cache_dir: self.cache_dir.clone(),
            cached_count: self.cache.cached_artifacts.len(),
            last_cache_time: self.cache.last_cache_time,
        }
    }

    fn save(&self) {
        let Ok(json) = serde_json::to_string_pretty(&self.cache) else {
            return;
        };
        if let Err(err) = fs::write(&self.manifest_file, json) {
            warn!(%err, "failed to save artifact cache manifest");
        }
    }
}

fn load_manifest(path: &Path) -> ArtifactCacheData {
    let Ok(contents) = fs::read_to_string(path) else {
        return ArtifactCacheData::default();
    };
    serde_json::from_str(&contents).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_foundry_artifact(out: &Path, name: &str) {
        let dir = out.join(format!("{name}.sol"));
        fs::create_dir_all(&dir).expect("mkdir");
        fs::write(dir.join(format!("{name}.json")), r#"{"abi": []}"#).expect("write");
    }

    #[test]
    fn copies_and_skips_when_unchanged() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let out = tmp.path().join("out");
        write_foundry_artifact(&out, "Token");
        write_foundry_artifact(&out, "Vault");

        let loader = ArtifactLoader::new(out.clone(), None);
        let names = vec!["Token".to_string(), "Vault".to_string()];
        let mut cache = ArtifactCacheManager::new(tmp.path().join("cache"));

        let copied = cache.copy_artifacts(&loader, &names, &out, false).expect("copy");
        assert_eq!(copied, 2);
        assert!(cache.cached_artifact_path("Token").is_some());
        assert_eq!(cache.stats().cached_count, 2);

        // Unchanged source: second run is a no-op
        let copied = cache.copy_artifacts(&loader, &names, &out, false).expect("copy");
        assert_eq!(copied, 0);

        // Force bypasses the hash check
        let copied = cache.copy_artifacts(&loader, &names, &out, true).expect("copy");
        assert_eq!(copied, 2);
    }

    #[test]
    fn clear_removes_cached_files() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let out = tmp.path().join("out");
        write_foundry_artifact(&out, "Token");

        let loader = ArtifactLoader::new(out.clone(), None);
        let mut cache = ArtifactCacheManager::new(tmp.path().join("cache"));
        cache
            .copy_artifacts(&loader, &["Token".to_string()], &out, false)
            .expect("copy");

        cache.clear().expect("clear");
        assert_eq!(cache.stats().cached_count, 0);
        assert!(cache.cached_artifact_path("Token").is_none());
    }
}
