//! Build cache: content hashes of config, artifacts and target dirs.
//!
//! State lives in `.abikit-cache.json` next to where the tool runs. A
//! missing or corrupt cache file simply means "regenerate everything";
//! save failures are logged and otherwise ignored, caching is optional.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;
use tracing::{debug, warn};

/// Default cache file name.
pub const CACHE_FILE: &str = ".abikit-cache.json";

/// Errors from explicit cache operations (clearing).
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("error removing cache file {path}: {source}")]
    Remove {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Persisted cache state.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CacheData {
    pub config_hash: Option<String>,
    pub artifacts_hash: Option<String>,
    pub targets_hash: Option<String>,
    pub last_build_time: Option<chrono::DateTime<chrono::Utc>>,
}

/// Inputs fingerprinted by the cache.
#[derive(Debug, Clone)]
pub struct BuildInputs {
    pub config_path: PathBuf,
    pub artifact_paths: Vec<PathBuf>,
    pub target_dirs: Vec<PathBuf>,
}

/// Outcome of a regeneration check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegenerationCheck {
    /// Inputs unchanged and outputs present
    Clean,
    /// Regeneration needed, with the first reason found
    Needed(String),
}

impl RegenerationCheck {
    pub fn is_needed(&self) -> bool {
        matches!(self, Self::Needed(_))
    }
}

/// SHA-256 of a file's contents, `None` when unreadable.
pub fn hash_file(path: &Path) -> Option<String> {
    let contents = fs::read(path).ok()?;
    Some(hex::encode(Sha256::digest(&contents)))
}

/// Recursive SHA-256 over a directory's JSON files. Hidden entries and
/// `node_modules` are skipped; per-file hashes are sorted before
/// combining so the result is order-independent. `None` when the
/// directory has no matching files.
pub fn hash_directory(dir: &Path) -> Option<String> {
    let mut hashes = Vec::new();
    collect_dir_hashes(dir, &mut hashes);
    if hashes.is_empty() {
        return None;
    }
    hashes.sort();
    Some(hex::encode(Sha256::digest(hashes.concat().as_bytes())))
}

fn collect_dir_hashes(dir: &Path, hashes: &mut Vec<String>) {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(_) => return,
    };
    for entry in entries.flatten() {
        let name = entry.file_name();
        let Some(name) = name.to_str() else { continue };
        if name.starts_with('.') || name == "node_modules" {
            continue;
        }
        let path = entry.path();
        if path.is_dir() {
            collect_dir_hashes(&path, hashes);
        } else if name.ends_with(".json") {
            if let Some(hash) = hash_file(&path) {
                hashes.push(hash);
            }
        }
    }
}

/// Combined hash over a mixed list of files and directories.
fn hash_paths(paths: &[PathBuf]) -> String {
    let mut hashes: Vec<String> = paths
        .iter()
        .filter_map(|path| {
            if path.is_dir() {
                hash_directory(path)
            } else {
                hash_file(path)
            }
        })
        .collect();
    hashes.sort();
    hex::encode(Sha256::digest(hashes.concat().as_bytes()))
}

fn hash_target_dirs(target_dirs: &[PathBuf]) -> String {
    let mut names: Vec<String> = target_dirs
        .iter()
        .map(|p| p.to_string_lossy().into_owned())
        .collect();
    names.sort();
    hex::encode(Sha256::digest(names.join("\n").as_bytes()))
}

/// Manages the `.abikit-cache.json` build cache.
pub struct CacheManager {
    cache_file: PathBuf,
    cache: CacheData,
}

impl CacheManager {
    /// Open (or initialize) the cache at the given file path.
    pub fn new(cache_file: impl Into<PathBuf>) -> Self {
        let cache_file = cache_file.into();
        let cache = load_cache(&cache_file);
        Self { cache_file, cache }
    }

    pub fn data(&self) -> &CacheData {
        &self.cache
    }

    /// Decide whether generation can be skipped.
    pub fn needs_regeneration(&self, inputs: &BuildInputs) -> RegenerationCheck {
        let Some(config_hash) = hash_file(&inputs.config_path) else {
            return RegenerationCheck::Needed("config file not found or unreadable".into());
        };
        if self.cache.config_hash.as_deref() != Some(config_hash.as_str()) {
            return RegenerationCheck::Needed("config file changed".into());
        }

        let artifacts_hash = hash_paths(&inputs.artifact_paths);
        if self.cache.artifacts_hash.as_deref() != Some(artifacts_hash.as_str()) {
            return RegenerationCheck::Needed("artifact files changed".into());
        }

        for target_dir in &inputs.target_dirs {
            if !target_dir.exists() {
                return RegenerationCheck::Needed(format!(
                    "target directory missing: {}",
                    target_dir.display()
                ));
            }
        }

        let targets_hash = hash_target_dirs(&inputs.target_dirs);
        if self.cache.targets_hash.as_deref() != Some(targets_hash.as_str()) {
            return RegenerationCheck::Needed("target configuration changed".into());
        }

        RegenerationCheck::Clean
    }

    /// Record a successful build and persist the cache.
    pub fn record_build(&mut self, inputs: &BuildInputs) {
        self.cache = CacheData {
            config_hash: hash_file(&inputs.config_path),
            artifacts_hash: Some(hash_paths(&inputs.artifact_paths)),
            targets_hash: Some(hash_target_dirs(&inputs.target_dirs)),
            last_build_time: Some(chrono::Utc::now()),
        };
        self.save();
    }

    /// Drop all cache state and delete the cache file.
    pub fn clear(&mut self) -> Result<(), CacheError> {
        self.cache = CacheData::default();
        if self.cache_file.exists() {
            fs::remove_file(&self.cache_file).map_err(|source| CacheError::Remove {
                path: self.cache_file.clone(),
                source,
            })?;
        }
        Ok(())
    }

    fn save(&self) {
        match serde_json::to_string_pretty(&self.cache) {
            Ok(json) => {
                if let Err(err) = fs::write(&self.cache_file, json) {
                    warn!(%err, path = %self.cache_file.display(), "failed to save build cache");
                }
            }
            Err(err) => warn!(%err, "failed to serialize build cache"),
        }
    }
}

fn load_cache(path: &Path) -> CacheData {
    let Ok(contents) = fs::read_to_string(path) else {
        return CacheData::default();
    };
    match serde_json::from_str(&contents) {
        Ok(data) => data,
        Err(err) => {
            debug!(%err, path = %path.display(), "ignoring corrupt build cache");
            CacheData::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn setup(tmp: &Path) -> BuildInputs {
        let config_path = tmp.join("contracts.yaml");
        fs::write(&config_path, "generation:\n  targets: []\n").expect("write config");

        let artifacts = tmp.join("out");
        fs::create_dir_all(&artifacts).expect("mkdir");
        fs::write(artifacts.join("Token.json"), r#"{"abi": []}"#).expect("write artifact");

        let target = tmp.join("sdk");
        fs::create_dir_all(&target).expect("mkdir");

        BuildInputs {
            config_path,
            artifact_paths: vec![artifacts],
            target_dirs: vec![target],
        }
    }

    #[test]
    fn clean_after_record() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let inputs = setup(tmp.path());
        let mut manager = CacheManager::new(tmp.path().join(CACHE_FILE));

        assert!(manager.needs_regeneration(&inputs).is_needed());
        manager.record_build(&inputs);
        assert_eq!(manager.needs_regeneration(&inputs), RegenerationCheck::Clean);
    }

    #[test]
    fn artifact_change_invalidates() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let inputs = setup(tmp.path());
        let mut manager = CacheManager::new(tmp.path().join(CACHE_FILE));
        manager.record_build(&inputs);

        fs::write(
            inputs.artifact_paths[0].join("Token.json"),
            r#"{"abi": [{"type": "fallback"}]}"#,
        )
        .expect("rewrite artifact");

        match manager.needs_regeneration(&inputs) {
            RegenerationCheck::Needed(reason) => assert!(reason.contains("artifact")),
            RegenerationCheck::Clean => panic!("expected regeneration"),
        }
    }

    #[test]
    fn config_change_invalidates() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let inputs = setup(tmp.path());
        let mut manager = CacheManager::new(tmp.path().join(CACHE_FILE));
        manager.record_build(&inputs);

        fs::write(&inputs.config_path, "generation:\n  targets: [] # edited\n")
            .expect("rewrite config");
        assert!(manager.needs_regeneration(&inputs).is_needed());
    }

    #[test]
    fn missing_target_dir_invalidates() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let inputs = setup(tmp.path());
        let mut manager = CacheManager::new(tmp.path().join(CACHE_FILE));
        manager.record_build(&inputs);

        fs::remove_dir_all(&inputs.target_dirs[0]).expect("rm target");
        assert!(manager.needs_regeneration(&inputs).is_needed());
    }

    #[test]
    fn cache_survives_reload_and_clear() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let inputs = setup(tmp.path());
        let cache_file = tmp.path().join(CACHE_FILE);

        let mut manager = CacheManager::new(&cache_file);
        manager.record_build(&inputs);
        drop(manager);

        let mut reloaded = CacheManager::new(&cache_file);
        assert_eq!(reloaded.needs_regeneration(&inputs), RegenerationCheck::Clean);

        reloaded.clear().expect("clear");
        assert!(!cache_file.exists());
        assert!(reloaded.needs_regeneration(&inputs).is_needed());
    }

    #[test]
    fn corrupt_cache_treated_as_empty() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let cache_file = tmp.path().join(CACHE_FILE);
        fs::write(&cache_file, "{ not json").expect("write garbage");

        let manager = CacheManager::new(&cache_file);
        assert!(manager.data().config_hash.is_none());
    }

    #[test]
    fn directory_hash_is_order_independent_and_skips_hidden() {
        let tmp = tempfile::tempdir().expect("tempdir");
        fs::write(tmp.path().join("a.json"), "1").expect("write");
        fs::write(tmp.path().join("b.json"), "2").expect("write");
        fs::write(tmp.path().join(".hidden.json"), "3").expect("write");
        let first = hash_directory(tmp.path()).expect("hash");

        fs::remove_file(tmp.path().join(".hidden.json")).expect("rm");
        let second = hash_directory(tmp.path()).expect("hash");
        assert_eq!(first, second);

        fs::write(tmp.path().join("b.json"), "changed").expect("write");
        assert_ne!(second, hash_directory(tmp.path()).expect("hash"));
    }
}
