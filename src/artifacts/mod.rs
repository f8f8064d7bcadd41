//! Compiler artifact discovery and loading.
//!
//! Supports the Foundry layout (`out/<C>.sol/<C>.json`) and the Hardhat
//! layout (`artifacts/contracts/<C>.sol/<C>.json` or a flat
//! `<C>.json`), with per-contract overrides from `contracts.yaml`.

pub mod cache;
pub mod normalize;

pub use cache::ArtifactCacheManager;
pub use normalize::normalize_contract;

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use tracing::warn;

use crate::config::{ContractsConfig, ProjectKind};

/// Errors raised while resolving or parsing artifacts.
#[derive(Debug, Error)]
pub enum ArtifactError {
    /// No artifact file could be found for the contract
    #[error("artifact not found for contract: {0}")]
    NotFound(String),

    /// Error reading an artifact file
    #[error("error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The artifact file is not valid JSON
    #[error("invalid artifact JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// A loaded, toolchain-agnostic artifact.
#[derive(Debug, Clone)]
pub struct ContractArtifact {
    pub contract_name: String,
    pub abi: Vec<serde_json::Value>,
    pub bytecode: Option<String>,
    pub deployed_bytecode: Option<String>,
    pub metadata: Option<serde_json::Value>,
}

impl ContractArtifact {
    /// An empty-ABI stub, used for interfaces with no compiled artifact.
    pub fn stub(contract_name: &str) -> Self {
        Self {
            contract_name: contract_name.to_string(),
            abi: Vec::new(),
            bytecode: None,
            deployed_bytecode: None,
            metadata: None,
        }
    }
}

/// Raw on-disk artifact shape. Foundry nests bytecode under an object
/// with an `object` field; Hardhat stores it as a bare hex string.
#[derive(Debug, Deserialize)]
struct RawArtifact {
    #[serde(default)]
    abi: Vec<serde_json::Value>,
    #[serde(default)]
    bytecode: Option<RawBytecode>,
    #[serde(default, rename = "deployedBytecode")]
    deployed_bytecode: Option<RawBytecode>,
    #[serde(default)]
    metadata: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawBytecode {
    Plain(String),
    Object { object: String },
}

impl RawBytecode {
    fn into_hex(self) -> String {
        match self {
            Self::Plain(hex) => hex,
            Self::Object { object } => object,
        }
    }
}

/// Resolves and loads artifacts for configured contracts.
pub struct ArtifactLoader {
    foundry_out: PathBuf,
    hardhat_out: Option<PathBuf>,
    config: Option<ContractsConfig>,
}

impl ArtifactLoader {
    pub fn new(foundry_out: PathBuf, hardhat_out: Option<PathBuf>) -> Self {
        Self {
            foundry_out,
            hardhat_out,
            config: None,
        }
    }

    /// Loader with config-driven per-contract overrides.
    pub fn with_config(
        foundry_out: PathBuf,
        hardhat_out: Option<PathBuf>,
        config: &ContractsConfig,
    ) -> Self {
        Self {
            foundry_out,
            hardhat_out,
            config: Some(config.clone()),
        }
    }

    /// Resolve the artifact path for a contract, or `None` when no
    /// candidate exists on disk.
    pub fn resolve_artifact_path(&self, contract_name: &str) -> Option<PathBuf> {
        let definition = self
            .config
            .as_ref()
            .and_then(|c| c.contract_definition(contract_name));
        let override_ = definition.and_then(|d| d.artifact.as_ref());

        if let Some(override_) = override_ {
            let project = override_.project.unwrap_or(ProjectKind::Foundry);
            let out_dir = override_.out_dir.clone().unwrap_or_else(|| match project {
                ProjectKind::Foundry => self.foundry_out.clone(),
                ProjectKind::Hardhat => self
                    .hardhat_out
                    .clone()
                    .unwrap_or_else(|| PathBuf::from("./artifacts")),
            });

            if let Some(file) = &override_.file {
                let full = out_dir.join(file);
                return full.exists().then_some(full);
            }

            if project == ProjectKind::Foundry {
                let path = foundry_path(&out_dir, contract_name);
                if path.exists() {
                    return Some(path);
                }
            }
            for path in hardhat_paths(&out_dir, contract_name) {
                if path.exists() {
                    return Some(path);
                }
            }
            return None;
        }

        let foundry = foundry_path(&self.foundry_out, contract_name);
        if foundry.exists() {
            return Some(foundry);
        }

        if let Some(hardhat_out) = &self.hardhat_out {
            for path in hardhat_paths(hardhat_out, contract_name) {
                if path.exists() {
                    return Some(path);
                }
            }
        }

        None
    }

    /// Load and parse the artifact for a contract.
    pub fn load_artifact(&self, contract_name: &str) -> Result<ContractArtifact, ArtifactError> {
        let path = self
            .resolve_artifact_path(contract_name)
            .ok_or_else(|| ArtifactError::NotFound(contract_name.to_string()))?;
        self.load_artifact_from(contract_name, &path)
    }

    fn load_artifact_from(
        &self,
        contract_name: &str,
        path: &Path,
    ) -> Result<ContractArtifact, ArtifactError> {
        let contents = fs::read_to_string(path).map_err(|source| ArtifactError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let raw: RawArtifact =
            serde_json::from_str(&contents).map_err(|source| ArtifactError::Json {
                path: path.to_path_buf(),
                source,
            })?;

        Ok(ContractArtifact {
            contract_name: contract_name.to_string(),
            abi: raw.abi,
            bytecode: raw.bytecode.map(RawBytecode::into_hex),
            deployed_bytecode: raw.deployed_bytecode.map(RawBytecode::into_hex),
            metadata: raw.metadata,
        })
    }

    /// Whether an artifact exists for a contract.
    pub fn artifact_exists(&self, contract_name: &str) -> bool {
        self.resolve_artifact_path(contract_name).is_some()
    }

    /// Resolved path per configured contract name; missing names are
    /// simply absent from the map.
    pub fn list_resolved_artifacts(&self, contract_names: &[String]) -> BTreeMap<String, PathBuf> {
        contract_names
            .iter()
            .filter_map(|name| {
                self.resolve_artifact_path(name)
                    .map(|path| (name.clone(), path))
            })
            .collect()
    }

    /// Scan both artifact layouts for available contracts.
    pub fn list_available_contracts(&self) -> Vec<String> {
        let mut names = std::collections::BTreeSet::new();

        scan_sol_dirs(&self.foundry_out, &mut names);
        if let Some(hardhat_out) = &self.hardhat_out {
            scan_sol_dirs(&hardhat_out.join("contracts"), &mut names);
        }

        names.into_iter().collect()
    }
}

fn foundry_path(out_dir: &Path, contract_name: &str) -> PathBuf {
    out_dir
        .join(format!("{contract_name}.sol"))
        .join(format!("{contract_name}.json"))
}

fn hardhat_paths(out_dir: &Path, contract_name: &str) -> [PathBuf; 2] {
    [
        out_dir
            .join("contracts")
            .join(format!("{contract_name}.sol"))
            .join(format!("{contract_name}.json")),
        out_dir.join(format!("{contract_name}.json")),
    ]
}

/// Collect contract names from a `<Name>.sol/<Name>.json` directory layout.
fn scan_sol_dirs(dir: &Path, names: &mut std::collections::BTreeSet<String>) {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(_) => return,
    };
    for entry in entries.flatten() {
        let file_name = entry.file_name();
        let Some(name) = file_name.to_str() else {
            continue;
        };
        let Some(contract_name) = name.strip_suffix(".sol") else {
            continue;
        };
        let json = entry.path().join(format!("{contract_name}.json"));
        if json.exists() {
            names.insert(contract_name.to_string());
        } else {
            warn!(contract = contract_name, "artifact directory without JSON, skipping");
        }
    }
}
