//! `contracts.yaml` configuration types.
//!
//! The file drives everything: which contracts to load, where their
//! compiled artifacts live, which SDK targets to emit and per-network
//! deployment addresses. Keys are camelCase on disk.

pub mod loader;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

/// Target SDK language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Language {
    #[serde(rename = "ts")]
    Ts,
    #[serde(rename = "python")]
    Python,
}

impl Language {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ts => "ts",
            Self::Python => "python",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One generation target: a language plus its output directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetConfig {
    pub language: Language,
    pub out_dir: String,
    #[serde(default)]
    pub options: TargetOptions,
}

/// Per-target options. TypeScript- and Python-specific fields share one
/// struct; generators read only the fields they understand.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TargetOptions {
    pub package_name: Option<String>,
    pub package_version: Option<String>,

    // TypeScript
    pub transport: Option<Transport>,
    pub emit_hooks: Option<bool>,
    pub bigint_style: Option<BigintStyle>,

    // Python
    pub emit_async: Option<bool>,
    pub strict_types: Option<bool>,
    pub runtime_dependency: Option<String>,

    pub sdk: Option<SdkOptions>,
}

/// TypeScript transport library.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Transport {
    Viem,
    Ethers,
}

/// How the TypeScript generator renders 256-bit integers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BigintStyle {
    #[serde(rename = "native")]
    Native,
    #[serde(rename = "bn.js")]
    BnJs,
}

/// Options for the optional unified SDK entry-point class.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SdkOptions {
    pub enabled: bool,
    pub class_name: Option<String>,
    pub file_name: Option<String>,
    pub lazy_load: Option<bool>,
    pub skip_zero_addresses: Option<bool>,
}

impl SdkOptions {
    pub fn class_name(&self) -> &str {
        self.class_name.as_deref().unwrap_or("ContractSDK")
    }

    pub fn file_name(&self) -> &str {
        self.file_name.as_deref().unwrap_or("sdk")
    }

    pub fn lazy_load(&self) -> bool {
        self.lazy_load.unwrap_or(true)
    }

    pub fn skip_zero_addresses(&self) -> bool {
        self.skip_zero_addresses.unwrap_or(true)
    }
}

/// The `contracts:` section accepts either a bare list of names or a map
/// with per-contract metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ContractsSection {
    Names(Vec<String>),
    Detailed(BTreeMap<String, ContractDefinition>),
}

/// Explicit contract kind, overriding the `I`-prefix convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContractKind {
    Implementation,
    Interface,
}

/// Per-contract metadata in the detailed `contracts:` form.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ContractDefinition {
    #[serde(rename = "type")]
    pub kind: Option<ContractKind>,
    pub implements: Vec<String>,
    pub tags: Vec<String>,
    pub artifact: Option<ArtifactOverride>,
}

/// Toolchain producing an artifact layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectKind {
    Foundry,
    Hardhat,
}

/// Per-contract override of where its artifact lives.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ArtifactOverride {
    pub project: Option<ProjectKind>,
    pub out_dir: Option<PathBuf>,
    pub file: Option<PathBuf>,
}

/// The `generation:` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub targets: Vec<TargetConfig>,
    #[serde(default)]
    pub ignore_functions: IgnoreRules,
    #[serde(default)]
    pub interface_relationships: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    pub types: TypesConfig,
    #[serde(default)]
    pub artifact_paths: ArtifactPaths,
}

/// Functions to drop from generated SDKs, globally or per contract.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct IgnoreRules {
    pub global: Vec<String>,
    pub contracts: BTreeMap<String, Vec<String>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TypesConfig {
    pub structs_only: Option<bool>,
}

/// Legacy artifact path section kept under `generation:`. Prefer
/// `artifactSources.defaults` at the top level.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ArtifactPaths {
    pub foundry_out: Option<PathBuf>,
    pub hardhat_out: Option<PathBuf>,
}

/// Top-level `artifactSources:` section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ArtifactSources {
    pub defaults: ArtifactDefaults,
    pub cache: ArtifactCacheConfig,
    pub watch: WatchConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ArtifactDefaults {
    pub foundry_out: Option<PathBuf>,
    pub hardhat_out: Option<PathBuf>,
}

/// Artifact copy-cache behavior.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ArtifactCacheConfig {
    pub mode: ArtifactCacheMode,
    pub dir: Option<PathBuf>,
    pub copy_on_build: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactCacheMode {
    #[default]
    None,
    Copy,
    Link,
}

/// Accepted but not acted on; kept for config compatibility.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WatchConfig {
    pub enabled: bool,
    pub debounce_ms: Option<u64>,
}

/// A contract entry under a network: either a bare address or an aliased
/// entry naming the contract class it deploys.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NetworkContract {
    Address(String),
    Aliased {
        #[serde(default)]
        name: Option<String>,
        address: String,
    },
}

impl NetworkContract {
    pub fn address(&self) -> &str {
        match self {
            Self::Address(addr) => addr,
            Self::Aliased { address, .. } => address,
        }
    }

    /// Contract class name for this entry, defaulting to the map key.
    pub fn class_name<'a>(&'a self, key: &'a str) -> &'a str {
        match self {
            Self::Address(_) => key,
            Self::Aliased { name, .. } => name.as_deref().unwrap_or(key),
        }
    }
}

/// One deployment network.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkConfig {
    pub chain_id: u64,
    pub name: String,
    pub rpc: String,
    #[serde(default)]
    pub explorer: Option<String>,
    #[serde(default)]
    pub contracts: BTreeMap<String, NetworkContract>,
}

/// EIP-712 domain for signature helpers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Eip712Domain {
    pub name: String,
    pub version: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignatureItem {
    pub contract: String,
    pub primary_type: String,
    pub domain: Eip712Domain,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SignaturesConfig {
    pub enabled: bool,
    pub items: Vec<SignatureItem>,
}

/// Root of `contracts.yaml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractsConfig {
    #[serde(default)]
    pub contracts: Option<ContractsSection>,
    #[serde(default)]
    pub interfaces: Vec<String>,
    pub generation: GenerationConfig,
    #[serde(default)]
    pub artifact_sources: Option<ArtifactSources>,
    #[serde(default)]
    pub networks: BTreeMap<String, NetworkConfig>,
    #[serde(default)]
    pub signatures: SignaturesConfig,
}

impl ContractsConfig {
    /// All configured contract names (both forms) plus interfaces,
    /// deduplicated, config order preserved.
    pub fn all_contract_names(&self) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        match &self.contracts {
            Some(ContractsSection::Names(list)) => names.extend(list.iter().cloned()),
            Some(ContractsSection::Detailed(map)) => names.extend(map.keys().cloned()),
            None => {}
        }
        names.extend(self.interfaces.iter().cloned());
        let mut seen = std::collections::BTreeSet::new();
        names.retain(|n| seen.insert(n.clone()));
        names
    }

    /// Metadata for a contract in the detailed form, if any.
    pub fn contract_definition(&self, name: &str) -> Option<&ContractDefinition> {
        match &self.contracts {
            Some(ContractsSection::Detailed(map)) => map.get(name),
            _ => None,
        }
    }

    /// Whether a contract is an interface: explicit list, explicit
    /// `type: interface`, or the `I`-plus-uppercase naming convention.
    pub fn is_interface(&self, name: &str) -> bool {
        if self.interfaces.iter().any(|i| i == name) {
            return true;
        }
        if let Some(def) = self.contract_definition(name) {
            if def.kind == Some(ContractKind::Interface) {
                return true;
            }
        }
        follows_interface_convention(name)
    }

    /// Interfaces a contract implements: inline `implements:` first,
    /// then `generation.interfaceRelationships`.
    pub fn contract_interfaces(&self, name: &str) -> Vec<String> {
        if let Some(def) = self.contract_definition(name) {
            if !def.implements.is_empty() {
                return def.implements.clone();
            }
        }
        self.generation
            .interface_relationships
            .get(name)
            .cloned()
            .unwrap_or_default()
    }

    /// Effective Foundry out directory (unresolved, as written in config).
    pub fn foundry_out(&self) -> PathBuf {
        self.artifact_sources
            .as_ref()
            .and_then(|s| s.defaults.foundry_out.clone())
            .or_else(|| self.generation.artifact_paths.foundry_out.clone())
            .unwrap_or_else(|| PathBuf::from("./out"))
    }

    /// Effective Hardhat artifacts directory, if configured.
    pub fn hardhat_out(&self) -> Option<PathBuf> {
        self.artifact_sources
            .as_ref()
            .and_then(|s| s.defaults.hardhat_out.clone())
            .or_else(|| self.generation.artifact_paths.hardhat_out.clone())
    }

    /// Whether the artifact copy-cache is enabled.
    pub fn artifact_cache_enabled(&self) -> bool {
        self.artifact_sources
            .as_ref()
            .map(|s| s.cache.mode == ArtifactCacheMode::Copy)
            .unwrap_or(false)
    }
}

/// `I` followed by another uppercase letter, per the usual Solidity
/// interface naming convention.
pub fn follows_interface_convention(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(
        (chars.next(), chars.next()),
        (Some('I'), Some(second)) if second.is_ascii_uppercase()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal_config(contracts: Option<ContractsSection>, interfaces: Vec<&str>) -> ContractsConfig {
        ContractsConfig {
            contracts,
            interfaces: interfaces.into_iter().map(String::from).collect(),
            generation: GenerationConfig {
                targets: vec![],
                ignore_functions: IgnoreRules::default(),
                interface_relationships: BTreeMap::new(),
                types: TypesConfig::default(),
                artifact_paths: ArtifactPaths::default(),
            },
            artifact_sources: None,
            networks: BTreeMap::new(),
            signatures: SignaturesConfig::default(),
        }
    }

    #[test]
    fn interface_detection_by_convention() {
        let config = minimal_config(
            Some(ContractsSection::Names(vec!["Token".into(), "IToken".into()])),
            vec![],
        );
        assert!(!config.is_interface("Token"));
        assert!(config.is_interface("IToken"));
        // Lowercase second letter is not the convention
        assert!(!config.is_interface("Inbox"));

        assert!(follows_interface_convention("IToken"));
        assert!(!follows_interface_convention("Inbox"));
        assert!(!follows_interface_convention("I"));
    }

    #[test]
    fn interface_detection_explicit_overrides() {
        let mut map = BTreeMap::new();
        map.insert(
            "Vault".to_string(),
            ContractDefinition {
                kind: Some(ContractKind::Interface),
                ..Default::default()
            },
        );
        let config = minimal_config(Some(ContractsSection::Detailed(map)), vec!["Helper"]);
        assert!(config.is_interface("Vault"));
        assert!(config.is_interface("Helper"));
    }

    #[test]
    fn contract_names_deduplicated() {
        let config = minimal_config(
            Some(ContractsSection::Names(vec!["Token".into(), "Vault".into()])),
            vec!["IToken", "Token"],
        );
        assert_eq!(config.all_contract_names(), vec!["Token", "Vault", "IToken"]);
    }

    #[test]
    fn implements_takes_priority_over_relationships() {
        let mut map = BTreeMap::new();
        map.insert(
            "Token".to_string(),
            ContractDefinition {
                implements: vec!["IToken".into()],
                ..Default::default()
            },
        );
        let mut config = minimal_config(Some(ContractsSection::Detailed(map)), vec![]);
        config
            .generation
            .interface_relationships
            .insert("Token".into(), vec!["IOther".into()]);
        assert_eq!(config.contract_interfaces("Token"), vec!["IToken"]);
    }

    #[test]
    fn network_contract_forms() {
        let bare = NetworkContract::Address("0xabc".into());
        assert_eq!(bare.address(), "0xabc");
        assert_eq!(bare.class_name("token"), "token");

        let aliased = NetworkContract::Aliased {
            name: Some("Token".into()),
            address: "0xdef".into(),
        };
        assert_eq!(aliased.address(), "0xdef");
        assert_eq!(aliased.class_name("token"), "Token");
    }
}
