//! Contract graph construction from config plus artifacts.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::artifacts::{normalize_contract, ArtifactLoader, ContractArtifact};
use crate::config::{ContractsConfig, IgnoreRules};
use crate::model::{ContractGraph, NetworkModel};

/// Builds a [`ContractGraph`] from configuration.
#[derive(Debug, Default)]
pub struct ModelBuilder;

impl ModelBuilder {
    pub fn new() -> Self {
        Self
    }

    /// Load and normalize every configured contract. Artifact paths are
    /// resolved relative to `config_dir` (the directory holding
    /// `contracts.yaml`).
    ///
    /// Missing artifacts are not fatal: interfaces fall back to an
    /// empty-ABI stub, implementations are skipped with a warning.
    pub fn build_graph(&self, config: &ContractsConfig, config_dir: &Path) -> ContractGraph {
        let foundry_out = resolve_dir(config_dir, &config.foundry_out());
        let hardhat_out = config
            .hardhat_out()
            .map(|dir| resolve_dir(config_dir, &dir));
        let loader = ArtifactLoader::with_config(foundry_out, hardhat_out, config);

        let mut contracts = BTreeMap::new();
        let contract_names = config.all_contract_names();

        for name in &contract_names {
            let is_interface = config.is_interface(name);
            match loader.load_artifact(name) {
                Ok(artifact) => {
                    contracts.insert(name.clone(), normalize_contract(&artifact, is_interface));
                }
                Err(err) if is_interface => {
                    // Interfaces often have no compiled artifact
                    warn!(contract = %name, %err, "using stub artifact for interface");
                    let stub = ContractArtifact::stub(name);
                    contracts.insert(name.clone(), normalize_contract(&stub, true));
                }
                Err(err) => {
                    warn!(contract = %name, %err, "skipping contract");
                }
            }
        }

        let mut relationships = BTreeMap::new();
        for name in &contract_names {
            let interfaces = config.contract_interfaces(name);
            if interfaces.is_empty() {
                continue;
            }
            relationships.insert(name.clone(), interfaces.clone());
            if let Some(model) = contracts.get_mut(name) {
                for interface_name in &interfaces {
                    if !model.implementation_of.contains(interface_name) {
                        model.implementation_of.push(interface_name.clone());
                    }
                }
            }
        }

        let networks = config
            .networks
            .iter()
            .map(|(network_name, network)| {
                let contracts = network
                    .contracts
                    .iter()
                    .map(|(alias, entry)| {
                        (
                            alias.clone(),
                            (
                                entry.class_name(alias).to_string(),
                                entry.address().to_string(),
                            ),
                        )
                    })
                    .collect();
                (
                    network_name.clone(),
                    NetworkModel {
                        name: network.name.clone(),
                        chain_id: network.chain_id,
                        rpc: network.rpc.clone(),
                        explorer: network.explorer.clone(),
                        contracts,
                    },
                )
            })
            .collect();

        debug!(contracts = contracts.len(), "built contract graph");
        ContractGraph {
            contracts,
            networks,
            relationships,
        }
    }

    /// Drop functions matched by global or per-contract ignore lists.
    pub fn apply_ignore_rules(&self, graph: &mut ContractGraph, rules: &IgnoreRules) {
        if rules.global.is_empty() && rules.contracts.is_empty() {
            return;
        }
        for (name, contract) in &mut graph.contracts {
            let per_contract = rules.contracts.get(name);
            contract.functions.retain(|func| {
                !rules.global.contains(&func.name)
                    && per_contract.map_or(true, |list| !list.contains(&func.name))
            });
        }
    }
}

fn resolve_dir(base: &Path, dir: &Path) -> PathBuf {
    if dir.is_absolute() {
        dir.to_path_buf()
    } else {
        base.join(dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::loader::load_config;
    use std::fs;
    use std::io::Write;

    const TOKEN_ABI: &str = r#"[
        {"type": "function", "name": "transfer", "stateMutability": "nonpayable",
         "inputs": [{"name": "to", "type": "address"}, {"name": "amount", "type": "uint256"}],
         "outputs": [{"name": "", "type": "bool"}]},
        {"type": "function", "name": "balanceOf", "stateMutability": "view",
         "inputs": [{"name": "owner", "type": "address"}],
         "outputs": [{"name": "", "type": "uint256"}]},
        {"type": "function", "name": "DOMAIN_SEPARATOR", "stateMutability": "view",
         "inputs": [], "outputs": [{"name": "", "type": "bytes32"}]}
    ]"#;

    fn setup_project(tmp: &Path) -> PathBuf {
        let out = tmp.join("out");
        let token_dir = out.join("Token.sol");
        fs::create_dir_all(&token_dir).expect("mkdir");
        fs::write(
            token_dir.join("Token.json"),
            format!(r#"{{"abi": {TOKEN_ABI}}}"#),
        )
        .expect("write artifact");

        let yaml = r#"
contracts:
  Token:
    implements: [IToken]
interfaces:
  - IToken
generation:
  targets:
    - language: python
      outDir: ./sdk/py
  ignoreFunctions:
    global: [DOMAIN_SEPARATOR]
"#;
        let config_path = tmp.join("contracts.yaml");
        let mut file = fs::File::create(&config_path).expect("create config");
        file.write_all(yaml.as_bytes()).expect("write config");
        config_path
    }

    #[test]
    fn builds_graph_with_interface_stub() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let config_path = setup_project(tmp.path());
        let config = load_config(&config_path).expect("load config");

        let graph = ModelBuilder::new().build_graph(&config, tmp.path());
        assert_eq!(graph.contracts.len(), 2);

        let token = graph.contracts.get("Token").expect("token");
        assert!(!token.is_interface);
        assert_eq!(token.implementation_of, vec!["IToken"]);
        assert_eq!(token.functions.len(), 3);

        // IToken has no artifact: stubbed with empty ABI
        let interface = graph.contracts.get("IToken").expect("interface");
        assert!(interface.is_interface);
        assert!(interface.functions.is_empty());

        assert_eq!(
            graph.relationships.get("Token"),
            Some(&vec!["IToken".to_string()])
        );
    }

    #[test]
    fn ignore_rules_filter_functions() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let config_path = setup_project(tmp.path());
        let config = load_config(&config_path).expect("load config");

        let builder = ModelBuilder::new();
        let mut graph = builder.build_graph(&config, tmp.path());
        builder.apply_ignore_rules(&mut graph, &config.generation.ignore_functions);

        let token = graph.contracts.get("Token").expect("token");
        let names: Vec<_> = token.functions.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["transfer", "balanceOf"]);
    }

    #[test]
    fn missing_implementation_is_skipped() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let yaml = "contracts: [Ghost]\ngeneration:\n  targets:\n    - language: ts\n      outDir: ./sdk\n";
        let config_path = tmp.path().join("contracts.yaml");
        fs::write(&config_path, yaml).expect("write config");
        let config = load_config(&config_path).expect("load config");

        let graph = ModelBuilder::new().build_graph(&config, tmp.path());
        assert!(graph.contracts.is_empty());
    }
}
