//! Loading and validation of `contracts.yaml`.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

use super::ContractsConfig;

/// Errors raised while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file does not exist
    #[error("configuration file not found: {0}")]
    NotFound(PathBuf),

    /// Error reading the file
    #[error("error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid YAML or does not match the schema
    #[error("invalid YAML in {path}: {source}")]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// The decoded config violates a semantic constraint
    #[error("configuration validation failed: {0}")]
    Invalid(String),
}

/// Load, decode and validate a `contracts.yaml` file.
pub fn load_config(path: &Path) -> Result<ContractsConfig, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::NotFound(path.to_path_buf()));
    }

    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let config: ContractsConfig =
        serde_yaml::from_str(&contents).map_err(|source| ConfigError::Yaml {
            path: path.to_path_buf(),
            source,
        })?;

    validate(&config)?;
    debug!(targets = config.generation.targets.len(), "loaded configuration");
    Ok(config)
}

/// Semantic checks beyond what typed decoding enforces.
pub fn validate(config: &ContractsConfig) -> Result<(), ConfigError> {
    if config.generation.targets.is_empty() {
        return Err(ConfigError::Invalid(
            "generation.targets must contain at least one target".into(),
        ));
    }

    for (index, target) in config.generation.targets.iter().enumerate() {
        if target.out_dir.trim().is_empty() {
            return Err(ConfigError::Invalid(format!(
                "generation.targets[{index}].outDir must not be empty"
            )));
        }
    }

    for (network_name, network) in &config.networks {
        for (key, entry) in &network.contracts {
            let address = entry.address();
            if !is_hex_address(address) {
                return Err(ConfigError::Invalid(format!(
                    "networks.{network_name}.contracts.{key}: \
                     '{address}' is not a 0x-prefixed 20-byte hex address"
                )));
            }
        }
    }

    for (index, item) in config.signatures.items.iter().enumerate() {
        if item.contract.is_empty() || item.primary_type.is_empty() {
            return Err(ConfigError::Invalid(format!(
                "signatures.items[{index}]: contract and primaryType are required"
            )));
        }
    }

    Ok(())
}

fn is_hex_address(value: &str) -> bool {
    value.len() == 42
        && value.starts_with("0x")
        && value[2..].chars().all(|c| c.is_ascii_hexdigit())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const VALID_YAML: &str = r#"
contracts:
  Token:
    implements: [IToken]
  Vault: {}
interfaces:
  - IToken
generation:
  targets:
    - language: python
      outDir: ./sdk/py
      options:
        packageName: my_sdk
    - language: ts
      outDir: ./sdk/ts
  ignoreFunctions:
    global: [DOMAIN_SEPARATOR]
networks:
  anvil:
    chainId: 31337
    name: Anvil
    rpc: http://127.0.0.1:8545
    contracts:
      token:
        name: Token
        address: "0x5FbDB2315678afecb367f032d93F642f64180aa3"
"#;

    fn write_temp(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        file.write_all(contents.as_bytes()).expect("write yaml");
        file
    }

    #[test]
    fn loads_valid_config() {
        let file = write_temp(VALID_YAML);
        let config = load_config(file.path()).expect("config should load");
        assert_eq!(config.generation.targets.len(), 2);
        assert_eq!(config.all_contract_names(), vec!["Token", "Vault", "IToken"]);
        assert_eq!(config.contract_interfaces("Token"), vec!["IToken"]);
        let network = config.networks.get("anvil").expect("anvil network");
        assert_eq!(network.chain_id, 31337);
    }

    #[test]
    fn missing_file_is_reported() {
        let err = load_config(Path::new("/nonexistent/contracts.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(_)));
    }

    #[test]
    fn empty_targets_rejected() {
        let file = write_temp("generation:\n  targets: []\n");
        let err = load_config(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn bad_address_rejected() {
        let yaml = r#"
generation:
  targets:
    - language: ts
      outDir: ./sdk
networks:
  main:
    chainId: 1
    name: Mainnet
    rpc: https://example.invalid
    contracts:
      token: "not-an-address"
"#;
        let file = write_temp(yaml);
        let err = load_config(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn unknown_language_is_a_yaml_error() {
        let yaml = "generation:\n  targets:\n    - language: go\n      outDir: ./sdk\n";
        let file = write_temp(yaml);
        let err = load_config(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Yaml { .. }));
    }
}
