//! TypeScript SDK generator (viem-first).
//!
//! Emits an npm package source tree: one directory per contract under
//! `src/contracts/` and `src/interfaces/`, shared struct types, network
//! config tables, a root barrel, a comprehensive `all.ts` index and a
//! `package.json` with per-contract subpath exports.

mod contract;

use std::path::PathBuf;

use serde_json::{json, Map, Value};
use tracing::{debug, info};

use crate::config::TargetOptions;
use crate::generators::naming::{abi_const_name, typescript_type};
use crate::generators::selectors::{canonical_signature, function_selector};
use crate::generators::{Emitter, Generator, GeneratorContext, GeneratorError};
use crate::model::ContractGraph;

const ZERO_ADDRESS: &str = "0x0000000000000000000000000000000000000000";

pub struct TypeScriptGenerator {
    emitter: Emitter,
    options: TargetOptions,
}

impl TypeScriptGenerator {
    pub fn new(out_dir: PathBuf, options: TargetOptions) -> Self {
        Self {
            emitter: Emitter::new(out_dir),
            options,
        }
    }
}

impl Generator for TypeScriptGenerator {
    fn name(&self) -> &'static str {
        "TypeScript (viem)"
    }

    fn validate_options(&self, options: &TargetOptions) -> Result<(), GeneratorError> {
        if options.emit_async.is_some() || options.strict_types.is_some() {
            return Err(GeneratorError::InvalidOptions(
                "emitAsync and strictTypes apply to Python targets only".into(),
            ));
        }
        Ok(())
    }

    fn generate(
        &self,
        graph: &ContractGraph,
        context: &GeneratorContext,
    ) -> Result<(), GeneratorError> {
        let mut files = 0usize;

        // Shared types go first so per-contract modules can assume them
        self.emitter
            .write("src/types/index.ts", &self.types_module(graph))?;

        for model in graph.implementations() {
            let source = contract::contract_module(model)?;
            self.emitter
                .write(&format!("src/contracts/{}/index.ts", model.name), &source)?;
            files += 1;
        }
        for model in graph.interfaces() {
            let source = contract::interface_module(model)?;
            self.emitter
                .write(&format!("src/interfaces/{}/index.ts", model.name), &source)?;
            files += 1;
        }

        self.emitter
            .write("src/config.ts", &self.config_module(context)?)?;
        self.emitter
            .write("src/errors.ts", &self.errors_module(graph))?;
        self.emitter.write("src/utils.ts", &self.utils_module())?;

        let sdk_enabled = self.options.sdk.as_ref().map_or(false, |s| s.enabled);
        if sdk_enabled {
            self.emitter
                .write("src/sdk.ts", &self.sdk_module(graph, context))?;
            files += 1;
        }

        self.emitter
            .write("src/index.ts", &self.root_index(graph, sdk_enabled))?;
        self.emitter
            .write("src/all.ts", &self.comprehensive_index(graph, sdk_enabled))?;
        self.emitter
            .write("package.json", &self.package_json(graph)?)?;
        files += 7;

        if self.options.emit_hooks.unwrap_or(false) {
            // Hook emission is not implemented; the option is accepted
            // so configs stay portable across generator versions.
            debug!("emitHooks requested, skipping");
        }

        info!(
            files,
            out_dir = %self.emitter.out_dir().display(),
            "generated TypeScript SDK"
        );
        Ok(())
    }
}

impl TypeScriptGenerator {
    fn types_module(&self, graph: &ContractGraph) -> String {
        let structs = graph.all_structs();
        let mut out = String::from("// Shared struct types\n");
        if structs.is_empty() {
            out.push_str("\nexport {};\n");
            return out;
        }
        for st in &structs {
            out.push_str(&format!("\nexport interface {} {{\n", st.name));
            for field in &st.fields {
                out.push_str(&format!("  {}: {};\n", field.name, typescript_type(field)));
            }
            out.push_str("}\n");
        }
        out
    }

    /// `NETWORKS`, `CHAIN_IDS` and `RPC_URLS` as const tables.
    fn config_module(&self, context: &GeneratorContext) -> Result<String, GeneratorError> {
        let mut networks = Map::new();
        let mut chain_ids = Map::new();
        let mut rpc_urls = Map::new();

        for (key, network) in &context.networks {
            let mut contracts = Map::new();
            for (alias, (class_name, address)) in &network.contracts {
                contracts.insert(
                    alias.clone(),
                    json!({"name": class_name, "address": address}),
                );
            }
            let mut entry = Map::new();
            entry.insert("name".into(), json!(network.name));
            entry.insert("chainId".into(), json!(network.chain_id));
            entry.insert("rpc".into(), json!(network.rpc));
            if let Some(explorer) = &network.explorer {
                entry.insert("explorer".into(), json!(explorer));
            }
            entry.insert("contracts".into(), Value::Object(contracts));
            networks.insert(key.clone(), Value::Object(entry));

            chain_ids.insert(key.clone(), json!(network.chain_id));
            rpc_urls.insert(key.clone(), json!(network.rpc));
        }

        let mut out = String::from("// Network addresses and chain metadata\n\n");
        out.push_str(&format!(
            "export const NETWORKS = {} as const;\n\n",
            serde_json::to_string_pretty(&Value::Object(networks))?
        ));
        out.push_str(&format!(
            "export const CHAIN_IDS = {} as const;\n\n",
            serde_json::to_string_pretty(&Value::Object(chain_ids))?
        ));
        out.push_str(&format!(
            "export const RPC_URLS = {} as const;\n\n",
            serde_json::to_string_pretty(&Value::Object(rpc_urls))?
        ));
        out.push_str("export type NetworkName = keyof typeof NETWORKS;\n\n");
        out.push_str("export function getNetworkContracts(network: NetworkName) {\n");
        out.push_str("  return NETWORKS[network].contracts;\n");
        out.push_str("}\n");
        Ok(out)
    }

    fn root_index(&self, graph: &ContractGraph, sdk_enabled: bool) -> String {
        let mut out = String::from("// Auto-generated root barrel\n");
        out.push_str(
            "// Consumers should import from specific contracts: '<package>/<ContractName>'\n\n",
        );
        for model in graph.implementations() {
            out.push_str(&format!("export * from './contracts/{}';\n", model.name));
        }
        out.push('\n');
        for model in graph.interfaces() {
            out.push_str(&format!("export * from './interfaces/{}';\n", model.name));
        }
        out.push_str("\nexport * from './types';\n");
        out.push_str("export * from './config';\n");
        out.push_str("export * from './errors';\n");
        out.push_str("export * from './utils';\n");
        if sdk_enabled {
            out.push_str("export * from './sdk';\n");
        }
        out
    }

    /// `all.ts`: named exports plus convenience `CONTRACTS`,
    /// `INTERFACES` and `ABIS` objects with type helpers.
    fn comprehensive_index(&self, graph: &ContractGraph, sdk_enabled: bool) -> String {
        let mut out = String::from("// Comprehensive index - exports everything\n\n");

        out.push_str("// ===== CONTRACT CLASSES =====\n");
        for model in graph.implementations() {
            out.push_str(&format!(
                "export {{ {} }} from './contracts/{}';\n",
                model.name, model.name
            ));
        }
        out.push_str("\n// ===== INTERFACE CLASSES =====\n");
        for model in graph.interfaces() {
            out.push_str(&format!(
                "export {{ {} }} from './interfaces/{}';\n",
                model.name, model.name
            ));
        }
        out.push_str("\n// ===== CONTRACT CONFIGS =====\n");
        for model in graph.implementations() {
            out.push_str(&format!(
                "export type {{ {}Config }} from './contracts/{}';\n",
                model.name, model.name
            ));
        }
        out.push_str("\n// ===== INTERFACE CONFIGS =====\n");
        for model in graph.interfaces() {
            out.push_str(&format!(
                "export type {{ {}Config }} from './interfaces/{}';\n",
                model.name, model.name
            ));
        }
        out.push_str("\n// ===== ABIs =====\n");
        for model in graph.contracts.values() {
            let folder = if model.is_interface {
                "interfaces"
            } else {
                "contracts"
            };
            out.push_str(&format!(
                "export {{ {} }} from './{}/{}';\n",
                abi_const_name(&model.name),
                folder,
                model.name
            ));
        }
        out.push_str("\n// ===== SHARED TYPES =====\n");
        out.push_str("export * from './types';\n");
        if sdk_enabled {
            out.push_str("\n// ===== SDK =====\n");
            out.push_str("export * from './sdk';\n");
        }

        out.push_str("\n// ===== CONVENIENCE EXPORTS =====\n");
        for model in graph.implementations() {
            out.push_str(&format!(
                "import {{ {} }} from './contracts/{}';\n",
                model.name, model.name
            ));
        }
        for model in graph.interfaces() {
            out.push_str(&format!(
                "import {{ {} }} from './interfaces/{}';\n",
                model.name, model.name
            ));
        }
        for model in graph.contracts.values() {
            let folder = if model.is_interface {
                "interfaces"
            } else {
                "contracts"
            };
            out.push_str(&format!(
                "import {{ {} }} from './{}/{}';\n",
                abi_const_name(&model.name),
                folder,
                model.name
            ));
        }

        out.push_str("\nexport const CONTRACTS = {\n");
        for model in graph.implementations() {
            out.push_str(&format!("  {},\n", model.name));
        }
        out.push_str("} as const;\n");

        out.push_str("\nexport const INTERFACES = {\n");
        for model in graph.interfaces() {
            out.push_str(&format!("  {},\n", model.name));
        }
        out.push_str("} as const;\n");

        out.push_str("\nexport const ABIS = {\n");
        for model in graph.contracts.values() {
            out.push_str(&format!("  {},\n", abi_const_name(&model.name)));
        }
        out.push_str("} as const;\n");

        out.push_str("\nexport type ContractName = keyof typeof CONTRACTS;\n");
        out.push_str("export type InterfaceName = keyof typeof INTERFACES;\n");
        out.push_str("export type ContractClass = typeof CONTRACTS[ContractName];\n");
        out.push_str("export type InterfaceClass = typeof INTERFACES[InterfaceName];\n");
        out
    }

    /// Custom error registry across every contract, keyed by 4-byte
    /// selector.
    fn errors_module(&self, graph: &ContractGraph) -> String {
        let mut out = String::from("// Custom error registry\n\n");
        out.push_str("export interface ErrorInfo {\n");
        out.push_str("  contract: string;\n");
        out.push_str("  name: string;\n");
        out.push_str("  signature: string;\n");
        out.push_str("}\n\n");
        out.push_str("export const ERROR_REGISTRY: Record<string, ErrorInfo> = {\n");
        let mut seen = std::collections::BTreeSet::new();
        for model in graph.implementations() {
            for error in &model.errors {
                let selector = function_selector(&error.name, &error.inputs);
                if !seen.insert(selector.clone()) {
                    continue;
                }
                out.push_str(&format!(
                    "  '{selector}': {{ contract: '{}', name: '{}', signature: '{}' }},\n",
                    model.name,
                    error.name,
                    canonical_signature(&error.name, &error.inputs)
                ));
            }
        }
        out.push_str("};\n\n");
        out.push_str("export function lookupError(selector: string): ErrorInfo | undefined {\n");
        out.push_str("  return ERROR_REGISTRY[selector.toLowerCase()];\n");
        out.push_str("}\n");
        out
    }

    /// Address helpers shared by consumers and the SDK wrapper.
    fn utils_module(&self) -> String {
        let mut out = String::from("// Address utilities\n\n");
        out.push_str("import type { Address } from 'viem';\n\n");
        out.push_str(&format!(
            "export const ZERO_ADDRESS: Address = '{ZERO_ADDRESS}';\n\n"
        ));
        out.push_str("export function isZeroAddress(address: string): boolean {\n");
        out.push_str("  return address.toLowerCase() === ZERO_ADDRESS;\n");
        out.push_str("}\n\n");
        out.push_str("export function shortenAddress(address: string, chars = 4): string {\n");
        out.push_str(
            "  return `${address.slice(0, chars + 2)}...${address.slice(-chars)}`;\n",
        );
        out.push_str("}\n");
        out
    }

    /// One class wrapping every deployed contract on a chosen network.
    fn sdk_module(&self, graph: &ContractGraph, context: &GeneratorContext) -> String {
        let sdk = self.options.sdk.clone().unwrap_or_default();
        let class_name = sdk.class_name().to_string();

        let mut registry: std::collections::BTreeMap<String, String> =
            std::collections::BTreeMap::new();
        for network in context.networks.values() {
            for (alias, (contract_class, _address)) in &network.contracts {
                if graph
                    .contracts
                    .get(contract_class)
                    .map_or(false, |c| !c.is_interface)
                {
                    registry
                        .entry(alias.clone())
                        .or_insert_with(|| contract_class.clone());
                }
            }
        }

        let mut out = String::from("// Unified SDK entry point\n\n");
        out.push_str("import type { Address, PublicClient, WalletClient } from 'viem';\n");
        out.push_str("import { NETWORKS, NetworkName } from './config';\n");
        if sdk.skip_zero_addresses() {
            out.push_str("import { ZERO_ADDRESS } from './utils';\n");
        }
        for contract_class in registry.values().collect::<std::collections::BTreeSet<_>>() {
            out.push_str(&format!(
                "import {{ {} }} from './contracts/{}';\n",
                contract_class, contract_class
            ));
        }
        out.push('\n');

        out.push_str(&format!("export class {class_name} {{\n"));
        out.push_str("  readonly network: NetworkName;\n");
        out.push_str("  private readonly publicClient: PublicClient;\n");
        out.push_str("  private readonly walletClient?: WalletClient;\n");
        out.push_str("  private readonly instances = new Map<string, unknown>();\n\n");
        out.push_str(
            "  constructor(network: NetworkName, publicClient: PublicClient, walletClient?: WalletClient) {\n",
        );
        out.push_str("    this.network = network;\n");
        out.push_str("    this.publicClient = publicClient;\n");
        out.push_str("    this.walletClient = walletClient;\n");
        out.push_str("  }\n\n");
        out.push_str("  private addressOf(alias: string): Address {\n");
        out.push_str(
            "    const entry = (NETWORKS[this.network].contracts as Record<string, { address: string }>)[alias];\n",
        );
        out.push_str("    if (!entry) {\n");
        out.push_str(
            "      throw new Error(`${alias} is not deployed on ${this.network}`);\n",
        );
        out.push_str("    }\n");
        if sdk.skip_zero_addresses() {
            out.push_str("    if (entry.address === ZERO_ADDRESS) {\n");
            out.push_str(
                "      throw new Error(`${alias} has a zero address on ${this.network}`);\n",
            );
            out.push_str("    }\n");
        }
        out.push_str("    return entry.address as Address;\n");
        out.push_str("  }\n");

        for (alias, contract_class) in &registry {
            let accessor = to_camel_case(alias);
            out.push('\n');
            out.push_str(&format!("  get {accessor}(): {contract_class} {{\n"));
            out.push_str(&format!(
                "    if (!this.instances.has('{alias}')) {{\n"
            ));
            out.push_str(&format!(
                "      this.instances.set('{alias}', new {contract_class}({{\n"
            ));
            out.push_str(&format!("        address: this.addressOf('{alias}'),\n"));
            out.push_str("        publicClient: this.publicClient,\n");
            out.push_str("        walletClient: this.walletClient,\n");
            out.push_str("      }));\n");
            out.push_str("    }\n");
            out.push_str(&format!(
                "    return this.instances.get('{alias}') as {contract_class};\n"
            ));
            out.push_str("  }\n");
        }
        out.push_str("}\n");
        out
    }

    /// `package.json` with a subpath export per contract.
    fn package_json(&self, graph: &ContractGraph) -> Result<String, GeneratorError> {
        let mut exports = Map::new();
        exports.insert(".".into(), json!("./dist/index.js"));
        exports.insert("./types".into(), json!("./dist/types/index.js"));
        exports.insert("./all".into(), json!("./dist/all.js"));
        for model in graph.contracts.values() {
            let folder = if model.is_interface {
                "interfaces"
            } else {
                "contracts"
            };
            exports.insert(
                format!("./{}", model.name),
                json!(format!("./dist/{}/{}/index.js", folder, model.name)),
            );
        }

        let package = json!({
            "name": self.options.package_name.as_deref().unwrap_or("contract-sdk"),
            "version": self.options.package_version.as_deref().unwrap_or("1.0.0"),
            "main": "dist/index.js",
            "types": "dist/index.d.ts",
            "exports": Value::Object(exports),
            "scripts": {
                "build": "tsc",
                "test": "vitest",
            },
            "dependencies": {
                "viem": "^2.21.0",
            },
            "devDependencies": {
                "typescript": "^5.0.0",
                "vitest": "^1.0.0",
            },
        });
        Ok(serde_json::to_string_pretty(&package)?)
    }
}

fn to_camel_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut upper_next = false;
    for (i, c) in name.chars().enumerate() {
        if c == '_' || c == '-' {
            upper_next = true;
        } else if upper_next {
            out.push(c.to_ascii_uppercase());
            upper_next = false;
        } else if i == 0 {
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SdkOptions;
    use crate::model::{ContractModel, NetworkModel};
    use std::collections::BTreeMap;
    use std::fs;

    fn model(name: &str, is_interface: bool) -> ContractModel {
        ContractModel {
            name: name.into(),
            abi: vec![],
            bytecode: None,
            functions: vec![],
            events: vec![],
            errors: vec![],
            structs: vec![],
            enums: vec![],
            constructor: None,
            natspec: None,
            is_interface,
            implementation_of: vec![],
        }
    }

    fn sample_graph() -> ContractGraph {
        let mut contracts = BTreeMap::new();
        let mut token = model("Token", false);
        token.errors.push(crate::model::ErrorModel {
            name: "InsufficientBalance".into(),
            inputs: vec![crate::model::Parameter {
                name: "needed".into(),
                ty: "uint256".into(),
                internal_type: None,
                components: vec![],
                indexed: None,
            }],
        });
        contracts.insert("Token".into(), token);
        contracts.insert("IToken".into(), model("IToken", true));
        ContractGraph {
            contracts,
            networks: BTreeMap::new(),
            relationships: BTreeMap::new(),
        }
    }

    fn sample_context() -> GeneratorContext {
        let mut contracts = BTreeMap::new();
        contracts.insert(
            "token_vault".into(),
            ("Token".into(), "0x2222222222222222222222222222222222222222".into()),
        );
        let mut networks = BTreeMap::new();
        networks.insert(
            "mainnet".into(),
            NetworkModel {
                name: "Mainnet".into(),
                chain_id: 1,
                rpc: "https://eth.example".into(),
                explorer: Some("https://etherscan.io".into()),
                contracts,
            },
        );
        GeneratorContext {
            networks,
            ..Default::default()
        }
    }

    #[test]
    fn emits_package_layout() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let generator =
            TypeScriptGenerator::new(tmp.path().to_path_buf(), TargetOptions::default());
        generator
            .generate(&sample_graph(), &sample_context())
            .expect("generate");

        let index = fs::read_to_string(tmp.path().join("src/index.ts")).expect("index");
        assert!(index.contains("export * from './contracts/Token';"));
        assert!(index.contains("export * from './interfaces/IToken';"));
        assert!(index.contains("export * from './types';"));
        assert!(index.contains("export * from './errors';"));
        assert!(index.contains("export * from './utils';"));
        assert!(!index.contains("./sdk"));

        let errors = fs::read_to_string(tmp.path().join("src/errors.ts")).expect("errors");
        assert!(errors.contains("export const ERROR_REGISTRY: Record<string, ErrorInfo> = {"));
        assert!(errors.contains(
            "contract: 'Token', name: 'InsufficientBalance', signature: 'InsufficientBalance(uint256)'"
        ));
        assert!(errors.contains("export function lookupError(selector: string)"));

        let utils = fs::read_to_string(tmp.path().join("src/utils.ts")).expect("utils");
        assert!(utils.contains("export const ZERO_ADDRESS: Address ="));
        assert!(utils.contains("export function isZeroAddress"));
        assert!(utils.contains("export function shortenAddress"));

        let all = fs::read_to_string(tmp.path().join("src/all.ts")).expect("all");
        assert!(all.contains("export { Token } from './contracts/Token';"));
        assert!(all.contains("export { ITOKEN_ABI } from './interfaces/IToken';"));
        assert!(all.contains("export const CONTRACTS = {"));
        assert!(all.contains("export type ContractName = keyof typeof CONTRACTS;"));

        let package: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(tmp.path().join("package.json")).expect("pkg"))
                .expect("json");
        assert_eq!(
            package["exports"]["./Token"],
            "./dist/contracts/Token/index.js"
        );
        assert_eq!(
            package["exports"]["./IToken"],
            "./dist/interfaces/IToken/index.js"
        );
        assert_eq!(package["dependencies"]["viem"], "^2.21.0");

        let config = fs::read_to_string(tmp.path().join("src/config.ts")).expect("config");
        assert!(config.contains("export const NETWORKS = {"));
        assert!(config.contains("\"chainId\": 1"));
        assert!(config.contains("https://etherscan.io"));
    }

    #[test]
    fn sdk_module_emitted_when_enabled() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let options = TargetOptions {
            sdk: Some(SdkOptions {
                enabled: true,
                class_name: Some("ProtocolSDK".into()),
                ..Default::default()
            }),
            ..Default::default()
        };
        let generator = TypeScriptGenerator::new(tmp.path().to_path_buf(), options);
        generator
            .generate(&sample_graph(), &sample_context())
            .expect("generate");

        let sdk = fs::read_to_string(tmp.path().join("src/sdk.ts")).expect("sdk");
        assert!(sdk.contains("export class ProtocolSDK {"));
        // Snake alias becomes a camelCase accessor
        assert!(sdk.contains("get tokenVault(): Token {"));
        assert!(sdk.contains("import { ZERO_ADDRESS } from './utils';"));

        let index = fs::read_to_string(tmp.path().join("src/index.ts")).expect("index");
        assert!(index.contains("export * from './sdk';"));
    }

    #[test]
    fn python_only_options_rejected() {
        let generator =
            TypeScriptGenerator::new(PathBuf::from("/tmp/sdk"), TargetOptions::default());
        let options = TargetOptions {
            emit_async: Some(true),
            ..Default::default()
        };
        assert!(generator.validate_options(&options).is_err());
    }
}
