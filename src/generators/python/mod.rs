//! Python SDK generator.
//!
//! Emits a web3.py package: one binding module per contract, ABC
//! interfaces, Pydantic struct types, network address tables and an
//! optional unified SDK entry point.

mod contract;
mod metadata;

use std::path::PathBuf;

use serde_json::{json, Map, Value};
use tracing::info;

use crate::config::TargetOptions;
use crate::generators::naming::{python_safe_name, python_type, to_snake_case};
use crate::generators::{Emitter, Generator, GeneratorContext, GeneratorError};
use crate::model::ContractGraph;

const ZERO_ADDRESS: &str = "0x0000000000000000000000000000000000000000";

pub struct PythonGenerator {
    emitter: Emitter,
    options: TargetOptions,
}

impl PythonGenerator {
    pub fn new(out_dir: PathBuf, options: TargetOptions) -> Self {
        Self {
            emitter: Emitter::new(out_dir),
            options,
        }
    }
}

impl Generator for PythonGenerator {
    fn name(&self) -> &'static str {
        "Python (web3.py)"
    }

    fn validate_options(&self, options: &TargetOptions) -> Result<(), GeneratorError> {
        if options.transport.is_some() {
            return Err(GeneratorError::InvalidOptions(
                "transport applies to TypeScript targets only".into(),
            ));
        }
        if options.bigint_style.is_some() {
            return Err(GeneratorError::InvalidOptions(
                "bigintStyle applies to TypeScript targets only".into(),
            ));
        }
        Ok(())
    }

    fn generate(
        &self,
        graph: &ContractGraph,
        context: &GeneratorContext,
    ) -> Result<(), GeneratorError> {
        let emit_async = self.options.emit_async.unwrap_or(false);
        let mut files = 0usize;

        for model in graph.implementations() {
            let module = to_snake_case(&model.name);
            let source = contract::contract_module(model, emit_async)?;
            self.emitter
                .write(&format!("contracts/{module}.py"), &source)?;
            self.emitter.write(
                &format!("events/{module}.py"),
                &metadata::events_module(model),
            )?;
            self.emitter.write(
                &format!("selectors/{module}.py"),
                &metadata::selectors_module(model),
            )?;
            self.emitter.write(
                &format!("errors/{module}.py"),
                &metadata::errors_module(model),
            )?;
            files += 4;
        }

        for model in graph.interfaces() {
            let module = to_snake_case(&model.name);
            let source = contract::interface_module(model);
            self.emitter
                .write(&format!("interfaces/{module}.py"), &source)?;
            files += 1;
        }

        self.emitter
            .write("contracts/__init__.py", &self.contracts_init(graph))?;
        self.emitter
            .write("interfaces/__init__.py", &self.interfaces_init(graph))?;
        self.emitter
            .write("types/__init__.py", &self.types_module(graph))?;
        self.emitter.write(
            "events/__init__.py",
            &metadata::tables_init(graph, "EVENTS", "Event metadata"),
        )?;
        self.emitter.write(
            "selectors/__init__.py",
            &metadata::tables_init(graph, "SELECTORS", "Function selectors"),
        )?;
        self.emitter
            .write("errors/__init__.py", &metadata::errors_init(graph))?;
        self.emitter
            .write("config/__init__.py", &self.config_init())?;
        self.emitter
            .write("config/addresses.py", &self.addresses_module(context)?)?;
        files += 8;

        let sdk_enabled = self.options.sdk.as_ref().map_or(false, |s| s.enabled);
        if sdk_enabled {
            let sdk = self.options.sdk.as_ref().map(Clone::clone).unwrap_or_default();
            let file = format!("{}.py", sdk.file_name());
            self.emitter.write(&file, &self.sdk_module(graph, context)?)?;
            files += 1;
        }

        self.emitter.write("__init__.py", &self.root_init(graph))?;
        self.emitter
            .write("pyproject.toml", &self.pyproject())?;
        files += 2;

        info!(
            files,
            out_dir = %self.emitter.out_dir().display(),
            "generated Python SDK"
        );
        Ok(())
    }
}

impl PythonGenerator {
    /// Package root: re-export every contract and interface class plus
    /// the generated types and network config.
    fn root_init(&self, graph: &ContractGraph) -> String {
        let mut out = String::from("\"\"\"Contract SDK\"\"\"\n\n");

        out.push_str("# Contract classes\n");
        for model in graph.implementations() {
            out.push_str(&format!(
                "from .contracts.{} import {}\n",
                to_snake_case(&model.name),
                model.name
            ));
        }

        out.push_str("\n# Interface classes\n");
        for model in graph.interfaces() {
            out.push_str(&format!(
                "from .interfaces.{} import {}\n",
                to_snake_case(&model.name),
                model.name
            ));
        }

        out.push_str("\nfrom .types import *\n");
        out.push_str("from .config import *\n");
        out.push_str("from .errors import ERROR_REGISTRY, lookup_error\n");

        if let Some(sdk) = self.options.sdk.as_ref().filter(|s| s.enabled) {
            out.push_str(&format!(
                "from .{} import {}\n",
                sdk.file_name(),
                sdk.class_name()
            ));
        }
        out
    }

    fn contracts_init(&self, graph: &ContractGraph) -> String {
        let mut out = String::from("\"\"\"Contract implementations\"\"\"\n");
        let mut names = Vec::new();
        for model in graph.implementations() {
            out.push_str(&format!(
                "from .{} import {}\n",
                to_snake_case(&model.name),
                model.name
            ));
            names.push(model.name.clone());
        }
        out.push_str(&all_list(&names));
        out
    }

    fn interfaces_init(&self, graph: &ContractGraph) -> String {
        let mut out = String::from("\"\"\"Contract interfaces\"\"\"\n");
        let mut names = Vec::new();
        for model in graph.interfaces() {
            out.push_str(&format!(
                "from .{} import {}\n",
                to_snake_case(&model.name),
                model.name
            ));
            names.push(model.name.clone());
        }
        out.push_str(&all_list(&names));
        out
    }

    /// Pydantic models for every struct appearing in any ABI.
    fn types_module(&self, graph: &ContractGraph) -> String {
        let structs = graph.all_structs();
        let strict = self.options.strict_types.unwrap_or(false);

        let mut out = String::from("\"\"\"Generated struct types\"\"\"\n");
        out.push_str("from typing import Any\n\n");
        if strict {
            out.push_str("from pydantic import BaseModel, ConfigDict\n");
        } else {
            out.push_str("from pydantic import BaseModel\n");
        }

        let mut names = Vec::new();
        for st in &structs {
            out.push_str(&format!("\n\nclass {}(BaseModel):\n", st.name));
            if strict {
                out.push_str("    model_config = ConfigDict(strict=True)\n");
            }
            if st.fields.is_empty() && !strict {
                out.push_str("    pass\n");
            }
            for field in &st.fields {
                let name = python_safe_name(&to_snake_case(&field.name));
                out.push_str(&format!("    {}: {}\n", name, python_type(field)));
            }
            names.push(st.name.clone());
        }
        out.push('\n');
        out.push_str(&all_list(&names));
        out
    }

    fn config_init(&self) -> String {
        "\"\"\"Network configuration\"\"\"\nfrom .addresses import *\n".to_string()
    }

    /// `NETWORKS`, `CHAIN_IDS` and `RPC_URLS` tables. Rendered as JSON
    /// literals, which are valid Python here (no booleans or nulls).
    fn addresses_module(&self, context: &GeneratorContext) -> Result<String, GeneratorError> {
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

        let mut out = String::from("\"\"\"Network addresses and chain metadata\"\"\"\n\n");
        out.push_str(&format!(
            "NETWORKS = {}\n\n",
            serde_json::to_string_pretty(&Value::Object(networks))?
        ));
        out.push_str(&format!(
            "CHAIN_IDS = {}\n\n",
            serde_json::to_string_pretty(&Value::Object(chain_ids))?
        ));
        out.push_str(&format!(
            "RPC_URLS = {}\n\n",
            serde_json::to_string_pretty(&Value::Object(rpc_urls))?
        ));
        out.push_str("\ndef get_network_contracts(network: str) -> dict:\n");
        out.push_str("    \"\"\"Contract entries deployed on a network\"\"\"\n");
        out.push_str("    return NETWORKS.get(network, {}).get(\"contracts\", {})\n");
        Ok(out)
    }

    /// One class wrapping every deployed contract on a chosen network,
    /// with per-alias accessors.
    fn sdk_module(
        &self,
        graph: &ContractGraph,
        context: &GeneratorContext,
    ) -> Result<String, GeneratorError> {
        let sdk = self.options.sdk.clone().unwrap_or_default();
        let class_name = sdk.class_name().to_string();

        // alias -> contract class, across all networks. An alias kept
        // only when its class was actually generated.
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

        let mut out = String::from("\"\"\"Unified SDK entry point\"\"\"\n");
        out.push_str("from web3 import Web3\n\n");
        out.push_str("from .config.addresses import NETWORKS\n");
        for contract_class in registry.values().collect::<std::collections::BTreeSet<_>>() {
            out.push_str(&format!(
                "from .contracts.{} import {}\n",
                to_snake_case(contract_class),
                contract_class
            ));
        }
        out.push_str(&format!("\nZERO_ADDRESS = \"{ZERO_ADDRESS}\"\n\n\n"));

        out.push_str(&format!("class {class_name}:\n"));
        out.push_str("    \"\"\"Access every deployed contract on one network\"\"\"\n\n");
        out.push_str("    _registry = {\n");
        for (alias, contract_class) in &registry {
            out.push_str(&format!("        \"{alias}\": {contract_class},\n"));
        }
        out.push_str("    }\n\n");

        out.push_str("    def __init__(self, web3: Web3, network: str):\n");
        out.push_str("        if network not in NETWORKS:\n");
        out.push_str("            raise ValueError(f\"unknown network: {network}\")\n");
        out.push_str("        self.web3 = web3\n");
        out.push_str("        self.network = network\n");
        out.push_str("        self._contracts = NETWORKS[network][\"contracts\"]\n");
        out.push_str("        self._instances = {}\n");
        if !sdk.lazy_load() {
            out.push_str("        for alias in self._registry:\n");
            out.push_str("            entry = self._contracts.get(alias)\n");
            out.push_str("            if entry is None or entry[\"address\"] == ZERO_ADDRESS:\n");
            out.push_str("                continue\n");
            out.push_str("            self._load(alias)\n");
        }

        out.push_str("\n    def _load(self, alias: str):\n");
        out.push_str("        if alias not in self._instances:\n");
        out.push_str("            entry = self._contracts.get(alias)\n");
        out.push_str("            if entry is None:\n");
        out.push_str(
            "                raise ValueError(f\"{alias} is not deployed on {self.network}\")\n",
        );
        if sdk.skip_zero_addresses() {
            out.push_str("            if entry[\"address\"] == ZERO_ADDRESS:\n");
            out.push_str(
                "                raise ValueError(f\"{alias} has a zero address on {self.network}\")\n",
            );
        }
        out.push_str(
            "            self._instances[alias] = self._registry[alias](self.web3, entry[\"address\"])\n",
        );
        out.push_str("        return self._instances[alias]\n");

        for (alias, contract_class) in &registry {
            let accessor = python_safe_name(&to_snake_case(alias));
            out.push('\n');
            out.push_str("    @property\n");
            out.push_str(&format!("    def {accessor}(self) -> {contract_class}:\n"));
            out.push_str(&format!("        return self._load(\"{alias}\")\n"));
        }

        Ok(out)
    }

    fn pyproject(&self) -> String {
        let name = self
            .options
            .package_name
            .as_deref()
            .unwrap_or("contract-sdk");
        let version = self.options.package_version.as_deref().unwrap_or("1.0.0");

        let mut out = String::from("[tool.poetry]\n");
        out.push_str(&format!("name = \"{name}\"\n"));
        out.push_str(&format!("version = \"{version}\"\n"));
        out.push_str("description = \"Auto-generated SDK for smart contracts\"\n");
        out.push_str("authors = []\n\n");
        out.push_str("[tool.poetry.dependencies]\n");
        out.push_str("python = \"^3.9\"\n");
        out.push_str("web3 = \"^6.0.0\"\n");
        out.push_str("pydantic = \"^2.0.0\"\n");
        if let Some(dep) = &self.options.runtime_dependency {
            out.push_str(&format!("{dep} = \"*\"\n"));
        }
        out.push('\n');
        out.push_str("[tool.poetry.dev-dependencies]\n");
        out.push_str("pytest = \"^7.0.0\"\n");
        out.push_str("black = \"^23.0.0\"\n");
        out.push_str("ruff = \"^0.1.0\"\n");
        out.push_str("mypy = \"^1.0.0\"\n\n");
        out.push_str("[build-system]\n");
        out.push_str("requires = [\"poetry-core\"]\n");
        out.push_str("build-backend = \"poetry.core.masonry.api\"\n");
        out
    }
}

fn all_list(names: &[String]) -> String {
    let quoted: Vec<String> = names.iter().map(|n| format!("'{n}'")).collect();
    format!("\n__all__ = [{}]\n", quoted.join(", "))
}
