//! Python emission for per-contract event, selector and error metadata.

use std::collections::BTreeSet;

use crate::generators::naming::to_snake_case;
use crate::generators::selectors::{canonical_signature, event_topic, function_selector};
use crate::model::{ContractGraph, ContractModel};

/// Render `events/<snake>.py`: topic0 and signature per event.
pub fn events_module(model: &ContractModel) -> String {
    let mut out = String::new();
    out.push_str(&format!("\"\"\"Event metadata for {}\"\"\"\n\n", model.name));

    let mut seen = BTreeSet::new();
    let mut names = Vec::new();
    for event in &model.events {
        if !seen.insert(event.name.clone()) {
            continue;
        }
        let const_name = format!("{}_EVENT", to_snake_case(&event.name).to_uppercase());
        out.push_str(&format!("{const_name} = {{\n"));
        out.push_str(&format!("    \"name\": \"{}\",\n", event.name));
        out.push_str(&format!(
            "    \"signature\": \"{}\",\n",
            canonical_signature(&event.name, &event.inputs)
        ));
        out.push_str(&format!(
            "    \"topic\": \"{}\",\n",
            event_topic(&event.name, &event.inputs)
        ));
        out.push_str("}\n\n");
        names.push((event.name.clone(), const_name));
    }

    out.push_str("EVENTS = {\n");
    for (event_name, const_name) in &names {
        out.push_str(&format!("    \"{event_name}\": {const_name},\n"));
    }
    out.push_str("}\n");
    out
}

/// Render `selectors/<snake>.py`: 4-byte selector per function.
pub fn selectors_module(model: &ContractModel) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "\"\"\"Function selectors for {}\"\"\"\n\n",
        model.name
    ));

    let mut seen = BTreeSet::new();
    let mut entries = Vec::new();
    for function in &model.functions {
        if !seen.insert(function.name.clone()) {
            continue;
        }
        let const_name = format!("{}_SELECTOR", to_snake_case(&function.name).to_uppercase());
        let selector = function_selector(&function.name, &function.inputs);
        out.push_str(&format!("{const_name} = \"{selector}\"\n"));
        entries.push((function.name.clone(), const_name));
    }

    out.push_str("\nSELECTORS = {\n");
    for (function_name, const_name) in &entries {
        out.push_str(&format!("    \"{function_name}\": {const_name},\n"));
    }
    out.push_str("}\n");
    out
}

/// Render `errors/<snake>.py`: selector-keyed custom error metadata.
pub fn errors_module(model: &ContractModel) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "\"\"\"Custom error metadata for {}\"\"\"\n\n",
        model.name
    ));
    out.push_str("ERRORS = {\n");
    let mut seen = BTreeSet::new();
    for error in &model.errors {
        let selector = function_selector(&error.name, &error.inputs);
        if !seen.insert(selector.clone()) {
            continue;
        }
        out.push_str(&format!(
            "    \"{selector}\": {{\"name\": \"{}\", \"signature\": \"{}\"}},\n",
            error.name,
            canonical_signature(&error.name, &error.inputs)
        ));
    }
    out.push_str("}\n");
    out
}

/// Render `errors/__init__.py`: registry over every contract's custom
/// errors, keyed by 4-byte selector.
pub fn errors_init(graph: &ContractGraph) -> String {
    let mut out = String::from("\"\"\"Centralized custom error registry\"\"\"\n\n");
    out.push_str("ERROR_REGISTRY = {\n");
    let mut seen = BTreeSet::new();
    for model in graph.implementations() {
        for error in &model.errors {
            let selector = function_selector(&error.name, &error.inputs);
            if !seen.insert(selector.clone()) {
                continue;
            }
            out.push_str(&format!(
                "    \"{selector}\": {{\"contract\": \"{}\", \"name\": \"{}\", \"signature\": \"{}\"}},\n",
                model.name,
                error.name,
                canonical_signature(&error.name, &error.inputs)
            ));
        }
    }
    out.push_str("}\n\n\n");
    out.push_str("def lookup_error(selector: str):\n");
    out.push_str("    \"\"\"Find custom error metadata by 4-byte selector\"\"\"\n");
    out.push_str("    return ERROR_REGISTRY.get(selector.lower())\n");
    out
}

/// Render `events/__init__.py` or `selectors/__init__.py`: re-export
/// each contract's table under a prefixed name.
pub fn tables_init(graph: &ContractGraph, table: &str, doc: &str) -> String {
    let mut out = String::new();
    out.push_str(&format!("\"\"\"{doc}\"\"\"\n"));
    let mut names = Vec::new();
    for model in graph.implementations() {
        let module = to_snake_case(&model.name);
        let alias = format!("{}_{table}", module.to_uppercase());
        out.push_str(&format!("from .{module} import {table} as {alias}\n"));
        names.push(alias);
    }
    let quoted: Vec<String> = names.iter().map(|n| format!("'{n}'")).collect();
    out.push_str(&format!("\n__all__ = [{}]\n", quoted.join(", ")));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifacts::{normalize_contract, ContractArtifact};
    use serde_json::json;
    use std::collections::BTreeMap;

    fn token_model() -> ContractModel {
        let abi = json!([
            {"type": "function", "name": "transfer", "stateMutability": "nonpayable",
             "inputs": [{"name": "to", "type": "address"}, {"name": "amount", "type": "uint256"}],
             "outputs": [{"name": "", "type": "bool"}]},
            {"type": "event", "name": "Transfer",
             "inputs": [{"name": "from", "type": "address", "indexed": true},
                        {"name": "to", "type": "address", "indexed": true},
                        {"name": "value", "type": "uint256", "indexed": false}]},
            {"type": "error", "name": "InsufficientBalance",
             "inputs": [{"name": "needed", "type": "uint256"}]}
        ]);
        let artifact = ContractArtifact {
            contract_name: "Token".into(),
            abi: abi.as_array().unwrap().clone(),
            bytecode: None,
            deployed_bytecode: None,
            metadata: None,
        };
        normalize_contract(&artifact, false)
    }

    #[test]
    fn events_module_has_topic_and_signature() {
        let source = events_module(&token_model());
        assert!(source.contains("TRANSFER_EVENT = {"));
        assert!(source.contains("\"signature\": \"Transfer(address,address,uint256)\""));
        assert!(source.contains(
            "\"topic\": \"0xddf252ad1be2c89b69c2b068fc378daa952ba7f163c4a11628f55a4df523b3ef\""
        ));
        assert!(source.contains("\"Transfer\": TRANSFER_EVENT,"));
    }

    #[test]
    fn selectors_module_has_known_selector() {
        let source = selectors_module(&token_model());
        assert!(source.contains("TRANSFER_SELECTOR = \"0xa9059cbb\""));
        assert!(source.contains("\"transfer\": TRANSFER_SELECTOR,"));
    }

    #[test]
    fn error_registry_spans_contracts() {
        let mut contracts = BTreeMap::new();
        contracts.insert("Token".to_string(), token_model());
        let graph = ContractGraph {
            contracts,
            networks: BTreeMap::new(),
            relationships: BTreeMap::new(),
        };

        let per_contract = errors_module(&token_model());
        assert!(per_contract.contains("\"name\": \"InsufficientBalance\""));

        let registry = errors_init(&graph);
        assert!(registry.contains("\"contract\": \"Token\""));
        assert!(registry.contains("\"signature\": \"InsufficientBalance(uint256)\""));
        assert!(registry.contains("def lookup_error(selector: str):"));
    }
}
