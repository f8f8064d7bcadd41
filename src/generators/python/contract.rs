//! Python source emission for contract and interface bindings.

use crate::generators::naming::{abi_const_name, python_safe_name, python_type, to_snake_case};
use crate::generators::GeneratorError;
use crate::model::{ContractModel, FunctionModel, Parameter};

/// Render `contracts/<snake>.py` for an implementation contract.
pub fn contract_module(model: &ContractModel, emit_async: bool) -> Result<String, GeneratorError> {
    let abi_json = serde_json::to_string_pretty(&model.abi)?;
    let abi_name = abi_const_name(&model.name);
    let class_name = &model.name;

    let mut out = String::new();
    out.push_str(&format!(
        "\"\"\"Auto-generated contract binding for {class_name}\"\"\"\n"
    ));
    out.push_str("import json\n");
    out.push_str("from typing import Any, Optional\n\n");
    if emit_async {
        out.push_str("from web3 import AsyncWeb3 as Web3\n\n");
    } else {
        out.push_str("from web3 import Web3\n\n");
    }
    out.push_str(&format!("{abi_name} = json.loads(\"\"\"{abi_json}\"\"\")\n\n\n"));

    out.push_str(&format!("class {class_name}:\n"));
    if let Some(notice) = model.natspec.as_ref().and_then(|n| n.notice.as_deref()) {
        out.push_str(&format!("    \"\"\"{notice}\"\"\"\n\n"));
    } else {
        out.push_str(&format!("    \"\"\"{class_name} contract binding\"\"\"\n\n"));
    }

    out.push_str("    def __init__(self, web3: Web3, address: str):\n");
    out.push_str("        self.web3 = web3\n");
    out.push_str("        self.address = Web3.to_checksum_address(address)\n");
    out.push_str(&format!(
        "        self.contract = web3.eth.contract(address=self.address, abi={abi_name})\n"
    ));

    let mut seen = std::collections::BTreeSet::new();
    for function in &model.functions {
        let method_name = to_snake_case(&function.name);
        // Overloads collapse to the first occurrence
        if !seen.insert(method_name.clone()) {
            continue;
        }
        out.push('\n');
        out.push_str(&render_method(function, &method_name, emit_async));
    }

    let mut seen_events = std::collections::BTreeSet::new();
    for event in &model.events {
        let accessor = format!("{}_event", to_snake_case(&event.name));
        if !seen_events.insert(accessor.clone()) {
            continue;
        }
        out.push('\n');
        out.push_str("    @property\n");
        out.push_str(&format!("    def {accessor}(self):\n"));
        out.push_str(&format!("        \"\"\"{} event accessor\"\"\"\n", event.name));
        out.push_str(&format!(
            "        return self.contract.events.{}\n",
            event.name
        ));
    }

    Ok(out)
}

/// Render `interfaces/<snake>.py` for an interface.
pub fn interface_module(model: &ContractModel) -> String {
    let class_name = &model.name;
    let mut out = String::new();
    out.push_str(&format!(
        "\"\"\"Auto-generated interface for {class_name}\"\"\"\n"
    ));
    out.push_str("from abc import ABC, abstractmethod\n");
    out.push_str("from typing import Any\n\n\n");
    out.push_str(&format!("class {class_name}(ABC):\n"));
    out.push_str(&format!("    \"\"\"{class_name} interface\"\"\"\n"));

    let mut seen = std::collections::BTreeSet::new();
    for function in &model.functions {
        let method_name = to_snake_case(&function.name);
        if !seen.insert(method_name.clone()) {
            continue;
        }
        let params = render_params(&function.inputs);
        let ret = return_annotation(function);
        out.push('\n');
        out.push_str("    @abstractmethod\n");
        out.push_str(&format!("    def {method_name}(self{params}) -> {ret}: ...\n"));
    }

    out
}

fn render_method(function: &FunctionModel, method_name: &str, emit_async: bool) -> String {
    let params = render_params(&function.inputs);
    let args = call_args(&function.inputs);
    let abi_name = &function.name;
    let def = if emit_async { "async def" } else { "def" };
    let await_kw = if emit_async { "await " } else { "" };

    let mut out = String::new();
    if function.state_mutability.is_mutating() {
        out.push_str(&format!(
            "    {def} {method_name}(self{params}, tx_params: Optional[dict] = None) -> Any:\n"
        ));
        out.push_str(&format!(
            "        \"\"\"Send a {abi_name} transaction\"\"\"\n"
        ));
        out.push_str(&format!(
            "        return {await_kw}self.contract.functions.{abi_name}({args}).transact(tx_params or {{}})\n"
        ));
    } else {
        let ret = return_annotation(function);
        out.push_str(&format!("    {def} {method_name}(self{params}) -> {ret}:\n"));
        out.push_str(&format!("        \"\"\"Call {abi_name}\"\"\"\n"));
        out.push_str(&format!(
            "        return {await_kw}self.contract.functions.{abi_name}({args}).call()\n"
        ));
    }
    out
}

fn render_params(inputs: &[Parameter]) -> String {
    inputs
        .iter()
        .enumerate()
        .map(|(i, input)| {
            let name = param_name(input, i);
            let annotation = python_type(input);
            format!(", {name}: {annotation}")
        })
        .collect()
}

fn call_args(inputs: &[Parameter]) -> String {
    inputs
        .iter()
        .enumerate()
        .map(|(i, input)| param_name(input, i))
        .collect::<Vec<_>>()
        .join(", ")
}

fn param_name(input: &Parameter, index: usize) -> String {
    if input.name.is_empty() {
        format!("arg{index}")
    } else {
        python_safe_name(&to_snake_case(&input.name))
    }
}

fn return_annotation(function: &FunctionModel) -> String {
    match function.outputs.len() {
        0 => "None".to_string(),
        1 => python_type(&function.outputs[0]),
        _ => "tuple".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifacts::{normalize_contract, ContractArtifact};
    use serde_json::json;

    fn token_model() -> ContractModel {
        let abi = json!([
            {"type": "function", "name": "balanceOf", "stateMutability": "view",
             "inputs": [{"name": "owner", "type": "address"}],
             "outputs": [{"name": "", "type": "uint256"}]},
            {"type": "function", "name": "transfer", "stateMutability": "nonpayable",
             "inputs": [{"name": "from", "type": "address"}, {"name": "amount", "type": "uint256"}],
             "outputs": [{"name": "", "type": "bool"}]},
            {"type": "event", "name": "Transfer",
             "inputs": [{"name": "from", "type": "address", "indexed": true}]}
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
    fn contract_module_shape() {
        let source = contract_module(&token_model(), false).expect("render");
        assert!(source.contains("TOKEN_ABI = json.loads("));
        assert!(source.contains("class Token:"));
        assert!(source.contains("def balance_of(self, owner: str) -> int:"));
        assert!(source.contains(".functions.balanceOf(owner).call()"));
        // Keyword parameter renamed, original ABI name kept in the call
        assert!(source.contains(
            "def transfer(self, from_param: str, amount: int, tx_params: Optional[dict] = None)"
        ));
        assert!(source.contains(".functions.transfer(from_param, amount).transact(tx_params or {})"));
        assert!(source.contains("def transfer_event(self):"));
    }

    #[test]
    fn async_contract_module() {
        let source = contract_module(&token_model(), true).expect("render");
        assert!(source.contains("async def balance_of"));
        assert!(source.contains("return await self.contract.functions.balanceOf(owner).call()"));
    }

    #[test]
    fn interface_module_shape() {
        let mut model = token_model();
        model.name = "IToken".into();
        model.is_interface = true;
        let source = interface_module(&model);
        assert!(source.contains("class IToken(ABC):"));
        assert!(source.contains("@abstractmethod"));
        assert!(source.contains("def balance_of(self, owner: str) -> int: ..."));
    }
}
