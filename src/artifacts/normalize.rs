//! ABI normalization: raw artifact JSON into the contract model.

use std::collections::BTreeMap;

use serde_json::Value;
use tracing::warn;

use crate::model::{
    struct_name_of, ContractModel, ErrorModel, EventModel, FunctionModel, NatspecDocs, Parameter,
    StateMutability, StructModel,
};

use super::ContractArtifact;

/// Normalize an artifact into a [`ContractModel`].
pub fn normalize_contract(artifact: &ContractArtifact, is_interface: bool) -> ContractModel {
    let mut functions = Vec::new();
    let mut events = Vec::new();
    let mut errors = Vec::new();
    let mut constructor = None;

    for item in &artifact.abi {
        match item.get("type").and_then(Value::as_str) {
            Some("function") => functions.push(normalize_function(item)),
            Some("event") => events.push(normalize_event(item)),
            Some("error") => errors.push(normalize_error(item)),
            Some("constructor") => {
                let mut model = normalize_function(item);
                model.name = "constructor".to_string();
                constructor = Some(model);
            }
            // fallback, receive, unknown: nothing to generate for
            _ => {}
        }
    }

    let structs = extract_structs(&artifact.abi);
    let natspec = extract_natspec(artifact.metadata.as_ref());

    ContractModel {
        name: artifact.contract_name.clone(),
        abi: artifact.abi.clone(),
        bytecode: artifact.bytecode.clone(),
        functions,
        events,
        errors,
        structs,
        enums: Vec::new(),
        constructor,
        natspec,
        is_interface,
        implementation_of: Vec::new(),
    }
}

fn normalize_function(item: &Value) -> FunctionModel {
    FunctionModel {
        name: str_field(item, "name"),
        inputs: normalize_parameters(item.get("inputs"), false),
        outputs: normalize_parameters(item.get("outputs"), false),
        state_mutability: item
            .get("stateMutability")
            .and_then(|v| serde_json::from_value(v.clone()).ok())
            .unwrap_or(StateMutability::Nonpayable),
    }
}

fn normalize_event(item: &Value) -> EventModel {
    EventModel {
        name: str_field(item, "name"),
        inputs: normalize_parameters(item.get("inputs"), true),
        anonymous: item
            .get("anonymous")
            .and_then(Value::as_bool)
            .unwrap_or(false),
    }
}

fn normalize_error(item: &Value) -> ErrorModel {
    ErrorModel {
        name: str_field(item, "name"),
        inputs: normalize_parameters(item.get("inputs"), false),
    }
}

fn normalize_parameters(value: Option<&Value>, is_event: bool) -> Vec<Parameter> {
    value
        .and_then(Value::as_array)
        .map(|params| {
            params
                .iter()
                .map(|p| normalize_parameter(p, is_event))
                .collect()
        })
        .unwrap_or_default()
}

fn normalize_parameter(param: &Value, is_event: bool) -> Parameter {
    Parameter {
        name: str_field(param, "name"),
        ty: str_field(param, "type"),
        internal_type: param
            .get("internalType")
            .and_then(Value::as_str)
            .map(String::from),
        components: normalize_parameters(param.get("components"), false),
        indexed: if is_event {
            param.get("indexed").and_then(Value::as_bool)
        } else {
            None
        },
    }
}

fn str_field(value: &Value, key: &str) -> String {
    value
        .get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

/// Scan function/event/error parameters for tuple types and collect the
/// structs they name, deduplicated, first occurrence wins.
fn extract_structs(abi: &[Value]) -> Vec<StructModel> {
    let mut seen = std::collections::BTreeSet::new();
    let mut structs = Vec::new();

    for item in abi {
        let ty = item.get("type").and_then(Value::as_str);
        if !matches!(ty, Some("function") | Some("event") | Some("error")) {
            continue;
        }
        for key in ["inputs", "outputs"] {
            let Some(params) = item.get(key).and_then(Value::as_array) else {
                continue;
            };
            for param in params {
                collect_struct(param, &mut seen, &mut structs);
            }
        }
    }

    structs
}

fn collect_struct(
    param: &Value,
    seen: &mut std::collections::BTreeSet<String>,
    structs: &mut Vec<StructModel>,
) {
    let ty = param.get("type").and_then(Value::as_str).unwrap_or_default();
    let Some(components) = param.get("components").and_then(Value::as_array) else {
        return;
    };
    if ty != "tuple" && ty != "tuple[]" {
        return;
    }

    let name = param
        .get("internalType")
        .and_then(Value::as_str)
        .and_then(struct_name_of);
    if let Some(name) = name {
        if seen.insert(name.to_string()) {
            structs.push(StructModel {
                name: name.to_string(),
                fields: components
                    .iter()
                    .map(|c| normalize_parameter(c, false))
                    .collect(),
            });
        }
    }

    // Nested structs inside this tuple
    for component in components {
        collect_struct(component, seen, structs);
    }
}

/// Pull natspec docs out of Foundry metadata (`output.userdoc` /
/// `output.devdoc`). Metadata may itself be a JSON string.
fn extract_natspec(metadata: Option<&Value>) -> Option<NatspecDocs> {
    let metadata = metadata?;
    let parsed;
    let metadata = match metadata {
        Value::String(s) => match serde_json::from_str::<Value>(s) {
            Ok(value) => {
                parsed = value;
                &parsed
            }
            Err(err) => {
                warn!(%err, "failed to parse artifact metadata string");
                return None;
            }
        },
        other => other,
    };

    let output = metadata.get("output")?;
    let userdoc = output.get("userdoc");
    let devdoc = output.get("devdoc");
    if userdoc.is_none() && devdoc.is_none() {
        return None;
    }

    let docs = NatspecDocs {
        notice: userdoc
            .and_then(|d| d.get("notice"))
            .and_then(Value::as_str)
            .map(String::from),
        dev: devdoc
            .and_then(|d| d.get("details"))
            .and_then(Value::as_str)
            .map(String::from),
        params: devdoc
            .and_then(|d| d.get("methods"))
            .map(|methods| collect_method_docs(methods, "params"))
            .unwrap_or_default(),
        returns: devdoc
            .and_then(|d| d.get("methods"))
            .map(|methods| collect_method_docs(methods, "returns"))
            .unwrap_or_default(),
    };

    if docs.is_empty() {
        None
    } else {
        Some(docs)
    }
}

fn collect_method_docs(methods: &Value, key: &str) -> BTreeMap<String, String> {
    let mut out = BTreeMap::new();
    let Some(methods) = methods.as_object() else {
        return out;
    };
    for doc in methods.values() {
        let Some(entries) = doc.get(key).and_then(Value::as_object) else {
            continue;
        };
        for (name, text) in entries {
            if let Some(text) = text.as_str() {
                out.insert(name.clone(), text.to_string());
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn artifact(abi: Value) -> ContractArtifact {
        ContractArtifact {
            contract_name: "Token".to_string(),
            abi: abi.as_array().expect("array abi").clone(),
            bytecode: None,
            deployed_bytecode: None,
            metadata: None,
        }
    }

    #[test]
    fn normalizes_functions_events_errors() {
        let abi = json!([
            {
                "type": "function",
                "name": "balanceOf",
                "stateMutability": "view",
                "inputs": [{"name": "owner", "type": "address"}],
                "outputs": [{"name": "", "type": "uint256"}]
            },
            {
                "type": "event",
                "name": "Transfer",
                "inputs": [
                    {"name": "from", "type": "address", "indexed": true},
                    {"name": "value", "type": "uint256", "indexed": false}
                ]
            },
            {"type": "error", "name": "InsufficientBalance", "inputs": []},
            {"type": "constructor", "inputs": [{"name": "supply", "type": "uint256"}]},
            {"type": "fallback", "stateMutability": "payable"}
        ]);

        let model = normalize_contract(&artifact(abi), false);
        assert_eq!(model.functions.len(), 1);
        assert_eq!(model.functions[0].state_mutability, StateMutability::View);
        assert_eq!(model.events.len(), 1);
        assert_eq!(model.events[0].inputs[0].indexed, Some(true));
        assert_eq!(model.errors.len(), 1);
        let ctor = model.constructor.expect("constructor");
        assert_eq!(ctor.name, "constructor");
        assert_eq!(ctor.inputs.len(), 1);
    }

    #[test]
    fn extracts_structs_from_tuples() {
        let abi = json!([
            {
                "type": "function",
                "name": "submit",
                "stateMutability": "nonpayable",
                "inputs": [{
                    "name": "order",
                    "type": "tuple",
                    "internalType": "struct Exchange.Order",
                    "components": [
                        {"name": "maker", "type": "address"},
                        {"name": "amount", "type": "uint256"}
                    ]
                }],
                "outputs": []
            },
            {
                "type": "function",
                "name": "orders",
                "stateMutability": "view",
                "inputs": [],
                "outputs": [{
                    "name": "",
                    "type": "tuple[]",
                    "internalType": "struct Exchange.Order[]",
                    "components": [
                        {"name": "maker", "type": "address"},
                        {"name": "amount", "type": "uint256"}
                    ]
                }]
            }
        ]);

        let model = normalize_contract(&artifact(abi), false);
        assert_eq!(model.structs.len(), 1);
        assert_eq!(model.structs[0].name, "Order");
        assert_eq!(model.structs[0].fields.len(), 2);
    }

    #[test]
    fn extracts_natspec_from_string_metadata() {
        let metadata = json!({
            "output": {
                "userdoc": {"notice": "A token."},
                "devdoc": {
                    "details": "Internal notes.",
                    "methods": {
                        "transfer(address,uint256)": {
                            "params": {"to": "Recipient."},
                            "returns": {"_0": "Success flag."}
                        }
                    }
                }
            }
        });
        let mut art = artifact(json!([]));
        art.metadata = Some(Value::String(metadata.to_string()));

        let model = normalize_contract(&art, false);
        let docs = model.natspec.expect("natspec");
        assert_eq!(docs.notice.as_deref(), Some("A token."));
        assert_eq!(docs.params.get("to").map(String::as_str), Some("Recipient."));
        assert_eq!(
            docs.returns.get("_0").map(String::as_str),
            Some("Success flag.")
        );
    }

    #[test]
    fn empty_abi_yields_empty_model() {
        let model = normalize_contract(&ContractArtifact::stub("IVault"), true);
        assert!(model.is_interface);
        assert!(model.functions.is_empty());
        assert!(model.structs.is_empty());
        assert!(model.natspec.is_none());
    }
}
