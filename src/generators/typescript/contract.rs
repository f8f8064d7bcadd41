//! TypeScript source emission for contract and interface bindings.

use crate::generators::naming::{abi_const_name, to_snake_case, typescript_type};
use crate::generators::selectors::{event_topic, function_selector};
use crate::generators::GeneratorError;
use crate::model::{ContractModel, FunctionModel, Parameter};

/// Render `src/contracts/<Name>/index.ts` for an implementation.
pub fn contract_module(model: &ContractModel) -> Result<String, GeneratorError> {
    let abi_json = serde_json::to_string_pretty(&model.abi)?;
    let abi_name = abi_const_name(&model.name);
    let class_name = &model.name;

    let mut out = String::new();
    out.push_str(&format!("// Auto-generated binding for {class_name}\n\n"));
    out.push_str("import type { Address, PublicClient, WalletClient } from 'viem';\n\n");
    out.push_str(&format!("export const {abi_name} = {abi_json} as const;\n\n"));

    out.push_str(&format!("export interface {class_name}Config {{\n"));
    out.push_str("  address: Address;\n");
    out.push_str("  publicClient: PublicClient;\n");
    out.push_str("  walletClient?: WalletClient;\n");
    out.push_str("}\n\n");

    if let Some(notice) = model.natspec.as_ref().and_then(|n| n.notice.as_deref()) {
        out.push_str(&format!("/** {notice} */\n"));
    }
    out.push_str(&format!("export class {class_name} {{\n"));
    out.push_str(&static_members(model));
    out.push_str("  readonly address: Address;\n");
    out.push_str("  private readonly publicClient: PublicClient;\n");
    out.push_str("  private readonly walletClient?: WalletClient;\n\n");
    out.push_str(&format!("  constructor(config: {class_name}Config) {{\n"));
    out.push_str("    this.address = config.address;\n");
    out.push_str("    this.publicClient = config.publicClient;\n");
    out.push_str("    this.walletClient = config.walletClient;\n");
    out.push_str("  }\n");

    let mut seen = std::collections::BTreeSet::new();
    for function in &model.functions {
        if !seen.insert(function.name.clone()) {
            continue;
        }
        out.push('\n');
        out.push_str(&render_method(function, &abi_name));
    }
    out.push_str("}\n");

    Ok(out)
}

/// Render `src/interfaces/<Name>/index.ts`. Interfaces become abstract
/// classes so they stay usable as runtime values in the barrel objects.
pub fn interface_module(model: &ContractModel) -> Result<String, GeneratorError> {
    let abi_json = serde_json::to_string_pretty(&model.abi)?;
    let abi_name = abi_const_name(&model.name);
    let class_name = &model.name;

    let mut out = String::new();
    out.push_str(&format!("// Auto-generated interface for {class_name}\n\n"));
    out.push_str("import type { Address, PublicClient, WalletClient } from 'viem';\n\n");
    out.push_str(&format!("export const {abi_name} = {abi_json} as const;\n\n"));

    out.push_str(&format!("export interface {class_name}Config {{\n"));
    out.push_str("  address: Address;\n");
    out.push_str("  publicClient: PublicClient;\n");
    out.push_str("  walletClient?: WalletClient;\n");
    out.push_str("}\n\n");

    out.push_str(&format!("export abstract class {class_name} {{\n"));
    let mut seen = std::collections::BTreeSet::new();
    for function in &model.functions {
        if !seen.insert(function.name.clone()) {
            continue;
        }
        let params = render_params(&function.inputs);
        let ret = return_type(function);
        out.push_str(&format!(
            "  abstract {}({params}): Promise<{ret}>;\n",
            function.name
        ));
    }
    out.push_str("}\n");

    Ok(out)
}

/// Event topic hashes and function selectors as static class members,
/// usable without an instance: `Token.TRANSFER_EVENT_SIGNATURE`.
fn static_members(model: &ContractModel) -> String {
    let mut out = String::new();
    let mut seen = std::collections::BTreeSet::new();
    for event in &model.events {
        if !seen.insert(event.name.clone()) {
            continue;
        }
        out.push_str(&format!(
            "  static readonly {}_EVENT_SIGNATURE = '{}';\n",
            to_snake_case(&event.name).to_uppercase(),
            event_topic(&event.name, &event.inputs)
        ));
    }
    let mut seen = std::collections::BTreeSet::new();
    for function in &model.functions {
        if !seen.insert(function.name.clone()) {
            continue;
        }
        out.push_str(&format!(
            "  static readonly {}_SELECTOR = '{}';\n",
            to_snake_case(&function.name).to_uppercase(),
            function_selector(&function.name, &function.inputs)
        ));
    }
    if !out.is_empty() {
        out.push('\n');
    }
    out
}

fn render_method(function: &FunctionModel, abi_name: &str) -> String {
    let params = render_params(&function.inputs);
    let args = call_args(&function.inputs);
    let name = &function.name;

    let mut out = String::new();
    if function.state_mutability.is_mutating() {
        out.push_str(&format!(
            "  async {name}({params}): Promise<`0x${{string}}`> {{\n"
        ));
        out.push_str("    if (!this.walletClient?.account) {\n");
        out.push_str(&format!(
            "      throw new Error('walletClient with account required for {name}');\n"
        ));
        out.push_str("    }\n");
        out.push_str("    const { request } = await this.publicClient.simulateContract({\n");
        out.push_str("      address: this.address,\n");
        out.push_str(&format!("      abi: {abi_name},\n"));
        out.push_str(&format!("      functionName: '{name}',\n"));
        out.push_str(&format!("      args: [{args}],\n"));
        out.push_str("      account: this.walletClient.account,\n");
        out.push_str("    });\n");
        out.push_str("    return await this.walletClient.writeContract(request);\n");
        out.push_str("  }\n");
    } else {
        let ret = return_type(function);
        out.push_str(&format!("  async {name}({params}): Promise<{ret}> {{\n"));
        out.push_str("    return await this.publicClient.readContract({\n");
        out.push_str("      address: this.address,\n");
        out.push_str(&format!("      abi: {abi_name},\n"));
        out.push_str(&format!("      functionName: '{name}',\n"));
        out.push_str(&format!("      args: [{args}],\n"));
        out.push_str(&format!("    }}) as {ret};\n"));
        out.push_str("  }\n");
    }
    out
}

fn render_params(inputs: &[Parameter]) -> String {
    inputs
        .iter()
        .enumerate()
        .map(|(i, input)| format!("{}: {}", param_name(input, i), typescript_type(input)))
        .collect::<Vec<_>>()
        .join(", ")
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
        input.name.clone()
    }
}

fn return_type(function: &FunctionModel) -> String {
    match function.outputs.len() {
        0 => "void".to_string(),
        1 => typescript_type(&function.outputs[0]),
        _ => {
            let parts: Vec<String> = function.outputs.iter().map(typescript_type).collect();
            format!("readonly [{}]", parts.join(", "))
        }
    }
}
