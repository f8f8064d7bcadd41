//! Language-neutral contract model.
//!
//! Raw ABI JSON is normalized into these types once; every generator
//! consumes the same [`ContractGraph`].

pub mod builder;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A function/event/error parameter. `components` is populated for
/// tuple (struct) parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    /// Solidity type string (`uint256`, `address`, `tuple`, `tuple[]`, ...)
    pub ty: String,
    pub internal_type: Option<String>,
    pub components: Vec<Parameter>,
    /// Only meaningful for event parameters
    pub indexed: Option<bool>,
}

impl Parameter {
    /// The struct name behind a tuple parameter, derived from
    /// `internalType` (`struct Lib.Order[]` yields `Order`).
    pub fn struct_name(&self) -> Option<&str> {
        struct_name_of(self.internal_type.as_deref()?)
    }
}

/// Extract a bare struct name from an ABI `internalType` string.
pub fn struct_name_of(internal_type: &str) -> Option<&str> {
    let rest = internal_type.strip_prefix("struct ")?;
    let name = rest.split(|c| c == ' ' || c == '[').next()?;
    let bare = name.rsplit('.').next()?;
    if bare.is_empty() {
        None
    } else {
        Some(bare)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StateMutability {
    Pure,
    View,
    #[default]
    Nonpayable,
    Payable,
}

impl StateMutability {
    /// Whether a call mutates chain state (needs a transaction).
    pub fn is_mutating(self) -> bool {
        matches!(self, Self::Nonpayable | Self::Payable)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionModel {
    pub name: String,
    pub inputs: Vec<Parameter>,
    pub outputs: Vec<Parameter>,
    pub state_mutability: StateMutability,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventModel {
    pub name: String,
    pub inputs: Vec<Parameter>,
    pub anonymous: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorModel {
    pub name: String,
    pub inputs: Vec<Parameter>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructModel {
    pub name: String,
    pub fields: Vec<Parameter>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnumModel {
    pub name: String,
    pub values: Vec<String>,
}

/// Natspec documentation pulled from compiler metadata.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NatspecDocs {
    pub notice: Option<String>,
    pub dev: Option<String>,
    pub params: BTreeMap<String, String>,
    pub returns: BTreeMap<String, String>,
}

impl NatspecDocs {
    pub fn is_empty(&self) -> bool {
        self.notice.is_none()
            && self.dev.is_none()
            && self.params.is_empty()
            && self.returns.is_empty()
    }
}

/// One normalized contract.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContractModel {
    pub name: String,
    /// Raw ABI, carried through so generators can emit it verbatim.
    pub abi: Vec<serde_json::Value>,
    pub bytecode: Option<String>,
    pub functions: Vec<FunctionModel>,
    pub events: Vec<EventModel>,
    pub errors: Vec<ErrorModel>,
    pub structs: Vec<StructModel>,
    pub enums: Vec<EnumModel>,
    pub constructor: Option<FunctionModel>,
    pub natspec: Option<NatspecDocs>,
    pub is_interface: bool,
    /// Interface names this contract implements.
    pub implementation_of: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkModel {
    pub name: String,
    pub chain_id: u64,
    pub rpc: String,
    pub explorer: Option<String>,
    /// contract alias -> (class name, address)
    pub contracts: BTreeMap<String, (String, String)>,
}

/// The full normalized input to generation.
#[derive(Debug, Clone, Default)]
pub struct ContractGraph {
    pub contracts: BTreeMap<String, ContractModel>,
    pub networks: BTreeMap<String, NetworkModel>,
    /// implementation name -> interface names
    pub relationships: BTreeMap<String, Vec<String>>,
}

impl ContractGraph {
    /// Implementations, in deterministic (name) order.
    pub fn implementations(&self) -> impl Iterator<Item = &ContractModel> {
        self.contracts.values().filter(|c| !c.is_interface)
    }

    /// Interfaces, in deterministic (name) order.
    pub fn interfaces(&self) -> impl Iterator<Item = &ContractModel> {
        self.contracts.values().filter(|c| c.is_interface)
    }

    /// All structs across the graph, deduplicated by name.
    pub fn all_structs(&self) -> Vec<&StructModel> {
        let mut seen = std::collections::BTreeSet::new();
        let mut out = Vec::new();
        for contract in self.contracts.values() {
            for st in &contract.structs {
                if seen.insert(st.name.as_str()) {
                    out.push(st);
                }
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn struct_name_extraction() {
        assert_eq!(struct_name_of("struct Order"), Some("Order"));
        assert_eq!(struct_name_of("struct Exchange.Order"), Some("Order"));
        assert_eq!(struct_name_of("struct Exchange.Order[]"), Some("Order"));
        assert_eq!(struct_name_of("uint256"), None);
        assert_eq!(struct_name_of("contract IERC20"), None);
    }

    #[test]
    fn mutability_classification() {
        assert!(StateMutability::Payable.is_mutating());
        assert!(StateMutability::Nonpayable.is_mutating());
        assert!(!StateMutability::View.is_mutating());
        assert!(!StateMutability::Pure.is_mutating());
    }
}
