//! Canonical ABI signatures, 4-byte selectors and event topics.

use sha3::{Digest, Keccak256};

use crate::model::Parameter;

/// Canonical Solidity type for signature hashing. Tuples expand to a
/// parenthesized component list, array suffixes carry over.
pub fn canonical_type(param: &Parameter) -> String {
    if let Some(suffix) = param.ty.strip_prefix("tuple") {
        let inner: Vec<String> = param.components.iter().map(canonical_type).collect();
        format!("({}){suffix}", inner.join(","))
    } else {
        param.ty.clone()
    }
}

/// `transfer(address,uint256)` style canonical signature.
pub fn canonical_signature(name: &str, inputs: &[Parameter]) -> String {
    let types: Vec<String> = inputs.iter().map(canonical_type).collect();
    format!("{name}({})", types.join(","))
}

/// First four bytes of the keccak-256 signature hash, hex encoded.
pub fn function_selector(name: &str, inputs: &[Parameter]) -> String {
    let hash = Keccak256::digest(canonical_signature(name, inputs).as_bytes());
    format!("0x{}", hex::encode(&hash[..4]))
}

/// Full keccak-256 signature hash, as used for event topic0.
pub fn event_topic(name: &str, inputs: &[Parameter]) -> String {
    let hash = Keccak256::digest(canonical_signature(name, inputs).as_bytes());
    format!("0x{}", hex::encode(hash))
}
