//! Identifier and type mapping helpers shared by the generators.

use crate::model::Parameter;

/// `NetworkCore` -> `network_core`, `IToken` -> `i_token`. Runs of
/// capitals stay together so `DOMAIN_SEPARATOR` -> `domain_separator`.
pub fn to_snake_case(name: &str) -> String {
    let chars: Vec<char> = name.chars().collect();
    let mut out = String::with_capacity(name.len() + 4);
    for (i, &c) in chars.iter().enumerate() {
        if c.is_ascii_uppercase() {
            let prev = i.checked_sub(1).map(|j| chars[j]);
            let next_lower = chars.get(i + 1).map_or(false, |n| n.is_ascii_lowercase());
            let boundary = match prev {
                Some(p) if p.is_ascii_lowercase() || p.is_ascii_digit() => true,
                Some(p) if p.is_ascii_uppercase() => next_lower,
                _ => false,
            };
            if boundary {
                out.push('_');
            }
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

/// ABI constant name: `NetworkCore` -> `NETWORKCORE_ABI`.
pub fn abi_const_name(contract_name: &str) -> String {
    format!("{}_ABI", contract_name.to_uppercase())
}

const PYTHON_KEYWORDS: &[&str] = &[
    "False", "None", "True", "and", "as", "assert", "async", "await", "break", "class", "continue",
    "def", "del", "elif", "else", "except", "finally", "for", "from", "global", "if", "import",
    "in", "is", "lambda", "nonlocal", "not", "or", "pass", "raise", "return", "try", "while",
    "with", "yield",
];

/// Rename parameters that collide with Python keywords.
pub fn python_safe_name(name: &str) -> String {
    if PYTHON_KEYWORDS.contains(&name) {
        format!("{name}_param")
    } else {
        name.to_string()
    }
}

/// Map a Solidity parameter to a Python annotation.
pub fn python_type(param: &Parameter) -> String {
    python_type_of(&param.ty, param)
}

fn python_type_of(ty: &str, param: &Parameter) -> String {
    if let Some(base) = ty.strip_suffix("[]") {
        return format!("list[{}]", python_type_of(base, param));
    }
    if let Some((base, _size)) = split_fixed_array(ty) {
        return format!("list[{}]", python_type_of(base, param));
    }
    if ty == "tuple" {
        // Forward reference to the generated Pydantic model
        return match param.struct_name() {
            Some(name) => format!("'{name}'"),
            None => "dict".to_string(),
        };
    }
    if ty == "address" || ty == "string" {
        return "str".to_string();
    }
    if ty == "bool" {
        return "bool".to_string();
    }
    if ty == "bytes" || ty.starts_with("bytes") {
        return "bytes".to_string();
    }
    if ty.starts_with("uint") || ty.starts_with("int") {
        return "int".to_string();
    }
    "Any".to_string()
}

/// Map a Solidity parameter to a TypeScript annotation. Addresses and
/// fixed bytes are hex template literals, integers are `bigint`.
pub fn typescript_type(param: &Parameter) -> String {
    typescript_type_of(&param.ty, param)
}

fn typescript_type_of(ty: &str, param: &Parameter) -> String {
    if let Some(base) = ty.strip_suffix("[]") {
        return format!("{}[]", typescript_type_of(base, param));
    }
    if let Some((base, _size)) = split_fixed_array(ty) {
        return format!("{}[]", typescript_type_of(base, param));
    }
    if ty == "tuple" {
        return match param.struct_name() {
            Some(name) => name.to_string(),
            None => "Record<string, unknown>".to_string(),
        };
    }
    match ty {
        "address" => "`0x${string}`".to_string(),
        "string" => "string".to_string(),
        "bool" => "boolean".to_string(),
        _ if ty == "bytes" || ty.starts_with("bytes") => "`0x${string}`".to_string(),
        _ if ty.starts_with("uint") || ty.starts_with("int") => "bigint".to_string(),
        _ => "unknown".to_string(),
    }
}

fn split_fixed_array(ty: &str) -> Option<(&str, &str)> {
    let open = ty.rfind('[')?;
    let close = ty.rfind(']')?;
    if close != ty.len() - 1 || close <= open + 1 {
        return None;
    }
    let size = &ty[open + 1..close];
    if size.chars().all(|c| c.is_ascii_digit()) {
        Some((&ty[..open], size))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn param(ty: &str, internal: Option<&str>) -> Parameter {
        Parameter {
            name: "x".into(),
            ty: ty.into(),
            internal_type: internal.map(String::from),
            components: vec![],
            indexed: None,
        }
    }

    #[test]
    fn snake_case() {
        assert_eq!(to_snake_case("NetworkCore"), "network_core");
        assert_eq!(to_snake_case("IToken"), "i_token");
        assert_eq!(to_snake_case("token"), "token");
        assert_eq!(to_snake_case("TokenVaultV2"), "token_vault_v2");
        assert_eq!(to_snake_case("DOMAIN_SEPARATOR"), "domain_separator");
        assert_eq!(to_snake_case("balanceOf"), "balance_of");
    }

    #[test]
    fn abi_constant() {
        assert_eq!(abi_const_name("NetworkCore"), "NETWORKCORE_ABI");
    }

    #[test]
    fn python_keyword_params_renamed() {
        assert_eq!(python_safe_name("from"), "from_param");
        assert_eq!(python_safe_name("owner"), "owner");
    }

    #[test]
    fn python_type_mapping() {
        assert_eq!(python_type(&param("uint256", None)), "int");
        assert_eq!(python_type(&param("address", None)), "str");
        assert_eq!(python_type(&param("bytes32", None)), "bytes");
        assert_eq!(python_type(&param("address[]", None)), "list[str]");
        assert_eq!(python_type(&param("uint256[3]", None)), "list[int]");
        assert_eq!(
            python_type(&param("tuple", Some("struct Exchange.Order"))),
            "'Order'"
        );
        assert_eq!(python_type(&param("tuple", None)), "dict");
    }

    #[test]
    fn typescript_type_mapping() {
        assert_eq!(typescript_type(&param("uint256", None)), "bigint");
        assert_eq!(typescript_type(&param("address", None)), "`0x${string}`");
        assert_eq!(typescript_type(&param("bool", None)), "boolean");
        assert_eq!(typescript_type(&param("uint8[]", None)), "bigint[]");
        assert_eq!(
            typescript_type(&param("tuple", Some("struct Order"))),
            "Order"
        );
    }
}
