use abi::{AbiFunction, AbiFunctionType, AbiParam, AbiType, StateMutability};
use anyhow::{anyhow, bail};
use clap::Args;

#[derive(Args)]
#[command(about = "Print the 4 byte selector of a function signature")]
pub struct SelectorArgs {
    /// Signature such as `transfer(address,uint256)`.
    signature: String,
}

pub fn selector(args: SelectorArgs) -> anyhow::Result<String> {
    let function = parse_signature(&args.signature)?;
    let selector = function.selector();
    Ok(format!(
        "{} {}",
        selector.hex(),
        selector.selector_signature()
    ))
}

fn parse_signature(signature: &str) -> anyhow::Result<AbiFunction> {
    let signature: String = signature.chars().filter(|c| !c.is_whitespace()).collect();
    let (name, params) = signature
        .split_once('(')
        .ok_or_else(|| anyhow!("expected `name(types)`, found `{signature}`"))?;
    let params = params
        .strip_suffix(')')
        .ok_or_else(|| anyhow!("unbalanced parentheses in `{signature}`"))?;
    if name.is_empty() {
        bail!("missing function name in `{signature}`");
    }

    let inputs = parse_types(params)?
        .into_iter()
        .map(AbiParam::unnamed)
        .collect();
    Ok(AbiFunction::new(
        AbiFunctionType::Function,
        name,
        inputs,
        vec![],
        StateMutability::Nonpayable,
    ))
}

/// Parses a comma separated type list. Tuples are written `(t1,t2)`,
/// optionally followed by array suffixes.
fn parse_types(list: &str) -> anyhow::Result<Vec<AbiType>> {
    let mut types = vec![];
    let mut depth = 0_usize;
    let mut start = 0;

    for (idx, c) in list.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => {
                depth = depth
                    .checked_sub(1)
                    .ok_or_else(|| anyhow!("unbalanced parentheses in `{list}`"))?
            }
            ',' if depth == 0 => {
                types.push(parse_type(&list[start..idx])?);
                start = idx + 1;
            }
            _ => {}
        }
    }
    if depth != 0 {
        bail!("unbalanced parentheses in `{list}`");
    }
    if !list.is_empty() {
        types.push(parse_type(&list[start..])?);
    }

    Ok(types)
}

fn parse_type(ty: &str) -> anyhow::Result<AbiType> {
    match ty.strip_prefix('(') {
        Some(rest) => {
            let close = rest
                .rfind(')')
                .ok_or_else(|| anyhow!("unbalanced parentheses in `{ty}`"))?;
            let components = parse_types(&rest[..close])?
                .into_iter()
                .map(AbiParam::unnamed)
                .collect();
            Ok(AbiType::parse(&format!("tuple{}", &rest[close + 1..]), components)?)
        }
        None => Ok(AbiType::parse(ty, vec![])?),
    }
}
