use indexmap::IndexMap;
use serde::{ser::SerializeSeq, Deserialize, Serialize, Serializer};

use crate::function::{AbiFunction, AbiFunctionType, StateMutability};
use crate::types::{AbiParam, RawParam};
use crate::{AbiError, AbiValue};

/// The callable interface of a contract.
///
/// Functions are kept in declaration order. Overloads share a name, so the
/// lookup table maps a name to every function declared with it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AbiContract {
    constructor: Option<AbiFunction>,
    functions: Vec<AbiFunction>,
    by_name: IndexMap<String, Vec<usize>>,
}

impl Serialize for AbiContract {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        let len = self.functions.len() + usize::from(self.constructor.is_some());
        let mut seq = s.serialize_seq(Some(len))?;
        if let Some(constructor) = &self.constructor {
            seq.serialize_element(constructor)?;
        }

        for func in &self.functions {
            seq.serialize_element(func)?;
        }

        seq.end()
    }
}

impl AbiContract {
    pub fn new(constructor: Option<AbiFunction>, functions: Vec<AbiFunction>) -> Self {
        let mut by_name: IndexMap<String, Vec<usize>> = IndexMap::new();
        for (idx, func) in functions.iter().enumerate() {
            by_name.entry(func.name().to_string()).or_default().push(idx);
        }

        Self {
            constructor,
            functions,
            by_name,
        }
    }

    /// Loads a JSON ABI as emitted by solc. Events, errors and the
    /// fallback/receive entries carry no callable signature and are skipped.
    pub fn from_json(json: &str) -> Result<Self, AbiError> {
        let entries: Vec<RawEntry> =
            serde_json::from_str(json).map_err(|err| AbiError::InvalidAbi(err.to_string()))?;
        Self::from_entries(entries)
    }

    pub fn from_value(value: serde_json::Value) -> Result<Self, AbiError> {
        let entries: Vec<RawEntry> =
            serde_json::from_value(value).map_err(|err| AbiError::InvalidAbi(err.to_string()))?;
        Self::from_entries(entries)
    }

    fn from_entries(entries: Vec<RawEntry>) -> Result<Self, AbiError> {
        let mut constructor = None;
        let mut functions = vec![];

        for entry in entries {
            let func_type = match entry.kind.as_str() {
                "function" => AbiFunctionType::Function,
                "constructor" => AbiFunctionType::Constructor,
                _ => continue,
            };
            let state_mutability = entry.state_mutability.unwrap_or_else(|| {
                StateMutability::from_legacy_flags(
                    entry.constant.unwrap_or(false),
                    entry.payable.unwrap_or(false),
                )
            });
            let func = AbiFunction::new(
                func_type,
                entry.name,
                convert_params(entry.inputs)?,
                convert_params(entry.outputs)?,
                state_mutability,
            );

            match func_type {
                AbiFunctionType::Constructor => constructor = Some(func),
                _ => functions.push(func),
            }
        }

        Ok(Self::new(constructor, functions))
    }

    pub fn json(&self, prettify: bool) -> Result<String, AbiError> {
        match prettify {
            true => serde_json::to_string_pretty(self),
            false => serde_json::to_string(self),
        }
        .map_err(|err| AbiError::InvalidAbi(err.to_string()))
    }

    pub fn constructor(&self) -> Option<&AbiFunction> {
        self.constructor.as_ref()
    }

    /// Encodes constructor arguments, which follow the init code without a
    /// selector. Without a declared constructor only an empty argument list
    /// is accepted.
    pub fn encode_constructor(&self, args: &[AbiValue]) -> Result<Vec<u8>, AbiError> {
        match &self.constructor {
            Some(constructor) => constructor.encode_args(args),
            None if args.is_empty() => Ok(vec![]),
            None => Err(AbiError::ArityMismatch {
                expected: 0,
                found: args.len(),
            }),
        }
    }

    pub fn functions(&self) -> &[AbiFunction] {
        &self.functions
    }

    /// Every overload declared under `name`.
    pub fn functions_named<'a>(&'a self, name: &str) -> impl Iterator<Item = &'a AbiFunction> {
        self.by_name
            .get(name)
            .into_iter()
            .flatten()
            .map(|&idx| &self.functions[idx])
    }

    /// Looks up a function by plain name, or by full signature such as
    /// `transfer(address,uint256)` when the name is overloaded.
    pub fn function(&self, key: &str) -> Result<&AbiFunction, AbiError> {
        if let Some(open) = key.find('(') {
            let signature: String = key.chars().filter(|c| !c.is_whitespace()).collect();
            return self
                .functions_named(key[..open].trim())
                .find(|func| func.selector().selector_signature() == signature)
                .ok_or_else(|| AbiError::UnknownFunction(key.to_string()));
        }

        let mut overloads = self.functions_named(key);
        match (overloads.next(), overloads.next()) {
            (Some(func), None) => Ok(func),
            (None, _) => Err(AbiError::UnknownFunction(key.to_string())),
            (Some(_), Some(_)) => Err(AbiError::AmbiguousFunction {
                name: key.to_string(),
                candidates: self
                    .functions_named(key)
                    .map(|func| func.selector().selector_signature().to_string())
                    .collect(),
            }),
        }
    }

    /// Function names in declaration order, without duplicates.
    pub fn function_names(&self) -> impl Iterator<Item = &str> {
        self.by_name.keys().map(String::as_str)
    }
}

fn convert_params(params: Vec<RawParam>) -> Result<Vec<AbiParam>, AbiError> {
    params.into_iter().map(AbiParam::try_from).collect()
}

/// A JSON ABI entry. Compilers before 0.5 omit `type` for functions and use
/// `constant`/`payable` instead of `stateMutability`.
#[derive(Debug, Deserialize)]
struct RawEntry {
    #[serde(rename = "type", default = "default_entry_kind")]
    kind: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    inputs: Vec<RawParam>,
    #[serde(default)]
    outputs: Vec<RawParam>,
    #[serde(rename = "stateMutability", default)]
    state_mutability: Option<StateMutability>,
    #[serde(default)]
    constant: Option<bool>,
    #[serde(default)]
    payable: Option<bool>,
}

fn default_entry_kind() -> String {
    "function".into()
}
