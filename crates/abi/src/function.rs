use common::utils::keccak;

use serde::{Deserialize, Serialize};

use crate::codec;
use crate::types::{AbiParam, AbiType};
use crate::{AbiError, AbiValue};

/// The mutability of a public function.
#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum StateMutability {
    Pure,
    View,
    Nonpayable,
    Payable,
}

impl StateMutability {
    /// Maps the `constant`/`payable` flags of pre-0.5 compiler output.
    pub fn from_legacy_flags(constant: bool, payable: bool) -> Self {
        match (constant, payable) {
            (true, _) => StateMutability::View,
            (false, true) => StateMutability::Payable,
            (false, false) => StateMutability::Nonpayable,
        }
    }

    /// Whether a call can be executed without persisting state changes.
    pub fn is_constant(self) -> bool {
        matches!(self, StateMutability::Pure | StateMutability::View)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AbiFunction {
    #[serde(rename = "type")]
    func_type: AbiFunctionType,
    name: String,
    inputs: Vec<AbiParam>,
    outputs: Vec<AbiParam>,
    #[serde(rename = "stateMutability")]
    state_mutability: StateMutability,
}

impl AbiFunction {
    pub fn new(
        func_type: AbiFunctionType,
        name: impl Into<String>,
        inputs: Vec<AbiParam>,
        outputs: Vec<AbiParam>,
        state_mutability: StateMutability,
    ) -> Self {
        Self {
            func_type,
            name: name.into(),
            inputs,
            outputs,
            state_mutability,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn func_type(&self) -> AbiFunctionType {
        self.func_type
    }

    pub fn inputs(&self) -> &[AbiParam] {
        &self.inputs
    }

    pub fn outputs(&self) -> &[AbiParam] {
        &self.outputs
    }

    pub fn state_mutability(&self) -> StateMutability {
        self.state_mutability
    }

    pub fn input_types(&self) -> Vec<AbiType> {
        self.inputs.iter().map(|param| param.ty.clone()).collect()
    }

    pub fn output_types(&self) -> Vec<AbiType> {
        self.outputs.iter().map(|param| param.ty.clone()).collect()
    }

    pub fn selector(&self) -> AbiFunctionSelector {
        AbiFunctionSelector::new(self)
    }

    /// Encodes `args` without a selector, as used for constructor arguments.
    pub fn encode_args(&self, args: &[AbiValue]) -> Result<Vec<u8>, AbiError> {
        codec::encode(&self.input_types(), args)
    }

    /// Selector followed by the encoded arguments.
    pub fn encode_input(&self, args: &[AbiValue]) -> Result<Vec<u8>, AbiError> {
        let mut payload = self.selector().selector_raw().to_vec();
        payload.extend(self.encode_args(args)?);
        Ok(payload)
    }

    /// Decodes a call payload produced by [`Self::encode_input`]. The
    /// selector must match this function.
    pub fn decode_input(&self, payload: &[u8]) -> Result<Vec<AbiValue>, AbiError> {
        let selector = self.selector().selector_raw();
        match payload.get(..4) {
            Some(prefix) if prefix == selector => {
                codec::decode(&self.input_types(), &payload[4..])
            }
            Some(prefix) => Err(AbiError::InvalidData(format!(
                "selector 0x{} does not match `{}`",
                hex::encode(prefix),
                self.selector().selector_signature()
            ))),
            None => Err(AbiError::DecodeTruncated {
                needed: 4,
                available: payload.len(),
            }),
        }
    }

    pub fn decode_output(&self, payload: &[u8]) -> Result<Vec<AbiValue>, AbiError> {
        codec::decode(&self.output_types(), payload)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AbiFunctionType {
    Function,
    Constructor,
    Receive,
    Fallback,
}

pub struct AbiFunctionSelector {
    selector_sig: String,
}

impl AbiFunctionSelector {
    fn new(func_sig: &AbiFunction) -> Self {
        let selector_sig = format!(
            "{}({})",
            func_sig.name,
            func_sig
                .inputs
                .iter()
                .map(|param| param.ty.selector_type_name())
                .collect::<Vec<_>>()
                .join(",")
        );

        Self { selector_sig }
    }

    pub fn selector_signature(&self) -> &str {
        &self.selector_sig
    }

    pub fn selector_raw(&self) -> [u8; 4] {
        let hash = keccak::full_as_bytes(self.selector_sig.as_bytes());
        [hash[0], hash[1], hash[2], hash[3]]
    }

    /// Returns first 4 bytes of signature hash in hex.
    pub fn hex(&self) -> String {
        keccak::partial(self.selector_sig.as_bytes(), 4)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use primitive_types::U256;
    use serde_test::{assert_ser_tokens, Token};

    fn simple_tuple() -> AbiType {
        let field1 = AbiParam::new("field1", AbiType::UInt(16));
        let field2 = AbiParam::new("field2", AbiType::Bool);

        AbiType::Tuple(vec![field1, field2])
    }

    fn test_func(state_mutability: StateMutability) -> AbiFunction {
        AbiFunction::new(
            AbiFunctionType::Function,
            "test_func",
            vec![
                AbiParam::new("arg1", AbiType::Int(32)),
                AbiParam::new("arg2", simple_tuple()),
            ],
            vec![AbiParam::unnamed(AbiType::UInt(64))],
            state_mutability,
        )
    }

    #[test]
    fn serialize_func() {
        let func = AbiFunction::new(
            AbiFunctionType::Function,
            "echo",
            vec![AbiParam::new("a", AbiType::Address)],
            vec![AbiParam::unnamed(AbiType::Address)],
            StateMutability::Pure,
        );

        assert_ser_tokens(
            &func,
            &[
                Token::Struct {
                    name: "AbiFunction",
                    len: 5,
                },
                Token::Str("type"),
                Token::UnitVariant {
                    name: "AbiFunctionType",
                    variant: "function",
                },
                Token::Str("name"),
                Token::String("echo"),
                Token::Str("inputs"),
                Token::Seq { len: Some(1) },
                Token::Map { len: None },
                Token::Str("name"),
                Token::String("a"),
                Token::String("type"),
                Token::String("address"),
                Token::MapEnd,
                Token::SeqEnd,
                Token::Str("outputs"),
                Token::Seq { len: Some(1) },
                Token::Map { len: None },
                Token::Str("name"),
                Token::String(""),
                Token::String("type"),
                Token::String("address"),
                Token::MapEnd,
                Token::SeqEnd,
                Token::Str("stateMutability"),
                Token::UnitVariant {
                    name: "StateMutability",
                    variant: "pure",
                },
                Token::StructEnd,
            ],
        )
    }

    #[test]
    fn test_state_mutability() {
        assert_eq!(
            StateMutability::from_legacy_flags(true, false),
            StateMutability::View
        );
        assert_eq!(
            StateMutability::from_legacy_flags(false, true),
            StateMutability::Payable
        );
        assert_eq!(
            StateMutability::from_legacy_flags(false, false),
            StateMutability::Nonpayable
        );

        assert!(StateMutability::Pure.is_constant());
        assert!(StateMutability::View.is_constant());
        assert!(!StateMutability::Nonpayable.is_constant());
        assert!(!test_func(StateMutability::Payable).state_mutability().is_constant());
    }

    #[test]
    fn func_selector() {
        let func = test_func(StateMutability::Payable);
        let selector = func.selector();

        debug_assert_eq!(
            selector.selector_signature(),
            "test_func(int32,(uint16,bool))"
        );
        debug_assert_eq!(selector.hex(), "79c3c8b2");
        assert_eq!(hex::encode(selector.selector_raw()), selector.hex());
    }

    #[test]
    fn encode_and_decode_input() {
        let func = test_func(StateMutability::Pure);
        let args = vec![
            AbiValue::int(-5),
            AbiValue::Tuple(vec![AbiValue::uint(9), true.into()]),
        ];

        let payload = func.encode_input(&args).unwrap();
        assert_eq!(payload.len(), 4 + 3 * 32);
        assert_eq!(payload[..4], func.selector().selector_raw());
        assert_eq!(func.decode_input(&payload).unwrap(), args);

        assert!(matches!(
            func.decode_input(&[0xde, 0xad, 0xbe, 0xef]),
            Err(AbiError::InvalidData(_))
        ));
        assert!(matches!(
            func.decode_input(&[0x79]),
            Err(AbiError::DecodeTruncated { .. })
        ));
    }

    #[test]
    fn decode_output() {
        let func = test_func(StateMutability::View);
        let mut payload = [0_u8; 32];
        payload[31] = 42;
        assert_eq!(
            func.decode_output(&payload).unwrap(),
            vec![AbiValue::Uint(U256::from(42))]
        );
    }
}
