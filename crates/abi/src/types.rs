use serde::{ser::SerializeMap, Deserialize, Serialize, Serializer};

use crate::AbiError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AbiType {
    UInt(usize),
    Int(usize),
    Address,
    Bool,
    FixedBytes(usize),
    Array { elem_ty: Box<AbiType>, len: usize },
    DynArray(Box<AbiType>),
    Tuple(Vec<AbiParam>),
    Bytes,
    String,
}

impl AbiType {
    /// Parses a type as it appears in the `type` field of a JSON ABI.
    /// `components` is only used by `tuple` types (and arrays of tuples).
    pub fn parse(ty: &str, components: Vec<AbiParam>) -> Result<Self, AbiError> {
        let invalid = || AbiError::InvalidType(ty.to_string());

        if let Some(inner) = ty.strip_suffix(']') {
            let open = inner.rfind('[').ok_or_else(invalid)?;
            let elem_ty = Box::new(Self::parse(&inner[..open], components)?);
            let dim = &inner[open + 1..];
            return if dim.is_empty() {
                Ok(Self::DynArray(elem_ty))
            } else {
                let len: usize = dim.parse().map_err(|_| invalid())?;
                // The head of the array must be addressable.
                elem_ty.header_size().checked_mul(len).ok_or_else(invalid)?;
                Ok(Self::Array { elem_ty, len })
            };
        }

        match ty {
            "address" => Ok(Self::Address),
            "bool" => Ok(Self::Bool),
            "string" => Ok(Self::String),
            "bytes" => Ok(Self::Bytes),
            "tuple" => Ok(Self::Tuple(components)),
            "uint" => Ok(Self::UInt(256)),
            "int" => Ok(Self::Int(256)),
            _ => {
                if let Some(bits) = ty.strip_prefix("uint") {
                    int_bits(bits).map(Self::UInt).ok_or_else(invalid)
                } else if let Some(bits) = ty.strip_prefix("int") {
                    int_bits(bits).map(Self::Int).ok_or_else(invalid)
                } else if let Some(size) = ty.strip_prefix("bytes") {
                    match size.parse() {
                        Ok(size @ 1..=32) => Ok(Self::FixedBytes(size)),
                        _ => Err(invalid()),
                    }
                } else {
                    Err(invalid())
                }
            }
        }
    }

    pub fn selector_type_name(&self) -> String {
        match self {
            Self::UInt(bits) => format!("uint{bits}"),
            Self::Int(bits) => format!("int{bits}"),
            Self::Address => "address".to_string(),
            Self::Bool => "bool".to_string(),
            Self::FixedBytes(size) => format!("bytes{size}"),
            Self::Array { elem_ty, len } => format!("{}[{}]", elem_ty.selector_type_name(), len),
            Self::DynArray(elem_ty) => format!("{}[]", elem_ty.selector_type_name()),
            Self::Tuple(elems) => format!(
                "({})",
                elems
                    .iter()
                    .map(|component| component.ty.selector_type_name())
                    .collect::<Vec<_>>()
                    .join(",")
            ),
            Self::Bytes => "bytes".to_string(),
            Self::String => "string".to_string(),
        }
    }

    pub fn abi_type_name(&self) -> String {
        match self {
            Self::Tuple(_) => "tuple".to_string(),
            Self::Array { elem_ty, len } => format!("{}[{}]", elem_ty.abi_type_name(), len),
            Self::DynArray(elem_ty) => format!("{}[]", elem_ty.abi_type_name()),
            _ => self.selector_type_name(),
        }
    }

    /// Number of bytes the type occupies in the head of an enclosing tuple.
    pub fn header_size(&self) -> usize {
        match self {
            Self::UInt(_) | Self::Int(_) | Self::Address | Self::Bool | Self::FixedBytes(_) => 32,

            Self::Array { elem_ty, len } if elem_ty.is_static() => {
                elem_ty.header_size().saturating_mul(*len)
            }
            Self::Array { .. } | Self::DynArray(_) => 32,

            Self::Tuple(fields) if self.is_static() => fields
                .iter()
                .fold(0, |acc: usize, field| acc.saturating_add(field.ty.header_size())),
            Self::Tuple(_) => 32,

            Self::Bytes | Self::String => 32,
        }
    }

    pub fn is_primitive(&self) -> bool {
        matches! {
            self,
            Self::UInt(_) | Self::Int(_) | Self::Address | Self::Bool
        }
    }

    pub fn is_static(&self) -> bool {
        match self {
            Self::UInt(_) | Self::Int(_) | Self::Address | Self::Bool | Self::FixedBytes(_) => true,
            Self::Array { elem_ty, .. } => elem_ty.is_static(),
            Self::Tuple(fields) => fields.iter().all(|field| field.ty.is_static()),
            Self::DynArray(_) | Self::Bytes | Self::String => false,
        }
    }

    fn serialize_component<S: SerializeMap>(&self, s: &mut S) -> Result<(), S::Error> {
        match self {
            Self::Tuple(entry) => s.serialize_entry("components", entry),
            Self::Array { elem_ty, .. } | Self::DynArray(elem_ty) => elem_ty.serialize_component(s),
            _ => Ok(()),
        }
    }

    /// Components of the innermost tuple, looking through array types.
    fn components(&self) -> &[AbiParam] {
        match self {
            Self::Tuple(fields) => fields,
            Self::Array { elem_ty, .. } | Self::DynArray(elem_ty) => elem_ty.components(),
            _ => &[],
        }
    }
}

fn int_bits(bits: &str) -> Option<usize> {
    match bits.parse() {
        Ok(bits @ 8..=256) if bits % 8 == 0 => Some(bits),
        _ => None,
    }
}

impl Serialize for AbiType {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        let mut map = s.serialize_map(None)?;
        let type_name = self.abi_type_name();

        map.serialize_entry("type", &type_name)?;

        self.serialize_component(&mut map)?;
        map.end()
    }
}

/// A named parameter of a function, or a named component of a tuple.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawParam")]
pub struct AbiParam {
    pub name: String,
    #[serde(flatten)]
    pub ty: AbiType,
}

impl AbiParam {
    pub fn new(name: impl Into<String>, ty: impl Into<AbiType>) -> Self {
        Self {
            name: name.into(),
            ty: ty.into(),
        }
    }

    /// An unnamed parameter, as used for most return values.
    pub fn unnamed(ty: AbiType) -> Self {
        Self::new("", ty)
    }
}

/// A JSON ABI parameter before its `type` string is parsed.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct RawParam {
    #[serde(default)]
    name: String,
    #[serde(rename = "type")]
    ty: String,
    #[serde(default)]
    components: Vec<RawParam>,
}

impl TryFrom<RawParam> for AbiParam {
    type Error = AbiError;

    fn try_from(raw: RawParam) -> Result<Self, Self::Error> {
        let components = raw
            .components
            .into_iter()
            .map(AbiParam::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            name: raw.name,
            ty: AbiType::parse(&raw.ty, components)?,
        })
    }
}

impl AbiParam {
    pub fn components(&self) -> &[AbiParam] {
        self.ty.components()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use rstest::rstest;
    use serde_test::{assert_ser_tokens, Token};

    #[rstest(
        text,
        expected,
        case("uint256", AbiType::UInt(256)),
        case("uint", AbiType::UInt(256)),
        case("int8", AbiType::Int(8)),
        case("address", AbiType::Address),
        case("bytes32", AbiType::FixedBytes(32)),
        case("bytes", AbiType::Bytes),
        case("string", AbiType::String),
        case("bool[]", AbiType::DynArray(Box::new(AbiType::Bool))),
        case(
            "uint16[3][]",
            AbiType::DynArray(Box::new(AbiType::Array {
                elem_ty: Box::new(AbiType::UInt(16)),
                len: 3
            }))
        )
    )]
    fn parse(text: &str, expected: AbiType) {
        let parsed = AbiType::parse(text, vec![]).unwrap();
        assert_eq!(parsed, expected);
        assert_eq!(parsed.abi_type_name(), if text == "uint" { "uint256" } else { text });
    }

    #[rstest(
        text,
        case("uint7"),
        case("int512"),
        case("bytes33"),
        case("bytes0"),
        case("u[1"),
        case("function"),
        case("uint256[1152921504606846976]"),
        case("bool[2][18446744073709551615]")
    )]
    fn parse_invalid(text: &str) {
        assert_eq!(
            AbiType::parse(text, vec![]),
            Err(AbiError::InvalidType(text.to_string()))
        );
    }

    #[test]
    fn parse_tuple_param() {
        let json = r#"{
            "name": "point",
            "type": "tuple[2]",
            "internalType": "struct Foo.Point[2]",
            "components": [
                { "name": "x", "type": "int32" },
                { "name": "y", "type": "int32" }
            ]
        }"#;
        let param: AbiParam = serde_json::from_str(json).unwrap();
        assert_eq!(param.name, "point");
        assert_eq!(param.ty.selector_type_name(), "(int32,int32)[2]");
        assert_eq!(param.components().len(), 2);
        assert!(param.ty.is_static());
        assert_eq!(param.ty.header_size(), 128);
    }

    #[test]
    fn static_and_dynamic() {
        let dynamic_tuple = AbiType::Tuple(vec![
            AbiParam::new("a", AbiType::UInt(8)),
            AbiParam::new("b", AbiType::String),
        ]);
        assert!(!dynamic_tuple.is_static());
        assert_eq!(dynamic_tuple.header_size(), 32);
        assert_eq!(
            AbiType::Array {
                elem_ty: Box::new(AbiType::Address),
                len: 4
            }
            .header_size(),
            128
        );
        assert!(AbiType::Bool.is_primitive());
        assert!(!AbiType::Bytes.is_primitive());
    }

    #[test]
    fn primitive() {
        let u32_ty = AbiType::UInt(32);
        assert_ser_tokens(
            &u32_ty,
            &[
                Token::Map { len: None },
                Token::String("type"),
                Token::String("uint32"),
                Token::MapEnd,
            ],
        )
    }

    #[test]
    fn tuple_array() {
        let field1 = AbiParam::new("field1", AbiType::UInt(16));
        let field2 = AbiParam::new("field2", AbiType::DynArray(Box::new(AbiType::Bool)));
        let tuple_array_ty = AbiType::Array {
            elem_ty: AbiType::Tuple(vec![field1, field2]).into(),
            len: 16,
        };

        assert_ser_tokens(
            &tuple_array_ty,
            &[
                Token::Map { len: None },
                Token::String("type"),
                Token::String("tuple[16]"),
                Token::String("components"),
                Token::Seq { len: Some(2) },
                Token::Map { len: None },
                Token::String("name"),
                Token::String("field1"),
                Token::String("type"),
                Token::String("uint16"),
                Token::MapEnd,
                Token::Map { len: None },
                Token::String("name"),
                Token::String("field2"),
                Token::String("type"),
                Token::String("bool[]"),
                Token::MapEnd,
                Token::SeqEnd,
                Token::MapEnd,
            ],
        )
    }
}
