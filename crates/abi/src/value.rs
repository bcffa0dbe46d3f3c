use std::fmt;

use common::address::encode_hex_address;
use common::Address;
use primitive_types::U256;

/// A decoded (or to-be-encoded) ABI value.
///
/// Signed integers are stored as 256-bit two's-complement words, so
/// `Int(U256::MAX)` is `-1`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AbiValue {
    Uint(U256),
    Int(U256),
    Address(Address),
    Bool(bool),
    FixedBytes(Vec<u8>),
    Bytes(Vec<u8>),
    String(String),
    Array(Vec<AbiValue>),
    Tuple(Vec<AbiValue>),
}

impl AbiValue {
    pub fn int(value: i128) -> Self {
        Self::Int(twos_complement(value))
    }

    pub fn uint(value: u128) -> Self {
        Self::Uint(U256::from(value))
    }

    /// Short description of the value's shape, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Uint(_) => "unsigned integer",
            Self::Int(_) => "signed integer",
            Self::Address(_) => "address",
            Self::Bool(_) => "bool",
            Self::FixedBytes(_) => "fixed bytes",
            Self::Bytes(_) => "bytes",
            Self::String(_) => "string",
            Self::Array(_) => "array",
            Self::Tuple(_) => "tuple",
        }
    }

    pub fn as_u128(&self) -> Option<u128> {
        match self {
            Self::Uint(value) if value.bits() <= 128 => Some(value.as_u128()),
            Self::Int(value) if !is_negative(value) && value.bits() <= 128 => {
                Some(value.as_u128())
            }
            _ => None,
        }
    }

    pub fn as_i128(&self) -> Option<i128> {
        match self {
            Self::Int(value) if is_negative(value) => {
                // !value == |x| - 1, which avoids overflowing on i128::MIN.
                let magnitude = !*value;
                (magnitude.bits() <= 127).then(|| -(magnitude.as_u128() as i128) - 1)
            }
            Self::Int(value) | Self::Uint(value) => {
                (value.bits() <= 127).then(|| value.as_u128() as i128)
            }
            _ => None,
        }
    }

    pub fn as_address(&self) -> Option<Address> {
        match self {
            Self::Address(address) => Some(*address),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Bytes(value) | Self::FixedBytes(value) => Some(value),
            _ => None,
        }
    }
}

pub(crate) fn is_negative(value: &U256) -> bool {
    value.bit(255)
}

pub(crate) fn twos_complement(value: i128) -> U256 {
    let magnitude = U256::from(value.unsigned_abs());
    if value < 0 {
        (!magnitude).overflowing_add(U256::one()).0
    } else {
        magnitude
    }
}

macro_rules! impl_from_uint {
    ($($ty:ty),*) => {
        $(impl From<$ty> for AbiValue {
            fn from(value: $ty) -> Self {
                AbiValue::Uint(U256::from(value))
            }
        })*
    };
}

macro_rules! impl_from_int {
    ($($ty:ty),*) => {
        $(impl From<$ty> for AbiValue {
            fn from(value: $ty) -> Self {
                AbiValue::int(value as i128)
            }
        })*
    };
}

impl_from_uint!(u8, u16, u32, u64, u128, U256);
impl_from_int!(i8, i16, i32, i64, i128);

impl From<bool> for AbiValue {
    fn from(value: bool) -> Self {
        AbiValue::Bool(value)
    }
}

impl From<Address> for AbiValue {
    fn from(value: Address) -> Self {
        AbiValue::Address(value)
    }
}

impl From<&str> for AbiValue {
    fn from(value: &str) -> Self {
        AbiValue::String(value.to_owned())
    }
}

impl From<String> for AbiValue {
    fn from(value: String) -> Self {
        AbiValue::String(value)
    }
}

impl From<Vec<u8>> for AbiValue {
    fn from(value: Vec<u8>) -> Self {
        AbiValue::Bytes(value)
    }
}

impl fmt::Display for AbiValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Uint(value) => write!(f, "{value}"),
            Self::Int(value) if is_negative(value) => {
                let magnitude = (!*value).overflowing_add(U256::one()).0;
                write!(f, "-{magnitude}")
            }
            Self::Int(value) => write!(f, "{value}"),
            Self::Address(address) => write!(f, "{}", encode_hex_address(address)),
            Self::Bool(value) => write!(f, "{value}"),
            Self::FixedBytes(bytes) | Self::Bytes(bytes) => write!(f, "0x{}", hex::encode(bytes)),
            Self::String(value) => write!(f, "{value:?}"),
            Self::Array(values) => write!(f, "[{}]", join(values)),
            Self::Tuple(values) => write!(f, "({})", join(values)),
        }
    }
}

fn join(values: &[AbiValue]) -> String {
    values
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
