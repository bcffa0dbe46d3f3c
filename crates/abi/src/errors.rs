use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AbiError {
    /// The number of supplied values differs from the declared parameters.
    ArityMismatch { expected: usize, found: usize },
    /// A value's shape does not fit its declared type.
    TypeMismatch { expected: String, found: String },
    /// The payload ends before the data its header declares.
    DecodeTruncated { needed: usize, available: usize },
    /// The payload is long enough but not canonically encoded.
    InvalidData(String),
    UnknownFunction(String),
    AmbiguousFunction { name: String, candidates: Vec<String> },
    InvalidType(String),
    InvalidAbi(String),
}

impl fmt::Display for AbiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AbiError::ArityMismatch { expected, found } => {
                write!(f, "expected {expected} arguments, found {found}")
            }
            AbiError::TypeMismatch { expected, found } => {
                write!(f, "type mismatch: expected `{expected}`, found {found}")
            }
            AbiError::DecodeTruncated { needed, available } => write!(
                f,
                "payload truncated: {needed} bytes needed but only {available} available"
            ),
            AbiError::InvalidData(msg) => write!(f, "invalid payload: {msg}"),
            AbiError::UnknownFunction(name) => write!(f, "no function named `{name}` in ABI"),
            AbiError::AmbiguousFunction { name, candidates } => write!(
                f,
                "`{name}` is overloaded, use one of: {}",
                candidates.join(", ")
            ),
            AbiError::InvalidType(ty) => write!(f, "unsupported ABI type `{ty}`"),
            AbiError::InvalidAbi(msg) => write!(f, "invalid JSON ABI: {msg}"),
        }
    }
}

impl std::error::Error for AbiError {}
