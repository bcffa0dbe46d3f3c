//! Contract ABI model and codec.
//!
//! [`AbiContract`] is loaded from the JSON ABI emitted by the compiler and
//! owns a lookup table from function name (or full signature) to
//! [`AbiFunction`]. Each function encodes its call payload and decodes its
//! return payload with the head/tail rules in [`codec`].

pub mod codec;
pub mod contract;
pub mod function;
pub mod revert;
pub mod types;
pub mod value;

mod errors;
pub use errors::AbiError;

pub use contract::AbiContract;
pub use function::{AbiFunction, AbiFunctionSelector, AbiFunctionType, StateMutability};
pub use types::{AbiParam, AbiType};
pub use value::AbiValue;
