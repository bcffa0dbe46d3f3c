//! Head/tail ABI encoding of value sequences.
//!
//! Static values are written in place in the head of their enclosing
//! sequence. Dynamic values leave a 32 byte offset in the head (relative to
//! the start of the sequence) and are appended to the tail.

use common::address::parse_hex_address;
use common::Address;
use primitive_types::U256;

use crate::value::is_negative;
use crate::{AbiError, AbiType, AbiValue};

const WORD: usize = 32;

/// Encodes `values` as a sequence of `types`, without a selector.
pub fn encode(types: &[AbiType], values: &[AbiValue]) -> Result<Vec<u8>, AbiError> {
    if types.len() != values.len() {
        return Err(AbiError::ArityMismatch {
            expected: types.len(),
            found: values.len(),
        });
    }
    let types: Vec<&AbiType> = types.iter().collect();
    encode_sequence(&types, values)
}

/// Decodes a sequence of `types` from `data`.
pub fn decode(types: &[AbiType], data: &[u8]) -> Result<Vec<AbiValue>, AbiError> {
    let types: Vec<&AbiType> = types.iter().collect();
    decode_sequence(&types, data, 0)
}

pub fn word(value: U256) -> [u8; WORD] {
    let mut output = [0_u8; WORD];
    value.to_big_endian(&mut output);
    output
}

fn encode_sequence(types: &[&AbiType], values: &[AbiValue]) -> Result<Vec<u8>, AbiError> {
    let head_len = types
        .iter()
        .fold(0, |acc: usize, ty| acc.saturating_add(ty.header_size()));
    let mut head = vec![];
    let mut tail = vec![];

    for (ty, value) in types.iter().zip(values) {
        let encoded = encode_value(ty, value)?;
        if ty.is_static() {
            head.extend(encoded);
        } else {
            head.extend_from_slice(&word(U256::from(head_len + tail.len())));
            tail.extend(encoded);
        }
    }

    head.extend(tail);
    Ok(head)
}

fn encode_value(ty: &AbiType, value: &AbiValue) -> Result<Vec<u8>, AbiError> {
    let mismatch = || AbiError::TypeMismatch {
        expected: ty.selector_type_name(),
        found: describe(value),
    };

    let encoded = match (ty, value) {
        (AbiType::UInt(bits), AbiValue::Uint(int)) if int.bits() <= *bits => word(*int).to_vec(),
        (AbiType::UInt(bits), AbiValue::Int(int))
            if !is_negative(int) && int.bits() <= *bits =>
        {
            word(*int).to_vec()
        }
        (AbiType::Int(bits), AbiValue::Int(int)) if fits_signed(int, *bits) => word(*int).to_vec(),
        (AbiType::Int(bits), AbiValue::Uint(int)) if int.bits() < *bits => word(*int).to_vec(),

        (AbiType::Address, AbiValue::Address(address)) => address_word(address).to_vec(),
        (AbiType::Address, AbiValue::String(text)) => {
            let text = text.strip_prefix("0x").unwrap_or(text);
            let address = parse_hex_address(text).ok_or_else(mismatch)?;
            address_word(&address).to_vec()
        }

        (AbiType::Bool, AbiValue::Bool(flag)) => word(U256::from(*flag as u8)).to_vec(),

        (AbiType::FixedBytes(size), AbiValue::FixedBytes(bytes) | AbiValue::Bytes(bytes))
            if bytes.len() == *size =>
        {
            pad_right(bytes)
        }

        (AbiType::Bytes, AbiValue::Bytes(bytes)) => encode_dynamic_bytes(bytes),
        (AbiType::String, AbiValue::String(text)) => encode_dynamic_bytes(text.as_bytes()),

        (AbiType::Array { elem_ty, len }, AbiValue::Array(values)) if values.len() == *len => {
            let types = vec![elem_ty.as_ref(); *len];
            encode_sequence(&types, values)?
        }
        (AbiType::DynArray(elem_ty), AbiValue::Array(values)) => {
            let types = vec![elem_ty.as_ref(); values.len()];
            let mut encoded = word(U256::from(values.len())).to_vec();
            encoded.extend(encode_sequence(&types, values)?);
            encoded
        }
        (AbiType::Tuple(fields), AbiValue::Tuple(values)) if fields.len() == values.len() => {
            let types: Vec<&AbiType> = fields.iter().map(|field| &field.ty).collect();
            encode_sequence(&types, values)?
        }

        _ => return Err(mismatch()),
    };

    Ok(encoded)
}

fn describe(value: &AbiValue) -> String {
    match value {
        AbiValue::Array(values) | AbiValue::Tuple(values) => {
            format!("{} of {} elements", value.kind(), values.len())
        }
        AbiValue::Bytes(bytes) | AbiValue::FixedBytes(bytes) => {
            format!("{} of length {}", value.kind(), bytes.len())
        }
        _ => format!("{} `{}`", value.kind(), value),
    }
}

fn fits_signed(value: &U256, bits: usize) -> bool {
    if bits >= 256 {
        return true;
    }
    let magnitude = if is_negative(value) { !*value } else { *value };
    magnitude.bits() < bits
}

fn address_word(address: &Address) -> [u8; WORD] {
    let mut output = [0_u8; WORD];
    output[12..].copy_from_slice(address.as_bytes());
    output
}

fn pad_right(bytes: &[u8]) -> Vec<u8> {
    let padded_len = bytes.len().div_ceil(WORD) * WORD;
    let mut output = bytes.to_vec();
    output.resize(padded_len, 0);
    output
}

fn encode_dynamic_bytes(bytes: &[u8]) -> Vec<u8> {
    let mut output = word(U256::from(bytes.len())).to_vec();
    output.extend(pad_right(bytes));
    output
}

fn decode_sequence(
    types: &[&AbiType],
    data: &[u8],
    base: usize,
) -> Result<Vec<AbiValue>, AbiError> {
    let mut values = Vec::with_capacity(types.len());
    let mut head = base;

    for ty in types {
        let value = if ty.is_static() {
            decode_value(ty, data, head)?
        } else {
            let offset = read_usize(data, head)?;
            let start = base.checked_add(offset).ok_or(AbiError::DecodeTruncated {
                needed: usize::MAX,
                available: data.len(),
            })?;
            decode_value(ty, data, start)?
        };
        values.push(value);
        head += ty.header_size();
    }

    Ok(values)
}

fn decode_value(ty: &AbiType, data: &[u8], at: usize) -> Result<AbiValue, AbiError> {
    let value = match ty {
        AbiType::UInt(bits) => {
            let int = U256::from_big_endian(read_word(data, at)?);
            if int.bits() > *bits {
                return Err(AbiError::InvalidData(format!(
                    "value {int} does not fit in uint{bits}"
                )));
            }
            AbiValue::Uint(int)
        }
        AbiType::Int(bits) => {
            let int = U256::from_big_endian(read_word(data, at)?);
            if sign_extend(int, *bits) != int {
                return Err(AbiError::InvalidData(format!(
                    "word {int:#x} is not a sign extended int{bits}"
                )));
            }
            AbiValue::Int(int)
        }
        AbiType::Address => {
            let word = read_word(data, at)?;
            AbiValue::Address(Address::from_slice(&word[12..]))
        }
        AbiType::Bool => match U256::from_big_endian(read_word(data, at)?) {
            int if int.is_zero() => AbiValue::Bool(false),
            int if int == U256::one() => AbiValue::Bool(true),
            int => return Err(AbiError::InvalidData(format!("{int} is not a valid bool"))),
        },
        AbiType::FixedBytes(size) => AbiValue::FixedBytes(read_word(data, at)?[..*size].to_vec()),
        AbiType::Bytes => AbiValue::Bytes(read_dynamic_bytes(data, at)?.to_vec()),
        AbiType::String => {
            let bytes = read_dynamic_bytes(data, at)?;
            let text = String::from_utf8(bytes.to_vec())
                .map_err(|err| AbiError::InvalidData(format!("string is not utf-8: {err}")))?;
            AbiValue::String(text)
        }
        AbiType::Array { elem_ty, len } => {
            check_array_head(elem_ty, *len, data, at)?;
            let types = vec![elem_ty.as_ref(); *len];
            AbiValue::Array(decode_sequence(&types, data, at)?)
        }
        AbiType::DynArray(elem_ty) => {
            let len = read_usize(data, at)?;
            let start = at + WORD;
            check_array_head(elem_ty, len, data, start)?;
            let types = vec![elem_ty.as_ref(); len];
            AbiValue::Array(decode_sequence(&types, data, start)?)
        }
        AbiType::Tuple(fields) => {
            let types: Vec<&AbiType> = fields.iter().map(|field| &field.ty).collect();
            AbiValue::Tuple(decode_sequence(&types, data, at)?)
        }
    };

    Ok(value)
}

/// Fails unless the heads of `len` elements starting at `start` fit in `data`.
fn check_array_head(elem_ty: &AbiType, len: usize, data: &[u8], start: usize) -> Result<(), AbiError> {
    let needed = len
        .checked_mul(elem_ty.header_size())
        .and_then(|size| size.checked_add(start))
        .unwrap_or(usize::MAX);
    if needed > data.len() {
        return Err(AbiError::DecodeTruncated {
            needed,
            available: data.len(),
        });
    }
    Ok(())
}

fn sign_extend(int: U256, bits: usize) -> U256 {
    if bits >= 256 {
        return int;
    }
    let mask = (U256::one() << bits) - U256::one();
    if int.bit(bits - 1) {
        int | !mask
    } else {
        int & mask
    }
}

fn read_word(data: &[u8], at: usize) -> Result<&[u8], AbiError> {
    let end = at.checked_add(WORD).unwrap_or(usize::MAX);
    data.get(at..end).ok_or(AbiError::DecodeTruncated {
        needed: end,
        available: data.len(),
    })
}

/// Reads a length or offset word. Values past the end of `data` can never
/// be satisfied and are reported as truncation.
fn read_usize(data: &[u8], at: usize) -> Result<usize, AbiError> {
    let int = U256::from_big_endian(read_word(data, at)?);
    if int > U256::from(data.len()) {
        let needed = if int.bits() <= 64 {
            usize::try_from(int.low_u64()).unwrap_or(usize::MAX)
        } else {
            usize::MAX
        };
        return Err(AbiError::DecodeTruncated {
            needed,
            available: data.len(),
        });
    }
    Ok(int.as_usize())
}

fn read_dynamic_bytes(data: &[u8], at: usize) -> Result<&[u8], AbiError> {
    let len = read_usize(data, at)?;
    let start = at + WORD;
    let end = start.checked_add(len).unwrap_or(usize::MAX);
    data.get(start..end).ok_or(AbiError::DecodeTruncated {
        needed: end,
        available: data.len(),
    })
}
