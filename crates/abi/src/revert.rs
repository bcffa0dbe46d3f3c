//! The `Error(string)` payload that `revert("reason")` produces.

use crate::{codec, AbiType, AbiValue};

/// `keccak256("Error(string)")[..4]`
pub const ERROR_SELECTOR: [u8; 4] = [0x08, 0xc3, 0x79, 0xa0];

pub fn encode_revert_reason(reason: &str) -> Vec<u8> {
    let mut payload = ERROR_SELECTOR.to_vec();
    payload.extend(codec::encode(&[AbiType::String], &[reason.into()]).unwrap_or_default());
    payload
}

/// Extracts the reason string, or `None` if `output` is not an
/// `Error(string)` payload.
pub fn decode_revert_reason(output: &[u8]) -> Option<String> {
    let data = output.strip_prefix(&ERROR_SELECTOR)?;
    match codec::decode(&[AbiType::String], data).ok()?.pop()? {
        AbiValue::String(reason) => Some(reason),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::utils::keccak;
    use rstest::rstest;

    #[test]
    fn selector() {
        assert_eq!(
            keccak::partial(b"Error(string)", 4),
            hex::encode(ERROR_SELECTOR)
        );
    }

    #[rstest(reason_str, expected_encoding,
        case("Not enough Ether provided.", "0x08c379a00000000000000000000000000000000000000000000000000000000000000020000000000000000000000000000000000000000000000000000000000000001a4e6f7420656e6f7567682045746865722070726f76696465642e000000000000"),
        case("", "0x08c379a000000000000000000000000000000000000000000000000000000000000000200000000000000000000000000000000000000000000000000000000000000000"),
        case("foo", "0x08c379a000000000000000000000000000000000000000000000000000000000000000200000000000000000000000000000000000000000000000000000000000000003666f6f0000000000000000000000000000000000000000000000000000000000"),
    )]
    fn test_revert_reason_encoding(reason_str: &str, expected_encoding: &str) {
        let encoded = encode_revert_reason(reason_str);
        assert_eq!(format!("0x{}", hex::encode(&encoded)), expected_encoding);
        assert_eq!(decode_revert_reason(&encoded).as_deref(), Some(reason_str));
    }

    #[test]
    fn not_a_reason() {
        assert_eq!(decode_revert_reason(&[]), None);
        assert_eq!(decode_revert_reason(&[0x08, 0xc3, 0x79, 0xa0, 0x00]), None);
        assert_eq!(decode_revert_reason(&[0x4e, 0x48, 0x7b, 0x71]), None);
    }
}
