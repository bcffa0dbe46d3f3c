//! 20-byte account addresses and their hex text form.
//!
//! At every boundary solink touches, an address is written as exactly 40
//! hexadecimal characters without a `0x` prefix. Letter case is ignored.

pub use primitive_types::H160;

pub type Address = H160;

/// Number of hex characters in a textual address.
pub const ADDRESS_HEX_LEN: usize = 40;

/// Returns `true` if `s` is exactly 40 hex characters.
pub fn is_hex_address(s: &str) -> bool {
    s.len() == ADDRESS_HEX_LEN && s.bytes().all(|b| b.is_ascii_hexdigit())
}

/// Parses a 40 character hex address. A `0x` prefix is rejected.
pub fn parse_hex_address(s: &str) -> Option<Address> {
    if !is_hex_address(s) {
        return None;
    }
    let bytes = hex::decode(s).ok()?;
    Some(Address::from_slice(&bytes))
}

/// Lowercase hex form of `address`, without a prefix.
pub fn encode_hex_address(address: &Address) -> String {
    hex::encode(address.as_bytes())
}
