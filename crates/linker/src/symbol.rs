//! Library placeholder symbols.
//!
//! A placeholder has the width of a hex encoded address (40 characters) so
//! that substituting the address never shifts the bytes that follow it.

use common::utils::keccak;

pub const PLACEHOLDER_LEN: usize = 40;

const PREFIX: &str = "__";
/// Room left for the library name between the leading and trailing `__`.
const NAME_ROOM: usize = PLACEHOLDER_LEN - 2 * PREFIX.len();

/// The placeholder the compiler emits for `library_name`: `__`, the name
/// truncated to 36 bytes, then `_` up to 40 characters.
pub fn library_symbol(library_name: &str) -> String {
    let mut symbol = String::with_capacity(PLACEHOLDER_LEN);
    symbol.push_str(PREFIX);
    for c in library_name.chars() {
        if symbol.len() + c.len_utf8() > PREFIX.len() + NAME_ROOM {
            break;
        }
        symbol.push(c);
    }
    while symbol.len() < PLACEHOLDER_LEN {
        symbol.push('_');
    }
    symbol
}

/// The placeholder newer compilers emit: `__$`, the first 34 hex characters
/// of the keccak256 hash of the fully qualified name (`file.sol:Library`),
/// then `$__`.
pub fn hashed_library_symbol(fully_qualified_name: &str) -> String {
    let hash = keccak::full(fully_qualified_name.as_bytes());
    format!("__${}$__", &hash[..34])
}

/// Whether `token` is shaped like a placeholder.
pub fn is_placeholder(token: &str) -> bool {
    token.len() == PLACEHOLDER_LEN && token.starts_with(PREFIX)
}

/// Recovers the (possibly truncated) library name from a placeholder made
/// by [`library_symbol`]. Hashed placeholders carry no name.
pub fn library_name(placeholder: &str) -> Option<&str> {
    if !is_placeholder(placeholder) || placeholder.starts_with("__$") {
        return None;
    }
    let name = placeholder[PREFIX.len()..].trim_end_matches('_');
    (!name.is_empty()).then_some(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_symbols() {
        assert_eq!(library_symbol("a"), format!("__a{}", "_".repeat(37)));
        assert_eq!(library_symbol("aaa"), format!("__aaa{}", "_".repeat(35)));
        assert_eq!(
            library_symbol(&"a".repeat(40)),
            format!("__{}__", "a".repeat(36))
        );
    }

    #[rstest(name, case(""), case("Other"), case("SevenLibrary"), case("a_b_"), case("ünïcödé_library_name_that_is_long"))]
    fn always_placeholder_shaped(name: &str) {
        let symbol = library_symbol(name);
        assert_eq!(symbol.len(), PLACEHOLDER_LEN);
        assert!(is_placeholder(&symbol));
        assert!(symbol.ends_with("__"));
    }

    #[test]
    fn hashed() {
        let symbol = hashed_library_symbol("Other.sol:Other");
        assert!(is_placeholder(&symbol));
        assert!(symbol.starts_with("__$") && symbol.ends_with("$__"));
        assert_eq!(library_name(&symbol), None);
    }

    #[test]
    fn names_from_placeholders() {
        assert_eq!(library_name(&library_symbol("Other")), Some("Other"));
        assert_eq!(
            library_name(&library_symbol(&"b".repeat(50))),
            Some("b".repeat(36).as_str())
        );
        assert_eq!(library_name(&"_".repeat(40)), None);
        assert_eq!(library_name("__short"), None);
    }

    #[test]
    fn placeholder_shape() {
        assert!(is_placeholder(&format!("__a{}", "_".repeat(37))));
        assert!(!is_placeholder(&format!("_a{}", "_".repeat(38))));
        assert!(!is_placeholder(&format!("__a{}", "_".repeat(36))));
    }
}
