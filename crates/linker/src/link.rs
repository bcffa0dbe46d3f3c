use common::address::{encode_hex_address, is_hex_address};
use common::Address;
use indexmap::IndexMap;
use tracing::{debug, trace};

use crate::symbol::{is_placeholder, library_name, library_symbol, PLACEHOLDER_LEN};
use crate::LinkError;

/// Library name (or raw placeholder) to the 40 hex character address that
/// replaces its placeholder. Entries keep their insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkMap {
    entries: IndexMap<String, String>,
}

impl LinkMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a library address, replacing any previous entry for `library`.
    /// The address is validated when linking, not here.
    pub fn insert(&mut self, library: impl Into<String>, address: impl Into<String>) {
        self.entries.insert(library.into(), address.into());
    }

    pub fn insert_address(&mut self, library: impl Into<String>, address: &Address) {
        self.insert(library, encode_hex_address(address));
    }

    pub fn get(&self, library: &str) -> Option<&str> {
        self.entries.get(library).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(library, address)| (library.as_str(), address.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The placeholder an entry key stands for. Keys that already are
    /// placeholders are taken verbatim.
    pub fn placeholder_for(key: &str) -> String {
        if is_placeholder(key) {
            key.to_string()
        } else {
            library_symbol(key)
        }
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for LinkMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = LinkMap::new();
        map.extend(iter);
        map
    }
}

impl<K: Into<String>, V: Into<String>> Extend<(K, V)> for LinkMap {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (library, address) in iter {
            self.insert(library, address);
        }
    }
}

impl From<IndexMap<String, String>> for LinkMap {
    fn from(entries: IndexMap<String, String>) -> Self {
        Self { entries }
    }
}

/// Replaces every occurrence of `placeholder` in `bytecode` with `address`.
///
/// Bytecode without the placeholder is returned unchanged.
pub fn resolve(bytecode: &str, placeholder: &str, address: &str) -> Result<String, LinkError> {
    if !is_placeholder(placeholder) {
        return Err(LinkError::InvalidPlaceholder(placeholder.to_string()));
    }
    if !is_hex_address(address) {
        return Err(LinkError::InvalidAddress(address.to_string()));
    }

    let occurrences = bytecode.matches(placeholder).count();
    if occurrences == 0 {
        trace!(placeholder, "placeholder not present");
        return Ok(bytecode.to_string());
    }

    debug!(placeholder, address, occurrences, "linking library");
    Ok(bytecode.replace(placeholder, address))
}

/// Resolves every entry of `libraries` in turn.
///
/// Placeholders of libraries missing from the map are left in place; see
/// [`ensure_linked`].
pub fn link(bytecode: &str, libraries: &LinkMap) -> Result<String, LinkError> {
    libraries
        .iter()
        .try_fold(bytecode.to_string(), |code, (library, address)| {
            resolve(&code, &LinkMap::placeholder_for(library), address)
        })
}

/// Placeholders still present in `bytecode`, in order of first appearance.
pub fn unresolved_placeholders(bytecode: &str) -> Vec<String> {
    let bytes = bytecode.as_bytes();
    let mut found: Vec<String> = vec![];
    let mut idx = 0;

    while idx + 1 < bytes.len() {
        if bytes[idx] != b'_' || bytes[idx + 1] != b'_' {
            idx += 1;
            continue;
        }
        match bytecode.get(idx..idx + PLACEHOLDER_LEN) {
            Some(candidate) => {
                if !found.iter().any(|known| known == candidate) {
                    found.push(candidate.to_string());
                }
                idx += PLACEHOLDER_LEN;
            }
            None => idx += 1,
        }
    }

    found
}

/// Fails with [`LinkError::UnresolvedLibrary`] if any placeholder remains.
pub fn ensure_linked(bytecode: &str) -> Result<(), LinkError> {
    let unresolved = unresolved_placeholders(bytecode);
    if unresolved.is_empty() {
        return Ok(());
    }

    Err(LinkError::UnresolvedLibrary(
        unresolved
            .iter()
            .map(|placeholder| {
                library_name(placeholder)
                    .unwrap_or(placeholder.as_str())
                    .to_string()
            })
            .collect(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    const LIB_A: &str = "__a_____________________________________";
    const ADDR_BEEF: &str = "beefbeefbeefbeefbeefbeefbeefbeefbeefbeef";
    const ADDR_CAFE: &str = "cafecafecafecafecafecafecafecafecafecafe";

    fn code_with(placeholder: &str) -> String {
        format!("6060{placeholder}5af4{placeholder}00")
    }

    #[test]
    fn replaces_every_occurrence() {
        let linked = resolve(&code_with(LIB_A), LIB_A, ADDR_BEEF).unwrap();
        assert_eq!(linked, format!("6060{ADDR_BEEF}5af4{ADDR_BEEF}00"));
        assert_eq!(linked.len(), code_with(LIB_A).len());
    }

    #[test]
    fn relinking_has_no_effect() {
        let linked = resolve(&code_with(LIB_A), LIB_A, ADDR_BEEF).unwrap();
        let relinked = resolve(&linked, LIB_A, ADDR_CAFE).unwrap();
        assert_eq!(relinked, linked);
    }

    #[rstest(
        bytecode,
        case(""),
        case("6060604052"),
        case("__b_____________________________________")
    )]
    fn absent_placeholder_is_not_an_error(bytecode: &str) {
        assert_eq!(resolve(bytecode, LIB_A, ADDR_BEEF).unwrap(), bytecode);
    }

    #[rstest(
        address,
        case("111111111111111111111111111111111111111_"),
        case("1111111111111111111111111111111111111111_"),
        case("1111"),
        case("0x11111111111111111111111111111111111111"),
        case("0x1111111111111111111111111111111111111111"),
        case("")
    )]
    fn invalid_address(address: &str) {
        assert_eq!(
            resolve(&code_with(LIB_A), LIB_A, address),
            Err(LinkError::InvalidAddress(address.to_string()))
        );
    }

    #[rstest(
        placeholder,
        case("__a"),
        case("a_______________________________________"),
        case("__a______________________________________")
    )]
    fn invalid_placeholder(placeholder: &str) {
        assert_eq!(
            resolve("6060", placeholder, ADDR_BEEF),
            Err(LinkError::InvalidPlaceholder(placeholder.to_string()))
        );
    }

    #[test]
    fn mixed_case_addresses_are_kept_verbatim() {
        let address = "BeefBeefBeefBeefBeefBeefBeefBeefBeefBeef";
        let linked = resolve(&code_with(LIB_A), LIB_A, address).unwrap();
        assert!(linked.contains(address));
    }

    #[test]
    fn link_order_does_not_matter() {
        let lib_b = library_symbol("b");
        let code = format!("{LIB_A}00{lib_b}");

        let forward: LinkMap = [("a", ADDR_BEEF), ("b", ADDR_CAFE)].into_iter().collect();
        let backward: LinkMap = [("b", ADDR_CAFE), ("a", ADDR_BEEF)].into_iter().collect();

        let linked = link(&code, &forward).unwrap();
        assert_eq!(linked, format!("{ADDR_BEEF}00{ADDR_CAFE}"));
        assert_eq!(link(&code, &backward).unwrap(), linked);
    }

    #[test]
    fn raw_placeholder_keys() {
        let hashed = crate::symbol::hashed_library_symbol("Other.sol:Other");
        let mut libraries = LinkMap::new();
        libraries.insert(hashed.clone(), ADDR_CAFE);

        assert_eq!(
            link(&format!("00{hashed}00"), &libraries).unwrap(),
            format!("00{ADDR_CAFE}00")
        );
    }

    #[test]
    fn insert_address() {
        let mut libraries = LinkMap::new();
        libraries.insert_address("Other", &Address::from_low_u64_be(1));
        assert_eq!(
            libraries.get("Other"),
            Some("0000000000000000000000000000000000000001")
        );
        assert_eq!(libraries.len(), 1);
    }

    #[test]
    fn reports_unresolved() {
        let lib_b = library_symbol("b");
        let code = format!("60{LIB_A}01{lib_b}02{LIB_A}");

        assert_eq!(unresolved_placeholders(&code), vec![LIB_A.to_string(), lib_b]);
        assert_eq!(
            ensure_linked(&code),
            Err(LinkError::UnresolvedLibrary(vec!["a".into(), "b".into()]))
        );

        let libraries: LinkMap = [("a", ADDR_BEEF)].into_iter().collect();
        assert_eq!(
            ensure_linked(&link(&code, &libraries).unwrap()),
            Err(LinkError::UnresolvedLibrary(vec!["b".into()]))
        );

        assert!(unresolved_placeholders("6060604052").is_empty());
        assert_eq!(ensure_linked("6060604052"), Ok(()));
    }
}
