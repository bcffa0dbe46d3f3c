use rstest::rstest;
use solink_linker::{
    declarations, ensure_linked, library_symbol, link, resolve, Declaration, DeclarationKind,
    LinkError, LinkMap,
};
use test_utils::{fixture, setup_tracing, Level};

const BYTECODE: &str = "beef__a_____________________________________cafe";
const PLACEHOLDER: &str = "__a_____________________________________";

#[test]
fn names_in_declaration_order() {
    let names = declarations(fixture("solidity/contract_names.sol")).collect::<Vec<_>>();

    assert_eq!(
        names,
        vec![
            Declaration::new(DeclarationKind::Contract, "AContract"),
            Declaration::new(DeclarationKind::Library, "ALibrary"),
            Declaration::new(DeclarationKind::Contract, "WithSpace"),
            Declaration::new(DeclarationKind::Contract, "WithLineBreak"),
        ]
    );
}

#[test]
fn resolve_address() {
    let _guard = setup_tracing(Level::DEBUG);

    assert_eq!(
        resolve(
            BYTECODE,
            PLACEHOLDER,
            "1111111111111111111111111111111111111111"
        )
        .unwrap(),
        "beef1111111111111111111111111111111111111111cafe"
    );
}

#[rstest(
    address,
    case("0x1111111111111111111111111111111111111111"),
    case("111111111111111111111111111111111111111_")
)]
fn resolve_rejects_address(address: &str) {
    assert_eq!(
        resolve(BYTECODE, PLACEHOLDER, address),
        Err(LinkError::InvalidAddress(address.into()))
    );
}

#[test]
fn link_library_fixture() {
    let code = format!("6080{}5af4", library_symbol("SevenLibrary"));

    assert_eq!(
        ensure_linked(&code),
        Err(LinkError::UnresolvedLibrary(vec!["SevenLibrary".into()]))
    );

    let libraries: LinkMap = [("SevenLibrary", "00000000000000000000000000000000000000a7")]
        .into_iter()
        .collect();
    let linked = link(&code, &libraries).unwrap();

    assert_eq!(linked, format!("6080{}a75af4", "0".repeat(38)));
    assert_eq!(ensure_linked(&linked), Ok(()));
}
