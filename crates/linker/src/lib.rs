//! Static linking of library addresses into hex encoded bytecode.
//!
//! A contract that calls into a library is compiled before the library has
//! an address, so the compiler leaves a 40 character placeholder wherever
//! the address belongs. [`link`] substitutes real addresses for those
//! placeholders once the libraries are deployed.

pub mod link;
pub mod names;
pub mod symbol;

mod errors;
pub use errors::LinkError;

pub use link::{ensure_linked, link, resolve, unresolved_placeholders, LinkMap};
pub use names::{declarations, last_contract_name, Declaration, DeclarationKind};
pub use symbol::{
    hashed_library_symbol, is_placeholder, library_name, library_symbol, PLACEHOLDER_LEN,
};
