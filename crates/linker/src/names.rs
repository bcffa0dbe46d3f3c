//! Best-effort extraction of top level unit names from Solidity source.
//!
//! This is a token scan, not a parse: a `contract`, `library` or `interface`
//! keyword followed by an identifier is a declaration. Comments and string
//! literals are skipped, so keywords inside them are never reported.

use std::fmt;

use logos::Logos;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum DeclarationKind {
    Contract,
    Library,
    Interface,
}

impl fmt::Display for DeclarationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DeclarationKind::Contract => "contract",
            DeclarationKind::Library => "library",
            DeclarationKind::Interface => "interface",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Declaration {
    pub kind: DeclarationKind,
    pub name: String,
}

impl Declaration {
    pub fn new(kind: DeclarationKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Logos)]
enum TokenKind {
    #[regex(r"[ \t\r\n\f]+", logos::skip)]
    #[regex(r"//[^\n]*", logos::skip)]
    #[regex(r"/\*([^*]|\*+[^*/])*\*+/", logos::skip)]
    #[error]
    Error,

    #[token("contract")]
    Contract,
    #[token("library")]
    Library,
    #[token("interface")]
    Interface,

    #[regex("[a-zA-Z_$][a-zA-Z0-9_$]*")]
    Name,
    #[regex(r#""([^"\\]|\\.)*""#)]
    #[regex(r#"'([^'\\]|\\.)*'"#)]
    Text,
}

impl TokenKind {
    fn declaration_kind(self) -> Option<DeclarationKind> {
        match self {
            TokenKind::Contract => Some(DeclarationKind::Contract),
            TokenKind::Library => Some(DeclarationKind::Library),
            TokenKind::Interface => Some(DeclarationKind::Interface),
            _ => None,
        }
    }
}

/// Lazy iterator over the declarations of a source text, in source order.
#[derive(Clone)]
pub struct Declarations<'a> {
    inner: logos::Lexer<'a, TokenKind>,
}

impl<'a> Iterator for Declarations<'a> {
    type Item = Declaration;

    fn next(&mut self) -> Option<Self::Item> {
        let mut pending = None;
        while let Some(token) = self.inner.next() {
            match (pending, token) {
                (Some(kind), TokenKind::Name) => {
                    return Some(Declaration::new(kind, self.inner.slice()));
                }
                _ => pending = token.declaration_kind(),
            }
        }
        None
    }
}

/// Scans `src` for declarations. Calling this again on the same text
/// restarts the scan from the beginning.
pub fn declarations(src: &str) -> Declarations<'_> {
    Declarations {
        inner: TokenKind::lexer(src),
    }
}

/// Name of the last declared unit, which is the one deployed when the
/// caller does not pick a contract explicitly.
pub fn last_contract_name(src: &str) -> Option<String> {
    declarations(src).last().map(|decl| decl.name)
}
