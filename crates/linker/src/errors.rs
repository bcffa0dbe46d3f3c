use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkError {
    /// The placeholder is not 40 characters starting with `__`.
    InvalidPlaceholder(String),
    /// The replacement is not exactly 40 hex characters.
    InvalidAddress(String),
    /// Placeholders remain after linking. Holds the library names, or the raw
    /// placeholder when the name cannot be recovered from it.
    UnresolvedLibrary(Vec<String>),
}

impl fmt::Display for LinkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LinkError::InvalidPlaceholder(placeholder) => write!(
                f,
                "invalid library placeholder `{placeholder}`: expected 40 characters starting with `__`"
            ),
            LinkError::InvalidAddress(address) => write!(
                f,
                "invalid library address `{address}`: expected 40 hex characters without `0x`"
            ),
            LinkError::UnresolvedLibrary(libraries) => {
                write!(f, "unresolved libraries: {}", libraries.join(", "))
            }
        }
    }
}

impl std::error::Error for LinkError {}
