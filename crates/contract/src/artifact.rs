use abi::AbiContract;
use indexmap::IndexMap;
use linker::{LinkError, LinkMap};

/// Compiler output for one contract.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledArtifact {
    pub name: String,
    /// Hex encoded init code, without `0x`. May contain library placeholders.
    pub bytecode: String,
    pub abi: AbiContract,
    pub metadata: serde_json::Value,
    /// Library name to the placeholder the compiler used for it. Only needed
    /// when the placeholder cannot be derived from the name alone.
    pub link_references: IndexMap<String, String>,
}

impl CompiledArtifact {
    pub fn new(name: impl Into<String>, bytecode: impl Into<String>, abi: AbiContract) -> Self {
        Self {
            name: name.into(),
            bytecode: bytecode.into(),
            abi,
            metadata: serde_json::Value::Null,
            link_references: IndexMap::new(),
        }
    }

    /// Libraries this artifact needs linked before it can be deployed.
    pub fn libraries(&self) -> Vec<String> {
        match linker::ensure_linked(&self.bytecode) {
            Ok(()) => vec![],
            Err(LinkError::UnresolvedLibrary(names)) => self.library_names(names),
            Err(_) => vec![],
        }
    }

    /// Links `libraries` into the bytecode. Fails if any placeholder is
    /// left over.
    pub fn link(&self, libraries: &LinkMap) -> Result<String, LinkError> {
        let mut resolved = LinkMap::new();
        for (library, address) in libraries.iter() {
            if let Some(placeholder) = self.link_references.get(library) {
                resolved.insert(placeholder.as_str(), address);
            }
            resolved.insert(library, address);
        }

        let code = linker::link(&self.bytecode, &resolved)?;
        linker::ensure_linked(&code)
            .map_err(|err| match err {
                LinkError::UnresolvedLibrary(names) => {
                    LinkError::UnresolvedLibrary(self.library_names(names))
                }
                err => err,
            })
            .map(|()| code)
    }

    /// Swaps raw placeholders for the library names they stand for.
    fn library_names(&self, unresolved: Vec<String>) -> Vec<String> {
        unresolved
            .into_iter()
            .map(|name| {
                self.link_references
                    .iter()
                    .find(|(_, placeholder)| **placeholder == name)
                    .map(|(library, _)| library.clone())
                    .unwrap_or(name)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use linker::{hashed_library_symbol, library_symbol};

    const ADDRESS: &str = "00000000000000000000000000000000000000aa";

    #[test]
    fn links_by_name() {
        let artifact = CompiledArtifact::new(
            "user",
            format!("60{}00", library_symbol("Other")),
            AbiContract::default(),
        );
        assert_eq!(artifact.libraries(), vec!["Other".to_string()]);

        let libraries: LinkMap = [("Other", ADDRESS)].into_iter().collect();
        assert_eq!(artifact.link(&libraries).unwrap(), format!("60{ADDRESS}00"));
    }

    #[test]
    fn links_hashed_placeholders_through_references() {
        let placeholder = hashed_library_symbol("lib.sol:Other");
        let mut artifact = CompiledArtifact::new(
            "user",
            format!("60{placeholder}00"),
            AbiContract::default(),
        );
        artifact
            .link_references
            .insert("Other".into(), placeholder.clone());

        assert_eq!(
            artifact.link(&LinkMap::new()),
            Err(LinkError::UnresolvedLibrary(vec!["Other".into()]))
        );

        let libraries: LinkMap = [("Other", ADDRESS)].into_iter().collect();
        assert_eq!(artifact.link(&libraries).unwrap(), format!("60{ADDRESS}00"));
    }
}
