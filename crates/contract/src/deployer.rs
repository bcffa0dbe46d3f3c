use std::{
    fs,
    path::{Path, PathBuf},
    sync::Arc,
};

use abi::AbiValue;
use indexmap::IndexMap;
use linker::{last_contract_name, LinkMap};
use tracing::debug;

use crate::{CompileError, CompiledArtifact, Compiler, Contract, ContractError, Executor};

/// A compiler and an executor used together: compiles source, links and
/// deploys the result, and hands back bound proxies.
pub struct Deployer<C> {
    compiler: C,
    executor: Arc<dyn Executor>,
}

impl<C: Compiler> Deployer<C> {
    pub fn new(compiler: C, executor: Arc<dyn Executor>) -> Self {
        Self { compiler, executor }
    }

    pub fn compiler(&self) -> &C {
        &self.compiler
    }

    pub fn executor(&self) -> &Arc<dyn Executor> {
        &self.executor
    }

    /// Starts describing a contract compiled from `source`.
    pub fn source(&self, source: impl Into<String>) -> ContractBuilder<'_, C> {
        ContractBuilder::new(self, Source::Text(source.into()))
    }

    /// Starts describing a contract compiled from the file at `path`. Its
    /// imports are resolved relative to the file's directory.
    pub fn file(&self, path: impl Into<PathBuf>) -> ContractBuilder<'_, C> {
        ContractBuilder::new(self, Source::File(path.into()))
    }

    /// Compiles `source`, links `libraries` and deploys the last declared
    /// contract with `constructor_args`.
    pub fn abi_contract(
        &self,
        source: &str,
        libraries: &LinkMap,
        constructor_args: &[AbiValue],
    ) -> Result<Contract, ContractError> {
        self.source(source)
            .libraries(libraries.clone())
            .args(constructor_args.to_vec())
            .deploy()
    }
}

enum Source {
    Text(String),
    File(PathBuf),
}

/// Options for compiling and deploying one contract.
pub struct ContractBuilder<'a, C> {
    deployer: &'a Deployer<C>,
    source: Source,
    import_root: Option<PathBuf>,
    contract_name: Option<String>,
    libraries: LinkMap,
    args: Vec<AbiValue>,
}

impl<'a, C: Compiler> ContractBuilder<'a, C> {
    fn new(deployer: &'a Deployer<C>, source: Source) -> Self {
        Self {
            deployer,
            source,
            import_root: None,
            contract_name: None,
            libraries: LinkMap::new(),
            args: vec![],
        }
    }

    /// Directory that imports are resolved against.
    pub fn import_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.import_root = Some(root.into());
        self
    }

    /// Picks the contract to deploy. Defaults to the last one declared.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.contract_name = Some(name.into());
        self
    }

    pub fn libraries(mut self, libraries: LinkMap) -> Self {
        self.libraries.extend(libraries.iter());
        self
    }

    pub fn library(mut self, name: impl Into<String>, address: impl Into<String>) -> Self {
        self.libraries.insert(name, address);
        self
    }

    pub fn args(mut self, args: Vec<AbiValue>) -> Self {
        self.args = args;
        self
    }

    /// Compiles the source into an unbound proxy.
    pub fn build(self) -> Result<Contract, ContractError> {
        let (artifact, builder) = self.compile()?;
        Ok(Contract::new(builder.deployer.executor.clone(), artifact))
    }

    pub fn deploy(self) -> Result<Contract, ContractError> {
        let (artifact, builder) = self.compile()?;
        let contract = Contract::new(builder.deployer.executor.clone(), artifact);
        contract.deploy(&builder.libraries, &builder.args)?;
        Ok(contract)
    }

    fn compile(self) -> Result<(CompiledArtifact, Self), ContractError> {
        let (text, import_root) = match &self.source {
            Source::Text(text) => (text.clone(), self.import_root.clone()),
            Source::File(path) => {
                let text = fs::read_to_string(path).map_err(|error| CompileError::ReadSource {
                    path: path.clone(),
                    error,
                })?;
                let root = self
                    .import_root
                    .clone()
                    .or_else(|| path.parent().map(Path::to_path_buf));
                (text, root)
            }
        };

        let mut artifacts = self
            .deployer
            .compiler
            .compile(&text, import_root.as_deref())?;
        let artifact = select(&mut artifacts, self.contract_name.as_deref(), &text)?;
        debug!(contract = %artifact.name, "compiled");
        Ok((artifact, self))
    }
}

/// Takes the named artifact, or the one for the last contract declared in
/// `source` when no name is given.
fn select(
    artifacts: &mut IndexMap<String, CompiledArtifact>,
    name: Option<&str>,
    source: &str,
) -> Result<CompiledArtifact, ContractError> {
    let name = match name {
        Some(name) => name.to_string(),
        None => match last_contract_name(source)
            .filter(|name| artifacts.contains_key(name))
            .or_else(|| artifacts.keys().last().cloned())
        {
            Some(name) => name,
            None => return Err(CompileError::NoContracts.into()),
        },
    };

    artifacts
        .shift_remove(&name)
        .ok_or_else(|| ContractError::UnknownContract {
            available: artifacts.keys().cloned().collect(),
            name,
        })
}
