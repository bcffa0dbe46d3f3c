use std::path::Path;

use common::Address;
use indexmap::IndexMap;

use crate::{CompileError, CompiledArtifact, ExecutionError};

/// Turns source text into deployable artifacts.
pub trait Compiler {
    /// Compiles `source`, resolving its imports against `import_root` when
    /// given. Artifacts are keyed by contract name, in declaration order.
    fn compile(
        &self,
        source: &str,
        import_root: Option<&Path>,
    ) -> Result<IndexMap<String, CompiledArtifact>, CompileError>;
}

/// Runs code against some world state.
pub trait Executor: Send + Sync {
    /// Runs `bytecode` followed by `constructor_payload` as init code and
    /// returns the address of the created account.
    fn deploy(&self, bytecode: &[u8], constructor_payload: &[u8])
        -> Result<Address, ExecutionError>;

    /// Sends `payload` to `address`. A `constant` call never persists its
    /// state changes.
    fn call(
        &self,
        address: &Address,
        payload: &[u8],
        constant: bool,
    ) -> Result<Vec<u8>, ExecutionError>;
}
