//! Contract proxies: deploy compiled artifacts with their libraries linked,
//! then call them by function name through the contract ABI.

mod artifact;
mod backend;
mod contract;
mod deployer;
mod errors;

pub use artifact::CompiledArtifact;
pub use backend::{Compiler, Executor};
pub use contract::Contract;
pub use deployer::{ContractBuilder, Deployer};
pub use errors::{CompileError, ContractError, ExecutionError, Operation};

pub use abi::{AbiContract, AbiValue};
pub use common::Address;
pub use linker::LinkMap;
