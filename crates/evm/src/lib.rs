//! Concrete backends for `solink-contract`: an in-memory EVM built on revm
//! and a compiler that drives `solc --standard-json`.

mod conversion;
mod executor;
mod solc;

pub use conversion::{from_revm_address, to_revm_address};
pub use executor::EvmExecutor;
pub use solc::SolcCompiler;

pub use revm;
