use std::sync::{Arc, PoisonError, RwLock};

use abi::{revert::decode_revert_reason, AbiContract, AbiFunction, AbiValue};
use common::address::encode_hex_address;
use common::Address;
use linker::LinkMap;
use tracing::{debug, trace};

use crate::{CompiledArtifact, ContractError, ExecutionError, Executor, Operation};

enum ContractState {
    Unbound(CompiledArtifact),
    Bound(Address),
}

/// A contract reached through its ABI.
///
/// A proxy starts out unbound, holding the compiled artifact, and becomes
/// bound to an address by [`Contract::deploy`]. That transition happens at
/// most once and runs under a write lock, so other threads never observe a
/// half deployed contract.
pub struct Contract {
    name: String,
    abi: AbiContract,
    executor: Arc<dyn Executor>,
    state: RwLock<ContractState>,
}

impl Contract {
    pub fn new(executor: Arc<dyn Executor>, artifact: CompiledArtifact) -> Self {
        Self {
            name: artifact.name.clone(),
            abi: artifact.abi.clone(),
            executor,
            state: RwLock::new(ContractState::Unbound(artifact)),
        }
    }

    /// Wraps a contract that is already deployed at `address`.
    pub fn at(
        executor: Arc<dyn Executor>,
        name: impl Into<String>,
        address: Address,
        abi: AbiContract,
    ) -> Self {
        Self {
            name: name.into(),
            abi,
            executor,
            state: RwLock::new(ContractState::Bound(address)),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn abi(&self) -> &AbiContract {
        &self.abi
    }

    /// `None` until the contract is deployed.
    pub fn address(&self) -> Option<Address> {
        match &*self.state.read().unwrap_or_else(PoisonError::into_inner) {
            ContractState::Bound(address) => Some(*address),
            ContractState::Unbound(_) => None,
        }
    }

    pub fn is_deployed(&self) -> bool {
        self.address().is_some()
    }

    /// Links `libraries` into the bytecode, encodes the constructor
    /// arguments and deploys. Nothing is sent to the executor unless every
    /// library placeholder was resolved.
    pub fn deploy(
        &self,
        libraries: &LinkMap,
        constructor_args: &[AbiValue],
    ) -> Result<Address, ContractError> {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        let artifact = match &*state {
            ContractState::Unbound(artifact) => artifact,
            ContractState::Bound(_) => {
                return Err(ContractError::AlreadyDeployed(self.name.clone()))
            }
        };

        let linked = artifact.link(libraries)?;
        let constructor_payload = self.abi.encode_constructor(constructor_args)?;
        let bytecode =
            hex::decode(&linked).map_err(|err| ContractError::InvalidBytecode(err.to_string()))?;

        let address = self
            .executor
            .deploy(&bytecode, &constructor_payload)
            .map_err(|source| ContractError::Execution {
                operation: Operation::Deploy(self.name.clone()),
                source,
            })?;

        debug!(
            contract = %self.name,
            address = %encode_hex_address(&address),
            "deployed"
        );
        *state = ContractState::Bound(address);
        Ok(address)
    }

    pub fn build_calldata(&self, name: &str, args: &[AbiValue]) -> Result<Vec<u8>, ContractError> {
        Ok(self.abi.function(name)?.encode_input(args)?)
    }

    /// Calls `name` and returns the raw output.
    pub fn capture_call(&self, name: &str, args: &[AbiValue]) -> Result<Vec<u8>, ContractError> {
        let function = self.abi.function(name)?;
        self.dispatch(function, args)
    }

    /// Calls `name` and decodes every output value.
    pub fn call(&self, name: &str, args: &[AbiValue]) -> Result<Vec<AbiValue>, ContractError> {
        let function = self.abi.function(name)?;
        let output = self.dispatch(function, args)?;
        Ok(function.decode_output(&output)?)
    }

    /// Calls `name` and returns its first output, if it declares any.
    pub fn call_single(
        &self,
        name: &str,
        args: &[AbiValue],
    ) -> Result<Option<AbiValue>, ContractError> {
        Ok(self.call(name, args)?.into_iter().next())
    }

    fn dispatch(&self, function: &AbiFunction, args: &[AbiValue]) -> Result<Vec<u8>, ContractError> {
        let address = self
            .address()
            .ok_or_else(|| ContractError::NotDeployed(self.name.clone()))?;
        let payload = function.encode_input(args)?;
        let signature = function.selector().selector_signature().to_string();
        let constant = function.state_mutability().is_constant();

        trace!(contract = %self.name, function = %signature, constant, "call");
        self.executor
            .call(&address, &payload, constant)
            .map_err(|err| match err {
                ExecutionError::Reverted { output } => ContractError::CallReverted {
                    reason: decode_revert_reason(&output),
                    function: signature,
                },
                source => ContractError::Execution {
                    operation: Operation::Call(signature),
                    source,
                },
            })
    }
}
