use std::sync::{Mutex, PoisonError};

use common::address::encode_hex_address;
use common::Address;
use contract::{ExecutionError, Executor};
use revm::{
    primitives::{Bytes, Env, ExecutionResult, Output, ResultAndState, TransactTo},
    DatabaseCommit, EvmBuilder, InMemoryDB,
};
use tracing::{debug, trace};

use crate::conversion::{from_revm_address, to_revm_address};

/// Default sender of every transaction.
const DEFAULT_CALLER: u64 = 0x1000;

/// An [`Executor`] backed by revm over an in-memory database.
///
/// Transactions run one at a time; the database sits behind a mutex so the
/// executor can be shared between proxies and threads.
pub struct EvmExecutor {
    db: Mutex<InMemoryDB>,
    caller: Address,
}

impl Default for EvmExecutor {
    fn default() -> Self {
        Self::new(Address::from_low_u64_be(DEFAULT_CALLER))
    }
}

impl EvmExecutor {
    pub fn new(caller: Address) -> Self {
        Self {
            db: Mutex::new(InMemoryDB::default()),
            caller,
        }
    }

    pub fn caller(&self) -> Address {
        self.caller
    }

    fn transact(
        &self,
        transact_to: TransactTo,
        data: Vec<u8>,
        commit: bool,
    ) -> Result<ExecutionResult, ExecutionError> {
        let mut db = self.db.lock().unwrap_or_else(PoisonError::into_inner);

        let mut env = Env::default();
        env.tx.caller = to_revm_address(&self.caller);
        env.tx.transact_to = transact_to;
        env.tx.data = Bytes::from(data);

        let ResultAndState { result, state } = {
            let mut evm = EvmBuilder::default()
                .with_ref_db(&*db)
                .with_env(Box::new(env))
                .build();
            evm.transact()
                .map_err(|err| ExecutionError::Backend(format!("{err:?}")))?
        };

        if commit {
            db.commit(state);
        }
        Ok(result)
    }
}

impl Executor for EvmExecutor {
    fn deploy(
        &self,
        bytecode: &[u8],
        constructor_payload: &[u8],
    ) -> Result<Address, ExecutionError> {
        let mut init_code = bytecode.to_vec();
        init_code.extend_from_slice(constructor_payload);

        match self.transact(TransactTo::create(), init_code, true)? {
            ExecutionResult::Success {
                output: Output::Create(_, Some(address)),
                gas_used,
                ..
            } => {
                let address = from_revm_address(&address);
                debug!(address = %encode_hex_address(&address), gas_used, "created contract");
                Ok(address)
            }
            ExecutionResult::Success { output, .. } => Err(ExecutionError::Backend(format!(
                "create returned no address: {output:?}"
            ))),
            ExecutionResult::Revert { output, .. } => Err(ExecutionError::Reverted {
                output: output.to_vec(),
            }),
            ExecutionResult::Halt { reason, .. } => {
                Err(ExecutionError::Halted(format!("{reason:?}")))
            }
        }
    }

    fn call(
        &self,
        address: &Address,
        payload: &[u8],
        constant: bool,
    ) -> Result<Vec<u8>, ExecutionError> {
        let to = TransactTo::Call(to_revm_address(address));

        match self.transact(to, payload.to_vec(), !constant)? {
            ExecutionResult::Success {
                output, gas_used, ..
            } => {
                trace!(address = %encode_hex_address(address), gas_used, constant, "call succeeded");
                Ok(output.into_data().to_vec())
            }
            ExecutionResult::Revert { output, .. } => Err(ExecutionError::Reverted {
                output: output.to_vec(),
            }),
            ExecutionResult::Halt { reason, .. } => {
                Err(ExecutionError::Halted(format!("{reason:?}")))
            }
        }
    }
}
