use std::{fmt, io, path::PathBuf};

use abi::AbiError;
use linker::LinkError;

#[derive(Debug)]
pub enum CompileError {
    /// A source file could not be read.
    ReadSource { path: PathBuf, error: io::Error },
    /// The compiler process could not be started or talked to.
    Io { program: String, error: io::Error },
    /// The compiler rejected the source. Holds its formatted messages.
    Diagnostics(Vec<String>),
    /// The compiler output could not be understood.
    InvalidOutput(String),
    /// The source compiled but declares no contract.
    NoContracts,
}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompileError::ReadSource { path, error } => {
                write!(f, "failed to read `{}`: {error}", path.display())
            }
            CompileError::Io { program, error } => {
                write!(f, "failed to run `{program}`: {error}")
            }
            CompileError::Diagnostics(messages) => {
                write!(f, "compilation failed:\n{}", messages.join("\n"))
            }
            CompileError::InvalidOutput(message) => {
                write!(f, "unexpected compiler output: {message}")
            }
            CompileError::NoContracts => f.write_str("source declares no contracts"),
        }
    }
}

impl std::error::Error for CompileError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CompileError::ReadSource { error, .. } | CompileError::Io { error, .. } => {
                Some(error)
            }
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionError {
    /// Execution ended in `REVERT`; `output` is the revert payload.
    Reverted { output: Vec<u8> },
    /// Execution stopped abnormally (out of gas, invalid opcode, ...).
    Halted(String),
    /// The executor itself failed.
    Backend(String),
}

impl fmt::Display for ExecutionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExecutionError::Reverted { output } => {
                write!(f, "execution reverted (output 0x{})", hex::encode(output))
            }
            ExecutionError::Halted(reason) => write!(f, "execution halted: {reason}"),
            ExecutionError::Backend(message) => write!(f, "executor failure: {message}"),
        }
    }
}

impl std::error::Error for ExecutionError {}

/// What the proxy was doing when a collaborator failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    Deploy(String),
    Call(String),
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Deploy(contract) => write!(f, "deploying `{contract}`"),
            Operation::Call(function) => write!(f, "calling `{function}`"),
        }
    }
}

#[derive(Debug)]
pub enum ContractError {
    Abi(AbiError),
    Link(LinkError),
    Compile(CompileError),
    /// The linked bytecode is not valid hex.
    InvalidBytecode(String),
    Execution {
        operation: Operation,
        source: ExecutionError,
    },
    /// A call reverted. `reason` is the `Error(string)` message, if any.
    CallReverted {
        function: String,
        reason: Option<String>,
    },
    NotDeployed(String),
    AlreadyDeployed(String),
    UnknownContract {
        name: String,
        available: Vec<String>,
    },
}

impl fmt::Display for ContractError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContractError::Abi(err) => write!(f, "{err}"),
            ContractError::Link(err) => write!(f, "{err}"),
            ContractError::Compile(err) => write!(f, "{err}"),
            ContractError::InvalidBytecode(err) => write!(f, "invalid bytecode: {err}"),
            ContractError::Execution { operation, source } => {
                write!(f, "{source} while {operation}")
            }
            ContractError::CallReverted { function, reason } => match reason {
                Some(reason) => write!(f, "call to `{function}` reverted: {reason}"),
                None => write!(f, "call to `{function}` reverted"),
            },
            ContractError::NotDeployed(contract) => {
                write!(f, "contract `{contract}` is not deployed")
            }
            ContractError::AlreadyDeployed(contract) => {
                write!(f, "contract `{contract}` is already deployed")
            }
            ContractError::UnknownContract { name, available } => write!(
                f,
                "no contract named `{name}` (available: {})",
                available.join(", ")
            ),
        }
    }
}

impl std::error::Error for ContractError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ContractError::Abi(err) => Some(err),
            ContractError::Link(err) => Some(err),
            ContractError::Compile(err) => Some(err),
            ContractError::Execution { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<AbiError> for ContractError {
    fn from(err: AbiError) -> Self {
        ContractError::Abi(err)
    }
}

impl From<LinkError> for ContractError {
    fn from(err: LinkError) -> Self {
        ContractError::Link(err)
    }
}

impl From<CompileError> for ContractError {
    fn from(err: CompileError) -> Self {
        ContractError::Compile(err)
    }
}
