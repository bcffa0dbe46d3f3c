use std::{
    io::Write,
    path::{Path, PathBuf},
    process::{Command, Stdio},
};

use abi::AbiContract;
use common::config::CompilerSettings;
use contract::{CompileError, CompiledArtifact, Compiler};
use indexmap::IndexMap;
use linker::{declarations, PLACEHOLDER_LEN};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, warn};

/// Source unit name given to the text being compiled.
const SOURCE_UNIT: &str = "input.sol";

/// Drives a `solc` binary through its standard JSON interface.
#[derive(Debug, Clone)]
pub struct SolcCompiler {
    solc: String,
    optimize: bool,
    base_path: Option<PathBuf>,
}

impl Default for SolcCompiler {
    fn default() -> Self {
        Self::from_settings(&CompilerSettings::default())
    }
}

impl SolcCompiler {
    pub fn new(solc: impl Into<String>) -> Self {
        Self {
            solc: solc.into(),
            ..Default::default()
        }
    }

    pub fn from_settings(settings: &CompilerSettings) -> Self {
        Self {
            solc: settings.solc.clone(),
            optimize: settings.optimize,
            base_path: settings.base_path.clone(),
        }
    }

    pub fn optimize(mut self, optimize: bool) -> Self {
        self.optimize = optimize;
        self
    }

    /// Directory imports are resolved against when the caller gives none.
    pub fn base_path(mut self, base_path: impl Into<PathBuf>) -> Self {
        self.base_path = Some(base_path.into());
        self
    }

    fn standard_json_input(&self, source: &str) -> Value {
        json!({
            "language": "Solidity",
            "sources": {
                SOURCE_UNIT: { "content": source }
            },
            "settings": {
                "optimizer": { "enabled": self.optimize, "runs": 200 },
                "outputSelection": {
                    "*": {
                        "*": ["abi", "metadata", "evm.bytecode.object", "evm.bytecode.linkReferences"]
                    }
                }
            }
        })
    }

    fn run(&self, input: &Value, import_root: Option<&Path>) -> Result<String, CompileError> {
        let io_error = |error| CompileError::Io {
            program: self.solc.clone(),
            error,
        };

        let mut command = Command::new(&self.solc);
        command.arg("--standard-json");
        if let Some(root) = import_root.or(self.base_path.as_deref()) {
            command.arg("--base-path").arg(root);
            command.arg("--allow-paths").arg(root);
        }

        debug!(solc = %self.solc, "running compiler");
        let mut child = command
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(io_error)?;

        let written = match child.stdin.take() {
            Some(mut stdin) => stdin.write_all(input.to_string().as_bytes()),
            None => Ok(()),
        };
        // Reap the child even when the input could not be written.
        let output = child.wait_with_output().map_err(io_error)?;
        written.map_err(io_error)?;
        if !output.status.success() {
            return Err(CompileError::Diagnostics(vec![String::from_utf8_lossy(
                &output.stderr,
            )
            .into_owned()]));
        }

        String::from_utf8(output.stdout)
            .map_err(|err| CompileError::InvalidOutput(err.to_string()))
    }
}

impl Compiler for SolcCompiler {
    fn compile(
        &self,
        source: &str,
        import_root: Option<&Path>,
    ) -> Result<IndexMap<String, CompiledArtifact>, CompileError> {
        let input = self.standard_json_input(source);
        let output = self.run(&input, import_root)?;
        parse_standard_json_output(&output, source)
    }
}

#[derive(Deserialize)]
struct SolcOutput {
    #[serde(default)]
    errors: Vec<SolcDiagnostic>,
    #[serde(default)]
    contracts: IndexMap<String, IndexMap<String, SolcContract>>,
}

#[derive(Deserialize)]
struct SolcDiagnostic {
    severity: String,
    #[serde(rename = "formattedMessage")]
    formatted_message: Option<String>,
    message: String,
}

#[derive(Deserialize)]
struct SolcContract {
    abi: Value,
    #[serde(default)]
    metadata: String,
    evm: SolcEvm,
}

#[derive(Deserialize)]
struct SolcEvm {
    bytecode: SolcBytecode,
}

#[derive(Deserialize)]
struct SolcBytecode {
    object: String,
    #[serde(rename = "linkReferences", default)]
    link_references: IndexMap<String, IndexMap<String, Vec<SolcLinkReference>>>,
}

#[derive(Deserialize)]
struct SolcLinkReference {
    start: usize,
}

/// Turns `solc --standard-json` output into artifacts. Contracts of the
/// compiled text come first, in declaration order, followed by those of
/// imported files.
fn parse_standard_json_output(
    output: &str,
    source: &str,
) -> Result<IndexMap<String, CompiledArtifact>, CompileError> {
    let output: SolcOutput = serde_json::from_str(output)
        .map_err(|err| CompileError::InvalidOutput(err.to_string()))?;

    let mut errors = vec![];
    for diagnostic in output.errors {
        let message = diagnostic.formatted_message.unwrap_or(diagnostic.message);
        if diagnostic.severity == "error" {
            errors.push(message);
        } else {
            warn!("{}", message.trim_end());
        }
    }
    if !errors.is_empty() {
        return Err(CompileError::Diagnostics(errors));
    }

    let mut contracts = output.contracts;
    let mut artifacts = IndexMap::new();

    if let Some(mut own) = contracts.shift_remove(SOURCE_UNIT) {
        for declaration in declarations(source) {
            if let Some(contract) = own.shift_remove(&declaration.name) {
                artifacts.insert(declaration.name.clone(), artifact(declaration.name, contract)?);
            }
        }
        for (name, contract) in own {
            artifacts.insert(name.clone(), artifact(name, contract)?);
        }
    }

    for (name, contract) in contracts.into_values().flatten() {
        if !artifacts.contains_key(&name) {
            artifacts.insert(name.clone(), artifact(name, contract)?);
        }
    }

    Ok(artifacts)
}

fn artifact(name: String, contract: SolcContract) -> Result<CompiledArtifact, CompileError> {
    let abi = AbiContract::from_value(contract.abi)
        .map_err(|err| CompileError::InvalidOutput(format!("abi of `{name}`: {err}")))?;
    let bytecode = contract.evm.bytecode.object;

    let mut link_references = IndexMap::new();
    for (library, positions) in contract.evm.bytecode.link_references.into_values().flatten() {
        let placeholder = positions
            .first()
            .and_then(|pos| bytecode.get(pos.start * 2..pos.start * 2 + PLACEHOLDER_LEN));
        if let Some(placeholder) = placeholder {
            link_references.insert(library, placeholder.to_string());
        }
    }

    let metadata = if contract.metadata.is_empty() {
        Value::Null
    } else {
        serde_json::from_str(&contract.metadata).unwrap_or_else(|err| {
            warn!(contract = %name, "ignoring malformed metadata: {err}");
            Value::Null
        })
    };

    Ok(CompiledArtifact {
        metadata,
        name,
        bytecode,
        abi,
        link_references,
    })
}
