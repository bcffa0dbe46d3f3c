use std::fmt::Display;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use toml::{Table, Value};

use crate::address::is_hex_address;

pub const CONFIG_FILE_NAME: &str = "solink.toml";

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Config {
    pub compiler: CompilerSettings,
    /// Library name (or raw placeholder) to 40 character hex address.
    pub libraries: IndexMap<String, String>,
    pub diagnostics: Vec<ConfigDiagnostic>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompilerSettings {
    pub solc: String,
    pub optimize: bool,
    pub base_path: Option<PathBuf>,
}

impl Default for CompilerSettings {
    fn default() -> Self {
        Self {
            solc: "solc".into(),
            optimize: true,
            base_path: None,
        }
    }
}

impl Config {
    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        let mut config = Config::default();
        let parsed: Table = content.parse()?;

        for (key, value) in &parsed {
            match (key.as_str(), value) {
                ("compiler", Value::Table(table)) => config.parse_compiler(table),
                ("libraries", Value::Table(table)) => config.parse_libraries(table),
                ("compiler" | "libraries", value) => {
                    config.diagnostics.push(ConfigDiagnostic::UnexpectedTomlData {
                        field: key.clone(),
                        found: value.type_str().to_lowercase(),
                        expected: Some("table".into()),
                    })
                }
                _ => config.diagnostics.push(ConfigDiagnostic::UnexpectedTomlData {
                    field: key.clone(),
                    found: value.type_str().to_lowercase(),
                    expected: None,
                }),
            }
        }

        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::Io)?;
        Self::parse(&content).map_err(ConfigError::Toml)
    }

    fn parse_compiler(&mut self, table: &Table) {
        for (key, value) in table {
            match (key.as_str(), value) {
                ("solc", Value::String(path)) => self.compiler.solc = path.clone(),
                ("optimize", Value::Boolean(flag)) => self.compiler.optimize = *flag,
                ("base_path", Value::String(path)) => {
                    self.compiler.base_path = Some(PathBuf::from(path))
                }
                ("solc" | "base_path", value) => {
                    self.unexpected(&format!("compiler.{key}"), value, "string")
                }
                ("optimize", value) => self.unexpected("compiler.optimize", value, "boolean"),
                _ => self.diagnostics.push(ConfigDiagnostic::UnexpectedTomlData {
                    field: format!("compiler.{key}"),
                    found: value.type_str().to_lowercase(),
                    expected: None,
                }),
            }
        }
    }

    fn parse_libraries(&mut self, table: &Table) {
        for (name, value) in table {
            let address = value
                .as_str()
                .map(|address| address.strip_prefix("0x").unwrap_or(address));
            match address {
                Some(address) if is_hex_address(address) => {
                    self.libraries.insert(name.clone(), address.to_owned());
                }
                Some(address) => self.diagnostics.push(ConfigDiagnostic::InvalidLibraryAddress {
                    library: name.clone(),
                    address: address.to_owned(),
                }),
                None => self.unexpected(&format!("libraries.{name}"), value, "string"),
            }
        }
    }

    fn unexpected(&mut self, field: &str, value: &Value, expected: &str) {
        self.diagnostics.push(ConfigDiagnostic::UnexpectedTomlData {
            field: field.into(),
            found: value.type_str().to_lowercase(),
            expected: Some(expected.into()),
        })
    }

    pub fn formatted_diagnostics(&self) -> Option<String> {
        if self.diagnostics.is_empty() {
            None
        } else {
            Some(
                self.diagnostics
                    .iter()
                    .map(|diag| format!("  {diag}"))
                    .collect::<Vec<_>>()
                    .join("\n"),
            )
        }
    }
}

/// Walks up from `dir` until a `solink.toml` is found.
pub fn find_config_in_dir(dir: &Path) -> Option<PathBuf> {
    let candidate = dir.join(CONFIG_FILE_NAME);
    if candidate.is_file() {
        Some(candidate)
    } else {
        find_config_in_dir(dir.parent()?)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigDiagnostic {
    InvalidLibraryAddress {
        library: String,
        address: String,
    },
    UnexpectedTomlData {
        field: String,
        found: String,
        expected: Option<String>,
    },
}

impl Display for ConfigDiagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidLibraryAddress { library, address } => write!(
                f,
                "Invalid address \"{address}\" for library \"{library}\", expected 40 hex characters"
            ),
            Self::UnexpectedTomlData {
                field,
                found,
                expected,
            } => {
                if let Some(expected) = expected {
                    write!(
                        f,
                        "Expected a {expected} in field {field}, but found a {found}"
                    )
                } else {
                    write!(f, "Unexpected field {field}")
                }
            }
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Toml(toml::de::Error),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(err) => write!(f, "IO error: {err}"),
            ConfigError::Toml(err) => write!(f, "Invalid TOML syntax: {err}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io(err) => Some(err),
            ConfigError::Toml(err) => Some(err),
        }
    }
}
