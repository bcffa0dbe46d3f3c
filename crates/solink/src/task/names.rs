use std::{fs, path::PathBuf};

use anyhow::Context;
use clap::Args;
use linker::declarations;

#[derive(Args)]
#[command(about = "List the contracts, libraries and interfaces declared in a source file")]
pub struct NamesArgs {
    source: PathBuf,
}

pub fn names(args: NamesArgs) -> anyhow::Result<String> {
    let source = fs::read_to_string(&args.source)
        .with_context(|| format!("failed to read `{}`", args.source.display()))?;
    Ok(format_declarations(&source))
}

fn format_declarations(source: &str) -> String {
    declarations(source)
        .map(|decl| format!("{} {}", decl.kind, decl.name))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_utils::fixture;

    #[test]
    fn lists_fixture_names() {
        assert_eq!(
            format_declarations(fixture("solidity/contract_names.sol")),
            "contract AContract\nlibrary ALibrary\ncontract WithSpace\ncontract WithLineBreak"
        );
    }

    #[test]
    fn reads_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lib.sol");
        fs::write(&path, "library Other {}").unwrap();

        assert_eq!(names(NamesArgs { source: path }).unwrap(), "library Other");
        assert!(names(NamesArgs {
            source: dir.path().join("missing.sol")
        })
        .is_err());
    }
}
