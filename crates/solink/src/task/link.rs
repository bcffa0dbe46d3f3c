use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{anyhow, Context};
use clap::Args;
use common::config::{find_config_in_dir, Config};
use linker::{ensure_linked, LinkMap};
use tracing::{debug, warn};

#[derive(Args)]
#[command(about = "Replace library placeholders in hex encoded bytecode")]
pub struct LinkArgs {
    /// File holding the hex encoded bytecode.
    bytecode: PathBuf,
    /// Library address as `NAME=ADDRESS`. Overrides the configuration file.
    #[arg(long = "lib", value_name = "NAME=ADDRESS", value_parser = parse_library)]
    libraries: Vec<(String, String)>,
    /// Configuration file. Defaults to the nearest `solink.toml`.
    #[arg(long)]
    config: Option<PathBuf>,
}

fn parse_library(arg: &str) -> Result<(String, String), String> {
    match arg.split_once('=') {
        Some((name, address)) if !name.is_empty() => {
            let address = address.strip_prefix("0x").unwrap_or(address);
            Ok((name.into(), address.into()))
        }
        _ => Err(format!("expected NAME=ADDRESS, found `{arg}`")),
    }
}

pub fn link(args: LinkArgs) -> anyhow::Result<String> {
    let raw = fs::read_to_string(&args.bytecode)
        .with_context(|| format!("failed to read `{}`", args.bytecode.display()))?;
    let bytecode = raw.trim();
    let bytecode = bytecode.strip_prefix("0x").unwrap_or(bytecode);

    let mut libraries = match config_path(args.config, &args.bytecode) {
        Some(path) => config_libraries(&path)?,
        None => LinkMap::new(),
    };
    libraries.extend(args.libraries);

    let linked = linker::link(bytecode, &libraries)?;
    ensure_linked(&linked)?;
    Ok(linked)
}

fn config_path(explicit: Option<PathBuf>, bytecode: &Path) -> Option<PathBuf> {
    explicit.or_else(|| {
        let dir = bytecode.parent().filter(|dir| !dir.as_os_str().is_empty());
        find_config_in_dir(&dir.map_or_else(|| PathBuf::from("."), Path::to_path_buf))
    })
}

fn config_libraries(path: &Path) -> anyhow::Result<LinkMap> {
    debug!(config = %path.display(), "loading libraries");
    let config = Config::load(path)
        .map_err(|err| anyhow!("failed to load `{}`: {err}", path.display()))?;
    if let Some(diagnostics) = config.formatted_diagnostics() {
        warn!("ignored configuration entries:\n{diagnostics}");
    }
    Ok(LinkMap::from(config.libraries))
}

#[cfg(test)]
mod tests {
    use super::*;
    use linker::{library_symbol, LinkError};

    const ADDRESS: &str = "00000000000000000000000000000000000000aa";

    fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn parses_library_args() {
        assert_eq!(
            parse_library("Other=00aa"),
            Ok(("Other".into(), "00aa".into()))
        );
        assert_eq!(
            parse_library("Other=0x00aa"),
            Ok(("Other".into(), "00aa".into()))
        );
        assert!(parse_library("Other").is_err());
        assert!(parse_library("=00aa").is_err());
    }

    #[test]
    fn links_from_args_and_config() {
        let dir = tempfile::tempdir().unwrap();
        let code = format!("0x60{}00{}\n", library_symbol("Other"), library_symbol("Seven"));
        let bytecode = write(dir.path(), "user.bin", &code);
        write(
            dir.path(),
            "solink.toml",
            &format!("[libraries]\nOther = \"{ADDRESS}\"\nBroken = \"xyz\"\n"),
        );

        let missing = link(LinkArgs {
            bytecode: bytecode.clone(),
            libraries: vec![],
            config: None,
        })
        .unwrap_err();
        assert_eq!(
            missing.downcast_ref::<LinkError>(),
            Some(&LinkError::UnresolvedLibrary(vec!["Seven".into()]))
        );

        let linked = link(LinkArgs {
            bytecode,
            libraries: vec![("Seven".into(), ADDRESS.replace("aa", "bb"))],
            config: None,
        })
        .unwrap();
        assert_eq!(
            linked,
            format!("60{ADDRESS}00{}", ADDRESS.replace("aa", "bb"))
        );
    }

    #[test]
    fn rejects_bad_addresses() {
        let dir = tempfile::tempdir().unwrap();
        let bytecode = write(dir.path(), "user.bin", &library_symbol("Other"));
        let empty_config = write(dir.path(), "empty.toml", "");

        let err = link(LinkArgs {
            bytecode,
            libraries: vec![parse_library("Other=0x1234").unwrap()],
            config: Some(empty_config),
        })
        .unwrap_err();
        assert_eq!(
            err.downcast_ref::<LinkError>(),
            Some(&LinkError::InvalidAddress("1234".into()))
        );
    }
}
