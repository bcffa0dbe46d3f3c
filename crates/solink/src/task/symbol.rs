use clap::Args;
use linker::{hashed_library_symbol, library_symbol};

#[derive(Args)]
#[command(about = "Print the bytecode placeholder for a library")]
pub struct SymbolArgs {
    library: String,
    /// Print the hashed placeholder, treating the name as `file.sol:Library`.
    #[arg(long)]
    hashed: bool,
}

pub fn symbol(args: SymbolArgs) -> String {
    if args.hashed {
        hashed_library_symbol(&args.library)
    } else {
        library_symbol(&args.library)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn legacy_and_hashed() {
        let legacy = symbol(SymbolArgs {
            library: "a".into(),
            hashed: false,
        });
        assert_eq!(legacy, format!("__a{}", "_".repeat(37)));

        let hashed = symbol(SymbolArgs {
            library: "lib.sol:Other".into(),
            hashed: true,
        });
        assert!(hashed.starts_with("__$") && hashed.len() == 40);
    }
}
