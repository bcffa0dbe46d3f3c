mod link;
mod names;
mod selector;
mod symbol;

pub use link::{link, LinkArgs};
pub use names::{names, NamesArgs};
pub use selector::{selector, SelectorArgs};
pub use symbol::{symbol, SymbolArgs};

use clap::Subcommand;

#[derive(Subcommand)]
pub enum Commands {
    Names(NamesArgs),
    Symbol(SymbolArgs),
    Link(LinkArgs),
    Selector(SelectorArgs),
}

pub fn run(command: Commands) -> anyhow::Result<()> {
    let output = match command {
        Commands::Names(args) => names(args)?,
        Commands::Symbol(args) => symbol(args),
        Commands::Link(args) => link(args)?,
        Commands::Selector(args) => selector(args)?,
    };
    println!("{output}");
    Ok(())
}
