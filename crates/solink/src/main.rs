mod task;

use clap::Parser;
use task::Commands;
use tracing_subscriber::EnvFilter;

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Parser)]
#[command(author, version = VERSION, about = "Library linking and ABI tooling for EVM bytecode", long_about = None)]
struct SolinkCli {
    #[command(subcommand)]
    command: Commands,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = SolinkCli::parse();
    if let Err(err) = task::run(cli.command) {
        eprintln!("Error: {err:#}");
        std::process::exit(1);
    }
}
