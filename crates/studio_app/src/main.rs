mod cli;
mod platform;

use clap::Parser;

fn main() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();
    platform::logging::initialize(cli.log);
    platform::run(cli)
}
