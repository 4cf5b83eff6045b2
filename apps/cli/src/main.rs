//! datafetch CLI for box-office tables, sitemap inventories and country data.
//!
//! Each subcommand runs one independent fetch → parse → table pipeline.

mod commands;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli).await
}
