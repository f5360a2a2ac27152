//! machine-sync CLI: pull write-ups from GitHub into the site's JSON data file.
//!
//! Fetches every category of the content repository, extracts each write-up's
//! header, and writes `src/data/machines.json` for the static site build.

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
