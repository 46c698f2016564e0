use anyhow::Result;
use clap::Parser;

mod bookmark;
mod cli;
mod client;
mod config;
mod guid;
mod identity;
mod logging;
mod menu;
mod prompts;

use cli::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    cli.run().await
}
