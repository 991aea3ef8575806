//! PageLens CLI — web page analysis against external knowledge services.
//!
//! Extracts a page's text, derives a summary and key topics via an LLM,
//! queries three knowledge services with the result, and renders an
//! aggregated HTML report.

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
