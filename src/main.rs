mod archive;
mod cli;
mod converter;
mod docx_reader;
mod epub_reader;
mod error;
mod heading;
mod image;
mod metadata;
mod numeral;
mod pipeline;
mod reader;
mod segmenter;

#[cfg(test)]
mod fixtures;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = cli::Cli::parse();
    cli::run(cli)
}
