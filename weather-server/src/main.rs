//! Binary crate for the weather HTTP service.
//!
//! This crate focuses on:
//! - Parsing CLI arguments and locating the config file
//! - Logging setup
//! - Serving `GET /v1/weather/` on top of `weather-core`

use clap::Parser;

mod cli;
mod handler;
mod logging;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init();
    let cmd = cli::Cli::parse();
    cmd.run().await
}
