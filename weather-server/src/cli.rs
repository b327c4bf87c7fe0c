use std::{net::SocketAddr, path::PathBuf, sync::Arc};

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::info;
use weather_core::{Config, WeatherService};

use crate::handler;

const DEFAULT_LISTEN: &str = "0.0.0.0:8080";

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather-server", version, about = "Current weather HTTP service")]
pub struct Cli {
    /// Path to the TOML config file. Defaults to ./config.toml, then the platform config dir.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Serve the HTTP API (the default).
    Serve {
        /// Address to listen on.
        #[arg(long, default_value = DEFAULT_LISTEN)]
        listen: SocketAddr,
    },

    /// Fetch the current weather once and print it as JSON.
    Fetch,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        let path = Config::locate(self.config.as_deref())?;
        let config = Config::load(&path)?;
        info!(config = %path.display(), "configuration loaded");

        let service = Arc::new(WeatherService::from_config(&config)?);

        match resolve_command(self.command)? {
            Command::Serve { listen } => serve(service, listen).await,
            Command::Fetch => {
                let reading = service.get_current_weather().await?;
                println!("{}", serde_json::to_string_pretty(&reading)?);
                Ok(())
            }
        }
    }
}

/// Without a subcommand the binary serves on the default address.
fn resolve_command(command: Option<Command>) -> anyhow::Result<Command> {
    match command {
        Some(command) => Ok(command),
        None => Ok(Command::Serve { listen: DEFAULT_LISTEN.parse()? }),
    }
}

async fn serve(service: Arc<WeatherService>, listen: SocketAddr) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(listen)
        .await
        .with_context(|| format!("Failed to bind {listen}"))?;
    info!(%listen, stale_threshold = ?service.stale_threshold(), "weather server listening");

    axum::serve(listener, handler::router(service))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server terminated unexpectedly")
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listen_of(command: Command) -> Option<SocketAddr> {
        match command {
            Command::Serve { listen } => Some(listen),
            Command::Fetch => None,
        }
    }

    #[test]
    fn bare_invocation_serves_on_default_address() {
        let cli = Cli::try_parse_from(["weather-server"]).expect("valid args");
        let command = resolve_command(cli.command).expect("command");

        assert_eq!(listen_of(command), Some(SocketAddr::from(([0, 0, 0, 0], 8080))));
    }

    #[test]
    fn serve_subcommand_uses_same_default() {
        let cli = Cli::try_parse_from(["weather-server", "serve"]).expect("valid args");
        let command = resolve_command(cli.command).expect("command");

        assert_eq!(listen_of(command), Some(DEFAULT_LISTEN.parse().unwrap()));
    }

    #[test]
    fn config_flag_is_global() {
        let cli = Cli::try_parse_from(["weather-server", "fetch", "--config", "/tmp/w.toml"])
            .expect("valid args");

        assert_eq!(cli.config, Some(PathBuf::from("/tmp/w.toml")));
        assert!(matches!(cli.command, Some(Command::Fetch)));
    }
}
