//! addr-relay CLI
//!
//! Runs the address-count relay, or checks the upstream once.

use std::net::{IpAddr, SocketAddr};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use colored::*;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use addr_relay_api::{RelayConfig, RelayServer};
use addr_relay_core::constants::{
    COUNT_CORRECTION, DEFAULT_INITIAL_COUNT, DEFAULT_POLL_INTERVAL_SECS, DEFAULT_PORT,
    DEFAULT_REQUEST_TIMEOUT_SECS, DEFAULT_SUBSCAN_BASE_URL,
};
use addr_relay_core::apply_correction;
use addr_relay_subscan::{SubscanClient, SubscanConfig};

/// addr-relay - cached Subscan address count for the telemetry dashboard
#[derive(Parser)]
#[command(name = "addr-relay")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the relay
    Serve {
        #[command(flatten)]
        relay: RelayArgs,
        /// Bind address
        #[arg(short, long, default_value = "0.0.0.0")]
        bind: IpAddr,
    },

    /// Query the upstream once and print the count
    Fetch {
        #[command(flatten)]
        relay: RelayArgs,
    },
}

/// Relay settings. Flags win over the environment, which wins over `.env`.
#[derive(Args)]
struct RelayArgs {
    /// Subscan API key
    #[arg(long, env = "SUBSCAN_API_KEY", hide_env_values = true, value_parser = parse_api_key)]
    api_key: String,

    /// Subscan API host
    #[arg(long, env = "SUBSCAN_BASE_URL", default_value = DEFAULT_SUBSCAN_BASE_URL)]
    base_url: String,

    /// Port to listen on
    #[arg(short, long, env = "RELAY_PORT", default_value_t = DEFAULT_PORT)]
    port: u16,

    /// Seconds between upstream polls
    #[arg(long, env = "RELAY_POLL_INTERVAL_SECS", default_value_t = DEFAULT_POLL_INTERVAL_SECS)]
    interval_secs: u64,

    /// Upstream request timeout in seconds
    #[arg(long, env = "RELAY_REQUEST_TIMEOUT_SECS", default_value_t = DEFAULT_REQUEST_TIMEOUT_SECS)]
    timeout_secs: u64,

    /// Count served before the first successful poll
    #[arg(long, env = "RELAY_INITIAL_COUNT", default_value_t = DEFAULT_INITIAL_COUNT)]
    initial_count: u64,

    /// Subtracted from the upstream count
    #[arg(long, env = "RELAY_COUNT_CORRECTION", default_value_t = COUNT_CORRECTION)]
    correction: u64,
}

impl RelayArgs {
    fn into_config(self) -> RelayConfig {
        RelayConfig {
            port: self.port,
            subscan: SubscanConfig::new(self.api_key)
                .with_base_url(self.base_url)
                .with_timeout(self.timeout_secs),
            poll_interval_secs: self.interval_secs,
            initial_count: self.initial_count,
            correction: self.correction,
        }
    }
}

fn parse_api_key(raw: &str) -> std::result::Result<String, String> {
    let key = raw.trim();
    if key.is_empty() {
        return Err("API key must not be empty".into());
    }
    Ok(key.to_string())
}

#[tokio::main]
async fn main() -> Result<()> {
    // `.env` has to be loaded before clap reads the environment.
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        "addr_relay=debug,info"
    } else {
        "addr_relay=info,warn"
    };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into());

    if cli.json_logs {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }

    match cli.command {
        Commands::Serve { relay, bind } => cmd_serve(relay.into_config(), bind).await,
        Commands::Fetch { relay } => cmd_fetch(relay.into_config()).await,
    }
}

/// Run the relay
async fn cmd_serve(config: RelayConfig, bind: IpAddr) -> Result<()> {
    let addr = SocketAddr::new(bind, config.port);

    info!(
        interval_secs = config.poll_interval_secs,
        timeout_secs = config.subscan.timeout_seconds,
        initial_count = config.initial_count,
        correction = config.correction,
        "Starting address-count relay"
    );

    let server = RelayServer::new(config).context("Failed to build relay")?;
    server
        .run(addr)
        .await
        .with_context(|| format!("Relay on {} exited with an error", addr))?;

    Ok(())
}

/// Query the upstream once
async fn cmd_fetch(config: RelayConfig) -> Result<()> {
    println!(
        "{} {}",
        "🔎 Querying".cyan().bold(),
        config.subscan.accounts_url()
    );

    let client = SubscanClient::with_config(config.subscan.clone())?;
    let raw = client
        .fetch_count()
        .await
        .context("Upstream query failed")?;

    println!("   Raw count:       {}", raw.to_string().bold());
    println!(
        "   Served count:    {} {}",
        apply_correction(raw, config.correction).to_string().green().bold(),
        format!("(raw - {})", config.correction).dimmed()
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_flags_build_config() {
        let cli = Cli::try_parse_from([
            "addr-relay",
            "serve",
            "--api-key",
            "abc",
            "--base-url",
            "https://kusama.api.subscan.io",
            "--port",
            "9100",
            "--interval-secs",
            "30",
            "--timeout-secs",
            "5",
            "--initial-count",
            "108",
            "--correction",
            "0",
            "--bind",
            "127.0.0.1",
        ])
        .unwrap();

        let Commands::Serve { relay, bind } = cli.command else {
            panic!("expected serve");
        };
        assert_eq!(bind, IpAddr::from([127, 0, 0, 1]));

        let config = relay.into_config();
        assert_eq!(config.port, 9100);
        assert_eq!(config.poll_interval_secs, 30);
        assert_eq!(config.initial_count, 108);
        assert_eq!(config.correction, 0);
        assert_eq!(config.subscan.api_key, "abc");
        assert_eq!(config.subscan.base_url, "https://kusama.api.subscan.io");
        assert_eq!(config.subscan.timeout_seconds, 5);
    }

    #[test]
    fn test_empty_api_key_rejected() {
        for key in ["", "   "] {
            let result = Cli::try_parse_from(["addr-relay", "fetch", "--api-key", key]);
            assert!(result.is_err(), "key {:?}", key);
        }
    }

    #[test]
    fn test_bad_port_rejected() {
        let result = Cli::try_parse_from(["addr-relay", "serve", "--api-key", "abc", "--port", "eighty"]);
        assert!(result.is_err());
    }
}
