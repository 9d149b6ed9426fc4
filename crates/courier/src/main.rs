// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Courier - admin CLI for the message backend.
//!
//! This is the binary entry point. Each subcommand lives in its own module
//! and drives the repository directly for one-shot calls, or the management
//! facade for the watch mode.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod list;
mod send;
mod stats;

use std::io::IsTerminal;
use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use courier_client::{ApiClient, HttpMessageRepository};
use courier_config::CourierConfig;
use courier_core::CourierError;

/// Courier - admin CLI for the message backend.
#[derive(Parser, Debug)]
#[command(name = "courier", version, about, long_about = None)]
struct Cli {
    /// Emit structured JSON instead of human-readable output.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// List messages with optional filters.
    List(list::ListArgs),
    /// Fetch a single message by id.
    Get {
        /// Message id.
        id: String,
    },
    /// Persist a draft message without dispatching it.
    Create(send::CreateArgs),
    /// Send one message immediately.
    Send(send::SendArgs),
    /// Dispatch a batch of messages from a JSON file.
    Batch {
        /// Path to a JSON array of send payloads.
        file: PathBuf,
    },
    /// Delete a message by id.
    Delete {
        /// Message id.
        id: String,
    },
    /// Show delivery stats, optionally polling on an interval.
    Stats(stats::StatsArgs),
    /// Print the resolved configuration.
    Config,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match courier_config::load_and_validate() {
        Ok(config) => config,
        Err(errors) => {
            courier_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    init_tracing(&config);
    if !std::io::stdout().is_terminal() {
        colored::control::set_override(false);
    }

    if let Err(err) = run(cli, config).await {
        eprintln!("courier: {err}");
        std::process::exit(1);
    }
}

fn init_tracing(config: &CourierConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log.level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Builds the HTTP repository from the resolved configuration.
fn repository(config: &CourierConfig) -> Result<HttpMessageRepository, CourierError> {
    let client = ApiClient::new(
        config.api.base_url.clone(),
        config.auth.token.as_deref(),
        Duration::from_secs(config.api.timeout_secs),
    )?
    .with_read_retry(
        config.api.read_attempts,
        Duration::from_millis(config.api.retry_base_ms),
    );
    Ok(HttpMessageRepository::new(client))
}

async fn run(cli: Cli, config: CourierConfig) -> Result<(), CourierError> {
    match cli.command {
        Commands::List(args) => list::run_list(&config, args, cli.json).await,
        Commands::Get { id } => list::run_get(&config, &id, cli.json).await,
        Commands::Create(args) => send::run_create(&config, args, cli.json).await,
        Commands::Send(args) => send::run_send(&config, args, cli.json).await,
        Commands::Batch { file } => send::run_batch(&config, &file, cli.json).await,
        Commands::Delete { id } => send::run_delete(&config, &id).await,
        Commands::Stats(args) => stats::run_stats(&config, args, cli.json).await,
        Commands::Config => print_config(&config, cli.json),
    }
}

/// Prints the resolved configuration with the credential redacted.
fn print_config(config: &CourierConfig, json: bool) -> Result<(), CourierError> {
    let mut shown = config.clone();
    if shown.auth.token.is_some() {
        shown.auth.token = Some("<redacted>".to_string());
    }
    let rendered = if json {
        serde_json::to_string_pretty(&shown)
            .map_err(|e| CourierError::Internal(format!("failed to render config: {e}")))?
    } else {
        toml::to_string_pretty(&shown)
            .map_err(|e| CourierError::Internal(format!("failed to render config: {e}")))?
    };
    println!("{rendered}");
    Ok(())
}

#[cfg(test)]
mod tests {
    #[test]
    #[cfg(not(target_env = "msvc"))]
    fn jemalloc_is_active() {
        // Verify jemalloc is the global allocator by advancing the epoch.
        // Only jemalloc supports this -- the system allocator would fail.
        use tikv_jemalloc_ctl::{epoch, stats};
        epoch::advance().unwrap();
        let allocated = stats::allocated::read().unwrap();
        assert!(allocated > 0, "jemalloc should report non-zero allocation");
    }

    #[test]
    fn binary_loads_config_defaults() {
        // Verify config loads with defaults (no config file needed).
        let config = courier_config::load_and_validate().expect("default config should be valid");
        assert!(config.api.base_url.starts_with("http"));
        assert_eq!(config.query.default_limit, 20);
    }
}
