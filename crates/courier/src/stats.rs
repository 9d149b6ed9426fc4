// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `courier stats` command implementation.
//!
//! One-shot mode fetches the aggregate snapshot once. Watch mode drives the
//! management facade with a background poller and reprints until Ctrl-C;
//! the poller is stopped before returning so no timer outlives the command.

use std::sync::Arc;
use std::time::Duration;

use clap::Args;
use colored::Colorize;
use courier_config::CourierConfig;
use courier_core::{CourierError, MessageApi, MessageStats};
use courier_manager::{MessageManager, StatsPoller};

use crate::list::to_pretty_json;

/// Arguments for `courier stats`.
#[derive(Args, Debug)]
pub struct StatsArgs {
    /// Keep polling and reprinting on an interval.
    #[arg(long)]
    pub watch: bool,

    /// Poll interval in seconds (defaults to stats.poll_interval_secs).
    #[arg(long)]
    pub interval_secs: Option<u64>,
}

/// Run the `courier stats` command.
pub async fn run_stats(
    config: &CourierConfig,
    args: StatsArgs,
    json: bool,
) -> Result<(), CourierError> {
    let repo = crate::repository(config)?;

    if !args.watch {
        let stats = repo.stats().await?;
        print_stats(&stats, json)?;
        return Ok(());
    }

    let manager = Arc::new(MessageManager::with_cache_ttl(
        Arc::new(repo),
        Duration::from_secs(config.stats.cache_ttl_secs),
    ));
    manager.refresh_stats().await?;
    if let Some(stats) = manager.snapshot().await.stats {
        print_stats(&stats, json)?;
    }

    let every = Duration::from_secs(
        args.interval_secs
            .unwrap_or(config.stats.poll_interval_secs),
    );
    let poller = StatsPoller::spawn(manager.clone(), every);

    let mut ticker = tokio::time::interval(every);
    ticker.tick().await;
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            _ = ticker.tick() => {
                let snapshot = manager.snapshot().await;
                if let Some(error) = snapshot.stats_error {
                    eprintln!("courier: stats poll failed: {error}");
                }
                if let Some(stats) = snapshot.stats {
                    print_stats(&stats, json)?;
                }
            }
        }
    }
    poller.stop().await;
    Ok(())
}

fn print_stats(stats: &MessageStats, json: bool) -> Result<(), CourierError> {
    if json {
        println!("{}", to_pretty_json(stats)?);
        return Ok(());
    }

    let stamp = chrono::Local::now().format("%H:%M:%S");
    println!(
        "[{stamp}] total {}  |  {} pending  {} sent  {} delivered  {} failed  |  {} text  {} media  {} template",
        stats.total,
        stats.pending.to_string().yellow(),
        stats.sent.to_string().green(),
        stats.delivered.to_string().blue(),
        stats.failed.to_string().red(),
        stats.text_messages,
        stats.media_messages,
        stats.template_messages,
    );
    Ok(())
}
