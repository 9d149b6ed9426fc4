// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Interval polling for near-real-time stats dashboards.
//!
//! [`StatsPoller::spawn`] runs a background task that refreshes the
//! manager's stats on a fixed interval. The returned [`PollerHandle`] owns
//! the task: `stop()` cancels and awaits it, and dropping the handle cancels
//! it, so a consuming view that goes away cannot leak a ticking timer.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::manager::MessageManager;

/// Default polling interval for dashboards.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(30);

/// Spawns the stats polling task.
pub struct StatsPoller;

impl StatsPoller {
    /// Starts polling `manager` every `every`. The first tick fires one
    /// interval after start; callers wanting an immediate snapshot refresh
    /// before spawning.
    pub fn spawn(manager: Arc<MessageManager>, every: Duration) -> PollerHandle {
        let cancel = CancellationToken::new();
        let token = cancel.clone();

        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(every);
            // Skip the immediate first tick.
            interval.tick().await;

            loop {
                tokio::select! {
                    _ = interval.tick() => {
                        if let Err(err) = manager.refresh_stats().await {
                            warn!(error = %err, "stats poll failed (non-fatal)");
                        }
                    }
                    _ = token.cancelled() => {
                        debug!("stats poller shutting down");
                        break;
                    }
                }
            }
        });

        PollerHandle {
            cancel,
            handle: Some(handle),
        }
    }
}

/// Owns the polling task; cancellation is tied to this handle's lifetime.
pub struct PollerHandle {
    cancel: CancellationToken,
    handle: Option<JoinHandle<()>>,
}

impl PollerHandle {
    /// Cancels the poller and waits for the task to exit.
    pub async fn stop(mut self) {
        self.cancel.cancel();
        if let Some(handle) = self.handle.take() {
            let _ = handle.await;
        }
    }

    /// True once the polling task has exited.
    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().is_none_or(JoinHandle::is_finished)
    }
}

impl Drop for PollerHandle {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use courier_test_utils::MockMessageApi;

    fn manager(api: Arc<MockMessageApi>) -> Arc<MessageManager> {
        // Zero TTL so every poll reaches the backend.
        Arc::new(MessageManager::with_cache_ttl(api, Duration::ZERO))
    }

    #[tokio::test]
    async fn poller_refreshes_stats_on_interval() {
        let api = Arc::new(MockMessageApi::new());
        let handle = StatsPoller::spawn(manager(api.clone()), Duration::from_millis(20));

        tokio::time::sleep(Duration::from_millis(110)).await;
        let polled = api.stats_calls().await;
        assert!(polled >= 2, "expected repeated polls, saw {polled}");

        handle.stop().await;
    }

    #[tokio::test]
    async fn stop_halts_polling() {
        let api = Arc::new(MockMessageApi::new());
        let handle = StatsPoller::spawn(manager(api.clone()), Duration::from_millis(20));

        tokio::time::sleep(Duration::from_millis(70)).await;
        handle.stop().await;
        let after_stop = api.stats_calls().await;

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(api.stats_calls().await, after_stop, "no polls after stop");
    }

    #[tokio::test]
    async fn dropping_the_handle_cancels_the_task() {
        let api = Arc::new(MockMessageApi::new());
        let handle = StatsPoller::spawn(manager(api.clone()), Duration::from_millis(20));

        tokio::time::sleep(Duration::from_millis(50)).await;
        drop(handle);

        tokio::time::sleep(Duration::from_millis(30)).await;
        let after_drop = api.stats_calls().await;
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(api.stats_calls().await, after_drop, "no polls after drop");
    }

    #[tokio::test]
    async fn polling_survives_backend_failures() {
        let api = Arc::new(MockMessageApi::new());
        api.push_stats_error(courier_core::CourierError::Transport {
            message: "flaky".into(),
            source: None,
        })
        .await;

        let handle = StatsPoller::spawn(manager(api.clone()), Duration::from_millis(20));
        tokio::time::sleep(Duration::from_millis(110)).await;
        assert!(
            api.stats_calls().await >= 2,
            "a failed poll must not stop the loop"
        );
        assert!(!handle.is_finished());
        handle.stop().await;
    }
}
