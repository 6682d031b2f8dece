//! Live stats strip refreshed on a fixed interval

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::api::{CheckinApi, LiveStats};

/// Default refresh period
pub const STATS_INTERVAL: Duration = Duration::from_secs(15);

/// The three displayed counters
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LiveStatsDisplay {
    pub entries_today: String,
    pub currently_inside: String,
    pub peak_hour_today: String,
}

impl Default for LiveStatsDisplay {
    fn default() -> Self {
        Self {
            entries_today: "--".to_string(),
            currently_inside: "--".to_string(),
            peak_hour_today: "--".to_string(),
        }
    }
}

impl LiveStatsDisplay {
    /// Overwrite all three fields from a response
    pub fn apply(&mut self, stats: &LiveStats) {
        self.entries_today = stats.total_entries_today.to_string();
        self.currently_inside = stats.currently_inside.to_string();
        self.peak_hour_today = stats.peak_hour_today.clone();
    }

    /// Fetch once and update the display
    ///
    /// Failures are logged and leave the previous values in place.
    pub async fn refresh_stats(&mut self, api: &dyn CheckinApi) -> bool {
        match api.fetch_stats().await {
            Ok(stats) => {
                self.apply(&stats);
                true
            }
            Err(e) => {
                tracing::warn!("Error fetching live stats: {}", e);
                false
            }
        }
    }
}

/// Start the periodic poller
///
/// Fetches immediately, then every `interval`, sending each successful
/// response on `sender`. Stops when the receiver is dropped.
pub fn spawn_stats_poller(
    api: Arc<dyn CheckinApi>,
    interval: Duration,
    sender: mpsc::UnboundedSender<LiveStats>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            match api.fetch_stats().await {
                Ok(stats) => {
                    if sender.send(stats).is_err() {
                        break;
                    }
                }
                Err(e) => tracing::warn!("Error fetching live stats: {}", e),
            }
            if sender.is_closed() {
                break;
            }
        }
    })
}
