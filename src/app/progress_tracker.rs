//! Progress tracking for the background synchronizer subscription.
//!
//! `SyncProgressTracker` records the sync states seen after the launch sequence registered
//! for synchronizer updates: highest scanned height, target height, error count. It logs
//! progress at regular intervals and exposes a summary for diagnostics.

use crate::app::events::{SyncEventError, SyncEventHandler};
use crate::wallet::SyncState;
use std::sync::{Arc, Mutex};
use tracing::{info, warn};

/// Log every this many scanned blocks
const LOG_INTERVAL_BLOCKS: u64 = 1000;

#[derive(Debug, Clone, Default)]
pub struct SyncProgressTracker {
    /// First scanned height reported in this session
    start_height: Option<u64>,
    /// The highest height the engine reported as scanned
    highest_scanned_height: u64,
    /// Chain tip the engine is scanning towards
    target_height: u64,
    /// Number of state changes seen
    updates_processed: usize,
    /// Number of error states seen
    errors_seen: usize,
    /// Last height at which we logged progress
    last_logged_height: u64,
    latest_state: Option<SyncState>,
}

impl SyncProgressTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a state change reported by the engine
    pub fn record(&mut self, state: &SyncState) {
        self.updates_processed += 1;

        if let Some(height) = state.scanned_height() {
            self.record_height(height);
        }

        match state {
            SyncState::Syncing { target_height, .. } => {
                self.target_height = self.target_height.max(*target_height);
            }
            SyncState::UpToDate { height } => {
                self.target_height = self.target_height.max(*height);
            }
            SyncState::Error(reason) => {
                self.errors_seen += 1;
                warn!("Synchronizer reported an error: {}", reason);
            }
            SyncState::Unprepared | SyncState::Stopped => {}
        }

        self.latest_state = Some(state.clone());
    }

    fn record_height(&mut self, height: u64) {
        if self.start_height.is_none() {
            self.start_height = Some(height);
            self.last_logged_height = height;
        }
        self.highest_scanned_height = self.highest_scanned_height.max(height);
    }

    pub fn is_up_to_date(&self) -> bool {
        matches!(self.latest_state, Some(SyncState::UpToDate { .. }))
    }

    /// Log progress at regular intervals or when forced
    pub fn log_progress(&mut self, force: bool) {
        let blocks_since_last_log = self
            .highest_scanned_height
            .saturating_sub(self.last_logged_height);
        let should_log = force || blocks_since_last_log >= LOG_INTERVAL_BLOCKS;

        if should_log && self.start_height.is_some() {
            info!(
                "Sync progress: scanned up to {} of {} ({} updates)",
                self.highest_scanned_height, self.target_height, self.updates_processed
            );
            self.last_logged_height = self.highest_scanned_height;
        }
    }

    pub fn get_stats(&self) -> SyncStats {
        SyncStats {
            start_height: self.start_height,
            highest_scanned_height: self.highest_scanned_height,
            target_height: self.target_height,
            updates_processed: self.updates_processed,
            errors_seen: self.errors_seen,
            is_up_to_date: self.is_up_to_date(),
        }
    }
}

/// Statistics about the sync progress
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncStats {
    pub start_height: Option<u64>,
    pub highest_scanned_height: u64,
    pub target_height: u64,
    pub updates_processed: usize,
    pub errors_seen: usize,
    pub is_up_to_date: bool,
}

impl SyncStats {
    /// Get a human-readable summary of the sync statistics
    pub fn summary(&self) -> String {
        format!(
            "Sync from {} to {} of {}: {} updates{}{}",
            self.start_height.unwrap_or(0),
            self.highest_scanned_height,
            self.target_height,
            self.updates_processed,
            if self.errors_seen == 0 {
                String::new()
            } else {
                format!(" ({} errors)", self.errors_seen)
            },
            if self.is_up_to_date { ", up to date" } else { "" }
        )
    }
}

/// Feeds sync states into a shared tracker
pub struct ProgressTrackingHandler {
    tracker: Arc<Mutex<SyncProgressTracker>>,
}

impl ProgressTrackingHandler {
    pub fn new(tracker: Arc<Mutex<SyncProgressTracker>>) -> Self {
        Self { tracker }
    }
}

#[async_trait::async_trait]
impl SyncEventHandler for ProgressTrackingHandler {
    async fn handle(&mut self, event: &SyncState) -> Result<(), SyncEventError> {
        let mut tracker = self
            .tracker
            .lock()
            .map_err(|e| SyncEventError::HandlerError(format!("Progress tracker poisoned: {}", e)))?;
        tracker.record(event);
        let force = matches!(event, SyncState::UpToDate { .. });
        tracker.log_progress(force);
        Ok(())
    }

    fn name(&self) -> &'static str {
        "ProgressTrackingHandler"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tracker_records_heights_and_errors() {
        let mut tracker = SyncProgressTracker::new();
        tracker.record(&SyncState::Unprepared);
        tracker.record(&SyncState::Syncing {
            scanned_height: 300_100,
            target_height: 302_000,
        });
        tracker.record(&SyncState::Error("connection reset".to_string()));
        tracker.record(&SyncState::Syncing {
            scanned_height: 301_000,
            target_height: 302_000,
        });
        assert!(!tracker.is_up_to_date());

        tracker.record(&SyncState::UpToDate { height: 302_000 });
        let stats = tracker.get_stats();
        assert_eq!(
            stats,
            SyncStats {
                start_height: Some(300_100),
                highest_scanned_height: 302_000,
                target_height: 302_000,
                updates_processed: 5,
                errors_seen: 1,
                is_up_to_date: true,
            }
        );
        assert_eq!(
            stats.summary(),
            "Sync from 300100 to 302000 of 302000: 5 updates (1 errors), up to date"
        );
    }

    #[tokio::test]
    async fn test_handler_updates_shared_tracker() {
        let tracker = Arc::new(Mutex::new(SyncProgressTracker::new()));
        let mut handler = ProgressTrackingHandler::new(tracker.clone());
        handler
            .handle(&SyncState::UpToDate { height: 10 })
            .await
            .expect("handle");
        assert!(tracker.lock().unwrap().is_up_to_date());
    }
}
