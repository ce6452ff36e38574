//! Request status counters

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Snapshot of request activity, read by presentation code for saving
/// indicators and the error banner
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RequestStatus {
    /// Requests staged but not yet settled
    pub pending: usize,
    /// Requests that settled successfully
    pub completed: usize,
    /// Requests whose settlement failed
    pub failed: usize,
    /// Failed requests whose optimistic mutation was reverted
    pub rolled_back: usize,
    /// A load round trip is in flight
    pub fetching: bool,
    /// Whether the last load attempt failed
    pub load_error: bool,
    pub last_error: Option<String>,
    pub last_settled_at: Option<DateTime<Utc>>,
}

impl RequestStatus {
    pub fn is_saving(&self) -> bool {
        self.pending > 0
    }

    pub fn show_alert_banner(&self) -> bool {
        self.load_error
    }

    pub fn show_progress_bars(&self) -> bool {
        self.fetching
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_status_is_idle() {
        let status = RequestStatus::default();
        assert!(!status.is_saving());
        assert!(!status.show_alert_banner());
        assert!(!status.show_progress_bars());
    }

    #[test]
    fn test_pending_means_saving() {
        let status = RequestStatus {
            pending: 2,
            ..RequestStatus::default()
        };
        assert!(status.is_saving());
    }

    #[test]
    fn test_fetching_shows_progress_bars() {
        let status = RequestStatus {
            fetching: true,
            ..RequestStatus::default()
        };
        assert!(status.show_progress_bars());
        assert!(!status.is_saving());
    }
}
