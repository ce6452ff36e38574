//! Settlement backends
//!
//! A backend decides when, and whether, a staged request is confirmed. The
//! store has already been mutated by the time a backend sees a request.

use super::Request;
use crate::error::ApiError;
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;
use tokio::time::sleep;
use tracing::debug;

/// Remote side of the request facade
#[async_trait]
pub trait Backend: Send + Sync {
    /// Confirm a staged mutation
    async fn settle(&self, request: &Request) -> Result<(), ApiError>;

    /// Round trip for reading the records
    async fn load(&self) -> Result<(), ApiError> {
        Ok(())
    }
}

/// Backend that waits a fixed latency and then succeeds, unless told to fail
#[derive(Debug)]
pub struct SimulatedBackend {
    latency: Duration,
    fail_next: AtomicUsize,
    fail_loads: AtomicBool,
}

impl SimulatedBackend {
    pub fn new(latency: Duration) -> Self {
        Self {
            latency,
            fail_next: AtomicUsize::new(0),
            fail_loads: AtomicBool::new(false),
        }
    }

    pub fn latency(&self) -> Duration {
        self.latency
    }

    /// Make the next `count` settlements fail
    pub fn fail_next(&self, count: usize) {
        self.fail_next.store(count, Ordering::SeqCst);
    }

    pub fn fail_loads(&self, fail: bool) {
        self.fail_loads.store(fail, Ordering::SeqCst);
    }

    fn take_failure(&self) -> bool {
        self.fail_next
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }
}

impl Default for SimulatedBackend {
    fn default() -> Self {
        Self::new(Duration::from_millis(1000))
    }
}

#[async_trait]
impl Backend for SimulatedBackend {
    async fn settle(&self, request: &Request) -> Result<(), ApiError> {
        // Failure is decided when settlement starts, not when it ends.
        let fail = self.take_failure();
        debug!(
            op = request.kind(),
            target = ?request.target(),
            latency_ms = self.latency.as_millis() as u64,
            "Simulating backend round trip"
        );
        sleep(self.latency).await;
        if fail {
            return Err(ApiError::Settlement(format!(
                "simulated {} failure",
                request.kind()
            )));
        }
        Ok(())
    }

    async fn load(&self) -> Result<(), ApiError> {
        sleep(self.latency).await;
        if self.fail_loads.load(Ordering::SeqCst) {
            return Err(ApiError::Load("simulated load failure".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn delete(id: &str) -> Request {
        Request::Delete { id: id.to_string() }
    }

    #[tokio::test(start_paused = true)]
    async fn test_settle_waits_for_latency() {
        let backend = SimulatedBackend::new(Duration::from_millis(250));
        let start = tokio::time::Instant::now();
        backend.settle(&delete("1")).await.unwrap();
        assert!(start.elapsed() >= Duration::from_millis(250));
    }

    #[tokio::test(start_paused = true)]
    async fn test_fail_next_counts_down() {
        let backend = SimulatedBackend::new(Duration::from_millis(10));
        backend.fail_next(2);
        assert!(backend.settle(&delete("1")).await.is_err());
        assert!(backend.settle(&delete("1")).await.is_err());
        assert!(backend.settle(&delete("1")).await.is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn test_load_failure_flag() {
        let backend = SimulatedBackend::default();
        assert!(backend.load().await.is_ok());
        backend.fail_loads(true);
        assert!(matches!(backend.load().await, Err(ApiError::Load(_))));
    }
}
