//! Delay primitive behind the poll loop, injectable so the 24-attempt policy
//! is testable without wall-clock waits.

use std::time::Duration;

use async_trait::async_trait;

#[async_trait]
pub trait Scheduler: Send + Sync {
    async fn wait(&self, duration: Duration);
}

/// Production scheduler backed by the tokio timer.
pub struct TokioScheduler;

#[async_trait]
impl Scheduler for TokioScheduler {
    async fn wait(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Returns immediately while recording every requested delay. Lets tests
/// assert the poll cadence (count and interval) without sleeping.
pub struct InstantScheduler {
    waits: std::sync::Mutex<Vec<Duration>>,
}

impl InstantScheduler {
    pub fn new() -> Self {
        Self {
            waits: std::sync::Mutex::new(Vec::new()),
        }
    }

    pub fn recorded_waits(&self) -> Vec<Duration> {
        self.waits.lock().map(|w| w.clone()).unwrap_or_default()
    }
}

impl Default for InstantScheduler {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Scheduler for InstantScheduler {
    async fn wait(&self, duration: Duration) {
        if let Ok(mut waits) = self.waits.lock() {
            waits.push(duration);
        }
    }
}
