//! Debounce stage between the input list and the embedding pipeline.

use std::time::Duration;

use tokio::time::{Instant, sleep_until};
use tracing::trace;

/// Holds the latest value until a quiet period passes without a new one.
///
/// Only one value is ever pending: pushing replaces it and re-arms the
/// timer. Bursts therefore collapse to a single emission carrying the
/// last value.
#[derive(Debug)]
pub struct Debouncer<T> {
    /// Quiet period.
    quiet: Duration,

    /// Pending value and the instant it becomes due.
    pending: Option<(T, Instant)>,
}

impl<T> Debouncer<T> {
    /// Create a debouncer with the given quiet period.
    pub fn new(quiet: Duration) -> Self {
        Self {
            quiet,
            pending: None,
        }
    }

    /// Replace the pending value and restart the quiet period.
    pub fn push(&mut self, value: T) {
        let deadline = Instant::now() + self.quiet;
        if self.pending.is_some() {
            trace!("debounce re-armed");
        }
        self.pending = Some((value, deadline));
    }

    /// Whether a value is waiting for its quiet period to elapse.
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// When the pending value becomes due.
    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|(_, deadline)| *deadline)
    }

    /// Quiet period.
    pub fn quiet(&self) -> Duration {
        self.quiet
    }

    /// Wait for the pending value to become due and take it.
    ///
    /// Never resolves while nothing is pending. Cancel-safe: dropping the
    /// future before it resolves keeps the value pending, so this can sit
    /// in a `tokio::select!` loop next to the calls that re-arm it.
    pub async fn fired(&mut self) -> T {
        let Some(deadline) = self.deadline() else {
            return std::future::pending().await;
        };
        sleep_until(deadline).await;

        match self.pending.take() {
            Some((value, _)) => value,
            None => std::future::pending().await,
        }
    }
}
