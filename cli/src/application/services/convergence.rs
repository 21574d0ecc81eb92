//! Application service: bounded polling until cluster state converges.
//!
//! Imports only from `crate::application::ports`.

use std::future::Future;
use std::time::Duration;

use tokio::time::{Instant, sleep};

use crate::application::ports::ProgressReporter;

/// Delay between two predicate evaluations.
pub const POLL_INTERVAL: Duration = Duration::from_secs(1);

/// What one predicate evaluation observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollSignal {
    Converged,
    Pending,
    /// The scheduler gave up placing instances. Never retried.
    PlacementFailed,
}

/// Terminal state of a poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    Converged,
    TimedOut,
    PlacementFailed,
}

impl PollOutcome {
    #[must_use]
    pub fn is_converged(self) -> bool {
        self == Self::Converged
    }
}

/// Evaluate `predicate` every [`POLL_INTERVAL`] until it converges, reports a
/// placement failure, or `timeout` elapses.
///
/// The predicate is awaited on the calling task; no two evaluations overlap.
/// With `show_progress`, one tick is reported per pending evaluation and the
/// progress line is terminated before returning.
pub async fn poll_until<F, Fut>(
    mut predicate: F,
    timeout: Duration,
    reporter: &impl ProgressReporter,
    show_progress: bool,
) -> PollOutcome
where
    F: FnMut() -> Fut,
    Fut: Future<Output = PollSignal>,
{
    let deadline = Instant::now() + timeout;
    let mut attempts = 0u32;

    let outcome = loop {
        if Instant::now() >= deadline {
            break PollOutcome::TimedOut;
        }
        attempts += 1;
        match predicate().await {
            PollSignal::Converged => break PollOutcome::Converged,
            PollSignal::PlacementFailed => break PollOutcome::PlacementFailed,
            PollSignal::Pending => {}
        }
        if show_progress {
            reporter.tick();
        }
        sleep(POLL_INTERVAL).await;
    };

    tracing::debug!(?outcome, attempts, "poll finished");
    if show_progress {
        reporter.end_ticks();
    }
    outcome
}
