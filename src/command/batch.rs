//! Results of multi-command sends.

use serde::Serialize;
use std::time::Duration;

use super::Command;

/// Outcome of one command within a sequence.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommandOutcome {
    pub command: Command,
    pub delivered: bool,
    /// Round-trip time; zero when the command failed.
    pub elapsed: Duration,
    pub error: Option<String>,
}

impl CommandOutcome {
    pub fn delivered(command: Command, elapsed: Duration) -> Self {
        Self { command, delivered: true, elapsed, error: None }
    }

    pub fn failed(command: Command, error: impl Into<String>) -> Self {
        Self { command, delivered: false, elapsed: Duration::ZERO, error: Some(error.into()) }
    }
}

/// Spread of round-trip times across delivered commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ResponseTiming {
    pub fastest: Duration,
    pub slowest: Duration,
    pub average: Duration,
}

impl ResponseTiming {
    /// Slowest minus fastest round trip.
    pub fn spread(&self) -> Duration {
        self.slowest.saturating_sub(self.fastest)
    }
}

/// Per-command outcomes and timing of a sequence.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchReport {
    pub outcomes: Vec<CommandOutcome>,
    /// Wall time from the first connect to the last result, delays included.
    pub total_time: Duration,
}

impl BatchReport {
    pub fn new(outcomes: Vec<CommandOutcome>, total_time: Duration) -> Self {
        Self { outcomes, total_time }
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    pub fn successful(&self) -> usize {
        self.outcomes.iter().filter(|o| o.delivered).count()
    }

    pub fn failed(&self) -> usize {
        self.len() - self.successful()
    }

    pub fn all_delivered(&self) -> bool {
        self.failed() == 0
    }

    /// Percentage of delivered commands; 0 for an empty batch.
    pub fn success_rate(&self) -> f64 {
        if self.is_empty() {
            return 0.0;
        }
        self.successful() as f64 / self.len() as f64 * 100.0
    }

    /// Mean round trip over delivered commands.
    pub fn average_response(&self) -> Duration {
        let delivered = self.successful().max(1) as u32;
        let total: Duration =
            self.outcomes.iter().filter(|o| o.delivered).map(|o| o.elapsed).sum();
        total / delivered
    }

    /// Fastest, slowest and mean round trip; `None` when nothing was delivered.
    pub fn timing(&self) -> Option<ResponseTiming> {
        let mut delivered = self.outcomes.iter().filter(|o| o.delivered).map(|o| o.elapsed);
        let first = delivered.next()?;
        let (fastest, slowest) =
            delivered.fold((first, first), |(lo, hi), elapsed| (lo.min(elapsed), hi.max(elapsed)));
        Some(ResponseTiming { fastest, slowest, average: self.average_response() })
    }

    /// Append another batch's outcomes, adding its wall time.
    pub fn extend(&mut self, other: BatchReport) {
        self.outcomes.extend(other.outcomes);
        self.total_time += other.total_time;
    }

    /// Throughput over the whole batch.
    pub fn commands_per_second(&self) -> f64 {
        let secs = self.total_time.as_secs_f64();
        if secs <= 0.0 {
            return 0.0;
        }
        self.len() as f64 / secs
    }

    /// One-line summary as shown after a panel press.
    pub fn summary(&self) -> String {
        format!("{}/{} commands sent", self.successful(), self.len())
    }
}
