//! Update-rate measurement over one-second windows.

use std::time::Duration;
use tokio::time::Instant;

const WINDOW: Duration = Duration::from_secs(1);

/// Counts events and reports their rate once per elapsed window.
#[derive(Debug, Clone)]
pub struct RateMeter {
    window_start: Instant,
    count: u32,
    last_rate: f64,
}

impl RateMeter {
    pub fn new(now: Instant) -> Self {
        Self { window_start: now, count: 0, last_rate: 0.0 }
    }

    /// Record one event. Returns the new rate when a window closed.
    pub fn tick(&mut self, now: Instant) -> Option<f64> {
        self.count += 1;
        let elapsed = now.saturating_duration_since(self.window_start);
        if elapsed < WINDOW {
            return None;
        }
        self.last_rate = f64::from(self.count) / elapsed.as_secs_f64();
        self.window_start = now;
        self.count = 0;
        Some(self.last_rate)
    }

    /// Rate of the last completed window, 0 before the first one.
    pub fn rate(&self) -> f64 {
        self.last_rate
    }
}
