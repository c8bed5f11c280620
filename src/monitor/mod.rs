//! Fixed-interval polling of a snapshot source.
//!
//! [`Monitor::spawn`] starts one task that reads the source on a fixed
//! tick, decodes valid snapshots and hands them to a [`DisplaySink`]. The
//! newest decoded snapshot is also published on a watch channel, so any
//! number of consumers can [`subscribe`](MonitorHandle::subscribe) without
//! slowing the loop down; slow consumers simply skip snapshots.
//!
//! ```rust,no_run
//! use aerobridge::layout::MemoryLayout;
//! use aerobridge::monitor::{MemorySource, Monitor, NullSink, DEFAULT_POLL_INTERVAL};
//! use futures::StreamExt;
//!
//! # async fn run() {
//! let (source, _publisher) = MemorySource::new(MemoryLayout::FULL);
//! let mut handle = Monitor::spawn(source, NullSink, DEFAULT_POLL_INTERVAL);
//!
//! let mut snapshots = Box::pin(handle.subscribe());
//! if let Some(snapshot) = snapshots.next().await {
//!     println!("altitude {:?}", snapshot.get("Aircraft.Altitude"));
//! }
//! let stats = handle.stop().await;
//! println!("{} polls", stats.polls);
//! # }
//! ```

mod memory;
mod rate;
mod throttle;

pub use memory::MemorySource;
pub use rate::RateMeter;
pub use throttle::{Throttle, ThrottleExt};

use futures::{Stream, StreamExt};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_stream::wrappers::WatchStream;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

use crate::layout::MemoryLayout;
use crate::snapshot::{DecodedSnapshot, SnapshotHeader, SnapshotView};
use crate::{BridgeError, Result};

/// 20 Hz, the rate of the live variable monitors.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(50);
/// 2 Hz, the rate of the console dump.
pub const SLOW_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Poll interval for a rate in Hz, clamped to 2..=20 Hz.
pub fn interval_for_rate(hz: f64) -> Duration {
    let hz = if hz.is_finite() { hz.clamp(2.0, 20.0) } else { 20.0 };
    Duration::from_secs_f64(1.0 / hz)
}

/// Anything that can produce raw snapshot bytes.
#[async_trait::async_trait]
pub trait SnapshotSource: Send + 'static {
    /// Replace the contents of `buf` with the current snapshot.
    async fn read_snapshot(&mut self, buf: &mut Vec<u8>) -> Result<()>;

    /// Layout the bytes should be decoded with.
    fn layout(&self) -> MemoryLayout;
}

/// Receives the monitor's output. Only `on_snapshot` is required.
pub trait DisplaySink: Send + 'static {
    fn on_snapshot(&mut self, snapshot: &DecodedSnapshot, rate_hz: f64);

    /// Called instead of `on_snapshot` while `data_valid != 1`.
    fn on_waiting(&mut self, _header: &SnapshotHeader) {}

    fn on_error(&mut self, _error: &BridgeError) {}
}

/// Sink that discards everything; useful when only subscribing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl DisplaySink for NullSink {
    fn on_snapshot(&mut self, _snapshot: &DecodedSnapshot, _rate_hz: f64) {}
}

/// What the polling loop saw most recently.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MonitorStatus {
    Starting,
    /// Source readable but the bridge has not flagged the data valid.
    Waiting { update_counter: u32 },
    Live { update_counter: u32, rate_hz: f64 },
    /// Last read failed; the loop keeps going.
    Error,
    Stopped,
}

/// Counters returned when the loop ends.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MonitorStats {
    pub polls: u64,
    pub snapshots: u64,
    pub waiting: u64,
    pub errors: u64,
    pub last_rate_hz: f64,
}

/// Spawns polling tasks.
pub struct Monitor;

impl Monitor {
    /// Start polling `source` every `interval` and feed `sink`.
    ///
    /// Must be called inside a tokio runtime.
    pub fn spawn<S, D>(source: S, sink: D, interval: Duration) -> MonitorHandle
    where
        S: SnapshotSource,
        D: DisplaySink,
    {
        let (snapshot_tx, snapshot_rx) = watch::channel(None);
        let (status_tx, status_rx) = watch::channel(MonitorStatus::Starting);
        let cancel = CancellationToken::new();

        let task = tokio::spawn(Self::poll_task(
            source,
            sink,
            interval,
            snapshot_tx,
            status_tx,
            cancel.clone(),
        ));

        MonitorHandle { snapshots: snapshot_rx, status: status_rx, cancel, task: Some(task) }
    }

    async fn poll_task<S, D>(
        mut source: S,
        mut sink: D,
        interval: Duration,
        snapshot_tx: watch::Sender<Option<Arc<DecodedSnapshot>>>,
        status_tx: watch::Sender<MonitorStatus>,
        cancel: CancellationToken,
    ) -> MonitorStats
    where
        S: SnapshotSource,
        D: DisplaySink,
    {
        let layout = source.layout();
        info!(
            layout = %layout.version,
            interval_ms = interval.as_millis() as u64,
            "Monitor started"
        );

        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let mut buf = Vec::with_capacity(layout.size);
        let mut meter = RateMeter::new(Instant::now());
        let mut stats = MonitorStats::default();

        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => {}
            }
            stats.polls += 1;

            let read = tokio::select! {
                _ = cancel.cancelled() => break,
                read = source.read_snapshot(&mut buf) => read,
            };

            if let Err(e) = read {
                stats.errors += 1;
                warn!(errors = stats.errors, error = %e, "Snapshot read failed");
                sink.on_error(&e);
                let _ = status_tx.send(MonitorStatus::Error);
                continue;
            }

            let view = SnapshotView::new(&buf, layout);
            let Some(snapshot) = view.decode() else {
                let header = view.header();
                stats.waiting += 1;
                if stats.waiting == 1 || stats.waiting % 20 == 0 {
                    debug!(data_valid = header.data_valid, "Waiting for valid bridge data");
                }
                sink.on_waiting(&header);
                let _ = status_tx
                    .send(MonitorStatus::Waiting { update_counter: header.update_counter });
                continue;
            };

            stats.snapshots += 1;
            if let Some(rate) = meter.tick(Instant::now()) {
                trace!(rate_hz = rate, "Update rate");
            }
            let rate_hz = meter.rate();
            stats.last_rate_hz = rate_hz;

            sink.on_snapshot(&snapshot, rate_hz);
            let update_counter = snapshot.header.update_counter;
            let _ = snapshot_tx.send(Some(Arc::new(snapshot)));
            let _ = status_tx.send(MonitorStatus::Live { update_counter, rate_hz });
        }

        let _ = status_tx.send(MonitorStatus::Stopped);
        info!(
            polls = stats.polls,
            snapshots = stats.snapshots,
            errors = stats.errors,
            "Monitor stopped"
        );
        stats
    }
}

/// Handle to a running monitor. Dropping it stops the loop.
pub struct MonitorHandle {
    snapshots: watch::Receiver<Option<Arc<DecodedSnapshot>>>,
    status: watch::Receiver<MonitorStatus>,
    cancel: CancellationToken,
    task: Option<JoinHandle<MonitorStats>>,
}

impl MonitorHandle {
    /// Stream of decoded snapshots, starting with the current one if any.
    ///
    /// Consumers that fall behind see only the newest snapshot.
    pub fn subscribe(&self) -> impl Stream<Item = Arc<DecodedSnapshot>> + Send + 'static {
        WatchStream::new(self.snapshots.clone()).filter_map(|snapshot| async move { snapshot })
    }

    /// Like [`subscribe`](Self::subscribe) but emitting at most once per
    /// `period`.
    pub fn subscribe_throttled(
        &self,
        period: Duration,
    ) -> impl Stream<Item = Arc<DecodedSnapshot>> + Send + 'static {
        self.subscribe().throttle(period)
    }

    /// The newest decoded snapshot, which may be stale.
    pub fn latest(&self) -> Option<Arc<DecodedSnapshot>> {
        self.snapshots.borrow().clone()
    }

    pub fn status(&self) -> MonitorStatus {
        *self.status.borrow()
    }

    /// Token that stops the loop when cancelled.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Stop the loop and wait for it to finish.
    pub async fn stop(&mut self) -> MonitorStats {
        self.cancel.cancel();
        match self.task.take() {
            Some(task) => task.await.unwrap_or_else(|e| {
                warn!(error = %e, "Monitor task did not finish cleanly");
                MonitorStats::default()
            }),
            None => MonitorStats::default(),
        }
    }
}

impl Drop for MonitorHandle {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::DATA_VALID;
    use crate::snapshot::SnapshotWriter;
    use std::sync::Mutex;

    #[derive(Default, Clone)]
    struct Recorded {
        snapshots: Arc<Mutex<Vec<u32>>>,
        waiting: Arc<Mutex<u32>>,
        errors: Arc<Mutex<u32>>,
    }

    impl DisplaySink for Recorded {
        fn on_snapshot(&mut self, snapshot: &DecodedSnapshot, _rate_hz: f64) {
            self.snapshots.lock().unwrap().push(snapshot.header.update_counter);
        }

        fn on_waiting(&mut self, _header: &SnapshotHeader) {
            *self.waiting.lock().unwrap() += 1;
        }

        fn on_error(&mut self, _error: &BridgeError) {
            *self.errors.lock().unwrap() += 1;
        }
    }

    struct FailingSource;

    #[async_trait::async_trait]
    impl SnapshotSource for FailingSource {
        async fn read_snapshot(&mut self, _buf: &mut Vec<u8>) -> Result<()> {
            Err(BridgeError::connection_failed("mapping closed"))
        }

        fn layout(&self) -> MemoryLayout {
            MemoryLayout::COMPACT
        }
    }

    fn snapshot(counter: u32, valid: u32, altitude: f64) -> Vec<u8> {
        let mut writer = SnapshotWriter::new(MemoryLayout::FULL);
        writer.set_header(u64::from(counter) * 1000, valid, counter);
        writer.write_f64(32, altitude).unwrap();
        writer.into_bytes()
    }

    #[tokio::test(start_paused = true)]
    async fn invalid_data_emits_nothing() {
        let source = MemorySource::fixed(MemoryLayout::FULL, snapshot(9, 0, 1000.0));
        let sink = Recorded::default();
        let mut handle = Monitor::spawn(source, sink.clone(), Duration::from_millis(50));

        tokio::time::sleep(Duration::from_millis(500)).await;
        assert!(matches!(handle.status(), MonitorStatus::Waiting { update_counter: 9 }));
        let stats = handle.stop().await;

        assert!(sink.snapshots.lock().unwrap().is_empty());
        assert!(*sink.waiting.lock().unwrap() >= 5);
        assert_eq!(stats.snapshots, 0);
        assert!(handle.latest().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn publishes_snapshots_once_valid() {
        let (source, publisher) = MemorySource::new(MemoryLayout::FULL);
        let sink = Recorded::default();
        let mut handle = Monitor::spawn(source, sink.clone(), Duration::from_millis(50));

        tokio::time::sleep(Duration::from_millis(120)).await;
        assert!(handle.latest().is_none());

        publisher.send(snapshot(42, DATA_VALID, 1524.0)).unwrap();
        let mut snapshots = Box::pin(handle.subscribe());
        let first = snapshots.next().await.expect("snapshot published");
        assert_eq!(first.header.update_counter, 42);
        assert_eq!(first.get("Aircraft.Altitude"), Some(1524.0));

        let stats = handle.stop().await;
        assert!(stats.waiting >= 1);
        assert!(stats.snapshots >= 1);
        assert!(sink.snapshots.lock().unwrap().iter().all(|c| *c == 42));
        assert_eq!(handle.status(), MonitorStatus::Stopped);
    }

    #[tokio::test(start_paused = true)]
    async fn measured_rate_matches_poll_interval() {
        let source = MemorySource::fixed(MemoryLayout::FULL, snapshot(7, DATA_VALID, 300.0));
        let mut handle = Monitor::spawn(source, NullSink, Duration::from_millis(50));

        tokio::time::sleep(Duration::from_millis(2100)).await;
        let stats = handle.stop().await;

        assert!((19.0..=21.0).contains(&stats.last_rate_hz), "rate {}", stats.last_rate_hz);
    }

    #[tokio::test(start_paused = true)]
    async fn read_errors_do_not_stop_the_loop() {
        let sink = Recorded::default();
        let mut handle = Monitor::spawn(FailingSource, sink.clone(), Duration::from_millis(100));

        tokio::time::sleep(Duration::from_millis(450)).await;
        let stats = handle.stop().await;

        assert!(stats.errors >= 4);
        assert_eq!(stats.errors, stats.polls);
        assert_eq!(*sink.errors.lock().unwrap() as u64, stats.errors);
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_the_handle_cancels() {
        let (source, _publisher) = MemorySource::new(MemoryLayout::COMPACT);
        let handle = Monitor::spawn(source, NullSink, DEFAULT_POLL_INTERVAL);
        let token = handle.cancellation_token();
        drop(handle);
        assert!(token.is_cancelled());
    }

    #[test]
    fn rate_clamping() {
        assert_eq!(interval_for_rate(20.0), Duration::from_millis(50));
        assert_eq!(interval_for_rate(2.0), Duration::from_millis(500));
        assert_eq!(interval_for_rate(100.0), Duration::from_millis(50));
        assert_eq!(interval_for_rate(0.0), Duration::from_millis(500));
        assert_eq!(interval_for_rate(f64::NAN), Duration::from_millis(50));
    }
}
