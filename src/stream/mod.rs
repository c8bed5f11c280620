//! Reader for the bridge's newline-delimited JSON telemetry socket.
//!
//! The bridge pushes one [`TelemetryFrame`] per line on its data port
//! (12345 by default). [`TelemetryStream::spawn`] keeps a connection open in
//! a background task, reconnecting after a fixed pause whenever it drops, and
//! publishes the newest frame on a watch channel.
//!
//! ```rust,no_run
//! use aerobridge::stream::TelemetryStream;
//! use futures::StreamExt;
//!
//! # async fn run() {
//! let handle = TelemetryStream::new("127.0.0.1", 12345).spawn();
//! let mut frames = Box::pin(handle.subscribe());
//! while let Some(frame) = frames.next().await {
//!     println!("{}", frame.summary());
//! }
//! # }
//! ```

mod decoder;
mod frame;

pub use decoder::{LineDecoder, MAX_LINE_LEN};
pub use frame::{
    AircraftState, AutopilotState, ControlState, NavigationState, PerformanceSpeeds,
    TelemetryFrame,
};

use futures::{Stream, StreamExt};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::net::TcpStream;
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

use crate::{BridgeError, Result};

/// Port the bridge publishes telemetry on.
pub const DEFAULT_DATA_PORT: u16 = 12345;
/// Pause before reconnecting after the connection drops or fails.
pub const RECONNECT_DELAY: Duration = Duration::from_secs(3);
/// Bound on establishing the connection.
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(2);

const READ_CHUNK: usize = 2048;

/// Connection state of a running stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamStatus {
    Connecting,
    Connected,
    /// Waiting before the next connection attempt.
    Disconnected,
    Stopped,
}

/// Configuration for the telemetry reader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TelemetryStream {
    host: String,
    port: u16,
    reconnect_delay: Duration,
    connect_timeout: Duration,
}

impl Default for TelemetryStream {
    fn default() -> Self {
        Self::new("127.0.0.1", DEFAULT_DATA_PORT)
    }
}

impl TelemetryStream {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            reconnect_delay: RECONNECT_DELAY,
            connect_timeout: CONNECT_TIMEOUT,
        }
    }

    pub fn with_reconnect_delay(mut self, delay: Duration) -> Self {
        self.reconnect_delay = delay;
        self
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn endpoint(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Start the reader task. Must be called inside a tokio runtime.
    pub fn spawn(self) -> StreamHandle {
        let (frame_tx, frame_rx) = watch::channel(None);
        let (status_tx, status_rx) = watch::channel(StreamStatus::Connecting);
        let cancel = CancellationToken::new();

        tokio::spawn(self.run(frame_tx, status_tx, cancel.clone()));

        StreamHandle { frames: frame_rx, status: status_rx, cancel }
    }

    async fn run(
        self,
        frame_tx: watch::Sender<Option<Arc<TelemetryFrame>>>,
        status_tx: watch::Sender<StreamStatus>,
        cancel: CancellationToken,
    ) {
        let endpoint = self.endpoint();
        info!(endpoint = %endpoint, "Telemetry reader started");
        let mut frames = 0u64;

        loop {
            let _ = status_tx.send(StreamStatus::Connecting);
            let attempt = tokio::select! {
                _ = cancel.cancelled() => break,
                attempt = self.connect() => attempt,
            };

            match attempt {
                Ok(socket) => {
                    info!(endpoint = %endpoint, "Telemetry connected");
                    let _ = status_tx.send(StreamStatus::Connected);
                    let outcome = tokio::select! {
                        _ = cancel.cancelled() => break,
                        outcome = read_frames(socket, |frame| {
                            frames += 1;
                            frame_tx.send(Some(Arc::new(frame))).is_ok()
                        }) => outcome,
                    };
                    match outcome {
                        Ok(()) => debug!(endpoint = %endpoint, "Telemetry connection closed by peer"),
                        Err(e) => warn!(endpoint = %endpoint, error = %e, "Telemetry connection lost"),
                    }
                    if frame_tx.is_closed() {
                        debug!("All frame receivers dropped, stopping");
                        break;
                    }
                }
                Err(e) => {
                    warn!(endpoint = %endpoint, error = %e, "Telemetry connection failed");
                }
            }

            let _ = status_tx.send(StreamStatus::Disconnected);
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = tokio::time::sleep(self.reconnect_delay) => {}
            }
        }

        let _ = status_tx.send(StreamStatus::Stopped);
        info!(frames, "Telemetry reader stopped");
    }

    async fn connect(&self) -> Result<TcpStream> {
        let endpoint = self.endpoint();
        match tokio::time::timeout(self.connect_timeout, TcpStream::connect(&endpoint)).await {
            Ok(Ok(socket)) => Ok(socket),
            Ok(Err(e)) => Err(BridgeError::connection_failed_with_source(
                format!("connect {endpoint}"),
                Box::new(e),
            )),
            Err(_) => Err(BridgeError::Timeout { duration: self.connect_timeout }),
        }
    }
}

/// Read frames from `reader` until EOF, handing each to `on_frame`.
///
/// Stops early when `on_frame` returns `false`.
pub async fn read_frames<R, F>(mut reader: R, mut on_frame: F) -> Result<()>
where
    R: AsyncRead + Unpin,
    F: FnMut(TelemetryFrame) -> bool,
{
    let mut decoder = LineDecoder::new();
    let mut chunk = vec![0u8; READ_CHUNK];

    loop {
        let n = reader.read(&mut chunk).await?;
        if n == 0 {
            return Ok(());
        }
        for line in decoder.push(&chunk[..n]) {
            match TelemetryFrame::parse_line(&line) {
                Some(frame) => {
                    if !on_frame(frame) {
                        return Ok(());
                    }
                }
                None if !line.trim().is_empty() => trace!(len = line.len(), "Skipping unparseable line"),
                None => {}
            }
        }
    }
}

/// Handle to a running telemetry reader. Dropping it stops the reader.
pub struct StreamHandle {
    frames: watch::Receiver<Option<Arc<TelemetryFrame>>>,
    status: watch::Receiver<StreamStatus>,
    cancel: CancellationToken,
}

impl StreamHandle {
    /// Stream of frames, newest wins.
    pub fn subscribe(&self) -> impl Stream<Item = Arc<TelemetryFrame>> + Send + 'static {
        WatchStream::new(self.frames.clone()).filter_map(|frame| async move { frame })
    }

    pub fn latest(&self) -> Option<Arc<TelemetryFrame>> {
        self.frames.borrow().clone()
    }

    pub fn status(&self) -> StreamStatus {
        *self.status.borrow()
    }

    pub fn stop(&self) {
        self.cancel.cancel();
    }
}

impl Drop for StreamHandle {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::AsyncWriteExt;
    use tokio::net::TcpListener;

    #[tokio::test]
    async fn reads_frames_across_chunk_boundaries() {
        let (mut client, server) = tokio::io::duplex(16);
        let writer = tokio::spawn(async move {
            client.write_all(b"{\"update_counter\":1}\ngarbage\n{\"update_").await.unwrap();
            client.write_all(b"counter\":2}\n").await.unwrap();
        });

        let mut counters = Vec::new();
        read_frames(server, |frame| {
            counters.push(frame.update_counter);
            true
        })
        .await
        .unwrap();
        writer.await.unwrap();

        assert_eq!(counters, [1, 2]);
    }

    #[tokio::test]
    async fn publishes_latest_frame_and_reconnects() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        let server = tokio::spawn(async move {
            for counter in [10u32, 20] {
                let (mut socket, _) = listener.accept().await.unwrap();
                let frame = TelemetryFrame { update_counter: counter, ..Default::default() };
                socket.write_all(frame.to_line().unwrap().as_bytes()).await.unwrap();
                // Closing forces the reader to reconnect
            }
        });

        let handle = TelemetryStream::new("127.0.0.1", port)
            .with_reconnect_delay(Duration::from_millis(20))
            .spawn();
        let mut frames = Box::pin(handle.subscribe());

        let mut seen = Vec::new();
        while seen.last() != Some(&20) {
            let frame = tokio::time::timeout(Duration::from_secs(5), frames.next())
                .await
                .expect("frame within timeout")
                .expect("stream open");
            seen.push(frame.update_counter);
        }
        server.await.unwrap();

        assert!(seen.iter().all(|c| *c == 10 || *c == 20));
        assert_eq!(handle.latest().map(|f| f.update_counter), Some(20));
        handle.stop();
    }

    #[tokio::test]
    async fn refused_connection_backs_off() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let handle = TelemetryStream::new("127.0.0.1", port)
            .with_reconnect_delay(Duration::from_secs(60))
            .spawn();
        let mut status = handle.status.clone();
        tokio::time::timeout(
            Duration::from_secs(5),
            status.wait_for(|s| *s == StreamStatus::Disconnected),
        )
        .await
        .expect("status change")
        .unwrap();
        assert!(handle.latest().is_none());
    }
}
