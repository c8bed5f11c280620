//! Snapshot source backed by an in-process buffer.

use async_trait::async_trait;
use tokio::sync::watch;

use super::SnapshotSource;
use crate::Result;
use crate::layout::MemoryLayout;

/// Serves whatever buffer was last published through its sender.
///
/// Stands in for the shared-memory mapping in tests and on platforms
/// without one.
#[derive(Debug)]
pub struct MemorySource {
    current: watch::Receiver<Vec<u8>>,
    layout: MemoryLayout,
}

impl MemorySource {
    /// Create a source starting from an all-zero (and therefore invalid)
    /// snapshot. Publish new buffers through the returned sender.
    pub fn new(layout: MemoryLayout) -> (Self, watch::Sender<Vec<u8>>) {
        let (tx, rx) = watch::channel(vec![0u8; layout.size]);
        (Self { current: rx, layout }, tx)
    }

    /// Source that always serves `bytes`.
    pub fn fixed(layout: MemoryLayout, bytes: Vec<u8>) -> Self {
        let (tx, rx) = watch::channel(bytes);
        // Receiver keeps the last value after the sender is gone
        drop(tx);
        Self { current: rx, layout }
    }
}

#[async_trait]
impl SnapshotSource for MemorySource {
    async fn read_snapshot(&mut self, buf: &mut Vec<u8>) -> Result<()> {
        buf.clear();
        buf.extend_from_slice(&self.current.borrow());
        Ok(())
    }

    fn layout(&self) -> MemoryLayout {
        self.layout
    }
}
