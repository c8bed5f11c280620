//! Read-only access to the bridge's named shared-memory block.
//!
//! The bridge creates the mapping when the simulator loads it; we only ever
//! open it with read access and copy snapshots out of it. Decoding happens
//! on the copy (see [`crate::snapshot`]), so a torn read can at worst
//! produce one inconsistent snapshot which the next poll replaces.
//!
//! Only Windows has the mapping. On other platforms [`SharedMemory::open`]
//! fails with [`crate::BridgeError::UnsupportedPlatform`]; use the telemetry
//! stream ([`crate::stream`]) or an in-memory source instead.
//!
//! ```rust,no_run
//! use aerobridge::layout::MemoryLayout;
//! use aerobridge::shm::SharedMemory;
//! use aerobridge::snapshot::SnapshotView;
//!
//! # fn main() -> aerobridge::Result<()> {
//! let memory = SharedMemory::open(MemoryLayout::FULL)?;
//! let bytes = memory.snapshot();
//! let view = SnapshotView::new(&bytes, *memory.layout());
//! println!("counter = {}", view.header().update_counter);
//! # Ok(())
//! # }
//! ```

#[cfg(windows)]
mod windows;

#[cfg(windows)]
pub use self::windows::SharedMemory;

#[cfg(not(windows))]
mod unsupported;

#[cfg(not(windows))]
pub use self::unsupported::SharedMemory;

use async_trait::async_trait;

use crate::Result;
use crate::layout::MemoryLayout;
use crate::monitor::SnapshotSource;

#[async_trait]
impl SnapshotSource for SharedMemory {
    async fn read_snapshot(&mut self, buf: &mut Vec<u8>) -> Result<()> {
        self.read_into(buf);
        Ok(())
    }

    fn layout(&self) -> MemoryLayout {
        *SharedMemory::layout(self)
    }
}
