//! Stand-in for platforms without the bridge mapping.

use crate::layout::MemoryLayout;
use crate::{BridgeError, Result};

/// Placeholder type; it cannot be constructed outside Windows.
#[derive(Debug)]
pub struct SharedMemory {
    layout: MemoryLayout,
}

impl SharedMemory {
    /// Always fails: the bridge mapping only exists on Windows.
    pub fn open(_layout: MemoryLayout) -> Result<Self> {
        Err(BridgeError::unsupported_platform("Shared memory access", "Windows"))
    }

    /// Same as [`SharedMemory::open`]; the name is ignored.
    pub fn open_named(_name: &str, layout: MemoryLayout) -> Result<Self> {
        Self::open(layout)
    }

    pub fn layout(&self) -> &MemoryLayout {
        &self.layout
    }

    pub fn snapshot(&self) -> Vec<u8> {
        vec![0u8; self.layout.size]
    }

    pub fn read_into(&self, buf: &mut Vec<u8>) {
        buf.clear();
        buf.resize(self.layout.size, 0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_reports_unsupported_platform() {
        match SharedMemory::open(MemoryLayout::FULL) {
            Err(BridgeError::UnsupportedPlatform { feature, required_platform }) => {
                assert_eq!(feature, "Shared memory access");
                assert_eq!(required_platform, "Windows");
            }
            other => panic!("expected UnsupportedPlatform, got {other:?}"),
        }
    }
}
