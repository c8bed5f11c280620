//! Windows file-mapping backend.

use std::ptr::NonNull;
use tracing::{debug, trace, warn};
use windows::Win32::Foundation::{CloseHandle, HANDLE};
use windows::Win32::System::Memory::{
    FILE_MAP_READ, MEMORY_BASIC_INFORMATION, MEMORY_MAPPED_VIEW_ADDRESS, MapViewOfFile,
    OpenFileMappingW, UnmapViewOfFile, VirtualQuery,
};
use windows::core::PCWSTR;

use crate::layout::{MemoryLayout, SHARED_MEMORY_NAME, UPDATE_COUNTER_OFFSET};
use crate::{BridgeError, Result};

/// Read-only view of the bridge's shared memory.
pub struct SharedMemory {
    mapping: HANDLE,
    base: NonNull<u8>,
    /// Bytes actually backed by the view; may be smaller than the layout
    /// when an older bridge build is running.
    mapped_len: usize,
    layout: MemoryLayout,
}

impl SharedMemory {
    /// Open the mapping published under [`SHARED_MEMORY_NAME`].
    pub fn open(layout: MemoryLayout) -> Result<Self> {
        Self::open_named(SHARED_MEMORY_NAME, layout)
    }

    /// Open a mapping by name.
    pub fn open_named(name: &str, layout: MemoryLayout) -> Result<Self> {
        trace!(name, layout = %layout.version, "Opening bridge shared memory");

        let mapping = unsafe {
            let wide_name = wide_string(name);
            OpenFileMappingW(FILE_MAP_READ.0, false, PCWSTR::from_raw(wide_name.as_ptr()))
                .map_err(|e| BridgeError::windows_api_error("OpenFileMappingW", e))?
        };

        let view = unsafe { MapViewOfFile(mapping, FILE_MAP_READ, 0, 0, 0) };
        let Some(base) = NonNull::new(view.Value as *mut u8) else {
            let win_err = windows::core::Error::from_thread();
            unsafe {
                let _ = CloseHandle(mapping);
            }
            return Err(BridgeError::windows_api_error("MapViewOfFile", win_err));
        };

        let mapped_len = unsafe { region_size(base) }.unwrap_or(layout.size);
        if mapped_len < layout.size {
            warn!(
                mapped_len,
                expected = layout.size,
                "Mapping is smaller than the selected layout; missing bytes read as zero"
            );
        }

        debug!(name, mapped_len, layout = %layout.version, "Mapped bridge shared memory");
        Ok(Self { mapping, base, mapped_len, layout })
    }

    pub fn layout(&self) -> &MemoryLayout {
        &self.layout
    }

    fn update_counter(&self) -> u32 {
        if self.mapped_len < UPDATE_COUNTER_OFFSET + 4 {
            return 0;
        }
        unsafe {
            let ptr = self.base.as_ptr().add(UPDATE_COUNTER_OFFSET) as *const u32;
            ptr.read_volatile()
        }
    }

    /// Copy the current snapshot into `buf`, resizing it to the layout size.
    ///
    /// The copy is retried once if the update counter moved while copying.
    pub fn read_into(&self, buf: &mut Vec<u8>) {
        buf.clear();
        buf.resize(self.layout.size, 0);
        let len = self.layout.size.min(self.mapped_len);

        for attempt in 0..2 {
            let before = self.update_counter();
            unsafe {
                std::ptr::copy_nonoverlapping(self.base.as_ptr(), buf.as_mut_ptr(), len);
            }
            let after = self.update_counter();
            if before == after {
                return;
            }
            trace!(attempt, before, after, "Snapshot changed during copy");
        }
    }

    /// Copy the current snapshot into a fresh buffer.
    pub fn snapshot(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(self.layout.size);
        self.read_into(&mut buf);
        buf
    }
}

impl Drop for SharedMemory {
    fn drop(&mut self) {
        unsafe {
            let addr = MEMORY_MAPPED_VIEW_ADDRESS { Value: self.base.as_ptr() as *mut _ };
            let _ = UnmapViewOfFile(addr);
            let _ = CloseHandle(self.mapping);
        }
    }
}

// SAFETY: the view is only read through copies, and the handles are
// process-wide kernel objects.
unsafe impl Send for SharedMemory {}
unsafe impl Sync for SharedMemory {}

/// Size of the committed region starting at `base`.
unsafe fn region_size(base: NonNull<u8>) -> Option<usize> {
    let mut info = MEMORY_BASIC_INFORMATION::default();
    let written = unsafe {
        VirtualQuery(
            Some(base.as_ptr() as *const _),
            &mut info,
            std::mem::size_of::<MEMORY_BASIC_INFORMATION>(),
        )
    };
    (written != 0).then_some(info.RegionSize)
}

/// Convert string to null-terminated wide string for Windows APIs
fn wide_string(s: &str) -> Vec<u16> {
    use std::ffi::OsStr;
    use std::os::windows::ffi::OsStrExt;
    OsStr::new(s).encode_wide().chain(std::iter::once(0)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wide_string_is_nul_terminated() {
        let wide = wide_string(SHARED_MEMORY_NAME);
        assert_eq!(wide.len(), SHARED_MEMORY_NAME.len() + 1);
        assert_eq!(wide.last(), Some(&0));
    }

    #[test]
    fn missing_mapping_is_a_windows_error() {
        let result = SharedMemory::open_named("AerobridgeTestNoSuchMapping", MemoryLayout::FULL);
        assert!(matches!(result, Err(BridgeError::WindowsApi { .. })));
    }

    #[test]
    #[ignore = "simulator_required"]
    fn reads_live_bridge() {
        let memory = SharedMemory::open(MemoryLayout::FULL).expect("bridge mapping");
        let snapshot = memory.snapshot();
        assert_eq!(snapshot.len(), 3384);
    }
}
