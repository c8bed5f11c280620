//! Builder for synthetic snapshots.
//!
//! Used by tests, benchmarks and the in-memory snapshot source to produce
//! buffers byte-identical to what the bridge publishes.

use super::{SnapshotView, Value};
use crate::layout::{
    DATA_VALID_OFFSET, FieldKind, Location, MemoryLayout, SLOT_SIZE, TIMESTAMP_OFFSET,
    UPDATE_COUNTER_OFFSET,
};
use crate::{BridgeError, Result};

/// Owned, zero-initialised snapshot buffer sized for a layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotWriter {
    data: Vec<u8>,
    layout: MemoryLayout,
}

impl SnapshotWriter {
    pub fn new(layout: MemoryLayout) -> Self {
        Self { data: vec![0u8; layout.size], layout }
    }

    pub fn layout(&self) -> &MemoryLayout {
        &self.layout
    }

    fn put(&mut self, offset: usize, bytes: &[u8]) -> Result<()> {
        let available = self.data.len();
        let target = offset
            .checked_add(bytes.len())
            .and_then(|end| self.data.get_mut(offset..end))
            .ok_or_else(|| BridgeError::out_of_range(offset, bytes.len(), available))?;
        target.copy_from_slice(bytes);
        Ok(())
    }

    /// Write the 16-byte header. The header always fits, so this cannot fail.
    pub fn set_header(&mut self, timestamp_us: u64, data_valid: u32, update_counter: u32) {
        self.data[TIMESTAMP_OFFSET..TIMESTAMP_OFFSET + 8]
            .copy_from_slice(&timestamp_us.to_le_bytes());
        self.data[DATA_VALID_OFFSET..DATA_VALID_OFFSET + 4]
            .copy_from_slice(&data_valid.to_le_bytes());
        self.data[UPDATE_COUNTER_OFFSET..UPDATE_COUNTER_OFFSET + 4]
            .copy_from_slice(&update_counter.to_le_bytes());
    }

    pub fn write_f64(&mut self, offset: usize, value: f64) -> Result<()> {
        self.put(offset, &value.to_le_bytes())
    }

    pub fn write_u32(&mut self, offset: usize, value: u32) -> Result<()> {
        self.put(offset, &value.to_le_bytes())
    }

    pub fn write_u64(&mut self, offset: usize, value: u64) -> Result<()> {
        self.put(offset, &value.to_le_bytes())
    }

    pub fn write_vector3(&mut self, offset: usize, (x, y, z): (f64, f64, f64)) -> Result<()> {
        self.write_f64(offset, x)?;
        self.write_f64(offset + 8, y)?;
        self.write_f64(offset + 16, z)
    }

    /// Write `text` NUL-padded to `len` bytes, truncating if needed.
    pub fn write_fixed_str(&mut self, offset: usize, len: usize, text: &str) -> Result<()> {
        let mut bytes = vec![0u8; len];
        let n = text.len().min(len.saturating_sub(1));
        bytes[..n].copy_from_slice(&text.as_bytes()[..n]);
        self.put(offset, &bytes)
    }

    pub fn set_slot(&mut self, index: usize, value: f64) -> Result<()> {
        let offset = self.layout.slot_offset(index).ok_or_else(|| {
            let offset = index.saturating_mul(SLOT_SIZE).saturating_add(self.layout.slot_base);
            BridgeError::out_of_range(offset, SLOT_SIZE, self.layout.size)
        })?;
        self.write_f64(offset, value)
    }

    /// Store a value under a variable name resolved through the layout.
    pub fn set_field(&mut self, name: &str, value: Value) -> Result<()> {
        let location = self
            .layout
            .resolve(name)
            .ok_or_else(|| BridgeError::parse_error("snapshot field", format!("unknown variable '{name}'")))?;

        match (location, value) {
            (Location::Slot(index), value) => {
                let scalar = value.as_f64().ok_or_else(|| {
                    BridgeError::parse_error("snapshot field", format!("'{name}' is a scalar slot"))
                })?;
                self.set_slot(index, scalar)
            }
            (Location::Field(field), Value::F64(v)) if field.kind == FieldKind::F64 => {
                self.write_f64(field.offset, v)
            }
            (Location::Field(field), Value::U32(v)) if field.kind == FieldKind::U32 => {
                self.write_u32(field.offset, v)
            }
            (Location::Field(field), Value::Vector3(x, y, z)) if field.kind == FieldKind::Vector3 => {
                self.write_vector3(field.offset, (x, y, z))
            }
            (Location::Field(field), Value::Text(text)) => match field.kind {
                FieldKind::FixedStr(len) => self.write_fixed_str(field.offset, len, &text),
                _ => Err(kind_mismatch(name)),
            },
            _ => Err(kind_mismatch(name)),
        }
    }

    pub fn view(&self) -> SnapshotView<'_> {
        SnapshotView::new(&self.data, self.layout)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }
}

fn kind_mismatch(name: &str) -> BridgeError {
    BridgeError::parse_error("snapshot field", format!("value type does not match '{name}'"))
}
