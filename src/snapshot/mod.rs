//! Decoding of bridge snapshots.
//!
//! A snapshot is the raw byte image of the shared-memory block. The bridge
//! owns it exclusively for writes; this module only reads copies of it.
//!
//! Every accessor comes in two flavours:
//!
//! - `try_*` returns a [`Result`] and reports out-of-range reads as
//!   [`BridgeError::Memory`].
//! - The plain form (`read_f64`, `read_u32`, ...) never fails and substitutes
//!   zero instead. Polling loops use these so a short or stale buffer degrades
//!   to zeros rather than stopping the display.
//!
//! ```rust
//! use aerobridge::layout::MemoryLayout;
//! use aerobridge::snapshot::{SnapshotView, SnapshotWriter};
//!
//! let mut writer = SnapshotWriter::new(MemoryLayout::FULL);
//! writer.set_header(0, 1, 42);
//! writer.write_f64(16, 123.456).unwrap();
//!
//! let view = SnapshotView::new(writer.as_bytes(), MemoryLayout::FULL);
//! assert_eq!(view.header().update_counter, 42);
//! assert!(view.is_valid());
//! assert_eq!(view.read_f64(16), 123.456);
//! assert_eq!(view.read_f64(100_000), 0.0);
//! ```

mod writer;

pub use writer::SnapshotWriter;

use serde::Serialize;
use tracing::trace;

use crate::layout::{
    DATA_VALID, DATA_VALID_OFFSET, FieldDef, FieldKind, Location, MemoryLayout, SLOT_BASE,
    SLOT_SIZE, TIMESTAMP_OFFSET, UPDATE_COUNTER_OFFSET,
};
use crate::{BridgeError, Result};

/// Threshold below which the memory scan treats a value as unset.
pub const ACTIVE_THRESHOLD: f64 = 1e-10;

/// The 16-byte header at the start of every snapshot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SnapshotHeader {
    pub timestamp_us: u64,
    pub data_valid: u32,
    pub update_counter: u32,
}

impl SnapshotHeader {
    pub fn is_valid(&self) -> bool {
        self.data_valid == DATA_VALID
    }
}

/// A decoded field value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    F64(f64),
    U32(u32),
    Vector3(f64, f64, f64),
    Text(String),
}

impl Value {
    /// Scalar view of the value, if it has one.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::F64(v) => Some(*v),
            Value::U32(v) => Some(f64::from(*v)),
            Value::Vector3(..) | Value::Text(_) => None,
        }
    }
}

/// Borrowed view over a snapshot buffer.
#[derive(Debug, Clone, Copy)]
pub struct SnapshotView<'a> {
    data: &'a [u8],
    layout: MemoryLayout,
}

impl<'a> SnapshotView<'a> {
    pub fn new(data: &'a [u8], layout: MemoryLayout) -> Self {
        Self { data, layout }
    }

    pub fn layout(&self) -> &MemoryLayout {
        &self.layout
    }

    pub fn as_bytes(&self) -> &'a [u8] {
        self.data
    }

    fn bytes<const N: usize>(&self, offset: usize) -> Result<[u8; N]> {
        let end = offset
            .checked_add(N)
            .ok_or_else(|| BridgeError::out_of_range(offset, N, self.data.len()))?;
        let slice = self
            .data
            .get(offset..end)
            .ok_or_else(|| BridgeError::out_of_range(offset, N, self.data.len()))?;
        let mut out = [0u8; N];
        out.copy_from_slice(slice);
        Ok(out)
    }

    pub fn try_read_f64(&self, offset: usize) -> Result<f64> {
        self.bytes::<8>(offset).map(f64::from_le_bytes)
    }

    pub fn try_read_u32(&self, offset: usize) -> Result<u32> {
        self.bytes::<4>(offset).map(u32::from_le_bytes)
    }

    pub fn try_read_u64(&self, offset: usize) -> Result<u64> {
        self.bytes::<8>(offset).map(u64::from_le_bytes)
    }

    pub fn try_read_vector3(&self, offset: usize) -> Result<(f64, f64, f64)> {
        let x = self.try_read_f64(offset)?;
        let y = self.try_read_f64(offset + 8)?;
        let z = self.try_read_f64(offset + 16)?;
        Ok((x, y, z))
    }

    /// Read a NUL-padded character array.
    pub fn try_read_fixed_str(&self, offset: usize, len: usize) -> Result<String> {
        let raw = offset
            .checked_add(len)
            .and_then(|end| self.data.get(offset..end))
            .ok_or_else(|| BridgeError::out_of_range(offset, len, self.data.len()))?;
        let end = raw.iter().position(|&b| b == 0).unwrap_or(raw.len());
        Ok(String::from_utf8_lossy(&raw[..end]).into_owned())
    }

    /// Read an `f64`, or 0.0 when the read falls outside the buffer.
    pub fn read_f64(&self, offset: usize) -> f64 {
        self.try_read_f64(offset).unwrap_or_else(|e| {
            trace!(offset, error = %e, "f64 read failed, substituting 0.0");
            0.0
        })
    }

    /// Read a `u32`, or 0 when the read falls outside the buffer.
    pub fn read_u32(&self, offset: usize) -> u32 {
        self.try_read_u32(offset).unwrap_or_else(|e| {
            trace!(offset, error = %e, "u32 read failed, substituting 0");
            0
        })
    }

    /// Read a `u64`, or 0 when the read falls outside the buffer.
    pub fn read_u64(&self, offset: usize) -> u64 {
        self.try_read_u64(offset).unwrap_or_else(|e| {
            trace!(offset, error = %e, "u64 read failed, substituting 0");
            0
        })
    }

    /// Read three consecutive `f64`, or zeros when any falls outside the buffer.
    pub fn read_vector3(&self, offset: usize) -> (f64, f64, f64) {
        self.try_read_vector3(offset).unwrap_or_else(|e| {
            trace!(offset, error = %e, "vector read failed, substituting zeros");
            (0.0, 0.0, 0.0)
        })
    }

    pub fn read_fixed_str(&self, offset: usize, len: usize) -> String {
        self.try_read_fixed_str(offset, len).unwrap_or_default()
    }

    pub fn header(&self) -> SnapshotHeader {
        SnapshotHeader {
            timestamp_us: self.read_u64(TIMESTAMP_OFFSET),
            data_valid: self.read_u32(DATA_VALID_OFFSET),
            update_counter: self.read_u32(UPDATE_COUNTER_OFFSET),
        }
    }

    /// True when the producer has flagged the snapshot as trustworthy.
    pub fn is_valid(&self) -> bool {
        self.header().is_valid()
    }

    /// Header of a valid snapshot, or [`BridgeError::InvalidData`].
    pub fn ensure_valid(&self) -> Result<SnapshotHeader> {
        let header = self.header();
        if header.is_valid() {
            Ok(header)
        } else {
            Err(BridgeError::InvalidData { data_valid: header.data_valid })
        }
    }

    pub fn field_value(&self, field: &FieldDef) -> Value {
        match field.kind {
            FieldKind::F64 => Value::F64(self.read_f64(field.offset)),
            FieldKind::U32 => Value::U32(self.read_u32(field.offset)),
            FieldKind::Vector3 => {
                let (x, y, z) = self.read_vector3(field.offset);
                Value::Vector3(x, y, z)
            }
            FieldKind::FixedStr(len) => Value::Text(self.read_fixed_str(field.offset, len)),
        }
    }

    /// Value of a slot; 0.0 past the end of the layout or the buffer.
    pub fn slot(&self, index: usize) -> f64 {
        match self.layout.slot_offset(index) {
            Some(offset) => self.read_f64(offset),
            None => 0.0,
        }
    }

    /// All slot values of this layout, in index order.
    pub fn slots(&self) -> impl Iterator<Item = f64> + '_ {
        (0..self.layout.slot_count).map(move |index| self.slot(index))
    }

    /// Fixed-block field by name.
    pub fn field(&self, name: &str) -> Option<Value> {
        self.layout.field(name).map(|field| self.field_value(field))
    }

    /// Slot by its catalogue name.
    pub fn slot_by_name(&self, name: &str) -> Option<f64> {
        self.layout.slot_index(name).map(|index| self.slot(index))
    }

    /// Value of a named variable, resolved through the layout.
    pub fn value(&self, name: &str) -> Option<Value> {
        match self.layout.resolve(name)? {
            Location::Field(field) => Some(self.field_value(field)),
            Location::Slot(index) => Some(Value::F64(self.slot(index))),
        }
    }

    /// Slots whose magnitude exceeds `threshold`, as `(index, value)`.
    pub fn active_slots(&self, threshold: f64) -> Vec<(usize, f64)> {
        self.slots().enumerate().filter(|(_, value)| value.abs() > threshold).collect()
    }

    /// 8-byte aligned offsets of the header and fixed block whose `f64`
    /// interpretation exceeds `threshold`.
    pub fn active_fixed_offsets(&self, threshold: f64) -> Vec<(usize, f64)> {
        (0..SLOT_BASE)
            .step_by(SLOT_SIZE)
            .map(|offset| (offset, self.read_f64(offset)))
            .filter(|(_, value)| value.abs() > threshold)
            .collect()
    }

    /// Decode every field and slot, or `None` when `data_valid != 1`.
    pub fn decode(&self) -> Option<DecodedSnapshot> {
        let header = self.header();
        if !header.is_valid() {
            return None;
        }

        let fields =
            self.layout.fields.iter().map(|field| (field.name, self.field_value(field))).collect();

        Some(DecodedSnapshot { layout: self.layout, header, fields, slots: self.slots().collect() })
    }
}

/// Owned, fully decoded snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedSnapshot {
    pub layout: MemoryLayout,
    pub header: SnapshotHeader,
    /// Fixed-block fields in offset order.
    pub fields: Vec<(&'static str, Value)>,
    pub slots: Vec<f64>,
}

impl DecodedSnapshot {
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.iter().find(|(field, _)| *field == name).map(|(_, value)| value)
    }

    pub fn slot(&self, index: usize) -> Option<f64> {
        self.slots.get(index).copied()
    }

    /// Scalar value of a named variable, fixed block first.
    pub fn get(&self, name: &str) -> Option<f64> {
        match self.layout.resolve(name)? {
            Location::Field(field) => self.field(field.name).and_then(Value::as_f64),
            Location::Slot(index) => self.slot(index),
        }
    }

    /// Named slots whose magnitude exceeds `threshold`.
    pub fn active_slots(&self, threshold: f64) -> Vec<(usize, &'static str, f64)> {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, value)| value.abs() > threshold)
            .map(|(index, value)| (index, self.layout.slot_name(index).unwrap_or("?"), *value))
            .collect()
    }

    /// JSON object with the header, named fields and the slot array.
    pub fn to_json(&self) -> serde_json::Value {
        let mut fields = serde_json::Map::new();
        for (name, value) in &self.fields {
            let value = serde_json::to_value(value).unwrap_or(serde_json::Value::Null);
            fields.insert((*name).to_string(), value);
        }
        serde_json::json!({
            "layout": self.layout.version,
            "timestamp": self.header.timestamp_us,
            "data_valid": self.header.data_valid,
            "update_counter": self.header.update_counter,
            "fields": fields,
            "all_variables": self.slots,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{FIXED_FIELDS, LayoutVersion};
    use proptest::prelude::*;

    fn valid_writer(layout: MemoryLayout) -> SnapshotWriter {
        let mut writer = SnapshotWriter::new(layout);
        writer.set_header(1_000, DATA_VALID, 1);
        writer
    }

    #[test]
    fn header_example_decodes() {
        let mut buffer = vec![0u8; 2800];
        buffer[8..12].copy_from_slice(&1u32.to_le_bytes());
        buffer[12..16].copy_from_slice(&42u32.to_le_bytes());
        buffer[16..24].copy_from_slice(&123.456f64.to_le_bytes());

        let view = SnapshotView::new(&buffer, MemoryLayout::COMPACT);
        let header = view.header();
        assert_eq!(header.data_valid, 1);
        assert_eq!(header.update_counter, 42);
        assert_eq!(view.read_f64(16), 123.456);
        assert_eq!(view.value("Aircraft.Latitude"), Some(Value::F64(123.456)));
    }

    #[test]
    fn out_of_range_reads_default_to_zero() {
        let buffer = [0xffu8; 20];
        let view = SnapshotView::new(&buffer, MemoryLayout::FULL);

        assert_eq!(view.read_f64(16), 0.0);
        assert_eq!(view.read_u32(18), 0);
        assert_eq!(view.read_vector3(128), (0.0, 0.0, 0.0));
        assert_eq!(view.read_f64(usize::MAX - 2), 0.0);
        assert_eq!(view.slot(0), 0.0);
        assert!(matches!(view.try_read_f64(16), Err(BridgeError::Memory { offset: 16, .. })));
    }

    #[test]
    fn invalid_snapshot_does_not_decode() {
        let mut writer = SnapshotWriter::new(MemoryLayout::FULL);
        writer.set_header(5, 0, 7);
        writer.set_field("Aircraft.Altitude", Value::F64(1500.0)).unwrap();

        let view = writer.view();
        assert!(!view.is_valid());
        assert!(view.decode().is_none());
        assert!(matches!(view.ensure_valid(), Err(BridgeError::InvalidData { data_valid: 0 })));
        // Raw reads still work for diagnostics
        assert_eq!(view.read_f64(32), 1500.0);
    }

    #[test]
    fn vector_and_text_fields() {
        let mut writer = valid_writer(MemoryLayout::FULL);
        writer.set_field("Aircraft.Wind", Value::Vector3(1.5, -2.0, 0.25)).unwrap();
        writer.set_field("Autopilot.ActiveLateralMode", Value::Text("HDG".into())).unwrap();
        writer.set_field("Warnings.MasterCaution", Value::U32(1)).unwrap();

        let decoded = writer.view().decode().expect("valid snapshot");
        assert_eq!(decoded.field("Aircraft.Wind"), Some(&Value::Vector3(1.5, -2.0, 0.25)));
        assert_eq!(
            decoded.field("Autopilot.ActiveLateralMode"),
            Some(&Value::Text("HDG".to_string()))
        );
        assert_eq!(decoded.get("Warnings.MasterCaution"), Some(1.0));
        assert_eq!(decoded.get("Aircraft.Wind"), None);
    }

    #[test]
    fn lookups_by_name_on_raw_view() {
        let mut writer = valid_writer(MemoryLayout::FULL);
        writer.set_field("Aircraft.Altitude", Value::F64(2100.0)).unwrap();
        let throttle = MemoryLayout::FULL.slot_index("Controls.Throttle").unwrap();
        writer.set_slot(throttle, 0.75).unwrap();

        let view = writer.view();
        assert_eq!(view.field("Aircraft.Altitude"), Some(Value::F64(2100.0)));
        assert_eq!(view.slot_by_name("Controls.Throttle"), Some(0.75));
        assert_eq!(view.field("Controls.Throttle"), None);
        assert_eq!(view.slot_by_name("Not.AVariable"), None);
    }

    #[test]
    fn memory_scan_reports_only_non_zero_entries() {
        let mut writer = valid_writer(MemoryLayout::FULL);
        writer.set_slot(53, 1.0).unwrap();
        writer.set_slot(142, 122_800_000.0).unwrap();
        writer.set_slot(200, 1e-12).unwrap();
        writer.write_f64(32, 950.0).unwrap();

        let view = writer.view();
        assert_eq!(view.ensure_valid().unwrap().update_counter, 1);
        assert_eq!(view.active_slots(ACTIVE_THRESHOLD), vec![(53, 1.0), (142, 122_800_000.0)]);

        let fixed: Vec<usize> =
            view.active_fixed_offsets(ACTIVE_THRESHOLD).into_iter().map(|(o, _)| o).collect();
        assert!(fixed.contains(&32));
        assert!(!fixed.contains(&672));

        let decoded = view.decode().unwrap();
        let named = decoded.active_slots(ACTIVE_THRESHOLD);
        assert_eq!(named[0], (53, "Aircraft.OnRunway", 1.0));
    }

    #[test]
    fn compact_buffer_read_with_full_layout_degrades() {
        // A 2800-byte mapping read with the 339-slot table: the tail is zero
        let mut writer = valid_writer(MemoryLayout::COMPACT);
        writer.set_slot(265, 4.0).unwrap();
        let view = SnapshotView::new(writer.as_bytes(), MemoryLayout::FULL);

        assert_eq!(view.slot(265), 4.0);
        assert_eq!(view.slot(300), 0.0);
        assert_eq!(view.decode().unwrap().slots.len(), 339);
    }

    #[test]
    fn json_dump_contains_header_and_fields() {
        let mut writer = valid_writer(MemoryLayout::COMPACT);
        writer.set_field("Aircraft.GroundSpeed", Value::F64(51.5)).unwrap();
        let json = writer.view().decode().unwrap().to_json();

        assert_eq!(json["layout"], "compact");
        assert_eq!(json["data_valid"], 1);
        assert_eq!(json["fields"]["Aircraft.GroundSpeed"], 51.5);
        assert_eq!(json["all_variables"].as_array().map(Vec::len), Some(266));
    }

    proptest! {
        #[test]
        fn every_fixed_f64_field_round_trips(
            version in prop::sample::select(LayoutVersion::ALL.to_vec()),
            value in prop::num::f64::NORMAL | prop::num::f64::ZERO
        ) {
            let layout = MemoryLayout::for_version(version);
            for field in FIXED_FIELDS.iter().filter(|f| f.kind == FieldKind::F64) {
                let mut writer = valid_writer(layout);
                writer.write_f64(field.offset, value).unwrap();
                let view = writer.view();
                prop_assert_eq!(view.read_f64(field.offset), value);
                prop_assert_eq!(view.value(field.name), Some(Value::F64(value)));
            }
        }

        #[test]
        fn every_slot_round_trips(
            version in prop::sample::select(LayoutVersion::ALL.to_vec()),
            value in prop::num::f64::NORMAL,
            index in 0usize..339
        ) {
            let layout = MemoryLayout::for_version(version);
            let mut writer = valid_writer(layout);
            let stored = writer.set_slot(index, value).is_ok();
            prop_assert_eq!(stored, index < layout.slot_count);

            let view = writer.view();
            let expected = if stored { value } else { 0.0 };
            prop_assert_eq!(view.slot(index), expected);
        }

        #[test]
        fn arbitrary_buffers_never_panic(
            data in prop::collection::vec(any::<u8>(), 0..4000),
            offset in 0usize..4000
        ) {
            let view = SnapshotView::new(&data, MemoryLayout::FULL);
            let _ = view.read_f64(offset);
            let _ = view.read_vector3(offset);
            let _ = view.read_fixed_str(offset, 16);
            let _ = view.decode();
        }
    }
}
