//! Versioned offset tables for the bridge's shared-memory block.
//!
//! The layout is dictated by the bridge DLL and cannot be discovered at
//! runtime, so every offset here is static data. Two builds of the bridge are
//! in circulation and they disagree on the size of the trailing slot array:
//!
//! | Version | Size | Slots |
//! |---|---|---|
//! | [`LayoutVersion::Compact`] | 2800 bytes | 266 |
//! | [`LayoutVersion::Full`] | 3384 bytes | 339 |
//!
//! Select one with [`MemoryLayout::for_version`] at startup and pass it to
//! every consumer; nothing else in the crate hardcodes an offset.
//!
//! ```rust
//! use aerobridge::layout::{LayoutVersion, MemoryLayout, Location};
//!
//! let layout = MemoryLayout::for_version(LayoutVersion::Full);
//! assert_eq!(layout.size, 3384);
//! assert_eq!(layout.slot_offset(53), Some(672 + 53 * 8));
//!
//! match layout.resolve("Aircraft.Altitude") {
//!     Some(Location::Field(field)) => assert_eq!(field.offset, 32),
//!     other => panic!("unexpected {:?}", other),
//! }
//! ```

mod fields;
mod slots;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::{BridgeError, Result};

pub use fields::FIXED_FIELDS;
pub use slots::{COMPACT_SLOT_COUNT, FULL_SLOT_COUNT, SLOT_NAMES};

/// Name of the bridge's file mapping.
pub const SHARED_MEMORY_NAME: &str = "AeroflyBridgeData";

/// Size of the header preceding the fixed block.
pub const HEADER_SIZE: usize = 16;
/// `u64` microseconds since the bridge started.
pub const TIMESTAMP_OFFSET: usize = 0;
/// `u32` validity flag; 1 means the snapshot may be trusted.
pub const DATA_VALID_OFFSET: usize = 8;
/// `u32` counter incremented by the bridge on every update.
pub const UPDATE_COUNTER_OFFSET: usize = 12;
/// Start of the `all_variables` slot array.
pub const SLOT_BASE: usize = 672;
/// Width of one slot.
pub const SLOT_SIZE: usize = 8;

/// Value of `data_valid` when the producer has published a usable snapshot.
pub const DATA_VALID: u32 = 1;

/// Bridge build the layout belongs to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayoutVersion {
    /// 2800-byte mapping with 266 slots.
    Compact,
    /// 3384-byte mapping with 339 slots.
    #[default]
    Full,
}

impl LayoutVersion {
    /// All known versions, oldest first.
    pub const ALL: [LayoutVersion; 2] = [LayoutVersion::Compact, LayoutVersion::Full];

    pub fn as_str(self) -> &'static str {
        match self {
            LayoutVersion::Compact => "compact",
            LayoutVersion::Full => "full",
        }
    }
}

impl fmt::Display for LayoutVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LayoutVersion {
    type Err = BridgeError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "compact" | "266" | "2800" => Ok(LayoutVersion::Compact),
            "full" | "339" | "3384" => Ok(LayoutVersion::Full),
            other => Err(BridgeError::config_error(format!(
                "unknown layout version '{other}' (expected 'compact' or 'full')"
            ))),
        }
    }
}

/// Storage type of a fixed-block field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    F64,
    U32,
    /// Three consecutive `f64` (x, y, z).
    Vector3,
    /// NUL-padded character array of the given length.
    FixedStr(usize),
}

impl FieldKind {
    /// Number of bytes the field occupies.
    pub const fn size(self) -> usize {
        match self {
            FieldKind::F64 => 8,
            FieldKind::U32 => 4,
            FieldKind::Vector3 => 24,
            FieldKind::FixedStr(len) => len,
        }
    }
}

/// A named field at a fixed byte offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDef {
    pub name: &'static str,
    pub offset: usize,
    pub kind: FieldKind,
}

/// Where a variable name lives in the snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Location {
    Field(&'static FieldDef),
    Slot(usize),
}

/// Complete description of one bridge build's shared-memory block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemoryLayout {
    pub version: LayoutVersion,
    /// Total mapping size in bytes.
    pub size: usize,
    pub slot_base: usize,
    pub slot_count: usize,
    pub fields: &'static [FieldDef],
}

impl MemoryLayout {
    pub const COMPACT: MemoryLayout = MemoryLayout {
        version: LayoutVersion::Compact,
        size: SLOT_BASE + COMPACT_SLOT_COUNT * SLOT_SIZE,
        slot_base: SLOT_BASE,
        slot_count: COMPACT_SLOT_COUNT,
        fields: FIXED_FIELDS,
    };

    pub const FULL: MemoryLayout = MemoryLayout {
        version: LayoutVersion::Full,
        size: SLOT_BASE + FULL_SLOT_COUNT * SLOT_SIZE,
        slot_base: SLOT_BASE,
        slot_count: FULL_SLOT_COUNT,
        fields: FIXED_FIELDS,
    };

    pub const fn for_version(version: LayoutVersion) -> MemoryLayout {
        match version {
            LayoutVersion::Compact => Self::COMPACT,
            LayoutVersion::Full => Self::FULL,
        }
    }

    /// Look up a fixed-block field by name.
    pub fn field(&self, name: &str) -> Option<&'static FieldDef> {
        self.fields.iter().find(|field| field.name == name)
    }

    /// Byte offset of a slot, or `None` past the end of this layout.
    pub fn slot_offset(&self, index: usize) -> Option<usize> {
        (index < self.slot_count).then(|| self.slot_base + index * SLOT_SIZE)
    }

    /// Name of a slot, or `None` past the end of this layout.
    pub fn slot_name(&self, index: usize) -> Option<&'static str> {
        self.slot_names().get(index).copied()
    }

    /// Index of the first slot carrying `name`.
    pub fn slot_index(&self, name: &str) -> Option<usize> {
        self.slot_names().iter().position(|slot| *slot == name)
    }

    /// Slot names valid for this layout.
    pub fn slot_names(&self) -> &'static [&'static str] {
        &SLOT_NAMES[..self.slot_count]
    }

    /// Resolve a variable name, preferring the fixed block over slots.
    ///
    /// Accepts `Slot[N]` / `all_variables[N]` for positional access.
    pub fn resolve(&self, name: &str) -> Option<Location> {
        if let Some(field) = self.field(name) {
            return Some(Location::Field(field));
        }
        if let Some(index) = parse_slot_reference(name) {
            return (index < self.slot_count).then_some(Location::Slot(index));
        }
        self.slot_index(name).map(Location::Slot)
    }
}

impl Default for MemoryLayout {
    fn default() -> Self {
        Self::for_version(LayoutVersion::default())
    }
}

fn parse_slot_reference(name: &str) -> Option<usize> {
    let inner = name
        .strip_prefix("Slot[")
        .or_else(|| name.strip_prefix("all_variables["))?
        .strip_suffix(']')?;
    inner.trim().parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sizes_match_bridge_builds() {
        assert_eq!(MemoryLayout::COMPACT.size, 2800);
        assert_eq!(MemoryLayout::FULL.size, 3384);
        assert_eq!(MemoryLayout::COMPACT.slot_names().len(), 266);
        assert_eq!(MemoryLayout::FULL.slot_names().len(), 339);
    }

    #[test]
    fn fixed_fields_fit_between_header_and_slots() {
        let mut previous_end = HEADER_SIZE;
        for field in FIXED_FIELDS {
            assert!(
                field.offset >= previous_end,
                "{} at {} overlaps previous field ending at {}",
                field.name,
                field.offset,
                previous_end
            );
            previous_end = field.offset + field.kind.size();
        }
        assert!(previous_end <= SLOT_BASE, "fixed block runs into slot array");
    }

    #[test]
    fn field_names_are_unique() {
        let mut names: Vec<_> = FIXED_FIELDS.iter().map(|f| f.name).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), FIXED_FIELDS.len());
    }

    #[test]
    fn known_slot_positions() {
        let layout = MemoryLayout::FULL;
        assert_eq!(layout.slot_index("Aircraft.OnRunway"), Some(53));
        assert_eq!(layout.slot_index("Aircraft.EngineMaster1"), Some(78));
        assert_eq!(layout.slot_index("Communication.COM1Frequency"), Some(142));
        assert_eq!(layout.slot_index("Autopilot.Engaged"), Some(172));
        assert_eq!(layout.slot_name(338), Some("Navigation.ILS2Data"));
    }

    #[test]
    fn compact_layout_truncates_slot_catalogue() {
        let compact = MemoryLayout::COMPACT;
        assert_eq!(compact.slot_offset(265), Some(672 + 265 * 8));
        assert_eq!(compact.slot_offset(266), None);
        assert_eq!(compact.slot_name(300), None);
        // Simulation.Pause sits at 303, beyond the compact array
        assert_eq!(compact.resolve("Simulation.Pause"), None);
        assert_eq!(MemoryLayout::FULL.resolve("Simulation.Pause"), Some(Location::Slot(303)));
    }

    #[test]
    fn resolve_prefers_fixed_block() {
        let layout = MemoryLayout::FULL;
        match layout.resolve("Aircraft.Altitude") {
            Some(Location::Field(field)) => assert_eq!(field.offset, 32),
            other => panic!("expected fixed field, got {:?}", other),
        }
        assert_eq!(layout.resolve("Aircraft.Height"), Some(Location::Slot(12)));
        assert_eq!(layout.resolve("Slot[7]"), Some(Location::Slot(7)));
        assert_eq!(layout.resolve("all_variables[338]"), Some(Location::Slot(338)));
        assert_eq!(layout.resolve("Slot[339]"), None);
        assert_eq!(layout.resolve("No.Such.Variable"), None);
    }

    #[test]
    fn version_parsing() {
        assert_eq!("compact".parse::<LayoutVersion>().unwrap(), LayoutVersion::Compact);
        assert_eq!("FULL".parse::<LayoutVersion>().unwrap(), LayoutVersion::Full);
        assert_eq!("2800".parse::<LayoutVersion>().unwrap(), LayoutVersion::Compact);
        assert!("v7".parse::<LayoutVersion>().is_err());
        for version in LayoutVersion::ALL {
            assert_eq!(version.to_string().parse::<LayoutVersion>().unwrap(), version);
        }
    }
}
