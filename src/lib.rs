//! Client library for the Aerofly FS bridge.
//!
//! The bridge is a simulator plugin exposing three interfaces: a named
//! shared-memory snapshot of the aircraft state, a TCP socket accepting one
//! JSON command per connection, and a TCP socket streaming telemetry as
//! newline-delimited JSON. This crate reads, writes and inspects all three,
//! and scans aircraft definition files for the variables their cockpit
//! controls use.
//!
//! # Features
//!
//! - **Snapshot decoding**: versioned offset tables ([`layout`]) and a
//!   bounds-checked reader ([`snapshot`]) for both bridge builds
//! - **Live polling**: a cancellable monitor task publishing decoded
//!   snapshots ([`monitor`]) over the Windows mapping ([`shm`])
//! - **Commands**: at-most-once JSON writes with timing reports
//!   ([`command`]) and declarative button panels ([`panel`])
//! - **Telemetry stream**: reconnecting NDJSON reader ([`stream`])
//! - **TMD scanner**: offline extraction of control messages ([`scanner`])
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use aerobridge::command::{CommandClient, Qualifier};
//!
//! # async fn run() {
//! let client = CommandClient::new("127.0.0.1", 12346);
//! if !client.send("Controls.Magnetos1", 1.0, Some(Qualifier::Step)).await {
//!     eprintln!("bridge not reachable");
//! }
//! # }
//! ```
//!
//! ## Decoding a snapshot
//!
//! ```rust
//! use aerobridge::layout::MemoryLayout;
//! use aerobridge::snapshot::{SnapshotView, SnapshotWriter};
//!
//! let mut writer = SnapshotWriter::new(MemoryLayout::FULL);
//! writer.set_header(0, 1, 42);
//! let view = SnapshotView::new(writer.as_bytes(), MemoryLayout::FULL);
//! assert_eq!(view.header().update_counter, 42);
//! ```

mod error;

pub mod command;
pub mod config;
pub mod display;
pub mod layout;
pub mod monitor;
pub mod panel;
pub mod scanner;
pub mod shm;
pub mod snapshot;
pub mod stream;

pub use error::*;

pub use config::BridgeConfig;
pub use layout::{LayoutVersion, MemoryLayout};
pub use snapshot::{DecodedSnapshot, SnapshotView};
