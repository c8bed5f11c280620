//! Human-readable rendering of snapshot values.
//!
//! Units are chosen from the variable name: the bridge publishes raw SI
//! values (radians, metres, m/s, Hz) and the console views convert them.

use std::io::Write;
use tracing::warn;

use crate::BridgeError;
use crate::monitor::DisplaySink;
use crate::snapshot::{DecodedSnapshot, SnapshotHeader, Value};

const DEGREES_PER_RADIAN: f64 = 57.2958;
const NAME_WIDTH: usize = 25;
const VALUE_WIDTH: usize = 12;

/// Variables shown by the console monitor when none are requested.
pub const DEFAULT_WATCH_LIST: &[&str] = &[
    "Aircraft.Latitude",
    "Aircraft.Longitude",
    "Aircraft.Altitude",
    "Aircraft.Height",
    "Aircraft.Pitch",
    "Aircraft.Bank",
    "Aircraft.TrueHeading",
    "Aircraft.MagneticHeading",
    "Aircraft.IndicatedAirspeed",
    "Aircraft.GroundSpeed",
    "Aircraft.VerticalSpeed",
    "Aircraft.MachNumber",
    "Aircraft.OnGround",
    "Aircraft.OnRunway",
    "Aircraft.Gear",
    "Aircraft.Flaps",
    "Aircraft.Throttle",
    "Aircraft.EngineRotationSpeed1",
    "Aircraft.EngineRunning1",
    "Navigation.NAV1Frequency",
    "Navigation.NAV2StandbyFrequency",
    "Communication.COM1Frequency",
    "Communication.COM1StandbyFrequency",
    "Communication.COM2Frequency",
    "Communication.TransponderCode",
    "Autopilot.Engaged",
    "Autopilot.SelectedHeading",
    "Autopilot.SelectedAltitude",
    "Autopilot.SelectedVerticalSpeed",
    "Controls.Pitch.Input",
    "Controls.Roll.Input",
    "Controls.Flaps",
];

fn contains_any(name: &str, words: &[&str]) -> bool {
    words.iter().any(|word| name.contains(word))
}

/// Format a scalar for display, eight characters wide plus unit.
pub fn format_value(name: &str, value: f64) -> String {
    if contains_any(name, &["Latitude", "Longitude"]) {
        format!("{:8.5}°", value * DEGREES_PER_RADIAN)
    } else if contains_any(name, &["Pitch", "Bank", "Heading", "Course"]) {
        format!("{:8.2}°", value * DEGREES_PER_RADIAN)
    } else if contains_any(name, &["Altitude", "Height"]) {
        format!("{value:8.1} m")
    } else if contains_any(name, &["RPM", "RotationSpeed"]) {
        format!("{value:8.0} RPM")
    } else if contains_any(name, &["Speed", "IAS", "VS"]) {
        format!("{value:8.1} m/s")
    } else if contains_any(name, &["Frequency", "COM", "NAV"]) {
        if value > 1_000_000.0 {
            format!("{:8.3} MHz", value / 1_000_000.0)
        } else {
            format!("{value:8.0} Hz")
        }
    } else if contains_any(name, &["Running", "Engaged", "OnGround", "OnRunway", "Crashed"]) {
        if value > 0.5 { "   YES".to_string() } else { "    NO".to_string() }
    } else if name.contains("Mach") {
        format!("{value:8.3}")
    } else if name.contains("Code") {
        format!("{value:8.0}")
    } else {
        format!("{value:8.3}")
    }
}

/// Format any decoded value; non-scalars are shown raw.
pub fn format_entry(name: &str, value: &Value) -> String {
    match value {
        Value::Text(text) => text.clone(),
        Value::Vector3(x, y, z) => format!("({x:.2}, {y:.2}, {z:.2})"),
        other => format_value(name, other.as_f64().unwrap_or_default()),
    }
}

/// Lay `(name, value)` cells out `columns` pairs per row.
pub fn render_table(cells: &[(String, String)], columns: usize) -> String {
    let columns = columns.max(1);
    let mut out = String::new();

    let header: Vec<String> = (0..columns)
        .map(|_| format!("{:NAME_WIDTH$} | {:VALUE_WIDTH$}", "Variable", "Value"))
        .collect();
    let header = header.join(" | ");
    out.push_str(&header);
    out.push('\n');
    out.push_str(&"-".repeat(header.chars().count()));
    out.push('\n');

    for row in cells.chunks(columns) {
        let line: Vec<String> = (0..columns)
            .map(|i| {
                let (name, value) = row.get(i).map_or(("", ""), |(n, v)| (n.as_str(), v.as_str()));
                let name: String = name.chars().take(NAME_WIDTH - 1).collect();
                format!("{name:NAME_WIDTH$} | {value:VALUE_WIDTH$}")
            })
            .collect();
        out.push_str(line.join(" | ").trim_end());
        out.push('\n');
    }
    out
}

/// Formatted cells for `names`, skipping names the layout does not know.
pub fn snapshot_cells(snapshot: &DecodedSnapshot, names: &[String]) -> Vec<(String, String)> {
    names
        .iter()
        .filter_map(|name| {
            let formatted = match snapshot.field(name) {
                Some(value) => format_entry(name, value),
                None => format_value(name, snapshot.get(name)?),
            };
            Some((name.clone(), formatted))
        })
        .collect()
}

/// Full-screen text rendering of a snapshot.
pub fn render_snapshot(snapshot: &DecodedSnapshot, names: &[String], columns: usize, rate_hz: f64) -> String {
    let header = snapshot.header;
    let cells = snapshot_cells(snapshot, names);
    format!(
        "Data Valid: {} | Update Counter: {} | Timestamp: {} | {:.1} Hz\n\n{}\nVariables monitored: {}\n",
        if header.is_valid() { "YES" } else { "NO" },
        header.update_counter,
        header.timestamp_us,
        rate_hz,
        render_table(&cells, columns),
        cells.len()
    )
}

/// Monitor output to a terminal, redrawing the screen per snapshot.
pub struct ConsoleSink<W: Write + Send + 'static = std::io::Stdout> {
    out: W,
    names: Vec<String>,
    columns: usize,
    clear: bool,
}

impl ConsoleSink {
    pub fn stdout(names: Vec<String>, columns: usize) -> Self {
        Self::new(std::io::stdout(), names, columns)
    }
}

impl<W: Write + Send + 'static> ConsoleSink<W> {
    pub fn new(out: W, names: Vec<String>, columns: usize) -> Self {
        let names = if names.is_empty() {
            DEFAULT_WATCH_LIST.iter().map(|s| s.to_string()).collect()
        } else {
            names
        };
        Self { out, names, columns, clear: false }
    }

    /// Clear the terminal before each redraw.
    pub fn clearing(mut self, clear: bool) -> Self {
        self.clear = clear;
        self
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn emit(&mut self, text: &str) {
        let prefix = if self.clear { "\x1b[2J\x1b[H" } else { "" };
        if let Err(e) = write!(self.out, "{prefix}{text}").and_then(|()| self.out.flush()) {
            warn!(error = %e, "Console write failed");
        }
    }
}

impl<W: Write + Send + 'static> DisplaySink for ConsoleSink<W> {
    fn on_snapshot(&mut self, snapshot: &DecodedSnapshot, rate_hz: f64) {
        let text = render_snapshot(snapshot, &self.names, self.columns, rate_hz);
        self.emit(&text);
    }

    fn on_waiting(&mut self, header: &SnapshotHeader) {
        let text = format!(
            "Waiting for valid data (data_valid = {}, update counter {})\n",
            header.data_valid, header.update_counter
        );
        self.emit(&text);
    }

    fn on_error(&mut self, error: &BridgeError) {
        self.emit(&format!("Read failed: {error}\n"));
    }
}
