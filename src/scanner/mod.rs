//! Offline scanner for aircraft `controls.tmd` files.
//!
//! Every cockpit control in an aircraft definition that writes a simulator
//! variable does so through a `control_message` block naming the variable,
//! the event that fires it, an optional qualifier and the value sent. The
//! scanner collects those blocks across an installation so the slot table
//! and the command panels can be cross-checked against what the aircraft
//! actually use.
//!
//! ```rust,no_run
//! use aerobridge::scanner::TmdScanner;
//!
//! # fn run() -> aerobridge::Result<()> {
//! let result = TmdScanner::new(TmdScanner::default_root()).scan()?;
//! let stats = result.statistics();
//! println!("{} variables across {} aircraft", stats.variables.len(), stats.aircraft_scanned);
//! result.write_reports("tmd_results")?;
//! # Ok(())
//! # }
//! ```

mod extract;
mod report;
mod stats;

pub use extract::{extract_control_messages, find_parent_control};
pub use report::{
    AIRCRAFT_COMPARISON_FILE, CSV_FILE, DLL_GUIDE_FILE, DEFAULT_OUTPUT_DIR, VARIABLE_SUMMARY_FILE,
};
pub use stats::{AircraftStats, ScanStatistics, VariableStats};

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::{BridgeError, Result};

/// Aircraft folder of a default Steam installation.
pub const DEFAULT_AIRCRAFT_ROOT: &str =
    r"C:\Program Files (x86)\Steam\steamapps\common\Aerofly FS 4 Flight Simulator\aircraft";

/// File name the scanner looks for.
pub const CONTROLS_FILE_NAME: &str = "controls.tmd";

/// One `control_message` block. Built once, never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControlMessage {
    pub variable_name: String,
    pub event_type: String,
    pub qualifier: String,
    pub value: f64,
    pub aircraft: String,
    pub control_name: String,
    pub control_type: String,
    pub file_path: String,
}

/// A located `controls.tmd` and the aircraft it belongs to.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct TmdFile {
    pub aircraft: String,
    pub path: PathBuf,
}

/// Walks an aircraft directory tree for control definitions.
#[derive(Debug, Clone)]
pub struct TmdScanner {
    root: PathBuf,
}

impl TmdScanner {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn default_root() -> PathBuf {
        PathBuf::from(DEFAULT_AIRCRAFT_ROOT)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Every `controls.tmd` below the root, sorted by aircraft then path.
    ///
    /// Fails only when the root itself cannot be listed; unreadable
    /// subdirectories are logged and skipped.
    pub fn find_files(&self) -> Result<Vec<TmdFile>> {
        let entries =
            std::fs::read_dir(&self.root).map_err(|e| BridgeError::io_error(&self.root, e))?;

        let mut files = Vec::new();
        for entry in entries.flatten() {
            let path = entry.path();
            let aircraft = entry.file_name().to_string_lossy().into_owned();
            if path.is_dir() {
                collect_controls(&path, &aircraft, &mut files);
            } else if is_controls_file(&path) {
                // A controls.tmd directly under the root has no aircraft folder
                files.push(TmdFile { aircraft: String::new(), path });
            }
        }
        files.sort();
        debug!(root = %self.root.display(), count = files.len(), "Located control files");
        Ok(files)
    }

    /// Extract every control message below the root.
    pub fn scan(&self) -> Result<ScanResult> {
        let files = self.find_files()?;
        info!(root = %self.root.display(), files = files.len(), "Scanning control files");

        let mut result = ScanResult { files_found: files.len(), ..Default::default() };
        for file in &files {
            match scan_file(file) {
                Ok(messages) => {
                    debug!(
                        aircraft = %file.aircraft,
                        path = %file.path.display(),
                        messages = messages.len(),
                        "Scanned control file"
                    );
                    result.messages.extend(messages);
                }
                Err(e) => {
                    warn!(path = %file.path.display(), error = %e, "Skipping unreadable control file");
                    result.files_skipped += 1;
                }
            }
        }

        info!(
            files = result.files_found,
            skipped = result.files_skipped,
            messages = result.messages.len(),
            "Scan complete"
        );
        Ok(result)
    }
}

fn is_controls_file(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.eq_ignore_ascii_case(CONTROLS_FILE_NAME))
}

fn collect_controls(dir: &Path, aircraft: &str, files: &mut Vec<TmdFile>) {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            warn!(path = %dir.display(), error = %e, "Cannot list directory");
            return;
        }
    };
    for entry in entries.flatten() {
        let path = entry.path();
        match entry.file_type() {
            Ok(kind) if kind.is_dir() => collect_controls(&path, aircraft, files),
            Ok(_) if is_controls_file(&path) => {
                files.push(TmdFile { aircraft: aircraft.to_string(), path })
            }
            _ => {}
        }
    }
}

/// Read one file lossily and extract its messages.
pub fn scan_file(file: &TmdFile) -> Result<Vec<ControlMessage>> {
    let bytes = std::fs::read(&file.path).map_err(|e| BridgeError::io_error(&file.path, e))?;
    let content = String::from_utf8_lossy(&bytes);
    Ok(extract_control_messages(&content, &file.aircraft, &file.path.to_string_lossy()))
}

/// Everything a scan produced.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScanResult {
    pub messages: Vec<ControlMessage>,
    pub files_found: usize,
    pub files_skipped: usize,
}

impl ScanResult {
    pub fn statistics(&self) -> ScanStatistics {
        ScanStatistics::collect(&self.messages, self.files_found)
    }

    /// Write all reports into `dir`, creating it if needed. Returns the
    /// files written; nothing is written when no messages were found.
    pub fn write_reports(&self, dir: impl AsRef<Path>) -> Result<Vec<PathBuf>> {
        report::write_all(&self.messages, &self.statistics(), dir.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    const BLOCK: &str = r#"<[control_cylinder][Switch][]
    <[control_message][OnStep][]
        <[string8][Message][Controls.Magnetos1]>
        <[string8][Qualifiers][step]>
        <[float64][Value][1.0]>
    >
>
"#;

    fn write(path: &Path, content: &[u8]) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn finds_files_at_any_depth() {
        let root = tempfile::tempdir().unwrap();
        write(&root.path().join("c172/cockpit/controls.tmd"), BLOCK.as_bytes());
        write(&root.path().join("a320/controls.tmd"), BLOCK.as_bytes());
        write(&root.path().join("a320/base/deep/CONTROLS.TMD"), BLOCK.as_bytes());
        write(&root.path().join("a320/other.tmd"), BLOCK.as_bytes());

        let files = TmdScanner::new(root.path()).find_files().unwrap();
        let aircraft: Vec<_> = files.iter().map(|f| f.aircraft.as_str()).collect();
        assert_eq!(aircraft, ["a320", "a320", "c172"]);
    }

    #[test]
    fn scan_tolerates_invalid_utf8() {
        let root = tempfile::tempdir().unwrap();
        let mut bytes = b"\xff\xfe garbage ".to_vec();
        bytes.extend_from_slice(BLOCK.as_bytes());
        write(&root.path().join("dr400/controls.tmd"), &bytes);

        let result = TmdScanner::new(root.path()).scan().unwrap();
        assert_eq!(result.files_found, 1);
        assert_eq!(result.files_skipped, 0);
        assert_eq!(result.messages.len(), 1);
        assert_eq!(result.messages[0].aircraft, "dr400");
        assert_eq!(result.messages[0].control_name, "Switch");
    }

    #[test]
    fn missing_root_is_an_error() {
        let root = tempfile::tempdir().unwrap();
        let scanner = TmdScanner::new(root.path().join("nope"));
        assert!(matches!(scanner.scan(), Err(BridgeError::Io { .. })));
    }
}
