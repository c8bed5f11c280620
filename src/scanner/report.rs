//! Report files produced from a scan.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::info;

use super::{ControlMessage, ScanStatistics};
use crate::layout::MemoryLayout;
use crate::{BridgeError, Result};

pub const DEFAULT_OUTPUT_DIR: &str = "tmd_results";
pub const CSV_FILE: &str = "control_messages_complete.csv";
pub const VARIABLE_SUMMARY_FILE: &str = "variable_summary.txt";
pub const DLL_GUIDE_FILE: &str = "dll_implementation_guide.txt";
pub const AIRCRAFT_COMPARISON_FILE: &str = "aircraft_comparison.txt";

const TOP_VARIABLES: usize = 20;
const TEST_SEQUENCE_LEN: usize = 10;
const LISTED_AIRCRAFT: usize = 3;

pub(super) fn write_all(
    messages: &[ControlMessage],
    stats: &ScanStatistics,
    dir: &Path,
) -> Result<Vec<PathBuf>> {
    if messages.is_empty() {
        info!("No control messages found, no reports written");
        return Ok(Vec::new());
    }
    std::fs::create_dir_all(dir).map_err(|e| BridgeError::io_error(dir, e))?;

    let csv_path = dir.join(CSV_FILE);
    write_csv(messages, &csv_path)?;

    let mut written = vec![csv_path];
    for (name, render) in [
        (VARIABLE_SUMMARY_FILE, render_variable_summary as Renderer),
        (DLL_GUIDE_FILE, render_dll_guide),
        (AIRCRAFT_COMPARISON_FILE, render_aircraft_comparison),
    ] {
        let path = dir.join(name);
        write_text(&path, |out| render(stats, out))?;
        written.push(path);
    }

    info!(dir = %dir.display(), files = written.len(), "Reports written");
    Ok(written)
}

type Renderer = fn(&ScanStatistics, &mut dyn Write) -> io::Result<()>;

fn write_text(path: &Path, render: impl FnOnce(&mut dyn Write) -> io::Result<()>) -> Result<()> {
    let file = File::create(path).map_err(|e| BridgeError::io_error(path, e))?;
    let mut out = BufWriter::new(file);
    render(&mut out)
        .and_then(|()| out.flush())
        .map_err(|e| BridgeError::io_error(path, e))
}

/// All records, sorted by variable then aircraft.
fn write_csv(messages: &[ControlMessage], path: &Path) -> Result<()> {
    let mut sorted: Vec<&ControlMessage> = messages.iter().collect();
    sorted.sort_by(|a, b| {
        a.variable_name.cmp(&b.variable_name).then_with(|| a.aircraft.cmp(&b.aircraft))
    });

    let csv_error = |e: csv::Error| BridgeError::io_error(path, e.into());
    let mut writer = csv::Writer::from_path(path).map_err(csv_error)?;
    for message in sorted {
        writer.serialize(message).map_err(csv_error)?;
    }
    writer.flush().map_err(|e| BridgeError::io_error(path, e))
}

pub(super) fn render_variable_summary(stats: &ScanStatistics, out: &mut dyn Write) -> io::Result<()> {
    writeln!(out, "VARIABLE SUMMARY REPORT")?;
    writeln!(out, "{}\n", "=".repeat(30))?;

    writeln!(out, "SUMMARY STATISTICS")?;
    writeln!(out, "Aircraft scanned: {}", stats.aircraft_scanned)?;
    writeln!(out, "TMD files found: {}", stats.files_found)?;
    writeln!(out, "Total control messages: {}", stats.total_messages)?;
    writeln!(out, "Unique variables: {}\n", stats.unique_variables())?;

    writeln!(out, "EVENT TYPE DISTRIBUTION")?;
    for (event, count) in stats.event_distribution() {
        let percentage = count as f64 / stats.total_messages.max(1) as f64 * 100.0;
        writeln!(out, "{event:<15} {count:4} messages ({percentage:5.1}%)")?;
    }
    writeln!(out)?;

    writeln!(out, "MOST COMMON VARIABLES")?;
    for (name, variable) in stats.most_common_variables(TOP_VARIABLES) {
        writeln!(
            out,
            "{name:<45} {:3} msgs, {:2} aircraft",
            variable.messages,
            variable.aircraft.len()
        )?;
    }
    Ok(())
}

pub(super) fn render_dll_guide(stats: &ScanStatistics, out: &mut dyn Write) -> io::Result<()> {
    writeln!(out, "DLL IMPLEMENTATION GUIDE")?;
    writeln!(out, "{}\n", "=".repeat(30))?;

    writeln!(out, "READY-TO-IMPLEMENT C++ MAPPING")?;
    writeln!(out, "{}\n", "-".repeat(40))?;
    writeln!(out, "```cpp")?;
    writeln!(out, "// Auto-generated hybrid variable mapping")?;
    writeln!(out, "std::unordered_map<std::string, HybridVariableInfo> hybrid_mapping = {{")?;
    for (name, variable) in stats.consistent_variables() {
        let event = variable.event_types.first().map_or("", String::as_str);
        // Prefer a real qualifier over the empty default
        let qualifier = variable
            .qualifiers
            .iter()
            .find(|q| !q.is_empty())
            .map_or("", String::as_str);
        let value = variable.most_common_value().unwrap_or(1.0);
        writeln!(
            out,
            "    {{\"{name}\", HybridVariableInfo(\"{event}\", \"{qualifier}\", {value:?})}}, // {} aircraft",
            variable.aircraft.len()
        )?;
    }
    writeln!(out, "}};")?;
    writeln!(out, "```\n")?;

    writeln!(out, "TEST CASES FOR VALIDATION")?;
    writeln!(out, "{}", "-".repeat(30))?;
    writeln!(out, "Recommended test sequence:\n")?;
    for (i, (name, variable)) in stats.most_common_variables(TEST_SEQUENCE_LEN).into_iter().enumerate() {
        let event = if variable.is_consistent() {
            variable.event_types.first().map_or("", String::as_str)
        } else {
            "mixed"
        };
        let listed = variable
            .aircraft
            .iter()
            .take(LISTED_AIRCRAFT)
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(", ");
        let more = variable.aircraft.len().saturating_sub(LISTED_AIRCRAFT);
        let suffix = if more > 0 { format!(" (+{more} more)") } else { String::new() };

        writeln!(out, "{:2}. {{\"variable\": \"{name}\", \"value\": 1.0}}", i + 1)?;
        writeln!(out, "    Event: {event}, Aircraft: {listed}{suffix}\n")?;
    }

    // Cross-reference with the shared-memory catalogue
    let (mapped, unmapped) = stats.bridge_coverage(&MemoryLayout::FULL);
    writeln!(out, "BRIDGE COVERAGE")?;
    writeln!(out, "{}", "-".repeat(30))?;
    writeln!(
        out,
        "{} of {} variables readable from shared memory ({} layout)\n",
        mapped.len(),
        stats.unique_variables(),
        MemoryLayout::FULL.version
    )?;
    if !unmapped.is_empty() {
        writeln!(out, "Not in the memory layout:")?;
        for name in unmapped {
            writeln!(out, "    {name}")?;
        }
    }
    Ok(())
}

pub(super) fn render_aircraft_comparison(stats: &ScanStatistics, out: &mut dyn Write) -> io::Result<()> {
    writeln!(out, "AIRCRAFT COMPARISON REPORT")?;
    writeln!(out, "{}\n", "=".repeat(35))?;
    writeln!(out, "VARIABLES BY AIRCRAFT")?;
    writeln!(out, "{}", "-".repeat(25))?;
    for (name, aircraft) in stats.aircraft_by_variable_count() {
        writeln!(
            out,
            "{name:<20} {:3} variables, {:3} messages",
            aircraft.variables.len(),
            aircraft.messages
        )?;
    }
    Ok(())
}
