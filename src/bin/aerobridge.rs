//! aerobridge CLI
//!
//! Command-line front end for the bridge client library.

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use futures::StreamExt;
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

use aerobridge::command::stress::{
    DEFAULT_BURST_DELAY, PRECISION_SETTLE, StressPreset, TimingConsistency, check_precision,
};
use aerobridge::command::{BatchReport, CommandClient, Qualifier};
use aerobridge::display::{self, ConsoleSink};
use aerobridge::layout::{LayoutVersion, MemoryLayout};
use aerobridge::monitor::{Monitor, interval_for_rate};
use aerobridge::panel::{BUILTIN_PANELS, Panel, PanelEntry};
use aerobridge::scanner::TmdScanner;
use aerobridge::shm::SharedMemory;
use aerobridge::snapshot::{ACTIVE_THRESHOLD, SnapshotView};
use aerobridge::stream::TelemetryStream;
use aerobridge::{BridgeConfig, BridgeError};

#[derive(Parser)]
#[command(name = "aerobridge", version)]
#[command(about = "Monitor, command and inspect the Aerofly FS bridge", long_about = None)]
struct Cli {
    /// YAML config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Bridge host
    #[arg(long, global = true)]
    host: Option<String>,

    /// Command socket port
    #[arg(long, global = true)]
    command_port: Option<u16>,

    /// Telemetry socket port
    #[arg(long, global = true)]
    data_port: Option<u16>,

    /// Shared-memory layout (compact or full)
    #[arg(long, global = true)]
    layout: Option<LayoutVersion>,

    /// Debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Poll shared memory and redraw a table of variables
    Monitor {
        /// Updates per second (2-20)
        #[arg(long)]
        rate: Option<f64>,
        /// Variables to show; defaults to a standard flight set
        #[arg(long, value_delimiter = ',')]
        vars: Vec<String>,
        #[arg(long, default_value_t = 4)]
        columns: usize,
        /// Append output instead of clearing the screen
        #[arg(long)]
        no_clear: bool,
    },
    /// Print one decoded snapshot
    Dump {
        /// Emit JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// List non-zero values in the fixed block and the slot array
    ScanMemory {
        #[arg(long, default_value_t = ACTIVE_THRESHOLD)]
        threshold: f64,
    },
    /// Send a single command
    Send {
        variable: String,
        #[arg(allow_negative_numbers = true)]
        value: f64,
        /// step, toggle, event or offset
        #[arg(long)]
        qualifier: Option<String>,
    },
    /// Work with control panels
    Panel {
        #[command(subcommand)]
        action: PanelAction,
    },
    /// Send canned bursts and grade the bridge's responsiveness
    Stress {
        /// Preset name, or "all"
        #[arg(default_value = "all")]
        preset: String,
        /// Pause between commands in milliseconds
        #[arg(long, default_value_t = DEFAULT_BURST_DELAY.as_millis() as u64)]
        delay_ms: u64,
    },
    /// Print frames from the telemetry socket
    Stream {
        /// Stop after this many frames
        #[arg(long)]
        count: Option<usize>,
        #[arg(long)]
        json: bool,
    },
    /// Extract control messages from aircraft controls.tmd files
    ScanTmd {
        /// Aircraft directory
        #[arg(long)]
        root: Option<PathBuf>,
        /// Report directory
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
enum PanelAction {
    /// Built-in panels
    List,
    /// Print a panel's buttons
    Show { panel: String },
    /// Press a button by label
    Press { panel: String, label: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = resolve_config(&cli)?;
    let layout = MemoryLayout::for_version(config.layout);

    match cli.command {
        Commands::Monitor { rate, vars, columns, no_clear } => {
            let memory = open_memory(&config, layout)?;
            let interval = interval_for_rate(rate.unwrap_or(config.poll_rate_hz));
            let sink = ConsoleSink::stdout(vars, columns).clearing(!no_clear);
            let mut handle = Monitor::spawn(memory, sink, interval);

            tokio::signal::ctrl_c().await.context("waiting for Ctrl+C")?;
            let stats = handle.stop().await;
            println!(
                "\nMonitor stopped: {} polls, {} snapshots, {} errors",
                stats.polls, stats.snapshots, stats.errors
            );
        }
        Commands::Dump { json } => {
            let memory = open_memory(&config, layout)?;
            let bytes = memory.snapshot();
            let view = SnapshotView::new(&bytes, layout);
            let Some(snapshot) = view.decode() else {
                bail!(BridgeError::InvalidData { data_valid: view.header().data_valid });
            };
            if json {
                println!("{}", serde_json::to_string_pretty(&snapshot.to_json())?);
            } else {
                let names: Vec<String> =
                    snapshot.fields.iter().map(|(name, _)| name.to_string()).collect();
                print!("{}", display::render_snapshot(&snapshot, &names, 2, 0.0));
            }
        }
        Commands::ScanMemory { threshold } => {
            let memory = open_memory(&config, layout)?;
            let bytes = memory.snapshot();
            let view = SnapshotView::new(&bytes, layout);
            // Stale slots from an invalid snapshot would read as active
            let header = view.ensure_valid()?;
            println!(
                "Data Valid: {} | Update Counter: {} | Layout: {}",
                header.data_valid, header.update_counter, layout.version
            );

            println!("\nFixed block:");
            for (offset, value) in view.active_fixed_offsets(threshold) {
                println!("  offset {offset:4}: {value:15.6}");
            }
            println!("\nSlots:");
            let active = view.active_slots(threshold);
            for (index, value) in &active {
                let name = layout.slot_name(*index).unwrap_or("?");
                println!("  [{index:3}] {name:<45} {value:15.6}");
            }
            println!("\n{} of {} slots active", active.len(), layout.slot_count);
        }
        Commands::Send { variable, value, qualifier } => {
            let qualifier = match qualifier {
                Some(q) => Qualifier::parse_optional(&q)?,
                None => None,
            };
            let command = aerobridge::command::Command::with_qualifier(variable, value, qualifier);
            let elapsed = command_client(&config)
                .try_send(&command)
                .await
                .with_context(|| format!("sending {command}"))?;
            println!("Sent {command} ({:.1} ms)", elapsed.as_secs_f64() * 1000.0);
        }
        Commands::Panel { action } => run_panel(action, &config).await?,
        Commands::Stress { preset, delay_ms } => {
            let presets = if preset.eq_ignore_ascii_case("all") {
                StressPreset::ALL.to_vec()
            } else {
                vec![preset.parse::<StressPreset>()?]
            };
            let client = command_client(&config);
            let delay = Duration::from_millis(delay_ms);

            let mut failed = 0;
            for preset in presets {
                // Subscribe before sending so the read-back frame is fresh
                let telemetry = (preset == StressPreset::Precision)
                    .then(|| TelemetryStream::new(config.host.clone(), config.data_port).spawn());

                let report = preset.run(&client, delay).await;
                let grade = preset.grade(&report);
                print_report(preset.name(), &report);
                if let Some(timing) = report.timing() {
                    println!(
                        "  Fastest {:.1} ms, slowest {:.1} ms, spread {:.1} ms: {:?}",
                        timing.fastest.as_secs_f64() * 1000.0,
                        timing.slowest.as_secs_f64() * 1000.0,
                        timing.spread().as_secs_f64() * 1000.0,
                        TimingConsistency::from_timing(&timing)
                    );
                }
                println!("  Grade: {grade:?}");
                if !grade.is_pass() {
                    failed += 1;
                }

                if let Some(telemetry) = telemetry {
                    tokio::time::sleep(PRECISION_SETTLE).await;
                    match telemetry.latest() {
                        Some(frame) => {
                            for check in check_precision(&frame) {
                                println!(
                                    "  {}: expected {:.6}, got {:.6} (error {:.6}) {}",
                                    check.variable,
                                    check.expected,
                                    check.actual,
                                    check.error(),
                                    if check.passed() { "ok" } else { "PRECISION LOSS" }
                                );
                                if !check.passed() {
                                    failed += 1;
                                }
                            }
                        }
                        None => println!("  No telemetry frame received, precision not checked"),
                    }
                    telemetry.stop();
                }
                println!();
            }
            if failed > 0 {
                bail!("{failed} stress check(s) failed");
            }
        }
        Commands::Stream { count, json } => {
            let handle = TelemetryStream::new(config.host.clone(), config.data_port).spawn();
            let frames = handle.subscribe();
            let mut frames: std::pin::Pin<Box<dyn futures::Stream<Item = _> + Send>> =
                match count {
                    Some(n) => Box::pin(frames.take(n)),
                    None => Box::pin(frames),
                };
            loop {
                tokio::select! {
                    frame = frames.next() => {
                        let Some(frame) = frame else { break };
                        if json {
                            print!("{}", frame.to_line()?);
                        } else {
                            println!("{}", frame.summary());
                        }
                    }
                    _ = tokio::signal::ctrl_c() => break,
                }
            }
            handle.stop();
        }
        Commands::ScanTmd { root, output } => {
            let root = root.unwrap_or(config.aircraft_root);
            let output = output.unwrap_or(config.output_dir);

            let result = TmdScanner::new(&root)
                .scan()
                .with_context(|| format!("scanning {}", root.display()))?;
            let stats = result.statistics();
            let written = result.write_reports(&output)?;

            println!("Control files found:   {}", stats.files_found);
            println!("Aircraft with controls: {}", stats.aircraft_scanned);
            println!("Control messages:      {}", stats.total_messages);
            println!("Unique variables:      {}", stats.unique_variables());
            if written.is_empty() {
                println!("No control messages found, no reports written");
            }
            for path in written {
                println!("  wrote {}", path.display());
            }
        }
    }
    Ok(())
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}

/// Config file and environment, then flags.
fn resolve_config(cli: &Cli) -> Result<BridgeConfig> {
    let mut config = BridgeConfig::resolve(cli.config.as_deref())?;
    if let Some(host) = &cli.host {
        config.host = host.clone();
    }
    if let Some(port) = cli.command_port {
        config.command_port = port;
    }
    if let Some(port) = cli.data_port {
        config.data_port = port;
    }
    if let Some(layout) = cli.layout {
        config.layout = layout;
    }
    config.validate()?;
    Ok(config)
}

fn open_memory(config: &BridgeConfig, layout: MemoryLayout) -> Result<SharedMemory> {
    let memory = SharedMemory::open_named(&config.shared_memory_name, layout)
        .with_context(|| format!("opening shared memory '{}'", config.shared_memory_name))?;
    info!(name = %config.shared_memory_name, layout = %layout.version, "Shared memory opened");
    Ok(memory)
}

fn command_client(config: &BridgeConfig) -> CommandClient {
    CommandClient::new(config.host.clone(), config.command_port)
        .with_timeout(config.command_timeout())
}

async fn run_panel(action: PanelAction, config: &BridgeConfig) -> Result<()> {
    match action {
        PanelAction::List => {
            for name in BUILTIN_PANELS {
                let panel = Panel::builtin(name)?;
                println!("{name:<12} {} ({} buttons)", panel.title, panel.entries().count());
            }
        }
        PanelAction::Show { panel } => {
            let panel = Panel::resolve(&panel)?;
            println!("{}", panel.title);
            for section in &panel.sections {
                println!("\n[{}]", section.title);
                for entry in &section.entries {
                    match entry {
                        PanelEntry::Single { .. } => {
                            let command = entry.commands().remove(0);
                            println!("  {:<28} {command}", entry.label());
                        }
                        PanelEntry::Multi { .. } => {
                            println!("  {}", entry.label());
                            for command in entry.commands() {
                                println!("      {command}");
                            }
                        }
                    }
                }
            }
        }
        PanelAction::Press { panel, label } => {
            let panel = Panel::resolve(&panel)?;
            let entry = panel
                .find(&label)
                .with_context(|| format!("no button '{label}' in panel '{}'", panel.name))?;
            let report = entry.press(&command_client(config)).await;
            print_report(entry.label(), &report);
            if !report.all_delivered() {
                bail!("{}", report.summary());
            }
        }
    }
    Ok(())
}

fn print_report(name: &str, report: &BatchReport) {
    println!("{name}: {}", report.summary());
    for outcome in &report.outcomes {
        match &outcome.error {
            None => println!(
                "  ok    {} ({:.1} ms)",
                outcome.command,
                outcome.elapsed.as_secs_f64() * 1000.0
            ),
            Some(error) => println!("  FAIL  {} ({error})", outcome.command),
        }
    }
    println!(
        "  Success rate {:.1}%, mean response {:.1} ms, {:.1} commands/s",
        report.success_rate(),
        report.average_response().as_secs_f64() * 1000.0,
        report.commands_per_second()
    );
}
