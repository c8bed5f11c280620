//! Canned command bursts for load-testing the bridge's command socket.
//!
//! Each preset is one or more fixed bursts of commands sent with
//! [`CommandClient::send_sequence`]. The resulting [`BatchReport`] is
//! graded by success rate and mean response time; the timing preset also
//! grades the spread of response times, and the precision preset's values
//! can be checked against a telemetry frame read back afterwards.

use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info};

use super::{BatchReport, Command, CommandClient, ResponseTiming};
use crate::stream::TelemetryFrame;
use crate::{BridgeError, Result};

/// Default pause between commands of a burst.
pub const DEFAULT_BURST_DELAY: Duration = Duration::from_millis(50);

/// Success rate a burst must exceed to pass.
pub const PASS_SUCCESS_RATE: f64 = 90.0;

/// Pause between the bursts of a multi-burst preset.
pub const RAPID_FIRE_GAP: Duration = Duration::from_millis(500);
const RAPID_FIRE_BURSTS: usize = 5;

/// Largest difference between a sent and a read-back value that still
/// counts as precise.
pub const PRECISION_TOLERANCE: f64 = 0.001;

/// Time to let the bridge apply precision values before reading back.
pub const PRECISION_SETTLE: Duration = Duration::from_secs(2);

const PRECISION_THROTTLE: f64 = 0.123456;
const PRECISION_PITCH: f64 = 0.05;

/// Response spread below which timing is consistent.
pub const CONSISTENT_SPREAD: Duration = Duration::from_millis(50);
/// Response spread below which timing is still acceptable.
pub const ACCEPTABLE_SPREAD: Duration = Duration::from_millis(100);

/// Named burst.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum StressPreset {
    Burst2,
    Burst5,
    Burst10,
    Burst20,
    /// Five bursts of three control inputs, half a second apart.
    RapidFire,
    /// Values with many significant digits; see [`check_precision`].
    Precision,
    /// The same control ten times with small increments.
    Timing,
}

impl StressPreset {
    pub const ALL: [StressPreset; 7] = [
        StressPreset::Burst2,
        StressPreset::Burst5,
        StressPreset::Burst10,
        StressPreset::Burst20,
        StressPreset::RapidFire,
        StressPreset::Precision,
        StressPreset::Timing,
    ];

    pub fn name(self) -> &'static str {
        match self {
            StressPreset::Burst2 => "burst-2",
            StressPreset::Burst5 => "burst-5",
            StressPreset::Burst10 => "burst-10",
            StressPreset::Burst20 => "burst-20",
            StressPreset::RapidFire => "rapid-fire",
            StressPreset::Precision => "precision",
            StressPreset::Timing => "timing",
        }
    }

    /// Mean response under which a passing burst rates as excellent.
    pub fn fast_threshold(self) -> Duration {
        match self {
            StressPreset::Burst2 => Duration::from_millis(200),
            StressPreset::Burst5 => Duration::from_millis(300),
            StressPreset::Burst10 => Duration::from_millis(400),
            StressPreset::Burst20 => Duration::from_millis(500),
            StressPreset::RapidFire => Duration::from_millis(300),
            StressPreset::Precision | StressPreset::Timing => Duration::from_millis(200),
        }
    }

    /// Every command of the preset, bursts concatenated.
    pub fn commands(self) -> Vec<Command> {
        self.bursts().concat()
    }

    /// Pause between consecutive bursts.
    pub fn burst_gap(self) -> Duration {
        match self {
            StressPreset::RapidFire => RAPID_FIRE_GAP,
            _ => Duration::ZERO,
        }
    }

    /// The preset's bursts in send order; single-burst presets return one.
    pub fn bursts(self) -> Vec<Vec<Command>> {
        let burst = match self {
            StressPreset::Burst2 => vec![
                Command::new("Controls.Throttle", 0.5),
                Command::new("Controls.Gear", 1.0),
            ],
            StressPreset::Burst5 => vec![
                Command::new("Controls.Throttle", 0.7),
                Command::new("Controls.Gear", 0.0),
                Command::new("Controls.Flaps", 0.5),
                Command::new("Controls.Pitch.Input", 0.1),
                Command::new("Controls.Roll.Input", -0.1),
            ],
            StressPreset::Burst10 => vec![
                Command::new("Controls.Throttle", 0.3),
                Command::new("Controls.Gear", 1.0),
                Command::new("Controls.Flaps", 1.0),
                Command::new("Controls.Pitch.Input", 0.0),
                Command::new("Controls.Roll.Input", 0.0),
                Command::new("Controls.Yaw.Input", 0.0),
                Command::new("Controls.WheelBrake.Left", 0.5),
                Command::new("Controls.WheelBrake.Right", 0.5),
                Command::new("Autopilot.SelectedAirspeed", 60.0),
                Command::new("Communication.COM1Frequency", 122_800_000.0),
            ],
            StressPreset::Burst20 => flood(20),
            StressPreset::RapidFire => {
                return (0..RAPID_FIRE_BURSTS).map(rapid_fire_burst).collect();
            }
            StressPreset::Precision => vec![
                Command::new("Controls.Throttle", PRECISION_THROTTLE),
                Command::new("Controls.Pitch.Input", PRECISION_PITCH),
                Command::new("Controls.Roll.Input", -0.03),
                Command::new("Autopilot.SelectedAirspeed", 67.89),
            ],
            StressPreset::Timing => (0..10)
                .map(|i| Command::new("Controls.Throttle", 0.5 + f64::from(i) * 0.01))
                .collect(),
        };
        vec![burst]
    }

    /// Send every burst through `client`, `delay` between commands and
    /// [`burst_gap`](Self::burst_gap) between bursts, into one report.
    pub async fn run(self, client: &CommandClient, delay: Duration) -> BatchReport {
        let bursts = self.bursts();
        let count = bursts.len();
        let mut report = BatchReport::new(Vec::new(), Duration::ZERO);

        for (index, burst) in bursts.iter().enumerate() {
            let result = client.send_sequence(burst, delay).await;
            debug!(
                preset = %self,
                burst = index + 1,
                of = count,
                result = %result.summary(),
                "Burst sent"
            );
            report.extend(result);

            let gap = self.burst_gap();
            if index + 1 < count && !gap.is_zero() {
                tokio::time::sleep(gap).await;
                report.total_time += gap;
            }
        }

        info!(preset = %self, result = %report.summary(), "Stress preset finished");
        report
    }

    pub fn grade(self, report: &BatchReport) -> StressGrade {
        if report.success_rate() <= PASS_SUCCESS_RATE {
            StressGrade::Degraded
        } else if report.average_response() < self.fast_threshold() {
            StressGrade::Excellent
        } else {
            StressGrade::Passed
        }
    }
}

/// Cycle through a varied set of controls, sweeping each value
/// deterministically so repeated runs send identical traffic.
fn flood(count: usize) -> Vec<Command> {
    const COM_FREQUENCIES: [f64; 3] = [121_500_000.0, 122_800_000.0, 124_200_000.0];
    const NAV_FREQUENCIES: [f64; 3] = [108_000_000.0, 110_500_000.0, 112_000_000.0];
    const FLAPS: [f64; 5] = [0.0, 0.25, 0.5, 0.75, 1.0];

    (0..count)
        .map(|i| {
            let sweep = (i % 9) as f64 / 8.0;
            match i % 8 {
                0 => Command::new("Controls.Throttle", 0.1 + 0.8 * sweep),
                1 => Command::new("Controls.Pitch.Input", -0.2 + 0.4 * sweep),
                2 => Command::new("Controls.Roll.Input", -0.2 + 0.4 * sweep),
                3 => Command::new("Controls.Yaw.Input", -0.1 + 0.2 * sweep),
                4 => Command::new("Controls.Flaps", FLAPS[i % FLAPS.len()]),
                5 => Command::new("Autopilot.SelectedAirspeed", 40.0 + 40.0 * sweep),
                6 => Command::new("Communication.COM1Frequency", COM_FREQUENCIES[i % 3]),
                _ => Command::new("Navigation.NAV1Frequency", NAV_FREQUENCIES[i % 3]),
            }
        })
        .collect()
}

/// Small pitch and roll inputs with a throttle in the cruise band.
fn rapid_fire_burst(burst: usize) -> Vec<Command> {
    let sweep = burst as f64 / (RAPID_FIRE_BURSTS - 1) as f64;
    vec![
        Command::new("Controls.Pitch.Input", -0.1 + 0.2 * sweep),
        Command::new("Controls.Roll.Input", 0.1 - 0.2 * sweep),
        Command::new("Controls.Throttle", 0.5 + 0.2 * sweep),
    ]
}

/// Consistency of response times, from their spread.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TimingConsistency {
    /// Spread under 50 ms.
    Consistent,
    /// Spread under 100 ms.
    Acceptable,
    Unstable,
}

impl TimingConsistency {
    pub fn from_timing(timing: &ResponseTiming) -> Self {
        let spread = timing.spread();
        if spread < CONSISTENT_SPREAD {
            TimingConsistency::Consistent
        } else if spread < ACCEPTABLE_SPREAD {
            TimingConsistency::Acceptable
        } else {
            TimingConsistency::Unstable
        }
    }

    /// Grade a report's delivered commands; `None` when none were delivered.
    pub fn of(report: &BatchReport) -> Option<Self> {
        report.timing().map(|timing| Self::from_timing(&timing))
    }
}

/// A precision value compared with what telemetry reports back.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PrecisionCheck {
    pub variable: &'static str,
    pub expected: f64,
    pub actual: f64,
}

impl PrecisionCheck {
    pub fn error(&self) -> f64 {
        (self.actual - self.expected).abs()
    }

    pub fn passed(&self) -> bool {
        self.error() < PRECISION_TOLERANCE
    }
}

/// Compare the precision preset's throttle and pitch input with a frame
/// received after [`PRECISION_SETTLE`].
pub fn check_precision(frame: &TelemetryFrame) -> Vec<PrecisionCheck> {
    vec![
        PrecisionCheck {
            variable: "Controls.Throttle",
            expected: PRECISION_THROTTLE,
            actual: frame.controls.throttle,
        },
        PrecisionCheck {
            variable: "Controls.Pitch.Input",
            expected: PRECISION_PITCH,
            actual: frame.controls.pitch_input,
        },
    ]
}

impl fmt::Display for StressPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for StressPreset {
    type Err = BridgeError;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_ascii_lowercase();
        StressPreset::ALL
            .into_iter()
            .find(|p| p.name() == wanted || p.name().trim_start_matches("burst-") == wanted)
            .ok_or_else(|| BridgeError::config_error(format!("unknown stress preset '{s}'")))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum StressGrade {
    /// Passed with a mean response under the preset's threshold.
    Excellent,
    /// More than 90 % delivered, but slower.
    Passed,
    /// 90 % or fewer delivered.
    Degraded,
}

impl StressGrade {
    pub fn is_pass(self) -> bool {
        !matches!(self, StressGrade::Degraded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::CommandOutcome;

    #[test]
    fn burst_sizes() {
        assert_eq!(StressPreset::Burst2.commands().len(), 2);
        assert_eq!(StressPreset::Burst5.commands().len(), 5);
        assert_eq!(StressPreset::Burst10.commands().len(), 10);
        assert_eq!(StressPreset::Burst20.commands().len(), 20);
        assert_eq!(StressPreset::Timing.commands().len(), 10);
        assert_eq!(StressPreset::Burst10.bursts().len(), 1);
    }

    #[test]
    fn rapid_fire_is_five_bursts_of_three() {
        let bursts = StressPreset::RapidFire.bursts();
        assert_eq!(bursts.len(), 5);
        assert!(bursts.iter().all(|burst| burst.len() == 3));
        assert_eq!(StressPreset::RapidFire.commands().len(), 15);
        assert_eq!(StressPreset::RapidFire.burst_gap(), Duration::from_millis(500));
        assert_eq!(StressPreset::Burst5.burst_gap(), Duration::ZERO);

        for command in StressPreset::RapidFire.commands() {
            let v = command.value;
            match command.variable.as_str() {
                "Controls.Throttle" => assert!((0.5..=0.7 + 1e-9).contains(&v)),
                _ => assert!((-0.1 - 1e-9..=0.1 + 1e-9).contains(&v), "{command}"),
            }
        }
    }

    #[test]
    fn timing_spread_grades() {
        let timing = |fast: u64, slow: u64| ResponseTiming {
            fastest: Duration::from_millis(fast),
            slowest: Duration::from_millis(slow),
            average: Duration::from_millis((fast + slow) / 2),
        };
        assert_eq!(TimingConsistency::from_timing(&timing(10, 59)), TimingConsistency::Consistent);
        assert_eq!(TimingConsistency::from_timing(&timing(10, 60)), TimingConsistency::Acceptable);
        assert_eq!(TimingConsistency::from_timing(&timing(10, 110)), TimingConsistency::Unstable);

        let failed = BatchReport::new(
            vec![CommandOutcome::failed(Command::new("X", 1.0), "refused")],
            Duration::ZERO,
        );
        assert_eq!(TimingConsistency::of(&failed), None);
    }

    #[test]
    fn precision_read_back() {
        let mut frame = TelemetryFrame::default();
        frame.controls.throttle = 0.1238;
        frame.controls.pitch_input = 0.05;
        let checks = check_precision(&frame);
        assert_eq!(checks.len(), 2);
        assert!(checks.iter().all(PrecisionCheck::passed));

        frame.controls.throttle = 0.125;
        let checks = check_precision(&frame);
        assert!(!checks[0].passed());
        assert!((checks[0].error() - 0.001544).abs() < 1e-9);
        assert!(checks[1].passed());

        // The sent values are the ones checked
        let sent = StressPreset::Precision.commands();
        assert_eq!(sent[0].value, checks[0].expected);
        assert_eq!(sent[1].value, checks[1].expected);
    }

    #[test]
    fn flood_stays_in_control_ranges() {
        for command in StressPreset::Burst20.commands() {
            let v = command.value;
            match command.variable.as_str() {
                "Controls.Throttle" => assert!((0.1..=0.9).contains(&v)),
                "Controls.Pitch.Input" | "Controls.Roll.Input" => assert!((-0.2..=0.2).contains(&v)),
                "Controls.Yaw.Input" => assert!((-0.1..=0.1).contains(&v)),
                "Autopilot.SelectedAirspeed" => assert!((40.0..=80.0).contains(&v)),
                _ => {}
            }
            assert!(command.qualifier.is_none());
        }
    }

    #[test]
    fn grading_uses_success_rate_then_speed() {
        let outcomes = |ok: usize, fail: usize, ms: u64| {
            let mut v: Vec<_> = (0..ok)
                .map(|_| CommandOutcome::delivered(Command::new("X", 1.0), Duration::from_millis(ms)))
                .collect();
            v.extend((0..fail).map(|_| CommandOutcome::failed(Command::new("X", 1.0), "refused")));
            BatchReport::new(v, Duration::from_secs(1))
        };

        assert_eq!(StressPreset::Burst10.grade(&outcomes(10, 0, 20)), StressGrade::Excellent);
        assert_eq!(StressPreset::Burst10.grade(&outcomes(10, 0, 450)), StressGrade::Passed);
        // Exactly 90 % does not pass
        assert_eq!(StressPreset::Burst10.grade(&outcomes(9, 1, 20)), StressGrade::Degraded);
        assert!(!StressGrade::Degraded.is_pass());
    }

    #[test]
    fn preset_names_parse() {
        assert_eq!("burst-5".parse::<StressPreset>().unwrap(), StressPreset::Burst5);
        assert_eq!("20".parse::<StressPreset>().unwrap(), StressPreset::Burst20);
        assert_eq!("Precision".parse::<StressPreset>().unwrap(), StressPreset::Precision);
        assert_eq!("rapid-fire".parse::<StressPreset>().unwrap(), StressPreset::RapidFire);
        assert!("burst-3".parse::<StressPreset>().is_err());
    }
}
