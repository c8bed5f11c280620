//! JSON frame published on the telemetry socket.

use serde::{Deserialize, Serialize};

use crate::snapshot::DecodedSnapshot;

/// One line of the telemetry stream. Every member is optional on input.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TelemetryFrame {
    pub timestamp: u64,
    pub data_valid: u32,
    pub update_counter: u32,
    pub aircraft: AircraftState,
    pub controls: ControlState,
    pub navigation: NavigationState,
    pub autopilot: AutopilotState,
    pub performance: PerformanceSpeeds,
    pub all_variables: Vec<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AircraftState {
    pub latitude: f64,
    pub longitude: f64,
    pub altitude: f64,
    pub pitch: f64,
    pub bank: f64,
    pub heading: f64,
    pub airspeed: f64,
    pub ground_speed: f64,
    pub vertical_speed: f64,
    pub angle_of_attack: f64,
    pub on_ground: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlState {
    pub pitch_input: f64,
    pub roll_input: f64,
    pub yaw_input: f64,
    pub throttle: f64,
    pub flaps: f64,
    pub gear: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NavigationState {
    pub com1_frequency: f64,
    pub com1_standby: f64,
    pub nav1_frequency: f64,
    pub nav1_course: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AutopilotState {
    pub engaged: f64,
    pub selected_airspeed: f64,
    pub selected_heading: f64,
    pub selected_altitude: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PerformanceSpeeds {
    pub vs0: f64,
    pub vs1: f64,
    pub vfe: f64,
    pub vno: f64,
    pub vne: f64,
}

impl TelemetryFrame {
    pub fn is_valid(&self) -> bool {
        self.data_valid == crate::layout::DATA_VALID
    }

    /// Parse one line. Returns `None` unless the trimmed line is a
    /// complete JSON object that deserializes.
    pub fn parse_line(line: &str) -> Option<TelemetryFrame> {
        let line = line.trim();
        if !(line.starts_with('{') && line.ends_with('}')) {
            return None;
        }
        serde_json::from_str(line).ok()
    }

    /// Build the frame the bridge would publish for a snapshot.
    pub fn from_snapshot(snapshot: &DecodedSnapshot) -> TelemetryFrame {
        let f = |name: &str| snapshot.get(name).unwrap_or(0.0);
        TelemetryFrame {
            timestamp: snapshot.header.timestamp_us,
            data_valid: snapshot.header.data_valid,
            update_counter: snapshot.header.update_counter,
            aircraft: AircraftState {
                latitude: f("Aircraft.Latitude"),
                longitude: f("Aircraft.Longitude"),
                altitude: f("Aircraft.Altitude"),
                pitch: f("Aircraft.Pitch"),
                bank: f("Aircraft.Bank"),
                heading: f("Aircraft.TrueHeading"),
                airspeed: f("Aircraft.IndicatedAirspeed"),
                ground_speed: f("Aircraft.GroundSpeed"),
                vertical_speed: f("Aircraft.VerticalSpeed"),
                angle_of_attack: f("Aircraft.AngleOfAttack"),
                on_ground: f("Aircraft.OnGround"),
            },
            controls: ControlState {
                pitch_input: f("Controls.Pitch.Input"),
                roll_input: f("Controls.Roll.Input"),
                yaw_input: f("Controls.Yaw.Input"),
                throttle: f("Aircraft.Throttle"),
                flaps: f("Aircraft.Flaps"),
                gear: f("Aircraft.Gear"),
            },
            navigation: NavigationState {
                com1_frequency: f("Communication.COM1Frequency"),
                com1_standby: f("Communication.COM1StandbyFrequency"),
                nav1_frequency: f("Navigation.NAV1Frequency"),
                nav1_course: f("Navigation.SelectedCourse1"),
            },
            autopilot: AutopilotState {
                engaged: f("Autopilot.Engaged"),
                selected_airspeed: f("Autopilot.SelectedAirspeed"),
                selected_heading: f("Autopilot.SelectedHeading"),
                selected_altitude: f("Autopilot.SelectedAltitude"),
            },
            performance: PerformanceSpeeds {
                vs0: f("Performance.Speed.VS0"),
                vs1: f("Performance.Speed.VS1"),
                vfe: f("Performance.Speed.VFE"),
                vno: f("Performance.Speed.VNO"),
                vne: f("Performance.Speed.VNE"),
            },
            all_variables: snapshot.slots.clone(),
        }
    }

    /// NDJSON encoding with trailing newline.
    pub fn to_line(&self) -> crate::Result<String> {
        let mut line = serde_json::to_string(self)?;
        line.push('\n');
        Ok(line)
    }

    /// Status line as shown by the stress tool.
    pub fn summary(&self) -> String {
        format!(
            "ALT: {:.1}m | SPD: {:.1}m/s | THR: {:.0}% | PITCH: {:.3} | ROLL: {:.3} | GEAR: {} | FLAPS: {:.0}% | #{}",
            self.aircraft.altitude,
            self.aircraft.airspeed,
            self.controls.throttle * 100.0,
            self.controls.pitch_input,
            self.controls.roll_input,
            if self.controls.gear > 0.5 { "DN" } else { "UP" },
            self.controls.flaps * 100.0,
            self.update_counter
        )
    }
}
