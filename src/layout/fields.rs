//! Named fields of the fixed block (offsets 16..672).
//!
//! Offsets mirror the bridge's `AeroflyBridgeData` struct. Both layout
//! versions share this block; they only differ in the slot array that
//! follows it.

use super::{FieldDef, FieldKind};

const fn f64_at(name: &'static str, offset: usize) -> FieldDef {
    FieldDef { name, offset, kind: FieldKind::F64 }
}

const fn vec3_at(name: &'static str, offset: usize) -> FieldDef {
    FieldDef { name, offset, kind: FieldKind::Vector3 }
}

const fn u32_at(name: &'static str, offset: usize) -> FieldDef {
    FieldDef { name, offset, kind: FieldKind::U32 }
}

const fn str_at(name: &'static str, offset: usize, len: usize) -> FieldDef {
    FieldDef { name, offset, kind: FieldKind::FixedStr(len) }
}

/// Fixed-block field table, ordered by offset.
pub const FIXED_FIELDS: &[FieldDef] = &[
    // Aircraft basic
    f64_at("Aircraft.Latitude", 16),
    f64_at("Aircraft.Longitude", 24),
    f64_at("Aircraft.Altitude", 32),
    f64_at("Aircraft.Pitch", 40),
    f64_at("Aircraft.Bank", 48),
    f64_at("Aircraft.TrueHeading", 56),
    f64_at("Aircraft.MagneticHeading", 64),
    f64_at("Aircraft.IndicatedAirspeed", 72),
    // Aircraft physics
    f64_at("Aircraft.GroundSpeed", 80),
    f64_at("Aircraft.VerticalSpeed", 88),
    f64_at("Aircraft.AngleOfAttack", 96),
    f64_at("Aircraft.AngleOfAttackLimit", 104),
    f64_at("Aircraft.MachNumber", 112),
    f64_at("Aircraft.RateOfTurn", 120),
    vec3_at("Aircraft.Position", 128),
    vec3_at("Aircraft.Velocity", 152),
    vec3_at("Aircraft.Acceleration", 176),
    vec3_at("Aircraft.AngularVelocity", 200),
    vec3_at("Aircraft.Wind", 224),
    vec3_at("Aircraft.Gravity", 248),
    // Aircraft state
    f64_at("Aircraft.OnGround", 272),
    f64_at("Aircraft.OnRunway", 280),
    f64_at("Aircraft.Crashed", 288),
    f64_at("Aircraft.Gear", 296),
    f64_at("Aircraft.Flaps", 304),
    f64_at("Aircraft.Slats", 312),
    f64_at("Aircraft.Throttle", 320),
    f64_at("Aircraft.AirBrake", 328),
    // Engines
    f64_at("Aircraft.EngineThrottle1", 336),
    f64_at("Aircraft.EngineThrottle2", 344),
    f64_at("Aircraft.EngineThrottle3", 352),
    f64_at("Aircraft.EngineThrottle4", 360),
    f64_at("Aircraft.EngineRotationSpeed1", 368),
    f64_at("Aircraft.EngineRotationSpeed2", 376),
    f64_at("Aircraft.EngineRotationSpeed3", 384),
    f64_at("Aircraft.EngineRotationSpeed4", 392),
    f64_at("Aircraft.EngineRunning1", 400),
    f64_at("Aircraft.EngineRunning2", 408),
    f64_at("Aircraft.EngineRunning3", 416),
    f64_at("Aircraft.EngineRunning4", 424),
    // Control inputs
    f64_at("Controls.Pitch.Input", 432),
    f64_at("Controls.Roll.Input", 440),
    f64_at("Controls.Yaw.Input", 448),
    // Radios
    f64_at("Communication.COM1Frequency", 456),
    f64_at("Communication.COM1StandbyFrequency", 464),
    f64_at("Communication.COM2Frequency", 472),
    f64_at("Communication.COM2StandbyFrequency", 480),
    f64_at("Navigation.NAV1Frequency", 488),
    f64_at("Navigation.NAV1StandbyFrequency", 496),
    f64_at("Navigation.SelectedCourse1", 504),
    f64_at("Navigation.NAV2Frequency", 512),
    f64_at("Navigation.NAV2StandbyFrequency", 520),
    f64_at("Navigation.SelectedCourse2", 528),
    // Autopilot
    f64_at("Autopilot.Engaged", 536),
    f64_at("Autopilot.SelectedAirspeed", 544),
    f64_at("Autopilot.SelectedHeading", 552),
    f64_at("Autopilot.SelectedAltitude", 560),
    f64_at("Autopilot.SelectedVerticalSpeed", 568),
    f64_at("Autopilot.ThrottleEngaged", 576),
    str_at("Autopilot.ActiveLateralMode", 584, 16),
    str_at("Autopilot.ActiveVerticalMode", 600, 16),
    // Performance speeds
    f64_at("Performance.Speed.VS0", 616),
    f64_at("Performance.Speed.VS1", 624),
    f64_at("Performance.Speed.VFE", 632),
    f64_at("Performance.Speed.VNO", 640),
    f64_at("Performance.Speed.VNE", 648),
    // Warnings
    u32_at("Warnings.WarningFlags", 656),
    u32_at("Warnings.MasterWarning", 660),
    u32_at("Warnings.MasterCaution", 664),
];
