//! Slot catalogue for the trailing `all_variables` array.
//!
//! The bridge writes one `f64` per slot, indexed by position only. Names
//! follow the variable paths used on the command socket; entries that are
//! a flag of another variable carry a `:Flag` suffix (for example
//! `Controls.Gear:Toggle`).

/// Number of slots written by the full bridge build.
pub const FULL_SLOT_COUNT: usize = 339;

/// Number of slots that fit in the compact 2800-byte mapping.
pub const COMPACT_SLOT_COUNT: usize = 266;

/// Slot names by index.
pub static SLOT_NAMES: [&str; FULL_SLOT_COUNT] = [
    // Aircraft (0..)
    "Aircraft.UniversalTime",
    "Aircraft.Altitude",
    "Aircraft.VerticalSpeed",
    "Aircraft.Pitch",
    "Aircraft.Bank",
    "Aircraft.IndicatedAirspeed",
    "Aircraft.IndicatedAirspeedTrend",
    "Aircraft.GroundSpeed",
    "Aircraft.MagneticHeading",
    "Aircraft.TrueHeading",
    "Aircraft.Latitude",
    "Aircraft.Longitude",
    "Aircraft.Height",
    "Aircraft.Position",
    "Aircraft.Orientation",
    "Aircraft.Velocity",
    "Aircraft.AngularVelocity",
    "Aircraft.Acceleration",
    "Aircraft.Gravity",
    "Aircraft.Wind",
    "Aircraft.RateOfTurn",
    "Aircraft.MachNumber",
    "Aircraft.AngleOfAttack",
    "Aircraft.AngleOfAttackLimit",
    "Aircraft.AccelerationLimit",
    "Aircraft.Gear",
    "Aircraft.Flaps",
    "Aircraft.Slats",
    "Aircraft.Throttle",
    "Aircraft.AirBrake",
    "Aircraft.GroundSpoilersArmed",
    "Aircraft.GroundSpoilersExtended",
    "Aircraft.ParkingBrake",
    "Aircraft.AutoBrakeSetting",
    "Aircraft.AutoBrakeEngaged",
    "Aircraft.AutoBrakeRejectedTakeOff",
    "Aircraft.RadarAltitude",
    "Aircraft.Name",
    "Aircraft.NearestAirportIdentifier",
    "Aircraft.NearestAirportName",
    "Aircraft.NearestAirportLocation",
    "Aircraft.NearestAirportElevation",
    "Aircraft.BestAirportIdentifier",
    "Aircraft.BestAirportName",
    "Aircraft.BestAirportLocation",
    "Aircraft.BestAirportElevation",
    "Aircraft.BestRunwayIdentifier",
    "Aircraft.BestRunwayElevation",
    "Aircraft.BestRunwayThreshold",
    "Aircraft.BestRunwayEnd",
    "Aircraft.Category.Jet",
    "Aircraft.Category.Glider",
    "Aircraft.OnGround",
    "Aircraft.OnRunway",
    "Aircraft.Crashed",
    "Aircraft.Power",
    "Aircraft.NormalizedPower",
    "Aircraft.NormalizedPowerTarget",
    "Aircraft.Trim",
    "Aircraft.PitchTrim",
    "Aircraft.PitchTrimScaling",
    "Aircraft.PitchTrimOffset",
    "Aircraft.RudderTrim",
    "Aircraft.AutoPitchTrim",
    "Aircraft.YawDamperEnabled",
    "Aircraft.RudderPedalsDisconnected",
    "Aircraft.Starter",
    "Aircraft.Starter1",
    "Aircraft.Starter2",
    "Aircraft.Starter3",
    "Aircraft.Starter4",
    "Aircraft.Ignition",
    "Aircraft.Ignition1",
    "Aircraft.Ignition2",
    "Aircraft.Ignition3",
    "Aircraft.Ignition4",
    "Aircraft.ThrottleLimit",
    "Aircraft.Reverse",
    "Aircraft.EngineMaster1",
    "Aircraft.EngineMaster2",
    "Aircraft.EngineMaster3",
    "Aircraft.EngineMaster4",
    "Aircraft.EngineThrottle1",
    "Aircraft.EngineThrottle2",
    "Aircraft.EngineThrottle3",
    "Aircraft.EngineThrottle4",
    "Aircraft.EngineRotationSpeed1",
    "Aircraft.EngineRotationSpeed2",
    "Aircraft.EngineRotationSpeed3",
    "Aircraft.EngineRotationSpeed4",
    "Aircraft.EngineRunning1",
    "Aircraft.EngineRunning2",
    "Aircraft.EngineRunning3",
    "Aircraft.EngineRunning4",
    "Aircraft.APUAvailable",

    // Performance and configuration (95..)
    "Performance.Speed.VS0",
    "Performance.Speed.VS1",
    "Performance.Speed.VFE",
    "Performance.Speed.VNO",
    "Performance.Speed.VNE",
    "Performance.Speed.VAPP",
    "Performance.Speed.Minimum",
    "Performance.Speed.Maximum",
    "Performance.Speed.MinimumFlapRetraction",
    "Performance.Speed.MaximumFlapExtension",
    "Configuration.SelectedTakeOffFlaps",
    "Configuration.SelectedLandingFlaps",

    // Navigation (107..)
    "FlightManagementSystem.FlightNumber",
    "Navigation.SelectedCourse1",
    "Navigation.SelectedCourse2",
    "Navigation.NAV1Identifier",
    "Navigation.NAV1Frequency",
    "Navigation.NAV1StandbyFrequency",
    "Navigation.NAV1FrequencySwap",
    "Navigation.NAV2Identifier",
    "Navigation.NAV2Frequency",
    "Navigation.NAV2StandbyFrequency",
    "Navigation.NAV2FrequencySwap",
    "Navigation.DME1Frequency",
    "Navigation.DME1Distance",
    "Navigation.DME1Time",
    "Navigation.DME1Speed",
    "Navigation.DME2Frequency",
    "Navigation.DME2Distance",
    "Navigation.DME2Time",
    "Navigation.DME2Speed",
    "Navigation.ILS1Identifier",
    "Navigation.ILS1Course",
    "Navigation.ILS1Frequency",
    "Navigation.ILS1StandbyFrequency",
    "Navigation.ILS1FrequencySwap",
    "Navigation.ILS2Identifier",
    "Navigation.ILS2Course",
    "Navigation.ILS2Frequency",
    "Navigation.ILS2StandbyFrequency",
    "Navigation.ILS2FrequencySwap",
    "Navigation.ADF1Frequency",
    "Navigation.ADF1StandbyFrequency",
    "Navigation.ADF1FrequencySwap",
    "Navigation.ADF2Frequency",
    "Navigation.ADF2StandbyFrequency",
    "Navigation.ADF2FrequencySwap",

    // Communication (142..)
    "Communication.COM1Frequency",
    "Communication.COM1StandbyFrequency",
    "Communication.COM1FrequencySwap",
    "Communication.COM2Frequency",
    "Communication.COM2StandbyFrequency",
    "Communication.COM2FrequencySwap",
    "Communication.COM3Frequency",
    "Communication.COM3StandbyFrequency",
    "Communication.COM3FrequencySwap",
    "Communication.TransponderCode",
    "Communication.TransponderCursor",

    // Autopilot, flight director and copilot (153..)
    "Autopilot.Master",
    "Autopilot.Disengage",
    "Autopilot.Heading",
    "Autopilot.VerticalSpeed",
    "Autopilot.SelectedSpeed",
    "Autopilot.SelectedAirspeed",
    "Autopilot.SelectedHeading",
    "Autopilot.SelectedAltitude",
    "Autopilot.SelectedVerticalSpeed",
    "Autopilot.SelectedAltitudeScale",
    "Autopilot.ActiveLateralMode",
    "Autopilot.ArmedLateralMode",
    "Autopilot.ActiveVerticalMode",
    "Autopilot.ArmedVerticalMode",
    "Autopilot.ArmedApproachMode",
    "Autopilot.ActiveAutoThrottleMode",
    "Autopilot.ActiveCollectiveMode",
    "Autopilot.ArmedCollectiveMode",
    "Autopilot.Type",
    "Autopilot.Engaged",
    "Autopilot.UseMachNumber",
    "Autopilot.SpeedManaged",
    "Autopilot.TargetAirspeed",
    "Autopilot.Aileron",
    "Autopilot.Elevator",
    "AutoThrottle.Type",
    "Autopilot.ThrottleEngaged",
    "Autopilot.ThrottleCommand",
    "FlightDirector.Pitch",
    "FlightDirector.Bank",
    "FlightDirector.Yaw",
    "Copilot.Heading",
    "Copilot.Altitude",
    "Copilot.Airspeed",
    "Copilot.VerticalSpeed",
    "Copilot.Aileron",
    "Copilot.Elevator",
    "Copilot.Throttle",
    "Copilot.AutoRudder",

    // Controls (192..)
    "Controls.Throttle",
    "Controls.Throttle1",
    "Controls.Throttle2",
    "Controls.Throttle3",
    "Controls.Throttle4",
    "Controls.Throttle1:Move",
    "Controls.Throttle2:Move",
    "Controls.Throttle3:Move",
    "Controls.Throttle4:Move",
    "Controls.Pitch.Input",
    "Controls.Pitch.Input:Offset",
    "Controls.Roll.Input",
    "Controls.Roll.Input:Offset",
    "Controls.Yaw.Input",
    "Controls.Yaw.Input:Active",
    "Controls.Flaps",
    "Controls.Flaps:Event",
    "Controls.Gear",
    "Controls.Gear:Toggle",
    "Controls.WheelBrake.Left",
    "Controls.WheelBrake.Right",
    "Controls.WheelBrake.Left:Active",
    "Controls.WheelBrake.Right:Active",
    "Controls.AirBrake",
    "Controls.AirBrake:Active",
    "Controls.AirBrake.Arm",
    "Controls.GliderAirBrake",
    "Controls.PropellerSpeed1",
    "Controls.PropellerSpeed2",
    "Controls.PropellerSpeed3",
    "Controls.PropellerSpeed4",
    "Controls.Mixture",
    "Controls.Mixture1",
    "Controls.Mixture2",
    "Controls.Mixture3",
    "Controls.Mixture4",
    "Controls.ThrustReverse",
    "Controls.ThrustReverse1",
    "Controls.ThrustReverse2",
    "Controls.ThrustReverse3",
    "Controls.ThrustReverse4",
    "Controls.Collective",
    "Controls.CyclicPitch",
    "Controls.CyclicRoll",
    "Controls.TailRotor",
    "Controls.RotorBrake",
    "Controls.HelicopterThrottle1",
    "Controls.HelicopterThrottle2",
    "Controls.Trim",
    "Controls.Trim:Step",
    "Controls.Trim:Move",
    "Controls.AileronTrim",
    "Controls.RudderTrim",
    "Controls.Tiller",
    "Controls.PedalsDisconnect",
    "Controls.NoseWheelSteering",
    "Controls.Lighting.Panel",
    "Controls.Lighting.Instruments",
    "Controls.PressureSetting0",
    "Controls.PressureSettingStandard0",
    "Controls.PressureSettingUnit0",
    "Controls.PressureSetting1",
    "Controls.PressureSettingStandard1",
    "Controls.PressureSettingUnit1",
    "Controls.PressureSetting2",
    "Controls.PressureSettingStandard2",
    "Controls.PressureSettingUnit2",
    "Controls.TransitionAltitude",
    "Controls.TransitionLevel",

    // Pressurization and warnings (261..)
    "Pressurization.LandingElevation",
    "Pressurization.LandingElevationManual",
    "Warnings.MasterWarning",
    "Warnings.MasterCaution",
    "Warnings.EngineFire",
    "Warnings.LowOilPressure",
    "Warnings.LowFuelPressure",
    "Warnings.LowHydraulicPressure",
    "Warnings.LowVoltage",
    "Warnings.AltitudeAlert",
    "Warnings.WarningActive",
    "Warnings.WarningMute",

    // View (273..)
    "View.DisplayName",
    "View.Internal",
    "View.Follow",
    "View.External",
    "View.Category",
    "View.Mode",
    "View.Zoom",
    "View.Pan.Horizontal",
    "View.Pan.Horizontal:Move",
    "View.Pan.Vertical",
    "View.Pan.Vertical:Move",
    "View.Pan.Center",
    "View.Look.Horizontal",
    "View.Look.Vertical",
    "View.Roll",
    "View.OffsetX",
    "View.OffsetX:Move",
    "View.OffsetY",
    "View.OffsetY:Move",
    "View.OffsetZ",
    "View.OffsetZ:Move",
    "View.Position",
    "View.Direction",
    "View.Up",
    "View.FieldOfView",
    "View.AspectRatio",
    "View.FreePosition",
    "View.FreeLookDirection",
    "View.FreeUp",
    "View.FreeFieldOfView",

    // Simulation (303..)
    "Simulation.Pause",
    "Simulation.FlightInformation",
    "Simulation.MovingMap",
    "Simulation.Sound",
    "Simulation.LiftUp",
    "Simulation.SettingPosition",
    "Simulation.SettingOrientation",
    "Simulation.SettingVelocity",
    "Simulation.SettingSet",
    "Simulation.TimeChange",
    "Simulation.Visibility",
    "Simulation.Time",
    "Simulation.UseMouseControl",
    "Simulation.PlaybackStart",
    "Simulation.PlaybackStop",
    "Simulation.PlaybackPosition",
    "Simulation.ExternalPosition",
    "Simulation.ExternalOrientation",

    // Commands (321..)
    "Command.Execute",
    "Command.Back",
    "Command.Up",
    "Command.Down",
    "Command.Left",
    "Command.Right",
    "Command.MoveHorizontal",
    "Command.MoveVertical",
    "Command.Rotate",
    "Command.Zoom",

    // Miscellaneous (331..)
    "Controls.Speed",
    "FlightManagementSystem.Data0",
    "FlightManagementSystem.Data1",
    "Navigation.NAV1Data",
    "Navigation.NAV2Data",
    "Navigation.NAV3Data",
    "Navigation.ILS1Data",
    "Navigation.ILS2Data",
];
