//! Declarative control panels.
//!
//! A panel is plain data: titled sections of buttons, each button either a
//! single `(variable, value, qualifier)` write or a `multi` list of writes.
//! One generic builder ([`PanelEntry::commands`]) turns any entry into the
//! commands it sends, so adding a button never means adding code.
//!
//! Two panels are embedded in the crate:
//!
//! - `standard`: direct value writes for flight controls, throttles,
//!   systems, brakes, radios, autopilot, engines, helicopter, trim and
//!   simulation.
//! - `c172-events`: qualifier-driven controls (`step`, `toggle`, `event`,
//!   `offset`) for the Cessna 172.
//!
//! Panels are YAML:
//!
//! ```yaml
//! name: trainer
//! title: Trainer
//! sections:
//!   - title: Systems
//!     entries:
//!       - label: GEAR DOWN
//!         variable: Controls.Gear
//!         value: 1.0
//!       - label: MAGNETOS Step +
//!         variable: Controls.Magnetos1
//!         value: 1.0
//!         qualifier: step
//!       - label: RELEASE BRAKES
//!         multi:
//!           - { variable: Controls.WheelBrake.Left, value: 0.0 }
//!           - { variable: Controls.WheelBrake.Right, value: 0.0 }
//! ```

use serde::{Deserialize, Deserializer, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info};

use crate::command::{BatchReport, Command, CommandClient, Qualifier};
use crate::{BridgeError, Result};

const STANDARD_YAML: &str = include_str!("../../panels/standard.yaml");
const C172_EVENTS_YAML: &str = include_str!("../../panels/c172_events.yaml");

/// Names of the embedded panels.
pub const BUILTIN_PANELS: [&str; 2] = ["standard", "c172-events"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Panel {
    pub name: String,
    #[serde(default)]
    pub title: String,
    pub sections: Vec<PanelSection>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PanelSection {
    pub title: String,
    pub entries: Vec<PanelEntry>,
}

/// One button.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PanelEntry {
    /// Several independent writes, sent in order.
    Multi { label: String, multi: Vec<MultiStep> },
    Single {
        label: String,
        variable: String,
        value: f64,
        #[serde(
            default,
            deserialize_with = "optional_qualifier",
            skip_serializing_if = "Option::is_none"
        )]
        qualifier: Option<Qualifier>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MultiStep {
    pub variable: String,
    pub value: f64,
}

/// Accepts the `value` pseudo-qualifier used by plain writes.
fn optional_qualifier<'de, D>(deserializer: D) -> std::result::Result<Option<Qualifier>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    match raw {
        Some(s) => Qualifier::parse_optional(&s).map_err(serde::de::Error::custom),
        None => Ok(None),
    }
}

impl PanelEntry {
    pub fn label(&self) -> &str {
        match self {
            PanelEntry::Multi { label, .. } | PanelEntry::Single { label, .. } => label,
        }
    }

    pub fn is_multi(&self) -> bool {
        matches!(self, PanelEntry::Multi { .. })
    }

    /// Commands this entry sends, in order.
    pub fn commands(&self) -> Vec<Command> {
        match self {
            PanelEntry::Single { variable, value, qualifier, .. } => {
                vec![Command::with_qualifier(variable.clone(), *value, *qualifier)]
            }
            PanelEntry::Multi { multi, .. } => {
                multi.iter().map(|step| Command::new(step.variable.clone(), step.value)).collect()
            }
        }
    }

    /// Send this entry's commands. Multi entries are not atomic: each
    /// step succeeds or fails on its own.
    pub async fn press(&self, client: &CommandClient) -> BatchReport {
        let report = client.send_sequence(&self.commands(), Duration::ZERO).await;
        info!(label = self.label(), result = %report.summary(), "Panel entry pressed");
        report
    }
}

impl Panel {
    /// Parse and validate a panel definition.
    pub fn from_yaml(yaml: &str) -> Result<Panel> {
        let panel: Panel = serde_yaml_ng::from_str(yaml).map_err(|e| {
            BridgeError::parse_error("panel YAML", format!("YAML parsing failed: {e}"))
        })?;
        panel.validate()?;
        debug!(name = %panel.name, sections = panel.sections.len(), "Loaded panel");
        Ok(panel)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Panel> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path).map_err(|e| BridgeError::io_error(path, e))?;
        Self::from_yaml(&yaml)
    }

    /// One of the embedded panels, by name.
    pub fn builtin(name: &str) -> Result<Panel> {
        let yaml = match name {
            "standard" => STANDARD_YAML,
            "c172-events" | "c172" => C172_EVENTS_YAML,
            other => {
                return Err(BridgeError::config_error(format!(
                    "unknown panel '{other}' (built-in panels: {})",
                    BUILTIN_PANELS.join(", ")
                )));
            }
        };
        Self::from_yaml(yaml)
    }

    /// Built-in name, or a path to a YAML file.
    pub fn resolve(name_or_path: &str) -> Result<Panel> {
        if BUILTIN_PANELS.contains(&name_or_path) || name_or_path == "c172" {
            Self::builtin(name_or_path)
        } else {
            Self::load(name_or_path)
        }
    }

    pub fn entries(&self) -> impl Iterator<Item = &PanelEntry> {
        self.sections.iter().flat_map(|section| section.entries.iter())
    }

    /// Case-insensitive lookup by label.
    pub fn find(&self, label: &str) -> Option<&PanelEntry> {
        let wanted = label.trim();
        self.entries().find(|entry| entry.label().eq_ignore_ascii_case(wanted))
    }

    pub fn validate(&self) -> Result<()> {
        let fail = |details: String| Err(BridgeError::parse_error("panel validation", details));

        if self.name.trim().is_empty() {
            return fail("panel has no name".to_string());
        }
        if self.sections.is_empty() {
            return fail(format!("panel '{}' has no sections", self.name));
        }

        for section in &self.sections {
            if section.entries.is_empty() {
                return fail(format!("section '{}' has no entries", section.title));
            }
            for entry in &section.entries {
                if entry.label().trim().is_empty() {
                    return fail(format!("unlabelled entry in section '{}'", section.title));
                }
                if let PanelEntry::Multi { label, multi } = entry {
                    if multi.is_empty() {
                        return fail(format!("multi entry '{label}' has no steps"));
                    }
                }
                for command in entry.commands() {
                    if command.variable.trim().is_empty() {
                        return fail(format!("entry '{}' has an empty variable", entry.label()));
                    }
                    if !command.value.is_finite() {
                        return fail(format!("entry '{}' has a non-finite value", entry.label()));
                    }
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_panels_load() {
        let standard = Panel::builtin("standard").unwrap();
        assert_eq!(standard.sections.len(), 10);
        assert_eq!(standard.sections[0].title, "Flight Controls");
        assert!(standard.entries().count() > 100);

        let events = Panel::builtin("c172-events").unwrap();
        assert_eq!(events.sections.len(), 8);
        assert!(events.entries().any(|e| matches!(
            e,
            PanelEntry::Single { qualifier: Some(Qualifier::Toggle), .. }
        )));
    }

    #[test]
    fn multi_entries_expand_in_order() {
        let panel = Panel::builtin("standard").unwrap();
        let entry = panel.find("all engines on").expect("entry exists");
        assert!(entry.is_multi());

        let variables: Vec<_> = entry.commands().into_iter().map(|c| c.variable).collect();
        assert_eq!(
            variables,
            [
                "Aircraft.EngineMaster1",
                "Aircraft.EngineMaster2",
                "Aircraft.Ignition1",
                "Aircraft.Ignition2"
            ]
        );
    }

    #[test]
    fn event_entries_carry_qualifiers() {
        let panel = Panel::builtin("c172").unwrap();

        let show = panel.find("SHOW LEFT YOKE").unwrap().commands();
        assert_eq!(show[0].qualifier, Some(Qualifier::Toggle));
        // Toggle sends 1.0 whatever the table says
        assert_eq!(show[0].value, 1.0);

        let step = panel.find("MAGNETOS Step -").unwrap().commands();
        assert_eq!(step[0].qualifier, Some(Qualifier::Step));
        assert_eq!(step[0].value, -1.0);

        let plain = panel.find("LEFT SUN BLOCKER").unwrap().commands();
        assert_eq!(plain[0].qualifier, None);
    }

    #[test]
    fn value_pseudo_qualifier_means_plain_write() {
        let panel = Panel::from_yaml(
            r#"
name: test
sections:
  - title: One
    entries:
      - label: A
        variable: Controls.LeftSunBlocker
        value: 1.0
        qualifier: value
"#,
        )
        .unwrap();
        assert_eq!(panel.find("a").unwrap().commands()[0].qualifier, None);
    }

    #[test]
    fn invalid_panels_are_rejected() {
        assert!(Panel::builtin("missing").is_err());
        assert!(Panel::from_yaml("name: x\nsections: []\n").is_err());
        assert!(
            Panel::from_yaml(
                "name: x\nsections:\n  - title: S\n    entries:\n      - label: M\n        multi: []\n"
            )
            .is_err()
        );
        assert!(
            Panel::from_yaml(
                "name: x\nsections:\n  - title: S\n    entries:\n      - label: Q\n        variable: V\n        value: 1\n        qualifier: press\n"
            )
            .is_err()
        );
    }

    #[test]
    fn panels_round_trip_through_yaml() {
        let panel = Panel::builtin("c172-events").unwrap();
        let yaml = serde_yaml_ng::to_string(&panel).unwrap();
        assert_eq!(Panel::from_yaml(&yaml).unwrap(), panel);
    }
}
