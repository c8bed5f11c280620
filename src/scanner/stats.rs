//! Aggregates over extracted control messages.

use std::collections::{BTreeMap, BTreeSet};

use super::ControlMessage;
use crate::layout::MemoryLayout;

/// Everything known about one variable across the scanned aircraft.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VariableStats {
    pub messages: usize,
    pub aircraft: BTreeSet<String>,
    pub event_types: BTreeSet<String>,
    pub qualifiers: BTreeSet<String>,
    pub control_types: BTreeSet<String>,
    /// Distinct values in first-seen order with their counts.
    pub values: Vec<(f64, usize)>,
}

impl VariableStats {
    fn record(&mut self, message: &ControlMessage) {
        self.messages += 1;
        self.aircraft.insert(message.aircraft.clone());
        self.event_types.insert(message.event_type.clone());
        self.qualifiers.insert(message.qualifier.clone());
        self.control_types.insert(message.control_type.clone());

        match self.values.iter_mut().find(|(v, _)| v.to_bits() == message.value.to_bits()) {
            Some((_, count)) => *count += 1,
            None => self.values.push((message.value, 1)),
        }
    }

    /// Used with one event type everywhere.
    pub fn is_consistent(&self) -> bool {
        self.event_types.len() == 1
    }

    /// Most frequent value; ties go to the value seen first.
    pub fn most_common_value(&self) -> Option<f64> {
        let mut best: Option<(f64, usize)> = None;
        for &(value, count) in &self.values {
            if best.is_none_or(|(_, top)| count > top) {
                best = Some((value, count));
            }
        }
        best.map(|(value, _)| value)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AircraftStats {
    pub variables: BTreeSet<String>,
    pub messages: usize,
}

/// Aggregates over a whole scan.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScanStatistics {
    /// Aircraft contributing at least one message.
    pub aircraft_scanned: usize,
    pub files_found: usize,
    pub total_messages: usize,
    pub variables: BTreeMap<String, VariableStats>,
    pub event_types: BTreeMap<String, usize>,
    pub aircraft: BTreeMap<String, AircraftStats>,
}

impl ScanStatistics {
    pub fn collect(messages: &[ControlMessage], files_found: usize) -> Self {
        let mut stats = ScanStatistics {
            files_found,
            total_messages: messages.len(),
            ..Default::default()
        };

        for message in messages {
            stats.variables.entry(message.variable_name.clone()).or_default().record(message);
            *stats.event_types.entry(message.event_type.clone()).or_default() += 1;

            let aircraft = stats.aircraft.entry(message.aircraft.clone()).or_default();
            aircraft.variables.insert(message.variable_name.clone());
            aircraft.messages += 1;
        }
        stats.aircraft_scanned = stats.aircraft.len();
        stats
    }

    pub fn unique_variables(&self) -> usize {
        self.variables.len()
    }

    /// Event types by count, most frequent first, ties by name.
    pub fn event_distribution(&self) -> Vec<(&str, usize)> {
        let mut events: Vec<_> = self.event_types.iter().map(|(k, v)| (k.as_str(), *v)).collect();
        events.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(b.0)));
        events
    }

    /// The `limit` variables with the most messages, ties by name.
    pub fn most_common_variables(&self, limit: usize) -> Vec<(&str, &VariableStats)> {
        let mut variables: Vec<_> = self.variables.iter().map(|(k, v)| (k.as_str(), v)).collect();
        variables.sort_by(|a, b| b.1.messages.cmp(&a.1.messages).then(a.0.cmp(b.0)));
        variables.truncate(limit);
        variables
    }

    /// Variables used with a single event type, by name.
    pub fn consistent_variables(&self) -> impl Iterator<Item = (&str, &VariableStats)> {
        self.variables
            .iter()
            .filter(|(_, stats)| stats.is_consistent())
            .map(|(name, stats)| (name.as_str(), stats))
    }

    /// Split variable names into those `layout` can read back from shared
    /// memory and those it cannot, each sorted by name.
    pub fn bridge_coverage(&self, layout: &MemoryLayout) -> (Vec<&str>, Vec<&str>) {
        self.variables.keys().map(String::as_str).partition(|name| layout.resolve(name).is_some())
    }

    /// Aircraft by distinct variable count, largest first, ties by name.
    pub fn aircraft_by_variable_count(&self) -> Vec<(&str, &AircraftStats)> {
        let mut aircraft: Vec<_> = self.aircraft.iter().map(|(k, v)| (k.as_str(), v)).collect();
        aircraft.sort_by(|a, b| b.1.variables.len().cmp(&a.1.variables.len()).then(a.0.cmp(b.0)));
        aircraft
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(variable: &str, event: &str, value: f64, aircraft: &str) -> ControlMessage {
        ControlMessage {
            variable_name: variable.to_string(),
            event_type: event.to_string(),
            qualifier: String::new(),
            value,
            aircraft: aircraft.to_string(),
            control_name: "Knob".to_string(),
            control_type: "cylinder".to_string(),
            file_path: format!("{aircraft}/controls.tmd"),
        }
    }

    #[test]
    fn aggregates_per_variable_and_aircraft() {
        let messages = vec![
            message("Controls.Gear", "OnPush", 1.0, "c172"),
            message("Controls.Gear", "OnPush", 1.0, "a320"),
            message("Controls.Gear", "OnPush", 0.0, "a320"),
            message("Controls.Flaps", "OnStep", 1.0, "a320"),
            message("Controls.Flaps", "OnPush", -1.0, "a320"),
        ];
        let stats = ScanStatistics::collect(&messages, 4);

        assert_eq!(stats.aircraft_scanned, 2);
        assert_eq!(stats.files_found, 4);
        assert_eq!(stats.total_messages, 5);
        assert_eq!(stats.unique_variables(), 2);
        assert_eq!(stats.event_distribution(), [("OnPush", 4), ("OnStep", 1)]);

        let gear = &stats.variables["Controls.Gear"];
        assert!(gear.is_consistent());
        assert_eq!(gear.aircraft.len(), 2);
        assert_eq!(gear.most_common_value(), Some(1.0));
        assert!(!stats.variables["Controls.Flaps"].is_consistent());

        let consistent: Vec<_> = stats.consistent_variables().map(|(name, _)| name).collect();
        assert_eq!(consistent, ["Controls.Gear"]);

        let order: Vec<_> = stats.aircraft_by_variable_count().into_iter().map(|(a, _)| a).collect();
        assert_eq!(order, ["a320", "c172"]);
        assert_eq!(stats.aircraft["a320"].messages, 4);
    }

    #[test]
    fn coverage_splits_on_layout_names() {
        let messages = vec![
            message("Controls.Gear", "OnPush", 1.0, "c172"),
            message("Controls.Magnetos1", "OnStep", 1.0, "c172"),
            message("Aircraft.Altitude", "OnPush", 0.0, "c172"),
        ];
        let stats = ScanStatistics::collect(&messages, 1);
        let (mapped, unmapped) = stats.bridge_coverage(&MemoryLayout::FULL);

        assert_eq!(mapped, ["Aircraft.Altitude", "Controls.Gear"]);
        assert_eq!(unmapped, ["Controls.Magnetos1"]);
    }

    #[test]
    fn value_ties_keep_first_seen() {
        let messages = vec![
            message("V", "OnStep", -1.0, "x"),
            message("V", "OnStep", 1.0, "x"),
        ];
        let stats = ScanStatistics::collect(&messages, 1);
        assert_eq!(stats.variables["V"].most_common_value(), Some(-1.0));
    }

    #[test]
    fn common_variables_are_ranked() {
        let messages = vec![
            message("B", "OnPush", 1.0, "x"),
            message("A", "OnPush", 1.0, "x"),
            message("C", "OnPush", 1.0, "x"),
            message("C", "OnPush", 1.0, "y"),
        ];
        let stats = ScanStatistics::collect(&messages, 2);
        let top: Vec<_> = stats.most_common_variables(2).into_iter().map(|(n, _)| n).collect();
        assert_eq!(top, ["C", "A"]);
    }
}
