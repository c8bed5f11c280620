//! Commands for the bridge's TCP command socket.
//!
//! The bridge accepts one JSON object per connection:
//!
//! ```json
//! {"variable": "Controls.Gear", "value": 1.0, "qualifier": "toggle"}
//! ```
//!
//! It never replies. A command counts as delivered when the connection,
//! write and shutdown completed without a socket error; whether the
//! simulator acted on it is only visible in later telemetry.
//!
//! Delivery is at most once. Nothing here retries.

mod batch;
mod client;
pub mod stress;

pub use batch::{BatchReport, CommandOutcome, ResponseTiming};
pub use client::{CommandClient, DEFAULT_COMMAND_PORT, DEFAULT_COMMAND_TIMEOUT};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::{BridgeError, Result};

/// How the bridge should apply a command's value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Qualifier {
    /// Increment or decrement by the value.
    Step,
    /// Flip a two-state control.
    Toggle,
    /// Momentary trigger.
    Event,
    /// Add the value to the current position.
    Offset,
}

impl Qualifier {
    pub const ALL: [Qualifier; 4] =
        [Qualifier::Step, Qualifier::Toggle, Qualifier::Event, Qualifier::Offset];

    pub fn as_str(self) -> &'static str {
        match self {
            Qualifier::Step => "step",
            Qualifier::Toggle => "toggle",
            Qualifier::Event => "event",
            Qualifier::Offset => "offset",
        }
    }

    /// Parse an optional qualifier. Empty input and the literal `value`
    /// mean a plain value write.
    pub fn parse_optional(s: &str) -> Result<Option<Qualifier>> {
        match s.trim() {
            "" => Ok(None),
            t if t.eq_ignore_ascii_case("value") => Ok(None),
            t => t.parse().map(Some),
        }
    }

    /// Whether the bridge ignores the value for this qualifier.
    pub fn is_trigger(self) -> bool {
        matches!(self, Qualifier::Toggle | Qualifier::Event)
    }
}

impl fmt::Display for Qualifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Qualifier {
    type Err = BridgeError;

    fn from_str(s: &str) -> Result<Self> {
        Qualifier::ALL
            .into_iter()
            .find(|q| q.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                BridgeError::parse_error(
                    "qualifier",
                    format!("'{s}' is not one of step, toggle, event, offset"),
                )
            })
    }
}

/// A single `{variable, value, qualifier?}` message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Command {
    pub variable: String,
    pub value: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qualifier: Option<Qualifier>,
}

impl Command {
    /// Plain value write.
    pub fn new(variable: impl Into<String>, value: f64) -> Self {
        Self { variable: variable.into(), value, qualifier: None }
    }

    /// Qualified command. Toggle and event always carry `1.0`, the bridge
    /// needs a value field but ignores it for triggers.
    pub fn qualified(variable: impl Into<String>, value: f64, qualifier: Qualifier) -> Self {
        let value = if qualifier.is_trigger() { 1.0 } else { value };
        Self { variable: variable.into(), value, qualifier: Some(qualifier) }
    }

    pub fn with_qualifier(
        variable: impl Into<String>,
        value: f64,
        qualifier: Option<Qualifier>,
    ) -> Self {
        match qualifier {
            Some(q) => Self::qualified(variable, value, q),
            None => Self::new(variable, value),
        }
    }

    /// Wire encoding: compact JSON, no trailing newline.
    ///
    /// Fails for non-finite values, which JSON cannot represent.
    pub fn to_wire(&self) -> Result<Vec<u8>> {
        if !self.value.is_finite() {
            return Err(BridgeError::parse_error(
                "command",
                format!("{} has non-finite value {}", self.variable, self.value),
            ));
        }
        Ok(serde_json::to_vec(self)?)
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.qualifier {
            Some(q) => write!(f, "{} [{}] = {}", self.variable, q.as_str().to_uppercase(), self.value),
            None => write!(f, "{} = {}", self.variable, self.value),
        }
    }
}
