//! Connection and tool settings.
//!
//! Defaults match a stock bridge install. A YAML file may override any
//! subset of fields, `AEROBRIDGE_*` environment variables override the
//! file, and command-line flags override both.
//!
//! ```yaml
//! host: 192.168.1.20
//! command_port: 12346
//! data_port: 12345
//! command_timeout_ms: 2000
//! layout: compact
//! poll_rate_hz: 10
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

use crate::command::{DEFAULT_COMMAND_PORT, DEFAULT_COMMAND_TIMEOUT};
use crate::layout::{LayoutVersion, SHARED_MEMORY_NAME};
use crate::scanner::{DEFAULT_AIRCRAFT_ROOT, DEFAULT_OUTPUT_DIR};
use crate::stream::DEFAULT_DATA_PORT;
use crate::{BridgeError, Result};

pub const ENV_HOST: &str = "AEROBRIDGE_HOST";
pub const ENV_COMMAND_PORT: &str = "AEROBRIDGE_COMMAND_PORT";
pub const ENV_DATA_PORT: &str = "AEROBRIDGE_DATA_PORT";
pub const ENV_LAYOUT: &str = "AEROBRIDGE_LAYOUT";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BridgeConfig {
    pub host: String,
    pub command_port: u16,
    pub data_port: u16,
    pub command_timeout_ms: u64,
    pub shared_memory_name: String,
    pub layout: LayoutVersion,
    pub poll_rate_hz: f64,
    pub aircraft_root: PathBuf,
    pub output_dir: PathBuf,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            command_port: DEFAULT_COMMAND_PORT,
            data_port: DEFAULT_DATA_PORT,
            command_timeout_ms: DEFAULT_COMMAND_TIMEOUT.as_millis() as u64,
            shared_memory_name: SHARED_MEMORY_NAME.to_string(),
            layout: LayoutVersion::default(),
            poll_rate_hz: 20.0,
            aircraft_root: PathBuf::from(DEFAULT_AIRCRAFT_ROOT),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
        }
    }
}

impl BridgeConfig {
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: BridgeConfig = serde_yaml_ng::from_str(yaml).map_err(|e| {
            BridgeError::parse_error("config YAML", format!("YAML parsing failed: {e}"))
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path).map_err(|e| BridgeError::io_error(path, e))?;
        let config = Self::from_yaml(&yaml)?;
        debug!(path = %path.display(), "Loaded config");
        Ok(config)
    }

    /// File (if any), then the process environment.
    pub fn resolve(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::load(path)?,
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Apply `AEROBRIDGE_*` overrides read through `lookup`.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(host) = lookup(ENV_HOST).filter(|h| !h.trim().is_empty()) {
            self.host = host.trim().to_string();
        }
        if let Some(port) = lookup(ENV_COMMAND_PORT) {
            self.command_port = parse_port(ENV_COMMAND_PORT, &port)?;
        }
        if let Some(port) = lookup(ENV_DATA_PORT) {
            self.data_port = parse_port(ENV_DATA_PORT, &port)?;
        }
        if let Some(layout) = lookup(ENV_LAYOUT) {
            self.layout = layout.parse()?;
        }
        self.validate()
    }

    pub fn validate(&self) -> Result<()> {
        if self.host.trim().is_empty() {
            return Err(BridgeError::config_error("host must not be empty"));
        }
        if self.command_port == 0 || self.data_port == 0 {
            return Err(BridgeError::config_error("ports must be non-zero"));
        }
        if self.command_timeout_ms == 0 {
            return Err(BridgeError::config_error("command_timeout_ms must be positive"));
        }
        if !(self.poll_rate_hz.is_finite() && self.poll_rate_hz > 0.0) {
            return Err(BridgeError::config_error(format!(
                "poll_rate_hz must be positive, got {}",
                self.poll_rate_hz
            )));
        }
        Ok(())
    }

    pub fn command_timeout(&self) -> Duration {
        Duration::from_millis(self.command_timeout_ms)
    }
}

fn parse_port(key: &str, raw: &str) -> Result<u16> {
    raw.trim()
        .parse::<u16>()
        .ok()
        .filter(|port| *port != 0)
        .ok_or_else(|| BridgeError::config_error(format!("{key}: invalid port '{raw}'")))
}
