//! Error types for bridge access.
//!
//! All fallible operations in the crate return [`BridgeError`]. The bridge
//! itself is tolerant of failure (the simulator keeps running whatever we do),
//! so most callers convert these errors into a status message or a default
//! value; the fail-soft wrappers in [`crate::snapshot`] and [`crate::command`]
//! do exactly that.
//!
//! ## Error Categories
//!
//! - **Connectivity**: command or telemetry socket refused or timed out
//! - **Memory**: out-of-range reads or a missing shared-memory mapping
//! - **Data**: invalid validity flag, malformed JSON, unparseable records
//! - **Configuration**: bad config files or unknown layout/panel names
//!
//! ```rust
//! use aerobridge::BridgeError;
//!
//! let error = BridgeError::connection_failed("127.0.0.1:12346 refused");
//! if error.is_retryable() {
//!     for suggestion in error.recovery_suggestions() {
//!         println!("  - {}", suggestion);
//!     }
//! }
//! ```

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

#[cfg(windows)]
use windows_core as core;

/// Result type alias for bridge operations.
pub type Result<T, E = BridgeError> = std::result::Result<T, E>;

/// Main error type for bridge operations.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum BridgeError {
    #[error("Failed to reach the bridge: {reason}")]
    Connection {
        reason: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Operation timed out after {duration:?}")]
    Timeout { duration: Duration },

    #[error("I/O error on {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Read of {len} bytes at offset {offset:#x} exceeds buffer of {available} bytes")]
    Memory { offset: usize, len: usize, available: usize },

    #[error("Snapshot not valid (data_valid = {data_valid})")]
    InvalidData { data_valid: u32 },

    #[error("Serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Parse error in {context}: {details}")]
    Parse { context: String, details: String },

    #[error("Configuration error: {reason}")]
    Config { reason: String },

    #[error("{feature} is only available on {required_platform}")]
    UnsupportedPlatform { feature: String, required_platform: String },

    #[error("Windows API error: {operation}")]
    #[cfg(windows)]
    WindowsApi {
        operation: String,
        #[source]
        source: core::Error,
    },
}

impl BridgeError {
    /// Returns whether this error is potentially recoverable through retry.
    ///
    /// The crate itself never retries; this is guidance for the caller.
    pub fn is_retryable(&self) -> bool {
        match self {
            BridgeError::Connection { .. } => true,
            BridgeError::Timeout { .. } => true,
            BridgeError::InvalidData { .. } => true,
            BridgeError::Io { .. } => false,
            BridgeError::Memory { .. } => false,
            BridgeError::Serialization(_) => false,
            BridgeError::Parse { .. } => false,
            BridgeError::Config { .. } => false,
            BridgeError::UnsupportedPlatform { .. } => false,
            #[cfg(windows)]
            BridgeError::WindowsApi { .. } => true,
        }
    }

    /// Returns suggested recovery actions for this error.
    pub fn recovery_suggestions(&self) -> Vec<&'static str> {
        match self {
            BridgeError::Connection { .. } => vec![
                "Ensure Aerofly FS is running with the bridge DLL loaded",
                "Check that the command and data ports match the bridge",
                "Check that no firewall blocks loopback connections",
            ],
            BridgeError::Timeout { .. } => vec![
                "Increase the command timeout",
                "Check whether the simulator is paused or loading",
            ],
            BridgeError::Io { .. } => vec![
                "Check the path exists and is readable",
                "Check file permissions",
            ],
            BridgeError::Memory { .. } => vec![
                "Check the selected layout version matches the bridge build",
                "Verify the offset lies inside the snapshot",
            ],
            BridgeError::InvalidData { .. } => vec![
                "Wait for a flight to be loaded",
                "Verify the bridge is updating the shared memory",
            ],
            BridgeError::Serialization(_) => vec!["Check the command contents are finite numbers"],
            BridgeError::Parse { .. } => vec![
                "Check the input format",
                "Verify the source data is not truncated",
            ],
            BridgeError::Config { .. } => vec![
                "Check the configuration file syntax",
                "Run with --help to list accepted values",
            ],
            BridgeError::UnsupportedPlatform { .. } => vec![
                "Run on Windows alongside the simulator",
                "Use the telemetry stream socket from other platforms",
            ],
            #[cfg(windows)]
            BridgeError::WindowsApi { .. } => vec![
                "Ensure the simulator created the shared memory mapping",
                "Check Windows permissions for shared memory access",
            ],
        }
    }

    /// Helper constructor for connection errors.
    pub fn connection_failed(reason: impl Into<String>) -> Self {
        BridgeError::Connection { reason: reason.into(), source: None }
    }

    /// Helper constructor for connection errors with source.
    pub fn connection_failed_with_source(
        reason: impl Into<String>,
        source: Box<dyn std::error::Error + Send + Sync>,
    ) -> Self {
        BridgeError::Connection { reason: reason.into(), source: Some(source) }
    }

    /// Helper constructor for file errors with path context.
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        BridgeError::Io { path: path.into(), source }
    }

    /// Helper constructor for out-of-range reads.
    pub fn out_of_range(offset: usize, len: usize, available: usize) -> Self {
        BridgeError::Memory { offset, len, available }
    }

    /// Helper constructor for parse errors.
    pub fn parse_error(context: impl Into<String>, details: impl Into<String>) -> Self {
        BridgeError::Parse { context: context.into(), details: details.into() }
    }

    /// Helper constructor for configuration errors.
    pub fn config_error(reason: impl Into<String>) -> Self {
        BridgeError::Config { reason: reason.into() }
    }

    /// Helper constructor for Windows API errors.
    #[cfg(windows)]
    pub fn windows_api_error(operation: impl Into<String>, source: core::Error) -> Self {
        BridgeError::WindowsApi { operation: operation.into(), source }
    }

    /// Helper constructor for unsupported platform errors.
    pub fn unsupported_platform(
        feature: impl Into<String>,
        required_platform: impl Into<String>,
    ) -> Self {
        BridgeError::UnsupportedPlatform {
            feature: feature.into(),
            required_platform: required_platform.into(),
        }
    }
}

impl From<std::io::Error> for BridgeError {
    fn from(err: std::io::Error) -> Self {
        BridgeError::Io { path: PathBuf::from("<unknown>"), source: err }
    }
}

#[cfg(windows)]
impl From<core::Error> for BridgeError {
    fn from(err: core::Error) -> Self {
        BridgeError::WindowsApi { operation: "Unknown Windows operation".to_string(), source: err }
    }
}
