use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use crate::registers::DIGIRAIL_2A_CHANNELS;
use crate::transport::rtu::{DEFAULT_BAUD_RATE, DEFAULT_TIMEOUT, SerialSettings};

/// Environment variable consulted when no config path is passed on the command line
pub const CONFIG_ENV: &str = "DIGIRAIL_CONFIG";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("unable to read config file {path:?}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("malformed config file {path:?}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("channel_count must be at least 1")]
    NoChannels,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Serial device the RS485 adapter is connected to
    pub port: String,
    /// Modbus slave id of the converter
    pub address: u8,
    pub baud_rate: u32,
    pub channel_count: u16,
    pub poll_period_ms: u64,
    pub timeout_ms: u64,
    pub http_bind: String,
    /// Talk to an in-memory device instead of the serial port
    pub simulate: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: "/dev/ttyUSB0".to_string(),
            address: 1,
            baud_rate: DEFAULT_BAUD_RATE,
            channel_count: DIGIRAIL_2A_CHANNELS,
            poll_period_ms: 5000,
            timeout_ms: DEFAULT_TIMEOUT.as_millis() as u64,
            http_bind: "0.0.0.0:8000".to_string(),
            simulate: false,
        }
    }
}

impl Config {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&raw)
            .map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?
            .validate()
    }

    /// Reject settings the device cannot be polled with
    pub fn validate(self) -> Result<Self, ConfigError> {
        if self.channel_count == 0 {
            return Err(ConfigError::NoChannels);
        }
        Ok(self)
    }

    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    /// Load from `path` if given, then from `$DIGIRAIL_CONFIG`, else fall back to defaults
    pub fn load(path: Option<PathBuf>) -> Result<Self, ConfigError> {
        match path.or_else(|| std::env::var_os(CONFIG_ENV).map(PathBuf::from)) {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }

    pub fn poll_period(&self) -> Duration {
        Duration::from_millis(self.poll_period_ms)
    }

    pub fn serial_settings(&self) -> SerialSettings {
        SerialSettings {
            port: self.port.clone(),
            baud_rate: self.baud_rate,
            timeout: Duration::from_millis(self.timeout_ms),
        }
    }
}
