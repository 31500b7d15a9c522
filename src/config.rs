//! Configuration management and validation.
//!
//! Provides the settings for one upload session: where the aggregation
//! service lives, how the input file is delimited, and how much buffering
//! sits between the record producer and the streaming call.

use crate::constants::{
    DEFAULT_CHANNEL_CAPACITY, DEFAULT_CONNECT_TIMEOUT_SECS, DEFAULT_DELIMITER, DEFAULT_ENDPOINT,
    DEFAULT_PROGRESS_INTERVAL,
};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Global configuration for an upload session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploaderConfig {
    /// Aggregation service endpoint (e.g. `http://localhost:50051`)
    pub endpoint: String,

    /// Connect timeout in seconds
    pub connect_timeout_secs: u64,

    /// Records buffered between the producer and the call
    pub channel_capacity: usize,

    /// Records between progress log lines (0 disables progress logging)
    pub progress_interval: usize,

    /// Field delimiter of the input file
    pub delimiter: u8,
}

impl Default for UploaderConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            connect_timeout_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
            delimiter: DEFAULT_DELIMITER,
        }
    }
}

impl UploaderConfig {
    /// Create configuration with a custom endpoint
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Create configuration with a custom connect timeout
    pub fn with_connect_timeout_secs(mut self, secs: u64) -> Self {
        self.connect_timeout_secs = secs;
        self
    }

    /// Create configuration with a custom channel capacity
    pub fn with_channel_capacity(mut self, capacity: usize) -> Self {
        self.channel_capacity = capacity;
        self
    }

    /// Create configuration with a custom progress interval
    pub fn with_progress_interval(mut self, interval: usize) -> Self {
        self.progress_interval = interval;
        self
    }

    /// Create configuration with a custom delimiter
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Connect timeout as a [`Duration`]
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.endpoint.trim().is_empty() {
            return Err(Error::configuration("Endpoint must not be empty"));
        }

        if !(self.endpoint.starts_with("http://") || self.endpoint.starts_with("https://")) {
            return Err(Error::configuration(format!(
                "Endpoint '{}' must start with http:// or https://",
                self.endpoint
            )));
        }

        if self.channel_capacity == 0 {
            return Err(Error::configuration(
                "Channel capacity must be greater than 0",
            ));
        }

        if self.connect_timeout_secs == 0 {
            return Err(Error::configuration(
                "Connect timeout must be greater than 0",
            ));
        }

        if self.delimiter == b'"' || self.delimiter == b'\n' || self.delimiter == b'\r' {
            return Err(Error::configuration(format!(
                "Delimiter {:?} cannot be used",
                self.delimiter as char
            )));
        }

        debug!(
            "Configuration validated: endpoint={}, capacity={}, progress_interval={}",
            self.endpoint, self.channel_capacity, self.progress_interval
        );
        Ok(())
    }
}
