//! Command-line argument definitions for the crash uploader
//!
//! This module defines the CLI interface using the clap derive API.

use crate::config::UploaderConfig;
use crate::constants::{
    DEFAULT_CHANNEL_CAPACITY, DEFAULT_CONNECT_TIMEOUT_SECS, DEFAULT_ENDPOINT, DEFAULT_INPUT_FILE,
    DEFAULT_PROGRESS_INTERVAL,
};
use crate::{Error, Result};
use clap::Parser;
use std::path::PathBuf;
use std::str::FromStr;

/// CLI arguments for the collision record uploader
///
/// Reads a collision-report CSV file, normalizes each row and streams the
/// records to an aggregation service over a single gRPC call.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "crash-uploader",
    version,
    about = "Normalize collision-report CSV rows and stream them to an aggregation service",
    long_about = "Reads a collision-report CSV file one row at a time, converts dates, times and \
                  injury counts into a fixed numeric record, and streams every record to a remote \
                  aggregation service over one client-streaming gRPC call. Rows with an unusable \
                  date or time are logged and skipped."
)]
pub struct Args {
    /// Collision-report CSV file with a header line
    #[arg(
        value_name = "FILE",
        default_value = DEFAULT_INPUT_FILE,
        help = "Collision-report CSV file to upload"
    )]
    pub input: PathBuf,

    /// Aggregation service endpoint
    #[arg(
        short = 'e',
        long = "endpoint",
        value_name = "URL",
        default_value = DEFAULT_ENDPOINT,
        help = "Aggregation service endpoint"
    )]
    pub endpoint: String,

    /// Records buffered between the reader and the streaming call
    ///
    /// When the service reads slower than the file is parsed, parsing pauses
    /// once this many records are waiting.
    #[arg(
        long = "capacity",
        value_name = "COUNT",
        default_value_t = DEFAULT_CHANNEL_CAPACITY,
        help = "Records buffered ahead of the streaming call"
    )]
    pub channel_capacity: usize,

    /// Connect timeout in seconds
    #[arg(
        long = "connect-timeout",
        value_name = "SECS",
        default_value_t = DEFAULT_CONNECT_TIMEOUT_SECS,
        help = "Seconds to wait for the connection"
    )]
    pub connect_timeout_secs: u64,

    /// Records between progress log lines
    #[arg(
        long = "progress-interval",
        value_name = "COUNT",
        default_value_t = DEFAULT_PROGRESS_INTERVAL,
        help = "Log progress every COUNT records (0 disables)"
    )]
    pub progress_interval: usize,

    /// Field delimiter of the input file
    #[arg(
        short = 'd',
        long = "delimiter",
        value_name = "CHAR",
        default_value = ",",
        help = "Field delimiter (a single character, or 'tab')"
    )]
    pub delimiter: Delimiter,

    /// Show a live record counter
    #[arg(long = "progress", help = "Show a live record counter")]
    pub progress: bool,

    /// Logging verbosity level
    #[arg(
        short = 'v',
        long = "verbose",
        action = clap::ArgAction::Count,
        help = "Increase logging verbosity (-v: info, -vv: debug, -vvv: trace)"
    )]
    pub verbose: u8,

    /// Suppress output (quiet mode)
    ///
    /// Only show errors and the service's response message. Conflicts with
    /// verbose settings.
    #[arg(
        short = 'q',
        long = "quiet",
        help = "Print only errors and the service response",
        conflicts_with = "verbose"
    )]
    pub quiet: bool,
}

/// Single-byte field delimiter parsed from the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Delimiter(pub u8);

impl FromStr for Delimiter {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "tab" | "\\t" | "\t" => return Ok(Delimiter(b'\t')),
            _ => {}
        }

        let bytes = s.as_bytes();
        if bytes.len() != 1 {
            return Err(Error::configuration(format!(
                "Delimiter must be a single ASCII character, got '{}'",
                s
            )));
        }

        Ok(Delimiter(bytes[0]))
    }
}

impl Args {
    /// Get the tracing level implied by -v / -q
    pub fn get_log_level(&self) -> &'static str {
        if self.quiet {
            "error"
        } else {
            match self.verbose {
                0 => "warn",
                1 => "info",
                2 => "debug",
                _ => "trace",
            }
        }
    }

    /// Check if we should show the progress counter (never in quiet mode)
    pub fn show_progress(&self) -> bool {
        self.progress && !self.quiet
    }

    /// Build the session configuration from the arguments
    pub fn to_config(&self) -> UploaderConfig {
        UploaderConfig::default()
            .with_endpoint(self.endpoint.clone())
            .with_channel_capacity(self.channel_capacity)
            .with_connect_timeout_secs(self.connect_timeout_secs)
            .with_progress_interval(self.progress_interval)
            .with_delimiter(self.delimiter.0)
    }

    /// Validate the arguments for consistency
    pub fn validate(&self) -> Result<()> {
        if !self.input.exists() {
            return Err(Error::configuration(format!(
                "Input file does not exist: {}",
                self.input.display()
            )));
        }

        if !self.input.is_file() {
            return Err(Error::configuration(format!(
                "Input path is not a file: {}",
                self.input.display()
            )));
        }

        self.to_config().validate()
    }
}
