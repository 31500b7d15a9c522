//! Terminal progress for streaming uploads

use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;
use tracing::debug;

/// Spinner counting records as the call pulls them
///
/// The total is unknown up front since the producer is lazy.
pub fn upload_spinner(endpoint: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    let style = ProgressStyle::with_template(
        "{spinner:.green} [{elapsed_precise}] {pos} records sent ({per_sec}) | {msg}",
    )
    .unwrap_or_else(|_| ProgressStyle::default_spinner());
    pb.set_style(style);
    pb.set_message(format!("Streaming to {}", endpoint));
    pb.enable_steady_tick(Duration::from_millis(120));

    debug!("Upload spinner initialized for {}", endpoint);
    pb
}
