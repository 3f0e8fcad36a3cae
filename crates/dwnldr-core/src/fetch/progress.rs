//! Transfer statistics reported by a fetcher while it runs.

use std::time::Duration;

use crate::format::{format_duration, format_percent, format_rate};

/// Snapshot of one transfer: bytes received so far, the expected total (when
/// the server announced one) and time since the transfer started.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransferStats {
    pub bytes_done: u64,
    /// `None` until the server reports a length (e.g. chunked responses).
    pub total_bytes: Option<u64>,
    pub elapsed: Duration,
}

impl TransferStats {
    /// Fraction complete in `[0.0, 1.0]`; `0.0` while the total is unknown.
    pub fn fraction(&self) -> f64 {
        match self.total_bytes {
            Some(0) | None => 0.0,
            Some(total) => (self.bytes_done as f64 / total as f64).min(1.0),
        }
    }

    /// Average download rate in bytes per second (0 if elapsed is 0).
    pub fn bytes_per_sec(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs <= 0.0 {
            return 0.0;
        }
        self.bytes_done as f64 / secs
    }

    pub fn percent_text(&self) -> String {
        format_percent(self.fraction())
    }

    pub fn rate_text(&self) -> String {
        format_rate(self.bytes_per_sec())
    }

    pub fn elapsed_text(&self) -> String {
        format_duration(self.elapsed)
    }
}
