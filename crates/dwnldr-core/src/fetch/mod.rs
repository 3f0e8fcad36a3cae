//! The fetch capability: one URL into one file, reporting progress as it goes.
//!
//! The orchestrator never talks to the network itself; it hands each task a
//! [`Fetcher`]. [`CurlFetcher`] is the libcurl-backed implementation used by the
//! CLI; tests substitute scripted fetchers.

mod curl_fetcher;
mod error;
mod progress;

use std::path::Path;
use std::time::Duration;

pub use curl_fetcher::CurlFetcher;
pub use error::FetchError;
pub use progress::TransferStats;

/// Default minimum time between two progress callbacks.
pub const DEFAULT_CALLBACK_INTERVAL: Duration = Duration::from_millis(200);

/// Per-transfer knobs shared by every task of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchOptions {
    /// Receive-rate ceiling in bytes per second for this transfer (0 = unlimited).
    pub max_bytes_per_sec: u64,
    /// Minimum spacing between progress callbacks.
    pub callback_interval: Duration,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            max_bytes_per_sec: 0,
            callback_interval: DEFAULT_CALLBACK_INTERVAL,
        }
    }
}

/// Blocking transfer of `url` into `dest`.
///
/// Implementations call `on_progress` at roughly `opts.callback_interval` and
/// return once the transfer has finished or failed. They run on a blocking
/// worker thread, never on the orchestrator's loop.
pub trait Fetcher: Send + Sync + 'static {
    fn fetch(
        &self,
        url: &str,
        dest: &Path,
        opts: &FetchOptions,
        on_progress: &mut dyn FnMut(&TransferStats),
    ) -> Result<(), FetchError>;
}
