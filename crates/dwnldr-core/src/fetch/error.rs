//! Transfer error type.

use thiserror::Error;

/// Failure of a single transfer. Never retried; the task reports it once and
/// completes.
#[derive(Debug, Error)]
pub enum FetchError {
    /// libcurl reported an error (DNS, connect, timeout, TLS, ...).
    #[error("{0}")]
    Curl(#[from] curl::Error),
    /// The server answered with a non-2xx status.
    #[error("HTTP {0}")]
    Http(u32),
    /// Creating or writing the destination file failed.
    #[error("storage: {0}")]
    Storage(#[from] std::io::Error),
    /// The transfer worker panicked or was torn down.
    #[error("transfer aborted: {0}")]
    Aborted(String),
}
