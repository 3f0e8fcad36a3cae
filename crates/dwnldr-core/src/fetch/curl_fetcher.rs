//! libcurl-backed fetcher (single GET per task, written sequentially to disk).

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::time::{Duration, Instant};

use super::{FetchError, FetchOptions, Fetcher, TransferStats};

/// Fetches with a fresh `curl::easy::Easy` handle per transfer.
#[derive(Debug, Clone)]
pub struct CurlFetcher {
    connect_timeout: Duration,
}

impl CurlFetcher {
    pub fn new(connect_timeout: Duration) -> Self {
        Self { connect_timeout }
    }
}

impl Default for CurlFetcher {
    fn default() -> Self {
        Self::new(Duration::from_secs(30))
    }
}

impl Fetcher for CurlFetcher {
    fn fetch(
        &self,
        url: &str,
        dest: &Path,
        opts: &FetchOptions,
        on_progress: &mut dyn FnMut(&TransferStats),
    ) -> Result<(), FetchError> {
        let file = File::create(dest)?;
        let mut writer = BufWriter::new(file);
        let mut write_error: Option<std::io::Error> = None;

        let mut easy = curl::easy::Easy::new();
        easy.url(url)?;
        easy.follow_location(true)?;
        easy.max_redirections(10)?;
        easy.fail_on_error(true)?;
        easy.connect_timeout(self.connect_timeout)?;
        // Abort if throughput drops below 1 byte/s for 5 minutes. No hard timeout.
        easy.low_speed_limit(1)?;
        easy.low_speed_time(Duration::from_secs(300))?;
        if opts.max_bytes_per_sec > 0 {
            easy.max_recv_speed(opts.max_bytes_per_sec)?;
        }
        easy.progress(true)?;

        let started = Instant::now();
        let mut last_report: Option<Instant> = None;
        let interval = opts.callback_interval;

        let perform_result = {
            let mut transfer = easy.transfer();
            transfer.write_function(|data| match writer.write_all(data) {
                Ok(()) => Ok(data.len()),
                Err(e) => {
                    write_error = Some(e);
                    // Returning a short count makes curl abort with a write error.
                    Ok(0)
                }
            })?;
            transfer.progress_function(|dltotal, dlnow, _, _| {
                let now = Instant::now();
                let due = last_report.map_or(true, |t| now.duration_since(t) >= interval);
                if due {
                    last_report = Some(now);
                    let stats = TransferStats {
                        bytes_done: dlnow.max(0.0) as u64,
                        total_bytes: (dltotal > 0.0).then(|| dltotal as u64),
                        elapsed: now.duration_since(started),
                    };
                    on_progress(&stats);
                }
                true
            })?;
            transfer.perform()
        };

        if let Err(e) = perform_result {
            if e.is_http_returned_error() {
                return Err(FetchError::Http(easy.response_code()?));
            }
            if e.is_write_error() {
                if let Some(io_err) = write_error.take() {
                    return Err(FetchError::Storage(io_err));
                }
            }
            return Err(FetchError::Curl(e));
        }

        // Other protocols report their own reply codes (0 for file://, 226 for ftp).
        if is_http(url) {
            let code = easy.response_code()?;
            if !(200..300).contains(&code) {
                return Err(FetchError::Http(code));
            }
        }

        writer.flush()?;
        tracing::debug!(url, dest = %dest.display(), "transfer finished");
        Ok(())
    }
}

fn is_http(url: &str) -> bool {
    url::Url::parse(url)
        .map(|u| matches!(u.scheme(), "http" | "https"))
        .unwrap_or(false)
}
