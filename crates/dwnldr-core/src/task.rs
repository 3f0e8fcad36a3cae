//! Download tasks and the messages they send to the orchestrator.
//!
//! A running task owns nothing the orchestrator reads; it only sends
//! [`ProgressSample`]s on the progress channel and its slot on the completion
//! channel, exactly once, whatever the outcome.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::fetch::{FetchError, FetchOptions, Fetcher, TransferStats};
use crate::format::{format_duration, format_percent};

/// One URL-to-file transfer, as planned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadTask {
    pub url: String,
    pub output_path: PathBuf,
    /// Resolved filename, shown on the task's row.
    pub display_name: String,
    /// Terminal row and key of all per-task state, in `1..=total`.
    pub slot: usize,
}

/// Progress report from a running task.
#[derive(Debug)]
pub struct ProgressSample {
    pub slot: usize,
    /// Fraction complete in `[0.0, 1.0]`.
    pub fraction: f64,
    pub percent_text: String,
    pub rate_text: String,
    pub elapsed_text: String,
    /// Set on the last sample of a failed transfer.
    pub error: Option<FetchError>,
}

impl ProgressSample {
    pub fn from_stats(slot: usize, stats: &TransferStats) -> Self {
        Self {
            slot,
            fraction: stats.fraction(),
            percent_text: stats.percent_text(),
            rate_text: stats.rate_text(),
            elapsed_text: stats.elapsed_text(),
            error: None,
        }
    }

    /// Sample carrying a transfer failure. `last` is the most recent progress
    /// seen, if any, so the row keeps its last known numbers.
    pub fn failed(slot: usize, last: Option<&TransferStats>, error: FetchError) -> Self {
        let mut sample = match last {
            Some(stats) => Self::from_stats(slot, stats),
            None => Self::from_stats(slot, &TransferStats::default()),
        };
        sample.error = Some(error);
        sample
    }
}

/// Channel ends a task reports through.
#[derive(Debug, Clone)]
pub struct TaskChannels {
    pub progress: mpsc::Sender<ProgressSample>,
    pub done: mpsc::Sender<usize>,
}

/// Spawns `task` on the runtime. The transfer itself runs on a blocking worker
/// so the orchestrator loop is never stalled by curl.
pub fn spawn_download(
    task: DownloadTask,
    fetcher: Arc<dyn Fetcher>,
    opts: FetchOptions,
    channels: TaskChannels,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let slot = task.slot;
        let started = Instant::now();
        let progress_tx = channels.progress.clone();

        let worker = tokio::task::spawn_blocking(move || {
            let mut last: Option<TransferStats> = None;
            let result = fetcher.fetch(&task.url, &task.output_path, &opts, &mut |stats| {
                last = Some(stats.clone());
                // Receiver outlives every task; a send error only means shutdown.
                let _ = progress_tx.blocking_send(ProgressSample::from_stats(slot, stats));
            });
            (result, last)
        });

        let final_sample = match worker.await {
            Ok((Ok(()), last)) => {
                let reached_end = last.as_ref().map_or(false, |s| s.fraction() >= 1.0);
                if reached_end {
                    None
                } else {
                    Some(finished_sample(slot, last.as_ref(), started))
                }
            }
            Ok((Err(e), last)) => {
                tracing::warn!(slot, error = %e, "transfer failed");
                Some(ProgressSample::failed(slot, last.as_ref(), e))
            }
            Err(join_err) => {
                tracing::error!(slot, error = %join_err, "transfer worker died");
                Some(ProgressSample::failed(
                    slot,
                    None,
                    FetchError::Aborted(join_err.to_string()),
                ))
            }
        };

        if let Some(sample) = final_sample {
            let _ = channels.progress.send(sample).await;
        }
        let _ = channels.done.send(slot).await;
    })
}

/// Closing sample for a successful transfer whose last report was short of
/// 100% (unknown length, or the final callback was throttled away).
fn finished_sample(slot: usize, last: Option<&TransferStats>, started: Instant) -> ProgressSample {
    let rate_text = last.map(|s| s.rate_text()).unwrap_or_default();
    ProgressSample {
        slot,
        fraction: 1.0,
        percent_text: format_percent(1.0),
        rate_text,
        elapsed_text: format_duration(started.elapsed()),
        error: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    use std::time::Duration;

    struct Scripted {
        steps: Vec<u64>,
        total: Option<u64>,
        fail: bool,
    }

    impl Fetcher for Scripted {
        fn fetch(
            &self,
            _url: &str,
            _dest: &Path,
            _opts: &FetchOptions,
            on_progress: &mut dyn FnMut(&TransferStats),
        ) -> Result<(), FetchError> {
            for &bytes_done in &self.steps {
                on_progress(&TransferStats {
                    bytes_done,
                    total_bytes: self.total,
                    elapsed: Duration::from_millis(100),
                });
            }
            if self.fail {
                Err(FetchError::Http(404))
            } else {
                Ok(())
            }
        }
    }

    struct Panicking;

    impl Fetcher for Panicking {
        fn fetch(
            &self,
            _url: &str,
            _dest: &Path,
            _opts: &FetchOptions,
            _on_progress: &mut dyn FnMut(&TransferStats),
        ) -> Result<(), FetchError> {
            panic!("fetcher blew up");
        }
    }

    fn task(slot: usize) -> DownloadTask {
        DownloadTask {
            url: "http://example.com/file".to_string(),
            output_path: PathBuf::from("/nonexistent/file"),
            display_name: "file".to_string(),
            slot,
        }
    }

    async fn run(fetcher: Arc<dyn Fetcher>) -> (Vec<ProgressSample>, Vec<usize>) {
        let (progress_tx, mut progress_rx) = mpsc::channel(64);
        let (done_tx, mut done_rx) = mpsc::channel(8);
        let channels = TaskChannels {
            progress: progress_tx,
            done: done_tx,
        };
        spawn_download(task(3), fetcher, FetchOptions::default(), channels)
            .await
            .unwrap();
        let mut samples = Vec::new();
        while let Ok(s) = progress_rx.try_recv() {
            samples.push(s);
        }
        let mut done = Vec::new();
        while let Ok(slot) = done_rx.try_recv() {
            done.push(slot);
        }
        (samples, done)
    }

    #[tokio::test]
    async fn success_reports_progress_then_completes_once() {
        let fetcher = Arc::new(Scripted {
            steps: vec![50, 100],
            total: Some(100),
            fail: false,
        });
        let (samples, done) = run(fetcher).await;
        assert_eq!(done, vec![3]);
        assert_eq!(samples.len(), 2);
        assert!(samples.iter().all(|s| s.slot == 3 && s.error.is_none()));
        assert_eq!(samples[1].fraction, 1.0);
    }

    #[tokio::test]
    async fn unknown_length_gets_closing_sample() {
        let fetcher = Arc::new(Scripted {
            steps: vec![10, 20],
            total: None,
            fail: false,
        });
        let (samples, done) = run(fetcher).await;
        assert_eq!(done, vec![3]);
        let last = samples.last().unwrap();
        assert_eq!(last.fraction, 1.0);
        assert_eq!(last.percent_text, "100.0%");
    }

    #[tokio::test]
    async fn failure_carries_error_and_still_completes() {
        let fetcher = Arc::new(Scripted {
            steps: vec![],
            total: None,
            fail: true,
        });
        let (samples, done) = run(fetcher).await;
        assert_eq!(done, vec![3]);
        assert_eq!(samples.len(), 1);
        assert!(matches!(samples[0].error, Some(FetchError::Http(404))));
    }

    #[tokio::test]
    async fn panic_in_fetcher_still_completes() {
        let (samples, done) = run(Arc::new(Panicking)).await;
        assert_eq!(done, vec![3]);
        assert!(matches!(samples[0].error, Some(FetchError::Aborted(_))));
    }
}
