//! Download orchestration: dispatch policy, the progress/completion loop, and
//! termination.
//!
//! Tasks report through two channels, progress and completion. The loop below
//! is the only owner of [`OrchestrationState`]; nothing else reads or writes it.
//! The run ends only after every task has sent its completion signal.

mod state;

use std::collections::BTreeSet;
use std::sync::Arc;

use anyhow::Result;
use tokio::sync::mpsc;

use crate::config::RunConfig;
use crate::fetch::{FetchOptions, Fetcher};
use crate::render::{Renderer, Screen};
use crate::task::{spawn_download, DownloadTask, ProgressSample, TaskChannels};

pub use state::OrchestrationState;

/// Bound on queued progress samples before a transfer thread waits for the loop.
const PROGRESS_CHANNEL_CAPACITY: usize = 64;

/// How tasks are launched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DispatchMode {
    /// One task at a time; the next starts when the previous one completes.
    #[default]
    Sequential,
    /// Every task starts immediately.
    Parallel,
}

/// Outcome of a finished run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub total: usize,
    pub completed: usize,
    /// Slots whose transfer failed.
    pub failed: BTreeSet<usize>,
}

impl RunReport {
    pub fn all_succeeded(&self) -> bool {
        self.failed.is_empty() && self.completed == self.total
    }
}

/// Drives a planned task set to completion and renders its progress.
pub struct Orchestrator<S: Screen> {
    config: Arc<RunConfig>,
    fetcher: Arc<dyn Fetcher>,
    renderer: Renderer<S>,
    tasks: Vec<DownloadTask>,
    state: OrchestrationState,
}

impl<S: Screen> Orchestrator<S> {
    pub fn new(
        config: Arc<RunConfig>,
        fetcher: Arc<dyn Fetcher>,
        screen: S,
        tasks: Vec<DownloadTask>,
    ) -> Self {
        let total = tasks.len();
        let state = OrchestrationState::new(total, config.dispatch, config.max_bytes_per_sec);
        let renderer = Renderer::new(screen, config.layout, total);
        Self {
            config,
            fetcher,
            renderer,
            tasks,
            state,
        }
    }

    /// Runs every task and returns once all of them have completed.
    pub async fn run(mut self) -> Result<RunReport> {
        let total = self.state.total();
        if total == 0 {
            return Ok(RunReport {
                total: 0,
                completed: 0,
                failed: BTreeSet::new(),
            });
        }

        let (progress_tx, mut progress_rx) =
            mpsc::channel::<ProgressSample>(PROGRESS_CHANNEL_CAPACITY);
        // One completion per task, so a channel of `total` never blocks a sender.
        let (done_tx, mut done_rx) = mpsc::channel::<usize>(total);
        let channels = TaskChannels {
            progress: progress_tx,
            done: done_tx,
        };

        tracing::info!(
            total,
            mode = ?self.state.dispatch_mode,
            rate_cap = self.state.rate_cap,
            "starting downloads"
        );
        self.renderer.begin();

        match self.state.dispatch_mode {
            DispatchMode::Parallel => {
                while self.dispatch_next(&channels) {}
            }
            DispatchMode::Sequential => {
                self.dispatch_next(&channels);
            }
        }

        loop {
            tokio::select! {
                Some(slot) = done_rx.recv() => {
                    if self.on_completion(slot, &channels) {
                        // Samples queued before the last completion still get drawn.
                        while let Ok(sample) = progress_rx.try_recv() {
                            self.on_progress(sample);
                        }
                        self.renderer
                            .summary(self.state.completed(), self.state.failed().len());
                        break;
                    }
                }
                Some(sample) = progress_rx.recv() => {
                    self.on_progress(sample);
                }
                else => {
                    anyhow::bail!(
                        "task channels closed after {} of {} completions",
                        self.state.completed(),
                        total
                    );
                }
            }
        }

        let report = RunReport {
            total,
            completed: self.state.completed(),
            failed: self.state.failed().clone(),
        };
        tracing::info!(
            completed = report.completed,
            failed = report.failed.len(),
            "downloads finished"
        );
        Ok(report)
    }

    /// Launches the next pending task, if any. Returns whether one was launched.
    fn dispatch_next(&mut self, channels: &TaskChannels) -> bool {
        let Some(index) = self.state.next_dispatch() else {
            return false;
        };
        let task = self.tasks[index].clone();
        tracing::debug!(
            slot = task.slot,
            url = %task.url,
            dest = %task.output_path.display(),
            "dispatching"
        );
        let opts = FetchOptions {
            max_bytes_per_sec: self.config.max_bytes_per_sec,
            callback_interval: self.config.callback_interval,
        };
        spawn_download(task, Arc::clone(&self.fetcher), opts, channels.clone());
        true
    }

    /// Handles a completion signal; returns `true` once every task is done.
    fn on_completion(&mut self, slot: usize, channels: &TaskChannels) -> bool {
        let all_done = self.state.record_completion();
        tracing::debug!(
            slot,
            completed = self.state.completed(),
            total = self.state.total(),
            "task completed"
        );
        if !all_done && self.state.dispatch_mode == DispatchMode::Sequential {
            self.dispatch_next(channels);
        }
        all_done
    }

    fn on_progress(&mut self, mut sample: ProgressSample) {
        let Some(task) = self.task(sample.slot) else {
            tracing::warn!(slot = sample.slot, "progress for unknown slot ignored");
            return;
        };
        let task = task.clone();

        if let Some(error) = &sample.error {
            tracing::warn!(slot = task.slot, url = %task.url, error = %error, "download failed");
            self.state.record_failure(task.slot);
            self.renderer.task_failed(&task, error);
            return;
        }
        if self.state.is_failed(task.slot) {
            return;
        }

        let fraction = self.state.record_progress(task.slot, sample.fraction);
        sample.fraction = fraction;
        if let Some(aggregate) = self.state.aggregate() {
            self.renderer.aggregate(aggregate, self.state.completed());
        }
        if fraction >= 1.0 {
            self.renderer.task_done(&task, &sample);
        } else {
            self.renderer.task_progress(&task, &sample);
        }
    }

    fn task(&self, slot: usize) -> Option<&DownloadTask> {
        // Slots are dense and 1-based, so the slot doubles as an index.
        self.tasks.get(slot.wrapping_sub(1))
    }
}
