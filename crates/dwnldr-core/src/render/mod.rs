//! Terminal rendering: one row per task plus an aggregate row below them.
//!
//! Task rows live at their slot (`1..=total`), the aggregate row at
//! `total + 1`. Every update rewrites a whole row through [`Screen::write_row`].

mod bar;
mod screen;
mod spinner;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

pub use bar::{align_right, clip, fit_width, render_bar};
pub use screen::{terminal_columns, MemoryScreen, Screen, TerminalScreen};
pub use spinner::Spinner;

use crate::format::format_percent;
use crate::task::{DownloadTask, ProgressSample};

/// Default bar width in columns.
pub const DEFAULT_BAR_WIDTH: usize = 28;

const NAME_WIDTH: usize = 15;
const URL_WIDTH: usize = 20;
const PERCENT_WIDTH: usize = 6;
const RATE_WIDTH: usize = 10;
const ELAPSED_WIDTH: usize = 6;

/// How much the progress display shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DetailMode {
    /// Per-task bars plus a live aggregate row.
    #[default]
    Full,
    /// Per-task percentage and rate only; the aggregate row shows just the summary.
    Minimal,
}

/// Static layout parameters for a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layout {
    pub bar_width: usize,
    pub detail: DetailMode,
    /// Clip lines to this many columns when known.
    pub max_columns: Option<usize>,
}

impl Default for Layout {
    fn default() -> Self {
        Self {
            bar_width: DEFAULT_BAR_WIDTH,
            detail: DetailMode::Full,
            max_columns: None,
        }
    }
}

/// Formats progress lines and writes them to their rows.
pub struct Renderer<S: Screen> {
    screen: S,
    layout: Layout,
    total: usize,
    task_spinners: HashMap<usize, Spinner>,
    aggregate_spinner: Spinner,
}

impl<S: Screen> Renderer<S> {
    pub fn new(screen: S, layout: Layout, total: usize) -> Self {
        Self {
            screen,
            layout,
            total,
            task_spinners: HashMap::with_capacity(total),
            aggregate_spinner: Spinner::default(),
        }
    }

    /// Row of the aggregate line.
    pub fn aggregate_row(&self) -> usize {
        self.total + 1
    }

    /// Clears the surface before the first row is drawn.
    pub fn begin(&mut self) {
        if let Err(e) = self.screen.clear() {
            tracing::warn!(error = %e, "failed to clear terminal");
        }
    }

    /// In-progress line for a task.
    pub fn task_progress(&mut self, task: &DownloadTask, sample: &ProgressSample) {
        let spin = self
            .task_spinners
            .entry(task.slot)
            .or_default()
            .next_frame();
        let line = match self.layout.detail {
            DetailMode::Full => format!(
                "{} [{}] {} | {} | {}",
                spin,
                render_bar(self.layout.bar_width, sample.fraction),
                align_right(&sample.percent_text, PERCENT_WIDTH),
                align_right(&sample.rate_text, RATE_WIDTH),
                fit_width(&task.display_name, NAME_WIDTH),
            ),
            DetailMode::Minimal => format!(
                "{} {} | {} | {}",
                spin,
                align_right(&sample.percent_text, PERCENT_WIDTH),
                align_right(&sample.rate_text, RATE_WIDTH),
                fit_width(&task.display_name, NAME_WIDTH),
            ),
        };
        self.write(task.slot, &line);
    }

    /// Finished line for a task.
    pub fn task_done(&mut self, task: &DownloadTask, sample: &ProgressSample) {
        let elapsed = align_right(&sample.elapsed_text, ELAPSED_WIDTH);
        let name = fit_width(&task.display_name, NAME_WIDTH);
        let line = match self.layout.detail {
            DetailMode::Full => format!(
                "D [{}] [{}]: {}",
                render_bar(self.layout.bar_width, 1.0),
                elapsed,
                name
            ),
            DetailMode::Minimal => format!("D [{}]: {}", elapsed, name),
        };
        self.write(task.slot, &line);
    }

    /// Error line for a task: truncated URL and the error text.
    pub fn task_failed(&mut self, task: &DownloadTask, error: &dyn std::fmt::Display) {
        let line = format!("E {}: {}", fit_width(&task.url, URL_WIDTH), error);
        self.write(task.slot, &line);
    }

    /// Live aggregate line. Not drawn in minimal mode.
    pub fn aggregate(&mut self, fraction: f64, completed: usize) {
        if self.layout.detail == DetailMode::Minimal {
            return;
        }
        let line = format!(
            "{} [{}] {} | {}/{} File(s)",
            self.aggregate_spinner.next_frame(),
            render_bar(self.layout.bar_width, fraction),
            align_right(&format_percent(fraction), PERCENT_WIDTH),
            completed,
            self.total
        );
        let row = self.aggregate_row();
        self.write(row, &line);
    }

    /// Final line once every task has completed; leaves the cursor below it.
    pub fn summary(&mut self, completed: usize, failed: usize) {
        let mut line = match self.layout.detail {
            DetailMode::Full => format!(
                "G [{}] {} | {}/{} File(s)",
                render_bar(self.layout.bar_width, 1.0),
                format_percent(1.0),
                completed,
                self.total
            ),
            DetailMode::Minimal => format!(
                "G {} | {}/{} File(s)",
                format_percent(1.0),
                completed,
                self.total
            ),
        };
        if failed > 0 {
            line.push_str(&format!(", {} failed", failed));
        }
        let row = self.aggregate_row();
        self.write(row, &line);
        if let Err(e) = self.screen.park(row + 1) {
            tracing::warn!(error = %e, "failed to move cursor below progress rows");
        }
    }

    fn write(&mut self, row: usize, line: &str) {
        let line = match self.layout.max_columns {
            Some(cols) => clip(line, cols),
            None => line,
        };
        if let Err(e) = self.screen.write_row(row, line) {
            tracing::warn!(row, error = %e, "terminal write failed");
        }
    }
}
