//! dwnldr core: concurrent HTTP downloads with live per-file and aggregate progress.
//!
//! Pipeline: [`planner`] turns URLs into [`task::DownloadTask`]s, the
//! [`orchestrator`] dispatches them (parallel or sequential) and folds their
//! progress into rows drawn by [`render`].

pub mod config;
pub mod logging;

pub mod fetch;
pub mod format;
pub mod orchestrator;
pub mod planner;
pub mod render;
pub mod task;
pub mod units;
pub mod url_model;
