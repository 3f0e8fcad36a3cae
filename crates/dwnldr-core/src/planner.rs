//! Output planning: assigns every URL a destination path and a terminal slot.
//!
//! Name collisions are resolved against the names already handed out in this
//! run only; the filesystem is never consulted.

use std::collections::HashSet;
use std::path::Path;

use crate::task::DownloadTask;
use crate::url_model::derive_filename;

/// Returns `desired` if it is not in `taken`, otherwise the first free
/// `desired-1`, `desired-2`, ...
pub fn resolve_collision(desired: &str, taken: &HashSet<String>) -> String {
    if !taken.contains(desired) {
        return desired.to_string();
    }
    (1u64..)
        .map(|i| format!("{}-{}", desired, i))
        .find(|candidate| !taken.contains(candidate))
        .unwrap_or_else(|| desired.to_string())
}

/// Builds the task set for `urls`, in order, with slots `1..=n`.
///
/// `forced_name` replaces the derived filename for every URL (collisions are
/// still resolved, so the second URL gets `name-1`). A URL listed more than once
/// is planned once.
pub fn plan_downloads(
    urls: &[String],
    forced_name: Option<&str>,
    output_dir: &Path,
) -> Vec<DownloadTask> {
    let mut taken: HashSet<String> = HashSet::with_capacity(urls.len());
    let mut seen_urls: HashSet<&str> = HashSet::with_capacity(urls.len());
    let mut tasks = Vec::with_capacity(urls.len());

    for url in urls {
        if !seen_urls.insert(url.as_str()) {
            tracing::debug!(%url, "duplicate URL skipped");
            continue;
        }
        let desired = match forced_name.filter(|n| !n.is_empty()) {
            Some(name) => name.to_string(),
            None => derive_filename(url),
        };
        let name = resolve_collision(&desired, &taken);
        taken.insert(name.clone());

        let slot = tasks.len() + 1;
        tasks.push(DownloadTask {
            url: url.clone(),
            output_path: output_dir.join(&name),
            display_name: name,
            slot,
        });
    }

    tasks
}
