//! Row-addressed output targets.

use std::collections::BTreeMap;
use std::io::{self, Write};
use std::sync::{Arc, Mutex};

use crossterm::cursor::MoveTo;
use crossterm::style::Print;
use crossterm::terminal::{Clear, ClearType};
use crossterm::{execute, queue};

/// A surface with addressable rows, numbered from 1 at the top.
pub trait Screen: Send {
    /// Blanks the whole surface.
    fn clear(&mut self) -> io::Result<()>;
    /// Replaces the content of `row` with `text` in one write.
    fn write_row(&mut self, row: usize, text: &str) -> io::Result<()>;
    /// Leaves the cursor at the start of `row` (e.g. below the last line on exit).
    fn park(&mut self, row: usize) -> io::Result<()>;
}

fn terminal_row(row: usize) -> u16 {
    u16::try_from(row.saturating_sub(1)).unwrap_or(u16::MAX)
}

/// The process's stdout, driven with crossterm cursor commands.
#[derive(Debug, Default)]
pub struct TerminalScreen;

impl TerminalScreen {
    pub fn new() -> Self {
        Self
    }
}

impl Screen for TerminalScreen {
    fn clear(&mut self) -> io::Result<()> {
        let mut out = io::stdout().lock();
        execute!(out, Clear(ClearType::All), MoveTo(0, 0))
    }

    fn write_row(&mut self, row: usize, text: &str) -> io::Result<()> {
        let mut out = io::stdout().lock();
        queue!(
            out,
            MoveTo(0, terminal_row(row)),
            Clear(ClearType::CurrentLine),
            Print(text)
        )?;
        out.flush()
    }

    fn park(&mut self, row: usize) -> io::Result<()> {
        let mut out = io::stdout().lock();
        execute!(out, MoveTo(0, terminal_row(row)))
    }
}

/// Terminal width in columns, if stdout is a terminal.
pub fn terminal_columns() -> Option<usize> {
    crossterm::terminal::size()
        .ok()
        .map(|(cols, _)| cols as usize)
        .filter(|c| *c > 0)
}

/// In-memory screen. Clones share the same rows, so a caller can keep a handle
/// and inspect what was drawn after handing the screen to a renderer.
#[derive(Debug, Clone, Default)]
pub struct MemoryScreen {
    inner: Arc<Mutex<MemoryRows>>,
}

#[derive(Debug, Default)]
struct MemoryRows {
    rows: BTreeMap<usize, String>,
    writes: Vec<(usize, String)>,
    parked_at: Option<usize>,
}

impl MemoryScreen {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current content of `row`.
    pub fn row(&self, row: usize) -> Option<String> {
        self.lock().rows.get(&row).cloned()
    }

    /// Every write so far, in order.
    pub fn writes(&self) -> Vec<(usize, String)> {
        self.lock().writes.clone()
    }

    pub fn parked_at(&self) -> Option<usize> {
        self.lock().parked_at
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MemoryRows> {
        // A panic while holding the lock leaves plain data behind; keep reading it.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Screen for MemoryScreen {
    fn clear(&mut self) -> io::Result<()> {
        self.lock().rows.clear();
        Ok(())
    }

    fn write_row(&mut self, row: usize, text: &str) -> io::Result<()> {
        let mut inner = self.lock();
        inner.rows.insert(row, text.to_string());
        inner.writes.push((row, text.to_string()));
        Ok(())
    }

    fn park(&mut self, row: usize) -> io::Result<()> {
        self.lock().parked_at = Some(row);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_screen_replaces_rows() {
        let mut screen = MemoryScreen::new();
        let handle = screen.clone();
        screen.write_row(2, "first").unwrap();
        screen.write_row(2, "second").unwrap();
        screen.write_row(1, "top").unwrap();
        assert_eq!(handle.row(2).as_deref(), Some("second"));
        assert_eq!(handle.row(1).as_deref(), Some("top"));
        assert_eq!(handle.writes().len(), 3);
        screen.clear().unwrap();
        assert_eq!(handle.row(1), None);
    }

    #[test]
    fn rows_are_one_based() {
        assert_eq!(terminal_row(1), 0);
        assert_eq!(terminal_row(0), 0);
        assert_eq!(terminal_row(5), 4);
    }
}
