//! Undo/redo history over full element-collection snapshots.
//!
//! A single linear log with a cursor. Every content edit records the whole
//! collection, so undo/redo is a cursor move, never an inverse mutation.
//! Recording after an undo discards the redoable tail. Boundary calls are
//! no-ops, never errors. The log is unbounded unless a depth is configured.

use iso_core::model::Element;

/// Linear snapshot log. Invariant: `0 <= cursor < entries.len()`.
#[derive(Debug, Clone)]
pub struct History {
    entries: Vec<Vec<Element>>,
    cursor: usize,
    /// Maximum number of entries kept (at least 1). `None` keeps everything.
    max_depth: Option<usize>,
}

impl Default for History {
    fn default() -> Self {
        Self::new(None)
    }
}

impl History {
    /// One empty snapshot at cursor 0.
    pub fn new(max_depth: Option<usize>) -> Self {
        Self {
            entries: vec![Vec::new()],
            cursor: 0,
            max_depth: max_depth.map(|depth| depth.max(1)),
        }
    }

    /// Snapshot at the cursor: the live element collection.
    pub fn current(&self) -> &[Element] {
        &self.entries[self.cursor]
    }

    /// Append `snapshot` after the cursor, discarding any redoable entries.
    pub fn record(&mut self, snapshot: Vec<Element>) {
        self.entries.truncate(self.cursor + 1);
        self.entries.push(snapshot);
        if let Some(max_depth) = self.max_depth
            && self.entries.len() > max_depth
        {
            let excess = self.entries.len() - max_depth;
            self.entries.drain(..excess);
        }
        self.cursor = self.entries.len() - 1;
        log::debug!("history: recorded entry {} of {}", self.cursor + 1, self.entries.len());
    }

    /// Step back. `None` at the earliest entry.
    pub fn undo(&mut self) -> Option<&[Element]> {
        if !self.can_undo() {
            return None;
        }
        self.cursor -= 1;
        log::debug!("history: undo to entry {}", self.cursor + 1);
        Some(self.current())
    }

    /// Step forward. `None` at the latest entry.
    pub fn redo(&mut self) -> Option<&[Element]> {
        if !self.can_redo() {
            return None;
        }
        self.cursor += 1;
        log::debug!("history: redo to entry {}", self.cursor + 1);
        Some(self.current())
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        self.cursor + 1 < self.entries.len()
    }

    /// Replace the whole log with a single entry.
    pub fn reset(&mut self, snapshot: Vec<Element>) {
        self.entries = vec![snapshot];
        self.cursor = 0;
    }

    /// Number of entries, including the initial one.
    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn max_depth(&self) -> Option<usize> {
        self.max_depth
    }
}
