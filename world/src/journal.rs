//! Undo stack and append-only session history.

use std::fmt;

use last_protocol_core::Position;

/// LIFO record of positions captured before state-changing actions.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UndoStack {
    positions: Vec<Position>,
}

impl UndoStack {
    /// Creates an empty undo stack.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Captures a position so a later undo can return to it.
    pub fn push(&mut self, position: Position) {
        self.positions.push(position);
    }

    /// Removes and returns the most recently captured position.
    pub fn pop(&mut self) -> Option<Position> {
        self.positions.pop()
    }

    /// Most recently captured position, without removing it.
    #[must_use]
    pub fn peek(&self) -> Option<Position> {
        self.positions.last().copied()
    }

    /// Reports whether no positions are recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Number of recorded positions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.positions.len()
    }
}

/// Immutable textual record of a single session event.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct HistoryEntry {
    text: String,
}

impl HistoryEntry {
    /// Text of the entry.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }
}

impl fmt::Display for HistoryEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Append-only, insertion-ordered session record.
///
/// Entries are never reordered or pruned; the log is rendered in full at both
/// endings.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HistoryLog {
    entries: Vec<HistoryEntry>,
}

impl HistoryLog {
    /// Creates an empty history log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an entry to the end of the log.
    pub fn append(&mut self, text: impl Into<String>) {
        self.entries.push(HistoryEntry { text: text.into() });
    }

    /// Every entry in insertion order.
    #[must_use]
    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    /// Number of recorded entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Reports whether nothing has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
