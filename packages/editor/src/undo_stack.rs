//! # Undo/Redo Stack
//!
//! Snapshot history over whole documents.
//!
//! ## Design
//!
//! - Every committed command records the document as it was *before* the change
//! - Undo swaps the live document with the newest `past` snapshot and parks the
//!   live document at the front of `future`
//! - Redo does the reverse
//! - Recording a new command clears `future`
//! - Batches group several commands into one undo step
//!
//! Snapshots are cheap: documents share untouched sections through `Arc`.
//!
//! ## Example
//!
//! ```rust,ignore
//! let mut stack = UndoStack::new();
//!
//! stack.record(doc.clone(), "add section", None);
//! doc = next;
//!
//! stack.undo(&mut doc)?;
//! stack.redo(&mut doc)?;
//! ```

use pagecraft_model::Document;
use std::collections::VecDeque;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HistoryError {
    #[error("Nothing to undo")]
    Underflow,

    #[error("Nothing to redo")]
    Overflow,
}

/// One undo step
#[derive(Debug, Clone)]
pub struct HistoryEntry {
    /// Document to restore
    pub snapshot: Document,

    /// What the step did, for UI labels
    pub label: String,
}

#[derive(Debug)]
struct OpenBatch {
    label: String,
    snapshot: Option<Document>,
    depth: usize,
}

/// Linear undo/redo history for one editing session
#[derive(Debug)]
pub struct UndoStack {
    /// Most recent last
    past: Vec<HistoryEntry>,

    /// Next redo first
    future: VecDeque<HistoryEntry>,

    /// `None` keeps every step
    max_levels: Option<usize>,

    batch: Option<OpenBatch>,

    /// Key of the last recorded step, while it may still absorb followups
    coalesce_key: Option<String>,
}

impl UndoStack {
    /// Unbounded history
    pub fn new() -> Self {
        Self::with_max_levels(None)
    }

    pub fn with_max_levels(max_levels: Option<usize>) -> Self {
        Self {
            past: Vec::new(),
            future: VecDeque::new(),
            max_levels,
            batch: None,
            coalesce_key: None,
        }
    }

    /// Record the pre-change document of a committed command.
    ///
    /// A step carrying the same `coalesce` key as the step right before it is
    /// folded into that step, so undo skips both at once.
    pub fn record(&mut self, before: Document, label: impl Into<String>, coalesce: Option<String>) {
        self.future.clear();

        if let Some(batch) = &mut self.batch {
            batch.snapshot.get_or_insert(before);
            return;
        }

        if coalesce.is_some() && coalesce == self.coalesce_key && !self.past.is_empty() {
            return;
        }

        self.coalesce_key = coalesce;
        self.push_entry(HistoryEntry {
            snapshot: before,
            label: label.into(),
        });
    }

    /// Start grouping commands into one undo step. Batches nest; only the
    /// outermost label is kept.
    pub fn begin_batch(&mut self, label: impl Into<String>) {
        match &mut self.batch {
            Some(batch) => batch.depth += 1,
            None => {
                self.batch = Some(OpenBatch {
                    label: label.into(),
                    snapshot: None,
                    depth: 1,
                })
            }
        }
    }

    /// Close the current batch. Returns whether it produced an undo step.
    pub fn end_batch(&mut self) -> bool {
        let Some(batch) = &mut self.batch else {
            return false;
        };

        batch.depth -= 1;
        if batch.depth > 0 {
            return false;
        }

        match self.batch.take() {
            Some(OpenBatch {
                label,
                snapshot: Some(snapshot),
                ..
            }) => {
                self.coalesce_key = None;
                self.push_entry(HistoryEntry { snapshot, label });
                true
            }
            _ => false,
        }
    }

    pub fn is_batching(&self) -> bool {
        self.batch.is_some()
    }

    fn push_entry(&mut self, entry: HistoryEntry) {
        self.past.push(entry);

        if let Some(max) = self.max_levels {
            if self.past.len() > max {
                let excess = self.past.len() - max;
                self.past.drain(..excess);
            }
        }
    }

    /// Restore the newest snapshot into `current`
    pub fn undo(&mut self, current: &mut Document) -> Result<(), HistoryError> {
        self.end_open_batch();

        let entry = self.past.pop().ok_or(HistoryError::Underflow)?;
        let now = std::mem::replace(current, entry.snapshot);
        self.future.push_front(HistoryEntry {
            snapshot: now,
            label: entry.label,
        });
        self.coalesce_key = None;
        Ok(())
    }

    /// Re-apply the most recently undone step to `current`
    pub fn redo(&mut self, current: &mut Document) -> Result<(), HistoryError> {
        self.end_open_batch();

        let entry = self.future.pop_front().ok_or(HistoryError::Overflow)?;
        let now = std::mem::replace(current, entry.snapshot);
        self.past.push(HistoryEntry {
            snapshot: now,
            label: entry.label,
        });
        self.coalesce_key = None;
        Ok(())
    }

    /// Undo/redo in the middle of a batch closes it first
    fn end_open_batch(&mut self) {
        if let Some(batch) = &mut self.batch {
            batch.depth = 1;
        }
        self.end_batch();
    }

    /// Stop folding followups into the newest step
    pub fn break_coalescing(&mut self) {
        self.coalesce_key = None;
    }

    pub fn can_undo(&self) -> bool {
        !self.past.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.future.is_empty()
    }

    pub fn undo_levels(&self) -> usize {
        self.past.len()
    }

    pub fn redo_levels(&self) -> usize {
        self.future.len()
    }

    pub fn undo_label(&self) -> Option<&str> {
        self.past.last().map(|entry| entry.label.as_str())
    }

    pub fn redo_label(&self) -> Option<&str> {
        self.future.front().map(|entry| entry.label.as_str())
    }

    pub fn clear(&mut self) {
        self.past.clear();
        self.future.clear();
        self.batch = None;
        self.coalesce_key = None;
    }
}

impl Default for UndoStack {
    fn default() -> Self {
        Self::new()
    }
}
