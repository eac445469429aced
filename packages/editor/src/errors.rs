//! Error types for the editor

use crate::mutations::MutationError;
use crate::undo_stack::HistoryError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EditorError {
    #[error("Mutation error: {0}")]
    Mutation(#[from] MutationError),

    #[error("History error: {0}")]
    History(#[from] HistoryError),

    #[error("Config error: {0}")]
    Config(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Editor is in preview mode")]
    PreviewMode,

    #[error("No drag in progress")]
    NoDrag,

    #[error("No drop target under the pointer")]
    NoDropTarget,

    #[error("Repeated drop of {0} ignored")]
    DuplicateDrop(String),
}

impl EditorError {
    /// Whether this error means the command was skipped rather than broken
    pub fn is_no_op(&self) -> bool {
        matches!(
            self,
            EditorError::Mutation(_)
                | EditorError::History(_)
                | EditorError::PreviewMode
                | EditorError::NoDrag
                | EditorError::NoDropTarget
                | EditorError::DuplicateDrop(_)
        )
    }
}
