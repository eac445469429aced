use thiserror::Error;

/// Errors raised while building or validating a page tree
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TreeError {
    #[error("Unknown widget type: {0}")]
    UnknownWidgetType(String),

    #[error("Invalid column count {0} (expected 1-6)")]
    InvalidColumnCount(usize),

    #[error("Malformed layout: {0}")]
    MalformedLayout(String),

    #[error("Layout '{layout}' does not fit {columns} column(s)")]
    InvalidLayout { layout: String, columns: usize },

    #[error("Duplicate node id: {0}")]
    DuplicateId(String),

    #[error("Invalid content for {kind}: {reason}")]
    InvalidContent { kind: String, reason: String },
}
