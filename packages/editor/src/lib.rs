//! # Pagecraft Editor
//!
//! Editing engine for pagecraft page documents.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ host: canvas, panels, pointer events        │
//! └─────────────────────────────────────────────┘
//!                     ↓ commands
//! ┌─────────────────────────────────────────────┐
//! │ session: EditSession controller             │
//! │  - Apply mutations with validation          │
//! │  - Snapshot undo/redo                       │
//! │  - Selection, viewport, preview mode        │
//! │  - Drag and drop                            │
//! └─────────────────────────────────────────────┘
//!                     ↓ committed documents
//! ┌─────────────────────────────────────────────┐
//! │ pipeline: Document → PageView per viewport  │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Core Principles
//!
//! 1. **Document is source of truth**: views are derived per viewport
//! 2. **Mutations are pure**: each one maps a document to a new document
//! 3. **Rejected commands are no-ops**: the document and history stay as they were
//!
//! ## Usage
//!
//! ```rust,ignore
//! use pagecraft_editor::{EditSession, EditorConfig, Selection};
//!
//! let mut session = EditSession::new(EditorConfig::default());
//! session.on_change(|change| save(change.document));
//!
//! session.add_section(2, None)?;
//! let column = session.document().sections[0].columns[0].id.clone();
//! let section = session.document().sections[0].id.clone();
//! session.add_widget("heading", &column, &section)?;
//!
//! session.undo()?;
//! let view = session.view();
//! ```

mod config;
mod drag;
mod errors;
mod mutations;
mod pipeline;
mod selection;
mod session;
mod undo_stack;

pub use config::{EditorConfig, DEFAULT_CONFIG_NAME};
pub use drag::{plan_drop, resolve_drop_target, DragSession, DragSource, DropCandidate};
pub use errors::EditorError;
pub use mutations::{
    Mutation, MutationContext, MutationError, MutationResult, NodeUpdate, ResponsivePatch,
    StylePatch,
};
pub use pipeline::{
    render_view, AnimationView, ColumnView, NodeAttrs, PageView, Pipeline, SectionView,
    WidgetView,
};
pub use selection::Selection;
pub use session::{DocumentChange, DocumentSink, EditSession, EditorMode};
pub use undo_stack::{HistoryEntry, HistoryError, UndoStack};

// Re-export model types for convenience
pub use pagecraft_model::{Document, InitialValue, Viewport};
