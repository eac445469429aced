//! # Drag and Drop
//!
//! Turns a finished drag gesture into a [`Mutation`].
//!
//! ```text
//! pointer hit test ─→ [DropCandidate]     (host: everything under the pointer)
//!                          │
//!          resolve_drop_target(source)     (most specific target wins)
//!                          │
//!                 plan_drop(document)      (classify the move)
//!                          │
//!                       Mutation
//! ```
//!
//! Three move classes:
//!
//! 1. section onto section: array move in the page
//! 2. widget onto a widget of the same column: array move in the column
//! 3. widget or palette item into another column: insert after the widget it
//!    was dropped on, or append when dropped on empty column space

use crate::mutations::{Mutation, MutationError};
use pagecraft_model::tree::{locate_column, locate_widget, section_index};
use pagecraft_model::Document;
use serde::{Deserialize, Serialize};

/// What is being dragged
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum DragSource {
    Section { id: String },
    Widget { id: String },
    /// A new widget from the palette
    Palette { widget_type: String },
}

impl DragSource {
    /// Identity of the dragged item, used to recognise repeated drops
    pub fn key(&self) -> String {
        match self {
            DragSource::Section { id } => format!("section:{}", id),
            DragSource::Widget { id } => format!("widget:{}", id),
            DragSource::Palette { widget_type } => format!("palette:{}", widget_type),
        }
    }
}

/// A droppable node under the pointer
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum DropCandidate {
    Section {
        id: String,
    },
    Column {
        id: String,
        section_id: String,
    },
    Widget {
        id: String,
        column_id: String,
        section_id: String,
    },
}

impl DropCandidate {
    /// Higher is more specific
    fn rank(&self) -> u8 {
        match self {
            DropCandidate::Section { .. } => 1,
            DropCandidate::Column { .. } => 2,
            DropCandidate::Widget { .. } => 3,
        }
    }

    pub fn id(&self) -> &str {
        match self {
            DropCandidate::Section { id }
            | DropCandidate::Column { id, .. }
            | DropCandidate::Widget { id, .. } => id,
        }
    }
}

/// Pick the drop target for `source` among the candidates under the pointer.
///
/// Widget targets beat column targets, which beat section targets. Sections
/// only ever land on sections. Among equally specific candidates the first
/// reported wins.
pub fn resolve_drop_target<'a>(
    source: &DragSource,
    candidates: &'a [DropCandidate],
) -> Option<&'a DropCandidate> {
    match source {
        DragSource::Section { .. } => candidates
            .iter()
            .find(|c| matches!(c, DropCandidate::Section { .. })),
        DragSource::Widget { .. } | DragSource::Palette { .. } => candidates
            .iter()
            .enumerate()
            .max_by_key(|(i, c)| (c.rank(), std::cmp::Reverse(*i)))
            .map(|(_, c)| c),
    }
}

/// Plan the mutation for dropping `source` on `target`.
///
/// Parent ids carried by the candidate are ignored; the tree is the authority
/// on where a node lives.
pub fn plan_drop(
    doc: &Document,
    source: &DragSource,
    target: &DropCandidate,
) -> Result<Mutation, MutationError> {
    match source {
        DragSource::Section { id } => {
            let DropCandidate::Section { id: over } = target else {
                return Err(MutationError::InvalidMove(format!(
                    "section {} can only be dropped on a section",
                    id
                )));
            };

            let from =
                section_index(doc, id).ok_or_else(|| MutationError::NodeNotFound(id.clone()))?;
            let to =
                section_index(doc, over).ok_or_else(|| MutationError::NodeNotFound(over.clone()))?;
            if from == to {
                return Err(MutationError::InvalidMove(format!(
                    "section {} dropped on itself",
                    id
                )));
            }

            Ok(Mutation::MoveSection {
                section_id: id.clone(),
                to_index: to,
            })
        }

        DragSource::Widget { id } => {
            let from = locate_widget(doc, id).ok_or_else(|| MutationError::NodeNotFound(id.clone()))?;

            match target {
                DropCandidate::Widget { id: over, .. } => {
                    let to = locate_widget(doc, over)
                        .ok_or_else(|| MutationError::NodeNotFound(over.clone()))?;
                    let section = &doc.sections[to.section];
                    let column_id = section.columns[to.column].id.clone();

                    let index = if from.column_path() == to.column_path() {
                        if from.widget == to.widget {
                            return Err(MutationError::InvalidMove(format!(
                                "widget {} dropped on itself",
                                id
                            )));
                        }
                        to.widget
                    } else {
                        to.widget + 1
                    };

                    Ok(Mutation::MoveWidget {
                        widget_id: id.clone(),
                        column_id,
                        section_id: section.id.clone(),
                        index: Some(index),
                    })
                }

                DropCandidate::Column { id: over, .. } => {
                    let to = locate_column(doc, over)
                        .ok_or_else(|| MutationError::NodeNotFound(over.clone()))?;
                    if from.column_path() == to {
                        return Err(MutationError::InvalidMove(format!(
                            "widget {} is already in column {}",
                            id, over
                        )));
                    }

                    Ok(Mutation::MoveWidget {
                        widget_id: id.clone(),
                        column_id: over.clone(),
                        section_id: doc.sections[to.section].id.clone(),
                        index: None,
                    })
                }

                DropCandidate::Section { .. } => Err(MutationError::InvalidMove(format!(
                    "widget {} needs a column",
                    id
                ))),
            }
        }

        DragSource::Palette { widget_type } => match target {
            DropCandidate::Widget { id: over, .. } => {
                let to = locate_widget(doc, over)
                    .ok_or_else(|| MutationError::NodeNotFound(over.clone()))?;
                let section = &doc.sections[to.section];

                Ok(Mutation::AddWidget {
                    widget_type: widget_type.clone(),
                    column_id: section.columns[to.column].id.clone(),
                    section_id: section.id.clone(),
                    index: Some(to.widget + 1),
                })
            }

            DropCandidate::Column { id: over, .. } => {
                let to = locate_column(doc, over)
                    .ok_or_else(|| MutationError::NodeNotFound(over.clone()))?;

                Ok(Mutation::AddWidget {
                    widget_type: widget_type.clone(),
                    column_id: over.clone(),
                    section_id: doc.sections[to.section].id.clone(),
                    index: None,
                })
            }

            DropCandidate::Section { .. } => Err(MutationError::InvalidMove(format!(
                "new {} needs a column",
                widget_type
            ))),
        },
    }
}

/// An in-progress drag gesture, owned by the session
#[derive(Debug, Clone, PartialEq)]
pub struct DragSession {
    pub source: DragSource,

    /// Host timestamp (ms) of the drag start
    pub started_at: u64,

    /// Current hover target; visual feedback only
    pub over: Option<DropCandidate>,
}

impl DragSession {
    pub fn new(source: DragSource, started_at: u64) -> Self {
        Self {
            source,
            started_at,
            over: None,
        }
    }

    /// Track the pointer; returns the target a drop would hit right now
    pub fn hover(&mut self, candidates: &[DropCandidate]) -> Option<&DropCandidate> {
        self.over = resolve_drop_target(&self.source, candidates).cloned();
        self.over.as_ref()
    }
}
