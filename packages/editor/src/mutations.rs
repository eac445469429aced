//! # Page Mutations
//!
//! One command per user-visible edit of the page tree.
//!
//! ## Design Principles
//!
//! 1. **Pure**: `apply` reads the current document and returns a new one; the
//!    input stays a valid history snapshot
//! 2. **Validated**: every id is resolved before any id is minted, so a
//!    rejected command leaves no trace
//! 3. **Copy-on-write**: only the sections a command touches are copied
//!
//! ## Mutation Semantics
//!
//! ### MoveSection / MoveWidget
//! - Remove-then-insert; `index` is the final position in the destination
//! - A move that would leave the node where it is fails with `InvalidMove`
//!
//! ### UpdateNode
//! - Shallow merge into styles, breakpoint overrides, content and advanced
//!   settings; `null` deletes a key
//! - Breakpoint overrides are normalized against desktop styles afterwards
//!
//! ### Delete
//! - Removes the node and its whole subtree

use crate::selection::Selection;
use pagecraft_model::tree::{
    check_column_count, check_layout, duplicate_section, duplicate_widget, locate_column,
    locate_widget, section_index, ColumnPath, WidgetPath,
};
use pagecraft_model::{
    find_section_template, tree, Breakpoint, Document, IdGenerator, SectionLayout, StyleMap,
    StyleSlotsMut, StyleValue, Styled, TreeError, WidgetCatalog, WidgetKind,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::sync::Arc;
use thiserror::Error;

/// Document commands
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum Mutation {
    /// Append a section with `column_count` empty columns
    AddSection {
        column_count: usize,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        layout: Option<SectionLayout>,
    },

    /// Append a section shaped like a catalog template
    AddSectionFromTemplate { template_id: String },

    /// Insert a new widget into a column (appended when `index` is absent)
    AddWidget {
        widget_type: String,
        column_id: String,
        section_id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        index: Option<usize>,
    },

    DuplicateSection { section_id: String },

    DuplicateWidget { widget_id: String },

    DeleteSection { section_id: String },

    DeleteWidget {
        widget_id: String,
        column_id: String,
        section_id: String,
    },

    /// Merge `update` into the node named by `target`
    UpdateNode { target: Selection, update: NodeUpdate },

    MoveSection { section_id: String, to_index: usize },

    /// Move a widget into a column (same or another); appended when `index`
    /// is absent
    MoveWidget {
        widget_id: String,
        column_id: String,
        section_id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        index: Option<usize>,
    },
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum MutationError {
    #[error("Node not found: {0}")]
    NodeNotFound(String),

    #[error("Unknown widget type: {0}")]
    UnknownWidgetType(String),

    #[error("Invalid move: {0}")]
    InvalidMove(String),

    #[error("Invalid update: {0}")]
    InvalidUpdate(String),

    #[error("Invalid structure: {0}")]
    InvalidStructure(String),

    #[error("Nothing is selected")]
    EmptySelection,

    #[error("Update leaves the document unchanged")]
    NoChange,
}

impl From<TreeError> for MutationError {
    fn from(e: TreeError) -> Self {
        match e {
            TreeError::UnknownWidgetType(kind) => MutationError::UnknownWidgetType(kind),
            TreeError::InvalidContent { .. } => MutationError::InvalidUpdate(e.to_string()),
            other => MutationError::InvalidStructure(other.to_string()),
        }
    }
}

/// Per-key style edits; `None` deletes the key
pub type StylePatch = BTreeMap<String, Option<StyleValue>>;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResponsivePatch {
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub tablet: StylePatch,

    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub mobile: StylePatch,
}

impl ResponsivePatch {
    fn get(&self, breakpoint: Breakpoint) -> &StylePatch {
        match breakpoint {
            Breakpoint::Tablet => &self.tablet,
            Breakpoint::Mobile => &self.mobile,
        }
    }

    fn get_mut(&mut self, breakpoint: Breakpoint) -> &mut StylePatch {
        match breakpoint {
            Breakpoint::Tablet => &mut self.tablet,
            Breakpoint::Mobile => &mut self.mobile,
        }
    }
}

/// Partial update of one node
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NodeUpdate {
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub styles: StylePatch,

    #[serde(skip_serializing_if = "is_empty_responsive")]
    pub responsive_overrides: ResponsivePatch,

    /// Widget content fields
    #[serde(skip_serializing_if = "Map::is_empty")]
    pub content: Map<String, Value>,

    /// JSON merge patch over the advanced settings; `null` clears them
    #[serde(skip_serializing_if = "Option::is_none")]
    pub advanced: Option<Value>,

    /// Sections only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub layout: Option<SectionLayout>,

    /// Sections only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gap: Option<u32>,

    /// Columns only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
}

fn is_empty_responsive(patch: &ResponsivePatch) -> bool {
    patch.tablet.is_empty() && patch.mobile.is_empty()
}

impl NodeUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn style(mut self, key: &str, value: impl Into<StyleValue>) -> Self {
        self.styles.insert(key.to_string(), Some(value.into()));
        self
    }

    pub fn remove_style(mut self, key: &str) -> Self {
        self.styles.insert(key.to_string(), None);
        self
    }

    pub fn breakpoint_style(
        mut self,
        breakpoint: Breakpoint,
        key: &str,
        value: impl Into<StyleValue>,
    ) -> Self {
        self.responsive_overrides
            .get_mut(breakpoint)
            .insert(key.to_string(), Some(value.into()));
        self
    }

    pub fn content(mut self, key: &str, value: Value) -> Self {
        self.content.insert(key.to_string(), value);
        self
    }

    pub fn advanced(mut self, patch: Value) -> Self {
        self.advanced = Some(patch);
        self
    }

    pub fn is_empty(&self) -> bool {
        self == &NodeUpdate::default()
    }

    fn apply_common(&self, slots: StyleSlotsMut<'_>) -> Result<(), MutationError> {
        apply_style_patch(slots.styles, &self.styles);

        for breakpoint in [Breakpoint::Tablet, Breakpoint::Mobile] {
            let patch = self.responsive_overrides.get(breakpoint);
            if !patch.is_empty() {
                let overrides = slots.responsive_overrides.get_or_insert_with(Default::default);
                apply_style_patch(overrides.entry(breakpoint), patch);
            }
        }

        if let Some(overrides) = slots.responsive_overrides.as_mut() {
            overrides.normalize(slots.styles);
        }
        if slots
            .responsive_overrides
            .as_ref()
            .is_some_and(|overrides| overrides.is_empty())
        {
            *slots.responsive_overrides = None;
        }

        match &self.advanced {
            None => {}
            Some(Value::Null) => *slots.advanced = None,
            Some(patch) => {
                let mut current = serde_json::to_value(slots.advanced.clone().unwrap_or_default())
                    .map_err(|e| MutationError::InvalidUpdate(e.to_string()))?;
                merge_patch(&mut current, patch);
                let merged: pagecraft_model::Advanced = serde_json::from_value(current)
                    .map_err(|e| MutationError::InvalidUpdate(e.to_string()))?;
                *slots.advanced = (merged != Default::default()).then_some(merged);
            }
        }

        Ok(())
    }

    fn reject_section_fields(&self, node: &str) -> Result<(), MutationError> {
        if self.layout.is_some() || self.gap.is_some() {
            return Err(MutationError::InvalidUpdate(format!(
                "layout and gap only apply to sections, not {}",
                node
            )));
        }
        Ok(())
    }
}

fn apply_style_patch(styles: &mut StyleMap, patch: &StylePatch) {
    for (key, value) in patch {
        match value {
            Some(value) => {
                styles.insert(key.clone(), value.clone());
            }
            None => {
                styles.remove(key);
            }
        }
    }
}

/// RFC 7396 merge patch
fn merge_patch(target: &mut Value, patch: &Value) {
    let Value::Object(patch) = patch else {
        *target = patch.clone();
        return;
    };

    if !target.is_object() {
        *target = Value::Object(Map::new());
    }
    if let Value::Object(target) = target {
        for (key, value) in patch {
            if value.is_null() {
                target.remove(key);
            } else {
                merge_patch(target.entry(key.clone()).or_insert(Value::Null), value);
            }
        }
    }
}

/// Collaborators a mutation may need besides the document
pub struct MutationContext<'a> {
    pub ids: &'a mut IdGenerator,
    pub catalog: &'a WidgetCatalog,
}

/// Result of applying a mutation
#[derive(Debug, Clone)]
pub struct MutationResult {
    pub document: Document,

    /// Node to select afterwards; `None` keeps the current selection
    pub select: Option<Selection>,
}

impl Mutation {
    /// Short label for history entries
    pub fn label(&self) -> &'static str {
        match self {
            Mutation::AddSection { .. } | Mutation::AddSectionFromTemplate { .. } => "add section",
            Mutation::AddWidget { .. } => "add widget",
            Mutation::DuplicateSection { .. } => "duplicate section",
            Mutation::DuplicateWidget { .. } => "duplicate widget",
            Mutation::DeleteSection { .. } => "delete section",
            Mutation::DeleteWidget { .. } => "delete widget",
            Mutation::UpdateNode { target, .. } => match target {
                Selection::Section { .. } => "edit section",
                Selection::Column { .. } => "edit column",
                _ => "edit widget",
            },
            Mutation::MoveSection { .. } => "move section",
            Mutation::MoveWidget { .. } => "move widget",
        }
    }

    /// Updates of the same node share this key
    pub fn coalesce_key(&self) -> Option<String> {
        match self {
            Mutation::UpdateNode { target, .. } => target.id().map(str::to_string),
            _ => None,
        }
    }

    /// Whether the command can only change styles/content, never structure
    pub fn is_update(&self) -> bool {
        matches!(self, Mutation::UpdateNode { .. })
    }

    /// Apply to `doc`, producing the next document
    pub fn apply(
        &self,
        doc: &Document,
        ctx: &mut MutationContext<'_>,
    ) -> Result<MutationResult, MutationError> {
        self.validate(doc, ctx.catalog)?;

        let mut next = doc.clone();
        let select = match self {
            Mutation::AddSection {
                column_count,
                layout,
            } => Some(Self::apply_add_section(
                &mut next,
                *column_count,
                layout.clone(),
                ctx.ids,
            )?),

            Mutation::AddSectionFromTemplate { template_id } => {
                let template = find_section_template(template_id)
                    .ok_or_else(|| MutationError::NodeNotFound(template_id.clone()))?;
                Some(Self::apply_add_section(
                    &mut next,
                    template.column_count,
                    Some(template.layout),
                    ctx.ids,
                )?)
            }

            Mutation::AddWidget {
                widget_type,
                column_id,
                section_id,
                index,
            } => Some(Self::apply_add_widget(
                &mut next,
                ctx,
                widget_type,
                column_id,
                section_id,
                *index,
            )?),

            Mutation::DuplicateSection { section_id } => {
                Some(Self::apply_duplicate_section(&mut next, section_id, ctx.ids)?)
            }

            Mutation::DuplicateWidget { widget_id } => {
                Some(Self::apply_duplicate_widget(&mut next, widget_id, ctx.ids)?)
            }

            Mutation::DeleteSection { section_id } => {
                let index = section_index(&next, section_id)
                    .ok_or_else(|| MutationError::NodeNotFound(section_id.clone()))?;
                next.sections.remove(index);
                None
            }

            Mutation::DeleteWidget { widget_id, .. } => {
                let path = Self::widget_path(&next, widget_id)?;
                if let Some(section) = next.section_mut(path.section) {
                    section.columns[path.column].widgets.remove(path.widget);
                }
                None
            }

            Mutation::UpdateNode { target, update } => {
                Self::apply_update(&mut next, target, update)?;
                None
            }

            Mutation::MoveSection {
                section_id,
                to_index,
            } => {
                let from = section_index(&next, section_id)
                    .ok_or_else(|| MutationError::NodeNotFound(section_id.clone()))?;
                let section = next.sections.remove(from);
                next.sections.insert(*to_index, section);
                None
            }

            Mutation::MoveWidget {
                widget_id,
                column_id,
                section_id,
                index,
            } => {
                Self::apply_move_widget(&mut next, widget_id, column_id, section_id, *index)?;
                None
            }
        };

        Ok(MutationResult {
            document: next,
            select,
        })
    }

    fn apply_add_section(
        doc: &mut Document,
        column_count: usize,
        layout: Option<SectionLayout>,
        ids: &mut IdGenerator,
    ) -> Result<Selection, MutationError> {
        let section = tree::create_section(column_count, layout, ids)?;
        let selection = Selection::section(section.id.as_str());
        doc.sections.push(Arc::new(section));
        Ok(selection)
    }

    fn apply_add_widget(
        doc: &mut Document,
        ctx: &mut MutationContext<'_>,
        widget_type: &str,
        column_id: &str,
        section_id: &str,
        index: Option<usize>,
    ) -> Result<Selection, MutationError> {
        let path = Self::column_path(doc, column_id, section_id)?;
        let widget = ctx.catalog.create_widget(widget_type, ctx.ids)?;
        let selection = Selection::widget(widget.id.as_str(), column_id, section_id);

        let section = doc
            .section_mut(path.section)
            .ok_or_else(|| MutationError::NodeNotFound(section_id.to_string()))?;
        let widgets = &mut section.columns[path.column].widgets;
        let at = index.map_or(widgets.len(), |i| i.min(widgets.len()));
        widgets.insert(at, widget);

        Ok(selection)
    }

    fn apply_duplicate_section(
        doc: &mut Document,
        section_id: &str,
        ids: &mut IdGenerator,
    ) -> Result<Selection, MutationError> {
        let index = section_index(doc, section_id)
            .ok_or_else(|| MutationError::NodeNotFound(section_id.to_string()))?;

        let copy = duplicate_section(&doc.sections[index], ids);
        let selection = Selection::section(copy.id.as_str());
        doc.sections.insert(index + 1, Arc::new(copy));
        Ok(selection)
    }

    fn apply_duplicate_widget(
        doc: &mut Document,
        widget_id: &str,
        ids: &mut IdGenerator,
    ) -> Result<Selection, MutationError> {
        let path = Self::widget_path(doc, widget_id)?;
        let section = doc
            .section_mut(path.section)
            .ok_or_else(|| MutationError::NodeNotFound(widget_id.to_string()))?;
        let section_id = section.id.clone();

        let column = &mut section.columns[path.column];
        let copy = duplicate_widget(&column.widgets[path.widget], ids);
        let selection = Selection::widget(copy.id.as_str(), column.id.as_str(), section_id);
        column.widgets.insert(path.widget + 1, copy);
        Ok(selection)
    }

    fn apply_move_widget(
        doc: &mut Document,
        widget_id: &str,
        column_id: &str,
        section_id: &str,
        index: Option<usize>,
    ) -> Result<(), MutationError> {
        let from = Self::widget_path(doc, widget_id)?;
        let to = Self::column_path(doc, column_id, section_id)?;

        let widget = doc
            .section_mut(from.section)
            .map(|section| section.columns[from.column].widgets.remove(from.widget))
            .ok_or_else(|| MutationError::NodeNotFound(widget_id.to_string()))?;

        let section = doc
            .section_mut(to.section)
            .ok_or_else(|| MutationError::NodeNotFound(section_id.to_string()))?;
        let widgets = &mut section.columns[to.column].widgets;
        let at = index.map_or(widgets.len(), |i| i.min(widgets.len()));
        widgets.insert(at, widget);
        Ok(())
    }

    fn apply_update(
        doc: &mut Document,
        target: &Selection,
        update: &NodeUpdate,
    ) -> Result<(), MutationError> {
        let (section_at, before) = match target {
            Selection::None => return Err(MutationError::EmptySelection),
            Selection::Section { id } => {
                let index = section_index(doc, id).ok_or_else(|| MutationError::NodeNotFound(id.clone()))?;
                let section = doc.section_mut(index).ok_or_else(|| MutationError::NodeNotFound(id.clone()))?;
                let before = section.clone();

                if !update.content.is_empty() {
                    return Err(MutationError::InvalidUpdate(
                        "content only applies to widgets".to_string(),
                    ));
                }
                if update.width.is_some() {
                    return Err(MutationError::InvalidUpdate(
                        "width only applies to columns".to_string(),
                    ));
                }
                if let Some(layout) = &update.layout {
                    check_layout(layout, section.columns.len())
                        .map_err(|e| MutationError::InvalidUpdate(e.to_string()))?;
                    section.layout = layout.clone();
                }
                if let Some(gap) = update.gap {
                    section.gap = gap;
                }
                update.apply_common(section.style_slots_mut())?;
                (index, before)
            }
            Selection::Column { id, .. } => {
                let path = locate_column(doc, id).ok_or_else(|| MutationError::NodeNotFound(id.clone()))?;
                update.reject_section_fields("columns")?;
                if !update.content.is_empty() {
                    return Err(MutationError::InvalidUpdate(
                        "content only applies to widgets".to_string(),
                    ));
                }

                let section = doc.section_mut(path.section).ok_or_else(|| MutationError::NodeNotFound(id.clone()))?;
                let before = section.clone();
                let column = &mut section.columns[path.column];
                if let Some(width) = update.width {
                    if !(0.0..=100.0).contains(&width) {
                        return Err(MutationError::InvalidUpdate(format!(
                            "column width {} outside 0-100",
                            width
                        )));
                    }
                    column.width = Some(width);
                }
                update.apply_common(column.style_slots_mut())?;
                (path.section, before)
            }
            Selection::Widget { id, .. } => {
                let path = locate_widget(doc, id).ok_or_else(|| MutationError::NodeNotFound(id.clone()))?;
                update.reject_section_fields("widgets")?;
                if update.width.is_some() {
                    return Err(MutationError::InvalidUpdate(
                        "width only applies to columns".to_string(),
                    ));
                }

                let section = doc.section_mut(path.section).ok_or_else(|| MutationError::NodeNotFound(id.clone()))?;
                let before = section.clone();
                let widget = &mut section.columns[path.column].widgets[path.widget];
                if !update.content.is_empty() {
                    widget.content = widget.content.merged(&update.content)?;
                }
                update.apply_common(widget.style_slots_mut())?;
                (path.section, before)
            }
        };

        if *doc.sections[section_at] == before {
            return Err(MutationError::NoChange);
        }
        Ok(())
    }

    /// Check that every id the command names resolves and nothing is
    /// obviously out of range. Runs before any id is minted.
    pub fn validate(&self, doc: &Document, catalog: &WidgetCatalog) -> Result<(), MutationError> {
        match self {
            Mutation::AddSection {
                column_count,
                layout,
            } => {
                check_column_count(*column_count)?;
                if let Some(layout) = layout {
                    check_layout(layout, *column_count)?;
                }
                Ok(())
            }

            Mutation::AddSectionFromTemplate { template_id } => find_section_template(template_id)
                .map(|_| ())
                .ok_or_else(|| MutationError::NodeNotFound(template_id.clone())),

            Mutation::AddWidget {
                widget_type,
                column_id,
                section_id,
                ..
            } => {
                Self::column_path(doc, column_id, section_id)?;
                let kind: WidgetKind = widget_type.parse()?;
                if catalog.get(kind).is_none() {
                    return Err(MutationError::UnknownWidgetType(widget_type.clone()));
                }
                Ok(())
            }

            Mutation::DuplicateSection { section_id } | Mutation::DeleteSection { section_id } => {
                section_index(doc, section_id)
                    .map(|_| ())
                    .ok_or_else(|| MutationError::NodeNotFound(section_id.clone()))
            }

            Mutation::DuplicateWidget { widget_id } => Self::widget_path(doc, widget_id).map(|_| ()),

            Mutation::DeleteWidget {
                widget_id,
                column_id,
                section_id,
            } => {
                let path = Self::widget_path(doc, widget_id)?;
                let section = &doc.sections[path.section];
                if section.id != *section_id || section.columns[path.column].id != *column_id {
                    return Err(MutationError::NodeNotFound(widget_id.clone()));
                }
                Ok(())
            }

            Mutation::UpdateNode { target, .. } => {
                let id = target.id().ok_or(MutationError::EmptySelection)?;
                if target.revalidate(doc).is_none() {
                    return Err(MutationError::NodeNotFound(id.to_string()));
                }
                Ok(())
            }

            Mutation::MoveSection {
                section_id,
                to_index,
            } => {
                let from = section_index(doc, section_id)
                    .ok_or_else(|| MutationError::NodeNotFound(section_id.clone()))?;
                if *to_index >= doc.sections.len() {
                    return Err(MutationError::InvalidMove(format!(
                        "section index {} out of range",
                        to_index
                    )));
                }
                if from == *to_index {
                    return Err(MutationError::InvalidMove(format!(
                        "section {} is already at {}",
                        section_id, to_index
                    )));
                }
                Ok(())
            }

            Mutation::MoveWidget {
                widget_id,
                column_id,
                section_id,
                index,
            } => {
                let from = Self::widget_path(doc, widget_id)?;
                let to = Self::column_path(doc, column_id, section_id)?;

                if from.column_path() == to {
                    // Length of the column once the widget is lifted out
                    let remaining = doc.sections[to.section].columns[to.column].widgets.len() - 1;
                    let at = index.map_or(remaining, |i| i.min(remaining));
                    if at == from.widget {
                        return Err(MutationError::InvalidMove(format!(
                            "widget {} is already at {}",
                            widget_id, at
                        )));
                    }
                }
                Ok(())
            }
        }
    }

    fn widget_path(doc: &Document, widget_id: &str) -> Result<WidgetPath, MutationError> {
        locate_widget(doc, widget_id).ok_or_else(|| MutationError::NodeNotFound(widget_id.to_string()))
    }

    /// Column `column_id`, which must sit in section `section_id`
    fn column_path(doc: &Document, column_id: &str, section_id: &str) -> Result<ColumnPath, MutationError> {
        let path = locate_column(doc, column_id)
            .ok_or_else(|| MutationError::NodeNotFound(column_id.to_string()))?;
        if doc.sections[path.section].id != section_id {
            return Err(MutationError::NodeNotFound(section_id.to_string()));
        }
        Ok(path)
    }
}
