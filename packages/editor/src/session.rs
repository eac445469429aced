//! # Edit Session
//!
//! The controller of one editing session. It owns the live document, its
//! history, the selection, the viewport and any drag in progress, and it is
//! the only place where history is recorded or replayed.
//!
//! Every command either commits (history entry, version bump, emission to
//! the host sink) or resolves to a no-op and returns the reason. Nothing a
//! command does can end the session.

use crate::config::EditorConfig;
use crate::drag::{plan_drop, resolve_drop_target, DragSession, DragSource, DropCandidate};
use crate::mutations::{Mutation, MutationContext, MutationError, NodeUpdate};
use crate::pipeline::{PageView, Pipeline};
use crate::selection::Selection;
use crate::undo_stack::UndoStack;
use crate::EditorError;
use pagecraft_model::tree::{locate_widget, section_index};
use pagecraft_model::{
    find_column, find_section, find_widget, load_initial, Document, IdGenerator, InitialValue,
    Repair, SectionLayout, StyleMap, Styled, Viewport, WidgetCatalog,
};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use tracing::{debug, info, instrument, warn};

/// Snapshot handed to the host after every committed change
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentChange {
    pub version: u64,
    pub document: Document,
}

/// Receives the document after every committed change
pub trait DocumentSink {
    fn document_changed(&mut self, change: DocumentChange);
}

impl<F> DocumentSink for F
where
    F: FnMut(DocumentChange),
{
    fn document_changed(&mut self, change: DocumentChange) {
        self(change)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EditorMode {
    #[default]
    Edit,
    /// Read-only: document commands are rejected
    Preview,
}

pub struct EditSession {
    document: Document,
    history: UndoStack,
    selection: Selection,
    viewport: Viewport,
    mode: EditorMode,
    ids: IdGenerator,
    catalog: WidgetCatalog,
    config: EditorConfig,
    drag: Option<DragSession>,
    /// Key and host timestamp of the last committed drop
    last_drop: Option<(String, u64)>,
    version: u64,
    repairs: Vec<Repair>,
    sink: Option<Box<dyn DocumentSink>>,
    pipeline: Pipeline,
}

impl EditSession {
    /// Session over an empty page
    pub fn new(config: EditorConfig) -> Self {
        Self::load(config, None)
    }

    /// Session over whatever the host supplied (sectioned or legacy)
    pub fn load(config: EditorConfig, initial: Option<InitialValue>) -> Self {
        let mut ids = IdGenerator::new(&config.id_seed);
        let (document, repairs) = load_initial(initial, &mut ids);

        info!(
            sections = document.sections.len(),
            repairs = repairs.len(),
            history_limit = ?config.history_limit,
            "Starting edit session"
        );

        Self {
            document,
            history: UndoStack::with_max_levels(config.history_limit),
            selection: Selection::None,
            viewport: Viewport::Desktop,
            mode: EditorMode::Edit,
            ids,
            catalog: WidgetCatalog::builtin(),
            pipeline: Pipeline::new(config.responsive_cascade),
            config,
            drag: None,
            last_drop: None,
            version: 0,
            repairs,
            sink: None,
        }
    }

    pub fn with_catalog(mut self, catalog: WidgetCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    /// Install the host callback that receives every committed document
    pub fn on_change(&mut self, sink: impl DocumentSink + 'static) {
        self.sink = Some(Box::new(sink));
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn mode(&self) -> EditorMode {
        self.mode
    }

    /// Incremented on every committed change, undo and redo included
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn catalog(&self) -> &WidgetCatalog {
        &self.catalog
    }

    pub fn drag(&self) -> Option<&DragSession> {
        self.drag.as_ref()
    }

    /// Fixes applied to the initial document
    pub fn repairs(&self) -> &[Repair] {
        &self.repairs
    }

    pub fn history(&self) -> &UndoStack {
        &self.history
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn undo_label(&self) -> Option<&str> {
        self.history.undo_label()
    }

    pub fn redo_label(&self) -> Option<&str> {
        self.history.redo_label()
    }

    /// Run a document command
    #[instrument(skip_all, fields(command = mutation.label()))]
    pub fn apply(&mut self, mutation: Mutation) -> Result<(), EditorError> {
        self.ensure_editing()?;

        let mut ctx = MutationContext {
            ids: &mut self.ids,
            catalog: &self.catalog,
        };
        let result = match mutation.apply(&self.document, &mut ctx) {
            Ok(result) => result,
            Err(e) => {
                match &e {
                    MutationError::UnknownWidgetType(widget_type) => {
                        warn!(widget_type = %widget_type, "Widget type is not in the catalog")
                    }
                    _ => debug!(error = %e, "Command rejected"),
                }
                return Err(e.into());
            }
        };

        let coalesce = if self.config.coalesce_updates {
            mutation.coalesce_key()
        } else {
            None
        };
        let before = std::mem::replace(&mut self.document, result.document);
        self.history.record(before, mutation.label(), coalesce);

        self.selection = match result.select {
            Some(selection) => selection,
            None => self.selection.revalidate(&self.document),
        };
        self.commit(mutation.label());
        Ok(())
    }

    pub fn add_section(
        &mut self,
        column_count: usize,
        layout: Option<SectionLayout>,
    ) -> Result<(), EditorError> {
        self.apply(Mutation::AddSection {
            column_count,
            layout,
        })
    }

    pub fn add_section_from_template(&mut self, template_id: &str) -> Result<(), EditorError> {
        self.apply(Mutation::AddSectionFromTemplate {
            template_id: template_id.to_string(),
        })
    }

    pub fn add_widget(
        &mut self,
        widget_type: &str,
        column_id: &str,
        section_id: &str,
    ) -> Result<(), EditorError> {
        self.apply(Mutation::AddWidget {
            widget_type: widget_type.to_string(),
            column_id: column_id.to_string(),
            section_id: section_id.to_string(),
            index: None,
        })
    }

    pub fn duplicate_section(&mut self, section_id: &str) -> Result<(), EditorError> {
        self.apply(Mutation::DuplicateSection {
            section_id: section_id.to_string(),
        })
    }

    pub fn duplicate_widget(&mut self, widget_id: &str) -> Result<(), EditorError> {
        self.apply(Mutation::DuplicateWidget {
            widget_id: widget_id.to_string(),
        })
    }

    pub fn delete_section(&mut self, section_id: &str) -> Result<(), EditorError> {
        self.apply(Mutation::DeleteSection {
            section_id: section_id.to_string(),
        })
    }

    pub fn delete_widget(
        &mut self,
        widget_id: &str,
        column_id: &str,
        section_id: &str,
    ) -> Result<(), EditorError> {
        self.apply(Mutation::DeleteWidget {
            widget_id: widget_id.to_string(),
            column_id: column_id.to_string(),
            section_id: section_id.to_string(),
        })
    }

    /// Merge `update` into the selected node
    pub fn update_selected(&mut self, update: NodeUpdate) -> Result<(), EditorError> {
        self.apply(Mutation::UpdateNode {
            target: self.selection.clone(),
            update,
        })
    }

    pub fn undo(&mut self) -> Result<(), EditorError> {
        self.ensure_editing()?;
        if let Err(e) = self.history.undo(&mut self.document) {
            debug!(error = %e, "Undo skipped");
            return Err(e.into());
        }
        self.selection = self.selection.revalidate(&self.document);
        self.commit("undo");
        Ok(())
    }

    pub fn redo(&mut self) -> Result<(), EditorError> {
        self.ensure_editing()?;
        if let Err(e) = self.history.redo(&mut self.document) {
            debug!(error = %e, "Redo skipped");
            return Err(e.into());
        }
        self.selection = self.selection.revalidate(&self.document);
        self.commit("redo");
        Ok(())
    }

    /// Group the following commands into one undo step
    pub fn begin_batch(&mut self, label: &str) {
        self.history.begin_batch(label);
    }

    pub fn end_batch(&mut self) -> bool {
        self.history.end_batch()
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        if self.viewport != viewport {
            debug!(?viewport, "Viewport changed");
            self.viewport = viewport;
        }
    }

    /// Select a node; a stale id leaves the selection unchanged
    pub fn select(&mut self, selection: Selection) -> Result<(), EditorError> {
        if selection.is_none() {
            self.clear_selection();
            return Ok(());
        }
        self.ensure_editing()?;

        let resolved = selection.revalidate(&self.document);
        if resolved.is_none() {
            let id = selection.id().unwrap_or_default().to_string();
            return Err(MutationError::NodeNotFound(id).into());
        }
        if resolved != self.selection {
            self.history.break_coalescing();
        }
        self.selection = resolved;
        Ok(())
    }

    pub fn clear_selection(&mut self) {
        self.selection = Selection::None;
        self.history.break_coalescing();
    }

    pub fn set_mode(&mut self, mode: EditorMode) {
        if self.mode == mode {
            return;
        }
        debug!(?mode, "Editor mode changed");
        self.mode = mode;
        if mode == EditorMode::Preview {
            self.clear_selection();
            self.drag = None;
        }
    }

    /// The selected node as a styled item
    pub fn selected_node(&self) -> Option<&dyn Styled> {
        match &self.selection {
            Selection::None => None,
            Selection::Section { id } => {
                find_section(&self.document, id).map(|section| section as &dyn Styled)
            }
            Selection::Column { id, .. } => {
                find_column(&self.document, id).map(|found| found.column as &dyn Styled)
            }
            Selection::Widget { id, .. } => {
                find_widget(&self.document, id).map(|found| found.widget as &dyn Styled)
            }
        }
    }

    /// Effective styles of the selected node at the active viewport
    pub fn selected_styles(&self) -> Option<Cow<'_, StyleMap>> {
        let node = self.selected_node()?;
        Some(node.effective_styles_with(self.viewport, self.config.responsive_cascade))
    }

    /// Whether the selected node overrides `key` at the active viewport
    pub fn has_override(&self, key: &str) -> bool {
        let Some(breakpoint) = self.viewport.breakpoint() else {
            return false;
        };
        self.selected_node()
            .and_then(|node| node.responsive_overrides())
            .is_some_and(|overrides| overrides.has_override(breakpoint, key))
    }

    /// The page as the canvas shows it at the active viewport.
    ///
    /// Rendered again only after a commit or a viewport switch.
    pub fn view(&mut self) -> &PageView {
        self.pipeline.render(&self.document, self.version, self.viewport)
    }

    /// Start dragging `source`. `timestamp` is the host's event time in ms.
    pub fn begin_drag(&mut self, source: DragSource, timestamp: u64) -> Result<(), EditorError> {
        self.ensure_editing()?;

        let exists = match &source {
            DragSource::Section { id } => section_index(&self.document, id).is_some(),
            DragSource::Widget { id } => locate_widget(&self.document, id).is_some(),
            DragSource::Palette { .. } => true,
        };
        if !exists {
            let key = source.key();
            debug!(source = %key, "Drag of a missing node ignored");
            return Err(MutationError::NodeNotFound(key).into());
        }

        debug!(source = %source.key(), "Drag started");
        self.drag = Some(DragSession::new(source, timestamp));
        Ok(())
    }

    /// Pointer moved; updates hover feedback only
    pub fn drag_over(&mut self, candidates: &[DropCandidate]) -> Option<&DropCandidate> {
        self.drag.as_mut()?.hover(candidates)
    }

    /// Abandon the drag. The document and history are untouched.
    pub fn cancel_drag(&mut self) -> bool {
        match self.drag.take() {
            Some(drag) => {
                debug!(source = %drag.source.key(), "Drag cancelled");
                true
            }
            None => false,
        }
    }

    /// Finish the current drag over `candidates`
    pub fn drop(&mut self, candidates: &[DropCandidate], timestamp: u64) -> Result<(), EditorError> {
        let drag = self.drag.take().ok_or(EditorError::NoDrag)?;
        self.drop_item(drag.source, candidates, timestamp)
    }

    /// Drop `source` over `candidates` without a tracked drag.
    ///
    /// A drop of the same item within `dropDebounceMs` of the last committed
    /// one is treated as a repeated delivery and ignored.
    pub fn drop_item(
        &mut self,
        source: DragSource,
        candidates: &[DropCandidate],
        timestamp: u64,
    ) -> Result<(), EditorError> {
        self.ensure_editing()?;

        let key = source.key();
        if let Some((last_key, at)) = &self.last_drop {
            if *last_key == key && timestamp.saturating_sub(*at) < self.config.drop_debounce_ms {
                debug!(source = %key, "Repeated drop ignored");
                return Err(EditorError::DuplicateDrop(key));
            }
        }

        let target = resolve_drop_target(&source, candidates).ok_or(EditorError::NoDropTarget)?;
        let mutation = match plan_drop(&self.document, &source, target) {
            Ok(mutation) => mutation,
            Err(e) => {
                debug!(source = %key, target = %target.id(), error = %e, "Drop rejected");
                return Err(e.into());
            }
        };

        self.apply(mutation)?;
        self.last_drop = Some((key, timestamp));
        Ok(())
    }

    fn ensure_editing(&self) -> Result<(), EditorError> {
        match self.mode {
            EditorMode::Edit => Ok(()),
            EditorMode::Preview => Err(EditorError::PreviewMode),
        }
    }

    fn commit(&mut self, label: &str) {
        self.version += 1;
        debug!(version = self.version, command = label, "Committed change");

        if let Some(sink) = self.sink.as_mut() {
            sink.document_changed(DocumentChange {
                version: self.version,
                document: self.document.clone(),
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn session_with_log() -> (EditSession, Rc<RefCell<Vec<DocumentChange>>>) {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut session = EditSession::new(EditorConfig::default());
        let sink = Rc::clone(&log);
        session.on_change(move |change: DocumentChange| sink.borrow_mut().push(change));
        (session, log)
    }

    #[test]
    fn test_session_creation() {
        let session = EditSession::new(EditorConfig::default());

        assert!(session.document().is_empty());
        assert_eq!(session.version(), 0);
        assert!(session.selection().is_none());
        assert!(!session.can_undo());
        assert_eq!(session.mode(), EditorMode::Edit);
    }

    #[test]
    fn test_commits_emit_and_noops_stay_silent() {
        let (mut session, log) = session_with_log();

        session.add_section(1, None).unwrap();
        assert_eq!(log.borrow().len(), 1);
        assert_eq!(log.borrow()[0].version, 1);
        assert_eq!(&log.borrow()[0].document, session.document());

        assert!(session.delete_section("missing").is_err());
        assert!(session.redo().is_err());
        assert_eq!(log.borrow().len(), 1);
        assert_eq!(session.version(), 1);

        session.undo().unwrap();
        assert_eq!(log.borrow().len(), 2);
        assert!(log.borrow()[1].document.is_empty());
    }

    #[test]
    fn test_preview_mode_rejects_commands() {
        let mut session = EditSession::new(EditorConfig::default());
        session.add_section(2, None).unwrap();
        assert!(!session.selection().is_none());

        session.set_mode(EditorMode::Preview);
        assert!(session.selection().is_none());
        assert!(matches!(session.add_section(1, None), Err(EditorError::PreviewMode)));
        assert!(matches!(session.undo(), Err(EditorError::PreviewMode)));

        session.set_viewport(Viewport::Mobile);
        assert_eq!(session.viewport(), Viewport::Mobile);
        assert_eq!(session.document().sections.len(), 1);
    }

    #[test]
    fn test_select_rejects_stale_ids() {
        let mut session = EditSession::new(EditorConfig::default());
        session.add_section(1, None).unwrap();
        let current = session.selection().clone();

        let err = session.select(Selection::section("nope")).unwrap_err();
        assert!(err.is_no_op());
        assert_eq!(session.selection(), &current);
    }

    #[test]
    fn test_has_override_follows_viewport() {
        let mut session = EditSession::new(EditorConfig::default());
        session.add_section(1, None).unwrap();
        session
            .update_selected(NodeUpdate::new().breakpoint_style(
                pagecraft_model::Breakpoint::Mobile,
                "paddingTop",
                20,
            ))
            .unwrap();

        assert!(!session.has_override("paddingTop"));
        session.set_viewport(Viewport::Mobile);
        assert!(session.has_override("paddingTop"));
        assert_eq!(
            session.selected_styles().unwrap()["paddingTop"],
            pagecraft_model::StyleValue::from(20)
        );
    }

    #[test]
    fn test_view_rerenders_after_commit_and_viewport_switch() {
        let mut session = EditSession::new(EditorConfig::default());
        assert!(session.view().sections.is_empty());

        session.add_section(2, None).unwrap();
        assert_eq!(session.view().sections.len(), 1);

        session
            .update_selected(NodeUpdate::new().advanced(serde_json::json!({ "visibility": { "hideOnMobile": true } })))
            .unwrap();
        session.set_viewport(Viewport::Mobile);
        assert_eq!(session.view().viewport, Viewport::Mobile);
        assert!(session.view().sections.is_empty());

        session.undo().unwrap();
        assert_eq!(session.view().sections.len(), 1);
    }

    #[test]
    fn test_oversized_ratio_layout_is_rejected() {
        let mut session = EditSession::new(EditorConfig::default());
        let layout = SectionLayout::Ratio(vec![u32::MAX, u32::MAX]);

        let result = session.add_section(2, Some(layout));
        assert!(matches!(
            result,
            Err(EditorError::Mutation(MutationError::InvalidStructure(_)))
        ));
        assert_eq!(session.version(), 0);
        assert!(session.view().sections.is_empty());
    }

    #[test]
    fn test_loaded_id_at_counter_limit() {
        let config = EditorConfig {
            id_seed: "page".to_string(),
            ..EditorConfig::default()
        };
        let id = format!("{}-{}", pagecraft_model::seed_hash("page"), u64::MAX);
        let initial: InitialValue = serde_json::from_value(serde_json::json!({
            "sections": [{ "id": &id, "columns": [{ "id": "c1" }] }]
        }))
        .unwrap();
        let mut session = EditSession::load(config, Some(initial));

        session.add_section(1, None).unwrap();
        let added = &session.document().sections[1];
        assert_ne!(added.id, id);
        assert_eq!(pagecraft_model::tree::validate(session.document()), Ok(()));
    }
}

