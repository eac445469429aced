//! End-to-end editing flows through the session controller

use pagecraft_editor::{
    DocumentChange, DragSource, DropCandidate, EditSession, EditorConfig, EditorError,
    InitialValue, NodeUpdate, Selection, Viewport,
};
use pagecraft_model::tree::collect_ids;
use pagecraft_model::{Breakpoint, StyleValue, Styled, WidgetKind};
use serde_json::json;
use std::cell::RefCell;
use std::rc::Rc;

struct Page {
    session: EditSession,
    section: String,
    left: String,
    right: String,
}

/// Scenarios 1 and 2: an empty page, one two-column section, one heading
fn page_with_heading() -> (Page, String) {
    let mut session = EditSession::new(EditorConfig::default());
    session.add_section(2, None).unwrap();

    let section = &session.document().sections[0];
    let (section_id, left, right) = (
        section.id.clone(),
        section.columns[0].id.clone(),
        section.columns[1].id.clone(),
    );
    let mut page = Page {
        session,
        section: section_id,
        left,
        right,
    };
    page.session
        .add_widget("heading", &page.left, &page.section)
        .unwrap();
    let heading = page.session.document().sections[0].columns[0].widgets[0]
        .id
        .clone();
    (page, heading)
}

#[test]
fn test_add_section_to_empty_page() {
    let mut session = EditSession::new(EditorConfig::default());
    session.add_section(2, None).unwrap();

    let doc = session.document();
    assert_eq!(doc.sections.len(), 1);
    assert_eq!(doc.sections[0].columns.len(), 2);
    assert!(doc.sections[0].columns.iter().all(|c| c.widgets.is_empty()));
    assert_eq!(session.selection(), &Selection::section(doc.sections[0].id.as_str()));
    assert_eq!(session.undo_label(), Some("add section"));
}

#[test]
fn test_add_heading_uses_catalog_defaults() {
    let (page, heading) = page_with_heading();

    let column = &page.session.document().sections[0].columns[0];
    assert_eq!(column.widgets.len(), 1);
    assert_eq!(column.widgets[0].kind(), WidgetKind::Heading);
    assert_eq!(
        serde_json::to_value(&column.widgets[0].content).unwrap(),
        json!({ "text": "New heading", "tag": "h2" })
    );
    assert_eq!(
        page.session.selection(),
        &Selection::widget(heading, page.left.as_str(), page.section.as_str())
    );
}

#[test]
fn test_drag_widget_to_sibling_column_then_undo() {
    let (mut page, heading) = page_with_heading();
    let after_add = page.session.document().clone();
    let levels = page.session.history().undo_levels();

    page.session
        .begin_drag(DragSource::Widget { id: heading.clone() }, 1_000)
        .unwrap();
    let over = [
        DropCandidate::Section {
            id: page.section.clone(),
        },
        DropCandidate::Column {
            id: page.right.clone(),
            section_id: page.section.clone(),
        },
    ];
    page.session.drop(&over, 1_050).unwrap();

    let columns = &page.session.document().sections[0].columns;
    assert!(columns[0].widgets.is_empty());
    assert_eq!(columns[1].widgets.len(), 1);
    assert_eq!(columns[1].widgets[0].id, heading);
    assert_eq!(columns[1].widgets[0].content, after_add.sections[0].columns[0].widgets[0].content);
    assert_eq!(page.session.history().undo_levels(), levels + 1);

    page.session.undo().unwrap();
    assert_eq!(page.session.document(), &after_add);
}

#[test]
fn test_duplicate_section_mints_fresh_ids() {
    let (mut page, _) = page_with_heading();
    page.session.duplicate_section(&page.section).unwrap();

    let doc = page.session.document();
    assert_eq!(doc.sections.len(), 2);

    let (original, copy) = (&doc.sections[0], &doc.sections[1]);
    let original_widgets: Vec<_> = original.columns.iter().flat_map(|c| &c.widgets).collect();
    let copied_widgets: Vec<_> = copy.columns.iter().flat_map(|c| &c.widgets).collect();
    assert_eq!(original_widgets.len(), copied_widgets.len());
    for (a, b) in original_widgets.iter().zip(&copied_widgets) {
        assert_ne!(a.id, b.id);
        assert_eq!(a.content, b.content);
        assert_eq!(a.styles, b.styles);
    }

    let ids = collect_ids(doc);
    let mut unique = ids.clone();
    unique.sort();
    unique.dedup();
    assert_eq!(ids.len(), unique.len());
    assert_eq!(page.session.selection(), &Selection::section(copy.id.as_str()));
}

#[test]
fn test_tablet_ignores_mobile_override() -> anyhow::Result<()> {
    let (mut page, _) = page_with_heading();
    page.session.update_selected(
        NodeUpdate::new()
            .style("fontSize", "2rem")
            .breakpoint_style(Breakpoint::Mobile, "fontSize", "1rem"),
    )?;

    let widget = &page.session.document().sections[0].columns[0].widgets[0];
    assert_eq!(widget.effective_styles(Viewport::Tablet)["fontSize"], StyleValue::from("2rem"));
    assert_eq!(widget.effective_styles(Viewport::Mobile)["fontSize"], StyleValue::from("1rem"));

    page.session.set_viewport(Viewport::Tablet);
    let view = page.session.view();
    assert!(view.sections[0].columns[0].widgets[0].css.contains("font-size: 2rem;"));
    Ok(())
}

#[test]
fn test_deleting_selected_widget_clears_selection() {
    let (mut page, heading) = page_with_heading();
    page.session
        .delete_widget(&heading, &page.left, &page.section)
        .unwrap();

    assert!(page.session.selection().is_none());

    page.session.undo().unwrap();
    assert!(page.session.selection().is_none());
    assert!(page.session.select(Selection::widget(heading, "", "")).is_ok());
    assert_eq!(
        page.session.selection(),
        &Selection::widget(
            page.session.document().sections[0].columns[0].widgets[0].id.as_str(),
            page.left.as_str(),
            page.section.as_str()
        )
    );
}

#[test]
fn test_every_commit_reaches_the_host() {
    let changes: Rc<RefCell<Vec<DocumentChange>>> = Rc::default();
    let mut session = EditSession::new(EditorConfig::default());
    let sink = Rc::clone(&changes);
    session.on_change(move |change: DocumentChange| sink.borrow_mut().push(change));

    session.add_section_from_template("30-70").unwrap();
    let section = session.document().sections[0].id.clone();
    session.duplicate_section(&section).unwrap();
    session.undo().unwrap();
    session.redo().unwrap();

    // Rejected commands stay silent
    assert!(session.delete_section("gone").is_err());
    assert!(session.redo().is_err());

    let changes = changes.borrow();
    let versions: Vec<u64> = changes.iter().map(|c| c.version).collect();
    assert_eq!(versions, vec![1, 2, 3, 4]);
    assert_eq!(changes[2].document.sections.len(), 1);
    assert_eq!(&changes[3].document, session.document());
    assert_eq!(session.version(), 4);
}

#[test]
fn test_emitted_documents_are_snapshots() {
    let changes: Rc<RefCell<Vec<DocumentChange>>> = Rc::default();
    let mut session = EditSession::new(EditorConfig::default());
    let sink = Rc::clone(&changes);
    session.on_change(move |change: DocumentChange| sink.borrow_mut().push(change));

    session.add_section(1, None).unwrap();
    session
        .update_selected(NodeUpdate::new().style("backgroundColor", "#fff"))
        .unwrap();

    let changes = changes.borrow();
    assert!(!changes[0].document.sections[0].styles.contains_key("backgroundColor"));
    assert!(changes[1].document.sections[0].styles.contains_key("backgroundColor"));
}

#[test]
fn test_legacy_page_is_migrated() {
    let initial: InitialValue = serde_json::from_value(json!({
        "widgets": [
            { "type": "heading", "content": { "text": "Welcome", "tag": "h1" } },
            { "type": "button", "content": { "text": "Go", "url": "/go" } },
            { "type": "marquee", "content": {} }
        ]
    }))
    .unwrap();

    let session = EditSession::load(EditorConfig::default(), Some(initial));
    let doc = session.document();
    assert_eq!(doc.sections.len(), 1);
    assert_eq!(doc.sections[0].columns.len(), 1);

    let kinds: Vec<_> = doc.sections[0].columns[0]
        .widgets
        .iter()
        .map(|w| w.kind())
        .collect();
    assert_eq!(kinds, vec![WidgetKind::Heading, WidgetKind::Button]);
    assert!(!session.can_undo());
}

#[test]
fn test_duplicate_ids_in_host_document_are_repaired() {
    let initial: InitialValue = serde_json::from_value(json!({
        "sections": [
            { "id": "s", "columns": [{ "id": "c", "widgets": [] }] },
            { "id": "s", "columns": [{ "id": "c", "widgets": [] }] }
        ]
    }))
    .unwrap();

    let session = EditSession::load(EditorConfig::default(), Some(initial));
    assert_eq!(session.repairs().len(), 2);

    let ids = collect_ids(session.document());
    assert_eq!(ids.len(), 4);
    assert_eq!(ids[0], "s");
    assert_ne!(ids[2], "s");
}

#[test]
fn test_unknown_widget_type_is_a_no_op() {
    let (mut page, _) = page_with_heading();
    let before = page.session.document().clone();

    let err = page
        .session
        .add_widget("carousel", &page.right, &page.section)
        .unwrap_err();
    assert!(matches!(err, EditorError::Mutation(_)));
    assert!(err.is_no_op());
    assert_eq!(page.session.document(), &before);
}

#[test]
fn test_coalesced_style_edits_undo_together() {
    let config = EditorConfig {
        coalesce_updates: true,
        ..EditorConfig::default()
    };
    let mut session = EditSession::new(config);
    session.add_section(1, None).unwrap();
    let after_add = session.document().clone();

    for size in [10, 12, 14, 16] {
        session
            .update_selected(NodeUpdate::new().style("borderRadius", size))
            .unwrap();
    }
    assert_eq!(session.history().undo_levels(), 2);

    session.undo().unwrap();
    assert_eq!(session.document(), &after_add);
}
