//! Drag and drop through the session

use pagecraft_editor::{
    DragSource, DropCandidate, EditSession, EditorConfig, EditorError, EditorMode, MutationError,
};
use pagecraft_model::WidgetKind;

/// Two sections: the first with columns [a, b] and [c], the second empty
fn board() -> EditSession {
    let mut session = EditSession::new(EditorConfig::default());
    session.add_section(2, None).unwrap();
    session.add_section(1, None).unwrap();

    let section = session.document().sections[0].id.clone();
    let left = session.document().sections[0].columns[0].id.clone();
    let right = session.document().sections[0].columns[1].id.clone();
    for (kind, column) in [("heading", &left), ("text", &left), ("button", &right)] {
        session.add_widget(kind, column, &section).unwrap();
    }
    session
}

fn widget_ids(session: &EditSession, section: usize, column: usize) -> Vec<String> {
    session.document().sections[section].columns[column]
        .widgets
        .iter()
        .map(|w| w.id.clone())
        .collect()
}

fn over_widget(session: &EditSession, section: usize, column: usize, widget: usize) -> Vec<DropCandidate> {
    let s = &session.document().sections[section];
    let c = &s.columns[column];
    vec![
        DropCandidate::Section { id: s.id.clone() },
        DropCandidate::Column {
            id: c.id.clone(),
            section_id: s.id.clone(),
        },
        DropCandidate::Widget {
            id: c.widgets[widget].id.clone(),
            column_id: c.id.clone(),
            section_id: s.id.clone(),
        },
    ]
}

#[test]
fn test_reorder_within_column() {
    let mut session = board();
    let [a, b]: [String; 2] = widget_ids(&session, 0, 0).try_into().unwrap();

    session
        .begin_drag(DragSource::Widget { id: b.clone() }, 0)
        .unwrap();
    let candidates = over_widget(&session, 0, 0, 0);
    assert_eq!(
        session.drag_over(&candidates).map(|c| c.id().to_string()),
        Some(a.clone())
    );
    session.drop(&candidates, 10).unwrap();

    assert_eq!(widget_ids(&session, 0, 0), vec![b, a]);
    assert!(session.drag().is_none());
}

#[test]
fn test_drop_on_widget_in_other_column_inserts_after_it() {
    let mut session = board();
    let a = widget_ids(&session, 0, 0)[0].clone();
    let c = widget_ids(&session, 0, 1)[0].clone();

    session.begin_drag(DragSource::Widget { id: a.clone() }, 0).unwrap();
    let candidates = over_widget(&session, 0, 1, 0);
    session.drop(&candidates, 5).unwrap();

    assert_eq!(widget_ids(&session, 0, 1), vec![c.clone(), a]);
    // The last added widget stays selected with refreshed parents
    assert_eq!(session.selection().id(), Some(c.as_str()));
}

#[test]
fn test_palette_drop_creates_widget() {
    let mut session = board();
    let candidates = over_widget(&session, 0, 1, 0);

    session
        .begin_drag(
            DragSource::Palette {
                widget_type: "divider".to_string(),
            },
            0,
        )
        .unwrap();
    session.drop(&candidates, 1).unwrap();

    let column = &session.document().sections[0].columns[1];
    assert_eq!(column.widgets.len(), 2);
    assert_eq!(column.widgets[1].kind(), WidgetKind::Divider);
    assert_eq!(session.selection().id(), Some(column.widgets[1].id.as_str()));
}

#[test]
fn test_sections_only_land_on_sections() {
    let mut session = board();
    let first = session.document().sections[0].id.clone();
    let second = session.document().sections[1].id.clone();

    // Pointer over a widget inside the first section: only the section counts
    let candidates = over_widget(&session, 0, 0, 0);
    session
        .begin_drag(DragSource::Section { id: second.clone() }, 0)
        .unwrap();
    session.drop(&candidates, 3).unwrap();

    let order: Vec<_> = session.document().sections().map(|s| s.id.clone()).collect();
    assert_eq!(order, vec![second, first]);
}

#[test]
fn test_cancel_leaves_everything_untouched() {
    let mut session = board();
    let before = session.document().clone();
    let version = session.version();
    let levels = session.history().undo_levels();

    let a = widget_ids(&session, 0, 0)[0].clone();
    session.begin_drag(DragSource::Widget { id: a }, 0).unwrap();
    let candidates = over_widget(&session, 0, 1, 0);
    session.drag_over(&candidates);
    assert!(session.cancel_drag());

    assert_eq!(session.document(), &before);
    assert_eq!(session.version(), version);
    assert_eq!(session.history().undo_levels(), levels);
    assert!(matches!(session.drop(&candidates, 9), Err(EditorError::NoDrag)));
    assert!(!session.cancel_drag());
}

#[test]
fn test_drop_outside_any_target() {
    let mut session = board();
    let before = session.document().clone();
    let a = widget_ids(&session, 0, 0)[0].clone();

    session.begin_drag(DragSource::Widget { id: a }, 0).unwrap();
    assert!(matches!(session.drop(&[], 4), Err(EditorError::NoDropTarget)));
    assert_eq!(session.document(), &before);
}

#[test]
fn test_repeated_drop_delivery_is_ignored() {
    let mut session = board();
    let a = widget_ids(&session, 0, 0)[0].clone();
    let source = DragSource::Widget { id: a.clone() };
    let candidates = over_widget(&session, 0, 1, 0);

    session.drop_item(source.clone(), &candidates, 1_000).unwrap();
    let after_first = session.document().clone();

    // The input layer reports the same gesture again
    let again = session.drop_item(source.clone(), &candidates, 1_040);
    assert!(matches!(again, Err(EditorError::DuplicateDrop(_))));
    assert_eq!(session.document(), &after_first);

    // Outside the window the same item can be dropped again
    let candidates = over_widget(&session, 0, 0, 0);
    session.drop_item(source, &candidates, 2_000).unwrap();
    assert_eq!(widget_ids(&session, 0, 0)[1], a);
}

#[test]
fn test_drop_onto_deleted_target_is_a_no_op() {
    let mut session = board();
    let a = widget_ids(&session, 0, 0)[0].clone();
    let candidates = over_widget(&session, 0, 1, 0);

    let section = session.document().sections[0].id.clone();
    let right = session.document().sections[0].columns[1].id.clone();
    let c = widget_ids(&session, 0, 1)[0].clone();
    session.delete_widget(&c, &right, &section).unwrap();
    let before = session.document().clone();

    let result = session.drop_item(DragSource::Widget { id: a }, &candidates, 0);
    assert!(matches!(
        result,
        Err(EditorError::Mutation(MutationError::NodeNotFound(_)))
    ));
    assert_eq!(session.document(), &before);
}

#[test]
fn test_no_drag_in_preview() {
    let mut session = board();
    let a = widget_ids(&session, 0, 0)[0].clone();
    session.set_mode(EditorMode::Preview);

    assert!(matches!(
        session.begin_drag(DragSource::Widget { id: a }, 0),
        Err(EditorError::PreviewMode)
    ));
    assert!(session.drag().is_none());
}
