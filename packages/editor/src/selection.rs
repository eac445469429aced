//! # Selection Model
//!
//! The active node, held by id. Selection is derived state: after every
//! change to the document the session re-validates it, and a selection whose
//! node no longer resolves becomes [`Selection::None`].

use pagecraft_model::{find_column, find_section, find_widget, Document};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum Selection {
    #[default]
    None,
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

impl Selection {
    pub fn section(id: impl Into<String>) -> Self {
        Selection::Section { id: id.into() }
    }

    pub fn column(id: impl Into<String>, section_id: impl Into<String>) -> Self {
        Selection::Column {
            id: id.into(),
            section_id: section_id.into(),
        }
    }

    pub fn widget(
        id: impl Into<String>,
        column_id: impl Into<String>,
        section_id: impl Into<String>,
    ) -> Self {
        Selection::Widget {
            id: id.into(),
            column_id: column_id.into(),
            section_id: section_id.into(),
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Selection::None)
    }

    /// Id of the selected node
    pub fn id(&self) -> Option<&str> {
        match self {
            Selection::None => None,
            Selection::Section { id }
            | Selection::Column { id, .. }
            | Selection::Widget { id, .. } => Some(id),
        }
    }

    /// Whether `id` is the selected node or one of its ancestors
    pub fn involves(&self, id: &str) -> bool {
        match self {
            Selection::None => false,
            Selection::Section { id: s } => s == id,
            Selection::Column { id: c, section_id } => c == id || section_id == id,
            Selection::Widget {
                id: w,
                column_id,
                section_id,
            } => w == id || column_id == id || section_id == id,
        }
    }

    /// Re-derive against `doc`.
    ///
    /// Parent ids are refreshed from the tree (a widget may have moved to
    /// another column); a node that no longer exists clears the selection.
    pub fn revalidate(&self, doc: &Document) -> Selection {
        match self {
            Selection::None => Selection::None,
            Selection::Section { id } => match find_section(doc, id) {
                Some(_) => self.clone(),
                None => Selection::None,
            },
            Selection::Column { id, .. } => match find_column(doc, id) {
                Some(found) => Selection::column(id.as_str(), found.section.id.as_str()),
                None => Selection::None,
            },
            Selection::Widget { id, .. } => match find_widget(doc, id) {
                Some(found) => Selection::widget(
                    id.as_str(),
                    found.column.id.as_str(),
                    found.section.id.as_str(),
                ),
                None => Selection::None,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pagecraft_model::tree::create_section;
    use pagecraft_model::{IdGenerator, WidgetCatalog};
    use serde_json::json;

    fn doc_with_widget() -> (Document, String, String, String) {
        let mut ids = IdGenerator::new("sel");
        let mut section = create_section(2, None, &mut ids).unwrap();
        let widget = WidgetCatalog::builtin()
            .create_widget("text", &mut ids)
            .unwrap();
        let widget_id = widget.id.clone();
        section.columns[0].widgets.push(widget);

        let section_id = section.id.clone();
        let column_id = section.columns[0].id.clone();
        (Document::from_sections(vec![section]), section_id, column_id, widget_id)
    }

    #[test]
    fn test_revalidate_keeps_live_nodes() {
        let (doc, s, c, w) = doc_with_widget();

        let selection = Selection::widget(&w, &c, &s);
        assert_eq!(selection.revalidate(&doc), selection);
        assert_eq!(Selection::section(&s).revalidate(&doc), Selection::section(&s));
    }

    #[test]
    fn test_revalidate_refreshes_parents() {
        let (mut doc, s, _, w) = doc_with_widget();

        let section = doc.section_mut(0).unwrap();
        let widget = section.columns[0].widgets.remove(0);
        section.columns[1].widgets.push(widget);
        let new_column = section.columns[1].id.clone();

        let stale = Selection::widget(&w, "old-column", &s);
        assert_eq!(stale.revalidate(&doc), Selection::widget(&w, &new_column, &s));
    }

    #[test]
    fn test_revalidate_clears_deleted_nodes() {
        let (mut doc, s, c, w) = doc_with_widget();
        doc.section_mut(0).unwrap().columns[0].widgets.clear();

        assert_eq!(Selection::widget(&w, &c, &s).revalidate(&doc), Selection::None);
        assert_eq!(Selection::section("gone").revalidate(&doc), Selection::None);
    }

    #[test]
    fn test_involves_ancestors() {
        let selection = Selection::widget("w", "c", "s");
        assert!(selection.involves("w"));
        assert!(selection.involves("s"));
        assert!(!selection.involves("other"));
        assert!(!Selection::None.involves("w"));
    }

    #[test]
    fn test_wire_format() {
        let selection = Selection::column("c1", "s1");
        assert_eq!(
            serde_json::to_value(&selection).unwrap(),
            json!({ "type": "column", "id": "c1", "sectionId": "s1" })
        );
        let none: Selection = serde_json::from_value(json!({ "type": "none" })).unwrap();
        assert!(none.is_none());
    }
}
