//! # Tree Utilities
//!
//! Pure helpers over the page tree: lookups, constructors and deep
//! duplication. Lookups return `None` on a miss; they never fail loudly.

use crate::catalog::{default_section_styles, WidgetCatalog};
use crate::document::{
    Column, Document, Section, SectionLayout, Widget, DEFAULT_SECTION_GAP, MAX_COLUMNS, MIN_COLUMNS,
};
use crate::id_generator::IdGenerator;
use crate::style::StyleMap;
use crate::TreeError;
use std::collections::HashSet;

/// A column together with its owning section
#[derive(Debug, Clone, Copy)]
pub struct ColumnRef<'a> {
    pub section: &'a Section,
    pub column: &'a Column,
}

/// A widget together with its owning column and section
#[derive(Debug, Clone, Copy)]
pub struct WidgetRef<'a> {
    pub section: &'a Section,
    pub column: &'a Column,
    pub widget: &'a Widget,
}

/// Index path of a column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnPath {
    pub section: usize,
    pub column: usize,
}

/// Index path of a widget
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WidgetPath {
    pub section: usize,
    pub column: usize,
    pub widget: usize,
}

impl WidgetPath {
    pub fn column_path(&self) -> ColumnPath {
        ColumnPath {
            section: self.section,
            column: self.column,
        }
    }
}

pub fn find_section<'a>(doc: &'a Document, id: &str) -> Option<&'a Section> {
    doc.sections().find(|s| s.id == id)
}

pub fn find_column<'a>(doc: &'a Document, id: &str) -> Option<ColumnRef<'a>> {
    doc.sections().find_map(|section| {
        section
            .columns
            .iter()
            .find(|c| c.id == id)
            .map(|column| ColumnRef { section, column })
    })
}

pub fn find_widget<'a>(doc: &'a Document, id: &str) -> Option<WidgetRef<'a>> {
    for section in doc.sections() {
        for column in &section.columns {
            if let Some(widget) = column.widgets.iter().find(|w| w.id == id) {
                return Some(WidgetRef {
                    section,
                    column,
                    widget,
                });
            }
        }
    }
    None
}

pub fn section_index(doc: &Document, id: &str) -> Option<usize> {
    doc.sections.iter().position(|s| s.id == id)
}

pub fn locate_column(doc: &Document, id: &str) -> Option<ColumnPath> {
    doc.sections.iter().enumerate().find_map(|(si, section)| {
        section
            .columns
            .iter()
            .position(|c| c.id == id)
            .map(|ci| ColumnPath {
                section: si,
                column: ci,
            })
    })
}

pub fn locate_widget(doc: &Document, id: &str) -> Option<WidgetPath> {
    for (si, section) in doc.sections.iter().enumerate() {
        for (ci, column) in section.columns.iter().enumerate() {
            if let Some(wi) = column.widgets.iter().position(|w| w.id == id) {
                return Some(WidgetPath {
                    section: si,
                    column: ci,
                    widget: wi,
                });
            }
        }
    }
    None
}

/// Whether any node in the document carries `id`
pub fn contains_id(doc: &Document, id: &str) -> bool {
    doc.sections().any(|section| {
        section.id == id
            || section
                .columns
                .iter()
                .any(|c| c.id == id || c.widgets.iter().any(|w| w.id == id))
    })
}

/// Every node id in document order (section, its columns, their widgets)
pub fn collect_ids(doc: &Document) -> Vec<&str> {
    let mut ids = Vec::new();
    for section in doc.sections() {
        ids.push(section.id.as_str());
        for column in &section.columns {
            ids.push(column.id.as_str());
            ids.extend(column.widgets.iter().map(|w| w.id.as_str()));
        }
    }
    ids
}

/// Ids that appear more than once, in order of their second appearance
pub fn duplicate_ids(doc: &Document) -> Vec<String> {
    let mut seen = HashSet::new();
    collect_ids(doc)
        .into_iter()
        .filter(|id| !seen.insert(*id))
        .map(str::to_string)
        .collect()
}

/// Check the structural invariants of a document
pub fn validate(doc: &Document) -> Result<(), TreeError> {
    if let Some(id) = duplicate_ids(doc).into_iter().next() {
        return Err(TreeError::DuplicateId(id));
    }

    for section in doc.sections() {
        check_column_count(section.columns.len())?;
        check_layout(&section.layout, section.columns.len())?;
    }
    Ok(())
}

/// Advance `ids` past every id already present in `doc`
pub fn reserve_ids(doc: &Document, ids: &mut IdGenerator) {
    for id in collect_ids(doc) {
        ids.observe(id);
    }
}

pub fn check_column_count(count: usize) -> Result<(), TreeError> {
    if (MIN_COLUMNS..=MAX_COLUMNS).contains(&count) {
        Ok(())
    } else {
        Err(TreeError::InvalidColumnCount(count))
    }
}

pub fn check_layout(layout: &SectionLayout, columns: usize) -> Result<(), TreeError> {
    if layout.fits(columns) {
        Ok(())
    } else {
        Err(TreeError::InvalidLayout {
            layout: layout.to_string(),
            columns,
        })
    }
}

pub fn create_column(ids: &mut IdGenerator) -> Column {
    Column {
        id: ids.new_id(),
        widgets: Vec::new(),
        width: None,
        styles: StyleMap::new(),
        responsive_overrides: None,
        advanced: None,
    }
}

/// New section with `column_count` empty columns and the default padding preset
pub fn create_section(
    column_count: usize,
    layout: Option<SectionLayout>,
    ids: &mut IdGenerator,
) -> Result<Section, TreeError> {
    check_column_count(column_count)?;
    let layout = layout.unwrap_or_default();
    check_layout(&layout, column_count)?;

    let id = ids.new_id();
    let columns = (0..column_count).map(|_| create_column(ids)).collect();

    Ok(Section {
        id,
        columns,
        layout,
        gap: DEFAULT_SECTION_GAP,
        styles: default_section_styles(),
        responsive_overrides: None,
        advanced: None,
    })
}

/// New widget of `widget_type` from the catalog defaults
pub fn create_widget(
    catalog: &WidgetCatalog,
    widget_type: &str,
    ids: &mut IdGenerator,
) -> Result<Widget, TreeError> {
    catalog.create_widget(widget_type, ids)
}

pub fn duplicate_widget(widget: &Widget, ids: &mut IdGenerator) -> Widget {
    Widget {
        id: ids.new_id(),
        ..widget.clone()
    }
}

pub fn duplicate_column(column: &Column, ids: &mut IdGenerator) -> Column {
    let id = ids.new_id();
    Column {
        id,
        widgets: column.widgets.iter().map(|w| duplicate_widget(w, ids)).collect(),
        width: column.width,
        styles: column.styles.clone(),
        responsive_overrides: column.responsive_overrides.clone(),
        advanced: column.advanced.clone(),
    }
}

/// Deep copy of a section with a fresh id on every node of the subtree
pub fn duplicate_section(section: &Section, ids: &mut IdGenerator) -> Section {
    let id = ids.new_id();
    Section {
        id,
        columns: section.columns.iter().map(|c| duplicate_column(c, ids)).collect(),
        layout: section.layout.clone(),
        gap: section.gap,
        styles: section.styles.clone(),
        responsive_overrides: section.responsive_overrides.clone(),
        advanced: section.advanced.clone(),
    }
}
