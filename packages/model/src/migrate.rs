//! Initial document intake: legacy migration and repair.
//!
//! Hosts hand the editor either a sectioned document (`{ "sections": [...] }`)
//! or a page saved by the old flat editor (`{ "widgets": [...] }`). Both end up
//! as a [`Document`] that passes [`validate`](crate::tree::validate): unique
//! ids, 1-6 columns per section, layouts that fit their columns.
//!
//! Sectioned input is decoded node by node, so one bad widget costs that
//! widget and not the whole page.

use crate::content::{WidgetContent, WidgetKind};
use crate::document::{Document, Section, SectionLayout, Styled, Widget, MAX_COLUMNS};
use crate::id_generator::IdGenerator;
use crate::style::{ResponsiveOverrides, StyleMap};
use crate::tree::{create_column, create_section, reserve_ids};
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, warn};

/// Widget as stored by the flat single-column editor
#[derive(Debug, Clone, Deserialize)]
pub struct LegacyWidget {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub content: Value,
    #[serde(default)]
    pub styles: StyleMap,
}

/// Whatever the host supplied at session start
///
/// Sections stay raw JSON until [`load_initial`] decodes them.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum InitialValue {
    Sections { sections: Vec<Value> },
    Legacy { widgets: Vec<LegacyWidget> },
}

/// A change made while bringing a host document into shape
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Repair {
    /// A duplicate id was replaced by a freshly minted one
    ReassignedId { old: String, new: String },
    /// A ratio layout was malformed or didn't match the section's column count
    ResetLayout { section: String, layout: String },
    /// A widget of unknown type or with undecodable content was left out
    DroppedWidget { id: Option<String>, reason: String },
    /// A section that couldn't be decoded at all was left out
    DroppedSection { id: Option<String>, reason: String },
    /// A section without columns got an empty one
    AddedColumn { section: String, column: String },
    /// Columns past the limit were folded into the last kept column
    MergedColumns { section: String, removed: usize },
}

/// Turn a flat widget list into one single-column section.
///
/// Widgets of unknown type or with undecodable content are dropped.
pub fn migrate_legacy(widgets: Vec<LegacyWidget>, ids: &mut IdGenerator) -> Document {
    if widgets.is_empty() {
        return Document::new();
    }

    let mut section = match create_section(1, None, ids) {
        Ok(section) => section,
        Err(_) => return Document::new(),
    };

    let total = widgets.len();
    for legacy in widgets {
        let kind: WidgetKind = match legacy.kind.parse() {
            Ok(kind) => kind,
            Err(e) => {
                warn!(widget_type = %legacy.kind, error = %e, "Dropping legacy widget");
                continue;
            }
        };
        let content = match WidgetContent::from_value(kind, legacy.content) {
            Ok(content) => content,
            Err(e) => {
                warn!(widget_type = %kind, error = %e, "Dropping legacy widget");
                continue;
            }
        };

        section.columns[0].widgets.push(Widget {
            id: legacy
                .id
                .filter(|id| !id.is_empty())
                .unwrap_or_else(|| ids.new_id()),
            content,
            styles: legacy.styles,
            responsive_overrides: None,
            advanced: None,
        });
    }

    debug!(
        migrated = section.columns[0].widgets.len(),
        total, "Migrated legacy widget list"
    );
    Document::from_sections(vec![section])
}

fn node_id(value: &Value) -> Option<String> {
    value.get("id").and_then(Value::as_str).map(str::to_string)
}

/// Decode one host section, dropping the widgets that don't decode and
/// resetting a layout that doesn't parse
fn decode_section(mut value: Value, repairs: &mut Vec<Repair>) -> Option<Section> {
    let id = node_id(&value);

    if let Some(layout) = value.get_mut("layout") {
        let malformed = match layout.as_str() {
            Some(text) => text.parse::<SectionLayout>().is_err(),
            None => true,
        };
        if malformed {
            repairs.push(Repair::ResetLayout {
                section: id.clone().unwrap_or_default(),
                layout: layout.as_str().map_or_else(|| layout.to_string(), str::to_string),
            });
            *layout = Value::String(SectionLayout::Equal.to_string());
        }
    }

    let columns = value
        .get_mut("columns")
        .and_then(Value::as_array_mut)
        .into_iter()
        .flatten();
    for column in columns {
        let Some(widgets) = column.get_mut("widgets").and_then(Value::as_array_mut) else {
            continue;
        };
        widgets.retain(|widget| match Widget::deserialize(widget) {
            Ok(_) => true,
            Err(e) => {
                repairs.push(Repair::DroppedWidget {
                    id: node_id(widget),
                    reason: e.to_string(),
                });
                false
            }
        });
    }

    match serde_json::from_value(value) {
        Ok(section) => Some(section),
        Err(e) => {
            repairs.push(Repair::DroppedSection {
                id,
                reason: e.to_string(),
            });
            None
        }
    }
}

/// Decode host sections leniently; see [`Repair`] for what gets dropped
pub fn decode_sections(values: Vec<Value>) -> (Document, Vec<Repair>) {
    let mut repairs = Vec::new();
    let sections = values
        .into_iter()
        .filter_map(|value| decode_section(value, &mut repairs))
        .collect();

    for repair in &repairs {
        warn!(?repair, "Repaired initial document");
    }
    (Document::from_sections(sections), repairs)
}

/// Drop override keys that don't differ from desktop; empty overrides go away
fn normalize_overrides<T: Styled>(node: &mut T) {
    let slots = node.style_slots_mut();
    if let Some(overrides) = slots.responsive_overrides.as_mut() {
        overrides.normalize(slots.styles);
    }
    if slots
        .responsive_overrides
        .as_ref()
        .is_some_and(ResponsiveOverrides::is_empty)
    {
        *slots.responsive_overrides = None;
    }
}

/// Bring a host document in line with the tree invariants.
///
/// Reassigns duplicate ids, gives empty sections a column, folds columns past
/// [`MAX_COLUMNS`] into the last kept one, resets layouts that don't fit and
/// normalizes responsive overrides. `ids` must already have observed the
/// document (see [`reserve_ids`]).
pub fn repair(doc: &mut Document, ids: &mut IdGenerator) -> Vec<Repair> {
    let mut repairs = Vec::new();

    {
        let mut seen: HashSet<String> = HashSet::new();
        let mut fresh = |old: &mut String, repairs: &mut Vec<Repair>| {
            if !seen.insert(old.clone()) {
                let new = ids.new_id();
                seen.insert(new.clone());
                repairs.push(Repair::ReassignedId {
                    old: std::mem::replace(old, new.clone()),
                    new,
                });
            }
        };

        for section in doc.sections.iter_mut() {
            let section: &mut Section = Arc::make_mut(section);
            fresh(&mut section.id, &mut repairs);
            for column in section.columns.iter_mut() {
                fresh(&mut column.id, &mut repairs);
                for widget in column.widgets.iter_mut() {
                    fresh(&mut widget.id, &mut repairs);
                }
            }
        }
    }

    for section in doc.sections.iter_mut() {
        let section: &mut Section = Arc::make_mut(section);

        if section.columns.is_empty() {
            let column = create_column(ids);
            repairs.push(Repair::AddedColumn {
                section: section.id.clone(),
                column: column.id.clone(),
            });
            section.columns.push(column);
        } else if section.columns.len() > MAX_COLUMNS {
            let extra = section.columns.split_off(MAX_COLUMNS);
            repairs.push(Repair::MergedColumns {
                section: section.id.clone(),
                removed: extra.len(),
            });
            if let Some(last) = section.columns.last_mut() {
                last.widgets.extend(extra.into_iter().flat_map(|column| column.widgets));
            }
        }

        if !section.layout.fits(section.columns.len()) {
            repairs.push(Repair::ResetLayout {
                section: section.id.clone(),
                layout: section.layout.to_string(),
            });
            section.layout = SectionLayout::Equal;
        }

        normalize_overrides(section);
        for column in section.columns.iter_mut() {
            normalize_overrides(column);
            for widget in column.widgets.iter_mut() {
                normalize_overrides(widget);
            }
        }
    }

    for repair in &repairs {
        warn!(?repair, "Repaired initial document");
    }
    repairs
}

/// Build the session's starting document from whatever the host supplied
pub fn load_initial(initial: Option<InitialValue>, ids: &mut IdGenerator) -> (Document, Vec<Repair>) {
    let (mut doc, mut repairs) = match initial {
        Some(InitialValue::Sections { sections }) => decode_sections(sections),
        Some(InitialValue::Legacy { widgets }) => (migrate_legacy(widgets, ids), Vec::new()),
        None => (Document::new(), Vec::new()),
    };

    reserve_ids(&doc, ids);
    repairs.extend(repair(&mut doc, ids));
    (doc, repairs)
}
