//! # Pagecraft Model
//!
//! The editable page document and the pure functions over it.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ model: Document / Section / Column / Widget │
//! │  - catalog: widget + section defaults       │
//! │  - tree: lookups, constructors, duplication │
//! │  - style: breakpoint resolution, CSS        │
//! │  - migrate: legacy intake + repair          │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ editor: history, mutations, drag and drop,  │
//! │         selection, session                  │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! Nothing in this crate mutates its inputs. Functions either return new
//! values or `None` for lookup misses.

pub mod catalog;
pub mod content;
pub mod document;
pub mod error;
pub mod id_generator;
pub mod migrate;
pub mod style;
pub mod tree;

pub use catalog::{
    default_section_styles, find_section_template, section_templates, SectionTemplate,
    WidgetCatalog, WidgetCategory, WidgetDefinition,
};
pub use content::{WidgetContent, WidgetKind};
pub use document::{
    Advanced, Column, Document, EntranceAnimation, Section, SectionLayout, StyleSlotsMut, Styled,
    Visibility, Widget, MAX_COLUMNS, MAX_RATIO_TERM, MIN_COLUMNS,
};
pub use error::TreeError;
pub use id_generator::{seed_hash, IdGenerator};
pub use migrate::{load_initial, migrate_legacy, InitialValue, LegacyWidget, Repair};
pub use style::{
    css_declarations, css_text, resolve_styles, resolve_styles_with, style_map, Breakpoint,
    CascadeMode, ResponsiveOverrides, StyleMap, StyleValue, Viewport,
};
pub use tree::{
    find_column, find_section, find_widget, ColumnPath, ColumnRef, WidgetPath, WidgetRef,
};
