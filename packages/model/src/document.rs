//! # Page Document
//!
//! A page is an ordered list of sections; a section owns 1-6 columns; a
//! column owns an ordered list of widgets.
//!
//! ```text
//! Document
//!  └─ Section (layout, gap)
//!      └─ Column (width)
//!          └─ Widget (type + content)
//! ```
//!
//! Sections are held behind `Arc`, so cloning a document is a shallow copy and
//! an edit only copies the section it touches (`Arc::make_mut`). History
//! snapshots therefore share every untouched section with the live document.

use crate::content::{WidgetContent, WidgetKind};
use crate::style::{
    resolve_styles_with, CascadeMode, ResponsiveOverrides, StyleMap, Viewport,
};
use crate::TreeError;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

pub const MIN_COLUMNS: usize = 1;
pub const MAX_COLUMNS: usize = 6;
pub const DEFAULT_SECTION_GAP: u32 = 20;
/// Largest single term of a ratio layout (`30-70`, `25-50-25`, ...)
pub const MAX_RATIO_TERM: u32 = 100;

/// The whole editable page
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    #[serde(default)]
    pub sections: Vec<Arc<Section>>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_sections(sections: Vec<Section>) -> Self {
        Self {
            sections: sections.into_iter().map(Arc::new).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    pub fn sections(&self) -> impl Iterator<Item = &Section> {
        self.sections.iter().map(|s| s.as_ref())
    }

    /// Mutable access to one section, copying it first if a snapshot shares it
    pub fn section_mut(&mut self, index: usize) -> Option<&mut Section> {
        self.sections.get_mut(index).map(Arc::make_mut)
    }
}

/// Column width distribution of a section
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SectionLayout {
    /// All columns share the row equally (or use explicit column widths)
    #[default]
    Equal,
    /// Named ratio layout such as `30-70` or `25-25-50`
    Ratio(Vec<u32>),
}

impl SectionLayout {
    /// Number of ratio terms, if this is a ratio layout
    pub fn term_count(&self) -> Option<usize> {
        match self {
            SectionLayout::Equal => None,
            SectionLayout::Ratio(terms) => Some(terms.len()),
        }
    }

    /// Whether this layout can describe `columns` columns
    pub fn fits(&self, columns: usize) -> bool {
        match self {
            SectionLayout::Equal => true,
            SectionLayout::Ratio(terms) => {
                terms.len() == columns && terms.iter().all(|t| (1..=MAX_RATIO_TERM).contains(t))
            }
        }
    }
}

impl fmt::Display for SectionLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SectionLayout::Equal => f.write_str("equal"),
            SectionLayout::Ratio(terms) => {
                let parts: Vec<String> = terms.iter().map(|t| t.to_string()).collect();
                f.write_str(&parts.join("-"))
            }
        }
    }
}

impl FromStr for SectionLayout {
    type Err = TreeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() || trimmed == "equal" || trimmed == "custom" {
            return Ok(SectionLayout::Equal);
        }

        let terms = trimmed
            .split(['-', '/'])
            .map(|term| {
                term.trim()
                    .parse::<u32>()
                    .ok()
                    .filter(|n| (1..=MAX_RATIO_TERM).contains(n))
            })
            .collect::<Option<Vec<u32>>>();

        match terms {
            Some(terms) if !terms.is_empty() => Ok(SectionLayout::Ratio(terms)),
            _ => Err(TreeError::MalformedLayout(s.to_string())),
        }
    }
}

impl Serialize for SectionLayout {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for SectionLayout {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Per-viewport visibility flags
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Visibility {
    pub hide_on_desktop: bool,
    pub hide_on_tablet: bool,
    pub hide_on_mobile: bool,
}

impl Visibility {
    pub fn hides(&self, viewport: Viewport) -> bool {
        match viewport {
            Viewport::Desktop => self.hide_on_desktop,
            Viewport::Tablet => self.hide_on_tablet,
            Viewport::Mobile => self.hide_on_mobile,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EntranceAnimation {
    #[default]
    None,
    FadeIn,
    SlideUp,
    SlideDown,
    SlideLeft,
    SlideRight,
    ZoomIn,
    ZoomOut,
}

/// Advanced node settings: DOM hooks, visibility, entrance animation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Advanced {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_class: Option<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub custom_attributes: BTreeMap<String, String>,
    pub visibility: Visibility,
    pub entrance_animation: EntranceAnimation,
    /// Milliseconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub animation_duration: Option<u32>,
    /// Milliseconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub animation_delay: Option<u32>,
    pub sticky: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sticky_offset: Option<u32>,
}

/// Borrowed mutable view over a node's style slots
pub struct StyleSlotsMut<'a> {
    pub styles: &'a mut StyleMap,
    pub responsive_overrides: &'a mut Option<ResponsiveOverrides>,
    pub advanced: &'a mut Option<Advanced>,
}

/// Anything that carries desktop styles, breakpoint overrides and advanced settings
pub trait Styled {
    fn id(&self) -> &str;
    fn styles(&self) -> &StyleMap;
    fn responsive_overrides(&self) -> Option<&ResponsiveOverrides>;
    fn advanced(&self) -> Option<&Advanced>;
    fn style_slots_mut(&mut self) -> StyleSlotsMut<'_>;

    fn effective_styles(&self, viewport: Viewport) -> Cow<'_, StyleMap> {
        self.effective_styles_with(viewport, CascadeMode::Independent)
    }

    fn effective_styles_with(&self, viewport: Viewport, cascade: CascadeMode) -> Cow<'_, StyleMap> {
        resolve_styles_with(self.styles(), self.responsive_overrides(), viewport, cascade)
    }

    /// Whether the node must not be rendered at `viewport`
    fn is_hidden(&self, viewport: Viewport) -> bool {
        self.advanced()
            .is_some_and(|advanced| advanced.visibility.hides(viewport))
    }
}

macro_rules! impl_styled {
    ($ty:ty) => {
        impl Styled for $ty {
            fn id(&self) -> &str {
                &self.id
            }

            fn styles(&self) -> &StyleMap {
                &self.styles
            }

            fn responsive_overrides(&self) -> Option<&ResponsiveOverrides> {
                self.responsive_overrides.as_ref()
            }

            fn advanced(&self) -> Option<&Advanced> {
                self.advanced.as_ref()
            }

            fn style_slots_mut(&mut self) -> StyleSlotsMut<'_> {
                StyleSlotsMut {
                    styles: &mut self.styles,
                    responsive_overrides: &mut self.responsive_overrides,
                    advanced: &mut self.advanced,
                }
            }
        }
    };
}

fn default_gap() -> u32 {
    DEFAULT_SECTION_GAP
}

/// Top-level horizontal block of the page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Section {
    pub id: String,
    pub columns: Vec<Column>,
    #[serde(default)]
    pub layout: SectionLayout,
    #[serde(default = "default_gap")]
    pub gap: u32,
    #[serde(default)]
    pub styles: StyleMap,
    #[serde(default, alias = "responsiveStyles", skip_serializing_if = "Option::is_none")]
    pub responsive_overrides: Option<ResponsiveOverrides>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub advanced: Option<Advanced>,
}

impl Section {
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// CSS grid template for the column row
    pub fn grid_template(&self) -> String {
        match &self.layout {
            SectionLayout::Ratio(terms) if terms.len() == self.columns.len() => terms
                .iter()
                .map(|t| format!("{}fr", t))
                .collect::<Vec<_>>()
                .join(" "),
            _ => format!("repeat({}, 1fr)", self.columns.len()),
        }
    }

    /// Width of each column as a percentage of the row
    pub fn column_widths(&self) -> Vec<f64> {
        let count = self.columns.len();
        if count == 0 {
            return Vec::new();
        }

        if let SectionLayout::Ratio(terms) = &self.layout {
            if terms.len() == count {
                let total: f64 = terms.iter().map(|t| f64::from(*t)).sum();
                return terms
                    .iter()
                    .map(|t| f64::from(*t) * 100.0 / total)
                    .collect();
            }
        }

        let equal = 100.0 / count as f64;
        self.columns
            .iter()
            .map(|column| column.width.unwrap_or(equal))
            .collect()
    }
}

/// Vertical slot inside a section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Column {
    pub id: String,
    #[serde(default)]
    pub widgets: Vec<Widget>,
    /// Explicit width percentage (custom layouts)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(default)]
    pub styles: StyleMap,
    #[serde(default, alias = "responsiveStyles", skip_serializing_if = "Option::is_none")]
    pub responsive_overrides: Option<ResponsiveOverrides>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub advanced: Option<Advanced>,
}

/// Leaf content unit
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "RawWidget")]
pub struct Widget {
    pub id: String,
    pub content: WidgetContent,
    pub styles: StyleMap,
    pub responsive_overrides: Option<ResponsiveOverrides>,
    pub advanced: Option<Advanced>,
}

impl Widget {
    pub fn kind(&self) -> WidgetKind {
        self.content.kind()
    }
}

impl_styled!(Section);
impl_styled!(Column);
impl_styled!(Widget);

/// Wire shape of a widget before its content is decoded
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawWidget {
    id: String,
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    content: Value,
    #[serde(default)]
    styles: StyleMap,
    #[serde(default, alias = "responsiveStyles")]
    responsive_overrides: Option<ResponsiveOverrides>,
    #[serde(default)]
    advanced: Option<Advanced>,
}

impl TryFrom<RawWidget> for Widget {
    type Error = TreeError;

    fn try_from(raw: RawWidget) -> Result<Self, Self::Error> {
        let kind: WidgetKind = raw.kind.parse()?;
        Ok(Widget {
            id: raw.id,
            content: WidgetContent::from_value(kind, raw.content)?,
            styles: raw.styles,
            responsive_overrides: raw.responsive_overrides,
            advanced: raw.advanced,
        })
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct WidgetRepr<'a> {
    id: &'a str,
    #[serde(rename = "type")]
    kind: WidgetKind,
    content: &'a WidgetContent,
    styles: &'a StyleMap,
    #[serde(skip_serializing_if = "Option::is_none")]
    responsive_overrides: Option<&'a ResponsiveOverrides>,
    #[serde(skip_serializing_if = "Option::is_none")]
    advanced: Option<&'a Advanced>,
}

impl Serialize for Widget {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        WidgetRepr {
            id: &self.id,
            kind: self.kind(),
            content: &self.content,
            styles: &self.styles,
            responsive_overrides: self.responsive_overrides.as_ref(),
            advanced: self.advanced.as_ref(),
        }
        .serialize(serializer)
    }
}
