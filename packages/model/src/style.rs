//! # Responsive Styles
//!
//! Every node carries a desktop style map plus optional per-breakpoint
//! partial maps. Effective styles for a viewport are derived on demand.
//!
//! ```text
//! desktop styles ──┐
//!                  ├─ viewport = desktop → desktop styles
//! tablet partial ──┼─ viewport = tablet  → desktop ⊕ tablet
//! mobile partial ──┘  viewport = mobile  → desktop ⊕ mobile      (independent)
//!                                        → desktop ⊕ tablet ⊕ mobile (cascading)
//! ```

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;

/// A single style value: either a bare number or a CSS string
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StyleValue {
    Number(f64),
    Text(String),
}

impl StyleValue {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            StyleValue::Number(n) => Some(*n),
            StyleValue::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            StyleValue::Text(s) => Some(s),
            StyleValue::Number(_) => None,
        }
    }
}

impl fmt::Display for StyleValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StyleValue::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => write!(f, "{}", *n as i64),
            StyleValue::Number(n) => write!(f, "{}", n),
            StyleValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for StyleValue {
    fn from(s: &str) -> Self {
        StyleValue::Text(s.to_string())
    }
}

impl From<String> for StyleValue {
    fn from(s: String) -> Self {
        StyleValue::Text(s)
    }
}

impl From<f64> for StyleValue {
    fn from(n: f64) -> Self {
        StyleValue::Number(n)
    }
}

impl From<i32> for StyleValue {
    fn from(n: i32) -> Self {
        StyleValue::Number(n as f64)
    }
}

impl From<u32> for StyleValue {
    fn from(n: u32) -> Self {
        StyleValue::Number(n as f64)
    }
}

/// Style properties keyed by camelCase property name (`fontSize`, `paddingTop`, ...)
pub type StyleMap = BTreeMap<String, StyleValue>;

/// Build a style map from literal pairs
pub fn style_map<I, K, V>(pairs: I) -> StyleMap
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<StyleValue>,
{
    pairs
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect()
}

/// Active editor viewport
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Viewport {
    #[default]
    Desktop,
    Tablet,
    Mobile,
}

impl Viewport {
    /// Override breakpoint for this viewport (desktop has none)
    pub fn breakpoint(self) -> Option<Breakpoint> {
        match self {
            Viewport::Desktop => None,
            Viewport::Tablet => Some(Breakpoint::Tablet),
            Viewport::Mobile => Some(Breakpoint::Mobile),
        }
    }
}

/// Breakpoints that may carry style overrides
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Breakpoint {
    Tablet,
    Mobile,
}

/// How mobile overrides relate to tablet overrides
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CascadeMode {
    /// Each breakpoint overrides desktop directly
    #[default]
    Independent,
    /// Mobile falls back to tablet, then desktop
    Cascading,
}

/// Per-breakpoint partial style maps
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResponsiveOverrides {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tablet: Option<StyleMap>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mobile: Option<StyleMap>,
}

impl ResponsiveOverrides {
    pub fn get(&self, breakpoint: Breakpoint) -> Option<&StyleMap> {
        match breakpoint {
            Breakpoint::Tablet => self.tablet.as_ref(),
            Breakpoint::Mobile => self.mobile.as_ref(),
        }
    }

    /// Override map for `breakpoint`, created empty if missing
    pub fn entry(&mut self, breakpoint: Breakpoint) -> &mut StyleMap {
        let slot = match breakpoint {
            Breakpoint::Tablet => &mut self.tablet,
            Breakpoint::Mobile => &mut self.mobile,
        };
        slot.get_or_insert_with(StyleMap::new)
    }

    pub fn has_override(&self, breakpoint: Breakpoint, key: &str) -> bool {
        self.get(breakpoint).is_some_and(|map| map.contains_key(key))
    }

    pub fn is_empty(&self) -> bool {
        self.tablet.as_ref().map_or(true, |m| m.is_empty())
            && self.mobile.as_ref().map_or(true, |m| m.is_empty())
    }

    /// Drop override keys desktop doesn't define and values equal to desktop.
    pub fn normalize(&mut self, desktop: &StyleMap) {
        for slot in [&mut self.tablet, &mut self.mobile] {
            if let Some(map) = slot.as_mut() {
                map.retain(|key, value| desktop.get(key).is_some_and(|base| base != value));
            }
            if slot.as_ref().is_some_and(|map| map.is_empty()) {
                *slot = None;
            }
        }
    }
}

/// Effective styles for `viewport` under the two-level (independent) model
pub fn resolve_styles<'a>(
    styles: &'a StyleMap,
    overrides: Option<&ResponsiveOverrides>,
    viewport: Viewport,
) -> Cow<'a, StyleMap> {
    resolve_styles_with(styles, overrides, viewport, CascadeMode::Independent)
}

/// Effective styles for `viewport` under an explicit cascade mode
pub fn resolve_styles_with<'a>(
    styles: &'a StyleMap,
    overrides: Option<&ResponsiveOverrides>,
    viewport: Viewport,
    cascade: CascadeMode,
) -> Cow<'a, StyleMap> {
    let (Some(breakpoint), Some(overrides)) = (viewport.breakpoint(), overrides) else {
        return Cow::Borrowed(styles);
    };

    let mut layers: Vec<&StyleMap> = Vec::with_capacity(2);
    if cascade == CascadeMode::Cascading && breakpoint == Breakpoint::Mobile {
        layers.extend(overrides.get(Breakpoint::Tablet));
    }
    layers.extend(overrides.get(breakpoint));
    layers.retain(|layer| !layer.is_empty());

    if layers.is_empty() {
        return Cow::Borrowed(styles);
    }

    let mut merged = styles.clone();
    for layer in layers {
        merged.extend(layer.iter().map(|(k, v)| (k.clone(), v.clone())));
    }
    Cow::Owned(merged)
}

/// Numeric properties rendered without a `px` unit
const UNITLESS: &[&str] = &[
    "zIndex",
    "opacity",
    "fontWeight",
    "lineHeight",
    "flexGrow",
    "flexShrink",
    "order",
];

const BORDER_SIDES: &[&str] = &[
    "borderTopWidth",
    "borderRightWidth",
    "borderBottomWidth",
    "borderLeftWidth",
];

const BORDER_CORNERS: &[&str] = &[
    "borderTopLeftRadius",
    "borderTopRightRadius",
    "borderBottomLeftRadius",
    "borderBottomRightRadius",
];

/// Raw CSS appended verbatim after the generated declarations
pub const CUSTOM_CSS_KEY: &str = "customCSS";

fn kebab_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    for ch in name.chars() {
        if ch.is_ascii_uppercase() {
            out.push('-');
            out.push(ch.to_ascii_lowercase());
        } else {
            out.push(ch);
        }
    }
    out
}

/// Convert a style map to `(property, value)` CSS declarations.
///
/// Shorthand wins over longhand: `borderWidth` suppresses the per-side widths
/// and `borderRadius` suppresses the per-corner radii.
pub fn css_declarations(styles: &StyleMap) -> Vec<(String, String)> {
    let has_border_width = styles.contains_key("borderWidth");
    let has_border_radius = styles.contains_key("borderRadius");

    styles
        .iter()
        .filter(|(key, _)| key.as_str() != CUSTOM_CSS_KEY)
        .filter(|(key, _)| !(has_border_width && BORDER_SIDES.contains(&key.as_str())))
        .filter(|(key, _)| !(has_border_radius && BORDER_CORNERS.contains(&key.as_str())))
        .map(|(key, value)| {
            let rendered = match value {
                StyleValue::Number(_) if UNITLESS.contains(&key.as_str()) => value.to_string(),
                StyleValue::Number(_) => format!("{}px", value),
                StyleValue::Text(text) => text.clone(),
            };
            (kebab_case(key), rendered)
        })
        .collect()
}

/// Render a style map as an inline CSS declaration block
pub fn css_text(styles: &StyleMap) -> String {
    let mut css = css_declarations(styles)
        .into_iter()
        .map(|(prop, value)| format!("{}: {};", prop, value))
        .collect::<Vec<_>>()
        .join(" ");

    if let Some(StyleValue::Text(custom)) = styles.get(CUSTOM_CSS_KEY) {
        let custom = custom.trim();
        if !custom.is_empty() {
            if !css.is_empty() {
                css.push(' ');
            }
            css.push_str(custom);
        }
    }
    css
}
