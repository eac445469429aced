//! # Render Pipeline
//!
//! Derives what the canvas shows for one viewport: effective styles and CSS
//! per node, the grid template per section, and nothing for nodes hidden at
//! that viewport. The view is a pure function of the document; the
//! [`Pipeline`] only caches the last one.

use pagecraft_model::{
    css_text, Advanced, CascadeMode, Document, EntranceAnimation, StyleMap, Styled, Viewport,
    WidgetContent, WidgetKind,
};
use serde::Serialize;
use std::collections::BTreeMap;

/// DOM hooks and animation shared by every node view
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeAttrs {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dom_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class_name: Option<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub animation: Option<AnimationView>,
    pub sticky: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnimationView {
    pub name: EntranceAnimation,
    pub duration_ms: u32,
    pub delay_ms: u32,
}

const DEFAULT_ANIMATION_MS: u32 = 600;

impl From<Option<&Advanced>> for NodeAttrs {
    fn from(advanced: Option<&Advanced>) -> Self {
        let Some(advanced) = advanced else {
            return NodeAttrs::default();
        };

        let animation = (advanced.entrance_animation != EntranceAnimation::None).then(|| AnimationView {
            name: advanced.entrance_animation,
            duration_ms: advanced.animation_duration.unwrap_or(DEFAULT_ANIMATION_MS),
            delay_ms: advanced.animation_delay.unwrap_or(0),
        });

        NodeAttrs {
            dom_id: advanced.custom_id.clone().filter(|id| !id.is_empty()),
            class_name: advanced.custom_class.clone().filter(|c| !c.is_empty()),
            attributes: advanced.custom_attributes.clone(),
            animation,
            sticky: advanced.sticky,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageView {
    pub viewport: Viewport,
    pub sections: Vec<SectionView>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionView {
    pub id: String,
    pub grid_template: String,
    pub gap: u32,
    pub styles: StyleMap,
    pub css: String,
    #[serde(flatten)]
    pub attrs: NodeAttrs,
    pub columns: Vec<ColumnView>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnView {
    pub id: String,
    /// Percentage of the row
    pub width: f64,
    pub styles: StyleMap,
    pub css: String,
    #[serde(flatten)]
    pub attrs: NodeAttrs,
    pub widgets: Vec<WidgetView>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WidgetView {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: WidgetKind,
    pub content: WidgetContent,
    pub styles: StyleMap,
    pub css: String,
    #[serde(flatten)]
    pub attrs: NodeAttrs,
}

/// Render `doc` as seen at `viewport`
pub fn render_view(doc: &Document, viewport: Viewport, cascade: CascadeMode) -> PageView {
    let sections = doc
        .sections()
        .filter(|section| !section.is_hidden(viewport))
        .map(|section| {
            let widths = section.column_widths();
            let columns = section
                .columns
                .iter()
                .zip(widths)
                .filter(|(column, _)| !column.is_hidden(viewport))
                .map(|(column, width)| {
                    let widgets = column
                        .widgets
                        .iter()
                        .filter(|widget| !widget.is_hidden(viewport))
                        .map(|widget| {
                            let styles = widget.effective_styles_with(viewport, cascade).into_owned();
                            WidgetView {
                                id: widget.id.clone(),
                                kind: widget.kind(),
                                content: widget.content.clone(),
                                css: css_text(&styles),
                                styles,
                                attrs: widget.advanced().into(),
                            }
                        })
                        .collect();

                    let styles = column.effective_styles_with(viewport, cascade).into_owned();
                    ColumnView {
                        id: column.id.clone(),
                        width,
                        css: css_text(&styles),
                        styles,
                        attrs: column.advanced().into(),
                        widgets,
                    }
                })
                .collect();

            let styles = section.effective_styles_with(viewport, cascade).into_owned();
            SectionView {
                id: section.id.clone(),
                grid_template: section.grid_template(),
                gap: section.gap,
                css: css_text(&styles),
                styles,
                attrs: section.advanced().into(),
                columns,
            }
        })
        .collect();

    PageView { viewport, sections }
}

/// Caches the last rendered view per document version and viewport
pub struct Pipeline {
    cascade: CascadeMode,
    last: Option<(u64, Viewport, PageView)>,
}

impl Pipeline {
    pub fn new(cascade: CascadeMode) -> Self {
        Self {
            cascade,
            last: None,
        }
    }

    /// View of `doc` at `viewport`; re-rendered only when `version` or
    /// `viewport` changed since the last call
    pub fn render(&mut self, doc: &Document, version: u64, viewport: Viewport) -> &PageView {
        if matches!(&self.last, Some((v, vp, _)) if *v != version || *vp != viewport) {
            self.last = None;
        }

        let cascade = self.cascade;
        let (_, _, view) = self
            .last
            .get_or_insert_with(|| (version, viewport, render_view(doc, viewport, cascade)));
        view
    }

    pub fn last_view(&self) -> Option<&PageView> {
        self.last.as_ref().map(|(_, _, view)| view)
    }

    /// Force a full re-render on the next call
    pub fn clear_cache(&mut self) {
        self.last = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pagecraft_model::tree::create_section;
    use pagecraft_model::{style_map, IdGenerator, ResponsiveOverrides, SectionLayout, Visibility, WidgetCatalog};

    fn sample() -> Document {
        let mut ids = IdGenerator::new("view");
        let catalog = WidgetCatalog::builtin();
        let mut section = create_section(2, Some(SectionLayout::Ratio(vec![30, 70])), &mut ids).unwrap();

        let mut heading = catalog.create_widget("heading", &mut ids).unwrap();
        heading.styles = style_map([("fontSize", "2rem")]);
        heading.responsive_overrides = Some(ResponsiveOverrides {
            tablet: None,
            mobile: Some(style_map([("fontSize", "1rem")])),
        });

        let mut banner = catalog.create_widget("image", &mut ids).unwrap();
        banner.advanced = Some(Advanced {
            visibility: Visibility {
                hide_on_mobile: true,
                ..Visibility::default()
            },
            entrance_animation: EntranceAnimation::FadeIn,
            ..Advanced::default()
        });

        section.columns[0].widgets.push(heading);
        section.columns[1].widgets.push(banner);
        Document::from_sections(vec![section])
    }

    #[test]
    fn test_desktop_view() {
        let view = render_view(&sample(), Viewport::Desktop, CascadeMode::Independent);

        let section = &view.sections[0];
        assert_eq!(section.grid_template, "30fr 70fr");
        assert_eq!(section.columns[0].width, 30.0);
        assert!(section.css.contains("padding-top: 60px;"));

        let heading = &section.columns[0].widgets[0];
        assert_eq!(heading.css, "font-size: 2rem;");

        let banner = &section.columns[1].widgets[0];
        let animation = banner.attrs.animation.as_ref().unwrap();
        assert_eq!(animation.name, EntranceAnimation::FadeIn);
        assert_eq!(animation.duration_ms, DEFAULT_ANIMATION_MS);
    }

    #[test]
    fn test_mobile_view_resolves_and_hides() {
        let view = render_view(&sample(), Viewport::Mobile, CascadeMode::Independent);

        let section = &view.sections[0];
        assert_eq!(section.columns[0].widgets[0].css, "font-size: 1rem;");
        assert!(section.columns[1].widgets.is_empty());
    }

    #[test]
    fn test_view_serializes_camel_case() {
        let view = render_view(&sample(), Viewport::Tablet, CascadeMode::Independent);
        let value = serde_json::to_value(&view).unwrap();

        assert_eq!(value["viewport"], "tablet");
        assert_eq!(value["sections"][0]["gridTemplate"], "30fr 70fr");
        assert_eq!(value["sections"][0]["columns"][0]["widgets"][0]["type"], "heading");
    }

    #[test]
    fn test_pipeline_caches_by_version() {
        let doc = sample();
        let mut pipeline = Pipeline::new(CascadeMode::Independent);
        assert!(pipeline.last_view().is_none());

        let first = pipeline.render(&doc, 1, Viewport::Desktop).clone();
        // Same version: the cached view comes back even for another document
        let cached = pipeline.render(&Document::new(), 1, Viewport::Desktop).clone();
        assert_eq!(first, cached);

        let fresh = pipeline.render(&Document::new(), 2, Viewport::Desktop);
        assert!(fresh.sections.is_empty());

        pipeline.clear_cache();
        assert!(pipeline.last_view().is_none());
    }
}
