//! Static widget and section catalog.
//!
//! The catalog is the single source of default content and default styles for
//! newly created widgets. Hosts may register extra definitions or drop
//! built-in ones; a type missing from the catalog cannot be created.

use crate::content::*;
use crate::document::{SectionLayout, Widget};
use crate::id_generator::IdGenerator;
use crate::style::{style_map, StyleMap, StyleValue};
use crate::TreeError;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WidgetCategory {
    Basic,
    Media,
    Interactive,
    Layout,
    Form,
}

/// Defaults for one widget type
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WidgetDefinition {
    #[serde(rename = "type")]
    pub kind: WidgetKind,
    pub label: String,
    pub icon: String,
    pub category: WidgetCategory,
    pub default_content: WidgetContent,
    pub default_styles: StyleMap,
}

impl WidgetDefinition {
    pub fn new(
        kind: WidgetKind,
        label: &str,
        icon: &str,
        category: WidgetCategory,
        default_content: WidgetContent,
        default_styles: StyleMap,
    ) -> Self {
        Self {
            kind,
            label: label.to_string(),
            icon: icon.to_string(),
            category,
            default_content,
            default_styles,
        }
    }
}

/// Registry of widget definitions
#[derive(Debug, Clone)]
pub struct WidgetCatalog {
    definitions: Vec<WidgetDefinition>,
}

impl WidgetCatalog {
    pub fn empty() -> Self {
        Self {
            definitions: Vec::new(),
        }
    }

    /// Catalog with every built-in widget type
    pub fn builtin() -> Self {
        Self {
            definitions: builtin_definitions(),
        }
    }

    /// Register (or replace) a definition
    pub fn register(&mut self, definition: WidgetDefinition) {
        self.definitions.retain(|d| d.kind != definition.kind);
        self.definitions.push(definition);
    }

    pub fn unregister(&mut self, kind: WidgetKind) {
        self.definitions.retain(|d| d.kind != kind);
    }

    pub fn get(&self, kind: WidgetKind) -> Option<&WidgetDefinition> {
        self.definitions.iter().find(|d| d.kind == kind)
    }

    pub fn definitions(&self) -> &[WidgetDefinition] {
        &self.definitions
    }

    pub fn by_category(&self, category: WidgetCategory) -> impl Iterator<Item = &WidgetDefinition> {
        self.definitions.iter().filter(move |d| d.category == category)
    }

    /// Look up `widget_type` and build a fresh widget from its defaults.
    pub fn create_widget(&self, widget_type: &str, ids: &mut IdGenerator) -> Result<Widget, TreeError> {
        let kind: WidgetKind = widget_type.parse()?;
        let definition = self
            .get(kind)
            .ok_or_else(|| TreeError::UnknownWidgetType(widget_type.to_string()))?;

        Ok(Widget {
            id: ids.new_id(),
            content: definition.default_content.clone(),
            styles: definition.default_styles.clone(),
            responsive_overrides: None,
            advanced: None,
        })
    }
}

impl Default for WidgetCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Preset column arrangement offered by the section palette
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionTemplate {
    pub id: &'static str,
    pub label: &'static str,
    pub column_count: usize,
    pub layout: SectionLayout,
}

pub fn section_templates() -> Vec<SectionTemplate> {
    let template = |id, label, column_count, layout: &[u32]| SectionTemplate {
        id,
        label,
        column_count,
        layout: if layout.is_empty() {
            SectionLayout::Equal
        } else {
            SectionLayout::Ratio(layout.to_vec())
        },
    };

    vec![
        template("1-col", "One column", 1, &[]),
        template("2-col", "Two columns", 2, &[]),
        template("3-col", "Three columns", 3, &[]),
        template("4-col", "Four columns", 4, &[]),
        template("30-70", "30% / 70%", 2, &[30, 70]),
        template("70-30", "70% / 30%", 2, &[70, 30]),
        template("25-75", "25% / 75%", 2, &[25, 75]),
        template("75-25", "75% / 25%", 2, &[75, 25]),
        template("25-25-50", "25% / 25% / 50%", 3, &[25, 25, 50]),
        template("25-50-25", "25% / 50% / 25%", 3, &[25, 50, 25]),
    ]
}

pub fn find_section_template(id: &str) -> Option<SectionTemplate> {
    section_templates().into_iter().find(|t| t.id == id)
}

/// Default styles applied to every new section
pub fn default_section_styles() -> StyleMap {
    style_map([
        ("paddingTop", 60),
        ("paddingBottom", 60),
        ("paddingLeft", 20),
        ("paddingRight", 20),
    ])
}

fn px(n: i32) -> StyleValue {
    StyleValue::from(n)
}

fn text(s: &str) -> StyleValue {
    StyleValue::from(s)
}

fn builtin_definitions() -> Vec<WidgetDefinition> {
    use WidgetCategory::*;

    vec![
        WidgetDefinition::new(
            WidgetKind::Heading,
            "Heading",
            "Heading",
            Basic,
            WidgetContent::Heading(HeadingContent {
                text: "New heading".to_string(),
                tag: HeadingTag::H2,
            }),
            style_map([
                ("fontSize", text("2.5rem")),
                ("fontWeight", text("700")),
                ("color", text("#1a1a1a")),
                ("textAlign", text("left")),
                ("marginBottom", px(20)),
            ]),
        ),
        WidgetDefinition::new(
            WidgetKind::Text,
            "Text",
            "Type",
            Basic,
            WidgetContent::Text(TextContent {
                text: "Add your text here...".to_string(),
                html: None,
            }),
            style_map([
                ("fontSize", text("1rem")),
                ("lineHeight", text("1.6")),
                ("color", text("#4a5568")),
                ("textAlign", text("left")),
                ("marginBottom", px(16)),
            ]),
        ),
        WidgetDefinition::new(
            WidgetKind::Button,
            "Button",
            "MousePointerClick",
            Basic,
            WidgetContent::Button(ButtonContent {
                text: "Click here".to_string(),
                url: "#".to_string(),
                open_in_new_tab: false,
                icon: None,
                icon_position: None,
            }),
            style_map([
                ("fontSize", text("1rem")),
                ("fontWeight", text("600")),
                ("color", text("#ffffff")),
                ("backgroundColor", text("#6C63FF")),
                ("paddingTop", px(14)),
                ("paddingBottom", px(14)),
                ("paddingLeft", px(32)),
                ("paddingRight", px(32)),
                ("borderRadius", px(8)),
                ("textAlign", text("center")),
                ("display", text("inline-block")),
                ("cursor", text("pointer")),
            ]),
        ),
        WidgetDefinition::new(
            WidgetKind::Icon,
            "Icon",
            "Star",
            Basic,
            WidgetContent::Icon(IconContent {
                icon: "⭐".to_string(),
            }),
            style_map([
                ("fontSize", text("3rem")),
                ("textAlign", text("center")),
                ("marginBottom", px(16)),
            ]),
        ),
        WidgetDefinition::new(
            WidgetKind::Image,
            "Image",
            "Image",
            Media,
            WidgetContent::Image(ImageContent {
                url: "https://via.placeholder.com/800x400".to_string(),
                alt: "Image".to_string(),
                link: None,
                caption: None,
                lightbox: false,
            }),
            style_map([
                ("width", text("100%")),
                ("borderRadius", px(8)),
                ("marginBottom", px(16)),
            ]),
        ),
        WidgetDefinition::new(
            WidgetKind::Video,
            "Video",
            "Video",
            Media,
            WidgetContent::Video(VideoContent {
                source: VideoSource::Youtube,
                url: String::new(),
                autoplay: false,
                muted: false,
                looped: false,
                controls: true,
            }),
            style_map([("width", text("100%")), ("marginBottom", px(16))]),
        ),
        WidgetDefinition::new(
            WidgetKind::Accordion,
            "Accordion",
            "ChevronDown",
            Interactive,
            WidgetContent::Accordion(AccordionContent {
                items: (1..=3)
                    .map(|n| AccordionItem {
                        id: n.to_string(),
                        title: format!("Item {}", n),
                        content: format!("Item {} content", n),
                        is_open: n == 1,
                    })
                    .collect(),
                allow_multiple: false,
                icon: AccordionIcon::Chevron,
            }),
            style_map([("marginBottom", px(16))]),
        ),
        WidgetDefinition::new(
            WidgetKind::Tabs,
            "Tabs",
            "PanelTop",
            Interactive,
            WidgetContent::Tabs(TabsContent {
                items: (1..=3)
                    .map(|n| TabItem {
                        id: n.to_string(),
                        title: format!("Tab {}", n),
                        icon: None,
                        content: format!("Tab {} content", n),
                    })
                    .collect(),
                active_tab: Some("1".to_string()),
            }),
            style_map([("marginBottom", px(16))]),
        ),
        WidgetDefinition::new(
            WidgetKind::Counter,
            "Counter",
            "Hash",
            Interactive,
            WidgetContent::Counter(CounterContent {
                start: 0.0,
                end: 100.0,
                duration: 2000,
                prefix: None,
                suffix: Some("+".to_string()),
                separator: None,
            }),
            style_map([
                ("fontSize", text("3rem")),
                ("fontWeight", text("700")),
                ("color", text("#6C63FF")),
                ("textAlign", text("center")),
                ("marginBottom", px(16)),
            ]),
        ),
        WidgetDefinition::new(
            WidgetKind::Progress,
            "Progress bar",
            "Gauge",
            Interactive,
            WidgetContent::Progress(ProgressContent {
                value: 75.0,
                label: Some("Progress".to_string()),
                show_percentage: true,
            }),
            style_map([("marginBottom", px(16))]),
        ),
        WidgetDefinition::new(
            WidgetKind::SocialIcons,
            "Social icons",
            "Share2",
            Interactive,
            WidgetContent::SocialIcons(SocialIconsContent {
                icons: vec![
                    SocialIcon {
                        platform: SocialPlatform::Facebook,
                        url: "https://facebook.com".to_string(),
                    },
                    SocialIcon {
                        platform: SocialPlatform::Instagram,
                        url: "https://instagram.com".to_string(),
                    },
                    SocialIcon {
                        platform: SocialPlatform::Twitter,
                        url: "https://twitter.com".to_string(),
                    },
                ],
                style: SocialIconStyle::Rounded,
                size: SocialIconSize::Medium,
            }),
            style_map([("textAlign", text("center")), ("marginBottom", px(16))]),
        ),
        WidgetDefinition::new(
            WidgetKind::Testimonial,
            "Testimonial",
            "Quote",
            Interactive,
            WidgetContent::Testimonial(TestimonialContent {
                text: "A great testimonial about the product or service!".to_string(),
                author: "Customer name".to_string(),
                role: Some("Role".to_string()),
                image: None,
                rating: Some(5),
            }),
            style_map([
                ("paddingTop", px(24)),
                ("paddingBottom", px(24)),
                ("paddingLeft", px(24)),
                ("paddingRight", px(24)),
                ("backgroundColor", text("#f7fafc")),
                ("borderRadius", px(12)),
                ("marginBottom", px(16)),
            ]),
        ),
        WidgetDefinition::new(
            WidgetKind::Spacer,
            "Spacer",
            "MoveVertical",
            Layout,
            WidgetContent::Spacer,
            style_map([("height", text("40px"))]),
        ),
        WidgetDefinition::new(
            WidgetKind::Divider,
            "Divider",
            "Minus",
            Layout,
            WidgetContent::Divider,
            style_map([
                ("borderTopWidth", px(1)),
                ("borderColor", text("#e2e8f0")),
                ("borderStyle", text("solid")),
                ("marginTop", px(16)),
                ("marginBottom", px(16)),
            ]),
        ),
        WidgetDefinition::new(
            WidgetKind::Form,
            "Form",
            "FileText",
            WidgetCategory::Form,
            WidgetContent::Form(FormContent {
                fields: vec![
                    form_field("1", FormFieldType::Text, "Full name", "Your name...", true),
                    form_field("2", FormFieldType::Email, "Email", "example@email.com", true),
                    form_field("3", FormFieldType::Tel, "Phone", "050-1234567", false),
                    form_field("4", FormFieldType::Textarea, "Message", "Write a message...", false),
                ],
                submit_text: "Send".to_string(),
                success_message: Some("The form was sent successfully!".to_string()),
                redirect_url: None,
            }),
            style_map([("maxWidth", text("600px")), ("marginBottom", px(16))]),
        ),
    ]
}

fn form_field(id: &str, field_type: FormFieldType, label: &str, placeholder: &str, required: bool) -> FormField {
    FormField {
        id: id.to_string(),
        field_type,
        label: label.to_string(),
        placeholder: Some(placeholder.to_string()),
        required,
        options: Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_catalog_covers_every_kind() {
        let catalog = WidgetCatalog::builtin();
        for kind in WidgetKind::ALL {
            let def = catalog.get(kind).unwrap_or_else(|| panic!("missing {}", kind));
            assert_eq!(def.default_content.kind(), kind);
        }
    }

    #[test]
    fn test_create_widget_uses_defaults() {
        let catalog = WidgetCatalog::builtin();
        let mut ids = IdGenerator::new("catalog");

        let widget = catalog.create_widget("heading", &mut ids).unwrap();
        assert_eq!(widget.kind(), WidgetKind::Heading);
        assert_eq!(widget.styles["fontSize"], StyleValue::from("2.5rem"));
        match &widget.content {
            WidgetContent::Heading(h) => assert_eq!(h.tag, HeadingTag::H2),
            other => panic!("expected heading content, got {:?}", other),
        }
    }

    #[test]
    fn test_create_widget_unknown_type() {
        let mut catalog = WidgetCatalog::builtin();
        let mut ids = IdGenerator::new("catalog");

        assert_eq!(
            catalog.create_widget("carousel", &mut ids),
            Err(TreeError::UnknownWidgetType("carousel".to_string()))
        );

        catalog.unregister(WidgetKind::Video);
        assert_eq!(
            catalog.create_widget("video", &mut ids),
            Err(TreeError::UnknownWidgetType("video".to_string()))
        );
    }

    #[test]
    fn test_section_templates_fit_their_column_count() {
        for template in section_templates() {
            assert!(template.layout.fits(template.column_count), "{}", template.id);
        }
        assert_eq!(find_section_template("30-70").map(|t| t.column_count), Some(2));
        assert!(find_section_template("7-col").is_none());
    }

    #[test]
    fn test_by_category() {
        let catalog = WidgetCatalog::builtin();
        let layout: Vec<_> = catalog.by_category(WidgetCategory::Layout).map(|d| d.kind).collect();
        assert_eq!(layout, vec![WidgetKind::Spacer, WidgetKind::Divider]);
    }
}
