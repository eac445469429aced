//! # Widget Content
//!
//! Each widget type carries its own typed payload. On the wire the payload
//! sits under `content` next to a `type` discriminator, so deserialization is
//! driven by the kind rather than by the payload's shape.

use crate::TreeError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

/// Closed set of widget types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WidgetKind {
    Heading,
    Text,
    Button,
    Image,
    Video,
    Spacer,
    Divider,
    Icon,
    Accordion,
    Tabs,
    Counter,
    Progress,
    SocialIcons,
    Testimonial,
    Form,
}

impl WidgetKind {
    pub const ALL: [WidgetKind; 15] = [
        WidgetKind::Heading,
        WidgetKind::Text,
        WidgetKind::Button,
        WidgetKind::Image,
        WidgetKind::Video,
        WidgetKind::Spacer,
        WidgetKind::Divider,
        WidgetKind::Icon,
        WidgetKind::Accordion,
        WidgetKind::Tabs,
        WidgetKind::Counter,
        WidgetKind::Progress,
        WidgetKind::SocialIcons,
        WidgetKind::Testimonial,
        WidgetKind::Form,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            WidgetKind::Heading => "heading",
            WidgetKind::Text => "text",
            WidgetKind::Button => "button",
            WidgetKind::Image => "image",
            WidgetKind::Video => "video",
            WidgetKind::Spacer => "spacer",
            WidgetKind::Divider => "divider",
            WidgetKind::Icon => "icon",
            WidgetKind::Accordion => "accordion",
            WidgetKind::Tabs => "tabs",
            WidgetKind::Counter => "counter",
            WidgetKind::Progress => "progress",
            WidgetKind::SocialIcons => "social-icons",
            WidgetKind::Testimonial => "testimonial",
            WidgetKind::Form => "form",
        }
    }
}

impl fmt::Display for WidgetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WidgetKind {
    type Err = TreeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        WidgetKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| TreeError::UnknownWidgetType(s.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HeadingTag {
    H1,
    #[default]
    H2,
    H3,
    H4,
    H5,
    H6,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeadingContent {
    pub text: String,
    #[serde(default)]
    pub tag: HeadingTag,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextContent {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub html: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IconPosition {
    Left,
    Right,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ButtonContent {
    pub text: String,
    pub url: String,
    #[serde(default)]
    pub open_in_new_tab: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon_position: Option<IconPosition>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageContent {
    pub url: String,
    #[serde(default)]
    pub alt: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
    #[serde(default)]
    pub lightbox: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VideoSource {
    #[default]
    Youtube,
    Vimeo,
    Direct,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoContent {
    #[serde(rename = "type", default)]
    pub source: VideoSource,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub autoplay: bool,
    #[serde(default)]
    pub muted: bool,
    #[serde(rename = "loop", default)]
    pub looped: bool,
    #[serde(default = "default_true")]
    pub controls: bool,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IconContent {
    pub icon: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccordionItem {
    pub id: String,
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub is_open: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccordionIcon {
    Plus,
    Arrow,
    #[default]
    Chevron,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccordionContent {
    pub items: Vec<AccordionItem>,
    #[serde(default)]
    pub allow_multiple: bool,
    #[serde(default)]
    pub icon: AccordionIcon,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TabItem {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TabsContent {
    pub items: Vec<TabItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_tab: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CounterContent {
    pub start: f64,
    pub end: f64,
    /// Animation length in milliseconds
    pub duration: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suffix: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub separator: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressContent {
    /// 0-100
    pub value: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default)]
    pub show_percentage: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SocialPlatform {
    Facebook,
    Instagram,
    Twitter,
    Linkedin,
    Youtube,
    Whatsapp,
    Telegram,
    Tiktok,
    Pinterest,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SocialIcon {
    pub platform: SocialPlatform,
    pub url: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SocialIconStyle {
    Default,
    #[default]
    Rounded,
    Square,
    Circle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SocialIconSize {
    Small,
    #[default]
    Medium,
    Large,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SocialIconsContent {
    pub icons: Vec<SocialIcon>,
    #[serde(default)]
    pub style: SocialIconStyle,
    #[serde(default)]
    pub size: SocialIconSize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestimonialContent {
    pub text: String,
    pub author: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<u8>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormFieldType {
    Text,
    Email,
    Tel,
    Textarea,
    Select,
    Checkbox,
    Radio,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormField {
    pub id: String,
    #[serde(rename = "type")]
    pub field_type: FormFieldType,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(default)]
    pub required: bool,
    /// Choices for select, checkbox and radio fields
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormContent {
    pub fields: Vec<FormField>,
    pub submit_text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub success_message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redirect_url: Option<String>,
}

/// Type-specific widget payload
///
/// Serializes as the bare payload (`null` for spacer and divider); the kind
/// travels separately as the widget's `type`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum WidgetContent {
    Heading(HeadingContent),
    Text(TextContent),
    Button(ButtonContent),
    Image(ImageContent),
    Video(VideoContent),
    Spacer,
    Divider,
    Icon(IconContent),
    Accordion(AccordionContent),
    Tabs(TabsContent),
    Counter(CounterContent),
    Progress(ProgressContent),
    SocialIcons(SocialIconsContent),
    Testimonial(TestimonialContent),
    Form(FormContent),
}

fn typed<T: serde::de::DeserializeOwned>(kind: WidgetKind, value: Value) -> Result<T, TreeError> {
    serde_json::from_value(value).map_err(|e| TreeError::InvalidContent {
        kind: kind.to_string(),
        reason: e.to_string(),
    })
}

impl WidgetContent {
    pub fn kind(&self) -> WidgetKind {
        match self {
            WidgetContent::Heading(_) => WidgetKind::Heading,
            WidgetContent::Text(_) => WidgetKind::Text,
            WidgetContent::Button(_) => WidgetKind::Button,
            WidgetContent::Image(_) => WidgetKind::Image,
            WidgetContent::Video(_) => WidgetKind::Video,
            WidgetContent::Spacer => WidgetKind::Spacer,
            WidgetContent::Divider => WidgetKind::Divider,
            WidgetContent::Icon(_) => WidgetKind::Icon,
            WidgetContent::Accordion(_) => WidgetKind::Accordion,
            WidgetContent::Tabs(_) => WidgetKind::Tabs,
            WidgetContent::Counter(_) => WidgetKind::Counter,
            WidgetContent::Progress(_) => WidgetKind::Progress,
            WidgetContent::SocialIcons(_) => WidgetKind::SocialIcons,
            WidgetContent::Testimonial(_) => WidgetKind::Testimonial,
            WidgetContent::Form(_) => WidgetKind::Form,
        }
    }

    /// Decode a raw JSON payload for the given kind
    pub fn from_value(kind: WidgetKind, value: Value) -> Result<Self, TreeError> {
        Ok(match kind {
            WidgetKind::Heading => WidgetContent::Heading(typed(kind, value)?),
            WidgetKind::Text => WidgetContent::Text(typed(kind, value)?),
            WidgetKind::Button => WidgetContent::Button(typed(kind, value)?),
            WidgetKind::Image => WidgetContent::Image(typed(kind, value)?),
            WidgetKind::Video => WidgetContent::Video(typed(kind, value)?),
            WidgetKind::Spacer => WidgetContent::Spacer,
            WidgetKind::Divider => WidgetContent::Divider,
            WidgetKind::Icon => WidgetContent::Icon(typed(kind, value)?),
            WidgetKind::Accordion => WidgetContent::Accordion(typed(kind, value)?),
            WidgetKind::Tabs => WidgetContent::Tabs(typed(kind, value)?),
            WidgetKind::Counter => WidgetContent::Counter(typed(kind, value)?),
            WidgetKind::Progress => WidgetContent::Progress(typed(kind, value)?),
            WidgetKind::SocialIcons => WidgetContent::SocialIcons(typed(kind, value)?),
            WidgetKind::Testimonial => WidgetContent::Testimonial(typed(kind, value)?),
            WidgetKind::Form => WidgetContent::Form(typed(kind, value)?),
        })
    }

    pub fn to_value(&self) -> Result<Value, TreeError> {
        serde_json::to_value(self).map_err(|e| TreeError::InvalidContent {
            kind: self.kind().to_string(),
            reason: e.to_string(),
        })
    }

    /// Shallow-merge `patch` into this payload; `null` removes a key.
    ///
    /// The merged object must still decode as the same kind.
    pub fn merged(&self, patch: &Map<String, Value>) -> Result<Self, TreeError> {
        let kind = self.kind();
        match self.to_value()? {
            Value::Object(mut fields) => {
                for (key, value) in patch {
                    if value.is_null() {
                        fields.remove(key);
                    } else {
                        fields.insert(key.clone(), value.clone());
                    }
                }
                Self::from_value(kind, Value::Object(fields))
            }
            _ if patch.is_empty() => Ok(self.clone()),
            _ => Err(TreeError::InvalidContent {
                kind: kind.to_string(),
                reason: "widget has no content fields".to_string(),
            }),
        }
    }
}
