//! Loading, resolving and rendering documents through the public model API

use pagecraft_model::{
    css_text, find_widget, load_initial, resolve_styles, style_map, CascadeMode, Document,
    IdGenerator, InitialValue, ResponsiveOverrides, StyleValue, Styled, Viewport, WidgetCatalog,
};
use serde_json::json;

fn heading_with_mobile_override() -> pagecraft_model::Widget {
    let mut ids = IdGenerator::new("styles");
    let mut widget = WidgetCatalog::builtin()
        .create_widget("heading", &mut ids)
        .unwrap();
    widget.styles.insert("fontSize".to_string(), StyleValue::from("2rem"));
    widget.responsive_overrides = Some(ResponsiveOverrides {
        tablet: None,
        mobile: Some(style_map([("fontSize", "1rem")])),
    });
    widget
}

#[test]
fn test_tablet_ignores_mobile_override() {
    let widget = heading_with_mobile_override();

    let tablet = widget.effective_styles(Viewport::Tablet);
    assert_eq!(tablet["fontSize"], StyleValue::from("2rem"));

    let mobile = widget.effective_styles(Viewport::Mobile);
    assert_eq!(mobile["fontSize"], StyleValue::from("1rem"));
}

#[test]
fn test_mobile_keys_fall_through_to_desktop() {
    let widget = heading_with_mobile_override();
    let overrides = widget.responsive_overrides.as_ref().unwrap();
    let mobile_map = overrides.mobile.as_ref().unwrap();

    let resolved = resolve_styles(&widget.styles, Some(overrides), Viewport::Mobile);
    for (key, value) in &widget.styles {
        match mobile_map.get(key) {
            Some(over) => assert_eq!(&resolved[key], over),
            None => assert_eq!(&resolved[key], value),
        }
    }
}

#[test]
fn test_cascade_mode_only_changes_mobile() {
    let mut widget = heading_with_mobile_override();
    widget.responsive_overrides = Some(ResponsiveOverrides {
        tablet: Some(style_map([("color", "#333")])),
        mobile: Some(style_map([("fontSize", "1rem")])),
    });
    widget.styles.insert("color".to_string(), StyleValue::from("#000"));

    let independent = widget.effective_styles_with(Viewport::Mobile, CascadeMode::Independent);
    let cascading = widget.effective_styles_with(Viewport::Mobile, CascadeMode::Cascading);
    assert_eq!(independent["color"], StyleValue::from("#000"));
    assert_eq!(cascading["color"], StyleValue::from("#333"));

    assert_eq!(
        widget.effective_styles_with(Viewport::Tablet, CascadeMode::Cascading),
        widget.effective_styles_with(Viewport::Tablet, CascadeMode::Independent)
    );
}

#[test]
fn test_load_host_document() {
    let value = json!({
        "sections": [{
            "id": "hero",
            "layout": "30-70",
            "columns": [
                { "id": "left", "widgets": [] },
                { "id": "right", "widgets": [
                    {
                        "id": "title",
                        "type": "heading",
                        "content": { "text": "Launch day", "tag": "h1" },
                        "styles": { "fontSize": "3rem", "marginBottom": 16 },
                        "responsiveOverrides": { "mobile": { "fontSize": "2rem" } }
                    }
                ] }
            ]
        }]
    });

    let initial: InitialValue = serde_json::from_value(value).unwrap();
    let mut ids = IdGenerator::new("host");
    let (doc, repairs) = load_initial(Some(initial), &mut ids);

    assert!(repairs.is_empty());
    assert_eq!(doc.sections[0].grid_template(), "30fr 70fr");

    let found = find_widget(&doc, "title").unwrap();
    assert_eq!(found.column.id, "right");
    assert_eq!(
        css_text(&found.widget.effective_styles(Viewport::Mobile)),
        "font-size: 2rem; margin-bottom: 16px;"
    );
}

#[test]
fn test_document_serializes_back_to_host_shape() {
    let mut ids = IdGenerator::new("round");
    let catalog = WidgetCatalog::builtin();
    let mut section = pagecraft_model::tree::create_section(1, None, &mut ids).unwrap();
    section.columns[0]
        .widgets
        .push(catalog.create_widget("spacer", &mut ids).unwrap());
    let doc = Document::from_sections(vec![section]);

    let value = serde_json::to_value(&doc).unwrap();
    let widget = &value["sections"][0]["columns"][0]["widgets"][0];
    assert_eq!(widget["type"], "spacer");
    assert!(widget["content"].is_null());

    let back: Document = serde_json::from_value(value).unwrap();
    assert_eq!(back, doc);
}
