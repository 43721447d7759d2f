//! Mock context generation.
//!
//! Fabricates a complete render context from a component schema and an
//! optional style preset. No I/O happens here: every value is either a
//! schema-declared default, a fixed per-type placeholder, or a fixture
//! from [`entities`]. The same schema and preset always produce the
//! same context.
pub mod entities;

use crate::schema::{BlockType, Category, ComponentSchema, Setting, StylePreset};

use serde_json::{json, Map, Value};

/// Build the full context object for one render.
///
/// The returned value is a JSON object with `shop`, `cart`, `request`,
/// `settings`, `section`, navigation and route keys, plus the domain
/// entities the component's category calls for.
pub fn build_context(schema: &ComponentSchema, preset: Option<&StylePreset>) -> Value {
    let mut context = Map::new();

    context.insert("shop".into(), entities::shop());
    context.insert("cart".into(), entities::cart());
    context.insert("request".into(), entities::request());
    context.insert("linklists".into(), entities::menus());
    context.insert("routes".into(), entities::routes());
    context.insert("settings".into(), theme_settings(preset));
    context.insert("section".into(), section(schema));

    match schema.category {
        Category::Product => {
            context.insert("product".into(), entities::product());
        }
        Category::Collection => {
            context.insert("collection".into(), entities::collection());
            context.insert("collections".into(), entities::collections());
        }
        Category::Hero | Category::Header | Category::Footer | Category::Text => {}
        Category::Other => {
            context.insert("product".into(), entities::product());
            context.insert("collection".into(), entities::collection());
        }
    }

    Value::Object(context)
}

/// The `section` object: resolved settings plus materialized blocks.
fn section(schema: &ComponentSchema) -> Value {
    json!({
        "id": format!("section-{}", schema.slug),
        "settings": settings(&schema.settings),
        "blocks": blocks(schema),
    })
}

/// Resolve a setting list to a value map. Structural settings are
/// skipped, everything else gets its declared default or the per-type
/// placeholder.
fn settings(settings: &[Setting]) -> Value {
    let mut values = Map::new();

    for setting in settings {
        if setting.structural() {
            continue;
        }
        values.insert(setting.id.clone(), setting_value(setting));
    }

    Value::Object(values)
}

fn setting_value(setting: &Setting) -> Value {
    if let Some(default) = &setting.default {
        return default.clone();
    }

    placeholder(&setting.kind)
}

/// Per-type placeholder used when a setting declares no default.
fn placeholder(kind: &str) -> Value {
    match kind {
        "text" | "textarea" => json!("Sample text goes here"),
        "richtext" | "html" => json!("<p>Sample rich text content.</p>"),
        "color" => json!("#000000"),
        "checkbox" => json!(false),
        "range" | "number" => json!(10),
        "select" | "radio" => json!(""),
        "url" => json!("#"),
        // Reference types (image_picker, product, collection, page,
        // video, link_list, font_picker) have no sensible placeholder.
        _ => Value::Null,
    }
}

/// Materialize block instances.
///
/// If the schema's first preset spells out a block list, those blocks
/// are used in order, with settings the preset omits filled in from the
/// block type's own defaults. Otherwise up to three sample blocks are
/// synthesized, one per declared block type.
fn blocks(schema: &ComponentSchema) -> Value {
    let preset_blocks = schema
        .presets
        .first()
        .and_then(|preset| preset.blocks.as_ref());

    let blocks = match preset_blocks {
        Some(preset_blocks) => preset_blocks
            .iter()
            .enumerate()
            .map(|(index, preset_block)| {
                let mut settings = match schema.block_type(&preset_block.kind) {
                    Some(block_type) => block_defaults(block_type),
                    None => Map::new(),
                };

                for (id, value) in &preset_block.settings {
                    settings.insert(id.clone(), value.clone());
                }

                block(index, &preset_block.kind, settings)
            })
            .collect::<Vec<_>>(),

        None => schema
            .blocks
            .iter()
            .take(3)
            .enumerate()
            .map(|(index, block_type)| {
                block(index, &block_type.kind, block_defaults(block_type))
            })
            .collect::<Vec<_>>(),
    };

    Value::Array(blocks)
}

fn block(index: usize, kind: &str, settings: Map<String, Value>) -> Value {
    json!({
        "id": format!("block-{}", index + 1),
        "type": kind,
        "settings": settings,
    })
}

fn block_defaults(block_type: &BlockType) -> Map<String, Value> {
    let mut values = Map::new();

    for setting in &block_type.settings {
        if setting.structural() {
            continue;
        }
        values.insert(setting.id.clone(), setting_value(setting));
    }

    values
}

/// Theme-level settings: fixed baseline overlaid with whatever the
/// preset provides. Absent preset fields keep the baseline.
fn theme_settings(preset: Option<&StylePreset>) -> Value {
    let mut colors = Map::from_iter([
        ("primary".into(), json!("#000000")),
        ("secondary".into(), json!("#555555")),
        ("accent".into(), json!("#0066cc")),
        ("background".into(), json!("#ffffff")),
        ("background_secondary".into(), json!("#f5f5f5")),
        ("text".into(), json!("#111111")),
        ("text_secondary".into(), json!("#666666")),
    ]);

    let mut typography = Map::from_iter([
        ("heading_font".into(), json!("Inter")),
        ("body_font".into(), json!("Inter")),
        ("heading_scale".into(), json!(1.2)),
        ("body_scale".into(), json!(1.0)),
    ]);

    let mut buttons = Map::from_iter([
        ("border_radius".into(), json!(4.0)),
        ("padding_vertical".into(), json!(10.0)),
        ("padding_horizontal".into(), json!(20.0)),
    ]);

    if let Some(preset) = preset {
        if let Some(preset_colors) = &preset.colors {
            overlay(&mut colors, "primary", &preset_colors.primary);
            overlay(&mut colors, "secondary", &preset_colors.secondary);
            overlay(&mut colors, "accent", &preset_colors.accent);
            overlay(&mut colors, "background", &preset_colors.background);
            overlay(
                &mut colors,
                "background_secondary",
                &preset_colors.background_secondary,
            );
            overlay(&mut colors, "text", &preset_colors.text);
            overlay(&mut colors, "text_secondary", &preset_colors.text_secondary);
        }

        if let Some(preset_typography) = &preset.typography {
            overlay(
                &mut typography,
                "heading_font",
                &preset_typography.heading_font,
            );
            overlay(&mut typography, "body_font", &preset_typography.body_font);
            overlay_number(
                &mut typography,
                "heading_scale",
                &preset_typography.heading_scale,
            );
            overlay_number(&mut typography, "body_scale", &preset_typography.body_scale);
        }

        if let Some(preset_buttons) = &preset.buttons {
            overlay_number(&mut buttons, "border_radius", &preset_buttons.border_radius);
            overlay_number(
                &mut buttons,
                "padding_vertical",
                &preset_buttons.padding_vertical,
            );
            overlay_number(
                &mut buttons,
                "padding_horizontal",
                &preset_buttons.padding_horizontal,
            );
        }
    }

    json!({
        "colors": colors,
        "typography": typography,
        "buttons": buttons,
        "layout": {
            "page_width": 1200,
            "section_spacing": 48,
        },
    })
}

fn overlay(map: &mut Map<String, Value>, key: &str, value: &Option<String>) {
    if let Some(value) = value {
        map.insert(key.to_string(), json!(value));
    }
}

fn overlay_number(map: &mut Map<String, Value>, key: &str, value: &Option<f64>) {
    if let Some(value) = value {
        map.insert(key.to_string(), json!(value));
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::schema::{PresetColors, SchemaPreset};

    fn schema(category: &str) -> ComponentSchema {
        ComponentSchema::from_json(&format!(
            r#"{{
                "slug": "test-section",
                "name": "Test section",
                "category": "{}",
                "settings": [
                    {{"id": "heading", "type": "text", "default": "Welcome"}},
                    {{"id": "divider", "type": "header"}},
                    {{"id": "background", "type": "color"}},
                    {{"id": "show_border", "type": "checkbox"}}
                ],
                "blocks": [
                    {{"type": "item", "name": "Item", "settings": [
                        {{"id": "label", "type": "text"}}
                    ]}}
                ]
            }}"#,
            category
        ))
        .unwrap()
    }

    #[test]
    fn test_deterministic() {
        let schema = schema("hero");
        let first = build_context(&schema, None);
        let second = build_context(&schema, None);
        assert_eq!(first.to_string(), second.to_string());
    }

    #[test]
    fn test_setting_defaults() {
        let context = build_context(&schema("hero"), None);
        let settings = &context["section"]["settings"];

        assert_eq!(settings["heading"], json!("Welcome"));
        assert_eq!(settings["background"], json!("#000000"));
        assert_eq!(settings["show_border"], json!(false));
        // Structural settings contribute no key at all.
        assert!(settings.get("divider").is_none());
    }

    #[test]
    fn test_synthesized_blocks() {
        let context = build_context(&schema("hero"), None);
        let blocks = context["section"]["blocks"].as_array().unwrap();

        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0]["type"], json!("item"));
        assert_eq!(blocks[0]["settings"]["label"], json!("Sample text goes here"));
    }

    #[test]
    fn test_preset_blocks_win() {
        let mut schema = schema("hero");
        schema.presets = vec![SchemaPreset {
            name: "Default".into(),
            blocks: Some(vec![
                crate::schema::PresetBlock {
                    kind: "item".into(),
                    settings: [("label".to_string(), json!("First"))].into_iter().collect(),
                },
                crate::schema::PresetBlock {
                    kind: "item".into(),
                    settings: Default::default(),
                },
            ]),
            settings: None,
        }];

        let context = build_context(&schema, None);
        let blocks = context["section"]["blocks"].as_array().unwrap();

        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0]["settings"]["label"], json!("First"));
        // Second block falls back to the block type's defaults.
        assert_eq!(blocks[1]["settings"]["label"], json!("Sample text goes here"));
    }

    #[test]
    fn test_category_entities() {
        let product = build_context(&schema("product"), None);
        assert!(product.get("product").is_some());
        assert!(product.get("collection").is_none());

        let collection = build_context(&schema("collection"), None);
        assert!(collection.get("collection").is_some());
        assert!(collection.get("collections").is_some());

        let hero = build_context(&schema("hero"), None);
        assert!(hero.get("product").is_none());

        let other = build_context(&schema("testimonials"), None);
        assert!(other.get("product").is_some());
        assert!(other.get("collection").is_some());
    }

    #[test]
    fn test_preset_overlay() {
        let preset = StylePreset {
            slug: "midnight".into(),
            colors: Some(PresetColors {
                primary: Some("#101018".into()),
                ..Default::default()
            }),
            ..Default::default()
        };

        let context = build_context(&schema("hero"), Some(&preset));
        let colors = &context["settings"]["colors"];

        assert_eq!(colors["primary"], json!("#101018"));
        // Fields the preset doesn't set keep the baseline.
        assert_eq!(colors["background"], json!("#ffffff"));
    }
}
