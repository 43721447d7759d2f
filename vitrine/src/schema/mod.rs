//! Component schemas and style presets.
//!
//! A component schema is the declarative description of a themeable
//! storefront unit: which settings it exposes, which repeatable block
//! types it accepts, and any named presets shipped with it. Schemas are
//! read-only documents, this module never writes them back.
pub mod source;

pub use source::{ContentSource, MemoryContentSource};

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;

/// Component categories we know how to mock and scaffold.
///
/// Unrecognized category strings deserialize to [`Category::Other`], so
/// a new category in the content library degrades to generic handling
/// instead of failing the render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Hero,
    Product,
    Collection,
    Header,
    Footer,
    Text,
    Other,
}

impl Category {
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_lowercase().as_str() {
            "hero" | "banner" | "slideshow" => Category::Hero,
            "product" | "products" | "featured-product" => Category::Product,
            "collection" | "collections" | "featured-collection" => Category::Collection,
            "header" | "navigation" => Category::Header,
            "footer" => Category::Footer,
            "text" | "content" | "rich-text" => Category::Text,
            _ => Category::Other,
        }
    }

    fn other() -> Self {
        Category::Other
    }
}

impl<'de> Deserialize<'de> for Category {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Ok(Category::from_name(&name))
    }
}

/// A single configurable setting declared by a schema.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Setting {
    pub id: String,

    #[serde(rename = "type")]
    pub kind: String,

    #[serde(default)]
    pub label: Option<String>,

    #[serde(default)]
    pub default: Option<serde_json::Value>,

    #[serde(default)]
    pub info: Option<String>,
}

impl Setting {
    /// Structural settings only organize the editor sidebar. They carry
    /// no value and contribute no context key.
    pub fn structural(&self) -> bool {
        matches!(self.kind.as_str(), "header" | "paragraph")
    }
}

/// A repeatable block type declared by a schema.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlockType {
    #[serde(rename = "type")]
    pub kind: String,

    pub name: String,

    #[serde(default)]
    pub limit: Option<usize>,

    #[serde(default)]
    pub settings: Vec<Setting>,
}

/// A preset shipped inside the schema itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemaPreset {
    pub name: String,

    #[serde(default)]
    pub blocks: Option<Vec<PresetBlock>>,

    #[serde(default)]
    pub settings: Option<HashMap<String, serde_json::Value>>,
}

/// Block instance declared by a schema preset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PresetBlock {
    #[serde(rename = "type")]
    pub kind: String,

    #[serde(default)]
    pub settings: HashMap<String, serde_json::Value>,
}

/// Declarative description of a storefront component.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentSchema {
    pub slug: String,

    pub name: String,

    #[serde(default = "Category::other")]
    pub category: Category,

    #[serde(default)]
    pub settings: Vec<Setting>,

    #[serde(default)]
    pub blocks: Vec<BlockType>,

    #[serde(default, rename = "maxBlocks")]
    pub max_blocks: Option<usize>,

    #[serde(default)]
    pub presets: Vec<SchemaPreset>,
}

impl ComponentSchema {
    pub fn from_json(source: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(source)
    }

    /// Block type declaration by kind, if the schema has one.
    pub fn block_type(&self, kind: &str) -> Option<&BlockType> {
        self.blocks.iter().find(|block| block.kind == kind)
    }
}

/// Theme-wide style values applied during context generation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StylePreset {
    pub slug: String,

    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub colors: Option<PresetColors>,

    #[serde(default)]
    pub typography: Option<PresetTypography>,

    #[serde(default)]
    pub buttons: Option<PresetButtons>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PresetColors {
    #[serde(default)]
    pub primary: Option<String>,

    #[serde(default)]
    pub secondary: Option<String>,

    #[serde(default)]
    pub accent: Option<String>,

    #[serde(default)]
    pub background: Option<String>,

    #[serde(default)]
    pub background_secondary: Option<String>,

    #[serde(default)]
    pub text: Option<String>,

    #[serde(default)]
    pub text_secondary: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PresetTypography {
    #[serde(default)]
    pub heading_font: Option<String>,

    #[serde(default)]
    pub body_font: Option<String>,

    #[serde(default)]
    pub heading_scale: Option<f64>,

    #[serde(default)]
    pub body_scale: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PresetButtons {
    #[serde(default)]
    pub border_radius: Option<f64>,

    #[serde(default)]
    pub padding_vertical: Option<f64>,

    #[serde(default)]
    pub padding_horizontal: Option<f64>,
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_category_parsing() {
        assert_eq!(Category::from_name("hero"), Category::Hero);
        assert_eq!(Category::from_name("Featured-Product"), Category::Product);
        assert_eq!(Category::from_name("testimonials"), Category::Other);
    }

    #[test]
    fn test_schema_from_json() {
        let schema = ComponentSchema::from_json(
            r#"{
                "slug": "hero-banner",
                "name": "Hero banner",
                "category": "hero",
                "settings": [
                    {"id": "heading", "type": "text", "default": "Welcome"},
                    {"id": "layout", "type": "header"}
                ],
                "blocks": [
                    {"type": "slide", "name": "Slide", "settings": [
                        {"id": "caption", "type": "text"}
                    ]}
                ],
                "maxBlocks": 5,
                "presets": [{"name": "Default"}]
            }"#,
        )
        .unwrap();

        assert_eq!(schema.category, Category::Hero);
        assert_eq!(schema.settings.len(), 2);
        assert!(schema.settings[1].structural());
        assert_eq!(schema.max_blocks, Some(5));
        assert!(schema.block_type("slide").is_some());
        assert!(schema.block_type("quote").is_none());
    }
}
