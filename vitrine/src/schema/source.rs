//! Read-only lookup of schemas, presets and stored templates.
use super::{ComponentSchema, StylePreset};

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;

/// Where component schemas, style presets and stored template sources
/// come from. Absence is a normal answer, not an error; backend
/// failures should be mapped to `None` by the implementation.
#[async_trait]
pub trait ContentSource: Send + Sync {
    /// Schema for the component, if the slug is known.
    async fn component_schema(&self, slug: &str) -> Option<ComponentSchema>;

    /// Style preset by slug.
    async fn style_preset(&self, slug: &str) -> Option<StylePreset>;

    /// Explicitly authored template source for the component. When this
    /// returns `None`, the render pipeline scaffolds one from the schema.
    async fn stored_template(&self, slug: &str) -> Option<String>;
}

/// In-memory content source. Used in tests and for previewing content
/// loaded from disk at startup.
#[derive(Debug, Clone, Default)]
pub struct MemoryContentSource {
    schemas: HashMap<String, ComponentSchema>,
    presets: HashMap<String, StylePreset>,
    templates: HashMap<String, String>,
}

impl MemoryContentSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schema(mut self, schema: ComponentSchema) -> Self {
        self.schemas.insert(schema.slug.clone(), schema);
        self
    }

    pub fn preset(mut self, preset: StylePreset) -> Self {
        self.presets.insert(preset.slug.clone(), preset);
        self
    }

    pub fn template(mut self, slug: &str, source: &str) -> Self {
        self.templates.insert(slug.to_string(), source.to_string());
        self
    }
}

#[async_trait]
impl ContentSource for MemoryContentSource {
    async fn component_schema(&self, slug: &str) -> Option<ComponentSchema> {
        self.schemas.get(slug).cloned()
    }

    async fn style_preset(&self, slug: &str) -> Option<StylePreset> {
        self.presets.get(slug).cloned()
    }

    async fn stored_template(&self, slug: &str) -> Option<String> {
        self.templates.get(slug).cloned()
    }
}

#[async_trait]
impl<T: ContentSource + ?Sized> ContentSource for Arc<T> {
    async fn component_schema(&self, slug: &str) -> Option<ComponentSchema> {
        (**self).component_schema(slug).await
    }

    async fn style_preset(&self, slug: &str) -> Option<StylePreset> {
        (**self).style_preset(slug).await
    }

    async fn stored_template(&self, slug: &str) -> Option<String> {
        (**self).stored_template(slug).await
    }
}
