//! Render pipeline.
//!
//! Orchestrates one preview render end to end: cache lookup, schema
//! load, template resolution (stored or scaffolded), mock context
//! assembly, rendering, companion stylesheet, cache write. Every
//! failure along the way is contained to the render's own result;
//! nothing here propagates past a single render or batch item.
pub mod fallback;

use crate::cache::{CacheEntry, RenderCache};
use crate::config::get_config;
use crate::mock;
use crate::schema::ContentSource;
use crate::template::{Context, Engine};
use crate::Error;

use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use time::Duration;
use tracing::{debug, warn};

/// Hard cap on batch size. Larger batches are rejected before any
/// rendering starts.
pub const MAX_BATCH: usize = 20;

/// Options for a single render.
#[derive(Debug, Clone, Default)]
pub struct RenderOptions {
    /// Style preset slug to apply to theme settings.
    pub preset: Option<String>,

    /// Section setting overrides, merged over the mock defaults.
    pub overrides: HashMap<String, Value>,

    /// Bypass the cache for both lookup and write.
    pub skip_cache: bool,
}

impl RenderOptions {
    pub fn preset(mut self, slug: &str) -> Self {
        self.preset = Some(slug.to_string());
        self
    }

    pub fn override_setting(mut self, id: &str, value: Value) -> Self {
        self.overrides.insert(id.to_string(), value);
        self
    }

    pub fn skip_cache(mut self) -> Self {
        self.skip_cache = true;
        self
    }
}

/// Outcome of a single render. Errors are carried inside the result,
/// the render call itself never fails.
#[derive(Debug, Clone)]
pub struct RenderResult {
    pub html: String,
    pub css: String,
    pub errors: Vec<String>,
    pub render_time_ms: u64,
    pub cached: bool,
}

impl RenderResult {
    pub fn ok(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Outcome of a batch render, keyed by slug. A slug missing from
/// `results` was not rendered.
#[derive(Debug, Default)]
pub struct BatchResult {
    pub results: HashMap<String, RenderResult>,
    pub succeeded: usize,
    pub failed: usize,
    pub cached: usize,
}

/// The renderer. Cheap to clone, all fields are shared.
#[derive(Clone)]
pub struct Renderer {
    source: Arc<dyn ContentSource>,
    cache: Arc<dyn RenderCache>,
    engine: Arc<Engine>,
    ttl: Duration,
}

impl Renderer {
    pub fn new(
        source: impl ContentSource + 'static,
        cache: impl RenderCache + 'static,
    ) -> Self {
        Self {
            source: Arc::new(source),
            cache: Arc::new(cache),
            engine: Arc::new(Engine::storefront()),
            ttl: get_config().cache.ttl,
        }
    }

    /// Override the cache TTL for entries this renderer writes.
    pub fn ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Render one component.
    pub async fn render(&self, slug: &str, options: &RenderOptions) -> RenderResult {
        let started = Instant::now();
        let key = cache_key(slug, options.preset.as_deref(), &options.overrides);
        let skip_cache = options.skip_cache || !get_config().cache.enabled;

        if !skip_cache {
            match self.cache.get(&key).await {
                Ok(Some(entry)) => {
                    debug!("cache hit for \"{}\"", slug);

                    return RenderResult {
                        html: entry.html,
                        css: entry.css,
                        errors: vec![],
                        render_time_ms: entry.render_time_ms,
                        cached: true,
                    };
                }

                Ok(None) => (),

                Err(err) => {
                    warn!("cache read failed, rendering uncached: {}", err);
                }
            }
        }

        let schema = match self.source.component_schema(slug).await {
            Some(schema) => schema,
            None => {
                return error_result(
                    Error::SchemaNotFound(slug.to_string()).to_string(),
                    started,
                );
            }
        };

        // A named preset that doesn't exist is not an error, the render
        // falls back to baseline theme settings.
        let preset = match &options.preset {
            Some(preset_slug) => self.source.style_preset(preset_slug).await,
            None => None,
        };

        let template_source = match self.source.stored_template(slug).await {
            Some(source) => source,
            None => fallback::template(&schema),
        };

        let mut context_json = mock::build_context(&schema, preset.as_ref());
        merge_overrides(&mut context_json, &options.overrides);

        let css = fallback::stylesheet(schema.category);
        let mut errors = vec![];

        let html = match self.render_template(&template_source, context_json) {
            Ok(html) => html,
            Err(err) => {
                let message = err.to_string();
                errors.push(message.clone());
                error_marker(&message)
            }
        };

        let render_time_ms = started.elapsed().as_millis() as u64;

        if errors.is_empty() && !skip_cache {
            let entry = CacheEntry::new(
                &key,
                slug,
                options.preset.clone(),
                &html,
                &css,
                render_time_ms,
                self.ttl,
            );

            if let Err(err) = self.cache.put(entry).await {
                warn!("cache write failed, result not cached: {}", err);
            }
        }

        RenderResult {
            html,
            css,
            errors,
            render_time_ms,
            cached: false,
        }
    }

    fn render_template(
        &self,
        source: &str,
        context_json: Value,
    ) -> Result<String, crate::template::Error> {
        let context = Context::try_from(context_json)?;
        let template = self.engine.compile(source)?;
        template.render(&context)
    }

    /// Render up to [`MAX_BATCH`] components concurrently. One slug's
    /// failure never affects another's result.
    pub async fn render_batch(
        &self,
        slugs: &[String],
        preset: Option<String>,
    ) -> Result<BatchResult, Error> {
        if slugs.len() > MAX_BATCH {
            return Err(Error::BatchSizeExceeded {
                size: slugs.len(),
                max: MAX_BATCH,
            });
        }

        let mut handles = vec![];

        // Second bound, in case the caller-level check is bypassed.
        for slug in slugs.iter().take(MAX_BATCH) {
            let renderer = self.clone();
            let slug = slug.clone();
            let options = RenderOptions {
                preset: preset.clone(),
                ..Default::default()
            };

            handles.push(tokio::spawn(async move {
                let result = renderer.render(&slug, &options).await;
                (slug, result)
            }));
        }

        let mut batch = BatchResult::default();

        for handle in handles {
            match handle.await {
                Ok((slug, result)) => {
                    if result.cached {
                        batch.cached += 1;
                    }

                    if result.ok() {
                        batch.succeeded += 1;
                    } else {
                        batch.failed += 1;
                    }

                    batch.results.insert(slug, result);
                }

                // A panicked task leaves its slug out of the results.
                Err(err) => {
                    warn!("batch render task failed: {}", err);
                }
            }
        }

        Ok(batch)
    }
}

/// Deterministic cache key for a render request.
///
/// Overrides are fingerprinted with 64-bit FNV-1a over their canonical
/// encoding (keys sorted, values in JSON form), so insertion order
/// doesn't matter and any value change produces a new key.
pub fn cache_key(slug: &str, preset: Option<&str>, overrides: &HashMap<String, Value>) -> String {
    let mut key = slug.to_string();

    if let Some(preset) = preset {
        key.push(':');
        key.push_str(preset);
    }

    if !overrides.is_empty() {
        key.push(':');
        key.push_str(&format!("{:016x}", fingerprint(overrides)));
    }

    key
}

fn fingerprint(overrides: &HashMap<String, Value>) -> u64 {
    let mut keys = overrides.keys().collect::<Vec<_>>();
    keys.sort();

    let mut canonical = String::new();
    for key in keys {
        canonical.push_str(key);
        canonical.push('=');
        canonical.push_str(&overrides[key].to_string());
        canonical.push(';');
    }

    fnv1a(canonical.as_bytes())
}

fn fnv1a(bytes: &[u8]) -> u64 {
    const OFFSET_BASIS: u64 = 0xcbf29ce484222325;
    const PRIME: u64 = 0x100000001b3;

    bytes.iter().fold(OFFSET_BASIS, |hash, byte| {
        (hash ^ *byte as u64).wrapping_mul(PRIME)
    })
}

fn error_marker(message: &str) -> String {
    format!(
        "<div class=\"render-error\">{}</div>",
        crate::escape_html(message)
    )
}

fn error_result(message: String, started: Instant) -> RenderResult {
    RenderResult {
        html: error_marker(&message),
        css: String::new(),
        errors: vec![message],
        render_time_ms: started.elapsed().as_millis() as u64,
        cached: false,
    }
}

/// Shallow-merge overrides into the context's section settings,
/// override values winning.
fn merge_overrides(context: &mut Value, overrides: &HashMap<String, Value>) {
    if overrides.is_empty() {
        return;
    }

    if let Some(settings) = context
        .get_mut("section")
        .and_then(|section| section.get_mut("settings"))
        .and_then(|settings| settings.as_object_mut())
    {
        for (id, value) in overrides {
            settings.insert(id.clone(), value.clone());
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_cache_key_order_independent() {
        let mut first = HashMap::new();
        first.insert("heading".to_string(), json!("Sale"));
        first.insert("show_border".to_string(), json!(true));

        let mut second = HashMap::new();
        second.insert("show_border".to_string(), json!(true));
        second.insert("heading".to_string(), json!("Sale"));

        assert_eq!(
            cache_key("hero-banner", Some("midnight"), &first),
            cache_key("hero-banner", Some("midnight"), &second),
        );
    }

    #[test]
    fn test_cache_key_changes_with_values() {
        let mut overrides = HashMap::new();
        overrides.insert("heading".to_string(), json!("Sale"));
        let first = cache_key("hero-banner", None, &overrides);

        overrides.insert("heading".to_string(), json!("Sale!"));
        let second = cache_key("hero-banner", None, &overrides);

        assert_ne!(first, second);
    }

    #[test]
    fn test_cache_key_without_overrides_is_readable() {
        assert_eq!(cache_key("hero-banner", None, &HashMap::new()), "hero-banner");
        assert_eq!(
            cache_key("hero-banner", Some("midnight"), &HashMap::new()),
            "hero-banner:midnight"
        );
    }

    #[test]
    fn test_merge_overrides_wins() {
        let mut context = json!({
            "section": {"settings": {"heading": "Default", "color": "#000000"}}
        });

        let mut overrides = HashMap::new();
        overrides.insert("heading".to_string(), json!("Custom"));
        merge_overrides(&mut context, &overrides);

        assert_eq!(context["section"]["settings"]["heading"], json!("Custom"));
        assert_eq!(context["section"]["settings"]["color"], json!("#000000"));
    }
}
