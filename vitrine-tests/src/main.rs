//! End-to-end checks for the whole rendering pipeline, run against the
//! in-memory content source and cache backends.
use vitrine::cache;
use vitrine::prelude::*;

use serde_json::json;
use std::collections::HashMap;

/// Cache backend where every read and write fails.
#[derive(Clone, Default)]
struct BrokenCache;

#[async_trait]
impl RenderCache for BrokenCache {
    async fn get(&self, _key: &str) -> Result<Option<CacheEntry>, cache::Error> {
        Err(cache::Error::Backend("connection refused".into()))
    }

    async fn put(&self, _entry: CacheEntry) -> Result<(), cache::Error> {
        Err(cache::Error::Backend("connection refused".into()))
    }

    async fn invalidate_component(&self, _slug: &str) -> Result<usize, cache::Error> {
        Err(cache::Error::Backend("connection refused".into()))
    }

    async fn invalidate_preset(&self, _slug: &str) -> Result<usize, cache::Error> {
        Err(cache::Error::Backend("connection refused".into()))
    }

    async fn sweep_expired(&self) -> Result<usize, cache::Error> {
        Err(cache::Error::Backend("connection refused".into()))
    }

    async fn stats(&self) -> Result<CacheStats, cache::Error> {
        Err(cache::Error::Backend("connection refused".into()))
    }
}

fn schema(json: &str) -> ComponentSchema {
    ComponentSchema::from_json(json).expect("schema fixture")
}

fn content() -> MemoryContentSource {
    let hero = schema(
        r#"{
            "slug": "hero-banner",
            "name": "Hero banner",
            "category": "hero",
            "settings": [
                {"id": "heading", "type": "text", "default": "Welcome to the shop"},
                {"id": "subheading", "type": "text"}
            ],
            "blocks": []
        }"#,
    );

    let footer = schema(
        r#"{
            "slug": "site-footer",
            "name": "Footer",
            "category": "footer",
            "settings": []
        }"#,
    );

    let product = schema(
        r#"{
            "slug": "product-card",
            "name": "Product card",
            "category": "product",
            "settings": []
        }"#,
    );

    let collection = schema(
        r#"{
            "slug": "featured-collection",
            "name": "Featured collection",
            "category": "collection",
            "settings": []
        }"#,
    );

    let rich_text = schema(
        r#"{
            "slug": "rich-text",
            "name": "Rich text",
            "category": "text",
            "settings": [
                {"id": "content", "type": "richtext", "default": "<p>Hello</p>"}
            ]
        }"#,
    );

    let broken = schema(
        r#"{
            "slug": "broken-section",
            "name": "Broken",
            "category": "text",
            "settings": []
        }"#,
    );

    let preset: StylePreset = serde_json::from_value(json!({
        "slug": "midnight",
        "colors": {"primary": "#101018", "background": "#0a0a0a"}
    }))
    .expect("preset fixture");

    MemoryContentSource::new()
        .schema(hero)
        .schema(footer)
        .schema(product)
        .schema(collection)
        .schema(rich_text)
        .schema(broken)
        .preset(preset)
        .template(
            "rich-text",
            r#"<div style="color: {{ settings.colors.primary }}">{{ section.settings.content }}</div>"#,
        )
        .template("broken-section", "{{ this_variable_is_not_defined }}")
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    Logger::init();

    let source = content();
    let cache = MemoryCache::new();
    let renderer = Renderer::new(source.clone(), cache.clone());

    // Filter value contracts, straight through the engine.
    let engine = Engine::storefront();
    let template = engine.compile(
        r#"{{ 299 | money }} {{ 300 | money }} {{ 300 | money_without_trailing_zeros }} {{ 350 | money_without_trailing_zeros }} {{ "Hello, World!" | handleize }}"#,
    )?;
    assert_eq!(
        template.render(&Context::new())?,
        "$2.99 $3.00 $3 $3.50 hello-world"
    );

    // Mock contexts are deterministic.
    let hero_schema = source.component_schema("hero-banner").await.unwrap();
    let first = mock::build_context(&hero_schema, None);
    let second = mock::build_context(&hero_schema, None);
    assert_eq!(first.to_string(), second.to_string());

    // First render misses, second render is served from the cache.
    let options = RenderOptions::default();
    let first = renderer.render("hero-banner", &options).await;
    assert!(first.ok(), "hero render failed: {:?}", first.errors);
    assert!(!first.cached);
    assert!(first.html.contains("Welcome to the shop"));
    assert!(!first.css.is_empty());

    let second = renderer.render("hero-banner", &options).await;
    assert!(second.cached);
    assert_eq!(first.html, second.html);

    // skip_cache bypasses both lookup and write.
    let skipped = renderer
        .render("site-footer", &RenderOptions::default().skip_cache())
        .await;
    assert!(skipped.ok());
    assert!(!skipped.cached);
    let again = renderer
        .render("site-footer", &RenderOptions::default().skip_cache())
        .await;
    assert!(!again.cached);

    // Overrides change the output and address a different cache entry.
    let overridden = renderer
        .render(
            "hero-banner",
            &RenderOptions::default().override_setting("heading", json!("Flash sale")),
        )
        .await;
    assert!(overridden.ok());
    assert!(!overridden.cached);
    assert!(overridden.html.contains("Flash sale"));

    // Style presets flow into theme settings.
    let styled = renderer
        .render("rich-text", &RenderOptions::default().preset("midnight"))
        .await;
    assert!(styled.ok());
    assert!(styled.html.contains("#101018"));
    assert!(styled.html.contains("<p>Hello</p>"));

    // A render-time error is contained in the result and never cached.
    let broken = renderer.render("broken-section", &options).await;
    assert_eq!(broken.errors.len(), 1);
    assert!(!broken.cached);
    assert!(broken.html.contains("render-error"));

    let broken_again = renderer.render("broken-section", &options).await;
    assert_eq!(broken_again.errors.len(), 1);
    assert!(!broken_again.cached, "failed render was served from cache");

    // A failing cache backend degrades gracefully: a read failure is a
    // miss, a write failure leaves the result uncached. The render
    // itself still succeeds both times.
    let degraded = Renderer::new(content(), BrokenCache);
    let first = degraded.render("hero-banner", &options).await;
    assert!(first.ok(), "render failed on cache read error: {:?}", first.errors);
    assert!(!first.cached);
    assert!(first.html.contains("Welcome to the shop"));

    let second = degraded.render("hero-banner", &options).await;
    assert!(second.ok(), "render failed on cache write error: {:?}", second.errors);
    assert!(!second.cached, "a failed write must not produce a later hit");

    // An unknown component reports itself the same way.
    let missing = renderer.render("no-such-section", &options).await;
    assert_eq!(missing.errors, vec!["component \"no-such-section\" not found"]);
    assert!(!missing.cached);

    // Batch: one missing slug yields one error result, the rest succeed.
    let slugs = [
        "hero-banner",
        "site-footer",
        "no-such-section",
        "product-card",
        "featured-collection",
    ]
    .iter()
    .map(|slug| slug.to_string())
    .collect::<Vec<_>>();

    let batch = renderer.render_batch(&slugs, None).await?;
    assert_eq!(batch.results.len(), 5);
    assert_eq!(batch.succeeded, 4);
    assert_eq!(batch.failed, 1);
    assert!(batch.cached >= 1, "hero-banner should have been cached");
    assert!(!batch.results["no-such-section"].ok());
    assert!(batch.results["product-card"].html.contains("$19.99"));

    // Oversized batches are rejected before any rendering starts.
    let oversized = vec!["hero-banner".to_string(); MAX_BATCH + 1];
    match renderer.render_batch(&oversized, None).await {
        Err(Error::BatchSizeExceeded { size, max }) => {
            assert_eq!(size, MAX_BATCH + 1);
            assert_eq!(max, MAX_BATCH);
        }
        other => panic!("expected BatchSizeExceeded, got {:?}", other.map(|b| b.results.len())),
    }

    // Invalidation by component leaves other components alone.
    let removed = cache.invalidate_component("hero-banner").await?;
    assert!(removed >= 1);
    let hero = renderer.render("hero-banner", &options).await;
    assert!(!hero.cached);
    let footer = renderer.render("site-footer", &options).await;
    assert!(footer.cached, "footer entry should have survived");

    // An entry written with an expired TTL is never served. Use a key
    // nothing above has cached yet.
    let stale_renderer = renderer.clone().ttl(Duration::minutes(-1));
    let first = stale_renderer.render("rich-text", &options).await;
    assert!(first.ok());
    assert!(!first.cached);
    let second = stale_renderer.render("rich-text", &options).await;
    assert!(!second.cached);

    let stats = cache.stats().await?;
    assert!(stats.total >= 1);
    assert!(stats.expired >= 1);

    let swept = cache.sweep_expired().await?;
    assert!(swept >= 1);
    assert_eq!(cache.stats().await?.expired, 0);

    println!("all checks passed");

    Ok(())
}
