//! Render-result cache.
//!
//! Stores finished renders under content-addressed keys, with TTL
//! expiry and targeted invalidation by component or preset. The cache
//! is advisory: the pipeline treats every backend failure as a miss and
//! never lets a failed write fail the render.
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use time::{Duration, OffsetDateTime};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("cache backend error: {0}")]
    Backend(String),
}

/// One cached render.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// Content fingerprint addressing this entry.
    pub key: String,

    /// Component slug, for targeted invalidation.
    pub component: String,

    /// Preset slug, if the render used one.
    pub preset: Option<String>,

    pub html: String,
    pub css: String,
    pub render_time_ms: u64,

    pub created_at: OffsetDateTime,
    pub expires_at: OffsetDateTime,
}

impl CacheEntry {
    pub fn new(
        key: impl ToString,
        component: impl ToString,
        preset: Option<String>,
        html: impl ToString,
        css: impl ToString,
        render_time_ms: u64,
        ttl: Duration,
    ) -> Self {
        let created_at = OffsetDateTime::now_utc();

        Self {
            key: key.to_string(),
            component: component.to_string(),
            preset,
            html: html.to_string(),
            css: css.to_string(),
            render_time_ms,
            created_at,
            expires_at: created_at + ttl,
        }
    }

    pub fn expired(&self) -> bool {
        self.expires_at <= OffsetDateTime::now_utc()
    }

    fn approx_size(&self) -> usize {
        self.key.len() + self.component.len() + self.html.len() + self.css.len()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CacheStats {
    pub total: usize,
    pub expired: usize,
    pub approx_size_kb: usize,
}

/// Cache backend interface.
///
/// Implementations must treat an entry past its `expires_at` as absent
/// on `get`, even before a sweep removes it. `put` is an upsert keyed
/// on the entry's fingerprint.
#[async_trait]
pub trait RenderCache: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<CacheEntry>, Error>;

    async fn put(&self, entry: CacheEntry) -> Result<(), Error>;

    /// Remove every entry rendered for the component. Returns how many
    /// entries were removed.
    async fn invalidate_component(&self, slug: &str) -> Result<usize, Error>;

    /// Remove every entry rendered with the preset.
    async fn invalidate_preset(&self, slug: &str) -> Result<usize, Error>;

    /// Drop expired entries. Returns how many were dropped.
    async fn sweep_expired(&self) -> Result<usize, Error>;

    async fn stats(&self) -> Result<CacheStats, Error>;
}

#[async_trait]
impl<T: RenderCache + ?Sized> RenderCache for Arc<T> {
    async fn get(&self, key: &str) -> Result<Option<CacheEntry>, Error> {
        (**self).get(key).await
    }

    async fn put(&self, entry: CacheEntry) -> Result<(), Error> {
        (**self).put(entry).await
    }

    async fn invalidate_component(&self, slug: &str) -> Result<usize, Error> {
        (**self).invalidate_component(slug).await
    }

    async fn invalidate_preset(&self, slug: &str) -> Result<usize, Error> {
        (**self).invalidate_preset(slug).await
    }

    async fn sweep_expired(&self) -> Result<usize, Error> {
        (**self).sweep_expired().await
    }

    async fn stats(&self) -> Result<CacheStats, Error> {
        (**self).stats().await
    }
}

/// In-memory cache backend. Point operations take the lock briefly and
/// never hold it across an await.
#[derive(Debug, Clone, Default)]
pub struct MemoryCache {
    entries: Arc<Mutex<HashMap<String, CacheEntry>>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RenderCache for MemoryCache {
    async fn get(&self, key: &str) -> Result<Option<CacheEntry>, Error> {
        let entries = self.entries.lock();

        match entries.get(key) {
            Some(entry) if !entry.expired() => Ok(Some(entry.clone())),
            _ => Ok(None),
        }
    }

    async fn put(&self, entry: CacheEntry) -> Result<(), Error> {
        self.entries.lock().insert(entry.key.clone(), entry);
        Ok(())
    }

    async fn invalidate_component(&self, slug: &str) -> Result<usize, Error> {
        let mut entries = self.entries.lock();
        let before = entries.len();
        entries.retain(|_, entry| entry.component != slug);
        Ok(before - entries.len())
    }

    async fn invalidate_preset(&self, slug: &str) -> Result<usize, Error> {
        let mut entries = self.entries.lock();
        let before = entries.len();
        entries.retain(|_, entry| entry.preset.as_deref() != Some(slug));
        Ok(before - entries.len())
    }

    async fn sweep_expired(&self) -> Result<usize, Error> {
        let mut entries = self.entries.lock();
        let before = entries.len();
        entries.retain(|_, entry| !entry.expired());
        Ok(before - entries.len())
    }

    async fn stats(&self) -> Result<CacheStats, Error> {
        let entries = self.entries.lock();
        let expired = entries.values().filter(|entry| entry.expired()).count();
        let bytes = entries.values().map(|entry| entry.approx_size()).sum::<usize>();

        Ok(CacheStats {
            total: entries.len(),
            expired,
            approx_size_kb: bytes / 1024,
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn entry(key: &str, component: &str, preset: Option<&str>, ttl: Duration) -> CacheEntry {
        CacheEntry::new(
            key,
            component,
            preset.map(|s| s.to_string()),
            "<div></div>",
            "",
            5,
            ttl,
        )
    }

    #[tokio::test]
    async fn test_get_put() {
        let cache = MemoryCache::new();
        cache
            .put(entry("a", "hero-banner", None, Duration::minutes(60)))
            .await
            .unwrap();

        assert!(cache.get("a").await.unwrap().is_some());
        assert!(cache.get("b").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_expired_is_absent_before_sweep() {
        let cache = MemoryCache::new();
        cache
            .put(entry("a", "hero-banner", None, Duration::minutes(-1)))
            .await
            .unwrap();

        assert!(cache.get("a").await.unwrap().is_none());
        assert_eq!(cache.stats().await.unwrap().total, 1);
        assert_eq!(cache.sweep_expired().await.unwrap(), 1);
        assert_eq!(cache.stats().await.unwrap().total, 0);
    }

    #[tokio::test]
    async fn test_targeted_invalidation() {
        let cache = MemoryCache::new();
        let ttl = Duration::minutes(60);

        cache
            .put(entry("a", "hero-banner", Some("midnight"), ttl))
            .await
            .unwrap();
        cache
            .put(entry("b", "hero-banner", None, ttl))
            .await
            .unwrap();
        cache
            .put(entry("c", "footer", Some("midnight"), ttl))
            .await
            .unwrap();

        assert_eq!(cache.invalidate_component("hero-banner").await.unwrap(), 2);
        // Entries for other components survive, even ones sharing the preset.
        assert!(cache.get("c").await.unwrap().is_some());

        assert_eq!(cache.invalidate_preset("midnight").await.unwrap(), 1);
        assert!(cache.get("c").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_put_is_upsert() {
        let cache = MemoryCache::new();
        let ttl = Duration::minutes(60);

        cache.put(entry("a", "hero-banner", None, ttl)).await.unwrap();

        let mut replacement = entry("a", "hero-banner", None, ttl);
        replacement.html = "<p>new</p>".into();
        cache.put(replacement).await.unwrap();

        let stored = cache.get("a").await.unwrap().unwrap();
        assert_eq!(stored.html, "<p>new</p>");
        assert_eq!(cache.stats().await.unwrap().total, 1);
    }
}
