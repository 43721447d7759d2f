//! Commonly used types, re-exported in one place.
//!
//! ```rust,ignore
//! use vitrine::prelude::*;
//! ```
pub use crate::cache::{CacheEntry, CacheStats, MemoryCache, RenderCache};
pub use crate::config::get_config;
pub use crate::logging::Logger;
pub use crate::mock;
pub use crate::pipeline::{BatchResult, RenderOptions, RenderResult, Renderer, MAX_BATCH};
pub use crate::schema::{Category, ComponentSchema, ContentSource, MemoryContentSource, StylePreset};
pub use crate::template::{Context, Engine, Template, ToValue, Value};
pub use crate::Error;

pub use async_trait::async_trait;
pub use time::{Duration, OffsetDateTime};
