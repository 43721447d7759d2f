//! Vitrine renders storefront section previews. A section is described by a
//! declarative JSON schema (settings, repeatable blocks, presets); Vitrine
//! fabricates a complete mock rendering context from that schema, evaluates a
//! storefront template against it, and caches the rendered output with a TTL.
//!
//! The crate is a library invoked by request-handling code. The three moving
//! parts are:
//!
//! * [`template`]: a small template language (`{{ expr }}` / `{% tag %}`)
//!   extended with a closed set of storefront tags and filters, owned by an
//!   explicit [`template::Engine`] value.
//! * [`mock`]: a deterministic, I/O-free generator that turns a
//!   [`schema::ComponentSchema`] and an optional style preset into a full
//!   render context.
//! * [`pipeline`]: the orchestrator, covering cache lookup, schema loading,
//!   template resolution (stored or generated), rendering, and cache writes.
//!
//! ```rust
//! use vitrine::prelude::*;
//! use std::sync::Arc;
//!
//! # #[tokio::main]
//! # async fn main() {
//! let source = Arc::new(MemoryContentSource::new());
//! let cache = Arc::new(MemoryCache::new());
//! let renderer = Renderer::new(source, cache);
//!
//! let result = renderer.render("hero-banner", &RenderOptions::default()).await;
//! # }
//! ```
pub mod cache;
pub mod config;
pub mod error;
pub mod logging;
pub mod mock;
pub mod pipeline;
pub mod prelude;
pub mod schema;
pub mod template;

pub use error::Error;

/// Wrapper around async traits to make them easy to use.
pub use async_trait::async_trait;
/// Serde is used for (de)serialization.
pub use serde;
/// Tokio is an asynchronous runtime for Rust.
pub use tokio;

/// Convert the first letter of the string to uppercase lettering.
pub fn capitalize(string: &str) -> String {
    let mut iter = string.chars();
    match iter.next() {
        None => String::new(),
        Some(letter) => letter.to_uppercase().chain(iter).collect(),
    }
}

/// Escape characters that have special meaning inside HTML text
/// and attribute values.
pub fn escape_html(string: &str) -> String {
    let mut result = String::with_capacity(string.len());

    for c in string.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            '\'' => result.push_str("&#39;"),
            c => result.push(c),
        }
    }

    result
}

/// Convert a string to a URL-safe handle: lowercase, runs of
/// non-alphanumeric characters collapsed into a single hyphen.
pub fn handleize(string: &str) -> String {
    let mut result = String::with_capacity(string.len());
    let mut hyphen = false;

    for c in string.chars() {
        if c.is_alphanumeric() {
            for c in c.to_lowercase() {
                result.push(c);
            }
            hyphen = false;
        } else if !hyphen && !result.is_empty() {
            result.push('-');
            hyphen = true;
        }
    }

    if result.ends_with('-') {
        result.pop();
    }

    result
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_handleize() {
        assert_eq!(handleize("Hello, World!"), "hello-world");
        assert_eq!(handleize("  Featured   Products  "), "featured-products");
        assert_eq!(handleize("CAFÉ au lait"), "café-au-lait");
        assert_eq!(handleize("---"), "");
        assert_eq!(handleize(""), "");
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<a href="x">&'"#),
            "&lt;a href=&quot;x&quot;&gt;&amp;&#39;"
        );
    }

    #[test]
    fn test_capitalize() {
        assert_eq!(capitalize("hello"), "Hello");
        assert_eq!(capitalize(""), "");
    }
}
