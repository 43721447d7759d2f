//! Storefront template engine.
//!
//! Compiles templates into programs and evaluates them against a context
//! of variables. Tags and filters are resolved through an explicit
//! [`Engine`] value, so two engines with different registrations can
//! coexist in one process.
//!
//! ```
//! use vitrine::template::{Context, Engine};
//!
//! let engine = Engine::storefront();
//! let template = engine.compile("<h1>{{ title | upcase }}</h1>").unwrap();
//!
//! let mut context = Context::new();
//! context.set("title", "hello").unwrap();
//!
//! assert_eq!(template.render(&context).unwrap(), "<h1>HELLO</h1>");
//! ```
pub mod context;
pub mod error;
pub mod language;
pub mod lexer;

pub use context::Context;
pub use error::Error;
pub use language::{Filter, Program, Tag};
pub use lexer::{ToValue, Token, TokenWithContext, Tokenize, Value};

use std::collections::HashMap;

/// Tag and filter registration tables.
///
/// The set of names is closed at construction time. A template that
/// references a tag or filter the engine doesn't know fails to compile,
/// it never degrades into silent passthrough at render time.
#[derive(Debug, Clone)]
pub struct Engine {
    tags: HashMap<String, Tag>,
    filters: HashMap<String, Filter>,
}

impl Engine {
    /// Engine with no tags or filters registered. Only the base
    /// grammar (prints, `if`, `for`) works.
    pub fn bare() -> Self {
        Self {
            tags: HashMap::new(),
            filters: HashMap::new(),
        }
    }

    /// Engine with the full storefront tag and filter set.
    pub fn storefront() -> Self {
        let mut engine = Self::bare();

        for (name, tag) in Tag::all() {
            engine.tags.insert(name.to_string(), tag.clone());
        }

        for (name, filter) in Filter::all() {
            engine.filters.insert(name.to_string(), filter.clone());
        }

        engine
    }

    /// Look up a tag by name.
    pub fn tag(&self, name: &str) -> Option<Tag> {
        self.tags.get(name).cloned()
    }

    /// Look up a filter by name.
    pub fn filter(&self, name: &str) -> Option<Filter> {
        self.filters.get(name).cloned()
    }

    /// Compile a template. Unknown tags and filters are reported here,
    /// with the line and column of the offending token.
    pub fn compile(&self, source: &str) -> Result<Template, Error> {
        Template::compile(source, self).map_err(|err| err.pretty(source))
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::storefront()
    }
}

/// Compiled template, ready to be rendered any number of times.
#[derive(Debug, Clone)]
pub struct Template {
    program: Program,
}

impl Template {
    /// Compile a template against the engine's registrations.
    pub fn compile(source: &str, engine: &Engine) -> Result<Self, Error> {
        Ok(Self {
            program: Program::from_str(source, engine)?,
        })
    }

    /// Evaluate the template against the context.
    pub fn render(&self, context: &Context) -> Result<String, Error> {
        self.program.evaluate(context)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_engine_registrations() {
        let engine = Engine::storefront();
        assert!(engine.tag("style").is_some());
        assert!(engine.tag("comment").is_none());
        assert!(engine.filter("money").is_some());
        assert!(engine.filter("handle").is_some());
        assert!(engine.filter("base64").is_none());
    }

    #[test]
    fn test_bare_engine_rejects_tags() {
        let engine = Engine::bare();
        let result = engine.compile("{% style %}body {}{% endstyle %}");
        assert!(matches!(result, Err(Error::UnknownTag(_))));
    }

    #[test]
    fn test_compile_and_render() {
        let engine = Engine::storefront();
        let template = engine
            .compile("{% for item in items %}<li>{{ item }}</li>{% endfor %}")
            .unwrap();

        let mut context = Context::new();
        context.set("items", vec!["a", "b"]).unwrap();

        assert_eq!(
            template.render(&context).unwrap(),
            "<li>a</li><li>b</li>"
        );
    }
}
