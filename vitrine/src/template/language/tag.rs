//! Storefront control tags: the closed set of domain tags registered on the
//! engine, layered on top of the base template grammar.
//!
//! Tag dispatch is ahead-of-time: the parser resolves tag names against the
//! engine's registration table, so a template using an unregistered tag
//! fails to compile instead of silently no-op-ing at render time.
use super::super::lexer::{Token, TokenWithContext, Value};
use super::super::{Context, Engine, Error};
use super::Statement;

use std::iter::{Iterator, Peekable};

/// A registered storefront tag.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Tag {
    /// `{% schema %} ... {% endschema %}`: metadata, parsed and discarded.
    Schema,
    /// `{% style %} ... {% endstyle %}`: wraps rendered body in a style block.
    Style,
    /// `{% javascript %} ... {% endjavascript %}`: wraps rendered body in a script block.
    Javascript,
    /// `{% render "snippet" %}`: placeholder comment; fragments are not resolved.
    Render,
    /// `{% section "name" %}`: placeholder comment.
    Section,
    /// `{% sections "group" %}`: placeholder comment.
    Sections,
    /// `{% form "type" %} ... {% endform %}`: wraps rendered body in a form element.
    Form,
    /// `{% paginate ... %} ... {% endpaginate %}`: transparent, renders body only.
    Paginate,
    /// `{% layout ... %}`: no-op, emits nothing.
    Layout,
}

impl Tag {
    /// All tags, with the names templates use to invoke them.
    pub fn all() -> &'static [(&'static str, Tag)] {
        &[
            ("schema", Tag::Schema),
            ("style", Tag::Style),
            ("javascript", Tag::Javascript),
            ("render", Tag::Render),
            ("section", Tag::Section),
            ("sections", Tag::Sections),
            ("form", Tag::Form),
            ("paginate", Tag::Paginate),
            ("layout", Tag::Layout),
        ]
    }

    /// The name the tag's terminator closes, e.g. `endform` closes `form`.
    fn name(&self) -> &'static str {
        match self {
            Tag::Schema => "schema",
            Tag::Style => "style",
            Tag::Javascript => "javascript",
            Tag::Render => "render",
            Tag::Section => "section",
            Tag::Sections => "sections",
            Tag::Form => "form",
            Tag::Paginate => "paginate",
            Tag::Layout => "layout",
        }
    }

    /// Parse the tag's arguments and body. The opening tag name has already
    /// been consumed; the iterator is positioned right after it.
    pub fn parse(
        &self,
        iter: &mut Peekable<impl Iterator<Item = TokenWithContext>>,
        engine: &Engine,
    ) -> Result<TagStatement, Error> {
        Ok(match self {
            Tag::Style => TagStatement::Style(self.body(iter, engine)?),
            Tag::Javascript => TagStatement::Javascript(self.body(iter, engine)?),
            Tag::Paginate => {
                // Pagination arguments aren't modeled; skip them.
                skip_to_block_end(iter)?;
                TagStatement::Paginate(self.parse_statements(iter, engine)?)
            }

            Tag::Render => TagStatement::Render(self.string_argument(iter)?),
            Tag::Section => TagStatement::Section(self.string_argument(iter)?),
            Tag::Sections => TagStatement::Sections(self.string_argument(iter)?),

            Tag::Form => {
                let kind = match iter.next().ok_or(Error::Eof("form type"))?.token() {
                    Token::Value(Value::String(kind)) => kind,
                    Token::Variable(kind) => kind,
                    _ => return Err(Error::Runtime("form requires a type argument".into())),
                };

                // Extra arguments, e.g. the product the form posts for,
                // aren't modeled.
                skip_to_block_end(iter)?;

                TagStatement::Form {
                    kind,
                    body: self.parse_statements(iter, engine)?,
                }
            }

            Tag::Layout => {
                skip_to_block_end(iter)?;
                TagStatement::Layout
            }

            // The lexer strips schema bodies before they reach the parser;
            // an empty `{% schema %}{% endschema %}` still parses cleanly.
            Tag::Schema => {
                skip_to_block_end(iter)?;
                let _ = self.parse_statements(iter, engine)?;
                TagStatement::Schema
            }
        })
    }

    // `{% tag %}body{% endtag %}`
    fn body(
        &self,
        iter: &mut Peekable<impl Iterator<Item = TokenWithContext>>,
        engine: &Engine,
    ) -> Result<Vec<Statement>, Error> {
        skip_to_block_end(iter)?;
        self.parse_statements(iter, engine)
    }

    fn parse_statements(
        &self,
        iter: &mut Peekable<impl Iterator<Item = TokenWithContext>>,
        engine: &Engine,
    ) -> Result<Vec<Statement>, Error> {
        let mut body = vec![];

        loop {
            match Statement::parse(iter, engine)? {
                Statement::End(name) if name == self.name() => break,
                Statement::End(_) => return Err(Error::UnterminatedTag(self.name().into())),
                statement => body.push(statement),
            }
        }

        Ok(body)
    }

    // `{% tag "argument" %}`
    fn string_argument(
        &self,
        iter: &mut Peekable<impl Iterator<Item = TokenWithContext>>,
    ) -> Result<String, Error> {
        let next = iter.next().ok_or(Error::Eof("tag argument"))?;
        let name = match next.token() {
            Token::Value(Value::String(name)) => name,
            _ => return Err(Error::Expected("a quoted string argument", next)),
        };

        skip_to_block_end(iter)?;

        Ok(name)
    }
}

fn skip_to_block_end(
    iter: &mut Peekable<impl Iterator<Item = TokenWithContext>>,
) -> Result<(), Error> {
    while let Some(token) = iter.next() {
        if token.token() == Token::BlockEnd {
            return Ok(());
        }
    }

    Err(Error::Eof("block end"))
}

/// A parsed storefront tag, ready to evaluate.
#[derive(Debug, Clone)]
pub enum TagStatement {
    Schema,
    Style(Vec<Statement>),
    Javascript(Vec<Statement>),
    Render(String),
    Section(String),
    Sections(String),
    Form { kind: String, body: Vec<Statement> },
    Paginate(Vec<Statement>),
    Layout,
}

impl TagStatement {
    pub fn evaluate(&self, context: &Context) -> Result<String, Error> {
        Ok(match self {
            // Schema content is metadata, never output.
            TagStatement::Schema => String::new(),

            TagStatement::Style(body) => {
                format!("<style>{}</style>", evaluate_body(body, context)?)
            }

            TagStatement::Javascript(body) => {
                format!("<script>{}</script>", evaluate_body(body, context)?)
            }

            TagStatement::Render(name) => {
                format!("<!-- render '{}' -->", crate::escape_html(name))
            }

            TagStatement::Section(name) => {
                format!("<!-- section '{}' -->", crate::escape_html(name))
            }

            TagStatement::Sections(name) => {
                format!("<!-- sections '{}' -->", crate::escape_html(name))
            }

            TagStatement::Form { kind, body } => {
                format!(
                    r##"<form method="post" action="#" data-type="{}">{}</form>"##,
                    crate::escape_html(kind),
                    evaluate_body(body, context)?
                )
            }

            TagStatement::Paginate(body) => evaluate_body(body, context)?,

            TagStatement::Layout => String::new(),
        })
    }
}

fn evaluate_body(body: &[Statement], context: &Context) -> Result<String, Error> {
    let mut result = String::new();

    for statement in body {
        result.push_str(&statement.evaluate(context)?);
    }

    Ok(result)
}
