use super::super::lexer::{Token, TokenWithContext, Value};
use super::super::{Context, Engine, Error};
use super::{Expression, FilterCall, Op, TagStatement, Term};

use std::collections::HashMap;
use std::iter::{Iterator, Peekable};

macro_rules! expect {
    ($got:expr, $expected:expr) => {
        if $got.token() != $expected {
            return Err(Error::WrongToken($got, $expected));
        }
    };
}

macro_rules! block_end {
    ($iter:expr) => {
        while let Some(token) = $iter.next() {
            expect!(token, Token::BlockEnd);
            break;
        }
    };
}

#[derive(Debug, Clone)]
pub enum Statement {
    // e.g. `{{ product.price | money }}`
    Print {
        expression: Expression,
        filters: Vec<FilterCall>,
    },
    // e.g. `<section class="hero">`
    PrintText(String),
    // e.g. `{% if variable == 5 %}right{% else %}wrong{% endif %}`
    If {
        expression: Expression,
        if_body: Vec<Statement>,
        else_body: Vec<Statement>,
        else_if: bool,
    },

    // `{% else %}`
    Else,
    // `{% endif %}`, `{% endform %}`, etc. Carries the closed tag name.
    End(String),

    // `{% for block in section.blocks %} ... {% endfor %}`
    For {
        variable: Term,
        list: Expression,
        body: Vec<Statement>,
    },

    // A storefront tag, e.g. `{% style %}` or `{% render "snippet" %}`.
    Tag(TagStatement),
}

impl Statement {
    pub fn evaluate(&self, context: &Context) -> Result<String, Error> {
        match self {
            Statement::PrintText(text) => Ok(text.clone()),

            Statement::Print {
                expression,
                filters,
            } => {
                let mut value = expression.evaluate(context)?;

                for filter in filters {
                    value = filter.evaluate(value, context)?;
                }

                Ok(value.to_string())
            }

            Statement::If {
                expression,
                if_body,
                else_body,
                ..
            } => {
                let mut result = String::new();
                if expression.evaluate(context)?.truthy() {
                    for statement in if_body {
                        result.push_str(&statement.evaluate(context)?);
                    }
                } else {
                    for statement in else_body {
                        result.push_str(&statement.evaluate(context)?);
                    }
                }

                Ok(result)
            }

            Statement::For {
                variable,
                list,
                body,
            } => {
                let mut result = String::new();
                let values = list.evaluate(context)?.to_vec();
                let length = values.len();
                let mut for_context = context.clone();

                for (index, value) in values.into_iter().enumerate() {
                    if let Term::Variable(name) = variable {
                        for_context.set(name, value)?;
                    }

                    for_context.set(
                        "forloop",
                        Value::Hash(HashMap::from([
                            ("index".to_string(), Value::Integer(index as i64 + 1)),
                            ("index0".to_string(), Value::Integer(index as i64)),
                            ("first".to_string(), Value::Boolean(index == 0)),
                            ("last".to_string(), Value::Boolean(index + 1 == length)),
                            ("length".to_string(), Value::Integer(length as i64)),
                        ])),
                    )?;

                    for statement in body {
                        result.push_str(&statement.evaluate(&for_context)?);
                    }
                }

                Ok(result)
            }

            Statement::Tag(tag) => tag.evaluate(context),

            // `else` and `end` are consumed by the `if`/`for`/tag parsers;
            // they never survive into an executable program.
            Statement::Else | Statement::End(_) => Ok(String::new()),
        }
    }

    pub fn parse(
        iter: &mut Peekable<impl Iterator<Item = TokenWithContext>>,
        engine: &Engine,
    ) -> Result<Statement, Error> {
        loop {
            let next = iter.next().ok_or(Error::Eof("statement"))?;
            match next.token() {
                Token::End(name) => {
                    block_end!(iter);
                    return Ok(Statement::End(name));
                }

                Token::Text(string) => return Ok(Statement::PrintText(string)),

                Token::BlockStart | Token::BlockEnd => (),

                Token::BlockStartPrint => {
                    let expression = Expression::parse(iter)?;
                    let filters = Self::filters(iter, engine)?;
                    block_end!(iter);
                    return Ok(Statement::Print {
                        expression,
                        filters,
                    });
                }

                Token::Else => {
                    block_end!(iter);
                    return Ok(Statement::Else);
                }

                Token::If | Token::ElsIf => {
                    let else_if = next.token() == Token::ElsIf;
                    let (mut if_body, mut else_body) = (vec![], vec![]);
                    let expression = Expression::parse(iter)?;

                    loop {
                        let statement = Statement::parse(iter, engine)?;
                        match statement {
                            Statement::End(name) if name == "if" => {
                                return Ok(Statement::If {
                                    expression,
                                    if_body,
                                    else_body,
                                    else_if,
                                })
                            }

                            Statement::End(_) => return Err(Error::UnterminatedTag("if".into())),

                            // `elsif` branches translate into a nested `if`
                            // inside the else body; the nested parse consumes
                            // the shared `endif`.
                            Statement::If { else_if: true, .. } => {
                                else_body.push(statement);
                                return Ok(Statement::If {
                                    expression,
                                    if_body,
                                    else_body,
                                    else_if,
                                });
                            }

                            Statement::Else => loop {
                                let statement = Statement::parse(iter, engine)?;

                                match statement {
                                    Statement::End(name) if name == "if" => {
                                        return Ok(Statement::If {
                                            expression,
                                            if_body,
                                            else_body,
                                            else_if,
                                        })
                                    }
                                    Statement::End(_) => {
                                        return Err(Error::UnterminatedTag("if".into()))
                                    }
                                    statement => else_body.push(statement),
                                }
                            },

                            statement => if_body.push(statement),
                        }
                    }
                }

                Token::For => {
                    let variable = Expression::parse(iter)?;
                    let term = match variable {
                        Expression::Term { term } => term,
                        _ => return Err(Error::Syntax(next)),
                    };

                    let in_ = iter.next().ok_or(Error::Eof("for loop"))?;
                    expect!(in_, Token::In);

                    let list = Expression::parse(iter)?;
                    block_end!(iter);

                    let mut body = vec![];

                    loop {
                        let statement = Statement::parse(iter, engine)?;

                        match statement {
                            Statement::End(name) if name == "for" => break,
                            Statement::End(_) => {
                                return Err(Error::UnterminatedTag("for".into()))
                            }
                            statement => body.push(statement),
                        }
                    }

                    return Ok(Statement::For {
                        variable: term,
                        list,
                        body,
                    });
                }

                // A word at the start of a control block is a tag name.
                Token::Variable(name) => match engine.tag(&name) {
                    Some(tag) => return Ok(Statement::Tag(tag.parse(iter, engine)?)),
                    None => return Err(Error::UnknownTag(name)),
                },

                _ => return Err(Error::Syntax(next)),
            }
        }
    }

    // Parse the `| filter: args` chain following a print expression.
    fn filters(
        iter: &mut Peekable<impl Iterator<Item = TokenWithContext>>,
        engine: &Engine,
    ) -> Result<Vec<FilterCall>, Error> {
        let mut filters = vec![];

        while iter.peek().map(|t| t.token()) == Some(Token::Pipe) {
            let _ = iter.next();

            let next = iter.next().ok_or(Error::Eof("filter name"))?;
            let filter = match next.token() {
                Token::Variable(name) => {
                    engine.filter(&name).ok_or(Error::UnknownFilter(name))?
                }
                _ => return Err(Error::Expected("a filter name", next)),
            };

            let (args, named) = if iter.peek().map(|t| t.token()) == Some(Token::Colon) {
                let _ = iter.next();
                Self::filter_arguments(iter)?
            } else {
                (vec![], vec![])
            };

            filters.push(FilterCall {
                filter,
                args,
                named,
            });
        }

        Ok(filters)
    }

    fn filter_arguments(
        iter: &mut Peekable<impl Iterator<Item = TokenWithContext>>,
    ) -> Result<(Vec<Expression>, Vec<(String, Expression)>), Error> {
        let mut args = vec![];
        let mut named = vec![];

        loop {
            let next = iter.next().ok_or(Error::Eof("filter arguments"))?;

            // `name: value` arguments are collected separately.
            let name = match next.token() {
                Token::Variable(name)
                    if iter.peek().map(|t| t.token()) == Some(Token::Colon) =>
                {
                    Some(name)
                }
                _ => None,
            };

            if let Some(name) = name {
                let _ = iter.next(); // the colon
                let first = iter.next().ok_or(Error::Eof("filter arguments"))?;
                named.push((name, Self::filter_argument(first, iter)?));
            } else {
                args.push(Self::filter_argument(next, iter)?);
            }

            match iter.peek().map(|t| t.token()) {
                Some(Token::Comma) => {
                    let _ = iter.next();
                }
                _ => break,
            }
        }

        Ok((args, named))
    }

    // Filter arguments are terms with accessors, not full expressions:
    // `section.settings.image`, `"literal"`, `600`, `-1`.
    fn filter_argument(
        first: TokenWithContext,
        iter: &mut Peekable<impl Iterator<Item = TokenWithContext>>,
    ) -> Result<Expression, Error> {
        let expr = match first.token() {
            Token::Variable(name) => Expression::variable(name),
            Token::Value(value) => Expression::constant(value),
            Token::Minus => {
                let next = iter.next().ok_or(Error::Eof("filter arguments"))?;
                match next.token() {
                    Token::Value(value) => Expression::Unary {
                        op: Op::Sub,
                        operand: Box::new(Expression::constant(value)),
                    },
                    _ => return Err(Error::Expected("a value", next)),
                }
            }
            _ => return Err(Error::ExpressionSyntax(first)),
        };

        Expression::accessor(expr, iter)
    }
}

#[cfg(test)]
mod test {
    use super::super::super::lexer::Tokenize;
    use super::*;

    fn parse(source: &str) -> Result<Statement, Error> {
        let engine = Engine::storefront();
        let tokens = source.tokenize()?;
        Statement::parse(&mut tokens.into_iter().peekable(), &engine)
    }

    #[test]
    fn test_if_else() -> Result<(), Error> {
        let statement = parse("{% if variable == 5 %}right{% else %}wrong{% endif %}")?;

        let mut context = Context::default();
        context.set("variable", Value::Integer(5))?;
        assert_eq!(statement.evaluate(&context)?, "right");

        context.set("variable", Value::Integer(6))?;
        assert_eq!(statement.evaluate(&context)?, "wrong");

        Ok(())
    }

    #[test]
    fn test_elsif() -> Result<(), Error> {
        let statement = parse(
            "{% if variable == 5 %}five{% elsif variable == 6 %}six{% else %}neither{% endif %}",
        )?;

        let mut context = Context::default();
        context.set("variable", Value::Integer(6))?;
        assert_eq!(statement.evaluate(&context)?, "six");

        context.set("variable", Value::Integer(7))?;
        assert_eq!(statement.evaluate(&context)?, "neither");

        Ok(())
    }

    #[test]
    fn test_for_loop() -> Result<(), Error> {
        let statement = parse("{% for a in [1, 2, 3] %}<li>{{ a }}</li>{% endfor %}")?;
        let result = statement.evaluate(&Context::default())?;
        assert_eq!(result, "<li>1</li><li>2</li><li>3</li>");

        Ok(())
    }

    #[test]
    fn test_forloop_variable() -> Result<(), Error> {
        let statement =
            parse("{% for a in [10, 20] %}{{ forloop.index }}:{{ a }} {% endfor %}")?;
        let result = statement.evaluate(&Context::default())?;
        assert_eq!(result, "1:10 2:20 ");

        Ok(())
    }

    #[test]
    fn test_print_with_filters() -> Result<(), Error> {
        let statement = parse("{{ price | money }}")?;
        let mut context = Context::default();
        context.set("price", Value::Integer(2999))?;
        assert_eq!(statement.evaluate(&context)?, "$29.99");

        Ok(())
    }

    #[test]
    fn test_named_filter_arguments() -> Result<(), Error> {
        let statement = parse(r#"{{ image | image_url: width: 600, height: 400 }}"#)?;
        let mut context = Context::default();
        context.set("image", Value::Null)?;
        assert_eq!(
            statement.evaluate(&context)?,
            "https://placehold.co/600x400"
        );

        Ok(())
    }

    #[test]
    fn test_unknown_filter() {
        let result = parse("{{ price | gold_plated }}");
        assert!(matches!(result, Err(Error::UnknownFilter(_))));
    }

    #[test]
    fn test_unknown_tag() {
        let result = parse("{% teleport %}");
        assert!(matches!(result, Err(Error::UnknownTag(_))));
    }

    #[test]
    fn test_error_names_what_was_expected() {
        // The message states what the parser wanted, not an echo of
        // the token it got.
        let message = parse("{{ price | 42 }}").err().unwrap().to_string();
        assert!(message.starts_with("expected a filter name"), "{}", message);

        let message = parse("{% render snippet %}").err().unwrap().to_string();
        assert!(
            message.starts_with("expected a quoted string argument"),
            "{}",
            message
        );
    }

    #[test]
    fn test_style_tag() -> Result<(), Error> {
        let statement = parse("{% style %}.hero { color: {{ color }}; }{% endstyle %}")?;
        let mut context = Context::default();
        context.set("color", "#fff")?;
        assert_eq!(
            statement.evaluate(&context)?,
            "<style>.hero { color: #fff; }</style>"
        );

        Ok(())
    }

    #[test]
    fn test_form_tag() -> Result<(), Error> {
        let statement = parse(r#"{% form "product", product %}<button>Buy</button>{% endform %}"#)?;
        let result = statement.evaluate(&Context::default())?;
        assert_eq!(
            result,
            r##"<form method="post" action="#" data-type="product"><button>Buy</button></form>"##
        );

        Ok(())
    }

    #[test]
    fn test_placeholder_tags() -> Result<(), Error> {
        assert_eq!(
            parse(r#"{% render "product-card" %}"#)?.evaluate(&Context::default())?,
            "<!-- render 'product-card' -->"
        );
        assert_eq!(
            parse(r#"{% section "announcement" %}"#)?.evaluate(&Context::default())?,
            "<!-- section 'announcement' -->"
        );
        assert_eq!(
            parse(r#"{% sections "header-group" %}"#)?.evaluate(&Context::default())?,
            "<!-- sections 'header-group' -->"
        );

        Ok(())
    }

    #[test]
    fn test_layout_is_noop() -> Result<(), Error> {
        let statement = parse("{% layout none %}")?;
        assert_eq!(statement.evaluate(&Context::default())?, "");

        Ok(())
    }

    #[test]
    fn test_paginate_is_transparent() -> Result<(), Error> {
        let statement =
            parse("{% paginate collection.products by 12 %}inner{% endpaginate %}")?;
        assert_eq!(statement.evaluate(&Context::default())?, "inner");

        Ok(())
    }
}
