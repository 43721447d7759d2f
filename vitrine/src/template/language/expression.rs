use super::{
    super::lexer::{Token, TokenWithContext, Value},
    super::{Context, Error},
    Op, Term,
};

use std::iter::{Iterator, Peekable};

/// An expression, like `5 == 6` or `section.settings.heading`,
/// which when evaluated produces a single value.
#[derive(Debug, Clone)]
pub enum Expression {
    // Standard `5 + 6`-style expression.
    // It's recursive, so you can have something like `(5 + 6) / (1 - 5)`.
    Binary {
        left: Box<Expression>,
        op: Op,
        right: Box<Expression>,
    },

    Unary {
        op: Op,
        operand: Box<Expression>,
    },

    // Base case for recursive expression parsing, which evaluates to the
    // value of the term, e.g. `5` evaluates to `5` and `variable_name` to
    // whatever the variable is set to in the context.
    Term {
        term: Term,
    },

    // A list of expressions, e.g. `[1, 2, variable, "hello world"]`.
    //
    // The list is evaluated at runtime, so it can contain variables,
    // as long as they are in scope.
    List {
        terms: Vec<Expression>,
    },

    // Attribute access on a value, e.g. `product.title` or `blocks[0]`.
    // The attribute name itself is an expression so `hash[name]` works.
    Access {
        term: Box<Expression>,
        name: Box<Expression>,
    },
}

impl Expression {
    /// Create new constant expression (term).
    pub fn constant(value: Value) -> Self {
        Self::Term {
            term: Term::constant(value),
        }
    }

    /// Create new variable expression (term).
    pub fn variable(variable: String) -> Self {
        Self::Term {
            term: Term::variable(variable),
        }
    }

    /// Evaluate the expression to a value given the context.
    pub fn evaluate(&self, context: &Context) -> Result<Value, Error> {
        match self {
            Expression::Term { term } => term.evaluate(context),

            Expression::Binary { left, op, right } => {
                let left = left.evaluate(context)?;
                let right = right.evaluate(context)?;
                op.evaluate_binary(&left, &right)
            }

            Expression::Unary { op, operand } => {
                let operand = operand.evaluate(context)?;
                op.evaluate_unary(&operand)
            }

            Expression::List { terms } => {
                let mut list = vec![];
                for term in terms {
                    list.push(term.evaluate(context)?);
                }
                Ok(Value::List(list))
            }

            Expression::Access { term, name } => {
                let value = term.evaluate(context)?;
                match name.evaluate(context)? {
                    Value::String(name) => value.call(&name),
                    Value::Integer(index) => value.call(&index.to_string()),
                    name => Err(Error::Runtime(format!(
                        "attribute name should be a string or an index, got {:?} instead",
                        name
                    ))),
                }
            }
        }
    }

    fn term(iter: &mut Peekable<impl Iterator<Item = TokenWithContext>>) -> Result<Self, Error> {
        let next = iter.next().ok_or(Error::Eof("term"))?;
        let term = match next.token() {
            Token::Not => {
                let term = Self::term(iter)?;
                Expression::Unary {
                    op: Op::Not,
                    operand: Box::new(term),
                }
            }

            Token::Minus => {
                let term = Self::term(iter)?;
                Expression::Unary {
                    op: Op::Sub,
                    operand: Box::new(term),
                }
            }

            Token::Plus => {
                let term = Self::term(iter)?;
                Expression::Unary {
                    op: Op::Add,
                    operand: Box::new(term),
                }
            }

            Token::RoundBracketStart => {
                let mut count = 1;
                let mut expr = vec![];

                // Count the brackets. The term is finished when the number of
                // opening brackets matches the number of closing brackets.
                while count > 0 {
                    let next = iter.peek().ok_or(Error::Eof("closing bracket"))?;

                    match next.token() {
                        Token::RoundBracketStart => {
                            count += 1;
                            expr.push(iter.next().ok_or(Error::Eof("opening bracket"))?);
                        }
                        Token::RoundBracketEnd => {
                            count -= 1;

                            // If it's not the closing bracket, push it in for
                            // recursive parsing later.
                            if count > 0 {
                                expr.push(iter.next().ok_or(Error::Eof("closing bracket"))?);
                            } else {
                                // Drop the closing bracket, the expression is over.
                                let _ = iter.next().ok_or(Error::Eof("closing bracket"))?;
                            }
                        }
                        Token::BlockEnd => return Err(Error::ExpressionSyntax(next.clone())),

                        _ => {
                            expr.push(iter.next().ok_or(Error::Eof("expression term"))?);
                        }
                    }
                }

                Self::accessor(Self::parse(&mut expr.into_iter().peekable())?, iter)?
            }

            token => {
                let expr = match token {
                    Token::Variable(name) => Self::variable(name),
                    Token::Value(value) => Self::constant(value),
                    Token::SquareBracketStart => {
                        let mut terms = vec![];

                        loop {
                            let term = Self::term(iter)?;
                            terms.push(term);
                            let next = iter.next().ok_or(Error::Eof("list"))?;
                            match next.token() {
                                Token::SquareBracketEnd => break,
                                Token::Comma => continue,
                                _ => return Err(Error::ExpressionSyntax(next)),
                            }
                        }

                        Expression::List { terms }
                    }

                    _ => return Err(Error::ExpressionSyntax(next)),
                };

                Self::accessor(expr, iter)?
            }
        };

        Ok(term)
    }

    // Parse the `.attribute` and `[index]` accessors following a term,
    // e.g. `section.blocks[0].settings`.
    pub(crate) fn accessor(
        mut expr: Self,
        iter: &mut Peekable<impl Iterator<Item = TokenWithContext>>,
    ) -> Result<Self, Error> {
        loop {
            let accessor = iter.peek().map(|t| t.token());

            expr = match accessor {
                Some(Token::Dot) => {
                    let _ = iter.next().ok_or(Error::Eof("accessor dot"))?;
                    let name = iter.next().ok_or(Error::Eof("accessor name"))?;
                    match name.token() {
                        Token::Variable(name) => Expression::Access {
                            term: Box::new(expr),
                            name: Box::new(Expression::constant(Value::String(name))),
                        },
                        Token::Value(Value::Integer(n)) => Expression::Access {
                            term: Box::new(expr),
                            name: Box::new(Expression::constant(Value::Integer(n))),
                        },
                        _ => return Err(Error::ExpressionSyntax(name.clone())),
                    }
                }

                Some(Token::SquareBracketStart) => {
                    let _ = iter.next().ok_or(Error::Eof("accessor bracket"))?;
                    let name = Self::parse(iter)?;
                    let next = iter.next().ok_or(Error::Eof("closing bracket"))?;
                    match next.token() {
                        Token::SquareBracketEnd => (),
                        _ => return Err(Error::Expected("a closing bracket", next)),
                    }
                    Expression::Access {
                        term: Box::new(expr),
                        name: Box::new(name),
                    }
                }

                Some(_) | None => return Ok(expr),
            };
        }
    }

    /// Recursively parse the expression.
    ///
    /// Consumes language tokens automatically.
    pub fn parse(
        iter: &mut Peekable<impl Iterator<Item = TokenWithContext>>,
    ) -> Result<Self, Error> {
        // Get the left term, if one exists.
        let left = Self::term(iter)?;

        // Check if we have an operator.
        let next = match iter.peek() {
            Some(next) => next,
            None => return Ok(left),
        };

        match Op::from_token(next.token()) {
            Some(op) => {
                // We have an operator. Consume the token.
                let _ = iter.next().ok_or(Error::Eof("operator"))?;

                // Get the right term. This is a binary op.
                let right = Self::term(iter)?;

                // Check if there's another operator.
                let next = iter.peek();

                match next.map(|t| t.token()) {
                    // Expression is over.
                    Some(Token::BlockEnd) | Some(Token::Pipe) | Some(Token::Comma) | None => {
                        Ok(Expression::Binary {
                            left: Box::new(left),
                            op,
                            right: Box::new(right),
                        })
                    }

                    // We have another operator.
                    Some(token) => match Op::from_token(token) {
                        Some(second_op) => {
                            // Consume the token.
                            let _ = iter.next().ok_or(Error::Eof("operator"))?;

                            // Get the right term.
                            let right2 = Expression::parse(iter)?;

                            // Check operator precedence.
                            if second_op < op {
                                let expr = Expression::Binary {
                                    left: Box::new(right),
                                    right: Box::new(right2),
                                    op: second_op,
                                };

                                Ok(Expression::Binary {
                                    left: Box::new(left),
                                    right: Box::new(expr),
                                    op,
                                })
                            } else {
                                let left = Expression::Binary {
                                    left: Box::new(left),
                                    right: Box::new(right),
                                    op,
                                };

                                Ok(Expression::Binary {
                                    left: Box::new(left),
                                    right: Box::new(right2),
                                    op: second_op,
                                })
                            }
                        }

                        // Not an op, so the expression is over; leave the
                        // token for the caller.
                        None => Ok(Expression::Binary {
                            left: Box::new(left),
                            op,
                            right: Box::new(right),
                        }),
                    },
                }
            }

            None => Ok(left),
        }
    }
}

#[cfg(test)]
mod test {
    use super::super::super::lexer::Tokenize;
    use super::*;
    use std::collections::HashMap;

    fn eval(source: &str, context: &Context) -> Result<Value, Error> {
        // Skip the opening `{{` and trailing `}}`.
        let tokens = source.tokenize()?;
        let tokens = tokens[1..tokens.len() - 1].to_vec();
        let expr = Expression::parse(&mut tokens.into_iter().peekable())?;
        expr.evaluate(context)
    }

    #[test]
    fn test_comparisons() -> Result<(), Error> {
        let ctx = Context::default();
        assert_eq!(eval("{{ 1 == 2 }}", &ctx)?, Value::Boolean(false));
        assert_eq!(eval("{{ 1 == 1 }}", &ctx)?, Value::Boolean(true));
        assert_eq!(eval("{{ 2 >= 1 }}", &ctx)?, Value::Boolean(true));
        assert_eq!(eval("{{ 1 != 2 and 2 != 3 }}", &ctx)?, Value::Boolean(true));
        Ok(())
    }

    #[test]
    fn test_math() -> Result<(), Error> {
        let ctx = Context::default();
        assert_eq!(eval("{{ 2 * 2 + 3 * 5 }}", &ctx)?, Value::Integer(19));
        assert_eq!(eval("{{ (1 + 5) * 0.25 }}", &ctx)?, Value::Float(1.5));
        assert_eq!(eval("{{ -5 + 1 }}", &ctx)?, Value::Integer(-4));
        Ok(())
    }

    #[test]
    fn test_accessors() -> Result<(), Error> {
        let mut context = Context::default();
        let product = Value::Hash(HashMap::from([
            ("title".to_string(), Value::String("Shoes".into())),
            ("price".to_string(), Value::Integer(2999)),
        ]));
        context.set("product", product)?;
        context.set("key", "title")?;
        context.set("list", vec![1_i64, 2, 3])?;

        assert_eq!(
            eval("{{ product.title }}", &context)?,
            Value::String("Shoes".into())
        );
        assert_eq!(
            eval("{{ product[key] }}", &context)?,
            Value::String("Shoes".into())
        );
        assert_eq!(eval("{{ list[1] }}", &context)?, Value::Integer(2));
        assert_eq!(eval("{{ list.first }}", &context)?, Value::Integer(1));
        assert_eq!(eval("{{ list.size }}", &context)?, Value::Integer(3));
        assert_eq!(
            eval("{{ product.missing }}", &context)?,
            Value::Null
        );
        Ok(())
    }

    #[test]
    fn test_undefined_variable() {
        let result = eval("{{ missing }}", &Context::default());
        assert!(matches!(result, Err(Error::UndefinedVariable(_))));
    }

    #[test]
    fn test_lists() -> Result<(), Error> {
        let ctx = Context::default();
        assert_eq!(
            eval(r#"{{ [1, "two", 3.0] }}"#, &ctx)?,
            Value::List(vec![
                Value::Integer(1),
                Value::String("two".into()),
                Value::Float(3.0),
            ])
        );
        Ok(())
    }
}
