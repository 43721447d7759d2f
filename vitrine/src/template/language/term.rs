//! Expression term, a single entity in an expression.
use super::super::{lexer::Value, Context, Error};

/// Expression term.
#[derive(Debug, Clone, PartialEq)]
pub enum Term {
    Constant(Value),
    Variable(String),
}

impl Term {
    /// Create a constant term from a value. Constant terms evaluate to the value.
    pub fn constant(value: Value) -> Self {
        Term::Constant(value)
    }

    /// Create a variable term. The term requires a context to be evaluated.
    pub fn variable(name: String) -> Self {
        Term::Variable(name)
    }

    /// Evaluate the term given the context.
    pub fn evaluate(&self, context: &Context) -> Result<Value, Error> {
        match self {
            Term::Constant(value) => Ok(value.clone()),
            Term::Variable(name) => context
                .get(name)
                .ok_or(Error::UndefinedVariable(name.clone())),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_terms() -> Result<(), Error> {
        let constant = Term::constant(Value::Integer(5));
        assert_eq!(constant.evaluate(&Context::default())?, Value::Integer(5));

        let mut context = Context::default();
        context.set("variable", "test")?;

        let variable = Term::variable("variable".into());
        assert_eq!(
            variable.evaluate(&context)?,
            Value::String("test".into())
        );

        let missing = Term::variable("missing".into());
        assert!(missing.evaluate(&context).is_err());

        Ok(())
    }
}
