//! Executable template.
//!
//! A program is a list of statements.
use super::super::{Context, Engine, Error, TokenWithContext, Tokenize};
use super::Statement;

/// Executable program.
#[derive(Debug, Clone)]
pub struct Program {
    statements: Vec<Statement>,
}

impl Program {
    /// Evaluate the program given the context. The context contains variable definitions.
    pub fn evaluate(&self, context: &Context) -> Result<String, Error> {
        let mut result = String::new();
        for statement in &self.statements {
            result.push_str(&statement.evaluate(context)?);
        }

        Ok(result)
    }

    /// Parse the program from a list of tokens. Tag and filter names are
    /// resolved against the engine's registration tables.
    pub fn parse(tokens: Vec<TokenWithContext>, engine: &Engine) -> Result<Self, Error> {
        let mut iter = tokens.into_iter().peekable();
        let mut statements = vec![];

        while iter.peek().is_some() {
            let statement = Statement::parse(&mut iter, engine)?;
            statements.push(statement);
        }

        Ok(Program { statements })
    }

    /// Compile the program from source.
    pub fn from_str(source: &str, engine: &Engine) -> Result<Self, Error> {
        let tokens = source.tokenize()?;
        Program::parse(tokens, engine)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::template::Value;

    #[test]
    fn test_basic_program() -> Result<(), Error> {
        let engine = Engine::storefront();
        let program = Program::from_str(
            "<html><body>{% if 1 == 4 %}world is great{% else %}not so much{% endif %}</body></html>",
            &engine,
        )?;
        let output = program.evaluate(&Context::default())?;
        assert_eq!("<html><body>not so much</body></html>", output);
        Ok(())
    }

    #[test]
    fn test_program_with_tags_and_filters() -> Result<(), Error> {
        let engine = Engine::storefront();
        let program = Program::from_str(
            r#"{% style %}.x { color: red; }{% endstyle %}<p>{{ title | upcase }}</p>"#,
            &engine,
        )?;

        let mut context = Context::default();
        context.set("title", Value::String("hello".into()))?;

        assert_eq!(
            program.evaluate(&context)?,
            "<style>.x { color: red; }</style><p>HELLO</p>"
        );
        Ok(())
    }

    #[test]
    fn test_unterminated_tag_is_an_error() {
        let engine = Engine::storefront();
        let result = Program::from_str("{% if a %}never closed", &engine);
        assert!(result.is_err());
    }
}
