use super::{Token, TokenWithContext};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("syntax error: {0}")]
    Syntax(TokenWithContext),

    #[error("expression syntax error: {0}")]
    ExpressionSyntax(TokenWithContext),

    #[error("expected token \"{1:?}\", but have \"{0}\" instead")]
    WrongToken(TokenWithContext, Token),

    #[error("expected {0}, but have \"{1}\" instead")]
    Expected(&'static str, TokenWithContext),

    #[error("reached end of template while parsing \"{0}\", did you forget a closing tag?")]
    Eof(&'static str),

    #[error("\"{0}\" tag is missing its \"end{0}\"")]
    UnterminatedTag(String),

    #[error("variable \"{0}\" is not defined or in scope")]
    UndefinedVariable(String),

    #[error("method \"{0}\" is not defined")]
    UnknownMethod(String),

    #[error("tag \"{0}\" is not registered with this engine")]
    UnknownTag(String),

    #[error("filter \"{0}\" is not registered with this engine")]
    UnknownFilter(String),

    #[error("{0}")]
    Runtime(String),

    #[error("failed to format a timestamp, error: \"{0}\"")]
    TimeFormat(#[from] time::error::Format),
}

impl Error {
    /// Point at the offending token with a line/column caret, for template
    /// authors debugging a broken section.
    pub fn pretty(self, source: &str) -> Self {
        let token = match self {
            Error::Syntax(ref token) => token,
            Error::ExpressionSyntax(ref token) => token,
            Error::WrongToken(ref token, _) => token,
            Error::Expected(_, ref token) => token,
            _ => return self,
        };

        let message = self.to_string();
        let context = source.lines().nth(std::cmp::max(1, token.line()) - 1);

        if let Some(context) = context {
            let line_number = format!("{} | ", token.line());
            let padding = " ".repeat(line_number.len() + token.column().saturating_sub(1));

            Error::Runtime(format!(
                "{}\n{}{}\n{}^ {}",
                message,
                line_number,
                context,
                padding,
                "here"
            ))
        } else {
            self
        }
    }
}
