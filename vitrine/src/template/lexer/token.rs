use super::Value;

/// A template language token, e.g. `if` or `for`.
#[derive(Debug, PartialEq, Clone)]
pub enum Token {
    // e.g. `<section class="hero">`
    Text(String),
    // e.g. `{{ product }}`
    Variable(String),
    // e.g. `{{ 5 }}` or `{{ "hello" }}`
    Value(Value),
    // `{% if %}`
    If,
    // `{% elsif %}`
    ElsIf,
    // `{% else %}`
    Else,
    // `{% endif %}`, `{% endform %}`, etc. Carries the tag name being closed.
    End(String),
    // `{% for item in list %}`
    For,
    In,
    // `{%`
    BlockStart,
    // `{{`
    BlockStartPrint,
    // `%}` or `}}`
    BlockEnd,
    Space,
    Dot,
    Comma,
    Colon,
    Pipe,
    And,
    Or,
    Not,
    Plus,
    Minus,
    Mult,
    Div,
    Mod,
    Equals,
    NotEquals,
    GreaterThan,
    GreaterEqualThan,
    LessThan,
    LessEqualThan,
    SquareBracketStart,
    SquareBracketEnd,
    RoundBracketStart,
    RoundBracketEnd,
}
