pub mod token;
pub mod value;

pub use token::Token;
pub use value::{ToValue, Value};

use super::Error;

#[derive(Debug, Clone)]
pub struct TokenWithContext {
    token: Token,
    line: usize,
    column: usize,
}

impl std::fmt::Display for TokenWithContext {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "{:?} (line: {}, column: {})",
            self.token, self.line, self.column
        )
    }
}

impl TokenWithContext {
    pub fn new(token: Token, line: usize, column: usize) -> Self {
        Self {
            token,
            line,
            column,
        }
    }

    pub fn line(&self) -> usize {
        self.line
    }

    pub fn column(&self) -> usize {
        self.column
    }

    pub fn token(&self) -> Token {
        self.token.clone()
    }
}

/// The lexer converts template text into a list of tokens that may mean
/// something in the template language.
///
/// Anything that's not inside an output block (`{{ }}`) or a control block
/// (`{% %}`) is just text that gets printed as-is. This text is represented
/// by the special `Token::Text`.
///
/// `{% schema %}` bodies are raw JSON and are skipped wholesale; the schema
/// is metadata extracted by the content loader, never template output.
pub struct Lexer<'a> {
    // Template source.
    source: &'a str,
    // Resulting tokens.
    tokens: Vec<TokenWithContext>,
    // Buffer for multi-character tokens.
    buffer: String,
    // Indicates we're inside a code block where characters have
    // special meaning, e.g. `{{ 5 / 3 }}`.
    code_block: bool,
    // Which line we're on.
    line: usize,
    // Which column we're on.
    column: usize,
}

impl<'a> Lexer<'a> {
    /// Create new lexer from text input.
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            tokens: vec![],
            buffer: String::new(),
            code_block: false,
            line: 1,
            column: 1,
        }
    }

    /// Parse an input string into tokens supported by the template language.
    ///
    /// The input is processed one character at a time, with one character of
    /// lookahead for two-character tokens like `{{` and `!=`. Multi-character
    /// tokens like `if` or `endform` are buffered and matched as words.
    pub fn tokens(mut self) -> Result<Vec<TokenWithContext>, Error> {
        let chars = self.source.chars().collect::<Vec<_>>();
        let mut i = 0;

        while i < chars.len() {
            let c = chars[i];
            let next = chars.get(i + 1).copied();
            let start = i;

            match c {
                '\n' => {
                    if self.code_block {
                        // Newlines separate words inside a block, same
                        // as any other whitespace.
                        self.drain_buffer();
                        self.push(Token::Space);
                    } else {
                        self.buffer.push('\n');
                    }
                    self.line += 1;
                    self.column = 0;
                    i += 1;
                }

                '{' if !self.code_block && next == Some('{') => {
                    self.drain_buffer();
                    self.push(Token::BlockStartPrint);
                    self.code_block = true;
                    i += 2;
                }

                '{' if !self.code_block && next == Some('%') => {
                    if self.word_at(&chars, i + 2) == "schema" {
                        i = self.skip_raw(&chars, i, "endschema")?;
                    } else {
                        self.drain_buffer();
                        self.push(Token::BlockStart);
                        self.code_block = true;
                        i += 2;
                    }
                }

                '}' if self.code_block && next == Some('}') => {
                    self.drain_buffer();
                    self.push(Token::BlockEnd);
                    self.code_block = false;
                    i += 2;
                }

                '%' if self.code_block && next == Some('}') => {
                    self.drain_buffer();
                    self.push(Token::BlockEnd);
                    self.code_block = false;
                    i += 2;
                }

                // Not in a code block: everything is text.
                c if !self.code_block => {
                    self.buffer.push(c);
                    i += 1;
                }

                ' ' | '\t' | '\r' => {
                    self.drain_buffer();
                    self.push(Token::Space);
                    i += 1;
                }

                '"' | '\'' => {
                    self.drain_buffer();
                    let quote = c;
                    let mut string = String::new();
                    let mut j = i + 1;

                    loop {
                        match chars.get(j) {
                            Some(&c) if c == quote => break,
                            Some(&c) => {
                                string.push(c);
                                j += 1;
                            }
                            None => return Err(Error::Eof("string literal")),
                        }
                    }

                    self.push(Token::Value(Value::String(string)));
                    i = j + 1;
                }

                '.' => {
                    // Keep the dot if we're in the middle of a float literal,
                    // otherwise it's an accessor.
                    let numeric = !self.buffer.is_empty()
                        && self.buffer.chars().all(|c| c.is_ascii_digit())
                        && next.map(|c| c.is_ascii_digit()).unwrap_or(false);

                    if numeric {
                        self.buffer.push('.');
                    } else {
                        self.drain_buffer();
                        self.push(Token::Dot);
                    }

                    i += 1;
                }

                '|' => {
                    self.drain_buffer();
                    self.push(Token::Pipe);
                    i += 1;
                }

                ':' => {
                    self.drain_buffer();
                    self.push(Token::Colon);
                    i += 1;
                }

                ',' => {
                    self.drain_buffer();
                    self.push(Token::Comma);
                    i += 1;
                }

                '[' => {
                    self.drain_buffer();
                    self.push(Token::SquareBracketStart);
                    i += 1;
                }

                ']' => {
                    self.drain_buffer();
                    self.push(Token::SquareBracketEnd);
                    i += 1;
                }

                '(' => {
                    self.drain_buffer();
                    self.push(Token::RoundBracketStart);
                    i += 1;
                }

                ')' => {
                    self.drain_buffer();
                    self.push(Token::RoundBracketEnd);
                    i += 1;
                }

                '+' => {
                    self.drain_buffer();
                    self.push(Token::Plus);
                    i += 1;
                }

                '-' => {
                    self.drain_buffer();
                    self.push(Token::Minus);
                    i += 1;
                }

                '*' => {
                    self.drain_buffer();
                    self.push(Token::Mult);
                    i += 1;
                }

                '/' => {
                    self.drain_buffer();
                    self.push(Token::Div);
                    i += 1;
                }

                '%' => {
                    self.drain_buffer();
                    self.push(Token::Mod);
                    i += 1;
                }

                '=' => {
                    self.drain_buffer();
                    self.push(Token::Equals);
                    i += if next == Some('=') { 2 } else { 1 };
                }

                '!' => {
                    self.drain_buffer();
                    if next == Some('=') {
                        self.push(Token::NotEquals);
                        i += 2;
                    } else {
                        self.push(Token::Not);
                        i += 1;
                    }
                }

                '>' => {
                    self.drain_buffer();
                    if next == Some('=') {
                        self.push(Token::GreaterEqualThan);
                        i += 2;
                    } else {
                        self.push(Token::GreaterThan);
                        i += 1;
                    }
                }

                '<' => {
                    self.drain_buffer();
                    if next == Some('=') {
                        self.push(Token::LessEqualThan);
                        i += 2;
                    } else {
                        self.push(Token::LessThan);
                        i += 1;
                    }
                }

                c => {
                    self.buffer.push(c);
                    i += 1;
                }
            }

            self.column += i - start;
        }

        if self.code_block {
            return Err(Error::Eof("unterminated block"));
        }

        self.drain_buffer();

        Ok(self
            .tokens
            .into_iter()
            // Remove spaces from output, the lexer handled them,
            // the parser doesn't need to.
            .filter(|token| token.token != Token::Space)
            .collect())
    }

    // Handle multi-character tokens.
    fn drain_buffer(&mut self) {
        if self.buffer.is_empty() {
            return;
        }

        let s = std::mem::take(&mut self.buffer);

        if !self.code_block {
            self.tokens.push(self.token(Token::Text(s)));
            return;
        }

        let token = match s.as_str() {
            "if" => Token::If,
            "elsif" => Token::ElsIf,
            "else" => Token::Else,
            "for" => Token::For,
            "in" => Token::In,
            "and" => Token::And,
            "or" => Token::Or,
            "not" => Token::Not,
            "true" => Token::Value(Value::Boolean(true)),
            "false" => Token::Value(Value::Boolean(false)),
            "nil" | "null" => Token::Value(Value::Null),
            "endif" | "endfor" | "endschema" | "endstyle" | "endjavascript" | "endform"
            | "endpaginate" => Token::End(s[3..].to_string()),
            st => {
                if let Ok(integer) = st.parse::<i64>() {
                    Token::Value(Value::Integer(integer))
                } else if let Ok(float) = st.parse::<f64>() {
                    Token::Value(Value::Float(float))
                } else {
                    Token::Variable(s)
                }
            }
        };

        self.tokens.push(self.token(token));
    }

    fn push(&mut self, token: Token) {
        self.tokens.push(self.token(token));
    }

    // Attach lexer context (e.g. line number) to a token.
    fn token(&self, token: Token) -> TokenWithContext {
        TokenWithContext::new(token, self.line, self.column)
    }

    // The first word following position `start`, used to peek
    // at a control block's tag name.
    fn word_at(&self, chars: &[char], start: usize) -> String {
        let mut j = start;

        while chars.get(j).map(|c| *c == ' ').unwrap_or(false) {
            j += 1;
        }

        let mut word = String::new();

        while let Some(&c) = chars.get(j) {
            if c.is_alphanumeric() || c == '_' {
                word.push(c);
                j += 1;
            } else {
                break;
            }
        }

        word
    }

    // Skip everything from position `i` up to and including the closing
    // `{% end... %}` tag. Returns the position right after it.
    fn skip_raw(&mut self, chars: &[char], i: usize, terminator: &str) -> Result<usize, Error> {
        self.drain_buffer();

        let rest = chars[i..].iter().collect::<String>();

        let close = match rest.find(terminator) {
            Some(pos) => pos,
            None => return Err(Error::UnterminatedTag(terminator[3..].to_string())),
        };

        let end = match rest[close..].find("%}") {
            Some(pos) => close + pos + 2,
            None => return Err(Error::UnterminatedTag(terminator[3..].to_string())),
        };

        self.line += rest[..end].matches('\n').count();

        // `end` is a byte offset into `rest`, which is ASCII around the
        // terminator; convert back to a character count.
        Ok(i + rest[..end].chars().count())
    }
}

/// Easily tokenize strings.
pub trait Tokenize {
    /// Parse a string and convert it to a list of tokens.
    fn tokenize(&self) -> Result<Vec<TokenWithContext>, Error>;
}

impl Tokenize for &str {
    fn tokenize(&self) -> Result<Vec<TokenWithContext>, Error> {
        Lexer::new(self).tokens()
    }
}

impl Tokenize for String {
    fn tokenize(&self) -> Result<Vec<TokenWithContext>, Error> {
        Lexer::new(self).tokens()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_text_and_print() {
        let tokens = "<h1>{{ title }}</h1>".tokenize().unwrap();
        let tokens = tokens.iter().map(|t| t.token()).collect::<Vec<_>>();

        assert_eq!(
            tokens,
            vec![
                Token::Text("<h1>".into()),
                Token::BlockStartPrint,
                Token::Variable("title".into()),
                Token::BlockEnd,
                Token::Text("</h1>".into()),
            ]
        );
    }

    #[test]
    fn test_filter_pipe() {
        let tokens = r#"{{ price | money_with_currency }}"#.tokenize().unwrap();
        let tokens = tokens.iter().map(|t| t.token()).collect::<Vec<_>>();

        assert_eq!(
            tokens,
            vec![
                Token::BlockStartPrint,
                Token::Variable("price".into()),
                Token::Pipe,
                Token::Variable("money_with_currency".into()),
                Token::BlockEnd,
            ]
        );
    }

    #[test]
    fn test_end_tags() {
        let tokens = "{% if a %}x{% endif %}".tokenize().unwrap();
        let tokens = tokens.iter().map(|t| t.token()).collect::<Vec<_>>();

        assert_eq!(
            tokens,
            vec![
                Token::BlockStart,
                Token::If,
                Token::Variable("a".into()),
                Token::BlockEnd,
                Token::Text("x".into()),
                Token::BlockStart,
                Token::End("if".into()),
                Token::BlockEnd,
            ]
        );
    }

    #[test]
    fn test_schema_is_raw() {
        let source = r#"before{% schema %}
{
  "name": "Hero", "settings": [{ "id": "x" }]
}
{% endschema %}after"#;
        let tokens = source.tokenize().unwrap();
        let tokens = tokens.iter().map(|t| t.token()).collect::<Vec<_>>();

        assert_eq!(
            tokens,
            vec![Token::Text("before".into()), Token::Text("after".into())]
        );
    }

    #[test]
    fn test_unterminated_schema() {
        let err = "{% schema %}{}".tokenize();
        assert!(err.is_err());
    }

    #[test]
    fn test_string_literals() {
        let tokens = r#"{% form "product", product %}"#.tokenize().unwrap();
        let tokens = tokens.iter().map(|t| t.token()).collect::<Vec<_>>();

        assert_eq!(
            tokens,
            vec![
                Token::BlockStart,
                Token::Variable("form".into()),
                Token::Value(Value::String("product".into())),
                Token::Comma,
                Token::Variable("product".into()),
                Token::BlockEnd,
            ]
        );
    }

    #[test]
    fn test_named_filter_args() {
        let tokens = "{{ img | image_url: width: 600 }}".tokenize().unwrap();
        let tokens = tokens.iter().map(|t| t.token()).collect::<Vec<_>>();

        assert_eq!(
            tokens,
            vec![
                Token::BlockStartPrint,
                Token::Variable("img".into()),
                Token::Pipe,
                Token::Variable("image_url".into()),
                Token::Colon,
                Token::Variable("width".into()),
                Token::Colon,
                Token::Value(Value::Integer(600)),
                Token::BlockEnd,
            ]
        );
    }

    #[test]
    fn test_multiline_block() {
        let tokens = "{% if a\n    and b %}x{% endif %}".tokenize().unwrap();
        let tokens = tokens.iter().map(|t| t.token()).collect::<Vec<_>>();

        assert_eq!(
            tokens,
            vec![
                Token::BlockStart,
                Token::If,
                Token::Variable("a".into()),
                Token::And,
                Token::Variable("b".into()),
                Token::BlockEnd,
                Token::Text("x".into()),
                Token::BlockStart,
                Token::End("if".into()),
                Token::BlockEnd,
            ]
        );
    }

    #[test]
    fn test_floats_and_accessors() {
        let tokens = "{{ 3.14 }}{{ a.b }}".tokenize().unwrap();
        let tokens = tokens.iter().map(|t| t.token()).collect::<Vec<_>>();

        assert_eq!(
            tokens,
            vec![
                Token::BlockStartPrint,
                Token::Value(Value::Float(3.14)),
                Token::BlockEnd,
                Token::BlockStartPrint,
                Token::Variable("a".into()),
                Token::Dot,
                Token::Variable("b".into()),
                Token::BlockEnd,
            ]
        );
    }
}
