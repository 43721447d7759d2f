//! Storefront output filters, e.g. `{{ product.price | money }}`.
//!
//! Filters are a closed set resolved at parse time against the engine's
//! registration table. Several of them (colors, fonts, translation) are
//! deliberately approximate: previews need a plausible value, not fidelity
//! to a real storefront backend.
use super::super::lexer::Value;
use super::super::{Context, Error};
use super::Expression;

use std::collections::HashMap;

use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{Date, OffsetDateTime};

/// A registered output filter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Filter {
    ImageUrl,
    ImageTag,
    AssetUrl,
    StylesheetTag,
    ScriptTag,
    Money,
    MoneyWithCurrency,
    MoneyWithoutCurrency,
    MoneyWithoutTrailingZeros,
    Translate,
    Handleize,
    Where,
    Date,
    ColorToRgb,
    ColorModify,
    ColorLighten,
    ColorDarken,
    FontUrl,
    FontFace,
    Default,
    Escape,
    Upcase,
    Downcase,
    Capitalize,
    Append,
    Prepend,
    Join,
    First,
    Last,
    Size,
    StripHtml,
    Truncate,
}

impl Filter {
    /// All filters, with the names templates use to invoke them.
    pub fn all() -> &'static [(&'static str, Filter)] {
        &[
            ("image_url", Filter::ImageUrl),
            ("img_url", Filter::ImageUrl),
            ("image_tag", Filter::ImageTag),
            ("asset_url", Filter::AssetUrl),
            ("stylesheet_tag", Filter::StylesheetTag),
            ("script_tag", Filter::ScriptTag),
            ("money", Filter::Money),
            ("money_with_currency", Filter::MoneyWithCurrency),
            ("money_without_currency", Filter::MoneyWithoutCurrency),
            (
                "money_without_trailing_zeros",
                Filter::MoneyWithoutTrailingZeros,
            ),
            ("t", Filter::Translate),
            ("translate", Filter::Translate),
            ("handle", Filter::Handleize),
            ("handleize", Filter::Handleize),
            ("where", Filter::Where),
            ("date", Filter::Date),
            ("color_to_rgb", Filter::ColorToRgb),
            ("color_modify", Filter::ColorModify),
            ("color_lighten", Filter::ColorLighten),
            ("color_darken", Filter::ColorDarken),
            ("font_url", Filter::FontUrl),
            ("font_face", Filter::FontFace),
            ("default", Filter::Default),
            ("escape", Filter::Escape),
            ("upcase", Filter::Upcase),
            ("downcase", Filter::Downcase),
            ("capitalize", Filter::Capitalize),
            ("append", Filter::Append),
            ("prepend", Filter::Prepend),
            ("join", Filter::Join),
            ("first", Filter::First),
            ("last", Filter::Last),
            ("size", Filter::Size),
            ("strip_html", Filter::StripHtml),
            ("truncate", Filter::Truncate),
        ]
    }

    /// Apply the filter to a value. `args` are positional arguments,
    /// `named` are `name: value` arguments.
    pub fn apply(
        &self,
        input: Value,
        args: &[Value],
        named: &HashMap<String, Value>,
    ) -> Result<Value, Error> {
        Ok(match self {
            Filter::ImageUrl => {
                let (width, height) = dimensions(named);

                match &input {
                    Value::String(src) if absolute_url(src) => input,
                    _ => Value::String(placeholder_image(width, height)),
                }
            }

            Filter::ImageTag => {
                let src = match &input {
                    Value::String(src) => src.clone(),
                    _ => {
                        let (width, height) = dimensions(named);
                        placeholder_image(width, height)
                    }
                };

                let alt = named
                    .get("alt")
                    .or(args.first())
                    .map(|v| v.to_string())
                    .unwrap_or_else(|| "Image".to_string());

                Value::String(format!(
                    r#"<img src="{}" alt="{}" loading="lazy">"#,
                    crate::escape_html(&src),
                    crate::escape_html(&alt)
                ))
            }

            Filter::AssetUrl => Value::String(format!("/assets/{}", input)),

            Filter::StylesheetTag => Value::String(format!(
                r#"<link rel="stylesheet" href="{}">"#,
                crate::escape_html(&input.to_string())
            )),

            Filter::ScriptTag => Value::String(format!(
                r#"<script src="{}"></script>"#,
                crate::escape_html(&input.to_string())
            )),

            Filter::Money => match cents(&input) {
                Some(cents) => Value::String(format!("${:.2}", cents / 100.0)),
                None => input,
            },

            Filter::MoneyWithCurrency => match cents(&input) {
                Some(cents) => Value::String(format!("${:.2} USD", cents / 100.0)),
                None => input,
            },

            Filter::MoneyWithoutCurrency => match cents(&input) {
                Some(cents) => Value::String(format!("${:.2}", cents / 100.0)),
                None => input,
            },

            Filter::MoneyWithoutTrailingZeros => match cents(&input) {
                Some(cents) => {
                    let amount = cents / 100.0;
                    if amount.fract() == 0.0 {
                        Value::String(format!("${}", amount as i64))
                    } else {
                        Value::String(format!("${:.2}", amount))
                    }
                }
                None => input,
            },

            // Translation stub: no locale lookup, `default:` wins,
            // otherwise the key itself.
            Filter::Translate => match named.get("default") {
                Some(default) => default.clone(),
                None => input,
            },

            Filter::Handleize => Value::String(crate::handleize(&input.to_string())),

            Filter::Where => {
                let property = match args.first() {
                    Some(Value::String(property)) => property.clone(),
                    _ => return Ok(Value::List(vec![])),
                };
                let expected = args.get(1).cloned().unwrap_or(Value::Boolean(true));

                match input {
                    Value::List(list) => Value::List(
                        list.into_iter()
                            .filter(|item| match item {
                                Value::Hash(hash) => hash.get(&property) == Some(&expected),
                                _ => false,
                            })
                            .collect(),
                    ),
                    _ => Value::List(vec![]),
                }
            }

            Filter::Date => match parse_date(&input) {
                Some(date) => {
                    let format = format_description!("[month repr:long] [day padding:none], [year]");
                    Value::String(date.format(&format)?)
                }
                None => input,
            },

            Filter::ColorToRgb => match &input {
                Value::String(color) => match hex_color(color) {
                    Some((r, g, b)) => Value::String(format!("rgb({}, {}, {})", r, g, b)),
                    None => input,
                },
                _ => input,
            },

            // Approximate stand-ins: previews keep the original color.
            Filter::ColorModify | Filter::ColorLighten | Filter::ColorDarken => input,

            Filter::FontUrl => Value::String(format!(
                "/assets/fonts/{}.woff2",
                crate::handleize(&input.to_string())
            )),

            Filter::FontFace => {
                let family = input.to_string();
                Value::String(format!(
                    r#"@font-face {{ font-family: "{}"; src: url("/assets/fonts/{}.woff2"); }}"#,
                    crate::escape_html(&family),
                    crate::handleize(&family)
                ))
            }

            Filter::Default => {
                let blank = match &input {
                    Value::Null => true,
                    Value::Boolean(b) => !b,
                    Value::String(s) => s.is_empty(),
                    _ => false,
                };

                if blank {
                    args.first().cloned().unwrap_or(Value::Null)
                } else {
                    input
                }
            }

            Filter::Escape => Value::String(crate::escape_html(&input.to_string())),
            Filter::Upcase => Value::String(input.to_string().to_uppercase()),
            Filter::Downcase => Value::String(input.to_string().to_lowercase()),
            Filter::Capitalize => Value::String(crate::capitalize(&input.to_string())),

            Filter::Append => {
                let suffix = args.first().map(|v| v.to_string()).unwrap_or_default();
                Value::String(format!("{}{}", input, suffix))
            }

            Filter::Prepend => {
                let prefix = args.first().map(|v| v.to_string()).unwrap_or_default();
                Value::String(format!("{}{}", prefix, input))
            }

            Filter::Join => {
                let separator = args
                    .first()
                    .map(|v| v.to_string())
                    .unwrap_or_else(|| ", ".to_string());

                match input {
                    Value::List(list) => Value::String(
                        list.iter()
                            .map(|v| v.to_string())
                            .collect::<Vec<_>>()
                            .join(&separator),
                    ),
                    value => value,
                }
            }

            Filter::First => input.call("first")?,
            Filter::Last => input.call("last")?,
            Filter::Size => input.call("size")?,

            Filter::StripHtml => {
                let mut result = String::new();
                let mut in_tag = false;

                for c in input.to_string().chars() {
                    match c {
                        '<' => in_tag = true,
                        '>' => in_tag = false,
                        c if !in_tag => result.push(c),
                        _ => (),
                    }
                }

                Value::String(result)
            }

            Filter::Truncate => {
                let limit = match args.first() {
                    Some(Value::Integer(n)) => *n as usize,
                    _ => 50,
                };

                let text = input.to_string();
                if text.chars().count() > limit {
                    let truncated = text.chars().take(limit).collect::<String>();
                    Value::String(format!("{}...", truncated))
                } else {
                    Value::String(text)
                }
            }
        })
    }
}

/// A filter invocation parsed from a template, e.g.
/// `| image_url: width: 600`.
#[derive(Debug, Clone)]
pub struct FilterCall {
    pub filter: Filter,
    pub args: Vec<Expression>,
    pub named: Vec<(String, Expression)>,
}

impl FilterCall {
    pub fn evaluate(&self, input: Value, context: &Context) -> Result<Value, Error> {
        let mut args = vec![];
        for arg in &self.args {
            args.push(arg.evaluate(context)?);
        }

        let mut named = HashMap::new();
        for (name, arg) in &self.named {
            named.insert(name.clone(), arg.evaluate(context)?);
        }

        self.filter.apply(input, &args, &named)
    }
}

fn absolute_url(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://") || url.starts_with("//")
}

fn placeholder_image(width: i64, height: i64) -> String {
    format!("https://placehold.co/{}x{}", width, height)
}

fn dimensions(named: &HashMap<String, Value>) -> (i64, i64) {
    let width = match named.get("width") {
        Some(Value::Integer(w)) => *w,
        _ => 400,
    };
    let height = match named.get("height") {
        Some(Value::Integer(h)) => *h,
        _ => width,
    };

    (width, height)
}

fn cents(value: &Value) -> Option<f64> {
    match value {
        Value::Integer(i) => Some(*i as f64),
        Value::Float(f) => Some(*f),
        Value::String(s) => s.parse::<f64>().ok(),
        _ => None,
    }
}

fn parse_date(value: &Value) -> Option<OffsetDateTime> {
    match value {
        Value::String(s) => OffsetDateTime::parse(s, &Rfc3339).ok().or_else(|| {
            Date::parse(s, format_description!("[year]-[month]-[day]"))
                .ok()
                .map(|date| date.midnight().assume_utc())
        }),
        Value::Integer(timestamp) => OffsetDateTime::from_unix_timestamp(*timestamp).ok(),
        _ => None,
    }
}

fn hex_color(color: &str) -> Option<(u8, u8, u8)> {
    let hex = color.strip_prefix('#')?;

    if hex.len() != 6 {
        return None;
    }

    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;

    Some((r, g, b))
}

#[cfg(test)]
mod test {
    use super::*;

    fn apply(filter: Filter, input: Value) -> Value {
        filter.apply(input, &[], &HashMap::new()).unwrap()
    }

    #[test]
    fn test_money() {
        assert_eq!(
            apply(Filter::Money, Value::Integer(299)),
            Value::String("$2.99".into())
        );
        assert_eq!(
            apply(Filter::Money, Value::Integer(300)),
            Value::String("$3.00".into())
        );
        assert_eq!(
            apply(Filter::MoneyWithCurrency, Value::Integer(299)),
            Value::String("$2.99 USD".into())
        );
        assert_eq!(
            apply(Filter::MoneyWithoutTrailingZeros, Value::Integer(300)),
            Value::String("$3".into())
        );
        assert_eq!(
            apply(Filter::MoneyWithoutTrailingZeros, Value::Integer(350)),
            Value::String("$3.50".into())
        );
    }

    #[test]
    fn test_handleize() {
        assert_eq!(
            apply(Filter::Handleize, Value::String("Hello, World!".into())),
            Value::String("hello-world".into())
        );
    }

    #[test]
    fn test_image_url() {
        // Absolute URLs pass through.
        assert_eq!(
            apply(
                Filter::ImageUrl,
                Value::String("https://cdn.example.com/a.jpg".into())
            ),
            Value::String("https://cdn.example.com/a.jpg".into())
        );

        // Anything else becomes a placeholder, default 400x400.
        assert_eq!(
            apply(Filter::ImageUrl, Value::Null),
            Value::String("https://placehold.co/400x400".into())
        );

        // Width given, height defaults to width.
        let named = HashMap::from([("width".to_string(), Value::Integer(600))]);
        assert_eq!(
            Filter::ImageUrl
                .apply(Value::String("".into()), &[], &named)
                .unwrap(),
            Value::String("https://placehold.co/600x600".into())
        );
    }

    #[test]
    fn test_image_tag_escapes_alt() {
        let named = HashMap::from([(
            "alt".to_string(),
            Value::String(r#""><script>"#.into()),
        )]);
        let tag = Filter::ImageTag
            .apply(Value::String("https://img/x.png".into()), &[], &named)
            .unwrap();

        let html = tag.to_string();
        assert!(html.contains("&quot;&gt;&lt;script&gt;"));
        assert!(html.contains(r#"loading="lazy""#));
    }

    #[test]
    fn test_asset_url() {
        assert_eq!(
            apply(Filter::AssetUrl, Value::String("theme.css".into())),
            Value::String("/assets/theme.css".into())
        );
    }

    #[test]
    fn test_translate() {
        let named = HashMap::from([("default".to_string(), Value::String("Hello".into()))]);
        assert_eq!(
            Filter::Translate
                .apply(Value::String("general.hello".into()), &[], &named)
                .unwrap(),
            Value::String("Hello".into())
        );
        assert_eq!(
            apply(Filter::Translate, Value::String("general.hello".into())),
            Value::String("general.hello".into())
        );
    }

    #[test]
    fn test_where() {
        let list = Value::List(vec![
            Value::Hash(HashMap::from([(
                "available".to_string(),
                Value::Boolean(true),
            )])),
            Value::Hash(HashMap::from([(
                "available".to_string(),
                Value::Boolean(false),
            )])),
        ]);

        let args = vec![
            Value::String("available".into()),
            Value::Boolean(true),
        ];
        let result = Filter::Where.apply(list, &args, &HashMap::new()).unwrap();

        match result {
            Value::List(items) => assert_eq!(items.len(), 1),
            other => panic!("expected list, got {:?}", other),
        }

        // Non-array input yields an empty sequence.
        assert_eq!(
            Filter::Where
                .apply(Value::Integer(5), &args, &HashMap::new())
                .unwrap(),
            Value::List(vec![])
        );
    }

    #[test]
    fn test_date() {
        assert_eq!(
            apply(Filter::Date, Value::String("2024-01-15".into())),
            Value::String("January 15, 2024".into())
        );

        // Unparseable input comes back unchanged.
        assert_eq!(
            apply(Filter::Date, Value::String("not a date".into())),
            Value::String("not a date".into())
        );
    }

    #[test]
    fn test_color_to_rgb() {
        assert_eq!(
            apply(Filter::ColorToRgb, Value::String("#ff0080".into())),
            Value::String("rgb(255, 0, 128)".into())
        );
        assert_eq!(
            apply(Filter::ColorToRgb, Value::String("tomato".into())),
            Value::String("tomato".into())
        );
    }

    #[test]
    fn test_default() {
        let args = vec![Value::String("fallback".into())];
        assert_eq!(
            Filter::Default
                .apply(Value::Null, &args, &HashMap::new())
                .unwrap(),
            Value::String("fallback".into())
        );
        assert_eq!(
            Filter::Default
                .apply(Value::String("set".into()), &args, &HashMap::new())
                .unwrap(),
            Value::String("set".into())
        );
    }

    #[test]
    fn test_strip_html() {
        assert_eq!(
            apply(
                Filter::StripHtml,
                Value::String("<p>Hello <b>world</b></p>".into())
            ),
            Value::String("Hello world".into())
        );
    }
}
