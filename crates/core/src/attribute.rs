//! Typed values for JSX attributes.
//!
//! Component attributes arrive either as literals (`title="Hi"`) or as
//! expressions (`items={[1, { a: "b" }]}`). Expressions made only of
//! literals, arrays and objects decode into [`AttributeValue`]; any other
//! shape (arrow functions, identifiers, calls, templates) is kept verbatim
//! as [`AttributeValue::Opaque`] so it still re-serializes unchanged.

use serde::{Deserialize, Serialize};
use serde_json::Number;
use std::fmt;

/// A decoded attribute value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "kebab-case")]
pub enum AttributeValue {
    /// String literal.
    String(String),
    /// Numeric literal.
    #[serde(rename = "numeric-literal")]
    Number(Number),
    /// `true` / `false`, or a shorthand attribute (`<Tabs sync>`).
    Boolean(bool),
    /// Array expression; every element is itself decoded.
    Array(Vec<AttributeValue>),
    /// Object expression; entries keep their source order.
    Object(Vec<ObjectEntry>),
    /// Expression source that has no typed form.
    Opaque(String),
}

/// One `key: value` pair of an object expression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectEntry {
    /// Property name (identifier, string or number key, unquoted).
    pub key: String,
    /// Property value.
    pub value: AttributeValue,
}

impl ObjectEntry {
    /// Creates an entry.
    pub fn new(key: impl Into<String>, value: AttributeValue) -> Self {
        Self {
            key: key.into(),
            value,
        }
    }
}

impl AttributeValue {
    /// Creates a string value.
    pub fn string(value: impl Into<String>) -> Self {
        AttributeValue::String(value.into())
    }

    /// Creates an integer value.
    pub fn integer(value: i64) -> Self {
        AttributeValue::Number(Number::from(value))
    }

    /// Returns true when the value, or any value nested in it, is opaque.
    pub fn is_opaque(&self) -> bool {
        match self {
            AttributeValue::Opaque(_) => true,
            AttributeValue::Array(items) => items.iter().any(AttributeValue::is_opaque),
            AttributeValue::Object(entries) => entries.iter().any(|e| e.value.is_opaque()),
            AttributeValue::String(_) | AttributeValue::Number(_) | AttributeValue::Boolean(_) => {
                false
            }
        }
    }
}

/// How an attribute value is written after `name=`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttributeSyntax {
    /// A quoted JSX string: `"value"` or `'value'`.
    Literal {
        /// Quote character used.
        quote: char,
        /// Unescaped contents.
        value: String,
    },
    /// A braced JavaScript expression; holds the text between the braces.
    Expression(String),
}

impl fmt::Display for AttributeSyntax {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttributeSyntax::Literal { quote, value } => write!(f, "{quote}{value}{quote}"),
            AttributeSyntax::Expression(source) => write!(f, "{{{source}}}"),
        }
    }
}

/// Decodes a JSX literal attribute (`name="value"`).
pub fn decode_literal(value: &str) -> AttributeValue {
    AttributeValue::String(value.to_string())
}

/// Decodes the source between an attribute's braces.
pub fn decode_expression(source: &str) -> AttributeValue {
    let mut parser = ExpressionParser::new(source);
    let parsed = parser.value().and_then(|value| {
        parser.skip_trivia()?;
        parser.at_end().then_some(value).ok_or(Unsupported)
    });
    match parsed {
        Ok(value) => value,
        Err(Unsupported) => AttributeValue::Opaque(source.to_string()),
    }
}

/// Encodes a value into attribute syntax.
///
/// Top-level strings prefer a quoted JSX literal; JSX strings have no
/// escapes, so a string holding both quote kinds falls back to an expression.
pub fn encode(value: &AttributeValue) -> AttributeSyntax {
    match value {
        AttributeValue::String(s) if !s.contains('"') => AttributeSyntax::Literal {
            quote: '"',
            value: s.clone(),
        },
        AttributeValue::String(s) if !s.contains('\'') => AttributeSyntax::Literal {
            quote: '\'',
            value: s.clone(),
        },
        other => AttributeSyntax::Expression(encode_expression(other)),
    }
}

/// Encodes a value as JavaScript expression source.
pub fn encode_expression(value: &AttributeValue) -> String {
    let mut out = String::new();
    write_expression(value, &mut out);
    out
}

fn write_expression(value: &AttributeValue, out: &mut String) {
    match value {
        AttributeValue::String(s) => out.push_str(&quote_string(s)),
        AttributeValue::Number(n) => out.push_str(&n.to_string()),
        AttributeValue::Boolean(b) => out.push_str(if *b { "true" } else { "false" }),
        AttributeValue::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                write_expression(item, out);
            }
            out.push(']');
        }
        AttributeValue::Object(entries) if entries.is_empty() => out.push_str("{}"),
        AttributeValue::Object(entries) => {
            out.push_str("{ ");
            for (i, entry) in entries.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                if is_identifier(&entry.key) {
                    out.push_str(&entry.key);
                } else {
                    out.push_str(&quote_string(&entry.key));
                }
                out.push_str(": ");
                write_expression(&entry.value, out);
            }
            out.push_str(" }");
        }
        AttributeValue::Opaque(source) => out.push_str(source),
    }
}

fn quote_string(value: &str) -> String {
    // JSON string escapes are a subset of JavaScript's.
    serde_json::to_string(value).unwrap_or_else(|_| format!("\"{}\"", value.escape_default()))
}

fn is_identifier(key: &str) -> bool {
    let mut chars = key.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '$')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

/// Marker for expression shapes without a typed form.
#[derive(Debug)]
struct Unsupported;

type Parsed<T> = Result<T, Unsupported>;

/// Recursive descent over the literal subset of JavaScript expressions.
struct ExpressionParser<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> ExpressionParser<'a> {
    fn new(src: &'a str) -> Self {
        Self { src, pos: 0 }
    }

    fn rest(&self) -> &'a str {
        &self.src[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn at_end(&self) -> bool {
        self.pos >= self.src.len()
    }

    fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.pos += expected.len_utf8();
            true
        } else {
            false
        }
    }

    /// Skips whitespace and comments.
    fn skip_trivia(&mut self) -> Parsed<()> {
        loop {
            let rest = self.rest();
            if let Some(c) = rest.chars().next()
                && c.is_whitespace()
            {
                self.pos += c.len_utf8();
            } else if rest.starts_with("//") {
                self.pos += rest.find('\n').unwrap_or(rest.len());
            } else if let Some(comment) = rest.strip_prefix("/*") {
                let close = comment.find("*/").ok_or(Unsupported)?;
                self.pos += 2 + close + 2;
            } else {
                return Ok(());
            }
        }
    }

    fn value(&mut self) -> Parsed<AttributeValue> {
        self.skip_trivia()?;
        match self.peek().ok_or(Unsupported)? {
            '"' | '\'' => self.string().map(AttributeValue::String),
            '[' => self.array(),
            '{' => self.object(),
            '-' | '+' | '.' | '0'..='9' => self.number().map(AttributeValue::Number),
            c if c.is_ascii_alphabetic() => match self.identifier() {
                "true" => Ok(AttributeValue::Boolean(true)),
                "false" => Ok(AttributeValue::Boolean(false)),
                _ => Err(Unsupported),
            },
            _ => Err(Unsupported),
        }
    }

    fn identifier(&mut self) -> &'a str {
        let rest = self.rest();
        let len = rest
            .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_' || c == '$'))
            .unwrap_or(rest.len());
        self.pos += len;
        &rest[..len]
    }

    fn array(&mut self) -> Parsed<AttributeValue> {
        self.bump();
        let mut items = Vec::new();
        loop {
            self.skip_trivia()?;
            if self.eat(']') {
                return Ok(AttributeValue::Array(items));
            }
            if self.peek() == Some(',') {
                // holes have no typed form
                return Err(Unsupported);
            }
            items.push(self.value()?);
            self.skip_trivia()?;
            if !self.eat(',') {
                self.skip_trivia()?;
                return if self.eat(']') {
                    Ok(AttributeValue::Array(items))
                } else {
                    Err(Unsupported)
                };
            }
        }
    }

    fn object(&mut self) -> Parsed<AttributeValue> {
        self.bump();
        let mut entries: Vec<ObjectEntry> = Vec::new();
        loop {
            self.skip_trivia()?;
            if self.eat('}') {
                return Ok(AttributeValue::Object(entries));
            }
            let key = match self.peek().ok_or(Unsupported)? {
                '"' | '\'' => self.string()?,
                '0'..='9' => self.number()?.to_string(),
                c if c.is_ascii_alphabetic() || c == '_' || c == '$' => {
                    self.identifier().to_string()
                }
                _ => return Err(Unsupported),
            };
            self.skip_trivia()?;
            // shorthand properties and methods reference code
            if !self.eat(':') {
                return Err(Unsupported);
            }
            let value = self.value()?;
            // a repeated key keeps only the last value in JavaScript
            entries.retain(|entry| entry.key != key);
            entries.push(ObjectEntry { key, value });
            self.skip_trivia()?;
            if !self.eat(',') {
                self.skip_trivia()?;
                return if self.eat('}') {
                    Ok(AttributeValue::Object(entries))
                } else {
                    Err(Unsupported)
                };
            }
        }
    }

    fn string(&mut self) -> Parsed<String> {
        let quote = self.bump().ok_or(Unsupported)?;
        let mut out = String::new();
        loop {
            match self.bump().ok_or(Unsupported)? {
                c if c == quote => return Ok(out),
                '\n' | '\r' => return Err(Unsupported),
                '\\' => self.escape(&mut out)?,
                c => out.push(c),
            }
        }
    }

    fn escape(&mut self, out: &mut String) -> Parsed<()> {
        match self.bump().ok_or(Unsupported)? {
            'n' => out.push('\n'),
            't' => out.push('\t'),
            'r' => out.push('\r'),
            'b' => out.push('\u{8}'),
            'f' => out.push('\u{c}'),
            'v' => out.push('\u{b}'),
            '0' if !matches!(self.peek(), Some('0'..='9')) => out.push('\0'),
            'x' => {
                let code = self.hex_digits(2)?;
                out.push(char::from_u32(code).ok_or(Unsupported)?);
            }
            'u' => {
                let code = if self.eat('{') {
                    let rest = self.rest();
                    let close = rest.find('}').ok_or(Unsupported)?;
                    let code = u32::from_str_radix(&rest[..close], 16).map_err(|_| Unsupported)?;
                    self.pos += close + 1;
                    code
                } else {
                    let high = self.hex_digits(4)?;
                    if (0xD800..0xDC00).contains(&high) && self.rest().starts_with("\\u") {
                        self.pos += 2;
                        let low = self.hex_digits(4)?;
                        0x10000 + ((high - 0xD800) << 10) + (low.wrapping_sub(0xDC00) & 0x3FF)
                    } else {
                        high
                    }
                };
                out.push(char::from_u32(code).ok_or(Unsupported)?);
            }
            // line continuation
            '\n' => {}
            '\r' => {
                self.eat('\n');
            }
            '1'..='9' => return Err(Unsupported),
            c => out.push(c),
        }
        Ok(())
    }

    fn hex_digits(&mut self, count: usize) -> Parsed<u32> {
        let digits = self.rest().get(..count).ok_or(Unsupported)?;
        let code = u32::from_str_radix(digits, 16).map_err(|_| Unsupported)?;
        self.pos += count;
        Ok(code)
    }

    fn number(&mut self) -> Parsed<Number> {
        let negative = if self.eat('-') {
            true
        } else {
            self.eat('+');
            false
        };
        self.skip_trivia()?;

        let rest = self.rest();
        let radix = match rest.get(..2).map(str::to_ascii_lowercase).as_deref() {
            Some("0x") => Some(16),
            Some("0o") => Some(8),
            Some("0b") => Some(2),
            _ => None,
        };

        if let Some(radix) = radix {
            self.pos += 2;
            let digits = self.take_while(|c| c.is_digit(radix) || c == '_');
            let digits = digits.replace('_', "");
            let value = i64::from_str_radix(&digits, radix).map_err(|_| Unsupported)?;
            return Ok(Number::from(if negative { -value } else { value }));
        }

        let mut literal = String::new();
        if negative {
            literal.push('-');
        }
        let integer = self.take_while(|c| c.is_ascii_digit() || c == '_');
        let mut is_float = false;
        literal.push_str(if integer.is_empty() { "0" } else { integer });
        if self.eat('.') {
            is_float = true;
            let fraction = self.take_while(|c| c.is_ascii_digit() || c == '_');
            literal.push('.');
            literal.push_str(if fraction.is_empty() { "0" } else { fraction });
        }
        if matches!(self.peek(), Some('e' | 'E')) {
            is_float = true;
            self.bump();
            literal.push('e');
            if let Some(sign @ ('+' | '-')) = self.peek() {
                self.bump();
                literal.push(sign);
            }
            let exponent = self.take_while(|c| c.is_ascii_digit());
            if exponent.is_empty() {
                return Err(Unsupported);
            }
            literal.push_str(exponent);
        }
        // BigInt suffix
        if self.peek() == Some('n') {
            return Err(Unsupported);
        }
        if integer.is_empty() && !is_float {
            return Err(Unsupported);
        }

        let literal = literal.replace('_', "");
        if !is_float && let Ok(int) = literal.parse::<i64>() {
            return Ok(Number::from(int));
        }
        let float: f64 = literal.parse().map_err(|_| Unsupported)?;
        Number::from_f64(float).ok_or(Unsupported)
    }

    fn take_while(&mut self, keep: impl Fn(char) -> bool) -> &'a str {
        let rest = self.rest();
        let len = rest.find(|c: char| !keep(c)).unwrap_or(rest.len());
        self.pos += len;
        &rest[..len]
    }
}
