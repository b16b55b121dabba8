//! Markup extension expressions inside attribute values.
//!
//! Grammar: `{Name arg, arg, Key=value, Key={Nested ...}}`. Arguments are
//! separated by commas at brace depth zero outside quotes; a backslash escapes
//! the next character. Literals are kept as written apart from surrounding
//! whitespace, so printing a parsed extension and parsing it again yields an
//! equal tree.

use std::fmt;

/// Nested extensions deeper than this are rejected
pub const MAX_EXTENSION_DEPTH: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkupExtension {
    pub name: String,
    pub arguments: Vec<Argument>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Argument {
    Positional(Value),
    Named { key: String, value: Value },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Literal(String),
    Extension(MarkupExtension),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtensionError {
    /// Not parseable as an extension; the value is kept verbatim
    Unsupported(String),
    DepthExceeded,
}

impl fmt::Display for ExtensionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExtensionError::Unsupported(reason) => f.write_str(reason),
            ExtensionError::DepthExceeded => write!(
                f,
                "markup extensions nested deeper than {MAX_EXTENSION_DEPTH}"
            ),
        }
    }
}

/// Whether a value should be parsed as a markup extension
///
/// `{}` at the start escapes a literal brace.
#[must_use]
pub fn looks_like_extension(value: &str) -> bool {
    let trimmed = value.trim();
    trimmed.starts_with('{') && trimmed.ends_with('}') && !trimmed.starts_with("{}")
}

pub fn parse(value: &str) -> Result<MarkupExtension, ExtensionError> {
    if !looks_like_extension(value) {
        return Err(ExtensionError::Unsupported(
            "not a markup extension".to_string(),
        ));
    }
    let chars: Vec<char> = value.trim().chars().collect();
    let mut parser = ExtensionParser { chars, pos: 0 };
    let extension = parser.parse_extension(1)?;
    if parser.pos != parser.chars.len() {
        return Err(ExtensionError::Unsupported(
            "unexpected text after the closing brace".to_string(),
        ));
    }
    Ok(extension)
}

/// Parse a value, treating anything that is not a well-formed extension as a literal
#[must_use]
pub fn try_parse(value: &str) -> Option<MarkupExtension> {
    parse(value).ok()
}

struct ExtensionParser {
    chars: Vec<char>,
    pos: usize,
}

impl ExtensionParser {
    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn starts_with(&self, s: &str) -> bool {
        s.chars()
            .enumerate()
            .all(|(i, c)| self.chars.get(self.pos + i) == Some(&c))
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }
    }

    fn unsupported(message: &str) -> ExtensionError {
        ExtensionError::Unsupported(message.to_string())
    }

    fn parse_extension(&mut self, depth: usize) -> Result<MarkupExtension, ExtensionError> {
        if depth > MAX_EXTENSION_DEPTH {
            return Err(ExtensionError::DepthExceeded);
        }
        // Caller guarantees '{'
        self.pos += 1;
        self.skip_whitespace();

        let name_start = self.pos;
        match self.peek() {
            Some(c) if c.is_alphabetic() || c == '_' => {}
            _ => return Err(Self::unsupported("extension name must start with a letter")),
        }
        while self
            .peek()
            .is_some_and(|c| c.is_alphanumeric() || matches!(c, '_' | ':' | '.'))
        {
            self.pos += 1;
        }
        let name: String = self.chars[name_start..self.pos].iter().collect();

        let mut arguments = Vec::new();
        self.skip_whitespace();
        if self.peek() == Some('}') {
            self.pos += 1;
            return Ok(MarkupExtension { name, arguments });
        }
        if self.pos == name_start + name.chars().count() && self.peek() == Some(',') {
            return Err(Self::unsupported("expected whitespace after the extension name"));
        }

        loop {
            arguments.push(self.parse_argument(depth)?);
            self.skip_whitespace();
            match self.peek() {
                Some(',') => self.pos += 1,
                Some('}') => {
                    self.pos += 1;
                    return Ok(MarkupExtension { name, arguments });
                }
                Some(_) => return Err(Self::unsupported("expected ',' or '}'")),
                None => return Err(Self::unsupported("missing closing brace")),
            }
        }
    }

    fn parse_argument(&mut self, depth: usize) -> Result<Argument, ExtensionError> {
        self.skip_whitespace();
        if self.is_nested_extension() {
            return Ok(Argument::Positional(Value::Extension(
                self.parse_extension(depth + 1)?,
            )));
        }

        let literal = self.scan_literal(true)?;
        if self.peek() != Some('=') {
            return Ok(Argument::Positional(Value::Literal(literal)));
        }

        if literal.is_empty() {
            return Err(Self::unsupported("named argument without a key"));
        }
        self.pos += 1;
        self.skip_whitespace();
        let value = if self.is_nested_extension() {
            Value::Extension(self.parse_extension(depth + 1)?)
        } else {
            Value::Literal(self.scan_literal(false)?)
        };
        Ok(Argument::Named {
            key: literal,
            value,
        })
    }

    fn is_nested_extension(&self) -> bool {
        self.peek() == Some('{') && !self.starts_with("{}")
    }

    /// Scan up to the next top-level ',' or '}' (or '=' when `stop_at_equals`)
    fn scan_literal(&mut self, stop_at_equals: bool) -> Result<String, ExtensionError> {
        let start = self.pos;
        let mut quote: Option<char> = None;
        let mut brace_depth = 0usize;
        // Escaped characters are never trimmed
        let mut escaped_end = start;
        while let Some(c) = self.peek() {
            if c == '\\' {
                self.pos += 2;
                escaped_end = self.pos;
                continue;
            }
            match quote {
                Some(q) if c == q => quote = None,
                Some(_) => {}
                None => match c {
                    '\'' | '"' => quote = Some(c),
                    '{' => brace_depth += 1,
                    '}' if brace_depth > 0 => brace_depth -= 1,
                    '}' | ',' if brace_depth == 0 => break,
                    '=' if stop_at_equals && brace_depth == 0 => break,
                    _ => {}
                },
            }
            self.pos += 1;
        }
        if quote.is_some() || self.pos > self.chars.len() {
            return Err(Self::unsupported("unterminated quoted literal"));
        }

        let mut end = self.pos;
        while end > escaped_end && self.chars[end - 1].is_whitespace() {
            end -= 1;
        }
        let mut begin = start;
        while begin < end && self.chars[begin].is_whitespace() {
            begin += 1;
        }
        let literal: String = self.chars[begin..end].iter().collect();
        if literal.is_empty() && !stop_at_equals {
            return Err(Self::unsupported("named argument without a value"));
        }
        if literal.is_empty() && self.peek() != Some('=') {
            return Err(Self::unsupported("empty argument"));
        }
        Ok(literal)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Literal(literal) => f.write_str(literal),
            Value::Extension(extension) => extension.fmt(f),
        }
    }
}

impl fmt::Display for Argument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Argument::Positional(value) => value.fmt(f),
            Argument::Named { key, value } => write!(f, "{key}={value}"),
        }
    }
}

impl fmt::Display for MarkupExtension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{{}", self.name)?;
        for (i, argument) in self.arguments.iter().enumerate() {
            f.write_str(if i == 0 { " " } else { ", " })?;
            argument.fmt(f)?;
        }
        f.write_str("}")
    }
}
