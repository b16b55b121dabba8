//! Recursive-descent parser from markup text to a [`Document`].
//!
//! The input is expected to use `\n` line endings; the pipeline normalizes
//! them before parsing. Spans are byte ranges into the text given to [`parse`],
//! including a leading byte order mark when present.

use crate::error::StyleError;
use crate::parser::entities::{self, InvalidReference};
use crate::parser::tree::{
    is_xml_whitespace, Attribute, Document, Element, Node, QName, Raw, Text,
};

/// Elements nested deeper than this fail with [`StyleError::DepthExceeded`]
pub const MAX_NESTING_DEPTH: usize = 256;

const BOM: char = '\u{feff}';

/// Parse markup text into a document tree
pub fn parse(text: &str) -> Result<Document, StyleError> {
    let has_bom = text.starts_with(BOM);
    let mut parser = Parser {
        src: text,
        pos: if has_bom { BOM.len_utf8() } else { 0 },
    };
    let nodes = parser.parse_top_level()?;
    Ok(Document {
        nodes,
        has_bom,
        trailing_newline: text.ends_with('\n'),
    })
}

struct Parser<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn rest(&self) -> &'a str {
        &self.src[self.pos..]
    }

    fn at_end(&self) -> bool {
        self.pos >= self.src.len()
    }

    fn starts_with(&self, prefix: &str) -> bool {
        self.rest().starts_with(prefix)
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn error(&self, offset: usize, message: impl Into<String>) -> StyleError {
        StyleError::malformed(self.src, offset, message)
    }

    /// Skip whitespace, returning the skipped slice
    fn skip_whitespace(&mut self) -> &'a str {
        let start = self.pos;
        let len = self
            .rest()
            .find(|c: char| !is_xml_whitespace(c))
            .unwrap_or(self.rest().len());
        self.pos += len;
        &self.src[start..self.pos]
    }

    fn parse_top_level(&mut self) -> Result<Vec<Node>, StyleError> {
        let mut nodes = Vec::new();
        let mut has_root = false;

        while !self.at_end() {
            if !self.starts_with("<") {
                let start = self.pos;
                let len = self.rest().find('<').unwrap_or(self.rest().len());
                let value = &self.src[start..start + len];
                if let Some(i) = value.find(|c: char| !is_xml_whitespace(c)) {
                    return Err(self.error(start + i, "text outside the root element"));
                }
                self.pos += len;
                nodes.push(Node::Text(Text {
                    value: value.to_string(),
                    span: start..self.pos,
                }));
            } else if self.starts_with("<?") {
                nodes.push(Node::ProcessingInstruction(self.parse_processing_instruction()?));
            } else if self.starts_with("<!--") {
                nodes.push(Node::Comment(self.parse_comment()?));
            } else if self.starts_with("<!DOCTYPE") {
                if has_root {
                    return Err(self.error(self.pos, "doctype after the root element"));
                }
                nodes.push(Node::Doctype(self.parse_doctype()?));
            } else if self.starts_with("<![CDATA[") {
                return Err(self.error(self.pos, "CDATA section outside the root element"));
            } else if self.starts_with("</") {
                return Err(self.error(self.pos, "end tag without a matching start tag"));
            } else {
                if has_root {
                    return Err(self.error(self.pos, "multiple root elements"));
                }
                has_root = true;
                nodes.push(Node::Element(self.parse_element(1)?));
            }
        }

        if !has_root {
            return Err(self.error(self.pos, "missing root element"));
        }
        Ok(nodes)
    }

    fn read_name(&mut self) -> &'a str {
        let start = self.pos;
        let mut chars = self.rest().char_indices();
        let len = match chars.next() {
            Some((_, c)) if is_name_start(c) => chars
                .find(|&(_, c)| !is_name_char(c))
                .map_or(self.rest().len(), |(i, _)| i),
            _ => 0,
        };
        self.pos += len;
        &self.src[start..self.pos]
    }

    fn parse_element(&mut self, depth: usize) -> Result<Element, StyleError> {
        let start = self.pos;
        if depth > MAX_NESTING_DEPTH {
            return Err(StyleError::depth_exceeded(self.src, start, MAX_NESTING_DEPTH));
        }

        self.pos += 1;
        let raw_name = self.read_name();
        if raw_name.is_empty() {
            return Err(self.error(self.pos, "expected an element name after '<'"));
        }

        let mut attributes: Vec<Attribute> = Vec::new();
        let mut first_line_attribute_count = 0;
        let mut crossed_line = false;
        let self_closing = loop {
            let whitespace = self.skip_whitespace();
            crossed_line |= whitespace.contains('\n');
            if self.starts_with("/>") {
                self.pos += 2;
                break true;
            }
            if self.starts_with(">") {
                self.pos += 1;
                break false;
            }
            if self.at_end() {
                return Err(self.error(start, format!("unterminated start tag <{raw_name}")));
            }
            if whitespace.is_empty() {
                return Err(self.error(self.pos, "expected whitespace before attribute"));
            }

            let attribute = self.parse_attribute(attributes.len())?;
            if attributes.iter().any(|a| a.name == attribute.name) {
                return Err(self.error(
                    attribute.offset,
                    format!("duplicate attribute {}", attribute.name),
                ));
            }
            if !crossed_line {
                first_line_attribute_count += 1;
            }
            attributes.push(attribute);
        };

        let preserve_space = attributes
            .iter()
            .any(|a| a.name.to_string() == "xml:space" && a.value == "preserve");
        let mut element = Element {
            name: QName::parse(raw_name),
            attributes,
            children: Vec::new(),
            self_closing,
            preserve_space,
            first_line_attribute_count,
            pinned_attributes: 0,
            span: start..self.pos,
            content_span: None,
        };
        if self_closing {
            return Ok(element);
        }

        let content_start = self.pos;
        loop {
            if self.at_end() {
                return Err(self.error(start, format!("element <{raw_name}> is never closed")));
            }
            if self.starts_with("</") {
                let end_tag = self.pos;
                self.pos += 2;
                let end_name = self.read_name();
                if end_name != raw_name {
                    return Err(self.error(
                        end_tag,
                        format!("expected </{raw_name}>, found </{end_name}>"),
                    ));
                }
                self.skip_whitespace();
                if !self.starts_with(">") {
                    return Err(self.error(self.pos, format!("unterminated end tag </{raw_name}")));
                }
                self.pos += 1;
                element.content_span = Some(content_start..end_tag);
                element.span = start..self.pos;
                return Ok(element);
            }

            let child = if self.starts_with("<!--") {
                Node::Comment(self.parse_comment()?)
            } else if self.starts_with("<![CDATA[") {
                Node::CData(self.parse_cdata()?)
            } else if self.starts_with("<?") {
                Node::ProcessingInstruction(self.parse_processing_instruction()?)
            } else if self.starts_with("<!") {
                return Err(self.error(self.pos, "unexpected markup declaration"));
            } else if self.starts_with("<") {
                Node::Element(self.parse_element(depth + 1)?)
            } else {
                Node::Text(self.parse_text()?)
            };
            element.children.push(child);
        }
    }

    fn parse_attribute(&mut self, index: usize) -> Result<Attribute, StyleError> {
        let offset = self.pos;
        let raw_name = self.read_name();
        if raw_name.is_empty() {
            let found = self.peek().map_or_else(String::new, String::from);
            return Err(self.error(offset, format!("unexpected character '{found}' in tag")));
        }

        self.skip_whitespace();
        if !self.starts_with("=") {
            return Err(self.error(self.pos, format!("expected '=' after attribute {raw_name}")));
        }
        self.pos += 1;
        self.skip_whitespace();

        let quote = match self.peek() {
            Some(q @ ('"' | '\'')) => q,
            _ => {
                return Err(self.error(
                    self.pos,
                    format!("expected a quoted value for attribute {raw_name}"),
                ))
            }
        };
        self.pos += 1;
        let value_start = self.pos;
        let Some(len) = self.rest().find(quote) else {
            return Err(self.error(
                offset,
                format!("unterminated value for attribute {raw_name}"),
            ));
        };
        self.pos += len + 1;

        // Literal whitespace characters become spaces; references survive decoding
        let normalized = self.src[value_start..value_start + len].replace(['\t', '\n', '\r'], " ");
        let value = entities::decode(&normalized)
            .map_err(|e| self.reference_error(value_start, &e))?
            .into_owned();

        Ok(Attribute::new(QName::parse(raw_name), value, index, offset))
    }

    fn parse_text(&mut self) -> Result<Text, StyleError> {
        let start = self.pos;
        let len = self.rest().find('<').unwrap_or(self.rest().len());
        self.pos += len;
        let raw = &self.src[start..self.pos];
        let value = entities::decode(raw)
            .map_err(|e| self.reference_error(start, &e))?
            .into_owned();
        Ok(Text {
            value,
            span: start..self.pos,
        })
    }

    fn reference_error(&self, base: usize, err: &InvalidReference) -> StyleError {
        self.error(
            base + err.offset,
            format!("invalid reference {}", err.reference),
        )
    }

    /// Consume `open ... close`, returning the text between the delimiters
    fn parse_delimited(&mut self, open: &str, close: &str, what: &str) -> Result<Raw, StyleError> {
        let start = self.pos;
        let body_start = start + open.len();
        let Some(len) = self.src[body_start..].find(close) else {
            return Err(self.error(start, format!("unterminated {what}")));
        };
        self.pos = body_start + len + close.len();
        Ok(Raw {
            content: self.src[body_start..body_start + len].to_string(),
            span: start..self.pos,
        })
    }

    fn parse_comment(&mut self) -> Result<Raw, StyleError> {
        self.parse_delimited("<!--", "-->", "comment")
    }

    fn parse_cdata(&mut self) -> Result<Raw, StyleError> {
        self.parse_delimited("<![CDATA[", "]]>", "CDATA section")
    }

    fn parse_processing_instruction(&mut self) -> Result<Raw, StyleError> {
        let start = self.pos;
        self.parse_delimited("<?", "?>", "processing instruction")?;
        Ok(Raw {
            content: self.src[start..self.pos].to_string(),
            span: start..self.pos,
        })
    }

    /// `<!DOCTYPE ...>` with an optional `[...]` internal subset
    fn parse_doctype(&mut self) -> Result<Raw, StyleError> {
        let start = self.pos;
        let mut bracket_depth = 0usize;
        let mut quote: Option<char> = None;
        for (i, c) in self.rest().char_indices() {
            match (quote, c) {
                (Some(q), c) if c == q => quote = None,
                (Some(_), _) => {}
                (None, '"' | '\'') => quote = Some(c),
                (None, '[') => bracket_depth += 1,
                (None, ']') => bracket_depth = bracket_depth.saturating_sub(1),
                (None, '>') if bracket_depth == 0 => {
                    self.pos = start + i + 1;
                    return Ok(Raw {
                        content: self.src[start..self.pos].to_string(),
                        span: start..self.pos,
                    });
                }
                _ => {}
            }
        }
        Err(self.error(start, "unterminated doctype"))
    }
}

fn is_name_start(c: char) -> bool {
    c.is_alphabetic() || c == '_' || c == ':'
}

fn is_name_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '_' | ':' | '.' | '-') || (!c.is_ascii() && !c.is_whitespace())
}
