//! Document tree produced by the parser and rewritten by the rules.

use std::fmt;
use std::ops::Range;

use crate::parser::markup_extension::MarkupExtension;

/// Byte range into the source text
pub type Span = Range<usize>;

/// A possibly prefixed XML name (`x:Name`, `Grid.Row`, `Button`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QName {
    pub prefix: Option<String>,
    pub local: String,
}

impl QName {
    /// Split a raw name at its first `:`
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        match raw.split_once(':') {
            Some((prefix, local)) if !prefix.is_empty() => QName {
                prefix: Some(prefix.to_string()),
                local: local.to_string(),
            },
            _ => QName {
                prefix: None,
                local: raw.to_string(),
            },
        }
    }

    /// `Grid.RowDefinitions`-style names set a property of the owning type
    #[must_use]
    pub fn is_property_element(&self) -> bool {
        self.local.contains('.')
    }

    /// Length of the name as written
    #[must_use]
    pub fn len(&self) -> usize {
        self.prefix.as_ref().map_or(0, |p| p.chars().count() + 1) + self.local.chars().count()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Display for QName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.prefix {
            Some(prefix) => write!(f, "{prefix}:{}", self.local),
            None => f.write_str(&self.local),
        }
    }
}

/// One attribute of an element, with its decoded value
#[derive(Debug, Clone, PartialEq)]
pub struct Attribute {
    pub name: QName,
    pub value: String,
    /// Position among the element's attributes in the source
    pub index: usize,
    /// Byte offset of the attribute name in the source
    pub offset: usize,
    /// Rule group the attribute was classified into
    pub group: usize,
    /// Parsed form of the value when it is a markup extension
    pub extension: Option<MarkupExtension>,
}

impl Attribute {
    #[must_use]
    pub fn new(name: QName, value: String, index: usize, offset: usize) -> Self {
        Attribute {
            name,
            value,
            index,
            offset,
            group: 0,
            extension: None,
        }
    }

    /// `xmlns` or `xmlns:p`
    #[must_use]
    pub fn is_namespace_declaration(&self) -> bool {
        match &self.name.prefix {
            Some(prefix) => prefix == "xmlns",
            None => self.name.local == "xmlns",
        }
    }

    /// The prefix bound by an `xmlns:p` declaration
    #[must_use]
    pub fn declared_prefix(&self) -> Option<&str> {
        match &self.name.prefix {
            Some(prefix) if prefix == "xmlns" => Some(&self.name.local),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub name: QName,
    pub attributes: Vec<Attribute>,
    pub children: Vec<Node>,
    /// Written as `<X/>` in the source
    pub self_closing: bool,
    /// Carries `xml:space="preserve"`
    pub preserve_space: bool,
    /// Attributes that started before the first line break of the source start tag
    ///
    /// Only recorded for library callers. Layout pins attributes through
    /// `pinned_attributes` instead.
    pub first_line_attribute_count: usize,
    /// Leading attributes pinned to the tag line
    pub pinned_attributes: usize,
    pub span: Span,
    /// Source range between the start and end tags
    pub content_span: Option<Span>,
}

impl Element {
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|a| a.name.to_string() == name)
    }

    /// Value of the attribute with this qualified name, such as `x:Name` or `Grid.Row`
    #[must_use]
    pub fn attribute_value(&self, name: &str) -> Option<&str> {
        self.attribute(name).map(|a| a.value.as_str())
    }

    /// Any non-whitespace text child
    #[must_use]
    pub fn has_significant_text(&self) -> bool {
        self.children.iter().any(|child| match child {
            Node::Text(text) => !text.is_whitespace(),
            Node::CData(_) => true,
            _ => false,
        })
    }

    /// No children other than whitespace text
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.children
            .iter()
            .all(|child| matches!(child, Node::Text(text) if text.is_whitespace()))
    }

    /// Child elements, depth first, including `self`
    pub fn walk_mut(&mut self, visit: &mut impl FnMut(&mut Element)) {
        visit(self);
        for child in &mut self.children {
            if let Node::Element(element) = child {
                element.walk_mut(visit);
            }
        }
    }

    pub fn walk(&self, visit: &mut impl FnMut(&Element)) {
        visit(self);
        for child in &self.children {
            if let Node::Element(element) = child {
                element.walk(visit);
            }
        }
    }
}

/// Character data, decoded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Text {
    pub value: String,
    pub span: Span,
}

impl Text {
    #[must_use]
    pub fn is_whitespace(&self) -> bool {
        self.value.chars().all(is_xml_whitespace)
    }

    /// Line breaks contained in the text
    #[must_use]
    pub fn line_breaks(&self) -> usize {
        self.value.matches('\n').count()
    }
}

/// Verbatim markup: comment bodies, CDATA content, processing instructions, doctype
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Raw {
    pub content: String,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Element(Element),
    Text(Text),
    /// Text between `<!--` and `-->`
    Comment(Raw),
    /// Text between `<![CDATA[` and `]]>`
    CData(Raw),
    /// The whole `<?...?>`
    ProcessingInstruction(Raw),
    /// The whole `<!DOCTYPE ...>`
    Doctype(Raw),
}

impl Node {
    #[must_use]
    pub fn span(&self) -> Span {
        match self {
            Node::Element(element) => element.span.clone(),
            Node::Text(text) => text.span.clone(),
            Node::Comment(raw)
            | Node::CData(raw)
            | Node::ProcessingInstruction(raw)
            | Node::Doctype(raw) => raw.span.clone(),
        }
    }

    #[must_use]
    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(element) => Some(element),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_whitespace(&self) -> bool {
        matches!(self, Node::Text(text) if text.is_whitespace())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    /// Top-level nodes, exactly one of which is an element
    pub nodes: Vec<Node>,
    pub has_bom: bool,
    pub trailing_newline: bool,
}

impl Document {
    #[must_use]
    pub fn root(&self) -> Option<&Element> {
        self.nodes.iter().find_map(Node::as_element)
    }

    pub fn root_mut(&mut self) -> Option<&mut Element> {
        self.nodes.iter_mut().find_map(|node| match node {
            Node::Element(element) => Some(element),
            _ => None,
        })
    }
}

#[must_use]
pub fn is_xml_whitespace(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\r')
}
