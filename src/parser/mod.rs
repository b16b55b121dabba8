//! XAML source parsing.
//!
//! This module turns markup text into the tree the rules and printer work on:
//! - [`document`]: Recursive-descent parser producing a [`Document`]
//! - [`entities`]: Entity/character reference decoding and output escaping
//! - [`markup_extension`]: Parser for `{Binding ...}`-style attribute values
//! - [`tree`]: The node types
//!
//! Parsing never drops content: comments, CDATA and processing instructions
//! are kept verbatim, and every node records its source span so regions can be
//! reproduced byte for byte.

pub mod document;
pub mod entities;
pub mod markup_extension;
pub mod tree;

pub use document::{parse, MAX_NESTING_DEPTH};
pub use markup_extension::{ExtensionError, MarkupExtension, MAX_EXTENSION_DEPTH};
pub use tree::{Attribute, Document, Element, Node, QName, Raw, Text};

use crate::error::StyleError;

/// Parse every attribute value that looks like a markup extension
///
/// Values with unsupported syntax stay plain literals. Nesting beyond
/// [`MAX_EXTENSION_DEPTH`] fails the document.
pub fn annotate_markup_extensions(
    document: &mut Document,
    source: &str,
) -> Result<(), StyleError> {
    let mut failure = None;
    for node in &mut document.nodes {
        let Node::Element(root) = node else {
            continue;
        };
        root.walk_mut(&mut |element: &mut Element| {
            for attribute in &mut element.attributes {
                if failure.is_some() || !markup_extension::looks_like_extension(&attribute.value) {
                    continue;
                }
                match markup_extension::parse(&attribute.value) {
                    Ok(extension) => attribute.extension = Some(extension),
                    Err(ExtensionError::DepthExceeded) => {
                        failure = Some(StyleError::depth_exceeded(
                            source,
                            attribute.offset,
                            MAX_EXTENSION_DEPTH,
                        ));
                    }
                    Err(ExtensionError::Unsupported(reason)) => {
                        let err = StyleError::UnsupportedExtensionSyntax {
                            value: attribute.value.clone(),
                            reason,
                        };
                        tracing::debug!("{err}; keeping the value verbatim");
                    }
                }
            }
        });
    }
    failure.map_or(Ok(()), Err)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_annotate_sets_extensions() {
        let source = r#"<A B="{Binding Foo}" C="plain" D="{!x}" />"#;
        let mut document = parse(source).unwrap();
        annotate_markup_extensions(&mut document, source).unwrap();
        let root = document.root().unwrap();
        assert_eq!(
            root.attributes[0].extension.as_ref().map(|e| e.name.as_str()),
            Some("Binding")
        );
        assert!(root.attributes[1].extension.is_none());
        assert!(root.attributes[2].extension.is_none());
    }

    #[test]
    fn test_annotate_depth_failure() {
        let depth = MAX_EXTENSION_DEPTH + 1;
        let value = "{A ".repeat(depth) + "x" + &"}".repeat(depth);
        let source = format!("<Root>\n  <A B=\"{value}\" />\n</Root>");
        let mut document = parse(&source).unwrap();
        let err = annotate_markup_extensions(&mut document, &source).unwrap_err();
        assert_eq!(
            err,
            StyleError::DepthExceeded {
                limit: MAX_EXTENSION_DEPTH,
                line: 2,
                column: 6,
            }
        );
    }
}
