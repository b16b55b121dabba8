//! Styling pipeline
//!
//! Implements the main styling pipeline:
//! - Normalize line endings
//! - Parse into a document tree and annotate markup extensions
//! - Apply the rewrite rules
//! - Print with the configured layout

use std::borrow::Cow;
use std::io::{BufRead, Write};

use anyhow::Context;

use crate::config::Config;
use crate::dialect::Dialect;
use crate::error::StyleError;
use crate::format::print_document;
use crate::parser::{annotate_markup_extensions, parse};
use crate::rules::apply_rules;
use crate::Result;

/// Outcome of checking a document without rewriting it
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckOutcome {
    /// Already formatted
    Unchanged,
    /// Styling would change the document
    Changed { formatted: String },
}

/// Convert `\r\n` and lone `\r` to `\n`
fn normalize_line_endings(text: &str) -> Cow<'_, str> {
    if text.contains('\r') {
        Cow::Owned(text.replace("\r\n", "\n").replace('\r', "\n"))
    } else {
        Cow::Borrowed(text)
    }
}

/// Style a document with the default XAML dialect
pub fn style_document(text: &str, config: &Config) -> std::result::Result<String, StyleError> {
    style_document_with(text, config, &Dialect::xaml(config))
}

/// Style a document
///
/// Pure function of its inputs: the same text, config and dialect always
/// give the same output, and styling the output again returns it unchanged.
pub fn style_document_with(
    text: &str,
    config: &Config,
    dialect: &Dialect,
) -> std::result::Result<String, StyleError> {
    if config.suppress_processing {
        return Ok(text.to_string());
    }

    let source = normalize_line_endings(text);
    let mut document = parse(&source)?;
    if config.format_markup_extension {
        annotate_markup_extensions(&mut document, &source)?;
    }
    apply_rules(&mut document, config);
    Ok(print_document(&document, &source, config, dialect))
}

/// Style a document without producing a rewrite, reporting whether it would change
pub fn check_document(
    text: &str,
    config: &Config,
    dialect: &Dialect,
) -> std::result::Result<CheckOutcome, StyleError> {
    let formatted = style_document_with(text, config, dialect)?;
    if formatted == text {
        Ok(CheckOutcome::Unchanged)
    } else {
        Ok(CheckOutcome::Changed { formatted })
    }
}

/// Style the contents of `input` into `output`
///
/// Returns whether the styled text differs from the input. `filename` is
/// only used in error messages.
pub fn format_file<R: BufRead, W: Write>(
    input: R,
    output: &mut W,
    config: &Config,
    dialect: &Dialect,
    filename: &str,
) -> Result<bool> {
    let mut text = String::new();
    let mut reader = input;
    reader
        .read_to_string(&mut text)
        .with_context(|| format!("{filename}: input is not valid UTF-8"))?;

    let formatted = style_document_with(&text, config, dialect)
        .with_context(|| format!("failed to style {filename}"))?;
    output.write_all(formatted.as_bytes())?;
    Ok(formatted != text)
}
