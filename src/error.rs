//! Error types and result aliases for xamlfmt.
//!
//! This module defines the error handling infrastructure:
//! - [`Result<T>`]: Type alias for `anyhow::Result<T>` used by the front end
//! - [`StyleError`]: Typed errors raised by the styling engine

use anyhow::Result as AnyhowResult;
use thiserror::Error;

pub type Result<T> = AnyhowResult<T>;

/// Errors produced while styling a single document.
///
/// Only [`StyleError::MalformedMarkup`] and [`StyleError::DepthExceeded`] ever
/// escape the engine. The other two are raised by individual rules, logged,
/// and turned into a no-op for the affected attribute or subtree.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StyleError {
    #[error("malformed markup at line {line}, column {column}: {message}")]
    MalformedMarkup {
        message: String,
        line: usize,
        column: usize,
    },

    #[error("nesting depth exceeds limit of {limit} at line {line}, column {column}")]
    DepthExceeded {
        limit: usize,
        line: usize,
        column: usize,
    },

    #[error("unsupported markup extension syntax in `{value}`: {reason}")]
    UnsupportedExtensionSyntax { value: String, reason: String },

    #[error("cannot reorder children of <{element}>: {reason}")]
    AmbiguousReorder { element: String, reason: String },
}

impl StyleError {
    /// Build a [`StyleError::MalformedMarkup`] for a byte offset into `source`.
    pub(crate) fn malformed(source: &str, offset: usize, message: impl Into<String>) -> Self {
        let (line, column) = line_column(source, offset);
        StyleError::MalformedMarkup {
            message: message.into(),
            line,
            column,
        }
    }

    pub(crate) fn depth_exceeded(source: &str, offset: usize, limit: usize) -> Self {
        let (line, column) = line_column(source, offset);
        StyleError::DepthExceeded {
            limit,
            line,
            column,
        }
    }

    /// Whether formatting can continue past this error.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            StyleError::UnsupportedExtensionSyntax { .. } | StyleError::AmbiguousReorder { .. }
        )
    }
}

/// 1-based line and column of a byte offset. Columns count characters.
fn line_column(source: &str, offset: usize) -> (usize, usize) {
    let mut end = offset.min(source.len());
    while !source.is_char_boundary(end) {
        end -= 1;
    }
    let before = &source[..end];
    let line = before.matches('\n').count() + 1;
    let line_start = before.rfind('\n').map_or(0, |i| i + 1);
    let column = before[line_start..].chars().count() + 1;
    (line, column)
}
