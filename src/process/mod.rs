//! Document styling pipeline.
//!
//! This module ties the engine stages together:
//!
//! - Parse the text into a document tree (line endings normalized first)
//! - Parse markup extensions in attribute values
//! - Apply the rewrite rules (design-time stripping, value normalization,
//!   attribute ordering, structural reordering)
//! - Print the tree with the configured layout
//!
//! The entry points are [`style_document_with`] for in-memory text,
//! [`check_document`] for passive checks, and [`format_file`] which styles a
//! buffered reader into any `Write` implementation.

pub mod pipeline;

pub use pipeline::{check_document, format_file, style_document, style_document_with, CheckOutcome};
