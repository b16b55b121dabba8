//! XAML output layout.
//!
//! This module contains the layout and serialization logic organized into submodules:
//! - [`indent`]: Indentation strings for element and continuation lines
//! - [`attributes`]: Start tag layout, attribute wrapping and packing
//! - [`markup_extension`]: One-argument-per-line layout of markup extensions
//! - [`printer`]: Writes the whole document tree back to text

pub mod attributes;
pub mod indent;
pub mod markup_extension;
pub mod printer;

pub use attributes::{render_attribute, should_wrap, write_start_tag, TagContext, TagEnd};
pub use indent::Indentation;
pub use markup_extension::{layout_extension, should_split, ExtensionLine};
pub use printer::print_document;
