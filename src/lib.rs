//! xamlfmt - Deterministic formatter for XAML markup
//!
//! Parses a XAML document, applies ordering and normalization rules, and
//! writes it back with a configurable attribute layout.

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::struct_excessive_bools)]

pub mod cli;
pub mod config;
pub mod dialect;
pub mod directive;
pub mod error;
pub mod format;
pub mod parser;
pub mod process;
pub mod rules;

// Re-export commonly used types
pub use cli::{build_cli, parse_args, parse_args_from, CliArgs};
pub use config::{Config, PartialConfig};
pub use dialect::Dialect;
pub use error::{Result, StyleError};
pub use process::{check_document, style_document, CheckOutcome};
