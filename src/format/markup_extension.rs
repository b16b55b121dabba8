//! Line layout for markup extensions that are split one argument per line.

use crate::config::Config;
use crate::parser::markup_extension::{Argument, MarkupExtension, Value};

/// One output line of an extension
///
/// `column` is relative to the opening brace of the outermost extension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtensionLine {
    pub column: usize,
    pub text: String,
}

/// Whether an extension is written one argument per line
#[must_use]
pub fn should_split(extension: &MarkupExtension, config: &Config) -> bool {
    let budget = config.max_attribute_characters_per_line;
    config.format_markup_extension
        && extension.arguments.len() > 1
        && !config
            .no_new_line_markup_extensions
            .iter()
            .any(|name| *name == extension.name)
        && (budget == 0 || extension.to_string().chars().count() > budget)
}

/// Lay out an extension, splitting it and its nested extensions where allowed
///
/// Arguments after the first align with the first argument, just after
/// `{Name `. An extension that stays whole yields a single line.
#[must_use]
pub fn layout_extension(extension: &MarkupExtension, config: &Config) -> Vec<ExtensionLine> {
    if !should_split(extension, config) {
        return vec![ExtensionLine {
            column: 0,
            text: extension.to_string(),
        }];
    }

    let argument_column = extension.name.chars().count() + 2;
    let count = extension.arguments.len();
    let mut lines = Vec::new();
    for (i, argument) in extension.arguments.iter().enumerate() {
        let (key, value) = match argument {
            Argument::Positional(value) => (String::new(), value),
            Argument::Named { key, value } => (format!("{key}="), value),
        };
        let value_lines = match value {
            Value::Extension(nested) => layout_extension(nested, config),
            Value::Literal(literal) => vec![ExtensionLine {
                column: 0,
                text: literal.clone(),
            }],
        };
        let value_column = argument_column + key.chars().count();
        let last = value_lines.len() - 1;
        for (j, line) in value_lines.into_iter().enumerate() {
            let (column, mut text) = match (i, j) {
                (0, 0) => (0, format!("{{{} {key}{}", extension.name, line.text)),
                (_, 0) => (argument_column, format!("{key}{}", line.text)),
                _ => (value_column + line.column, line.text),
            };
            if j == last {
                text.push(if i + 1 == count { '}' } else { ',' });
            }
            lines.push(ExtensionLine { column, text });
        }
    }
    lines
}
