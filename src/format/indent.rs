//! Indentation strings for element lines and attribute continuation lines.

use crate::config::{AttributeIndentationStyle, Config};

/// Indentation settings resolved from a [`Config`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Indentation {
    size: usize,
    tabs: bool,
    style: AttributeIndentationStyle,
}

impl Indentation {
    #[must_use]
    pub fn new(size: usize, tabs: bool, style: AttributeIndentationStyle) -> Self {
        Indentation {
            size: size.max(1),
            tabs,
            style,
        }
    }

    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.indent_size,
            config.indent_with_tabs,
            config.attribute_indentation_style,
        )
    }

    #[must_use]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Indentation of a line at nesting `depth`
    #[must_use]
    pub fn level(&self, depth: usize) -> String {
        if self.tabs {
            "\t".repeat(depth)
        } else {
            " ".repeat(depth * self.size)
        }
    }

    /// Indentation at nesting `depth` plus `extra` alignment columns
    ///
    /// With tabs, `mixed` style turns as many whole indent widths as possible
    /// into tabs; `spaces` style uses tabs for `depth` only.
    #[must_use]
    pub fn continuation(&self, depth: usize, extra: usize) -> String {
        if !self.tabs {
            return " ".repeat(depth * self.size + extra);
        }
        match self.style {
            AttributeIndentationStyle::Mixed => {
                let total = depth * self.size + extra;
                "\t".repeat(total / self.size) + &" ".repeat(total % self.size)
            }
            AttributeIndentationStyle::Spaces => "\t".repeat(depth) + &" ".repeat(extra),
        }
    }
}
