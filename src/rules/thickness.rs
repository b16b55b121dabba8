//! Separator normalization for thickness values (`Margin="0 4 0 4"`).

use std::sync::LazyLock;

use regex::Regex;

use crate::config::{Config, ThicknessStyle};
use crate::parser::Element;

/// A single numeric component
static COMPONENT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[+-]?(\d+(\.\d*)?|\.\d+)([eE][+-]?\d+)?$").unwrap()
});

/// Rewrite a thickness value with the given separator style
///
/// Returns `None` when the value is not 1 to 4 numeric components, or when
/// the style leaves values untouched.
#[must_use]
pub fn normalize_thickness(value: &str, style: ThicknessStyle) -> Option<String> {
    let separator = match style {
        ThicknessStyle::None => return None,
        ThicknessStyle::Comma => ",",
        ThicknessStyle::Space => " ",
    };

    let components: Vec<&str> = if value.contains(',') {
        value.split(',').map(str::trim).collect()
    } else {
        value.split_whitespace().collect()
    };
    let valid = (1..=4).contains(&components.len())
        && components
            .iter()
            .all(|c| !c.contains(char::is_whitespace) && COMPONENT_RE.is_match(c));
    valid.then(|| components.join(separator))
}

/// Normalize every configured thickness attribute of an element
pub fn normalize_attributes(element: &mut Element, config: &Config) {
    if config.thickness_style == ThicknessStyle::None {
        return;
    }
    for attribute in &mut element.attributes {
        if attribute.extension.is_some() {
            continue;
        }
        let name = attribute.name.to_string();
        if !config.thickness_attributes.iter().any(|n| *n == name) {
            continue;
        }
        if let Some(normalized) = normalize_thickness(&attribute.value, config.thickness_style) {
            attribute.value = normalized;
        }
    }
}
