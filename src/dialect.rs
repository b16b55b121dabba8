//! Markup dialect capabilities.
//!
//! XAML variants differ in which characters may appear unescaped inside
//! attribute values. Avalonia (`.axaml`) files keep `>` as written.

use std::path::Path;

use crate::config::Config;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dialect {
    pub name: &'static str,
    unescaped: Vec<char>,
}

impl Dialect {
    /// WPF/UWP/MAUI XAML with the configured allow-list
    #[must_use]
    pub fn xaml(config: &Config) -> Self {
        Dialect {
            name: "xaml",
            unescaped: allowed(&config.unescaped_attribute_characters),
        }
    }

    /// Avalonia XAML: `>` is left unescaped in attribute values
    #[must_use]
    pub fn avalonia(config: &Config) -> Self {
        let mut unescaped = allowed(&config.unescaped_attribute_characters);
        if !unescaped.contains(&'>') {
            unescaped.push('>');
        }
        Dialect {
            name: "axaml",
            unescaped,
        }
    }

    /// Pick the dialect from a file extension
    #[must_use]
    pub fn for_path(path: &Path, config: &Config) -> Self {
        let is_avalonia = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("axaml"));
        if is_avalonia {
            Self::avalonia(config)
        } else {
            Self::xaml(config)
        }
    }

    /// Characters written as is in attribute values
    #[must_use]
    pub fn unescaped_attribute_characters(&self) -> &[char] {
        &self.unescaped
    }
}

/// `&` and `"` always need escaping inside a double-quoted value
fn allowed(characters: &[char]) -> Vec<char> {
    characters
        .iter()
        .copied()
        .filter(|c| !matches!(c, '&' | '"'))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dialect_for_path() {
        let config = Config::default();
        assert_eq!(Dialect::for_path(Path::new("Views/Main.axaml"), &config).name, "axaml");
        assert_eq!(Dialect::for_path(Path::new("Views/Main.xaml"), &config).name, "xaml");
        assert!(Dialect::xaml(&config).unescaped_attribute_characters().is_empty());
        assert_eq!(Dialect::avalonia(&config).unescaped_attribute_characters(), &['>']);
    }

    #[test]
    fn test_configured_characters_are_filtered() {
        let config = Config {
            unescaped_attribute_characters: vec!['<', '&', '"'],
            ..Default::default()
        };
        assert_eq!(Dialect::xaml(&config).unescaped_attribute_characters(), &['<']);
        assert_eq!(
            Dialect::avalonia(&config).unescaped_attribute_characters(),
            &['<', '>']
        );
    }
}
