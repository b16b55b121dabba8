//! Property tests for attribute ordering and idempotence

#![warn(clippy::all)]
#![warn(clippy::pedantic)]

use proptest::prelude::*;
use proptest::sample::subsequence;
use xamlfmt::config::NewLineStyle;
use xamlfmt::{style_document, Config};

const NAMES: &[&str] = &[
    "x:Name",
    "Width",
    "Height",
    "Margin",
    "Grid.Row",
    "Grid.Column",
    "Content",
    "Tag",
    "Foreground",
    "Canvas.Left",
    "Style",
    "d:DesignWidth",
];

fn unix() -> Config {
    Config {
        new_line_style: NewLineStyle::Unix,
        ..Default::default()
    }
}

fn element(names: &[&str]) -> String {
    let attributes: Vec<String> = names
        .iter()
        .enumerate()
        .map(|(i, name)| format!("{name}=\"{i}\""))
        .collect();
    format!("<Grid>\n<Border {} />\n</Grid>\n", attributes.join(" "))
}

/// Values follow the names, so only the order of `name="value"` pairs varies
fn element_with_values(pairs: &[(&str, usize)]) -> String {
    let attributes: Vec<String> = pairs
        .iter()
        .map(|(name, value)| format!("{name}=\"{value}\""))
        .collect();
    format!("<Border {} />", attributes.join(" "))
}

fn shuffled_names() -> impl Strategy<Value = Vec<&'static str>> {
    subsequence(NAMES.to_vec(), 1..=NAMES.len()).prop_shuffle()
}

proptest! {
    #[test]
    fn attribute_order_ignores_source_order(names in shuffled_names()) {
        let config = unix();
        let pairs: Vec<(&str, usize)> = names
            .iter()
            .map(|name| (*name, NAMES.iter().position(|n| n == name).unwrap_or(0)))
            .collect();
        let mut sorted = pairs.clone();
        sorted.sort_unstable();

        let from_shuffled = style_document(&element_with_values(&pairs), &config).unwrap();
        let from_sorted = style_document(&element_with_values(&sorted), &config).unwrap();
        prop_assert_eq!(from_shuffled, from_sorted);
    }

    #[test]
    fn styling_is_idempotent(
        names in shuffled_names(),
        indent_size in 1usize..=8,
        keep_first in any::<bool>(),
        tolerance in 0usize..=3,
    ) {
        let config = Config {
            indent_size,
            keep_first_attribute_on_same_line: keep_first,
            attributes_tolerance: tolerance,
            ..unix()
        };
        let once = style_document(&element(&names), &config).unwrap();
        let twice = style_document(&once, &config).unwrap();
        prop_assert_eq!(once, twice);
    }
}
