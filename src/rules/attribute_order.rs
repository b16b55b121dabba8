//! Attribute ordering by rule groups.
//!
//! Each rule group is a comma-separated list of name patterns. A pattern is an
//! exact name (`x:Name`) or contains `*` wildcards (`xmlns:*`, `Storyboard.*`).
//! An attribute matching an exact pattern takes that pattern's position. Failing
//! that, the most specific matching wildcard wins (the one with the most
//! literal characters, then the first declared). Attributes matching nothing
//! sort after every group, in source order.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

use regex::Regex;

use crate::config::{split_name_list, Config};
use crate::parser::{Attribute, Element};

/// Position of a pattern within the rule groups
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct RuleMatch {
    pub group: usize,
    pub priority: usize,
    /// False for the terminal bucket of unmatched names
    pub matched: bool,
}

#[derive(Debug)]
struct WildcardPattern {
    regex: Regex,
    specificity: usize,
    position: RuleMatch,
}

#[derive(Debug)]
pub struct OrderingRules {
    exact: HashMap<String, RuleMatch>,
    wildcards: Vec<WildcardPattern>,
    group_count: usize,
}

impl OrderingRules {
    #[must_use]
    pub fn new(groups: &[String]) -> Self {
        let mut exact = HashMap::new();
        let mut wildcards = Vec::new();

        for (group, patterns) in groups.iter().enumerate() {
            for (priority, pattern) in split_name_list(patterns).into_iter().enumerate() {
                let position = RuleMatch {
                    group,
                    priority,
                    matched: true,
                };
                if !pattern.contains('*') {
                    exact.entry(pattern).or_insert(position);
                    continue;
                }
                let source = pattern
                    .split('*')
                    .map(regex::escape)
                    .collect::<Vec<_>>()
                    .join(".*");
                match Regex::new(&format!("^{source}$")) {
                    Ok(regex) => wildcards.push(WildcardPattern {
                        regex,
                        specificity: pattern.chars().filter(|c| *c != '*').count(),
                        position,
                    }),
                    Err(e) => tracing::debug!("skipping attribute pattern {pattern}: {e}"),
                }
            }
        }

        OrderingRules {
            exact,
            wildcards,
            group_count: groups.len(),
        }
    }

    /// Classify a name against the rule groups
    #[must_use]
    pub fn classify(&self, name: &str) -> RuleMatch {
        if let Some(position) = self.exact.get(name) {
            return *position;
        }
        let mut best: Option<&WildcardPattern> = None;
        for pattern in &self.wildcards {
            if pattern.regex.is_match(name)
                && best.map_or(true, |b| pattern.specificity > b.specificity)
            {
                best = Some(pattern);
            }
        }
        best.map_or(
            RuleMatch {
                group: self.group_count,
                priority: 0,
                matched: false,
            },
            |pattern| pattern.position,
        )
    }
}

/// Name used for matching, without a design-time prefix when configured
fn matching_name(attribute: &Attribute, config: &Config, design_prefixes: &HashSet<String>) -> String {
    match &attribute.name.prefix {
        Some(prefix)
            if config.ignore_design_time_reference_prefix && design_prefixes.contains(prefix) =>
        {
            attribute.name.local.clone()
        }
        _ => attribute.name.to_string(),
    }
}

/// Order an element's attributes and pin the configured first-line attributes
///
/// Every attribute records its rule group even when reordering is disabled,
/// since the layout can break lines between groups. Pinned attributes move
/// to the front, in `first_line_attributes` order, after ordering.
pub fn order_attributes(
    element: &mut Element,
    rules: &OrderingRules,
    config: &Config,
    design_prefixes: &HashSet<String>,
) {
    let mut keyed: Vec<(RuleMatch, String, Attribute)> = std::mem::take(&mut element.attributes)
        .into_iter()
        .map(|mut attribute| {
            let name = matching_name(&attribute, config, design_prefixes);
            let position = rules.classify(&name);
            attribute.group = position.group;
            (position, name, attribute)
        })
        .collect();

    if config.enable_attribute_reordering {
        keyed.sort_by(|(a, a_name, a_attr), (b, b_name, b_attr)| {
            a.group
                .cmp(&b.group)
                .then(a.priority.cmp(&b.priority))
                .then_with(|| {
                    if config.order_attributes_by_name && a.matched && b.matched {
                        a_name.cmp(b_name)
                    } else {
                        Ordering::Equal
                    }
                })
                .then(a_attr.index.cmp(&b_attr.index))
        });
    }
    element.attributes = keyed.into_iter().map(|(_, _, attribute)| attribute).collect();

    let mut pinned = 0;
    for name in &config.first_line_attributes {
        let found = element.attributes[pinned..]
            .iter()
            .position(|a| a.name.to_string() == *name);
        if let Some(i) = found {
            let attribute = element.attributes.remove(pinned + i);
            element.attributes.insert(pinned, attribute);
            pinned += 1;
        }
    }
    element.pinned_attributes = pinned;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    fn rules(groups: &[&str]) -> OrderingRules {
        OrderingRules::new(&groups.iter().map(|g| (*g).to_string()).collect::<Vec<_>>())
    }

    fn ordered(source: &str, config: &Config) -> Vec<String> {
        let mut element = parse(source).unwrap().root().unwrap().clone();
        let rules = OrderingRules::new(&config.attribute_ordering_rule_groups);
        order_attributes(&mut element, &rules, config, &HashSet::from(["d".to_string()]));
        element.attributes.iter().map(|a| a.name.to_string()).collect()
    }

    #[test]
    fn test_exact_match_wins_over_wildcard() {
        let rules = rules(&["*", "x:Name"]);
        assert_eq!(rules.classify("x:Name").group, 1);
        assert_eq!(rules.classify("Width").group, 0);
    }

    #[test]
    fn test_most_specific_wildcard_wins() {
        let rules = rules(&["*", "*:*", "Storyboard.*", "xmlns:*"]);
        assert_eq!(rules.classify("Storyboard.TargetName").group, 2);
        assert_eq!(rules.classify("xmlns:local").group, 3);
        assert_eq!(rules.classify("d:DesignWidth").group, 1);
        assert_eq!(rules.classify("Content").group, 0);
    }

    #[test]
    fn test_wildcard_tie_goes_to_first_declared() {
        let rules = rules(&["A*", "*B"]);
        assert_eq!(rules.classify("AB").group, 0);
    }

    #[test]
    fn test_unmatched_goes_to_terminal_bucket() {
        let rules = rules(&["x:Name", "Width"]);
        assert_eq!(
            rules.classify("Content"),
            RuleMatch {
                group: 2,
                priority: 0,
                matched: false,
            }
        );
    }

    #[test]
    fn test_order_by_groups_keeps_unmatched_in_source_order() {
        let config = Config {
            attribute_ordering_rule_groups: vec!["x:Name".to_string(), "Width".to_string()],
            ..Default::default()
        };
        assert_eq!(
            ordered(r#"<Button Zeta="1" Width="10" x:Name="b1" Alpha="2"/>"#, &config),
            vec!["x:Name", "Width", "Zeta", "Alpha"]
        );
    }

    #[test]
    fn test_default_groups() {
        let config = Config::default();
        assert_eq!(
            ordered(
                r#"<Button Content="Hi" Margin="1" Grid.Row="1" x:Name="b" Width="2" Command="{Binding Go}" />"#,
                &config
            ),
            vec!["x:Name", "Grid.Row", "Width", "Margin", "Command", "Content"]
        );
    }

    #[test]
    fn test_order_by_name_disabled_keeps_source_order_within_pattern() {
        let config = Config {
            order_attributes_by_name: false,
            ..Default::default()
        };
        assert_eq!(
            ordered(r#"<Button Content="Hi" Command="{Binding Go}" />"#, &config),
            vec!["Content", "Command"]
        );
    }

    #[test]
    fn test_reordering_disabled_still_assigns_groups() {
        let config = Config {
            enable_attribute_reordering: false,
            ..Default::default()
        };
        let mut element = parse(r#"<Button Content="Hi" x:Name="b" />"#)
            .unwrap()
            .root()
            .unwrap()
            .clone();
        let rules = OrderingRules::new(&config.attribute_ordering_rule_groups);
        order_attributes(&mut element, &rules, &config, &HashSet::new());
        assert_eq!(element.attributes[0].name.to_string(), "Content");
        assert_eq!(element.attributes[0].group, 7);
        assert_eq!(element.attributes[1].group, 3);
    }

    #[test]
    fn test_first_line_attributes_pinned_after_ordering() {
        let config = Config {
            first_line_attributes: vec!["Content".to_string(), "Missing".to_string(), "Width".to_string()],
            ..Default::default()
        };
        let mut element = parse(r#"<Button Width="1" Content="Hi" x:Name="b" Height="2" />"#)
            .unwrap()
            .root()
            .unwrap()
            .clone();
        let rules = OrderingRules::new(&config.attribute_ordering_rule_groups);
        order_attributes(&mut element, &rules, &config, &HashSet::new());
        let names: Vec<String> = element.attributes.iter().map(|a| a.name.to_string()).collect();
        assert_eq!(names, vec!["Content", "Width", "x:Name", "Height"]);
        assert_eq!(element.pinned_attributes, 2);
    }

    #[test]
    fn test_ignore_design_time_prefix() {
        let config = Config {
            ignore_design_time_reference_prefix: true,
            ..Default::default()
        };
        assert_eq!(
            ordered(r#"<Grid Tag="t" d:Height="2" Width="1" />"#, &config),
            vec!["Width", "d:Height", "Tag"]
        );

        assert_eq!(
            ordered(r#"<Grid d:Height="2" Height="1" />"#, &config),
            vec!["d:Height", "Height"]
        );

        let config = Config::default();
        assert_eq!(
            ordered(r#"<Grid d:Height="2" Height="1" />"#, &config),
            vec!["Height", "d:Height"]
        );
    }
}
