//! Structural reordering of child elements.
//!
//! Children are grouped into units: an element together with the comments and
//! whitespace directly before it. Sorting moves whole units and only between
//! the slots of the units being sorted, so everything else keeps its place.

use std::cmp::Ordering;

use crate::config::{Config, ReorderSettersBy, VisualStateManagerRule};
use crate::directive;
use crate::error::StyleError;
use crate::parser::{Element, Node};

const VISUAL_STATE_GROUPS: &str = "VisualStateManager.VisualStateGroups";
const GRID_KEYS: [&str; 2] = ["Grid.Row", "Grid.Column"];
const CANVAS_KEYS: [&str; 4] = ["Canvas.Left", "Canvas.Top", "Canvas.Right", "Canvas.Bottom"];

struct Unit {
    leading: Vec<Node>,
    element: Element,
}

fn split_units(children: Vec<Node>) -> (Vec<Unit>, Vec<Node>) {
    let mut units = Vec::new();
    let mut pending = Vec::new();
    for child in children {
        match child {
            Node::Element(element) => units.push(Unit {
                leading: std::mem::take(&mut pending),
                element,
            }),
            other => pending.push(other),
        }
    }
    (units, pending)
}

fn join_units(units: Vec<Unit>, tail: Vec<Node>) -> Vec<Node> {
    let mut children = Vec::new();
    for unit in units {
        children.extend(unit.leading);
        children.push(Node::Element(unit.element));
    }
    children.extend(tail);
    children
}

/// Elements whose children can move without changing the document's meaning
fn can_reorder(element: &Element) -> bool {
    !element.preserve_space
        && !element.has_significant_text()
        && !directive::contains_marker(&element.children)
}

/// Apply the configured structural rules to every element under `root`
pub fn reorder_children(root: &mut Element, config: &Config) {
    root.walk_mut(&mut |element: &mut Element| {
        if !can_reorder(element) {
            return;
        }
        if config.reorder_vsm != VisualStateManagerRule::None {
            move_visual_state_groups(element, config.reorder_vsm);
        }
        let unprefixed = element.name.prefix.is_none();
        let local = element.name.local.clone();
        let result = match local.as_str() {
            "Grid" if unprefixed && config.reorder_grid_children => {
                sort_slots(
                    element,
                    |child| !child.name.is_property_element(),
                    grid_key,
                    Ord::cmp,
                )
            }
            "Canvas" if unprefixed && config.reorder_canvas_children => {
                sort_slots(
                    element,
                    |child| !child.name.is_property_element(),
                    canvas_key,
                    |a: &[f64; 4], b: &[f64; 4]| {
                        a.iter()
                            .zip(b)
                            .map(|(x, y)| x.total_cmp(y))
                            .find(|o| o.is_ne())
                            .unwrap_or(Ordering::Equal)
                    },
                )
            }
            _ => Ok(()),
        };
        if let Err(err) = result {
            tracing::debug!("{err}; leaving children in source order");
        }

        if config.reorder_setters != ReorderSettersBy::None {
            let by = config.reorder_setters;
            let result = sort_slots(
                element,
                |child| child.name.local == "Setter",
                |child| Ok(setter_key(child, by)),
                Ord::cmp,
            );
            if let Err(err) = result {
                tracing::debug!("{err}; leaving setters in source order");
            }
        }
    });
}

/// Move `VisualStateManager.VisualStateGroups` to the first or last slot
fn move_visual_state_groups(element: &mut Element, rule: VisualStateManagerRule) {
    let is_vsm = |unit: &Unit| unit.element.name.local == VISUAL_STATE_GROUPS;
    let (units, tail) = split_units(std::mem::take(&mut element.children));
    let (vsm, others): (Vec<Unit>, Vec<Unit>) = units.into_iter().partition(is_vsm);
    let units = match rule {
        VisualStateManagerRule::First => vsm.into_iter().chain(others).collect(),
        _ => others.into_iter().chain(vsm).collect(),
    };
    element.children = join_units(units, tail);
}

/// Stable-sort the candidate children among their own slots
fn sort_slots<K>(
    element: &mut Element,
    is_candidate: impl Fn(&Element) -> bool,
    key: impl Fn(&Element) -> Result<K, StyleError>,
    compare: impl Fn(&K, &K) -> Ordering,
) -> Result<(), StyleError> {
    let (units, tail) = split_units(std::mem::take(&mut element.children));
    let slots: Vec<usize> = units
        .iter()
        .enumerate()
        .filter(|(_, unit)| is_candidate(&unit.element))
        .map(|(i, _)| i)
        .collect();

    let keys: Result<Vec<K>, StyleError> = slots.iter().map(|&i| key(&units[i].element)).collect();
    let keys = match keys {
        Ok(keys) => keys,
        Err(err) => {
            element.children = join_units(units, tail);
            return Err(err);
        }
    };

    let mut order: Vec<usize> = (0..slots.len()).collect();
    order.sort_by(|&a, &b| compare(&keys[a], &keys[b]));

    let mut taken: Vec<Option<Unit>> = units.into_iter().map(Some).collect();
    let sorted: Vec<Unit> = order
        .iter()
        .filter_map(|&k| taken[slots[k]].take())
        .collect();
    for (&slot, unit) in slots.iter().zip(sorted) {
        taken[slot] = Some(unit);
    }
    element.children = join_units(taken.into_iter().flatten().collect(), tail);
    Ok(())
}

fn ambiguous(parent: &str, name: &str, value: &str) -> StyleError {
    StyleError::AmbiguousReorder {
        element: parent.to_string(),
        reason: format!("{name}=\"{value}\" is not a number"),
    }
}

fn grid_key(child: &Element) -> Result<[i64; 2], StyleError> {
    let mut key = [0; 2];
    for (slot, name) in key.iter_mut().zip(GRID_KEYS) {
        if let Some(value) = child.attribute_value(name) {
            *slot = value
                .trim()
                .parse()
                .map_err(|_| ambiguous("Grid", name, value))?;
        }
    }
    Ok(key)
}

fn canvas_key(child: &Element) -> Result<[f64; 4], StyleError> {
    let mut key = [0.0; 4];
    for (slot, name) in key.iter_mut().zip(CANVAS_KEYS) {
        if let Some(value) = child.attribute_value(name) {
            *slot = value
                .trim()
                .parse()
                .map_err(|_| ambiguous("Canvas", name, value))?;
        }
    }
    Ok(key)
}

fn setter_key(child: &Element, by: ReorderSettersBy) -> (String, String) {
    let value = |name: &str| child.attribute_value(name).unwrap_or_default().to_string();
    match by {
        ReorderSettersBy::Property => (value("Property"), String::new()),
        ReorderSettersBy::TargetName => (value("TargetName"), String::new()),
        ReorderSettersBy::TargetNameThenProperty => (value("TargetName"), value("Property")),
        ReorderSettersBy::None => (String::new(), String::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    fn reordered(source: &str, config: &Config) -> Element {
        let mut root = parse(source).unwrap().root().unwrap().clone();
        reorder_children(&mut root, config);
        root
    }

    fn child_names(element: &Element) -> Vec<String> {
        element
            .children
            .iter()
            .filter_map(|n| match n {
                Node::Element(e) => Some(
                    e.attribute_value("x:Name")
                        .map_or_else(|| e.name.to_string(), ToString::to_string),
                ),
                Node::Comment(raw) => Some(format!("#{}", raw.content.trim())),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_grid_children_sorted_by_row_then_column() {
        let config = Config {
            reorder_grid_children: true,
            ..Default::default()
        };
        let root = reordered(
            r#"<Grid>
    <Button x:Name="c" Grid.Row="1" Grid.Column="1" />
    <Grid.RowDefinitions />
    <!-- first -->
    <Button x:Name="a" />
    <Button x:Name="b" Grid.Row="1" />
</Grid>"#,
            &config,
        );
        assert_eq!(
            child_names(&root),
            vec!["#first", "a", "Grid.RowDefinitions", "b", "c"]
        );
    }

    #[test]
    fn test_grid_non_numeric_key_leaves_children() {
        let config = Config {
            reorder_grid_children: true,
            ..Default::default()
        };
        let root = reordered(
            r#"<Grid><Button x:Name="b" Grid.Row="{Binding R}" /><Button x:Name="a" /></Grid>"#,
            &config,
        );
        assert_eq!(child_names(&root), vec!["b", "a"]);
    }

    #[test]
    fn test_canvas_children_sorted_by_position() {
        let config = Config {
            reorder_canvas_children: true,
            ..Default::default()
        };
        let root = reordered(
            r#"<Canvas><Rectangle x:Name="b" Canvas.Left="10.5" /><Rectangle x:Name="c" Canvas.Left="10.5" Canvas.Top="3" /><Rectangle x:Name="a" Canvas.Left="-1" /></Canvas>"#,
            &config,
        );
        assert_eq!(child_names(&root), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_setters_sorted_by_target_then_property() {
        let config = Config {
            reorder_setters: ReorderSettersBy::TargetNameThenProperty,
            ..Default::default()
        };
        let root = reordered(
            r#"<VisualState.Setters>
    <Setter x:Name="3" TargetName="b" Property="Width" />
    <Setter x:Name="2" TargetName="a" Property="Width" />
    <Setter x:Name="1" TargetName="a" Property="Height" />
</VisualState.Setters>"#,
            &config,
        );
        assert_eq!(child_names(&root), vec!["1", "2", "3"]);
    }

    #[test]
    fn test_setters_by_property_is_stable() {
        let config = Config {
            reorder_setters: ReorderSettersBy::Property,
            ..Default::default()
        };
        let root = reordered(
            r#"<Style><Setter x:Name="b" Property="Margin" /><Setter x:Name="a" Property="Margin" /><Setter x:Name="c" Property="Background" /></Style>"#,
            &config,
        );
        assert_eq!(child_names(&root), vec!["c", "b", "a"]);
    }

    #[test]
    fn test_visual_state_groups_moved() {
        let source = r#"<Grid><VisualStateManager.VisualStateGroups /><Button x:Name="a" /><Button x:Name="b" /></Grid>"#;
        let last = reordered(source, &Config::default());
        assert_eq!(
            child_names(&last),
            vec!["a", "b", "VisualStateManager.VisualStateGroups"]
        );

        let first = reordered(
            r#"<Grid><Button x:Name="a" /><VisualStateManager.VisualStateGroups /></Grid>"#,
            &Config {
                reorder_vsm: VisualStateManagerRule::First,
                ..Default::default()
            },
        );
        assert_eq!(
            child_names(&first),
            vec!["VisualStateManager.VisualStateGroups", "a"]
        );
    }

    #[test]
    fn test_suppression_markers_block_reordering() {
        let config = Config {
            reorder_grid_children: true,
            ..Default::default()
        };
        let root = reordered(
            r#"<Grid><!-- xamlfmt:off --><Button x:Name="b" Grid.Row="2" /><Button x:Name="a" /></Grid>"#,
            &config,
        );
        assert_eq!(child_names(&root), vec!["#xamlfmt:off", "b", "a"]);
    }
}
