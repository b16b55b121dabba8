//! Inline suppression markers for `<!-- xamlfmt: off -->` comments
//!
//! Sibling nodes between an `off` marker and the next `on` marker (or the end
//! of the parent element) are written exactly as they appear in the source.

use std::sync::LazyLock;

use regex::Regex;

use crate::parser::Node;

/// Pattern to match a suppression marker comment body
static MARKER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^\s*xamlfmt:\s*(off|on)\s*$").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker {
    Off,
    On,
}

/// Parse a comment body as a suppression marker
#[must_use]
pub fn parse_marker(comment: &str) -> Option<Marker> {
    let caps = MARKER_RE.captures(comment)?;
    if caps.get(1)?.as_str().eq_ignore_ascii_case("off") {
        Some(Marker::Off)
    } else {
        Some(Marker::On)
    }
}

/// The marker carried by a node, if it is a marker comment
#[must_use]
pub fn node_marker(node: &Node) -> Option<Marker> {
    match node {
        Node::Comment(raw) => parse_marker(&raw.content),
        _ => None,
    }
}

/// Check if any of the nodes is a marker comment
#[must_use]
pub fn contains_marker(nodes: &[Node]) -> bool {
    nodes.iter().any(|node| node_marker(node).is_some())
}

/// Index one past the `on` marker closing the region opened at `off_index`
///
/// Returns `None` when the region runs to the end of `nodes`.
#[must_use]
pub fn region_end(nodes: &[Node], off_index: usize) -> Option<usize> {
    nodes
        .iter()
        .enumerate()
        .skip(off_index + 1)
        .find(|(_, node)| node_marker(node) == Some(Marker::On))
        .map(|(i, _)| i + 1)
}
