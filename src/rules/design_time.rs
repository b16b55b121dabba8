//! Design-time reference handling.
//!
//! Designer tools add attributes like `d:DesignWidth` under prefixes bound to
//! a design-time namespace, plus an `mc:Ignorable` list naming those prefixes.

use std::collections::HashSet;

use crate::config::MARKUP_COMPATIBILITY_NAMESPACE;
use crate::directive::{self, Marker};
use crate::parser::{Document, Element, Node};

/// Prefixes declared anywhere in the document for one of `namespaces`
#[must_use]
pub fn design_time_prefixes(document: &Document, namespaces: &[String]) -> HashSet<String> {
    declared_prefixes(document, |uri| namespaces.iter().any(|ns| ns == uri))
}

fn declared_prefixes(document: &Document, matches: impl Fn(&str) -> bool) -> HashSet<String> {
    let mut prefixes = HashSet::new();
    if let Some(root) = document.root() {
        root.walk(&mut |element: &Element| {
            for attribute in &element.attributes {
                if let Some(prefix) = attribute.declared_prefix() {
                    if matches(&attribute.value) {
                        prefixes.insert(prefix.to_string());
                    }
                }
            }
        });
    }
    prefixes
}

/// Prefixes named by elements the printer copies from the source
///
/// That covers `xml:space="preserve"` content and runs between
/// `xamlfmt:off` and `xamlfmt:on` markers.
fn verbatim_prefixes(document: &Document) -> HashSet<String> {
    let mut prefixes = HashSet::new();
    collect_verbatim(&document.nodes, false, &mut prefixes);
    prefixes
}

fn collect_verbatim(nodes: &[Node], verbatim: bool, prefixes: &mut HashSet<String>) {
    let mut region_until = 0;
    for (i, node) in nodes.iter().enumerate() {
        let in_region = verbatim || i < region_until;
        if let Node::Element(element) = node {
            if in_region {
                let names = std::iter::once(&element.name).chain(element.attributes.iter().map(|a| &a.name));
                prefixes.extend(names.filter_map(|name| name.prefix.clone()));
            }
            let preserved = element.preserve_space && element.content_span.as_ref().is_some_and(|c| !c.is_empty());
            collect_verbatim(&element.children, in_region || preserved, prefixes);
        }
        if !in_region && directive::node_marker(node) == Some(Marker::Off) {
            region_until = directive::region_end(nodes, i).unwrap_or(nodes.len());
        }
    }
}

fn has_prefix(prefix: Option<&String>, prefixes: &HashSet<String>) -> bool {
    prefix.is_some_and(|p| prefixes.contains(p))
}

/// Remove design-time attributes and the declarations that only served them
///
/// A design-time prefix that is still used by an element name, or anywhere
/// inside a region written verbatim, keeps its declaration and its
/// `mc:Ignorable` entry.
pub fn strip_design_time_references(document: &mut Document, prefixes: &HashSet<String>) {
    if prefixes.is_empty() {
        return;
    }
    let compatibility_prefixes =
        declared_prefixes(document, |uri| uri == MARKUP_COMPATIBILITY_NAMESPACE);
    let verbatim = verbatim_prefixes(document);
    let Some(root) = document.root_mut() else {
        return;
    };

    let mut removed = 0usize;
    root.walk_mut(&mut |element: &mut Element| {
        let before = element.attributes.len();
        element
            .attributes
            .retain(|a| !has_prefix(a.name.prefix.as_ref(), prefixes));
        removed += before - element.attributes.len();
    });

    let mut still_used: HashSet<String> = prefixes.intersection(&verbatim).cloned().collect();
    root.walk(&mut |element: &Element| {
        if let Some(prefix) = &element.name.prefix {
            if prefixes.contains(prefix) {
                still_used.insert(prefix.clone());
            }
        }
    });
    let unused: HashSet<String> = prefixes.difference(&still_used).cloned().collect();
    tracing::debug!(
        "removed {removed} design-time attributes; dropping declarations for {unused:?}"
    );

    root.walk_mut(&mut |element: &mut Element| {
        element
            .attributes
            .retain(|a| !a.declared_prefix().is_some_and(|p| unused.contains(p)));
        element.attributes.retain_mut(|a| {
            if a.name.local != "Ignorable" || !has_prefix(a.name.prefix.as_ref(), &compatibility_prefixes) {
                return true;
            }
            let kept = a
                .value
                .split_whitespace()
                .filter(|token| !unused.contains(*token))
                .collect::<Vec<_>>()
                .join(" ");
            a.value = kept;
            !a.value.is_empty()
        });
    });

    let mut compatibility_used: HashSet<String> =
        compatibility_prefixes.intersection(&verbatim).cloned().collect();
    root.walk(&mut |element: &Element| {
        let names = std::iter::once(&element.name).chain(element.attributes.iter().map(|a| &a.name));
        for name in names {
            if let Some(prefix) = &name.prefix {
                if compatibility_prefixes.contains(prefix) {
                    compatibility_used.insert(prefix.clone());
                }
            }
        }
    });
    root.walk_mut(&mut |element: &mut Element| {
        element.attributes.retain(|a| {
            !a.declared_prefix().is_some_and(|p| {
                compatibility_prefixes.contains(p) && !compatibility_used.contains(p)
            })
        });
    });
}
