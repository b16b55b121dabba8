//! Tree rewrite rules applied between parsing and printing.
//!
//! - [`design_time`]: Strips designer-only attributes and declarations
//! - [`thickness`]: Normalizes separators in thickness values
//! - [`attribute_order`]: Orders attributes by rule groups and pins first-line attributes
//! - [`reorder`]: Moves and sorts child elements of known containers
//!
//! Rules never fail a document. A rule that cannot decide leaves the affected
//! subtree as it is and logs the reason at debug level.

pub mod attribute_order;
pub mod design_time;
pub mod reorder;
pub mod thickness;

pub use attribute_order::{order_attributes, OrderingRules, RuleMatch};
pub use thickness::normalize_thickness;

use crate::config::Config;
use crate::parser::{Document, Element};

/// Apply every enabled rule to the document
pub fn apply_rules(document: &mut Document, config: &Config) {
    let design_prefixes =
        design_time::design_time_prefixes(document, &config.design_time_namespaces);
    if config.remove_design_time_references {
        design_time::strip_design_time_references(document, &design_prefixes);
    }

    let Some(root) = document.root_mut() else {
        return;
    };
    let rules = OrderingRules::new(&config.attribute_ordering_rule_groups);
    root.walk_mut(&mut |element: &mut Element| {
        thickness::normalize_attributes(element, config);
        order_attributes(element, &rules, config, &design_prefixes);
    });
    reorder::reorder_children(root, config);
}
