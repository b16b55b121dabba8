//! Start tag layout: attribute wrapping, packing and continuation alignment.

use crate::config::{Config, LineBreakRule};
use crate::format::indent::Indentation;
use crate::format::markup_extension::layout_extension;
use crate::parser::entities::escape_attribute;
use crate::parser::{Attribute, Element};

/// How the start tag ends
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagEnd {
    /// `>`, content follows
    Open,
    /// `/>` or ` />`
    SelfClosing,
}

/// Context for laying out the start tag of one element
pub struct TagContext<'a> {
    pub config: &'a Config,
    pub indent: Indentation,
    pub unescaped: &'a [char],
    pub newline: &'a str,
    pub depth: usize,
    pub is_root: bool,
    /// Inline content: attributes always stay on the tag line
    pub inline: bool,
}

/// `Name="value"` on a single line
#[must_use]
pub fn render_attribute(attribute: &Attribute, unescaped: &[char]) -> String {
    let value = match &attribute.extension {
        Some(extension) => extension.to_string(),
        None => attribute.value.clone(),
    };
    format!("{}=\"{}\"", attribute.name, escape_attribute(&value, unescaped))
}

fn rendered_width(rendered: &[String]) -> usize {
    rendered.iter().map(|r| r.chars().count()).sum::<usize>() + rendered.len().saturating_sub(1)
}

/// Decide whether an element's attributes go on separate lines
#[must_use]
pub fn should_wrap(element: &Element, rendered: &[String], ctx: &TagContext<'_>) -> bool {
    let config = ctx.config;
    if ctx.inline || rendered.is_empty() {
        return false;
    }
    if ctx.is_root {
        match config.root_element_line_break_rule {
            LineBreakRule::Always => return true,
            LineBreakRule::Never => return false,
            LineBreakRule::Default => {}
        }
    }
    let name = element.name.to_string();
    if config.no_new_line_elements.iter().any(|n| *n == name) {
        return false;
    }
    let budget = config.max_attribute_characters_per_line;
    rendered.len() > config.max_attributes_per_line + config.attributes_tolerance
        || (budget > 0 && rendered_width(rendered) > budget)
}

/// Pack attribute indices into lines, at most `max_attributes_per_line` each
///
/// A line also ends before it would exceed the character budget, and before
/// each new rule group when groups go on separate lines.
fn pack_lines(attributes: &[Attribute], rendered: &[String], start: usize, config: &Config) -> Vec<Vec<usize>> {
    let budget = config.max_attribute_characters_per_line;
    let mut lines: Vec<Vec<usize>> = Vec::new();
    let mut current: Vec<usize> = Vec::new();
    let mut width = 0;

    for i in start..rendered.len() {
        let len = rendered[i].chars().count();
        let breaks = current.last().is_some_and(|&prev| {
            current.len() >= config.max_attributes_per_line
                || (budget > 0 && width + 1 + len > budget)
                || (config.put_attribute_order_rule_groups_on_separate_lines
                    && attributes[prev].group != attributes[i].group)
        });
        if breaks {
            lines.push(std::mem::take(&mut current));
            width = 0;
        }
        width += if current.is_empty() { len } else { len + 1 };
        current.push(i);
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

/// Write an attribute that sits alone on its line, splitting a markup extension
///
/// `column` is the alignment column of the attribute relative to the element's
/// own indentation.
fn write_alone(out: &mut String, attribute: &Attribute, rendered: &str, column: usize, ctx: &TagContext<'_>) {
    let Some(extension) = &attribute.extension else {
        out.push_str(rendered);
        return;
    };
    let lines = layout_extension(extension, ctx.config);
    if lines.len() == 1 {
        out.push_str(rendered);
        return;
    }

    let brace_column = column + attribute.name.len() + 2;
    out.push_str(&format!("{}=\"", attribute.name));
    let last = lines.len() - 1;
    for (i, line) in lines.iter().enumerate() {
        if i > 0 {
            out.push_str(ctx.newline);
            out.push_str(&ctx.indent.continuation(ctx.depth, brace_column + line.column));
        }
        out.push_str(&escape_attribute(&line.text, ctx.unescaped));
        if i == last {
            out.push('"');
        }
    }
}

fn push_end(out: &mut String, end: TagEnd, space_before_slash: bool) {
    match end {
        TagEnd::Open => out.push('>'),
        TagEnd::SelfClosing if space_before_slash => out.push_str(" />"),
        TagEnd::SelfClosing => out.push_str("/>"),
    }
}

/// Write `<Name attributes...` followed by the tag end
pub fn write_start_tag(out: &mut String, element: &Element, end: TagEnd, ctx: &TagContext<'_>) {
    let config = ctx.config;
    let rendered: Vec<String> = element
        .attributes
        .iter()
        .map(|a| render_attribute(a, ctx.unescaped))
        .collect();

    out.push('<');
    out.push_str(&element.name.to_string());

    if !should_wrap(element, &rendered, ctx) {
        for attribute in &rendered {
            out.push(' ');
            out.push_str(attribute);
        }
        push_end(out, end, config.space_before_closing_slash);
        return;
    }

    let first_line = if element.pinned_attributes > 0 {
        element.pinned_attributes.min(rendered.len())
    } else {
        usize::from(config.keep_first_attribute_on_same_line)
    };
    let name_column = element.name.len() + 2;
    let column = if config.attribute_indentation > 0 {
        config.attribute_indentation
    } else if first_line > 0 {
        name_column
    } else {
        ctx.indent.size()
    };

    let lines = pack_lines(&element.attributes, &rendered, first_line, config);
    if first_line == 1 && lines.is_empty() {
        out.push(' ');
        write_alone(out, &element.attributes[0], &rendered[0], name_column, ctx);
    } else {
        for attribute in &rendered[..first_line] {
            out.push(' ');
            out.push_str(attribute);
        }
    }

    for line in &lines {
        out.push_str(ctx.newline);
        out.push_str(&ctx.indent.continuation(ctx.depth, column));
        if let [only] = line.as_slice() {
            write_alone(out, &element.attributes[*only], &rendered[*only], column, ctx);
            continue;
        }
        for (k, &i) in line.iter().enumerate() {
            if k > 0 {
                out.push(' ');
            }
            out.push_str(&rendered[i]);
        }
    }

    if config.put_ending_bracket_on_new_line {
        out.push_str(ctx.newline);
        out.push_str(&ctx.indent.level(ctx.depth));
        push_end(out, end, false);
    } else {
        push_end(out, end, config.space_before_closing_slash);
    }
}
