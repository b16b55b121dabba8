//! Serializes a rewritten document tree back to text.
//!
//! Elements without significant text put each child on its own line, one
//! level deeper. Elements with text or CDATA keep their content on one line
//! with whitespace collapsed. Preserved regions (`xml:space="preserve"`
//! content and suppressed sibling runs) are copied from the source.

use crate::config::Config;
use crate::dialect::Dialect;
use crate::directive::{self, Marker};
use crate::format::attributes::{write_start_tag, TagContext, TagEnd};
use crate::format::indent::Indentation;
use crate::parser::entities::escape_text;
use crate::parser::tree::is_xml_whitespace;
use crate::parser::{Document, Element, Node};

/// How a run of block children ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BlockEnd {
    Normal,
    /// A suppressed region ran to the end of the parent
    RawTail,
}

/// Print a document parsed from `source`
#[must_use]
pub fn print_document(document: &Document, source: &str, config: &Config, dialect: &Dialect) -> String {
    let mut printer = Printer {
        source,
        config,
        indent: Indentation::from_config(config),
        unescaped: dialect.unescaped_attribute_characters(),
        newline: config.new_line_style.as_str(),
        out: String::with_capacity(source.len() + source.len() / 4),
    };
    if document.has_bom {
        printer.out.push('\u{feff}');
    }
    let end = printer.write_block(&document.nodes, 0, source.len(), true);
    if end == BlockEnd::RawTail {
        let trimmed = printer.out.trim_end_matches(|c: char| is_xml_whitespace(c)).len();
        printer.out.truncate(trimmed);
    }
    if document.trailing_newline {
        printer.out.push_str(printer.newline);
    }
    printer.out
}

struct Printer<'a> {
    source: &'a str,
    config: &'a Config,
    indent: Indentation,
    unescaped: &'a [char],
    newline: &'static str,
    out: String,
}

impl Printer<'_> {
    /// Copy a source range, converting line endings
    fn write_raw(&mut self, start: usize, end: usize) {
        let raw = &self.source[start..end.max(start)];
        self.push_converted(raw);
    }

    fn push_converted(&mut self, text: &str) {
        if self.newline == "\n" {
            self.out.push_str(text);
        } else {
            self.out.push_str(&text.replace('\n', self.newline));
        }
    }

    fn new_line(&mut self, depth: usize) {
        self.out.push_str(self.newline);
        self.out.push_str(&self.indent.level(depth));
    }

    /// Write nodes one per line at `depth`
    ///
    /// `content_end` is where a suppressed region without an `on` marker stops.
    fn write_block(&mut self, nodes: &[Node], depth: usize, content_end: usize, top_level: bool) -> BlockEnd {
        let mut first = true;
        let mut line_breaks = 0;
        let mut i = 0;
        while i < nodes.len() {
            let node = &nodes[i];
            if let Node::Text(text) = node {
                if text.is_whitespace() {
                    line_breaks = text.line_breaks();
                    i += 1;
                    continue;
                }
            }

            if !first && line_breaks >= 2 {
                self.out.push_str(self.newline);
            }
            if first && top_level {
                self.out.push_str(&self.indent.level(depth));
            } else {
                self.new_line(depth);
            }
            first = false;
            line_breaks = 0;

            self.write_node(node, depth, top_level, false);
            i += 1;

            if directive::node_marker(node) == Some(Marker::Off) {
                let start = node.span().end;
                match directive::region_end(nodes, i - 1) {
                    Some(end) => {
                        self.write_raw(start, nodes[end - 1].span().end);
                        i = end;
                    }
                    None => {
                        self.write_raw(start, content_end);
                        return BlockEnd::RawTail;
                    }
                }
            }
        }
        BlockEnd::Normal
    }

    fn write_node(&mut self, node: &Node, depth: usize, is_root: bool, inline: bool) {
        match node {
            Node::Element(element) => self.write_element(element, depth, is_root, inline),
            Node::Text(text) => {
                let collapsed = collapse_whitespace(&text.value);
                self.out.push_str(&escape_text(&collapsed));
            }
            Node::Comment(raw) => self.write_comment(&raw.content),
            Node::CData(raw) => {
                self.out.push_str("<![CDATA[");
                self.push_converted(&raw.content);
                self.out.push_str("]]>");
            }
            Node::ProcessingInstruction(raw) | Node::Doctype(raw) => {
                self.push_converted(&raw.content);
            }
        }
    }

    fn write_comment(&mut self, content: &str) {
        self.out.push_str("<!--");
        if content.contains('\n') {
            self.push_converted(content);
        } else {
            let trimmed = content.trim();
            if !trimmed.is_empty() {
                let pad = self.config.comment_spaces;
                let leading = if trimmed.starts_with('-') { pad.max(1) } else { pad };
                let trailing = if trimmed.ends_with('-') { pad.max(1) } else { pad };
                self.out.push_str(&" ".repeat(leading));
                self.out.push_str(trimmed);
                self.out.push_str(&" ".repeat(trailing));
            }
        }
        self.out.push_str("-->");
    }

    fn tag_context(&self, depth: usize, is_root: bool, inline: bool) -> TagContext<'_> {
        TagContext {
            config: self.config,
            indent: self.indent,
            unescaped: self.unescaped,
            newline: self.newline,
            depth,
            is_root,
            inline,
        }
    }

    fn write_start_tag(&mut self, element: &Element, end: TagEnd, depth: usize, is_root: bool, inline: bool) {
        let mut tag = String::new();
        write_start_tag(&mut tag, element, end, &self.tag_context(depth, is_root, inline));
        self.out.push_str(&tag);
    }

    fn write_end_tag(&mut self, element: &Element) {
        self.out.push_str("</");
        self.out.push_str(&element.name.to_string());
        self.out.push('>');
    }

    fn write_element(&mut self, element: &Element, depth: usize, is_root: bool, inline: bool) {
        if element.preserve_space {
            if let Some(content) = element.content_span.clone().filter(|c| !c.is_empty()) {
                self.write_start_tag(element, TagEnd::Open, depth, is_root, inline);
                self.write_raw(content.start, content.end);
                self.write_end_tag(element);
                return;
            }
        }

        if element.is_empty() {
            if self.config.remove_ending_tag_of_empty_element || element.self_closing {
                self.write_start_tag(element, TagEnd::SelfClosing, depth, is_root, inline);
            } else {
                self.write_start_tag(element, TagEnd::Open, depth, is_root, inline);
                self.write_end_tag(element);
            }
            return;
        }

        let content_end = element
            .content_span
            .as_ref()
            .map_or(element.span.end, |c| c.end);
        if inline || element.has_significant_text() {
            self.write_start_tag(element, TagEnd::Open, depth, is_root, inline);
            self.write_inline(&element.children, depth, content_end);
            self.write_end_tag(element);
            return;
        }

        self.write_start_tag(element, TagEnd::Open, depth, is_root, false);
        if self.write_block(&element.children, depth + 1, content_end, false) == BlockEnd::Normal {
            self.new_line(depth);
        }
        self.write_end_tag(element);
    }

    /// Write children on the current line, trimming whitespace at the edges
    fn write_inline(&mut self, children: &[Node], depth: usize, content_end: usize) {
        let last = children.len().saturating_sub(1);
        let mut next = 0;
        while next < children.len() {
            let i = next;
            let child = &children[i];
            next += 1;
            let Node::Text(text) = child else {
                self.write_node(child, depth + 1, false, true);
                if directive::node_marker(child) == Some(Marker::Off) {
                    let start = child.span().end;
                    let Some(end) = directive::region_end(children, i) else {
                        self.write_raw(start, content_end);
                        return;
                    };
                    self.write_raw(start, children[end - 1].span().end);
                    next = end;
                }
                continue;
            };
            let mut collapsed = collapse_whitespace(&text.value);
            if i == last {
                collapsed.truncate(collapsed.trim_end().len());
            }
            let collapsed = if i == 0 { collapsed.trim_start() } else { &collapsed };
            self.out.push_str(&escape_text(collapsed));
        }
    }
}

/// Replace each whitespace run with a single space
fn collapse_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_space = false;
    for c in text.chars() {
        if is_xml_whitespace(c) {
            if !in_space {
                out.push(' ');
            }
            in_space = true;
        } else {
            out.push(c);
            in_space = false;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::NewLineStyle;
    use crate::parser::parse;

    fn print(source: &str, config: &Config) -> String {
        let document = parse(source).unwrap();
        print_document(&document, source, config, &Dialect::xaml(config))
    }

    fn unix() -> Config {
        Config {
            new_line_style: NewLineStyle::Unix,
            ..Default::default()
        }
    }

    #[test]
    fn test_collapse_whitespace() {
        assert_eq!(collapse_whitespace("  a \n\t b  "), " a b ");
    }

    #[test]
    fn test_block_children_indented() {
        assert_eq!(
            print("<Grid><Button/>\n\n\n<TextBox></TextBox></Grid>", &unix()),
            "<Grid>\n    <Button />\n\n    <TextBox />\n</Grid>"
        );
    }

    #[test]
    fn test_keep_ending_tag_when_disabled() {
        let config = Config {
            remove_ending_tag_of_empty_element: false,
            ..unix()
        };
        assert_eq!(
            print("<Grid><TextBox></TextBox><Button/></Grid>", &config),
            "<Grid>\n    <TextBox></TextBox>\n    <Button />\n</Grid>"
        );
    }

    #[test]
    fn test_inline_text_content() {
        assert_eq!(
            print("<TextBlock>\n   Hello   <Run>big</Run>\n world &amp; more  </TextBlock>", &unix()),
            "<TextBlock>Hello <Run>big</Run> world &amp; more</TextBlock>"
        );
    }

    #[test]
    fn test_comments_padded() {
        assert_eq!(
            print("<Grid><!--note--><!----><!---dash- --></Grid>", &unix()),
            "<Grid>\n    <!--  note  -->\n    <!---->\n    <!--  -dash-  -->\n</Grid>"
        );

        let config = Config {
            comment_spaces: 0,
            ..unix()
        };
        assert_eq!(
            print("<Grid><!-- note --><!---dash---></Grid>", &config),
            "<Grid>\n    <!--note-->\n    <!-- -dash- -->\n</Grid>"
        );
    }

    #[test]
    fn test_multi_line_comment_verbatim() {
        assert_eq!(
            print("<Grid>\n<!--\n  keep\n    me\n-->\n</Grid>", &unix()),
            "<Grid>\n    <!--\n  keep\n    me\n-->\n</Grid>"
        );
    }

    #[test]
    fn test_preserve_space_content_copied() {
        assert_eq!(
            print("<Grid><TextBlock xml:space=\"preserve\">  a\n   b </TextBlock></Grid>", &unix()),
            "<Grid>\n    <TextBlock xml:space=\"preserve\">  a\n   b </TextBlock>\n</Grid>"
        );
    }

    #[test]
    fn test_suppressed_region() {
        let source = "<Grid>\n<!-- xamlfmt:off -->\n<Button   A=\"1\"/>\n<!-- xamlfmt:on -->\n<Button   A=\"1\"/>\n</Grid>";
        assert_eq!(
            print(source, &unix()),
            "<Grid>\n    <!--  xamlfmt:off  -->\n<Button   A=\"1\"/>\n<!-- xamlfmt:on -->\n    <Button A=\"1\" />\n</Grid>"
        );
    }

    #[test]
    fn test_suppressed_region_to_end_of_parent() {
        let source = "<Grid>\n  <!-- xamlfmt:off -->\n  <Button   A=\"1\"/>\n  </Grid>";
        assert_eq!(
            print(source, &unix()),
            "<Grid>\n    <!--  xamlfmt:off  -->\n  <Button   A=\"1\"/>\n  </Grid>"
        );
    }

    #[test]
    fn test_suppressed_region_in_inline_content() {
        assert_eq!(
            print("<TextBlock>Hi <!-- xamlfmt:off --> <Run   A=\"1\">x</Run></TextBlock>", &unix()),
            "<TextBlock>Hi <!--  xamlfmt:off  --> <Run   A=\"1\">x</Run></TextBlock>"
        );
        assert_eq!(
            print(
                "<TextBlock>a <!-- xamlfmt:off -->  <Run/>  <!-- xamlfmt:on -->  b   <Run/></TextBlock>",
                &unix()
            ),
            "<TextBlock>a <!--  xamlfmt:off  -->  <Run/>  <!-- xamlfmt:on --> b <Run /></TextBlock>"
        );
    }

    #[test]
    fn test_top_level_nodes_bom_and_trailing_newline() {
        let source = "\u{feff}<?xml version=\"1.0\"?>\n\n<!-- top -->\n<Grid/>\n";
        assert_eq!(
            print(source, &unix()),
            "\u{feff}<?xml version=\"1.0\"?>\n\n<!--  top  -->\n<Grid />\n"
        );
    }

    #[test]
    fn test_windows_newlines() {
        let config = Config {
            new_line_style: NewLineStyle::Windows,
            ..Default::default()
        };
        assert_eq!(print("<Grid><Button/></Grid>\n", &config), "<Grid>\r\n    <Button />\r\n</Grid>\r\n");
    }

    #[test]
    fn test_cdata_inline() {
        assert_eq!(
            print("<Script>\n  <![CDATA[ a < b ]]>\n</Script>", &unix()),
            "<Script><![CDATA[ a < b ]]></Script>"
        );
    }
}
