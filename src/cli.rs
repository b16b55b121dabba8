//! Command-line interface for xamlfmt.
//!
//! Defines CLI arguments using clap builder API. Every styling option has a
//! long flag; the flags that were given are collected into a [`PartialConfig`]
//! which overrides any discovered config file.

use std::path::PathBuf;

use clap::{Arg, ArgAction, Command};

use crate::config::{
    split_name_list, AttributeIndentationStyle, LineBreakRule, NewLineStyle, PartialConfig,
    ReorderSettersBy, ThicknessStyle, VisualStateManagerRule,
};

/// CLI arguments parsed from command line
#[derive(Debug, Clone)]
pub struct CliArgs {
    /// Files or directories to format (`-` reads stdin)
    pub inputs: Vec<PathBuf>,

    /// Recursive directory processing
    pub recursive: bool,

    /// Exclude patterns for files/directories (glob patterns)
    pub exclude: Vec<String>,

    /// Custom XAML file extensions (in addition to defaults)
    pub extensions: Vec<String>,

    /// Format files regardless of extension
    pub ignore_extension: bool,

    /// Config file path (disables discovery)
    pub config: Option<PathBuf>,

    /// Check formatting without modifying files
    pub passive: bool,

    /// Output to stdout instead of in-place
    pub write_to_stdout: bool,

    /// Number of parallel jobs (0 = auto, 1 = sequential)
    pub jobs: Option<usize>,

    /// Enable debug output
    pub debug: bool,

    /// Silent mode (warnings and errors only)
    pub silent: bool,

    /// Styling options given on the command line
    pub overrides: PartialConfig,
}

impl CliArgs {
    /// Check argument combinations clap cannot express
    ///
    /// Returns `None` if valid, or an error message describing the problem.
    #[must_use]
    pub fn validate(&self) -> Option<String> {
        if self.write_to_stdout && self.inputs.len() > 1 {
            return Some("--write-to-stdout accepts a single input file".to_string());
        }
        None
    }
}

fn bool_arg(name: &'static str, help: &'static str) -> Arg {
    Arg::new(name)
        .long(name)
        .help(help)
        .value_name("BOOL")
        .num_args(0..=1)
        .require_equals(true)
        .default_missing_value("true")
        .value_parser(clap::value_parser!(bool))
}

fn num_arg(name: &'static str, help: &'static str) -> Arg {
    Arg::new(name)
        .long(name)
        .help(help)
        .value_name("NUM")
        .value_parser(clap::value_parser!(usize))
}

fn list_arg(name: &'static str, help: &'static str) -> Arg {
    Arg::new(name)
        .long(name)
        .help(help)
        .value_name("NAMES")
        .value_parser(|s: &str| Ok::<_, String>(split_name_list(s)))
}

/// Build the clap Command for parsing CLI arguments
#[must_use]
pub fn build_cli() -> Command {
    Command::new("xamlfmt")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Deterministic formatter for XAML markup")
        .arg(
            Arg::new("inputs")
                .help("Files or directories to format ('-' for stdin)")
                .value_name("FILE")
                .num_args(1..)
                .required(false)
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("recursive")
                .short('r')
                .long("recursive")
                .help("Recursively format directories")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("exclude")
                .short('e')
                .long("exclude")
                .help("Exclude files/directories matching pattern (glob syntax, can be repeated)")
                .value_name("PATTERN")
                .action(ArgAction::Append),
        )
        .arg(
            Arg::new("extension")
                .short('x')
                .long("extension")
                .help("Additional file extension to format (can be repeated, e.g., -x xml)")
                .value_name("EXT")
                .action(ArgAction::Append),
        )
        .arg(
            Arg::new("ignore")
                .long("ignore")
                .help("Format files given on the command line regardless of extension")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .help("Path to configuration file (overrides auto-discovery)")
                .value_name("FILE")
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("passive")
                .short('p')
                .long("passive")
                .help("Check formatting only; report files that would change")
                .action(ArgAction::SetTrue)
                .conflicts_with("write-to-stdout"),
        )
        .arg(
            Arg::new("write-to-stdout")
                .short('s')
                .long("write-to-stdout")
                .help("Write the formatted document to stdout instead of in-place")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("jobs")
                .short('j')
                .long("jobs")
                .help("Number of parallel jobs (0=auto, 1=sequential)")
                .value_name("NUM")
                .value_parser(clap::value_parser!(usize)),
        )
        .arg(
            Arg::new("debug")
                .short('D')
                .long("debug")
                .help("Enable debug output (shows config and rule decisions)")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("silent")
                .short('S')
                .long("silent")
                .help("Silent mode (only warnings and errors)")
                .action(ArgAction::SetTrue),
        )
        // Indentation
        .arg(num_arg("indent-size", "Columns per indent level [default: 4]"))
        .arg(bool_arg("indent-with-tabs", "Indent with tabs"))
        .arg(num_arg(
            "attribute-indentation",
            "Continuation indent in columns, 0 to align with the first attribute [default: 0]",
        ))
        .arg(
            Arg::new("attribute-indentation-style")
                .long("attribute-indentation-style")
                .help("Continuation indentation with tabs: mixed or spaces [default: spaces]")
                .value_name("STYLE")
                .value_parser(|s: &str| s.parse::<AttributeIndentationStyle>()),
        )
        // Attribute layout
        .arg(num_arg(
            "attributes-tolerance",
            "Attributes allowed beyond the per-line maximum before wrapping [default: 2]",
        ))
        .arg(num_arg(
            "max-attributes-per-line",
            "Maximum attributes per line when wrapping [default: 1]",
        ))
        .arg(num_arg(
            "max-attribute-characters-per-line",
            "Maximum attribute characters per line, 0 for no limit [default: 0]",
        ))
        .arg(bool_arg(
            "keep-first-attribute-on-same-line",
            "Keep the first attribute on the tag line when wrapping",
        ))
        .arg(list_arg(
            "no-new-line-elements",
            "Comma-separated elements whose attributes never wrap",
        ))
        .arg(bool_arg(
            "put-attribute-order-rule-groups-on-separate-lines",
            "Start each attribute rule group on a new line when wrapping",
        ))
        .arg(bool_arg(
            "put-ending-bracket-on-new-line",
            "Put the closing bracket on its own line when wrapping",
        ))
        .arg(bool_arg(
            "remove-ending-tag-of-empty-element",
            "Write empty elements in self-closing form",
        ))
        .arg(bool_arg(
            "space-before-closing-slash",
            "Write a space before '/>'",
        ))
        .arg(
            Arg::new("root-element-line-break-rule")
                .long("root-element-line-break-rule")
                .help("Root element attribute wrapping: default, always or never")
                .value_name("RULE")
                .value_parser(|s: &str| s.parse::<LineBreakRule>()),
        )
        // Attribute ordering
        .arg(bool_arg(
            "enable-attribute-reordering",
            "Order attributes by rule groups",
        ))
        .arg(
            Arg::new("attribute-ordering-rule-groups")
                .long("attribute-ordering-rule-groups")
                .help("Attribute rule group as comma-separated patterns (repeat for each group)")
                .value_name("PATTERNS")
                .action(ArgAction::Append),
        )
        .arg(list_arg(
            "first-line-attributes",
            "Comma-separated attributes pinned to the tag line",
        ))
        .arg(bool_arg(
            "order-attributes-by-name",
            "Sort attributes matched by the same pattern by name",
        ))
        .arg(bool_arg(
            "remove-design-time-references",
            "Remove design-time attributes and namespace declarations",
        ))
        .arg(bool_arg(
            "ignore-design-time-reference-prefix",
            "Order design-time attributes as if unprefixed",
        ))
        // Element reordering
        .arg(
            Arg::new("reorder-vsm")
                .long("reorder-vsm")
                .help("Place VisualStateManager.VisualStateGroups: none, first or last")
                .value_name("RULE")
                .value_parser(|s: &str| s.parse::<VisualStateManagerRule>()),
        )
        .arg(bool_arg("reorder-grid-children", "Sort Grid children by row and column"))
        .arg(bool_arg("reorder-canvas-children", "Sort Canvas children by position"))
        .arg(
            Arg::new("reorder-setters")
                .long("reorder-setters")
                .help("Sort setters: none, property, target_name or target_name_then_property")
                .value_name("KEY")
                .value_parser(|s: &str| s.parse::<ReorderSettersBy>()),
        )
        // Values
        .arg(bool_arg(
            "format-markup-extension",
            "Normalize and split markup extensions",
        ))
        .arg(list_arg(
            "no-new-line-markup-extensions",
            "Comma-separated markup extensions that are never split",
        ))
        .arg(
            Arg::new("thickness-style")
                .long("thickness-style")
                .help("Thickness separator: none, comma or space")
                .value_name("STYLE")
                .value_parser(|s: &str| s.parse::<ThicknessStyle>()),
        )
        .arg(list_arg(
            "thickness-attributes",
            "Comma-separated attributes holding thickness values",
        ))
        .arg(
            Arg::new("unescaped-attribute-characters")
                .long("unescaped-attribute-characters")
                .help("Characters written unescaped in attribute values (e.g. '<>')")
                .value_name("CHARS")
                .value_parser(|s: &str| {
                    Ok::<_, String>(s.chars().filter(|c| !c.is_whitespace()).collect::<Vec<char>>())
                }),
        )
        // Document
        .arg(num_arg("comment-spaces", "Padding inside single-line comments [default: 2]"))
        .arg(bool_arg(
            "suppress-processing",
            "Leave documents unchanged",
        ))
        .arg(
            Arg::new("new-line-style")
                .long("new-line-style")
                .help("Line endings: system, unix or windows")
                .value_name("STYLE")
                .value_parser(|s: &str| s.parse::<NewLineStyle>()),
        )
}

/// Parse CLI arguments from command line
#[must_use]
pub fn parse_args() -> CliArgs {
    args_from_matches(&build_cli().get_matches())
}

/// Parse CLI arguments from an iterator (for testing)
#[must_use]
pub fn parse_args_from<I, T>(args: I) -> CliArgs
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    args_from_matches(&build_cli().get_matches_from(args))
}

/// Collect the styling flags that were given
fn overrides_from_matches(matches: &clap::ArgMatches) -> PartialConfig {
    let flag = |name: &str| matches.get_one::<bool>(name).copied();
    let num = |name: &str| matches.get_one::<usize>(name).copied();
    let list = |name: &str| matches.get_one::<Vec<String>>(name).cloned();

    PartialConfig {
        indent_size: num("indent-size"),
        indent_with_tabs: flag("indent-with-tabs"),
        attributes_tolerance: num("attributes-tolerance"),
        keep_first_attribute_on_same_line: flag("keep-first-attribute-on-same-line"),
        max_attribute_characters_per_line: num("max-attribute-characters-per-line"),
        max_attributes_per_line: num("max-attributes-per-line"),
        no_new_line_elements: list("no-new-line-elements"),
        put_attribute_order_rule_groups_on_separate_lines: flag(
            "put-attribute-order-rule-groups-on-separate-lines",
        ),
        attribute_indentation: num("attribute-indentation"),
        attribute_indentation_style: matches
            .get_one::<AttributeIndentationStyle>("attribute-indentation-style")
            .copied(),
        remove_design_time_references: flag("remove-design-time-references"),
        ignore_design_time_reference_prefix: flag("ignore-design-time-reference-prefix"),
        enable_attribute_reordering: flag("enable-attribute-reordering"),
        attribute_ordering_rule_groups: matches
            .get_many::<String>("attribute-ordering-rule-groups")
            .map(|vals| vals.cloned().collect()),
        first_line_attributes: list("first-line-attributes"),
        order_attributes_by_name: flag("order-attributes-by-name"),
        put_ending_bracket_on_new_line: flag("put-ending-bracket-on-new-line"),
        remove_ending_tag_of_empty_element: flag("remove-ending-tag-of-empty-element"),
        space_before_closing_slash: flag("space-before-closing-slash"),
        root_element_line_break_rule: matches
            .get_one::<LineBreakRule>("root-element-line-break-rule")
            .copied(),
        reorder_vsm: matches
            .get_one::<VisualStateManagerRule>("reorder-vsm")
            .copied(),
        reorder_grid_children: flag("reorder-grid-children"),
        reorder_canvas_children: flag("reorder-canvas-children"),
        reorder_setters: matches
            .get_one::<ReorderSettersBy>("reorder-setters")
            .copied(),
        format_markup_extension: flag("format-markup-extension"),
        no_new_line_markup_extensions: list("no-new-line-markup-extensions"),
        thickness_style: matches
            .get_one::<ThicknessStyle>("thickness-style")
            .copied(),
        thickness_attributes: list("thickness-attributes"),
        comment_spaces: num("comment-spaces"),
        suppress_processing: flag("suppress-processing"),
        new_line_style: matches.get_one::<NewLineStyle>("new-line-style").copied(),
        unescaped_attribute_characters: matches
            .get_one::<Vec<char>>("unescaped-attribute-characters")
            .cloned(),
        design_time_namespaces: None,
    }
}

/// Convert clap `ArgMatches` to `CliArgs`
fn args_from_matches(matches: &clap::ArgMatches) -> CliArgs {
    CliArgs {
        inputs: matches
            .get_many::<PathBuf>("inputs")
            .map(|vals| vals.cloned().collect())
            .unwrap_or_default(),
        recursive: matches.get_flag("recursive"),
        exclude: matches
            .get_many::<String>("exclude")
            .map(|vals| vals.cloned().collect())
            .unwrap_or_default(),
        extensions: matches
            .get_many::<String>("extension")
            .map(|vals| vals.cloned().collect())
            .unwrap_or_default(),
        ignore_extension: matches.get_flag("ignore"),
        config: matches.get_one::<PathBuf>("config").cloned(),
        passive: matches.get_flag("passive"),
        write_to_stdout: matches.get_flag("write-to-stdout"),
        jobs: matches.get_one::<usize>("jobs").copied(),
        debug: matches.get_flag("debug"),
        silent: matches.get_flag("silent"),
        overrides: overrides_from_matches(matches),
    }
}
