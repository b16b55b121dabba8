//! Configuration management for xamlfmt.
//!
//! This module provides the [`Config`] struct which controls all formatting behavior.
//! Configuration is resolved field by field from, lowest priority first:
//! - built-in defaults
//! - the nearest discovered config file (`xamlfmt.toml` or `Settings.XamlStyler`)
//! - explicit overrides (CLI arguments)
//!
//! Config files are discovered by searching from the file being formatted upward
//! until a project root marker (`.git`, `.vs`) is reached.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

/// Config file names searched in every directory, in priority order
const CONFIG_FILE_NAMES: &[&str] = &["xamlfmt.toml", "Settings.XamlStyler"];

/// Directory entries that mark the root of a project; discovery stops there
const PROJECT_ROOT_MARKERS: &[&str] = &[".git", ".vs"];

/// Namespace of design-time attributes (`d:DesignWidth`, `d:DataContext`, ...)
pub const BLEND_NAMESPACE: &str = "http://schemas.microsoft.com/expression/blend/2008";

/// Namespace of `mc:Ignorable`
pub const MARKUP_COMPATIBILITY_NAMESPACE: &str =
    "http://schemas.openxmlformats.org/markup-compatibility/2006";

const DEFAULT_ATTRIBUTE_ORDERING_RULE_GROUPS: &[&str] = &[
    "x:Class",
    "xmlns, xmlns:x",
    "xmlns:*",
    "x:Key, Key, x:Name, Name, x:Uid, Uid, Title",
    "Grid.Row, Grid.RowSpan, Grid.Column, Grid.ColumnSpan, Canvas.Left, Canvas.Top, Canvas.Right, Canvas.Bottom",
    "Width, Height, MinWidth, MinHeight, MaxWidth, MaxHeight",
    "Margin, Padding, HorizontalAlignment, VerticalAlignment, HorizontalContentAlignment, VerticalContentAlignment, Panel.ZIndex",
    "*:*, *",
    "PageSource, PageIndex, Offset, Color, TargetName, Property, Value, StartPoint, EndPoint",
    "mc:Ignorable, d:IsDataSource, d:LayoutOverrides, d:IsStaticText",
    "Storyboard.*, From, To, Duration",
];

const DEFAULT_NO_NEW_LINE_ELEMENTS: &[&str] = &[
    "RadialGradientBrush",
    "GradientStop",
    "LinearGradientBrush",
    "ScaleTransform",
    "SkewTransform",
    "RotateTransform",
    "TranslateTransform",
    "Trigger",
    "Condition",
    "Setter",
];

const DEFAULT_NO_NEW_LINE_MARKUP_EXTENSIONS: &[&str] = &["x:Bind", "Binding"];

const DEFAULT_THICKNESS_ATTRIBUTES: &[&str] =
    &["Margin", "Padding", "BorderThickness", "ThumbnailClipMargin"];

fn owned(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| (*s).to_string()).collect()
}

/// Split a comma-separated name list (`"x:Bind, Binding"`), dropping empty entries
#[must_use]
pub fn split_name_list(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
        .collect()
}

/// Implements `FromStr` and `Display` for a config enum over its snake_case names.
macro_rules! config_enum_names {
    ($ty:ident { $($variant:ident => $name:literal),+ $(,)? }) => {
        impl $ty {
            pub const NAMES: &'static [&'static str] = &[$($name),+];
        }

        impl FromStr for $ty {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
                match normalized.as_str() {
                    $($name => Ok($ty::$variant),)+
                    _ => Err(format!(
                        "invalid value '{s}', expected one of: {}",
                        $ty::NAMES.join(", ")
                    )),
                }
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                let name = match self {
                    $($ty::$variant => $name,)+
                };
                f.write_str(name)
            }
        }
    };
}

/// How attribute continuation lines are indented when indenting with tabs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttributeIndentationStyle {
    /// Tabs for as much of the continuation indent as possible, spaces for the rest
    #[serde(alias = "Mixed")]
    Mixed,
    /// Tabs for the element's own depth, spaces for the alignment
    #[default]
    #[serde(alias = "Spaces")]
    Spaces,
}

config_enum_names!(AttributeIndentationStyle { Mixed => "mixed", Spaces => "spaces" });

/// Line break rule for the root element's attributes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineBreakRule {
    /// Follow the general attribute thresholds
    #[default]
    #[serde(alias = "Default")]
    Default,
    #[serde(alias = "Always")]
    Always,
    #[serde(alias = "Never")]
    Never,
}

config_enum_names!(LineBreakRule { Default => "default", Always => "always", Never => "never" });

/// Where `VisualStateManager.VisualStateGroups` goes among its siblings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VisualStateManagerRule {
    #[serde(alias = "None")]
    None,
    #[serde(alias = "First")]
    First,
    #[default]
    #[serde(alias = "Last")]
    Last,
}

config_enum_names!(VisualStateManagerRule { None => "none", First => "first", Last => "last" });

/// Sort key for `Setter` children
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReorderSettersBy {
    #[default]
    #[serde(alias = "None")]
    None,
    #[serde(alias = "Property")]
    Property,
    #[serde(alias = "TargetName")]
    TargetName,
    #[serde(alias = "TargetNameThenProperty")]
    TargetNameThenProperty,
}

config_enum_names!(ReorderSettersBy {
    None => "none",
    Property => "property",
    TargetName => "target_name",
    TargetNameThenProperty => "target_name_then_property",
});

/// Separator style for thickness-like values (`Margin="1,2,3,4"`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThicknessStyle {
    /// Leave values untouched
    #[serde(alias = "None")]
    None,
    #[default]
    #[serde(alias = "Comma")]
    Comma,
    #[serde(alias = "Space")]
    Space,
}

config_enum_names!(ThicknessStyle { None => "none", Comma => "comma", Space => "space" });

/// Line ending written to the output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NewLineStyle {
    /// The platform's native line ending
    #[default]
    #[serde(alias = "System", alias = "Default")]
    System,
    #[serde(alias = "Unix")]
    Unix,
    #[serde(alias = "Windows")]
    Windows,
}

config_enum_names!(NewLineStyle { System => "system", Unix => "unix", Windows => "windows" });

impl NewLineStyle {
    /// The newline sequence this style writes
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            NewLineStyle::System => {
                if cfg!(windows) {
                    "\r\n"
                } else {
                    "\n"
                }
            }
            NewLineStyle::Unix => "\n",
            NewLineStyle::Windows => "\r\n",
        }
    }
}

/// Main configuration struct for xamlfmt
///
/// Built once per invocation (see [`Config::resolve`]) and then only read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Number of columns per indent level (default: 4)
    pub indent_size: usize,

    /// Indent with tabs instead of spaces (default: false)
    pub indent_with_tabs: bool,

    /// Attributes tolerated beyond `max_attributes_per_line` before wrapping (default: 2)
    pub attributes_tolerance: usize,

    /// Keep the first attribute on the tag line when wrapping (default: false)
    pub keep_first_attribute_on_same_line: bool,

    /// Maximum attribute characters per line, 0 for no limit (default: 0)
    pub max_attribute_characters_per_line: usize,

    /// Maximum attributes per line when wrapping (default: 1)
    pub max_attributes_per_line: usize,

    /// Elements whose attributes never wrap
    pub no_new_line_elements: Vec<String>,

    /// Start every attribute rule group on its own line when wrapping (default: false)
    pub put_attribute_order_rule_groups_on_separate_lines: bool,

    /// Continuation indent in columns, 0 to align with the first attribute (default: 0)
    pub attribute_indentation: usize,

    /// Tab/space mix for continuation lines (default: spaces)
    pub attribute_indentation_style: AttributeIndentationStyle,

    /// Strip design-time attributes and namespace declarations (default: false)
    pub remove_design_time_references: bool,

    /// Order design-time attributes as if they had no prefix (default: false)
    pub ignore_design_time_reference_prefix: bool,

    /// Reorder attributes by rule groups (default: true)
    pub enable_attribute_reordering: bool,

    /// Attribute rule groups; each entry is a comma-separated list of name patterns
    pub attribute_ordering_rule_groups: Vec<String>,

    /// Attributes pinned to the tag line, in this order
    pub first_line_attributes: Vec<String>,

    /// Sort attributes matched by the same pattern by name (default: true)
    pub order_attributes_by_name: bool,

    /// Put `>` / `/>` on its own line when attributes wrap (default: false)
    pub put_ending_bracket_on_new_line: bool,

    /// Collapse empty elements to self-closing form (default: true)
    pub remove_ending_tag_of_empty_element: bool,

    /// Write `<X />` rather than `<X/>` (default: true)
    pub space_before_closing_slash: bool,

    /// Line break rule for the root element (default: default)
    pub root_element_line_break_rule: LineBreakRule,

    /// Position of `VisualStateManager.VisualStateGroups` (default: last)
    pub reorder_vsm: VisualStateManagerRule,

    /// Sort `Grid` children by row and column (default: false)
    pub reorder_grid_children: bool,

    /// Sort `Canvas` children by position (default: false)
    pub reorder_canvas_children: bool,

    /// Sort `Setter` elements (default: none)
    pub reorder_setters: ReorderSettersBy,

    /// Normalize and split markup extensions (default: true)
    pub format_markup_extension: bool,

    /// Markup extensions that are never split across lines
    pub no_new_line_markup_extensions: Vec<String>,

    /// Separator style for thickness values (default: comma)
    pub thickness_style: ThicknessStyle,

    /// Attributes holding thickness values
    pub thickness_attributes: Vec<String>,

    /// Padding inside single-line comments (default: 2)
    pub comment_spaces: usize,

    /// Return documents unchanged (default: false)
    pub suppress_processing: bool,

    /// Output line ending (default: system)
    pub new_line_style: NewLineStyle,

    /// Characters written unescaped in attribute values
    pub unescaped_attribute_characters: Vec<char>,

    /// Namespaces whose prefixes count as design-time
    pub design_time_namespaces: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            indent_size: 4,
            indent_with_tabs: false,
            attributes_tolerance: 2,
            keep_first_attribute_on_same_line: false,
            max_attribute_characters_per_line: 0,
            max_attributes_per_line: 1,
            no_new_line_elements: owned(DEFAULT_NO_NEW_LINE_ELEMENTS),
            put_attribute_order_rule_groups_on_separate_lines: false,
            attribute_indentation: 0,
            attribute_indentation_style: AttributeIndentationStyle::Spaces,
            remove_design_time_references: false,
            ignore_design_time_reference_prefix: false,
            enable_attribute_reordering: true,
            attribute_ordering_rule_groups: owned(DEFAULT_ATTRIBUTE_ORDERING_RULE_GROUPS),
            first_line_attributes: Vec::new(),
            order_attributes_by_name: true,
            put_ending_bracket_on_new_line: false,
            remove_ending_tag_of_empty_element: true,
            space_before_closing_slash: true,
            root_element_line_break_rule: LineBreakRule::Default,
            reorder_vsm: VisualStateManagerRule::Last,
            reorder_grid_children: false,
            reorder_canvas_children: false,
            reorder_setters: ReorderSettersBy::None,
            format_markup_extension: true,
            no_new_line_markup_extensions: owned(DEFAULT_NO_NEW_LINE_MARKUP_EXTENSIONS),
            thickness_style: ThicknessStyle::Comma,
            thickness_attributes: owned(DEFAULT_THICKNESS_ATTRIBUTES),
            comment_spaces: 2,
            suppress_processing: false,
            new_line_style: NewLineStyle::System,
            unescaped_attribute_characters: Vec::new(),
            design_time_namespaces: vec![BLEND_NAMESPACE.to_string()],
        }
    }
}

/// Accept a name list either as an array or as a comma-separated string
fn deserialize_name_list<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NameList {
        Csv(String),
        List(Vec<String>),
    }

    Ok(Option::<NameList>::deserialize(deserializer)?.map(|list| match list {
        NameList::Csv(s) => split_name_list(&s),
        NameList::List(v) => v
            .iter()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .map(ToString::to_string)
            .collect(),
    }))
}

/// Partial configuration for config files and CLI overrides
///
/// All fields are `Option<T>` so we can distinguish between
/// "explicitly set" and "not specified" when merging configs.
/// PascalCase aliases accept `Settings.XamlStyler` files.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct PartialConfig {
    #[serde(alias = "IndentSize")]
    pub indent_size: Option<usize>,
    #[serde(alias = "IndentWithTabs")]
    pub indent_with_tabs: Option<bool>,
    #[serde(alias = "AttributesTolerance")]
    pub attributes_tolerance: Option<usize>,
    #[serde(alias = "KeepFirstAttributeOnSameLine")]
    pub keep_first_attribute_on_same_line: Option<bool>,
    #[serde(alias = "MaxAttributeCharactersPerLine")]
    pub max_attribute_characters_per_line: Option<usize>,
    #[serde(alias = "MaxAttributesPerLine")]
    pub max_attributes_per_line: Option<usize>,
    #[serde(default, alias = "NoNewLineElements", deserialize_with = "deserialize_name_list")]
    pub no_new_line_elements: Option<Vec<String>>,
    #[serde(alias = "PutAttributeOrderRuleGroupsOnSeparateLines")]
    pub put_attribute_order_rule_groups_on_separate_lines: Option<bool>,
    #[serde(alias = "AttributeIndentation")]
    pub attribute_indentation: Option<usize>,
    #[serde(alias = "AttributeIndentationStyle")]
    pub attribute_indentation_style: Option<AttributeIndentationStyle>,
    #[serde(alias = "RemoveDesignTimeReferences")]
    pub remove_design_time_references: Option<bool>,
    #[serde(alias = "IgnoreDesignTimeReferencePrefix")]
    pub ignore_design_time_reference_prefix: Option<bool>,
    #[serde(alias = "EnableAttributeReordering")]
    pub enable_attribute_reordering: Option<bool>,
    #[serde(alias = "AttributeOrderingRuleGroups")]
    pub attribute_ordering_rule_groups: Option<Vec<String>>,
    #[serde(default, alias = "FirstLineAttributes", deserialize_with = "deserialize_name_list")]
    pub first_line_attributes: Option<Vec<String>>,
    #[serde(alias = "OrderAttributesByName")]
    pub order_attributes_by_name: Option<bool>,
    #[serde(alias = "PutEndingBracketOnNewLine")]
    pub put_ending_bracket_on_new_line: Option<bool>,
    #[serde(alias = "RemoveEndingTagOfEmptyElement")]
    pub remove_ending_tag_of_empty_element: Option<bool>,
    #[serde(alias = "SpaceBeforeClosingSlash")]
    pub space_before_closing_slash: Option<bool>,
    #[serde(alias = "RootElementLineBreakRule")]
    pub root_element_line_break_rule: Option<LineBreakRule>,
    #[serde(alias = "ReorderVSM")]
    pub reorder_vsm: Option<VisualStateManagerRule>,
    #[serde(alias = "ReorderGridChildren")]
    pub reorder_grid_children: Option<bool>,
    #[serde(alias = "ReorderCanvasChildren")]
    pub reorder_canvas_children: Option<bool>,
    #[serde(alias = "ReorderSetters")]
    pub reorder_setters: Option<ReorderSettersBy>,
    #[serde(alias = "FormatMarkupExtension")]
    pub format_markup_extension: Option<bool>,
    #[serde(
        default,
        alias = "NoNewLineMarkupExtensions",
        deserialize_with = "deserialize_name_list"
    )]
    pub no_new_line_markup_extensions: Option<Vec<String>>,
    #[serde(alias = "ThicknessStyle")]
    pub thickness_style: Option<ThicknessStyle>,
    #[serde(default, alias = "ThicknessAttributes", deserialize_with = "deserialize_name_list")]
    pub thickness_attributes: Option<Vec<String>>,
    #[serde(alias = "CommentSpaces", alias = "CommentPadding")]
    pub comment_spaces: Option<usize>,
    #[serde(alias = "SuppressProcessing")]
    pub suppress_processing: Option<bool>,
    #[serde(alias = "NewLineStyle")]
    pub new_line_style: Option<NewLineStyle>,
    #[serde(alias = "UnescapedAttributeCharacters")]
    pub unescaped_attribute_characters: Option<Vec<char>>,
    #[serde(default, alias = "DesignTimeNamespaces", deserialize_with = "deserialize_name_list")]
    pub design_time_namespaces: Option<Vec<String>>,
}

impl PartialConfig {
    /// Load a partial configuration from a TOML or JSON file
    ///
    /// `.toml` files are read as TOML; `Settings.XamlStyler` and `.json` files as JSON.
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let is_toml = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));
        let partial = if is_toml {
            toml::from_str(&contents)?
        } else {
            // Visual Studio writes these files with a BOM
            serde_json::from_str(contents.trim_start_matches('\u{feff}'))?
        };
        Ok(partial)
    }
}

impl Config {
    /// Maximum reasonable indent size
    const MAX_INDENT: usize = 16;
    /// Maximum reasonable comment padding
    const MAX_COMMENT_SPACES: usize = 16;

    /// Merge defaults, an optional discovered config file and explicit overrides
    ///
    /// Later sources win field by field; a field left unset keeps the earlier value.
    #[must_use]
    pub fn resolve(discovered: Option<&PartialConfig>, overrides: &PartialConfig) -> Self {
        let mut config = Self::default();
        if let Some(partial) = discovered {
            config.apply_partial(partial);
        }
        config.apply_partial(overrides);
        config
    }

    /// Validate configuration values
    ///
    /// Returns `None` if valid, or an error message describing the problem.
    #[must_use]
    pub fn validate(&self) -> Option<String> {
        if self.indent_size == 0 {
            return Some("indent_size must be at least 1".to_string());
        }
        if self.indent_size > Self::MAX_INDENT {
            return Some(format!(
                "indent_size {} exceeds maximum of {}",
                self.indent_size,
                Self::MAX_INDENT
            ));
        }
        if self.max_attributes_per_line == 0 {
            return Some("max_attributes_per_line must be at least 1".to_string());
        }
        if self.comment_spaces > Self::MAX_COMMENT_SPACES {
            return Some(format!(
                "comment_spaces {} exceeds maximum of {}",
                self.comment_spaces,
                Self::MAX_COMMENT_SPACES
            ));
        }
        if let Some(c) = self
            .unescaped_attribute_characters
            .iter()
            .find(|c| matches!(c, '&' | '"'))
        {
            return Some(format!("'{c}' cannot be written unescaped"));
        }
        None
    }

    /// Apply a partial config, only overriding fields that are explicitly set
    #[allow(clippy::too_many_lines)]
    fn apply_partial(&mut self, partial: &PartialConfig) {
        if let Some(v) = partial.indent_size {
            self.indent_size = v;
        }
        if let Some(v) = partial.indent_with_tabs {
            self.indent_with_tabs = v;
        }
        if let Some(v) = partial.attributes_tolerance {
            self.attributes_tolerance = v;
        }
        if let Some(v) = partial.keep_first_attribute_on_same_line {
            self.keep_first_attribute_on_same_line = v;
        }
        if let Some(v) = partial.max_attribute_characters_per_line {
            self.max_attribute_characters_per_line = v;
        }
        if let Some(v) = partial.max_attributes_per_line {
            self.max_attributes_per_line = v;
        }
        if let Some(v) = &partial.no_new_line_elements {
            self.no_new_line_elements.clone_from(v);
        }
        if let Some(v) = partial.put_attribute_order_rule_groups_on_separate_lines {
            self.put_attribute_order_rule_groups_on_separate_lines = v;
        }
        if let Some(v) = partial.attribute_indentation {
            self.attribute_indentation = v;
        }
        if let Some(v) = partial.attribute_indentation_style {
            self.attribute_indentation_style = v;
        }
        if let Some(v) = partial.remove_design_time_references {
            self.remove_design_time_references = v;
        }
        if let Some(v) = partial.ignore_design_time_reference_prefix {
            self.ignore_design_time_reference_prefix = v;
        }
        if let Some(v) = partial.enable_attribute_reordering {
            self.enable_attribute_reordering = v;
        }
        if let Some(v) = &partial.attribute_ordering_rule_groups {
            self.attribute_ordering_rule_groups.clone_from(v);
        }
        if let Some(v) = &partial.first_line_attributes {
            self.first_line_attributes.clone_from(v);
        }
        if let Some(v) = partial.order_attributes_by_name {
            self.order_attributes_by_name = v;
        }
        if let Some(v) = partial.put_ending_bracket_on_new_line {
            self.put_ending_bracket_on_new_line = v;
        }
        if let Some(v) = partial.remove_ending_tag_of_empty_element {
            self.remove_ending_tag_of_empty_element = v;
        }
        if let Some(v) = partial.space_before_closing_slash {
            self.space_before_closing_slash = v;
        }
        if let Some(v) = partial.root_element_line_break_rule {
            self.root_element_line_break_rule = v;
        }
        if let Some(v) = partial.reorder_vsm {
            self.reorder_vsm = v;
        }
        if let Some(v) = partial.reorder_grid_children {
            self.reorder_grid_children = v;
        }
        if let Some(v) = partial.reorder_canvas_children {
            self.reorder_canvas_children = v;
        }
        if let Some(v) = partial.reorder_setters {
            self.reorder_setters = v;
        }
        if let Some(v) = partial.format_markup_extension {
            self.format_markup_extension = v;
        }
        if let Some(v) = &partial.no_new_line_markup_extensions {
            self.no_new_line_markup_extensions.clone_from(v);
        }
        if let Some(v) = partial.thickness_style {
            self.thickness_style = v;
        }
        if let Some(v) = &partial.thickness_attributes {
            self.thickness_attributes.clone_from(v);
        }
        if let Some(v) = partial.comment_spaces {
            self.comment_spaces = v;
        }
        if let Some(v) = partial.suppress_processing {
            self.suppress_processing = v;
        }
        if let Some(v) = partial.new_line_style {
            self.new_line_style = v;
        }
        if let Some(v) = &partial.unescaped_attribute_characters {
            self.unescaped_attribute_characters.clone_from(v);
        }
        if let Some(v) = &partial.design_time_namespaces {
            self.design_time_namespaces.clone_from(v);
        }
    }

    /// Find the nearest config file for a path
    ///
    /// Searches the file's directory and then its ancestors, returning the first
    /// config file found. The search stops after the first directory that contains
    /// a project root marker.
    #[must_use]
    pub fn discover_config_file(start_path: &Path) -> Option<PathBuf> {
        // Start from the file's parent directory (or the path itself if it's a directory)
        let start_dir = if start_path.is_file() {
            start_path.parent().map(Path::to_path_buf)
        } else if start_path.is_dir() {
            Some(start_path.to_path_buf())
        } else {
            // Path doesn't exist, use current directory
            std::env::current_dir().ok()
        }?;

        for dir in start_dir.ancestors() {
            for config_name in CONFIG_FILE_NAMES {
                let config_path = dir.join(config_name);
                if config_path.is_file() {
                    tracing::debug!("Found config: {}", config_path.display());
                    return Some(config_path);
                }
            }
            if PROJECT_ROOT_MARKERS
                .iter()
                .any(|marker| dir.join(marker).exists())
            {
                tracing::debug!("Reached project root: {}", dir.display());
                break;
            }
        }

        None
    }

    /// Resolve the configuration for a file from its nearest config file
    ///
    /// A config file that cannot be read or parsed is reported and skipped.
    #[must_use]
    pub fn from_discovered_file(start_path: &Path, overrides: &PartialConfig) -> Self {
        let discovered = Self::discover_config_file(start_path).and_then(|path| {
            match PartialConfig::from_file(&path) {
                Ok(partial) => Some(partial),
                Err(e) => {
                    tracing::warn!("failed to load {}: {e}", path.display());
                    None
                }
            }
        });
        Self::resolve(discovered.as_ref(), overrides)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.indent_size, 4);
        assert_eq!(config.attributes_tolerance, 2);
        assert_eq!(config.max_attributes_per_line, 1);
        assert_eq!(config.reorder_vsm, VisualStateManagerRule::Last);
        assert_eq!(config.thickness_style, ThicknessStyle::Comma);
        assert!(config.space_before_closing_slash);
        assert_eq!(config.no_new_line_markup_extensions, vec!["x:Bind", "Binding"]);
    }

    #[test]
    fn test_split_name_list() {
        assert_eq!(
            split_name_list(" x:Bind,Binding , ,StaticResource"),
            vec!["x:Bind", "Binding", "StaticResource"]
        );
        assert!(split_name_list("").is_empty());
    }

    #[test]
    fn test_resolve_precedence() {
        let discovered = PartialConfig {
            indent_size: Some(2),
            comment_spaces: Some(1),
            ..Default::default()
        };
        let overrides = PartialConfig {
            indent_size: Some(3),
            ..Default::default()
        };

        let config = Config::resolve(Some(&discovered), &overrides);
        // Override wins over the discovered file
        assert_eq!(config.indent_size, 3);
        // Discovered value survives when not overridden
        assert_eq!(config.comment_spaces, 1);
        // Untouched fields keep their defaults
        assert_eq!(config.attributes_tolerance, 2);
    }

    #[test]
    fn test_resolve_without_discovered_file() {
        let config = Config::resolve(None, &PartialConfig::default());
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_toml_partial_config() {
        let partial: PartialConfig = toml::from_str(
            r#"
            indent_size = 2
            thickness_style = "space"
            no_new_line_markup_extensions = "x:Bind, StaticResource"
            first_line_attributes = ["x:Name", "x:Key"]
            reorder_setters = "target_name_then_property"
            unknown_option = 12
            "#,
        )
        .unwrap();
        assert_eq!(partial.indent_size, Some(2));
        assert_eq!(partial.thickness_style, Some(ThicknessStyle::Space));
        assert_eq!(
            partial.no_new_line_markup_extensions,
            Some(vec!["x:Bind".to_string(), "StaticResource".to_string()])
        );
        assert_eq!(
            partial.first_line_attributes,
            Some(vec!["x:Name".to_string(), "x:Key".to_string()])
        );
        assert_eq!(
            partial.reorder_setters,
            Some(ReorderSettersBy::TargetNameThenProperty)
        );
        assert_eq!(partial.comment_spaces, None);
    }

    #[test]
    fn test_json_settings_file_keys() {
        let partial: PartialConfig = serde_json::from_str(
            r#"{
                "IndentSize": 2,
                "AttributesTolerance": 1,
                "ReorderVSM": "First",
                "NoNewLineElements": "Setter, GradientStop",
                "AttributeOrderingRuleGroups": ["x:Class", "xmlns, xmlns:x"],
                "FormatOnSave": true
            }"#,
        )
        .unwrap();
        assert_eq!(partial.indent_size, Some(2));
        assert_eq!(partial.attributes_tolerance, Some(1));
        assert_eq!(partial.reorder_vsm, Some(VisualStateManagerRule::First));
        assert_eq!(
            partial.no_new_line_elements,
            Some(vec!["Setter".to_string(), "GradientStop".to_string()])
        );
        assert_eq!(
            partial.attribute_ordering_rule_groups,
            Some(vec!["x:Class".to_string(), "xmlns, xmlns:x".to_string()])
        );
    }

    #[test]
    fn test_enum_from_str() {
        assert_eq!("Always".parse::<LineBreakRule>(), Ok(LineBreakRule::Always));
        assert_eq!(
            "target-name".parse::<ReorderSettersBy>(),
            Ok(ReorderSettersBy::TargetName)
        );
        assert!("sideways".parse::<ThicknessStyle>().is_err());
        assert_eq!(NewLineStyle::Windows.to_string(), "windows");
    }

    #[test]
    fn test_new_line_style_strings() {
        assert_eq!(NewLineStyle::Unix.as_str(), "\n");
        assert_eq!(NewLineStyle::Windows.as_str(), "\r\n");
    }

    #[test]
    fn test_validate_default_config() {
        let config = Config::default();
        assert!(
            config.validate().is_none(),
            "Default config should be valid"
        );
    }

    #[test]
    fn test_validate_indent_zero() {
        let config = Config {
            indent_size: 0,
            ..Default::default()
        };
        assert!(config.validate().unwrap().contains("indent_size"));
    }

    #[test]
    fn test_validate_max_attributes_zero() {
        let config = Config {
            max_attributes_per_line: 0,
            ..Default::default()
        };
        assert!(config.validate().unwrap().contains("max_attributes_per_line"));
    }

    #[test]
    fn test_validate_unescapable_character() {
        let config = Config {
            unescaped_attribute_characters: vec!['>', '&'],
            ..Default::default()
        };
        assert!(config.validate().is_some());
    }

    #[test]
    fn test_discover_nearest_config_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join(".git")).unwrap();
        std::fs::write(dir.path().join("xamlfmt.toml"), "indent_size = 2\n").unwrap();
        let nested = dir.path().join("src").join("views");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(nested.join("xamlfmt.toml"), "indent_size = 3\n").unwrap();
        let file = nested.join("Main.xaml");
        std::fs::write(&file, "<Grid />").unwrap();

        let found = Config::discover_config_file(&file).unwrap();
        assert_eq!(found, nested.join("xamlfmt.toml"));

        let config = Config::from_discovered_file(&file, &PartialConfig::default());
        assert_eq!(config.indent_size, 3);
    }

    #[test]
    fn test_discover_stops_at_project_root() {
        let outer = tempfile::tempdir().unwrap();
        std::fs::write(outer.path().join("xamlfmt.toml"), "indent_size = 2\n").unwrap();
        let project = outer.path().join("project");
        std::fs::create_dir_all(project.join(".vs")).unwrap();
        let file = project.join("App.xaml");
        std::fs::write(&file, "<Application />").unwrap();

        assert_eq!(Config::discover_config_file(&file), None);
    }

    #[test]
    fn test_discover_json_settings_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join(".git")).unwrap();
        std::fs::write(
            dir.path().join("Settings.XamlStyler"),
            "\u{feff}{ \"IndentSize\": 8 }",
        )
        .unwrap();
        let file = dir.path().join("App.xaml");
        std::fs::write(&file, "<Application />").unwrap();

        let config = Config::from_discovered_file(&file, &PartialConfig::default());
        assert_eq!(config.indent_size, 8);
    }
}
