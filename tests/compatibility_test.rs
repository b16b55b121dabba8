//! Compatibility tests for XAML Styler settings files and conventions
//!
//! These tests check that existing `Settings.XamlStyler` files, Avalonia
//! sources and designer markup are handled the way projects expect.

#![warn(clippy::all)]
#![warn(clippy::pedantic)]

use std::fs;
use std::path::Path;

use tempfile::TempDir;
use xamlfmt::config::{NewLineStyle, ThicknessStyle, VisualStateManagerRule};
use xamlfmt::process::style_document_with;
use xamlfmt::{style_document, Config, Dialect, PartialConfig};

/// Temp project with a root marker so discovery never leaves it
fn project() -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::create_dir(dir.path().join(".git")).unwrap();
    dir
}

fn touch(path: &Path) {
    fs::write(path, "<Grid />\n").unwrap();
}

#[test]
fn test_settings_xamlstyler_json() {
    let dir = project();
    fs::write(
        dir.path().join("Settings.XamlStyler"),
        "\u{feff}{\n  \"IndentSize\": 2,\n  \"AttributesTolerance\": 0,\n  \"KeepFirstAttributeOnSameLine\": true,\n  \"ThicknessStyle\": \"Space\",\n  \"NoNewLineMarkupExtensions\": \"x:Bind\",\n  \"NewLineStyle\": \"Unix\",\n  \"FormatOnSave\": true\n}\n",
    )
    .unwrap();
    let file = dir.path().join("Main.xaml");
    touch(&file);

    let config = Config::from_discovered_file(&file, &PartialConfig::default());
    assert_eq!(config.indent_size, 2);
    assert_eq!(config.thickness_style, ThicknessStyle::Space);
    assert_eq!(config.no_new_line_markup_extensions, vec!["x:Bind"]);

    assert_eq!(
        style_document(r#"<Grid Margin="1,2"><Button A="1" B="2"/></Grid>"#, &config).unwrap(),
        "<Grid Margin=\"1 2\">\n  <Button A=\"1\"\n          B=\"2\" />\n</Grid>"
    );
}

#[test]
fn test_rule_groups_from_json_list() {
    let dir = project();
    let path = dir.path().join("Settings.XamlStyler");
    fs::write(
        &path,
        r#"{ "AttributeOrderingRuleGroups": ["Content", "x:Name"], "ReorderVSM": "First" }"#,
    )
    .unwrap();

    let partial = PartialConfig::from_file(&path).unwrap();
    let config = Config::resolve(Some(&partial), &PartialConfig::default());
    assert_eq!(config.reorder_vsm, VisualStateManagerRule::First);
    assert_eq!(
        style_document(r#"<Button x:Name="a" Content="b"/>"#, &config).unwrap(),
        r#"<Button Content="b" x:Name="a" />"#
    );
}

#[test]
fn test_comment_padding_alias() {
    let partial: PartialConfig = serde_json::from_str(r#"{ "CommentPadding": 1 }"#).unwrap();
    assert_eq!(partial.comment_spaces, Some(1));
}

#[test]
fn test_toml_config_preferred_and_nearest_wins() {
    let dir = project();
    fs::write(dir.path().join("xamlfmt.toml"), "indent_size = 3\n").unwrap();
    fs::write(dir.path().join("Settings.XamlStyler"), r#"{ "IndentSize": 8 }"#).unwrap();

    let views = dir.path().join("Views");
    fs::create_dir(&views).unwrap();
    fs::write(views.join("xamlfmt.toml"), "indent_with_tabs = true\n").unwrap();

    let top = dir.path().join("App.xaml");
    touch(&top);
    let nested = views.join("Main.xaml");
    touch(&nested);

    let config = Config::from_discovered_file(&top, &PartialConfig::default());
    assert_eq!(config.indent_size, 3);

    // Only the nearest file applies
    let config = Config::from_discovered_file(&nested, &PartialConfig::default());
    assert!(config.indent_with_tabs);
    assert_eq!(config.indent_size, 4);
}

#[test]
fn test_overrides_beat_config_file() {
    let dir = project();
    fs::write(
        dir.path().join("xamlfmt.toml"),
        "indent_size = 3\nnew_line_style = \"windows\"\n",
    )
    .unwrap();
    let file = dir.path().join("App.xaml");
    touch(&file);

    let overrides = PartialConfig {
        new_line_style: Some(NewLineStyle::Unix),
        ..Default::default()
    };
    let config = Config::from_discovered_file(&file, &overrides);
    assert_eq!(config.indent_size, 3);
    assert_eq!(config.new_line_style, NewLineStyle::Unix);
}

#[test]
fn test_unreadable_config_falls_back_to_defaults() {
    let dir = project();
    fs::write(dir.path().join("Settings.XamlStyler"), "{ not json").unwrap();
    let file = dir.path().join("App.xaml");
    touch(&file);

    let config = Config::from_discovered_file(&file, &PartialConfig::default());
    assert_eq!(config, Config::default());
}

#[test]
fn test_invalid_values_rejected() {
    let partial: PartialConfig = serde_json::from_str(r#"{ "IndentSize": 0 }"#).unwrap();
    let config = Config::resolve(Some(&partial), &PartialConfig::default());
    assert!(config.validate().is_some());
    assert!(Config::default().validate().is_none());
}

#[test]
fn test_axaml_files_use_avalonia_dialect() {
    let config = Config {
        new_line_style: NewLineStyle::Unix,
        ..Default::default()
    };
    let source = r#"<Style Selector="StackPanel &gt; Button" />"#;

    let avalonia = Dialect::for_path(Path::new("Views/MainView.axaml"), &config);
    assert_eq!(
        style_document_with(source, &config, &avalonia).unwrap(),
        r#"<Style Selector="StackPanel > Button" />"#
    );

    let xaml = Dialect::for_path(Path::new("Views/MainView.xaml"), &config);
    assert_eq!(
        style_document_with(source, &config, &xaml).unwrap(),
        r#"<Style Selector="StackPanel &gt; Button" />"#
    );
}

#[test]
fn test_design_time_prefix_ignored_for_ordering() {
    let source = r#"<Grid xmlns:d="http://schemas.microsoft.com/expression/blend/2008" d:Width="2" Tag="x" Width="1" />"#;
    let config = Config {
        new_line_style: NewLineStyle::Unix,
        ignore_design_time_reference_prefix: true,
        ..Default::default()
    };
    // d:Width sorts with Width, ties keep source order
    assert_eq!(
        style_document(source, &config).unwrap(),
        "<Grid\n    xmlns:d=\"http://schemas.microsoft.com/expression/blend/2008\"\n    d:Width=\"2\"\n    Width=\"1\"\n    Tag=\"x\" />"
    );
}

#[test]
fn test_first_line_attributes_pinned_after_ordering() {
    let config = Config {
        new_line_style: NewLineStyle::Unix,
        first_line_attributes: vec!["Content".to_string(), "x:Name".to_string()],
        ..Default::default()
    };
    assert_eq!(
        style_document(r#"<Button Width="1" Height="2" x:Name="b" Content="c" />"#, &config).unwrap(),
        "<Button Content=\"c\" x:Name=\"b\"\n        Width=\"1\"\n        Height=\"2\" />"
    );
}
