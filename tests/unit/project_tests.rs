//! Unit tests for the migration project parser
//!
//! These tests verify the parsing of MSBuild-style migration project files.

use std::path::PathBuf;

use tempfile::TempDir;

use rust_sqlmigrate::project::{parse_project, SqlServerVersion};
use rust_sqlmigrate::MigrationError;

/// Helper to create a test project directory holding only the project file
fn create_test_project(content: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let project_path = temp_dir.path().join("Inventory.sqlproj");
    std::fs::write(&project_path, content).unwrap();
    (temp_dir, project_path)
}

// ============================================================================
// Properties
// ============================================================================

#[test]
fn test_parse_full_project() {
    let content = r#"<?xml version="1.0" encoding="utf-8"?>
<Project DefaultTargets="Build" xmlns="http://schemas.microsoft.com/developer/msbuild/2003">
  <PropertyGroup>
    <DSP>Microsoft.Data.Tools.Schema.Sql.Sql150DatabaseSchemaProvider</DSP>
    <DefaultSchema>app</DefaultSchema>
    <UseNamedDefaultConstraints>True</UseNamedDefaultConstraints>
    <Idempotent>true</Idempotent>
  </PropertyGroup>
  <ItemGroup>
    <SourceModel Include="snapshots\v1.json" />
    <TargetModel Include="snapshots\v2.json" />
  </ItemGroup>
</Project>"#;

    let (temp_dir, path) = create_test_project(content);
    let project = parse_project(&path).unwrap();

    assert_eq!(project.name, "Inventory");
    assert_eq!(project.target_platform, SqlServerVersion::Sql150);
    assert_eq!(project.default_schema, "app");
    assert_eq!(project.use_named_default_constraints, Some(true));
    assert!(project.idempotent);
    assert_eq!(
        project.source_model,
        Some(temp_dir.path().join("snapshots/v1.json"))
    );
    assert_eq!(
        project.target_model,
        Some(temp_dir.path().join("snapshots/v2.json"))
    );
    assert_eq!(project.operations, None);
    assert_eq!(project.project_dir, temp_dir.path());
}

#[test]
fn test_defaults_for_missing_properties() {
    let content = r#"<Project>
  <ItemGroup>
    <Operations Include="operations.json" />
  </ItemGroup>
</Project>"#;

    let (_temp_dir, path) = create_test_project(content);
    let project = parse_project(&path).unwrap();

    assert_eq!(project.target_platform, SqlServerVersion::Sql160);
    assert_eq!(project.default_schema, "dbo");
    assert_eq!(project.use_named_default_constraints, None);
    assert!(!project.idempotent);
    assert_eq!(project.source_model, None);
    assert!(project.operations.is_some());
}

#[test]
fn test_first_item_wins() {
    let content = r#"<Project>
  <ItemGroup>
    <TargetModel Include="first.json" />
    <TargetModel Include="second.json" />
  </ItemGroup>
</Project>"#;

    let (temp_dir, path) = create_test_project(content);
    let project = parse_project(&path).unwrap();

    assert_eq!(project.target_model, Some(temp_dir.path().join("first.json")));
}

// ============================================================================
// Errors
// ============================================================================

#[test]
fn test_project_without_target_is_rejected() {
    let content = r#"<Project>
  <ItemGroup>
    <SourceModel Include="v1.json" />
  </ItemGroup>
</Project>"#;

    let (_temp_dir, path) = create_test_project(content);
    let result = parse_project(&path);

    assert!(matches!(
        result,
        Err(MigrationError::InvalidProjectFormat { .. })
    ));
}

#[test]
fn test_malformed_xml_is_rejected() {
    let (_temp_dir, path) = create_test_project("<Project><ItemGroup></Project>");
    let result = parse_project(&path);

    assert!(matches!(result, Err(MigrationError::ProjectParseError { .. })));
}

#[test]
fn test_missing_project_file() {
    let temp_dir = TempDir::new().unwrap();
    let result = parse_project(&temp_dir.path().join("missing.sqlproj"));

    assert!(matches!(result, Err(MigrationError::ProjectReadError { .. })));
}

#[test]
fn test_version_parsing() {
    assert_eq!("140".parse::<SqlServerVersion>().unwrap(), SqlServerVersion::Sql140);
    assert_eq!(SqlServerVersion::Sql130.compatibility_mode(), 130);
    assert!("Sql200".parse::<SqlServerVersion>().is_err());
}
