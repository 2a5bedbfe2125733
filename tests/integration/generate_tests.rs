//! Integration tests for script generation
//!
//! These tests write projects, snapshots and operation lists to a temporary directory and
//! run the full pipeline through to the script file.

use pretty_assertions::assert_eq;

use rust_sqlmigrate::model::{CheckConstraintElement, ColumnElement, DefaultValue};
use rust_sqlmigrate::{diff_snapshots, generate_migration, GenerateOptions, SqlServerVersion};

use crate::common::{model, table, temporal_table, TestContext};

const PROJECT: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<Project DefaultTargets="Build" xmlns="http://schemas.microsoft.com/developer/msbuild/2003">
  <PropertyGroup>
    <DSP>Microsoft.Data.Tools.Schema.Sql.Sql150DatabaseSchemaProvider</DSP>
    <UseNamedDefaultConstraints>true</UseNamedDefaultConstraints>
  </PropertyGroup>
  <ItemGroup>
    <SourceModel Include="snapshots\v1.json" />
    <TargetModel Include="snapshots\v2.json" />
  </ItemGroup>
</Project>"#;

fn write_snapshots(ctx: &TestContext) {
    let v1 = model(vec![temporal_table(
        Some("dbo"),
        "Blog",
        vec![ColumnElement::new("Name", "nvarchar(max)", true)],
    )]);
    let v2 = model(vec![temporal_table(
        Some("dbo"),
        "Blog",
        vec![
            ColumnElement::new("Name", "nvarchar(max)", true),
            ColumnElement::new("Rating", "int", false).with_default(DefaultValue::Int(0)),
        ],
    )]);
    ctx.write_snapshot("v1.json", &v1);
    ctx.write_snapshot("v2.json", &v2);
}

fn project_options(ctx: &TestContext) -> GenerateOptions {
    GenerateOptions {
        project_path: Some(ctx.project_path()),
        ..GenerateOptions::default()
    }
}

// ============================================================================
// Project Builds
// ============================================================================

#[test]
fn test_generate_from_project() {
    let ctx = TestContext::new();
    ctx.write_project(PROJECT);
    write_snapshots(&ctx);

    let output = generate_migration(project_options(&ctx)).unwrap();

    assert_eq!(output, ctx.project_dir.join("bin").join("migration.sql"));
    let script = std::fs::read_to_string(&output).unwrap();
    let body = "-- Non-transactional\n\
                ALTER TABLE [dbo].[Blog] SET (SYSTEM_VERSIONING = OFF)\nGO\n\n\
                ALTER TABLE [dbo].[Blog] ADD [Rating] int NOT NULL CONSTRAINT [DF_Blog_Rating] DEFAULT 0;\nGO\n\n\
                ALTER TABLE [dbo].[BlogHistory] ADD [Rating] int NOT NULL DEFAULT 0;\nGO\n\n\
                -- Non-transactional\n\
                ALTER TABLE [dbo].[Blog] SET (SYSTEM_VERSIONING = ON (HISTORY_TABLE = [dbo].[BlogHistory]))\nGO\n\n";

    assert!(script.starts_with(
        "-- Migration script generated by rust-sqlmigrate\n\
         -- Target platform: Sql150 (compatibility level 150)\n\
         -- Checksum: "
    ));
    assert!(script.ends_with(body), "unexpected script:\n{}", script);
}

#[test]
fn test_generate_is_deterministic() {
    let ctx = TestContext::new();
    ctx.write_project(PROJECT);
    write_snapshots(&ctx);

    let first = generate_migration(project_options(&ctx)).unwrap();
    let first = std::fs::read_to_string(first).unwrap();
    let second = generate_migration(project_options(&ctx)).unwrap();
    let second = std::fs::read_to_string(second).unwrap();

    assert_eq!(first, second);
}

#[test]
fn test_command_line_overrides_project() {
    let ctx = TestContext::new();
    ctx.write_project(PROJECT);
    write_snapshots(&ctx);
    let output_path = ctx.project_dir.join("out").join("custom.sql");

    let output = generate_migration(GenerateOptions {
        output_path: Some(output_path.clone()),
        use_named_default_constraints: Some(false),
        target_platform: Some(SqlServerVersion::Sql160),
        ..project_options(&ctx)
    })
    .unwrap();

    assert_eq!(output, output_path);
    let script = std::fs::read_to_string(&output).unwrap();
    assert!(script.contains("-- Target platform: Sql160 (compatibility level 160)"));
    assert!(script.contains("ALTER TABLE [dbo].[Blog] ADD [Rating] int NOT NULL DEFAULT 0;"));
    assert!(!script.contains("DF_Blog_Rating"));
}

#[test]
fn test_generate_from_operation_list() {
    let ctx = TestContext::new();
    ctx.write_project(
        r#"<Project>
  <PropertyGroup>
    <UseNamedDefaultConstraints>true</UseNamedDefaultConstraints>
  </PropertyGroup>
  <ItemGroup>
    <Operations Include="operations.json" />
  </ItemGroup>
</Project>"#,
    );
    ctx.write_file(
        "operations.json",
        r#"[
  { "op": "ensure_schema", "name": "sales" },
  {
    "op": "create_table",
    "table": {
      "schema": "sales",
      "name": "Order",
      "columns": [
        { "name": "Id", "store_type": "int" },
        {
          "name": "Placed",
          "store_type": "datetime2",
          "value": { "kind": "default_sql", "value": "SYSUTCDATETIME()" }
        }
      ],
      "primary_key": { "name": "PK_Order", "columns": ["Id"] }
    }
  }
]"#,
    );

    let output = generate_migration(project_options(&ctx)).unwrap();
    let script = std::fs::read_to_string(output).unwrap();

    assert!(script.ends_with(
        "IF SCHEMA_ID(N'sales') IS NULL EXEC(N'CREATE SCHEMA [sales];');\nGO\n\n\
         CREATE TABLE [sales].[Order] (\n    \
         [Id] int NOT NULL,\n    \
         [Placed] datetime2 NOT NULL CONSTRAINT [DF_Order_Placed] DEFAULT (SYSUTCDATETIME()),\n    \
         CONSTRAINT [PK_Order] PRIMARY KEY ([Id])\n\
         );\nGO\n\n"
    ));
}

#[test]
fn test_idempotent_project_setting() {
    let ctx = TestContext::new();
    ctx.write_project(
        r#"<Project>
  <PropertyGroup>
    <Idempotent>true</Idempotent>
  </PropertyGroup>
  <ItemGroup>
    <TargetModel Include="snapshots\v1.json" />
  </ItemGroup>
</Project>"#,
    );
    let mut blog = table(Some("dbo"), "Blog", vec![]);
    blog.check_constraints.push(CheckConstraintElement {
        name: "CK_Blog_Id".to_string(),
        sql: "[Id] > 0".to_string(),
    });
    ctx.write_snapshot("v1.json", &model(vec![blog]));

    let output = generate_migration(project_options(&ctx)).unwrap();
    let script = std::fs::read_to_string(output).unwrap();

    assert!(script.contains("CONSTRAINT [CK_Blog_Id] CHECK ([Id] > 0)"));
}

// ============================================================================
// Errors
// ============================================================================

#[test]
fn test_invalid_snapshot_is_reported() {
    let ctx = TestContext::new();
    ctx.write_project(PROJECT);
    ctx.write_file("snapshots/v1.json", "{ \"tables\": [");
    ctx.write_file("snapshots/v2.json", "{}");

    let err = generate_migration(project_options(&ctx)).unwrap_err();

    assert!(
        err.to_string().contains("Failed to parse snapshot file"),
        "unexpected error: {}",
        err
    );
}

#[test]
fn test_invalid_model_writes_nothing() {
    let ctx = TestContext::new();
    ctx.write_project(PROJECT);
    write_snapshots(&ctx);
    let mut broken = table(Some("dbo"), "Blog", vec![]);
    broken.columns.push(ColumnElement::new("Id", "int", false));
    ctx.write_snapshot("v2.json", &model(vec![broken]));

    let result = generate_migration(project_options(&ctx));

    assert!(result.is_err());
    assert!(!ctx.project_dir.join("bin").join("migration.sql").exists());
}

#[test]
fn test_diff_snapshots_against_empty_database() {
    let ctx = TestContext::new();
    let target = ctx.write_snapshot(
        "v1.json",
        &model(vec![table(Some("sales"), "Customer", vec![])]),
    );

    let operations = diff_snapshots(None, &target).unwrap();

    let kinds: Vec<&str> = operations.iter().map(|op| op.kind()).collect();
    assert_eq!(kinds, vec!["EnsureSchema", "CreateTable"]);
}
