//! Unit tests for system-versioned (temporal) table handling
//!
//! These tests verify conversions between regular and temporal tables, versioning
//! bracketing around structural changes, and mirroring of column changes onto history tables.

use pretty_assertions::assert_eq;

use rust_sqlmigrate::model::{
    ColumnElement, DefaultValue, IndexElement, ObjectName, TableAnnotation, TableAnnotations,
    TableElement,
};
use rust_sqlmigrate::operations::{
    diff_models, AddColumnOperation, AlterTableOperation, DropColumnOperation,
    MigrationOperation, RenameTableOperation,
};
use rust_sqlmigrate::{compile, CompileOptions, MigrationError};

use crate::common::{batches, diff_script, model, table, temporal_annotations, temporal_table};

const VERSIONING_OFF_DBO_BLOG: &str = "ALTER TABLE [dbo].[Blog] SET (SYSTEM_VERSIONING = OFF)";
const VERSIONING_ON_DBO_BLOG: &str =
    "ALTER TABLE [dbo].[Blog] SET (SYSTEM_VERSIONING = ON (HISTORY_TABLE = [dbo].[BlogHistory]))";

fn name_column() -> ColumnElement {
    ColumnElement::new("Name", "nvarchar(max)", true)
}

fn blog(columns: Vec<ColumnElement>) -> TableElement {
    let mut all = vec![name_column()];
    all.extend(columns);
    temporal_table(Some("dbo"), "Blog", all)
}

// ============================================================================
// Regular -> Temporal
// ============================================================================

#[test]
fn test_convert_regular_table_to_temporal() {
    let old = model(vec![table(None, "Customer", vec![name_column()])]);
    let new = model(vec![temporal_table(None, "Customer", vec![name_column()])]);

    let script = diff_script(&old, &new);

    assert_eq!(
        batches(&script),
        vec![
            "ALTER TABLE [Customer] ADD [End] datetime2 NOT NULL DEFAULT '9999-12-31T23:59:59.9999999';",
            "ALTER TABLE [Customer] ADD [Start] datetime2 NOT NULL DEFAULT '0001-01-01T00:00:00.0000000';",
            "ALTER TABLE [Customer] ADD PERIOD FOR SYSTEM_TIME ([Start], [End])",
            "ALTER TABLE [Customer] ALTER COLUMN [Start] ADD HIDDEN",
            "ALTER TABLE [Customer] ALTER COLUMN [End] ADD HIDDEN",
            "DECLARE @historyTableSchema sysname = SCHEMA_NAME()\n\
             EXEC(N'ALTER TABLE [Customer] SET (SYSTEM_VERSIONING = ON (HISTORY_TABLE = [' + @historyTableSchema + '].[CustomerHistory]))')",
        ]
    );
    assert!(script.commands[5].suppress_transaction);
    assert!(!script.commands[2].suppress_transaction);
}

#[test]
fn test_convert_with_explicit_schema_uses_static_history_name() {
    let old = model(vec![table(Some("dbo"), "Blog", vec![name_column()])]);
    let new = model(vec![blog(vec![])]);

    let script = diff_script(&old, &new);
    let batches = batches(&script);

    assert_eq!(batches.last().map(String::as_str), Some(VERSIONING_ON_DBO_BLOG));
    assert!(!batches.iter().any(|b| b.contains("SYSTEM_VERSIONING = OFF")));
}

#[test]
fn test_missing_period_columns_are_synthesized() {
    let old = model(vec![table(None, "Customer", vec![name_column()])]);
    let operations = vec![MigrationOperation::AlterTable(AlterTableOperation {
        table: ObjectName::new(None, "Customer"),
        old_annotations: TableAnnotations::default(),
        annotations: temporal_annotations("Start", "End"),
        old_comment: None,
        comment: None,
    })];

    let script = compile(Some(&old), None, Some(operations), &CompileOptions::default()).unwrap();
    let batches = batches(&script);

    assert_eq!(
        &batches[..3],
        &[
            "ALTER TABLE [Customer] ADD [End] datetime2 NOT NULL DEFAULT '9999-12-31T23:59:59.9999999';",
            "ALTER TABLE [Customer] ADD [Start] datetime2 NOT NULL DEFAULT '0001-01-01T00:00:00.0000000';",
            "ALTER TABLE [Customer] ADD PERIOD FOR SYSTEM_TIME ([Start], [End])",
        ]
    );
}

// ============================================================================
// Temporal -> Regular
// ============================================================================

#[test]
fn test_convert_temporal_table_to_regular() {
    let old = model(vec![temporal_table(None, "Customer", vec![name_column()])]);
    let new = model(vec![table(None, "Customer", vec![name_column()])]);

    let script = diff_script(&old, &new);
    let batches = batches(&script);

    assert_eq!(batches.len(), 5);
    assert_eq!(batches[0], "ALTER TABLE [Customer] SET (SYSTEM_VERSIONING = OFF)");
    assert_eq!(batches[1], "ALTER TABLE [Customer] DROP PERIOD FOR SYSTEM_TIME");
    assert_eq!(
        batches[2],
        "DECLARE @var sysname;\n\
         SELECT @var = [d].[name]\n\
         FROM [sys].[default_constraints] [d]\n\
         INNER JOIN [sys].[columns] [c] ON [d].[parent_column_id] = [c].[column_id] AND [d].[parent_object_id] = [c].[object_id]\n\
         WHERE ([d].[parent_object_id] = OBJECT_ID(N'[Customer]') AND [c].[name] = N'End');\n\
         IF @var IS NOT NULL EXEC(N'ALTER TABLE [Customer] DROP CONSTRAINT [' + @var + '];');\n\
         ALTER TABLE [Customer] DROP COLUMN [End];"
    );
    assert!(batches[3].starts_with("DECLARE @var1 sysname;"));
    assert!(batches[3].ends_with("ALTER TABLE [Customer] DROP COLUMN [Start];"));
    assert_eq!(batches[4], "DROP TABLE [CustomerHistory];");
}

#[test]
fn test_authored_conversion_to_regular_drops_period_columns() {
    let old = model(vec![temporal_table(None, "Customer", vec![name_column()])]);
    let operations = vec![MigrationOperation::AlterTable(AlterTableOperation {
        table: ObjectName::new(None, "Customer"),
        old_annotations: temporal_annotations("Start", "End"),
        annotations: TableAnnotations::default(),
        old_comment: None,
        comment: None,
    })];

    let script = compile(Some(&old), None, Some(operations), &CompileOptions::default()).unwrap();
    let batches = batches(&script);

    assert_eq!(batches.len(), 5);
    assert_eq!(batches[0], "ALTER TABLE [Customer] SET (SYSTEM_VERSIONING = OFF)");
    assert_eq!(batches[1], "ALTER TABLE [Customer] DROP PERIOD FOR SYSTEM_TIME");
    assert!(batches[2].starts_with("DECLARE @var sysname;"));
    assert!(batches[2].ends_with("ALTER TABLE [Customer] DROP COLUMN [End];"));
    assert!(batches[3].starts_with("DECLARE @var1 sysname;"));
    assert!(batches[3].ends_with("ALTER TABLE [Customer] DROP COLUMN [Start];"));
    assert_eq!(batches[4], "DROP TABLE [CustomerHistory];");
}

#[test]
fn test_renamed_table_turned_regular_drops_original_history() {
    let old = model(vec![temporal_table(None, "Customer", vec![name_column()])]);
    let mut client = table(None, "Client", vec![name_column()]);
    client.renamed_from = Some(ObjectName::new(None, "Customer"));
    client.primary_key.as_mut().unwrap().name = "PK_Customer".to_string();
    let new = model(vec![client]);

    let script = diff_script(&old, &new);
    let batches = batches(&script);

    assert_eq!(batches[0], "ALTER TABLE [Customer] SET (SYSTEM_VERSIONING = OFF)");
    assert_eq!(batches[1], "EXEC sp_rename N'[Customer]', N'Client', 'OBJECT';");
    assert_eq!(batches[2], "ALTER TABLE [Client] DROP PERIOD FOR SYSTEM_TIME");
    assert_eq!(batches.last().map(String::as_str), Some("DROP TABLE [CustomerHistory];"));
    assert!(!batches.iter().any(|b| b.contains("ClientHistory")));
}

#[test]
fn test_round_trip_restores_original_model() {
    let regular = model(vec![table(None, "Customer", vec![name_column()])]);
    let temporal = model(vec![temporal_table(None, "Customer", vec![name_column()])]);

    let forward = diff_models(&regular, &temporal);
    let backward = diff_models(&temporal, &regular);

    let added: Vec<&str> = forward
        .iter()
        .filter_map(|op| match op {
            MigrationOperation::AddColumn(op) => Some(op.column.name.as_str()),
            _ => None,
        })
        .collect();
    let dropped: Vec<&str> = backward
        .iter()
        .filter_map(|op| match op {
            MigrationOperation::DropColumn(op) => Some(op.name.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(added, vec!["End", "Start"]);
    assert_eq!(dropped, added);
    assert!(diff_models(&regular, &regular).is_empty());
    assert!(diff_models(&temporal, &temporal).is_empty());
}

// ============================================================================
// Create / Drop / Rename
// ============================================================================

#[test]
fn test_create_temporal_table_with_explicit_history() {
    let mut order = temporal_table(Some("dbo"), "Order", vec![]);
    order
        .annotations
        .set(TableAnnotation::HistoryTableName("OrderArchive".to_string()));
    order
        .annotations
        .set(TableAnnotation::HistoryTableSchema("history".to_string()));
    let new = model(vec![order]);

    let script = compile(None, Some(&new), None, &CompileOptions::default()).unwrap();

    assert_eq!(
        batches(&script),
        vec![
            "IF SCHEMA_ID(N'history') IS NULL EXEC(N'CREATE SCHEMA [history];');",
            "CREATE TABLE [dbo].[Order] (\n    \
             [Id] int NOT NULL IDENTITY,\n    \
             [End] datetime2 GENERATED ALWAYS AS ROW END HIDDEN NOT NULL,\n    \
             [Start] datetime2 GENERATED ALWAYS AS ROW START HIDDEN NOT NULL,\n    \
             CONSTRAINT [PK_Order] PRIMARY KEY ([Id]),\n    \
             PERIOD FOR SYSTEM_TIME([Start], [End])\n\
             ) WITH (SYSTEM_VERSIONING = ON (HISTORY_TABLE = [history].[OrderArchive]));",
        ]
    );
}

#[test]
fn test_create_temporal_table_in_default_schema_binds_history_at_runtime() {
    let new = model(vec![temporal_table(None, "Order", vec![])]);

    let script = compile(None, Some(&new), None, &CompileOptions::default()).unwrap();
    let batches = batches(&script);

    assert_eq!(batches.len(), 1);
    assert!(batches[0].starts_with(
        "DECLARE @historyTableSchema sysname = SCHEMA_NAME()\nEXEC(N'CREATE TABLE [Order] ("
    ));
    assert!(batches[0].ends_with(
        ") WITH (SYSTEM_VERSIONING = ON (HISTORY_TABLE = [' + @historyTableSchema + N'].[OrderHistory]))');"
    ));
}

#[test]
fn test_drop_temporal_table_drops_history() {
    let old = model(vec![temporal_table(None, "Customer", vec![])]);
    let new = model(vec![]);

    let script = diff_script(&old, &new);

    assert_eq!(
        batches(&script),
        vec![
            "ALTER TABLE [Customer] SET (SYSTEM_VERSIONING = OFF)",
            "DROP TABLE [Customer];",
            "DROP TABLE [CustomerHistory];",
        ]
    );
}

#[test]
fn test_rename_temporal_table_renames_default_history() {
    let old = model(vec![temporal_table(None, "Customer", vec![])]);
    let mut client = temporal_table(None, "Client", vec![]);
    client.renamed_from = Some(ObjectName::new(None, "Customer"));
    client.primary_key.as_mut().unwrap().name = "PK_Customer".to_string();
    let new = model(vec![client]);

    let script = diff_script(&old, &new);

    assert_eq!(
        batches(&script),
        vec![
            "ALTER TABLE [Customer] SET (SYSTEM_VERSIONING = OFF)",
            "EXEC sp_rename N'[Customer]', N'Client', 'OBJECT';",
            "EXEC sp_rename N'[CustomerHistory]', N'ClientHistory', 'OBJECT';",
            "DECLARE @historyTableSchema sysname = SCHEMA_NAME()\n\
             EXEC(N'ALTER TABLE [Client] SET (SYSTEM_VERSIONING = ON (HISTORY_TABLE = [' + @historyTableSchema + '].[ClientHistory]))')",
        ]
    );
}

#[test]
fn test_history_table_moves_to_new_schema() {
    let old = model(vec![blog(vec![])]);
    let mut moved = blog(vec![]);
    moved
        .annotations
        .set(TableAnnotation::HistoryTableName("BlogArchive".to_string()));
    moved
        .annotations
        .set(TableAnnotation::HistoryTableSchema("archive".to_string()));
    let new = model(vec![moved]);

    let script = diff_script(&old, &new);

    assert_eq!(
        batches(&script),
        vec![
            "IF SCHEMA_ID(N'archive') IS NULL EXEC(N'CREATE SCHEMA [archive];');",
            VERSIONING_OFF_DBO_BLOG,
            "EXEC sp_rename N'[dbo].[BlogHistory]', N'BlogArchive', 'OBJECT';\n\
             ALTER SCHEMA [archive] TRANSFER [dbo].[BlogArchive];",
            "ALTER TABLE [dbo].[Blog] SET (SYSTEM_VERSIONING = ON (HISTORY_TABLE = [archive].[BlogArchive]))",
        ]
    );
}

// ============================================================================
// Bracketing and Mirroring
// ============================================================================

#[test]
fn test_add_column_is_mirrored_inside_bracket() {
    let old = model(vec![blog(vec![])]);
    let new = model(vec![blog(vec![
        ColumnElement::new("Rating", "int", false).with_default(DefaultValue::Int(0)),
    ])]);

    let script = diff_script(&old, &new);

    assert_eq!(
        batches(&script),
        vec![
            VERSIONING_OFF_DBO_BLOG,
            "ALTER TABLE [dbo].[Blog] ADD [Rating] int NOT NULL DEFAULT 0;",
            "ALTER TABLE [dbo].[BlogHistory] ADD [Rating] int NOT NULL DEFAULT 0;",
            VERSIONING_ON_DBO_BLOG,
        ]
    );
    assert!(script.commands[0].suppress_transaction);
    assert!(script.commands[3].suppress_transaction);
}

#[test]
fn test_several_changes_share_one_bracket() {
    let old = model(vec![blog(vec![ColumnElement::new("Legacy", "int", true)])]);
    let new = model(vec![blog(vec![ColumnElement::new("Rating", "int", true)])]);

    let script = diff_script(&old, &new);
    let batches = batches(&script);

    let off = batches.iter().filter(|b| b.contains("SYSTEM_VERSIONING = OFF")).count();
    let on = batches.iter().filter(|b| b.contains("SYSTEM_VERSIONING = ON")).count();
    assert_eq!((off, on), (1, 1));
    assert_eq!(batches.first().map(String::as_str), Some(VERSIONING_OFF_DBO_BLOG));
    assert_eq!(batches.last().map(String::as_str), Some(VERSIONING_ON_DBO_BLOG));
    assert!(batches
        .iter()
        .any(|b| b.ends_with("ALTER TABLE [dbo].[BlogHistory] DROP COLUMN [Legacy];")));
    assert!(batches
        .iter()
        .any(|b| b == "ALTER TABLE [dbo].[BlogHistory] ADD [Rating] int NULL;"));
}

#[test]
fn test_rename_column_is_mirrored() {
    let old = model(vec![blog(vec![])]);
    let mut new_blog = blog(vec![]);
    let name = new_blog.columns.iter_mut().find(|c| c.name == "Name").unwrap();
    name.name = "Title".to_string();
    name.renamed_from = Some("Name".to_string());
    let new = model(vec![new_blog]);

    let script = diff_script(&old, &new);

    assert_eq!(
        batches(&script),
        vec![
            VERSIONING_OFF_DBO_BLOG,
            "EXEC sp_rename N'[dbo].[Blog].[Name]', N'Title', 'COLUMN';",
            "EXEC sp_rename N'[dbo].[BlogHistory].[Name]', N'Title', 'COLUMN';",
            VERSIONING_ON_DBO_BLOG,
        ]
    );
}

#[test]
fn test_column_added_before_table_rename_follows_the_rename() {
    let old = model(vec![temporal_table(Some("dbo"), "Customer", vec![name_column()])]);
    let customer = ObjectName::new(Some("dbo"), "Customer");
    let operations = vec![
        MigrationOperation::AddColumn(AddColumnOperation {
            table: customer.clone(),
            column: ColumnElement::new("Age", "int", true),
            annotations: temporal_annotations("Start", "End"),
        }),
        MigrationOperation::RenameTable(RenameTableOperation {
            table: customer,
            new_table: ObjectName::new(Some("dbo"), "Client"),
            annotations: temporal_annotations("Start", "End"),
        }),
    ];

    let script = compile(Some(&old), None, Some(operations), &CompileOptions::default()).unwrap();

    assert_eq!(
        batches(&script),
        vec![
            "ALTER TABLE [dbo].[Customer] SET (SYSTEM_VERSIONING = OFF)",
            "EXEC sp_rename N'[dbo].[Customer]', N'Client', 'OBJECT';",
            "EXEC sp_rename N'[dbo].[CustomerHistory]', N'ClientHistory', 'OBJECT';",
            "ALTER TABLE [dbo].[Client] ADD [Age] int NULL;",
            "ALTER TABLE [dbo].[ClientHistory] ADD [Age] int NULL;",
            "ALTER TABLE [dbo].[Client] SET (SYSTEM_VERSIONING = ON (HISTORY_TABLE = [dbo].[ClientHistory]))",
        ]
    );
}

#[test]
fn test_default_change_stays_on_primary_table() {
    let rating = |value: i64| {
        ColumnElement::new("Rating", "int", false).with_default(DefaultValue::Int(value))
    };
    let old = model(vec![blog(vec![rating(3)])]);
    let new = model(vec![blog(vec![rating(5)])]);

    let script = diff_script(&old, &new);
    let batches = batches(&script);

    assert_eq!(batches.len(), 1);
    assert!(batches[0].ends_with("ALTER TABLE [dbo].[Blog] ADD DEFAULT 5 FOR [Rating];"));
    assert!(!batches[0].contains("SYSTEM_VERSIONING"));
    assert!(!batches[0].contains("BlogHistory"));
}

#[test]
fn test_type_change_is_mirrored() {
    let old = model(vec![blog(vec![ColumnElement::new("Rating", "int", true)])]);
    let new = model(vec![blog(vec![ColumnElement::new("Rating", "bigint", true)])]);

    let script = diff_script(&old, &new);
    let batches = batches(&script);

    assert_eq!(batches.first().map(String::as_str), Some(VERSIONING_OFF_DBO_BLOG));
    assert_eq!(batches.last().map(String::as_str), Some(VERSIONING_ON_DBO_BLOG));
    assert!(batches
        .iter()
        .any(|b| b.contains("ALTER TABLE [dbo].[BlogHistory] ALTER COLUMN [Rating] bigint NULL;")));
}

#[test]
fn test_index_change_needs_no_bracket() {
    let old = model(vec![blog(vec![])]);
    let mut new_blog = blog(vec![]);
    new_blog.indexes.push(IndexElement {
        name: "IX_Blog_Name".to_string(),
        columns: vec!["Name".to_string()],
        is_unique: false,
        clustered: None,
        include: vec![],
        filter: None,
    });
    let new = model(vec![new_blog]);

    let script = diff_script(&old, &new);

    assert_eq!(
        batches(&script),
        vec!["CREATE INDEX [IX_Blog_Name] ON [dbo].[Blog] ([Name]);"]
    );
}

// ============================================================================
// Rejections
// ============================================================================

#[test]
fn test_computed_expression_change_is_rejected() {
    let columns = |sql: &str| {
        vec![
            ColumnElement::new("A", "int", false),
            ColumnElement::new("B", "int", false),
            ColumnElement::new("Total", "int", true).with_computed_sql(sql, false),
        ]
    };
    let old = model(vec![blog(columns("[A] + [B]"))]);
    let new = model(vec![blog(columns("[A] - [B]"))]);

    let result = compile(Some(&old), Some(&new), None, &CompileOptions::default());

    assert!(matches!(
        result,
        Err(MigrationError::UnsupportedOperation { .. })
    ));
}

#[test]
fn test_period_column_drop_is_rejected() {
    let old = model(vec![blog(vec![])]);
    let operations = vec![MigrationOperation::DropColumn(DropColumnOperation {
        table: ObjectName::new(Some("dbo"), "Blog"),
        name: "End".to_string(),
        default_constraint_name: None,
        annotations: temporal_annotations("Start", "End"),
    })];

    let result = compile(Some(&old), None, Some(operations), &CompileOptions::default());

    let err = result.unwrap_err();
    assert!(err.to_string().contains("period column End"), "{}", err);
}
