//! Common test utilities for rust-sqlmigrate tests
#![allow(dead_code)]

use std::fs;
use std::path::PathBuf;

use rust_sqlmigrate::model::{
    ColumnElement, IdentitySpec, PrimaryKeyElement, SchemaModel, TableAnnotation,
    TableAnnotations, TableElement,
};
use rust_sqlmigrate::operations::MigrationOperation;
use rust_sqlmigrate::{compile, CompileOptions, MigrationScript};
use tempfile::TempDir;

/// Test context with a temporary project directory for isolated test execution
pub struct TestContext {
    /// Kept to prevent temp directory cleanup until TestContext is dropped
    _temp_dir: TempDir,
    pub project_dir: PathBuf,
}

impl TestContext {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let project_dir = temp_dir.path().to_path_buf();
        Self {
            _temp_dir: temp_dir,
            project_dir,
        }
    }

    /// Get the path to the project file
    pub fn project_path(&self) -> PathBuf {
        self.project_dir.join("migration.sqlproj")
    }

    /// Write a snapshot as JSON under `snapshots/` and return its path
    pub fn write_snapshot(&self, name: &str, model: &SchemaModel) -> PathBuf {
        let json = serde_json::to_string_pretty(model).expect("Failed to serialize snapshot");
        self.write_file(&format!("snapshots/{}", name), &json)
    }

    pub fn write_operations(&self, name: &str, operations: &[MigrationOperation]) -> PathBuf {
        let json =
            serde_json::to_string_pretty(operations).expect("Failed to serialize operations");
        self.write_file(name, &json)
    }

    pub fn write_project(&self, content: &str) -> PathBuf {
        self.write_file("migration.sqlproj", content)
    }

    pub fn write_file(&self, relative: &str, content: &str) -> PathBuf {
        let path = self.project_dir.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("Failed to create directory");
        }
        fs::write(&path, content).expect("Failed to write file");
        path
    }
}

// ============================================================================
// Model builders
// ============================================================================

pub fn model(tables: Vec<TableElement>) -> SchemaModel {
    let mut model = SchemaModel::new();
    for table in tables {
        model.add_table(table);
    }
    model
}

/// `[Id] int IDENTITY` primary key named `PK_<table>`
pub fn table(schema: Option<&str>, name: &str, columns: Vec<ColumnElement>) -> TableElement {
    let mut table = TableElement::new(schema, name);
    let mut id = ColumnElement::new("Id", "int", false);
    id.identity = Some(IdentitySpec::default());
    table.columns.push(id);
    table.columns.extend(columns);
    table.primary_key = Some(PrimaryKeyElement {
        name: format!("PK_{}", name),
        columns: vec!["Id".to_string()],
        clustered: None,
    });
    table
}

/// Temporal table with `Start`/`End` period columns and the default history table
pub fn temporal_table(
    schema: Option<&str>,
    name: &str,
    columns: Vec<ColumnElement>,
) -> TableElement {
    let mut columns = columns;
    columns.push(ColumnElement::new("End", "datetime2", false));
    columns.push(ColumnElement::new("Start", "datetime2", false));
    let mut table = table(schema, name, columns);
    table.annotations = temporal_annotations("Start", "End");
    table
}

pub fn temporal_annotations(start: &str, end: &str) -> TableAnnotations {
    let mut annotations = TableAnnotations::temporal();
    annotations.set(TableAnnotation::PeriodStartColumn(start.to_string()));
    annotations.set(TableAnnotation::PeriodEndColumn(end.to_string()));
    annotations
}

// ============================================================================
// Compilation helpers
// ============================================================================

pub fn diff_script(old: &SchemaModel, new: &SchemaModel) -> MigrationScript {
    compile(Some(old), Some(new), None, &CompileOptions::default())
        .expect("Failed to compile migration")
}

/// Compile an authored operation list against an empty database
pub fn operations_script(operations: Vec<MigrationOperation>) -> MigrationScript {
    compile(None, None, Some(operations), &CompileOptions::default())
        .expect("Failed to compile migration")
}

/// Batch texts of a script, in order
pub fn batches(script: &MigrationScript) -> Vec<String> {
    script.commands.iter().map(|c| c.sql.clone()).collect()
}
