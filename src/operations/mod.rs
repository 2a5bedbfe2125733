//! Migration operations
//!
//! Each variant carries the table it addresses and a snapshot of that table's annotations,
//! so later passes can tell a temporal table from a regular one without going back to the
//! model. [`AlterTableOperation`] carries both the old and the new snapshot.

mod diff;
mod renames;

pub use diff::diff_models;
pub use renames::TableRenames;

use serde::{Deserialize, Serialize};

use crate::model::{
    CheckConstraintElement, ColumnElement, DefaultValue, ForeignKeyElement, IndexElement,
    ObjectName, PrimaryKeyElement, TableAnnotations, TableElement,
};

/// One engine-neutral schema change
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum MigrationOperation {
    EnsureSchema(EnsureSchemaOperation),
    CreateTable(CreateTableOperation),
    DropTable(DropTableOperation),
    RenameTable(RenameTableOperation),
    AlterTable(AlterTableOperation),
    AddColumn(AddColumnOperation),
    DropColumn(DropColumnOperation),
    AlterColumn(AlterColumnOperation),
    RenameColumn(RenameColumnOperation),
    AddPrimaryKey(AddPrimaryKeyOperation),
    DropPrimaryKey(DropPrimaryKeyOperation),
    AddIndex(AddIndexOperation),
    DropIndex(DropIndexOperation),
    RenameIndex(RenameIndexOperation),
    AddForeignKey(AddForeignKeyOperation),
    DropForeignKey(DropForeignKeyOperation),
    AddCheckConstraint(AddCheckConstraintOperation),
    DropCheckConstraint(DropCheckConstraintOperation),
    Sql(SqlOperation),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnsureSchemaOperation {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateTableOperation {
    pub table: TableElement,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DropTableOperation {
    pub table: ObjectName,
    #[serde(default)]
    pub annotations: TableAnnotations,
}

/// Rename and/or move a table. `annotations` describe the table as it is when renamed;
/// annotation changes made in the same migration arrive as a separate [`AlterTableOperation`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenameTableOperation {
    pub table: ObjectName,
    pub new_table: ObjectName,
    #[serde(default)]
    pub annotations: TableAnnotations,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlterTableOperation {
    pub table: ObjectName,
    #[serde(default)]
    pub old_annotations: TableAnnotations,
    #[serde(default)]
    pub annotations: TableAnnotations,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_comment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddColumnOperation {
    pub table: ObjectName,
    pub column: ColumnElement,
    #[serde(default)]
    pub annotations: TableAnnotations,
}

/// Drop a column. A known `default_constraint_name` is dropped directly; otherwise the
/// constraint is looked up at execution time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DropColumnOperation {
    pub table: ObjectName,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_constraint_name: Option<String>,
    #[serde(default)]
    pub annotations: TableAnnotations,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlterColumnOperation {
    pub table: ObjectName,
    pub column: ColumnElement,
    pub old_column: ColumnElement,
    /// Value written into existing NULLs when the column becomes NOT NULL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill_value: Option<DefaultValue>,
    #[serde(default)]
    pub annotations: TableAnnotations,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenameColumnOperation {
    pub table: ObjectName,
    pub name: String,
    pub new_name: String,
    #[serde(default)]
    pub annotations: TableAnnotations,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddPrimaryKeyOperation {
    pub table: ObjectName,
    pub primary_key: PrimaryKeyElement,
    #[serde(default)]
    pub annotations: TableAnnotations,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DropPrimaryKeyOperation {
    pub table: ObjectName,
    pub name: String,
    #[serde(default)]
    pub annotations: TableAnnotations,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddIndexOperation {
    pub table: ObjectName,
    pub index: IndexElement,
    #[serde(default)]
    pub annotations: TableAnnotations,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DropIndexOperation {
    pub table: ObjectName,
    pub name: String,
    #[serde(default)]
    pub annotations: TableAnnotations,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenameIndexOperation {
    pub table: ObjectName,
    pub name: String,
    pub new_name: String,
    #[serde(default)]
    pub annotations: TableAnnotations,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddForeignKeyOperation {
    pub table: ObjectName,
    pub foreign_key: ForeignKeyElement,
    #[serde(default)]
    pub annotations: TableAnnotations,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DropForeignKeyOperation {
    pub table: ObjectName,
    pub name: String,
    #[serde(default)]
    pub annotations: TableAnnotations,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddCheckConstraintOperation {
    pub table: ObjectName,
    pub check: CheckConstraintElement,
    #[serde(default)]
    pub annotations: TableAnnotations,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DropCheckConstraintOperation {
    pub table: ObjectName,
    pub name: String,
    #[serde(default)]
    pub annotations: TableAnnotations,
}

/// Raw SQL passed through unchanged, split into batches on `GO` lines
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SqlOperation {
    pub sql: String,
    #[serde(default)]
    pub suppress_transaction: bool,
}

impl MigrationOperation {
    /// Short name used in logs and error messages
    pub fn kind(&self) -> &'static str {
        match self {
            MigrationOperation::EnsureSchema(_) => "EnsureSchema",
            MigrationOperation::CreateTable(_) => "CreateTable",
            MigrationOperation::DropTable(_) => "DropTable",
            MigrationOperation::RenameTable(_) => "RenameTable",
            MigrationOperation::AlterTable(_) => "AlterTable",
            MigrationOperation::AddColumn(_) => "AddColumn",
            MigrationOperation::DropColumn(_) => "DropColumn",
            MigrationOperation::AlterColumn(_) => "AlterColumn",
            MigrationOperation::RenameColumn(_) => "RenameColumn",
            MigrationOperation::AddPrimaryKey(_) => "AddPrimaryKey",
            MigrationOperation::DropPrimaryKey(_) => "DropPrimaryKey",
            MigrationOperation::AddIndex(_) => "AddIndex",
            MigrationOperation::DropIndex(_) => "DropIndex",
            MigrationOperation::RenameIndex(_) => "RenameIndex",
            MigrationOperation::AddForeignKey(_) => "AddForeignKey",
            MigrationOperation::DropForeignKey(_) => "DropForeignKey",
            MigrationOperation::AddCheckConstraint(_) => "AddCheckConstraint",
            MigrationOperation::DropCheckConstraint(_) => "DropCheckConstraint",
            MigrationOperation::Sql(_) => "Sql",
        }
    }

    /// The table this operation addresses, by its name at the time the operation runs
    pub fn table(&self) -> Option<ObjectName> {
        match self {
            MigrationOperation::EnsureSchema(_) | MigrationOperation::Sql(_) => None,
            MigrationOperation::CreateTable(op) => Some(op.table.object_name()),
            MigrationOperation::DropTable(op) => Some(op.table.clone()),
            MigrationOperation::RenameTable(op) => Some(op.table.clone()),
            MigrationOperation::AlterTable(op) => Some(op.table.clone()),
            MigrationOperation::AddColumn(op) => Some(op.table.clone()),
            MigrationOperation::DropColumn(op) => Some(op.table.clone()),
            MigrationOperation::AlterColumn(op) => Some(op.table.clone()),
            MigrationOperation::RenameColumn(op) => Some(op.table.clone()),
            MigrationOperation::AddPrimaryKey(op) => Some(op.table.clone()),
            MigrationOperation::DropPrimaryKey(op) => Some(op.table.clone()),
            MigrationOperation::AddIndex(op) => Some(op.table.clone()),
            MigrationOperation::DropIndex(op) => Some(op.table.clone()),
            MigrationOperation::RenameIndex(op) => Some(op.table.clone()),
            MigrationOperation::AddForeignKey(op) => Some(op.table.clone()),
            MigrationOperation::DropForeignKey(op) => Some(op.table.clone()),
            MigrationOperation::AddCheckConstraint(op) => Some(op.table.clone()),
            MigrationOperation::DropCheckConstraint(op) => Some(op.table.clone()),
        }
    }

    /// Point the operation at `table`. `RenameTable` keeps its source name.
    pub fn retarget(&mut self, table: &ObjectName) {
        let slot = match self {
            MigrationOperation::EnsureSchema(_)
            | MigrationOperation::Sql(_)
            | MigrationOperation::RenameTable(_) => return,
            MigrationOperation::CreateTable(op) => {
                op.table.schema = table.schema.clone();
                op.table.name = table.name.clone();
                return;
            }
            MigrationOperation::DropTable(op) => &mut op.table,
            MigrationOperation::AlterTable(op) => &mut op.table,
            MigrationOperation::AddColumn(op) => &mut op.table,
            MigrationOperation::DropColumn(op) => &mut op.table,
            MigrationOperation::AlterColumn(op) => &mut op.table,
            MigrationOperation::RenameColumn(op) => &mut op.table,
            MigrationOperation::AddPrimaryKey(op) => &mut op.table,
            MigrationOperation::DropPrimaryKey(op) => &mut op.table,
            MigrationOperation::AddIndex(op) => &mut op.table,
            MigrationOperation::DropIndex(op) => &mut op.table,
            MigrationOperation::RenameIndex(op) => &mut op.table,
            MigrationOperation::AddForeignKey(op) => &mut op.table,
            MigrationOperation::DropForeignKey(op) => &mut op.table,
            MigrationOperation::AddCheckConstraint(op) => &mut op.table,
            MigrationOperation::DropCheckConstraint(op) => &mut op.table,
        };
        *slot = table.clone();
    }

    /// Annotation snapshot of the table after this operation
    pub fn annotations(&self) -> Option<&TableAnnotations> {
        match self {
            MigrationOperation::EnsureSchema(_) | MigrationOperation::Sql(_) => None,
            MigrationOperation::CreateTable(op) => Some(&op.table.annotations),
            MigrationOperation::DropTable(op) => Some(&op.annotations),
            MigrationOperation::RenameTable(op) => Some(&op.annotations),
            MigrationOperation::AlterTable(op) => Some(&op.annotations),
            MigrationOperation::AddColumn(op) => Some(&op.annotations),
            MigrationOperation::DropColumn(op) => Some(&op.annotations),
            MigrationOperation::AlterColumn(op) => Some(&op.annotations),
            MigrationOperation::RenameColumn(op) => Some(&op.annotations),
            MigrationOperation::AddPrimaryKey(op) => Some(&op.annotations),
            MigrationOperation::DropPrimaryKey(op) => Some(&op.annotations),
            MigrationOperation::AddIndex(op) => Some(&op.annotations),
            MigrationOperation::DropIndex(op) => Some(&op.annotations),
            MigrationOperation::RenameIndex(op) => Some(&op.annotations),
            MigrationOperation::AddForeignKey(op) => Some(&op.annotations),
            MigrationOperation::DropForeignKey(op) => Some(&op.annotations),
            MigrationOperation::AddCheckConstraint(op) => Some(&op.annotations),
            MigrationOperation::DropCheckConstraint(op) => Some(&op.annotations),
        }
    }

    /// Annotation snapshot of the table before this operation
    pub fn old_annotations(&self) -> Option<&TableAnnotations> {
        match self {
            MigrationOperation::AlterTable(op) => Some(&op.old_annotations),
            MigrationOperation::CreateTable(_) => None,
            other => other.annotations(),
        }
    }
}
