//! Model differ: computes the operations that turn one snapshot into another
//!
//! Tables and columns are matched by name, or through their `renamed_from` hint. Both
//! snapshots are run through the naming resolver first, so a default constraint whose
//! convention name changes (table or column renamed, convention toggled) shows up as an
//! ordinary column alteration.

use std::collections::HashSet;

use log::debug;

use super::*;
use crate::model::{ObjectName, SchemaModel, TableElement, DBO_SCHEMA};
use crate::naming;
use crate::sequencer::sort_operations;
use crate::util::eq_ci;

/// Compute the operations that migrate `old` to `new`, in legal execution order.
pub fn diff_models(old: &SchemaModel, new: &SchemaModel) -> Vec<MigrationOperation> {
    let old = naming::resolve_model(old);
    let new = naming::resolve_model(new);

    let mut operations = Vec::new();

    let old_schemas = old.schema_names();
    for schema in new.schema_names() {
        if !old_schemas.contains(&schema) && !eq_ci(&schema, DBO_SCHEMA) {
            operations.push(MigrationOperation::EnsureSchema(EnsureSchemaOperation {
                name: schema,
            }));
        }
    }

    let mut matched_old: HashSet<ObjectName> = HashSet::new();
    for new_table in &new.tables {
        let old_table = new_table
            .renamed_from
            .as_ref()
            .and_then(|from| old.table(from))
            .or_else(|| old.table(&new_table.object_name()))
            .filter(|t| !matched_old.contains(&t.object_name()));

        match old_table {
            Some(old_table) => {
                matched_old.insert(old_table.object_name());
                diff_table(old_table, new_table, &mut operations);
            }
            None => create_table(new_table, &mut operations),
        }
    }

    for old_table in &old.tables {
        if !matched_old.contains(&old_table.object_name()) {
            operations.push(MigrationOperation::DropTable(DropTableOperation {
                table: old_table.object_name(),
                annotations: old_table.annotations.clone(),
            }));
        }
    }

    debug!("Model diff produced {} operations", operations.len());
    sort_operations(operations)
}

fn create_table(table: &TableElement, operations: &mut Vec<MigrationOperation>) {
    let mut created = table.clone();
    created.renamed_from = None;
    created.indexes.clear();
    for column in &mut created.columns {
        column.renamed_from = None;
    }

    // Key columns first in key order, everything else by name
    let key_columns: Vec<String> = table
        .primary_key
        .as_ref()
        .map(|pk| pk.columns.clone())
        .unwrap_or_default();
    created.columns.sort_by(|a, b| {
        let ka = key_columns.iter().position(|k| *k == a.name);
        let kb = key_columns.iter().position(|k| *k == b.name);
        match (ka, kb) {
            (Some(x), Some(y)) => x.cmp(&y),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => a.name.cmp(&b.name),
        }
    });

    let name = table.object_name();
    operations.push(MigrationOperation::CreateTable(CreateTableOperation {
        table: created,
    }));
    for index in &table.indexes {
        operations.push(MigrationOperation::AddIndex(AddIndexOperation {
            table: name.clone(),
            index: index.clone(),
            annotations: table.annotations.clone(),
        }));
    }
}

fn diff_table(old: &TableElement, new: &TableElement, operations: &mut Vec<MigrationOperation>) {
    let old_name = old.object_name();
    let new_name = new.object_name();
    let annotations = &new.annotations;

    if old_name != new_name {
        operations.push(MigrationOperation::RenameTable(RenameTableOperation {
            table: old_name.clone(),
            new_table: new_name.clone(),
            annotations: old.annotations.clone(),
        }));
    }

    if old.annotations.temporal_differs(annotations)
        || old.annotations.data_compression != annotations.data_compression
        || old.comment != new.comment
    {
        operations.push(MigrationOperation::AlterTable(AlterTableOperation {
            table: new_name.clone(),
            old_annotations: old.annotations.clone(),
            annotations: annotations.clone(),
            old_comment: old.comment.clone(),
            comment: new.comment.clone(),
        }));
    }

    if old.primary_key != new.primary_key {
        if let Some(pk) = &old.primary_key {
            operations.push(MigrationOperation::DropPrimaryKey(DropPrimaryKeyOperation {
                table: old_name.clone(),
                name: pk.name.clone(),
                annotations: old.annotations.clone(),
            }));
        }
        if let Some(pk) = &new.primary_key {
            operations.push(MigrationOperation::AddPrimaryKey(AddPrimaryKeyOperation {
                table: new_name.clone(),
                primary_key: pk.clone(),
                annotations: annotations.clone(),
            }));
        }
    }

    diff_columns(old, new, operations);
    diff_indexes(old, new, operations);

    for check in &old.check_constraints {
        if !new.check_constraints.contains(check) {
            operations.push(MigrationOperation::DropCheckConstraint(
                DropCheckConstraintOperation {
                    table: old_name.clone(),
                    name: check.name.clone(),
                    annotations: old.annotations.clone(),
                },
            ));
        }
    }
    for check in &new.check_constraints {
        if !old.check_constraints.contains(check) {
            operations.push(MigrationOperation::AddCheckConstraint(
                AddCheckConstraintOperation {
                    table: new_name.clone(),
                    check: check.clone(),
                    annotations: annotations.clone(),
                },
            ));
        }
    }

    for fk in &old.foreign_keys {
        if !new.foreign_keys.contains(fk) {
            operations.push(MigrationOperation::DropForeignKey(DropForeignKeyOperation {
                table: old_name.clone(),
                name: fk.name.clone(),
                annotations: old.annotations.clone(),
            }));
        }
    }
    for fk in &new.foreign_keys {
        if !old.foreign_keys.contains(fk) {
            operations.push(MigrationOperation::AddForeignKey(AddForeignKeyOperation {
                table: new_name.clone(),
                foreign_key: fk.clone(),
                annotations: annotations.clone(),
            }));
        }
    }
}

fn diff_columns(old: &TableElement, new: &TableElement, operations: &mut Vec<MigrationOperation>) {
    let table = new.object_name();
    let annotations = &new.annotations;

    let mut matched: HashSet<&str> = HashSet::new();
    let mut pairs = Vec::new();
    let mut added = Vec::new();

    for column in &new.columns {
        let previous = column
            .renamed_from
            .as_deref()
            .and_then(|from| old.column(from))
            .or_else(|| old.column(&column.name))
            .filter(|c| !matched.contains(c.name.as_str()));
        match previous {
            Some(previous) => {
                matched.insert(previous.name.as_str());
                pairs.push((previous, column));
            }
            None => added.push(column),
        }
    }

    let mut dropped: Vec<_> = old
        .columns
        .iter()
        .filter(|c| !matched.contains(c.name.as_str()))
        .collect();
    dropped.sort_by(|a, b| a.name.cmp(&b.name));
    for column in dropped {
        operations.push(MigrationOperation::DropColumn(DropColumnOperation {
            table: table.clone(),
            name: column.name.clone(),
            default_constraint_name: column.default_constraint_name.clone(),
            annotations: annotations.clone(),
        }));
    }

    for (previous, column) in &pairs {
        if previous.name != column.name {
            operations.push(MigrationOperation::RenameColumn(RenameColumnOperation {
                table: table.clone(),
                name: previous.name.clone(),
                new_name: column.name.clone(),
                annotations: annotations.clone(),
            }));
        }
    }

    for (previous, column) in &pairs {
        if column_changed(previous, column) {
            let mut old_column = (*previous).clone();
            old_column.name = column.name.clone();
            old_column.renamed_from = None;
            let mut new_column = (*column).clone();
            new_column.renamed_from = None;
            operations.push(MigrationOperation::AlterColumn(AlterColumnOperation {
                table: table.clone(),
                column: new_column,
                old_column,
                fill_value: None,
                annotations: annotations.clone(),
            }));
        }
    }

    added.sort_by(|a, b| a.name.cmp(&b.name));
    for column in added {
        let mut column = column.clone();
        column.renamed_from = None;
        operations.push(MigrationOperation::AddColumn(AddColumnOperation {
            table: table.clone(),
            column,
            annotations: annotations.clone(),
        }));
    }
}

fn column_changed(old: &ColumnElement, new: &ColumnElement) -> bool {
    old.store_type != new.store_type
        || old.is_nullable != new.is_nullable
        || old.value != new.value
        || old.default_constraint_name != new.default_constraint_name
        || old.is_sparse != new.is_sparse
        || old.is_row_version != new.is_row_version
        || old.identity != new.identity
        || old.comment != new.comment
}

fn diff_indexes(old: &TableElement, new: &TableElement, operations: &mut Vec<MigrationOperation>) {
    let old_name = old.object_name();
    let new_name = new.object_name();
    let mut renamed_to: HashSet<&str> = HashSet::new();

    for index in &old.indexes {
        match new.indexes.iter().find(|i| i.name == index.name) {
            Some(current) if current == index => continue,
            Some(_) => {}
            None => {
                let rename_target = new.indexes.iter().find(|i| {
                    i.same_definition(index)
                        && !old.indexes.iter().any(|o| o.name == i.name)
                        && !renamed_to.contains(i.name.as_str())
                });
                if let Some(target) = rename_target {
                    renamed_to.insert(target.name.as_str());
                    operations.push(MigrationOperation::RenameIndex(RenameIndexOperation {
                        table: new_name.clone(),
                        name: index.name.clone(),
                        new_name: target.name.clone(),
                        annotations: new.annotations.clone(),
                    }));
                    continue;
                }
            }
        }
        operations.push(MigrationOperation::DropIndex(DropIndexOperation {
            table: old_name.clone(),
            name: index.name.clone(),
            annotations: old.annotations.clone(),
        }));
    }

    for index in &new.indexes {
        if renamed_to.contains(index.name.as_str()) {
            continue;
        }
        let unchanged = old.indexes.iter().any(|i| i == index);
        if !unchanged {
            operations.push(MigrationOperation::AddIndex(AddIndexOperation {
                table: new_name.clone(),
                index: index.clone(),
                annotations: new.annotations.clone(),
            }));
        }
    }
}
