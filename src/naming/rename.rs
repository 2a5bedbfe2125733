//! Convention names invalidated by renames
//!
//! A convention name embeds the table and column name. When an authored operation list
//! renames either, the constraint keeps its stale name unless it is recomputed. Each
//! affected column gets an `AlterColumn` right after its last rename, which drops the
//! constraint under the old name and adds it back under the new one.

use std::collections::{BTreeMap, HashSet};

use log::debug;

use super::default_constraint::{convention_name, resolve_default_constraint_name, resolve_model};
use super::uniquifier::ConstraintNameRegistry;
use crate::model::{ColumnElement, ObjectName, SchemaModel, TableAnnotations};
use crate::operations::{AlterColumnOperation, MigrationOperation, TableRenames};

/// A column touched by at least one rename in the list
struct RenamedColumn {
    original_table: ObjectName,
    original_column: String,
    final_table: ObjectName,
    final_column: String,
    /// Position of the last rename that touches the column, and the table name it used
    position: usize,
    table_at_position: ObjectName,
    annotations: TableAnnotations,
}

/// Insert the constraint renames that table and column renames in `operations` require.
pub(super) fn rename_convention_constraints(
    operations: Vec<MigrationOperation>,
    registry: &mut ConstraintNameRegistry,
    old_model: Option<&SchemaModel>,
    new_model: Option<&SchemaModel>,
    use_convention: bool,
) -> Vec<MigrationOperation> {
    let renames = TableRenames::new(&operations);
    let resolved_old = old_model.map(resolve_model);
    let columns = renamed_columns(&operations, &renames, old_model, new_model);
    if columns.is_empty() {
        return operations;
    }

    let altered: HashSet<(ObjectName, String)> = operations
        .iter()
        .enumerate()
        .filter_map(|(position, operation)| match operation {
            MigrationOperation::AlterColumn(op) => Some((
                renames.final_name(position, &op.table),
                op.column.name.clone(),
            )),
            _ => None,
        })
        .collect();

    let mut inserts: BTreeMap<usize, Vec<MigrationOperation>> = BTreeMap::new();
    for column in columns {
        if altered.contains(&(column.final_table.clone(), column.final_column.clone())) {
            continue;
        }
        let enabled = column
            .annotations
            .use_named_default_constraints
            .unwrap_or(use_convention);
        if !enabled {
            continue;
        }
        let Some((template, old_name)) =
            current_constraint(&column, old_model, resolved_old.as_ref(), new_model)
        else {
            continue;
        };

        let mut unnamed = template.clone();
        unnamed.name = column.final_column.clone();
        unnamed.default_constraint_name = None;
        let Some(new_name) =
            resolve_default_constraint_name(registry, &column.final_table, &unnamed, true)
        else {
            continue;
        };
        if new_name == old_name {
            continue;
        }
        debug!(
            "Renaming default constraint {} to {} on {}",
            old_name, new_name, column.final_table
        );

        let mut old_column = unnamed.clone();
        old_column.default_constraint_name = Some(old_name);
        let mut new_column = unnamed;
        new_column.default_constraint_name = Some(new_name);
        inserts
            .entry(column.position)
            .or_default()
            .push(MigrationOperation::AlterColumn(AlterColumnOperation {
                table: column.table_at_position,
                column: new_column,
                old_column,
                fill_value: None,
                annotations: column.annotations,
            }));
    }

    let mut result = Vec::with_capacity(operations.len());
    for (position, operation) in operations.into_iter().enumerate() {
        result.push(operation);
        if let Some(extra) = inserts.remove(&position) {
            result.extend(extra);
        }
    }
    result
}

/// Every column whose table or own name changes somewhere in the list, keyed by its
/// original `(table, column)`.
fn renamed_columns(
    operations: &[MigrationOperation],
    renames: &TableRenames,
    old_model: Option<&SchemaModel>,
    new_model: Option<&SchemaModel>,
) -> Vec<RenamedColumn> {
    let mut columns: BTreeMap<(ObjectName, String), RenamedColumn> = BTreeMap::new();

    for (position, operation) in operations.iter().enumerate() {
        match operation {
            MigrationOperation::RenameColumn(op) => {
                let original_table = renames.original(position, &op.table);
                let entry = columns
                    .entry((original_table.clone(), op.name.clone()))
                    .or_insert_with(|| RenamedColumn {
                        original_table,
                        original_column: op.name.clone(),
                        final_table: renames.final_name(position, &op.table),
                        final_column: op.new_name.clone(),
                        position,
                        table_at_position: op.table.clone(),
                        annotations: op.annotations.clone(),
                    });
                entry.final_column = op.new_name.clone();
                entry.position = position;
                entry.table_at_position = op.table.clone();
            }
            MigrationOperation::RenameTable(op) => {
                let original_table = renames.original(position, &op.table);
                let final_table = renames.final_name(position, &op.new_table);
                let names: Vec<String> = match old_model.and_then(|m| m.table(&original_table)) {
                    Some(table) => table.columns.iter().map(|c| c.name.clone()).collect(),
                    None => new_model
                        .and_then(|m| m.table(&final_table))
                        .map(|t| t.columns.iter().map(|c| c.name.clone()).collect())
                        .unwrap_or_default(),
                };
                for name in names {
                    let entry = columns
                        .entry((original_table.clone(), name.clone()))
                        .or_insert_with(|| RenamedColumn {
                            original_table: original_table.clone(),
                            original_column: name.clone(),
                            final_table: final_table.clone(),
                            final_column: name.clone(),
                            position,
                            table_at_position: op.new_table.clone(),
                            annotations: op.annotations.clone(),
                        });
                    if position > entry.position {
                        entry.position = position;
                        entry.table_at_position = op.new_table.clone();
                    }
                }
            }
            _ => {}
        }
    }

    columns
        .into_values()
        .filter(|c| c.original_table != c.final_table || c.original_column != c.final_column)
        .collect()
}

/// The column as it stands before the run and the name of its convention constraint.
///
/// Columns with an explicit name, or without a default, are left alone.
fn current_constraint(
    column: &RenamedColumn,
    old_model: Option<&SchemaModel>,
    resolved_old: Option<&SchemaModel>,
    new_model: Option<&SchemaModel>,
) -> Option<(ColumnElement, String)> {
    let original = old_model
        .and_then(|m| m.table(&column.original_table))
        .and_then(|t| t.column(&column.original_column));
    if let Some(raw) = original {
        if raw.default_constraint_name.is_some() {
            return None;
        }
        let resolved = resolved_old
            .and_then(|m| m.table(&column.original_table))
            .and_then(|t| t.column(&column.original_column))?;
        let name = resolved.default_constraint_name.clone()?;
        return Some((resolved.clone(), name));
    }

    let target = new_model
        .and_then(|m| m.table(&column.final_table))
        .and_then(|t| t.column(&column.final_column))?;
    if target.default_constraint_name.is_some() || !target.accepts_default() {
        return None;
    }
    target.default()?;
    let candidate = convention_name(&column.original_table.name, &column.original_column);
    let name = ConstraintNameRegistry::new().uniquify(&column.original_table, &candidate);
    Some((target.clone(), name))
}
