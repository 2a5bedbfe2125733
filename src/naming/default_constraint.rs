//! Default constraint name resolution
//!
//! A column's default constraint is named, in order of preference, by its explicit name,
//! by the `DF_<table>_<column>` convention when the model opts in, or not at all (the
//! engine then generates a name). Convention names are truncated to the identifier limit
//! and de-duplicated per table against every name already claimed in the same run.

use log::debug;

use super::rename::rename_convention_constraints;
use super::uniquifier::ConstraintNameRegistry;
use crate::model::{ColumnElement, ObjectName, SchemaModel, TableElement};
use crate::operations::MigrationOperation;

/// Candidate name produced by the naming convention. The table schema is not part of it.
pub fn convention_name(table_name: &str, column_name: &str) -> String {
    format!("DF_{}_{}", table_name, column_name)
}

/// Resolve the default constraint name for one column.
///
/// Explicit names are returned verbatim and are expected to be reserved already (see
/// [`reserve_explicit_names`]). Returns `None` when the engine should name the constraint.
pub fn resolve_default_constraint_name(
    registry: &mut ConstraintNameRegistry,
    table: &ObjectName,
    column: &ColumnElement,
    use_convention: bool,
) -> Option<String> {
    if let Some(explicit) = &column.default_constraint_name {
        return Some(explicit.clone());
    }
    if !use_convention || !column.accepts_default() || column.default().is_none() {
        return None;
    }
    let candidate = convention_name(&table.name, &column.name);
    Some(registry.uniquify(table, &candidate))
}

/// Claim every explicit name on the table so convention names route around them
pub fn reserve_explicit_names(registry: &mut ConstraintNameRegistry, table: &TableElement) {
    let name = table.object_name();
    for explicit in table
        .columns
        .iter()
        .filter_map(|c| c.default_constraint_name.as_deref())
    {
        registry.reserve(&name, explicit);
    }
}

/// Fill in convention names for a table, visiting columns in name order
pub fn resolve_table(
    registry: &mut ConstraintNameRegistry,
    table: &mut TableElement,
    use_convention: bool,
) {
    reserve_explicit_names(registry, table);
    let name = table.object_name();

    let mut order: Vec<usize> = (0..table.columns.len()).collect();
    order.sort_by(|&a, &b| table.columns[a].name.cmp(&table.columns[b].name));

    for idx in order {
        let resolved =
            resolve_default_constraint_name(registry, &name, &table.columns[idx], use_convention);
        table.columns[idx].default_constraint_name = resolved;
    }
}

/// Copy of `model` in which every column carries the constraint name the database will have
pub fn resolve_model(model: &SchemaModel) -> SchemaModel {
    let mut registry = ConstraintNameRegistry::new();
    let mut resolved = model.clone();
    for table in &mut resolved.tables {
        let use_convention = model.uses_named_default_constraints(table);
        resolve_table(&mut registry, table, use_convention);
    }
    resolved
}

/// Attach resolved names to every column an operation creates or redefines.
///
/// Explicit names found anywhere in the list (and in `new_model`, when given) are reserved
/// first, so a convention name never takes a name the user chose. Renamed tables and
/// columns whose convention name changes get an `AlterColumn` that renames the constraint;
/// `old_model` supplies the names those constraints have today.
pub fn annotate_operations(
    mut operations: Vec<MigrationOperation>,
    registry: &mut ConstraintNameRegistry,
    old_model: Option<&SchemaModel>,
    new_model: Option<&SchemaModel>,
    use_convention: bool,
) -> Vec<MigrationOperation> {
    if let Some(model) = new_model {
        for table in &model.tables {
            reserve_explicit_names(registry, table);
        }
    }

    for operation in operations.iter() {
        match operation {
            MigrationOperation::CreateTable(op) => reserve_explicit_names(registry, &op.table),
            MigrationOperation::AddColumn(op) => reserve_column(registry, &op.table, &op.column),
            MigrationOperation::AlterColumn(op) => {
                reserve_column(registry, &op.table, &op.column)
            }
            _ => {}
        }
    }

    for operation in operations.iter_mut() {
        let enabled = operation
            .annotations()
            .and_then(|a| a.use_named_default_constraints)
            .unwrap_or(use_convention);
        match operation {
            MigrationOperation::CreateTable(op) => resolve_table(registry, &mut op.table, enabled),
            MigrationOperation::AddColumn(op) => {
                op.column.default_constraint_name =
                    resolve_default_constraint_name(registry, &op.table, &op.column, enabled);
            }
            MigrationOperation::AlterColumn(op) => {
                op.column.default_constraint_name =
                    resolve_default_constraint_name(registry, &op.table, &op.column, enabled);
            }
            _ => continue,
        }
        debug!("Resolved default constraint names for {}", operation.kind());
    }

    rename_convention_constraints(operations, registry, old_model, new_model, use_convention)
}

fn reserve_column(registry: &mut ConstraintNameRegistry, table: &ObjectName, column: &ColumnElement) {
    if let Some(name) = &column.default_constraint_name {
        registry.reserve(table, name);
    }
}
