//! Structural checks run before any operation is sequenced

use crate::error::MigrationError;
use crate::model::{validate_table, ColumnValue};
use crate::operations::{AlterColumnOperation, MigrationOperation};
use crate::sql::identifier::type_default_literal;

/// Reject operation lists the emitter cannot express. Nothing is emitted when this fails.
pub fn validate_operations(operations: &[MigrationOperation]) -> Result<(), MigrationError> {
    for operation in operations {
        match operation {
            MigrationOperation::CreateTable(op) => validate_table(&op.table)?,
            MigrationOperation::AlterTable(op) => op
                .annotations
                .validate(&op.table)
                .map_err(MigrationError::invalid_model)?,
            MigrationOperation::AlterColumn(op) => validate_alter_column(op)?,
            MigrationOperation::AddColumn(op) => {
                if op.column.is_computed() && op.column.default_constraint_name.is_some() {
                    return Err(MigrationError::invalid_model(format!(
                        "computed column {}.{} cannot have a default constraint",
                        op.table, op.column.name
                    )));
                }
            }
            _ => {}
        }
    }
    Ok(())
}

fn validate_alter_column(op: &AlterColumnOperation) -> Result<(), MigrationError> {
    let (old, new) = (&op.old_column, &op.column);

    if old.is_identity() != new.is_identity() {
        return Err(MigrationError::unsupported(
            &op.table,
            format!(
                "column {} cannot gain or lose IDENTITY in place; rebuild the table instead",
                new.name
            ),
        ));
    }

    let narrowed = old.is_nullable && !new.is_nullable && !new.is_computed();
    if narrowed {
        let has_fill = matches!(
            new.value,
            Some(ColumnValue::Default(_)) | Some(ColumnValue::DefaultSql(_))
        ) || op.fill_value.is_some()
            || type_default_literal(&new.store_type).is_some();
        if !has_fill {
            return Err(MigrationError::unsupported(
                &op.table,
                format!(
                    "column {} becomes NOT NULL but no fill value is known for type {}",
                    new.name, new.store_type
                ),
            ));
        }
    }

    Ok(())
}
