//! Operation sequencing
//!
//! Turns an authored operation list into the ordered steps the emitter renders:
//!
//! 1. structural validation (configuration errors abort before anything is emitted)
//! 2. a stable sort into legality phases, never moving an operation across a raw `Sql` batch
//! 3. temporal expansion (versioning bracketing, history mirroring, period handling)
//! 4. removal of `EnsureSchema` steps for schemas already known to exist

mod validate;

pub use validate::validate_operations;

use log::debug;

use crate::context::CompileContext;
use crate::error::MigrationError;
use crate::model::{ObjectName, SchemaModel};
use crate::operations::{MigrationOperation, TableRenames};
use crate::temporal;

/// One emittable unit after expansion
#[derive(Debug, Clone, PartialEq)]
pub enum MigrationStep {
    Operation(MigrationOperation),
    DisableVersioning {
        table: ObjectName,
    },
    /// A history table without a schema is bound to the default schema at execution time
    EnableVersioning {
        table: ObjectName,
        history: ObjectName,
    },
    AddPeriod {
        table: ObjectName,
        start: String,
        end: String,
    },
    DropPeriod {
        table: ObjectName,
    },
    HidePeriodColumn {
        table: ObjectName,
        column: String,
    },
}

impl MigrationStep {
    pub fn operation(operation: MigrationOperation) -> Self {
        MigrationStep::Operation(operation)
    }
}

/// Validate, order and expand `operations` into emittable steps.
pub fn sequence(
    operations: Vec<MigrationOperation>,
    context: &mut CompileContext,
    old_model: Option<&SchemaModel>,
) -> Result<Vec<MigrationStep>, MigrationError> {
    validate_operations(&operations)?;
    let operations = sort_operations(retarget_renamed_tables(operations));
    let steps = temporal::expand(operations, old_model)?;
    let steps = drop_known_schemas(steps, context);
    debug!("Sequenced {} steps", steps.len());
    Ok(steps)
}

const RENAME_TABLE_PHASE: u8 = 6;

/// Legality phase of an operation. Lower phases run first.
fn phase(operation: &MigrationOperation) -> u8 {
    match operation {
        MigrationOperation::DropForeignKey(_) => 0,
        MigrationOperation::DropIndex(_) => 1,
        MigrationOperation::DropPrimaryKey(_) => 2,
        MigrationOperation::DropCheckConstraint(_) => 3,
        MigrationOperation::DropTable(_) => 4,
        MigrationOperation::EnsureSchema(_) => 5,
        MigrationOperation::RenameTable(_) => RENAME_TABLE_PHASE,
        MigrationOperation::AlterTable(_) => 7,
        MigrationOperation::DropColumn(_) => 8,
        MigrationOperation::RenameColumn(_) => 9,
        MigrationOperation::RenameIndex(_) => 10,
        MigrationOperation::CreateTable(_) => 11,
        MigrationOperation::AlterColumn(_) => 12,
        MigrationOperation::AddColumn(_) => 13,
        MigrationOperation::AddPrimaryKey(_) => 14,
        MigrationOperation::AddIndex(_) => 15,
        MigrationOperation::AddCheckConstraint(_) => 16,
        MigrationOperation::AddForeignKey(_) => 17,
        MigrationOperation::Sql(_) => u8::MAX,
    }
}

/// Stable sort by phase within each run of operations between raw `Sql` batches.
pub fn sort_operations(operations: Vec<MigrationOperation>) -> Vec<MigrationOperation> {
    let mut sorted = Vec::with_capacity(operations.len());
    let mut segment: Vec<MigrationOperation> = Vec::new();

    for operation in operations {
        if matches!(operation, MigrationOperation::Sql(_)) {
            segment.sort_by_key(phase);
            sorted.append(&mut segment);
            sorted.push(operation);
        } else {
            segment.push(operation);
        }
    }
    segment.sort_by_key(phase);
    sorted.append(&mut segment);
    sorted
}

/// Point operations that the phase sort moves across a table rename at the name the table
/// has when they run.
///
/// Everything after the rename phase runs once every rename of its segment is done, and
/// everything before it runs while the original names still hold.
pub fn retarget_renamed_tables(operations: Vec<MigrationOperation>) -> Vec<MigrationOperation> {
    let mut result = Vec::with_capacity(operations.len());
    let mut segment: Vec<MigrationOperation> = Vec::new();

    for operation in operations {
        if matches!(operation, MigrationOperation::Sql(_)) {
            retarget_segment(&mut segment);
            result.append(&mut segment);
            result.push(operation);
        } else {
            segment.push(operation);
        }
    }
    retarget_segment(&mut segment);
    result.append(&mut segment);
    result
}

fn retarget_segment(segment: &mut [MigrationOperation]) {
    let renames = TableRenames::new(segment);
    if renames.is_empty() {
        return;
    }

    for (position, operation) in segment.iter_mut().enumerate() {
        let Some(table) = operation.table() else {
            continue;
        };
        let target = match phase(operation) {
            p if p > RENAME_TABLE_PHASE => renames.final_name(position, &table),
            p if p < RENAME_TABLE_PHASE => renames.original(position, &table),
            _ => continue,
        };
        if target != table {
            debug!(
                "{} on {} now addresses {} after sorting around a rename",
                operation.kind(),
                table,
                target
            );
            operation.retarget(&target);
        }
    }
}

fn drop_known_schemas(steps: Vec<MigrationStep>, context: &mut CompileContext) -> Vec<MigrationStep> {
    steps
        .into_iter()
        .filter(|step| match step {
            MigrationStep::Operation(MigrationOperation::EnsureSchema(op)) => {
                let fresh = context.mark_schema_known(&op.name);
                if !fresh {
                    debug!("Schema {} already present, skipping EnsureSchema", op.name);
                }
                fresh
            }
            MigrationStep::Operation(MigrationOperation::CreateTable(op)) => {
                if let Some(schema) = &op.table.schema {
                    context.mark_schema_known(schema);
                }
                true
            }
            _ => true,
        })
        .collect()
}
