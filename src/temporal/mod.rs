//! System-versioned (temporal) table handling
//!
//! A table is either [`TemporalState::Regular`] or [`TemporalState::Temporal`]. Every
//! operation that touches a temporal table is expanded here into the steps SQL Server needs:
//! versioning is switched off before the first change and back on after the last one,
//! column changes are repeated on the history table, and history tables follow their
//! primary table through renames and schema moves.

mod expander;
mod tracker;

use chrono::{NaiveDate, NaiveDateTime};
use log::debug;

use crate::error::MigrationError;
use crate::model::{ColumnElement, SchemaModel, TableAnnotations};
use crate::operations::MigrationOperation;
use crate::sequencer::MigrationStep;
use crate::sql::same_expression;

use expander::Expander;

/// Store type a rowversion column gets on the history table
const ROW_VERSION_HISTORY_TYPE: &str = "binary(8)";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemporalState {
    Regular,
    Temporal,
}

impl TemporalState {
    pub fn of(annotations: &TableAnnotations) -> Self {
        if annotations.is_temporal {
            TemporalState::Temporal
        } else {
            TemporalState::Regular
        }
    }
}

/// Expand sorted operations into steps, adding the versioning and history-table work.
pub(crate) fn expand(
    operations: Vec<MigrationOperation>,
    old_model: Option<&SchemaModel>,
) -> Result<Vec<MigrationStep>, MigrationError> {
    let (tracks, assignments) = tracker::analyze(&operations);
    let mut expander = Expander::new(tracks, &operations, old_model);
    for (operation, track) in operations.into_iter().zip(assignments) {
        expander.push(operation, track)?;
    }
    let steps = expander.finish();
    debug!("Temporal expansion produced {} steps", steps.len());
    Ok(steps)
}

/// The plain column a history table keeps for `column`.
///
/// History tables never compute values or generate them; they carry the type, nullability
/// and sparse flag of the primary column, plus its default so existing history rows can be
/// filled when a NOT NULL column is added.
pub fn history_column(column: &ColumnElement) -> ColumnElement {
    let store_type = if column.is_row_version {
        ROW_VERSION_HISTORY_TYPE
    } else {
        column.store_type.as_str()
    };
    let mut mirror = ColumnElement::new(&column.name, store_type, column.is_nullable);
    mirror.is_sparse = column.is_sparse;
    mirror.value = column.default().cloned();
    mirror
}

/// Whether changing `old` into `new` has to be repeated on the history table.
///
/// Defaults and constraint names stay on the primary table; only the stored shape and the
/// computation count.
pub(crate) fn changes_history_shape(old: &ColumnElement, new: &ColumnElement) -> bool {
    let computation_changed = match (old.computed_sql(), new.computed_sql()) {
        (Some(a), Some(b)) => !same_expression(a, b),
        (None, None) => false,
        _ => true,
    };
    computation_changed || shape(old) != shape(new)
}

fn shape(column: &ColumnElement) -> ColumnElement {
    let mut mirror = history_column(column);
    mirror.value = None;
    mirror
}

/// Value written into existing rows for a newly added period start column
pub fn period_start_sentinel() -> Result<NaiveDateTime, MigrationError> {
    sentinel(1, 1, 1, 0, 0, 0, 0)
}

/// Value written into existing rows for a newly added period end column
pub fn period_end_sentinel() -> Result<NaiveDateTime, MigrationError> {
    sentinel(9999, 12, 31, 23, 59, 59, 999_999_900)
}

fn sentinel(
    year: i32,
    month: u32,
    day: u32,
    hour: u32,
    minute: u32,
    second: u32,
    nano: u32,
) -> Result<NaiveDateTime, MigrationError> {
    NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|date| date.and_hms_nano_opt(hour, minute, second, nano))
        .ok_or_else(|| MigrationError::invalid_model("period sentinel is out of range"))
}
