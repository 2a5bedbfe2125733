//! Operation-by-operation temporal expansion

use std::collections::HashSet;

use log::debug;

use super::tracker::TableTrack;
use super::{changes_history_shape, history_column, period_end_sentinel, period_start_sentinel, TemporalState};
use crate::error::MigrationError;
use crate::model::{ColumnElement, ColumnValue, DefaultValue, ObjectName, SchemaModel, TableAnnotations};
use crate::operations::*;
use crate::sequencer::MigrationStep;
use crate::sql::same_expression;

/// Store type used for period columns the expansion has to add itself
const PERIOD_STORE_TYPE: &str = "datetime2";

pub(super) struct Expander<'a> {
    old_model: Option<&'a SchemaModel>,
    tracks: Vec<TableTrack>,
    /// `(table, column)` pairs some AddColumn operation already creates
    added_columns: HashSet<(ObjectName, String)>,
    /// `(table, column)` pairs some DropColumn operation already removes
    dropped_columns: HashSet<(ObjectName, String)>,
    steps: Vec<MigrationStep>,
}

impl<'a> Expander<'a> {
    pub fn new(
        tracks: Vec<TableTrack>,
        operations: &[MigrationOperation],
        old_model: Option<&'a SchemaModel>,
    ) -> Self {
        let added_columns = operations
            .iter()
            .filter_map(|operation| match operation {
                MigrationOperation::AddColumn(op) => Some((op.table.clone(), op.column.name.clone())),
                _ => None,
            })
            .collect();
        let dropped_columns = operations
            .iter()
            .filter_map(|operation| match operation {
                MigrationOperation::DropColumn(op) => Some((op.table.clone(), op.name.clone())),
                _ => None,
            })
            .collect();
        Self {
            old_model,
            tracks,
            added_columns,
            dropped_columns,
            steps: Vec::new(),
        }
    }

    pub fn push(
        &mut self,
        operation: MigrationOperation,
        track: Option<usize>,
    ) -> Result<(), MigrationError> {
        let Some(id) = track else {
            self.emit(operation);
            return Ok(());
        };

        if self.tracks[id].needs_versioning_off() {
            self.disable_versioning(id);
        }

        match operation {
            MigrationOperation::CreateTable(op) => self.create_table(id, op),
            MigrationOperation::DropTable(op) => self.drop_table(id, op),
            MigrationOperation::RenameTable(op) => self.rename_table(id, op),
            MigrationOperation::AlterTable(op) => self.alter_table(id, op)?,
            MigrationOperation::AddColumn(op) => self.add_column(id, op)?,
            MigrationOperation::DropColumn(op) => self.drop_column(id, op)?,
            MigrationOperation::AlterColumn(op) => self.alter_column(id, op)?,
            MigrationOperation::RenameColumn(op) => self.rename_column(id, op),
            other => self.emit(other),
        }
        Ok(())
    }

    /// Close every open bracket: finish pending temporal conversions, switch versioning
    /// back on and drop released history tables.
    pub fn finish(mut self) -> Vec<MigrationStep> {
        for id in 0..self.tracks.len() {
            let track = self.tracks[id].clone();
            if track.dropped {
                continue;
            }
            let table = track.current.clone();

            if let Some(target) = &track.becoming {
                self.steps.push(MigrationStep::AddPeriod {
                    table: table.clone(),
                    start: target.period_start().to_string(),
                    end: target.period_end().to_string(),
                });
                for column in [target.period_start(), target.period_end()] {
                    self.steps.push(MigrationStep::HidePeriodColumn {
                        table: table.clone(),
                        column: column.to_string(),
                    });
                }
                if let Some(history) = target.history_table(&table) {
                    if let Some(schema) = &history.schema {
                        self.ensure_schema(schema);
                    }
                    debug!("Enabling versioning on {} with history {}", table, history);
                    self.steps
                        .push(MigrationStep::EnableVersioning { table, history });
                }
            } else if track.state == TemporalState::Temporal && track.versioning_off {
                if let Some(history) = track.history.clone() {
                    self.steps
                        .push(MigrationStep::EnableVersioning { table, history });
                }
            }

            for history in track.released_history {
                self.emit(MigrationOperation::DropTable(DropTableOperation {
                    table: history,
                    annotations: TableAnnotations::default(),
                }));
            }
        }
        self.steps
    }

    fn emit(&mut self, operation: MigrationOperation) {
        self.steps.push(MigrationStep::operation(operation));
    }

    fn ensure_schema(&mut self, schema: &str) {
        self.emit(MigrationOperation::EnsureSchema(EnsureSchemaOperation {
            name: schema.to_string(),
        }));
    }

    fn disable_versioning(&mut self, id: usize) {
        let track = &mut self.tracks[id];
        if track.versioning_off {
            return;
        }
        track.versioning_off = true;
        debug!("Disabling versioning on {}", track.current);
        let table = track.current.clone();
        self.steps.push(MigrationStep::DisableVersioning { table });
    }

    /// Rename and/or move a history table, creating its new schema first
    fn move_history(&mut self, id: usize, from: ObjectName, to: ObjectName) {
        debug!("Moving history table {} to {}", from, to);
        if from.schema != to.schema {
            if let Some(schema) = &to.schema {
                self.ensure_schema(schema);
            }
        }
        self.emit(MigrationOperation::RenameTable(RenameTableOperation {
            table: from,
            new_table: to.clone(),
            annotations: TableAnnotations::default(),
        }));
        self.tracks[id].history = Some(to);
    }

    fn create_table(&mut self, id: usize, op: CreateTableOperation) {
        let history = op.table.history_table();
        if let Some(schema) = history.as_ref().and_then(|h| h.schema.clone()) {
            self.ensure_schema(&schema);
        }
        let track = &mut self.tracks[id];
        track.state = TemporalState::of(&op.table.annotations);
        track.annotations = op.table.annotations.clone();
        track.history = history;
        self.emit(MigrationOperation::CreateTable(op));
    }

    fn drop_table(&mut self, id: usize, op: DropTableOperation) {
        let history = match self.tracks[id].state {
            TemporalState::Temporal => self.tracks[id].history.clone(),
            TemporalState::Regular => None,
        };
        if history.is_some() {
            self.disable_versioning(id);
        }
        self.tracks[id].dropped = true;
        self.emit(MigrationOperation::DropTable(op));
        if let Some(history) = history {
            self.emit(MigrationOperation::DropTable(DropTableOperation {
                table: history,
                annotations: TableAnnotations::default(),
            }));
        }
    }

    fn rename_table(&mut self, id: usize, op: RenameTableOperation) {
        let track = &mut self.tracks[id];
        track.current = op.new_table.clone();
        let moved = match (track.state, track.history.clone()) {
            _ if track.releases_history => None,
            (TemporalState::Temporal, Some(from)) => track
                .annotations
                .history_table(&op.new_table)
                .filter(|to| *to != from)
                .map(|to| (from, to)),
            _ => None,
        };
        self.emit(MigrationOperation::RenameTable(op));
        if let Some((from, to)) = moved {
            self.disable_versioning(id);
            self.move_history(id, from, to);
        }
    }

    fn alter_table(&mut self, id: usize, op: AlterTableOperation) -> Result<(), MigrationError> {
        let table = self.tracks[id].current.clone();
        let target = op.annotations.clone();

        match (self.tracks[id].state, TemporalState::of(&target)) {
            (TemporalState::Regular, TemporalState::Temporal) => {
                debug!("Table {} becomes temporal", table);
                self.emit(MigrationOperation::AlterTable(op));
                self.tracks[id].becoming = Some(target.clone());
                self.add_missing_period_columns(id, &target)?;
            }
            (TemporalState::Temporal, TemporalState::Regular) => {
                debug!("Table {} stops being temporal", table);
                self.disable_versioning(id);
                self.steps.push(MigrationStep::DropPeriod {
                    table: table.clone(),
                });
                self.drop_period_columns(id, &table, &target);
                let track = &mut self.tracks[id];
                track.released_history.extend(track.history.take());
                track.state = TemporalState::Regular;
                self.emit(MigrationOperation::AlterTable(op));
            }
            (TemporalState::Temporal, TemporalState::Temporal) => {
                let from = self.tracks[id].history.clone();
                let to = target.history_table(&table);
                self.emit(MigrationOperation::AlterTable(op));
                if let (Some(from), Some(to)) = (from, to) {
                    if from != to {
                        self.disable_versioning(id);
                        self.move_history(id, from, to);
                    }
                }
            }
            (TemporalState::Regular, TemporalState::Regular) => {
                self.emit(MigrationOperation::AlterTable(op));
            }
        }

        self.tracks[id].annotations = target;
        Ok(())
    }

    /// Drop the period columns of a table that stops being temporal, unless some operation
    /// already drops them. Constraint names are looked up at run time.
    fn drop_period_columns(&mut self, id: usize, table: &ObjectName, target: &TableAnnotations) {
        let annotations = &self.tracks[id].annotations;
        let mut columns: Vec<String> = [annotations.period_start(), annotations.period_end()]
            .into_iter()
            .filter(|name| !self.dropped_columns.contains(&(table.clone(), name.to_string())))
            .map(str::to_string)
            .collect();
        columns.sort();

        for name in columns {
            debug!("Dropping period column {} of {}", name, table);
            self.emit(MigrationOperation::DropColumn(DropColumnOperation {
                table: table.clone(),
                name,
                default_constraint_name: None,
                annotations: target.clone(),
            }));
        }
    }

    /// Period columns the old model lacks and no operation adds
    fn add_missing_period_columns(
        &mut self,
        id: usize,
        target: &TableAnnotations,
    ) -> Result<(), MigrationError> {
        let Some(model) = self.old_model else {
            return Ok(());
        };
        let Some(table) = model.table(&self.tracks[id].initial_name) else {
            return Ok(());
        };

        let current = self.tracks[id].current.clone();
        let mut missing: Vec<&str> = [target.period_start(), target.period_end()]
            .into_iter()
            .filter(|name| table.column(name).is_none())
            .filter(|name| !self.added_columns.contains(&(current.clone(), name.to_string())))
            .collect();
        missing.sort();

        let columns: Vec<ColumnElement> = missing
            .into_iter()
            .map(|name| ColumnElement::new(name, PERIOD_STORE_TYPE, false))
            .collect();
        for column in columns {
            self.add_column(
                id,
                AddColumnOperation {
                    table: current.clone(),
                    column,
                    annotations: target.clone(),
                },
            )?;
        }
        Ok(())
    }

    fn add_column(&mut self, id: usize, mut op: AddColumnOperation) -> Result<(), MigrationError> {
        if let Some(target) = &self.tracks[id].becoming {
            if target.is_period_column(&op.column.name) {
                let sentinel = if op.column.name == target.period_start() {
                    period_start_sentinel()?
                } else {
                    period_end_sentinel()?
                };
                op.column.value = Some(ColumnValue::Default(DefaultValue::DateTime(sentinel)));
                op.column.is_nullable = false;
                op.column.default_constraint_name = None;
            }
            self.emit(MigrationOperation::AddColumn(op));
            return Ok(());
        }

        match self.tracks[id].mirror_target() {
            Some(history) => {
                let mirror = AddColumnOperation {
                    table: history,
                    column: history_column(&op.column),
                    annotations: TableAnnotations::default(),
                };
                self.emit(MigrationOperation::AddColumn(op));
                self.emit(MigrationOperation::AddColumn(mirror));
            }
            None => self.emit(MigrationOperation::AddColumn(op)),
        }
        Ok(())
    }

    fn drop_column(&mut self, id: usize, op: DropColumnOperation) -> Result<(), MigrationError> {
        let track = &self.tracks[id];
        let Some(history) = track.mirror_target() else {
            self.emit(MigrationOperation::DropColumn(op));
            return Ok(());
        };
        if track.annotations.is_period_column(&op.name) {
            return Err(MigrationError::unsupported(
                &track.current,
                format!(
                    "period column {} cannot be dropped while the table stays temporal",
                    op.name
                ),
            ));
        }

        let mirror = DropColumnOperation {
            table: history,
            name: op.name.clone(),
            default_constraint_name: None,
            annotations: TableAnnotations::default(),
        };
        self.emit(MigrationOperation::DropColumn(op));
        self.emit(MigrationOperation::DropColumn(mirror));
        Ok(())
    }

    fn alter_column(&mut self, id: usize, op: AlterColumnOperation) -> Result<(), MigrationError> {
        let track = &self.tracks[id];
        let Some(history) = track.mirror_target() else {
            self.emit(MigrationOperation::AlterColumn(op));
            return Ok(());
        };

        if let Some(old_sql) = op.old_column.computed_sql() {
            let unchanged = op
                .column
                .computed_sql()
                .is_some_and(|new_sql| same_expression(old_sql, new_sql));
            if !unchanged {
                return Err(MigrationError::unsupported(
                    &track.current,
                    format!(
                        "the computed expression of column {} cannot change on a temporal table",
                        op.column.name
                    ),
                ));
            }
        }

        let mirror = changes_history_shape(&op.old_column, &op.column).then(|| AlterColumnOperation {
            table: history,
            column: history_column(&op.column),
            old_column: history_column(&op.old_column),
            fill_value: op.fill_value.clone(),
            annotations: TableAnnotations::default(),
        });

        self.emit(MigrationOperation::AlterColumn(op));
        if let Some(mirror) = mirror {
            self.emit(MigrationOperation::AlterColumn(mirror));
        }
        Ok(())
    }

    fn rename_column(&mut self, id: usize, op: RenameColumnOperation) {
        let mirror = self.tracks[id]
            .mirror_target()
            .map(|history| RenameColumnOperation {
                table: history,
                name: op.name.clone(),
                new_name: op.new_name.clone(),
                annotations: TableAnnotations::default(),
            });

        let annotations = &mut self.tracks[id].annotations;
        if annotations.is_temporal {
            if annotations.period_start() == op.name {
                annotations.period_start_column = Some(op.new_name.clone());
            } else if annotations.period_end() == op.name {
                annotations.period_end_column = Some(op.new_name.clone());
            }
        }

        self.emit(MigrationOperation::RenameColumn(op));
        if let Some(mirror) = mirror {
            self.emit(MigrationOperation::RenameColumn(mirror));
        }
    }
}
