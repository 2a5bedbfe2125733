//! Per-table bookkeeping for temporal expansion
//!
//! A track follows one table through the run, across renames. The analysis pass decides
//! each track's starting state and whether versioning has to be switched off for it.

use std::collections::{HashMap, HashSet};

use super::{changes_history_shape, TemporalState};
use crate::model::{ObjectName, TableAnnotations};
use crate::operations::MigrationOperation;

#[derive(Debug, Clone)]
pub(super) struct TableTrack {
    /// Name the table has at this point of the run
    pub current: ObjectName,
    /// Name the table had before the run
    pub initial_name: ObjectName,
    pub annotations: TableAnnotations,
    pub state: TemporalState,
    pub history: Option<ObjectName>,
    pub created: bool,
    pub structural: bool,
    pub versioning_off: bool,
    /// Target annotations of a regular table being turned into a temporal one
    pub becoming: Option<TableAnnotations>,
    /// History tables left behind by a temporal table turned regular
    pub released_history: Vec<ObjectName>,
    /// Some operation turns the table regular, so its history table is dropped
    pub releases_history: bool,
    pub dropped: bool,
}

impl TableTrack {
    fn new(name: ObjectName, annotations: TableAnnotations, created: bool) -> Self {
        let mut track = Self {
            current: name.clone(),
            initial_name: name,
            annotations: TableAnnotations::default(),
            state: TemporalState::Regular,
            history: None,
            created,
            structural: false,
            versioning_off: false,
            becoming: None,
            released_history: Vec::new(),
            releases_history: false,
            dropped: false,
        };
        if !created {
            track.reset_initial(annotations);
        }
        track
    }

    fn reset_initial(&mut self, annotations: TableAnnotations) {
        self.state = TemporalState::of(&annotations);
        self.history = annotations.history_table(&self.initial_name);
        self.annotations = annotations;
    }

    /// Versioning must be off for the whole run on this table
    pub fn needs_versioning_off(&self) -> bool {
        self.state == TemporalState::Temporal && !self.created && self.structural
    }

    /// History table to repeat column changes on, while versioning is off
    pub fn mirror_target(&self) -> Option<ObjectName> {
        if self.state == TemporalState::Temporal && self.versioning_off {
            self.history.clone()
        } else {
            None
        }
    }
}

fn is_structural(operation: &MigrationOperation) -> bool {
    match operation {
        MigrationOperation::RenameTable(_)
        | MigrationOperation::DropTable(_)
        | MigrationOperation::AddColumn(_)
        | MigrationOperation::DropColumn(_)
        | MigrationOperation::RenameColumn(_) => true,
        MigrationOperation::AlterColumn(op) => changes_history_shape(&op.old_column, &op.column),
        MigrationOperation::AlterTable(op) => op.old_annotations.temporal_differs(&op.annotations),
        _ => false,
    }
}

/// Assign every operation to a table track.
///
/// Returns the tracks in first-seen order and, per operation, the index of its track
/// (`None` for operations that address no table).
pub(super) fn analyze(operations: &[MigrationOperation]) -> (Vec<TableTrack>, Vec<Option<usize>>) {
    let mut tracks: Vec<TableTrack> = Vec::new();
    let mut by_name: HashMap<ObjectName, usize> = HashMap::new();
    let mut altered: HashSet<usize> = HashSet::new();
    let mut assignments = Vec::with_capacity(operations.len());

    for operation in operations {
        let Some(table) = operation.table() else {
            assignments.push(None);
            continue;
        };

        let id = match by_name.get(&table) {
            Some(&id) => id,
            None => {
                let created = matches!(operation, MigrationOperation::CreateTable(_));
                let annotations = operation.old_annotations().cloned().unwrap_or_default();
                tracks.push(TableTrack::new(table.clone(), annotations, created));
                by_name.insert(table.clone(), tracks.len() - 1);
                tracks.len() - 1
            }
        };

        let track = &mut tracks[id];
        if let MigrationOperation::AlterTable(op) = operation {
            if altered.insert(id) && !track.created {
                track.reset_initial(op.old_annotations.clone());
            }
            track.releases_history |= op.old_annotations.is_temporal && !op.annotations.is_temporal;
        }
        track.structural |= is_structural(operation);

        match operation {
            MigrationOperation::RenameTable(op) => {
                by_name.remove(&op.table);
                by_name.insert(op.new_table.clone(), id);
            }
            MigrationOperation::DropTable(op) => {
                by_name.remove(&op.table);
            }
            _ => {}
        }
        assignments.push(Some(id));
    }

    (tracks, assignments)
}
