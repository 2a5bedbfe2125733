//! Table renames inside an operation list
//!
//! An authored list refers to a table by whatever name it has at that point of the list.
//! [`TableRenames`] translates such a reference to the name the table had before the list
//! ran, or to the name it has once every rename has run.

use super::MigrationOperation;
use crate::model::ObjectName;

#[derive(Debug, Default)]
pub struct TableRenames {
    /// `(position, from, to)` in list order
    renames: Vec<(usize, ObjectName, ObjectName)>,
}

impl TableRenames {
    pub fn new(operations: &[MigrationOperation]) -> Self {
        let renames = operations
            .iter()
            .enumerate()
            .filter_map(|(position, operation)| match operation {
                MigrationOperation::RenameTable(op) => {
                    Some((position, op.table.clone(), op.new_table.clone()))
                }
                _ => None,
            })
            .collect();
        Self { renames }
    }

    pub fn is_empty(&self) -> bool {
        self.renames.is_empty()
    }

    /// Name before the list ran, for a reference made at `position`
    pub fn original(&self, position: usize, name: &ObjectName) -> ObjectName {
        let mut name = name.clone();
        for (_, from, to) in self.renames.iter().rev().filter(|(p, ..)| *p < position) {
            if name == *to {
                name = from.clone();
            }
        }
        name
    }

    /// Name after the whole list ran, for a reference made at `position`
    pub fn final_name(&self, position: usize, name: &ObjectName) -> ObjectName {
        let mut name = name.clone();
        for (_, from, to) in self.renames.iter().filter(|(p, ..)| *p > position) {
            if name == *from {
                name = to.clone();
            }
        }
        name
    }
}
