//! Schema model representation

use std::collections::{BTreeSet, HashSet};

use serde::{Deserialize, Serialize};

use super::{ObjectName, TableElement};
use crate::error::MigrationError;

/// Schema that always exists on the target engine
pub const DBO_SCHEMA: &str = "dbo";

/// One snapshot of the database schema
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SchemaModel {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_schema: Option<String>,
    /// Model-level opt-in for `DF_<table>_<column>` default constraint names
    #[serde(default)]
    pub use_named_default_constraints: bool,
    /// Schemas declared explicitly, in addition to those implied by tables
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub schemas: Vec<String>,
    #[serde(default)]
    pub tables: Vec<TableElement>,
}

impl SchemaModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_table(&mut self, table: TableElement) {
        self.tables.push(table);
    }

    pub fn table(&self, name: &ObjectName) -> Option<&TableElement> {
        self.tables
            .iter()
            .find(|t| t.name == name.name && t.schema == name.schema)
    }

    /// Effective naming convention flag for a table
    pub fn uses_named_default_constraints(&self, table: &TableElement) -> bool {
        table
            .annotations
            .use_named_default_constraints
            .unwrap_or(self.use_named_default_constraints)
    }

    /// Every schema this model places an object in, including history tables
    pub fn schema_names(&self) -> BTreeSet<String> {
        let mut schemas: BTreeSet<String> = self.schemas.iter().cloned().collect();
        for table in &self.tables {
            if let Some(schema) = &table.schema {
                schemas.insert(schema.clone());
            }
            if let Some(schema) = table.history_table().and_then(|h| h.schema) {
                schemas.insert(schema);
            }
        }
        schemas
    }

    /// Check structural invariants: unique names, coherent annotations, one value source per column
    pub fn validate(&self) -> Result<(), MigrationError> {
        let mut table_names = HashSet::new();
        for table in &self.tables {
            let name = table.object_name();
            if !table_names.insert(name.clone()) {
                return Err(MigrationError::invalid_model(format!(
                    "table {} is defined more than once",
                    name
                )));
            }
            validate_table(table)?;
        }
        Ok(())
    }
}

pub(crate) fn validate_table(table: &TableElement) -> Result<(), MigrationError> {
    let name = table.object_name();

    let mut column_names = HashSet::new();
    for column in &table.columns {
        if !column_names.insert(column.name.as_str()) {
            return Err(MigrationError::invalid_model(format!(
                "column {} is defined more than once on table {}",
                column.name, name
            )));
        }
        if column.is_computed() && column.default_constraint_name.is_some() {
            return Err(MigrationError::invalid_model(format!(
                "computed column {}.{} cannot have a default constraint",
                name, column.name
            )));
        }
    }

    table
        .annotations
        .validate(&name)
        .map_err(MigrationError::invalid_model)?;

    if table.annotations.is_temporal {
        for period in [
            table.annotations.period_start(),
            table.annotations.period_end(),
        ] {
            match table.column(period) {
                Some(column) if !column.is_nullable => {}
                Some(_) => {
                    return Err(MigrationError::invalid_model(format!(
                        "period column {}.{} must not be nullable",
                        name, period
                    )))
                }
                None => {
                    return Err(MigrationError::invalid_model(format!(
                        "temporal table {} has no period column {}",
                        name, period
                    )))
                }
            }
        }
    }

    let key_columns = table
        .primary_key
        .iter()
        .flat_map(|pk| pk.columns.iter())
        .chain(table.indexes.iter().flat_map(|i| i.columns.iter()))
        .chain(table.foreign_keys.iter().flat_map(|fk| fk.columns.iter()));
    for column in key_columns {
        if !column_names.contains(column.as_str()) {
            return Err(MigrationError::invalid_model(format!(
                "table {} references unknown column {}",
                name, column
            )));
        }
    }

    Ok(())
}
