//! Engine-specific table annotations
//!
//! Annotations arrive as a list of tagged values (the on-disk form) and are folded into
//! [`TableAnnotations`], which exposes each known kind as a typed field. Unknown kinds fail
//! to deserialize, so an unsupported annotation is caught when the snapshot is loaded.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::ObjectName;

/// Period column names used when a temporal table does not name its own.
pub const DEFAULT_PERIOD_START: &str = "PeriodStart";
pub const DEFAULT_PERIOD_END: &str = "PeriodEnd";

/// One SQL Server table annotation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum TableAnnotation {
    IsTemporal(bool),
    HistoryTableName(String),
    HistoryTableSchema(String),
    PeriodStartColumn(String),
    PeriodEndColumn(String),
    UseNamedDefaultConstraints(bool),
    DataCompression(DataCompression),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataCompression {
    None,
    Row,
    Page,
}

impl fmt::Display for DataCompression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataCompression::None => write!(f, "NONE"),
            DataCompression::Row => write!(f, "ROW"),
            DataCompression::Page => write!(f, "PAGE"),
        }
    }
}

/// Typed view over a table's annotations
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<TableAnnotation>", into = "Vec<TableAnnotation>")]
pub struct TableAnnotations {
    pub is_temporal: bool,
    pub history_table_name: Option<String>,
    pub history_table_schema: Option<String>,
    pub period_start_column: Option<String>,
    pub period_end_column: Option<String>,
    /// Per-table override of the model-level naming convention flag
    pub use_named_default_constraints: Option<bool>,
    pub data_compression: Option<DataCompression>,
}

impl TableAnnotations {
    pub fn temporal() -> Self {
        Self {
            is_temporal: true,
            ..Self::default()
        }
    }

    /// Apply one annotation; a later annotation of the same kind replaces an earlier one.
    pub fn set(&mut self, annotation: TableAnnotation) {
        match annotation {
            TableAnnotation::IsTemporal(v) => self.is_temporal = v,
            TableAnnotation::HistoryTableName(v) => self.history_table_name = Some(v),
            TableAnnotation::HistoryTableSchema(v) => self.history_table_schema = Some(v),
            TableAnnotation::PeriodStartColumn(v) => self.period_start_column = Some(v),
            TableAnnotation::PeriodEndColumn(v) => self.period_end_column = Some(v),
            TableAnnotation::UseNamedDefaultConstraints(v) => {
                self.use_named_default_constraints = Some(v)
            }
            TableAnnotation::DataCompression(v) => self.data_compression = Some(v),
        }
    }

    pub fn period_start(&self) -> &str {
        self.period_start_column
            .as_deref()
            .unwrap_or(DEFAULT_PERIOD_START)
    }

    pub fn period_end(&self) -> &str {
        self.period_end_column.as_deref().unwrap_or(DEFAULT_PERIOD_END)
    }

    pub fn is_period_column(&self, column: &str) -> bool {
        self.is_temporal && (column == self.period_start() || column == self.period_end())
    }

    /// Resolve the history table for `table`.
    ///
    /// Defaults to `<table>History` in the table's own schema when the annotations do not
    /// name one. Returns `None` for non-temporal tables.
    pub fn history_table(&self, table: &ObjectName) -> Option<ObjectName> {
        if !self.is_temporal {
            return None;
        }
        let name = self
            .history_table_name
            .clone()
            .unwrap_or_else(|| format!("{}History", table.name));
        let schema = self
            .history_table_schema
            .clone()
            .or_else(|| table.schema.clone());
        Some(ObjectName { schema, name })
    }

    /// Whether the temporal configuration (not comments or naming flags) differs
    pub fn temporal_differs(&self, other: &TableAnnotations) -> bool {
        self.is_temporal != other.is_temporal
            || self.history_table_name != other.history_table_name
            || self.history_table_schema != other.history_table_schema
            || self.period_start() != other.period_start()
            || self.period_end() != other.period_end()
    }

    /// Non-temporal tables must not carry temporal-only annotations
    pub fn validate(&self, table: &ObjectName) -> Result<(), String> {
        if self.is_temporal {
            if self.period_start() == self.period_end() {
                return Err(format!(
                    "table {} uses '{}' as both period start and period end",
                    table,
                    self.period_start()
                ));
            }
            return Ok(());
        }
        let stray = [
            ("history table name", self.history_table_name.is_some()),
            ("history table schema", self.history_table_schema.is_some()),
            ("period start column", self.period_start_column.is_some()),
            ("period end column", self.period_end_column.is_some()),
        ];
        match stray.iter().find(|(_, present)| *present) {
            Some((kind, _)) => Err(format!(
                "table {} has a {} annotation but is not temporal",
                table, kind
            )),
            None => Ok(()),
        }
    }
}

impl From<Vec<TableAnnotation>> for TableAnnotations {
    fn from(list: Vec<TableAnnotation>) -> Self {
        let mut annotations = TableAnnotations::default();
        for annotation in list {
            annotations.set(annotation);
        }
        annotations
    }
}

impl From<TableAnnotations> for Vec<TableAnnotation> {
    fn from(a: TableAnnotations) -> Self {
        let mut list = Vec::new();
        if a.is_temporal {
            list.push(TableAnnotation::IsTemporal(true));
        }
        if let Some(v) = a.history_table_name {
            list.push(TableAnnotation::HistoryTableName(v));
        }
        if let Some(v) = a.history_table_schema {
            list.push(TableAnnotation::HistoryTableSchema(v));
        }
        if let Some(v) = a.period_start_column {
            list.push(TableAnnotation::PeriodStartColumn(v));
        }
        if let Some(v) = a.period_end_column {
            list.push(TableAnnotation::PeriodEndColumn(v));
        }
        if let Some(v) = a.use_named_default_constraints {
            list.push(TableAnnotation::UseNamedDefaultConstraints(v));
        }
        if let Some(v) = a.data_compression {
            list.push(TableAnnotation::DataCompression(v));
        }
        list
    }
}
