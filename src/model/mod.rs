//! Schema model: tables, columns, keys and engine annotations

mod annotations;
mod database_model;
mod elements;
mod snapshot;

pub use annotations::{
    DataCompression, TableAnnotation, TableAnnotations, DEFAULT_PERIOD_END, DEFAULT_PERIOD_START,
};
pub(crate) use database_model::validate_table;
pub use database_model::{SchemaModel, DBO_SCHEMA};
pub use elements::*;
pub use snapshot::{load_operations, load_snapshot};
