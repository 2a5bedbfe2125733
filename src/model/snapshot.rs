//! JSON snapshot loading

use std::path::Path;

use serde::de::DeserializeOwned;

use super::SchemaModel;
use crate::error::MigrationError;
use crate::operations::MigrationOperation;

/// Load and validate a schema snapshot
pub fn load_snapshot(path: &Path) -> Result<SchemaModel, MigrationError> {
    let model: SchemaModel = read_json(path)?;
    model.validate()?;
    Ok(model)
}

/// Load a pre-diffed operation list
pub fn load_operations(path: &Path) -> Result<Vec<MigrationOperation>, MigrationError> {
    read_json(path)
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, MigrationError> {
    let content =
        std::fs::read_to_string(path).map_err(|e| MigrationError::SnapshotReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

    serde_json::from_str(&content).map_err(|e| MigrationError::SnapshotParseError {
        path: path.to_path_buf(),
        source: e,
    })
}
