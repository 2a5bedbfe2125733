//! Error types for rust-sqlmigrate

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while compiling a migration
#[derive(Error, Debug)]
pub enum MigrationError {
    #[error("Failed to read project file: {path}")]
    ProjectReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse project file: {path}")]
    ProjectParseError {
        path: PathBuf,
        #[source]
        source: roxmltree::Error,
    },

    #[error("Invalid project file format: {message}")]
    InvalidProjectFormat { message: String },

    #[error("Failed to read snapshot file: {path}")]
    SnapshotReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse snapshot file: {path}")]
    SnapshotParseError {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid schema model: {message}")]
    InvalidModel { message: String },

    #[error("Unsupported migration operation on {table}: {message}")]
    UnsupportedOperation { table: String, message: String },

    #[error("Failed to write migration script to {path}")]
    ScriptWriteError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl MigrationError {
    pub(crate) fn invalid_model(message: impl Into<String>) -> Self {
        MigrationError::InvalidModel {
            message: message.into(),
        }
    }

    pub(crate) fn unsupported(table: impl ToString, message: impl Into<String>) -> Self {
        MigrationError::UnsupportedOperation {
            table: table.to_string(),
            message: message.into(),
        }
    }
}
