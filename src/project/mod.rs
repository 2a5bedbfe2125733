//! Migration project file parsing

mod sqlproj_parser;

pub use sqlproj_parser::{parse_project, MigrationProject, SqlServerVersion};
