//! T-SQL generation
//!
//! [`SqlGenerator`] renders sequenced steps into [`MigrationCommand`] batches; a
//! [`MigrationScript`] joins them into a `GO`-separated script.

mod builder;
mod expression;
mod generator;
pub mod identifier;

pub use builder::CommandBuilder;
pub use expression::same_expression;
pub use generator::SqlGenerator;

use serde::Serialize;
use sha2::{Digest, Sha256};

/// Marker line written above batches that must run outside the migration transaction
pub const NON_TRANSACTIONAL_MARKER: &str = "-- Non-transactional";

/// One batch of T-SQL
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MigrationCommand {
    pub sql: String,
    /// The batch cannot run inside a user transaction (e.g. SYSTEM_VERSIONING toggles)
    pub suppress_transaction: bool,
}

/// The ordered output of one compilation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MigrationScript {
    pub commands: Vec<MigrationCommand>,
}

impl MigrationScript {
    pub fn new(commands: Vec<MigrationCommand>) -> Self {
        Self { commands }
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Render as a script, one `GO`-terminated batch per command
    pub fn to_sql(&self) -> String {
        let mut script = String::new();
        for command in &self.commands {
            if command.suppress_transaction {
                script.push_str(NON_TRANSACTIONAL_MARKER);
                script.push('\n');
            }
            script.push_str(&command.sql);
            script.push_str("\nGO\n\n");
        }
        script
    }

    /// SHA256 of the rendered script, lower-case hex
    pub fn checksum(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.to_sql().as_bytes());
        hex::encode(hasher.finalize())
    }
}
