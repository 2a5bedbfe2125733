//! Per-compilation mutable state
//!
//! Everything here lives for exactly one call to [`crate::compile`]. Concurrent
//! compilations each get their own context.

use std::collections::BTreeSet;

use crate::model::{SchemaModel, DBO_SCHEMA};
use crate::naming::ConstraintNameRegistry;
use crate::util::eq_ci;

#[derive(Debug)]
pub struct CompileContext {
    /// Default constraint names claimed so far, per table
    pub constraint_names: ConstraintNameRegistry,
    known_schemas: BTreeSet<String>,
    variable_count: usize,
}

impl Default for CompileContext {
    fn default() -> Self {
        Self::new()
    }
}

impl CompileContext {
    pub fn new() -> Self {
        let mut known_schemas = BTreeSet::new();
        known_schemas.insert(DBO_SCHEMA.to_string());
        Self {
            constraint_names: ConstraintNameRegistry::new(),
            known_schemas,
            variable_count: 0,
        }
    }

    /// Treat every schema the old model uses as already present
    pub fn seed_schemas(&mut self, model: &SchemaModel) {
        self.known_schemas.extend(model.schema_names());
    }

    pub fn is_known_schema(&self, schema: &str) -> bool {
        self.known_schemas.iter().any(|s| eq_ci(s, schema))
    }

    /// Record a schema as present. Returns false if it was already known.
    pub fn mark_schema_known(&mut self, schema: &str) -> bool {
        if self.is_known_schema(schema) {
            return false;
        }
        self.known_schemas.insert(schema.to_string())
    }

    /// Next T-SQL variable name: `@var`, `@var1`, `@var2`, ...
    pub fn next_variable(&mut self) -> String {
        let n = self.variable_count;
        self.variable_count += 1;
        if n == 0 {
            "@var".to_string()
        } else {
            format!("@var{}", n)
        }
    }
}
