//! Default constraint naming

mod default_constraint;
mod rename;
mod uniquifier;

pub use default_constraint::{
    annotate_operations, convention_name, reserve_explicit_names, resolve_default_constraint_name,
    resolve_model, resolve_table,
};
pub use uniquifier::{truncate, ConstraintNameRegistry, MAX_IDENTIFIER_LENGTH};
