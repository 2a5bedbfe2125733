//! Identifier truncation and collision suffixes

use std::collections::{HashMap, HashSet};

use crate::model::ObjectName;

/// Maximum identifier length on SQL Server
pub const MAX_IDENTIFIER_LENGTH: usize = 128;

/// Marker spliced in where an identifier was cut short
const TRUNCATION_MARKER: char = '~';

/// Truncate `identifier` so that it, plus the optional numeric `uniquifier`, fits in
/// `max_length` characters.
///
/// An identifier that fits is returned unchanged. One that does not keeps its first
/// `max_length - digits - 1` characters followed by `~`, then the uniquifier.
///
/// ```ignore
/// assert_eq!(truncate("DF_Entity_Number", 128, None), "DF_Entity_Number");
/// assert_eq!(truncate("DF_Entity_Number", 128, Some(2)), "DF_Entity_Number2");
/// assert_eq!(truncate("abcdef", 5, None), "abcd~");
/// assert_eq!(truncate("abcdef", 5, Some(1)), "abc~1");
/// ```
pub fn truncate(identifier: &str, max_length: usize, uniquifier: Option<u32>) -> String {
    let suffix = uniquifier.map(|u| u.to_string()).unwrap_or_default();
    let max_name_length = max_length.saturating_sub(suffix.chars().count());

    let mut result: String = if identifier.chars().count() > max_name_length {
        let mut cut: String = identifier
            .chars()
            .take(max_name_length.saturating_sub(1))
            .collect();
        cut.push(TRUNCATION_MARKER);
        cut
    } else {
        identifier.to_string()
    };
    result.push_str(&suffix);
    result
}

/// Per-run record of default constraint names already in use, keyed by table.
///
/// One registry lives for one compilation; it is never shared between runs.
#[derive(Debug, Default)]
pub struct ConstraintNameRegistry {
    taken: HashMap<ObjectName, HashSet<String>>,
}

impl ConstraintNameRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a name as used on `table`. Returns false if it was already taken.
    pub fn reserve(&mut self, table: &ObjectName, name: &str) -> bool {
        self.taken
            .entry(table.clone())
            .or_default()
            .insert(name.to_string())
    }

    pub fn is_taken(&self, table: &ObjectName, name: &str) -> bool {
        self.taken
            .get(table)
            .is_some_and(|names| names.contains(name))
    }

    /// Claim the first free variant of `candidate` on `table`: `name`, `name1`, `name2`, ...
    /// Every variant is truncated to [`MAX_IDENTIFIER_LENGTH`].
    pub fn uniquify(&mut self, table: &ObjectName, candidate: &str) -> String {
        let mut name = truncate(candidate, MAX_IDENTIFIER_LENGTH, None);
        let mut suffix = 1;
        while self.is_taken(table, &name) {
            name = truncate(candidate, MAX_IDENTIFIER_LENGTH, Some(suffix));
            suffix += 1;
        }
        self.reserve(table, &name);
        name
    }
}
