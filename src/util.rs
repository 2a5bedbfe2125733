//! Shared utility helpers.

/// Case-insensitive equality for identifiers such as schema names.
#[inline]
pub fn eq_ci(a: &str, b: &str) -> bool {
    a.eq_ignore_ascii_case(b)
}

/// Base name of a store type with any facets removed, e.g. `nvarchar(450)` -> `nvarchar`.
#[inline]
pub fn base_store_type(store_type: &str) -> &str {
    let trimmed = store_type.trim();
    match trimmed.find('(') {
        Some(idx) => trimmed[..idx].trim_end(),
        None => trimmed,
    }
}
