//! Key comparison used by every lookup in the crate

/// Case-insensitive, whitespace-trimmed key equality.
///
/// Element names, text-config keys and section filters all compare through
/// this one function so `get`, `set`, `delete_property`, `find_node` and
/// `find_section` agree on what "the same key" means.
pub fn keys_match(left: &str, right: &str) -> bool {
    let left = left.trim();
    let right = right.trim();
    if left.len() == right.len() && left.eq_ignore_ascii_case(right) {
        return true;
    }
    left.chars()
        .flat_map(char::to_lowercase)
        .eq(right.chars().flat_map(char::to_lowercase))
}

/// Case-insensitive value equality, without trimming
pub fn values_match(left: &str, right: &str) -> bool {
    left.len() == right.len() && left.eq_ignore_ascii_case(right)
        || left.to_lowercase() == right.to_lowercase()
}

/// Normalized form of a key, for storage where a map needs one spelling
pub fn normalize(key: &str) -> String {
    key.trim().to_lowercase()
}
