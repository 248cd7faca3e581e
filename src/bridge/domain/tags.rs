//! Tag list composition.

/// Combines comma-separated tag sources into one ordered list.
///
/// Each part is split on commas; entries are trimmed and empties dropped.
#[must_use]
pub fn combine_tags(parts: &[&str]) -> Vec<String> {
    parts
        .iter()
        .flat_map(|part| part.split(','))
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(ToString::to_string)
        .collect()
}
