pub fn normalize_relationship(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Adds `raw` to `types` unless an entry already matches it ignoring case.
/// Returns the normalized value when it was new.
pub fn register_relationship(types: &mut Vec<String>, raw: &str) -> Option<String> {
    let normalized = normalize_relationship(raw);
    if normalized.is_empty() {
        return None;
    }
    if types
        .iter()
        .any(|existing| existing.to_lowercase() == normalized)
    {
        return None;
    }
    types.push(normalized.clone());
    Some(normalized)
}
