use crate::error::CoreError;

pub const NAME_KEY: &str = "name";
pub const BIRTHDAY_KEY: &str = "birthday";
pub const RELATIONSHIP_KEY: &str = "relationship";
pub const EMAIL_KEY: &str = "email";
pub const PHONE_KEY: &str = "phone";
pub const ADDRESS_KEY: &str = "address";
pub const INTERACTIONS_KEY: &str = "interactions";
pub const NOTES_KEY: &str = "notes";

/// Keys that live outside the free-form field map of a contact.
pub const RESERVED_KEYS: [&str; 3] = [NAME_KEY, INTERACTIONS_KEY, NOTES_KEY];

pub fn is_reserved_key(key: &str) -> bool {
    RESERVED_KEYS.contains(&key)
}

/// Lowercases a custom field name and checks it is a letter followed by letters or digits.
pub fn normalize_field_key(raw: &str) -> Result<String, CoreError> {
    let trimmed = raw.trim();
    let mut chars = trimmed.chars();
    let valid = match chars.next() {
        Some(first) => first.is_ascii_alphabetic() && chars.all(|ch| ch.is_ascii_alphanumeric()),
        None => false,
    };
    if !valid {
        return Err(CoreError::InvalidFieldKey(trimmed.to_string()));
    }
    Ok(trimmed.to_ascii_lowercase())
}
