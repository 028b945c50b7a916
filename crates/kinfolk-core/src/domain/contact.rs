use crate::codec::scalar_to_string;
use crate::domain::field::{
    is_reserved_key, normalize_field_key, BIRTHDAY_KEY, INTERACTIONS_KEY, NAME_KEY, NOTES_KEY,
    RELATIONSHIP_KEY,
};
use crate::domain::interaction::{Interaction, InteractionLog};
use crate::domain::relationship::normalize_relationship;
use crate::error::CoreError;
use crate::rules::dates::parse_birthday;
use serde_yaml::{Mapping, Value};

/// One contact as stored in a file header.
///
/// `fields` holds every header key other than name, interactions and notes (birthday,
/// relationship, email, custom keys) in file order. Interaction and notes values are
/// written back exactly as read until they are changed.
#[derive(Debug, Clone)]
pub struct ContactRecord {
    pub name: String,
    pub fields: Mapping,
    pub interactions: InteractionLog,
    pub notes: Option<String>,
    stored: StoredValues,
}

#[derive(Debug, Clone, Default)]
struct StoredValues {
    interactions: Option<(InteractionLog, Value)>,
    /// Items of the interactions value that are not `{date, text}` entries.
    unread_items: Vec<Value>,
    notes: Option<(Option<String>, Value)>,
}

impl PartialEq for ContactRecord {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.fields == other.fields
            && self.interactions == other.interactions
            && self.notes == other.notes
    }
}

impl ContactRecord {
    pub fn new(name: &str) -> Result<Self, CoreError> {
        let name = validate_name(name)?;
        Ok(Self {
            name,
            fields: Mapping::new(),
            interactions: InteractionLog::default(),
            notes: None,
            stored: StoredValues::default(),
        })
    }

    pub fn from_header(header: &Mapping) -> Result<Self, CoreError> {
        let name = header
            .get(NAME_KEY)
            .and_then(scalar_to_string)
            .ok_or(CoreError::MissingName)?;
        let mut record = Self::new(&name)?;

        for (key, value) in header {
            match key.as_str() {
                Some(NAME_KEY) => {}
                Some(INTERACTIONS_KEY) => {
                    let (entries, unread) = interactions_from_value(value);
                    record.interactions = InteractionLog::from_entries(entries);
                    record.stored.interactions = Some((record.interactions.clone(), value.clone()));
                    record.stored.unread_items = unread;
                }
                Some(NOTES_KEY) => {
                    record.notes = scalar_to_string(value);
                    record.stored.notes = Some((record.notes.clone(), value.clone()));
                }
                _ => {
                    record.fields.insert(key.clone(), value.clone());
                }
            }
        }
        Ok(record)
    }

    pub fn to_header(&self) -> Mapping {
        let mut header = Mapping::new();
        header.insert(Value::from(NAME_KEY), Value::from(self.name.as_str()));
        for (key, value) in &self.fields {
            header.insert(key.clone(), value.clone());
        }

        match &self.stored.interactions {
            Some((read, raw)) if *read == self.interactions => {
                header.insert(Value::from(INTERACTIONS_KEY), raw.clone());
            }
            _ => {
                let mut items: Vec<Value> = self
                    .interactions
                    .entries()
                    .iter()
                    .map(interaction_to_value)
                    .collect();
                items.extend(self.stored.unread_items.iter().cloned());
                if !items.is_empty() {
                    header.insert(Value::from(INTERACTIONS_KEY), Value::Sequence(items));
                }
            }
        }

        match &self.stored.notes {
            Some((read, raw)) if *read == self.notes => {
                header.insert(Value::from(NOTES_KEY), raw.clone());
            }
            _ => {
                if let Some(notes) = &self.notes {
                    header.insert(Value::from(NOTES_KEY), Value::from(notes.as_str()));
                }
            }
        }
        header
    }

    pub fn field_str(&self, key: &str) -> Option<String> {
        self.fields.get(key).and_then(scalar_to_string)
    }

    pub fn birthday(&self) -> String {
        self.field_str(BIRTHDAY_KEY).unwrap_or_default()
    }

    pub fn relationship(&self) -> String {
        self.field_str(RELATIONSHIP_KEY).unwrap_or_default()
    }

    /// Free-form fields as displayed on the detail page: scalar keys in file order.
    pub fn display_fields(&self) -> Vec<(String, String)> {
        self.fields
            .iter()
            .filter_map(|(key, value)| {
                let key = key.as_str()?;
                Some((key.to_string(), scalar_to_string(value).unwrap_or_default()))
            })
            .collect()
    }

    /// Sets an existing or new field. Birthdays must be empty or `YYYY-MM-DD`;
    /// relationships are lowercased.
    pub fn set_field(&mut self, key: &str, value: &str) -> Result<(), CoreError> {
        let key = key.trim();
        if is_reserved_key(key) {
            return Err(CoreError::ReservedField(key.to_string()));
        }
        if key.is_empty() {
            return Err(CoreError::InvalidFieldKey(key.to_string()));
        }
        let value = match key {
            BIRTHDAY_KEY => {
                let trimmed = value.trim();
                if !trimmed.is_empty() && parse_birthday(trimmed).is_none() {
                    return Err(CoreError::InvalidDate(trimmed.to_string()));
                }
                trimmed.to_string()
            }
            RELATIONSHIP_KEY => normalize_relationship(value),
            _ => value.to_string(),
        };
        self.fields.insert(Value::from(key), Value::from(value));
        Ok(())
    }

    /// Adds an empty custom field. Returns the normalized key.
    pub fn add_field(&mut self, raw_key: &str) -> Result<String, CoreError> {
        let key = normalize_field_key(raw_key)?;
        if is_reserved_key(&key) || self.fields.contains_key(key.as_str()) {
            return Err(CoreError::DuplicateField(key));
        }
        self.fields.insert(Value::from(key.as_str()), Value::from(""));
        Ok(key)
    }

    pub fn remove_field(&mut self, key: &str) -> Result<(), CoreError> {
        let key = key.trim();
        if is_reserved_key(key) {
            return Err(CoreError::ReservedField(key.to_string()));
        }
        if !self.fields.contains_key(key) {
            return Err(CoreError::UnknownField(key.to_string()));
        }
        self.fields = std::mem::take(&mut self.fields)
            .into_iter()
            .filter(|(existing, _)| existing.as_str() != Some(key))
            .collect();
        Ok(())
    }

    pub fn rename(&mut self, name: &str) -> Result<(), CoreError> {
        self.name = validate_name(name)?;
        Ok(())
    }

    pub fn set_notes(&mut self, notes: &str) {
        if notes.trim().is_empty() {
            self.notes = None;
        } else {
            self.notes = Some(notes.to_string());
        }
    }
}

fn validate_name(raw: &str) -> Result<String, CoreError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(CoreError::MissingName);
    }
    Ok(trimmed.to_string())
}

/// Splits a stored interactions value into readable entries and everything else.
fn interactions_from_value(value: &Value) -> (Vec<Interaction>, Vec<Value>) {
    let items = match value {
        Value::Null => return (Vec::new(), Vec::new()),
        Value::Sequence(items) => items,
        other => return (Vec::new(), vec![other.clone()]),
    };

    let mut entries = Vec::new();
    let mut unread = Vec::new();
    for item in items {
        match interaction_from_item(item) {
            Some(entry) => entries.push(entry),
            None => unread.push(item.clone()),
        }
    }
    (entries, unread)
}

fn interaction_from_item(item: &Value) -> Option<Interaction> {
    let item = item.as_mapping()?;
    let mut date = String::new();
    let mut text = String::new();
    let mut extra = Mapping::new();
    for (key, value) in item {
        match key.as_str() {
            Some("date") => date = item_text(value)?,
            Some("text") => text = item_text(value)?,
            _ => {
                extra.insert(key.clone(), value.clone());
            }
        }
    }
    if date.is_empty() && text.is_empty() {
        return None;
    }
    Some(Interaction { date, text, extra })
}

fn item_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => Some(String::new()),
        other => scalar_to_string(other),
    }
}

fn interaction_to_value(entry: &Interaction) -> Value {
    let mut item = Mapping::new();
    item.insert(Value::from("date"), Value::from(entry.date.as_str()));
    item.insert(Value::from("text"), Value::from(entry.text.as_str()));
    for (key, value) in &entry.extra {
        item.insert(key.clone(), value.clone());
    }
    Value::Mapping(item)
}
