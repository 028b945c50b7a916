use crate::domain::{ContactRecord, Interaction};
use crate::rules::almanac::Almanac;
use crate::rules::dates::{
    age, days_until_birthday, detailed_age, formatted_birthday, parse_birthday,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// One table row. Derived from a record on every refresh and never written back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactRow {
    pub name: String,
    pub birthday: String,
    pub relationship: String,
    pub age: Option<u32>,
    pub formatted_birthday: String,
    pub days_until_birthday: Option<i64>,
    pub last_interaction: Option<String>,
    pub path: PathBuf,
}

impl ContactRow {
    pub fn derive(record: &ContactRecord, path: &Path, today: NaiveDate) -> Self {
        let birthday = record.birthday();
        Self {
            name: record.name.clone(),
            age: age(&birthday, today),
            formatted_birthday: formatted_birthday(&birthday),
            days_until_birthday: days_until_birthday(&birthday, today),
            relationship: record.relationship(),
            last_interaction: record
                .interactions
                .latest()
                .map(|entry| entry.date.clone())
                .filter(|date| !date.is_empty()),
            birthday,
            path: path.to_path_buf(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContactDetailDto {
    pub name: String,
    pub path: PathBuf,
    pub fields: Vec<(String, String)>,
    pub age: Option<u32>,
    pub detailed_age: Option<String>,
    pub formatted_birthday: String,
    pub days_until_birthday: Option<i64>,
    pub almanac: Option<Almanac>,
    pub interactions: Vec<Interaction>,
    pub notes: Option<String>,
}

impl ContactDetailDto {
    pub fn build(record: &ContactRecord, path: &Path, today: NaiveDate) -> Self {
        let birthday = record.birthday();
        Self {
            name: record.name.clone(),
            path: path.to_path_buf(),
            fields: record.display_fields(),
            age: age(&birthday, today),
            detailed_age: detailed_age(&birthday, today).map(|value| value.to_string()),
            formatted_birthday: formatted_birthday(&birthday),
            days_until_birthday: days_until_birthday(&birthday, today),
            almanac: parse_birthday(&birthday).map(Almanac::for_date),
            interactions: record.interactions.entries().to_vec(),
            notes: record.notes.clone(),
        }
    }
}
