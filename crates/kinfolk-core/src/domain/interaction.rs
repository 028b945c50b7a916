use crate::error::CoreError;
use crate::rules::dates::parse_date;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_yaml::Mapping;
use std::cmp::Ordering;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interaction {
    pub date: String,
    pub text: String,
    /// Keys of the stored item other than `date` and `text`, written back as found.
    #[serde(skip)]
    pub extra: Mapping,
}

impl Interaction {
    pub fn new(date: &str, text: &str) -> Result<Self, CoreError> {
        let date = date.trim();
        if parse_date(date).is_none() {
            return Err(CoreError::InvalidDate(date.to_string()));
        }
        let text = text.trim();
        if text.is_empty() {
            return Err(CoreError::EmptyInteraction);
        }
        Ok(Self {
            date: date.to_string(),
            text: text.to_string(),
            extra: Mapping::new(),
        })
    }

    pub fn parsed_date(&self) -> Option<NaiveDate> {
        parse_date(&self.date)
    }
}

/// Interactions of one contact. Every mutation leaves the list newest first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InteractionLog {
    entries: Vec<Interaction>,
}

impl InteractionLog {
    /// Wraps entries as stored, without reordering.
    pub fn from_entries(entries: Vec<Interaction>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[Interaction] {
        &self.entries
    }

    pub fn into_entries(self) -> Vec<Interaction> {
        self.entries
    }

    /// First stored entry; this is what the table shows as the last interaction.
    pub fn latest(&self) -> Option<&Interaction> {
        self.entries.first()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn add(&mut self, entry: Interaction) {
        self.entries.push(entry);
        self.sort_newest_first();
    }

    pub fn update(&mut self, index: usize, entry: Interaction) -> Result<(), CoreError> {
        let len = self.entries.len();
        let slot = self
            .entries
            .get_mut(index)
            .ok_or(CoreError::InteractionIndex { index, len })?;
        let mut entry = entry;
        if entry.extra.is_empty() {
            entry.extra = std::mem::take(&mut slot.extra);
        }
        *slot = entry;
        self.sort_newest_first();
        Ok(())
    }

    pub fn remove(&mut self, index: usize) -> Result<Interaction, CoreError> {
        if index >= self.entries.len() {
            return Err(CoreError::InteractionIndex {
                index,
                len: self.entries.len(),
            });
        }
        let removed = self.entries.remove(index);
        self.sort_newest_first();
        Ok(removed)
    }

    /// Stable sort, newest date first, entries with unreadable dates at the end.
    pub fn sort_newest_first(&mut self) {
        self.entries
            .sort_by(|a, b| match (a.parsed_date(), b.parsed_date()) {
                (Some(left), Some(right)) => right.cmp(&left),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            });
    }
}
