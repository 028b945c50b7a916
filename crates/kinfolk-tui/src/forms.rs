use std::path::PathBuf;

use chrono::NaiveDate;
use kinfolk_core::domain::field::RELATIONSHIP_KEY;
use kinfolk_core::domain::{normalize_field_key, normalize_relationship, Interaction};
use kinfolk_core::rules::dates::{parse_birthday, DATE_FORMAT};
use kinfolk_store::repo::NewContact;

use crate::actions::Action;
use crate::app::Mode;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormKind {
    AddContact,
    AddField(PathBuf),
    EditField { path: PathBuf, key: String },
    AddInteraction(PathBuf),
    EditInteraction { path: PathBuf, index: usize },
    Rename(PathBuf),
    Notes(PathBuf),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormInput {
    /// Translation key of the label.
    pub label: &'static str,
    pub value: String,
    pub multiline: bool,
}

impl FormInput {
    fn line(label: &'static str, value: impl Into<String>) -> Self {
        Self {
            label,
            value: value.into(),
            multiline: false,
        }
    }

    fn text(label: &'static str, value: impl Into<String>) -> Self {
        Self {
            label,
            value: value.into(),
            multiline: true,
        }
    }
}

/// A modal with text inputs followed by Save and Cancel buttons.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Form {
    pub kind: FormKind,
    pub inputs: Vec<FormInput>,
    pub(crate) focus: usize,
    /// Contact page to go back to, the table when `None`.
    pub return_to: Option<PathBuf>,
}

impl Form {
    fn new(kind: FormKind, inputs: Vec<FormInput>, return_to: Option<PathBuf>) -> Self {
        Self {
            kind,
            inputs,
            focus: 0,
            return_to,
        }
    }

    pub fn add_contact() -> Self {
        Self::new(
            FormKind::AddContact,
            vec![
                FormInput::line("name", ""),
                FormInput::line("birthday", ""),
                FormInput::line("relationship", ""),
                FormInput::line("email", ""),
                FormInput::line("phone", ""),
            ],
            None,
        )
    }

    pub fn add_field(path: PathBuf) -> Self {
        Self::new(
            FormKind::AddField(path.clone()),
            vec![
                FormInput::line("field_name_placeholder", ""),
                FormInput::line("value", ""),
            ],
            Some(path),
        )
    }

    pub fn edit_field(path: PathBuf, key: &str, current: &str) -> Self {
        Self::new(
            FormKind::EditField {
                path: path.clone(),
                key: key.to_string(),
            },
            vec![FormInput::line("value", current)],
            Some(path),
        )
    }

    pub fn add_interaction(path: PathBuf, today: NaiveDate, return_to: Option<PathBuf>) -> Self {
        Self::new(
            FormKind::AddInteraction(path),
            vec![
                FormInput::line("date", today.format(DATE_FORMAT).to_string()),
                FormInput::text("what_happened", ""),
            ],
            return_to,
        )
    }

    pub fn edit_interaction(path: PathBuf, index: usize, entry: &Interaction) -> Self {
        Self::new(
            FormKind::EditInteraction {
                path: path.clone(),
                index,
            },
            vec![
                FormInput::line("date", entry.date.as_str()),
                FormInput::text("what_happened", entry.text.as_str()),
            ],
            Some(path),
        )
    }

    pub fn rename(path: PathBuf, current: &str) -> Self {
        Self::new(
            FormKind::Rename(path.clone()),
            vec![FormInput::line("new_name", current)],
            Some(path),
        )
    }

    pub fn notes(path: PathBuf, current: &str) -> Self {
        Self::new(
            FormKind::Notes(path.clone()),
            vec![FormInput::text("notes", current)],
            Some(path),
        )
    }

    pub fn title_key(&self) -> &'static str {
        match self.kind {
            FormKind::AddContact => "add_new_contact",
            FormKind::AddField(_) => "add_custom_field",
            FormKind::EditField { .. } => "edit_field",
            FormKind::AddInteraction(_) => "add_interaction",
            FormKind::EditInteraction { .. } => "edit_interaction",
            FormKind::Rename(_) => "rename_contact",
            FormKind::Notes(_) => "edit_notes",
        }
    }

    pub fn focus(&self) -> usize {
        self.focus
    }

    pub fn focus_next(&mut self) {
        let total = self.inputs.len() + 2;
        self.focus = (self.focus + 1) % total;
    }

    pub fn focus_prev(&mut self) {
        let total = self.inputs.len() + 2;
        if self.focus == 0 {
            self.focus = total - 1;
        } else {
            self.focus -= 1;
        }
    }

    pub fn is_save_focus(&self) -> bool {
        self.focus == self.inputs.len()
    }

    pub fn is_cancel_focus(&self) -> bool {
        self.focus == self.inputs.len() + 1
    }

    pub fn active_input_mut(&mut self) -> Option<&mut FormInput> {
        self.inputs.get_mut(self.focus)
    }

    pub fn value(&self, index: usize) -> &str {
        self.inputs
            .get(index)
            .map(|input| input.value.as_str())
            .unwrap_or_default()
    }

    /// True when the focused input holds a relationship type.
    pub fn is_relationship_focus(&self) -> bool {
        match &self.kind {
            FormKind::AddContact => self.focus == 2,
            FormKind::EditField { key, .. } => key == RELATIONSHIP_KEY && self.focus == 0,
            _ => false,
        }
    }

    /// Replaces the focused relationship with the known type after the current one.
    pub fn cycle_relationship(&mut self, types: &[String]) {
        if types.is_empty() || !self.is_relationship_focus() {
            return;
        }
        let Some(input) = self.active_input_mut() else {
            return;
        };
        let current = normalize_relationship(&input.value);
        let next = types
            .iter()
            .position(|known| *known == current)
            .map(|pos| (pos + 1) % types.len())
            .unwrap_or(0);
        input.value = types[next].clone();
    }

    pub fn return_mode(&self) -> Mode {
        match &self.return_to {
            Some(path) => Mode::Page(path.clone()),
            None => Mode::Table,
        }
    }

    pub fn to_action(&self) -> Result<Action, String> {
        match &self.kind {
            FormKind::AddContact => {
                let name = self.value(0).trim();
                if name.is_empty() {
                    return Err("name is required".to_string());
                }
                let birthday = optional(self.value(1));
                if let Some(raw) = &birthday {
                    if parse_birthday(raw).is_none() {
                        return Err(format!("invalid birthday (expected YYYY-MM-DD): {raw}"));
                    }
                }
                Ok(Action::CreateContact(NewContact {
                    name: name.to_string(),
                    birthday,
                    relationship: optional(self.value(2)),
                    email: optional(self.value(3)),
                    phone: optional(self.value(4)),
                    address: None,
                }))
            }
            FormKind::AddField(path) => {
                let key = normalize_field_key(self.value(0)).map_err(|err| err.to_string())?;
                Ok(Action::AddField {
                    path: path.clone(),
                    key,
                    value: self.value(1).trim().to_string(),
                })
            }
            FormKind::EditField { path, key } => Ok(Action::SetField {
                path: path.clone(),
                key: key.clone(),
                value: self.value(0).trim().to_string(),
            }),
            FormKind::AddInteraction(path) => {
                let entry = Interaction::new(self.value(0), self.value(1))
                    .map_err(|err| err.to_string())?;
                Ok(Action::AddInteraction {
                    path: path.clone(),
                    entry,
                })
            }
            FormKind::EditInteraction { path, index } => {
                let entry = Interaction::new(self.value(0), self.value(1))
                    .map_err(|err| err.to_string())?;
                Ok(Action::UpdateInteraction {
                    path: path.clone(),
                    index: *index,
                    entry,
                })
            }
            FormKind::Rename(path) => {
                let name = self.value(0).trim();
                if name.is_empty() {
                    return Err("name is required".to_string());
                }
                Ok(Action::Rename {
                    path: path.clone(),
                    name: name.to_string(),
                })
            }
            FormKind::Notes(path) => Ok(Action::SetNotes {
                path: path.clone(),
                notes: self.value(0).to_string(),
            }),
        }
    }
}

fn optional(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
