use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use crate::{ConfigError, Result, DEFAULT_LANGUAGE};

const LOCALES_DIR: &str = "locales";

const ENGLISH: &[(&str, &str)] = &[
    ("contacts_title", "Contacts"),
    ("search_placeholder", "Search contacts..."),
    ("add_contact", "Add contact"),
    ("add_new_contact", "Add new contact"),
    ("no_contacts", "No contacts found"),
    ("name", "Name"),
    ("age", "Age"),
    ("birthday", "Birthday"),
    ("days_left", "Days"),
    ("type", "Type"),
    ("last_interaction", "Last interaction"),
    ("email", "Email"),
    ("phone", "Phone"),
    ("relationship", "Relationship"),
    ("notes", "Notes"),
    ("interactions", "Interactions"),
    ("markdown", "Markdown"),
    ("add_interaction", "Add interaction"),
    ("edit_interaction", "Edit interaction"),
    ("what_happened", "What happened?"),
    ("add_custom_field", "Add custom field"),
    ("edit_field", "Edit field"),
    ("remove_field_confirm", "Remove field {key}?"),
    ("remove_interaction_confirm", "Delete the interaction from {date}?"),
    ("edit_notes", "Edit notes"),
    ("date", "Date"),
    ("value", "Value"),
    ("field_name_placeholder", "Field name"),
    ("rename_contact", "Rename contact"),
    ("new_name", "New name"),
    ("delete_contact", "Delete contact"),
    ("delete_confirm", "Are you sure you want to delete {name}?"),
    ("created_contact", "Created contact"),
    ("updated_contact_name", "Updated contact name"),
    ("folder_not_found", "Contacts folder not found: {folder}"),
    ("skipped_files", "{count} file(s) skipped"),
    ("no_interactions", "No interactions yet"),
    ("no_notes", "No notes yet"),
    ("save", "Save"),
    ("cancel", "Cancel"),
];

/// String table for one language with English as the fallback.
#[derive(Debug, Clone, Default)]
pub struct Translations {
    strings: HashMap<String, String>,
}

impl Translations {
    pub fn english() -> Self {
        Self {
            strings: ENGLISH
                .iter()
                .map(|(key, value)| (key.to_string(), value.to_string()))
                .collect(),
        }
    }

    /// Reads `<dir>/locales/<language>.ini` over the English table. A missing file is not
    /// an error.
    pub fn load(dir: &Path, language: &str) -> Result<Self> {
        let language = validate_language(language)?;
        let mut table = Self::english();
        let path = dir.join(LOCALES_DIR).join(format!("{language}.ini"));
        match fs::read_to_string(&path) {
            Ok(contents) => table.strings.extend(parse_ini(&contents)),
            Err(err) if err.kind() == ErrorKind::NotFound => {}
            Err(source) => return Err(ConfigError::Read { path, source }),
        }
        Ok(table)
    }

    /// Unknown keys come back unchanged.
    pub fn t<'a>(&'a self, key: &'a str) -> &'a str {
        self.strings.get(key).map(String::as_str).unwrap_or(key)
    }

    /// `t` with `{placeholder}` substitution.
    pub fn format(&self, key: &str, args: &[(&str, &str)]) -> String {
        let mut out = self.t(key).to_string();
        for (name, value) in args {
            out = out.replace(&format!("{{{name}}}"), value);
        }
        out
    }
}

/// `key = value` lines; blank lines, `;`/`#` comments and `[section]` headers are skipped.
pub fn parse_ini(contents: &str) -> HashMap<String, String> {
    contents
        .lines()
        .map(str::trim)
        .filter(|line| {
            !line.is_empty() && !line.starts_with(';') && !line.starts_with('#') && !line.starts_with('[')
        })
        .filter_map(|line| {
            let (key, value) = line.split_once('=')?;
            let key = key.trim();
            if key.is_empty() {
                return None;
            }
            Some((key.to_string(), value.trim().to_string()))
        })
        .collect()
}

pub(crate) fn validate_language(raw: &str) -> Result<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(DEFAULT_LANGUAGE.to_string());
    }
    if !trimmed
        .chars()
        .all(|ch| ch.is_ascii_alphanumeric() || ch == '-' || ch == '_')
    {
        return Err(ConfigError::InvalidLanguage(raw.to_string()));
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::{parse_ini, Translations};
    use crate::ConfigError;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn parse_ini_skips_comments_and_sections() {
        let table = parse_ini("; comment\n# another\n[main]\nadd_contact = Kontakt hinzufügen\nbroken line\n = nokey\n");
        assert_eq!(table.len(), 1);
        assert_eq!(table["add_contact"], "Kontakt hinzufügen");
    }

    #[test]
    fn load_overlays_language_file() {
        let temp = TempDir::new().expect("tempdir");
        let locales = temp.path().join("locales");
        fs::create_dir_all(&locales).expect("mkdir");
        fs::write(locales.join("de.ini"), "add_contact = Kontakt hinzufügen\n").expect("write");

        let table = Translations::load(temp.path(), "de").expect("load");
        assert_eq!(table.t("add_contact"), "Kontakt hinzufügen");
        assert_eq!(table.t("cancel"), "Cancel");
        assert_eq!(table.t("no_such_key"), "no_such_key");
    }

    #[test]
    fn load_without_file_falls_back_to_english() {
        let temp = TempDir::new().expect("tempdir");
        let table = Translations::load(temp.path(), "fr").expect("load");
        assert_eq!(
            table.format("delete_confirm", &[("name", "Ada")]),
            "Are you sure you want to delete Ada?"
        );
    }

    #[test]
    fn load_rejects_path_like_language() {
        let temp = TempDir::new().expect("tempdir");
        let err = Translations::load(temp.path(), "../secrets").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidLanguage(_)));
    }
}
