use crate::error::{Result, StoreError};
use std::path::{Path, PathBuf};

pub const CONTACT_EXTENSION: &str = "md";
pub const TRASH_DIR: &str = ".trash";

/// The contacts folder: `folder` itself when absolute, otherwise relative to `root`.
pub fn contacts_dir(root: &Path, folder: &str) -> PathBuf {
    let folder = Path::new(folder);
    if folder.is_absolute() {
        folder.to_path_buf()
    } else {
        root.join(folder)
    }
}

/// `<name>.md`, refusing names that would escape or hide the file.
pub fn contact_file_name(name: &str) -> Result<String> {
    let trimmed = name.trim();
    let invalid = trimmed.is_empty()
        || trimmed.starts_with('.')
        || trimmed
            .chars()
            .any(|ch| ch.is_control() || matches!(ch, '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|'));
    if invalid {
        return Err(StoreError::InvalidName(name.to_string()));
    }
    Ok(format!("{trimmed}.{CONTACT_EXTENSION}"))
}

/// Visible `*.md` files; anything else in the folder is not a contact.
pub fn is_contact_file(path: &Path) -> bool {
    let visible = path
        .file_name()
        .and_then(|name| name.to_str())
        .map(|name| !name.starts_with('.'))
        .unwrap_or(false);
    let markdown = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case(CONTACT_EXTENSION))
        .unwrap_or(false);
    visible && markdown
}

#[cfg(test)]
mod tests {
    use super::{contact_file_name, contacts_dir, is_contact_file};
    use std::path::Path;

    #[test]
    fn contacts_dir_resolves_relative_folder() {
        assert_eq!(
            contacts_dir(Path::new("/vault"), "People"),
            Path::new("/vault/People")
        );
        assert_eq!(
            contacts_dir(Path::new("/vault"), "/elsewhere/People"),
            Path::new("/elsewhere/People")
        );
    }

    #[test]
    fn contact_file_name_rejects_path_tricks() {
        assert_eq!(contact_file_name(" Ada Lovelace ").unwrap(), "Ada Lovelace.md");
        for bad in ["", "../x", "a/b", ".hidden", "what?"] {
            assert!(contact_file_name(bad).is_err(), "{bad}");
        }
    }

    #[test]
    fn contact_files_are_visible_markdown() {
        assert!(is_contact_file(Path::new("/c/Ada.md")));
        assert!(is_contact_file(Path::new("/c/Ada.MD")));
        assert!(!is_contact_file(Path::new("/c/.Ada.md")));
        assert!(!is_contact_file(Path::new("/c/photo.png")));
    }
}
