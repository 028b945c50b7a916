use crate::error::{Result, StoreError};
use crate::fs::{ContactStore, FsStore};
use crate::paths::{contact_file_name, is_contact_file};
use chrono::NaiveDate;
use kinfolk_core::codec::{decode, encode, HeaderStatus};
use kinfolk_core::domain::field::{
    ADDRESS_KEY, BIRTHDAY_KEY, EMAIL_KEY, PHONE_KEY, RELATIONSHIP_KEY,
};
use kinfolk_core::domain::ContactRecord;
use kinfolk_core::dto::ContactRow;
use kinfolk_core::CoreError;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewContact {
    pub name: String,
    pub birthday: Option<String>,
    pub relationship: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LoadedContact {
    pub path: PathBuf,
    pub record: ContactRecord,
    /// Text after the header, kept byte for byte.
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedFile {
    pub path: PathBuf,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactScan {
    pub rows: Vec<ContactRow>,
    pub skipped: Vec<SkippedFile>,
    pub folder_missing: bool,
}

/// Contacts stored as files directly inside one folder.
pub struct ContactRepository<S: ContactStore = FsStore> {
    store: S,
    dir: PathBuf,
}

impl<S: ContactStore> ContactRepository<S> {
    pub fn new(store: S, dir: impl Into<PathBuf>) -> Self {
        Self {
            store,
            dir: dir.into(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Reads every contact file and derives its row. Unusable files are skipped and
    /// reported, a missing folder yields an empty scan.
    pub fn get_contacts(&self, today: NaiveDate) -> Result<ContactScan> {
        if !self.store.dir_exists(&self.dir) {
            tracing::warn!(folder = %self.dir.display(), "contacts folder not found");
            return Ok(ContactScan {
                folder_missing: true,
                ..ContactScan::default()
            });
        }

        let mut files = self.store.list_files(&self.dir)?;
        files.retain(|path| is_contact_file(path));
        files.sort();

        let mut scan = ContactScan::default();
        for path in files {
            match self.read_contact(&path) {
                Ok(loaded) => scan
                    .rows
                    .push(ContactRow::derive(&loaded.record, &path, today)),
                Err(err) => {
                    tracing::warn!(path = %path.display(), error = %err, "skipping contact file");
                    scan.skipped.push(SkippedFile {
                        path,
                        reason: err.to_string(),
                    });
                }
            }
        }
        tracing::debug!(
            contacts = scan.rows.len(),
            skipped = scan.skipped.len(),
            "scanned contacts folder"
        );
        Ok(scan)
    }

    pub fn load(&self, path: &Path) -> Result<LoadedContact> {
        self.read_contact(path)
    }

    /// Resolves a contact by file stem, then by stem or header name ignoring case.
    pub fn find_by_name(&self, name: &str) -> Result<PathBuf> {
        if let Ok(file_name) = contact_file_name(name) {
            let exact = self.dir.join(file_name);
            if self.store.exists(&exact) {
                return Ok(exact);
            }
        }

        let needle = name.trim().to_lowercase();
        if self.store.dir_exists(&self.dir) {
            let mut files = self.store.list_files(&self.dir)?;
            files.retain(|path| is_contact_file(path));
            files.sort();
            for path in files {
                let stem_matches = path
                    .file_stem()
                    .map(|stem| stem.to_string_lossy().to_lowercase() == needle)
                    .unwrap_or(false);
                if stem_matches {
                    return Ok(path);
                }
                if let Ok(loaded) = self.read_contact(&path) {
                    if loaded.record.name.to_lowercase() == needle {
                        return Ok(path);
                    }
                }
            }
        }
        Err(StoreError::NotFound(name.to_string()))
    }

    pub fn create(&self, input: NewContact) -> Result<LoadedContact> {
        let mut record = ContactRecord::new(&input.name)?;
        let path = self.dir.join(contact_file_name(&record.name)?);

        let optional = [
            (BIRTHDAY_KEY, input.birthday),
            (EMAIL_KEY, input.email),
            (PHONE_KEY, input.phone),
            (ADDRESS_KEY, input.address),
            (RELATIONSHIP_KEY, input.relationship),
        ];
        for (key, value) in optional {
            if let Some(value) = value.filter(|value| !value.trim().is_empty()) {
                record.set_field(key, &value)?;
            }
        }

        if !self.store.dir_exists(&self.dir) {
            self.store.create_dir_all(&self.dir)?;
            tracing::info!(folder = %self.dir.display(), "created contacts folder");
        }
        let contents = encode(&record.to_header(), "")?;
        self.store
            .create_new(&path, &contents)
            .map_err(|err| match err.kind() {
                ErrorKind::AlreadyExists => StoreError::AlreadyExists(path.clone()),
                _ => StoreError::Io(err),
            })?;
        tracing::info!(path = %path.display(), "created contact");

        Ok(LoadedContact {
            path,
            record,
            body: String::new(),
        })
    }

    pub fn set_field(&self, path: &Path, key: &str, value: &str) -> Result<LoadedContact> {
        self.modify(path, |record| record.set_field(key, value))
            .map(|(_, loaded)| loaded)
    }

    /// Applies every update in a single write. Nothing is written when one is rejected.
    pub fn set_fields(&self, path: &Path, updates: &[(String, String)]) -> Result<LoadedContact> {
        self.modify(path, |record| {
            for (key, value) in updates {
                record.set_field(key, value)?;
            }
            Ok(())
        })
        .map(|(_, loaded)| loaded)
    }

    /// Adds a custom field holding `value` and returns its normalized key.
    pub fn add_field_with_value(
        &self,
        path: &Path,
        key: &str,
        value: &str,
    ) -> Result<(String, LoadedContact)> {
        self.modify(path, |record| {
            let key = record.add_field(key)?;
            record.set_field(&key, value)?;
            Ok(key)
        })
    }

    /// Adds an empty custom field and returns its normalized key.
    pub fn add_field(&self, path: &Path, key: &str) -> Result<(String, LoadedContact)> {
        self.modify(path, |record| record.add_field(key))
    }

    pub fn remove_field(&self, path: &Path, key: &str) -> Result<LoadedContact> {
        self.modify(path, |record| record.remove_field(key))
            .map(|(_, loaded)| loaded)
    }

    pub fn set_notes(&self, path: &Path, notes: &str) -> Result<LoadedContact> {
        self.modify(path, |record| {
            record.set_notes(notes);
            Ok(())
        })
        .map(|(_, loaded)| loaded)
    }

    /// Updates the name in the header, then renames the file to match. When the file rename
    /// fails the previous contents are written back.
    pub fn rename(&self, path: &Path, new_name: &str) -> Result<LoadedContact> {
        let (raw, mut loaded) = self.read_raw(path)?;
        loaded.record.rename(new_name)?;
        let target = path
            .parent()
            .unwrap_or_else(|| Path::new(""))
            .join(contact_file_name(&loaded.record.name)?);
        if target != path && self.store.exists(&target) {
            return Err(StoreError::AlreadyExists(target));
        }

        self.persist(&loaded.path, &loaded.record, &loaded.body)?;
        if target == path {
            return Ok(loaded);
        }

        if let Err(err) = self.store.rename(path, &target) {
            if let Err(restore) = self.store.write(path, &raw) {
                tracing::error!(
                    path = %path.display(),
                    error = %restore,
                    "failed to restore contact after rename error"
                );
            }
            return Err(err.into());
        }
        tracing::info!(from = %path.display(), to = %target.display(), "renamed contact");
        loaded.path = target;
        Ok(loaded)
    }

    pub fn trash(&self, path: &Path) -> Result<PathBuf> {
        if !self.store.exists(path) {
            return Err(StoreError::NotFound(path.display().to_string()));
        }
        let target = self.store.trash(path)?;
        tracing::info!(path = %path.display(), trash = %target.display(), "moved contact to trash");
        Ok(target)
    }

    /// Read-modify-write of one record. Nothing is written when `change` fails.
    pub(crate) fn modify<T>(
        &self,
        path: &Path,
        change: impl FnOnce(&mut ContactRecord) -> std::result::Result<T, CoreError>,
    ) -> Result<(T, LoadedContact)> {
        let mut loaded = self.read_contact(path)?;
        let value = change(&mut loaded.record)?;
        self.persist(&loaded.path, &loaded.record, &loaded.body)?;
        Ok((value, loaded))
    }

    fn persist(&self, path: &Path, record: &ContactRecord, body: &str) -> Result<()> {
        let contents = encode(&record.to_header(), body)?;
        self.store.write(path, &contents)?;
        Ok(())
    }

    fn read_contact(&self, path: &Path) -> Result<LoadedContact> {
        self.read_raw(path).map(|(_, loaded)| loaded)
    }

    fn read_raw(&self, path: &Path) -> Result<(String, LoadedContact)> {
        let raw = self.store.read_to_string(path).map_err(|err| match err.kind() {
            ErrorKind::NotFound => StoreError::NotFound(path.display().to_string()),
            _ => StoreError::Io(err),
        })?;
        let doc = decode(&raw);
        let invalid = |reason: &str| StoreError::InvalidContact {
            path: path.to_path_buf(),
            reason: reason.to_string(),
        };
        match doc.status {
            HeaderStatus::Missing => return Err(invalid("no header block")),
            HeaderStatus::Malformed => return Err(invalid("header is not a YAML mapping")),
            HeaderStatus::Parsed => {}
        }
        let record = ContactRecord::from_header(&doc.header).map_err(|err| invalid(&err.to_string()))?;
        Ok((
            raw,
            LoadedContact {
                path: path.to_path_buf(),
                record,
                body: doc.body,
            },
        ))
    }
}
