use chrono::NaiveDate;
use kinfolk_store::fs::{ContactStore, FsStore};
use kinfolk_store::repo::{ContactRepository, NewContact};
use kinfolk_store::{open_repository, StoreError};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 10).unwrap()
}

fn new_contact(name: &str, birthday: &str) -> NewContact {
    NewContact {
        name: name.to_string(),
        birthday: Some(birthday.to_string()),
        ..NewContact::default()
    }
}

#[test]
fn create_writes_header_and_creates_folder() {
    let temp = TempDir::new().expect("tempdir");
    let repo = open_repository(temp.path(), "People");

    let created = repo
        .create(NewContact {
            name: "Ada Lovelace".into(),
            birthday: Some("1815-12-10".into()),
            relationship: Some("Family".into()),
            email: Some("ada@example.com".into()),
            phone: Some("   ".into()),
            address: Some("12 St James's Square".into()),
        })
        .expect("create contact");

    assert_eq!(created.path, temp.path().join("People").join("Ada Lovelace.md"));
    let raw = fs::read_to_string(&created.path).expect("read");
    assert!(raw.starts_with("---\nname: Ada Lovelace\n"));
    assert!(raw.contains("relationship: family\n"));
    assert!(!raw.contains("phone"));
    assert_eq!(
        created.record.field_str("address").as_deref(),
        Some("12 St James's Square")
    );
    assert!(raw.ends_with("---\n"));

    let err = repo
        .create(new_contact("Ada Lovelace", ""))
        .unwrap_err();
    assert!(matches!(err, StoreError::AlreadyExists(_)));
}

#[test]
fn create_rejects_bad_input() {
    let temp = TempDir::new().expect("tempdir");
    let repo = open_repository(temp.path(), "People");

    assert!(matches!(
        repo.create(new_contact("  ", "")).unwrap_err(),
        StoreError::Core(_)
    ));
    assert!(matches!(
        repo.create(new_contact("a/b", "")).unwrap_err(),
        StoreError::InvalidName(_)
    ));
    assert!(matches!(
        repo.create(new_contact("Ada", "10/12/1815")).unwrap_err(),
        StoreError::Core(_)
    ));
    assert!(!temp.path().join("People").join("Ada.md").exists());
}

#[test]
fn get_contacts_skips_unusable_files() {
    let temp = TempDir::new().expect("tempdir");
    let dir = temp.path().join("People");
    fs::create_dir_all(dir.join("archive")).expect("mkdir");
    fs::write(dir.join("Ada.md"), "---\nname: Ada\nbirthday: 1990-06-15\n---\n").expect("write");
    fs::write(dir.join("NoName.md"), "---\nbirthday: 1990-06-15\n---\n").expect("write");
    fs::write(dir.join("Plain.md"), "just text\n").expect("write");
    fs::write(dir.join("Broken.md"), "---\nname: [oops\n---\n").expect("write");
    fs::write(dir.join("photo.png"), "binary").expect("write");
    fs::write(dir.join("archive").join("Old.md"), "---\nname: Old\n---\n").expect("write");

    let repo = open_repository(temp.path(), "People");
    let scan = repo.get_contacts(today()).expect("scan");

    assert!(!scan.folder_missing);
    assert_eq!(scan.rows.len(), 1);
    assert_eq!(scan.rows[0].name, "Ada");
    assert_eq!(scan.rows[0].days_until_birthday, Some(5));
    let mut skipped: Vec<String> = scan
        .skipped
        .iter()
        .map(|file| file.path.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    skipped.sort();
    assert_eq!(skipped, vec!["Broken.md", "NoName.md", "Plain.md"]);
}

#[test]
fn get_contacts_reports_missing_folder() {
    let temp = TempDir::new().expect("tempdir");
    let repo = open_repository(temp.path(), "Nowhere");
    let scan = repo.get_contacts(today()).expect("scan");
    assert!(scan.folder_missing);
    assert!(scan.rows.is_empty());
}

#[test]
fn edits_preserve_body_and_unknown_keys() {
    let temp = TempDir::new().expect("tempdir");
    let dir = temp.path().join("People");
    fs::create_dir_all(&dir).expect("mkdir");
    let path = dir.join("Grace.md");
    let body = "\n# Grace\n\n---\nfree text with a marker line\n";
    fs::write(&path, format!("---\nname: Grace\ntwitter: \"@grace\"\n---\n{body}")).expect("write");

    let repo = open_repository(temp.path(), "People");
    repo.set_field(&path, "relationship", "Colleague").expect("set field");
    let (key, _) = repo.add_field(&path, "Nickname").expect("add field");
    assert_eq!(key, "nickname");
    repo.set_notes(&path, "met at the conference").expect("notes");

    let err = repo.add_field(&path, "nickname").unwrap_err();
    assert!(matches!(err, StoreError::Core(_)));

    let loaded = repo.load(&path).expect("load");
    assert_eq!(loaded.body, body);
    assert_eq!(loaded.record.relationship(), "colleague");
    assert_eq!(loaded.record.field_str("twitter").as_deref(), Some("@grace"));
    assert_eq!(loaded.record.field_str("nickname").as_deref(), Some(""));
    assert_eq!(loaded.record.notes.as_deref(), Some("met at the conference"));

    repo.remove_field(&path, "nickname").expect("remove field");
    assert!(repo.load(&path).expect("load").record.field_str("nickname").is_none());
}

#[test]
fn set_fields_writes_all_or_nothing() {
    let temp = TempDir::new().expect("tempdir");
    let repo = open_repository(temp.path(), "People");
    let created = repo.create(new_contact("Ada", "1990-06-15")).expect("create");
    let before = fs::read_to_string(&created.path).expect("read");

    let rejected = vec![
        ("email".to_string(), "ada@example.org".to_string()),
        ("birthday".to_string(), "someday".to_string()),
    ];
    let err = repo.set_fields(&created.path, &rejected).unwrap_err();
    assert!(matches!(err, StoreError::Core(_)));
    assert_eq!(fs::read_to_string(&created.path).expect("read"), before);

    let accepted = vec![
        ("email".to_string(), "ada@example.org".to_string()),
        ("relationship".to_string(), "Family".to_string()),
    ];
    let loaded = repo.set_fields(&created.path, &accepted).expect("set fields");
    assert_eq!(loaded.record.field_str("email").as_deref(), Some("ada@example.org"));
    assert_eq!(loaded.record.relationship(), "family");
}

#[test]
fn add_field_with_value_is_one_write() {
    let temp = TempDir::new().expect("tempdir");
    let repo = open_repository(temp.path(), "People");
    let created = repo.create(new_contact("Ada", "")).expect("create");

    let (key, loaded) = repo
        .add_field_with_value(&created.path, "Github", "ada-l")
        .expect("add field");
    assert_eq!(key, "github");
    assert_eq!(loaded.record.field_str("github").as_deref(), Some("ada-l"));

    let before = fs::read_to_string(&created.path).expect("read");
    let err = repo
        .add_field_with_value(&created.path, "birthday", "1990-06-15")
        .unwrap_err();
    assert!(matches!(err, StoreError::Core(_)));
    assert_eq!(fs::read_to_string(&created.path).expect("read"), before);
}

#[test]
fn edits_keep_header_values_they_cannot_read() {
    let temp = TempDir::new().expect("tempdir");
    let dir = temp.path().join("People");
    fs::create_dir_all(&dir).expect("mkdir");
    let path = dir.join("Ada.md");
    fs::write(
        &path,
        "---\nname: Ada\ninteractions: met at the conference\nnotes: [one, two]\nversion: 1.10\n---\nbody\n",
    )
    .expect("write");

    let repo = open_repository(temp.path(), "People");
    repo.set_field(&path, "email", "a@b.c").expect("set field");

    let raw = fs::read_to_string(&path).expect("read");
    assert!(raw.contains("interactions: met at the conference\n"), "{raw}");
    assert!(raw.contains("- one\n"), "{raw}");
    assert!(raw.contains("- two\n"), "{raw}");
    assert!(raw.contains("1.10"), "{raw}");
    assert!(raw.contains("email: a@b.c\n"), "{raw}");
    assert!(raw.ends_with("---\nbody\n"));
}

#[test]
fn interaction_edits_keep_extra_item_keys() {
    let temp = TempDir::new().expect("tempdir");
    let dir = temp.path().join("People");
    fs::create_dir_all(&dir).expect("mkdir");
    let path = dir.join("Grace.md");
    fs::write(
        &path,
        "---\nname: Grace\ninteractions:\n- date: 2024-01-05\n  text: coffee\n  place: cafe\n- a loose line\n---\n",
    )
    .expect("write");

    let repo = open_repository(temp.path(), "People");
    let entry = kinfolk_core::domain::Interaction::new("2024-03-01", "call").expect("entry");
    repo.add_interaction(&path, entry).expect("add interaction");

    let raw = fs::read_to_string(&path).expect("read");
    assert!(raw.contains("place: cafe\n"), "{raw}");
    assert!(raw.contains("- a loose line\n"), "{raw}");
    let loaded = repo.load(&path).expect("load");
    let texts: Vec<&str> = loaded
        .record
        .interactions
        .entries()
        .iter()
        .map(|entry| entry.text.as_str())
        .collect();
    assert_eq!(texts, vec!["call", "coffee"]);
}

#[test]
fn rename_moves_file_and_updates_name() {
    let temp = TempDir::new().expect("tempdir");
    let repo = open_repository(temp.path(), "People");
    let created = repo.create(new_contact("Grace", "1906-12-09")).expect("create");
    repo.create(new_contact("Linus", "")).expect("create");

    let err = repo.rename(&created.path, "Linus").unwrap_err();
    assert!(matches!(err, StoreError::AlreadyExists(_)));

    let renamed = repo.rename(&created.path, "Grace Hopper").expect("rename");
    assert_eq!(renamed.path, repo.dir().join("Grace Hopper.md"));
    assert!(!created.path.exists());
    let loaded = repo.load(&renamed.path).expect("load");
    assert_eq!(loaded.record.name, "Grace Hopper");
    assert_eq!(loaded.record.birthday(), "1906-12-09");
}

struct FailingRename(FsStore);

impl ContactStore for FailingRename {
    fn list_files(&self, dir: &Path) -> io::Result<Vec<PathBuf>> {
        self.0.list_files(dir)
    }
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        self.0.read_to_string(path)
    }
    fn write(&self, path: &Path, contents: &str) -> io::Result<()> {
        self.0.write(path, contents)
    }
    fn create_new(&self, path: &Path, contents: &str) -> io::Result<()> {
        self.0.create_new(path, contents)
    }
    fn rename(&self, _from: &Path, _to: &Path) -> io::Result<()> {
        Err(io::Error::new(io::ErrorKind::PermissionDenied, "read-only"))
    }
    fn trash(&self, path: &Path) -> io::Result<PathBuf> {
        self.0.trash(path)
    }
    fn exists(&self, path: &Path) -> bool {
        self.0.exists(path)
    }
    fn dir_exists(&self, dir: &Path) -> bool {
        self.0.dir_exists(dir)
    }
    fn create_dir_all(&self, dir: &Path) -> io::Result<()> {
        self.0.create_dir_all(dir)
    }
}

#[test]
fn rename_failure_restores_original_file() {
    let temp = TempDir::new().expect("tempdir");
    let dir = temp.path().join("People");
    fs::create_dir_all(&dir).expect("mkdir");
    let path = dir.join("Grace.md");
    let original = "---\nname: Grace\n---\nbody\n";
    fs::write(&path, original).expect("write");

    let repo = ContactRepository::new(FailingRename(FsStore::new(temp.path())), &dir);
    let err = repo.rename(&path, "Grace Hopper").unwrap_err();
    assert!(matches!(err, StoreError::Io(_)));
    assert_eq!(fs::read_to_string(&path).expect("read"), original);
    assert!(!dir.join("Grace Hopper.md").exists());
}

#[test]
fn trash_and_find_by_name() {
    let temp = TempDir::new().expect("tempdir");
    let repo = open_repository(temp.path(), "People");
    let created = repo.create(new_contact("Ada Lovelace", "")).expect("create");

    assert_eq!(repo.find_by_name("Ada Lovelace").expect("exact"), created.path);
    assert_eq!(repo.find_by_name("ada lovelace").expect("folded"), created.path);
    assert!(matches!(
        repo.find_by_name("Grace").unwrap_err(),
        StoreError::NotFound(_)
    ));

    let trashed = repo.trash(&created.path).expect("trash");
    assert_eq!(trashed, temp.path().join(".trash").join("Ada Lovelace.md"));
    assert!(!created.path.exists());
    assert!(matches!(
        repo.trash(&created.path).unwrap_err(),
        StoreError::NotFound(_)
    ));
    assert!(repo.get_contacts(today()).expect("scan").rows.is_empty());
}
