use crate::paths::TRASH_DIR;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// File operations the repository needs. Every call is a point where another writer may
/// have changed the folder.
pub trait ContactStore: Send + Sync {
    /// Regular files directly inside `dir`.
    fn list_files(&self, dir: &Path) -> io::Result<Vec<PathBuf>>;
    fn read_to_string(&self, path: &Path) -> io::Result<String>;
    /// Replaces the file contents in one step.
    fn write(&self, path: &Path, contents: &str) -> io::Result<()>;
    /// Fails with `AlreadyExists` if the file is there.
    fn create_new(&self, path: &Path, contents: &str) -> io::Result<()>;
    fn rename(&self, from: &Path, to: &Path) -> io::Result<()>;
    /// Moves the file somewhere recoverable and returns its new location.
    fn trash(&self, path: &Path) -> io::Result<PathBuf>;
    fn exists(&self, path: &Path) -> bool;
    fn dir_exists(&self, dir: &Path) -> bool;
    fn create_dir_all(&self, dir: &Path) -> io::Result<()>;
}

/// The local filesystem. Trashed files go to `<root>/.trash`.
#[derive(Debug, Clone)]
pub struct FsStore {
    root: PathBuf,
}

impl FsStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn trash_dir(&self) -> PathBuf {
        self.root.join(TRASH_DIR)
    }
}

impl ContactStore for FsStore {
    fn list_files(&self, dir: &Path) -> io::Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            if entry.file_type()?.is_file() {
                files.push(entry.path());
            }
        }
        Ok(files)
    }

    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        fs::read_to_string(path)
    }

    fn write(&self, path: &Path, contents: &str) -> io::Result<()> {
        let parent = path.parent().unwrap_or_else(|| Path::new("."));
        let mut temp = tempfile::NamedTempFile::new_in(parent)?;
        temp.write_all(contents.as_bytes())?;
        temp.as_file().sync_all()?;
        temp.persist(path).map_err(|err| err.error)?;
        tracing::debug!(path = %path.display(), bytes = contents.len(), "wrote contact file");
        Ok(())
    }

    fn create_new(&self, path: &Path, contents: &str) -> io::Result<()> {
        let mut file = OpenOptions::new().write(true).create_new(true).open(path)?;
        file.write_all(contents.as_bytes())?;
        file.sync_all()
    }

    fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
        fs::rename(from, to)
    }

    fn trash(&self, path: &Path) -> io::Result<PathBuf> {
        let trash = self.trash_dir();
        fs::create_dir_all(&trash)?;
        let target = free_trash_slot(&trash, path)?;
        if let Err(err) = fs::rename(path, &target) {
            // Contacts folder on another device than the root.
            tracing::debug!(error = %err, "rename into trash failed, copying instead");
            fs::copy(path, &target)?;
            fs::remove_file(path)?;
        }
        Ok(target)
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn dir_exists(&self, dir: &Path) -> bool {
        dir.is_dir()
    }

    fn create_dir_all(&self, dir: &Path) -> io::Result<()> {
        fs::create_dir_all(dir)
    }
}

/// `name.md`, then `name 1.md`, `name 2.md`, ...
fn free_trash_slot(trash: &Path, path: &Path) -> io::Result<PathBuf> {
    let file_name = path
        .file_name()
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "path has no file name"))?;
    let candidate = trash.join(file_name);
    if !candidate.exists() {
        return Ok(candidate);
    }

    let stem = path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();
    let extension = path
        .extension()
        .map(|ext| format!(".{}", ext.to_string_lossy()))
        .unwrap_or_default();
    let mut counter = 1u32;
    loop {
        let candidate = trash.join(format!("{stem} {counter}{extension}"));
        if !candidate.exists() {
            return Ok(candidate);
        }
        counter += 1;
    }
}
