pub mod error;
pub mod fs;
pub mod paths;
pub mod repo;
pub mod table;
pub mod watch;

use crate::fs::FsStore;
use crate::repo::ContactRepository;
use std::path::Path;

pub use error::{Result, StoreError, StoreErrorKind};
pub use table::{RefreshOutcome, SearchInput, TableController, TableFrame, TableNotice, TablePresenter};

/// Repository over the contacts folder `folder` resolved against `root`.
pub fn open_repository(root: &Path, folder: &str) -> ContactRepository<FsStore> {
    let dir = paths::contacts_dir(root, folder);
    ContactRepository::new(FsStore::new(root), dir)
}
