use anyhow::Result;
use chrono::NaiveDate;
use kinfolk_config::{self as config, AppConfig};
use kinfolk_store::repo::ContactRepository;
use kinfolk_store::StoreError;
use serde::Serialize;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::error::not_found;

pub mod completions;
pub mod contacts;
pub mod interactions;
pub mod relationships;
pub mod remind;
pub mod tui;
pub mod watch;

pub struct Context<'a> {
    pub repo: &'a ContactRepository,
    pub json: bool,
    pub config: &'a AppConfig,
    /// Where relationship types are written back; `None` when no config location resolves.
    pub config_path: Option<&'a Path>,
    pub today: NaiveDate,
}

impl Context<'_> {
    /// A path to an existing contact file, or a contact name looked up in the folder.
    pub fn resolve_contact(&self, reference: &str) -> Result<PathBuf> {
        let as_path = Path::new(reference);
        if as_path.extension().is_some_and(|ext| ext == "md") && as_path.is_file() {
            return Ok(as_path.to_path_buf());
        }
        match self.repo.find_by_name(reference) {
            Ok(path) => Ok(path),
            Err(StoreError::NotFound(_)) => Err(not_found(format!("contact {reference}"))),
            Err(err) => Err(err.into()),
        }
    }

    /// Adds `raw` to the configured relationship types and saves the config when it is new.
    pub fn remember_relationship(&self, raw: &str) -> Result<Option<String>> {
        let mut updated = self.config.clone();
        let Some(added) = updated.register_relationship(raw) else {
            return Ok(None);
        };
        match self.config_path {
            Some(path) => {
                config::save(path, &updated)?;
                debug!(relationship = %added, path = %path.display(), "relationship type saved");
            }
            None => warn!(relationship = %added, "no config location, relationship type not saved"),
        }
        Ok(Some(added))
    }
}

pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let mut stdout = io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, value)?;
    writeln!(stdout)?;
    Ok(())
}
