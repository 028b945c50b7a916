use crate::error::Result;
use crate::fs::ContactStore;
use crate::repo::contacts::{ContactRepository, LoadedContact};
use kinfolk_core::domain::Interaction;
use std::path::Path;

/// Interaction log edits. Each call re-reads the file, so the last writer wins.
impl<S: ContactStore> ContactRepository<S> {
    pub fn add_interaction(&self, path: &Path, entry: Interaction) -> Result<LoadedContact> {
        self.modify(path, |record| {
            record.interactions.add(entry);
            Ok(())
        })
        .map(|(_, loaded)| loaded)
    }

    /// `index` refers to the newest-first order shown to the user.
    pub fn update_interaction(
        &self,
        path: &Path,
        index: usize,
        entry: Interaction,
    ) -> Result<LoadedContact> {
        self.modify(path, |record| {
            record.interactions.sort_newest_first();
            record.interactions.update(index, entry)
        })
        .map(|(_, loaded)| loaded)
    }

    pub fn remove_interaction(&self, path: &Path, index: usize) -> Result<(Interaction, LoadedContact)> {
        self.modify(path, |record| {
            record.interactions.sort_newest_first();
            record.interactions.remove(index)
        })
    }

    pub fn list_interactions(&self, path: &Path) -> Result<Vec<Interaction>> {
        let mut loaded = self.load(path)?;
        loaded.record.interactions.sort_newest_first();
        Ok(loaded.record.interactions.into_entries())
    }
}
