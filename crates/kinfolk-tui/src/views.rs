use std::collections::HashMap;
use std::path::Path;

use crate::app::Mode;

pub const CONTACT_TABLE: &str = "contact-table";
pub const CONTACT_PAGE: &str = "contact-page";

/// Builds the screen for a view id. `target` is the contact file for per-contact views.
pub type ViewConstructor = fn(Option<&Path>) -> Option<Mode>;

/// Routes stable view ids to the screens that render them.
#[derive(Debug, Clone)]
pub struct ViewRegistry {
    views: HashMap<&'static str, ViewConstructor>,
}

impl ViewRegistry {
    pub fn empty() -> Self {
        Self {
            views: HashMap::new(),
        }
    }

    /// Returns the constructor previously registered under `id`, if any.
    pub fn register(&mut self, id: &'static str, view: ViewConstructor) -> Option<ViewConstructor> {
        self.views.insert(id, view)
    }

    pub fn open(&self, id: &str, target: Option<&Path>) -> Option<Mode> {
        let view = self.views.get(id)?;
        view(target)
    }

    pub fn ids(&self) -> Vec<&'static str> {
        let mut ids: Vec<&'static str> = self.views.keys().copied().collect();
        ids.sort_unstable();
        ids
    }
}

impl Default for ViewRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();
        registry.register(CONTACT_TABLE, contact_table);
        registry.register(CONTACT_PAGE, contact_page);
        registry
    }
}

fn contact_table(_target: Option<&Path>) -> Option<Mode> {
    Some(Mode::Table)
}

fn contact_page(target: Option<&Path>) -> Option<Mode> {
    target.map(|path| Mode::Page(path.to_path_buf()))
}
