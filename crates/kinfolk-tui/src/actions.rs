use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use anyhow::Result;
use kinfolk_config::{AppConfig, DetailTab};
use kinfolk_core::domain::field::RELATIONSHIP_KEY;
use kinfolk_core::domain::Interaction;
use kinfolk_core::rules::{local_today, SortColumn};
use kinfolk_store::repo::{LoadedContact, NewContact};
use kinfolk_store::{
    RefreshOutcome, SearchInput, StoreError, TableController, TableFrame, TableNotice,
    TablePresenter,
};

use crate::app::App;

#[derive(Debug, Clone)]
pub enum Action {
    Refresh,
    Search(SearchInput),
    Sort(SortColumn),
    LoadPage(PathBuf),
    SaveTab(DetailTab),
    CreateContact(NewContact),
    AddField {
        path: PathBuf,
        key: String,
        value: String,
    },
    SetField {
        path: PathBuf,
        key: String,
        value: String,
    },
    RemoveField {
        path: PathBuf,
        key: String,
    },
    SetNotes {
        path: PathBuf,
        notes: String,
    },
    AddInteraction {
        path: PathBuf,
        entry: Interaction,
    },
    UpdateInteraction {
        path: PathBuf,
        index: usize,
        entry: Interaction,
    },
    RemoveInteraction {
        path: PathBuf,
        index: usize,
    },
    Rename {
        path: PathBuf,
        name: String,
    },
    Trash(PathBuf),
}

/// What actions run against besides the app state.
pub struct Runtime<'a> {
    pub controller: &'a TableController,
    pub config: &'a mut AppConfig,
    pub config_path: Option<&'a Path>,
}

impl Runtime<'_> {
    fn save_config(&self) -> Result<()> {
        match self.config_path {
            Some(path) => kinfolk_config::save(path, &*self.config)?,
            None => tracing::debug!("no config path, keeping settings in memory"),
        }
        Ok(())
    }

    fn remember_relationship(&mut self, app: &mut App, raw: &str) -> Result<()> {
        if let Some(added) = self.config.register_relationship(raw) {
            tracing::info!(relationship = %added, "new relationship type");
            app.relationship_types = self.config.relationship_types.clone();
            self.save_config()?;
        }
        Ok(())
    }
}

struct AppPresenter<'a> {
    app: &'a mut App,
}

impl TablePresenter for AppPresenter<'_> {
    fn render(&mut self, frame: &TableFrame) {
        self.app.apply_frame(frame);
    }

    fn notice(&mut self, notice: &TableNotice) {
        self.app.apply_notice(notice);
    }
}

pub fn execute_action(app: &mut App, runtime: &mut Runtime<'_>, action: Action) -> Result<()> {
    let controller: &TableController = runtime.controller;
    let repo = controller.repository();
    match action {
        Action::Refresh => refresh(app, controller)?,
        Action::Search(input) => {
            let changed = controller.with_search(|current| {
                let changed = current.text() != input.text();
                *current = input;
                changed
            });
            if changed {
                refresh(app, controller)?;
            } else {
                app.search = controller.search();
            }
        }
        Action::Sort(column) => {
            let sort = controller.handle_sort(column);
            tracing::debug!(column = %sort.column, direction = sort.direction.as_str(), "sort");
            refresh(app, controller)?;
        }
        Action::LoadPage(path) => match repo.load(&path) {
            Ok(loaded) => {
                app.apply_page(loaded);
                app.clear_error();
            }
            Err(err) if is_missing(&err) => {
                app.retarget_page(&path, None);
                app.set_error(format!("contact not found: {}", path.display()));
            }
            Err(err) => return Err(err.into()),
        },
        Action::SaveTab(tab) => {
            runtime.config.default_active_tab = tab;
            runtime.save_config()?;
        }
        Action::CreateContact(input) => {
            let relationship = input.relationship.clone();
            let created = repo.create(input)?;
            if let Some(raw) = relationship {
                runtime.remember_relationship(app, &raw)?;
            }
            let status = format!("{}: {}", app.t("created_contact"), created.record.name);
            app.set_status(status);
            app.pending_select = Some(created.path);
            app.enqueue(Action::Refresh);
        }
        Action::AddField { path, key, value } => {
            let (key, loaded) = repo.add_field_with_value(&path, &key, &value)?;
            if key == RELATIONSHIP_KEY && !value.trim().is_empty() {
                runtime.remember_relationship(app, &value)?;
            }
            after_edit(app, loaded);
        }
        Action::SetField { path, key, value } => {
            let loaded = repo.set_field(&path, &key, &value)?;
            if key == RELATIONSHIP_KEY && !value.trim().is_empty() {
                runtime.remember_relationship(app, &value)?;
            }
            after_edit(app, loaded);
        }
        Action::RemoveField { path, key } => {
            let loaded = repo.remove_field(&path, &key)?;
            app.set_status(format!("Removed {key}"));
            after_edit(app, loaded);
        }
        Action::SetNotes { path, notes } => {
            let loaded = repo.set_notes(&path, &notes)?;
            after_edit(app, loaded);
        }
        Action::AddInteraction { path, entry } => {
            let loaded = repo.add_interaction(&path, entry)?;
            app.set_status(format!(
                "Added interaction for {} ({} total)",
                loaded.record.name,
                loaded.record.interactions.len()
            ));
            after_edit(app, loaded);
        }
        Action::UpdateInteraction { path, index, entry } => {
            let loaded = repo.update_interaction(&path, index, entry)?;
            after_edit(app, loaded);
        }
        Action::RemoveInteraction { path, index } => {
            let (removed, loaded) = repo.remove_interaction(&path, index)?;
            app.set_status(format!("Removed interaction from {}", removed.date));
            after_edit(app, loaded);
        }
        Action::Rename { path, name } => {
            let renamed = repo.rename(&path, &name)?;
            app.retarget_page(&path, Some(renamed.path.clone()));
            let status = format!("{}: {}", app.t("updated_contact_name"), renamed.record.name);
            app.set_status(status);
            after_edit(app, renamed);
        }
        Action::Trash(path) => {
            let trashed = repo.trash(&path)?;
            app.retarget_page(&path, None);
            app.set_status(format!("Moved to {}", trashed.display()));
            app.enqueue(Action::Refresh);
        }
    }
    Ok(())
}

fn refresh(app: &mut App, controller: &TableController) -> Result<()> {
    app.today = local_today();
    app.missing_folder = None;
    let outcome = controller.refresh(app.today, &mut AppPresenter { app: &mut *app })?;
    match outcome {
        RefreshOutcome::Rendered { .. } => app.clear_error(),
        RefreshOutcome::Busy => tracing::debug!("refresh skipped, one already running"),
    }
    Ok(())
}

/// Shows the edited contact when its page is open and keeps it selected in the table.
fn after_edit(app: &mut App, loaded: LoadedContact) {
    app.pending_select = Some(loaded.path.clone());
    if app.page_path() == Some(loaded.path.as_path()) {
        app.apply_page(loaded);
    }
    app.enqueue(Action::Refresh);
}

fn is_missing(err: &StoreError) -> bool {
    match err {
        StoreError::NotFound(_) => true,
        StoreError::Io(io) => io.kind() == ErrorKind::NotFound,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::{execute_action, Action, Runtime};
    use crate::app::{App, Mode};
    use chrono::NaiveDate;
    use kinfolk_config::{AppConfig, DetailTab, Translations};
    use kinfolk_core::domain::Interaction;
    use kinfolk_core::rules::SortConfig;
    use kinfolk_store::repo::NewContact;
    use kinfolk_store::{open_repository, TableController};
    use std::fs;
    use tempfile::TempDir;

    struct Harness {
        _temp: TempDir,
        config_path: std::path::PathBuf,
        controller: TableController,
        config: AppConfig,
        app: App,
    }

    impl Harness {
        fn new() -> Self {
            let temp = TempDir::new().expect("temp dir");
            let config = AppConfig {
                contacts_folder: "People".to_string(),
                ..AppConfig::default()
            };
            let controller = TableController::new(
                open_repository(temp.path(), &config.contacts_folder),
                SortConfig::default(),
            );
            let app = App::new(
                Translations::english(),
                SortConfig::default(),
                DetailTab::Notes,
                config.relationship_types.clone(),
                NaiveDate::from_ymd_opt(2024, 6, 10).expect("date"),
            );
            Self {
                config_path: temp.path().join("config.toml"),
                _temp: temp,
                controller,
                config,
                app,
            }
        }

        fn run(&mut self, action: Action) {
            let mut runtime = Runtime {
                controller: &self.controller,
                config: &mut self.config,
                config_path: Some(self.config_path.as_path()),
            };
            self.app.enqueue(action);
            while let Some(next) = self.app.next_action() {
                execute_action(&mut self.app, &mut runtime, next).expect("action");
            }
        }

        fn create(&mut self, name: &str, relationship: Option<&str>) {
            self.run(Action::CreateContact(NewContact {
                name: name.to_string(),
                relationship: relationship.map(str::to_string),
                ..NewContact::default()
            }));
        }
    }

    #[test]
    fn missing_folder_is_reported_then_created_on_first_contact() {
        let mut h = Harness::new();
        h.run(Action::Refresh);
        assert!(h.app.missing_folder.is_some());
        assert!(h.app.rows.is_empty());

        h.create("Ada", Some("Mentor"));
        assert!(h.app.missing_folder.is_none());
        assert_eq!(h.app.rows.len(), 1);
        assert_eq!(h.app.rows[0].relationship, "mentor");
        assert!(h.app.relationship_types.contains(&"mentor".to_string()));

        let saved = fs::read_to_string(&h.config_path).expect("config saved");
        assert!(saved.contains("\"mentor\""));
    }

    #[test]
    fn page_follows_edits_and_rename() {
        let mut h = Harness::new();
        h.create("Ada", None);
        h.create("Bob", None);
        let path = h.app.rows.iter().find(|row| row.name == "Ada").expect("ada").path.clone();

        h.app.mode = Mode::Page(path.clone());
        h.run(Action::LoadPage(path.clone()));
        assert_eq!(h.app.page.as_ref().expect("page").detail.name, "Ada");

        let entry = Interaction::new("2024-06-01", "Coffee.").expect("entry");
        h.run(Action::AddInteraction {
            path: path.clone(),
            entry,
        });
        let page = h.app.page.as_ref().expect("page");
        assert_eq!(page.detail.interactions.len(), 1);
        let row = h.app.selected_row().expect("selected");
        assert_eq!(row.name, "Ada");
        assert_eq!(row.last_interaction.as_deref(), Some("2024-06-01"));

        h.run(Action::Rename {
            path: path.clone(),
            name: "Ada King".to_string(),
        });
        let renamed = path.with_file_name("Ada King.md");
        assert!(matches!(&h.app.mode, Mode::Page(current) if *current == renamed));
        assert_eq!(h.app.page.as_ref().expect("page").detail.name, "Ada King");
        assert_eq!(h.app.selected_row().expect("selected").name, "Ada King");
    }

    #[test]
    fn rejected_field_value_writes_nothing() {
        let mut h = Harness::new();
        h.create("Ada", None);
        let path = h.app.rows[0].path.clone();
        let before = fs::read_to_string(&path).expect("read");

        let mut runtime = Runtime {
            controller: &h.controller,
            config: &mut h.config,
            config_path: Some(h.config_path.as_path()),
        };
        let result = execute_action(
            &mut h.app,
            &mut runtime,
            Action::AddField {
                path: path.clone(),
                key: "birthday".to_string(),
                value: "someday".to_string(),
            },
        );
        assert!(result.is_err());
        assert_eq!(fs::read_to_string(&path).expect("read"), before);

        h.run(Action::AddField {
            path: path.clone(),
            key: "Github".to_string(),
            value: "ada-l".to_string(),
        });
        assert!(fs::read_to_string(&path).expect("read").contains("github: ada-l\n"));
    }

    #[test]
    fn deleted_file_closes_page() {
        let mut h = Harness::new();
        h.create("Ada", None);
        let path = h.app.rows[0].path.clone();
        h.app.mode = Mode::Page(path.clone());
        h.run(Action::LoadPage(path.clone()));

        fs::remove_file(&path).expect("remove");
        h.run(Action::LoadPage(path));
        assert!(matches!(h.app.mode, Mode::Table));
        assert!(h.app.page.is_none());
        assert!(h.app.error.as_deref().unwrap_or_default().contains("not found"));
    }

    #[test]
    fn trash_moves_file_and_refreshes() {
        let mut h = Harness::new();
        h.create("Ada", None);
        let path = h.app.rows[0].path.clone();
        h.run(Action::Trash(path.clone()));
        assert!(!path.exists());
        assert!(h.app.rows.is_empty());
        assert_eq!(h.app.total, 0);
    }

    #[test]
    fn search_only_refreshes_when_text_changes() {
        let mut h = Harness::new();
        h.create("Ada", None);
        h.create("Bob", None);

        let mut input = h.app.search.clone();
        input.set_text("bo");
        h.run(Action::Search(input.clone()));
        assert_eq!(h.app.rows.len(), 1);
        assert_eq!(h.app.total, 2);

        input.move_home();
        h.run(Action::Search(input));
        assert_eq!(h.app.search.caret(), 0);
        assert_eq!(h.app.search.text(), "bo");
    }

    #[test]
    fn tab_choice_is_saved() {
        let mut h = Harness::new();
        h.run(Action::SaveTab(DetailTab::Markdown));
        assert_eq!(h.config.default_active_tab, DetailTab::Markdown);
        let saved = fs::read_to_string(&h.config_path).expect("config saved");
        assert!(saved.contains("markdown"));
    }
}
