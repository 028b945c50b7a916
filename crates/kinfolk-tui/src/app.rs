use std::collections::VecDeque;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use kinfolk_config::{DetailTab, Translations};
use kinfolk_core::dto::{ContactDetailDto, ContactRow};
use kinfolk_core::rules::{birthday_reminders, SortColumn, SortConfig};
use kinfolk_store::repo::LoadedContact;
use kinfolk_store::{SearchInput, TableFrame, TableNotice};

use crate::actions::Action;
use crate::forms::Form;
use crate::util::{apply_search_input, apply_text_input};
use crate::views::{ViewRegistry, CONTACT_PAGE, CONTACT_TABLE};

#[derive(Debug, Clone)]
pub enum Mode {
    Table,
    Search,
    Page(PathBuf),
    Form(Form),
    Confirm(ConfirmState),
}

/// The open contact page.
#[derive(Debug, Clone)]
pub struct PageView {
    pub detail: ContactDetailDto,
    pub body: String,
    pub scroll: u16,
    pub field_cursor: usize,
    pub interaction_cursor: usize,
}

#[derive(Debug, Clone)]
pub struct App {
    pub mode: Mode,
    pub show_help: bool,
    pub should_quit: bool,
    pub rows: Vec<ContactRow>,
    pub selected: usize,
    pub sort: SortConfig,
    pub search: SearchInput,
    pub total: usize,
    pub skipped: usize,
    pub missing_folder: Option<PathBuf>,
    pub page: Option<PageView>,
    pub tab: DetailTab,
    pub relationship_types: Vec<String>,
    pub today: NaiveDate,
    pub status: Option<String>,
    pub error: Option<String>,
    pub text: Translations,
    views: ViewRegistry,
    reminders_shown: bool,
    actions: VecDeque<Action>,
    pub(crate) pending_select: Option<PathBuf>,
}

impl App {
    pub fn new(
        text: Translations,
        sort: SortConfig,
        tab: DetailTab,
        relationship_types: Vec<String>,
        today: NaiveDate,
    ) -> Self {
        let views = ViewRegistry::default();
        tracing::debug!(views = ?views.ids(), "registered views");
        let mut app = Self {
            mode: Mode::Table,
            show_help: false,
            should_quit: false,
            rows: Vec::new(),
            selected: 0,
            sort,
            search: SearchInput::default(),
            total: 0,
            skipped: 0,
            missing_folder: None,
            page: None,
            tab,
            relationship_types,
            today,
            status: None,
            error: None,
            text,
            views,
            reminders_shown: false,
            actions: VecDeque::new(),
            pending_select: None,
        };
        app.enqueue(Action::Refresh);
        app
    }

    pub fn enqueue(&mut self, action: Action) {
        self.actions.push_back(action);
    }

    pub fn next_action(&mut self) -> Option<Action> {
        self.actions.pop_front()
    }

    pub fn set_error(&mut self, message: impl Into<String>) {
        self.error = Some(message.into());
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }

    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status = Some(message.into());
    }

    pub fn t<'a>(&'a self, key: &'a str) -> &'a str {
        self.text.t(key)
    }

    pub fn selected_row(&self) -> Option<&ContactRow> {
        self.rows.get(self.selected)
    }

    /// Path of the contact whose page is open, if any.
    pub fn page_path(&self) -> Option<&Path> {
        match &self.mode {
            Mode::Page(path) => Some(path),
            Mode::Form(form) => form.return_to.as_deref(),
            Mode::Confirm(state) => state.return_to.as_deref(),
            _ => None,
        }
    }

    /// Re-reads the folder and, when a page is showing, its contact.
    pub fn request_refresh(&mut self) {
        self.enqueue(Action::Refresh);
        if let Some(path) = self.page_path().map(Path::to_path_buf) {
            self.enqueue(Action::LoadPage(path));
        }
    }

    pub fn apply_frame(&mut self, frame: &TableFrame) {
        self.rows = frame.rows.clone();
        self.sort = frame.sort;
        self.search = frame.search.clone();
        self.total = frame.total;
        self.skipped = frame.skipped;

        if let Some(target) = self.pending_select.take() {
            if let Some(pos) = self.rows.iter().position(|row| row.path == target) {
                self.selected = pos;
            }
        }
        if self.selected >= self.rows.len() {
            self.selected = self.rows.len().saturating_sub(1);
        }

        if !self.reminders_shown {
            self.reminders_shown = true;
            let reminders = birthday_reminders(&self.rows);
            if !reminders.is_empty() {
                self.set_status(reminders.messages().join(" "));
            }
        }
    }

    pub fn apply_notice(&mut self, notice: &TableNotice) {
        match notice {
            TableNotice::FolderMissing(dir) => self.missing_folder = Some(dir.clone()),
            TableNotice::Skipped(files) => {
                for file in files {
                    tracing::warn!(path = %file.path.display(), reason = %file.reason, "skipped file");
                }
            }
        }
    }

    pub fn apply_page(&mut self, loaded: LoadedContact) {
        let detail = ContactDetailDto::build(&loaded.record, &loaded.path, self.today);
        let (scroll, field_cursor, interaction_cursor) = match &self.page {
            Some(previous) if previous.detail.path == loaded.path => (
                previous.scroll,
                previous.field_cursor,
                previous.interaction_cursor,
            ),
            _ => (0, 0, 0),
        };
        let page = PageView {
            field_cursor: field_cursor.min(detail.fields.len().saturating_sub(1)),
            interaction_cursor: interaction_cursor
                .min(detail.interactions.len().saturating_sub(1)),
            scroll,
            body: loaded.body,
            detail,
        };
        self.page = Some(page);
    }

    /// Leaves the page of `path` after its file went away or moved.
    pub fn retarget_page(&mut self, from: &Path, to: Option<PathBuf>) {
        let retarget = |current: &mut PathBuf| {
            if current.as_path() == from {
                match &to {
                    Some(next) => *current = next.clone(),
                    None => return true,
                }
            }
            false
        };
        let close = match &mut self.mode {
            Mode::Page(path) => retarget(path),
            Mode::Form(form) => form.return_to.as_mut().is_some_and(retarget),
            Mode::Confirm(state) => state.return_to.as_mut().is_some_and(retarget),
            _ => false,
        };
        if close {
            self.close_page();
            self.mode = Mode::Table;
        }
    }

    pub fn close_page(&mut self) {
        self.page = None;
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press && key.kind != KeyEventKind::Repeat {
            return;
        }

        if self.show_help {
            if matches!(key.code, KeyCode::Char('?') | KeyCode::Esc) {
                self.show_help = false;
            }
            return;
        }

        if matches!(
            key,
            KeyEvent {
                code: KeyCode::Char('c'),
                modifiers: KeyModifiers::CONTROL,
                ..
            }
        ) {
            self.should_quit = true;
            return;
        }

        if matches!(self.mode, Mode::Table | Mode::Page(_)) {
            match key.code {
                KeyCode::Char('q') => {
                    self.should_quit = true;
                    return;
                }
                KeyCode::Char('?') => {
                    self.show_help = true;
                    return;
                }
                _ => {}
            }
        }

        let mut mode = std::mem::replace(&mut self.mode, Mode::Table);
        match &mut mode {
            Mode::Table => {
                if let Some(next) = self.handle_table_key(key) {
                    mode = next;
                }
            }
            Mode::Search => {
                if let Some(next) = self.handle_search_key(key) {
                    mode = next;
                }
            }
            Mode::Page(path) => {
                let path = path.clone();
                if let Some(next) = self.handle_page_key(key, &path) {
                    mode = next;
                }
            }
            Mode::Form(form) => {
                if let Some(next) = self.handle_form_key(form, key) {
                    mode = next;
                }
            }
            Mode::Confirm(state) => {
                if let Some(next) = self.handle_confirm_key(state, key) {
                    mode = next;
                }
            }
        }
        self.mode = mode;
    }

    fn handle_table_key(&mut self, key: KeyEvent) -> Option<Mode> {
        match key.code {
            KeyCode::Down | KeyCode::Char('j') => self.move_selection(1),
            KeyCode::Up | KeyCode::Char('k') => self.move_selection(-1),
            KeyCode::PageDown => self.move_selection(10),
            KeyCode::PageUp => self.move_selection(-10),
            KeyCode::Home | KeyCode::Char('g') => self.selected = 0,
            KeyCode::End | KeyCode::Char('G') => {
                self.selected = self.rows.len().saturating_sub(1);
            }
            KeyCode::Enter => {
                let path = self.selected_row()?.path.clone();
                return self.open_page(path);
            }
            KeyCode::Char('/') => {
                self.search.set_focused(true);
                self.search.move_end();
                self.enqueue(Action::Search(self.search.clone()));
                return Some(Mode::Search);
            }
            KeyCode::Esc => {
                if !self.search.text().is_empty() {
                    self.search.clear();
                    self.enqueue(Action::Search(self.search.clone()));
                }
            }
            KeyCode::Char('a') => return Some(Mode::Form(Form::add_contact())),
            KeyCode::Char('i') => {
                let path = self.selected_row()?.path.clone();
                return Some(Mode::Form(Form::add_interaction(path, self.today, None)));
            }
            KeyCode::Char('d') => {
                let row = self.selected_row()?;
                let message = self.text.format("delete_confirm", &[("name", row.name.as_str())]);
                let action = ConfirmAction::Trash(row.path.clone());
                return Some(Mode::Confirm(ConfirmState::new(message, action, None)));
            }
            KeyCode::Char(ch @ '1'..='7') => {
                let index = ch as usize - '1' as usize;
                if let Some(column) = SortColumn::ALL.get(index) {
                    self.enqueue(Action::Sort(*column));
                }
            }
            KeyCode::Char('r') => self.enqueue(Action::Refresh),
            _ => {}
        }
        None
    }

    fn handle_search_key(&mut self, key: KeyEvent) -> Option<Mode> {
        match key.code {
            KeyCode::Esc => {
                self.search.clear();
                self.search.set_focused(false);
                self.enqueue(Action::Search(self.search.clone()));
                return Some(Mode::Table);
            }
            KeyCode::Enter | KeyCode::Down | KeyCode::Tab => {
                self.search.set_focused(false);
                self.enqueue(Action::Search(self.search.clone()));
                return Some(Mode::Table);
            }
            _ => {
                apply_search_input(&mut self.search, key);
                self.enqueue(Action::Search(self.search.clone()));
            }
        }
        None
    }

    fn handle_page_key(&mut self, key: KeyEvent, path: &Path) -> Option<Mode> {
        match key.code {
            KeyCode::Esc | KeyCode::Backspace => {
                self.close_page();
                return self.views.open(CONTACT_TABLE, None);
            }
            KeyCode::Tab => {
                self.tab = self.tab.next();
                self.enqueue(Action::SaveTab(self.tab));
            }
            KeyCode::Down | KeyCode::Char('j') => self.move_field_cursor(1),
            KeyCode::Up | KeyCode::Char('k') => self.move_field_cursor(-1),
            KeyCode::Char('J') => self.move_interaction_cursor(1),
            KeyCode::Char('K') => self.move_interaction_cursor(-1),
            KeyCode::PageDown => self.scroll_page(5),
            KeyCode::PageUp => self.scroll_page(-5),
            KeyCode::Char('e') => {
                let (field, value) = self.selected_field()?;
                return Some(Mode::Form(Form::edit_field(path.to_path_buf(), &field, &value)));
            }
            KeyCode::Char('+') => return Some(Mode::Form(Form::add_field(path.to_path_buf()))),
            KeyCode::Char('-') => {
                let (field, _) = self.selected_field()?;
                let message = self.text.format("remove_field_confirm", &[("key", field.as_str())]);
                let action = ConfirmAction::RemoveField {
                    path: path.to_path_buf(),
                    key: field,
                };
                return Some(self.confirm_on_page(message, action, path));
            }
            KeyCode::Char('n') => {
                let notes = self.page.as_ref()?.detail.notes.clone().unwrap_or_default();
                return Some(Mode::Form(Form::notes(path.to_path_buf(), &notes)));
            }
            KeyCode::Char('i') => {
                let target = path.to_path_buf();
                return Some(Mode::Form(Form::add_interaction(
                    target.clone(),
                    self.today,
                    Some(target),
                )));
            }
            KeyCode::Char('E') => {
                let (index, entry) = self.selected_interaction()?;
                return Some(Mode::Form(Form::edit_interaction(
                    path.to_path_buf(),
                    index,
                    &entry,
                )));
            }
            KeyCode::Char('X') => {
                let (index, entry) = self.selected_interaction()?;
                let message = self
                    .text
                    .format("remove_interaction_confirm", &[("date", entry.date.as_str())]);
                let action = ConfirmAction::RemoveInteraction {
                    path: path.to_path_buf(),
                    index,
                };
                return Some(self.confirm_on_page(message, action, path));
            }
            KeyCode::Char('r') => {
                let name = self.page.as_ref()?.detail.name.clone();
                return Some(Mode::Form(Form::rename(path.to_path_buf(), &name)));
            }
            KeyCode::Char('d') => {
                let name = self.page.as_ref()?.detail.name.clone();
                let message = self.text.format("delete_confirm", &[("name", name.as_str())]);
                let action = ConfirmAction::Trash(path.to_path_buf());
                return Some(self.confirm_on_page(message, action, path));
            }
            _ => {}
        }
        None
    }

    fn handle_form_key(&mut self, form: &mut Form, key: KeyEvent) -> Option<Mode> {
        match key.code {
            KeyCode::Esc => return Some(form.return_mode()),
            KeyCode::Char('n') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                form.cycle_relationship(&self.relationship_types);
            }
            KeyCode::Char('s') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                return self.submit_form(form);
            }
            KeyCode::Tab => form.focus_next(),
            KeyCode::BackTab => form.focus_prev(),
            KeyCode::Enter => {
                if form.is_save_focus() {
                    return self.submit_form(form);
                } else if form.is_cancel_focus() {
                    return Some(form.return_mode());
                }
                match form.active_input_mut() {
                    Some(input) if input.multiline => input.value.push('\n'),
                    _ => form.focus_next(),
                }
            }
            _ => {
                if let Some(input) = form.active_input_mut() {
                    apply_text_input(&mut input.value, key);
                }
            }
        }
        None
    }

    fn submit_form(&mut self, form: &Form) -> Option<Mode> {
        match form.to_action() {
            Ok(action) => {
                self.clear_error();
                self.enqueue(action);
                Some(form.return_mode())
            }
            Err(err) => {
                self.set_error(err);
                None
            }
        }
    }

    fn handle_confirm_key(&mut self, state: &mut ConfirmState, key: KeyEvent) -> Option<Mode> {
        match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') => {
                self.enqueue(state.to_action());
                if matches!(state.action, ConfirmAction::Trash(_)) {
                    self.close_page();
                    return Some(Mode::Table);
                }
                return Some(state.return_mode());
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                return Some(state.return_mode());
            }
            _ => {}
        }
        None
    }

    fn open_page(&mut self, path: PathBuf) -> Option<Mode> {
        let mode = self.views.open(CONTACT_PAGE, Some(&path))?;
        if self
            .page
            .as_ref()
            .is_some_and(|page| page.detail.path != path)
        {
            self.close_page();
        }
        self.enqueue(Action::LoadPage(path));
        Some(mode)
    }

    fn confirm_on_page(&self, message: String, action: ConfirmAction, path: &Path) -> Mode {
        Mode::Confirm(ConfirmState::new(
            message,
            action,
            Some(path.to_path_buf()),
        ))
    }

    fn selected_field(&self) -> Option<(String, String)> {
        let page = self.page.as_ref()?;
        page.detail.fields.get(page.field_cursor).cloned()
    }

    fn selected_interaction(&self) -> Option<(usize, kinfolk_core::domain::Interaction)> {
        let page = self.page.as_ref()?;
        let entry = page.detail.interactions.get(page.interaction_cursor)?;
        Some((page.interaction_cursor, entry.clone()))
    }

    fn move_selection(&mut self, delta: i32) {
        self.selected = step(self.selected, delta, self.rows.len());
    }

    fn move_field_cursor(&mut self, delta: i32) {
        if let Some(page) = &mut self.page {
            page.field_cursor = step(page.field_cursor, delta, page.detail.fields.len());
        }
    }

    fn move_interaction_cursor(&mut self, delta: i32) {
        if let Some(page) = &mut self.page {
            page.interaction_cursor =
                step(page.interaction_cursor, delta, page.detail.interactions.len());
        }
    }

    fn scroll_page(&mut self, delta: i32) {
        if let Some(page) = &mut self.page {
            page.scroll = if delta < 0 {
                page.scroll.saturating_sub(delta.unsigned_abs() as u16)
            } else {
                page.scroll.saturating_add(delta as u16)
            };
        }
    }
}

fn step(current: usize, delta: i32, len: usize) -> usize {
    if len == 0 {
        return 0;
    }
    let next = current as i64 + delta as i64;
    next.clamp(0, len as i64 - 1) as usize
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmAction {
    Trash(PathBuf),
    RemoveField { path: PathBuf, key: String },
    RemoveInteraction { path: PathBuf, index: usize },
}

#[derive(Debug, Clone)]
pub struct ConfirmState {
    pub message: String,
    pub action: ConfirmAction,
    pub return_to: Option<PathBuf>,
}

impl ConfirmState {
    pub fn new(message: String, action: ConfirmAction, return_to: Option<PathBuf>) -> Self {
        Self {
            message,
            action,
            return_to,
        }
    }

    pub fn to_action(&self) -> Action {
        match &self.action {
            ConfirmAction::Trash(path) => Action::Trash(path.clone()),
            ConfirmAction::RemoveField { path, key } => Action::RemoveField {
                path: path.clone(),
                key: key.clone(),
            },
            ConfirmAction::RemoveInteraction { path, index } => Action::RemoveInteraction {
                path: path.clone(),
                index: *index,
            },
        }
    }

    fn return_mode(&self) -> Mode {
        match &self.return_to {
            Some(path) => Mode::Page(path.clone()),
            None => Mode::Table,
        }
    }
}
