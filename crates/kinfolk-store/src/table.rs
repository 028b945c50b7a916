//! Per-view table state: sort order, search input and the rows last shown.
//!
//! A refresh re-reads the whole folder. Only one refresh runs at a time; a request that
//! arrives while one is in flight is dropped, and the next change notification corrects
//! anything it missed.

use crate::error::Result;
use crate::fs::{ContactStore, FsStore};
use crate::repo::{ContactRepository, SkippedFile};
use chrono::NaiveDate;
use kinfolk_core::dto::ContactRow;
use kinfolk_core::rules::{filter_rows, sort_rows, SortColumn, SortConfig};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Search box contents. `caret` counts characters, not bytes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchInput {
    text: String,
    caret: usize,
    focused: bool,
}

impl SearchInput {
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn caret(&self) -> usize {
        self.caret
    }

    pub fn is_focused(&self) -> bool {
        self.focused
    }

    pub fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }

    /// Replaces the text and puts the caret at the end.
    pub fn set_text(&mut self, text: &str) {
        self.text = text.to_string();
        self.caret = self.text.chars().count();
    }

    pub fn clear(&mut self) {
        self.text.clear();
        self.caret = 0;
    }

    pub fn insert(&mut self, ch: char) {
        let at = self.byte_offset(self.caret);
        self.text.insert(at, ch);
        self.caret += 1;
    }

    pub fn backspace(&mut self) {
        if self.caret == 0 {
            return;
        }
        let at = self.byte_offset(self.caret - 1);
        self.text.remove(at);
        self.caret -= 1;
    }

    pub fn delete(&mut self) {
        if self.caret >= self.text.chars().count() {
            return;
        }
        let at = self.byte_offset(self.caret);
        self.text.remove(at);
    }

    /// Removes the word before the caret along with trailing whitespace.
    pub fn delete_word(&mut self) {
        let chars: Vec<char> = self.text.chars().collect();
        let mut start = self.caret;
        while start > 0 && chars[start - 1].is_whitespace() {
            start -= 1;
        }
        while start > 0 && !chars[start - 1].is_whitespace() {
            start -= 1;
        }
        self.text = chars[..start].iter().chain(&chars[self.caret..]).collect();
        self.caret = start;
    }

    pub fn move_left(&mut self) {
        self.caret = self.caret.saturating_sub(1);
    }

    pub fn move_right(&mut self) {
        self.caret = (self.caret + 1).min(self.text.chars().count());
    }

    pub fn move_home(&mut self) {
        self.caret = 0;
    }

    pub fn move_end(&mut self) {
        self.caret = self.text.chars().count();
    }

    fn byte_offset(&self, chars: usize) -> usize {
        self.text
            .char_indices()
            .nth(chars)
            .map(|(offset, _)| offset)
            .unwrap_or(self.text.len())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableNotice {
    FolderMissing(PathBuf),
    Skipped(Vec<SkippedFile>),
}

/// What a presenter gets after each refresh.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableFrame {
    pub rows: Vec<ContactRow>,
    pub sort: SortConfig,
    /// Restored by the presenter so a refresh never steals focus or moves the caret.
    pub search: SearchInput,
    pub total: usize,
    pub skipped: usize,
}

pub trait TablePresenter {
    fn render(&mut self, frame: &TableFrame);

    fn notice(&mut self, _notice: &TableNotice) {}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    Rendered {
        shown: usize,
        total: usize,
        skipped: usize,
    },
    /// Another refresh was in flight; this request was dropped.
    Busy,
}

#[derive(Debug, Default)]
struct ViewState {
    sort: SortConfig,
    search: SearchInput,
    rows: Option<Vec<ContactRow>>,
}

pub struct TableController<S: ContactStore = FsStore> {
    repo: ContactRepository<S>,
    state: Mutex<ViewState>,
    refreshing: AtomicBool,
}

impl<S: ContactStore> TableController<S> {
    pub fn new(repo: ContactRepository<S>, sort: SortConfig) -> Self {
        Self {
            repo,
            state: Mutex::new(ViewState {
                sort,
                ..ViewState::default()
            }),
            refreshing: AtomicBool::new(false),
        }
    }

    pub fn repository(&self) -> &ContactRepository<S> {
        &self.repo
    }

    pub fn is_refreshing(&self) -> bool {
        self.refreshing.load(Ordering::Acquire)
    }

    pub fn refresh(
        &self,
        today: NaiveDate,
        presenter: &mut dyn TablePresenter,
    ) -> Result<RefreshOutcome> {
        let Some(_permit) = RefreshPermit::acquire(&self.refreshing) else {
            tracing::debug!("refresh already in flight, dropping request");
            return Ok(RefreshOutcome::Busy);
        };

        self.lock().rows = None;
        let scan = self.repo.get_contacts(today)?;
        if scan.folder_missing {
            presenter.notice(&TableNotice::FolderMissing(self.repo.dir().to_path_buf()));
        }
        let total = scan.rows.len();
        let skipped = scan.skipped.len();
        if skipped > 0 {
            presenter.notice(&TableNotice::Skipped(scan.skipped));
        }

        let frame = {
            let mut state = self.lock();
            let mut rows = filter_rows(scan.rows, state.search.text());
            sort_rows(&mut rows, state.sort);
            state.rows = Some(rows.clone());
            TableFrame {
                rows,
                sort: state.sort,
                search: state.search.clone(),
                total,
                skipped,
            }
        };
        presenter.render(&frame);

        Ok(RefreshOutcome::Rendered {
            shown: frame.rows.len(),
            total,
            skipped,
        })
    }

    /// Same column flips the direction, another column sorts ascending. The caller
    /// refreshes afterwards.
    pub fn handle_sort(&self, column: SortColumn) -> SortConfig {
        let mut state = self.lock();
        state.sort.toggle(column);
        state.sort
    }

    pub fn sort(&self) -> SortConfig {
        self.lock().sort
    }

    pub fn search(&self) -> SearchInput {
        self.lock().search.clone()
    }

    pub fn set_search(&self, text: &str) {
        self.lock().search.set_text(text);
    }

    pub fn with_search<R>(&self, edit: impl FnOnce(&mut SearchInput) -> R) -> R {
        edit(&mut self.lock().search)
    }

    /// Rows of the last completed refresh; `None` before the first one and while a
    /// refresh is reading files.
    pub fn rows(&self) -> Option<Vec<ContactRow>> {
        self.lock().rows.clone()
    }

    fn lock(&self) -> MutexGuard<'_, ViewState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Held for the duration of one refresh; releasing it on drop covers errors and panics.
struct RefreshPermit<'a> {
    flag: &'a AtomicBool,
}

impl<'a> RefreshPermit<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self { flag })
    }
}

impl Drop for RefreshPermit<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}
