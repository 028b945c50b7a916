use chrono::NaiveDate;
use kinfolk_core::rules::{SortColumn, SortConfig, SortDirection};
use kinfolk_store::repo::NewContact;
use kinfolk_store::{
    open_repository, RefreshOutcome, TableController, TableFrame, TableNotice, TablePresenter,
};
use std::fs;
use tempfile::TempDir;

#[derive(Default)]
struct Recorder {
    frames: Vec<TableFrame>,
    notices: Vec<TableNotice>,
}

impl TablePresenter for Recorder {
    fn render(&mut self, frame: &TableFrame) {
        self.frames.push(frame.clone());
    }

    fn notice(&mut self, notice: &TableNotice) {
        self.notices.push(notice.clone());
    }
}

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 10).unwrap()
}

fn seeded() -> (TempDir, TableController) {
    let temp = TempDir::new().expect("tempdir");
    let repo = open_repository(temp.path(), "People");
    for (name, birthday) in [
        ("Ada", "1990-06-15"),
        ("bob", "1985-06-11"),
        ("Carol", ""),
        ("Dora", "2000-01-01"),
    ] {
        repo.create(NewContact {
            name: name.to_string(),
            birthday: Some(birthday.to_string()),
            ..NewContact::default()
        })
        .expect("create contact");
    }
    let controller = TableController::new(repo, SortConfig::default());
    (temp, controller)
}

fn names(frame: &TableFrame) -> Vec<&str> {
    frame.rows.iter().map(|row| row.name.as_str()).collect()
}

#[test]
fn refresh_sorts_by_days_until_birthday() {
    let (_temp, controller) = seeded();
    let mut recorder = Recorder::default();

    let outcome = controller.refresh(today(), &mut recorder).expect("refresh");
    assert_eq!(
        outcome,
        RefreshOutcome::Rendered {
            shown: 4,
            total: 4,
            skipped: 0
        }
    );
    assert_eq!(names(&recorder.frames[0]), vec!["bob", "Ada", "Dora", "Carol"]);
    assert_eq!(controller.rows().map(|rows| rows.len()), Some(4));
    assert!(!controller.is_refreshing());
}

#[test]
fn sort_toggle_and_search_apply_on_next_refresh() {
    let (_temp, controller) = seeded();
    let mut recorder = Recorder::default();

    let sort = controller.handle_sort(SortColumn::Name);
    assert_eq!(sort, SortConfig::new(SortColumn::Name, SortDirection::Ascending));
    controller.refresh(today(), &mut recorder).expect("refresh");
    assert_eq!(names(&recorder.frames[0]), vec!["Ada", "bob", "Carol", "Dora"]);

    controller.handle_sort(SortColumn::Name);
    controller.with_search(|search| {
        search.set_focused(true);
        search.set_text("o");
        search.move_left();
    });
    controller.refresh(today(), &mut recorder).expect("refresh");

    let frame = &recorder.frames[1];
    assert_eq!(names(frame), vec!["Dora", "Carol", "bob"]);
    assert_eq!(frame.total, 4);
    assert!(frame.search.is_focused());
    assert_eq!(frame.search.caret(), 0);
    assert_eq!(frame.sort.direction, SortDirection::Descending);
}

#[test]
fn refresh_picks_up_external_edits() {
    let (temp, controller) = seeded();
    let mut recorder = Recorder::default();
    controller.refresh(today(), &mut recorder).expect("refresh");

    let dir = temp.path().join("People");
    fs::write(dir.join("Eve.md"), "---\nname: Eve\nbirthday: 1970-06-10\n---\n").expect("write");
    fs::write(dir.join("junk.md"), "no header\n").expect("write");
    fs::remove_file(dir.join("Dora.md")).expect("remove");

    let outcome = controller.refresh(today(), &mut recorder).expect("refresh");
    assert_eq!(
        outcome,
        RefreshOutcome::Rendered {
            shown: 4,
            total: 4,
            skipped: 1
        }
    );
    assert_eq!(names(&recorder.frames[1]), vec!["Eve", "bob", "Ada", "Carol"]);
    assert!(matches!(recorder.notices.as_slice(), [TableNotice::Skipped(files)] if files.len() == 1));
}

#[test]
fn missing_folder_gives_notice_and_empty_table() {
    let temp = TempDir::new().expect("tempdir");
    let controller = TableController::new(
        open_repository(temp.path(), "Nowhere"),
        SortConfig::default(),
    );
    let mut recorder = Recorder::default();
    controller.refresh(today(), &mut recorder).expect("refresh");

    assert!(matches!(
        recorder.notices.as_slice(),
        [TableNotice::FolderMissing(path)] if path.ends_with("Nowhere")
    ));
    assert!(recorder.frames[0].rows.is_empty());
}

struct Reentrant<'a> {
    controller: &'a TableController,
    nested: Option<RefreshOutcome>,
}

impl TablePresenter for Reentrant<'_> {
    fn render(&mut self, _frame: &TableFrame) {
        let mut inner = Recorder::default();
        self.nested = Some(
            self.controller
                .refresh(today(), &mut inner)
                .expect("nested refresh"),
        );
        // The state lock is free while rendering.
        self.controller.set_search("x");
    }
}

#[test]
fn refresh_during_refresh_is_dropped() {
    let (_temp, controller) = seeded();
    let mut presenter = Reentrant {
        controller: &controller,
        nested: None,
    };
    controller.refresh(today(), &mut presenter).expect("refresh");
    assert_eq!(presenter.nested, Some(RefreshOutcome::Busy));
    assert!(!controller.is_refreshing());

    let mut recorder = Recorder::default();
    let outcome = controller.refresh(today(), &mut recorder).expect("refresh");
    assert!(matches!(outcome, RefreshOutcome::Rendered { shown: 0, .. }));
}

struct Panicking;

impl TablePresenter for Panicking {
    fn render(&mut self, _frame: &TableFrame) {
        panic!("render failed");
    }
}

#[test]
fn panicking_presenter_releases_the_flag() {
    let (_temp, controller) = seeded();
    let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        let _ = controller.refresh(today(), &mut Panicking);
    }));
    assert!(result.is_err());
    assert!(!controller.is_refreshing());

    let mut recorder = Recorder::default();
    let outcome = controller.refresh(today(), &mut recorder).expect("refresh");
    assert!(matches!(outcome, RefreshOutcome::Rendered { shown: 4, .. }));
}
