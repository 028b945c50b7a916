mod actions;
mod app;
mod forms;
mod ui;
mod util;
mod views;

use std::fs::OpenOptions;
use std::io::{self, Stdout};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use anyhow::{Context as _, Result};
use clap::Parser;
use crossterm::event::{self, DisableFocusChange, EnableFocusChange, Event};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use kinfolk_config::{AppConfig, DetailTab, Translations};
use kinfolk_core::rules::{local_today, SortConfig};
use kinfolk_store::watch::{watch_folder, WatchHandle, DEFAULT_DEBOUNCE};
use kinfolk_store::{open_repository, TableController};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tracing_subscriber::EnvFilter;

use crate::actions::{execute_action, Runtime};
use crate::app::App;

const LOG_ENV: &str = "KINFOLK_LOG";

#[derive(Debug, Parser)]
#[command(name = "kinfolk-tui", version, about = "kinfolk TUI")]
struct Args {
    /// Directory the contacts folder lives in
    #[arg(long)]
    root: Option<PathBuf>,
    /// Contacts folder name, overrides the config
    #[arg(long)]
    folder: Option<String>,
    #[arg(long)]
    config: Option<PathBuf>,
    /// Tab shown first on a contact page: notes, interactions or markdown
    #[arg(long)]
    tab: Option<String>,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging()?;

    let mut config = kinfolk_config::load(args.config.clone())?;
    let config_path = kinfolk_config::resolve_config_path(args.config.clone()).ok();
    let text = load_translations(&config);

    let root = match args.root.clone().or_else(|| config.root.clone()) {
        Some(root) => root,
        None => std::env::current_dir().context("resolve working directory")?,
    };
    let folder = args
        .folder
        .clone()
        .unwrap_or_else(|| config.contacts_folder.clone());
    let tab = match args.tab.as_deref() {
        Some(raw) => DetailTab::from_key(raw)
            .with_context(|| format!("unknown tab {raw:?}, expected notes|interactions|markdown"))?,
        None => config.default_active_tab,
    };

    let sort = SortConfig::new(config.default_sort_column, config.default_sort_direction);
    let controller = TableController::new(open_repository(&root, &folder), sort);
    let mut app = App::new(
        text,
        sort,
        tab,
        config.relationship_types.clone(),
        local_today(),
    );
    tracing::info!(folder = %controller.repository().dir().display(), "starting");

    let mut runtime = Runtime {
        controller: &controller,
        config: &mut config,
        config_path: config_path.as_deref(),
    };
    let mut terminal = TerminalGuard::new()?;
    run_app(&mut terminal, &mut runtime, &mut app)
}

fn init_logging() -> Result<()> {
    let Some(path) = std::env::var_os(LOG_ENV) else {
        return Ok(());
    };
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("open log file {}", Path::new(&path).display()))?;
    let filter = EnvFilter::try_from_env("RUST_LOG").unwrap_or_else(|_| EnvFilter::new("debug"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

fn load_translations(config: &AppConfig) -> Translations {
    let dir = match kinfolk_config::config_dir() {
        Ok(dir) => dir,
        Err(err) => {
            tracing::warn!(error = %err, "no config directory, using English");
            return Translations::english();
        }
    };
    Translations::load(&dir, &config.language).unwrap_or_else(|err| {
        tracing::warn!(error = %err, language = %config.language, "failed to load translations");
        Translations::english()
    })
}

/// Subscribes to the contacts folder once it exists. A failed attempt is not retried.
struct FolderWatch {
    tx: Sender<()>,
    rx: Receiver<()>,
    _handle: Option<WatchHandle>,
    attempted: bool,
}

impl FolderWatch {
    fn new() -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            tx,
            rx,
            _handle: None,
            attempted: false,
        }
    }

    fn ensure(&mut self, dir: &Path) {
        if self.attempted || !dir.is_dir() {
            return;
        }
        self.attempted = true;
        let tx = self.tx.clone();
        match watch_folder(dir, DEFAULT_DEBOUNCE, move || {
            let _ = tx.send(());
        }) {
            Ok(handle) => self._handle = Some(handle),
            Err(err) => tracing::warn!(error = %err, "cannot watch contacts folder"),
        }
    }

    /// True when at least one change arrived since the last call.
    fn changed(&self) -> bool {
        let mut changed = false;
        while self.rx.try_recv().is_ok() {
            changed = true;
        }
        changed
    }
}

fn run_app(terminal: &mut TerminalGuard, runtime: &mut Runtime<'_>, app: &mut App) -> Result<()> {
    let tick_rate = Duration::from_millis(200);
    let mut last_tick = Instant::now();
    let mut watch = FolderWatch::new();

    loop {
        watch.ensure(runtime.controller.repository().dir());
        if watch.changed() {
            app.request_refresh();
        }

        while let Some(action) = app.next_action() {
            if let Err(err) = execute_action(app, runtime, action) {
                tracing::warn!(error = %err, "action failed");
                app.set_error(err.to_string());
            }
        }

        terminal.terminal_mut().draw(|frame| ui::draw(frame, app))?;

        if app.should_quit {
            break;
        }

        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or(Duration::from_secs(0));
        if event::poll(timeout)? {
            match event::read()? {
                Event::Key(key) => app.handle_key(key),
                Event::FocusGained => app.request_refresh(),
                _ => {}
            }
        }

        if last_tick.elapsed() >= tick_rate {
            last_tick = Instant::now();
        }
    }

    Ok(())
}

struct TerminalGuard {
    terminal: Terminal<CrosstermBackend<Stdout>>,
}

impl TerminalGuard {
    fn new() -> Result<Self> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableFocusChange)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;
        terminal.clear()?;

        let original_hook = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            let _ = restore_terminal();
            original_hook(info);
        }));

        Ok(Self { terminal })
    }

    fn terminal_mut(&mut self) -> &mut Terminal<CrosstermBackend<Stdout>> {
        &mut self.terminal
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = restore_terminal();
    }
}

fn restore_terminal() -> Result<()> {
    disable_raw_mode()?;
    execute!(io::stdout(), DisableFocusChange, LeaveAlternateScreen)?;
    Ok(())
}
