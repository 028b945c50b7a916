use crate::commands::contacts::{reopen, report_notice};
use crate::commands::Context;
use crate::error::not_found;
use crate::util::{format_row, header_line};
use anyhow::Result;
use clap::Args;
use kinfolk_core::rules::{local_today, SortConfig};
use kinfolk_store::watch::{watch_folder, DEFAULT_DEBOUNCE};
use kinfolk_store::{RefreshOutcome, TableController, TableFrame, TableNotice, TablePresenter};
use std::io::{self, Write};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tracing::{debug, warn};

#[derive(Debug, Args)]
pub struct WatchArgs {
    /// Quiet period before a burst of file changes triggers a refresh
    #[arg(long, default_value_t = DEFAULT_DEBOUNCE.as_millis() as u64)]
    pub debounce_ms: u64,
    #[arg(long)]
    pub filter: Option<String>,
}

/// Reprints the whole table on every refresh.
struct PrintTable {
    json: bool,
}

impl TablePresenter for PrintTable {
    fn render(&mut self, frame: &TableFrame) {
        let mut stdout = io::stdout().lock();
        let result = if self.json {
            serde_json::to_writer(&mut stdout, &frame.rows)
                .map_err(io::Error::from)
                .and_then(|()| writeln!(stdout))
        } else {
            write_table(&mut stdout, frame)
        };
        if let Err(err) = result.and_then(|()| stdout.flush()) {
            warn!(error = %err, "failed to print table");
        }
    }

    fn notice(&mut self, notice: &TableNotice) {
        report_notice(notice);
    }
}

fn write_table(out: &mut impl Write, frame: &TableFrame) -> io::Result<()> {
    writeln!(
        out,
        "-- {} of {} contacts, sorted by {} {}",
        frame.rows.len(),
        frame.total,
        frame.sort.column,
        frame.sort.direction.as_str()
    )?;
    writeln!(out, "{}", header_line())?;
    for row in &frame.rows {
        writeln!(out, "{}", format_row(row))?;
    }
    Ok(())
}

pub fn watch(ctx: &Context<'_>, args: WatchArgs) -> Result<()> {
    let dir = ctx.repo.dir().to_path_buf();
    if !dir.is_dir() {
        return Err(not_found(format!("contacts folder {}", dir.display())));
    }

    let sort = SortConfig::new(
        ctx.config.default_sort_column,
        ctx.config.default_sort_direction,
    );
    let controller = Arc::new(TableController::new(reopen(ctx.repo), sort));
    if let Some(filter) = &args.filter {
        controller.set_search(filter);
    }
    let json = ctx.json;
    controller.refresh(ctx.today, &mut PrintTable { json })?;

    let watched = Arc::clone(&controller);
    let _handle = watch_folder(&dir, Duration::from_millis(args.debounce_ms), move || {
        match watched.refresh(local_today(), &mut PrintTable { json }) {
            Ok(RefreshOutcome::Busy) => debug!("refresh skipped, one already running"),
            Ok(RefreshOutcome::Rendered { .. }) => {}
            Err(err) => warn!(error = %err, "refresh failed"),
        }
    })?;

    eprintln!("watching {} (ctrl-c to stop)", dir.display());
    loop {
        thread::park();
    }
}
