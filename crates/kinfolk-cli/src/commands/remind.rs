use crate::commands::{print_json, Context};
use anyhow::Result;
use clap::Args;
use kinfolk_core::dto::ContactRow;
use kinfolk_core::rules::reminders::countdown_text;
use kinfolk_core::rules::{birthday_reminders, BirthdayReminders};
use serde::Serialize;

const NOTIFY_TITLE: &str = "kinfolk";

#[derive(Debug, Args)]
pub struct RemindArgs {
    /// Also list birthdays within this many days
    #[arg(long)]
    pub days: Option<i64>,
}

#[derive(Debug, Serialize)]
struct RemindOutput {
    #[serde(flatten)]
    reminders: BirthdayReminders,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    upcoming: Vec<ContactRow>,
}

pub fn remind(ctx: &Context<'_>, args: RemindArgs) -> Result<()> {
    let scan = ctx.repo.get_contacts(ctx.today)?;
    let reminders = birthday_reminders(&scan.rows);

    let mut upcoming: Vec<ContactRow> = match args.days {
        Some(window) => scan
            .rows
            .into_iter()
            .filter(|row| matches!(row.days_until_birthday, Some(days) if days <= window))
            .collect(),
        None => Vec::new(),
    };
    upcoming.sort_by_key(|row| row.days_until_birthday);

    if ctx.json {
        return print_json(&RemindOutput {
            reminders,
            upcoming,
        });
    }

    for message in reminders.messages() {
        println!("{NOTIFY_TITLE}: {message}");
    }
    for row in &upcoming {
        if let Some(days) = row.days_until_birthday {
            println!("{} ({}): {}", row.name, row.formatted_birthday, countdown_text(days));
        }
    }
    if reminders.is_empty() && upcoming.is_empty() {
        println!("no birthdays coming up");
    }
    Ok(())
}
