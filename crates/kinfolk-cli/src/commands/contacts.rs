use crate::commands::{print_json, Context};
use crate::error::invalid_input;
use crate::util::{format_row, header_line, read_text_from_stdin};
use anyhow::Result;
use clap::{ArgAction, Args};
use kinfolk_core::domain::field::{
    ADDRESS_KEY, BIRTHDAY_KEY, EMAIL_KEY, PHONE_KEY, RELATIONSHIP_KEY,
};
use kinfolk_core::dto::ContactDetailDto;
use kinfolk_core::rules::reminders::countdown_text;
use kinfolk_core::rules::{SortColumn, SortConfig, SortDirection};
use kinfolk_store::repo::{ContactRepository, LoadedContact, NewContact};
use kinfolk_store::{TableController, TableFrame, TableNotice, TablePresenter};

#[derive(Debug, Args)]
pub struct AddContactArgs {
    #[arg(long)]
    pub name: String,
    /// YYYY-MM-DD
    #[arg(long)]
    pub birthday: Option<String>,
    #[arg(long)]
    pub relationship: Option<String>,
    #[arg(long)]
    pub email: Option<String>,
    #[arg(long)]
    pub phone: Option<String>,
    #[arg(long)]
    pub address: Option<String>,
}

#[derive(Debug, Args)]
pub struct EditContactArgs {
    /// Contact name or path to its file
    pub contact: String,
    #[arg(long)]
    pub birthday: Option<String>,
    #[arg(long)]
    pub relationship: Option<String>,
    #[arg(long)]
    pub email: Option<String>,
    #[arg(long)]
    pub phone: Option<String>,
    #[arg(long)]
    pub address: Option<String>,
    /// Set any header field, KEY=VALUE
    #[arg(long = "set", value_name = "KEY=VALUE")]
    pub set: Vec<String>,
}

#[derive(Debug, Args)]
pub struct AddFieldArgs {
    pub contact: String,
    pub key: String,
    /// Initial value, empty when omitted
    #[arg(long)]
    pub value: Option<String>,
}

#[derive(Debug, Args)]
pub struct RemoveFieldArgs {
    pub contact: String,
    pub key: String,
}

#[derive(Debug, Args)]
pub struct NotesArgs {
    pub contact: String,
    /// Replace the notes; `-` reads them from stdin
    #[arg(long)]
    pub set: Option<String>,
}

#[derive(Debug, Args)]
pub struct RenameArgs {
    pub contact: String,
    pub new_name: String,
}

#[derive(Debug, Args)]
pub struct ShowArgs {
    pub contact: String,
}

#[derive(Debug, Args)]
pub struct ListArgs {
    #[arg(long)]
    pub sort: Option<SortColumn>,
    #[arg(long, action = ArgAction::SetTrue)]
    pub desc: bool,
    #[arg(long, action = ArgAction::SetTrue, conflicts_with = "desc")]
    pub asc: bool,
    /// Case-insensitive substring of the name
    #[arg(long)]
    pub filter: Option<String>,
}

#[derive(Debug, Args)]
pub struct DeleteArgs {
    pub contact: String,
    /// Confirm moving the file to the trash folder
    #[arg(long)]
    pub yes: bool,
}

pub fn add_contact(ctx: &Context<'_>, args: AddContactArgs) -> Result<()> {
    let relationship = args.relationship.clone();
    let created = ctx.repo.create(NewContact {
        name: args.name,
        birthday: args.birthday,
        relationship: args.relationship,
        email: args.email,
        phone: args.phone,
        address: args.address,
    })?;
    if let Some(raw) = relationship.filter(|value| !value.trim().is_empty()) {
        ctx.remember_relationship(&raw)?;
    }

    if ctx.json {
        print_json(&detail(ctx, &created))?;
    } else {
        println!("created {} {}", created.record.name, created.path.display());
    }
    Ok(())
}

pub fn edit_contact(ctx: &Context<'_>, args: EditContactArgs) -> Result<()> {
    let path = ctx.resolve_contact(&args.contact)?;

    let mut updates: Vec<(String, String)> = Vec::new();
    let named = [
        (BIRTHDAY_KEY, args.birthday),
        (RELATIONSHIP_KEY, args.relationship),
        (EMAIL_KEY, args.email),
        (PHONE_KEY, args.phone),
        (ADDRESS_KEY, args.address),
    ];
    for (key, value) in named {
        if let Some(value) = value {
            updates.push((key.to_string(), value));
        }
    }
    for pair in &args.set {
        updates.push(parse_key_value(pair)?);
    }
    if updates.is_empty() {
        return Err(invalid_input("no updates provided"));
    }

    let loaded = ctx.repo.set_fields(&path, &updates)?;
    for (key, value) in &updates {
        if key == RELATIONSHIP_KEY && !value.trim().is_empty() {
            ctx.remember_relationship(value)?;
        }
    }

    if ctx.json {
        print_json(&detail(ctx, &loaded))?;
    } else {
        println!("updated {}", loaded.record.name);
    }
    Ok(())
}

pub fn add_field(ctx: &Context<'_>, args: AddFieldArgs) -> Result<()> {
    let path = ctx.resolve_contact(&args.contact)?;
    let (key, loaded) = match &args.value {
        Some(value) => ctx.repo.add_field_with_value(&path, &args.key, value)?,
        None => ctx.repo.add_field(&path, &args.key)?,
    };
    if ctx.json {
        print_json(&detail(ctx, &loaded))?;
    } else {
        println!("added field {} to {}", key, loaded.record.name);
    }
    Ok(())
}

pub fn remove_field(ctx: &Context<'_>, args: RemoveFieldArgs) -> Result<()> {
    let path = ctx.resolve_contact(&args.contact)?;
    let loaded = ctx.repo.remove_field(&path, &args.key)?;
    if ctx.json {
        print_json(&detail(ctx, &loaded))?;
    } else {
        println!("removed field {} from {}", args.key.trim(), loaded.record.name);
    }
    Ok(())
}

pub fn notes(ctx: &Context<'_>, args: NotesArgs) -> Result<()> {
    let path = ctx.resolve_contact(&args.contact)?;
    let loaded = match args.set {
        Some(text) => {
            let text = if text == "-" {
                read_text_from_stdin()?
            } else {
                text
            };
            ctx.repo.set_notes(&path, &text)?
        }
        None => ctx.repo.load(&path)?,
    };

    if ctx.json {
        print_json(&loaded.record.notes)?;
    } else if let Some(notes) = &loaded.record.notes {
        println!("{notes}");
    }
    Ok(())
}

pub fn rename_contact(ctx: &Context<'_>, args: RenameArgs) -> Result<()> {
    let path = ctx.resolve_contact(&args.contact)?;
    let renamed = ctx.repo.rename(&path, &args.new_name)?;
    if ctx.json {
        print_json(&detail(ctx, &renamed))?;
    } else {
        println!("renamed {} {}", renamed.record.name, renamed.path.display());
    }
    Ok(())
}

pub fn show_contact(ctx: &Context<'_>, args: ShowArgs) -> Result<()> {
    let path = ctx.resolve_contact(&args.contact)?;
    let loaded = ctx.repo.load(&path)?;
    let dto = detail(ctx, &loaded);

    if ctx.json {
        return print_json(&dto);
    }

    println!("{}", dto.name);
    println!("file: {}", dto.path.display());
    if let Some(age) = &dto.detailed_age {
        println!("age: {age}");
    }
    if let Some(days) = dto.days_until_birthday {
        println!("birthday: {} ({})", dto.formatted_birthday, countdown_text(days));
    }
    if let Some(almanac) = &dto.almanac {
        println!(
            "zodiac: {}  chinese zodiac: {}  season: {}  birthstone: {}",
            almanac.zodiac, almanac.chinese_zodiac, almanac.season, almanac.birthstone
        );
    }
    for (key, value) in &dto.fields {
        println!("{key}: {value}");
    }
    if !dto.interactions.is_empty() {
        println!("interactions:");
        for (index, entry) in dto.interactions.iter().enumerate() {
            println!("  {}. {} {}", index + 1, entry.date, entry.text);
        }
    }
    if let Some(notes) = &dto.notes {
        println!("notes:");
        for line in notes.lines() {
            println!("  {line}");
        }
    }
    Ok(())
}

pub fn list_contacts(ctx: &Context<'_>, args: ListArgs) -> Result<()> {
    let mut sort = SortConfig::new(
        ctx.config.default_sort_column,
        ctx.config.default_sort_direction,
    );
    if let Some(column) = args.sort {
        sort.column = column;
    }
    if args.desc {
        sort.direction = SortDirection::Descending;
    } else if args.asc {
        sort.direction = SortDirection::Ascending;
    }

    let controller = TableController::new(reopen(ctx.repo), sort);
    if let Some(filter) = &args.filter {
        controller.set_search(filter);
    }
    let mut collected = CollectFrame::default();
    controller.refresh(ctx.today, &mut collected)?;
    let Some(frame) = collected.frame else {
        return Ok(());
    };

    if ctx.json {
        return print_json(&frame.rows);
    }
    if frame.rows.is_empty() {
        println!("no contacts");
        return Ok(());
    }
    println!("{}", header_line());
    for row in &frame.rows {
        println!("{}", format_row(row));
    }
    Ok(())
}

pub fn delete_contact(ctx: &Context<'_>, args: DeleteArgs) -> Result<()> {
    let path = ctx.resolve_contact(&args.contact)?;
    if !args.yes {
        return Err(invalid_input(format!(
            "refusing to delete {} without --yes",
            path.display()
        )));
    }
    let trashed = ctx.repo.trash(&path)?;
    if ctx.json {
        print_json(&trashed)?;
    } else {
        println!("moved {} to {}", path.display(), trashed.display());
    }
    Ok(())
}

fn detail(ctx: &Context<'_>, loaded: &LoadedContact) -> ContactDetailDto {
    ContactDetailDto::build(&loaded.record, &loaded.path, ctx.today)
}

fn parse_key_value(raw: &str) -> Result<(String, String)> {
    match raw.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.to_string()))
        }
        _ => Err(invalid_input(format!("expected KEY=VALUE, got {raw:?}"))),
    }
}

/// A second repository over the same folder, owned by a controller.
pub(crate) fn reopen(repo: &ContactRepository) -> ContactRepository {
    ContactRepository::new(repo.store().clone(), repo.dir())
}

/// Presenter for one-shot commands: keeps the frame, reports notices on stderr.
#[derive(Default)]
pub(crate) struct CollectFrame {
    pub frame: Option<TableFrame>,
}

impl TablePresenter for CollectFrame {
    fn render(&mut self, frame: &TableFrame) {
        self.frame = Some(frame.clone());
    }

    fn notice(&mut self, notice: &TableNotice) {
        report_notice(notice);
    }
}

pub(crate) fn report_notice(notice: &TableNotice) {
    match notice {
        TableNotice::FolderMissing(dir) => {
            eprintln!("contacts folder not found: {}", dir.display());
        }
        TableNotice::Skipped(files) => {
            eprintln!("skipped {} file(s) without a usable header", files.len());
            for file in files {
                tracing::debug!(path = %file.path.display(), reason = %file.reason, "skipped");
            }
        }
    }
}
