use crate::commands::{print_json, Context};
use crate::error::invalid_input;
use crate::util::{parse_date_arg, read_text_from_stdin};
use anyhow::Result;
use clap::{Args, Subcommand};
use kinfolk_core::domain::Interaction;
use kinfolk_core::rules::dates::DATE_FORMAT;
use kinfolk_core::CoreError;

#[derive(Debug, Subcommand)]
pub enum InteractionCommand {
    /// Log an interaction (text from stdin when --text is omitted)
    Add(AddInteractionArgs),
    Edit(EditInteractionArgs),
    Rm(RemoveInteractionArgs),
    Ls(ListInteractionsArgs),
}

#[derive(Debug, Args)]
pub struct AddInteractionArgs {
    pub contact: String,
    /// YYYY-MM-DD, defaults to today
    #[arg(long)]
    pub date: Option<String>,
    #[arg(long)]
    pub text: Option<String>,
}

#[derive(Debug, Args)]
pub struct EditInteractionArgs {
    pub contact: String,
    /// Position in the newest-first list, starting at 1
    pub index: usize,
    #[arg(long)]
    pub date: Option<String>,
    #[arg(long)]
    pub text: Option<String>,
}

#[derive(Debug, Args)]
pub struct RemoveInteractionArgs {
    pub contact: String,
    pub index: usize,
}

#[derive(Debug, Args)]
pub struct ListInteractionsArgs {
    pub contact: String,
}

pub fn add_interaction(ctx: &Context<'_>, args: AddInteractionArgs) -> Result<()> {
    let path = ctx.resolve_contact(&args.contact)?;
    let date = match args.date {
        Some(value) => parse_date_arg(&value)?,
        None => ctx.today,
    };
    let text = match args.text {
        Some(value) => value,
        None => read_text_from_stdin()?,
    };
    let entry = Interaction::new(&date.format(DATE_FORMAT).to_string(), &text)?;

    let loaded = ctx.repo.add_interaction(&path, entry.clone())?;
    if ctx.json {
        print_json(&entry)?;
    } else {
        println!(
            "added interaction {} for {} ({} total)",
            entry.date,
            loaded.record.name,
            loaded.record.interactions.len()
        );
    }
    Ok(())
}

pub fn edit_interaction(ctx: &Context<'_>, args: EditInteractionArgs) -> Result<()> {
    if args.date.is_none() && args.text.is_none() {
        return Err(invalid_input("no updates provided"));
    }
    let path = ctx.resolve_contact(&args.contact)?;
    let index = zero_based(args.index)?;
    let current = ctx.repo.list_interactions(&path)?;
    let existing = current.get(index).ok_or(CoreError::InteractionIndex {
        index,
        len: current.len(),
    })?;

    let date = match args.date {
        Some(value) => parse_date_arg(&value)?.format(DATE_FORMAT).to_string(),
        None => existing.date.clone(),
    };
    let text = args.text.unwrap_or_else(|| existing.text.clone());
    let entry = Interaction::new(&date, &text)?;

    ctx.repo.update_interaction(&path, index, entry.clone())?;
    if ctx.json {
        print_json(&entry)?;
    } else {
        println!("updated interaction {}", args.index);
    }
    Ok(())
}

pub fn remove_interaction(ctx: &Context<'_>, args: RemoveInteractionArgs) -> Result<()> {
    let path = ctx.resolve_contact(&args.contact)?;
    let index = zero_based(args.index)?;
    let (removed, _) = ctx.repo.remove_interaction(&path, index)?;
    if ctx.json {
        print_json(&removed)?;
    } else {
        println!("removed interaction {} {}", removed.date, removed.text);
    }
    Ok(())
}

pub fn list_interactions(ctx: &Context<'_>, args: ListInteractionsArgs) -> Result<()> {
    let path = ctx.resolve_contact(&args.contact)?;
    let entries = ctx.repo.list_interactions(&path)?;
    if ctx.json {
        return print_json(&entries);
    }
    for (index, entry) in entries.iter().enumerate() {
        println!("{}. {} {}", index + 1, entry.date, entry.text);
    }
    Ok(())
}

fn zero_based(index: usize) -> Result<usize> {
    index
        .checked_sub(1)
        .ok_or_else(|| invalid_input("interaction index starts at 1"))
}
