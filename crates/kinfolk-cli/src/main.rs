mod commands;
mod error;
mod util;

use anyhow::{Context as _, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::debug;

use crate::commands::{
    completions, contacts, interactions, relationships, remind, tui, watch, Context,
};
use crate::error::{exit_code_for, report_error};
use crate::util::{parse_date_arg, resolve_root};
use kinfolk_config as config;
use kinfolk_core::rules::local_today;
use kinfolk_store::open_repository;

#[derive(Debug, Parser)]
#[command(name = "kinfolk", version, about = "kinfolk CLI")]
pub(crate) struct Cli {
    /// Vault root holding the contacts folder (defaults to config `root`, then the cwd).
    #[arg(long, global = true)]
    root: Option<PathBuf>,
    /// Contacts folder name under the root.
    #[arg(long, global = true)]
    folder: Option<String>,
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[arg(long, global = true)]
    json: bool,
    #[arg(long, short, global = true)]
    verbose: bool,
    /// Evaluate dates as if today were YYYY-MM-DD.
    #[arg(long, global = true, hide = true)]
    today: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Generate shell completions
    Completions(completions::CompletionsArgs),
    #[command(name = "add-contact")]
    AddContact(contacts::AddContactArgs),
    #[command(name = "edit-contact")]
    EditContact(contacts::EditContactArgs),
    #[command(name = "add-field")]
    AddField(contacts::AddFieldArgs),
    #[command(name = "rm-field")]
    RemoveField(contacts::RemoveFieldArgs),
    Notes(contacts::NotesArgs),
    Rename(contacts::RenameArgs),
    Show(contacts::ShowArgs),
    List(contacts::ListArgs),
    Delete(contacts::DeleteArgs),
    #[command(subcommand)]
    Interaction(interactions::InteractionCommand),
    #[command(subcommand)]
    Relationship(relationships::RelationshipCommand),
    Remind(remind::RemindArgs),
    Watch(watch::WatchArgs),
    Tui(tui::TuiArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let verbose = cli.verbose;
    init_logging(verbose);
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            report_error(&err, verbose);
            exit_code_for(&err)
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let Cli {
        root,
        folder,
        config: config_path,
        json,
        verbose,
        today,
        command,
    } = cli;

    match command {
        Command::Tui(args) => tui::launch(root, folder, config_path, args, verbose),
        Command::Completions(args) => completions::emit(args),
        command => {
            let app_config = config::load(config_path.clone()).with_context(|| "load config")?;
            let saved_config_path = match config::resolve_config_path(config_path) {
                Ok(path) => {
                    if path.exists() {
                        debug!(path = %path.display(), "config resolved");
                    } else {
                        debug!(path = %path.display(), "config missing, using defaults");
                    }
                    Some(path)
                }
                Err(err) => {
                    debug!(error = %err, "config unavailable");
                    None
                }
            };

            let root = resolve_root(root, &app_config)?;
            let folder = folder.unwrap_or_else(|| app_config.contacts_folder.clone());
            let repo = open_repository(&root, &folder);
            debug!(dir = %repo.dir().display(), "contacts folder resolved");

            let today = match today {
                Some(raw) => parse_date_arg(&raw)?,
                None => local_today(),
            };

            let ctx = Context {
                repo: &repo,
                json,
                config: &app_config,
                config_path: saved_config_path.as_deref(),
                today,
            };

            match command {
                Command::AddContact(args) => contacts::add_contact(&ctx, args),
                Command::EditContact(args) => contacts::edit_contact(&ctx, args),
                Command::AddField(args) => contacts::add_field(&ctx, args),
                Command::RemoveField(args) => contacts::remove_field(&ctx, args),
                Command::Notes(args) => contacts::notes(&ctx, args),
                Command::Rename(args) => contacts::rename_contact(&ctx, args),
                Command::Show(args) => contacts::show_contact(&ctx, args),
                Command::List(args) => contacts::list_contacts(&ctx, args),
                Command::Delete(args) => contacts::delete_contact(&ctx, args),
                Command::Interaction(cmd) => match cmd {
                    interactions::InteractionCommand::Add(args) => {
                        interactions::add_interaction(&ctx, args)
                    }
                    interactions::InteractionCommand::Edit(args) => {
                        interactions::edit_interaction(&ctx, args)
                    }
                    interactions::InteractionCommand::Rm(args) => {
                        interactions::remove_interaction(&ctx, args)
                    }
                    interactions::InteractionCommand::Ls(args) => {
                        interactions::list_interactions(&ctx, args)
                    }
                },
                Command::Relationship(cmd) => match cmd {
                    relationships::RelationshipCommand::Ls => {
                        relationships::list_relationships(&ctx)
                    }
                    relationships::RelationshipCommand::Add(args) => {
                        relationships::add_relationship(&ctx, args)
                    }
                },
                Command::Remind(args) => remind::remind(&ctx, args),
                Command::Watch(args) => watch::watch(&ctx, args),
                Command::Tui(_) => unreachable!("tui command handled before repository setup"),
                Command::Completions(_) => {
                    unreachable!("completions command handled before repository setup")
                }
            }
        }
    }
}

fn init_logging(verbose: bool) {
    use tracing_subscriber::{fmt, EnvFilter};
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .try_init();
}
