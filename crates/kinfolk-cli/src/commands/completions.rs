use anyhow::Result;
use clap::CommandFactory;
use clap_complete::{generate, Shell};
use std::io;

#[derive(Debug, clap::Args)]
pub struct CompletionsArgs {
    #[arg(value_enum)]
    pub shell: Shell,
    /// Binary name the script completes, for wrappers and aliases
    #[arg(long)]
    pub bin_name: Option<String>,
}

pub fn emit(args: CompletionsArgs) -> Result<()> {
    let mut cmd = crate::Cli::command();
    let name = args
        .bin_name
        .unwrap_or_else(|| cmd.get_name().to_string());
    generate(args.shell, &mut cmd, name, &mut io::stdout().lock());
    Ok(())
}
