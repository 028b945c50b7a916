use anyhow::Result;
use clap::Args;
use kinfolk_config::DetailTab;
use std::env;
use std::path::PathBuf;
use std::process::Command;

#[derive(Debug, Args)]
pub struct TuiArgs {
    /// Detail tab to open contacts on, overriding the saved one
    #[arg(long, value_enum)]
    pub tab: Option<TabArg>,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum TabArg {
    Notes,
    Interactions,
    Markdown,
}

impl From<TabArg> for DetailTab {
    fn from(tab: TabArg) -> Self {
        match tab {
            TabArg::Notes => DetailTab::Notes,
            TabArg::Interactions => DetailTab::Interactions,
            TabArg::Markdown => DetailTab::Markdown,
        }
    }
}

pub fn launch(
    root: Option<PathBuf>,
    folder: Option<String>,
    config_path: Option<PathBuf>,
    args: TuiArgs,
    verbose: bool,
) -> Result<()> {
    let mut command = build_command(root, folder, config_path, args.tab);
    if verbose {
        eprintln!("exec: {:?}", command);
    }

    #[cfg(unix)]
    {
        use std::os::unix::process::CommandExt;
        let err = command.exec();
        Err(exec_error(err))
    }

    #[cfg(not(unix))]
    {
        use anyhow::Context as _;
        let status = command.status().with_context(|| "launch kinfolk-tui")?;
        std::process::exit(status.code().unwrap_or(1));
    }
}

fn build_command(
    root: Option<PathBuf>,
    folder: Option<String>,
    config_path: Option<PathBuf>,
    tab: Option<TabArg>,
) -> Command {
    let mut command = Command::new(find_tui_binary());
    if let Some(path) = root {
        command.arg("--root").arg(path);
    }
    if let Some(name) = folder {
        command.arg("--folder").arg(name);
    }
    if let Some(path) = config_path {
        command.arg("--config").arg(path);
    }
    if let Some(tab) = tab {
        command.arg("--tab").arg(DetailTab::from(tab).key());
    }
    command
}

fn find_tui_binary() -> PathBuf {
    let name = format!("kinfolk-tui{}", env::consts::EXE_SUFFIX);
    if let Ok(current) = env::current_exe() {
        if let Some(dir) = current.parent() {
            let candidate = dir.join(&name);
            if candidate.is_file() {
                return candidate;
            }
        }
    }
    PathBuf::from(name)
}

#[cfg(unix)]
fn exec_error(err: std::io::Error) -> anyhow::Error {
    use anyhow::anyhow;
    if err.kind() == std::io::ErrorKind::NotFound {
        return anyhow!(
            "kinfolk-tui binary not found; build it with `cargo build -p kinfolk-tui` or install the package"
        );
    }
    anyhow!("launch kinfolk-tui failed: {}", err)
}
