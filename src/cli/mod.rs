#![forbid(unsafe_code)]

use std::io::{self, Write as _};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context as _;
use clap::{CommandFactory as _, Parser, Subcommand};
use time::Date;

use crate::config::{self, Config};
use crate::export::{self, ExportFormat};
use crate::logging;
use crate::notify;
use crate::output::table;
use crate::task::model::{Category, Filter, Priority, TaskId, parse_date};
use crate::task::storage::{FileSlot, MemorySlot};
use crate::task::store::TaskStore;
use crate::tui;
use crate::voice;

#[derive(Debug, Parser)]
#[command(name = "todotui", version, about = "To-do list for the terminal")]
pub struct Cli {
    /// Start the TUI with an in-memory list; nothing is read or saved
    #[arg(long)]
    pub ephemeral: bool,
    #[command(subcommand)]
    pub cmd: Option<Commands>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Add a task to the top of the list
    Add(AddArgs),
    /// Print tasks
    #[command(alias = "ls")]
    List(ListArgs),
    /// Flip a task between open and done
    Toggle(IdArgs),
    /// Delete a task
    #[command(alias = "remove")]
    Rm(IdArgs),
    /// Delete every completed task
    Clear,
    /// Move the task at one list position to another (1-based)
    Mv(MoveArgs),
    /// Write tasks to a CSV or PDF file
    Export(ExportArgs),
    Config(ConfigArgs),
    Completion(CompletionArgs),
    Version,
}

#[derive(Debug, Parser)]
pub struct AddArgs {
    /// Task text
    #[arg(conflicts_with_all = ["stdin", "voice"])]
    pub text: Vec<String>,
    #[arg(short = 'p', long = "priority", default_value_t = Priority::Medium)]
    pub priority: Priority,
    /// Due date (YYYY-MM-DD)
    #[arg(short = 'd', long = "date", value_parser = parse_date)]
    pub date: Option<Date>,
    #[arg(short = 'c', long = "category", default_value_t = Category::Work)]
    pub category: Category,
    /// Read the task text (e.g. a speech transcript) from stdin
    #[arg(long = "stdin", conflicts_with = "voice")]
    pub stdin: bool,
    /// Dictate the task text with the configured voice.command
    #[arg(long = "voice")]
    pub voice: bool,
}

#[derive(Debug, Parser)]
pub struct ListArgs {
    /// all, active or completed (defaults to ui.default_filter)
    #[arg(short = 'f', long = "filter")]
    pub filter: Option<Filter>,
    /// Output in JSON format
    #[arg(long = "json", conflicts_with = "csv")]
    pub json: bool,
    /// Output in CSV format
    #[arg(long = "csv")]
    pub csv: bool,
}

#[derive(Debug, Parser)]
pub struct IdArgs {
    pub id: TaskId,
}

#[derive(Debug, Parser)]
pub struct MoveArgs {
    pub from: usize,
    pub to: usize,
}

#[derive(Debug, Parser)]
pub struct ExportArgs {
    #[arg(value_enum)]
    pub format: ExportFormat,
    /// Output file (defaults to export.csv_file / export.pdf_file)
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,
    #[arg(short = 'f', long = "filter", default_value_t = Filter::All)]
    pub filter: Filter,
}

#[derive(Debug, Parser)]
pub struct CompletionArgs {
    pub shell: clap_complete::Shell,
}

#[derive(Debug, Parser)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub cmd: ConfigCmd,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCmd {
    List,
    Set(ConfigSetArgs),
    Get(ConfigGetArgs),
}

#[derive(Debug, Parser)]
pub struct ConfigSetArgs {
    pub key: String,
    pub value: String,
}

#[derive(Debug, Parser)]
pub struct ConfigGetArgs {
    pub key: String,
}

pub async fn main() -> ExitCode {
    let cli = Cli::parse();

    // The TUI sets up file logging once the config is known.
    if !(cli.cmd.is_none() && tui::is_tty()) {
        logging::init_stderr();
    }

    match run(cli).await {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{err}");
            ExitCode::from(1)
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    match cli.cmd {
        None => cmd_default(cli.ephemeral).await,
        Some(Commands::Completion(args)) => {
            let mut cmd = Cli::command();
            clap_complete::generate(args.shell, &mut cmd, "todotui", &mut io::stdout());
            Ok(ExitCode::SUCCESS)
        }
        Some(Commands::Config(args)) => match args.cmd {
            ConfigCmd::List => {
                print!("{}", config::list_resolved_toml()?);
                Ok(ExitCode::SUCCESS)
            }
            ConfigCmd::Set(set) => {
                config::set_value_string(&set.key, &set.value)?;
                println!("Set {} = {}", set.key, set.value);
                Ok(ExitCode::SUCCESS)
            }
            ConfigCmd::Get(get) => match config::get_value_string(&get.key)? {
                Some(v) => {
                    println!("{v}");
                    Ok(ExitCode::SUCCESS)
                }
                None => anyhow::bail!(
                    "configuration key '{}' not found - use 'todotui config list' to see available keys",
                    get.key
                ),
            },
        },
        Some(Commands::Add(args)) => cmd_add(args).await,
        Some(Commands::List(args)) => cmd_list(args).await,
        Some(Commands::Toggle(args)) => cmd_toggle(args).await,
        Some(Commands::Rm(args)) => cmd_rm(args).await,
        Some(Commands::Clear) => cmd_clear().await,
        Some(Commands::Mv(args)) => cmd_mv(args).await,
        Some(Commands::Export(args)) => cmd_export(args).await,
        Some(Commands::Version) => Ok(cmd_version()),
    }
}

async fn load_cfg() -> anyhow::Result<Config> {
    let cfg = tokio::task::spawn_blocking(|| -> anyhow::Result<Config> {
        let (cfg, _doc, _paths) = config::load()?;
        Ok(cfg)
    })
    .await??;
    Ok(cfg)
}

fn open_store(cfg: &Config) -> anyhow::Result<TaskStore<FileSlot>> {
    let slot = FileSlot::from_config(&cfg.storage)?;
    Ok(TaskStore::open(slot))
}

async fn cmd_default(ephemeral: bool) -> anyhow::Result<ExitCode> {
    let cfg = load_cfg().await?;

    if tui::is_tty() {
        let log_file = cfg.log_file()?;
        if let Err(e) = logging::init_file(&log_file) {
            eprintln!("warning: {e:#}");
        }
        if ephemeral {
            tui::app::run_with_store(cfg, TaskStore::open(MemorySlot::new())).await?;
        } else {
            tui::app::run(cfg).await?;
        }
        return Ok(ExitCode::SUCCESS);
    }

    // Non-TTY fallback: print the list with the configured filter.
    cmd_list(ListArgs {
        filter: None,
        json: false,
        csv: false,
    })
    .await
}

async fn cmd_add(args: AddArgs) -> anyhow::Result<ExitCode> {
    let cfg = load_cfg().await?;

    let text = if args.stdin {
        voice::read_transcript(io::stdin().lock())
            .context("failed to read task text from stdin")?
            .unwrap_or_default()
    } else if args.voice {
        let command = cfg.voice.command.clone();
        tokio::task::spawn_blocking(move || voice::capture(&command))
            .await??
            .unwrap_or_default()
    } else {
        args.text.join(" ")
    };

    let mut store = open_store(&cfg)?;
    let Some(task) = store.add(&text, args.priority, args.date, args.category)? else {
        eprintln!("Nothing added: task text is empty");
        return Ok(ExitCode::from(1));
    };

    let notifier = notify::from_config(&cfg.notify);
    notify::task_added(notifier.as_ref(), &task);
    println!("Added task {}: {}", task.id, task.text);
    Ok(ExitCode::SUCCESS)
}

async fn cmd_list(args: ListArgs) -> anyhow::Result<ExitCode> {
    let cfg = load_cfg().await?;
    let store = open_store(&cfg)?;
    let filter = args.filter.unwrap_or(cfg.ui.default_filter);

    if args.json {
        let tasks = store.filter(filter);
        println!("{}", serde_json::to_string_pretty(&tasks)?);
        return Ok(ExitCode::SUCCESS);
    }
    if args.csv {
        let snapshot = store.snapshot(filter);
        export::csv::write_csv(&snapshot.tasks, io::stdout().lock())?;
        return Ok(ExitCode::SUCCESS);
    }

    let rows = store
        .tasks()
        .iter()
        .enumerate()
        .filter(|(_, t)| filter.matches(t));
    let table = table::task_table(rows);
    if table.is_empty() {
        println!("No {} tasks.", filter.label().to_lowercase());
        return Ok(ExitCode::SUCCESS);
    }
    table.print()?;
    Ok(ExitCode::SUCCESS)
}

async fn cmd_toggle(args: IdArgs) -> anyhow::Result<ExitCode> {
    let cfg = load_cfg().await?;
    let mut store = open_store(&cfg)?;
    if store.list().get(args.id).is_none() {
        eprintln!("No task with id {}", args.id);
        return Ok(ExitCode::from(1));
    }
    store.toggle_completed(args.id)?;
    if let Some(t) = store.list().get(args.id) {
        let state = if t.completed { "done" } else { "open" };
        println!("{}: {} ({state})", t.id, t.text);
    }
    Ok(ExitCode::SUCCESS)
}

async fn cmd_rm(args: IdArgs) -> anyhow::Result<ExitCode> {
    let cfg = load_cfg().await?;
    let mut store = open_store(&cfg)?;
    let Some(text) = store.list().get(args.id).map(|t| t.text.clone()) else {
        eprintln!("No task with id {}", args.id);
        return Ok(ExitCode::from(1));
    };
    store.remove(args.id)?;
    println!("Removed {}: {text}", args.id);
    Ok(ExitCode::SUCCESS)
}

async fn cmd_clear() -> anyhow::Result<ExitCode> {
    let cfg = load_cfg().await?;
    let mut store = open_store(&cfg)?;
    let removed = store.clear_completed()?;
    println!("Removed {removed} completed task(s)");
    Ok(ExitCode::SUCCESS)
}

async fn cmd_mv(args: MoveArgs) -> anyhow::Result<ExitCode> {
    let cfg = load_cfg().await?;
    let mut store = open_store(&cfg)?;
    let len = store.tasks().len();
    if args.from == 0 || args.from > len || args.to == 0 {
        anyhow::bail!(
            "positions are 1-based and the list has {len} task(s) - see 'todotui list'"
        );
    }
    store.reorder(args.from - 1, Some(args.to - 1))?;
    table::task_table(store.tasks().iter().enumerate()).print()?;
    Ok(ExitCode::SUCCESS)
}

async fn cmd_export(args: ExportArgs) -> anyhow::Result<ExitCode> {
    let cfg = load_cfg().await?;
    let store = open_store(&cfg)?;
    let path = match args.output {
        Some(p) => p,
        None => config::expand_path(args.format.default_file(&cfg.export))?,
    };
    let snapshot = store.snapshot(args.filter);
    let format = args.format;
    let report =
        tokio::task::spawn_blocking(move || export::export_to_path(&snapshot, format, &path))
            .await??;
    println!("{report}");
    Ok(ExitCode::SUCCESS)
}

fn cmd_version() -> ExitCode {
    let mut out = io::stdout().lock();
    let _ = writeln!(out, "todotui version {}", env!("CARGO_PKG_VERSION"));
    let _ = writeln!(out, "  rust: {}", rustc_version_runtime::version());
    let _ = writeln!(
        out,
        "  os/arch: {}/{}",
        std::env::consts::OS,
        std::env::consts::ARCH
    );
    ExitCode::SUCCESS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn add_parses_typed_options() {
        let cli = Cli::try_parse_from([
            "todotui", "add", "Buy", "milk", "-p", "high", "-d", "2024-06-01", "-c", "errand",
        ])
        .unwrap();
        let Some(Commands::Add(args)) = cli.cmd else {
            panic!("expected add");
        };
        assert_eq!(args.text.join(" "), "Buy milk");
        assert_eq!(args.priority, Priority::High);
        assert_eq!(args.category, Category::Errand);
        assert_eq!(args.date.map(crate::task::model::format_date).as_deref(), Some("2024-06-01"));
    }

    #[test]
    fn add_defaults_and_rejects_bad_values() {
        let cli = Cli::try_parse_from(["todotui", "add", "x"]).unwrap();
        let Some(Commands::Add(args)) = cli.cmd else {
            panic!("expected add");
        };
        assert_eq!(args.priority, Priority::Medium);
        assert_eq!(args.category, Category::Work);
        assert!(args.date.is_none());

        assert!(Cli::try_parse_from(["todotui", "add", "x", "-p", "urgent"]).is_err());
        assert!(Cli::try_parse_from(["todotui", "add", "x", "-d", "06/01/2024"]).is_err());
        assert!(Cli::try_parse_from(["todotui", "add", "x", "--stdin"]).is_err());
    }

    #[test]
    fn list_and_export_flags() {
        let cli = Cli::try_parse_from(["todotui", "ls", "--filter", "Completed", "--json"]).unwrap();
        let Some(Commands::List(args)) = cli.cmd else {
            panic!("expected list");
        };
        assert_eq!(args.filter, Some(Filter::Completed));
        assert!(args.json);
        assert!(Cli::try_parse_from(["todotui", "list", "--json", "--csv"]).is_err());

        let cli = Cli::try_parse_from(["todotui", "export", "pdf", "-o", "out.pdf"]).unwrap();
        let Some(Commands::Export(args)) = cli.cmd else {
            panic!("expected export");
        };
        assert_eq!(args.format, ExportFormat::Pdf);
        assert_eq!(args.output, Some(PathBuf::from("out.pdf")));
        assert_eq!(args.filter, Filter::All);
    }
}
