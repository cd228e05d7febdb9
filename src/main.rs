// Entrypoint for the CLI application.
// - Keeps `main` small: parse arguments, set up logging, dispatch.
// - Exits with 1 when any checklist item could not be created.

mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use std::io::IsTerminal;
use std::path::PathBuf;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use cli::{AddCommand, BatchArgs, Cli, Command, GetCommand};
use hopla::api::ApiClient;
use hopla::auth::{auth_file_from_env, Credentials};
use hopla::checklist::read_checklist_file;
use hopla::config::{config_file, Config};
use hopla::rate_limit::SystemClock;
use hopla::submitter::{ChecklistSubmitter, LogReporter, Reporter};
use hopla::tasks::{parse_due_date, TodoRequest};
use hopla::{ui, user};

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_env("HOPLA_LOG").unwrap_or_else(|_| EnvFilter::new(default)))
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .init();
}

fn load_config(path: Option<PathBuf>) -> Result<Config> {
    let path = config_file(path);
    Config::load(&path).with_context(|| format!("Failed to load config {}", path.display()))
}

fn connect(config: &Config) -> Result<ApiClient> {
    let credentials = Credentials::load(&auth_file_from_env())?;
    ApiClient::new(config, &credentials)
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    tracing::debug!(
        "start application with arguments: {:?}",
        std::env::args().collect::<Vec<_>>()
    );

    let code = dispatch(cli)?;
    if code != 0 {
        std::process::exit(code);
    }
    Ok(())
}

/// Run the parsed command and return the process exit code.
fn dispatch(cli: Cli) -> Result<i32> {
    let config = load_config(cli.config)?;

    match cli.command {
        Command::Add(AddCommand::Todo {
            text,
            checklist,
            due_date,
            difficulty,
            notes,
            batch,
        }) => {
            let config = apply_batch_overrides(config, &batch)?;
            let lines = match &checklist {
                Some(path) => read_checklist_file(path)?,
                None => Vec::new(),
            };
            let due_date = due_date.as_deref().map(parse_due_date).transpose()?;
            if !ui::confirm_batch(lines.len(), &config.rate_limit, batch.yes)? {
                println!("Aborted.");
                return Ok(1);
            }

            let api = connect(&config)?;
            let clock = SystemClock;
            let mut submitter = ChecklistSubmitter::new(&api, &clock, config.rate_limit);
            let todo = TodoRequest::new(text.join(" "), difficulty)
                .with_notes(notes)
                .with_due_date(due_date);
            let created = submitter
                .create_todo(&todo)
                .context("Failed to create To-Do")?;
            println!("created To-Do {} ({})", created.text, created.id);

            if lines.is_empty() {
                return Ok(0);
            }
            submit_checklist(&mut submitter, &created.id, lines)
        }
        Command::Add(AddCommand::Checklist {
            todo_id,
            file,
            batch,
        }) => {
            let config = apply_batch_overrides(config, &batch)?;
            let lines = read_checklist_file(&file)?;
            if !ui::confirm_batch(lines.len(), &config.rate_limit, batch.yes)? {
                println!("Aborted.");
                return Ok(1);
            }
            let api = connect(&config)?;
            let clock = SystemClock;
            let mut submitter = ChecklistSubmitter::new(&api, &clock, config.rate_limit);
            submit_checklist(&mut submitter, &todo_id, lines)
        }
        Command::Get(GetCommand::UserInfo { filter }) => {
            let api = connect(&config)?;
            let data = user::fetch_user(&api).context("Failed to get user")?;
            let shown = match filter {
                Some(f) => user::filter_user(&data, &f),
                None => data,
            };
            ui::print_json(&shown)?;
            Ok(0)
        }
        Command::Get(GetCommand::UserStats { stat }) => {
            let api = connect(&config)?;
            let data = user::fetch_user(&api).context("Failed to get user")?;
            ui::print_json(&user::select_stats(&data, stat))?;
            Ok(0)
        }
        Command::Get(GetCommand::UserInventory { group }) => {
            let api = connect(&config)?;
            let data = user::fetch_user(&api).context("Failed to get user")?;
            ui::print_json(&user::select_inventory(&data, group))?;
            Ok(0)
        }
        Command::Get(GetCommand::UserAuth { info }) => {
            let api = connect(&config)?;
            let data = user::fetch_user(&api).context("Failed to get user")?;
            ui::print_json(&user::select_auth(&data, info))?;
            Ok(0)
        }
        Command::Status => {
            let api = connect(&config)?;
            let status = user::fetch_status(&api).context("Failed to get API status")?;
            println!("{}", status);
            Ok(0)
        }
    }
}

fn apply_batch_overrides(config: Config, batch: &BatchArgs) -> Result<Config> {
    Ok(config.with_rate_limit_overrides(batch.max_requests, batch.window_secs)?)
}

fn submit_checklist(
    submitter: &mut ChecklistSubmitter<'_, ApiClient>,
    todo_id: &str,
    lines: Vec<String>,
) -> Result<i32> {
    let mut reporter: Box<dyn Reporter> = if std::io::stderr().is_terminal() {
        Box::new(ui::BarReporter::new(lines.len()))
    } else {
        Box::new(LogReporter)
    };

    let report = submitter.submit(todo_id, lines, reporter.as_mut())?;
    ui::print_report(&report)?;
    Ok(report.exit_code())
}
