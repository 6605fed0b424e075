//! `localtodo` executable.
//!
//! # Responsibility
//! - Run the HTTP server over a data directory.
//! - Drive the controller against a running server for quick terminal use.
//! - Keep output plain and deterministic; logs go to stderr or a log dir.

use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand};
use localtodo_core::{
    core_version, default_log_level, init_logging, DataApi, DataClient, JsonFileStore,
    MutationOutcome, NoticeLevel, ProjectId, Todo, TodoController, TodoId,
};
use localtodo_server::config::{parse_addr, ADDR_ENV, DATA_DIR_ENV, DEFAULT_ADDR, DEFAULT_DATA_DIR};
use localtodo_server::http_transport::{DEFAULT_URL, URL_ENV};
use localtodo_server::{serve, HttpTransport, ServerConfig};
use log::info;
use std::path::PathBuf;

type Controller = TodoController<HttpTransport>;

#[derive(Debug, Parser)]
#[command(name = "localtodo", version, about = "Local todo list server and client")]
struct Cli {
    /// trace|debug|info|warn|error
    #[arg(long, env = "LOCALTODO_LOG_LEVEL", global = true)]
    log_level: Option<String>,

    /// Absolute directory for rolling log files; stderr when unset.
    #[arg(long, env = "LOCALTODO_LOG_DIR", global = true)]
    log_dir: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Serve /api/data over a data directory.
    Serve {
        #[arg(long, env = ADDR_ENV, default_value = DEFAULT_ADDR)]
        addr: String,
        #[arg(long, env = DATA_DIR_ENV, default_value = DEFAULT_DATA_DIR)]
        data_dir: PathBuf,
    },
    /// Print both stored collections as JSON.
    Dump {
        #[arg(long, env = DATA_DIR_ENV, default_value = DEFAULT_DATA_DIR)]
        data_dir: PathBuf,
    },
    /// Show todos, grouped by project unless one is selected.
    List {
        #[arg(long)]
        project: Option<String>,
        #[arg(long)]
        hide_completed: bool,
        #[arg(long)]
        under_ten: bool,
        #[command(flatten)]
        remote: Remote,
    },
    AddProject {
        name: String,
        #[command(flatten)]
        remote: Remote,
    },
    AddTodo {
        text: String,
        #[arg(long)]
        project: Option<String>,
        /// Mark as a quick (under ten minutes) task.
        #[arg(long)]
        under_ten: bool,
        #[command(flatten)]
        remote: Remote,
    },
    /// Flip completion of one todo.
    Toggle {
        id: String,
        #[command(flatten)]
        remote: Remote,
    },
    Version,
}

#[derive(Debug, Args)]
struct Remote {
    /// Base URL of a running server.
    #[arg(long, env = URL_ENV, default_value = DEFAULT_URL)]
    url: String,
}

impl Command {
    fn default_log_level(&self) -> &'static str {
        match self {
            Self::Serve { .. } => default_log_level(),
            _ => "warn",
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let level = cli
        .log_level
        .clone()
        .unwrap_or_else(|| cli.command.default_log_level().to_string());
    init_logging(&level, cli.log_dir.as_deref()).map_err(anyhow::Error::msg)?;

    match cli.command {
        Command::Serve { addr, data_dir } => {
            let config = ServerConfig {
                addr: parse_addr(&addr)?,
                data_dir,
            };
            info!(
                "event=cli_serve module=cli status=start addr={} data_dir={}",
                config.addr,
                config.data_dir.display()
            );
            serve(&config).await?;
        }
        Command::Dump { data_dir } => dump(data_dir)?,
        Command::List {
            project,
            hide_completed,
            under_ten,
            remote,
        } => {
            let mut controller = connect(&remote).await?;
            controller.select_project(project.map(ProjectId::new));
            controller.set_hide_completed(hide_completed);
            controller.set_show_only_under_ten(under_ten);
            print_view(&controller);
        }
        Command::AddProject { name, remote } => {
            let mut controller = connect(&remote).await?;
            let outcome = controller.add_project(&name).await;
            finish(&mut controller, outcome)?;
        }
        Command::AddTodo {
            text,
            project,
            under_ten,
            remote,
        } => {
            let mut controller = connect(&remote).await?;
            let outcome = controller
                .add_todo(&text, project.map(ProjectId::new), under_ten)
                .await;
            finish(&mut controller, outcome)?;
        }
        Command::Toggle { id, remote } => {
            let mut controller = connect(&remote).await?;
            let id = TodoId::new(id);
            let outcome = controller.toggle_todo(&id).await;
            finish(&mut controller, outcome)?;
            if let Some(todo) = controller.todos().iter().find(|todo| todo.id == id) {
                println!("{}", render_todo(todo));
            }
        }
        Command::Version => println!("localtodo {}", core_version()),
    }
    Ok(())
}

fn dump(data_dir: PathBuf) -> anyhow::Result<()> {
    let store = JsonFileStore::open(&data_dir)
        .with_context(|| format!("opening data dir `{}`", data_dir.display()))?;
    let reply = DataApi::new(store).get();
    if !reply.is_success() {
        bail!(
            "{}",
            reply.error_message().unwrap_or("failed to read collections")
        );
    }
    println!("{}", serde_json::to_string_pretty(&reply.body)?);
    Ok(())
}

async fn connect(remote: &Remote) -> anyhow::Result<Controller> {
    let mut controller = TodoController::new(DataClient::new(HttpTransport::new(&remote.url)));
    let loaded = controller.load().await;
    print_notices(&mut controller);
    loaded.with_context(|| format!("loading from {}", remote.url))?;
    Ok(controller)
}

fn finish(
    controller: &mut Controller,
    outcome: localtodo_core::ControllerResult<MutationOutcome>,
) -> anyhow::Result<()> {
    print_notices(controller);
    match outcome? {
        MutationOutcome::Committed { .. } => Ok(()),
        MutationOutcome::RolledBack { kind, error, .. } => bail!("{kind} rolled back: {error}"),
    }
}

fn print_notices(controller: &mut Controller) {
    for notice in controller.drain_notices() {
        match notice.level {
            NoticeLevel::Success => println!("{}", notice.message),
            NoticeLevel::Error => eprintln!("error: {}", notice.message),
        }
    }
}

fn print_view(controller: &Controller) {
    println!("{}", controller.title());
    if let Some(empty) = controller.empty_state() {
        println!("  {}", empty.message());
        return;
    }

    if controller.view().selected_project().is_some() {
        for todo in controller.visible_todos() {
            println!("  {}", render_todo(todo));
        }
        return;
    }

    for group in controller.groups() {
        let marker = if group.collapsed { "+" } else { "-" };
        println!("{marker} {} ({})", group.project.name, group.len());
        if !group.collapsed {
            for todo in group.todos {
                println!("    {}", render_todo(todo));
            }
        }
    }
}

fn render_todo(todo: &Todo) -> String {
    let check = if todo.completed { "[x]" } else { "[ ]" };
    let quick = if todo.under_ten_minutes { " (quick)" } else { "" };
    format!("{check} {}{quick}  #{}", todo.text, todo.id)
}
