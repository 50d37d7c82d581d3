use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::{fmt, EnvFilter};

mod calendar;
mod config;
mod db;
mod html;
mod server;
mod terminal;
mod types;
mod view;

use config::Settings;
use db::{LocalStorage, MemoryStorage, SqliteStorage};
use types::{DayKey, ViewMode};
use view::{CalendarView, FixedAnswer, StdinPrompt};

#[derive(Parser, Debug)]
#[command(name = "calendario")]
#[command(about = "Month and week task calendar with persistent per-day task lists")]
struct Args {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Directory holding the calendar database [env: CALENDARIO_DATA_DIR]
    #[arg(short, long, global = true)]
    data_dir: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error) [env: CALENDARIO_LOG]
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Keep tasks in memory only; nothing is read from or written to disk
    #[arg(long, global = true)]
    ephemeral: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the web server (default)
    Serve {
        /// Port to listen on [env: CALENDARIO_PORT]
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Print the calendar grid to the terminal
    Show {
        /// Show the week instead of the month
        #[arg(long)]
        week: bool,

        /// Date to focus on (YYYY-MM-DD), defaults to today
        #[arg(long)]
        date: Option<NaiveDate>,

        /// Also write the page as static HTML to this path
        #[arg(long)]
        html: Option<PathBuf>,
    },

    /// Add a task to a day; prompts on stdin when no text is given
    Add {
        /// Day in YYYY-MM-DD format
        day: DayKey,

        /// Task text
        text: Option<String>,
    },

    /// Remove every task on a day matching the given text
    Remove {
        /// Day in YYYY-MM-DD format
        day: DayKey,

        /// Task text to remove
        text: String,
    },

    /// Print the stored tasks as JSON
    Tasks,
}

fn init_tracing(log_level: &str) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level))
        .add_directive("hyper=warn".parse()?)
        .add_directive("tower_http=warn".parse()?);

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_max_level(Level::TRACE)
        .with_writer(std::io::stderr)
        .init();

    Ok(())
}

fn open_storage(settings: &Settings, ephemeral: bool) -> Result<Box<dyn LocalStorage + Send>> {
    if ephemeral {
        info!("Using in-memory storage");
        return Ok(Box::new(MemoryStorage::new()));
    }

    std::fs::create_dir_all(&settings.data_dir).with_context(|| {
        format!(
            "Failed to create data directory {}",
            settings.data_dir.display()
        )
    })?;
    Ok(Box::new(SqliteStorage::open(&settings.db_path())?))
}

fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut settings = Settings::from_env()?;
    if let Some(dir) = args.data_dir {
        settings.data_dir = dir;
    }
    if let Some(level) = args.log_level {
        settings.log_level = level;
    }

    init_tracing(&settings.log_level)?;

    let storage = open_storage(&settings, args.ephemeral)?;
    let mut view = CalendarView::initialize(storage, today());

    match args.command {
        None => {
            server::serve(settings.port, view).await?;
        }
        Some(Commands::Serve { port }) => {
            server::serve(port.unwrap_or(settings.port), view).await?;
        }
        Some(Commands::Show { week, date, html: html_out }) => {
            if let Some(date) = date {
                view.set_focus(date);
            }
            if week {
                view.set_mode(ViewMode::Week);
            }
            let page = view.page(today());
            print!("{}", terminal::render_grid(&page));
            if let Some(path) = html_out {
                html::generate_html(&page, &path)?;
                info!(path = %path.display(), "HTML saved");
            }
        }
        Some(Commands::Add { day, text }) => {
            match text {
                Some(text) => view.add_task_from(day, &mut FixedAnswer(Some(text)))?,
                None => {
                    let stdin = std::io::stdin();
                    view.add_task_from(day, &mut StdinPrompt::new(stdin.lock()))?;
                }
            }
            info!(day = %day, count = view.store().tasks(&day).len(), "Task added");
        }
        Some(Commands::Remove { day, text }) => {
            let removed = view.remove_task(&day, &text)?;
            info!(day = %day, removed = removed, "Tasks removed");
        }
        Some(Commands::Tasks) => {
            println!("{}", serde_json::to_string_pretty(view.store())?);
        }
    }

    Ok(())
}
