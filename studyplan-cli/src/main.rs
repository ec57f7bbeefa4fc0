use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod config;
mod state;
mod tasks_cmd;
mod views;

use config::Config;
use state::Store;

#[derive(Parser, Debug)]
#[command(
    name = "studyplan",
    version,
    about = "Study planner: deadlines, procrastination scores and analytics"
)]
struct Cli {
    /// Evaluate as of this instant instead of the wall clock: RFC3339, or
    /// YYYY-MM-DDTHH:MM in the configured timezone, or YYYY-MM-DD (midnight UTC)
    #[arg(long, global = true)]
    now: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write a default ~/.studyplan/config.toml
    Init,

    #[command(flatten)]
    Task(tasks_cmd::TaskCommand),

    #[command(flatten)]
    View(views::ViewCommand),
}

/// Everything a command needs: storage, settings and one fixed "now".
pub struct Ctx {
    pub store: Store,
    pub config: Config,
    pub tz: Tz,
    pub now: DateTime<Utc>,
}

impl Ctx {
    pub fn today(&self) -> NaiveDate {
        self.now.with_timezone(&self.tz).date_naive()
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = config::load_config()?;
    init_logging(&config.log.level);

    match cli.command {
        Command::Init => config::init_config(),
        Command::Task(cmd) => tasks_cmd::run(cmd, &build_ctx(cli.now.as_deref(), config)?),
        Command::View(cmd) => views::run(cmd, &build_ctx(cli.now.as_deref(), config)?),
    }
}

fn build_ctx(now: Option<&str>, config: Config) -> Result<Ctx> {
    let tz = config.timezone()?;
    let now = match now {
        Some(raw) => studyplan_core::parse_instant_in(raw, &tz).with_context(|| {
            format!("invalid --now '{raw}' (expected e.g. 2026-03-10T15:00:00Z or 2026-03-10T09:00)")
        })?,
        None => Utc::now(),
    };

    let ctx = Ctx {
        store: Store::open_default()?.with_timezone(tz),
        tz,
        config,
        now,
    };
    tracing::debug!(now = %ctx.now, tz = %ctx.tz, "starting");
    Ok(ctx)
}

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    // Logs go to stderr so command output stays pipeable.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
