mod commands;
mod config;
mod items;
mod render;

use std::path::PathBuf;

use anyhow::Result;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::commands::layout::LayoutArgs;
use crate::commands::replay::ReplayArgs;
use crate::config::Settings;

#[derive(Parser)]
#[command(name = "tripgrid")]
#[command(about = "Lay out trip itineraries on a day grid and replay pointer sessions against it")]
struct Cli {
    /// Settings file to use instead of ~/.config/tripgrid/config.toml
    #[arg(long, global = true)]
    config: Option<String>,

    /// Log engine decisions to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show columns, bar rows and geometry for every day
    Layout {
        /// Item file (.toml or .json)
        items: PathBuf,

        /// First trip day (YYYY-MM-DD), overrides the file's [trip]
        #[arg(long)]
        start: Option<String>,

        /// Last trip day (YYYY-MM-DD)
        #[arg(long)]
        end: Option<String>,

        /// Extra days shown on each side of the trip
        #[arg(long, default_value_t = 0)]
        padding: usize,

        /// Anchor day when there are no trip dates and no items
        #[arg(long)]
        today: Option<String>,
    },
    /// Feed a recorded pointer session to the grid and print what it asks for
    Replay {
        /// Item file (.toml or .json)
        items: PathBuf,

        /// Step file (.toml or .json)
        script: PathBuf,

        #[arg(long)]
        start: Option<String>,

        #[arg(long)]
        end: Option<String>,

        /// Container width in pixels
        #[arg(long, default_value_t = 700.0)]
        width: f64,

        #[arg(long)]
        today: Option<String>,

        /// Save committed moves back to the item file
        #[arg(long)]
        write: bool,

        /// Fail every commit, to watch rollbacks
        #[arg(long)]
        fail_commits: bool,
    },
    /// Show the config path and effective settings
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let settings = Settings::load(cli.config.as_deref())?;
    init_logging(&settings.log_level, cli.verbose);

    match cli.command {
        Commands::Layout {
            items,
            start,
            end,
            padding,
            today,
        } => commands::layout::run(
            &settings,
            LayoutArgs {
                items: &items,
                start: start.as_deref(),
                end: end.as_deref(),
                padding,
                today: resolve_today(today.as_deref())?,
            },
        ),
        Commands::Replay {
            items,
            script,
            start,
            end,
            width,
            today,
            write,
            fail_commits,
        } => {
            if !(width.is_finite() && width > 0.0) {
                anyhow::bail!("--width must be a positive number of pixels");
            }
            commands::replay::run(
                &settings,
                ReplayArgs {
                    items: &items,
                    script: &script,
                    start: start.as_deref(),
                    end: end.as_deref(),
                    width,
                    today: resolve_today(today.as_deref())?,
                    write,
                    fail_commits,
                },
            )
            .await
        }
        Commands::Config => commands::config::run(&settings, cli.config.as_deref()),
    }
}

/// `RUST_LOG` wins; otherwise the configured level, or debug with `--verbose`.
fn init_logging(level: &str, verbose: bool) {
    let fallback = if verbose { "debug" } else { level };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn resolve_today(arg: Option<&str>) -> Result<NaiveDate> {
    match arg {
        Some(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map_err(|_| anyhow::anyhow!("Invalid date format '{}'. Expected YYYY-MM-DD", s)),
        None => Ok(chrono::Local::now().date_naive()),
    }
}
