//! task-switching - terminal front end for the cued task-switching experiment

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

mod app;
mod simulate;
mod terminal;

pub use app::{App, SessionEnd};

/// Cued task-switching experiment
#[derive(Parser, Debug)]
#[command(name = "task-switching")]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Participant identifier (prompted for when absent)
    #[arg(short, long)]
    participant: Option<String>,

    #[arg(long)]
    age: Option<String>,

    #[arg(long)]
    gender: Option<String>,

    /// JSON experiment configuration
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the number of practice trials
    #[arg(long)]
    practice_trials: Option<usize>,

    /// Override the number of main trials
    #[arg(long)]
    main_trials: Option<usize>,

    /// Directory the CSV export is written to
    #[arg(short, long, default_value = ".")]
    output: PathBuf,

    /// Run with a simulated participant instead of the keyboard
    #[arg(long)]
    simulate: bool,

    /// Seed for task and stimulus selection
    #[arg(long)]
    seed: Option<u64>,

    /// Log level, used when RUST_LOG is unset
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Write logs here instead of stderr
    #[arg(long)]
    log_file: Option<PathBuf>,
}

fn init_logging(args: &Args) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&args.log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    if let Some(log_file) = &args.log_file {
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(log_file)
            .context("failed to open log file")?;

        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_writer(file)
                    .with_ansi(false),
            )
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(&args)?;

    let app = App::new(args)?;
    if app.run()? == SessionEnd::Interrupted {
        std::process::exit(130);
    }

    Ok(())
}
