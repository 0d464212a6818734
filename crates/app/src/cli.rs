use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "exam", author, version, about = "Timed exam sessions with negative-marking scoring")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Sit an exam interactively on the terminal.
    Run(RunArgs),
    /// Score an answer file against a key without running a session.
    Score(ScoreArgs),
}

#[derive(Debug, Args)]
pub struct RunArgs {
    /// Question file (JSON array).
    #[arg(long)]
    pub questions: PathBuf,
    /// Answer key file (JSON object keyed by question id).
    #[arg(long)]
    pub key: Option<PathBuf>,
    /// Exam config file (`duration` in minutes plus display metadata).
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// `SQLite` database for timer snapshots.
    #[arg(long, env = "EXAM_DB_URL", default_value = "sqlite:exam.sqlite3")]
    pub db: String,
    /// Write the scored result to this file as JSON.
    #[arg(long)]
    pub result_out: Option<PathBuf>,
    /// Keep the timer running when the window loses focus.
    #[arg(long)]
    pub no_pause_on_blur: bool,
    /// Running seconds between timer snapshots.
    #[arg(long, default_value_t = exam_core::model::DEFAULT_SNAPSHOT_INTERVAL_SECS)]
    pub snapshot_interval: u32,
}

#[derive(Debug, Args)]
pub struct ScoreArgs {
    #[arg(long)]
    pub questions: PathBuf,
    #[arg(long)]
    pub key: PathBuf,
    /// Answers file (JSON object keyed by question id).
    #[arg(long)]
    pub answers: PathBuf,
    /// Optional status map used for the review counts.
    #[arg(long)]
    pub statuses: Option<PathBuf>,
    /// Seconds reported as time taken.
    #[arg(long, default_value_t = 0)]
    pub time_taken: u32,
}
