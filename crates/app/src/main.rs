use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use exam_core::model::{AnswerSheet, ExamPaper, SessionPolicy, StatusMap};
use exam_core::scoring;
use services::{
    Clock, JsonFileSink, SessionCommand, SessionEvent, SessionLoopService, spawn_session,
};
use storage::repository::Storage;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

mod cli;
mod console;
mod db;

use cli::{Cli, Command, RunArgs, ScoreArgs};
use console::{Action, Console};

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .init();
}

fn read_input(path: &Path) -> anyhow::Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
}

fn load_paper(args: &RunArgs) -> anyhow::Result<ExamPaper> {
    let questions = read_input(&args.questions)?;
    let key = args.key.as_deref().map(read_input).transpose()?;
    let config = args.config.as_deref().map(read_input).transpose()?;
    let paper = ExamPaper::from_json(&questions, key.as_deref(), config.as_deref())
        .context("loading exam paper")?;
    warn_rejected_keys(&paper);
    Ok(paper)
}

fn warn_rejected_keys(paper: &ExamPaper) {
    for id in paper.answer_key().rejected() {
        tracing::warn!(%id, "answer key entry could not be read; question will be ungraded");
    }
}

async fn run_session(args: RunArgs) -> anyhow::Result<()> {
    let paper = Arc::new(load_paper(&args)?);

    let db_url = db::normalize_sqlite_url(&args.db);
    db::prepare_sqlite_file(&db_url)?;
    let storage = Storage::sqlite(&db_url)
        .await
        .with_context(|| format!("opening {db_url}"))?;

    let policy = SessionPolicy::default()
        .with_pause_on_focus_loss(!args.no_pause_on_blur)
        .with_snapshot_interval_secs(args.snapshot_interval)
        .validate()
        .map_err(exam_core::Error::from)?;
    let mut service = SessionLoopService::new(Clock::default_clock(), storage.timer_snapshots)
        .with_policy(policy);
    if let Some(path) = &args.result_out {
        service = service.with_result_sink(Arc::new(JsonFileSink::new(path)));
    }
    let service = Arc::new(service);

    let session = service.start_session(paper).await?;
    let (commands, mut events, task) = spawn_session(service, session).into_parts();

    println!("{}", console::HELP);
    let mut console = Console::new();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;

    loop {
        tokio::select! {
            event = events.recv() => {
                let Some(event) = event else { break };
                let done = matches!(event, SessionEvent::Finished(_) | SessionEvent::Exited);
                if let Some(text) = console.on_event(event) {
                    println!("{text}");
                }
                if done {
                    break;
                }
            }
            line = lines.next_line(), if stdin_open => {
                let command = match line.context("reading stdin")? {
                    None => {
                        stdin_open = false;
                        Some(SessionCommand::Exit)
                    }
                    Some(line) => match console.handle_line(&line) {
                        Action::Send(command) => Some(command),
                        Action::Print(text) => {
                            if !text.is_empty() {
                                println!("{text}");
                            }
                            None
                        }
                        Action::Quit => Some(SessionCommand::Exit),
                    },
                };
                if let Some(command) = command {
                    if commands.send(command).await.is_err() {
                        break;
                    }
                }
            }
        }
    }

    drop(commands);
    task.await.context("session task panicked")?;
    Ok(())
}

fn score_files(args: &ScoreArgs) -> anyhow::Result<()> {
    let questions = read_input(&args.questions)?;
    let key = read_input(&args.key)?;
    let paper = ExamPaper::from_json(&questions, Some(&key), None).context("loading exam paper")?;
    warn_rejected_keys(&paper);

    let answers = AnswerSheet::from_json(&read_input(&args.answers)?, paper.questions())
        .map_err(exam_core::Error::from)
        .context("reading answers")?;
    let statuses = match &args.statuses {
        Some(path) => serde_json::from_str::<StatusMap>(&read_input(path)?)
            .map_err(exam_core::Error::from)
            .context("reading statuses")?,
        None => StatusMap::default(),
    };

    let result = scoring::score(
        paper.questions(),
        paper.answer_key(),
        &answers,
        &statuses,
        args.time_taken,
    );
    tracing::info!(score = %result.score_display(), "scored answer file");
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();
    match cli.command {
        Command::Run(args) => run_session(args).await,
        Command::Score(args) => score_files(&args),
    }
}
