//! Drives an `ExamSession` on its own task.
//!
//! The task owns the session. Ticks from a one-second interval and commands
//! from the handle are handled in one `select!` loop, so mutations never
//! interleave. Dropping the handle's sender behaves like `SessionCommand::Exit`.

use std::sync::Arc;
use std::time::Duration;

use exam_core::model::{Answer, ExamResult};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

use super::intent::{IntentToken, PendingIntent};
use super::service::{Advance, ExamSession, SessionNotice};
use super::view::SessionView;
use super::workflow::{ConfirmFlow, SessionLoopService, SubmitFlow};

const TICK_PERIOD: Duration = Duration::from_secs(1);
const COMMAND_BUFFER: usize = 32;

/// Requests a collaborator can send to a running session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCommand {
    Navigate {
        index: usize,
        section: Option<String>,
    },
    Previous,
    SaveAndNext,
    MarkForReview,
    UnmarkReview,
    ClearResponse,
    SetAnswer(Answer),
    ToggleTimer,
    FocusLost,
    Submit {
        force: bool,
    },
    Confirm(IntentToken),
    Cancel(IntentToken),
    /// Ask for a fresh `SessionEvent::View`.
    Refresh,
    Exit,
}

/// What the session task reports back.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    View(Box<SessionView>),
    Prompt(PendingIntent),
    Notice(SessionNotice),
    /// A command was refused; the session is unchanged.
    Rejected(String),
    Tick { remaining: u32 },
    Finished(Box<ExamResult>),
    Exited,
}

/// Handle to a session running on its own task.
pub struct SessionHandle {
    commands: mpsc::Sender<SessionCommand>,
    events: mpsc::UnboundedReceiver<SessionEvent>,
    task: JoinHandle<()>,
}

impl SessionHandle {
    /// Queue a command; returns false once the session task has ended.
    pub async fn send(&self, command: SessionCommand) -> bool {
        self.commands.send(command).await.is_ok()
    }

    /// Next event, or `None` after the task has ended and all events were read.
    pub async fn next_event(&mut self) -> Option<SessionEvent> {
        self.events.recv().await
    }

    /// A sender that can be moved to another task.
    #[must_use]
    pub fn commands(&self) -> mpsc::Sender<SessionCommand> {
        self.commands.clone()
    }

    /// Split into the command sender, the event stream and the task handle.
    #[must_use]
    pub fn into_parts(
        self,
    ) -> (
        mpsc::Sender<SessionCommand>,
        mpsc::UnboundedReceiver<SessionEvent>,
        JoinHandle<()>,
    ) {
        (self.commands, self.events, self.task)
    }
}

/// Run `session` on a new tokio task.
#[must_use]
pub fn spawn_session(service: Arc<SessionLoopService>, session: ExamSession) -> SessionHandle {
    let (command_tx, command_rx) = mpsc::channel(COMMAND_BUFFER);
    let (event_tx, event_rx) = mpsc::unbounded_channel();
    let task = tokio::spawn(run(service, session, command_rx, event_tx));
    SessionHandle {
        commands: command_tx,
        events: event_rx,
        task,
    }
}

enum Step {
    Continue,
    Finished(ExamResult),
    Exit,
}

async fn run(
    service: Arc<SessionLoopService>,
    mut session: ExamSession,
    mut commands: mpsc::Receiver<SessionCommand>,
    events: mpsc::UnboundedSender<SessionEvent>,
) {
    let mut ticker = tokio::time::interval_at(Instant::now() + TICK_PERIOD, TICK_PERIOD);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    emit_view(&events, &session);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                if let Some(result) = service.tick(&mut session).await {
                    let _ = events.send(SessionEvent::Finished(Box::new(result)));
                    return;
                }
                if !session.countdown().is_paused() {
                    let _ = events.send(SessionEvent::Tick {
                        remaining: session.countdown().remaining(),
                    });
                }
            }
            command = commands.recv() => {
                let step = match command {
                    Some(command) => {
                        tracing::debug!(?command, "session command");
                        apply(&service, &mut session, command, &events).await
                    }
                    None => Step::Exit,
                };
                match step {
                    Step::Continue => {}
                    Step::Finished(result) => {
                        let _ = events.send(SessionEvent::Finished(Box::new(result)));
                        return;
                    }
                    Step::Exit => {
                        if let Err(err) = service.exit_session(session).await {
                            tracing::warn!(error = %err, "could not clear snapshot on exit");
                        }
                        let _ = events.send(SessionEvent::Exited);
                        return;
                    }
                }
            }
        }
    }
}

async fn apply(
    service: &SessionLoopService,
    session: &mut ExamSession,
    command: SessionCommand,
    events: &mpsc::UnboundedSender<SessionEvent>,
) -> Step {
    let outcome = match command {
        SessionCommand::Exit => return Step::Exit,
        SessionCommand::Navigate { index, section } => session
            .navigate(index, section.as_deref())
            .map(|moved| rejected_unless(moved, "no such question")),
        SessionCommand::Previous => session.previous().map(|_| None),
        SessionCommand::SaveAndNext => session.save_and_next().map(advance_event),
        SessionCommand::MarkForReview => session.mark_for_review().map(advance_event),
        SessionCommand::UnmarkReview => session.unmark_review().map(|()| None),
        SessionCommand::ClearResponse => session.clear_response().map(|()| None),
        SessionCommand::SetAnswer(answer) => session
            .set_answer(answer)
            .map(|stored| rejected_unless(stored, "answer does not fit this question")),
        SessionCommand::ToggleTimer => service.toggle_timer(session).await.map(|_| None),
        SessionCommand::FocusLost => Ok(service
            .focus_lost(session)
            .await
            .map(SessionEvent::Notice)),
        SessionCommand::Submit { force } => match service.submit(session, force).await {
            Ok(SubmitFlow::Pending(intent)) => Ok(Some(SessionEvent::Prompt(intent))),
            Ok(SubmitFlow::Finished(result)) => return Step::Finished(result),
            Err(err) => Err(err),
        },
        SessionCommand::Confirm(token) => match service.confirm(session, token).await {
            Ok(ConfirmFlow::SectionAdvanced { .. }) => Ok(None),
            Ok(ConfirmFlow::Finished(result)) => return Step::Finished(result),
            Err(err) => Err(err),
        },
        SessionCommand::Cancel(token) => session.cancel(token).map(|()| None),
        SessionCommand::Refresh => Ok(None),
    };

    match outcome {
        Ok(Some(event)) => {
            let _ = events.send(event);
        }
        Ok(None) => {}
        Err(err) => {
            let _ = events.send(SessionEvent::Rejected(err.to_string()));
        }
    }
    emit_view(events, session);
    Step::Continue
}

fn advance_event(advance: Advance) -> Option<SessionEvent> {
    match advance {
        Advance::Prompt(intent) => Some(SessionEvent::Prompt(intent)),
        Advance::Moved | Advance::Stayed => None,
    }
}

fn rejected_unless(ok: bool, reason: &str) -> Option<SessionEvent> {
    (!ok).then(|| SessionEvent::Rejected(reason.to_string()))
}

fn emit_view(events: &mpsc::UnboundedSender<SessionEvent>, session: &ExamSession) {
    let _ = events.send(SessionEvent::View(Box::new(session.view())));
}
