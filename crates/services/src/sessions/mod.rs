mod intent;
mod progress;
pub mod runner;
mod service;
mod view;
mod workflow;

// Public API of the session subsystem.
pub use crate::error::SessionError;
pub use intent::{IntentKind, IntentToken, PendingIntent, SubmitSummary};
pub use progress::SessionProgress;
pub use runner::{SessionCommand, SessionEvent, SessionHandle, spawn_session};
pub use service::{
    Advance, Confirmation, ExamSession, SessionNotice, SubmitOutcome, Submission, TickOutcome,
};
pub use view::{CurrentQuestion, PaletteEntry, SessionView};
pub use workflow::{ConfirmFlow, SessionLoopService, SubmitFlow};
