#![forbid(unsafe_code)]

pub mod error;
pub mod result_sink;
pub mod sessions;

pub use exam_core::Clock;

pub use error::{ResultSinkError, SessionError};
pub use result_sink::{JsonFileSink, ResultSink};

pub use sessions::{
    Advance, ConfirmFlow, Confirmation, ExamSession, IntentKind, IntentToken, PendingIntent,
    SessionCommand, SessionEvent, SessionHandle, SessionLoopService, SessionNotice,
    SessionProgress, SessionView, SubmitFlow, SubmitOutcome, SubmitSummary, Submission,
    TickOutcome, spawn_session,
};
