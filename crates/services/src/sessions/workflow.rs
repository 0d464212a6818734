use std::sync::Arc;

use exam_core::model::{ExamPaper, ExamResult, SessionPolicy};
use exam_core::scoring;
use storage::repository::TimerSnapshotRepository;

use super::intent::{IntentToken, PendingIntent};
use super::service::{
    Confirmation, ExamSession, SessionNotice, Submission, SubmitOutcome, TickOutcome,
};
use crate::Clock;
use crate::error::SessionError;
use crate::result_sink::ResultSink;

/// Result of a submit request that went through the service.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitFlow {
    /// Waiting for the candidate to confirm.
    Pending(PendingIntent),
    Finished(ExamResult),
}

/// Result of confirming an intent through the service.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfirmFlow {
    SectionAdvanced { section: String },
    Finished(ExamResult),
}

/// Orchestrates session start, timer persistence and submission.
#[derive(Clone)]
pub struct SessionLoopService {
    clock: Clock,
    snapshots: Arc<dyn TimerSnapshotRepository>,
    policy: SessionPolicy,
    sink: Option<Arc<dyn ResultSink>>,
}

impl SessionLoopService {
    #[must_use]
    pub fn new(clock: Clock, snapshots: Arc<dyn TimerSnapshotRepository>) -> Self {
        Self {
            clock,
            snapshots,
            policy: SessionPolicy::default(),
            sink: None,
        }
    }

    #[must_use]
    pub fn with_policy(mut self, policy: SessionPolicy) -> Self {
        self.policy = policy;
        self
    }

    #[must_use]
    pub fn with_result_sink(mut self, sink: Arc<dyn ResultSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    #[must_use]
    pub fn policy(&self) -> &SessionPolicy {
        &self.policy
    }

    /// Start a session for `paper`, continuing a stored countdown if one exists.
    ///
    /// A snapshot that cannot be read is logged and ignored.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Storage` if the initial snapshot cannot be written.
    pub async fn start_session(&self, paper: Arc<ExamPaper>) -> Result<ExamSession, SessionError> {
        let key = self.policy.session_key();
        let stored = match self.snapshots.load_snapshot(key).await {
            Ok(stored) => stored,
            Err(err) => {
                tracing::warn!(key, error = %err, "could not load timer snapshot, starting fresh");
                None
            }
        };

        let session = match stored {
            Some(snapshot) => {
                let now = self.clock.epoch_millis();
                let session = ExamSession::resume(paper, self.policy.clone(), &snapshot, now);
                tracing::info!(
                    key,
                    saved = snapshot.remaining_seconds,
                    remaining = session.countdown().remaining(),
                    paused = snapshot.paused,
                    "resumed exam session from snapshot"
                );
                session
            }
            None => {
                let session = ExamSession::new(paper, self.policy.clone());
                tracing::info!(
                    key,
                    questions = session.paper().questions().len(),
                    duration = session.countdown().total(),
                    "started exam session"
                );
                session
            }
        };

        self.snapshots
            .save_snapshot(key, &session.snapshot(self.clock.epoch_millis()))
            .await?;
        Ok(session)
    }

    /// Advance the session by one second.
    ///
    /// Persists the countdown when a snapshot is due. Returns the scored
    /// result on the tick that exhausts the timer.
    pub async fn tick(&self, session: &mut ExamSession) -> Option<ExamResult> {
        match session.tick() {
            TickOutcome::Running {
                snapshot_due: true, ..
            } => {
                self.persist(session).await;
                None
            }
            TickOutcome::Expired(submission) => Some(self.finish(session, submission).await),
            TickOutcome::Running { .. } | TickOutcome::Paused | TickOutcome::Idle => None,
        }
    }

    /// Pause or resume the countdown and persist it.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Completed` after submission.
    pub async fn toggle_timer(&self, session: &mut ExamSession) -> Result<bool, SessionError> {
        let paused = session.toggle_timer()?;
        self.persist(session).await;
        Ok(paused)
    }

    /// Apply the focus-loss policy, persisting the countdown if it paused.
    pub async fn focus_lost(&self, session: &mut ExamSession) -> Option<SessionNotice> {
        let notice = session.focus_lost();
        if notice.is_some() {
            tracing::info!("timer paused on focus loss");
            self.persist(session).await;
        }
        notice
    }

    /// Submit the session, optionally skipping confirmation.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Completed` after submission.
    pub async fn submit(
        &self,
        session: &mut ExamSession,
        force: bool,
    ) -> Result<SubmitFlow, SessionError> {
        match session.submit(force)? {
            SubmitOutcome::Pending(intent) => Ok(SubmitFlow::Pending(intent)),
            SubmitOutcome::Finalized(submission) => {
                Ok(SubmitFlow::Finished(self.finish(session, submission).await))
            }
        }
    }

    /// Confirm the pending intent identified by `token`.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::UnknownIntent` for a stale token and
    /// `SessionError::Completed` after submission.
    pub async fn confirm(
        &self,
        session: &mut ExamSession,
        token: IntentToken,
    ) -> Result<ConfirmFlow, SessionError> {
        match session.confirm(token)? {
            Confirmation::SectionAdvanced { section } => {
                Ok(ConfirmFlow::SectionAdvanced { section })
            }
            Confirmation::Submitted(submission) => {
                Ok(ConfirmFlow::Finished(self.finish(session, submission).await))
            }
        }
    }

    /// Abandon a session and forget its stored countdown.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Storage` if the snapshot cannot be deleted.
    pub async fn exit_session(&self, session: ExamSession) -> Result<(), SessionError> {
        let key = self.policy.session_key();
        self.snapshots.delete_snapshot(key).await?;
        tracing::info!(
            key,
            remaining = session.countdown().remaining(),
            submitted = session.is_submitted(),
            "exam session exited"
        );
        Ok(())
    }

    /// Score a submission against the session's paper.
    #[must_use]
    pub fn score(&self, session: &ExamSession, submission: &Submission) -> ExamResult {
        let paper = session.paper();
        scoring::score(
            paper.questions(),
            paper.answer_key(),
            &submission.answers,
            &submission.statuses,
            submission.elapsed_seconds,
        )
    }

    async fn finish(&self, session: &ExamSession, submission: Submission) -> ExamResult {
        let key = self.policy.session_key();
        if let Err(err) = self.snapshots.delete_snapshot(key).await {
            tracing::warn!(key, error = %err, "could not delete timer snapshot");
        }

        let result = self.score(session, &submission);
        tracing::info!(
            score = %result.score_display(),
            attempted = result.attempted,
            correct = result.correct,
            wrong = result.wrong,
            ungraded = result.ungraded,
            time_taken = result.time_taken,
            "exam scored"
        );

        if let Some(sink) = &self.sink {
            if let Err(err) = sink.deliver(&result).await {
                tracing::warn!(error = %err, "result sink failed; result kept locally");
            }
        }
        result
    }

    async fn persist(&self, session: &ExamSession) {
        let key = self.policy.session_key();
        let snapshot = session.snapshot(self.clock.epoch_millis());
        if let Err(err) = self.snapshots.save_snapshot(key, &snapshot).await {
            tracing::warn!(key, error = %err, "could not save timer snapshot");
        }
    }
}
