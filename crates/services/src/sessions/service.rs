use std::sync::Arc;

use exam_core::model::{
    Answer, AnswerSheet, ExamPaper, Question, QuestionStatus, QuestionType, SessionPolicy,
    StatusMap,
};
use exam_core::timer::{Countdown, Tick, TimerSnapshot};

use super::intent::{IntentKind, IntentToken, PendingIntent, SubmitSummary};
use super::progress::SessionProgress;
use super::view::{CurrentQuestion, PaletteEntry, SessionView};
use crate::error::SessionError;

//
// ─── OUTCOMES ──────────────────────────────────────────────────────────────────
//

/// Final payload handed to scoring when a session ends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub answers: AnswerSheet,
    pub elapsed_seconds: u32,
    pub statuses: StatusMap,
}

/// Where the cursor went after a save or mark.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Advance {
    /// Moved to the next question in the section.
    Moved,
    /// End of a section with another after it; confirm to switch.
    Prompt(PendingIntent),
    /// End of the last section; the cursor did not move.
    Stayed,
}

/// Outcome of `ExamSession::submit`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Pending(PendingIntent),
    Finalized(Submission),
}

/// Outcome of confirming a pending intent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Confirmation {
    SectionAdvanced { section: String },
    Submitted(Submission),
}

/// Outcome of one wall-clock second.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    Running { remaining: u32, snapshot_due: bool },
    Paused,
    /// Time ran out and the session was submitted.
    Expired(Submission),
    /// The session is already over.
    Idle,
}

/// Something the candidate should be told about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionNotice {
    PausedOnFocusLoss,
}

impl SessionNotice {
    #[must_use]
    pub fn message(self) -> &'static str {
        match self {
            SessionNotice::PausedOnFocusLoss => {
                "Timer paused because the exam window lost focus. Resume to continue."
            }
        }
    }
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// One candidate's attempt at an exam paper.
///
/// Owns the cursor, the answer sheet, the per-question statuses and the
/// countdown. Once submitted, every mutating operation fails with
/// `SessionError::Completed`.
pub struct ExamSession {
    paper: Arc<ExamPaper>,
    policy: SessionPolicy,
    section: usize,
    index: usize,
    answers: AnswerSheet,
    statuses: StatusMap,
    countdown: Countdown,
    running_since_snapshot: u32,
    pending: Option<PendingIntent>,
    next_token: u64,
    submitted: bool,
}

impl ExamSession {
    /// Start a fresh session with the full configured duration.
    #[must_use]
    pub fn new(paper: Arc<ExamPaper>, policy: SessionPolicy) -> Self {
        let countdown = Countdown::new(paper.config().duration_secs());
        Self::with_countdown(paper, policy, countdown)
    }

    /// Start a session whose countdown continues from a stored snapshot.
    #[must_use]
    pub fn resume(
        paper: Arc<ExamPaper>,
        policy: SessionPolicy,
        snapshot: &TimerSnapshot,
        now_millis: i64,
    ) -> Self {
        let countdown = Countdown::resume(paper.config().duration_secs(), snapshot, now_millis);
        Self::with_countdown(paper, policy, countdown)
    }

    fn with_countdown(paper: Arc<ExamPaper>, policy: SessionPolicy, countdown: Countdown) -> Self {
        let questions = paper.questions();
        let statuses = StatusMap::not_visited(questions.questions().iter().map(Question::id));
        let section = questions.initial_section();
        let mut session = Self {
            paper,
            policy,
            section,
            index: 0,
            answers: AnswerSheet::new(),
            statuses,
            countdown,
            running_since_snapshot: 0,
            pending: None,
            next_token: 0,
            submitted: false,
        };
        session.visit_current();
        session
    }

    #[must_use]
    pub fn paper(&self) -> &ExamPaper {
        &self.paper
    }

    #[must_use]
    pub fn policy(&self) -> &SessionPolicy {
        &self.policy
    }

    #[must_use]
    pub fn answers(&self) -> &AnswerSheet {
        &self.answers
    }

    #[must_use]
    pub fn statuses(&self) -> &StatusMap {
        &self.statuses
    }

    #[must_use]
    pub fn countdown(&self) -> &Countdown {
        &self.countdown
    }

    #[must_use]
    pub fn pending(&self) -> Option<&PendingIntent> {
        self.pending.as_ref()
    }

    #[must_use]
    pub fn is_submitted(&self) -> bool {
        self.submitted
    }

    /// Current `(section index, in-section index)`.
    #[must_use]
    pub fn position(&self) -> (usize, usize) {
        (self.section, self.index)
    }

    #[must_use]
    pub fn section_name(&self) -> &str {
        self.paper
            .questions()
            .sections()
            .get(self.section)
            .map_or("", String::as_str)
    }

    #[must_use]
    pub fn current_question(&self) -> Option<&Question> {
        self.paper.questions().in_section(self.section, self.index)
    }

    //
    // ─── NAVIGATION ────────────────────────────────────────────────────────────
    //

    /// Jump to `index` within `section` (or the current section).
    ///
    /// Returns `Ok(false)` and leaves the session untouched when the target
    /// does not exist.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Completed` after submission.
    pub fn navigate(&mut self, index: usize, section: Option<&str>) -> Result<bool, SessionError> {
        self.ensure_active()?;
        let questions = self.paper.questions();
        let section_idx = match section {
            Some(name) => match questions.section_index(name) {
                Some(idx) => idx,
                None => return Ok(false),
            },
            None => self.section,
        };
        if questions.in_section(section_idx, index).is_none() {
            return Ok(false);
        }

        self.pending = None;
        self.move_to(section_idx, index);
        Ok(true)
    }

    /// Step back one question; a no-op on the first question of a section.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Completed` after submission.
    pub fn previous(&mut self) -> Result<bool, SessionError> {
        self.ensure_active()?;
        self.pending = None;
        if self.index == 0 {
            return Ok(false);
        }
        self.move_to(self.section, self.index - 1);
        Ok(true)
    }

    /// Commit the current question and move on.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Completed` after submission.
    pub fn save_and_next(&mut self) -> Result<Advance, SessionError> {
        self.ensure_active()?;
        self.pending = None;
        self.update_current(QuestionStatus::saved);
        Ok(self.advance())
    }

    /// Flag the current question for review and move on.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Completed` after submission.
    pub fn mark_for_review(&mut self) -> Result<Advance, SessionError> {
        self.ensure_active()?;
        self.pending = None;
        self.update_current(QuestionStatus::marked);
        Ok(self.advance())
    }

    /// Remove the review flag from the current question.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Completed` after submission.
    pub fn unmark_review(&mut self) -> Result<(), SessionError> {
        self.ensure_active()?;
        self.pending = None;
        self.update_current(QuestionStatus::unmarked);
        Ok(())
    }

    /// Drop the current answer and mark the question not answered.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Completed` after submission.
    pub fn clear_response(&mut self) -> Result<(), SessionError> {
        self.ensure_active()?;
        self.pending = None;
        if let Some(id) = self.current_question().map(|q| q.id().clone()) {
            self.answers.remove(&id);
            self.statuses.set(&id, QuestionStatus::NotAnswered);
        }
        Ok(())
    }

    /// Replace the answer to the current question without touching its status.
    ///
    /// Answers that do not fit the question (wrong shape or an option index
    /// out of range) are ignored and `Ok(false)` is returned.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Completed` after submission.
    pub fn set_answer(&mut self, answer: Answer) -> Result<bool, SessionError> {
        self.ensure_active()?;
        let Some(question) = self.current_question() else {
            return Ok(false);
        };
        if !fits(question, &answer) {
            tracing::debug!(id = %question.id(), ?answer, "answer does not fit question");
            return Ok(false);
        }
        let id = question.id().clone();
        self.pending = None;
        self.answers.set(id, answer);
        Ok(true)
    }

    //
    // ─── CONFIRMATIONS ─────────────────────────────────────────────────────────
    //

    /// Submit the exam. Without `force` a confirmation is requested first.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Completed` after submission.
    pub fn submit(&mut self, force: bool) -> Result<SubmitOutcome, SessionError> {
        self.ensure_active()?;
        if force {
            return Ok(SubmitOutcome::Finalized(self.finalize()));
        }
        Ok(SubmitOutcome::Pending(self.request_submit()?))
    }

    /// Ask for confirmation before submitting.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Completed` after submission.
    pub fn request_submit(&mut self) -> Result<PendingIntent, SessionError> {
        self.ensure_active()?;
        let progress = self.progress();
        let summary = SubmitSummary {
            total: progress.total,
            answered: progress.answered,
            not_answered: progress.not_answered,
            marked: progress.marked,
        };
        Ok(self.issue(IntentKind::Submit(summary)))
    }

    /// Ask for confirmation before moving to the next section.
    ///
    /// Returns `Ok(None)` when the current section is the last one.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Completed` after submission.
    pub fn request_section_advance(&mut self) -> Result<Option<PendingIntent>, SessionError> {
        self.ensure_active()?;
        let sections = self.paper.questions().sections();
        let (Some(from), Some(to)) = (sections.get(self.section), sections.get(self.section + 1))
        else {
            return Ok(None);
        };
        let kind = IntentKind::SectionAdvance {
            from: from.clone(),
            to: to.clone(),
        };
        Ok(Some(self.issue(kind)))
    }

    /// Carry out the pending intent identified by `token`.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::UnknownIntent` for a stale or unknown token and
    /// `SessionError::Completed` after submission.
    pub fn confirm(&mut self, token: IntentToken) -> Result<Confirmation, SessionError> {
        self.ensure_active()?;
        let intent = self.take_pending(token)?;
        match intent.kind {
            IntentKind::Submit(_) => Ok(Confirmation::Submitted(self.finalize())),
            IntentKind::SectionAdvance { to, .. } => {
                let Some(section_idx) = self.paper.questions().section_index(&to) else {
                    return Err(SessionError::UnknownIntent(token));
                };
                self.move_to(section_idx, 0);
                tracing::debug!(section = %to, "section advanced");
                Ok(Confirmation::SectionAdvanced { section: to })
            }
        }
    }

    /// Dismiss the pending intent identified by `token`.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::UnknownIntent` for a stale or unknown token and
    /// `SessionError::Completed` after submission.
    pub fn cancel(&mut self, token: IntentToken) -> Result<(), SessionError> {
        self.ensure_active()?;
        self.take_pending(token)?;
        Ok(())
    }

    //
    // ─── TIMER ─────────────────────────────────────────────────────────────────
    //

    /// Pause or resume the countdown; returns the new paused flag.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Completed` after submission.
    pub fn toggle_timer(&mut self) -> Result<bool, SessionError> {
        self.ensure_active()?;
        let paused = self.countdown.toggle_pause();
        tracing::debug!(paused, remaining = self.countdown.remaining(), "timer toggled");
        Ok(paused)
    }

    /// The exam window lost focus. Pauses the countdown when the policy asks
    /// for it and the timer was running.
    pub fn focus_lost(&mut self) -> Option<SessionNotice> {
        if self.submitted || !self.policy.pause_on_focus_loss() {
            return None;
        }
        self.countdown
            .pause()
            .then_some(SessionNotice::PausedOnFocusLoss)
    }

    /// Advance the countdown by one second.
    ///
    /// Reaching zero submits the session; that happens exactly once.
    pub fn tick(&mut self) -> TickOutcome {
        if self.submitted {
            return TickOutcome::Idle;
        }
        match self.countdown.tick() {
            Tick::Running { remaining } => {
                self.running_since_snapshot += 1;
                let snapshot_due =
                    self.running_since_snapshot >= self.policy.snapshot_interval_secs();
                if snapshot_due {
                    self.running_since_snapshot = 0;
                }
                TickOutcome::Running {
                    remaining,
                    snapshot_due,
                }
            }
            Tick::Paused => TickOutcome::Paused,
            Tick::Expired => {
                tracing::info!("time expired, submitting");
                TickOutcome::Expired(self.finalize())
            }
            Tick::Stopped => TickOutcome::Idle,
        }
    }

    /// Durable record of the countdown as of `now_millis`.
    #[must_use]
    pub fn snapshot(&self, now_millis: i64) -> TimerSnapshot {
        self.countdown.snapshot(now_millis)
    }

    //
    // ─── READ MODELS ───────────────────────────────────────────────────────────
    //

    /// Palette counts across all sections.
    #[must_use]
    pub fn progress(&self) -> SessionProgress {
        let total = self.paper.questions().len();
        let answered = self.answers.answered_count();
        SessionProgress {
            total,
            answered,
            not_answered: total.saturating_sub(answered),
            marked: self.statuses.count(QuestionStatus::is_marked),
            not_visited: self.statuses.count(|s| s == QuestionStatus::NotVisited),
        }
    }

    #[must_use]
    pub fn view(&self) -> SessionView {
        let questions = self.paper.questions();
        let section_len = questions.section_len(self.section);
        let palette = (0..section_len)
            .filter_map(|index| questions.in_section(self.section, index).map(|q| (index, q)))
            .map(|(index, q)| PaletteEntry {
                index,
                number: questions.global_number(q.id()).unwrap_or(0),
                id: q.id().clone(),
                status: self.statuses.get(q.id()),
            })
            .collect();
        let question = self.current_question().map(|q| CurrentQuestion {
            id: q.id().clone(),
            number: questions.global_number(q.id()).unwrap_or(0),
            question_type: q.question_type(),
            marks: q.marks().value(),
            text: q.text().to_string(),
            options: q.options().to_vec(),
            answer: self.answers.get(q.id()).cloned(),
            status: self.statuses.get(q.id()),
        });

        SessionView {
            exam_name: self.paper.config().exam_name().to_string(),
            sections: questions.sections().to_vec(),
            section: self.section_name().to_string(),
            index: self.index,
            section_len,
            question,
            palette,
            progress: self.progress(),
            remaining_seconds: self.countdown.remaining(),
            paused: self.countdown.is_paused(),
            submitted: self.submitted,
            pending: self.pending.clone(),
        }
    }

    //
    // ─── INTERNALS ─────────────────────────────────────────────────────────────
    //

    fn ensure_active(&self) -> Result<(), SessionError> {
        if self.submitted {
            Err(SessionError::Completed)
        } else {
            Ok(())
        }
    }

    fn visit_current(&mut self) {
        if let Some(id) = self.current_question().map(|q| q.id().clone()) {
            self.statuses.visit(&id);
        }
    }

    fn move_to(&mut self, section: usize, index: usize) {
        self.section = section;
        self.index = index;
        self.visit_current();
    }

    fn update_current(&mut self, transition: fn(bool) -> QuestionStatus) {
        if let Some(id) = self.current_question().map(|q| q.id().clone()) {
            let status = transition(self.answers.has_answer(&id));
            self.statuses.set(&id, status);
        }
    }

    fn advance(&mut self) -> Advance {
        let next = self.index + 1;
        if next < self.paper.questions().section_len(self.section) {
            self.move_to(self.section, next);
            return Advance::Moved;
        }
        match self.request_section_advance() {
            Ok(Some(intent)) => Advance::Prompt(intent),
            Ok(None) | Err(_) => Advance::Stayed,
        }
    }

    fn issue(&mut self, kind: IntentKind) -> PendingIntent {
        self.next_token += 1;
        let intent = PendingIntent {
            token: IntentToken::new(self.next_token),
            kind,
        };
        self.pending = Some(intent.clone());
        intent
    }

    fn take_pending(&mut self, token: IntentToken) -> Result<PendingIntent, SessionError> {
        match self.pending.take() {
            Some(intent) if intent.token == token => Ok(intent),
            other => {
                self.pending = other;
                Err(SessionError::UnknownIntent(token))
            }
        }
    }

    fn finalize(&mut self) -> Submission {
        self.countdown.stop();
        self.submitted = true;
        self.pending = None;
        let submission = Submission {
            answers: self.answers.clone(),
            elapsed_seconds: self.countdown.elapsed(),
            statuses: self.statuses.clone(),
        };
        tracing::info!(
            elapsed = submission.elapsed_seconds,
            answered = submission.answers.answered_count(),
            "session submitted"
        );
        submission
    }
}

fn fits(question: &Question, answer: &Answer) -> bool {
    let options = question.options().len();
    match (question.question_type(), answer) {
        (QuestionType::Mcq, Answer::Choice(idx)) => *idx < options,
        (QuestionType::Msq, Answer::Choices(set)) => set.iter().all(|idx| *idx < options),
        (QuestionType::Msq, Answer::Choice(idx)) => *idx < options,
        (QuestionType::Nat, Answer::Text(_)) => true,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use exam_core::model::{AnswerKey, ExamConfig, QuestionId, QuestionSet};

    const QUESTIONS: &str = r#"[
        {"id": 1, "section": "General Aptitude", "type": "MCQ", "marks": 2,
         "question": "Q1", "options": ["a", "b", "c", "d"]},
        {"id": 2, "section": "General Aptitude", "type": "MSQ", "marks": 1,
         "question": "Q2", "options": ["a", "b", "c", "d"]},
        {"id": 3, "section": "Computer Science", "type": "MCQ", "marks": 1,
         "question": "Q3", "options": ["a", "b", "c", "d"]},
        {"id": 4, "section": "Computer Science", "type": "NAT", "marks": 2,
         "question": "Q4"}
    ]"#;

    fn paper_from(json: &str, minutes: u32) -> Arc<ExamPaper> {
        let questions = QuestionSet::from_json(json).unwrap();
        let key = AnswerKey::from_json(r#"{"1":"B","2":["A","C"],"3":"A","4":"7"}"#, &questions);
        let config = ExamConfig::default().with_duration_minutes(minutes);
        Arc::new(ExamPaper::new(config, questions, key))
    }

    fn paper(minutes: u32) -> Arc<ExamPaper> {
        paper_from(QUESTIONS, minutes)
    }

    fn session() -> ExamSession {
        ExamSession::new(paper(180), SessionPolicy::default())
    }

    fn id(n: u64) -> QuestionId {
        QuestionId::from(n)
    }

    #[test]
    fn starts_on_first_question_and_visits_it() {
        let s = session();
        assert_eq!(s.section_name(), "General Aptitude");
        assert_eq!(s.current_question().unwrap().id(), &id(1));
        assert_eq!(s.statuses().get(&id(1)), QuestionStatus::NotAnswered);
        assert_eq!(s.statuses().get(&id(2)), QuestionStatus::NotVisited);
        assert_eq!(s.progress().not_visited, 3);
    }

    #[test]
    fn prefers_general_aptitude_even_when_listed_later() {
        let json = r#"[
            {"id": "cs1", "section": "Computer Science", "type": "NAT", "marks": 1, "question": "x"},
            {"id": "ga1", "section": "General Aptitude", "type": "NAT", "marks": 1, "question": "y"}
        ]"#;
        let mut s = ExamSession::new(paper_from(json, 10), SessionPolicy::default());
        assert_eq!(s.section_name(), "General Aptitude");
        assert_eq!(s.position(), (1, 0));
        // General Aptitude is the last section in paper order.
        assert_eq!(s.save_and_next().unwrap(), Advance::Stayed);
    }

    #[test]
    fn visitation_is_idempotent_and_never_reverts() {
        let mut s = session();
        s.set_answer(Answer::Choice(1)).unwrap();
        s.save_and_next().unwrap();
        assert_eq!(s.statuses().get(&id(1)), QuestionStatus::Answered);

        assert!(s.navigate(0, None).unwrap());
        assert!(s.navigate(0, None).unwrap());
        assert_eq!(s.statuses().get(&id(1)), QuestionStatus::Answered);
    }

    #[test]
    fn invalid_navigation_is_a_noop() {
        let mut s = session();
        assert!(!s.navigate(9, None).unwrap());
        assert!(!s.navigate(0, Some("History")).unwrap());
        assert_eq!(s.position(), (0, 0));

        assert!(s.navigate(1, Some("Computer Science")).unwrap());
        assert_eq!(s.current_question().unwrap().id(), &id(4));
        assert_eq!(s.statuses().get(&id(4)), QuestionStatus::NotAnswered);
        assert_eq!(s.statuses().get(&id(3)), QuestionStatus::NotVisited);
    }

    #[test]
    fn previous_stops_at_section_start() {
        let mut s = session();
        assert!(!s.previous().unwrap());
        s.save_and_next().unwrap();
        assert!(s.previous().unwrap());
        assert_eq!(s.position(), (0, 0));
    }

    #[test]
    fn save_tracks_answer_presence() {
        let mut s = session();
        s.save_and_next().unwrap();
        assert_eq!(s.statuses().get(&id(1)), QuestionStatus::NotAnswered);

        s.set_answer(Answer::choices([0, 2])).unwrap();
        assert_eq!(s.statuses().get(&id(2)), QuestionStatus::NotAnswered);
        s.save_and_next().unwrap();
        assert_eq!(s.statuses().get(&id(2)), QuestionStatus::Answered);
    }

    #[test]
    fn mark_unmark_and_clear_keep_status_coherent() {
        let mut s = session();
        s.mark_for_review().unwrap();
        assert_eq!(s.statuses().get(&id(1)), QuestionStatus::MarkedForReview);

        s.navigate(0, None).unwrap();
        s.set_answer(Answer::Choice(3)).unwrap();
        s.mark_for_review().unwrap();
        assert_eq!(
            s.statuses().get(&id(1)),
            QuestionStatus::AnsweredAndMarkedForReview
        );

        s.navigate(0, None).unwrap();
        s.unmark_review().unwrap();
        assert_eq!(s.statuses().get(&id(1)), QuestionStatus::Answered);

        s.clear_response().unwrap();
        assert_eq!(s.statuses().get(&id(1)), QuestionStatus::NotAnswered);
        assert!(s.answers().get(&id(1)).is_none());
        assert_eq!(s.position(), (0, 0));
    }

    #[test]
    fn answers_that_do_not_fit_are_ignored() {
        let mut s = session();
        assert!(!s.set_answer(Answer::Choice(7)).unwrap());
        assert!(!s.set_answer(Answer::text("4")).unwrap());
        assert!(s.answers().get(&id(1)).is_none());
        assert!(s.set_answer(Answer::Choice(3)).unwrap());
    }

    #[test]
    fn section_end_prompts_and_confirm_switches() {
        let mut s = session();
        assert_eq!(s.save_and_next().unwrap(), Advance::Moved);
        let Advance::Prompt(intent) = s.save_and_next().unwrap() else {
            panic!("expected section prompt");
        };
        assert_eq!(
            intent.kind,
            IntentKind::SectionAdvance {
                from: "General Aptitude".into(),
                to: "Computer Science".into(),
            }
        );
        assert_eq!(s.position(), (0, 1));

        let confirmed = s.confirm(intent.token).unwrap();
        assert_eq!(
            confirmed,
            Confirmation::SectionAdvanced {
                section: "Computer Science".into()
            }
        );
        assert_eq!(s.position(), (1, 0));
        assert_eq!(s.statuses().get(&id(3)), QuestionStatus::NotAnswered);
    }

    #[test]
    fn cancelled_section_prompt_keeps_position() {
        let mut s = session();
        s.navigate(1, None).unwrap();
        let Advance::Prompt(intent) = s.mark_for_review().unwrap() else {
            panic!("expected section prompt");
        };
        s.cancel(intent.token).unwrap();
        assert_eq!(s.position(), (0, 1));
        assert!(s.pending().is_none());
    }

    #[test]
    fn last_section_end_stays_put() {
        let mut s = session();
        s.navigate(1, Some("Computer Science")).unwrap();
        assert_eq!(s.save_and_next().unwrap(), Advance::Stayed);
        assert_eq!(s.position(), (1, 1));
        assert!(s.request_section_advance().unwrap().is_none());
    }

    #[test]
    fn stale_tokens_are_rejected() {
        let mut s = session();
        let first = s.request_submit().unwrap();
        let second = s.request_submit().unwrap();
        assert_ne!(first.token, second.token);

        assert!(matches!(
            s.confirm(first.token),
            Err(SessionError::UnknownIntent(_))
        ));
        assert_eq!(s.pending(), Some(&second));

        s.cancel(second.token).unwrap();
        assert!(matches!(
            s.cancel(second.token),
            Err(SessionError::UnknownIntent(_))
        ));
    }

    #[test]
    fn navigation_drops_pending_intent() {
        let mut s = session();
        let intent = s.request_submit().unwrap();
        s.navigate(1, None).unwrap();
        assert!(s.pending().is_none());
        assert!(s.confirm(intent.token).is_err());
        assert!(!s.is_submitted());
    }

    #[test]
    fn submit_summary_counts_progress() {
        let mut s = session();
        s.set_answer(Answer::Choice(1)).unwrap();
        s.mark_for_review().unwrap();
        let SubmitOutcome::Pending(intent) = s.submit(false).unwrap() else {
            panic!("expected confirmation");
        };
        assert_eq!(
            intent.kind,
            IntentKind::Submit(SubmitSummary {
                total: 4,
                answered: 1,
                not_answered: 3,
                marked: 1,
            })
        );
    }

    #[test]
    fn confirmed_submit_is_terminal() {
        let mut s = session();
        for _ in 0..5 {
            s.tick();
        }
        let intent = s.request_submit().unwrap();
        let Confirmation::Submitted(submission) = s.confirm(intent.token).unwrap() else {
            panic!("expected submission");
        };
        assert_eq!(submission.elapsed_seconds, 5);
        assert!(s.is_submitted());

        assert!(matches!(s.save_and_next(), Err(SessionError::Completed)));
        assert!(matches!(s.navigate(0, None), Err(SessionError::Completed)));
        assert!(matches!(s.submit(true), Err(SessionError::Completed)));
        assert!(matches!(s.toggle_timer(), Err(SessionError::Completed)));
        assert_eq!(s.tick(), TickOutcome::Idle);
        assert!(s.focus_lost().is_none());
    }

    #[test]
    fn expiry_submits_exactly_once() {
        let mut s = ExamSession::new(paper(1), SessionPolicy::default());
        let mut submissions = Vec::new();
        for _ in 0..61 {
            if let TickOutcome::Expired(submission) = s.tick() {
                submissions.push(submission);
            }
        }
        assert_eq!(submissions.len(), 1);
        assert_eq!(submissions[0].elapsed_seconds, 60);
        assert!(s.is_submitted());
    }

    #[test]
    fn paused_timer_does_not_count_down() {
        let mut s = session();
        assert!(s.toggle_timer().unwrap());
        assert_eq!(s.tick(), TickOutcome::Paused);
        assert_eq!(s.countdown().remaining(), 180 * 60);
        assert!(!s.toggle_timer().unwrap());
        assert!(matches!(
            s.tick(),
            TickOutcome::Running { remaining, .. } if remaining == 180 * 60 - 1
        ));
    }

    #[test]
    fn snapshot_is_due_every_interval() {
        let policy = SessionPolicy::default().with_snapshot_interval_secs(3);
        let mut s = ExamSession::new(paper(5), policy);
        let due: Vec<bool> = (0..6)
            .map(|_| match s.tick() {
                TickOutcome::Running { snapshot_due, .. } => snapshot_due,
                other => panic!("unexpected tick {other:?}"),
            })
            .collect();
        assert_eq!(due, vec![false, false, true, false, false, true]);
    }

    #[test]
    fn focus_loss_pauses_only_when_enabled_and_running() {
        let mut s = session();
        assert_eq!(s.focus_lost(), Some(SessionNotice::PausedOnFocusLoss));
        assert!(s.countdown().is_paused());
        assert_eq!(s.focus_lost(), None);

        let mut relaxed = ExamSession::new(
            paper(180),
            SessionPolicy::default().with_pause_on_focus_loss(false),
        );
        assert_eq!(relaxed.focus_lost(), None);
        assert!(!relaxed.countdown().is_paused());
    }

    #[test]
    fn resume_applies_elapsed_time_to_running_snapshot() {
        let snapshot = TimerSnapshot::new(600, false, 1_000_000);
        let s = ExamSession::resume(paper(180), SessionPolicy::default(), &snapshot, 1_045_500);
        assert_eq!(s.countdown().remaining(), 555);
        assert!(!s.countdown().is_paused());

        let paused = TimerSnapshot::new(600, true, 1_000_000);
        let s = ExamSession::resume(paper(180), SessionPolicy::default(), &paused, 9_000_000);
        assert_eq!(s.countdown().remaining(), 600);
        assert!(s.countdown().is_paused());
    }

    #[test]
    fn view_reports_current_question_and_palette() {
        let mut s = session();
        s.set_answer(Answer::Choice(2)).unwrap();
        let view = s.view();
        assert_eq!(view.section, "General Aptitude");
        assert_eq!(view.section_len, 2);
        let current = view.question.unwrap();
        assert_eq!(current.number, 1);
        assert_eq!(current.marks, 2);
        assert_eq!(current.answer, Some(Answer::Choice(2)));
        assert_eq!(view.palette.len(), 2);
        assert_eq!(view.palette[1].number, 2);
        assert_eq!(view.palette[1].status, QuestionStatus::NotVisited);
        assert_eq!(view.progress.answered, 1);
    }
}
