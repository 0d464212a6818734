//! Line-oriented terminal front end for a running session.

use std::fmt::Write as _;

use exam_core::model::{Answer, ExamResult, QuestionStatus, QuestionType, option_label};
use services::{IntentToken, SessionCommand, SessionEvent, SessionView};

pub const HELP: &str = "\
commands:
  goto N [section]   jump to question N of the current (or named) section
  next | prev        save and move on / step back
  answer V           A-D for MCQ, letters like A,C for MSQ, a number for NAT
  mark | unmark      flag for review (and move on) / remove the flag
  clear              remove the current answer
  pause              pause or resume the timer
  blur               simulate the window losing focus
  submit             submit the exam (asks for confirmation)
  yes | no           answer the pending question
  status             show the current question
  quit               leave without submitting";

/// What to do with one line of input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Send(SessionCommand),
    Print(String),
    Quit,
}

/// Tracks what the terminal needs to interpret commands: the last view and
/// the token of the prompt on screen.
#[derive(Debug, Default)]
pub struct Console {
    view: Option<SessionView>,
    pending: Option<IntentToken>,
}

impl Console {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn handle_line(&self, line: &str) -> Action {
        let line = line.trim();
        let (word, rest) = line
            .split_once(char::is_whitespace)
            .map_or((line, ""), |(w, r)| (w, r.trim()));

        match word.to_ascii_lowercase().as_str() {
            "" => Action::Print(String::new()),
            "help" | "?" => Action::Print(HELP.to_string()),
            "goto" | "g" => self.goto(rest),
            "next" | "n" | "save" => Action::Send(SessionCommand::SaveAndNext),
            "prev" | "p" => Action::Send(SessionCommand::Previous),
            "answer" | "a" => self.answer(rest),
            "mark" => Action::Send(SessionCommand::MarkForReview),
            "unmark" => Action::Send(SessionCommand::UnmarkReview),
            "clear" => Action::Send(SessionCommand::ClearResponse),
            "pause" | "resume" => Action::Send(SessionCommand::ToggleTimer),
            "blur" => Action::Send(SessionCommand::FocusLost),
            "submit" => Action::Send(SessionCommand::Submit { force: false }),
            "yes" | "y" => self.resolve(SessionCommand::Confirm),
            "no" => self.resolve(SessionCommand::Cancel),
            "status" | "s" => Action::Print(
                self.view
                    .as_ref()
                    .map_or_else(|| "no session yet".to_string(), render_view),
            ),
            "quit" | "exit" | "q" => Action::Quit,
            other => Action::Print(format!("unknown command `{other}`; type `help`")),
        }
    }

    /// Absorb an event and return the text to print, if any.
    pub fn on_event(&mut self, event: SessionEvent) -> Option<String> {
        match event {
            SessionEvent::View(view) => {
                let changed = self.view.as_ref().is_none_or(|old| {
                    old.question != view.question || old.section != view.section
                });
                self.pending = view.pending.as_ref().map(|p| p.token);
                let text = changed.then(|| render_view(&view));
                self.view = Some(*view);
                text
            }
            SessionEvent::Prompt(intent) => {
                self.pending = Some(intent.token);
                Some(format!("{} [yes/no]", intent.prompt()))
            }
            SessionEvent::Notice(notice) => Some(notice.message().to_string()),
            SessionEvent::Rejected(reason) => Some(format!("! {reason}")),
            SessionEvent::Tick { remaining } => {
                if let Some(view) = self.view.as_mut() {
                    view.remaining_seconds = remaining;
                }
                match remaining {
                    300 => Some("5 minutes left".to_string()),
                    60 => Some("1 minute left".to_string()),
                    _ => None,
                }
            }
            SessionEvent::Finished(result) => Some(render_result(&result)),
            SessionEvent::Exited => Some("session closed without submitting".to_string()),
        }
    }

    fn goto(&self, rest: &str) -> Action {
        let (number, section) = rest
            .split_once(char::is_whitespace)
            .map_or((rest, None), |(n, s)| (n, Some(s.trim().to_string())));
        match number.parse::<usize>() {
            Ok(n) if n >= 1 => Action::Send(SessionCommand::Navigate {
                index: n - 1,
                section,
            }),
            _ => Action::Print("usage: goto N [section]".to_string()),
        }
    }

    fn answer(&self, raw: &str) -> Action {
        let Some(question) = self.view.as_ref().and_then(|v| v.question.as_ref()) else {
            return Action::Print("no question on screen".to_string());
        };
        match parse_answer(raw, question.question_type, question.options.len()) {
            Some(answer) => Action::Send(SessionCommand::SetAnswer(answer)),
            None => Action::Print(format!(
                "cannot read `{raw}` as a {} answer",
                question.question_type.as_str()
            )),
        }
    }

    fn resolve(&self, command: fn(IntentToken) -> SessionCommand) -> Action {
        match self.pending {
            Some(token) => Action::Send(command(token)),
            None => Action::Print("nothing to confirm".to_string()),
        }
    }
}

fn letter_index(raw: &str, options: usize) -> Option<usize> {
    let mut chars = raw.trim().chars();
    let letter = chars.next()?.to_ascii_uppercase();
    if chars.next().is_some() || !letter.is_ascii_uppercase() {
        return None;
    }
    let idx = usize::from(letter as u8 - b'A');
    (idx < options).then_some(idx)
}

/// Read terminal input as an answer for a question of the given type.
#[must_use]
pub fn parse_answer(raw: &str, question_type: QuestionType, options: usize) -> Option<Answer> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    match question_type {
        QuestionType::Mcq => letter_index(raw, options).map(Answer::Choice),
        QuestionType::Msq => raw
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|part| !part.is_empty())
            .map(|part| letter_index(part, options))
            .collect::<Option<Vec<_>>>()
            .map(Answer::choices),
        QuestionType::Nat => raw.parse::<f64>().is_ok().then(|| Answer::text(raw)),
    }
}

fn status_glyph(status: QuestionStatus) -> char {
    match status {
        QuestionStatus::NotVisited => '.',
        QuestionStatus::NotAnswered => 'o',
        QuestionStatus::Answered => '*',
        QuestionStatus::MarkedForReview => '?',
        QuestionStatus::AnsweredAndMarkedForReview => '!',
    }
}

fn answer_text(answer: &Answer) -> String {
    match answer {
        Answer::Choice(idx) => option_label(*idx),
        Answer::Choices(set) => set
            .iter()
            .map(|idx| option_label(*idx))
            .collect::<Vec<_>>()
            .join(","),
        Answer::Text(text) => text.clone(),
    }
}

#[must_use]
pub fn render_view(view: &SessionView) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "== {} | {} | {}{}",
        view.exam_name,
        view.section,
        view.remaining_display(),
        if view.paused { " (paused)" } else { "" }
    );
    let palette: String = view
        .palette
        .iter()
        .map(|entry| format!("{}{}", entry.index + 1, status_glyph(entry.status)))
        .collect::<Vec<_>>()
        .join(" ");
    let _ = writeln!(out, "   {palette}");

    if let Some(q) = &view.question {
        let _ = writeln!(
            out,
            "Q{} ({}/{}) [{}, {} mark{}]",
            q.number,
            view.index + 1,
            view.section_len,
            q.question_type.as_str(),
            q.marks,
            if q.marks == 1 { "" } else { "s" }
        );
        let _ = writeln!(out, "{}", q.text);
        for (idx, option) in q.options.iter().enumerate() {
            let _ = writeln!(out, "  {}. {option}", option_label(idx));
        }
        if let Some(answer) = &q.answer {
            let _ = writeln!(out, "your answer: {}", answer_text(answer));
        }
    }

    let p = view.progress;
    let _ = write!(
        out,
        "answered {} | not answered {} | marked {} | not visited {}",
        p.answered, p.not_answered, p.marked, p.not_visited
    );
    out
}

#[must_use]
pub fn render_result(result: &ExamResult) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "== result");
    let _ = writeln!(
        out,
        "score {} / {} ({}%)",
        result.score_display(),
        result.total_possible_score,
        result.percentage_display()
    );
    let _ = writeln!(
        out,
        "attempted {} of {} | correct {} | wrong {} | ungraded {}",
        result.attempted, result.total_questions, result.correct, result.wrong, result.ungraded
    );
    let _ = writeln!(
        out,
        "negative marks {} (1-mark wrong {}, 2-mark wrong {})",
        result.negative_marks_display(),
        result.one_mark_wrong,
        result.two_mark_wrong
    );
    let minutes = result.time_taken / 60;
    let seconds = result.time_taken % 60;
    let _ = write!(out, "time taken {minutes}m {seconds:02}s");
    out
}
