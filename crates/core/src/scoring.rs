//! Marking scheme and result computation.
//!
//! Scoring is a pure function of the question set, the normalized answer key,
//! the submitted answers and the final status map. Marks are summed in
//! thirds so that `-1/3` and `-2/3` penalties aggregate without drift.
//!
//! # Examples
//!
//! ```
//! # use exam_core::model::{AnswerKey, AnswerSheet, Answer, KeyEntry, QuestionId, QuestionSet, StatusMap};
//! # use exam_core::scoring::score;
//! let questions = QuestionSet::from_json(
//!     r#"[{"id": 1, "section": "GA", "type": "MCQ", "marks": 2, "options": ["a","b","c","d"]}]"#,
//! )?;
//! let mut key = AnswerKey::empty();
//! key.insert(QuestionId::from(1), KeyEntry::Mcq { value: 2 });
//!
//! let mut answers = AnswerSheet::new();
//! answers.set(QuestionId::from(1), Answer::Choice(0));
//!
//! let result = score(&questions, &key, &answers, &StatusMap::default(), 60);
//! assert_eq!(result.wrong, 1);
//! assert_eq!(result.score, 0.0);
//! # Ok::<(), exam_core::model::QuestionSetError>(())
//! ```

use crate::model::{
    Answer, AnswerKey, AnswerSheet, ExamResult, GradeStatus, KeyEntry, Marks, Question,
    QuestionResult, QuestionStatus, QuestionType, QuestionSet, StatusMap,
};

//
// ─── GRADE ─────────────────────────────────────────────────────────────────────
//

/// Grading outcome for one question, in thirds of a mark.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Grade {
    pub status: GradeStatus,
    pub thirds: i64,
}

impl Grade {
    const NOT_ATTEMPTED: Self = Self {
        status: GradeStatus::NotAttempted,
        thirds: 0,
    };
    const UNGRADED: Self = Self {
        status: GradeStatus::Ungraded,
        thirds: 0,
    };

    #[must_use]
    pub fn is_correct(&self) -> bool {
        self.status == GradeStatus::Correct
    }

    #[must_use]
    pub fn is_attempted(&self) -> bool {
        self.status != GradeStatus::NotAttempted
    }

    /// Marks obtained as a decimal value.
    #[must_use]
    pub fn marks(&self) -> f64 {
        thirds_to_marks(self.thirds)
    }

    fn correct(marks: Marks) -> Self {
        Self {
            status: GradeStatus::Correct,
            thirds: marks.reward_thirds(),
        }
    }

    fn wrong(penalty_thirds: i64) -> Self {
        Self {
            status: GradeStatus::Wrong,
            thirds: -penalty_thirds,
        }
    }
}

fn thirds_to_marks(thirds: i64) -> f64 {
    thirds as f64 / 3.0
}

/// Grade a single question.
///
/// - MCQ: `+marks` when correct, `-marks/3` when wrong.
/// - MSQ: exact set match for `+marks`; wrong answers cost nothing.
/// - NAT: exact, set-member or inclusive-range match for `+marks`; no penalty.
///
/// An answered question whose key is missing or cannot grade its type is
/// `Ungraded` with zero marks.
#[must_use]
pub fn grade_question(question: &Question, key: Option<&KeyEntry>, answer: Option<&Answer>) -> Grade {
    let Some(answer) = answer.filter(|a| a.is_present()) else {
        return Grade::NOT_ATTEMPTED;
    };
    let Some(key) = key.filter(|k| k.grades(question.question_type())) else {
        return Grade::UNGRADED;
    };

    let marks = question.marks();
    let correct = match (question.question_type(), key) {
        (QuestionType::Mcq, KeyEntry::Mcq { value }) => answer.as_choice() == Some(*value),
        (QuestionType::Msq, KeyEntry::Msq { values }) => answer.as_choices() == *values,
        (QuestionType::Nat, entry) => nat_matches(&answer.as_text(), entry),
        _ => return Grade::UNGRADED,
    };

    if correct {
        return Grade::correct(marks);
    }
    match question.question_type() {
        QuestionType::Mcq => Grade::wrong(marks.mcq_penalty_thirds()),
        QuestionType::Msq | QuestionType::Nat => Grade::wrong(0),
    }
}

fn nat_matches(answer: &str, key: &KeyEntry) -> bool {
    match key {
        KeyEntry::NatSingle { value } => answer == value,
        KeyEntry::NatSet { values } => values.iter().any(|v| v == answer),
        KeyEntry::NatRange { min, max } => answer
            .trim()
            .parse::<f64>()
            .is_ok_and(|v| v.is_finite() && *min <= v && v <= *max),
        KeyEntry::Mcq { .. } | KeyEntry::Msq { .. } => false,
    }
}

//
// ─── AGGREGATION ───────────────────────────────────────────────────────────────
//

#[derive(Debug, Default)]
struct Tally {
    attempted: u32,
    correct: u32,
    wrong: u32,
    ungraded: u32,
    one_mark_wrong: u32,
    two_mark_wrong: u32,
    total_thirds: i64,
    penalty_thirds: i64,
}

impl Tally {
    fn record(&mut self, question: &Question, grade: Grade) {
        self.total_thirds += grade.thirds;
        match grade.status {
            GradeStatus::NotAttempted => return,
            GradeStatus::Correct => self.correct = self.correct.saturating_add(1),
            GradeStatus::Ungraded => self.ungraded = self.ungraded.saturating_add(1),
            GradeStatus::Wrong => {
                self.wrong = self.wrong.saturating_add(1);
                if question.question_type() == QuestionType::Mcq {
                    match question.marks() {
                        Marks::One => self.one_mark_wrong = self.one_mark_wrong.saturating_add(1),
                        Marks::Two => self.two_mark_wrong = self.two_mark_wrong.saturating_add(1),
                    }
                }
                if grade.thirds < 0 {
                    self.penalty_thirds += -grade.thirds;
                }
            }
        }
        self.attempted = self.attempted.saturating_add(1);
    }
}

/// Score a finished session.
///
/// The total is floored at zero; per-question marks are not. Percentage is
/// `0` when the paper has no marks.
#[must_use]
pub fn score(
    questions: &QuestionSet,
    key: &AnswerKey,
    answers: &AnswerSheet,
    statuses: &StatusMap,
    time_taken: u32,
) -> ExamResult {
    let mut tally = Tally::default();
    let mut records = Vec::with_capacity(questions.len());

    for question in questions.questions() {
        let entry = key.get(question.id());
        let answer = answers.get(question.id());
        let grade = grade_question(question, entry, answer);
        tally.record(question, grade);

        records.push(QuestionResult {
            id: question.id().clone(),
            section: question.section().to_string(),
            question_type: question.question_type(),
            marks: question.marks(),
            question: question.text().to_string(),
            options: question.options().to_vec(),
            user_answer: answer.cloned(),
            correct_answer: entry.cloned(),
            is_correct: grade.is_correct(),
            marks_obtained: grade.marks(),
            status: grade.status,
            review_status: statuses.get(question.id()),
        });
    }

    let total_possible_score = questions.total_marks();
    let score = thirds_to_marks(tally.total_thirds.max(0));
    let percentage = if total_possible_score > 0 {
        score / f64::from(total_possible_score) * 100.0
    } else {
        0.0
    };

    ExamResult {
        score,
        attempted: tally.attempted,
        correct: tally.correct,
        wrong: tally.wrong,
        ungraded: tally.ungraded,
        total_questions: u32::try_from(questions.len()).unwrap_or(u32::MAX),
        total_possible_score,
        percentage,
        one_mark_wrong: tally.one_mark_wrong,
        two_mark_wrong: tally.two_mark_wrong,
        negative_marks: thirds_to_marks(tally.penalty_thirds),
        marked_for_review: count_status(statuses, questions, |s| s == QuestionStatus::MarkedForReview),
        answered_and_marked: count_status(statuses, questions, |s| {
            s == QuestionStatus::AnsweredAndMarkedForReview
        }),
        time_taken,
        question_wise_results: records,
    }
}

fn count_status(
    statuses: &StatusMap,
    questions: &QuestionSet,
    predicate: impl Fn(QuestionStatus) -> bool,
) -> u32 {
    let count = questions
        .questions()
        .iter()
        .filter(|q| predicate(statuses.get(q.id())))
        .count();
    u32::try_from(count).unwrap_or(u32::MAX)
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
