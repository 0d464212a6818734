use serde::{Deserialize, Serialize};

use crate::model::answer::Answer;
use crate::model::answer_key::KeyEntry;
use crate::model::ids::QuestionId;
use crate::model::question::{Marks, QuestionType};
use crate::model::status::QuestionStatus;

/// Grading outcome of one question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GradeStatus {
    Correct,
    Wrong,
    NotAttempted,
    /// Answered, but no usable key exists for the question.
    Ungraded,
}

/// Per-question record in an `ExamResult`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionResult {
    pub id: QuestionId,
    pub section: String,
    #[serde(rename = "type")]
    pub question_type: QuestionType,
    pub marks: Marks,
    pub question: String,
    pub options: Vec<String>,
    pub user_answer: Option<Answer>,
    pub correct_answer: Option<KeyEntry>,
    pub is_correct: bool,
    pub marks_obtained: f64,
    pub status: GradeStatus,
    pub review_status: QuestionStatus,
}

/// Scored outcome of a finished session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExamResult {
    /// Total score, floored at zero.
    pub score: f64,
    pub attempted: u32,
    pub correct: u32,
    pub wrong: u32,
    pub ungraded: u32,
    pub total_questions: u32,
    pub total_possible_score: u32,
    pub percentage: f64,
    pub one_mark_wrong: u32,
    pub two_mark_wrong: u32,
    /// Sum of all penalties, as a positive number.
    pub negative_marks: f64,
    pub marked_for_review: u32,
    pub answered_and_marked: u32,
    /// Seconds spent in the session.
    pub time_taken: u32,
    pub question_wise_results: Vec<QuestionResult>,
}

impl ExamResult {
    /// Score formatted with two decimals, as shown on score cards.
    #[must_use]
    pub fn score_display(&self) -> String {
        format!("{:.2}", self.score)
    }

    #[must_use]
    pub fn percentage_display(&self) -> String {
        format!("{:.2}", self.percentage)
    }

    #[must_use]
    pub fn negative_marks_display(&self) -> String {
        format!("{:.2}", self.negative_marks)
    }

    #[must_use]
    pub fn question(&self, id: &QuestionId) -> Option<&QuestionResult> {
        self.question_wise_results.iter().find(|r| &r.id == id)
    }
}
