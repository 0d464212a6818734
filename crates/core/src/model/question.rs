use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::model::ids::QuestionId;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionError {
    #[error("question id cannot be empty")]
    EmptyId,

    #[error("question {id}: section cannot be empty")]
    EmptySection { id: QuestionId },

    #[error("question {id}: marks must be 1 or 2, got {marks}")]
    InvalidMarks { id: QuestionId, marks: u32 },

    #[error("question {id}: {kind} question needs at least one option")]
    MissingOptions { id: QuestionId, kind: QuestionType },
}

//
// ─── QUESTION TYPE ─────────────────────────────────────────────────────────────
//

/// The three answer formats an exam question can take.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QuestionType {
    /// Single correct option.
    #[serde(rename = "MCQ")]
    Mcq,
    /// One or more correct options; graded all-or-nothing.
    #[serde(rename = "MSQ")]
    Msq,
    /// Free-form numeric entry.
    #[serde(rename = "NAT")]
    Nat,
}

impl QuestionType {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            QuestionType::Mcq => "MCQ",
            QuestionType::Msq => "MSQ",
            QuestionType::Nat => "NAT",
        }
    }

    #[must_use]
    pub fn has_options(self) -> bool {
        matches!(self, QuestionType::Mcq | QuestionType::Msq)
    }
}

impl fmt::Display for QuestionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

//
// ─── MARKS ─────────────────────────────────────────────────────────────────────
//

/// Point value of a question.
///
/// Scores are tracked in thirds of a mark so that MCQ penalties (1/3 and 2/3)
/// stay exact through aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum Marks {
    One,
    Two,
}

impl Marks {
    #[must_use]
    pub fn value(self) -> u32 {
        match self {
            Marks::One => 1,
            Marks::Two => 2,
        }
    }

    /// Reward for a correct answer, in thirds.
    #[must_use]
    pub fn reward_thirds(self) -> i64 {
        i64::from(self.value()) * 3
    }

    /// Penalty for a wrong MCQ answer, in thirds.
    #[must_use]
    pub fn mcq_penalty_thirds(self) -> i64 {
        i64::from(self.value())
    }
}

impl TryFrom<u32> for Marks {
    type Error = u32;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Marks::One),
            2 => Ok(Marks::Two),
            other => Err(other),
        }
    }
}

impl From<Marks> for u32 {
    fn from(value: Marks) -> Self {
        value.value()
    }
}

impl fmt::Display for Marks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value())
    }
}

//
// ─── QUESTION DRAFT ────────────────────────────────────────────────────────────
//

/// A question as it appears in an uploaded question file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct QuestionDraft {
    pub id: QuestionId,
    pub section: String,
    #[serde(rename = "type")]
    pub question_type: QuestionType,
    pub marks: u32,
    #[serde(default)]
    pub question: String,
    #[serde(default)]
    pub options: Option<Vec<String>>,
}

impl QuestionDraft {
    /// Validate the draft into an immutable `Question`.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError` for an empty id or section, marks outside
    /// `{1, 2}`, or an MCQ/MSQ question without options.
    pub fn validate(self) -> Result<Question, QuestionError> {
        if self.id.is_empty() {
            return Err(QuestionError::EmptyId);
        }

        let section = self.section.trim().to_string();
        if section.is_empty() {
            return Err(QuestionError::EmptySection { id: self.id });
        }

        let marks = Marks::try_from(self.marks).map_err(|marks| QuestionError::InvalidMarks {
            id: self.id.clone(),
            marks,
        })?;

        let options = if self.question_type.has_options() {
            match self.options {
                Some(options) if !options.is_empty() => options,
                _ => {
                    return Err(QuestionError::MissingOptions {
                        id: self.id,
                        kind: self.question_type,
                    });
                }
            }
        } else {
            Vec::new()
        };

        Ok(Question {
            id: self.id,
            section,
            question_type: self.question_type,
            marks,
            text: self.question,
            options,
        })
    }
}

//
// ─── QUESTION ──────────────────────────────────────────────────────────────────
//

/// Validated, immutable exam question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    id: QuestionId,
    section: String,
    question_type: QuestionType,
    marks: Marks,
    text: String,
    options: Vec<String>,
}

impl Question {
    #[must_use]
    pub fn id(&self) -> &QuestionId {
        &self.id
    }

    #[must_use]
    pub fn section(&self) -> &str {
        &self.section
    }

    #[must_use]
    pub fn question_type(&self) -> QuestionType {
        self.question_type
    }

    #[must_use]
    pub fn marks(&self) -> Marks {
        self.marks
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Ordered options; empty for NAT questions.
    #[must_use]
    pub fn options(&self) -> &[String] {
        &self.options
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
