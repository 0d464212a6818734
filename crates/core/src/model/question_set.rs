use std::collections::{HashMap, HashSet};
use thiserror::Error;

use crate::model::ids::QuestionId;
use crate::model::question::{Question, QuestionDraft, QuestionError};

/// Section shown first when the paper contains it.
pub const PREFERRED_FIRST_SECTION: &str = "General Aptitude";

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum QuestionSetError {
    #[error("question set is empty")]
    Empty,

    #[error("duplicate question id: {0}")]
    DuplicateId(QuestionId),

    #[error(transparent)]
    Question(#[from] QuestionError),

    #[error("questions must be a JSON array: {0}")]
    Json(#[from] serde_json::Error),
}

/// Ordered, validated question list grouped into sections.
///
/// Question order defines the 1-based global numbering; section order is the
/// order in which each section first appears.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionSet {
    questions: Vec<Question>,
    sections: Vec<String>,
    by_section: HashMap<String, Vec<usize>>,
    positions: HashMap<QuestionId, usize>,
}

impl QuestionSet {
    /// Build a set from validated questions.
    ///
    /// # Errors
    ///
    /// Returns `QuestionSetError::Empty` for an empty list and
    /// `QuestionSetError::DuplicateId` when two questions share an id.
    pub fn new(questions: Vec<Question>) -> Result<Self, QuestionSetError> {
        if questions.is_empty() {
            return Err(QuestionSetError::Empty);
        }

        let mut sections = Vec::new();
        let mut seen_sections = HashSet::new();
        let mut by_section: HashMap<String, Vec<usize>> = HashMap::new();
        let mut positions = HashMap::with_capacity(questions.len());

        for (idx, question) in questions.iter().enumerate() {
            if positions.insert(question.id().clone(), idx).is_some() {
                return Err(QuestionSetError::DuplicateId(question.id().clone()));
            }
            if seen_sections.insert(question.section().to_string()) {
                sections.push(question.section().to_string());
            }
            by_section
                .entry(question.section().to_string())
                .or_default()
                .push(idx);
        }

        Ok(Self {
            questions,
            sections,
            by_section,
            positions,
        })
    }

    /// Validate a list of drafts into a set.
    ///
    /// # Errors
    ///
    /// Returns the first `QuestionError` encountered, or a set-level error.
    pub fn from_drafts(drafts: Vec<QuestionDraft>) -> Result<Self, QuestionSetError> {
        let questions = drafts
            .into_iter()
            .map(QuestionDraft::validate)
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(questions)
    }

    /// Parse an uploaded question file (a JSON array of questions).
    ///
    /// # Errors
    ///
    /// Returns `QuestionSetError::Json` if the input is not an array of
    /// question objects, or any validation error.
    pub fn from_json(input: &str) -> Result<Self, QuestionSetError> {
        let drafts: Vec<QuestionDraft> = serde_json::from_str(input)?;
        Self::from_drafts(drafts)
    }

    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    #[must_use]
    pub fn sections(&self) -> &[String] {
        &self.sections
    }

    #[must_use]
    pub fn section_index(&self, section: &str) -> Option<usize> {
        self.sections.iter().position(|s| s == section)
    }

    /// Section a new session opens on.
    #[must_use]
    pub fn initial_section(&self) -> usize {
        self.section_index(PREFERRED_FIRST_SECTION).unwrap_or(0)
    }

    /// Number of questions in the section at `section_idx`.
    #[must_use]
    pub fn section_len(&self, section_idx: usize) -> usize {
        self.sections
            .get(section_idx)
            .and_then(|name| self.by_section.get(name))
            .map_or(0, Vec::len)
    }

    /// Question at an in-section index.
    #[must_use]
    pub fn in_section(&self, section_idx: usize, index: usize) -> Option<&Question> {
        let name = self.sections.get(section_idx)?;
        let global = *self.by_section.get(name)?.get(index)?;
        self.questions.get(global)
    }

    #[must_use]
    pub fn get(&self, id: &QuestionId) -> Option<&Question> {
        self.positions.get(id).map(|&idx| &self.questions[idx])
    }

    /// 1-based position of the question in the whole paper.
    #[must_use]
    pub fn global_number(&self, id: &QuestionId) -> Option<usize> {
        self.positions.get(id).map(|idx| idx + 1)
    }

    /// Sum of all question marks.
    #[must_use]
    pub fn total_marks(&self) -> u32 {
        self.questions.iter().map(|q| q.marks().value()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAPER: &str = r#"[
        {"id": 1, "section": "Technical", "type": "NAT", "marks": 1, "question": "t1"},
        {"id": 2, "section": "General Aptitude", "type": "MCQ", "marks": 2, "question": "g1", "options": ["a","b","c","d"]},
        {"id": 3, "section": "Technical", "type": "MSQ", "marks": 2, "question": "t2", "options": ["a","b","c","d"]}
    ]"#;

    #[test]
    fn sections_keep_first_appearance_order() {
        let set = QuestionSet::from_json(PAPER).unwrap();
        assert_eq!(set.sections(), ["Technical", "General Aptitude"]);
        assert_eq!(set.section_len(0), 2);
        assert_eq!(set.section_len(1), 1);
        assert_eq!(set.section_len(9), 0);
    }

    #[test]
    fn initial_section_prefers_general_aptitude() {
        let set = QuestionSet::from_json(PAPER).unwrap();
        assert_eq!(set.initial_section(), 1);
    }

    #[test]
    fn global_numbers_follow_file_order() {
        let set = QuestionSet::from_json(PAPER).unwrap();
        assert_eq!(set.global_number(&QuestionId::from(3)), Some(3));
        assert_eq!(set.in_section(0, 1).unwrap().id(), &QuestionId::from(3));
        assert!(set.in_section(0, 2).is_none());
        assert_eq!(set.total_marks(), 5);
    }

    #[test]
    fn rejects_empty_duplicate_and_non_array() {
        assert!(matches!(QuestionSet::from_json("[]"), Err(QuestionSetError::Empty)));
        assert!(matches!(
            QuestionSet::from_json(r#"{"id": 1}"#),
            Err(QuestionSetError::Json(_))
        ));
        let dup = r#"[
            {"id": 1, "section": "A", "type": "NAT", "marks": 1},
            {"id": "1", "section": "A", "type": "NAT", "marks": 1}
        ]"#;
        assert!(matches!(
            QuestionSet::from_json(dup),
            Err(QuestionSetError::DuplicateId(_))
        ));
    }
}
