use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::model::ids::QuestionId;

/// Visitation and review state of a single question.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionStatus {
    #[default]
    NotVisited,
    NotAnswered,
    Answered,
    MarkedForReview,
    AnsweredAndMarkedForReview,
}

impl QuestionStatus {
    /// First visit moves `NotVisited` to `NotAnswered`; anything else is kept.
    #[must_use]
    pub fn visit(self) -> Self {
        match self {
            QuestionStatus::NotVisited => QuestionStatus::NotAnswered,
            other => other,
        }
    }

    /// Status after a save, given whether an answer is present.
    #[must_use]
    pub fn saved(has_answer: bool) -> Self {
        if has_answer {
            QuestionStatus::Answered
        } else {
            QuestionStatus::NotAnswered
        }
    }

    /// Status after marking for review.
    #[must_use]
    pub fn marked(has_answer: bool) -> Self {
        if has_answer {
            QuestionStatus::AnsweredAndMarkedForReview
        } else {
            QuestionStatus::MarkedForReview
        }
    }

    /// Status after removing a review mark; same as a save.
    #[must_use]
    pub fn unmarked(has_answer: bool) -> Self {
        Self::saved(has_answer)
    }

    #[must_use]
    pub fn is_marked(self) -> bool {
        matches!(
            self,
            QuestionStatus::MarkedForReview | QuestionStatus::AnsweredAndMarkedForReview
        )
    }

    #[must_use]
    pub fn is_answered(self) -> bool {
        matches!(
            self,
            QuestionStatus::Answered | QuestionStatus::AnsweredAndMarkedForReview
        )
    }

    #[must_use]
    pub fn is_visited(self) -> bool {
        self != QuestionStatus::NotVisited
    }
}

/// Status of every question in a paper, keyed by id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StatusMap(BTreeMap<QuestionId, QuestionStatus>);

impl StatusMap {
    /// All ids start as `NotVisited`.
    pub fn not_visited<'a>(ids: impl IntoIterator<Item = &'a QuestionId>) -> Self {
        Self(
            ids.into_iter()
                .map(|id| (id.clone(), QuestionStatus::NotVisited))
                .collect(),
        )
    }

    /// Status for an id; unknown ids read as `NotVisited`.
    #[must_use]
    pub fn get(&self, id: &QuestionId) -> QuestionStatus {
        self.0.get(id).copied().unwrap_or_default()
    }

    pub fn set(&mut self, id: &QuestionId, status: QuestionStatus) {
        self.0.insert(id.clone(), status);
    }

    /// Apply the first-visit rule to `id`.
    pub fn visit(&mut self, id: &QuestionId) {
        let next = self.get(id).visit();
        self.set(id, next);
    }

    #[must_use]
    pub fn count(&self, predicate: impl Fn(QuestionStatus) -> bool) -> usize {
        self.0.values().filter(|s| predicate(**s)).count()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&QuestionId, &QuestionStatus)> {
        self.0.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn visit_is_idempotent() {
        let id = QuestionId::from("q1");
        let mut map = StatusMap::not_visited([&id]);
        map.visit(&id);
        map.visit(&id);
        assert_eq!(map.get(&id), QuestionStatus::NotAnswered);

        map.set(&id, QuestionStatus::AnsweredAndMarkedForReview);
        map.visit(&id);
        assert_eq!(map.get(&id), QuestionStatus::AnsweredAndMarkedForReview);
    }

    #[test]
    fn mark_and_unmark_follow_answeredness() {
        assert_eq!(QuestionStatus::marked(true), QuestionStatus::AnsweredAndMarkedForReview);
        assert_eq!(QuestionStatus::marked(false), QuestionStatus::MarkedForReview);
        assert_eq!(QuestionStatus::unmarked(true), QuestionStatus::Answered);
        assert_eq!(QuestionStatus::unmarked(false), QuestionStatus::NotAnswered);
    }

    #[test]
    fn serializes_snake_case() {
        let json = serde_json::to_string(&QuestionStatus::AnsweredAndMarkedForReview).unwrap();
        assert_eq!(json, "\"answered_and_marked_for_review\"");
    }
}
