use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};

use crate::model::answer_key::number_text;
use crate::model::ids::QuestionId;
use crate::model::question::QuestionType;
use crate::model::question_set::QuestionSet;

/// A candidate's raw response to one question.
///
/// Serialized untagged: a number for a single choice, an array for a
/// multi-select, a string for numeric entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Answer {
    Choice(usize),
    Choices(BTreeSet<usize>),
    Text(String),
}

impl Answer {
    /// Build a multi-select answer from any iterator of option indices.
    pub fn choices(indices: impl IntoIterator<Item = usize>) -> Self {
        Answer::Choices(indices.into_iter().collect())
    }

    #[must_use]
    pub fn text(value: impl Into<String>) -> Self {
        Answer::Text(value.into())
    }

    /// Whether the answer counts as attempted.
    ///
    /// An empty string and an empty selection are treated as absent.
    #[must_use]
    pub fn is_present(&self) -> bool {
        match self {
            Answer::Choice(_) => true,
            Answer::Choices(set) => !set.is_empty(),
            Answer::Text(s) => !s.is_empty(),
        }
    }

    /// Single option index, accepting numeric text such as `"2"`.
    #[must_use]
    pub fn as_choice(&self) -> Option<usize> {
        match self {
            Answer::Choice(idx) => Some(*idx),
            Answer::Text(s) => s.trim().parse().ok(),
            Answer::Choices(_) => None,
        }
    }

    /// Selected option set; a single choice is a one-element set.
    #[must_use]
    pub fn as_choices(&self) -> BTreeSet<usize> {
        match self {
            Answer::Choices(set) => set.clone(),
            Answer::Choice(idx) => BTreeSet::from([*idx]),
            Answer::Text(_) => BTreeSet::new(),
        }
    }

    /// Text form used for numeric-answer comparison.
    #[must_use]
    pub fn as_text(&self) -> String {
        match self {
            Answer::Text(s) => s.clone(),
            Answer::Choice(idx) => idx.to_string(),
            Answer::Choices(set) => set
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(","),
        }
    }

    /// Interpret a JSON value as an answer to a question of the given type.
    ///
    /// Returns `None` for null and for shapes that cannot hold an answer.
    #[must_use]
    pub fn from_value(value: &Value, question_type: QuestionType) -> Option<Self> {
        match (question_type, value) {
            (_, Value::Null) => None,
            (QuestionType::Nat, Value::Number(n)) => Some(Answer::Text(number_text(n))),
            (QuestionType::Nat, Value::String(s)) => Some(Answer::Text(s.clone())),
            (QuestionType::Mcq, Value::Number(n)) => {
                n.as_u64().and_then(|v| usize::try_from(v).ok()).map(Answer::Choice)
            }
            (QuestionType::Mcq, Value::String(s)) => s.trim().parse().ok().map(Answer::Choice),
            (QuestionType::Msq, Value::Array(items)) => {
                let indices = items
                    .iter()
                    .map(|item| item.as_u64().and_then(|v| usize::try_from(v).ok()))
                    .collect::<Option<BTreeSet<_>>>()?;
                Some(Answer::Choices(indices))
            }
            _ => None,
        }
    }
}

/// Answers keyed by question id. Only present answers are stored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnswerSheet(BTreeMap<QuestionId, Answer>);

impl AnswerSheet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store an answer; an absent answer removes the entry.
    pub fn set(&mut self, id: QuestionId, answer: Answer) {
        if answer.is_present() {
            self.0.insert(id, answer);
        } else {
            self.0.remove(&id);
        }
    }

    pub fn remove(&mut self, id: &QuestionId) -> Option<Answer> {
        self.0.remove(id)
    }

    #[must_use]
    pub fn get(&self, id: &QuestionId) -> Option<&Answer> {
        self.0.get(id).filter(|a| a.is_present())
    }

    #[must_use]
    pub fn has_answer(&self, id: &QuestionId) -> bool {
        self.get(id).is_some()
    }

    /// Number of questions holding a present answer.
    #[must_use]
    pub fn answered_count(&self) -> usize {
        self.0.values().filter(|a| a.is_present()).count()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&QuestionId, &Answer)> {
        self.0.iter()
    }

    /// Read a `{questionId: answer}` object, interpreting each value with the
    /// type of its question. Unknown ids and unusable values are skipped.
    ///
    /// # Errors
    ///
    /// Returns a JSON error if the input is not an object.
    pub fn from_json(input: &str, questions: &QuestionSet) -> Result<Self, serde_json::Error> {
        let raw: BTreeMap<QuestionId, Value> = serde_json::from_str(input)?;
        let mut sheet = Self::new();
        for (id, value) in &raw {
            let Some(question) = questions.get(id) else {
                continue;
            };
            if let Some(answer) = Answer::from_value(value, question.question_type()) {
                sheet.set(id.clone(), answer);
            }
        }
        Ok(sheet)
    }
}
