use crate::error::Error;
use crate::model::answer_key::AnswerKey;
use crate::model::config::ExamConfig;
use crate::model::question_set::QuestionSet;

/// Everything the collaborator supplies to start a session.
#[derive(Debug, Clone)]
pub struct ExamPaper {
    config: ExamConfig,
    questions: QuestionSet,
    answer_key: AnswerKey,
}

impl ExamPaper {
    #[must_use]
    pub fn new(config: ExamConfig, questions: QuestionSet, answer_key: AnswerKey) -> Self {
        Self {
            config,
            questions,
            answer_key,
        }
    }

    /// A paper with no answer key; every answered question grades as ungraded.
    #[must_use]
    pub fn without_key(config: ExamConfig, questions: QuestionSet) -> Self {
        Self::new(config, questions, AnswerKey::empty())
    }

    /// Assemble a paper from the three uploaded JSON documents.
    ///
    /// A missing config falls back to the default three-hour paper; a missing
    /// key leaves every answered question ungraded.
    ///
    /// # Errors
    ///
    /// Returns `Error` if the questions are invalid or the config is malformed
    /// or has a zero duration.
    pub fn from_json(
        questions: &str,
        answer_key: Option<&str>,
        config: Option<&str>,
    ) -> Result<Self, Error> {
        let questions = QuestionSet::from_json(questions)?;
        let config = match config {
            Some(raw) => serde_json::from_str::<ExamConfig>(raw)?.validate()?,
            None => ExamConfig::default(),
        };
        let answer_key = answer_key.map_or_else(AnswerKey::empty, |raw| {
            AnswerKey::from_json(raw, &questions)
        });
        Ok(Self::new(config, questions, answer_key))
    }

    #[must_use]
    pub fn config(&self) -> &ExamConfig {
        &self.config
    }

    #[must_use]
    pub fn questions(&self) -> &QuestionSet {
        &self.questions
    }

    #[must_use]
    pub fn answer_key(&self) -> &AnswerKey {
        &self.answer_key
    }
}
