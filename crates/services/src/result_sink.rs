//! Destinations for finished exam results.

use std::path::{Path, PathBuf};
#[cfg(test)]
use std::sync::Mutex;

use async_trait::async_trait;
use exam_core::model::ExamResult;

use crate::error::ResultSinkError;

/// Receives every finalized `ExamResult`.
///
/// Delivery failures are reported to the caller, which logs them; the result
/// itself is still returned to the session owner.
#[async_trait]
pub trait ResultSink: Send + Sync {
    /// Deliver a finished result.
    ///
    /// # Errors
    ///
    /// Returns `ResultSinkError` if the destination rejects or cannot store it.
    async fn deliver(&self, result: &ExamResult) -> Result<(), ResultSinkError>;
}

/// Keeps delivered results in memory.
#[cfg(test)]
#[derive(Debug, Default)]
pub(crate) struct RecordingSink {
    results: Mutex<Vec<ExamResult>>,
}

#[cfg(test)]
impl RecordingSink {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Results delivered so far, oldest first.
    pub(crate) fn results(&self) -> Vec<ExamResult> {
        self.results
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }
}

#[cfg(test)]
#[async_trait]
impl ResultSink for RecordingSink {
    async fn deliver(&self, result: &ExamResult) -> Result<(), ResultSinkError> {
        let mut guard = self
            .results
            .lock()
            .map_err(|_| ResultSinkError::Rejected("recording sink poisoned".into()))?;
        guard.push(result.clone());
        Ok(())
    }
}

/// Writes each result as pretty-printed JSON to a file, replacing its contents.
#[derive(Debug, Clone)]
pub struct JsonFileSink {
    path: PathBuf,
}

impl JsonFileSink {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl ResultSink for JsonFileSink {
    async fn deliver(&self, result: &ExamResult) -> Result<(), ResultSinkError> {
        let body = serde_json::to_vec_pretty(result)?;
        tokio::fs::write(&self.path, body).await?;
        tracing::debug!(path = %self.path.display(), "exam result written");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use exam_core::model::{AnswerKey, AnswerSheet, QuestionSet, StatusMap};
    use exam_core::scoring;

    fn sample_result() -> ExamResult {
        let questions = QuestionSet::from_json(
            r#"[{"id":1,"section":"General Aptitude","type":"NAT","marks":1,"question":"2+2"}]"#,
        )
        .unwrap();
        let key = AnswerKey::from_json(r#"{"1":"4"}"#, &questions);
        scoring::score(&questions, &key, &AnswerSheet::new(), &StatusMap::default(), 12)
    }

    #[tokio::test]
    async fn recording_sink_keeps_every_result() {
        let sink = RecordingSink::new();
        let result = sample_result();
        sink.deliver(&result).await.unwrap();
        sink.deliver(&result).await.unwrap();
        assert_eq!(sink.results().len(), 2);
        assert_eq!(sink.results()[0].time_taken, 12);
    }

    #[tokio::test]
    async fn json_file_sink_writes_camel_case_result() {
        let path = std::env::temp_dir().join(format!(
            "exam-result-sink-{}.json",
            std::process::id()
        ));
        let sink = JsonFileSink::new(&path);
        sink.deliver(&sample_result()).await.unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        let value: serde_json::Value = serde_json::from_str(&written).unwrap();
        assert_eq!(value["timeTaken"], 12);
        assert_eq!(value["totalQuestions"], 1);
        let _ = std::fs::remove_file(&path);
    }
}
