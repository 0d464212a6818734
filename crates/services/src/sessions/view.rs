use exam_core::model::{Answer, QuestionId, QuestionStatus, QuestionType};
use serde::Serialize;

use super::intent::PendingIntent;
use super::progress::SessionProgress;

/// One cell of the question palette for the current section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaletteEntry {
    pub index: usize,
    pub number: usize,
    pub id: QuestionId,
    pub status: QuestionStatus,
}

/// The question currently on screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentQuestion {
    pub id: QuestionId,
    pub number: usize,
    pub question_type: QuestionType,
    pub marks: u32,
    pub text: String,
    pub options: Vec<String>,
    pub answer: Option<Answer>,
    pub status: QuestionStatus,
}

/// Read-only picture of a session for rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    pub exam_name: String,
    pub sections: Vec<String>,
    pub section: String,
    pub index: usize,
    pub section_len: usize,
    pub question: Option<CurrentQuestion>,
    pub palette: Vec<PaletteEntry>,
    pub progress: SessionProgress,
    pub remaining_seconds: u32,
    pub paused: bool,
    pub submitted: bool,
    pub pending: Option<PendingIntent>,
}

impl SessionView {
    /// Remaining time as `HH:MM:SS`.
    #[must_use]
    pub fn remaining_display(&self) -> String {
        let secs = self.remaining_seconds;
        format!("{:02}:{:02}:{:02}", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remaining_display_pads_fields() {
        let view = SessionView {
            exam_name: "GATE".into(),
            sections: vec!["General Aptitude".into()],
            section: "General Aptitude".into(),
            index: 0,
            section_len: 1,
            question: None,
            palette: Vec::new(),
            progress: SessionProgress {
                total: 1,
                answered: 0,
                not_answered: 1,
                marked: 0,
                not_visited: 0,
            },
            remaining_seconds: 3 * 3600 + 5 * 60 + 7,
            paused: false,
            submitted: false,
            pending: None,
        };
        assert_eq!(view.remaining_display(), "03:05:07");
    }
}
