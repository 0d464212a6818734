use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque handle for a pending confirmation.
///
/// Tokens are unique per session; only the latest issued one is accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IntentToken(u64);

impl IntentToken {
    pub(crate) fn new(value: u64) -> Self {
        Self(value)
    }

    #[must_use]
    pub fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for IntentToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Counts shown to the candidate before a manual submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitSummary {
    pub total: usize,
    pub answered: usize,
    pub not_answered: usize,
    pub marked: usize,
}

/// What a pending confirmation will do when confirmed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum IntentKind {
    Submit(SubmitSummary),
    SectionAdvance { from: String, to: String },
}

/// A decision waiting for the candidate's yes or no.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PendingIntent {
    pub token: IntentToken,
    pub kind: IntentKind,
}

impl PendingIntent {
    #[must_use]
    pub fn is_submit(&self) -> bool {
        matches!(self.kind, IntentKind::Submit(_))
    }

    /// Prompt text for the confirmation dialog.
    #[must_use]
    pub fn prompt(&self) -> String {
        match &self.kind {
            IntentKind::Submit(summary) => format!(
                "Submit the exam? {} of {} answered, {} not answered, {} marked for review.",
                summary.answered, summary.total, summary.not_answered, summary.marked
            ),
            IntentKind::SectionAdvance { from, to } => {
                format!("End of section \"{from}\". Continue to \"{to}\"?")
            }
        }
    }
}
