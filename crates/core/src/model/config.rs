use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

/// Fixed key under which the running timer is snapshotted.
pub const DEFAULT_SESSION_KEY: &str = "exam-session-timer";

/// Running seconds between timer snapshots.
pub const DEFAULT_SNAPSHOT_INTERVAL_SECS: u32 = 30;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("exam duration must be > 0 minutes")]
    InvalidDuration,

    #[error("snapshot interval must be > 0 seconds")]
    InvalidSnapshotInterval,

    #[error("session key cannot be empty")]
    EmptySessionKey,
}

//
// ─── EXAM CONFIG ───────────────────────────────────────────────────────────────
//

/// Exam metadata supplied alongside the question set.
///
/// Only `duration` drives the engine; the rest is display metadata and
/// falls back to the defaults when missing. `year` is kept as text so both
/// `2024` and `"2024"` load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExamConfig {
    /// Duration in minutes.
    duration: u32,
    #[serde(default = "default_year", deserialize_with = "year_text")]
    year: String,
    #[serde(default = "default_subject")]
    subject: String,
    #[serde(default = "default_set")]
    set: String,
    #[serde(default = "default_exam_name")]
    exam_name: String,
}

fn default_year() -> String {
    "2025".into()
}

fn default_subject() -> String {
    "Computer Science".into()
}

fn default_set() -> String {
    "1".into()
}

fn default_exam_name() -> String {
    "GATE".into()
}

fn year_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Year {
        Number(i64),
        Text(String),
    }

    Ok(match Year::deserialize(deserializer)? {
        Year::Number(n) => n.to_string(),
        Year::Text(s) => s.trim().to_string(),
    })
}

impl ExamConfig {
    /// Build a validated config.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidDuration` for a zero duration.
    pub fn new(
        duration_minutes: u32,
        year: impl Into<String>,
        subject: impl Into<String>,
        set: impl Into<String>,
        exam_name: impl Into<String>,
    ) -> Result<Self, ConfigError> {
        Self {
            duration: duration_minutes,
            year: year.into(),
            subject: subject.into(),
            set: set.into(),
            exam_name: exam_name.into(),
        }
        .validate()
    }

    /// Check a deserialized config.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidDuration` for a zero duration.
    pub fn validate(self) -> Result<Self, ConfigError> {
        if self.duration == 0 {
            return Err(ConfigError::InvalidDuration);
        }
        Ok(self)
    }

    #[must_use]
    pub fn with_duration_minutes(mut self, minutes: u32) -> Self {
        self.duration = minutes;
        self
    }

    #[must_use]
    pub fn duration_minutes(&self) -> u32 {
        self.duration
    }

    /// Duration in seconds, saturating.
    #[must_use]
    pub fn duration_secs(&self) -> u32 {
        self.duration.saturating_mul(60)
    }

    #[must_use]
    pub fn year(&self) -> &str {
        &self.year
    }

    #[must_use]
    pub fn subject(&self) -> &str {
        &self.subject
    }

    #[must_use]
    pub fn set(&self) -> &str {
        &self.set
    }

    #[must_use]
    pub fn exam_name(&self) -> &str {
        &self.exam_name
    }
}

impl Default for ExamConfig {
    fn default() -> Self {
        Self {
            duration: 180,
            year: default_year(),
            subject: default_subject(),
            set: default_set(),
            exam_name: default_exam_name(),
        }
    }
}

//
// ─── SESSION POLICY ────────────────────────────────────────────────────────────
//

/// Runtime policy knobs for a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SessionPolicy {
    pause_on_focus_loss: bool,
    snapshot_interval_secs: u32,
    session_key: String,
}

impl SessionPolicy {
    /// Check a policy built from user input.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` for a zero snapshot interval or an empty key.
    pub fn validate(self) -> Result<Self, ConfigError> {
        if self.snapshot_interval_secs == 0 {
            return Err(ConfigError::InvalidSnapshotInterval);
        }
        if self.session_key.trim().is_empty() {
            return Err(ConfigError::EmptySessionKey);
        }
        Ok(self)
    }

    #[must_use]
    pub fn with_pause_on_focus_loss(mut self, enabled: bool) -> Self {
        self.pause_on_focus_loss = enabled;
        self
    }

    #[must_use]
    pub fn with_snapshot_interval_secs(mut self, secs: u32) -> Self {
        self.snapshot_interval_secs = secs;
        self
    }

    #[must_use]
    pub fn with_session_key(mut self, key: impl Into<String>) -> Self {
        self.session_key = key.into();
        self
    }

    #[must_use]
    pub fn pause_on_focus_loss(&self) -> bool {
        self.pause_on_focus_loss
    }

    #[must_use]
    pub fn snapshot_interval_secs(&self) -> u32 {
        self.snapshot_interval_secs
    }

    #[must_use]
    pub fn session_key(&self) -> &str {
        &self.session_key
    }
}

impl Default for SessionPolicy {
    fn default() -> Self {
        Self {
            pause_on_focus_loss: true,
            snapshot_interval_secs: DEFAULT_SNAPSHOT_INTERVAL_SECS,
            session_key: DEFAULT_SESSION_KEY.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_duration_is_rejected() {
        let err = ExamConfig::new(0, "2024", "CS", "1", "GATE").unwrap_err();
        assert_eq!(err, ConfigError::InvalidDuration);
    }

    #[test]
    fn parses_camel_case_json() {
        let json = r#"{"duration": 2, "year": 2024, "subject": "CS", "set": "2", "examName": "GATE"}"#;
        let config: ExamConfig = serde_json::from_str(json).unwrap();
        let config = config.validate().unwrap();
        assert_eq!(config.duration_secs(), 120);
        assert_eq!(config.exam_name(), "GATE");
        assert_eq!(config.year(), "2024");
    }

    #[test]
    fn display_fields_fall_back_to_defaults() {
        let config: ExamConfig = serde_json::from_str(r#"{"duration": 60}"#).unwrap();
        let config = config.validate().unwrap();
        let defaults = ExamConfig::default();
        assert_eq!(config.duration_minutes(), 60);
        assert_eq!(config.year(), defaults.year());
        assert_eq!(config.subject(), defaults.subject());
        assert_eq!(config.set(), defaults.set());
        assert_eq!(config.exam_name(), defaults.exam_name());
    }

    #[test]
    fn year_loads_from_text_or_number() {
        let text: ExamConfig =
            serde_json::from_str(r#"{"duration": 60, "year": "2024", "subject": "CS"}"#).unwrap();
        let number: ExamConfig = serde_json::from_str(r#"{"duration": 60, "year": 2024}"#).unwrap();
        assert_eq!(text.year(), "2024");
        assert_eq!(number.year(), "2024");
        assert_eq!(text.subject(), "CS");
    }

    #[test]
    fn duration_is_still_required() {
        assert!(serde_json::from_str::<ExamConfig>(r#"{"year": 2024}"#).is_err());
    }

    #[test]
    fn policy_defaults_and_validation() {
        let policy = SessionPolicy::default();
        assert!(policy.pause_on_focus_loss());
        assert_eq!(policy.snapshot_interval_secs(), 30);
        assert_eq!(policy.session_key(), DEFAULT_SESSION_KEY);

        let err = SessionPolicy::default()
            .with_snapshot_interval_secs(0)
            .validate()
            .unwrap_err();
        assert_eq!(err, ConfigError::InvalidSnapshotInterval);

        let partial: SessionPolicy = serde_json::from_str(r#"{"pauseOnFocusLoss": false}"#).unwrap();
        assert!(!partial.pause_on_focus_loss());
        assert_eq!(partial.snapshot_interval_secs(), 30);
    }
}
