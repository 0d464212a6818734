mod answer;
pub mod answer_key;
mod config;
mod ids;
mod paper;
mod question;
mod question_set;
mod result;
mod status;

pub use answer::{Answer, AnswerSheet};
pub use answer_key::{AnswerKey, KeyEntry, normalize_key, normalize_key_for, option_label};
pub use config::{
    ConfigError, DEFAULT_SESSION_KEY, DEFAULT_SNAPSHOT_INTERVAL_SECS, ExamConfig, SessionPolicy,
};
pub use ids::{ParseIdError, QuestionId};
pub use paper::ExamPaper;
pub use question::{Marks, Question, QuestionDraft, QuestionError, QuestionType};
pub use question_set::{PREFERRED_FIRST_SECTION, QuestionSet, QuestionSetError};
pub use result::{ExamResult, GradeStatus, QuestionResult};
pub use status::{QuestionStatus, StatusMap};
