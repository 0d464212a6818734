use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use crate::model::ids::QuestionId;
use crate::model::question::QuestionType;
use crate::model::question_set::QuestionSet;

/// Option letters recognised in raw keys, in index order.
pub const OPTION_LETTERS: [char; 4] = ['A', 'B', 'C', 'D'];

/// Separator used by range keys such as `"-2.1 to -1.9"`.
const RANGE_SEPARATOR: &str = "to";

//
// ─── KEY ENTRY ─────────────────────────────────────────────────────────────────
//

/// Canonical form of one answer-key entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum KeyEntry {
    #[serde(rename = "MCQ")]
    Mcq { value: usize },
    #[serde(rename = "MSQ")]
    Msq { values: BTreeSet<usize> },
    #[serde(rename = "NAT_SINGLE")]
    NatSingle { value: String },
    #[serde(rename = "NAT_SET")]
    NatSet { values: Vec<String> },
    #[serde(rename = "NAT_RANGE")]
    NatRange { min: f64, max: f64 },
}

impl KeyEntry {
    /// Whether this entry can grade a question of the given type.
    #[must_use]
    pub fn grades(&self, question_type: QuestionType) -> bool {
        match self {
            KeyEntry::Mcq { .. } => question_type == QuestionType::Mcq,
            KeyEntry::Msq { .. } => question_type == QuestionType::Msq,
            KeyEntry::NatSingle { .. } | KeyEntry::NatSet { .. } | KeyEntry::NatRange { .. } => {
                question_type == QuestionType::Nat
            }
        }
    }

    /// Resolve numeric-index encodings using the question type.
    ///
    /// Bare numbers are read as NAT values by shape alone; for choice
    /// questions they are option indices.
    #[must_use]
    pub fn coerce_for(self, question_type: QuestionType) -> Self {
        match (question_type, self) {
            (QuestionType::Mcq, KeyEntry::NatSingle { value }) => match parse_index(&value) {
                Some(idx) => KeyEntry::Mcq { value: idx },
                None => KeyEntry::NatSingle { value },
            },
            (QuestionType::Msq, KeyEntry::NatSingle { value }) => {
                match parse_index_list(value.split(',')) {
                    Some(values) => KeyEntry::Msq { values },
                    None => KeyEntry::NatSingle { value },
                }
            }
            (QuestionType::Msq, KeyEntry::NatSet { values }) => {
                match parse_index_list(values.iter().map(String::as_str)) {
                    Some(indices) => KeyEntry::Msq { values: indices },
                    None => KeyEntry::NatSet { values },
                }
            }
            (QuestionType::Msq, KeyEntry::Mcq { value }) => KeyEntry::Msq {
                values: BTreeSet::from([value]),
            },
            (_, entry) => entry,
        }
    }
}

impl fmt::Display for KeyEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyEntry::Mcq { value } => f.write_str(&option_label(*value)),
            KeyEntry::Msq { values } => {
                let labels: Vec<_> = values.iter().map(|v| option_label(*v)).collect();
                f.write_str(&labels.join(", "))
            }
            KeyEntry::NatSingle { value } => f.write_str(value),
            KeyEntry::NatSet { values } => f.write_str(&values.join(", ")),
            KeyEntry::NatRange { min, max } => write!(f, "{min} to {max}"),
        }
    }
}

/// Letter for an option index (`0 → "A"`), or the index itself past `D`.
#[must_use]
pub fn option_label(index: usize) -> String {
    OPTION_LETTERS
        .get(index)
        .map_or_else(|| index.to_string(), char::to_string)
}

//
// ─── NORMALIZATION ─────────────────────────────────────────────────────────────
//

/// Normalize a raw key value by shape alone.
///
/// Returns `None` for values that do not describe a usable key; callers
/// treat that as "ungraded" rather than an error.
#[must_use]
pub fn normalize_key(raw: &Value) -> Option<KeyEntry> {
    match raw {
        Value::Null | Value::Bool(_) => None,
        Value::Number(n) => Some(KeyEntry::NatSingle {
            value: number_text(n),
        }),
        Value::String(s) => normalize_text(s),
        Value::Array(items) => normalize_list(items),
        Value::Object(_) => serde_json::from_value::<KeyEntry>(raw.clone())
            .ok()
            .filter(is_well_formed),
    }
}

/// Normalize a raw key value for a question of a known type.
#[must_use]
pub fn normalize_key_for(raw: &Value, question_type: QuestionType) -> Option<KeyEntry> {
    normalize_key(raw).map(|entry| entry.coerce_for(question_type))
}

fn normalize_text(raw: &str) -> Option<KeyEntry> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Some(idx) = letter_index(trimmed) {
        return Some(KeyEntry::Mcq { value: idx });
    }

    if trimmed.contains(',') {
        let parts: Vec<&str> = trimmed.split(',').map(str::trim).collect();
        if let Some(values) = letter_indices(&parts) {
            return Some(KeyEntry::Msq { values });
        }
    }

    if trimmed.contains(RANGE_SEPARATOR) {
        return parse_range(trimmed);
    }

    Some(KeyEntry::NatSingle {
        value: trimmed.to_string(),
    })
}

fn normalize_list(items: &[Value]) -> Option<KeyEntry> {
    if items.is_empty() {
        return None;
    }

    let texts = items
        .iter()
        .map(|item| match item {
            Value::String(s) => Some(s.trim().to_string()),
            Value::Number(n) => Some(number_text(n)),
            _ => None,
        })
        .collect::<Option<Vec<_>>>()?;

    let parts: Vec<&str> = texts.iter().map(String::as_str).collect();
    if let Some(values) = letter_indices(&parts) {
        return Some(KeyEntry::Msq { values });
    }

    if let [single] = parts.as_slice() {
        if single.contains(RANGE_SEPARATOR) {
            return parse_range(single);
        }
    }

    let values: Vec<String> = texts.into_iter().filter(|t| !t.is_empty()).collect();
    if values.is_empty() {
        return None;
    }
    Some(KeyEntry::NatSet { values })
}

fn parse_range(raw: &str) -> Option<KeyEntry> {
    let (lo, hi) = raw.split_once(RANGE_SEPARATOR)?;
    let lo: f64 = lo.trim().parse().ok()?;
    let hi: f64 = hi.trim().parse().ok()?;
    if !lo.is_finite() || !hi.is_finite() {
        return None;
    }
    Some(KeyEntry::NatRange {
        min: lo.min(hi),
        max: lo.max(hi),
    })
}

fn letter_index(raw: &str) -> Option<usize> {
    let mut chars = raw.chars();
    let c = chars.next()?.to_ascii_uppercase();
    if chars.next().is_some() {
        return None;
    }
    OPTION_LETTERS.iter().position(|&l| l == c)
}

fn letter_indices(parts: &[&str]) -> Option<BTreeSet<usize>> {
    if parts.is_empty() {
        return None;
    }
    parts.iter().map(|p| letter_index(p)).collect()
}

/// Text form of a JSON number as a candidate would type it.
///
/// Whole floats lose their fractional part (`7.0 → "7"`); other values keep
/// their shortest decimal form (`2.50 → "2.5"`).
pub(crate) fn number_text(n: &Number) -> String {
    if n.is_f64() {
        if let Some(whole) = n.as_f64().and_then(whole_number) {
            return whole.to_string();
        }
    }
    n.to_string()
}

fn whole_number(value: f64) -> Option<i64> {
    const LIMIT: f64 = 9_007_199_254_740_992.0;
    (value.is_finite() && value.fract() == 0.0 && value.abs() <= LIMIT).then(|| value as i64)
}

fn parse_index(raw: &str) -> Option<usize> {
    let raw = raw.trim();
    raw.parse::<usize>().ok().or_else(|| {
        let whole = whole_number(raw.parse::<f64>().ok()?)?;
        usize::try_from(whole).ok()
    })
}

fn parse_index_list<'a>(parts: impl Iterator<Item = &'a str>) -> Option<BTreeSet<usize>> {
    let set: BTreeSet<usize> = parts.map(parse_index).collect::<Option<_>>()?;
    if set.is_empty() { None } else { Some(set) }
}

fn is_well_formed(entry: &KeyEntry) -> bool {
    match entry {
        KeyEntry::Mcq { .. } => true,
        KeyEntry::Msq { values } => !values.is_empty(),
        KeyEntry::NatSingle { value } => !value.trim().is_empty(),
        KeyEntry::NatSet { values } => !values.is_empty(),
        KeyEntry::NatRange { min, max } => min.is_finite() && max.is_finite() && min <= max,
    }
}

//
// ─── ANSWER KEY ────────────────────────────────────────────────────────────────
//

/// Answer key with every entry already normalized.
///
/// Entries that fail to normalize are dropped; their questions grade as
/// ungraded.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnswerKey {
    entries: BTreeMap<QuestionId, KeyEntry>,
    rejected: Vec<QuestionId>,
}

impl AnswerKey {
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Normalize a raw `{questionId: rawKey}` mapping against a question set.
    ///
    /// Entries for unknown question ids are normalized by shape alone.
    #[must_use]
    pub fn from_raw(raw: &BTreeMap<QuestionId, Value>, questions: &QuestionSet) -> Self {
        let mut entries = BTreeMap::new();
        let mut rejected = Vec::new();
        for (id, value) in raw {
            let entry = match questions.get(id) {
                Some(q) => normalize_key_for(value, q.question_type()),
                None => normalize_key(value),
            };
            match entry {
                Some(entry) => {
                    entries.insert(id.clone(), entry);
                }
                None => rejected.push(id.clone()),
            }
        }
        Self { entries, rejected }
    }

    /// Parse an uploaded answer-key file.
    ///
    /// Anything other than a JSON object yields an empty key.
    #[must_use]
    pub fn from_json(input: &str, questions: &QuestionSet) -> Self {
        match serde_json::from_str::<BTreeMap<QuestionId, Value>>(input) {
            Ok(raw) => Self::from_raw(&raw, questions),
            Err(_) => Self::empty(),
        }
    }

    pub fn insert(&mut self, id: QuestionId, entry: KeyEntry) {
        self.entries.insert(id, entry);
    }

    #[must_use]
    pub fn get(&self, id: &QuestionId) -> Option<&KeyEntry> {
        self.entries.get(id)
    }

    /// Ids whose raw entries could not be normalized.
    #[must_use]
    pub fn rejected(&self) -> &[QuestionId] {
        &self.rejected
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn whole_float_keys_read_like_integers() {
        assert_eq!(
            normalize_key_for(&json!(7.0), QuestionType::Nat),
            Some(KeyEntry::NatSingle { value: "7".into() })
        );
        assert_eq!(
            normalize_key_for(&json!(2.0), QuestionType::Mcq),
            Some(KeyEntry::Mcq { value: 2 })
        );
        assert_eq!(
            normalize_key_for(&json!(2.50), QuestionType::Nat),
            Some(KeyEntry::NatSingle { value: "2.5".into() })
        );
        assert_eq!(
            normalize_key_for(&json!([1.0, 3.0]), QuestionType::Msq),
            Some(KeyEntry::Msq {
                values: BTreeSet::from([1, 3])
            })
        );
        assert_eq!(
            normalize_key_for(&json!("2.0"), QuestionType::Mcq),
            Some(KeyEntry::Mcq { value: 2 })
        );
        assert_eq!(
            normalize_key_for(&json!(1.5), QuestionType::Mcq),
            Some(KeyEntry::NatSingle { value: "1.5".into() })
        );
    }

    #[test]
    fn letter_keys_normalize_to_choices() {
        assert_eq!(normalize_key(&json!("B")), Some(KeyEntry::Mcq { value: 1 }));
        assert_eq!(normalize_key(&json!(" d ")), Some(KeyEntry::Mcq { value: 3 }));
        assert_eq!(
            normalize_key(&json!(["B", "D"])),
            Some(KeyEntry::Msq {
                values: BTreeSet::from([1, 3])
            })
        );
        assert_eq!(
            normalize_key(&json!("D,B")),
            Some(KeyEntry::Msq {
                values: BTreeSet::from([1, 3])
            })
        );
    }

    #[test]
    fn range_keys_normalize_with_ordered_bounds() {
        assert_eq!(
            normalize_key(&json!(["-2.1 to -1.9"])),
            Some(KeyEntry::NatRange { min: -2.1, max: -1.9 })
        );
        assert_eq!(
            normalize_key(&json!("5 to 3")),
            Some(KeyEntry::NatRange { min: 3.0, max: 5.0 })
        );
        assert_eq!(normalize_key(&json!(["abc to 4"])), None);
    }

    #[test]
    fn numeric_keys_normalize_to_nat() {
        assert_eq!(
            normalize_key(&json!(["10", "11"])),
            Some(KeyEntry::NatSet {
                values: vec!["10".into(), "11".into()]
            })
        );
        assert_eq!(
            normalize_key(&json!("7")),
            Some(KeyEntry::NatSingle { value: "7".into() })
        );
        assert_eq!(
            normalize_key(&json!(2.5)),
            Some(KeyEntry::NatSingle { value: "2.5".into() })
        );
    }

    #[test]
    fn unusable_values_have_no_key() {
        assert_eq!(normalize_key(&json!(null)), None);
        assert_eq!(normalize_key(&json!("")), None);
        assert_eq!(normalize_key(&json!([])), None);
        assert_eq!(normalize_key(&json!(true)), None);
        assert_eq!(normalize_key(&json!([{"x": 1}])), None);
        assert_eq!(normalize_key(&json!({"weird": 1})), None);
    }

    #[test]
    fn canonical_objects_round_trip() {
        let entry = KeyEntry::NatRange { min: 1.5, max: 2.5 };
        let value = serde_json::to_value(&entry).unwrap();
        assert_eq!(value, json!({"type": "NAT_RANGE", "min": 1.5, "max": 2.5}));
        assert_eq!(normalize_key(&value), Some(entry));
        assert_eq!(
            normalize_key(&json!({"type": "MCQ", "value": 2})),
            Some(KeyEntry::Mcq { value: 2 })
        );
    }

    #[test]
    fn numeric_indices_use_question_type() {
        assert_eq!(
            normalize_key_for(&json!(2), QuestionType::Mcq),
            Some(KeyEntry::Mcq { value: 2 })
        );
        assert_eq!(
            normalize_key_for(&json!("1,3"), QuestionType::Msq),
            Some(KeyEntry::Msq {
                values: BTreeSet::from([1, 3])
            })
        );
        assert_eq!(
            normalize_key_for(&json!([0, 2]), QuestionType::Msq),
            Some(KeyEntry::Msq {
                values: BTreeSet::from([0, 2])
            })
        );
        assert_eq!(
            normalize_key_for(&json!(7), QuestionType::Nat),
            Some(KeyEntry::NatSingle { value: "7".into() })
        );
    }

    #[test]
    fn display_uses_letters_for_choices() {
        assert_eq!(KeyEntry::Mcq { value: 1 }.to_string(), "B");
        assert_eq!(
            KeyEntry::Msq {
                values: BTreeSet::from([1, 3])
            }
            .to_string(),
            "B, D"
        );
        assert_eq!(KeyEntry::NatRange { min: -2.1, max: -1.9 }.to_string(), "-2.1 to -1.9");
    }

    #[test]
    fn answer_key_tracks_rejected_entries() {
        let questions = QuestionSet::from_json(
            r#"[
                {"id": 1, "section": "A", "type": "MCQ", "marks": 1, "options": ["a","b","c","d"]},
                {"id": 2, "section": "A", "type": "NAT", "marks": 1}
            ]"#,
        )
        .unwrap();
        let key = AnswerKey::from_json(r#"{"1": "C", "2": null}"#, &questions);
        assert_eq!(key.get(&QuestionId::from(1)), Some(&KeyEntry::Mcq { value: 2 }));
        assert_eq!(key.rejected(), [QuestionId::from(2)]);
        assert_eq!(key.len(), 1);

        assert!(AnswerKey::from_json("[1, 2]", &questions).is_empty());
    }
}
