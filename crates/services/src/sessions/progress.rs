use serde::Serialize;

/// Palette counts for the whole paper.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionProgress {
    pub total: usize,
    pub answered: usize,
    pub not_answered: usize,
    pub marked: usize,
    pub not_visited: usize,
}
