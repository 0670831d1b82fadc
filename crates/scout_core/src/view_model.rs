use crate::{Notice, Phase, SearchParameters};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppViewModel {
    pub phase: Phase,
    pub loading: bool,
    pub search_label: &'static str,
    pub params: SearchParameters,
    /// Progress of the in-flight run, if any.
    pub status_line: Option<String>,
    pub cards: Vec<ResultCardView>,
    pub notice: Option<Notice>,
    pub dirty: bool,
}

/// One result rendered read-only; missing fields already read "N/A".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultCardView {
    pub index: usize,
    pub title: String,
    pub url: String,
    pub date: String,
}
