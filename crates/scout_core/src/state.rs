use crate::view_model::{AppViewModel, ResultCardView};
use crate::{CsvDialect, JobHandle, JobStatus, ResultItem, SearchParameters};

/// Where the single search interaction currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    Submitting,
    Polling,
    Fetching,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Error,
}

/// A dismissible message shown to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub severity: Severity,
    pub text: String,
}

impl Notice {
    pub fn info(text: impl Into<String>) -> Self {
        Self {
            severity: Severity::Info,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            text: text.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppState {
    params: SearchParameters,
    phase: Phase,
    job: Option<JobHandle>,
    last_status: Option<JobStatus>,
    status_checks: u32,
    cancel_requested: bool,
    results: Vec<ResultItem>,
    notice: Option<Notice>,
    csv_dialect: CsvDialect,
    dirty: bool,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_csv_dialect(csv_dialect: CsvDialect) -> Self {
        Self {
            csv_dialect,
            ..Self::default()
        }
    }

    pub fn params(&self) -> &SearchParameters {
        &self.params
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// True for the whole submit + poll + fetch operation.
    pub fn is_loading(&self) -> bool {
        self.phase != Phase::Idle
    }

    pub fn results(&self) -> &[ResultItem] {
        &self.results
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn csv_dialect(&self) -> CsvDialect {
        self.csv_dialect
    }

    pub fn view(&self) -> AppViewModel {
        let status_line = self.job.as_ref().map(|job| match &self.last_status {
            Some(status) => format!(
                "Run {}: {} (check {})",
                job.id, status, self.status_checks
            ),
            None => format!("Run {}: started", job.id),
        });

        AppViewModel {
            phase: self.phase,
            loading: self.is_loading(),
            search_label: if self.is_loading() {
                "Searching..."
            } else {
                "Search"
            },
            params: self.params.clone(),
            status_line,
            cards: self
                .results
                .iter()
                .enumerate()
                .map(|(index, item)| ResultCardView {
                    index,
                    title: item.display_title().to_string(),
                    url: item.display_url().to_string(),
                    date: item.display_date().to_string(),
                })
                .collect(),
            notice: self.notice.clone(),
            dirty: self.dirty,
        }
    }

    /// Returns whether the view changed since the last call and resets the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub(crate) fn params_mut(&mut self) -> &mut SearchParameters {
        self.mark_dirty();
        &mut self.params
    }

    pub(crate) fn begin_search(&mut self) {
        self.phase = Phase::Submitting;
        self.job = None;
        self.last_status = None;
        self.status_checks = 0;
        self.cancel_requested = false;
        self.notice = None;
        self.mark_dirty();
    }

    pub(crate) fn job_started(&mut self, job: JobHandle) {
        self.job = Some(job);
        self.phase = Phase::Polling;
        self.mark_dirty();
    }

    pub(crate) fn status_observed(&mut self, attempt: u32, status: JobStatus, succeeded: bool) {
        self.status_checks = attempt;
        self.last_status = Some(status);
        if succeeded {
            self.phase = Phase::Fetching;
        } else if self.phase == Phase::Submitting {
            self.phase = Phase::Polling;
        }
        self.mark_dirty();
    }

    /// Returns false when a cancel was already requested for this run.
    pub(crate) fn request_cancel(&mut self) -> bool {
        if self.cancel_requested {
            return false;
        }
        self.cancel_requested = true;
        self.mark_dirty();
        true
    }

    pub(crate) fn finish_with_results(&mut self, results: Vec<ResultItem>) {
        self.results = results;
        self.finish(None);
    }

    pub(crate) fn finish(&mut self, notice: Option<Notice>) {
        self.phase = Phase::Idle;
        self.job = None;
        self.last_status = None;
        self.status_checks = 0;
        self.cancel_requested = false;
        self.notice = notice;
        self.mark_dirty();
    }

    pub(crate) fn set_notice(&mut self, notice: Option<Notice>) {
        if self.notice != notice {
            self.notice = notice;
            self.mark_dirty();
        }
    }
}
