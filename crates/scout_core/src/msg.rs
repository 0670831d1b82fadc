use std::path::PathBuf;

use chrono::NaiveDate;

use crate::{JobHandle, JobStatus, ResultItem, SearchError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// User edited the search query.
    QueryChanged(String),
    /// User edited the optional location identifier.
    LocationChanged(String),
    StartDateChanged(Option<NaiveDate>),
    EndDateChanged(Option<NaiveDate>),
    MaxResultsChanged(u32),
    RecentOnlyChanged(bool),
    /// User pressed Search.
    SearchClicked,
    /// User asked to abandon the running search.
    CancelClicked,
    /// Engine: the remote run was created.
    JobStarted(JobHandle),
    /// Engine: one status check completed.
    StatusObserved { attempt: u32, status: JobStatus },
    /// Engine: the dataset was fetched.
    ResultsFetched(Vec<ResultItem>),
    /// Engine: the search ended without results.
    SearchFailed(SearchError),
    ExportCsvClicked,
    CopyClipboardClicked,
    /// Host: outcome of a file save or clipboard write.
    ExportFinished(ExportOutcome),
    /// User closed the current notice.
    NoticeDismissed,
    /// UI/render tick to coalesce rendering.
    Tick,
    /// Fallback for placeholder wiring.
    NoOp,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportOutcome {
    CsvSaved { path: PathBuf },
    Copied,
    Failed(SearchError),
}
