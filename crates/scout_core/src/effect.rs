use crate::SearchParameters;

/// IO requested by [`crate::update`]; executed by the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Submit the job, poll it and fetch its dataset.
    StartSearch { params: SearchParameters },
    /// Abort the in-flight search at its next suspension point.
    CancelSearch,
    /// Offer `contents` to the user as a downloadable file.
    SaveCsv { filename: String, contents: String },
    /// Place `text` on the system clipboard.
    CopyText { text: String },
}
