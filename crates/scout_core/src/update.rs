use crate::{
    clipboard_text, csv_text, AppState, Effect, ExportOutcome, Msg, Notice, SearchError,
    StatusClass, CSV_FILENAME,
};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::QueryChanged(query) => {
            state.params_mut().query = query;
            Vec::new()
        }
        Msg::LocationChanged(location) => {
            state.params_mut().location = location;
            Vec::new()
        }
        Msg::StartDateChanged(date) => {
            state.params_mut().start_date = date;
            Vec::new()
        }
        Msg::EndDateChanged(date) => {
            state.params_mut().end_date = date;
            Vec::new()
        }
        Msg::MaxResultsChanged(max_results) => {
            state.params_mut().max_results = max_results;
            Vec::new()
        }
        Msg::RecentOnlyChanged(recent_only) => {
            state.params_mut().recent_only = recent_only;
            Vec::new()
        }
        Msg::SearchClicked => {
            // Only one search may be in flight.
            if state.is_loading() {
                return (state, Vec::new());
            }
            let params = state.params().clone();
            state.begin_search();
            vec![Effect::StartSearch { params }]
        }
        Msg::CancelClicked => {
            if state.is_loading() && state.request_cancel() {
                vec![Effect::CancelSearch]
            } else {
                Vec::new()
            }
        }
        Msg::JobStarted(job) => {
            if state.is_loading() {
                state.job_started(job);
            }
            Vec::new()
        }
        Msg::StatusObserved { attempt, status } => {
            if state.is_loading() {
                let succeeded = status.class() == StatusClass::Succeeded;
                state.status_observed(attempt, status, succeeded);
            }
            Vec::new()
        }
        Msg::ResultsFetched(items) => {
            if state.is_loading() {
                state.finish_with_results(items);
            }
            Vec::new()
        }
        Msg::SearchFailed(err) => {
            if state.is_loading() {
                state.finish(Some(notice_for(&err)));
            }
            Vec::new()
        }
        Msg::ExportCsvClicked => vec![Effect::SaveCsv {
            filename: CSV_FILENAME.to_string(),
            contents: csv_text(state.results(), state.csv_dialect()),
        }],
        Msg::CopyClipboardClicked => vec![Effect::CopyText {
            text: clipboard_text(state.results()),
        }],
        Msg::ExportFinished(outcome) => {
            let notice = match outcome {
                ExportOutcome::CsvSaved { path } => {
                    Notice::info(format!("Saved {}", path.display()))
                }
                ExportOutcome::Copied => Notice::info("Copied to clipboard!"),
                ExportOutcome::Failed(err) => notice_for(&err),
            };
            state.set_notice(Some(notice));
            Vec::new()
        }
        Msg::NoticeDismissed => {
            state.set_notice(None);
            Vec::new()
        }
        Msg::Tick | Msg::NoOp => Vec::new(),
    };

    (state, effects)
}

fn notice_for(err: &SearchError) -> Notice {
    match err {
        SearchError::Cancelled => Notice::info(err.to_string()),
        _ => Notice::error(err.to_string()),
    }
}
