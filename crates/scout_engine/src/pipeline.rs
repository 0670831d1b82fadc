use scout_core::{ResultItem, SearchError, SearchParameters};
use scout_logging::{scout_info, scout_warn};
use tokio_util::sync::CancellationToken;

use crate::{poll_until_succeeded, Clock, EngineEvent, JobApi, ProgressSink, RetryPolicy};

/// Runs one search end to end: submit, poll until the run succeeds, then
/// fetch its dataset.
pub async fn run_search(
    api: &dyn JobApi,
    params: &SearchParameters,
    policy: &RetryPolicy,
    clock: &dyn Clock,
    cancel: &CancellationToken,
    sink: &dyn ProgressSink,
) -> Result<Vec<ResultItem>, SearchError> {
    if cancel.is_cancelled() {
        return Err(SearchError::Cancelled);
    }

    let job = tokio::select! {
        biased;
        _ = cancel.cancelled() => return Err(SearchError::Cancelled),
        result = api.start_job(params) => result.map_err(|err| {
            scout_warn!("Failed to start search job: {}", err);
            SearchError::Submission(err.to_string())
        })?,
    };
    scout_info!("Started run {} (dataset {})", job.id, job.dataset_id);
    sink.emit(EngineEvent::JobStarted(job.clone()));

    poll_until_succeeded(api, &job.id, policy, clock, cancel, sink).await?;

    let items = tokio::select! {
        biased;
        _ = cancel.cancelled() => return Err(SearchError::Cancelled),
        result = api.dataset_items(&job.dataset_id) => result.map_err(|err| {
            scout_warn!("Failed to fetch dataset {}: {}", job.dataset_id, err);
            SearchError::Fetch(err.to_string())
        })?,
    };
    scout_info!("Fetched {} items from dataset {}", items.len(), job.dataset_id);
    Ok(items)
}
