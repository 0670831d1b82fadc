#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use scout_core::{JobHandle, JobStatus, ResultItem, SearchParameters};
use scout_engine::{ApiError, EngineEvent, FailureKind, JobApi, ProgressSink};

/// In-memory [`JobApi`] replaying a fixed status script.
pub struct ScriptedApi {
    statuses: Mutex<VecDeque<JobStatus>>,
    /// Reported once the script runs out.
    after_script: JobStatus,
    items: Vec<ResultItem>,
    submit_error: Option<ApiError>,
    status_error: Option<ApiError>,
    fetch_error: Option<ApiError>,
    fetch_delay: Option<Duration>,
    pub submitted: Mutex<Vec<SearchParameters>>,
    pub status_calls: AtomicU32,
    pub fetch_calls: AtomicU32,
}

impl ScriptedApi {
    pub fn new(script: &[&str], after_script: &str, items: Vec<ResultItem>) -> Self {
        Self {
            statuses: Mutex::new(script.iter().map(|s| JobStatus::from(*s)).collect()),
            after_script: JobStatus::from(after_script),
            items,
            submit_error: None,
            status_error: None,
            fetch_error: None,
            fetch_delay: None,
            submitted: Mutex::new(Vec::new()),
            status_calls: AtomicU32::new(0),
            fetch_calls: AtomicU32::new(0),
        }
    }

    pub fn failing_submit(mut self, err: ApiError) -> Self {
        self.submit_error = Some(err);
        self
    }

    pub fn failing_status(mut self, err: ApiError) -> Self {
        self.status_error = Some(err);
        self
    }

    pub fn failing_fetch(mut self, err: ApiError) -> Self {
        self.fetch_error = Some(err);
        self
    }

    /// Makes the dataset fetch take `delay` before answering.
    pub fn slow_fetch(mut self, delay: Duration) -> Self {
        self.fetch_delay = Some(delay);
        self
    }

    pub fn status_calls(&self) -> u32 {
        self.status_calls.load(Ordering::SeqCst)
    }

    pub fn fetch_calls(&self) -> u32 {
        self.fetch_calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl JobApi for ScriptedApi {
    async fn start_job(&self, params: &SearchParameters) -> Result<JobHandle, ApiError> {
        self.submitted.lock().unwrap().push(params.clone());
        if let Some(err) = &self.submit_error {
            return Err(err.clone());
        }
        Ok(JobHandle {
            id: "run1".into(),
            dataset_id: "ds1".into(),
        })
    }

    async fn run_status(&self, _run_id: &str) -> Result<JobStatus, ApiError> {
        self.status_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(err) = &self.status_error {
            return Err(err.clone());
        }
        let next = self.statuses.lock().unwrap().pop_front();
        Ok(next.unwrap_or_else(|| self.after_script.clone()))
    }

    async fn dataset_items(&self, _dataset_id: &str) -> Result<Vec<ResultItem>, ApiError> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.fetch_delay {
            tokio::time::sleep(delay).await;
        }
        match &self.fetch_error {
            Some(err) => Err(err.clone()),
            None => Ok(self.items.clone()),
        }
    }
}

pub fn api_error(kind: FailureKind, message: &str) -> ApiError {
    ApiError {
        kind,
        message: message.to_string(),
    }
}

#[derive(Default, Clone)]
pub struct TestSink {
    events: Arc<Mutex<Vec<EngineEvent>>>,
}

impl TestSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn take(&self) -> Vec<EngineEvent> {
        self.events.lock().unwrap().drain(..).collect()
    }
}

impl ProgressSink for TestSink {
    fn emit(&self, event: EngineEvent) {
        self.events.lock().unwrap().push(event);
    }
}
