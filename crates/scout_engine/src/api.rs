use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{RequestBuilder, Response};
use scout_core::{JobHandle, JobStatus, ResultItem, SearchParameters};
use scout_logging::{scout_debug, scout_trace};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::{ApiError, ApiSettings, FailureKind};

/// The three calls a search makes against the remote task service.
#[async_trait::async_trait]
pub trait JobApi: Send + Sync {
    /// Starts one run of the configured task with `params` as its input.
    async fn start_job(&self, params: &SearchParameters) -> Result<JobHandle, ApiError>;

    async fn run_status(&self, run_id: &str) -> Result<JobStatus, ApiError>;

    /// Fetches the normalized items of a run's output dataset.
    async fn dataset_items(&self, dataset_id: &str) -> Result<Vec<ResultItem>, ApiError>;
}

#[derive(Serialize)]
struct StartRunBody<'a> {
    input: &'a SearchParameters,
}

#[derive(Deserialize)]
struct Envelope<T> {
    data: T,
}

#[derive(Deserialize)]
struct RunStatus {
    status: JobStatus,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

/// [`JobApi`] over HTTP, speaking the Apify v2 REST API.
#[derive(Debug, Clone)]
pub struct ApifyClient {
    settings: ApiSettings,
    base: Url,
    client: reqwest::Client,
}

impl ApifyClient {
    pub fn new(settings: ApiSettings) -> Result<Self, ApiError> {
        let base = Url::parse(&settings.base_url)
            .map_err(|err| ApiError::new(FailureKind::InvalidUrl, err.to_string()))?;
        if base.cannot_be_a_base() {
            return Err(ApiError::new(
                FailureKind::InvalidUrl,
                format!("{} cannot be used as a base url", settings.base_url),
            ));
        }

        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| ApiError::new(FailureKind::Network, err.to_string()))?;

        Ok(Self {
            settings,
            base,
            client,
        })
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|()| ApiError::new(FailureKind::InvalidUrl, "base url cannot be a base"))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        if self.settings.token.is_empty() {
            request
        } else {
            request.bearer_auth(&self.settings.token)
        }
    }
}

#[async_trait::async_trait]
impl JobApi for ApifyClient {
    async fn start_job(&self, params: &SearchParameters) -> Result<JobHandle, ApiError> {
        let url = self.endpoint(&["v2", "actor-tasks", self.settings.task_id.as_str(), "runs"])?;
        let body = serde_json::to_vec(&StartRunBody { input: params })
            .map_err(|err| ApiError::new(FailureKind::Decode, err.to_string()))?;
        scout_debug!("POST {} body_len={}", url, body.len());

        let request = self
            .client
            .post(url)
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "application/json")
            .body(body);
        let envelope: Envelope<JobHandle> = send_json(self.authorized(request)).await?;
        Ok(envelope.data)
    }

    async fn run_status(&self, run_id: &str) -> Result<JobStatus, ApiError> {
        let url = self.endpoint(&["v2", "actor-runs", run_id])?;
        scout_trace!("GET {}", url);

        let request = self.client.get(url).header(ACCEPT, "application/json");
        let envelope: Envelope<RunStatus> = send_json(self.authorized(request)).await?;
        Ok(envelope.data.status)
    }

    async fn dataset_items(&self, dataset_id: &str) -> Result<Vec<ResultItem>, ApiError> {
        let mut url = self.endpoint(&["v2", "datasets", dataset_id, "items"])?;
        url.query_pairs_mut().append_pair("clean", "true");
        scout_debug!("GET {}", url);

        let request = self.client.get(url).header(ACCEPT, "application/json");
        send_json(self.authorized(request)).await
    }
}

async fn send_json<T: DeserializeOwned>(request: RequestBuilder) -> Result<T, ApiError> {
    let response = request.send().await.map_err(map_reqwest_error)?;
    let status = response.status();
    if !status.is_success() {
        let detail = error_detail(response).await;
        return Err(ApiError::new(FailureKind::HttpStatus(status.as_u16()), detail));
    }

    let bytes = response.bytes().await.map_err(map_reqwest_error)?;
    serde_json::from_slice(&bytes).map_err(|err| ApiError::new(FailureKind::Decode, err.to_string()))
}

/// Prefers the service's own error message over the bare status line.
async fn error_detail(response: Response) -> String {
    let status = response.status();
    let fallback = status
        .canonical_reason()
        .unwrap_or("unexpected status")
        .to_string();
    match response.bytes().await {
        Ok(body) => serde_json::from_slice::<ErrorEnvelope>(&body)
            .map(|envelope| envelope.error.message)
            .unwrap_or(fallback),
        Err(_) => fallback,
    }
}

fn map_reqwest_error(err: reqwest::Error) -> ApiError {
    if err.is_timeout() {
        return ApiError::new(FailureKind::Timeout, err.to_string());
    }
    ApiError::new(FailureKind::Network, err.to_string())
}
