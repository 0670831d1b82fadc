use std::time::Duration;

use pretty_assertions::assert_eq;
use scout_core::{JobHandle, JobStatus, ResultItem, SearchParameters};
use scout_engine::{ApiSettings, ApifyClient, FailureKind, JobApi};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TOKEN: &str = "test-token";
const TASK: &str = "user~search-task";

fn client_for(server: &MockServer) -> ApifyClient {
    let settings = ApiSettings::new(TOKEN, TASK).with_base_url(server.uri());
    ApifyClient::new(settings).expect("client builds")
}

fn ai_params() -> SearchParameters {
    SearchParameters {
        query: "ai".into(),
        max_results: 5,
        ..SearchParameters::default()
    }
}

#[tokio::test]
async fn start_job_posts_parameters_as_input() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(format!("/v2/actor-tasks/{TASK}/runs")))
        .and(header("authorization", format!("Bearer {TOKEN}").as_str()))
        .and(header("content-type", "application/json"))
        .and(body_json(json!({
            "input": {
                "query": "ai",
                "location": "",
                "startDate": "",
                "endDate": "",
                "maxResults": 5,
                "recentOnly": false,
            }
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "data": { "id": "run1", "defaultDatasetId": "ds1", "status": "READY" }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let handle = client_for(&server).start_job(&ai_params()).await.unwrap();
    assert_eq!(
        handle,
        JobHandle {
            id: "run1".into(),
            dataset_id: "ds1".into(),
        }
    );
}

#[tokio::test]
async fn start_job_surfaces_service_error_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(format!("/v2/actor-tasks/{TASK}/runs")))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": { "type": "token-not-valid", "message": "Authentication token is not valid." }
        })))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .start_job(&ai_params())
        .await
        .unwrap_err();
    assert_eq!(err.kind, FailureKind::HttpStatus(401));
    assert_eq!(err.message, "Authentication token is not valid.");
}

#[tokio::test]
async fn run_status_reads_nested_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v2/actor-runs/run1"))
        .and(header("authorization", format!("Bearer {TOKEN}").as_str()))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "data": { "id": "run1", "status": "RUNNING" } })),
        )
        .mount(&server)
        .await;

    let status = client_for(&server).run_status("run1").await.unwrap();
    assert_eq!(status, JobStatus::Running);
}

#[tokio::test]
async fn run_status_rejects_malformed_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v2/actor-runs/run1"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let err = client_for(&server).run_status("run1").await.unwrap_err();
    assert_eq!(err.kind, FailureKind::Decode);
}

#[tokio::test]
async fn dataset_items_requests_clean_items() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v2/datasets/ds1/items"))
        .and(query_param("clean", "true"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "title": "A", "url": "http://x", "date": "2024-01-01" },
            { "title": null, "url": "http://y", "date": null }
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let items = client_for(&server).dataset_items("ds1").await.unwrap();
    assert_eq!(
        items,
        vec![
            ResultItem::new(Some("A"), Some("http://x"), Some("2024-01-01")),
            ResultItem::new(None, Some("http://y"), None),
        ]
    );
}

#[tokio::test]
async fn one_numeric_date_does_not_lose_the_whole_dataset() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v2/datasets/ds1/items"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "title": "A", "url": "http://x", "date": "2024-01-01" },
            { "title": "B", "url": "http://y", "date": 1704067200 }
        ])))
        .mount(&server)
        .await;

    let items = client_for(&server).dataset_items("ds1").await.unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[1].display_date(), "1704067200");
}

#[tokio::test]
async fn slow_responses_time_out() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v2/actor-runs/run1"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_millis(250))
                .set_body_json(json!({ "data": { "status": "RUNNING" } })),
        )
        .mount(&server)
        .await;

    let settings = ApiSettings {
        request_timeout: Duration::from_millis(50),
        ..ApiSettings::new(TOKEN, TASK).with_base_url(server.uri())
    };
    let err = ApifyClient::new(settings)
        .unwrap()
        .run_status("run1")
        .await
        .unwrap_err();
    assert_eq!(err.kind, FailureKind::Timeout);
}

#[test]
fn invalid_base_url_is_rejected() {
    let settings = ApiSettings::new(TOKEN, TASK).with_base_url("not a url");
    let err = ApifyClient::new(settings).unwrap_err();
    assert_eq!(err.kind, FailureKind::InvalidUrl);
}
