use httpmock::prelude::*;
use serde_json::json;

use runwatch::config::ApiConfig;
use runwatch::error::RunError;
use runwatch::fetch::Fetcher;
use runwatch::trigger::trigger_run;

fn api_for(server: &MockServer) -> ApiConfig {
    ApiConfig::with_base(server.base_url())
}

#[tokio::test]
async fn test_trigger_returns_created_instance_ids() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET).path("/headless/def-1/trigger/");
            then.status(200).json_body(json!({"data": ["inst-a", "inst-b"]}));
        })
        .await;

    let fetcher = Fetcher::new().expect("build fetcher");
    let ids = trigger_run(&fetcher, &api_for(&server), "def-1")
        .await
        .expect("trigger succeeds");

    assert_eq!(ids, vec!["inst-a".to_string(), "inst-b".to_string()]);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_unknown_definition_is_reported_as_missing() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/headless/nope/trigger/");
            then.status(404);
        })
        .await;

    let fetcher = Fetcher::new().expect("build fetcher");
    let err = trigger_run(&fetcher, &api_for(&server), "nope")
        .await
        .expect_err("404 is a distinct failure");

    match err {
        RunError::DefinitionNotFound(id) => assert_eq!(id, "nope"),
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_other_status_is_a_generic_trigger_failure() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/headless/def-1/trigger/");
            then.status(500).body("server error");
        })
        .await;

    let fetcher = Fetcher::new().expect("build fetcher");
    let err = trigger_run(&fetcher, &api_for(&server), "def-1")
        .await
        .expect_err("non-200 fails the trigger");

    match err {
        RunError::TriggerFailed { run_def_id, status, .. } => {
            assert_eq!(run_def_id, "def-1");
            assert_eq!(status, Some(500));
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_empty_instance_list_means_nothing_to_poll() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET).path("/headless/def-1/trigger/");
            then.status(200).json_body(json!({"data": []}));
        })
        .await;

    let fetcher = Fetcher::new().expect("build fetcher");
    let err = trigger_run(&fetcher, &api_for(&server), "def-1")
        .await
        .expect_err("no instances created");

    assert!(matches!(err, RunError::NoInstancesCreated(_)));
    // Exactly one request: the trigger itself, no status polling.
    mock.assert_async().await;
}

#[tokio::test]
async fn test_unexpected_trigger_body_means_no_instances() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/headless/def-1/trigger/");
            then.status(200).body("plain text, no data field");
        })
        .await;

    let fetcher = Fetcher::new().expect("build fetcher");
    let err = trigger_run(&fetcher, &api_for(&server), "def-1")
        .await
        .expect_err("unusable body yields no instances");
    assert!(matches!(err, RunError::NoInstancesCreated(_)));
}
