//! HttpSource against a mocked HTTP endpoint

use datafilter::core::error::FetchError;
use datafilter::services::{FetchApplied, FilterSession, HttpSource, RecordSource};
use mockito::Server;
use std::time::Duration;

/// Loopback traffic must not be routed through an ambient proxy
fn local_source(timeout: Option<Duration>) -> HttpSource {
    let mut builder = reqwest::Client::builder().no_proxy().user_agent("datafilter-tests");
    if let Some(timeout) = timeout {
        builder = builder.timeout(timeout);
    }
    HttpSource::from_client(builder.build().unwrap())
}

#[tokio::test]
async fn test_fetches_json_array() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/records")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"[{"id":1,"name":"John"},{"id":2,"name":"Jane"}]"#)
        .create_async()
        .await;

    let source = local_source(None);
    let payload = source.fetch(&format!("{}/records", server.url())).await.unwrap();
    assert_eq!(payload.as_array().map(Vec::len), Some(2));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_non_json_body_is_a_fetch_error() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", "/records")
        .with_status(200)
        .with_header("content-type", "text/html")
        .with_body("<html>nope</html>")
        .create_async()
        .await;

    let source = local_source(None);
    let err = source.fetch(&format!("{}/records", server.url())).await.unwrap_err();
    assert!(matches!(err, FetchError::InvalidJson(_)));
}

#[tokio::test]
async fn test_error_status_with_json_body_loads_as_empty() {
    let mut server = Server::new_async().await;
    let _ok = server
        .mock("GET", "/records")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"[{"id":1}]"#)
        .create_async()
        .await;
    let _missing = server
        .mock("GET", "/missing")
        .with_status(404)
        .with_header("content-type", "application/json")
        .with_body(r#"{"message":"not found"}"#)
        .create_async()
        .await;

    let source = local_source(None);
    let mut session = FilterSession::new();
    session.load(&source, &format!("{}/records", server.url())).await;
    assert_eq!(session.view.columns().len(), 1);

    let applied = session.load(&source, &format!("{}/missing", server.url())).await;
    assert_eq!(applied, FetchApplied::Loaded { rows: 0 });
    let snapshot = session.snapshot();
    assert!(snapshot.columns.is_empty());
    assert!(snapshot.api_data.is_empty());
    assert_eq!(snapshot.error, "");
    assert!(!snapshot.loading);
}

#[tokio::test]
async fn test_server_error_with_non_json_body_is_a_fetch_error() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", "/records")
        .with_status(500)
        .with_body("Internal Server Error")
        .create_async()
        .await;

    let source = local_source(None);
    let err = source.fetch(&format!("{}/records", server.url())).await.unwrap_err();
    assert!(matches!(err, FetchError::InvalidJson(_)));
}

#[tokio::test]
async fn test_session_loads_over_http() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", "/records")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"[{"city":"Oslo","pop":700000},{"city":"Bergen","pop":290000}]"#)
        .create_async()
        .await;

    let source = local_source(Some(Duration::from_secs(10)));
    let mut session = FilterSession::new();
    let url = format!("{}/records", server.url());
    assert_eq!(session.load(&source, &url).await, FetchApplied::Loaded { rows: 2 });

    let (g, c) = session.conditions.locate(0, 0).unwrap();
    session.conditions.set_field(g, c, "pop").unwrap();
    session.conditions.set_operator(g, c, "lessThan").unwrap();
    session.conditions.set_value(g, c, "500000").unwrap();
    let kept = session.filtered_data();
    assert_eq!(kept.len(), 1);
    assert_eq!(kept[0]["city"], "Bergen");
}
