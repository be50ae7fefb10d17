use std::sync::Arc;

use futures_util::StreamExt;
use lazymedia_core::DownloadSettings;
use lazymedia_engine::{
    CancellationToken, FailureKind, FetchCoordinator, FetchSettings, Fetcher, ReqwestFetcher,
};
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn collect_body(response: lazymedia_engine::FetchResponse) -> Vec<u8> {
    let mut body = response.body;
    let mut bytes = Vec::new();
    while let Some(chunk) = body.next().await {
        bytes.extend_from_slice(&chunk.unwrap());
    }
    bytes
}

#[tokio::test]
async fn fetcher_returns_status_and_streams_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/img/a.png"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"\x89PNG".to_vec()))
        .mount(&server)
        .await;

    let fetcher = ReqwestFetcher::new(FetchSettings::default()).unwrap();
    let url = format!("{}/img/a.png", server.uri());

    let response = fetcher.fetch(&url, CancellationToken::new()).await.unwrap();
    assert_eq!(response.status, 200);
    assert!(response.is_success());
    assert_eq!(collect_body(response).await, b"\x89PNG");
}

#[tokio::test]
async fn fetcher_surfaces_rate_limit_directive() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/busy"))
        .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "3"))
        .mount(&server)
        .await;

    let fetcher = ReqwestFetcher::new(FetchSettings::default()).unwrap();
    let url = format!("{}/busy", server.uri());

    let response = fetcher.fetch(&url, CancellationToken::new()).await.unwrap();
    assert_eq!(response.status, 429);
    assert_eq!(response.retry_after(), Some("3"));
}

#[tokio::test]
async fn fetcher_honours_cancellation() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(ResponseTemplate::new(200).set_delay(std::time::Duration::from_secs(5)))
        .mount(&server)
        .await;

    let fetcher = ReqwestFetcher::new(FetchSettings::default()).unwrap();
    let url = format!("{}/slow", server.uri());
    let cancel = CancellationToken::new();
    cancel.cancel();

    let err = fetcher.fetch(&url, cancel).await.err().unwrap();
    assert_eq!(err.kind, FailureKind::Cancelled);
}

#[tokio::test]
async fn coordinator_downloads_over_http_after_rate_limit() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/a.png"))
        .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "0"))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/a.png"))
        .respond_with(ResponseTemplate::new(200).set_body_string("image-bytes"))
        .mount(&server)
        .await;

    let temp = TempDir::new().unwrap();
    let dest = temp.path().join("remote/a.png");
    let fetcher = Arc::new(ReqwestFetcher::new(FetchSettings::default()).unwrap());
    let settings = DownloadSettings {
        timeout_secs: 5,
        max_retries: 0,
        max_delay_ms: 0,
    };
    let coordinator = FetchCoordinator::new(fetcher, settings);
    let url = format!("{}/a.png", server.uri());

    coordinator.request(&url, &dest).await.wait().await.unwrap();

    assert_eq!(std::fs::read_to_string(&dest).unwrap(), "image-bytes");
    assert_eq!(coordinator.attempts(&dest), 0);
    assert_eq!(server.received_requests().await.unwrap().len(), 2);
}

#[tokio::test]
async fn coordinator_gives_up_on_persistent_server_errors() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/gone.png"))
        .respond_with(ResponseTemplate::new(500))
        .expect(2)
        .mount(&server)
        .await;

    let temp = TempDir::new().unwrap();
    let dest = temp.path().join("gone.png");
    let fetcher = Arc::new(ReqwestFetcher::new(FetchSettings::default()).unwrap());
    let settings = DownloadSettings {
        timeout_secs: 5,
        max_retries: 1,
        max_delay_ms: 5,
    };
    let coordinator = FetchCoordinator::new(fetcher, settings);
    let url = format!("{}/gone.png", server.uri());

    let err = coordinator.request(&url, &dest).await.wait().await.unwrap_err();
    assert_eq!(err.kind, FailureKind::RetryExhausted { attempts: 2 });
    assert!(!dest.exists());
}
