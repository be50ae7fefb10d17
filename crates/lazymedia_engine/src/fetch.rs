use std::time::Duration;

use bytes::Bytes;
use futures_util::stream::BoxStream;
use futures_util::StreamExt;
use reqwest::header::{HeaderMap, RETRY_AFTER};
use tokio_util::sync::CancellationToken;

use crate::{DownloadError, FailureKind};

pub const TOO_MANY_REQUESTS: u16 = 429;

pub type BodyStream = BoxStream<'static, Result<Bytes, DownloadError>>;

/// Status, headers and a not-yet-consumed body of one response.
pub struct FetchResponse {
    pub status: u16,
    pub headers: HeaderMap,
    pub body: BodyStream,
}

impl FetchResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn retry_after(&self) -> Option<&str> {
        self.headers
            .get(RETRY_AFTER)
            .and_then(|value| value.to_str().ok())
    }
}

/// Network seam: issue one GET and hand back the streaming response.
///
/// Implementations should abandon the request once `cancel` fires.
#[async_trait::async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(
        &self,
        url: &str,
        cancel: CancellationToken,
    ) -> Result<FetchResponse, DownloadError>;
}

#[derive(Debug, Clone)]
pub struct FetchSettings {
    pub connect_timeout: Duration,
    pub redirect_limit: usize,
    pub user_agent: String,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            redirect_limit: 5,
            user_agent: concat!("lazymedia/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ReqwestFetcher {
    client: reqwest::Client,
}

impl ReqwestFetcher {
    pub fn new(settings: FetchSettings) -> Result<Self, DownloadError> {
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .redirect(reqwest::redirect::Policy::limited(settings.redirect_limit))
            .user_agent(settings.user_agent)
            .build()
            .map_err(|err| DownloadError::new(FailureKind::Network, err.to_string()))?;
        Ok(Self { client })
    }
}

#[async_trait::async_trait]
impl Fetcher for ReqwestFetcher {
    async fn fetch(
        &self,
        url: &str,
        cancel: CancellationToken,
    ) -> Result<FetchResponse, DownloadError> {
        let request = self.client.get(url).send();
        let response = tokio::select! {
            _ = cancel.cancelled() => {
                return Err(DownloadError::new(FailureKind::Cancelled, format!("{url}: request cancelled")));
            }
            result = request => result.map_err(map_reqwest_error)?,
        };

        let status = response.status().as_u16();
        let headers = response.headers().clone();
        let body = response
            .bytes_stream()
            .map(|chunk| chunk.map_err(map_reqwest_error))
            .boxed();

        Ok(FetchResponse {
            status,
            headers,
            body,
        })
    }
}

/// Server-requested wait of a rate-limited response, in seconds.
///
/// Only plain non-negative numbers that fit a [`Duration`] are accepted;
/// anything else yields `None`.
pub fn parse_retry_after(value: Option<&str>) -> Option<Duration> {
    let secs: f64 = value?.trim().parse().ok()?;
    Duration::try_from_secs_f64(secs).ok()
}

fn map_reqwest_error(err: reqwest::Error) -> DownloadError {
    if err.is_timeout() {
        return DownloadError::new(FailureKind::Timeout, err.to_string());
    }
    DownloadError::new(FailureKind::Network, err.to_string())
}
