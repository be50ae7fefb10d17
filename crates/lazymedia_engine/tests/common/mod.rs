#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use bytes::Bytes;
use futures_util::StreamExt;
use lazymedia_core::DownloadSettings;
use lazymedia_engine::{
    CancellationToken, DownloadError, FailureKind, FetchCoordinator, FetchResponse, Fetcher,
};
use reqwest::header::{HeaderMap, HeaderValue, RETRY_AFTER};

/// One scripted reply of [`ScriptedFetcher`].
#[derive(Debug, Clone)]
pub enum Reply {
    Body(&'static str),
    Delayed(Duration, &'static str),
    Status(u16),
    RateLimited(Option<&'static str>),
    NetworkError,
    Hang,
}

/// In-memory fetcher replaying per-URL scripts and counting calls.
///
/// Once a script runs out the last reply repeats.
#[derive(Default)]
pub struct ScriptedFetcher {
    scripts: Mutex<HashMap<String, VecDeque<Reply>>>,
    calls: Mutex<HashMap<String, usize>>,
}

impl ScriptedFetcher {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn script(&self, url: &str, replies: Vec<Reply>) {
        self.scripts
            .lock()
            .unwrap()
            .insert(url.to_string(), replies.into());
    }

    pub fn calls(&self, url: &str) -> usize {
        self.calls.lock().unwrap().get(url).copied().unwrap_or(0)
    }

    pub fn total_calls(&self) -> usize {
        self.calls.lock().unwrap().values().sum()
    }

    fn next_reply(&self, url: &str) -> Reply {
        *self
            .calls
            .lock()
            .unwrap()
            .entry(url.to_string())
            .or_insert(0) += 1;
        let mut scripts = self.scripts.lock().unwrap();
        let script = scripts.entry(url.to_string()).or_default();
        if script.len() > 1 {
            script.pop_front().unwrap()
        } else {
            script.front().cloned().unwrap_or(Reply::Body("ok"))
        }
    }
}

fn response(status: u16, headers: HeaderMap, body: &'static str) -> FetchResponse {
    let chunks = vec![Ok(Bytes::from_static(body.as_bytes()))];
    FetchResponse {
        status,
        headers,
        body: futures_util::stream::iter(chunks).boxed(),
    }
}

#[async_trait::async_trait]
impl Fetcher for ScriptedFetcher {
    async fn fetch(
        &self,
        url: &str,
        cancel: CancellationToken,
    ) -> Result<FetchResponse, DownloadError> {
        match self.next_reply(url) {
            Reply::Body(body) => Ok(response(200, HeaderMap::new(), body)),
            Reply::Delayed(delay, body) => {
                tokio::time::sleep(delay).await;
                Ok(response(200, HeaderMap::new(), body))
            }
            Reply::Status(status) => Ok(response(status, HeaderMap::new(), "")),
            Reply::RateLimited(retry_after) => {
                let mut headers = HeaderMap::new();
                if let Some(value) = retry_after {
                    headers.insert(RETRY_AFTER, HeaderValue::from_static(value));
                }
                Ok(response(429, headers, ""))
            }
            Reply::NetworkError => Err(DownloadError::new(
                FailureKind::Network,
                format!("{url}: connection reset"),
            )),
            Reply::Hang => {
                cancel.cancelled().await;
                Err(DownloadError::new(FailureKind::Cancelled, "cancelled"))
            }
        }
    }
}

pub fn settings(max_retries: u32) -> DownloadSettings {
    DownloadSettings {
        timeout_secs: 5,
        max_retries,
        max_delay_ms: 0,
    }
}

pub fn coordinator(fetcher: &Arc<ScriptedFetcher>, settings: DownloadSettings) -> FetchCoordinator {
    lazymedia_logging::initialize_for_tests();
    FetchCoordinator::new(fetcher.clone(), settings)
}
