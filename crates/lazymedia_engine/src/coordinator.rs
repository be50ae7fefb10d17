//! Deduplicating, retrying fetch engine.
//!
//! A [`FetchCoordinator`] owns two registries for the lifetime of one pipeline
//! invocation: the fetches currently in flight, keyed by destination path, and
//! the number of failed attempts per destination. At most one fetch runs per
//! destination; later requests for the same path join the running one.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use futures_util::future::{join_all, BoxFuture, Shared};
use futures_util::FutureExt;
use lazymedia_core::DownloadSettings;
use lazymedia_logging::{media_debug, media_info, media_warn};
use rand::Rng;
use tokio_util::sync::CancellationToken;

use crate::fetch::{parse_retry_after, Fetcher, TOO_MANY_REQUESTS};
use crate::persist::{remove_partial, write_body};
use crate::{DownloadError, FailureKind};

type SharedFetch = Shared<BoxFuture<'static, Result<(), DownloadError>>>;

/// Outcome of asking the coordinator for a destination path.
#[derive(Clone)]
pub struct FetchTicket {
    pending: Option<SharedFetch>,
}

impl FetchTicket {
    /// The file was already on disk; nothing was fetched.
    pub fn is_present(&self) -> bool {
        self.pending.is_none()
    }

    /// Resolves once the fetch behind this ticket has settled.
    pub async fn wait(self) -> Result<(), DownloadError> {
        match self.pending {
            Some(fetch) => fetch.await,
            None => Ok(()),
        }
    }
}

#[derive(Clone)]
pub struct FetchCoordinator {
    inner: Arc<Inner>,
}

struct Inner {
    fetcher: Arc<dyn Fetcher>,
    settings: DownloadSettings,
    fetching: Mutex<HashMap<PathBuf, SharedFetch>>,
    retrying: Mutex<HashMap<PathBuf, u32>>,
}

enum Attempt {
    Stored(u64),
    RateLimited(Duration),
}

impl FetchCoordinator {
    pub fn new(fetcher: Arc<dyn Fetcher>, settings: DownloadSettings) -> Self {
        Self {
            inner: Arc::new(Inner {
                fetcher,
                settings,
                fetching: Mutex::new(HashMap::new()),
                retrying: Mutex::new(HashMap::new()),
            }),
        }
    }

    /// Make sure `destination` holds the body of `url`.
    ///
    /// Joins a fetch already in flight for the same path, skips paths that
    /// exist on disk, and otherwise launches a new fetch. The fetch runs on its
    /// own task whether or not the ticket is awaited.
    pub async fn request(&self, url: &str, destination: &Path) -> FetchTicket {
        if let Some(pending) = self.registered(destination) {
            return FetchTicket {
                pending: Some(pending),
            };
        }
        if tokio::fs::try_exists(destination).await.unwrap_or(false) {
            media_debug!("{} already present, skipping {}", destination.display(), url);
            return FetchTicket { pending: None };
        }
        FetchTicket {
            pending: Some(self.launch(url, destination)),
        }
    }

    /// Wait for every fetch registered at the time of the call to settle.
    pub async fn settle_all(&self) {
        let pending: Vec<SharedFetch> = lock(&self.inner.fetching).values().cloned().collect();
        join_all(pending).await;
    }

    /// Number of fetches currently in flight.
    pub fn in_flight(&self) -> usize {
        lock(&self.inner.fetching).len()
    }

    /// Failed attempts recorded so far for `destination`.
    pub fn attempts(&self, destination: &Path) -> u32 {
        lock(&self.inner.retrying)
            .get(destination)
            .copied()
            .unwrap_or(0)
    }

    fn registered(&self, destination: &Path) -> Option<SharedFetch> {
        lock(&self.inner.fetching).get(destination).cloned()
    }

    fn launch(&self, url: &str, destination: &Path) -> SharedFetch {
        let mut fetching = lock(&self.inner.fetching);
        match fetching.entry(destination.to_path_buf()) {
            Entry::Occupied(entry) => entry.get().clone(),
            Entry::Vacant(entry) => {
                let inner = Arc::clone(&self.inner);
                let url = url.to_string();
                let destination = entry.key().clone();
                let task = tokio::spawn(async move {
                    let result = inner.fetch_with_retries(&url, &destination).await;
                    lock(&inner.fetching).remove(&destination);
                    result
                });
                let shared = task
                    .map(|joined| {
                        joined.unwrap_or_else(|err| {
                            Err(DownloadError::new(FailureKind::Cancelled, err.to_string()))
                        })
                    })
                    .boxed()
                    .shared();
                entry.insert(shared.clone());
                shared
            }
        }
    }
}

impl Inner {
    async fn fetch_with_retries(&self, url: &str, destination: &Path) -> Result<(), DownloadError> {
        loop {
            media_info!("Downloading {} to {}", url, destination.display());
            let error = match self.fetch_honoring_rate_limit(url, destination).await {
                Ok(bytes) => {
                    media_debug!("Stored {} bytes at {}", bytes, destination.display());
                    return Ok(());
                }
                Err(error) => error,
            };

            if !error.kind.is_retryable() {
                remove_partial(destination).await;
                return Err(error);
            }

            let attempts = self.record_failure(destination);
            if attempts > self.settings.max_retries {
                remove_partial(destination).await;
                return Err(DownloadError::new(
                    FailureKind::RetryExhausted { attempts },
                    format!("{url}: giving up after {attempts} failed attempts: {error}"),
                ));
            }

            media_warn!("Failed to download {}, retrying. (error: {})", url, error);
            self.backoff().await;
        }
    }

    /// One attempt, repeated for as long as the server asks us to come back later.
    async fn fetch_honoring_rate_limit(
        &self,
        url: &str,
        destination: &Path,
    ) -> Result<u64, DownloadError> {
        loop {
            match self.attempt(url, destination).await? {
                Attempt::Stored(bytes) => return Ok(bytes),
                Attempt::RateLimited(wait) => {
                    media_warn!(
                        "Too many fetch requests; the host asked to wait {} seconds.",
                        wait.as_secs_f64()
                    );
                    tokio::time::sleep(wait.saturating_add(Duration::from_secs(1))).await;
                }
            }
        }
    }

    /// Fetch and store within a single timeout window.
    async fn attempt(&self, url: &str, destination: &Path) -> Result<Attempt, DownloadError> {
        let cancel = CancellationToken::new();
        let timeout = self.settings.timeout();
        let work = self.fetch_and_store(url, destination, cancel.clone());
        match tokio::time::timeout(timeout, work).await {
            Ok(result) => result,
            Err(_) => {
                cancel.cancel();
                Err(DownloadError::new(
                    FailureKind::Timeout,
                    format!("{url}: no response within {} seconds", timeout.as_secs()),
                ))
            }
        }
    }

    async fn fetch_and_store(
        &self,
        url: &str,
        destination: &Path,
        cancel: CancellationToken,
    ) -> Result<Attempt, DownloadError> {
        let response = self.fetcher.fetch(url, cancel).await?;
        if response.status == TOO_MANY_REQUESTS {
            let raw = response.retry_after();
            return match parse_retry_after(raw) {
                Some(wait) => Ok(Attempt::RateLimited(wait)),
                None => Err(DownloadError::new(
                    FailureKind::MissingRetryDirective,
                    format!("{url}: 429 without usable retry-after header ({raw:?})"),
                )),
            };
        }
        if !response.is_success() {
            return Err(DownloadError::new(
                FailureKind::HttpStatus(response.status),
                format!("{url}: unexpected status {}", response.status),
            ));
        }
        let bytes = write_body(destination, response.body).await?;
        Ok(Attempt::Stored(bytes))
    }

    fn record_failure(&self, destination: &Path) -> u32 {
        let mut retrying = lock(&self.retrying);
        let count = retrying.entry(destination.to_path_buf()).or_insert(0);
        *count += 1;
        *count
    }

    async fn backoff(&self) {
        let max_delay = self.settings.max_delay();
        if max_delay.is_zero() {
            return;
        }
        let delay = rand::rng().random_range(Duration::ZERO..max_delay);
        tokio::time::sleep(delay).await;
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
