//! Lazymedia engine: fetching, persistence and the download stage.
mod coordinator;
mod download;
mod fetch;
mod persist;
mod types;

pub use coordinator::{FetchCoordinator, FetchTicket};
pub use download::DownloadStage;
pub use fetch::{
    parse_retry_after, BodyStream, FetchResponse, FetchSettings, Fetcher, ReqwestFetcher,
    TOO_MANY_REQUESTS,
};
pub use persist::{
    ensure_output_dir, partial_path, remove_partial, write_body, AtomicFileWriter, PersistError,
};
pub use types::{DownloadError, FailureKind};

// Cancellation signal handed to every `Fetcher::fetch` call.
pub use tokio_util::sync::CancellationToken;
