use std::fmt;
use std::path::Path;

/// Failure of one download, shared by every waiter on the same destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadError {
    pub kind: FailureKind,
    pub message: String,
}

impl DownloadError {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub(crate) fn io(path: &Path, err: std::io::Error) -> Self {
        Self::new(FailureKind::Io, format!("{}: {err}", path.display()))
    }
}

impl fmt::Display for DownloadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.message, self.kind)
    }
}

impl std::error::Error for DownloadError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    Network,
    Timeout,
    HttpStatus(u16),
    Io,
    Cancelled,
    RetryExhausted { attempts: u32 },
    MissingRetryDirective,
    MalformedSourceReference,
}

impl FailureKind {
    /// Transient failures consume a retry slot; everything else is terminal.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            FailureKind::Network | FailureKind::Timeout | FailureKind::HttpStatus(_) | FailureKind::Io
        )
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::Network => write!(f, "network error"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Io => write!(f, "io error"),
            FailureKind::Cancelled => write!(f, "cancelled"),
            FailureKind::RetryExhausted { attempts } => {
                write!(f, "retries exhausted after {attempts} attempts")
            }
            FailureKind::MissingRetryDirective => write!(f, "rate limited without retry-after"),
            FailureKind::MalformedSourceReference => write!(f, "malformed source reference"),
        }
    }
}
