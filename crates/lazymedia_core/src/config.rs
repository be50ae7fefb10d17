use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Read-only settings shared by the download and build stages.
///
/// Both stages derive paths from the same `local`/`serve`/`remote` triple, so
/// a single value must be handed to both for storage and serving to agree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Local cache root where source files are stored.
    pub local: PathBuf,
    /// URL prefix of assets that belong to the site's own document tree.
    pub serve: String,
    /// Bucket directory collecting every fully remote asset.
    pub remote: String,
    /// Poster used for videos that have none of their own.
    pub poster: String,
    /// Maximum rendered width; larger media is scaled down proportionally.
    pub width: Option<u32>,
    pub class_names: ClassNames,
    pub download: DownloadSettings,
    pub failure_policy: FailurePolicy,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            local: PathBuf::from("public/media"),
            serve: "/media".to_string(),
            remote: "remote".to_string(),
            poster: "/media/poster.avif".to_string(),
            width: None,
            class_names: ClassNames::default(),
            download: DownloadSettings::default(),
            failure_policy: FailurePolicy::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassNames {
    pub image: String,
    pub animation: String,
    pub video: String,
    pub youtube: String,
}

impl Default for ClassNames {
    fn default() -> Self {
        Self {
            image: "lazymedia-image".to_string(),
            animation: "lazymedia-animation".to_string(),
            video: "lazymedia-video".to_string(),
            youtube: "lazymedia-youtube".to_string(),
        }
    }
}

/// Tuning of the retrying fetch engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DownloadSettings {
    /// Per-attempt time limit, in seconds.
    pub timeout_secs: u64,
    /// Failed attempts tolerated per destination before giving up.
    pub max_retries: u32,
    /// Upper bound (exclusive) of the random wait between retries.
    pub max_delay_ms: u64,
}

impl DownloadSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn max_delay(&self) -> Duration {
        Duration::from_millis(self.max_delay_ms)
    }
}

impl Default for DownloadSettings {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            max_retries: 3,
            max_delay_ms: 3_000,
        }
    }
}

/// What a terminal download failure does to the rest of the batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// One failed asset fails the whole stage.
    #[default]
    AbortBatch,
    /// Each asset reports its own result; successes are kept.
    Isolate,
}
