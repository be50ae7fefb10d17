use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Media kind of a captured reference; selects both the download behaviour
/// and the markup renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetType {
    Image,
    Animation,
    Video,
    YouTube,
}

impl AssetType {
    /// Externally hosted assets are never fetched or stored locally.
    pub fn is_hosted_externally(self) -> bool {
        matches!(self, AssetType::YouTube)
    }
}

impl fmt::Display for AssetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssetType::Image => write!(f, "image"),
            AssetType::Animation => write!(f, "animation"),
            AssetType::Video => write!(f, "video"),
            AssetType::YouTube => write!(f, "youtube"),
        }
    }
}

/// Per-asset switches written next to the reference in the source document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetMeta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lazy: Option<bool>,
}

impl AssetMeta {
    /// Laziness is on unless explicitly disabled.
    pub fn is_lazy(&self) -> bool {
        self.lazy != Some(false)
    }
}

/// Natural dimensions of a source media file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaInfo {
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CapturedAsset {
    pub source_url: String,
    #[serde(rename = "type")]
    pub kind: AssetType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default)]
    pub meta: AssetMeta,
}

impl CapturedAsset {
    pub fn new(source_url: impl Into<String>, kind: AssetType) -> Self {
        Self {
            source_url: source_url.into(),
            kind,
            title: None,
            meta: AssetMeta::default(),
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_lazy(mut self, lazy: bool) -> Self {
        self.meta.lazy = Some(lazy);
        self
    }
}

/// Captured asset plus the local file its source bytes were stored at.
///
/// `source_path` is `None` only for externally hosted kinds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DownloadedAsset {
    #[serde(flatten)]
    pub captured: CapturedAsset,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_path: Option<PathBuf>,
}

impl DownloadedAsset {
    pub fn located(captured: CapturedAsset, source_path: PathBuf) -> Self {
        Self {
            captured,
            source_path: Some(source_path),
        }
    }

    pub fn passthrough(captured: CapturedAsset) -> Self {
        Self {
            captured,
            source_path: None,
        }
    }
}

/// Downloaded asset plus whatever the external encoder produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EncodedAsset {
    #[serde(flatten)]
    pub downloaded: DownloadedAsset,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encoded_path: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encoded_2x_path: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poster_path: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_info: Option<MediaInfo>,
}

impl EncodedAsset {
    pub fn source_url(&self) -> &str {
        &self.downloaded.captured.source_url
    }

    pub fn kind(&self) -> AssetType {
        self.downloaded.captured.kind
    }

    pub fn title(&self) -> Option<&str> {
        self.downloaded.captured.title.as_deref()
    }

    pub fn meta(&self) -> &AssetMeta {
        &self.downloaded.captured.meta
    }

    pub fn source_path(&self) -> Option<&Path> {
        self.downloaded.source_path.as_deref()
    }
}

impl From<DownloadedAsset> for EncodedAsset {
    fn from(downloaded: DownloadedAsset) -> Self {
        Self {
            downloaded,
            encoded_path: None,
            encoded_2x_path: None,
            poster_path: None,
            source_info: None,
        }
    }
}

/// Encoded asset with the markup that replaces its source syntax.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuiltAsset {
    #[serde(flatten)]
    pub encoded: EncodedAsset,
    pub html: String,
}
