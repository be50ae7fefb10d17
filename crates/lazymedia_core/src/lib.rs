//! Lazymedia core: asset records, path scheme and markup building.
mod asset;
mod build;
mod config;
mod html;
pub mod markup;
pub mod path;

pub use asset::{
    AssetMeta, AssetType, BuiltAsset, CapturedAsset, DownloadedAsset, EncodedAsset, MediaInfo,
};
pub use build::{build, build_asset};
pub use config::{ClassNames, DownloadSettings, FailurePolicy, PipelineConfig};
pub use html::escape_attr;
pub use markup::{BuildError, Renderer, Renderers};
pub use path::PathError;
