use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use lazymedia_core::PipelineConfig;
use lazymedia_engine::AtomicFileWriter;
use lazymedia_logging::media_info;
use serde::de::DeserializeOwned;
use serde::Serialize;

pub fn load_config(path: Option<&Path>) -> anyhow::Result<PipelineConfig> {
    let Some(path) = path else {
        return Ok(PipelineConfig::default());
    };
    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    let config = ron::from_str(&content)
        .with_context(|| format!("failed to parse config {}", path.display()))?;
    media_info!("Loaded pipeline config from {}", path.display());
    Ok(config)
}

pub fn read_manifest<T: DeserializeOwned>(path: &Path) -> anyhow::Result<Vec<T>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to read manifest {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("failed to parse manifest {}", path.display()))
}

pub fn write_manifest<T: Serialize>(path: &Path, items: &[T]) -> anyhow::Result<PathBuf> {
    let content = serde_json::to_string_pretty(items).context("failed to serialize manifest")?;
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    let filename = path
        .file_name()
        .and_then(|name| name.to_str())
        .with_context(|| format!("invalid manifest path {}", path.display()))?;
    let written = AtomicFileWriter::new(dir)
        .write(filename, &content)
        .with_context(|| format!("failed to write manifest {}", path.display()))?;
    media_info!("Wrote {} entries to {}", items.len(), written.display());
    Ok(written)
}
