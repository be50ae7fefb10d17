//! Mapping of source references onto disk locations and public URLs.
//!
//! The download stage writes to [`destination_path`] and the build stage links
//! to [`public_url`]; both go through the same root rules so the generated
//! markup resolves to exactly where files were stored. Roots are relocated,
//! file names never change.

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::PipelineConfig;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathError {
    #[error("no file name in source reference {0:?}")]
    MissingFilename(String),
    #[error("source reference {0:?} climbs out of the cache root")]
    ParentSegment(String),
}

/// Final path segment of a URL or path string.
pub fn basename(reference: &str) -> &str {
    match reference.rfind(|c: char| c == '/' || c == '\\') {
        Some(idx) => &reference[idx + 1..],
        None => reference,
    }
}

/// Whether the reference lives under the configured served prefix.
pub fn is_served(source_url: &str, config: &PipelineConfig) -> bool {
    source_url.starts_with(config.serve.as_str())
}

/// Directory the source of `source_url` is stored in.
///
/// Remote references share `{local}/{remote}`; served references mirror the
/// segment between the served prefix and the file name under `{local}`.
pub fn destination_root(source_url: &str, config: &PipelineConfig) -> PathBuf {
    if !is_served(source_url, config) {
        return config.local.join(&config.remote);
    }
    let end = source_url.len() - basename(source_url).len();
    let start = config.serve.len().min(end);
    let subdir = source_url[start..end].trim_matches('/');
    if subdir.is_empty() {
        config.local.clone()
    } else {
        config.local.join(subdir)
    }
}

/// URL directory that files stored under [`destination_root`] are served from.
pub fn public_root(source_url: &str, config: &PipelineConfig) -> String {
    if !is_served(source_url, config) {
        return join_url(&config.serve, &config.remote);
    }
    match source_url.rfind('/') {
        Some(idx) => source_url[..idx].to_string(),
        None => String::new(),
    }
}

/// On-disk location of the downloaded source file.
///
/// References with a `..` segment are rejected so nothing is written outside
/// `local`.
pub fn destination_path(source_url: &str, config: &PipelineConfig) -> Result<PathBuf, PathError> {
    let name = non_empty_basename(source_url)?;
    if has_parent_segment(source_url, config) {
        return Err(PathError::ParentSegment(source_url.to_string()));
    }
    Ok(destination_root(source_url, config).join(name))
}

/// Public URL of the original source file.
pub fn source_url_public(source_url: &str, config: &PipelineConfig) -> Result<String, PathError> {
    let name = non_empty_basename(source_url)?;
    Ok(join_url(&public_root(source_url, config), name))
}

/// Public URL of an artifact (encoded, 2x, poster) derived from `source_url`.
pub fn public_url(
    source_url: &str,
    artifact: &Path,
    config: &PipelineConfig,
) -> Result<String, PathError> {
    let name = artifact
        .file_name()
        .and_then(|name| name.to_str())
        .filter(|name| !name.is_empty())
        .ok_or_else(|| PathError::MissingFilename(artifact.display().to_string()))?;
    Ok(join_url(&public_root(source_url, config), name))
}

fn non_empty_basename(reference: &str) -> Result<&str, PathError> {
    let name = basename(reference);
    if name.is_empty() {
        return Err(PathError::MissingFilename(reference.to_string()));
    }
    Ok(name)
}

fn has_parent_segment(source_url: &str, config: &PipelineConfig) -> bool {
    let stored = if is_served(source_url, config) {
        &source_url[config.serve.len()..]
    } else {
        basename(source_url)
    };
    stored.split(|c: char| c == '/' || c == '\\').any(|segment| segment == "..")
}

fn join_url(root: &str, name: &str) -> String {
    if root.is_empty() {
        return name.to_string();
    }
    let name = name.trim_start_matches('/');
    if root.ends_with('/') {
        format!("{root}{name}")
    } else {
        format!("{root}/{name}")
    }
}
