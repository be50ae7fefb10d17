//! HTML rendering for each asset kind.
//!
//! Video sources are written to `data-src` instead of `src`; the client-side
//! intersection runtime copies them over once the container scrolls into view.

use std::fmt;
use std::sync::Arc;

use thiserror::Error;

use crate::html::escape_attr;
use crate::path::{public_url, source_url_public, PathError};
use crate::{AssetType, EncodedAsset, MediaInfo, PipelineConfig};

const YOUTUBE_PATTERN: &str = "youtube.com/watch?v=";
const YOUTUBE_EMBED_ROOT: &str = "https://www.youtube-nocookie.com/embed/";
const AV1_VIDEO_TYPE: &str = "video/mp4; codecs=av01.0.05M.08";
const LAZY_ATTRS: &str = r#"loading="lazy" decoding="async""#;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    #[error("{0}: expected a youtube.com/watch?v=<id> reference")]
    MalformedSourceReference(String),
    #[error(transparent)]
    Path(#[from] PathError),
    #[error("render failed: {0}")]
    Render(String),
}

/// Renders the markup for one asset.
pub type Renderer =
    Arc<dyn Fn(&EncodedAsset, &PipelineConfig) -> Result<String, BuildError> + Send + Sync>;

/// Renderer table keyed by [`AssetType`]; each entry can be overridden.
#[derive(Clone)]
pub struct Renderers {
    image: Renderer,
    animation: Renderer,
    video: Renderer,
    youtube: Renderer,
}

impl Renderers {
    pub fn get(&self, kind: AssetType) -> &Renderer {
        match kind {
            AssetType::Image => &self.image,
            AssetType::Animation => &self.animation,
            AssetType::Video => &self.video,
            AssetType::YouTube => &self.youtube,
        }
    }

    /// Replace the renderer used for `kind`.
    pub fn with<F>(mut self, kind: AssetType, renderer: F) -> Self
    where
        F: Fn(&EncodedAsset, &PipelineConfig) -> Result<String, BuildError> + Send + Sync + 'static,
    {
        let renderer: Renderer = Arc::new(renderer);
        match kind {
            AssetType::Image => self.image = renderer,
            AssetType::Animation => self.animation = renderer,
            AssetType::Video => self.video = renderer,
            AssetType::YouTube => self.youtube = renderer,
        }
        self
    }
}

impl Default for Renderers {
    fn default() -> Self {
        Self {
            image: Arc::new(render_image),
            animation: Arc::new(render_animation),
            video: Arc::new(render_video),
            youtube: Arc::new(render_youtube),
        }
    }
}

impl fmt::Debug for Renderers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Renderers").finish_non_exhaustive()
    }
}

pub fn render_image(asset: &EncodedAsset, config: &PipelineConfig) -> Result<String, BuildError> {
    render_picture(asset, config, &config.class_names.image)
}

pub fn render_animation(
    asset: &EncodedAsset,
    config: &PipelineConfig,
) -> Result<String, BuildError> {
    render_picture(asset, config, &config.class_names.animation)
}

pub fn render_video(asset: &EncodedAsset, config: &PipelineConfig) -> Result<String, BuildError> {
    let sources = Sources::resolve(asset, config)?;
    let poster = sources.poster.unwrap_or_else(|| config.poster.clone());

    let mut attrs = vec![
        format!(r#"class="{}""#, escape_attr(&config.class_names.video)),
        r#"preload="none" loop autoplay muted playsinline"#.to_string(),
        format!(r#"poster="{}""#, escape_attr(&poster)),
    ];
    attrs.extend(size_attrs(asset.source_info, config.width));

    let mut html = format!("\n<video {}>\n", attrs.join(" "));
    if let Some(encoded) = &sources.encoded {
        html.push_str(&format!(
            "    <source data-src=\"{}\" type=\"{AV1_VIDEO_TYPE}\">\n",
            escape_attr(encoded)
        ));
    }
    html.push_str(&format!(
        "    <source data-src=\"{}\" type=\"video/mp4\">\n</video>",
        escape_attr(&sources.src)
    ));
    Ok(html)
}

pub fn render_youtube(asset: &EncodedAsset, config: &PipelineConfig) -> Result<String, BuildError> {
    let id = youtube_id(asset.source_url())?;
    let title = asset.title().unwrap_or_default();
    Ok(format!(
        "\n<span class=\"{class}\">\n    <iframe title=\"{title}\" src=\"{YOUTUBE_EMBED_ROOT}{id}\" allowfullscreen></iframe>\n</span>",
        class = escape_attr(&config.class_names.youtube),
        title = escape_attr(title),
        id = escape_attr(id),
    ))
}

/// Video id of a `youtube.com/watch?v=<id>` reference.
pub fn youtube_id(source_url: &str) -> Result<&str, BuildError> {
    let malformed = || BuildError::MalformedSourceReference(source_url.to_string());
    let (_, rest) = source_url.split_once(YOUTUBE_PATTERN).ok_or_else(malformed)?;
    let id = rest.split(|c: char| c == '&' || c == '#').next().unwrap_or_default();
    if id.is_empty() {
        return Err(malformed());
    }
    Ok(id)
}

/// Rendered size: natural dimensions scaled down to `max_width`, floored.
pub fn scaled_size(info: MediaInfo, max_width: Option<u32>) -> (u32, u32) {
    let scale = match max_width {
        Some(max) if info.width > max => f64::from(max) / f64::from(info.width),
        _ => 1.0,
    };
    let width = (f64::from(info.width) * scale).floor() as u32;
    let height = (f64::from(info.height) * scale).floor() as u32;
    (width, height)
}

fn size_attrs(info: Option<MediaInfo>, max_width: Option<u32>) -> Option<String> {
    let (width, height) = scaled_size(info?, max_width);
    Some(format!(r#"width="{width}" height="{height}""#))
}

fn render_picture(
    asset: &EncodedAsset,
    config: &PipelineConfig,
    class_name: &str,
) -> Result<String, BuildError> {
    let sources = Sources::resolve(asset, config)?;

    let mut attrs = vec![
        format!(r#"src="{}""#, escape_attr(&sources.src)),
        format!(r#"alt="{}""#, escape_attr(asset.title().unwrap_or_default())),
        format!(r#"class="{}""#, escape_attr(class_name)),
    ];
    attrs.extend(size_attrs(asset.source_info, config.width));
    if asset.meta().is_lazy() {
        attrs.push(LAZY_ATTRS.to_string());
    }

    let mut html = String::from("\n<picture>\n");
    if let Some(encoded) = &sources.encoded {
        let x2 = sources
            .encoded_2x
            .as_deref()
            .map(|url| format!(", {} 2x", escape_attr(url)))
            .unwrap_or_default();
        html.push_str(&format!(
            "    <source srcset=\"{} 1x{x2}\" type=\"image/avif\"/>\n",
            escape_attr(encoded)
        ));
    }
    html.push_str(&format!("    <img {}/>\n</picture>", attrs.join(" ")));
    Ok(html)
}

/// Public URLs of every artifact of one asset.
struct Sources {
    src: String,
    encoded: Option<String>,
    encoded_2x: Option<String>,
    poster: Option<String>,
}

impl Sources {
    fn resolve(asset: &EncodedAsset, config: &PipelineConfig) -> Result<Self, PathError> {
        let url = asset.source_url();
        let artifact = |path: &Option<std::path::PathBuf>| {
            path.as_deref()
                .map(|path| public_url(url, path, config))
                .transpose()
        };
        Ok(Self {
            src: source_url_public(url, config)?,
            encoded: artifact(&asset.encoded_path)?,
            encoded_2x: artifact(&asset.encoded_2x_path)?,
            poster: artifact(&asset.poster_path)?,
        })
    }
}
