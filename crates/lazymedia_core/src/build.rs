use crate::markup::{BuildError, Renderers};
use crate::{BuiltAsset, EncodedAsset, PipelineConfig};

/// Builds the HTML that replaces each asset's source syntax.
///
/// Stops at the first asset whose renderer fails.
pub fn build(
    assets: Vec<EncodedAsset>,
    config: &PipelineConfig,
    renderers: &Renderers,
) -> Result<Vec<BuiltAsset>, BuildError> {
    assets
        .into_iter()
        .map(|asset| build_asset(asset, config, renderers))
        .collect()
}

pub fn build_asset(
    asset: EncodedAsset,
    config: &PipelineConfig,
    renderers: &Renderers,
) -> Result<BuiltAsset, BuildError> {
    let render = renderers.get(asset.kind());
    let html = render(&asset, config)?;
    Ok(BuiltAsset {
        encoded: asset,
        html,
    })
}
