use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use lazymedia_core::{
    build, CapturedAsset, DownloadedAsset, EncodedAsset, FailurePolicy, PipelineConfig, Renderers,
};
use lazymedia_engine::{DownloadStage, FetchCoordinator, FetchSettings, ReqwestFetcher};
use lazymedia_logging::{media_info, media_warn};

use crate::manifest::{read_manifest, write_manifest};

pub async fn run_download(config: &PipelineConfig, input: &Path, output: &Path) -> anyhow::Result<()> {
    let assets: Vec<CapturedAsset> = read_manifest(input)?;
    let fetcher = Arc::new(
        ReqwestFetcher::new(FetchSettings::default()).context("failed to create http client")?,
    );
    let coordinator = FetchCoordinator::new(fetcher, config.download.clone());
    let stage = DownloadStage::new(&coordinator, config);

    let downloaded: Vec<DownloadedAsset> = match config.failure_policy {
        FailurePolicy::AbortBatch => stage.run(assets).await.context("download stage failed")?,
        FailurePolicy::Isolate => {
            let results = stage.run_isolated(assets).await;
            let total = results.len();
            let downloaded: Vec<_> = results.into_iter().filter_map(Result::ok).collect();
            if downloaded.len() < total {
                media_warn!(
                    "Skipping {} of {} assets that failed to download",
                    total - downloaded.len(),
                    total
                );
            }
            downloaded
        }
    };

    write_manifest(output, &downloaded)?;
    media_info!("Download stage finished: {} assets located", downloaded.len());
    Ok(())
}

pub fn run_build(config: &PipelineConfig, input: &Path, output: &Path) -> anyhow::Result<()> {
    let assets: Vec<EncodedAsset> = read_manifest(input)?;
    let built = build(assets, config, &Renderers::default()).context("build stage failed")?;
    write_manifest(output, &built)?;
    media_info!("Build stage finished: {} assets rendered", built.len());
    Ok(())
}
